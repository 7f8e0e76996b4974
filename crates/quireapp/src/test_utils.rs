use crate::repository::fs::FsRepository;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestEnv {
    // We keep _temp_dir to ensure the directory is not dropped until the test is done
    pub _temp_dir: TempDir,
    pub repo: FsRepository,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            repo: FsRepository::default(),
            root,
        }
    }

    /// Path of a document named `name` inside the temp root.
    pub fn doc_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}{}", name, self.repo.file_ext()))
    }
}
