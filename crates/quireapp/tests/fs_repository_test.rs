use std::fs;
use std::time::{Duration, SystemTime};

use quireapp::background::{Background, Color};
use quireapp::error::QuireError;
use quireapp::geometry::Size;
use quireapp::markup::Markup;
use quireapp::model::Document;
use quireapp::repository::fs::FsRepository;
use quireapp::repository::DocumentRepository;
use tempfile::TempDir;

fn setup() -> (TempDir, FsRepository) {
    let dir = TempDir::new().unwrap();
    (dir, FsRepository::default())
}

fn touch(path: &std::path::Path, age_secs: u64) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::now() - Duration::from_secs(age_secs))
        .unwrap();
}

#[tokio::test]
async fn test_fs_repository_round_trip() {
    let (dir, repo) = setup();
    let path = dir.path().join("notes.quire");

    let mut doc = Document::new(
        2,
        Size::new(300.0, 500.0),
        Background::grid(Color::LIGHT_GRAY, Color::WHITE),
    );
    let id = doc.pages()[1].id();
    doc.page_mut(id).unwrap().markup =
        Markup::with_payload(Size::new(300.0, 500.0), b"ink".to_vec());
    doc.set_current_page_index(1);

    repo.save(&doc, &path).await.unwrap();
    let loaded = repo.load(&path).await.unwrap();
    assert_eq!(loaded, doc);
}

#[tokio::test]
async fn test_fs_repository_atomic_write_artifacts() {
    let (dir, repo) = setup();
    let path = dir.path().join("nested").join("doc.quire");

    repo.save(&Document::empty(), &path).await.unwrap();
    repo.save(&Document::empty(), &path).await.unwrap();
    assert!(path.exists());

    // Verify NO .tmp files are left behind
    for entry in fs::read_dir(path.parent().unwrap()).unwrap() {
        let path = entry.unwrap().path();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
    }
}

#[tokio::test]
async fn test_fs_repository_missing_file() {
    let (dir, repo) = setup();
    let err = repo.load(&dir.path().join("absent.quire")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_fs_repository_corrupt_file() {
    let (dir, repo) = setup();
    let path = dir.path().join("broken.quire");
    fs::write(&path, b"not a document").unwrap();

    let err = repo.load(&path).await.unwrap_err();
    assert!(matches!(err, QuireError::Decode(_)));
}

#[tokio::test]
async fn test_list_documents_newest_first() {
    let (dir, repo) = setup();
    for (name, age) in [("old", 300), ("new", 10), ("middle", 100)] {
        let path = dir.path().join(format!("{}.quire", name));
        repo.save(&Document::empty(), &path).await.unwrap();
        touch(&path, age);
    }
    fs::write(dir.path().join("readme.txt"), "ignored").unwrap();
    fs::write(dir.path().join(".hidden.quire"), "ignored").unwrap();

    let entries = repo.list_documents(dir.path()).await.unwrap();
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["new", "middle", "old"]);
    assert_eq!(entries[0].path, dir.path().join("new.quire"));
}

#[tokio::test]
async fn test_list_documents_missing_dir() {
    let (dir, repo) = setup();
    let entries = repo.list_documents(&dir.path().join("nope")).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_custom_extension() {
    let (dir, _) = setup();
    let repo = FsRepository::default().with_file_ext("ink");
    assert_eq!(repo.file_ext(), ".ink");

    repo.save(&Document::empty(), &dir.path().join("a.ink")).await.unwrap();
    repo.save(&Document::empty(), &dir.path().join("b.quire")).await.unwrap();
    let entries = repo.list_documents(dir.path()).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "a");
}
