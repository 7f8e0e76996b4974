use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use super::{DocumentEntry, DocumentRepository};
use crate::codec::MarkupCodec;
use crate::config::EditorConfig;
use crate::error::{QuireError, Result};
use crate::markup::{BinaryMarkupFormat, MarkupFormat};
use crate::model::Document;

/// Filesystem repository: one encoded file per document.
pub struct FsRepository<F: MarkupFormat = BinaryMarkupFormat> {
    codec: MarkupCodec<F>,
    file_ext: String,
    documents_dir: Option<PathBuf>,
}

impl Default for FsRepository<BinaryMarkupFormat> {
    fn default() -> Self {
        Self::new(MarkupCodec::default())
    }
}

impl FsRepository<BinaryMarkupFormat> {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::default().with_config(config)
    }
}

impl<F: MarkupFormat> FsRepository<F> {
    pub fn new(codec: MarkupCodec<F>) -> Self {
        Self {
            codec,
            file_ext: ".quire".to_string(),
            documents_dir: None,
        }
    }

    /// Applies the configured extension and documents directory.
    pub fn with_config(self, config: &EditorConfig) -> Self {
        let mut repo = self.with_file_ext(&config.file_ext());
        repo.documents_dir = config.documents_dir();
        repo
    }

    pub fn with_documents_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.documents_dir = Some(dir.into());
        self
    }

    pub fn documents_dir(&self) -> Option<&Path> {
        self.documents_dir.as_deref()
    }

    /// Where the document called `name` lives in the documents directory.
    pub fn document_path(&self, name: &str) -> Option<PathBuf> {
        self.documents_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}{}", name, self.file_ext)))
    }

    /// Lists the documents directory. Without one, nothing is listed.
    pub async fn list(&self) -> Result<Vec<DocumentEntry>> {
        match self.documents_dir.as_deref() {
            Some(dir) => self.list_documents(dir).await,
            None => Ok(Vec::new()),
        }
    }

    pub fn with_file_ext(mut self, ext: &str) -> Self {
        if ext.starts_with('.') {
            self.file_ext = ext.to_string();
        } else {
            self.file_ext = format!(".{}", ext);
        }
        self
    }

    pub fn file_ext(&self) -> &str {
        &self.file_ext
    }

    /// Documents in `dir` carrying this repository's extension, newest first.
    /// A missing directory lists as empty.
    pub async fn list_documents(&self, dir: &Path) -> Result<Vec<DocumentEntry>> {
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(QuireError::Io(e)),
        };

        let mut found = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(stem) = name.strip_suffix(self.file_ext.as_str()) else {
                continue;
            };
            if stem.is_empty() || stem.starts_with('.') {
                continue;
            }
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let name = stem.to_string();
            let modified: DateTime<Utc> = meta.modified().unwrap_or(SystemTime::now()).into();
            found.push(DocumentEntry {
                name,
                path,
                modified,
            });
        }

        found.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
        Ok(found)
    }

    async fn write_atomic(path: &Path, bytes: Vec<u8>) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).await?;

        let tmp_path = dir.join(format!(".doc-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_path, bytes).await?;
        if let Err(e) = fs::rename(&tmp_path, path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(QuireError::Io(e));
        }
        Ok(())
    }
}

impl<F: MarkupFormat> DocumentRepository for FsRepository<F> {
    fn save<'a>(&'a self, document: &'a Document, path: &'a Path) -> BoxFuture<'a, Result<()>> {
        async move {
            let blobs = self.codec.export_all(document).await?;
            let bytes = self.codec.encode(document, &blobs)?;
            debug!(
                path = %path.display(),
                pages = document.len(),
                bytes = bytes.len(),
                "writing document"
            );
            Self::write_atomic(path, bytes).await
        }
        .boxed()
    }

    fn load<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Document>> {
        async move {
            let bytes = match fs::read(path).await {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(QuireError::NotFound(path.to_path_buf()))
                }
                Err(e) => return Err(QuireError::Io(e)),
            };
            let document = self.codec.decode(&bytes)?;
            debug!(path = %path.display(), pages = document.len(), "loaded document");
            Ok(document)
        }
        .boxed()
    }
}
