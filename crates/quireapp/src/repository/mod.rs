//! # Document Persistence
//!
//! The [`DocumentRepository`] trait is the storage boundary consumed by the
//! document middleware. Both operations may suspend, so they return boxed
//! futures and the trait stays object safe (`Arc<dyn DocumentRepository>`).
//!
//! ## Contract
//!
//! - `save(document, path)` persists the whole document at `path`, replacing
//!   whatever was there. Failures surface as [`QuireError::Io`] (or
//!   [`QuireError::Store`] for simulated/backend failures).
//! - `load(path)` returns the stored document, [`QuireError::NotFound`] when
//!   nothing is stored at `path`, or [`QuireError::Decode`] for bytes that
//!   cannot be read back.
//! - Calls to the same path are not serialized here. Callers must not issue
//!   overlapping `save`/`load` for one path.
//!
//! ## Implementations
//!
//! - [`fs::FsRepository`]: production implementation. One file per document,
//!   written atomically (tmp file + rename) through the [`MarkupCodec`].
//! - [`memory::InMemoryRepository`]: for testing logic without filesystem I/O.
//!
//! [`QuireError::Io`]: crate::error::QuireError::Io
//! [`QuireError::Store`]: crate::error::QuireError::Store
//! [`QuireError::NotFound`]: crate::error::QuireError::NotFound
//! [`QuireError::Decode`]: crate::error::QuireError::Decode
//! [`MarkupCodec`]: crate::codec::MarkupCodec

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;

use crate::error::Result;
use crate::model::Document;

pub mod fs;
pub mod memory;

pub trait DocumentRepository: Send + Sync {
    fn save<'a>(&'a self, document: &'a Document, path: &'a Path) -> BoxFuture<'a, Result<()>>;

    fn load<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Document>>;
}

/// One stored document, as shown in a document browser.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentEntry {
    pub name: String,
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
}
