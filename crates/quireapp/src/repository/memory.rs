use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use futures::future::BoxFuture;
use futures::FutureExt;

use super::DocumentRepository;
use crate::error::{QuireError, Result};
use crate::model::Document;

/// In-memory repository for testing.
///
/// Documents are stored by value, so a saved document is a snapshot that
/// later edits to the caller's copy cannot reach. Uses a `Mutex` because
/// middleware futures run on the tokio runtime and must be `Send`.
#[derive(Default)]
pub struct InMemoryRepository {
    documents: Mutex<HashMap<PathBuf, Document>>,
    simulate_write_error: AtomicBool,
    saves: AtomicUsize,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Test helper to read what is stored without going through `load`.
    pub fn stored(&self, path: &Path) -> Option<Document> {
        self.lock().get(path).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Document>> {
        // A poisoned map still holds consistent snapshots; keep serving it.
        self.documents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DocumentRepository for InMemoryRepository {
    fn save<'a>(&'a self, document: &'a Document, path: &'a Path) -> BoxFuture<'a, Result<()>> {
        async move {
            if self.simulate_write_error.load(Ordering::SeqCst) {
                return Err(QuireError::Store("Simulated write error".to_string()));
            }
            self.lock().insert(path.to_path_buf(), document.clone());
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        .boxed()
    }

    fn load<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Document>> {
        async move {
            self.lock()
                .get(path)
                .cloned()
                .ok_or_else(|| QuireError::NotFound(path.to_path_buf()))
        }
        .boxed()
    }
}
