//! Side effects triggered by actions.
//!
//! A [`Middleware`] sees every dispatched action together with the state as
//! it was before the reducer ran. When it wants to do work it hands back a
//! future; the store spawns it and dispatches whatever action it resolves to.
//! Middleware never mutates state directly.

use std::path::PathBuf;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::{debug, warn};

use super::state::{Action, EditorState};
use crate::background::Background;
use crate::geometry::Size;
use crate::model::{Document, DEFAULT_PAGE_SIZE};
use crate::repository::DocumentRepository;

/// Work returned by a middleware; resolves to an optional follow-up action.
pub type Effect = BoxFuture<'static, Option<Action>>;

pub trait Middleware: Send + Sync {
    /// `None` when the action is not handled here.
    fn handle(&self, state: &EditorState, action: &Action) -> Option<Effect>;
}

/// Loads documents on `Open` and persists them on `Save`.
pub struct DocumentMiddleware {
    repo: Arc<dyn DocumentRepository>,
    blank_page_size: Size,
}

impl DocumentMiddleware {
    pub fn new(repo: Arc<dyn DocumentRepository>) -> Self {
        Self {
            repo,
            blank_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Page size of the one-page document substituted when a load fails.
    pub fn with_blank_page_size(mut self, size: Size) -> Self {
        self.blank_page_size = size;
        self
    }

    fn open(&self, path: PathBuf) -> Effect {
        let repo = Arc::clone(&self.repo);
        let blank = Document::new(1, self.blank_page_size, Background::default());
        async move {
            let document = match repo.load(&path).await {
                Ok(document) => document,
                Err(err) if err.is_not_found() => {
                    debug!(path = %path.display(), "no document stored yet, starting empty");
                    blank
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to load document, substituting empty document"
                    );
                    blank
                }
            };
            Some(Action::DocumentLoaded(document))
        }
        .boxed()
    }

    fn save(&self, document: Document, path: PathBuf) -> Effect {
        let repo = Arc::clone(&self.repo);
        async move {
            match repo.save(&document, &path).await {
                Ok(()) => {
                    debug!(path = %path.display(), pages = document.len(), "document saved");
                    Some(Action::Saved)
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "failed to save document");
                    Some(Action::SavedFailed)
                }
            }
        }
        .boxed()
    }
}

impl Middleware for DocumentMiddleware {
    fn handle(&self, state: &EditorState, action: &Action) -> Option<Effect> {
        match action {
            Action::Open(path) => Some(self.open(path.clone())),
            Action::Save(edits) => {
                let (Some(document), Some(path)) = (state.document.as_ref(), state.path.as_ref())
                else {
                    warn!("save requested without a loaded document and path");
                    return Some(async { Some(Action::SavedFailed) }.boxed());
                };
                // `state` predates the reducer step, so apply the edits here too.
                let mut document = document.clone();
                document.merge_markups(edits);
                Some(self.save(document, path.clone()))
            }
            _ => None,
        }
    }
}
