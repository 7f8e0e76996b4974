//! # Editor Facade
//!
//! [`Editor`] is the single entry point a UI drives. It owns the action
//! [`Store`] and the [`PageSyncEngine`] and keeps them in step:
//!
//! - After every dispatch, the store's document and mode are pushed into the
//!   engine when they changed.
//! - Current-page signals coming out of the engine are routed back through
//!   `dispatch(PageChanged)`, so the store stays the only writer of state.
//! - `save` gathers the live markup of every page from the views before
//!   dispatching.
//!
//! The facade is generic over the [`ViewFactory`], so the same wiring runs
//! against a real toolkit or against [`HeadlessViewFactory`] in tests.
//!
//! Methods that dispatch `open` or `save` start background work on the tokio
//! runtime; call [`Editor::settle`] to let it finish.
//!
//! [`HeadlessViewFactory`]: crate::sync::HeadlessViewFactory

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::background::Background;
use crate::config::EditorConfig;
use crate::model::{Document, EditMode, PageId};
use crate::repository::fs::FsRepository;
use crate::repository::DocumentRepository;
use crate::store::{Action, DocumentMiddleware, EditorState, Store};
use crate::sync::{PageSyncEngine, ViewFactory};

pub struct Editor<F: ViewFactory> {
    store: Store,
    engine: PageSyncEngine<F>,
    page_changes: mpsc::UnboundedReceiver<PageId>,
    synced_document: Option<Document>,
    synced_mode: EditMode,
}

impl<F: ViewFactory> Editor<F> {
    pub fn new(factory: F, repo: Arc<dyn DocumentRepository>, config: &EditorConfig) -> Self {
        let middleware =
            DocumentMiddleware::new(repo).with_blank_page_size(config.default_page_size());
        let store = Store::new(EditorState::default(), vec![Arc::new(middleware)]);

        let (tx, page_changes) = mpsc::unbounded_channel();
        let engine = PageSyncEngine::new(factory, move |id| {
            // Receiver lives as long as the editor.
            let _ = tx.send(id);
        })
        .with_config(config);

        Self {
            store,
            engine,
            page_changes,
            synced_document: None,
            synced_mode: EditMode::default(),
        }
    }

    /// Editor backed by the filesystem repository the config describes.
    pub fn from_config(factory: F, config: &EditorConfig) -> Self {
        Self::new(factory, Arc::new(FsRepository::from_config(config)), config)
    }

    pub fn state(&self) -> &EditorState {
        self.store.state()
    }

    pub fn engine(&self) -> &PageSyncEngine<F> {
        &self.engine
    }

    /// Mutable access to one page's view, e.g. to feed it input.
    pub fn view_mut(&mut self, id: PageId) -> Option<&mut F::View> {
        self.engine.view_mut(id)
    }

    pub fn dispatch(&mut self, action: Action) {
        self.store.dispatch(action);
        self.sync();
    }

    pub fn open(&mut self, path: impl Into<PathBuf>) {
        self.dispatch(Action::Open(path.into()));
    }

    /// Persist the document with whatever the views currently show.
    pub fn save(&mut self) {
        let edits = self.engine.current_markups();
        self.dispatch(Action::Save(edits));
    }

    pub fn add_page(&mut self) {
        self.dispatch(Action::AddPageTapped);
    }

    pub fn remove_current_page(&mut self) {
        self.dispatch(Action::RemoveCurrentPage);
    }

    pub fn set_background(&mut self, page_index: usize, background: Background) {
        self.dispatch(Action::SetBackground {
            page_index,
            background,
        });
    }

    pub fn toggle_edit_mode(&mut self) {
        self.dispatch(Action::ToggleEditMode);
    }

    pub fn set_mode(&mut self, mode: EditMode) {
        self.dispatch(Action::SetMode(mode));
    }

    pub fn show_tools(&mut self, visible: bool) {
        self.engine.show_tools(visible);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.engine.resize(width, height);
        self.sync();
    }

    /// End of a scroll gesture.
    pub fn scroll_to(&mut self, offset: f64) {
        self.engine.scroll_to(offset);
        self.sync();
    }

    /// Wait for every pending load or save and apply the results.
    pub async fn settle(&mut self) {
        self.store.settle().await;
        self.sync();
    }

    /// Push store changes into the engine and feed page signals back until
    /// both sides agree.
    fn sync(&mut self) {
        loop {
            let state = self.store.state();
            if state.document != self.synced_document {
                self.synced_document = state.document.clone();
                self.engine.set_document(state.document.clone());
            }
            let mode = self.store.state().mode;
            if mode != self.synced_mode {
                self.synced_mode = mode;
                self.engine.update_mode(mode);
            }

            let mut dispatched = false;
            while let Ok(id) = self.page_changes.try_recv() {
                if self.store.state().current_page != Some(id) {
                    self.store.dispatch(Action::PageChanged(id));
                    dispatched = true;
                }
            }
            if !dispatched {
                break;
            }
        }
    }
}
