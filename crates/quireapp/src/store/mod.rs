//! # Action Store
//!
//! The store owns the [`EditorState`] and is the only thing allowed to change
//! it. Every change goes through [`Store::dispatch`]:
//!
//! ```text
//! dispatch(action)
//!   ├─ previous = state
//!   ├─ state    = reduce(previous, action)          (synchronous, never fails)
//!   ├─ observers(state, action)                     (synchronous)
//!   └─ for each middleware: handle(previous, action)
//!        └─ Some(effect) → spawned into the store's JoinSet
//!             └─ follow-up action → dispatch             (later)
//! ```
//!
//! ## Ordering
//!
//! Reducer steps are applied in dispatch order and never interleave: the
//! store is driven through `&mut self` from one task. Middleware effects run
//! as independent tokio tasks in one `JoinSet`, so their follow-ups arrive in
//! completion order, not issue order. An effect that panics completes
//! without a follow-up. Dropping the store aborts effects still running. Only one
//! `open`/`save` round trip should be in flight at a time; the store logs a
//! warning when a second one starts but does not prevent it.
//!
//! ## Driving follow-ups
//!
//! Follow-up actions are only applied when the owner asks for them:
//! [`Store::process_next`] waits for one effect to finish, and
//! [`Store::settle`] keeps going until no effect is in flight.
//!
//! `dispatch` spawns onto the current tokio runtime and must be called from
//! within one.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

pub mod middleware;
pub mod state;

pub use middleware::{DocumentMiddleware, Effect, Middleware};
pub use state::{reduce, Action, EditorState};

type Observer = Box<dyn FnMut(&EditorState, &Action) + Send>;

pub struct Store {
    state: EditorState,
    middlewares: Vec<Arc<dyn Middleware>>,
    observers: Vec<Observer>,
    effects: JoinSet<Option<Action>>,
}

impl Store {
    pub fn new(state: EditorState, middlewares: Vec<Arc<dyn Middleware>>) -> Self {
        Self {
            state,
            middlewares,
            observers: Vec::new(),
            effects: JoinSet::new(),
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Number of middleware effects that have not reported back yet.
    pub fn in_flight(&self) -> usize {
        self.effects.len()
    }

    /// Register a callback run after every reducer step.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&EditorState, &Action) + Send + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn dispatch(&mut self, action: Action) {
        debug!(action = action.name(), "dispatch");

        if matches!(action, Action::Open(_) | Action::Save(_)) && self.state.is_loading {
            warn!(
                action = action.name(),
                in_flight = self.effects.len(),
                "starting a document round trip while another is still running"
            );
        }

        let next = reduce(&self.state, &action);
        let previous = std::mem::replace(&mut self.state, next);

        for observer in &mut self.observers {
            observer(&self.state, &action);
        }

        for middleware in &self.middlewares {
            let Some(effect) = middleware.handle(&previous, &action) else {
                continue;
            };
            self.effects.spawn(effect);
        }
    }

    /// Wait for the next middleware effect to finish and dispatch its
    /// follow-up, if any. Returns `None` when nothing is in flight.
    pub async fn process_next(&mut self) -> Option<Option<Action>> {
        let follow_up = match self.effects.join_next().await? {
            Ok(follow_up) => follow_up,
            Err(err) => {
                warn!(error = %err, "middleware effect did not complete");
                None
            }
        };
        if let Some(action) = follow_up.clone() {
            debug!(action = action.name(), "middleware follow-up");
            self.dispatch(action);
        }
        Some(follow_up)
    }

    /// Drain every in-flight effect, including ones started by follow-ups.
    pub async fn settle(&mut self) {
        while self.process_next().await.is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Document, EditMode};
    use crate::repository::memory::InMemoryRepository;
    use futures::FutureExt;
    use std::path::PathBuf;
    use std::sync::Mutex;

    fn store_with_repo() -> (Arc<InMemoryRepository>, Store) {
        let repo = Arc::new(InMemoryRepository::new());
        let store = Store::new(
            EditorState::default(),
            vec![Arc::new(DocumentMiddleware::new(repo.clone()))],
        );
        (repo, store)
    }

    #[tokio::test]
    async fn test_open_is_loading_then_loaded() {
        let (_repo, mut store) = store_with_repo();
        store.dispatch(Action::Open(PathBuf::from("missing")));
        assert!(store.state().is_loading);
        assert_eq!(store.in_flight(), 1);

        store.settle().await;
        assert!(!store.state().is_loading);
        assert_eq!(store.state().document.as_ref().unwrap().len(), 1);
        assert_eq!(store.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_synchronous_actions_spawn_nothing() {
        let (_repo, mut store) = store_with_repo();
        store.dispatch(Action::ToggleEditMode);
        assert_eq!(store.state().mode, EditMode::Write);
        assert_eq!(store.in_flight(), 0);
        assert!(store.process_next().await.is_none());
    }

    #[tokio::test]
    async fn test_back_to_back_dispatches_apply_in_order() {
        let (_repo, mut store) = store_with_repo();
        store.dispatch(Action::DocumentLoaded(Document::empty()));
        store.dispatch(Action::AddPageTapped);
        store.dispatch(Action::AddPageTapped);
        assert_eq!(store.state().document.as_ref().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_observers_see_every_step() {
        let (_repo, mut store) = store_with_repo();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store.subscribe(move |state, action| {
            sink.lock().unwrap().push((action.name(), state.is_loading));
        });

        store.dispatch(Action::Open(PathBuf::from("x")));
        store.settle().await;

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![("open", true), ("document_loaded", false)]);
    }

    struct PanickingMiddleware;

    fn failing_effect() -> Option<Action> {
        panic!("effect failed")
    }

    impl Middleware for PanickingMiddleware {
        fn handle(&self, _state: &EditorState, action: &Action) -> Option<Effect> {
            match action {
                Action::Saved => Some(async { failing_effect() }.boxed()),
                _ => None,
            }
        }
    }

    #[tokio::test]
    async fn test_panicking_effect_does_not_block_settle() {
        let mut store = Store::new(EditorState::default(), vec![Arc::new(PanickingMiddleware)]);
        store.dispatch(Action::Saved);
        assert_eq!(store.in_flight(), 1);

        assert_eq!(store.process_next().await, Some(None));
        assert_eq!(store.in_flight(), 0);

        store.dispatch(Action::Saved);
        store.settle().await;
        assert_eq!(store.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_save_round_trip() {
        let (repo, mut store) = store_with_repo();
        store.dispatch(Action::Open(PathBuf::from("doc")));
        store.settle().await;

        store.dispatch(Action::Save(Default::default()));
        assert!(store.state().is_loading);
        store.settle().await;

        assert!(!store.state().is_loading);
        assert_eq!(repo.save_count(), 1);
        assert_eq!(
            repo.stored(std::path::Path::new("doc")),
            store.state().document
        );
    }

    #[tokio::test]
    async fn test_failed_save_keeps_document() {
        let (repo, mut store) = store_with_repo();
        store.dispatch(Action::Open(PathBuf::from("doc")));
        store.settle().await;
        let before = store.state().document.clone();

        repo.set_simulate_write_error(true);
        store.dispatch(Action::Save(Default::default()));
        store.settle().await;

        assert!(!store.state().is_loading);
        assert_eq!(store.state().document, before);
    }
}
