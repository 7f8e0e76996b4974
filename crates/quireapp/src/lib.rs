//! # Quire Architecture
//!
//! Quire is a **UI-agnostic core for a paginated freeform notebook**. A
//! document is an ordered list of pages; each page carries an opaque markup
//! payload (the drawing) and a background. The crate owns the document model,
//! the state store that mutates it, persistence, and the reconciliation of
//! on-screen page views. Rendering ink is left to whatever toolkit implements
//! [`sync::PageView`].
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Editor Facade (editor.rs)                                  │
//! │  - Single entry point for a UI                              │
//! │  - Keeps store and engine in step                           │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                               │
//!                 ▼                               ▼
//! ┌───────────────────────────────┐ ┌───────────────────────────┐
//! │  Store (store/)               │ │  Page Sync (sync/)        │
//! │  - Pure reducer               │ │  - One view per page id   │
//! │  - Middleware effects (tokio) │ │  - Layout, rescale, mode  │
//! └───────────────────────────────┘ └───────────────────────────┘
//!                 │
//!                 ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage (repository/, codec.rs)                            │
//! │  - DocumentRepository trait                                 │
//! │  - FsRepository (production), InMemoryRepository (testing)  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Unidirectional Data Flow
//!
//! State only changes through [`store::Store::dispatch`]. The reducer is a
//! pure function of `(state, action)`. Anything asynchronous (loading,
//! saving) happens in middleware, which reports back by dispatching another
//! action. The view engine never writes state; it raises page-change signals
//! that the facade turns into actions.
//!
//! ## Testing Strategy
//!
//! 1. **Model and codec**: unit tests plus property tests for the document
//!    invariants and the encode/decode round trip.
//! 2. **Store**: reducer tests are synchronous; middleware and dispatch are
//!    tested with `#[tokio::test]` against [`repository::memory::InMemoryRepository`].
//! 3. **Engine**: driven with [`sync::HeadlessViewFactory`], no screen needed.
//! 4. **Filesystem**: integration tests under `tests/` on a temp dir.
//!
//! ## Module Overview
//!
//! - [`background`]: page backdrops, colors and pattern tiles
//! - [`codec`]: document persistence format
//! - [`config`]: layered configuration
//! - [`editor`]: facade over store and engine
//! - [`error`]: crate error type
//! - [`geometry`]: points, sizes and rects
//! - [`markup`]: drawable payload and its blob format
//! - [`model`]: pages, documents and edit modes
//! - [`repository`]: where documents are stored
//! - [`store`]: state, actions, reducer and middleware
//! - [`sync`]: page view reconciliation and layout

pub mod background;
pub mod codec;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod markup;
pub mod model;
pub mod repository;
pub mod store;
pub mod sync;

#[cfg(test)]
mod test_utils;
