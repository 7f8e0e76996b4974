//! Editor state, the action vocabulary and the reducer.

use std::path::PathBuf;

use crate::background::Background;
use crate::model::{Document, EditMode, MarkupEdits, PageId};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditorState {
    /// Where the document lives; set by `Open`.
    pub path: Option<PathBuf>,
    /// Absent until the first `DocumentLoaded`.
    pub document: Option<Document>,
    pub is_loading: bool,
    pub mode: EditMode,
    /// Page the user is looking at, as reported by scroll tracking.
    pub current_page: Option<PageId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Open(PathBuf),
    DocumentLoaded(Document),
    Save(MarkupEdits),
    Saved,
    SavedFailed,
    AddPageTapped,
    RemoveCurrentPage,
    SetBackground {
        page_index: usize,
        background: Background,
    },
    ToggleEditMode,
    SetMode(EditMode),
    PageChanged(PageId),
}

impl Action {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Open(_) => "open",
            Action::DocumentLoaded(_) => "document_loaded",
            Action::Save(_) => "save",
            Action::Saved => "saved",
            Action::SavedFailed => "saved_failed",
            Action::AddPageTapped => "add_page_tapped",
            Action::RemoveCurrentPage => "remove_current_page",
            Action::SetBackground { .. } => "set_background",
            Action::ToggleEditMode => "toggle_edit_mode",
            Action::SetMode(_) => "set_mode",
            Action::PageChanged(_) => "page_changed",
        }
    }
}

/// Pure, total state transition. Never fails; actions that do not apply to
/// the current state leave it unchanged.
pub fn reduce(state: &EditorState, action: &Action) -> EditorState {
    let mut next = state.clone();
    match action {
        Action::Open(path) => {
            next.path = Some(path.clone());
            next.is_loading = true;
        }
        Action::DocumentLoaded(document) => {
            next.document = Some(document.clone());
            next.is_loading = false;
        }
        Action::Save(edits) => {
            if let Some(document) = next.document.as_mut() {
                document.merge_markups(edits);
            }
            next.is_loading = true;
        }
        Action::Saved | Action::SavedFailed => {
            next.is_loading = false;
        }
        Action::AddPageTapped => {
            if let Some(document) = next.document.as_mut() {
                document.add_blank_page();
            }
        }
        Action::RemoveCurrentPage => {
            if let Some(document) = next.document.as_mut() {
                document.remove_current_page();
            }
        }
        Action::SetBackground {
            page_index,
            background,
        } => {
            if let Some(document) = next.document.as_mut() {
                document.set_background(*page_index, *background);
            }
        }
        Action::ToggleEditMode => {
            next.mode = next.mode.toggled();
        }
        Action::SetMode(mode) => {
            next.mode = *mode;
        }
        Action::PageChanged(id) => {
            next.current_page = Some(*id);
            if let Some(document) = next.document.as_mut() {
                if let Some(index) = document.index_of(*id) {
                    document.set_current_page_index(index);
                }
            }
        }
    }
    next
}
