//! # Domain Model: Pages and Documents
//!
//! This module defines the core data structures: [`Page`], [`Document`] and
//! [`EditMode`].
//!
//! ## Ownership
//!
//! A [`Document`] is a plain owned value. It owns its pages outright and is
//! passed by value (cloned) between the reducer, the middleware and the page
//! sync engine; nothing ever holds a live reference into another
//! component's document. Pages are addressed by their stable [`PageId`].
//!
//! ## Invariants
//!
//! - `pages` is never empty. Constructors floor the page count at 1 and
//!   removing the last remaining page is a no-op.
//! - `0 <= current_page_index < pages.len()` after every mutation.
//! - `add_page`/`remove_page` never reorder pages or reassign ids. A page's
//!   id is assigned once at creation and survives resizes.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::background::Background;
use crate::geometry::Size;
use crate::markup::Markup;

/// Default page size in points (portrait).
pub const DEFAULT_PAGE_SIZE: Size = Size {
    width: 768.0,
    height: 1024.0,
};

/// Stable, never-reused page identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(Uuid);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Pending per-page markup edits collected from the views before a save.
pub type MarkupEdits = HashMap<PageId, Markup>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    #[default]
    Read,
    Write,
    Focus,
}

impl EditMode {
    /// Whether page views accept drawing input.
    pub fn is_drawing(&self) -> bool {
        *self != EditMode::Read
    }

    /// Whether drawing tools are shown.
    pub fn is_toolbar_visible(&self) -> bool {
        *self == EditMode::Write
    }

    /// `read <-> write`; `focus` is a fixed point.
    pub fn toggled(self) -> Self {
        match self {
            EditMode::Read => EditMode::Write,
            EditMode::Write => EditMode::Read,
            EditMode::Focus => EditMode::Focus,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    id: PageId,
    pub markup: Markup,
    pub background: Background,
}

impl Page {
    pub fn new(size: Size, background: Background) -> Self {
        Self {
            id: PageId::new(),
            markup: Markup::new(size),
            background,
        }
    }

    /// Rebuild a page with a known id (used when decoding).
    pub fn with_id(id: PageId, markup: Markup, background: Background) -> Self {
        Self {
            id,
            markup,
            background,
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    /// The page's own size, taken from its markup bounds.
    pub fn size(&self) -> Size {
        self.markup.bounds()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pages: Vec<Page>,
    current_page_index: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl Document {
    /// `page_count` blank pages of `page_size`; at least one page is created.
    pub fn new(page_count: usize, page_size: Size, background: Background) -> Self {
        let pages = (0..page_count.max(1))
            .map(|_| Page::new(page_size, background))
            .collect();
        Self {
            pages,
            current_page_index: 0,
        }
    }

    /// The document substituted when nothing could be loaded: one blank page.
    pub fn empty() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE, Background::default())
    }

    /// Assemble a document from decoded parts. Returns `None` for an empty
    /// page list; an out-of-range cursor is clamped.
    pub fn from_pages(pages: Vec<Page>, current_page_index: usize) -> Option<Self> {
        if pages.is_empty() {
            return None;
        }
        let current_page_index = current_page_index.min(pages.len() - 1);
        Some(Self {
            pages,
            current_page_index,
        })
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn current_page_index(&self) -> usize {
        self.current_page_index
    }

    pub fn current_page(&self) -> &Page {
        &self.pages[self.current_page_index]
    }

    /// Moves the cursor, clamping to the last page.
    pub fn set_current_page_index(&mut self, index: usize) {
        self.current_page_index = index.min(self.pages.len() - 1);
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn page_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == id)
    }

    pub fn index_of(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|p| p.id == id)
    }

    pub fn last_page(&self) -> &Page {
        &self.pages[self.pages.len() - 1]
    }

    /// Appends `page` after every existing page.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Appends a blank page shaped like the current last page and returns its id.
    pub fn add_blank_page(&mut self) -> PageId {
        let last = self.last_page();
        let page = Page::new(last.size(), last.background);
        let id = page.id;
        self.add_page(page);
        id
    }

    /// Removes the page at `index`. No-op (returns `None`) when it is the only
    /// page or `index` is out of range.
    pub fn remove_page(&mut self, index: usize) -> Option<Page> {
        if self.pages.len() <= 1 || index >= self.pages.len() {
            return None;
        }
        let removed = self.pages.remove(index);
        if self.current_page_index >= self.pages.len() {
            self.current_page_index = self.pages.len() - 1;
        }
        Some(removed)
    }

    pub fn remove_current_page(&mut self) -> Option<Page> {
        self.remove_page(self.current_page_index)
    }

    /// Replaces the background of the page at `index`. Returns false when out of range.
    pub fn set_background(&mut self, index: usize, background: Background) -> bool {
        match self.pages.get_mut(index) {
            Some(page) => {
                page.background = background;
                true
            }
            None => false,
        }
    }

    /// Writes each edit into the page with the matching id. Edits for ids not
    /// in this document are ignored. Returns the number of pages updated.
    pub fn merge_markups(&mut self, edits: &MarkupEdits) -> usize {
        let mut merged = 0;
        for page in &mut self.pages {
            if let Some(markup) = edits.get(&page.id) {
                page.markup = markup.clone();
                merged += 1;
            }
        }
        merged
    }

    pub fn page_ids(&self) -> Vec<PageId> {
        self.pages.iter().map(|p| p.id).collect()
    }
}
