//! # Page Sync Engine
//!
//! Keeps a registry of page views in agreement with a [`Document`], lays the
//! views out as a vertical stack inside a scrollable container, tracks which
//! page the user is looking at, and broadcasts the edit mode to every view.
//!
//! ## Reconciliation
//!
//! Assigning a document (or resizing the container) runs [`PageSyncEngine::refresh`]:
//!
//! 1. **Evict**: views whose page id is no longer in the document are
//!    released and dropped.
//! 2. **Create or reuse**: every page gets exactly one view, keyed by id. A
//!    view is only created the first time its id shows up.
//! 3. **Size**: display width is the container width minus padding, display
//!    height follows the page's own aspect ratio.
//! 4. **Rescale**: when a view's content width differs from its display width
//!    by more than the epsilon, its content is uniformly scaled by
//!    `new / old`. Content is transformed, never recreated.
//! 5. **Stack**: frames are laid out top to bottom with fixed spacing; the
//!    sum is the content height.
//! 6. **Scroll**: if any view was created, the last new one is scrolled to.
//! 7. **Mode**: tool visibility and drawing flags are re-applied.
//!
//! Views are addressed by id only. They never reference the engine back.
//!
//! ## Current Page
//!
//! The current page is the one whose frame contains the viewport's center,
//! or failing that the one with the largest overlap. The `on_page_changed`
//! callback fires only when that page differs from the last one signaled.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::config::EditorConfig;
use crate::geometry::{Rect, Size};
use crate::model::{Document, EditMode, MarkupEdits, PageId};

pub mod layout;
pub mod view;

pub use layout::LayoutMetrics;
pub use view::{HeadlessView, HeadlessViewFactory, PageView, ViewFactory};

type PageChanged = Box<dyn FnMut(PageId) + Send>;

pub struct PageSyncEngine<F: ViewFactory> {
    factory: F,
    views: HashMap<PageId, F::View>,
    document: Option<Document>,
    metrics: LayoutMetrics,
    rescale_epsilon: f64,
    container: Size,
    scroll_offset: f64,
    content_height: f64,
    mode: EditMode,
    tools_override: Option<bool>,
    last_signaled: Option<PageId>,
    on_page_changed: PageChanged,
}

impl<F: ViewFactory> PageSyncEngine<F> {
    pub fn new<C>(factory: F, on_page_changed: C) -> Self
    where
        C: FnMut(PageId) + Send + 'static,
    {
        Self {
            factory,
            views: HashMap::new(),
            document: None,
            metrics: LayoutMetrics::default(),
            rescale_epsilon: 1.0,
            container: Size::default(),
            scroll_offset: 0.0,
            content_height: 0.0,
            mode: EditMode::default(),
            tools_override: None,
            last_signaled: None,
            on_page_changed: Box::new(on_page_changed),
        }
    }

    pub fn with_config(mut self, config: &EditorConfig) -> Self {
        self.metrics = config.layout_metrics();
        self.rescale_epsilon = config.rescale_epsilon;
        self
    }

    pub fn with_metrics(mut self, metrics: LayoutMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Replace the document and reconcile.
    pub fn set_document(&mut self, document: Option<Document>) {
        self.document = document;
        self.refresh();
    }

    /// Container size changed (rotation, window resize).
    pub fn resize(&mut self, width: f64, height: f64) {
        self.container = Size::new(width, height);
        self.refresh();
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn view(&self, id: PageId) -> Option<&F::View> {
        self.views.get(&id)
    }

    pub fn view_mut(&mut self, id: PageId) -> Option<&mut F::View> {
        self.views.get_mut(&id)
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    pub fn content_height(&self) -> f64 {
        self.content_height
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Last page reported through `on_page_changed`.
    pub fn current_page(&self) -> Option<PageId> {
        self.last_signaled
    }

    /// Frames in document order.
    pub fn frames(&self) -> Vec<(PageId, Rect)> {
        let Some(document) = self.document.as_ref() else {
            return Vec::new();
        };
        document
            .pages()
            .iter()
            .filter_map(|page| self.views.get(&page.id()).map(|v| (page.id(), v.frame())))
            .collect()
    }

    pub fn refresh(&mut self) {
        let Some(document) = self.document.as_ref() else {
            for (id, mut view) in self.views.drain() {
                debug!(page = %id, "releasing view, no document");
                view.release();
            }
            self.content_height = 0.0;
            self.scroll_offset = 0.0;
            return;
        };

        let live: HashSet<PageId> = document.pages().iter().map(|p| p.id()).collect();
        let stale: Vec<PageId> = self
            .views
            .keys()
            .filter(|id| !live.contains(id))
            .copied()
            .collect();
        for id in stale {
            if let Some(mut view) = self.views.remove(&id) {
                debug!(page = %id, "evicting view for removed page");
                view.release();
            }
        }

        let available = self.metrics.available_width(self.container.width);
        let mut created = Vec::new();
        let mut sizes = Vec::with_capacity(document.len());

        for page in document.pages() {
            let id = page.id();
            let view = match self.views.entry(id) {
                Entry::Occupied(entry) => {
                    let view = entry.into_mut();
                    view.set_background(&page.background);
                    view
                }
                Entry::Vacant(entry) => {
                    debug!(page = %id, "creating view");
                    created.push(id);
                    entry.insert(self.factory.create(page))
                }
            };

            let size = layout::display_size(available, page.size());
            let old_width = view.content_width();
            // No width yet (before the first resize): leave content as loaded.
            let has_width = size.width > 0.0;
            if has_width
                && old_width > 0.0
                && (old_width - size.width).abs() > self.rescale_epsilon
            {
                let factor = size.width / old_width;
                debug!(
                    page = %id,
                    old_width,
                    new_width = size.width,
                    factor,
                    "rescaling page content"
                );
                view.transform_content(factor, size);
            }
            sizes.push(size);
        }

        let (frames, content_height) = layout::stack(&self.metrics, &sizes);
        for (page, frame) in document.pages().iter().zip(frames) {
            if let Some(view) = self.views.get_mut(&page.id()) {
                view.set_frame(frame);
            }
        }
        self.content_height = content_height;

        match created.last().and_then(|id| document.index_of(*id)) {
            Some(index) => self.scroll_to_page(index),
            None => self.scroll_offset = self.clamp_offset(self.scroll_offset),
        }

        self.apply_mode();
        self.update_current_page();
    }

    /// Scroll so the page at `index` starts at the top of the viewport.
    pub fn scroll_to_page(&mut self, index: usize) {
        let Some(id) = self.document.as_ref().and_then(|d| d.pages().get(index)).map(|p| p.id())
        else {
            return;
        };
        let Some(frame) = self.views.get(&id).map(|v| v.frame()) else {
            return;
        };
        self.scroll_offset = layout::scroll_offset_for(
            &frame,
            &self.metrics,
            self.content_height,
            self.container.height,
        );
        if let Some(document) = self.document.as_mut() {
            document.set_current_page_index(index);
        }
    }

    /// End of a scroll gesture at `offset`; re-evaluates the current page.
    pub fn scroll_to(&mut self, offset: f64) {
        self.scroll_offset = self.clamp_offset(offset);
        self.update_current_page();
    }

    pub fn update_mode(&mut self, mode: EditMode) {
        self.mode = mode;
        self.tools_override = None;
        self.apply_mode();
    }

    /// Show or hide the drawing tools on the current page only. The choice
    /// follows the current page until the next `update_mode`.
    pub fn show_tools(&mut self, visible: bool) {
        self.tools_override = Some(visible);
        self.apply_tools();
    }

    /// Appends a blank page shaped like the last one and scrolls to it.
    pub fn add_page(&mut self) -> Option<PageId> {
        let id = self.document.as_mut()?.add_blank_page();
        self.refresh();
        Some(id)
    }

    /// Markup of every page as currently edited in its view.
    pub fn current_markups(&self) -> MarkupEdits {
        self.views
            .iter()
            .filter_map(|(id, view)| view.current_markup().map(|m| (*id, m)))
            .collect()
    }

    fn clamp_offset(&self, offset: f64) -> f64 {
        let max_offset = (self.content_height - self.container.height).max(0.0);
        if offset.is_nan() {
            0.0
        } else {
            offset.clamp(0.0, max_offset)
        }
    }

    fn apply_mode(&mut self) {
        let drawing = self.mode.is_drawing();
        for view in self.views.values_mut() {
            view.set_drawing_enabled(drawing);
        }
        self.apply_tools();
    }

    fn apply_tools(&mut self) {
        match self.tools_override {
            None => {
                let visible = self.mode.is_toolbar_visible();
                for view in self.views.values_mut() {
                    view.set_tools_visible(visible);
                }
            }
            Some(visible) => {
                let current = self
                    .document
                    .as_ref()
                    .map(|d| d.current_page().id());
                for (id, view) in self.views.iter_mut() {
                    view.set_tools_visible(visible && Some(*id) == current);
                }
            }
        }
    }

    fn update_current_page(&mut self) {
        let Some(document) = self.document.as_ref() else {
            return;
        };
        let viewport = Rect::new(
            0.0,
            self.scroll_offset,
            self.container.width,
            self.container.height,
        );
        let frames: Vec<Rect> = document
            .pages()
            .iter()
            .filter_map(|page| self.views.get(&page.id()).map(|v| v.frame()))
            .collect();
        let Some(index) = layout::most_visible(&viewport, &frames) else {
            return;
        };
        let id = document.pages()[index].id();

        if let Some(document) = self.document.as_mut() {
            document.set_current_page_index(index);
        }
        if self.tools_override.is_some() {
            self.apply_tools();
        }
        if self.last_signaled != Some(id) {
            debug!(page = %id, index, "current page changed");
            self.last_signaled = Some(id);
            (self.on_page_changed)(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::Background;
    use crate::geometry::Size;
    use std::sync::{Arc, Mutex};

    type Signals = Arc<Mutex<Vec<PageId>>>;

    fn engine() -> (PageSyncEngine<HeadlessViewFactory>, Signals) {
        let signals: Signals = Arc::new(Mutex::new(Vec::new()));
        let sink = signals.clone();
        let engine = PageSyncEngine::new(HeadlessViewFactory::new(), move |id| {
            sink.lock().unwrap().push(id)
        });
        (engine, signals)
    }

    fn doc(pages: usize, size: Size) -> Document {
        Document::new(pages, size, Background::default())
    }

    #[test]
    fn test_creates_one_view_per_page() {
        let (mut engine, _) = engine();
        engine.resize(600.0, 800.0);
        engine.set_document(Some(doc(3, Size::new(300.0, 500.0))));
        assert_eq!(engine.view_count(), 3);
        assert_eq!(engine.factory().created(), 3);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let (mut engine, _) = engine();
        engine.resize(600.0, 800.0);
        let d = doc(2, Size::new(300.0, 500.0));
        engine.set_document(Some(d.clone()));
        engine.set_document(Some(d));
        engine.refresh();
        assert_eq!(engine.factory().created(), 2);
    }

    #[test]
    fn test_aspect_preserving_rescale() {
        let (mut engine, _) = engine();
        engine.resize(300.0, 800.0);
        let d = doc(1, Size::new(300.0, 500.0));
        let id = d.pages()[0].id();
        engine.set_document(Some(d));
        assert_eq!(engine.view(id).unwrap().markup.content_scale(), 1.0);

        engine.resize(600.0, 800.0);
        let view = engine.view(id).unwrap();
        assert_eq!(view.frame.size, Size::new(600.0, 1000.0));
        assert_eq!(view.markup.bounds(), Size::new(600.0, 1000.0));
        assert!((view.markup.content_scale() - 2.0).abs() < 1e-9);
        assert_eq!(engine.factory().created(), 1);
    }

    #[test]
    fn test_document_before_first_resize_keeps_content_shape() {
        let (mut engine, _) = engine();
        let mut d = doc(1, Size::new(300.0, 500.0));
        let id = d.pages()[0].id();
        engine.set_document(Some(d.clone()));
        assert_eq!(engine.view(id).unwrap().markup.bounds(), Size::new(300.0, 500.0));

        engine.resize(600.0, 800.0);
        let view = engine.view(id).unwrap();
        assert_eq!(view.frame.size, Size::new(600.0, 1000.0));
        assert_eq!(view.markup.bounds(), Size::new(600.0, 1000.0));
        assert!((view.markup.content_scale() - 2.0).abs() < 1e-9);

        d.merge_markups(&engine.current_markups());
        assert_eq!(d.pages()[0].size(), Size::new(600.0, 1000.0));
    }

    #[test]
    fn test_small_width_change_does_not_rescale() {
        let (mut engine, _) = engine();
        engine.resize(600.0, 800.0);
        let d = doc(1, Size::new(600.0, 1000.0));
        let id = d.pages()[0].id();
        engine.set_document(Some(d));
        engine.resize(600.5, 800.0);
        assert_eq!(engine.view(id).unwrap().markup.content_scale(), 1.0);
    }

    #[test]
    fn test_layout_stacks_with_spacing() {
        let (mut engine, _) = engine();
        engine.resize(100.0, 100.0);
        engine.set_document(Some(doc(2, Size::new(100.0, 200.0))));
        let frames = engine.frames();
        assert_eq!(frames[0].1, Rect::new(0.0, 10.0, 100.0, 200.0));
        assert_eq!(frames[1].1, Rect::new(0.0, 220.0, 100.0, 200.0));
        assert_eq!(engine.content_height(), 430.0);
    }

    #[test]
    fn test_removed_pages_are_evicted() {
        let (mut engine, _) = engine();
        engine.resize(100.0, 100.0);
        let mut d = doc(3, Size::new(100.0, 100.0));
        let removed = d.pages()[1].id();
        engine.set_document(Some(d.clone()));

        d.remove_page(1);
        engine.set_document(Some(d));
        assert_eq!(engine.view_count(), 2);
        assert!(engine.view(removed).is_none());
        assert_eq!(engine.factory().created(), 3);
    }

    #[test]
    fn test_clearing_document_releases_all_views() {
        let (mut engine, _) = engine();
        engine.set_document(Some(doc(2, Size::new(100.0, 100.0))));
        engine.set_document(None);
        assert_eq!(engine.view_count(), 0);
        assert_eq!(engine.content_height(), 0.0);
    }

    #[test]
    fn test_new_page_is_scrolled_to() {
        let (mut engine, signals) = engine();
        engine.resize(100.0, 100.0);
        let mut d = doc(3, Size::new(100.0, 100.0));
        engine.set_document(Some(d.clone()));
        // Initial pass creates all three; the last one is the scroll target.
        assert_eq!(engine.scroll_offset(), 220.0);

        engine.scroll_to(0.0);
        let new_id = d.add_blank_page();
        engine.set_document(Some(d));
        // Page 4 starts at 340; offset = 330, max = 450 - 100 = 350.
        assert_eq!(engine.scroll_offset(), 330.0);
        assert_eq!(engine.current_page(), Some(new_id));
        assert_eq!(signals.lock().unwrap().last(), Some(&new_id));
    }

    #[test]
    fn test_scroll_tracks_current_page() {
        let (mut engine, signals) = engine();
        engine.resize(100.0, 100.0);
        let d = doc(3, Size::new(100.0, 100.0));
        let ids = d.page_ids();
        engine.set_document(Some(d));

        engine.scroll_to(0.0);
        assert_eq!(engine.current_page(), Some(ids[0]));
        engine.scroll_to(120.0);
        assert_eq!(engine.current_page(), Some(ids[1]));
        assert_eq!(engine.document().unwrap().current_page_index(), 1);
        assert_eq!(signals.lock().unwrap().last(), Some(&ids[1]));
    }

    #[test]
    fn test_no_duplicate_page_signals() {
        let (mut engine, signals) = engine();
        engine.resize(100.0, 100.0);
        let d = doc(2, Size::new(100.0, 100.0));
        engine.set_document(Some(d.clone()));
        let count = signals.lock().unwrap().len();

        engine.refresh();
        engine.set_document(Some(d));
        engine.scroll_to(engine.scroll_offset());
        assert_eq!(signals.lock().unwrap().len(), count);
    }

    #[test]
    fn test_mode_is_broadcast_to_every_view() {
        let (mut engine, _) = engine();
        engine.resize(100.0, 100.0);
        engine.set_document(Some(doc(3, Size::new(100.0, 100.0))));

        engine.update_mode(EditMode::Write);
        for (id, _) in engine.frames() {
            let view = engine.view(id).unwrap();
            assert!(view.tools_visible);
            assert!(view.drawing_enabled);
        }

        engine.update_mode(EditMode::Focus);
        for (id, _) in engine.frames() {
            let view = engine.view(id).unwrap();
            assert!(!view.tools_visible);
            assert!(view.drawing_enabled);
        }

        engine.update_mode(EditMode::Read);
        for (id, _) in engine.frames() {
            let view = engine.view(id).unwrap();
            assert!(!view.tools_visible);
            assert!(!view.drawing_enabled);
        }
    }

    #[test]
    fn test_new_views_pick_up_current_mode() {
        let (mut engine, _) = engine();
        engine.resize(100.0, 100.0);
        engine.update_mode(EditMode::Write);
        let d = doc(1, Size::new(100.0, 100.0));
        let id = d.pages()[0].id();
        engine.set_document(Some(d));
        assert!(engine.view(id).unwrap().drawing_enabled);
        assert!(engine.view(id).unwrap().tools_visible);
    }

    #[test]
    fn test_show_tools_targets_current_page() {
        let (mut engine, _) = engine();
        engine.resize(100.0, 100.0);
        let d = doc(3, Size::new(100.0, 100.0));
        let ids = d.page_ids();
        engine.set_document(Some(d));
        engine.scroll_to(0.0);

        engine.show_tools(true);
        assert!(engine.view(ids[0]).unwrap().tools_visible);
        assert!(!engine.view(ids[1]).unwrap().tools_visible);

        engine.scroll_to(120.0);
        assert!(!engine.view(ids[0]).unwrap().tools_visible);
        assert!(engine.view(ids[1]).unwrap().tools_visible);
    }

    #[test]
    fn test_add_page_through_engine() {
        let (mut engine, _) = engine();
        engine.resize(100.0, 100.0);
        engine.set_document(Some(doc(1, Size::new(100.0, 100.0))));
        let id = engine.add_page().unwrap();
        assert_eq!(engine.view_count(), 2);
        assert_eq!(engine.current_page(), Some(id));
    }

    #[test]
    fn test_current_markups_reflect_drawing() {
        let (mut engine, _) = engine();
        engine.resize(100.0, 100.0);
        let d = doc(2, Size::new(100.0, 100.0));
        let id = d.pages()[1].id();
        engine.set_document(Some(d));
        engine.view_mut(id).unwrap().draw(b"ink");

        let markups = engine.current_markups();
        assert_eq!(markups.len(), 2);
        assert_eq!(markups[&id].payload(), b"ink");
    }
}
