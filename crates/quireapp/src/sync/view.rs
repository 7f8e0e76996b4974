//! Page-view handles driven by the sync engine.
//!
//! The engine owns every view and looks them up by page id; a view never
//! holds a reference back to the engine or to the document. A UI toolkit
//! plugs in by implementing [`PageView`] for its surface and [`ViewFactory`]
//! to build them. [`HeadlessView`] is a complete in-memory implementation for
//! tests and for running the editor without a screen.

use crate::background::Background;
use crate::geometry::{Rect, Size};
use crate::markup::Markup;
use crate::model::{Page, PageId};

pub trait PageView {
    /// Frame in content coordinates.
    fn frame(&self) -> Rect;
    fn set_frame(&mut self, frame: Rect);

    /// Width of the markup content currently shown.
    fn content_width(&self) -> f64;

    /// Uniformly rescale the drawn content and adopt `bounds`.
    fn transform_content(&mut self, factor: f64, bounds: Size);

    fn set_background(&mut self, background: &Background);
    fn set_tools_visible(&mut self, visible: bool);
    fn set_drawing_enabled(&mut self, enabled: bool);

    /// Markup as currently edited in this view.
    fn current_markup(&self) -> Option<Markup>;

    /// Free toolkit resources. Called once, right before the view is dropped.
    fn release(&mut self);
}

pub trait ViewFactory {
    type View: PageView;

    fn create(&mut self, page: &Page) -> Self::View;
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessView {
    pub page_id: PageId,
    pub frame: Rect,
    pub markup: Markup,
    pub background: Background,
    pub tools_visible: bool,
    pub drawing_enabled: bool,
    pub released: bool,
}

impl HeadlessView {
    pub fn new(page: &Page) -> Self {
        Self {
            page_id: page.id(),
            frame: Rect::from_size(page.size()),
            markup: page.markup.clone(),
            background: page.background,
            tools_visible: false,
            drawing_enabled: false,
            released: false,
        }
    }

    /// Simulates the user drawing into the page.
    pub fn draw(&mut self, payload: &[u8]) {
        let mut data = self.markup.payload().to_vec();
        data.extend_from_slice(payload);
        self.markup.set_payload(data);
    }
}

impl PageView for HeadlessView {
    fn frame(&self) -> Rect {
        self.frame
    }

    fn set_frame(&mut self, frame: Rect) {
        self.frame = frame;
    }

    fn content_width(&self) -> f64 {
        self.markup.bounds().width
    }

    fn transform_content(&mut self, factor: f64, bounds: Size) {
        self.markup.transform_content(factor, bounds);
    }

    fn set_background(&mut self, background: &Background) {
        self.background = *background;
    }

    fn set_tools_visible(&mut self, visible: bool) {
        self.tools_visible = visible;
    }

    fn set_drawing_enabled(&mut self, enabled: bool) {
        self.drawing_enabled = enabled;
    }

    fn current_markup(&self) -> Option<Markup> {
        Some(self.markup.clone())
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Builds [`HeadlessView`]s and counts how many it has made.
#[derive(Debug, Default)]
pub struct HeadlessViewFactory {
    created: usize,
}

impl HeadlessViewFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        self.created
    }
}

impl ViewFactory for HeadlessViewFactory {
    type View = HeadlessView;

    fn create(&mut self, page: &Page) -> HeadlessView {
        self.created += 1;
        HeadlessView::new(page)
    }
}
