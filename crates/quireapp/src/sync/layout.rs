//! Layout math for the vertical page stack.

use crate::geometry::{Point, Rect, Size};

/// Height-over-width used for pages with a degenerate size (A-series paper).
pub const FALLBACK_ASPECT_RATIO: f64 = 1.414;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    /// Vertical gap before the first page, between pages and after the last.
    pub page_spacing: f64,
    /// Gap on each side of every page.
    pub horizontal_padding: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            page_spacing: 10.0,
            horizontal_padding: 0.0,
        }
    }
}

impl LayoutMetrics {
    pub fn available_width(&self, container_width: f64) -> f64 {
        (container_width - self.horizontal_padding * 2.0).max(0.0)
    }
}

/// Display size for a page: full available width, height from the page's own
/// aspect ratio.
pub fn display_size(available_width: f64, original: Size) -> Size {
    let ratio = original.aspect_ratio().unwrap_or(FALLBACK_ASPECT_RATIO);
    Size::new(available_width, available_width * ratio)
}

/// Stacks `sizes` top to bottom. Returns the frames and the total content height.
pub fn stack(metrics: &LayoutMetrics, sizes: &[Size]) -> (Vec<Rect>, f64) {
    let mut y = metrics.page_spacing;
    let frames = sizes
        .iter()
        .map(|size| {
            let frame = Rect::new(metrics.horizontal_padding, y, size.width, size.height);
            y += size.height + metrics.page_spacing;
            frame
        })
        .collect();
    (frames, y)
}

/// Offset that brings `frame`'s top edge (plus spacing) into view, clamped to
/// the scrollable range.
pub fn scroll_offset_for(
    frame: &Rect,
    metrics: &LayoutMetrics,
    content_height: f64,
    viewport_height: f64,
) -> f64 {
    let target = (frame.min_y() - metrics.page_spacing).max(0.0);
    let max_offset = (content_height - viewport_height).max(0.0);
    target.min(max_offset)
}

/// Index of the page the viewport is showing: the frame containing the
/// viewport's center, else the frame with the largest overlap, else the first.
pub fn most_visible(viewport: &Rect, frames: &[Rect]) -> Option<usize> {
    if frames.is_empty() {
        return None;
    }
    let center: Point = viewport.center();
    if let Some(index) = frames.iter().position(|f| f.contains(center)) {
        return Some(index);
    }

    let mut best = 0;
    let mut best_area = 0.0;
    for (index, frame) in frames.iter().enumerate() {
        let area = viewport.intersection(frame).map(|r| r.area()).unwrap_or(0.0);
        if area > best_area {
            best_area = area;
            best = index;
        }
    }
    Some(best)
}
