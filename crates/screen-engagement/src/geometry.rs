//! Geometry Module
//!
//! Pure functions turning host-supplied bounding rectangles into scroll depth
//! and page offset measurements. All inputs are CSS pixels as reported by the
//! host layout engine; all outputs are whole pixels or percentages.

use serde::{Deserialize, Serialize};

// ============================================================================
// Rectangles
// ============================================================================

/// Bounding rectangle of an element, relative to the host viewport
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Rect {
    pub fn new(top: f64, bottom: f64, left: f64, right: f64) -> Self {
        Self { top, bottom, left, right }
    }

    /// Rectangle with only a vertical extent (left/right at zero)
    pub fn vertical(top: f64, bottom: f64) -> Self {
        Self::new(top, bottom, 0.0, 0.0)
    }

    /// Height, clamped to zero for collapsed layouts
    pub fn height(&self) -> f64 {
        (self.bottom - self.top).max(0.0)
    }

    /// Width, clamped to zero for collapsed layouts
    pub fn width(&self) -> f64 {
        (self.right - self.left).max(0.0)
    }
}

// ============================================================================
// Element Scroll Depth
// ============================================================================

/// Percentage of an element's height that has scrolled past the bottom edge
/// of its scroll container.
///
/// - Element bottom above the container bottom: 100 (scrolled over the element)
/// - Gap between element bottom and container bottom larger than the element: 0
/// - Otherwise `round(gap / height * 100)`, so an element whose top edge sits
///   exactly on the container bottom reports 100
///
/// Note the measure grows as the element leaves the visible area, not as it enters it.
pub fn scroll_depth_percent(element: &Rect, container: &Rect) -> u8 {
    if element.bottom < container.bottom {
        return 100;
    }

    let height = element.height();
    if height <= 0.0 {
        return 0;
    }

    let gap = element.bottom - container.bottom;
    if gap > height {
        return 0;
    }

    ratio_to_percent(gap / height)
}

fn ratio_to_percent(ratio: f64) -> u8 {
    // NaN saturates to 0 on cast
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

// ============================================================================
// Page Scroll Offsets
// ============================================================================

/// Geometry snapshot of the scroll view taken on every scroll event
///
/// `viewport` is the scroll view itself; `content_top`/`content_bottom` are the
/// positions of marker elements at the very start and end of the scrolled content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub viewport: Rect,
    pub content_top: f64,
    pub content_bottom: f64,
}

impl PageGeometry {
    pub fn new(
        viewport_top: f64,
        content_top: f64,
        content_bottom: f64,
        viewport_bottom: f64,
        viewport_left: f64,
        viewport_right: f64,
    ) -> Self {
        Self {
            viewport: Rect::new(viewport_top, viewport_bottom, viewport_left, viewport_right),
            content_top,
            content_bottom,
        }
    }
}

/// Whole-pixel offsets derived from a [`PageGeometry`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageOffsets {
    pub y_offset: u32,
    pub view_height: u32,
    pub content_width: u32,
    pub content_height: u32,
}

/// Compute the vertical scroll offset and content dimensions
///
/// # Arguments
/// * `geometry` - Scroll view and content marker positions
/// * `border_correction` - Decorative border thickness at the top of the scroll view,
///   added back so an unscrolled view reports offset 0
///
/// The offset is clamped so that `y_offset + view_height` never exceeds the content height.
pub fn page_offsets(geometry: &PageGeometry, border_correction: f64) -> PageOffsets {
    let content_height = (geometry.content_bottom - geometry.content_top).max(0.0);
    let view_height = geometry.viewport.height();
    let content_width = geometry.viewport.width();

    let mut y_offset = (geometry.viewport.top - geometry.content_top + border_correction).max(0.0);
    if content_height < y_offset + view_height {
        y_offset = (content_height - view_height).max(0.0);
    }

    PageOffsets {
        y_offset: to_px(y_offset),
        view_height: to_px(view_height),
        content_width: to_px(content_width),
        content_height: to_px(content_height),
    }
}

fn to_px(value: f64) -> u32 {
    value.max(0.0).round() as u32
}
