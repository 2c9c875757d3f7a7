//! Tooltip placement and the hover snapshot handed to the host

use kline_charts::{Crosshair, MarkerId, PaneId};
use kline_core::{Point, Size};

/// Distance kept from the viewport edges
pub const TOOLTIP_PADDING: f64 = 12.0;
/// Distance between pointer and tooltip
pub const TOOLTIP_GAP: f64 = 14.0;
pub const DEFAULT_TOOLTIP_SIZE: Size = Size::new(220.0, 180.0);

/// Tooltip origin for a pointer at `pointer` (container local).
///
/// Prefers the right of the pointer, flips left when that would overflow
/// `view`, then clamps both axes into `[padding, view - size - padding]`.
pub fn place_tooltip(pointer: Point, view: Size, tooltip: Size) -> Point {
    let right_x = pointer.x + TOOLTIP_GAP;
    let left_x = pointer.x - TOOLTIP_GAP - tooltip.width;
    let desired_x = if right_x + tooltip.width + TOOLTIP_PADDING <= view.width {
        right_x
    } else {
        left_x
    };
    let desired_y = pointer.y + TOOLTIP_GAP;

    let max_x = TOOLTIP_PADDING.max(view.width - tooltip.width - TOOLTIP_PADDING);
    let max_y = TOOLTIP_PADDING.max(view.height - tooltip.height - TOOLTIP_PADDING);

    Point::new(
        desired_x.clamp(TOOLTIP_PADDING, max_x),
        desired_y.clamp(TOOLTIP_PADDING, max_y),
    )
}

/// Copy of the controller's hover state for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HoverSnapshot {
    pub crosshair: Option<Crosshair>,
    /// Bar under the pointer's candle body or wick; drives the tooltip
    pub hovered_index: Option<usize>,
    pub active_pane: Option<PaneId>,
    pub tooltip: Point,
    pub hovered_marker: Option<MarkerId>,
}

impl HoverSnapshot {
    pub fn shows_tooltip(&self) -> bool {
        self.hovered_index.is_some()
    }
}
