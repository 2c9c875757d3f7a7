//! # kline-state
//!
//! Interaction state for the K-line chart: drag-scroll, wheel zoom,
//! crosshair and hover tracking, tooltip placement.
//!
//! Framework independent: the host forwards raw pointer input and exposes
//! its scroll container and [`Chart`] through [`ChartHost`].

pub mod interaction;
pub mod tooltip;

pub use interaction::*;
pub use tooltip::*;

use kline_charts::Chart;
use kline_core::Rect;
use serde::{Deserialize, Serialize};

/// Primary (usually left) pointer button
pub const PRIMARY_BUTTON: i16 = 0;

// ============================================================================
// HOST FACADE
// ============================================================================

/// What the controller needs from the embedding application
pub trait ChartHost {
    fn chart(&self) -> &Chart;

    fn chart_mut(&mut self) -> &mut Chart;

    /// Current horizontal scroll offset of the container
    fn scroll_left(&self) -> f64;

    fn set_scroll_left(&mut self, scroll_left: f64);

    /// Container bounds in client coordinates
    fn container_rect(&self) -> Rect;

    /// Called after a zoom changed the scrollable width, before the new
    /// scroll offset is applied
    fn set_content_width(&mut self, width: f64);

    /// Ask for a redraw; the host coalesces requests to one per frame
    fn schedule_draw(&mut self);
}

// ============================================================================
// INPUT EVENTS
// ============================================================================

/// Pointer position in client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub client_x: f64,
    pub client_y: f64,
    pub button: i16,
}

impl PointerInput {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Self {
            client_x,
            client_y,
            button: PRIMARY_BUTTON,
        }
    }

    pub fn with_button(mut self, button: i16) -> Self {
        self.button = button;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelInput {
    pub client_x: f64,
    pub client_y: f64,
    /// Positive scrolls down (zoom out)
    pub delta_y: f64,
}
