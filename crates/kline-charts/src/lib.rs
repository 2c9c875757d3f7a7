//! # kline-charts
//!
//! Pixel-aligned K-line (candlestick) chart engine for a 2D canvas.
//!
//! ## Architecture
//!
//! Uses Strategy pattern for:
//! - Pane renderers (candles, volume, grid, averages, callouts, axes)
//! - Drawing back ends (`Surface`: HTML canvas or recording)
//! - Label formatting (price, volume)
//!
//! ## Modules
//!
//! - `pixel` - Physical-pixel alignment helpers
//! - `scale` - Price <-> Y mapping within a padded band
//! - `viewport` - Scroll offset -> visible index range and value bands
//! - `analysis` - Volume/price relation classifier, moving averages
//! - `marker` - Per-frame marker registry with hover persistence
//! - `pane` - Pane specs and vertical layout
//! - `render` - Renderer strategy list and chart overlays
//! - `chart` - `Chart` facade: data, caches, draw pass, zoom

pub mod analysis;
pub mod canvas;
pub mod chart;
pub mod config;
pub mod marker;
pub mod pane;
pub mod pixel;
pub mod render;
pub mod scale;
pub mod surface;
pub mod viewport;

pub use analysis::*;
pub use canvas::*;
pub use chart::*;
pub use config::*;
pub use marker::*;
pub use pane::*;
pub use pixel::*;
pub use render::*;
pub use scale::*;
pub use surface::*;
pub use viewport::*;

// Re-export colors from kline-core for convenience
pub use kline_core::colors;

/// Canvas size split into the plot area and the axis gutters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartDimensions {
    pub width: f64,
    pub height: f64,
    /// Price axis gutter on the right
    pub right_axis: f64,
    /// Time axis gutter at the bottom
    pub bottom_axis: f64,
}

impl ChartDimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            right_axis: 0.0,
            bottom_axis: 0.0,
        }
    }

    pub fn with_axes(mut self, right_axis: f64, bottom_axis: f64) -> Self {
        self.right_axis = right_axis;
        self.bottom_axis = bottom_axis;
        self
    }

    /// Plot width (excluding the price axis)
    pub fn plot_width(&self) -> f64 {
        (self.width - self.right_axis).max(0.0)
    }

    /// Plot height (excluding the time axis)
    pub fn plot_height(&self) -> f64 {
        (self.height - self.bottom_axis).max(0.0)
    }

    /// Inclusive test against `[0, plot_width] x [0, plot_height]`
    pub fn in_plot(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && x <= self.plot_width() && y >= 0.0 && y <= self.plot_height()
    }
}

impl Default for ChartDimensions {
    fn default() -> Self {
        Self::new(800.0, 400.0)
    }
}
