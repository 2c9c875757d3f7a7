//! # render
//!
//! Pane renderers: an ordered strategy list run once per pane per frame.
//!
//! Plot-layer renderers run with the surface translated to the pane top and
//! clipped to the pane; Y is pane local and X is screen local (renderers
//! that work in world X translate by `-scroll_left` themselves). Axis-layer
//! renderers run unclipped with the same vertical translation.

pub mod candle;
pub mod extrema;
pub mod grid;
pub mod last_price;
pub mod ma_lines;
pub mod overlay;
pub mod price_axis;
pub mod volume;

pub use candle::*;
pub use extrema::*;
pub use grid::*;
pub use last_price::*;
pub use ma_lines::*;
pub use overlay::*;
pub use price_axis::*;
pub use volume::*;

use crate::analysis::{MovingAverageCache, VolumePriceAnalyzer};
use crate::config::ChartOptions;
use crate::marker::MarkerRegistry;
use crate::pane::{Pane, PaneId};
use crate::surface::Surface;
use kline_core::{BarSeries, VisibleRange};

/// Font used for every chart label
pub const LABEL_FONT: &str = "12px Arial";
pub const LABEL_FONT_BOLD: &str = "bold 12px Arial";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererKind {
    Candle,
    Volume,
    Grid,
    MovingAverage,
    Extrema,
    LastPrice,
    Axis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Inside the pane clip
    Plot,
    /// In the right-hand axis gutter
    Axis,
}

/// Everything a renderer may read for one pane in one frame
pub struct FrameContext<'a> {
    pub pane: &'a Pane,
    pub series: &'a BarSeries,
    pub range: VisibleRange,
    pub scroll_left: f64,
    pub k_width: f64,
    pub k_gap: f64,
    pub dpr: f64,
    /// Plot width (excludes the price axis gutter)
    pub pane_width: f64,
    pub axis_width: f64,
    /// Logical left edge of bar `range.start + i`, device-pixel snapped
    pub k_line_positions: &'a [f64],
    pub markers: Option<&'a mut MarkerRegistry>,
    pub moving_averages: &'a mut MovingAverageCache,
    pub volume_price: &'a mut VolumePriceAnalyzer,
}

impl FrameContext<'_> {
    pub fn unit(&self) -> f64 {
        self.k_width + self.k_gap
    }

    /// Logical left edge of bar `index`, if visible
    pub fn position_of(&self, index: usize) -> Option<f64> {
        index
            .checked_sub(self.range.start)
            .and_then(|i| self.k_line_positions.get(i))
            .copied()
    }
}

// ============================================================================
// STRATEGY PATTERN: Renderer Trait
// ============================================================================

pub trait Renderer {
    fn kind(&self) -> RendererKind;

    fn layer(&self) -> Layer {
        Layer::Plot
    }

    fn applies_to(&self, _pane: PaneId) -> bool {
        true
    }

    fn render(&self, surface: &mut dyn Surface, frame: &mut FrameContext<'_>);
}

/// Renderer list in draw order for `options`
pub fn default_pipeline(options: &ChartOptions) -> Vec<Box<dyn Renderer>> {
    let mut pipeline: Vec<Box<dyn Renderer>> = Vec::new();

    if options.show_grid {
        pipeline.push(Box::new(GridRenderer));
    }
    pipeline.push(Box::new(CandleRenderer));
    pipeline.push(Box::new(VolumeRenderer));

    let averages = options.moving_averages.enabled();
    if !averages.is_empty() {
        pipeline.push(Box::new(MovingAverageRenderer::new(averages)));
    }
    if options.show_last_price {
        pipeline.push(Box::new(LastPriceRenderer));
    }
    if options.show_extrema {
        pipeline.push(Box::new(ExtremaRenderer));
    }
    pipeline.push(Box::new(PriceAxisRenderer::default()));

    pipeline
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::pane::{PaneSpec, layout_panes};
    use crate::viewport::{get_visible_price_range, get_visible_range, kline_positions};
    use kline_core::Bar;

    pub fn scenario_series() -> BarSeries {
        BarSeries::from_bars(vec![
            Bar::new(0, 100.0, 101.0, 97.0, 98.0, 10.0),
            Bar::new(1, 98.0, 99.0, 94.0, 95.0, 10.0),
            Bar::new(2, 95.0, 96.0, 92.0, 94.0, 10.0),
            Bar::new(3, 94.0, 97.0, 93.0, 96.0, 30.0),
            Bar::new(4, 96.0, 100.0, 95.0, 99.0, 2.0),
        ])
    }

    /// Main pane 100px tall, no padding, scenario range
    pub fn main_pane(series: &BarSeries) -> Pane {
        let mut pane = layout_panes(100.0, &[PaneSpec::main()], 0.0, 0.0).remove(0);
        pane.set_price_range(get_visible_price_range(series.as_slice(), 0, series.len()));
        pane
    }

    pub struct Harness {
        pub series: BarSeries,
        pub pane: Pane,
        pub range: VisibleRange,
        pub positions: Vec<f64>,
        pub markers: MarkerRegistry,
        pub ma: MovingAverageCache,
        pub vp: VolumePriceAnalyzer,
    }

    impl Harness {
        pub fn new(series: BarSeries, pane: Pane) -> Self {
            let range = get_visible_range(0.0, 100.0, 8.0, 2.0, series.len());
            let positions = kline_positions(range, 8.0, 2.0, 1.0);
            Self {
                series,
                pane,
                range,
                positions,
                markers: MarkerRegistry::new(),
                ma: MovingAverageCache::new(),
                vp: VolumePriceAnalyzer::new(
                    crate::analysis::VolumePriceConfig::default().with_period(3),
                ),
            }
        }

        pub fn scenario() -> Self {
            let series = scenario_series();
            let pane = main_pane(&series);
            Self::new(series, pane)
        }

        pub fn frame(&mut self) -> FrameContext<'_> {
            FrameContext {
                pane: &self.pane,
                series: &self.series,
                range: self.range,
                scroll_left: 0.0,
                k_width: 8.0,
                k_gap: 2.0,
                dpr: 1.0,
                pane_width: 100.0,
                axis_width: 60.0,
                k_line_positions: &self.positions,
                markers: Some(&mut self.markers),
                moving_averages: &mut self.ma,
                volume_price: &mut self.vp,
            }
        }
    }
}
