//! # chart
//!
//! The `Chart` facade: owns the bar series, per-instance caches, the marker
//! registry and the renderer list, and runs one draw pass per frame.

use crate::analysis::{MovingAverageCache, VolumePriceAnalyzer};
use crate::config::ChartOptions;
use crate::marker::{MarkerId, MarkerRegistry};
use crate::pane::{Pane, PaneId, layout_panes};
use crate::render::{
    Crosshair, FrameContext, Layer, PriceAxisRenderer, Renderer, TimeAxisFrame, default_pipeline,
    draw_crosshair, draw_crosshair_price_label, draw_crosshair_time_label, draw_global_borders,
    draw_ma_legend, draw_pane_separators, draw_pane_titles, draw_time_axis,
};
use crate::surface::Surface;
use crate::viewport::{
    content_width, get_visible_price_range, get_visible_range, get_visible_volume_range, kline_positions,
};
use crate::ChartDimensions;
use kline_core::{Bar, BarSeries, ConfigError, DecimalPriceFormatter, Rect, VisibleRange};

/// Per-frame input from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Canvas size in CSS pixels, axes included
    pub width: f64,
    pub height: f64,
    pub scroll_left: f64,
    pub dpr: f64,
    pub crosshair: Option<Crosshair>,
}

impl FrameInput {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_left: 0.0,
            dpr: 1.0,
            crosshair: None,
        }
    }

    pub fn scroll_left(mut self, scroll_left: f64) -> Self {
        self.scroll_left = scroll_left;
        self
    }

    pub fn dpr(mut self, dpr: f64) -> Self {
        self.dpr = dpr;
        self
    }

    pub fn crosshair(mut self, crosshair: Option<Crosshair>) -> Self {
        self.crosshair = crosshair;
        self
    }
}

pub struct Chart {
    options: ChartOptions,
    series: BarSeries,
    moving_averages: MovingAverageCache,
    volume_price: VolumePriceAnalyzer,
    markers: MarkerRegistry,
    pipeline: Vec<Box<dyn Renderer>>,
    axis_labels: PriceAxisRenderer,
    panes: Vec<Pane>,
    range: VisibleRange,
}

impl Chart {
    pub fn new(options: ChartOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        Ok(Self {
            pipeline: default_pipeline(&options),
            volume_price: VolumePriceAnalyzer::new(options.volume_price),
            options,
            series: BarSeries::new(),
            moving_averages: MovingAverageCache::new(),
            markers: MarkerRegistry::new(),
            axis_labels: PriceAxisRenderer::default(),
            panes: Vec::new(),
            range: VisibleRange::default(),
        })
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    /// Swap options, rebuilding the renderer list. The current zoom level
    /// is replaced by the new `k_width`.
    pub fn set_options(&mut self, options: ChartOptions) -> Result<(), ConfigError> {
        options.validate()?;
        self.pipeline = default_pipeline(&options);
        self.volume_price.set_config(options.volume_price);
        self.options = options;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------------

    pub fn series(&self) -> &BarSeries {
        &self.series
    }

    pub fn data(&self) -> &[Bar] {
        self.series.as_slice()
    }

    pub fn set_data(&mut self, bars: Vec<Bar>) {
        self.series.replace(bars);
        tracing::debug!(
            bars = self.series.len(),
            generation = self.series.generation(),
            "chart data replaced"
        );
    }

    pub fn push(&mut self, bar: Bar) {
        self.series.push(bar);
        tracing::trace!(bars = self.series.len(), "bar appended");
    }

    pub fn update_last(&mut self, bar: Bar) {
        self.series.update_last(bar);
    }

    // ------------------------------------------------------------------------
    // Frame state
    // ------------------------------------------------------------------------

    /// Panes laid out by the most recent `draw`
    pub fn panes(&self) -> &[Pane] {
        &self.panes
    }

    /// Visible range of the most recent `draw`
    pub fn visible_range(&self) -> VisibleRange {
        self.range
    }

    pub fn markers(&self) -> &MarkerRegistry {
        &self.markers
    }

    pub fn set_hovered_marker(&mut self, id: Option<MarkerId>) {
        self.markers.set_hover(id);
    }

    pub fn dimensions(&self, width: f64, height: f64) -> ChartDimensions {
        ChartDimensions::new(width, height).with_axes(self.options.right_axis_width, self.options.bottom_axis_height)
    }

    /// Scrollable content width for the current bar count and zoom
    pub fn content_width(&self) -> f64 {
        content_width(self.series.len(), self.options.k_width, self.options.k_gap)
    }

    // ------------------------------------------------------------------------
    // Zoom
    // ------------------------------------------------------------------------

    /// Scale the bar width by one wheel notch around `anchor_x` (viewport
    /// local). `delta_y < 0` zooms in. Returns the scroll offset that keeps
    /// the content under the anchor in place.
    pub fn zoom_at(&mut self, anchor_x: f64, scroll_left: f64, delta_y: f64) -> f64 {
        if delta_y == 0.0 || !delta_y.is_finite() || !anchor_x.is_finite() || !scroll_left.is_finite() {
            return scroll_left;
        }

        let old_width = self.options.k_width;
        let factor = if delta_y < 0.0 {
            self.options.zoom_step
        } else {
            1.0 / self.options.zoom_step
        };
        let new_width = (old_width * factor).clamp(self.options.min_k_width, self.options.max_k_width);
        if (new_width - old_width).abs() < f64::EPSILON {
            return scroll_left;
        }

        let k_gap = self.options.k_gap;
        let old_unit = old_width + k_gap;
        // fractional bar position under the anchor
        let anchor_bar = (scroll_left + anchor_x - k_gap) / old_unit;

        self.options.k_width = new_width;
        let new_scroll = (k_gap + anchor_bar * (new_width + k_gap) - anchor_x).max(0.0);

        tracing::debug!(
            old_width,
            new_width,
            anchor_bar,
            scroll_left = new_scroll,
            "zoomed"
        );
        new_scroll
    }

    // ------------------------------------------------------------------------
    // Draw pass
    // ------------------------------------------------------------------------

    pub fn draw(&mut self, surface: &mut dyn Surface, input: &FrameInput) {
        let dims = self.dimensions(input.width, input.height);
        let plot_width = dims.plot_width();
        let plot_height = dims.plot_height();
        let dpr = if input.dpr.is_finite() && input.dpr > 0.0 { input.dpr } else { 1.0 };
        let scroll_left = input.scroll_left.max(0.0);

        let Self {
            options,
            series,
            moving_averages,
            volume_price,
            markers,
            pipeline,
            axis_labels,
            panes,
            range,
        } = self;

        let (k_width, k_gap) = (options.k_width, options.k_gap);
        *range = get_visible_range(scroll_left, plot_width, k_width, k_gap, series.len());
        let positions = kline_positions(*range, k_width, k_gap, dpr);

        *panes = layout_panes(plot_height, &options.panes, options.pane_gap, options.y_padding_px);
        for pane in panes.iter_mut() {
            let band = match pane.id {
                PaneId::Main => get_visible_price_range(series.as_slice(), range.start, range.end),
                PaneId::Volume => get_visible_volume_range(series.as_slice(), range.start, range.end),
            };
            pane.set_price_range(band);
        }

        markers.clear();

        for pane in panes.iter() {
            for layer in [Layer::Plot, Layer::Axis] {
                surface.save();
                surface.translate(0.0, pane.top);
                if layer == Layer::Plot {
                    surface.clip_rect(0.0, 0.0, plot_width, pane.height);
                }

                for renderer in pipeline
                    .iter()
                    .filter(|r| r.layer() == layer && r.applies_to(pane.id))
                {
                    let mut frame = FrameContext {
                        pane,
                        series,
                        range: *range,
                        scroll_left,
                        k_width,
                        k_gap,
                        dpr,
                        pane_width: plot_width,
                        axis_width: options.right_axis_width,
                        k_line_positions: &positions,
                        markers: Some(&mut *markers),
                        moving_averages: &mut *moving_averages,
                        volume_price: &mut *volume_price,
                    };
                    renderer.render(surface, &mut frame);
                }
                surface.restore();
            }
        }

        // chart-level overlays
        draw_pane_separators(surface, dpr, plot_width, panes);
        draw_global_borders(surface, dpr, plot_width, panes);
        draw_pane_titles(surface, panes);

        let formatter = DecimalPriceFormatter::default();
        if let Some(main) = panes.iter().find(|p| p.id == PaneId::Main) {
            let lines = options.moving_averages.enabled();
            draw_ma_legend(surface, series.as_slice(), range.end, &lines, &formatter, main.top);
        }

        let time_axis = TimeAxisFrame {
            rect: Rect::new(0.0, plot_height, plot_width, options.bottom_axis_height),
            scroll_left,
            k_width,
            k_gap,
            dpr,
        };
        if options.bottom_axis_height > 0.0 {
            draw_time_axis(surface, &time_axis, series.as_slice(), *range);
        }

        if let Some(crosshair) = input.crosshair {
            draw_crosshair(surface, plot_width, plot_height, dpr, crosshair.x, crosshair.y);

            let active = crosshair
                .active_pane
                .and_then(|id| panes.iter().find(|p| p.id == id));
            if let Some(pane) = active {
                let gutter = Rect::new(plot_width, pane.top, options.right_axis_width, pane.height);
                let label = |value: f64| axis_labels.label(pane.id, value);
                draw_crosshair_price_label(surface, pane, gutter, crosshair.y, &label, dpr);
            }

            let bar = crosshair.index.and_then(|i| series.get(i));
            if let (Some(bar), true) = (bar, options.bottom_axis_height > 0.0) {
                draw_crosshair_time_label(surface, &time_axis, crosshair.x, bar.timestamp);
            }
        }

        markers.validate_hover_state();
        tracing::trace!(
            start = range.start,
            end = range.end,
            markers = markers.len(),
            "frame drawn"
        );
    }
}
