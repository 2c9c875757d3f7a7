//! Right-hand price axis, one segment per pane

use super::{FrameContext, LABEL_FONT, Layer, Renderer, RendererKind};
use crate::pane::PaneId;
use crate::pixel::{align_to_physical_pixel_center, round_to_physical_pixel};
use crate::scale::Scale;
use crate::surface::{Surface, TextAlign, TextBaseline};
use kline_core::{CompactVolumeFormatter, DecimalPriceFormatter, PriceFormatter, VolumeFormatter, colors};

const TEXT_PADDING_X: f64 = 12.0;
const TICK_LENGTH: f64 = 4.0;

/// Tick count for a pane of `height`: one per ~80px, between 2 and 8
pub fn tick_count(height: f64) -> usize {
    (height / 80.0).round().clamp(2.0, 8.0) as usize
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PriceAxisRenderer {
    prices: DecimalPriceFormatter,
    volumes: CompactVolumeFormatter,
}

impl PriceAxisRenderer {
    pub fn new(prices: DecimalPriceFormatter) -> Self {
        Self {
            prices,
            volumes: CompactVolumeFormatter,
        }
    }

    /// Axis text for `value` in `pane`: fixed decimals for prices, compact
    /// suffixes for volumes
    pub fn label(&self, pane: PaneId, value: f64) -> String {
        match pane {
            PaneId::Main => self.prices.format(value),
            PaneId::Volume => self.volumes.format(value),
        }
    }
}

impl Renderer for PriceAxisRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Axis
    }

    fn layer(&self) -> Layer {
        Layer::Axis
    }

    fn render(&self, surface: &mut dyn Surface, frame: &mut FrameContext<'_>) {
        let pane = frame.pane;
        if !pane.price_range.is_finite() || frame.axis_width <= 0.0 {
            return;
        }

        let dpr = frame.dpr;
        let x = frame.pane_width;
        let scale = pane.scale();

        surface.save();
        surface.set_fill_style(colors::AXIS_BG);
        surface.fill_rect(x, 0.0, frame.axis_width, pane.height);

        surface.set_stroke_style(colors::AXIS_LINE);
        surface.set_line_width(1.0);
        let border_x = align_to_physical_pixel_center(x, dpr);
        surface.begin_path();
        surface.move_to(border_x, 0.0);
        surface.line_to(border_x, pane.height);
        surface.stroke();

        surface.set_font(LABEL_FONT);
        surface.set_text_baseline(TextBaseline::Middle);
        surface.set_text_align(TextAlign::Left);

        let text_x = round_to_physical_pixel(x + TEXT_PADDING_X, dpr);
        for price in scale.ticks(tick_count(pane.height)) {
            let y = scale.price_to_y(price);
            let line_y = align_to_physical_pixel_center(y, dpr);

            surface.set_stroke_style(colors::AXIS_LINE);
            surface.begin_path();
            surface.move_to(x, line_y);
            surface.line_to(x + TICK_LENGTH, line_y);
            surface.stroke();

            surface.set_fill_style(colors::AXIS_TEXT);
            surface.fill_text(&self.label(pane.id, price), text_x, round_to_physical_pixel(y, dpr));
        }
        surface.restore();
    }
}
