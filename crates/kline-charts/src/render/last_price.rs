//! Dashed horizontal line at the close of the last visible bar

use super::{FrameContext, Renderer, RendererKind};
use crate::pane::PaneId;
use crate::pixel::{align_to_physical_pixel_center, round_to_physical_pixel};
use crate::surface::Surface;
use crate::viewport::bar_left_x;
use kline_core::colors;

const DASH: [f64; 2] = [4.0, 3.0];

pub struct LastPriceRenderer;

impl Renderer for LastPriceRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::LastPrice
    }

    fn applies_to(&self, pane: PaneId) -> bool {
        pane == PaneId::Main
    }

    fn render(&self, surface: &mut dyn Surface, frame: &mut FrameContext<'_>) {
        let bars = frame.series.as_slice();
        let range = frame.range.clamp_to(bars.len());
        if range.is_empty() {
            return;
        }
        let last_price = bars[range.end - 1].close;
        if !frame.pane.price_range.contains(last_price) {
            return;
        }

        let dpr = frame.dpr;
        let y = align_to_physical_pixel_center(frame.pane.price_to_y(last_price), dpr);
        let start_x = round_to_physical_pixel(bar_left_x(frame.range.start, frame.k_width, frame.k_gap), dpr);
        let end_x = round_to_physical_pixel(bar_left_x(frame.range.end, frame.k_width, frame.k_gap), dpr);

        surface.save();
        surface.translate(-frame.scroll_left, 0.0);
        surface.set_stroke_style(colors::LAST_PRICE);
        surface.set_line_width(1.0);
        surface.set_line_dash(&DASH);
        surface.begin_path();
        surface.move_to(start_x, y);
        surface.line_to(end_x, y);
        surface.stroke();
        surface.set_line_dash(&[]);
        surface.restore();
    }
}
