//! Background grid: evenly spaced horizontals, verticals at month changes

use super::{FrameContext, Renderer, RendererKind};
use crate::pane::PaneId;
use crate::pixel::{create_horizontal_line_rect, create_vertical_line_rect};
use crate::surface::Surface;
use crate::viewport::bar_center_x;
use kline_core::{colors, month_key};

pub struct GridRenderer;

impl GridRenderer {
    pub fn horizontal_count(pane: PaneId) -> usize {
        match pane {
            PaneId::Main => 6,
            _ => 2,
        }
    }
}

impl Renderer for GridRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Grid
    }

    fn render(&self, surface: &mut dyn Surface, frame: &mut FrameContext<'_>) {
        let bars = frame.series.as_slice();
        if bars.is_empty() {
            return;
        }

        let pane = frame.pane;
        let dpr = frame.dpr;
        let count = Self::horizontal_count(pane.id);

        surface.save();
        surface.set_fill_style(colors::GRID);
        surface.translate(-frame.scroll_left, 0.0);

        let start_x = frame.scroll_left;
        let end_x = frame.scroll_left + frame.pane_width;
        let y_start = pane.padding_top;
        let y_end = y_start.max(pane.height - pane.padding_bottom);
        let view_h = (y_end - y_start).max(0.0);

        for i in 0..count {
            let t = if count <= 1 { 0.0 } else { i as f64 / (count - 1) as f64 };
            let y = (y_start + t * view_h).round();
            if let Some(line) = create_horizontal_line_rect(start_x, end_x, y, dpr) {
                surface.fill_rect(line.x, line.y, line.width, line.height);
            }
        }

        let range = frame.range.clamp_to(bars.len());
        for index in range.start.max(1)..range.end {
            let prev = month_key(bars[index - 1].timestamp);
            let cur = month_key(bars[index].timestamp);
            if prev.is_none() || cur.is_none() || prev == cur {
                continue;
            }
            let x = bar_center_x(index, frame.k_width, frame.k_gap);
            if let Some(line) = create_vertical_line_rect(x, 0.0, pane.height, dpr) {
                surface.fill_rect(line.x, line.y, line.width, line.height);
            }
        }

        surface.restore();
    }
}
