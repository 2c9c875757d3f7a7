//! Moving average polylines over the visible bars

use super::{FrameContext, Renderer, RendererKind};
use crate::analysis::{ma_bar_index, ma_index_range};
use crate::pane::PaneId;
use crate::surface::Surface;
use crate::viewport::bar_center_x;

pub struct MovingAverageRenderer {
    /// `(period, colour)` pairs
    lines: Vec<(usize, &'static str)>,
}

impl MovingAverageRenderer {
    pub fn new(lines: Vec<(usize, &'static str)>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[(usize, &'static str)] {
        &self.lines
    }
}

impl Renderer for MovingAverageRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::MovingAverage
    }

    fn applies_to(&self, pane: PaneId) -> bool {
        pane == PaneId::Main
    }

    fn render(&self, surface: &mut dyn Surface, frame: &mut FrameContext<'_>) {
        let range = frame.pane.price_range;
        if frame.series.is_empty() || !range.is_finite() || range.max_price <= range.min_price {
            return;
        }

        let scale = frame.pane.scale();

        surface.save();
        surface.translate(-frame.scroll_left, 0.0);
        surface.set_line_width(2.0 / frame.dpr);

        for &(period, color) in &self.lines {
            let values = frame.moving_averages.get(frame.series, period);
            let (ma_start, ma_end) = ma_index_range(frame.range.start, frame.range.end, period, values.len());
            if ma_start >= ma_end {
                continue;
            }

            surface.set_stroke_style(color);
            surface.begin_path();
            let mut started = false;

            for (offset, value) in values[ma_start..ma_end].iter().enumerate() {
                if !value.is_finite() {
                    continue;
                }
                let y = scale.price_to_y(*value);
                let x = bar_center_x(ma_bar_index(ma_start + offset, period), frame.k_width, frame.k_gap);
                if started {
                    surface.line_to(x, y);
                } else {
                    surface.move_to(x, y);
                    started = true;
                }
            }

            if started {
                surface.stroke();
            }
        }

        surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_support::Harness;
    use crate::surface::{DrawCommand, RecordingSurface};
    use kline_core::colors;

    #[test]
    fn test_path_starts_at_first_full_window() {
        let mut harness = Harness::scenario();
        let renderer = MovingAverageRenderer::new(vec![(3, colors::MA5), (20, colors::MA20)]);
        let mut surface = RecordingSurface::new();
        renderer.render(&mut surface, &mut harness.frame());

        // MA3 has three values for bars 2..=4; MA20 has none
        let moves = surface.count(|c| matches!(c, DrawCommand::MoveTo { .. }));
        let lines = surface.count(|c| matches!(c, DrawCommand::LineTo { .. }));
        assert_eq!((moves, lines), (1, 2));
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::Stroke)), 1);

        let first = surface
            .commands()
            .iter()
            .find_map(|c| match c {
                DrawCommand::MoveTo { x, y } => Some((*x, *y)),
                _ => None,
            })
            .unwrap();
        // bar 2 centre, mean close (98 + 95 + 94) / 3
        assert_eq!(first.0, 26.0);
        let expected_y = harness.pane.price_to_y((98.0 + 95.0 + 94.0) / 3.0);
        assert!((first.1 - expected_y).abs() < 1e-9);
        assert!(surface.is_balanced());
    }
}
