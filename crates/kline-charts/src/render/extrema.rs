//! Highest high / lowest low callouts for the visible bars

use super::{FrameContext, LABEL_FONT, Renderer, RendererKind};
use crate::pane::PaneId;
use crate::pixel::{create_horizontal_line_rect, round_to_physical_pixel};
use crate::surface::{Surface, TextAlign, TextBaseline};
use crate::viewport::bar_center_x;
use kline_core::{DecimalPriceFormatter, PriceFormatter, colors};
use std::f64::consts::PI;

const LEADER_LENGTH: f64 = 30.0;
const DOT_RADIUS: f64 = 2.0;
const TEXT_PADDING: f64 = 4.0;

pub struct ExtremaRenderer;

/// `(index, price)` of the highest high and lowest low in `[start, end)`.
/// Ties go to the later bar.
pub fn visible_extrema(bars: &[kline_core::Bar], start: usize, end: usize) -> Option<((usize, f64), (usize, f64))> {
    let end = end.min(bars.len());
    if start >= end {
        return None;
    }

    let mut max = (start, f64::NEG_INFINITY);
    let mut min = (start, f64::INFINITY);
    for (index, bar) in bars.iter().enumerate().take(end).skip(start) {
        if bar.high >= max.1 {
            max = (index, bar.high);
        }
        if bar.low <= min.1 {
            min = (index, bar.low);
        }
    }

    if !max.1.is_finite() || !min.1.is_finite() {
        return None;
    }
    Some((max, min))
}

impl Renderer for ExtremaRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Extrema
    }

    fn applies_to(&self, pane: PaneId) -> bool {
        pane == PaneId::Main
    }

    fn render(&self, surface: &mut dyn Surface, frame: &mut FrameContext<'_>) {
        let Some((max, min)) = visible_extrema(frame.series.as_slice(), frame.range.start, frame.range.end) else {
            return;
        };

        let scale = frame.pane.scale();

        surface.save();
        surface.translate(-frame.scroll_left, 0.0);
        for (index, price) in [max, min] {
            let x = bar_center_x(index, frame.k_width, frame.k_gap);
            draw_price_callout(surface, x, scale.price_to_y(price), price, frame.dpr);
        }
        surface.restore();
    }
}

/// Leader line to the right of `(x, y)`, a dot at its end and the price
fn draw_price_callout(surface: &mut dyn Surface, x: f64, y: f64, price: f64, dpr: f64) {
    surface.set_fill_style(colors::CALLOUT_LINE);
    if let Some(line) = create_horizontal_line_rect(x, x + LEADER_LENGTH, y, dpr) {
        surface.fill_rect(line.x, line.y, line.width, line.height);
    }

    let end_x = round_to_physical_pixel(x + LEADER_LENGTH, dpr);
    let aligned_y = round_to_physical_pixel(y, dpr);
    surface.begin_path();
    surface.arc(end_x, aligned_y, DOT_RADIUS, 0.0, PI * 2.0);
    surface.fill();

    surface.set_font(LABEL_FONT);
    surface.set_text_baseline(TextBaseline::Middle);
    surface.set_text_align(TextAlign::Left);
    surface.set_fill_style(colors::CALLOUT_TEXT);
    surface.fill_text(
        &DecimalPriceFormatter::default().format(price),
        round_to_physical_pixel(x + LEADER_LENGTH + TEXT_PADDING, dpr),
        aligned_y,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_support::Harness;
    use crate::surface::RecordingSurface;

    #[test]
    fn test_labels_visible_high_and_low() {
        let mut harness = Harness::scenario();
        let mut surface = RecordingSurface::new();
        ExtremaRenderer.render(&mut surface, &mut harness.frame());

        assert_eq!(surface.texts(), vec!["101.00", "92.00"]);
        assert!(surface.is_balanced());
    }

    #[test]
    fn test_extrema_indices() {
        let harness = Harness::scenario();
        let bars = harness.series.as_slice();
        assert_eq!(visible_extrema(bars, 0, 5), Some(((0, 101.0), (2, 92.0))));
        assert_eq!(visible_extrema(bars, 3, 5), Some(((4, 100.0), (3, 93.0))));
        assert_eq!(visible_extrema(bars, 5, 5), None);
    }
}
