//! Candle bodies, wicks and volume/price relation markers

use super::{FrameContext, Renderer, RendererKind};
use crate::analysis::VolumePriceRelation;
use crate::marker::{MarkerEntity, MarkerId, MarkerShape, MarkerState};
use crate::pane::PaneId;
use crate::pixel::{create_aligned_kline_from_px, create_vertical_line_rect, physical_kline_config};
use crate::surface::Surface;
use kline_core::{Rect, colors};

/// Distance between a marker centre and the bar's high (or low)
pub const MARKER_OFFSET: f64 = 15.0;

pub struct CandleRenderer;

impl Renderer for CandleRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Candle
    }

    fn applies_to(&self, pane: PaneId) -> bool {
        pane == PaneId::Main
    }

    fn render(&self, surface: &mut dyn Surface, frame: &mut FrameContext<'_>) {
        let bars = frame.series.as_slice();
        if bars.is_empty() || !frame.pane.price_range.is_finite() {
            return;
        }

        let dpr = frame.dpr;
        let scale = frame.pane.scale();
        let k_width_px = physical_kline_config(frame.k_width, frame.k_gap, dpr).k_width_px;
        let relations = frame.volume_price.relations(frame.series, frame.range);

        surface.save();
        surface.translate(-frame.scroll_left, 0.0);

        for (index, relation) in relations {
            let Some(bar) = bars.get(index) else { continue };
            if !bar.is_finite() {
                continue;
            }
            let Some(left) = frame.position_of(index) else {
                continue;
            };

            let open_y = scale.price_to_y(bar.open);
            let close_y = scale.price_to_y(bar.close);
            let high_y = scale.price_to_y(bar.high);
            let low_y = scale.price_to_y(bar.low);

            let raw_y = open_y.min(close_y);
            let raw_height = (open_y - close_y).abs().max(1.0);
            let aligned = create_aligned_kline_from_px((left * dpr).round() as i64, raw_y, k_width_px, raw_height, dpr);
            let body = aligned.body_rect;

            surface.set_fill_style(bar.fill_color());
            surface.fill_rect(body.x, body.y, body.width, body.height);

            if bar.high > bar.body_top() {
                if let Some(wick) = create_vertical_line_rect(aligned.wick_x, high_y, body.y, dpr) {
                    surface.fill_rect(wick.x, wick.y, aligned.wick_width, wick.height);
                }
            }
            if bar.low < bar.body_bottom() {
                if let Some(wick) = create_vertical_line_rect(aligned.wick_x, body.bottom(), low_y, dpr) {
                    surface.fill_rect(wick.x, wick.y, aligned.wick_width, wick.height);
                }
            }

            if !relation.is_marked() {
                continue;
            }

            let marker_x = body.x + body.width / 2.0;
            let marker_y = if relation.is_rising() {
                high_y - MARKER_OFFSET
            } else {
                low_y + MARKER_OFFSET
            };
            let id = MarkerId::volume_price(index);
            let side = frame.k_width;
            let height = triangle_height(side);

            let hovered = match frame.markers.as_deref_mut() {
                Some(registry) => {
                    let description = registry
                        .description(relation.name())
                        .unwrap_or(relation.description())
                        .to_string();
                    registry.register(MarkerEntity {
                        id,
                        shape: MarkerShape::Triangle,
                        marker_type: relation.name().to_string(),
                        bounds: Rect::new(
                            marker_x - side / 2.0,
                            frame.pane.top + marker_y - height / 2.0,
                            side,
                            height,
                        ),
                        data_index: index,
                        metadata: serde_json::json!({
                            "relation": relation,
                            "description": description,
                            "volume": bar.volume,
                        }),
                    });
                    registry.state(id) == MarkerState::Hovered
                }
                None => false,
            };

            draw_volume_price_marker(surface, marker_x, marker_y, relation, side, hovered);
        }

        surface.restore();
    }
}

/// Height of an equilateral triangle with side `side`
pub fn triangle_height(side: f64) -> f64 {
    side * 3.0_f64.sqrt() / 2.0
}

/// Equilateral triangle centred on `(x, y)`: apex up for rising relations,
/// down for falling ones
pub fn draw_volume_price_marker(
    surface: &mut dyn Surface,
    x: f64,
    y: f64,
    relation: VolumePriceRelation,
    side: f64,
    hovered: bool,
) {
    if !relation.is_marked() {
        return;
    }

    let color = if relation.is_with_volume() {
        colors::MARKER_WITH_VOLUME
    } else {
        colors::MARKER_WITHOUT_VOLUME
    };
    let half_h = triangle_height(side) / 2.0;
    let half_s = side / 2.0;

    surface.save();
    surface.begin_path();
    if relation.is_rising() {
        surface.move_to(x, y - half_h);
        surface.line_to(x - half_s, y + half_h);
        surface.line_to(x + half_s, y + half_h);
    } else {
        surface.move_to(x, y + half_h);
        surface.line_to(x - half_s, y - half_h);
        surface.line_to(x + half_s, y - half_h);
    }
    surface.close_path();
    surface.set_fill_style(color);
    surface.fill();

    if hovered {
        surface.set_stroke_style(colors::MARKER_OUTLINE);
        surface.set_line_width(1.0);
        surface.stroke();
    }
    surface.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_support::Harness;
    use crate::surface::{DrawCommand, RecordingSurface};

    #[test]
    fn test_draws_one_body_per_bar() {
        let mut harness = Harness::scenario();
        let mut surface = RecordingSurface::new();
        CandleRenderer.render(&mut surface, &mut harness.frame());

        assert!(surface.is_balanced());
        // 9px odd body at dpr 1
        let bodies = surface
            .fill_rects()
            .into_iter()
            .filter(|(_, _, w, _)| *w == 9.0)
            .count();
        assert_eq!(bodies, 5);
        assert_eq!(surface.commands()[1], DrawCommand::Translate { x: -0.0, y: 0.0 });
    }

    #[test]
    fn test_registers_volume_price_markers() {
        let mut harness = Harness::scenario();
        let mut surface = RecordingSurface::new();
        CandleRenderer.render(&mut surface, &mut harness.frame());

        // bar 1 has no full window yet (average 0), bar 3 rises on 30 vs
        // average 16.7, bar 4 rises on 2 vs average 14
        let ids: Vec<usize> = harness.markers.all_markers().map(|m| m.data_index).collect();
        assert_eq!(ids, vec![1, 3, 4]);

        let falling = harness.markers.get(MarkerId::volume_price(1)).unwrap();
        assert_eq!(falling.marker_type, "fall_with_volume");
        assert!(falling.bounds.y > harness.pane.price_to_y(94.0));

        let marker = harness.markers.get(MarkerId::volume_price(3)).unwrap();
        assert_eq!(marker.marker_type, "rise_with_volume");
        assert_eq!(marker.bounds.width, 8.0);
        // above the high
        let high_y = harness.pane.price_to_y(97.0);
        assert!(marker.bounds.bottom() < high_y);
        assert_eq!(marker.metadata["description"], "Rising on expanding volume");
    }

    #[test]
    fn test_marker_metadata_uses_registered_description() {
        let mut harness = Harness::scenario();
        harness
            .markers
            .register_description("rise_with_volume", "Breakout volume");
        let mut surface = RecordingSurface::new();
        CandleRenderer.render(&mut surface, &mut harness.frame());

        let marker = harness.markers.get(MarkerId::volume_price(3)).unwrap();
        assert_eq!(marker.metadata["description"], "Breakout volume");
        let falling = harness.markers.get(MarkerId::volume_price(1)).unwrap();
        assert_eq!(falling.metadata["description"], "Falling on expanding volume");
    }

    #[test]
    fn test_hovered_marker_gets_outline() {
        let mut harness = Harness::scenario();
        harness.markers.set_hover(Some(MarkerId::volume_price(3)));
        let mut surface = RecordingSurface::new();
        CandleRenderer.render(&mut surface, &mut harness.frame());

        let outlines = surface.count(|c| matches!(c, DrawCommand::StrokeStyle(s) if s == colors::MARKER_OUTLINE));
        assert_eq!(outlines, 1);
    }

    #[test]
    fn test_skips_non_finite_bars() {
        let mut harness = Harness::scenario();
        let mut bars = harness.series.as_slice().to_vec();
        bars[2] = kline_core::Bar::new(2, f64::NAN, f64::NAN, f64::NAN, f64::NAN, 0.0);
        harness.series.replace(bars);

        let mut surface = RecordingSurface::new();
        CandleRenderer.render(&mut surface, &mut harness.frame());
        let bodies = surface.fill_rects().into_iter().filter(|(_, _, w, _)| *w == 9.0).count();
        assert_eq!(bodies, 4);
    }

    #[test]
    fn test_empty_series_draws_nothing() {
        let mut harness = Harness::scenario();
        harness.series.clear();
        let mut surface = RecordingSurface::new();
        CandleRenderer.render(&mut surface, &mut harness.frame());
        assert!(surface.commands().is_empty());
    }
}
