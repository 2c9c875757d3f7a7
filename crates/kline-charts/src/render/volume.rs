//! Volume columns for the volume pane

use super::{FrameContext, Renderer, RendererKind};
use crate::pane::PaneId;
use crate::pixel::{create_aligned_kline_from_px, physical_kline_config};
use crate::surface::Surface;

pub struct VolumeRenderer;

impl Renderer for VolumeRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Volume
    }

    fn applies_to(&self, pane: PaneId) -> bool {
        pane == PaneId::Volume
    }

    fn render(&self, surface: &mut dyn Surface, frame: &mut FrameContext<'_>) {
        let bars = frame.series.as_slice();
        if bars.is_empty() || !frame.pane.price_range.is_finite() {
            return;
        }

        let dpr = frame.dpr;
        let scale = frame.pane.scale();
        let k_width_px = physical_kline_config(frame.k_width, frame.k_gap, dpr).k_width_px;
        let base_y = scale.price_to_y(0.0);

        surface.save();
        surface.translate(-frame.scroll_left, 0.0);

        for index in frame.range.clamp_to(bars.len()).iter() {
            let bar = &bars[index];
            if !bar.volume.is_finite() || bar.volume <= 0.0 {
                continue;
            }
            let Some(left) = frame.position_of(index) else {
                continue;
            };

            let top = scale.price_to_y(bar.volume);
            let aligned = create_aligned_kline_from_px(
                (left * dpr).round() as i64,
                top,
                k_width_px,
                (base_y - top).max(1.0),
                dpr,
            );
            let column = aligned.body_rect;

            surface.set_fill_style(bar.fill_color());
            surface.fill_rect(column.x, column.y, column.width, column.height);
        }

        surface.restore();
    }
}
