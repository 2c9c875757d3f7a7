//! Chart-level overlays drawn once per frame after the pane passes:
//! borders, separators, titles, time axis, crosshair and its labels, and
//! the moving average legend. All coordinates are canvas (screen) space.

use super::{LABEL_FONT, LABEL_FONT_BOLD};
use crate::analysis::sma_at;
use crate::pane::{Pane, PaneId};
use crate::pixel::{
    align_to_physical_pixel_center, create_horizontal_line_rect, create_vertical_line_rect,
    round_to_physical_pixel,
};
use crate::surface::{Surface, TextAlign, TextBaseline};
use crate::viewport::bar_left_x;
use kline_core::{Bar, PriceFormatter, Rect, VisibleRange, colors, date_label, month_key, month_or_year_label};

/// Pointer guide state, in plot-local screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crosshair {
    pub x: f64,
    pub y: f64,
    /// Bar the X snapped to, if the pointer is over data
    pub index: Option<usize>,
    /// Pane under the pointer; `None` over an inter-pane gap
    pub active_pane: Option<PaneId>,
}

// ============================================================================
// FRAME DECORATIONS
// ============================================================================

/// One-device-pixel line at the top of every pane after the first
pub fn draw_pane_separators(surface: &mut dyn Surface, dpr: f64, plot_width: f64, panes: &[Pane]) {
    if panes.len() <= 1 {
        return;
    }

    surface.save();
    surface.set_fill_style(colors::SEPARATOR);
    let margin = 0.5 / dpr;
    for pane in &panes[1..] {
        if let Some(line) = create_horizontal_line_rect(0.0, plot_width, pane.top - margin, dpr) {
            surface.fill_rect(line.x, line.y, line.width, line.height);
        }
    }
    surface.restore();
}

/// Outer frame around the stacked panes plus a line at each pane boundary
pub fn draw_global_borders(surface: &mut dyn Surface, dpr: f64, plot_width: f64, panes: &[Pane]) {
    let (Some(first), Some(last)) = (panes.first(), panes.last()) else {
        return;
    };

    let outer_top = panes.iter().map(|p| p.top).fold(f64::INFINITY, f64::min);
    let outer_bottom = panes.iter().map(|p| p.bottom()).fold(f64::NEG_INFINITY, f64::max);

    let x1 = align_to_physical_pixel_center(0.0, dpr);
    let x2 = align_to_physical_pixel_center(plot_width, dpr);
    let y_top = align_to_physical_pixel_center(outer_top, dpr);
    let y_bottom = round_to_physical_pixel(outer_bottom - 0.5, dpr);

    surface.save();
    surface.set_stroke_style(colors::BORDER);
    surface.set_line_width(1.0 / dpr);
    surface.begin_path();

    let top = align_to_physical_pixel_center(first.top, dpr);
    surface.move_to(x1, top);
    surface.line_to(x2, top);

    let bottom = round_to_physical_pixel(last.bottom() - 0.5, dpr);
    surface.move_to(x1, bottom);
    surface.line_to(x2, bottom);

    surface.move_to(x1, y_top);
    surface.line_to(x1, y_bottom);
    surface.move_to(x2, y_top);
    surface.line_to(x2, y_bottom);

    for pane in &panes[1..] {
        let y = align_to_physical_pixel_center(pane.top, dpr);
        surface.move_to(x1, y);
        surface.line_to(x2, y);
    }

    surface.stroke();
    surface.restore();
}

/// Title text in the top-left corner of each pane (empty titles skipped)
pub fn draw_pane_titles(surface: &mut dyn Surface, panes: &[Pane]) {
    surface.save();
    surface.set_font(LABEL_FONT);
    surface.set_text_baseline(TextBaseline::Top);
    surface.set_text_align(TextAlign::Left);
    surface.set_fill_style(colors::TITLE_TEXT);
    for pane in panes.iter().filter(|p| !p.title.is_empty()) {
        surface.fill_text(&pane.title, 8.0, pane.top + 8.0);
    }
    surface.restore();
}

// ============================================================================
// TIME AXIS
// ============================================================================

const TIME_AXIS_PADDING_X: f64 = 12.0;

/// Horizontal layout shared by the time axis and its crosshair label
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAxisFrame {
    /// Axis box in canvas coordinates
    pub rect: Rect,
    pub scroll_left: f64,
    pub k_width: f64,
    pub k_gap: f64,
    pub dpr: f64,
}

/// Month (`MM`) and year (bold `YYYY`) labels at each month change in
/// `range`. Labels closer than the padding to either edge are dropped.
pub fn draw_time_axis(surface: &mut dyn Surface, axis: &TimeAxisFrame, bars: &[Bar], range: VisibleRange) {
    let Rect { x, y, width, height } = axis.rect;
    let dpr = axis.dpr;

    surface.save();
    surface.set_fill_style(colors::AXIS_BG);
    surface.fill_rect(x, y, width, height);

    surface.set_stroke_style(colors::AXIS_LINE);
    surface.set_line_width(1.0);
    let border_y = align_to_physical_pixel_center(y, dpr);
    surface.begin_path();
    surface.move_to(x, border_y);
    surface.line_to(x + width, border_y);
    surface.stroke();

    surface.set_text_align(TextAlign::Center);
    surface.set_text_baseline(TextBaseline::Middle);
    let text_y = round_to_physical_pixel(y + height / 2.0, dpr);
    let min_x = TIME_AXIS_PADDING_X;
    let max_x = TIME_AXIS_PADDING_X.max(width - TIME_AXIS_PADDING_X);

    let range = range.clamp_to(bars.len());
    for index in range.start.max(1)..range.end {
        let cur = month_key(bars[index].timestamp);
        if cur.is_none() || cur == month_key(bars[index - 1].timestamp) {
            continue;
        }

        let screen_x = bar_left_x(index, axis.k_width, axis.k_gap) - axis.scroll_left;
        if screen_x < min_x || screen_x > max_x {
            continue;
        }
        let Some((text, is_year)) = month_or_year_label(bars[index].timestamp) else {
            continue;
        };

        let tick_x = align_to_physical_pixel_center(screen_x, dpr);
        surface.set_stroke_style(colors::AXIS_LINE);
        surface.begin_path();
        surface.move_to(tick_x, y);
        surface.line_to(tick_x, y + 4.0);
        surface.stroke();

        surface.set_fill_style(colors::AXIS_TEXT);
        surface.set_font(if is_year { LABEL_FONT_BOLD } else { LABEL_FONT });
        surface.fill_text(&text, round_to_physical_pixel(screen_x, dpr), text_y);
    }

    surface.restore();
}

// ============================================================================
// CROSSHAIR
// ============================================================================

const LABEL_PADDING_X: f64 = 6.0;
const LABEL_HEIGHT: f64 = 18.0;

/// Vertical and horizontal guide through `(x, y)`, clipped to the plot
pub fn draw_crosshair(surface: &mut dyn Surface, plot_width: f64, plot_height: f64, dpr: f64, x: f64, y: f64) {
    surface.save();
    surface.clip_rect(0.0, 0.0, plot_width, plot_height);
    surface.set_fill_style(colors::CROSSHAIR);

    if let Some(v) = create_vertical_line_rect(x, 0.0, plot_height, dpr) {
        surface.fill_rect(v.x, v.y, v.width, v.height);
    }
    if let Some(h) = create_horizontal_line_rect(0.0, plot_width, y, dpr) {
        surface.fill_rect(h.x, h.y, h.width, h.height);
    }
    surface.restore();
}

/// Price under the crosshair, boxed in the axis gutter of `pane`
pub fn draw_crosshair_price_label(
    surface: &mut dyn Surface,
    pane: &Pane,
    axis: Rect,
    canvas_y: f64,
    label: &dyn Fn(f64) -> String,
    dpr: f64,
) {
    let text = label(pane.y_to_price(canvas_y - pane.top));

    let box_y = (canvas_y - LABEL_HEIGHT / 2.0)
        .clamp(pane.top, (pane.bottom() - LABEL_HEIGHT).max(pane.top));
    let label = Rect::new(axis.x, round_to_physical_pixel(box_y, dpr), axis.width, LABEL_HEIGHT);

    surface.save();
    surface.set_fill_style(colors::LABEL_BG);
    surface.fill_rect(label.x, label.y, label.width, label.height);
    surface.set_font(LABEL_FONT);
    surface.set_text_align(TextAlign::Left);
    surface.set_text_baseline(TextBaseline::Middle);
    surface.set_fill_style(colors::LABEL_TEXT);
    surface.fill_text(&text, label.x + LABEL_PADDING_X, label.y + LABEL_HEIGHT / 2.0);
    surface.restore();
}

/// `YYYY-MM-DD` of the crosshair bar, boxed on the time axis and kept
/// inside it horizontally
pub fn draw_crosshair_time_label(surface: &mut dyn Surface, axis: &TimeAxisFrame, crosshair_x: f64, timestamp: i64) {
    let Some(text) = date_label(timestamp) else {
        return;
    };
    let Rect { x, y, width, height } = axis.rect;

    surface.save();
    surface.set_font(LABEL_FONT);
    let text_w = surface.measure_text(&text);
    let box_w = (text_w + LABEL_PADDING_X * 2.0).ceil();
    let box_h = LABEL_HEIGHT.min(height);
    let left = (crosshair_x - box_w / 2.0).clamp(x, (x + width - box_w).max(x));
    let top = y + (height - box_h) / 2.0;

    surface.set_fill_style(colors::LABEL_BG);
    surface.fill_rect(round_to_physical_pixel(left, axis.dpr), top, box_w, box_h);
    surface.set_text_align(TextAlign::Center);
    surface.set_text_baseline(TextBaseline::Middle);
    surface.set_fill_style(colors::LABEL_TEXT);
    surface.fill_text(&text, left + box_w / 2.0, top + box_h / 2.0);
    surface.restore();
}

// ============================================================================
// MOVING AVERAGE LEGEND
// ============================================================================

const LEGEND_HEADER: &str = "MA";
const LEGEND_X: f64 = 8.0;
const LEGEND_Y: f64 = 8.0;
const LEGEND_FONT_SIZE: f64 = 12.0;
const LEGEND_GAP: f64 = 10.0;
const LEGEND_PADDING_X: f64 = 8.0;
const LEGEND_PADDING_Y: f64 = 6.0;

/// `MA5 x.xx  MA10 x.xx ...` for the last bar before `end_index`, on a
/// translucent box in the top-left of the main pane. `top` is the pane top.
pub fn draw_ma_legend(
    surface: &mut dyn Surface,
    bars: &[Bar],
    end_index: usize,
    lines: &[(usize, &'static str)],
    formatter: &dyn PriceFormatter,
    top: f64,
) {
    if bars.is_empty() || lines.is_empty() || end_index == 0 {
        return;
    }
    let last = (end_index - 1).min(bars.len() - 1);

    let items: Vec<(String, &'static str)> = lines
        .iter()
        .map(|&(period, color)| {
            let text = match sma_at(bars, last, period) {
                Some(value) => format!("MA{} {}", period, formatter.format(value)),
                None => format!("MA{}", period),
            };
            (text, color)
        })
        .collect();

    surface.save();
    surface.set_font(LABEL_FONT);
    surface.set_text_baseline(TextBaseline::Top);
    surface.set_text_align(TextAlign::Left);

    let header_w = surface.measure_text(LEGEND_HEADER);
    let mut content_w = header_w;
    for (text, _) in &items {
        content_w += LEGEND_GAP + surface.measure_text(text);
    }

    let bg_w = (content_w + LEGEND_PADDING_X * 2.0).ceil();
    let bg_h = (LEGEND_FONT_SIZE + LEGEND_PADDING_Y * 2.0).ceil();
    let y0 = top + LEGEND_Y;
    surface.set_fill_style(colors::LEGEND_BG);
    surface.fill_rect(LEGEND_X, y0, bg_w, bg_h);

    let mut x = LEGEND_X + LEGEND_PADDING_X;
    let y = y0 + LEGEND_PADDING_Y;
    surface.set_fill_style(colors::LEGEND_TEXT);
    surface.fill_text(LEGEND_HEADER, x, y);
    x += header_w + LEGEND_GAP;

    for (text, color) in &items {
        surface.set_fill_style(color);
        surface.fill_text(text, x, y);
        x += surface.measure_text(text) + LEGEND_GAP;
    }
    surface.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::{PaneSpec, layout_panes};
    use crate::render::test_support::scenario_series;
    use crate::surface::{DrawCommand, RecordingSurface};
    use kline_core::{DecimalPriceFormatter, PriceFormatter, PriceRange};

    const DAY_MS: i64 = 86_400_000;
    // 2024-01-30T00:00:00Z
    const JAN_30_2024: i64 = 1_706_572_800_000;

    fn two_panes() -> Vec<Pane> {
        layout_panes(400.0, &[PaneSpec::main(), PaneSpec::volume()], 0.0, 0.0)
    }

    #[test]
    fn test_separator_sits_above_second_pane() {
        let mut surface = RecordingSurface::new();
        draw_pane_separators(&mut surface, 1.0, 200.0, &two_panes());
        // volume pane starts at 300: line at round(299.5) = 300
        assert_eq!(surface.fill_rects(), vec![(0.0, 300.0, 200.0, 1.0)]);

        let mut single = RecordingSurface::new();
        draw_pane_separators(&mut single, 1.0, 200.0, &two_panes()[..1]);
        assert!(single.commands().is_empty());
    }

    #[test]
    fn test_titles_skip_empty() {
        let mut surface = RecordingSurface::new();
        draw_pane_titles(&mut surface, &two_panes());
        assert_eq!(surface.texts(), vec!["VOL"]);
        assert!(surface.commands().contains(&DrawCommand::FillText {
            text: "VOL".to_string(),
            x: 8.0,
            y: 308.0
        }));
    }

    #[test]
    fn test_borders_balanced() {
        let mut surface = RecordingSurface::new();
        draw_global_borders(&mut surface, 2.0, 200.0, &two_panes());
        assert!(surface.is_balanced());
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::Stroke)), 1);
        // top, bottom, left, right, one boundary
        assert_eq!(surface.count(|c| matches!(c, DrawCommand::MoveTo { .. })), 5);
    }

    #[test]
    fn test_time_axis_labels_month_and_year() {
        // Dec 30 2023 .. Feb 3 2024, one bar per day
        let start = JAN_30_2024 - 31 * DAY_MS;
        let bars: Vec<Bar> = (0..36)
            .map(|i| Bar::new(start + i * DAY_MS, 1.0, 1.0, 1.0, 1.0, 1.0))
            .collect();
        let axis = TimeAxisFrame {
            rect: Rect::new(0.0, 300.0, 400.0, 24.0),
            scroll_left: 0.0,
            k_width: 8.0,
            k_gap: 2.0,
            dpr: 1.0,
        };

        let mut surface = RecordingSurface::new();
        draw_time_axis(&mut surface, &axis, &bars, VisibleRange::new(0, 36));
        assert_eq!(surface.texts(), vec!["2024", "02"]);
        assert!(surface.commands().contains(&DrawCommand::Font(LABEL_FONT_BOLD.to_string())));
    }

    #[test]
    fn test_time_axis_drops_labels_near_edges() {
        let bars: Vec<Bar> = (0..4)
            .map(|i| Bar::new(JAN_30_2024 + i * DAY_MS, 1.0, 1.0, 1.0, 1.0, 1.0))
            .collect();
        // Feb 1 is bar 2, left edge at 22; scrolled so it lands at x = 2
        let axis = TimeAxisFrame {
            rect: Rect::new(0.0, 0.0, 400.0, 24.0),
            scroll_left: 20.0,
            k_width: 8.0,
            k_gap: 2.0,
            dpr: 1.0,
        };
        let mut surface = RecordingSurface::new();
        draw_time_axis(&mut surface, &axis, &bars, VisibleRange::new(0, 4));
        assert!(surface.texts().is_empty());
    }

    #[test]
    fn test_crosshair_clipped_lines() {
        let mut surface = RecordingSurface::new();
        draw_crosshair(&mut surface, 300.0, 200.0, 1.0, 46.0, 80.2);
        assert!(surface.commands().contains(&DrawCommand::ClipRect {
            x: 0.0,
            y: 0.0,
            width: 300.0,
            height: 200.0
        }));
        assert_eq!(
            surface.fill_rects(),
            vec![(46.0, 0.0, 1.0, 200.0), (0.0, 80.0, 300.0, 1.0)]
        );
    }

    #[test]
    fn test_crosshair_labels() {
        let mut pane = two_panes().remove(0);
        pane.set_price_range(PriceRange::new(200.0, 100.0));

        let mut surface = RecordingSurface::new();
        let axis = Rect::new(300.0, 0.0, 60.0, 400.0);
        let label = |v: f64| DecimalPriceFormatter::default().format(v);
        draw_crosshair_price_label(&mut surface, &pane, axis, 150.0, &label, 1.0);
        assert_eq!(surface.texts(), vec!["150.00"]);

        let time_axis = TimeAxisFrame {
            rect: Rect::new(0.0, 300.0, 300.0, 24.0),
            scroll_left: 0.0,
            k_width: 8.0,
            k_gap: 2.0,
            dpr: 1.0,
        };
        let mut surface = RecordingSurface::new();
        draw_crosshair_time_label(&mut surface, &time_axis, 0.0, JAN_30_2024);
        assert_eq!(surface.texts(), vec!["2024-01-30"]);
        // clamped to the left edge
        assert_eq!(surface.fill_rects()[0].0, 0.0);
    }

    #[test]
    fn test_ma_legend_reads_last_visible_bar() {
        let series = scenario_series();
        let mut surface = RecordingSurface::new();
        let lines = [(3, colors::MA5), (20, colors::MA20)];
        draw_ma_legend(&mut surface, series.as_slice(), 5, &lines, &DecimalPriceFormatter::default(), 0.0);

        // closes 94, 96, 99
        assert_eq!(surface.texts(), vec!["MA", "MA3 96.33", "MA20"]);
        assert!(surface.is_balanced());
    }
}
