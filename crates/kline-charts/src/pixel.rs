//! # pixel
//!
//! Physical-pixel alignment in logical pixel space.
//!
//! The canvas is drawn with `scale(dpr, dpr)` applied, so every coordinate
//! here is logical; the helpers snap them so fills land on whole device
//! pixels and 1px strokes cover exactly one device pixel row or column.

use kline_core::Rect;

/// Snap a logical coordinate to the nearest physical pixel boundary (fills)
pub fn round_to_physical_pixel(value: f64, dpr: f64) -> f64 {
    (value * dpr).round() / dpr
}

/// Snap a logical coordinate to the centre of its physical pixel (1px strokes)
pub fn align_to_physical_pixel_center(value: f64, dpr: f64) -> f64 {
    ((value * dpr).floor() + 0.5) / dpr
}

/// Align all four edges independently. Width and height never drop below
/// one physical pixel.
pub fn align_rect(x: f64, y: f64, width: f64, height: f64, dpr: f64) -> Rect {
    let left = round_to_physical_pixel(x, dpr);
    let top = round_to_physical_pixel(y, dpr);
    let right = round_to_physical_pixel(x + width, dpr);
    let bottom = round_to_physical_pixel(y + height, dpr);

    Rect {
        x: left,
        y: top,
        width: (1.0 / dpr).max(right - left),
        height: (1.0 / dpr).max(bottom - top),
    }
}

/// One-physical-pixel-wide filled rect for a vertical line.
/// Returns `None` when `y1 == y2`.
pub fn create_vertical_line_rect(center_x: f64, y1: f64, y2: f64, dpr: f64) -> Option<Rect> {
    if y1 == y2 {
        return None;
    }

    let phys_x = (center_x * dpr).round();
    let phys_top = (y1.min(y2) * dpr).round();
    let phys_bottom = (y1.max(y2) * dpr).round();

    Some(Rect {
        x: phys_x / dpr,
        y: phys_top / dpr,
        width: 1.0 / dpr,
        height: (phys_bottom - phys_top).max(1.0) / dpr,
    })
}

/// One-physical-pixel-tall filled rect for a horizontal line.
/// Returns `None` when `x1 == x2`.
pub fn create_horizontal_line_rect(x1: f64, x2: f64, center_y: f64, dpr: f64) -> Option<Rect> {
    if x1 == x2 {
        return None;
    }

    let phys_left = (x1.min(x2) * dpr).round();
    let phys_right = (x1.max(x2) * dpr).round();
    let phys_y = (center_y * dpr).round();

    Some(Rect {
        x: phys_left / dpr,
        y: phys_y / dpr,
        width: (phys_right - phys_left).max(1.0) / dpr,
        height: 1.0 / dpr,
    })
}

// ============================================================================
// CANDLE GEOMETRY
// ============================================================================

/// Bar width/gap resolved in device pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalKLineConfig {
    /// Body width in device pixels, always odd and at least 1
    pub k_width_px: i64,
    pub k_gap_px: i64,
    pub unit_px: i64,
}

/// Resolve the logical bar width/gap into device pixels.
/// An even body width is bumped to the next odd integer so the wick can sit
/// on a single pixel column.
pub fn physical_kline_config(k_width: f64, k_gap: f64, dpr: f64) -> PhysicalKLineConfig {
    let mut k_width_px = (k_width * dpr).round() as i64;
    if k_width_px % 2 == 0 {
        k_width_px += 1;
    }
    let k_width_px = k_width_px.max(1);
    let k_gap_px = ((k_gap * dpr).round() as i64).max(0);

    PhysicalKLineConfig {
        k_width_px,
        k_gap_px,
        unit_px: k_width_px + k_gap_px,
    }
}

/// Candle body and wick placement in both spaces
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedKLine {
    /// Body in logical pixels
    pub body_rect: Rect,
    pub phys_body_left: i64,
    pub phys_body_right: i64,
    pub phys_body_width: i64,
    /// Wick column in device pixels
    pub phys_wick_x: f64,
    /// Wick left edge in logical pixels
    pub wick_x: f64,
    /// Wick width in logical pixels (one device pixel)
    pub wick_width: f64,
    pub is_perfectly_aligned: bool,
}

/// Candle body alignment: horizontal axis in device pixels (caller supplies
/// an integer `left_px` and an odd `width_px`), vertical axis in logical
/// pixels rounded to device pixels.
pub fn create_aligned_kline_from_px(
    left_px: i64,
    rect_y: f64,
    width_px: i64,
    height: f64,
    dpr: f64,
) -> AlignedKLine {
    let top_px = (rect_y * dpr).round();
    let bottom_px = ((rect_y + height) * dpr).round();
    let height_px = (bottom_px - top_px).max(1.0);

    let phys_wick_x = left_px as f64 + (width_px - 1) as f64 / 2.0;

    AlignedKLine {
        body_rect: Rect {
            x: left_px as f64 / dpr,
            y: top_px / dpr,
            width: width_px as f64 / dpr,
            height: height_px / dpr,
        },
        phys_body_left: left_px,
        phys_body_right: left_px + width_px,
        phys_body_width: width_px,
        phys_wick_x,
        wick_x: phys_wick_x / dpr,
        wick_width: 1.0 / dpr,
        is_perfectly_aligned: width_px % 2 == 1,
    }
}
