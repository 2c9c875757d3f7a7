//! # scale
//!
//! Price <-> Y mapping inside a padded vertical band.
//! Implements Strategy pattern so panes can swap value scales.

use kline_core::PriceRange;

// ============================================================================
// STRATEGY PATTERN: Scale Trait
// ============================================================================

/// Strategy trait for value scales (maps domain values to pixel values)
pub trait Scale {
    /// Scale a value from domain to range
    fn scale(&self, value: f64) -> f64;

    /// Inverse scale (range to domain)
    fn invert(&self, value: f64) -> f64;

    /// Generate tick values
    fn ticks(&self, count: usize) -> Vec<f64>;
}

// ============================================================================
// PRICE FUNCTIONS
// ============================================================================

/// Map a price to a Y coordinate (Y grows downward, higher price -> smaller Y).
/// A zero price span is treated as 1 so flat data stays well-defined.
pub fn price_to_y(
    price: f64,
    max_price: f64,
    min_price: f64,
    canvas_height: f64,
    padding_top: f64,
    padding_bottom: f64,
) -> f64 {
    let range = PriceRange::new(max_price, min_price).span();
    let ratio = (price - min_price) / range;
    let view_height = (canvas_height - padding_top - padding_bottom).max(1.0);
    padding_top + view_height * (1.0 - ratio)
}

/// Inverse of [`price_to_y`]. `y` is clamped into the padded band first, so
/// an out-of-band Y never produces a price outside the range.
pub fn y_to_price(
    y: f64,
    max_price: f64,
    min_price: f64,
    canvas_height: f64,
    padding_top: f64,
    padding_bottom: f64,
) -> f64 {
    let range = PriceRange::new(max_price, min_price).span();
    let view_height = (canvas_height - padding_top - padding_bottom).max(1.0);
    let clamped = y.clamp(padding_top, padding_top + view_height);
    let ratio = 1.0 - (clamped - padding_top) / view_height;
    min_price + ratio * range
}

/// Clamp a requested vertical padding so at least one pixel of band remains
pub fn clamp_padding(want: f64, height: f64) -> f64 {
    want.min((height / 2.0).floor() - 1.0).max(0.0)
}

// ============================================================================
// PRICE SCALE
// ============================================================================

/// Price scale bound to one pane's range and height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceScale {
    range: PriceRange,
    height: f64,
    padding_top: f64,
    padding_bottom: f64,
}

impl PriceScale {
    pub fn new(range: PriceRange, height: f64) -> Self {
        Self {
            range,
            height,
            padding_top: 0.0,
            padding_bottom: 0.0,
        }
    }

    pub fn padding(mut self, top: f64, bottom: f64) -> Self {
        self.padding_top = top;
        self.padding_bottom = bottom;
        self
    }

    pub fn range(&self) -> PriceRange {
        self.range
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn padding_top(&self) -> f64 {
        self.padding_top
    }

    pub fn padding_bottom(&self) -> f64 {
        self.padding_bottom
    }

    pub fn price_to_y(&self, price: f64) -> f64 {
        price_to_y(
            price,
            self.range.max_price,
            self.range.min_price,
            self.height,
            self.padding_top,
            self.padding_bottom,
        )
    }

    pub fn y_to_price(&self, y: f64) -> f64 {
        y_to_price(
            y,
            self.range.max_price,
            self.range.min_price,
            self.height,
            self.padding_top,
            self.padding_bottom,
        )
    }
}

impl Scale for PriceScale {
    fn scale(&self, value: f64) -> f64 {
        self.price_to_y(value)
    }

    fn invert(&self, value: f64) -> f64 {
        self.y_to_price(value)
    }

    /// Evenly spaced prices from max down to min (at least two)
    fn ticks(&self, count: usize) -> Vec<f64> {
        let count = count.max(2);
        let PriceRange { max_price, min_price } = self.range;
        let span = max_price - min_price;
        if span == 0.0 {
            return vec![max_price; count];
        }

        let step = span / (count - 1) as f64;
        (0..count).map(|i| max_price - step * i as f64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_to_y() {
        assert_eq!(price_to_y(100.0, 100.0, 0.0, 500.0, 0.0, 0.0), 0.0);
        assert_eq!(price_to_y(50.0, 100.0, 0.0, 500.0, 0.0, 0.0), 250.0);
        assert_eq!(price_to_y(0.0, 100.0, 0.0, 500.0, 0.0, 0.0), 500.0);
        assert_eq!(price_to_y(100.0, 100.0, 0.0, 120.0, 10.0, 10.0), 10.0);
    }

    #[test]
    fn test_flat_range_does_not_divide_by_zero() {
        let y = price_to_y(42.0, 42.0, 42.0, 200.0, 0.0, 0.0);
        assert_eq!(y, 200.0);
        assert!(y_to_price(50.0, 42.0, 42.0, 200.0, 0.0, 0.0).is_finite());
    }

    #[test]
    fn test_y_to_price_inverts_and_clamps() {
        let scale = PriceScale::new(PriceRange::new(101.0, 92.0), 90.0).padding(5.0, 5.0);
        let y = scale.price_to_y(95.0);
        assert!((scale.y_to_price(y) - 95.0).abs() < 1e-9);

        assert_eq!(scale.y_to_price(-40.0), 101.0);
        assert_eq!(scale.y_to_price(400.0), 92.0);
    }

    #[test]
    fn test_view_height_floor() {
        // padding larger than height collapses to a one pixel band
        assert_eq!(price_to_y(0.0, 10.0, 0.0, 10.0, 8.0, 8.0), 9.0);
    }

    #[test]
    fn test_ticks() {
        let scale = PriceScale::new(PriceRange::new(100.0, 0.0), 100.0);
        assert_eq!(scale.ticks(3), vec![100.0, 50.0, 0.0]);
        assert_eq!(scale.ticks(0).len(), 2);
    }

    #[test]
    fn test_clamp_padding() {
        assert_eq!(clamp_padding(8.0, 100.0), 8.0);
        assert_eq!(clamp_padding(80.0, 100.0), 49.0);
        assert_eq!(clamp_padding(5.0, 1.0), 0.0);
    }
}
