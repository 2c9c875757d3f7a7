//! # kline-core
//!
//! Core domain types for the K-line canvas chart.
//! Implements Strategy pattern for label formatting.

pub mod bar;
pub mod error;
pub mod geometry;

pub use bar::*;
pub use error::*;
pub use geometry::*;

use serde::{Deserialize, Serialize};

// ============================================================================
// STRATEGY PATTERN: Formatters
// ============================================================================

/// Strategy trait for price formatting
pub trait PriceFormatter {
    fn format(&self, price: f64) -> String;
}

/// Strategy trait for volume formatting
pub trait VolumeFormatter {
    fn format(&self, volume: f64) -> String;
}

/// Fixed-decimals price formatter (axis ticks, legends, callouts)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecimalPriceFormatter {
    pub decimals: usize,
}

impl Default for DecimalPriceFormatter {
    fn default() -> Self {
        Self { decimals: 2 }
    }
}

impl PriceFormatter for DecimalPriceFormatter {
    fn format(&self, price: f64) -> String {
        format!("{:.prec$}", price, prec = self.decimals)
    }
}

/// Compact formatter for volumes (K, M, B suffixes)
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactVolumeFormatter;

impl VolumeFormatter for CompactVolumeFormatter {
    fn format(&self, volume: f64) -> String {
        let abs = volume.abs();
        let sign = if volume < 0.0 { "-" } else { "" };

        if abs >= 1_000_000_000.0 {
            format!("{}{:.2}B", sign, abs / 1_000_000_000.0)
        } else if abs >= 1_000_000.0 {
            format!("{}{:.2}M", sign, abs / 1_000_000.0)
        } else if abs >= 1_000.0 {
            format!("{}{:.2}K", sign, abs / 1_000.0)
        } else {
            format!("{}{:.0}", sign, abs)
        }
    }
}

// ============================================================================
// RANGES
// ============================================================================

/// Vertical value band spanned by one pane in one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub max_price: f64,
    pub min_price: f64,
}

impl PriceRange {
    /// Range used when a slice holds no usable prices.
    pub const FALLBACK: PriceRange = PriceRange {
        max_price: 100.0,
        min_price: 0.0,
    };

    pub const fn new(max_price: f64, min_price: f64) -> Self {
        Self { max_price, min_price }
    }

    /// Span with the flat-data substitution applied (never zero)
    pub fn span(&self) -> f64 {
        let span = self.max_price - self.min_price;
        if span == 0.0 { 1.0 } else { span }
    }

    pub fn is_finite(&self) -> bool {
        self.max_price.is_finite() && self.min_price.is_finite()
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min_price && price <= self.max_price
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// Half-open index interval `[start, end)` into a bar sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

impl VisibleRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }

    /// Clamp `end` to `len` items
    pub fn clamp_to(self, len: usize) -> Self {
        let end = self.end.min(len);
        Self {
            start: self.start.min(end),
            end,
        }
    }

    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

// ============================================================================
// COLOR CONSTANTS
// ============================================================================

pub mod colors {
    pub const UP: &str = "rgba(214, 10, 34, 1)";
    pub const DOWN: &str = "rgba(3, 123, 102, 1)";

    pub const MA5: &str = "rgba(251, 186, 62, 1)";
    pub const MA10: &str = "rgba(190, 131, 12, 1)";
    pub const MA20: &str = "rgba(69, 112, 249, 1)";

    pub const MARKER_WITH_VOLUME: &str = "#FF4444";
    pub const MARKER_WITHOUT_VOLUME: &str = "#00C853";
    pub const MARKER_OUTLINE: &str = "rgba(0, 0, 0, 0.75)";

    pub const GRID: &str = "rgba(0, 0, 0, 0.06)";
    pub const BORDER: &str = "rgba(0, 0, 0, 0.12)";
    pub const SEPARATOR: &str = "rgba(0, 0, 0, 0.10)";
    pub const CROSSHAIR: &str = "rgba(0, 0, 0, 0.28)";
    pub const LAST_PRICE: &str = "rgba(0, 0, 0, 0.28)";
    pub const CALLOUT_LINE: &str = "rgba(0, 0, 0, 0.45)";
    pub const CALLOUT_TEXT: &str = "rgba(0, 0, 0, 0.70)";

    pub const AXIS_BG: &str = "rgba(255, 255, 255, 0.85)";
    pub const AXIS_TEXT: &str = "rgba(0, 0, 0, 0.65)";
    pub const AXIS_LINE: &str = "rgba(0, 0, 0, 0.12)";
    pub const LABEL_BG: &str = "rgba(40, 40, 40, 0.90)";
    pub const LABEL_TEXT: &str = "#ffffff";
    pub const TITLE_TEXT: &str = "rgba(0, 0, 0, 0.55)";
    pub const LEGEND_BG: &str = "rgba(255, 255, 255, 0.85)";
    pub const LEGEND_TEXT: &str = "#333333";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_formatter_strategy() {
        let formatter = DecimalPriceFormatter { decimals: 4 };
        assert_eq!(formatter.format(42.5678), "42.5678");
        assert_eq!(DecimalPriceFormatter::default().format(101.0), "101.00");
    }

    #[test]
    fn test_compact_volume_formatter() {
        let formatter = CompactVolumeFormatter;
        assert_eq!(formatter.format(1_500_000.0), "1.50M");
        assert_eq!(formatter.format(2_500.0), "2.50K");
        assert_eq!(formatter.format(500.0), "500");
    }

    #[test]
    fn test_price_range_span_substitutes_flat_data() {
        assert_eq!(PriceRange::new(10.0, 10.0).span(), 1.0);
        assert_eq!(PriceRange::new(101.0, 92.0).span(), 9.0);
        assert!(!PriceRange::new(f64::NAN, 0.0).is_finite());
    }

    #[test]
    fn test_visible_range_clamp() {
        let range = VisibleRange::new(3, 12).clamp_to(8);
        assert_eq!(range, VisibleRange::new(3, 8));
        assert_eq!(range.len(), 5);
        assert!(VisibleRange::new(5, 20).clamp_to(2).is_empty());
    }
}
