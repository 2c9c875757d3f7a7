//! # viewport
//!
//! Horizontal scroll offset -> visible bar index range, and the value band
//! spanned by that range.

use kline_core::{Bar, PriceRange, VisibleRange};

/// Visible bar index range for the current scroll position.
///
/// The range is widened by one bar on each side so bars straddling the
/// viewport edges are still drawn.
pub fn get_visible_range(
    scroll_left: f64,
    view_width: f64,
    k_width: f64,
    k_gap: f64,
    total_count: usize,
) -> VisibleRange {
    let unit = k_width + k_gap;
    if !(unit > 0.0) || !scroll_left.is_finite() || !view_width.is_finite() {
        return VisibleRange::default();
    }

    let start = ((scroll_left / unit).floor() - 1.0).max(0.0) as usize;
    let end = ((scroll_left + view_width) / unit).ceil() + 1.0;
    let end = (end.max(0.0) as usize).min(total_count);

    VisibleRange::new(start.min(end), end)
}

/// Max high / min low over `bars[start..end)`.
///
/// Returns [`PriceRange::FALLBACK`] when the slice holds no finite prices;
/// callers treat that as "nothing to draw", not as a real band.
pub fn get_visible_price_range(bars: &[Bar], start: usize, end: usize) -> PriceRange {
    let mut max_price = f64::NEG_INFINITY;
    let mut min_price = f64::INFINITY;

    for bar in bars.iter().take(end).skip(start) {
        if bar.high > max_price {
            max_price = bar.high;
        }
        if bar.low < min_price {
            min_price = bar.low;
        }
    }

    if !max_price.is_finite() || !min_price.is_finite() {
        return PriceRange::FALLBACK;
    }

    PriceRange::new(max_price, min_price)
}

/// `{max visible volume, 0}` for volume panes, same fallback rule
pub fn get_visible_volume_range(bars: &[Bar], start: usize, end: usize) -> PriceRange {
    let max_volume = bars
        .iter()
        .take(end)
        .skip(start)
        .map(|bar| bar.volume)
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);

    if !max_volume.is_finite() || max_volume <= 0.0 {
        return PriceRange::FALLBACK;
    }

    PriceRange::new(max_volume, 0.0)
}

// ============================================================================
// WORLD X POSITIONS
// ============================================================================

/// World X of a bar's left edge
pub fn bar_left_x(index: usize, k_width: f64, k_gap: f64) -> f64 {
    k_gap + index as f64 * (k_width + k_gap)
}

/// World X of a bar's centre
pub fn bar_center_x(index: usize, k_width: f64, k_gap: f64) -> f64 {
    bar_left_x(index, k_width, k_gap) + k_width / 2.0
}

/// Full scrollable content width for `count` bars
pub fn content_width(count: usize, k_width: f64, k_gap: f64) -> f64 {
    k_gap + count as f64 * (k_width + k_gap)
}

/// Logical left edges of the visible bars, snapped to device pixels.
/// Entry `i` belongs to bar `range.start + i`.
pub fn kline_positions(range: VisibleRange, k_width: f64, k_gap: f64, dpr: f64) -> Vec<f64> {
    range
        .iter()
        .map(|i| (bar_left_x(i, k_width, k_gap) * dpr).round() / dpr)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn scenario_bars() -> Vec<Bar> {
        vec![
            Bar::new(0, 100.0, 101.0, 97.0, 98.0, 10.0),
            Bar::new(1, 98.0, 99.0, 94.0, 95.0, 10.0),
            Bar::new(2, 95.0, 96.0, 92.0, 94.0, 10.0),
            Bar::new(3, 94.0, 97.0, 93.0, 96.0, 30.0),
            Bar::new(4, 96.0, 100.0, 95.0, 99.0, 2.0),
        ]
    }

    #[test]
    fn test_scenario_range_covers_all_bars() {
        let range = get_visible_range(0.0, 100.0, 8.0, 2.0, 5);
        assert_eq!(range, VisibleRange::new(0, 5));

        let prices = get_visible_price_range(&scenario_bars(), range.start, range.end);
        assert_eq!(prices, PriceRange::new(101.0, 92.0));
    }

    #[test]
    fn test_edge_padding_is_kept() {
        // scroll by 5 units, 3 units wide: [5, 8) padded to [4, 9)
        let range = get_visible_range(50.0, 30.0, 8.0, 2.0, 100);
        assert_eq!(range, VisibleRange::new(4, 9));
    }

    #[test]
    fn test_degenerate_unit() {
        assert!(get_visible_range(0.0, 100.0, 0.0, 0.0, 10).is_empty());
    }

    #[test]
    fn test_price_range_fallback() {
        assert_eq!(get_visible_price_range(&[], 0, 10), PriceRange::FALLBACK);
        assert_eq!(get_visible_price_range(&scenario_bars(), 3, 3), PriceRange::FALLBACK);

        let nan = vec![Bar::new(0, f64::NAN, f64::NAN, f64::NAN, f64::NAN, 0.0)];
        assert_eq!(get_visible_price_range(&nan, 0, 1), PriceRange::FALLBACK);
    }

    #[test]
    fn test_volume_range() {
        let range = get_visible_volume_range(&scenario_bars(), 0, 5);
        assert_eq!(range, PriceRange::new(30.0, 0.0));
        assert_eq!(get_visible_volume_range(&scenario_bars(), 5, 9), PriceRange::FALLBACK);
    }

    #[test]
    fn test_positions() {
        assert_eq!(bar_center_x(0, 8.0, 2.0), 6.0);
        assert_eq!(bar_left_x(3, 8.0, 2.0), 32.0);
        assert_eq!(content_width(5, 8.0, 2.0), 52.0);
        assert_eq!(
            kline_positions(VisibleRange::new(1, 3), 8.0, 2.0, 1.0),
            vec![12.0, 22.0]
        );
    }

    proptest! {
        #[test]
        fn prop_start_is_monotonic(
            a in 0.0f64..50_000.0,
            b in 0.0f64..50_000.0,
            k_width in 1.0f64..40.0,
            k_gap in 0.0f64..10.0,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let r1 = get_visible_range(lo, 800.0, k_width, k_gap, 1_000);
            let r2 = get_visible_range(hi, 800.0, k_width, k_gap, 1_000);
            prop_assert!(r1.start <= r2.start);
        }
    }
}
