//! # moving_average
//!
//! Simple moving averages over closes, computed with a sliding window sum.

use super::SeriesStamp;
use kline_core::{Bar, BarSeries, colors};
use std::collections::HashMap;

/// Periods the chart knows how to draw, with their line colour
pub const STANDARD_PERIODS: [(usize, &str); 3] =
    [(5, colors::MA5), (10, colors::MA10), (20, colors::MA20)];

/// SMA of `close` over `period`. Entry `k` belongs to bar `k + period - 1`;
/// empty when `period` is zero or longer than the data.
pub fn sma(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    if period == 0 || n < period {
        return Vec::new();
    }

    let mut window_sum: f64 = bars[..period].iter().map(|b| b.close).sum();
    let mut out = Vec::with_capacity(n - period + 1);
    out.push(window_sum / period as f64);

    for i in period..n {
        window_sum += bars[i].close - bars[i - period].close;
        out.push(window_sum / period as f64);
    }
    out
}

/// SMA at one bar index, summed directly over the window
pub fn sma_at(bars: &[Bar], index: usize, period: usize) -> Option<f64> {
    if period == 0 || index + 1 < period || index >= bars.len() {
        return None;
    }
    let sum: f64 = bars[index + 1 - period..=index].iter().map(|b| b.close).sum();
    Some(sum / period as f64)
}

/// Bar index for MA array index `ma_index`
pub fn ma_bar_index(ma_index: usize, period: usize) -> usize {
    ma_index + period.saturating_sub(1)
}

/// Slice of MA indices whose bars fall in `[start, end]`
pub fn ma_index_range(start: usize, end: usize, period: usize, ma_len: usize) -> (usize, usize) {
    let lag = period.saturating_sub(1);
    let ma_start = start.saturating_sub(lag);
    let ma_end = (end + 1).saturating_sub(lag).min(ma_len);
    (ma_start, ma_end)
}

// ============================================================================
// CACHE
// ============================================================================

#[derive(Debug, Clone)]
struct CachedSeries {
    stamp: Option<SeriesStamp>,
    values: Vec<f64>,
}

/// Per-chart MA cache keyed by period
#[derive(Debug, Clone, Default)]
pub struct MovingAverageCache {
    entries: HashMap<usize, CachedSeries>,
}

impl MovingAverageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// MA values for `period`, recomputed when the series changed
    pub fn get(&mut self, series: &BarSeries, period: usize) -> &[f64] {
        let stamp = SeriesStamp::of(series);
        let entry = self.entries.entry(period).or_insert_with(|| CachedSeries {
            stamp: None,
            values: Vec::new(),
        });

        if entry.stamp != Some(stamp) {
            entry.values = sma(series.as_slice(), period);
            entry.stamp = Some(stamp);
            tracing::debug!(period, len = stamp.len, generation = stamp.generation, "rebuilt moving average");
        }
        &entry.values
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
