//! OHLCV bar types and the generation-tracked bar series

use crate::colors;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Direction of a single bar (close relative to open)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Single OHLCV record for one time unit
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bar {
    /// Unix timestamp in milliseconds (bar open time)
    pub timestamp: i64,
    pub open: f64,
    #[serde(alias = "maxPrice")]
    pub high: f64,
    #[serde(alias = "minPrice")]
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Bar {
    pub const fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn trend(&self) -> Trend {
        if self.open < self.close {
            Trend::Up
        } else if self.open > self.close {
            Trend::Down
        } else {
            Trend::Flat
        }
    }

    /// Price change (close - open)
    pub fn change(&self) -> f64 {
        self.close - self.open
    }

    /// Body top price
    pub fn body_top(&self) -> f64 {
        self.open.max(self.close)
    }

    /// Body bottom price
    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }

    /// All four prices are finite numbers
    pub fn is_finite(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }

    /// Fill color for rendering (flat bars use the down color)
    pub fn fill_color(&self) -> &'static str {
        match self.trend() {
            Trend::Up => colors::UP,
            Trend::Down | Trend::Flat => colors::DOWN,
        }
    }
}

// ============================================================================
// CALENDAR HELPERS
// ============================================================================

/// `(year, month)` of a millisecond timestamp in UTC
pub fn month_key(timestamp_ms: i64) -> Option<(i32, u32)> {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms).map(|dt| (dt.year(), dt.month()))
}

/// Time-axis label for a month boundary: the year in January, `MM` otherwise.
/// The flag is `true` for year labels.
pub fn month_or_year_label(timestamp_ms: i64) -> Option<(String, bool)> {
    month_key(timestamp_ms).map(|(year, month)| {
        if month == 1 {
            (year.to_string(), true)
        } else {
            (format!("{:02}", month), false)
        }
    })
}

/// Full date label (`YYYY-MM-DD`, UTC) for crosshair and tooltips
pub fn date_label(timestamp_ms: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms).map(|dt| dt.format("%Y-%m-%d").to_string())
}

// ============================================================================
// BAR SERIES
// ============================================================================

/// Ordered bar sequence with a data generation counter.
///
/// Every mutation bumps `generation`; derived caches compare it instead of
/// relying on array identity, so same-length edits are never served stale.
#[derive(Debug, Clone, Default)]
pub struct BarSeries {
    bars: Vec<Bar>,
    generation: u64,
}

impl BarSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bars(bars: Vec<Bar>) -> Self {
        Self { bars, generation: 1 }
    }

    /// Parse a JSON array of bar records
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let bars: Vec<Bar> = serde_json::from_str(json)?;
        Ok(Self::from_bars(bars))
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn as_slice(&self) -> &[Bar] {
        &self.bars
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn latest(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    /// Replace the whole sequence
    pub fn replace(&mut self, bars: Vec<Bar>) {
        self.bars = bars;
        self.bump();
    }

    pub fn push(&mut self, bar: Bar) {
        self.bars.push(bar);
        self.bump();
    }

    /// Overwrite the most recent bar (a still-forming bar). No-op when empty.
    pub fn update_last(&mut self, bar: Bar) {
        if let Some(last) = self.bars.last_mut() {
            *last = bar;
            self.bump();
        }
    }

    pub fn clear(&mut self) {
        self.bars.clear();
        self.bump();
    }

    /// Indices `i >= 1` whose calendar month differs from bar `i - 1`
    pub fn month_boundaries(&self) -> Vec<usize> {
        let mut boundaries = Vec::new();
        for i in 1..self.bars.len() {
            let prev = month_key(self.bars[i - 1].timestamp);
            let cur = month_key(self.bars[i].timestamp);
            if cur.is_some() && prev.is_some() && cur != prev {
                boundaries.push(i);
            }
        }
        boundaries
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

impl From<Vec<Bar>> for BarSeries {
    fn from(bars: Vec<Bar>) -> Self {
        Self::from_bars(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 86_400_000;
    // 2024-01-30T00:00:00Z
    const JAN_30_2024: i64 = 1_706_572_800_000;

    #[test]
    fn test_bar_trend() {
        assert_eq!(Bar::new(0, 94.0, 97.0, 93.0, 96.0, 0.0).trend(), Trend::Up);
        assert_eq!(Bar::new(0, 98.0, 99.0, 94.0, 95.0, 0.0).trend(), Trend::Down);
        assert_eq!(Bar::new(0, 95.0, 96.0, 94.0, 95.0, 0.0).trend(), Trend::Flat);
    }

    #[test]
    fn test_generation_bumps_on_every_mutation() {
        let mut series = BarSeries::new();
        assert_eq!(series.generation(), 0);

        series.push(Bar::new(0, 1.0, 2.0, 0.5, 1.5, 10.0));
        let after_push = series.generation();
        assert!(after_push > 0);

        // same-length in-place edit still invalidates
        series.update_last(Bar::new(0, 1.0, 3.0, 0.5, 2.5, 12.0));
        assert!(series.generation() > after_push);
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_update_last_on_empty_is_noop() {
        let mut series = BarSeries::new();
        series.update_last(Bar::default());
        assert!(series.is_empty());
        assert_eq!(series.generation(), 0);
    }

    #[test]
    fn test_month_boundaries() {
        let bars = (0..5)
            .map(|i| Bar::new(JAN_30_2024 + i * DAY_MS, 1.0, 1.0, 1.0, 1.0, 0.0))
            .collect();
        let series = BarSeries::from_bars(bars);
        // Jan 30, Jan 31, Feb 1, Feb 2, Feb 3
        assert_eq!(series.month_boundaries(), vec![2]);
    }

    #[test]
    fn test_labels() {
        assert_eq!(month_or_year_label(JAN_30_2024), Some(("2024".to_string(), true)));
        assert_eq!(
            month_or_year_label(JAN_30_2024 + 2 * DAY_MS),
            Some(("02".to_string(), false))
        );
        assert_eq!(date_label(JAN_30_2024).as_deref(), Some("2024-01-30"));
    }

    #[test]
    fn test_from_json_defaults_volume() {
        let series = BarSeries::from_json(
            r#"[{"timestamp":0,"open":100,"high":101,"low":97,"close":98}]"#,
        )
        .unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.as_slice()[0].volume, 0.0);
    }

    #[test]
    fn test_from_json_accepts_extreme_aliases() {
        let series = BarSeries::from_json(
            r#"[{"timestamp":0,"open":100,"maxPrice":101,"minPrice":97,"close":98,"volume":5}]"#,
        )
        .unwrap();
        let bar = series.as_slice()[0];
        assert_eq!((bar.high, bar.low, bar.volume), (101.0, 97.0, 5.0));
    }
}
