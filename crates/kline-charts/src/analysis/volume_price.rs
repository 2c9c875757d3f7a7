//! # volume_price
//!
//! Per-bar volume/price relation classification backed by a volume prefix
//! sum, so a window average costs O(1) after an O(n) build.

use super::SeriesStamp;
use kline_core::{Bar, BarSeries, VisibleRange};
use serde::{Deserialize, Serialize};

// ============================================================================
// RELATION
// ============================================================================

/// How a bar's volume behaved relative to its recent average, given its
/// price direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumePriceRelation {
    RiseWithVolume,
    RiseWithoutVolume,
    FallWithVolume,
    FallWithoutVolume,
    Others,
}

impl VolumePriceRelation {
    pub const ALL: [Self; 5] = [
        Self::RiseWithVolume,
        Self::RiseWithoutVolume,
        Self::FallWithVolume,
        Self::FallWithoutVolume,
        Self::Others,
    ];

    /// Marker type name, same as the serde form
    pub fn name(&self) -> &'static str {
        match self {
            Self::RiseWithVolume => "rise_with_volume",
            Self::RiseWithoutVolume => "rise_without_volume",
            Self::FallWithVolume => "fall_with_volume",
            Self::FallWithoutVolume => "fall_without_volume",
            Self::Others => "others",
        }
    }

    /// Built-in label; [`MarkerRegistry`](crate::MarkerRegistry) can override it
    pub fn description(&self) -> &'static str {
        match self {
            Self::RiseWithVolume => "Rising on expanding volume",
            Self::RiseWithoutVolume => "Rising on shrinking volume (divergence)",
            Self::FallWithVolume => "Falling on expanding volume",
            Self::FallWithoutVolume => "Falling on shrinking volume",
            Self::Others => "Neutral",
        }
    }

    /// Whether a marker is drawn for this relation
    pub fn is_marked(&self) -> bool {
        !matches!(self, Self::Others)
    }

    pub fn is_rising(&self) -> bool {
        matches!(self, Self::RiseWithVolume | Self::RiseWithoutVolume)
    }

    pub fn is_with_volume(&self) -> bool {
        matches!(self, Self::RiseWithVolume | Self::FallWithVolume)
    }
}

/// Thresholds for [`classify`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumePriceConfig {
    /// Volume above `average * amplify` counts as expanding
    pub volume_amplify_threshold: f64,
    /// Volume below `average * shrink` counts as shrinking
    pub volume_shrink_threshold: f64,
    /// Bars in the volume average window (current bar included)
    pub avg_period: usize,
}

impl Default for VolumePriceConfig {
    fn default() -> Self {
        Self {
            volume_amplify_threshold: 1.5,
            volume_shrink_threshold: 0.8,
            avg_period: 20,
        }
    }
}

impl VolumePriceConfig {
    pub fn with_thresholds(mut self, amplify: f64, shrink: f64) -> Self {
        self.volume_amplify_threshold = amplify;
        self.volume_shrink_threshold = shrink;
        self
    }

    pub fn with_period(mut self, avg_period: usize) -> Self {
        self.avg_period = avg_period;
        self
    }
}

// ============================================================================
// PREFIX SUM
// ============================================================================

/// `sums[i]` is the total volume of bars `[0, i)`
#[derive(Debug, Clone, Default)]
pub struct VolumePrefixSum {
    sums: Vec<f64>,
}

impl VolumePrefixSum {
    pub fn build(bars: &[Bar]) -> Self {
        if bars.is_empty() {
            return Self::default();
        }

        let mut sums = Vec::with_capacity(bars.len() + 1);
        sums.push(0.0);
        let mut total = 0.0;
        for bar in bars {
            total += bar.volume;
            sums.push(total);
        }
        Self { sums }
    }

    /// Number of bars covered
    pub fn len(&self) -> usize {
        self.sums.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Volume over the inclusive interval `[start, end]`; 0 when the interval
    /// is inverted or out of bounds
    pub fn query(&self, start: usize, end: usize) -> f64 {
        if start > end || end >= self.len() {
            return 0.0;
        }
        self.sums[end + 1] - self.sums[start]
    }

    /// Average volume of the `period` bars ending at `index`; 0 while fewer
    /// than `period` bars are available
    pub fn volume_ma(&self, index: usize, period: usize) -> f64 {
        if period == 0 || index + 1 < period {
            return 0.0;
        }
        self.query(index + 1 - period, index) / period as f64
    }
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Classify bar `index` against a prebuilt prefix sum.
///
/// The first bar and bars without volume are always [`VolumePriceRelation::Others`].
pub fn classify(
    bars: &[Bar],
    prefix: &VolumePrefixSum,
    index: usize,
    config: &VolumePriceConfig,
) -> VolumePriceRelation {
    let Some(bar) = bars.get(index) else {
        return VolumePriceRelation::Others;
    };
    let volume = bar.volume;
    if index < 1 || volume == 0.0 || volume.is_nan() {
        return VolumePriceRelation::Others;
    }

    let volume_ma = prefix.volume_ma(index, config.avg_period);

    let price_change = bar.close - bar.open;
    let is_rising = price_change > 0.0;
    let is_falling = price_change < 0.0;

    let is_amplified = volume > volume_ma * config.volume_amplify_threshold;
    let is_shrunk = volume < volume_ma * config.volume_shrink_threshold;

    match (is_rising, is_falling) {
        (true, _) if is_amplified => VolumePriceRelation::RiseWithVolume,
        (true, _) if is_shrunk => VolumePriceRelation::RiseWithoutVolume,
        (_, true) if is_amplified => VolumePriceRelation::FallWithVolume,
        (_, true) if is_shrunk => VolumePriceRelation::FallWithoutVolume,
        _ => VolumePriceRelation::Others,
    }
}

/// Classify `[start, end)` with a single prefix-sum build
pub fn classify_range(
    bars: &[Bar],
    start: usize,
    end: usize,
    config: &VolumePriceConfig,
) -> Vec<VolumePriceRelation> {
    let prefix = VolumePrefixSum::build(bars);
    (start..end.min(bars.len()))
        .map(|i| classify(bars, &prefix, i, config))
        .collect()
}

// ============================================================================
// ANALYZER (per-chart cache)
// ============================================================================

/// Owns the prefix sum for one chart and rebuilds it when the series
/// generation or length changes
#[derive(Debug, Clone, Default)]
pub struct VolumePriceAnalyzer {
    config: VolumePriceConfig,
    prefix: VolumePrefixSum,
    stamp: Option<SeriesStamp>,
}

impl VolumePriceAnalyzer {
    pub fn new(config: VolumePriceConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &VolumePriceConfig {
        &self.config
    }

    /// Swap thresholds; the prefix sum does not depend on them
    pub fn set_config(&mut self, config: VolumePriceConfig) {
        self.config = config;
    }

    fn refresh(&mut self, series: &BarSeries) {
        let stamp = SeriesStamp::of(series);
        if self.stamp != Some(stamp) {
            self.prefix = VolumePrefixSum::build(series.as_slice());
            self.stamp = Some(stamp);
            tracing::debug!(
                generation = stamp.generation,
                len = stamp.len,
                "rebuilt volume prefix sum"
            );
        }
    }

    pub fn prefix(&mut self, series: &BarSeries) -> &VolumePrefixSum {
        self.refresh(series);
        &self.prefix
    }

    pub fn classify(&mut self, series: &BarSeries, index: usize) -> VolumePriceRelation {
        self.refresh(series);
        classify(series.as_slice(), &self.prefix, index, &self.config)
    }

    /// Relations for every index in `range`, paired with the index
    pub fn relations(
        &mut self,
        series: &BarSeries,
        range: VisibleRange,
    ) -> Vec<(usize, VolumePriceRelation)> {
        self.refresh(series);
        let bars = series.as_slice();
        range
            .clamp_to(bars.len())
            .iter()
            .map(|i| (i, classify(bars, &self.prefix, i, &self.config)))
            .collect()
    }
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

    fn scenario_config() -> VolumePriceConfig {
        VolumePriceConfig::default().with_thresholds(1.5, 0.8).with_period(3)
    }

    #[test]
    fn test_default_config() {
        let config = VolumePriceConfig::default();
        assert_eq!(config.volume_amplify_threshold, 1.5);
        assert_eq!(config.volume_shrink_threshold, 0.8);
        assert_eq!(config.avg_period, 20);
    }

    #[test]
    fn test_rise_with_volume_scenario() {
        let bars = scenario_bars();
        let prefix = VolumePrefixSum::build(&bars);
        let relation = classify(&bars, &prefix, 3, &scenario_config());
        assert_eq!(relation, VolumePriceRelation::RiseWithVolume);
    }

    #[test]
    fn test_rise_without_volume() {
        let bars = scenario_bars();
        let prefix = VolumePrefixSum::build(&bars);
        // average of [10, 30, 2] is 14, 2 < 11.2
        assert_eq!(
            classify(&bars, &prefix, 4, &scenario_config()),
            VolumePriceRelation::RiseWithoutVolume
        );
    }

    #[test]
    fn test_first_bar_and_zero_volume_are_neutral() {
        let mut bars = scenario_bars();
        let prefix = VolumePrefixSum::build(&bars);
        assert_eq!(classify(&bars, &prefix, 0, &scenario_config()), VolumePriceRelation::Others);
        assert_eq!(classify(&bars, &prefix, 99, &scenario_config()), VolumePriceRelation::Others);

        bars[3].volume = 0.0;
        let prefix = VolumePrefixSum::build(&bars);
        assert_eq!(classify(&bars, &prefix, 3, &scenario_config()), VolumePriceRelation::Others);
    }

    #[test]
    fn test_query_bounds() {
        let prefix = VolumePrefixSum::build(&scenario_bars());
        assert_eq!(prefix.len(), 5);
        assert_eq!(prefix.query(0, 4), 62.0);
        assert_eq!(prefix.query(3, 3), 30.0);
        assert_eq!(prefix.query(3, 2), 0.0);
        assert_eq!(prefix.query(0, 5), 0.0);
        assert_eq!(prefix.volume_ma(1, 3), 0.0);
        assert_eq!(prefix.volume_ma(2, 3), 10.0);
        assert!(VolumePrefixSum::build(&[]).is_empty());
    }

    #[test]
    fn test_batch_matches_single() {
        let bars = scenario_bars();
        let config = scenario_config();
        let prefix = VolumePrefixSum::build(&bars);
        let batch = classify_range(&bars, 0, 10, &config);
        assert_eq!(batch.len(), 5);
        for (i, relation) in batch.iter().enumerate() {
            assert_eq!(*relation, classify(&bars, &prefix, i, &config));
        }
    }

    #[test]
    fn test_analyzer_rebuilds_on_same_length_edit() {
        let mut series = BarSeries::from_bars(scenario_bars());
        let mut analyzer = VolumePriceAnalyzer::new(scenario_config());
        assert_eq!(analyzer.classify(&series, 3), VolumePriceRelation::RiseWithVolume);

        // same length, new content: generation forces a rebuild
        let mut last = scenario_bars()[4];
        last.volume = 200.0;
        series.update_last(last);
        assert_eq!(analyzer.prefix(&series).query(4, 4), 200.0);
        assert_eq!(analyzer.classify(&series, 4), VolumePriceRelation::RiseWithVolume);
    }

    #[test]
    fn test_relations_cover_range() {
        let series = BarSeries::from_bars(scenario_bars());
        let mut analyzer = VolumePriceAnalyzer::new(scenario_config());
        let relations = analyzer.relations(&series, VisibleRange::new(2, 9));
        let indices: Vec<usize> = relations.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![2, 3, 4]);
    }

    #[test]
    fn test_description_and_flags() {
        assert!(VolumePriceRelation::RiseWithVolume.is_rising());
        assert!(VolumePriceRelation::FallWithVolume.is_with_volume());
        assert!(!VolumePriceRelation::Others.is_marked());
        assert_eq!(VolumePriceRelation::Others.description(), "Neutral");
    }

    proptest! {
        #[test]
        fn prop_query_matches_brute_force(
            volumes in prop::collection::vec(0.0f64..1_000.0, 1..64),
            a in 0usize..64,
            b in 0usize..64,
        ) {
            let bars: Vec<Bar> = volumes
                .iter()
                .map(|v| Bar::new(0, 1.0, 1.0, 1.0, 1.0, *v))
                .collect();
            let n = bars.len();
            let (s, e) = (a.min(b) % n, a.max(b) % n);
            let (s, e) = (s.min(e), s.max(e));

            let prefix = VolumePrefixSum::build(&bars);
            let expected: f64 = volumes[s..=e].iter().sum();
            prop_assert!((prefix.query(s, e) - expected).abs() < 1e-6);
        }
    }
}
