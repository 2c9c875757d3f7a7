//! # analysis
//!
//! Windowed aggregates computed from the bar series: volume/price relation
//! classification and simple moving averages. Both cache per chart instance
//! and invalidate on the series generation.

pub mod moving_average;
pub mod volume_price;

pub use moving_average::*;
pub use volume_price::*;

/// Cache key for anything derived from a [`kline_core::BarSeries`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeriesStamp {
    pub generation: u64,
    pub len: usize,
}

impl SeriesStamp {
    pub fn of(series: &kline_core::BarSeries) -> Self {
        Self {
            generation: series.generation(),
            len: series.len(),
        }
    }
}
