//! # kline-components
//!
//! Leptos binding for the K-line chart: a scroll container with a sticky
//! `<canvas>`, pointer handlers forwarded to the interaction controller and
//! a hover tooltip.

pub mod chart;
pub mod tooltip;

pub use chart::*;
pub use tooltip::*;
