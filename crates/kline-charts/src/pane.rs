//! # pane
//!
//! Vertical bands of the plot area, each with its own price scale.

use crate::scale::{PriceScale, clamp_padding};
use kline_core::PriceRange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaneId {
    Main,
    Volume,
}

impl PaneId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Volume => "volume",
        }
    }
}

/// Requested pane: id, title and share of the plot height
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneSpec {
    pub id: PaneId,
    pub title: String,
    pub weight: f64,
}

impl PaneSpec {
    pub fn new(id: PaneId, title: impl Into<String>, weight: f64) -> Self {
        Self {
            id,
            title: title.into(),
            weight,
        }
    }

    pub fn main() -> Self {
        Self::new(PaneId::Main, "", 3.0)
    }

    pub fn volume() -> Self {
        Self::new(PaneId::Volume, "VOL", 1.0)
    }
}

/// One laid-out pane for the current frame. `top` is in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Pane {
    pub id: PaneId,
    pub title: String,
    pub top: f64,
    pub height: f64,
    pub price_range: PriceRange,
    pub padding_top: f64,
    pub padding_bottom: f64,
}

impl Pane {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Inclusive test against `[top, top + height]`
    pub fn contains_y(&self, y: f64) -> bool {
        y >= self.top && y <= self.bottom()
    }

    /// Scale mapping prices to pane-local Y
    pub fn scale(&self) -> PriceScale {
        PriceScale::new(self.price_range, self.height).padding(self.padding_top, self.padding_bottom)
    }

    /// Pane-local Y of `price`
    pub fn price_to_y(&self, price: f64) -> f64 {
        self.scale().price_to_y(price)
    }

    /// Price at pane-local `y`
    pub fn y_to_price(&self, y: f64) -> f64 {
        self.scale().y_to_price(y)
    }

    pub fn set_price_range(&mut self, range: PriceRange) {
        self.price_range = range;
    }
}

/// Stack panes top to bottom, splitting `plot_height` by weight with
/// `pane_gap` between neighbours. Non-positive weights count as zero.
pub fn layout_panes(plot_height: f64, specs: &[PaneSpec], pane_gap: f64, y_padding_px: f64) -> Vec<Pane> {
    if specs.is_empty() {
        return Vec::new();
    }

    let gaps = pane_gap * (specs.len() - 1) as f64;
    let available = (plot_height - gaps).max(0.0);
    let total_weight: f64 = specs.iter().map(|s| s.weight.max(0.0)).sum();

    let mut top = 0.0;
    specs
        .iter()
        .map(|spec| {
            let share = if total_weight > 0.0 {
                spec.weight.max(0.0) / total_weight
            } else {
                1.0 / specs.len() as f64
            };
            let height = available * share;
            let padding = clamp_padding(y_padding_px, height);
            let pane = Pane {
                id: spec.id,
                title: spec.title.clone(),
                top,
                height,
                price_range: PriceRange::FALLBACK,
                padding_top: padding,
                padding_bottom: padding,
            };
            top += height + pane_gap;
            pane
        })
        .collect()
}

/// Pane whose band contains canvas `y`, if any
pub fn pane_at(panes: &[Pane], y: f64) -> Option<&Pane> {
    panes.iter().find(|pane| pane.contains_y(y))
}
