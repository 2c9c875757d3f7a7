//! # config
//!
//! Chart options with serde defaults, builders and validation.

use crate::analysis::VolumePriceConfig;
use crate::pane::PaneSpec;
use kline_core::{ConfigError, colors};
use serde::{Deserialize, Serialize};

/// Which of the standard moving averages are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovingAverageFlags {
    pub ma5: bool,
    pub ma10: bool,
    pub ma20: bool,
}

impl Default for MovingAverageFlags {
    fn default() -> Self {
        Self {
            ma5: true,
            ma10: true,
            ma20: true,
        }
    }
}

impl MovingAverageFlags {
    pub fn none() -> Self {
        Self {
            ma5: false,
            ma10: false,
            ma20: false,
        }
    }

    /// Enabled `(period, colour)` pairs in ascending period
    pub fn enabled(&self) -> Vec<(usize, &'static str)> {
        [
            (self.ma5, 5, colors::MA5),
            (self.ma10, 10, colors::MA10),
            (self.ma20, 20, colors::MA20),
        ]
        .into_iter()
        .filter(|(on, _, _)| *on)
        .map(|(_, period, color)| (period, color))
        .collect()
    }
}

/// Top-level chart options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    /// Bar body width in logical pixels
    pub k_width: f64,
    /// Space between bars in logical pixels
    pub k_gap: f64,
    pub min_k_width: f64,
    pub max_k_width: f64,
    /// Width multiplier per wheel notch
    pub zoom_step: f64,
    /// Price-axis gutter on the right of the plot
    pub right_axis_width: f64,
    /// Time-axis gutter below the plot
    pub bottom_axis_height: f64,
    /// Vertical padding inside each pane's price band
    pub y_padding_px: f64,
    pub pane_gap: f64,
    pub panes: Vec<PaneSpec>,
    pub moving_averages: MovingAverageFlags,
    pub volume_price: VolumePriceConfig,
    pub show_extrema: bool,
    pub show_last_price: bool,
    pub show_grid: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self::standard()
    }
}

impl ChartOptions {
    pub fn standard() -> Self {
        Self {
            k_width: 8.0,
            k_gap: 2.0,
            min_k_width: 1.0,
            max_k_width: 48.0,
            zoom_step: 1.1,
            right_axis_width: 64.0,
            bottom_axis_height: 24.0,
            y_padding_px: 8.0,
            pane_gap: 0.0,
            panes: vec![PaneSpec::main(), PaneSpec::volume()],
            moving_averages: MovingAverageFlags::default(),
            volume_price: VolumePriceConfig::default(),
            show_extrema: true,
            show_last_price: true,
            show_grid: true,
        }
    }

    /// Price pane only, thin bars, no decorations
    pub fn compact() -> Self {
        Self {
            k_width: 4.0,
            k_gap: 1.0,
            right_axis_width: 48.0,
            bottom_axis_height: 20.0,
            y_padding_px: 4.0,
            panes: vec![PaneSpec::main()],
            moving_averages: MovingAverageFlags::none(),
            show_extrema: false,
            show_grid: false,
            ..Self::standard()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn with_bar(mut self, k_width: f64, k_gap: f64) -> Self {
        self.k_width = k_width;
        self.k_gap = k_gap;
        self
    }

    pub fn with_zoom_bounds(mut self, min_k_width: f64, max_k_width: f64) -> Self {
        self.min_k_width = min_k_width;
        self.max_k_width = max_k_width;
        self
    }

    pub fn with_axes(mut self, right_axis_width: f64, bottom_axis_height: f64) -> Self {
        self.right_axis_width = right_axis_width;
        self.bottom_axis_height = bottom_axis_height;
        self
    }

    pub fn with_panes(mut self, panes: Vec<PaneSpec>) -> Self {
        self.panes = panes;
        self
    }

    /// Vertical space between neighbouring panes
    pub fn with_pane_gap(mut self, pane_gap: f64) -> Self {
        self.pane_gap = pane_gap;
        self
    }

    pub fn with_moving_averages(mut self, flags: MovingAverageFlags) -> Self {
        self.moving_averages = flags;
        self
    }

    pub fn with_volume_price(mut self, config: VolumePriceConfig) -> Self {
        self.volume_price = config;
        self
    }

    /// `k_width + k_gap`
    pub fn unit(&self) -> f64 {
        self.k_width + self.k_gap
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for width in [self.k_width, self.min_k_width, self.max_k_width] {
            if !width.is_finite() || width <= 0.0 {
                return Err(ConfigError::InvalidBarWidth(width));
            }
        }
        if !self.k_gap.is_finite() || self.k_gap < 0.0 {
            return Err(ConfigError::InvalidBarGap(self.k_gap));
        }
        if self.min_k_width > self.max_k_width {
            return Err(ConfigError::InvertedZoomBounds {
                min: self.min_k_width,
                max: self.max_k_width,
            });
        }
        if self.k_width < self.min_k_width || self.k_width > self.max_k_width {
            return Err(ConfigError::BarWidthOutOfZoomBounds {
                width: self.k_width,
                min: self.min_k_width,
                max: self.max_k_width,
            });
        }
        if !self.zoom_step.is_finite() || self.zoom_step <= 1.0 {
            return Err(ConfigError::InvalidZoomStep(self.zoom_step));
        }

        let gutters = [
            ("right_axis_width", self.right_axis_width),
            ("bottom_axis_height", self.bottom_axis_height),
            ("y_padding_px", self.y_padding_px),
            ("pane_gap", self.pane_gap),
        ];
        for (name, value) in gutters {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidGutter { name, value });
            }
        }

        if self.panes.is_empty() {
            return Err(ConfigError::NoPanes);
        }
        for pane in &self.panes {
            if !pane.weight.is_finite() || pane.weight <= 0.0 {
                return Err(ConfigError::InvalidPaneWeight {
                    id: pane.id.as_str().to_string(),
                    weight: pane.weight,
                });
            }
        }

        let vp = &self.volume_price;
        if vp.avg_period == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        let thresholds = [
            ("volume_amplify_threshold", vp.volume_amplify_threshold),
            ("volume_shrink_threshold", vp.volume_shrink_threshold),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidThreshold { name, value });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pane::PaneId;

    #[test]
    fn test_presets_validate() {
        assert!(ChartOptions::standard().validate().is_ok());
        assert!(ChartOptions::compact().validate().is_ok());
        assert_eq!(ChartOptions::default().unit(), 10.0);
    }

    #[test]
    fn test_validation_errors() {
        let opts = ChartOptions::default().with_bar(0.0, 2.0);
        assert_eq!(opts.validate(), Err(ConfigError::InvalidBarWidth(0.0)));

        let opts = ChartOptions::default().with_bar(8.0, -1.0);
        assert_eq!(opts.validate(), Err(ConfigError::InvalidBarGap(-1.0)));

        let opts = ChartOptions::default().with_zoom_bounds(20.0, 4.0);
        assert!(matches!(opts.validate(), Err(ConfigError::InvertedZoomBounds { .. })));

        let opts = ChartOptions::default().with_bar(60.0, 2.0);
        assert_eq!(
            opts.validate(),
            Err(ConfigError::BarWidthOutOfZoomBounds {
                width: 60.0,
                min: 1.0,
                max: 48.0
            })
        );
        let opts = ChartOptions::default().with_bar(60.0, 2.0).with_zoom_bounds(1.0, 64.0);
        assert!(opts.validate().is_ok());

        let opts = ChartOptions::default().with_panes(vec![]);
        assert_eq!(opts.validate(), Err(ConfigError::NoPanes));

        let opts = ChartOptions::default().with_panes(vec![PaneSpec::new(PaneId::Volume, "VOL", -1.0)]);
        assert_eq!(
            opts.validate(),
            Err(ConfigError::InvalidPaneWeight {
                id: "volume".to_string(),
                weight: -1.0
            })
        );

        let opts = ChartOptions::default().with_volume_price(VolumePriceConfig::default().with_period(0));
        assert_eq!(opts.validate(), Err(ConfigError::ZeroPeriod));

        let opts = ChartOptions::default().with_pane_gap(-4.0);
        assert!(matches!(
            opts.validate(),
            Err(ConfigError::InvalidGutter { name: "pane_gap", .. })
        ));

        let opts = ChartOptions::default().with_axes(f64::NAN, 24.0);
        assert!(matches!(
            opts.validate(),
            Err(ConfigError::InvalidGutter { name: "right_axis_width", .. })
        ));
    }

    #[test]
    fn test_json_partial_uses_defaults() {
        let opts = ChartOptions::from_json(
            r#"{"k_width": 12, "panes": [{"id": "main", "title": "BTC", "weight": 1}], "volume_price": {"avg_period": 5}}"#,
        )
        .unwrap();
        assert_eq!(opts.k_width, 12.0);
        assert_eq!(opts.k_gap, 2.0);
        assert_eq!(opts.panes.len(), 1);
        assert_eq!(opts.panes[0].id, PaneId::Main);
        assert_eq!(opts.volume_price.avg_period, 5);
        assert_eq!(opts.volume_price.volume_amplify_threshold, 1.5);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_moving_average_flags() {
        let flags = MovingAverageFlags { ma10: false, ..Default::default() };
        let periods: Vec<usize> = flags.enabled().iter().map(|(p, _)| *p).collect();
        assert_eq!(periods, vec![5, 20]);
        assert!(MovingAverageFlags::none().enabled().is_empty());
    }
}
