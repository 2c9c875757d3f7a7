//! Errors for the few fallible entry points (option validation)

use thiserror::Error;

/// Rejected chart configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("bar width must be finite and positive, got {0}")]
    InvalidBarWidth(f64),

    #[error("bar gap must be finite and non-negative, got {0}")]
    InvalidBarGap(f64),

    #[error("zoom bounds are inverted: min {min} > max {max}")]
    InvertedZoomBounds { min: f64, max: f64 },

    #[error("bar width {width} is outside the zoom bounds [{min}, {max}]")]
    BarWidthOutOfZoomBounds { width: f64, min: f64, max: f64 },

    #[error("zoom step must be finite and greater than 1, got {0}")]
    InvalidZoomStep(f64),

    #[error("{name} must be finite and non-negative, got {value}")]
    InvalidGutter { name: &'static str, value: f64 },

    #[error("at least one pane is required")]
    NoPanes,

    #[error("pane `{id}` has non-positive weight {weight}")]
    InvalidPaneWeight { id: String, weight: f64 },

    #[error("averaging period must be at least 1")]
    ZeroPeriod,

    #[error("volume threshold `{name}` must be finite and positive, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConfigError::InvalidBarWidth(-1.0).to_string(),
            "bar width must be finite and positive, got -1"
        );
        assert_eq!(
            ConfigError::InvertedZoomBounds { min: 9.0, max: 3.0 }.to_string(),
            "zoom bounds are inverted: min 9 > max 3"
        );
    }
}
