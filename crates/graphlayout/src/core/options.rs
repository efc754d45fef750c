//! Layout configuration shared by all modules

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors raised by invalid layout options
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptionsError {
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("iterations must be at least 1")]
    NoIterations,

    #[error("Invalid layout options: {message}")]
    Parse { message: String },
}

/// Tunables applied to every module the registry constructs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutOptions {
    /// Minimum gap between neighbouring nodes in the same layer or row
    pub node_spacing: f64,
    /// Gap between consecutive layers or tree levels
    pub level_spacing: f64,
    /// Target edge length for energy-based layouts
    pub ideal_edge_length: f64,
    /// Iteration budget for iterative layouts
    pub iterations: usize,
    /// Seed for the deterministic initial placement
    pub seed: u64,
    /// Abort iterative layouts after this many milliseconds
    pub time_limit_ms: Option<u64>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            node_spacing: 30.0,
            level_spacing: 60.0,
            ideal_edge_length: 80.0,
            iterations: 300,
            seed: 0x5eed,
            time_limit_ms: None,
        }
    }
}

impl LayoutOptions {
    /// Parse options from a JSON object; missing fields take their defaults
    ///
    /// Anything but an object, and any unknown key, is rejected.
    pub fn from_json(input: &str) -> Result<Self, OptionsError> {
        let parse_error = |e: serde_json::Error| OptionsError::Parse {
            message: e.to_string(),
        };
        let fields: serde_json::Map<String, serde_json::Value> = serde_json::from_str(input).map_err(parse_error)?;
        serde_json::from_value(serde_json::Value::Object(fields)).map_err(parse_error)
    }

    /// Check that every field is usable
    pub fn validate(&self) -> Result<(), OptionsError> {
        for (field, value) in [
            ("node_spacing", self.node_spacing),
            ("level_spacing", self.level_spacing),
            ("ideal_edge_length", self.ideal_edge_length),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(OptionsError::NotPositive { field, value });
            }
        }
        if self.iterations == 0 {
            return Err(OptionsError::NoIterations);
        }
        Ok(())
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(LayoutOptions::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_spacing() {
        let options = LayoutOptions {
            node_spacing: 0.0,
            ..Default::default()
        };
        let err = options.validate().unwrap_err();
        assert_eq!(
            err,
            OptionsError::NotPositive {
                field: "node_spacing",
                value: 0.0
            }
        );
    }

    #[test]
    fn test_rejects_nan_edge_length() {
        let options = LayoutOptions {
            ideal_edge_length: f64::NAN,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let options = LayoutOptions {
            iterations: 0,
            ..Default::default()
        };
        assert_eq!(options.validate(), Err(OptionsError::NoIterations));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options = LayoutOptions::from_json(r#"{"iterations": 10, "time_limit_ms": 500}"#).unwrap();
        assert_eq!(options.iterations, 10);
        assert_eq!(options.time_limit(), Some(Duration::from_millis(500)));
        assert_eq!(options.node_spacing, LayoutOptions::default().node_spacing);
    }

    #[test]
    fn test_malformed_json() {
        for input in ["[1, 2]", "42", "null", "{\"iterations\": "] {
            let err = LayoutOptions::from_json(input).unwrap_err();
            assert!(err.to_string().starts_with("Invalid layout options"), "{input}");
        }
    }

    #[test]
    fn test_misspelled_key_rejected() {
        let err = LayoutOptions::from_json(r#"{"node_spaceing": 40.0}"#).unwrap_err();
        assert!(err.to_string().contains("node_spaceing"));
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(LayoutOptions::from_json("{}").unwrap(), LayoutOptions::default());
    }
}
