//! Core configuration for vizij-keyframe-core.

use serde::{Deserialize, Serialize};

use crate::error::KeyframeError;

/// Curve solver and authoring defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Newton-Raphson steps used to map a time fraction onto the Bezier parameter.
    pub newton_iterations: u32,
    /// Smallest time-tangent magnitude the solver will divide by.
    pub tangent_epsilon: f64,
    /// Time offset in seconds of freshly created Bezier handles.
    pub default_handle_time: f64,
    /// Maximum diagnostics retained per tick.
    pub max_tick_diagnostics: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            newton_iterations: 5,
            tangent_epsilon: 1e-4,
            default_handle_time: 0.1,
            max_tick_diagnostics: 256,
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON config; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, KeyframeError> {
        Ok(serde_json::from_str(json)?)
    }
}
