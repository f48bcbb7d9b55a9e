#![forbid(unsafe_code)]

//! Editor configuration.
//!
//! [`EditorConfig`] groups every tunable of a session. It loads from JSON
//! always, and from TOML with the `policy-config` feature (on by default).
//! Every field has a default, so a partial file only overrides what it names.
//!
//! ```toml
//! commit_on_gesture_end = true
//! min_scale = 0.05
//!
//! [gesture]
//! scale_jitter_floor = 0.01
//!
//! [history]
//! max_depth = 50
//!
//! [render]
//! rotation_axis = "view_z"
//! ```

use std::path::Path;

use gxr_core::transform::MIN_SCALE;
use gxr_core::{GestureConfig, HomographySolver};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::frame::RenderAdapterConfig;
use crate::mode::EditorMode;
use crate::undo::HistoryConfig;

/// Top-level configuration for an [`EditorSession`](crate::EditorSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub gesture: GestureConfig,
    pub history: HistoryConfig,
    /// Homography solver tolerances.
    pub solver: HomographySolver,
    pub render: RenderAdapterConfig,
    /// Scale floor for gesture-driven scaling.
    pub min_scale: f64,
    /// Checkpoint the transform when the last pointer of a gesture lifts.
    pub commit_on_gesture_end: bool,
    pub initial_mode: EditorMode,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            gesture: GestureConfig::default(),
            history: HistoryConfig::default(),
            solver: HomographySolver::default(),
            render: RenderAdapterConfig::default(),
            min_scale: MIN_SCALE,
            commit_on_gesture_end: true,
            initial_mode: EditorMode::default(),
        }
    }
}

impl EditorConfig {
    /// Parse from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Parse from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }

    /// Check value ranges. Returns one message per problem.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let floor = self.gesture.scale_jitter_floor;
        if !floor.is_finite() || !(0.0..1.0).contains(&floor) {
            errors.push(format!("gesture.scale_jitter_floor must be in [0, 1), got {floor}"));
        }
        let floor = self.gesture.rotation_floor_deg;
        if !floor.is_finite() || !(0.0..180.0).contains(&floor) {
            errors.push(format!("gesture.rotation_floor_deg must be in [0, 180), got {floor}"));
        }

        if self.history.max_depth == 0 {
            errors.push("history.max_depth must be > 0".into());
        }

        let eps = self.solver.pivot_epsilon;
        if !eps.is_finite() || eps <= 0.0 || eps >= 1.0 {
            errors.push(format!("solver.pivot_epsilon must be in (0, 1), got {eps}"));
        }

        if !self.min_scale.is_finite() || self.min_scale <= 0.0 {
            errors.push(format!("min_scale must be > 0, got {}", self.min_scale));
        }

        let width = self.render.base_width_m;
        if !width.is_finite() || width <= 0.0 {
            errors.push(format!("render.base_width_m must be > 0, got {width}"));
        }

        errors
    }

    /// `validate`, turned into a `Result`.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(self);
        }
        for e in &errors {
            warn!(problem = e.as_str(), "rejected editor config value");
        }
        Err(ConfigError::Validation(errors))
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when loading an editor configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "policy-config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => {
                write!(f, "validation errors: {}", errors.join("; "))
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "policy-config")]
            Self::Toml(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}
