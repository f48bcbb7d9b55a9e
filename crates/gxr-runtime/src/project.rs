#![forbid(unsafe_code)]

//! Project files.
//!
//! A project is a JSON document (`.gxr`) holding one edit snapshot plus the
//! image references it was made with:
//!
//! ```json
//! {
//!   "version": 1,
//!   "timestamp_ms": 1760000000000,
//!   "mode": "overlay",
//!   "transform": { "scale": 1.5, "rotation_deg": 10.0, ... },
//!   "adjustments": { "opacity": 0.8, ... },
//!   "images": { "overlay": "data:image/png;base64,..." }
//! }
//! ```
//!
//! Loading checks the version before anything else, then the transform and
//! adjustment invariants. The editor applies a loaded project as a history
//! commit.

use std::fmt;
use std::path::Path;

use gxr_core::{AdjustmentState, EditSnapshot, QuadError, TransformState};
use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::images::ImageHandle;
use crate::mode::EditorMode;

/// The only format version this crate reads and writes.
pub const PROJECT_VERSION: u32 = 1;

/// File extension for saved projects.
pub const PROJECT_EXTENSION: &str = "gxr";

/// Image references stored with a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectImages {
    pub overlay: Option<ImageHandle>,
    pub background_removed: Option<ImageHandle>,
    pub background: Option<ImageHandle>,
}

/// A saved editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub version: u32,
    /// Milliseconds since the Unix epoch at save time.
    #[serde(default)]
    pub timestamp_ms: u64,
    #[serde(default)]
    pub mode: EditorMode,
    pub transform: TransformState,
    pub adjustments: AdjustmentState,
    #[serde(default)]
    pub images: ProjectImages,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl ProjectFile {
    /// Capture `snapshot` now.
    #[must_use]
    pub fn new(snapshot: EditSnapshot, images: ProjectImages, mode: EditorMode) -> Self {
        Self {
            version: PROJECT_VERSION,
            timestamp_ms: now_ms(),
            mode,
            transform: snapshot.transform,
            adjustments: snapshot.adjustments,
            images,
        }
    }

    /// The edit state to commit on load.
    #[must_use]
    pub fn snapshot(&self) -> EditSnapshot {
        EditSnapshot::new(self.transform, self.adjustments)
    }

    /// `GraffitiXR_Project_<timestamp>.gxr`
    #[must_use]
    pub fn suggested_file_name(&self) -> String {
        format!("GraffitiXR_Project_{}.{PROJECT_EXTENSION}", self.timestamp_ms)
    }

    /// Check the loaded values.
    pub fn validate(&self) -> Result<(), ProjectError> {
        if self.version != PROJECT_VERSION {
            return Err(ProjectError::UnsupportedVersion {
                found: self.version,
            });
        }
        let scale = self.transform.scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ProjectError::InvalidScale(scale));
        }
        if !self.transform.rotation_deg.is_finite() || !self.transform.offset.is_finite() {
            return Err(ProjectError::NonFiniteTransform);
        }
        self.transform.validate().map_err(ProjectError::InvalidCorners)?;
        if !self.adjustments.is_valid() {
            return Err(ProjectError::InvalidAdjustments);
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, ProjectError> {
        serde_json::to_string_pretty(self).map_err(ProjectError::Json)
    }

    /// Parse and validate.
    pub fn from_json(s: &str) -> Result<Self, ProjectError> {
        let probe: VersionProbe = serde_json::from_str(s).map_err(ProjectError::Json)?;
        if probe.version != PROJECT_VERSION {
            return Err(ProjectError::UnsupportedVersion {
                found: probe.version,
            });
        }
        let project: Self = serde_json::from_str(s).map_err(ProjectError::Json)?;
        project.validate()?;
        Ok(project)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        std::fs::write(path.as_ref(), self.to_json()?).map_err(ProjectError::Io)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ProjectError::Io)?;
        Self::from_json(&content)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors from saving or loading a project.
#[derive(Debug)]
pub enum ProjectError {
    Io(std::io::Error),
    Json(serde_json::Error),
    UnsupportedVersion { found: u32 },
    InvalidScale(f64),
    NonFiniteTransform,
    InvalidCorners(QuadError),
    InvalidAdjustments,
}

impl fmt::Display for ProjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::UnsupportedVersion { found } => write!(
                f,
                "unsupported project version {found} (expected {PROJECT_VERSION})"
            ),
            Self::InvalidScale(s) => write!(f, "invalid scale {s}"),
            Self::NonFiniteTransform => f.write_str("transform has non-finite values"),
            Self::InvalidCorners(e) => write!(f, "invalid corners: {e}"),
            Self::InvalidAdjustments => f.write_str("adjustments out of range"),
        }
    }
}

impl std::error::Error for ProjectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::InvalidCorners(e) => Some(e),
            _ => None,
        }
    }
}
