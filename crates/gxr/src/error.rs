#![forbid(unsafe_code)]

//! Unified error model and recovery actions.
//!
//! # Design Principles
//!
//! 1. **Typed per subsystem.** Geometry, solver, adjustments, placement,
//!    projects and config each own an error enum; this module only wraps them.
//! 2. **Nothing is fatal.** Every variant maps to a [`RecoveryAction`] that
//!    keeps the editor session usable.
//! 3. **No tracing dependency.** Errors carry the context needed for log
//!    fields; callers decide what to log.

use std::fmt;

use gxr_core::{AdjustmentError, DegenerateConfiguration, QuadError};
use gxr_runtime::{ConfigError, PlacementError, ProjectError};

// ── Unified Error ───────────────────────────────────────────────────────

/// Top-level error type for the editor.
///
/// Use [`Error::recovery`] to decide how to keep the session alive.
#[derive(Debug)]
pub enum Error {
    /// A corner quad violates the quad invariant.
    Quad(QuadError),
    /// The homography solve failed.
    Degenerate(DegenerateConfiguration),
    /// An adjustment value was rejected.
    Adjustment(AdjustmentError),
    /// A placement action was invalid in the current state.
    Placement(PlacementError),
    /// Project save or load failed.
    Project(ProjectError),
    /// Editor configuration could not be loaded.
    Config(ConfigError),
}

/// Standard result type for gxr APIs.
pub type Result<T> = std::result::Result<T, Error>;

// ── Recovery ────────────────────────────────────────────────────────────

/// What the caller should do when an operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Keep the previous valid state (quad, homography) and continue.
    KeepPrevious,
    /// Show the user a message; state is unchanged.
    Notify,
    /// Drop the request silently.
    Ignore,
    /// Return placement to searching.
    ResetPlacement,
    /// Refuse the input (file, value, config) as a whole.
    Reject,
}

impl Error {
    /// The recovery action for this error.
    #[must_use]
    pub fn recovery(&self) -> RecoveryAction {
        match self {
            Self::Quad(_) | Self::Degenerate(_) => RecoveryAction::KeepPrevious,
            Self::Adjustment(_) => RecoveryAction::Reject,

            Self::Placement(PlacementError::NoReticle { .. }) => RecoveryAction::ResetPlacement,
            Self::Placement(PlacementError::Locked) => RecoveryAction::Notify,
            Self::Placement(PlacementError::NotPlaced { .. } | PlacementError::NotLocked { .. }) => {
                RecoveryAction::Ignore
            }

            Self::Project(ProjectError::Io(_) | ProjectError::Json(_)) => RecoveryAction::Notify,
            Self::Project(_) => RecoveryAction::Reject,

            Self::Config(_) => RecoveryAction::Reject,
        }
    }

    /// Error type label for log fields.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Quad(_) => "quad",
            Self::Degenerate(_) => "degenerate",
            Self::Adjustment(_) => "adjustment",
            Self::Placement(_) => "placement",
            Self::Project(_) => "project",
            Self::Config(_) => "config",
        }
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quad(err) => write!(f, "invalid quad: {err}"),
            Self::Degenerate(err) => write!(f, "{err}"),
            Self::Adjustment(err) => write!(f, "{err}"),
            Self::Placement(err) => write!(f, "{err}"),
            Self::Project(err) => write!(f, "project: {err}"),
            Self::Config(err) => write!(f, "config: {err}"),
        }
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepPrevious => write!(f, "keep_previous"),
            Self::Notify => write!(f, "notify"),
            Self::Ignore => write!(f, "ignore"),
            Self::ResetPlacement => write!(f, "reset_placement"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

// ── std::error::Error ───────────────────────────────────────────────────

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Quad(err) => Some(err),
            Self::Degenerate(err) => Some(err),
            Self::Adjustment(err) => Some(err),
            Self::Placement(err) => Some(err),
            Self::Project(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<QuadError> for Error {
    fn from(err: QuadError) -> Self {
        Self::Quad(err)
    }
}

impl From<DegenerateConfiguration> for Error {
    fn from(err: DegenerateConfiguration) -> Self {
        Self::Degenerate(err)
    }
}

impl From<AdjustmentError> for Error {
    fn from(err: AdjustmentError) -> Self {
        Self::Adjustment(err)
    }
}

impl From<PlacementError> for Error {
    fn from(err: PlacementError) -> Self {
        Self::Placement(err)
    }
}

impl From<ProjectError> for Error {
    fn from(err: ProjectError) -> Self {
        Self::Project(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

// ── Tests ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::error::Error as StdError;

    use gxr_core::AdjustmentKey;

    use super::*;

    #[test]
    fn quad_errors_keep_previous() {
        let err = Error::from(QuadError::Collinear { indices: [0, 1, 2] });
        assert_eq!(err.recovery(), RecoveryAction::KeepPrevious);
        assert_eq!(err.error_type(), "quad");
        assert!(err.to_string().starts_with("invalid quad"));
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn solver_errors_keep_previous() {
        let err = Error::from(DegenerateConfiguration::SingularResult { determinant: 0.0 });
        assert_eq!(err.recovery(), RecoveryAction::KeepPrevious);
    }

    #[test]
    fn adjustment_errors_reject() {
        let err = Error::from(AdjustmentError::NonFinite {
            key: AdjustmentKey::Contrast,
            value: f64::NAN,
        });
        assert_eq!(err.recovery(), RecoveryAction::Reject);
    }

    #[test]
    fn placement_recovery_by_variant() {
        let cases = [
            (
                PlacementError::NoReticle { state: "searching" },
                RecoveryAction::ResetPlacement,
            ),
            (PlacementError::Locked, RecoveryAction::Notify),
            (
                PlacementError::NotPlaced { state: "searching" },
                RecoveryAction::Ignore,
            ),
            (
                PlacementError::NotLocked { state: "placed" },
                RecoveryAction::Ignore,
            ),
        ];
        for (placement, expected) in cases {
            assert_eq!(Error::from(placement).recovery(), expected, "{placement:?}");
        }
    }

    #[test]
    fn project_io_notifies_and_bad_content_rejects() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(
            Error::from(ProjectError::Io(io)).recovery(),
            RecoveryAction::Notify
        );
        assert_eq!(
            Error::from(ProjectError::UnsupportedVersion { found: 9 }).recovery(),
            RecoveryAction::Reject
        );
        assert_eq!(
            Error::from(ProjectError::InvalidScale(0.0)).recovery(),
            RecoveryAction::Reject
        );
    }

    #[test]
    fn config_errors_reject() {
        let err = Error::from(ConfigError::Validation(vec!["min_scale must be > 0".into()]));
        assert_eq!(err.recovery(), RecoveryAction::Reject);
        assert!(err.to_string().starts_with("config"));
    }

    #[test]
    fn recovery_action_display() {
        assert_eq!(RecoveryAction::KeepPrevious.to_string(), "keep_previous");
        assert_eq!(RecoveryAction::ResetPlacement.to_string(), "reset_placement");
    }
}
