#![forbid(unsafe_code)]

//! Canonical placement state.
//!
//! [`TransformState`] is the one long-lived value the renderers read every
//! frame. All updates are by value: each `apply_*`/`with_*` method returns a
//! new state and leaves `self` untouched, so a reader holding a copy never
//! sees a half-applied edit.
//!
//! # Invariants
//!
//! - `scale` is finite and `>= min_scale` (default [`MIN_SCALE`]).
//! - `rotation_deg` is any finite real; use [`TransformState::normalized_rotation`]
//!   when comparing.
//! - `corners`, when present, satisfy [`validate_quad`].
//!
//! # Failure Modes
//!
//! | Input | Behavior |
//! |-------|----------|
//! | Scale factor that would reach `<= 0` | Clamped to `min_scale` |
//! | Non-finite delta | Ignored, state unchanged |
//! | Degenerate corner edit | `Err(QuadError)`, state unchanged |

use crate::geometry::{Point, Pose, Quad, QuadError, UNIT_SQUARE, validate_quad};
use crate::gesture::GestureDelta;

/// Smallest scale the transform will clamp to.
pub const MIN_SCALE: f64 = 0.01;

/// Placement of the overlay image.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TransformState {
    pub scale: f64,
    pub rotation_deg: f64,
    pub offset: Point,
    /// Perspective destination quad; `None` means pure affine placement.
    pub corners: Option<Quad>,
    /// World pose the placement is anchored to in AR mode.
    pub anchor: Option<Pose>,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_deg: 0.0,
            offset: Point::ZERO,
            corners: None,
            anchor: None,
        }
    }
}

impl TransformState {
    /// Identity placement.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate by `(dx, dy)`.
    #[must_use]
    pub fn apply_pan(&self, dx: f64, dy: f64) -> Self {
        if !dx.is_finite() || !dy.is_finite() {
            return *self;
        }
        Self {
            offset: Point::new(self.offset.x + dx, self.offset.y + dy),
            ..*self
        }
    }

    /// Multiply scale by `factor`, clamping at [`MIN_SCALE`].
    #[must_use]
    pub fn apply_scale(&self, factor: f64) -> Self {
        self.apply_scale_clamped(factor, MIN_SCALE)
    }

    /// Multiply scale by `factor`, clamping at `min_scale`.
    #[must_use]
    pub fn apply_scale_clamped(&self, factor: f64, min_scale: f64) -> Self {
        let scaled = self.scale * factor;
        if !scaled.is_finite() {
            return *self;
        }
        let floor = if min_scale > 0.0 { min_scale } else { MIN_SCALE };
        Self {
            scale: scaled.max(floor),
            ..*self
        }
    }

    /// Rotate by `delta_radians`.
    #[must_use]
    pub fn apply_rotate(&self, delta_radians: f64) -> Self {
        let delta = delta_radians.to_degrees();
        if !delta.is_finite() {
            return *self;
        }
        Self {
            rotation_deg: self.rotation_deg + delta,
            ..*self
        }
    }

    /// Apply a decoded gesture delta.
    #[must_use]
    pub fn apply_delta(&self, delta: GestureDelta, min_scale: f64) -> Self {
        match delta {
            GestureDelta::Pan { dx, dy } => self.apply_pan(dx, dy),
            GestureDelta::Scale(factor) => self.apply_scale_clamped(factor, min_scale),
            GestureDelta::Rotate(radians) => self.apply_rotate(radians),
        }
    }

    /// Rotation folded into `[-180, 180]`.
    #[must_use]
    pub fn normalized_rotation(&self) -> f64 {
        let r = self.rotation_deg % 360.0;
        if r > 180.0 {
            r - 360.0
        } else if r < -180.0 {
            r + 360.0
        } else {
            r
        }
    }

    /// Whether the placement is in perspective (corner) mode.
    #[inline]
    #[must_use]
    pub fn is_perspective(&self) -> bool {
        self.corners.is_some()
    }

    /// Enter perspective mode with `corners`.
    pub fn with_corners(&self, corners: Quad) -> Result<Self, QuadError> {
        validate_quad(&corners)?;
        Ok(Self {
            corners: Some(corners),
            ..*self
        })
    }

    /// Move one corner handle. Starts from `default_corners` when the state
    /// has no quad yet.
    pub fn move_corner(
        &self,
        index: usize,
        to: Point,
        default_corners: &Quad,
    ) -> Result<Self, QuadError> {
        if index >= 4 {
            return Err(QuadError::IndexOutOfRange { index });
        }
        let mut corners = self.corners.unwrap_or(*default_corners);
        corners[index] = to;
        self.with_corners(corners)
    }

    /// Return to affine mode.
    #[must_use]
    pub fn clear_corners(&self) -> Self {
        Self {
            corners: None,
            ..*self
        }
    }

    /// Attach (or replace) the AR anchor pose.
    #[must_use]
    pub fn with_anchor(&self, pose: Pose) -> Self {
        Self {
            anchor: Some(pose),
            ..*self
        }
    }

    #[must_use]
    pub fn clear_anchor(&self) -> Self {
        Self {
            anchor: None,
            ..*self
        }
    }

    /// Check the invariants, e.g. after deserialization.
    pub fn validate(&self) -> Result<(), QuadError> {
        if let Some(corners) = &self.corners {
            validate_quad(corners)?;
        }
        Ok(())
    }

    /// Axis-aligned quad of `width` x `height` centred on the current offset,
    /// used as the starting point for corner editing.
    #[must_use]
    pub fn initial_corners(&self, width: f64, height: f64) -> Quad {
        let half = Point::new(width * self.scale / 2.0, height * self.scale / 2.0);
        UNIT_SQUARE.map(|p| {
            Point::new(
                self.offset.x - half.x + p.x * 2.0 * half.x,
                self.offset.y - half.y + p.y * 2.0 * half.y,
            )
        })
    }
}
