#![forbid(unsafe_code)]

//! Canonical pointer events.
//!
//! The platform input layer (touch, pen, or mouse) normalizes whatever it
//! receives into [`PointerEvent`]s before handing them to the
//! [`GestureRecognizer`](crate::gesture::GestureRecognizer).
//!
//! # Design Notes
//!
//! - Coordinates are view-space pixels as `f64`.
//! - Identifiers are opaque; only equality matters. Browsers reuse touch
//!   identifiers after release, which is fine because a released pointer
//!   frees its slot before the identifier can reappear.

/// Opaque pointer identifier supplied by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointerId(pub i64);

impl From<i64> for PointerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Lifecycle phase of a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    /// Pointer made contact.
    Down,
    /// Pointer moved while in contact.
    Move,
    /// Pointer lifted.
    Up,
    /// The platform aborted the pointer (palm rejection, system gesture).
    Cancel,
}

/// A single pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub id: PointerId,
    pub x: f64,
    pub y: f64,
    pub phase: PointerPhase,
}

impl PointerEvent {
    /// Pointer made contact at `(x, y)`.
    #[must_use]
    pub fn down(id: impl Into<PointerId>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            phase: PointerPhase::Down,
        }
    }

    /// Pointer moved to `(x, y)`.
    #[must_use]
    pub fn moved(id: impl Into<PointerId>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            phase: PointerPhase::Move,
        }
    }

    /// Pointer lifted. Position is ignored by the recognizer.
    #[must_use]
    pub fn up(id: impl Into<PointerId>) -> Self {
        Self {
            id: id.into(),
            x: 0.0,
            y: 0.0,
            phase: PointerPhase::Up,
        }
    }

    /// Pointer cancelled by the platform.
    #[must_use]
    pub fn cancel(id: impl Into<PointerId>) -> Self {
        Self {
            id: id.into(),
            x: 0.0,
            y: 0.0,
            phase: PointerPhase::Cancel,
        }
    }

    /// Event position as a point.
    #[inline]
    #[must_use]
    pub fn position(&self) -> crate::geometry::Point {
        crate::geometry::Point::new(self.x, self.y)
    }

    /// Whether this event ends the pointer's contact.
    #[inline]
    #[must_use]
    pub fn is_release(&self) -> bool {
        matches!(self.phase, PointerPhase::Up | PointerPhase::Cancel)
    }
}
