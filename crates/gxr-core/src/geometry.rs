#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Screen-space points use `f64` pixels with the origin at the top-left of
//! the view. [`Quad`] is the perspective destination quadrilateral, listed
//! top-left, top-right, bottom-right, bottom-left.

use std::fmt;
use std::ops::{Add, Sub};

/// Relative tolerance for treating three points as collinear.
///
/// Compared against `|cross| / (|ab| * |ac|)`, i.e. the sine of the angle
/// at the first point.
pub const COLLINEAR_EPSILON: f64 = 1e-9;

/// A 2D point (or vector) in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between `self` and `other`.
    #[inline]
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Euclidean distance to `other`.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Angle in degrees of the vector from `other` to `self`, in `(-180, 180]`.
    #[inline]
    #[must_use]
    pub fn angle_from_deg(self, other: Self) -> f64 {
        (self.y - other.y).atan2(self.x - other.x).to_degrees()
    }

    /// 2D cross product (z component) of `self` and `other` as vectors.
    #[inline]
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Vector length.
    #[inline]
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Both coordinates are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Four corners, clockwise from top-left in screen space.
pub type Quad = [Point; 4];

/// The unit square `[(0,0), (1,0), (1,1), (0,1)]`, the texture-space source
/// quad for perspective warps.
pub const UNIT_SQUARE: Quad = [
    Point::new(0.0, 0.0),
    Point::new(1.0, 0.0),
    Point::new(1.0, 1.0),
    Point::new(0.0, 1.0),
];

/// Whether `a`, `b`, `c` lie (numerically) on one line.
///
/// The test is scale-free: the sine of the angle at `a` is compared against
/// [`COLLINEAR_EPSILON`], so a quad of any size is judged by its shape only.
/// Coincident points count as collinear.
#[must_use]
pub fn is_collinear(a: Point, b: Point, c: Point) -> bool {
    let ab = b - a;
    let ac = c - a;
    let scale = ab.length() * ac.length();
    if scale == 0.0 {
        return true;
    }
    (ab.cross(ac) / scale).abs() <= COLLINEAR_EPSILON
}

/// Check the quad invariant: finite corners, no collinear triple.
pub fn validate_quad(quad: &Quad) -> Result<(), QuadError> {
    if let Some(index) = quad.iter().position(|p| !p.is_finite()) {
        return Err(QuadError::NonFinite { index });
    }
    const TRIPLES: [[usize; 3]; 4] = [[0, 1, 2], [0, 1, 3], [0, 2, 3], [1, 2, 3]];
    for [i, j, k] in TRIPLES {
        if is_collinear(quad[i], quad[j], quad[k]) {
            return Err(QuadError::Collinear { indices: [i, j, k] });
        }
    }
    Ok(())
}

/// Why a quad was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadError {
    /// A corner has a NaN or infinite coordinate.
    NonFinite { index: usize },
    /// Three corners are collinear (or coincident).
    Collinear { indices: [usize; 3] },
    /// Corner index outside `0..4`.
    IndexOutOfRange { index: usize },
}

impl fmt::Display for QuadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite { index } => write!(f, "corner {index} is not finite"),
            Self::Collinear { indices: [i, j, k] } => {
                write!(f, "corners {i}, {j}, {k} are collinear")
            }
            Self::IndexOutOfRange { index } => write!(f, "corner index {index} out of range"),
        }
    }
}

impl std::error::Error for QuadError {}

/// A world-space pose supplied by the AR runtime.
///
/// The core never interprets it; it is copied verbatim from a hit-test
/// result into the transform's anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    /// Translation in metres.
    pub position: [f64; 3],
    /// Unit quaternion `[x, y, z, w]`.
    pub orientation: [f64; 4],
}

impl Pose {
    /// Origin, no rotation.
    pub const IDENTITY: Self = Self {
        position: [0.0, 0.0, 0.0],
        orientation: [0.0, 0.0, 0.0, 1.0],
    };

    /// Create a pose from a position and `[x, y, z, w]` quaternion.
    #[must_use]
    pub const fn new(position: [f64; 3], orientation: [f64; 4]) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Build a pose from a column-major 4x4 rigid transform, as delivered by
    /// WebXR/ARCore hit results.
    #[must_use]
    pub fn from_matrix(m: &[f64; 16]) -> Self {
        let position = [m[12], m[13], m[14]];
        // Rotation part, row r / column c at m[c * 4 + r].
        let (m00, m01, m02) = (m[0], m[4], m[8]);
        let (m10, m11, m12) = (m[1], m[5], m[9]);
        let (m20, m21, m22) = (m[2], m[6], m[10]);
        let trace = m00 + m11 + m22;
        let orientation = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            [(m21 - m12) / s, (m02 - m20) / s, (m10 - m01) / s, 0.25 * s]
        } else if m00 > m11 && m00 > m22 {
            let s = (1.0 + m00 - m11 - m22).sqrt() * 2.0;
            [0.25 * s, (m01 + m10) / s, (m02 + m20) / s, (m21 - m12) / s]
        } else if m11 > m22 {
            let s = (1.0 + m11 - m00 - m22).sqrt() * 2.0;
            [(m01 + m10) / s, 0.25 * s, (m12 + m21) / s, (m02 - m20) / s]
        } else {
            let s = (1.0 + m22 - m00 - m11).sqrt() * 2.0;
            [(m02 + m20) / s, (m12 + m21) / s, 0.25 * s, (m10 - m01) / s]
        };
        Self {
            position,
            orientation,
        }
    }

    /// All components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.iter().chain(&self.orientation).all(|v| v.is_finite())
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}
