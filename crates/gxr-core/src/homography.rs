#![forbid(unsafe_code)]

//! Four-point homography estimation.
//!
//! [`HomographySolver::solve`] computes the 3x3 projective transform `H`
//! with `H * src[i] ~ dst[i]` using the Direct Linear Transformation: each
//! correspondence contributes two rows to an 8x8 system in the unknowns
//! `h0..h7` (with `h8 = 1`), solved by Gaussian elimination with partial
//! pivoting.
//!
//! ```text
//! [ x  y  1  0  0  0  -X*x  -X*y ] [h0..h7]ᵀ = X
//! [ 0  0  0  x  y  1  -Y*x  -Y*y ]             Y
//! ```
//!
//! # Degeneracy
//!
//! A solve fails with [`DegenerateConfiguration`] when
//! - either quad has a non-finite corner or three collinear corners,
//! - a pivot falls below `pivot_epsilon` relative to the system's largest
//!   coefficient, or
//! - the resulting matrix is (numerically) singular.
//!
//! The geometric and singular-result checks matter: a unit square mapped
//! onto a quad with three collinear corners yields a perfectly solvable
//! linear system whose solution is a rank-deficient matrix. Pivoting alone
//! would hand that back as if it were valid.

use std::fmt;

use crate::geometry::{Point, Quad, QuadError, UNIT_SQUARE, validate_quad};
use crate::logging::warn;

/// Default relative pivot tolerance.
pub const PIVOT_EPSILON: f64 = 1e-12;

/// A 3x3 projective transform, row-major, normalized so `m[8] == 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Homography {
    pub m: [f64; 9],
}

impl Homography {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        m: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    /// Map `p` through the transform.
    ///
    /// Returns `None` when `p` maps to the line at infinity.
    #[must_use]
    pub fn project(&self, p: Point) -> Option<Point> {
        let m = &self.m;
        let x = m[0] * p.x + m[1] * p.y + m[2];
        let y = m[3] * p.x + m[4] * p.y + m[5];
        let w = m[6] * p.x + m[7] * p.y + m[8];
        if w.abs() < f64::EPSILON {
            return None;
        }
        Some(Point::new(x / w, y / w))
    }

    /// Determinant of the 3x3 matrix.
    #[must_use]
    pub fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0] * (m[4] * m[8] - m[5] * m[7]) - m[1] * (m[3] * m[8] - m[5] * m[6])
            + m[2] * (m[3] * m[7] - m[4] * m[6])
    }

    /// The inverse transform, renormalized so `m[8] == 1` where possible.
    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON || !det.is_finite() {
            return None;
        }
        let m = &self.m;
        let inv_det = 1.0 / det;
        let mut inv = [
            (m[4] * m[8] - m[5] * m[7]) * inv_det,
            (m[2] * m[7] - m[1] * m[8]) * inv_det,
            (m[1] * m[5] - m[2] * m[4]) * inv_det,
            (m[5] * m[6] - m[3] * m[8]) * inv_det,
            (m[0] * m[8] - m[2] * m[6]) * inv_det,
            (m[2] * m[3] - m[0] * m[5]) * inv_det,
            (m[3] * m[7] - m[4] * m[6]) * inv_det,
            (m[1] * m[6] - m[0] * m[7]) * inv_det,
            (m[0] * m[4] - m[1] * m[3]) * inv_det,
        ];
        if inv[8].abs() > f64::EPSILON {
            let s = inv[8];
            for v in &mut inv {
                *v /= s;
            }
        }
        Some(Self { m: inv })
    }

    /// Column-major 4x4 embedding for CSS `matrix3d(...)` or a WebGL
    /// uniform. The z row/column is identity.
    #[must_use]
    pub fn to_matrix3d(&self) -> [f64; 16] {
        let m = &self.m;
        [
            m[0], m[3], 0.0, m[6], //
            m[1], m[4], 0.0, m[7], //
            0.0, 0.0, 1.0, 0.0, //
            m[2], m[5], 0.0, m[8],
        ]
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Why a homography could not be computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DegenerateConfiguration {
    /// The source quad violates the quad invariant.
    Source(QuadError),
    /// The destination quad violates the quad invariant.
    Destination(QuadError),
    /// Elimination hit a pivot below tolerance.
    SingularSystem { column: usize, pivot: f64 },
    /// The solution is rank-deficient or non-finite.
    SingularResult { determinant: f64 },
}

impl fmt::Display for DegenerateConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(e) => write!(f, "degenerate source quad: {e}"),
            Self::Destination(e) => write!(f, "degenerate destination quad: {e}"),
            Self::SingularSystem { column, pivot } => {
                write!(f, "near-singular system at column {column} (pivot {pivot:e})")
            }
            Self::SingularResult { determinant } => {
                write!(f, "singular homography (determinant {determinant:e})")
            }
        }
    }
}

impl std::error::Error for DegenerateConfiguration {}

/// Stateless DLT solver.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HomographySolver {
    /// Pivot tolerance relative to the largest coefficient magnitude.
    pub pivot_epsilon: f64,
}

impl Default for HomographySolver {
    fn default() -> Self {
        Self {
            pivot_epsilon: PIVOT_EPSILON,
        }
    }
}

impl HomographySolver {
    /// Solve with default tolerances.
    pub fn solve(src: &Quad, dst: &Quad) -> Result<Homography, DegenerateConfiguration> {
        Self::default().solve_with(src, dst)
    }

    /// Map the unit square onto `dst` (texture space to screen space).
    pub fn from_unit_square(dst: &Quad) -> Result<Homography, DegenerateConfiguration> {
        Self::solve(&UNIT_SQUARE, dst)
    }

    /// Solve with this solver's tolerances.
    pub fn solve_with(&self, src: &Quad, dst: &Quad) -> Result<Homography, DegenerateConfiguration> {
        validate_quad(src).map_err(DegenerateConfiguration::Source)?;
        validate_quad(dst).map_err(DegenerateConfiguration::Destination)?;

        // Augmented 8x9 system [A | b].
        let mut a = [[0.0_f64; 9]; 8];
        for (i, (s, d)) in src.iter().zip(dst).enumerate() {
            let (x, y) = (s.x, s.y);
            let (u, v) = (d.x, d.y);
            a[2 * i] = [x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y, u];
            a[2 * i + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y, v];
        }

        let scale = a
            .iter()
            .flat_map(|row| row[..8].iter())
            .fold(0.0_f64, |acc, v| acc.max(v.abs()))
            .max(1.0);
        let tolerance = self.pivot_epsilon * scale;

        for col in 0..8 {
            let (pivot_row, pivot) = (col..8)
                .map(|r| (r, a[r][col].abs()))
                .fold((col, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });
            if pivot < tolerance || !pivot.is_finite() {
                warn!(column = col, pivot, "homography pivot below tolerance");
                return Err(DegenerateConfiguration::SingularSystem { column: col, pivot });
            }
            a.swap(col, pivot_row);

            for row in (col + 1)..8 {
                let factor = a[row][col] / a[col][col];
                if factor == 0.0 {
                    continue;
                }
                a[row][col] = 0.0;
                for c in (col + 1)..9 {
                    a[row][c] -= factor * a[col][c];
                }
            }
        }

        let mut h = [0.0_f64; 9];
        h[8] = 1.0;
        for row in (0..8).rev() {
            let mut sum = a[row][8];
            for c in (row + 1)..8 {
                sum -= a[row][c] * h[c];
            }
            h[row] = sum / a[row][row];
        }

        let homography = Homography { m: h };
        let determinant = homography.determinant();
        // Compare against the scale of the linear part so pixel-sized and
        // unit-sized quads are judged alike.
        let linear = h[..8].iter().fold(1.0_f64, |acc, v| acc.max(v.abs()));
        if !determinant.is_finite() || determinant.abs() <= 1e-12 * linear * linear {
            warn!(determinant, "homography solution is singular");
            return Err(DegenerateConfiguration::SingularResult { determinant });
        }
        Ok(homography)
    }
}
