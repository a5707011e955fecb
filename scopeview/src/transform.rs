//! 2D affine transforms between image pixel space and world space.
//!
//! Points map as
//!
//! ```text
//! x' = m11·x + m21·y + dx
//! y' = m12·x + m22·y + dy
//! ```
//!
//! [`Affine::then`] composes left-to-right: `a.then(&b)` applies `a` first.

use serde::Serialize;

/// A 2D affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Affine {
    pub m11: f64,
    pub m12: f64,
    pub m21: f64,
    pub m22: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        m11: 1.0,
        m12: 0.0,
        m21: 0.0,
        m22: 1.0,
        dx: 0.0,
        dy: 0.0,
    };

    pub fn translate(dx: f64, dy: f64) -> Self {
        Self {
            dx,
            dy,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            m11: sx,
            m22: sy,
            ..Self::IDENTITY
        }
    }

    /// Scale about the origin, then translate.
    pub fn scale_translate(sx: f64, sy: f64, dx: f64, dy: f64) -> Self {
        Self {
            m11: sx,
            m22: sy,
            dx,
            dy,
            ..Self::IDENTITY
        }
    }

    /// Transform mapping `(0, 0)..(width, height)` onto the world rectangle
    /// whose top-left is `(left, top)` with size `rect_width × rect_height`.
    pub fn from_rect(left: f64, top: f64, rect_width: f64, rect_height: f64, width: u32, height: u32) -> Self {
        Self::scale_translate(
            rect_width / f64::from(width),
            rect_height / f64::from(height),
            left,
            top,
        )
    }

    /// Map a point.
    #[inline]
    pub fn map(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.m11 * x + self.m21 * y + self.dx,
            self.m12 * x + self.m22 * y + self.dy,
        )
    }

    pub fn determinant(&self) -> f64 {
        self.m11 * self.m22 - self.m12 * self.m21
    }

    pub fn is_finite(&self) -> bool {
        [self.m11, self.m12, self.m21, self.m22, self.dx, self.dy]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Inverse transform, or `None` when the matrix is singular.
    pub fn inverted(&self) -> Option<Self> {
        let det = self.determinant();
        // Relative to the matrix magnitude, so tiny but valid scales still invert
        let scale = (self.m11 * self.m22).abs() + (self.m12 * self.m21).abs();
        if !det.is_finite() || det.abs() <= f64::EPSILON * scale {
            return None;
        }
        let m11 = self.m22 / det;
        let m12 = -self.m12 / det;
        let m21 = -self.m21 / det;
        let m22 = self.m11 / det;
        Some(Self {
            m11,
            m12,
            m21,
            m22,
            dx: -(m11 * self.dx + m21 * self.dy),
            dy: -(m12 * self.dx + m22 * self.dy),
        })
    }

    /// Compose: the result applies `self` first, then `next`.
    pub fn then(&self, next: &Affine) -> Self {
        Self {
            m11: self.m11 * next.m11 + self.m12 * next.m21,
            m12: self.m11 * next.m12 + self.m12 * next.m22,
            m21: self.m21 * next.m11 + self.m22 * next.m21,
            m22: self.m21 * next.m12 + self.m22 * next.m22,
            dx: self.dx * next.m11 + self.dy * next.m21 + next.dx,
            dy: self.dx * next.m12 + self.dy * next.m22 + next.dy,
        }
    }
}
