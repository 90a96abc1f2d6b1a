use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// A point in the conformal model of its geometry.
///
/// Hyperbolic points live in the Poincaré disk, spherical points in the
/// stereographic plane (south pole at the origin) and Euclidean points in the
/// plane itself. The geometry is never stored on the point; every operation
/// that depends on it takes a [`Geometry`].
pub type Point = Complex64;

#[must_use]
pub const fn point(x: f64, y: f64) -> Point {
    Complex64::new(x, y)
}

// ─────────────────────────────────────────────────────────────────────────────
// Geometry
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Geometry {
    Spherical,
    Euclidean,
    Hyperbolic,
}

impl Geometry {
    /// Classifies the {p,q} triangle group by the sign of `1/p + 1/q - 1/2`.
    ///
    /// Integer arithmetic keeps the Euclidean case exact.
    #[must_use]
    pub fn classify(p: u32, q: u32) -> Self {
        let lhs = 2 * (u64::from(p) + u64::from(q));
        let rhs = u64::from(p) * u64::from(q);
        match lhs.cmp(&rhs) {
            std::cmp::Ordering::Greater => Self::Spherical,
            std::cmp::Ordering::Equal => Self::Euclidean,
            std::cmp::Ordering::Less => Self::Hyperbolic,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Spherical => "spherical",
            Self::Euclidean => "Euclidean",
            Self::Hyperbolic => "hyperbolic",
        }
    }

    /// Half-width of the default viewing window for this geometry.
    #[must_use]
    pub const fn default_bounds(self) -> f64 {
        match self {
            Self::Spherical => 6.0,
            Self::Euclidean => 2.0,
            Self::Hyperbolic => 1.01,
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance
// ─────────────────────────────────────────────────────────────────────────────

/// Absolute tolerance used by point comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    /// Tolerance for deciding on which side of a mirror a point lies.
    pub const MIRROR_SIDE: Self = Self::new(1e-10);
    /// Tolerance for treating two points as the same vertex.
    pub const COINCIDENT: Self = Self::new(1e-9);

    #[must_use]
    pub const fn new(eps: f64) -> Self {
        Self { eps }
    }

    #[must_use]
    pub fn approx_eq_point(self, a: Point, b: Point) -> bool {
        (a - b).norm() <= self.eps
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::MIRROR_SIDE
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Vec3
// ─────────────────────────────────────────────────────────────────────────────

/// Vector in the ambient space of the sphere or the hyperboloid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    /// Minkowski inner product with signature (+, +, -).
    #[must_use]
    pub const fn lorentz_dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y - self.z * rhs.z
    }

    #[must_use]
    pub const fn cross(self, rhs: Self) -> Self {
        Self {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.dot(self).sqrt()
    }

    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len.is_finite() && len > 0.0 {
            Some(self.mul_scalar(1.0 / len))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn mul_scalar(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }

    /// Horizontal part as a conformal-plane point.
    #[must_use]
    pub const fn xy(self) -> Point {
        Complex64::new(self.x, self.y)
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        self.mul_scalar(rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Counter-clockwise angle of `p` measured from the positive x axis, in `[0, 2π)`.
#[must_use]
pub fn ccw_angle(p: Point) -> f64 {
    let angle = p.im.atan2(p.re);
    if angle < 0.0 {
        angle + std::f64::consts::TAU
    } else {
        angle
    }
}

/// `p` scaled to unit length, or `1` for the origin.
#[must_use]
pub fn unit_direction(p: Point) -> Point {
    let norm = p.norm();
    if norm > 0.0 { p / norm } else { Complex64::new(1.0, 0.0) }
}

#[must_use]
pub fn is_finite_point(p: Point) -> bool {
    p.re.is_finite() && p.im.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_matches_angle_sum() {
        assert_eq!(Geometry::classify(3, 3), Geometry::Spherical);
        assert_eq!(Geometry::classify(5, 3), Geometry::Spherical);
        assert_eq!(Geometry::classify(2, 9), Geometry::Spherical);
        assert_eq!(Geometry::classify(4, 4), Geometry::Euclidean);
        assert_eq!(Geometry::classify(6, 3), Geometry::Euclidean);
        assert_eq!(Geometry::classify(3, 6), Geometry::Euclidean);
        assert_eq!(Geometry::classify(7, 3), Geometry::Hyperbolic);
        assert_eq!(Geometry::classify(5, 4), Geometry::Hyperbolic);
    }

    #[test]
    fn ccw_angle_wraps_into_positive_range() {
        assert!((ccw_angle(point(0.0, -1.0)) - 1.5 * std::f64::consts::PI).abs() < 1e-12);
        assert!(ccw_angle(point(1.0, 0.0)).abs() < 1e-12);
    }

    #[test]
    fn lorentz_dot_of_hyperboloid_apex_is_minus_one() {
        assert!((Vec3::Z.lorentz_dot(Vec3::Z) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn coincident_points_within_tolerance() {
        let a = point(0.25, -0.5);
        assert!(Tolerance::COINCIDENT.approx_eq_point(a, a + point(5e-10, 0.0)));
        assert!(!Tolerance::COINCIDENT.approx_eq_point(a, a + point(0.0, 1e-8)));
    }
}
