//! Möbius transformations of the conformal models.

use std::ops::Mul;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::core::{Geometry, Point, ccw_angle};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// `z ↦ (a z + b) / (c z + d)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mobius {
    pub a: Complex64,
    pub b: Complex64,
    pub c: Complex64,
    pub d: Complex64,
}

impl Mobius {
    pub const IDENTITY: Self = Self::new(ONE, ZERO, ZERO, ONE);

    #[must_use]
    pub const fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { a, b, c, d }
    }

    /// Isometry that rotates by `angle` about the origin and then moves the
    /// origin to `translation`.
    ///
    /// The lower-left coefficient carries the curvature: it is `conj(P)·T` in
    /// the disk, `-conj(P)·T` in the stereographic plane and `0` in the plane.
    #[must_use]
    pub fn isometry(geometry: Geometry, angle: f64, translation: Point) -> Self {
        let rotation = Complex64::from_polar(1.0, angle);
        let c = match geometry {
            Geometry::Hyperbolic => translation.conj() * rotation,
            Geometry::Spherical => -translation.conj() * rotation,
            Geometry::Euclidean => ZERO,
        };
        Self::new(rotation, translation, c, ONE)
    }

    #[must_use]
    pub fn rotation(angle: f64) -> Self {
        Self::new(Complex64::from_polar(1.0, angle), ZERO, ZERO, ONE)
    }

    /// Isometry taking `start` to the origin and `end` onto the positive real axis.
    #[must_use]
    pub fn geodesic_frame(geometry: Geometry, start: Point, end: Point) -> Self {
        let to_origin = Self::isometry(geometry, 0.0, -start);
        let angle = ccw_angle(to_origin.apply(end));
        Self::rotation(-angle) * to_origin
    }

    /// Maps the unit disk onto the upper half-plane, taking the origin to `i`.
    #[must_use]
    pub const fn upper_half_plane() -> Self {
        Self::new(Complex64::new(0.0, -1.0), ONE, ONE, Complex64::new(0.0, -1.0))
    }

    #[must_use]
    pub fn apply(&self, z: Point) -> Point {
        (self.a * z + self.b) / (self.c * z + self.d)
    }

    #[must_use]
    pub fn inverse(&self) -> Self {
        Self::new(self.d, -self.b, -self.c, self.a)
    }

}

impl Default for Mobius {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// `(self * rhs).apply(z) == self.apply(rhs.apply(z))`.
impl Mul for Mobius {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.a * rhs.a + self.b * rhs.c,
            self.a * rhs.b + self.b * rhs.d,
            self.c * rhs.a + self.d * rhs.c,
            self.c * rhs.b + self.d * rhs.d,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::core::point;
    use crate::geom::metric::distance;

    const GEOMETRIES: [Geometry; 3] =
        [Geometry::Spherical, Geometry::Euclidean, Geometry::Hyperbolic];

    #[test]
    fn isometry_moves_origin_to_translation() {
        let target = point(0.3, -0.4);
        for geometry in GEOMETRIES {
            let m = Mobius::isometry(geometry, 0.7, target);
            assert!((m.apply(point(0.0, 0.0)) - target).norm() < 1e-12);
        }
    }

    #[test]
    fn isometry_preserves_distance() {
        let a = point(0.1, 0.2);
        let b = point(-0.35, 0.05);
        for geometry in GEOMETRIES {
            let m = Mobius::isometry(geometry, 1.3, point(0.2, 0.45));
            let before = distance(geometry, a, b);
            let after = distance(geometry, m.apply(a), m.apply(b));
            assert!((before - after).abs() < 1e-10, "{geometry}");
        }
    }

    #[test]
    fn inverse_composes_to_identity() {
        let m = Mobius::isometry(Geometry::Hyperbolic, 0.4, point(0.5, 0.1));
        let id = m * m.inverse();
        let scale = id.a;
        assert!((id.d / scale - ONE).norm() < 1e-12);
        assert!((id.b / scale).norm() < 1e-12 && (id.c / scale).norm() < 1e-12);
        let z = point(0.25, -0.6);
        assert!((m.inverse().apply(m.apply(z)) - z).norm() < 1e-12);
    }

    #[test]
    fn composition_applies_right_first() {
        let a = Mobius::rotation(0.5);
        let b = Mobius::isometry(Geometry::Euclidean, 0.0, point(1.0, 0.0));
        let z = point(0.3, 0.2);
        assert!(((a * b).apply(z) - a.apply(b.apply(z))).norm() < 1e-12);
    }

    #[test]
    fn geodesic_frame_puts_end_on_positive_axis() {
        let start = point(0.2, 0.3);
        let end = point(-0.4, 0.1);
        let m = Mobius::geodesic_frame(Geometry::Hyperbolic, start, end);
        assert!(m.apply(start).norm() < 1e-12);
        let mapped = m.apply(end);
        assert!(mapped.im.abs() < 1e-12);
        assert!(mapped.re > 0.0);
    }

    #[test]
    fn upper_half_plane_maps_disk_to_half_plane() {
        let m = Mobius::upper_half_plane();
        assert!((m.apply(point(0.0, 0.0)) - point(0.0, 1.0)).norm() < 1e-12);
        assert!(m.apply(point(0.6, 0.0)).im > 0.0);
        assert!(m.apply(point(0.0, 1.0).exp()).im.abs() < 1e-9);
    }
}
