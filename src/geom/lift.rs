//! Ambient-space lifts of conformal points.
//!
//! Hyperbolic points lift to the upper sheet of the hyperboloid
//! `x² + y² - z² = -1` and spherical points to the unit sphere with the
//! stereographic origin at the south pole. A geodesic through two points is
//! represented by the dual vector of the plane through the origin that
//! contains both lifts.

use super::core::{Geometry, Point, Vec3};

/// Lifts a conformal point into ambient space. Euclidean points get `z = 0`.
#[must_use]
pub fn lift(geometry: Geometry, p: Point) -> Vec3 {
    let r2 = p.norm_sqr();
    match geometry {
        Geometry::Euclidean => Vec3::new(p.re, p.im, 0.0),
        Geometry::Hyperbolic => {
            let scale = 1.0 / (1.0 - r2);
            Vec3::new(2.0 * p.re * scale, 2.0 * p.im * scale, (1.0 + r2) * scale)
        }
        Geometry::Spherical => {
            let scale = 1.0 / (1.0 + r2);
            Vec3::new(2.0 * p.re * scale, 2.0 * p.im * scale, (r2 - 1.0) * scale)
        }
    }
}

/// Projects an ambient vector back to the conformal model.
///
/// The vector does not need to be normalized: it is first rescaled onto the
/// hyperboloid or the sphere. Returns `None` for vectors with no image
/// (spacelike vectors in hyperbolic space, the zero vector on the sphere).
#[must_use]
pub fn project(geometry: Geometry, v: Vec3) -> Option<Point> {
    match geometry {
        Geometry::Euclidean => Some(v.xy()),
        Geometry::Hyperbolic => {
            let norm2 = -v.lorentz_dot(v);
            if norm2 <= 0.0 || v.z <= 0.0 {
                return None;
            }
            let u = v.mul_scalar(1.0 / norm2.sqrt());
            Some(u.xy() / (1.0 + u.z))
        }
        Geometry::Spherical => {
            let u = v.normalized()?;
            if u.z >= 1.0 {
                return None;
            }
            Some(u.xy() / (1.0 - u.z))
        }
    }
}

/// Unit normal of the geodesic through `a` and `b`, dualised so that the
/// geometry's inner product with a lifted point gives the sine (or
/// hyperbolic sine) of its signed distance to the geodesic.
#[must_use]
pub fn geodesic_dual(geometry: Geometry, a: Point, b: Point) -> Option<Vec3> {
    match geometry {
        Geometry::Euclidean => {
            let dir = b - a;
            let len = dir.norm();
            if len == 0.0 {
                return None;
            }
            // Encode the line as (n, -n·a) so that `signed_distance` stays affine.
            let n = Point::new(-dir.im, dir.re) / len;
            Some(Vec3::new(n.re, n.im, -(n.re * a.re + n.im * a.im)))
        }
        Geometry::Hyperbolic => {
            let n = lift(geometry, a).cross(lift(geometry, b));
            let dual = Vec3::new(n.x, n.y, -n.z);
            let norm2 = dual.lorentz_dot(dual);
            (norm2 > 0.0).then(|| dual.mul_scalar(1.0 / norm2.sqrt()))
        }
        Geometry::Spherical => lift(geometry, a).cross(lift(geometry, b)).normalized(),
    }
}

/// Signed metric distance of `p` from the geodesic described by `dual`.
#[must_use]
pub fn signed_distance(geometry: Geometry, dual: Vec3, p: Point) -> f64 {
    match geometry {
        Geometry::Euclidean => dual.x * p.re + dual.y * p.im + dual.z,
        Geometry::Hyperbolic => lift(geometry, p).lorentz_dot(dual).asinh(),
        Geometry::Spherical => lift(geometry, p).dot(dual).clamp(-1.0, 1.0).asin(),
    }
}

/// Geodesic centroid of a set of points: the normalized sum of their lifts.
#[must_use]
pub fn centroid(geometry: Geometry, points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vec3::ZERO, |acc, &p| acc + lift(geometry, p));
    match geometry {
        Geometry::Euclidean => Some(sum.xy() / points.len() as f64),
        _ => project(geometry, sum),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::core::point;
    use crate::geom::metric::distance;

    #[test]
    fn lift_then_project_round_trips() {
        let p = point(0.35, -0.42);
        for geometry in [Geometry::Spherical, Geometry::Euclidean, Geometry::Hyperbolic] {
            let back = project(geometry, lift(geometry, p)).expect("projectable");
            assert!((back - p).norm() < 1e-12, "{geometry}");
        }
    }

    #[test]
    fn hyperboloid_lift_has_unit_lorentz_norm() {
        let v = lift(Geometry::Hyperbolic, point(0.6, 0.1));
        assert!((v.lorentz_dot(v) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn signed_distance_matches_axis_distance() {
        let q = point(0.2, 0.31);
        for geometry in [Geometry::Spherical, Geometry::Euclidean, Geometry::Hyperbolic] {
            let dual = geodesic_dual(geometry, point(0.0, 0.0), point(0.5, 0.0)).expect("dual");
            let d = signed_distance(geometry, dual, q);
            // Half the distance to the mirror image across the real axis.
            let axis = distance(geometry, q, q.conj()) / 2.0;
            assert!((d.abs() - axis).abs() < 1e-12, "{geometry}");
        }
    }

    #[test]
    fn centroid_is_equidistant_for_symmetric_pair() {
        let a = point(0.4, 0.1);
        let b = point(-0.2, 0.3);
        for geometry in [Geometry::Spherical, Geometry::Euclidean, Geometry::Hyperbolic] {
            let c = centroid(geometry, &[a, b]).expect("centroid");
            let gap = distance(geometry, a, c) - distance(geometry, b, c);
            assert!(gap.abs() < 1e-12, "{geometry}");
        }
    }
}
