//! Distance formulas and metric circles in the conformal models.

use std::f64::consts::PI;

use super::core::{Geometry, Point, unit_direction};

/// Distance between two points in the geometry's native metric.
///
/// Returns `f64::INFINITY` for hyperbolic pairs on or beyond the ideal boundary.
#[must_use]
pub fn distance(geometry: Geometry, p: Point, q: Point) -> f64 {
    match geometry {
        Geometry::Euclidean => (p - q).norm(),
        Geometry::Hyperbolic => {
            let ratio = (p - q).norm() / (Point::new(1.0, 0.0) - p.conj() * q).norm();
            if ratio >= 1.0 { f64::INFINITY } else { 2.0 * ratio.atanh() }
        }
        Geometry::Spherical => {
            let num = (p - q).norm();
            let den = (Point::new(1.0, 0.0) + p.conj() * q).norm();
            2.0 * num.atan2(den)
        }
    }
}

/// Distance of a conformal radius from the model origin.
#[must_use]
pub fn distance_from_origin(geometry: Geometry, radius: f64) -> f64 {
    match geometry {
        Geometry::Euclidean => radius,
        Geometry::Hyperbolic => {
            if radius >= 1.0 { f64::INFINITY } else { 2.0 * radius.atanh() }
        }
        Geometry::Spherical => 2.0 * radius.atan(),
    }
}

/// Conformal radius of a point at metric distance `d` from the origin.
#[must_use]
pub fn conformal_radius(geometry: Geometry, d: f64) -> f64 {
    match geometry {
        Geometry::Euclidean => d,
        Geometry::Hyperbolic => (d / 2.0).tanh(),
        Geometry::Spherical => (d / 2.0).tan(),
    }
}

/// Euclidean image of the metric circle of radius `width` around `p`.
///
/// Circles centred away from the origin are still Euclidean circles in a
/// conformal model, only with a shifted centre. Returns `(center, radius)`;
/// a spherical circle that wraps past the antipode is reported with an
/// infinite radius.
#[must_use]
pub fn metric_circle(geometry: Geometry, p: Point, width: f64) -> (Point, f64) {
    let rho = p.norm();
    let dir = unit_direction(p);
    match geometry {
        Geometry::Euclidean => (p, width),
        Geometry::Hyperbolic => {
            let d = distance_from_origin(geometry, rho);
            let r1 = ((d + width) / 2.0).tanh();
            let r2 = ((d - width) / 2.0).tanh();
            (dir * ((r1 + r2) / 2.0), (r1 - r2) / 2.0)
        }
        Geometry::Spherical => {
            let theta = distance_from_origin(geometry, rho);
            if theta + width >= PI {
                return (p, f64::INFINITY);
            }
            let r1 = ((theta + width) / 2.0).tan();
            let r2 = ((theta - width) / 2.0).tan();
            (dir * ((r1 + r2) / 2.0), (r1 - r2) / 2.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::core::point;

    #[test]
    fn hyperbolic_distance_of_tanh_half_is_one() {
        let d = distance(Geometry::Hyperbolic, point(0.0, 0.0), point(0.5_f64.tanh(), 0.0));
        assert!((d - 1.0).abs() < 1e-12);
    }

    #[test]
    fn spherical_distance_to_unit_circle_is_quarter_turn() {
        let d = distance(Geometry::Spherical, point(0.0, 0.0), point(0.0, 1.0));
        assert!((d - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn distances_are_symmetric() {
        let a = point(0.3, -0.2);
        let b = point(-0.1, 0.6);
        for geometry in [Geometry::Spherical, Geometry::Euclidean, Geometry::Hyperbolic] {
            let ab = distance(geometry, a, b);
            let ba = distance(geometry, b, a);
            assert!((ab - ba).abs() < 1e-12, "{geometry}");
        }
    }

    #[test]
    fn metric_circle_contains_points_at_width() {
        let p = point(0.4, 0.1);
        let width = 0.05;
        for geometry in [Geometry::Spherical, Geometry::Euclidean, Geometry::Hyperbolic] {
            let (center, radius) = metric_circle(geometry, p, width);
            let dir = unit_direction(p);
            let reach = distance_from_origin(geometry, p.norm()) + width;
            let outer = dir * conformal_radius(geometry, reach);
            assert!(((outer - center).norm() - radius).abs() < 1e-12, "{geometry}");
            assert!(distance(geometry, p, outer) - width < 1e-12);
        }
    }
}
