//! The fundamental triangle of a {p,q} tiling and its three mirrors.

use std::f64::consts::PI;

use num_complex::Complex64;

use super::TilingError;
use crate::geom::{
    Geometry, MirrorShape, OrientedMirror, Point, conformal_radius, point, unit_direction,
};

/// Triangle with angles π/p at the tile centre, π/2 at the edge midpoint and
/// π/q at the tile vertex.
///
/// `verts` are ordered (tile vertex, edge midpoint, tile centre); mirror `i`
/// is the side opposite `verts[i]`, oriented so that `verts[i]` is inside.
#[derive(Debug, Clone, PartialEq)]
pub struct FundamentalTriangle {
    pub geometry: Geometry,
    pub p: u32,
    pub q: u32,
    pub verts: [Point; 3],
    pub mirrors: [OrientedMirror; 3],
}

impl FundamentalTriangle {
    /// # Errors
    ///
    /// [`TilingError::DegenerateTriangle`] for `p < 2`, `q < 2` or `p = q = 2`.
    pub fn new(p: u32, q: u32) -> Result<Self, TilingError> {
        if p < 2 || q < 2 || (p == 2 && q == 2) {
            return Err(TilingError::DegenerateTriangle { p, q });
        }
        let geometry = Geometry::classify(p, q);
        let (pf, qf) = (f64::from(p), f64::from(q));
        let (alpha, beta) = (PI / pf, PI / qf);

        // Distances from the tile centre to a vertex and to an edge midpoint.
        let (center_to_vertex, center_to_mid) = match geometry {
            Geometry::Euclidean => (1.0, alpha.cos()),
            Geometry::Hyperbolic => (
                (1.0 / (alpha.tan() * beta.tan())).acosh(),
                (beta.cos() / alpha.sin()).acosh(),
            ),
            Geometry::Spherical => (
                (1.0 / (alpha.tan() * beta.tan())).clamp(-1.0, 1.0).acos(),
                (beta.cos() / alpha.sin()).clamp(-1.0, 1.0).acos(),
            ),
        };

        let vertex = point(conformal_radius(geometry, center_to_vertex), 0.0);
        let mid = Complex64::from_polar(conformal_radius(geometry, center_to_mid), alpha);
        let center = point(0.0, 0.0);

        let edge = edge_shape(geometry, mid);
        let mirrors = [
            OrientedMirror::new(
                MirrorShape::line_through(center, Complex64::from_polar(1.0, alpha)),
                vertex,
            ),
            OrientedMirror::new(MirrorShape::line_through(center, point(1.0, 0.0)), mid),
            OrientedMirror::new(edge, center),
        ];
        Ok(Self { geometry, p, q, verts: [vertex, mid, center], mirrors })
    }

    /// Reflects `p` in mirror `i`.
    #[must_use]
    pub fn reflect(&self, i: usize, p: Point) -> Point {
        self.mirrors[i].reflect(p)
    }

    /// Applies reflections in order, first element first.
    #[must_use]
    pub fn apply_word(&self, word: &[usize], p: Point) -> Point {
        word.iter().fold(p, |acc, &i| self.reflect(i, acc))
    }

    /// The two triangle vertices on mirror `i`, in edge-drawing order.
    #[must_use]
    pub const fn other_verts(i: usize) -> [usize; 2] {
        match i {
            0 => [1, 2],
            1 => [2, 0],
            _ => [1, 0],
        }
    }

    /// Translation lattice of a Euclidean tiling.
    #[must_use]
    pub fn lattice(&self) -> [Point; 2] {
        let [vertex, mid, _] = self.verts;
        let first = if self.p == 3 { self.reflect(0, vertex) - vertex } else { mid * 2.0 };
        let turn = Complex64::from_polar(1.0, 2.0 * PI / f64::from(self.p));
        [first, first * turn]
    }
}

/// Geodesic through the edge midpoint `mid`, perpendicular to the ray from
/// the tile centre.
fn edge_shape(geometry: Geometry, mid: Point) -> MirrorShape {
    let m = mid.norm();
    let dir = unit_direction(mid);
    match geometry {
        Geometry::Euclidean => MirrorShape::Line { point: mid, normal: dir },
        Geometry::Hyperbolic => MirrorShape::Circle {
            center: dir * ((1.0 + m * m) / (2.0 * m)),
            radius: (1.0 - m * m) / (2.0 * m),
        },
        Geometry::Spherical => MirrorShape::Circle {
            center: -dir * ((1.0 - m * m) / (2.0 * m)),
            radius: (1.0 + m * m) / (2.0 * m),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::distance;

    const PAIRS: [(u32, u32); 8] = [(3, 3), (4, 3), (5, 3), (2, 5), (4, 4), (6, 3), (7, 3), (5, 4)];

    #[test]
    fn vertices_lie_on_their_mirrors() {
        for (p, q) in PAIRS {
            let tri = FundamentalTriangle::new(p, q).expect("valid");
            for i in 0..3 {
                for j in FundamentalTriangle::other_verts(i) {
                    let side = tri.mirrors[i].signed_side(tri.verts[j]);
                    assert!(side.abs() < 1e-12, "{{{p},{q}}} vert {j} mirror {i}: {side}");
                }
            }
        }
    }

    #[test]
    fn opposite_vertex_is_strictly_inside() {
        for (p, q) in PAIRS {
            let tri = FundamentalTriangle::new(p, q).expect("valid");
            for i in 0..3 {
                assert!(tri.mirrors[i].signed_side(tri.verts[i]) > 1e-6);
            }
        }
    }

    #[test]
    fn rotation_about_vertex_has_order_q() {
        for (p, q) in PAIRS {
            let tri = FundamentalTriangle::new(p, q).expect("valid");
            let centroid = (tri.verts[0] + tri.verts[1] + tri.verts[2]) / 3.0;
            let rotation: Vec<usize> = (0..q).flat_map(|_| [2, 1]).collect();
            let back = tri.apply_word(&rotation, centroid);
            assert!((back - centroid).norm() < 1e-9, "{{{p},{q}}}");
        }
    }

    #[test]
    fn edge_midpoint_is_equidistant_from_edge_ends() {
        let tri = FundamentalTriangle::new(7, 3).expect("valid");
        let far_end = tri.reflect(0, tri.verts[0]);
        let g = tri.geometry;
        let d1 = distance(g, tri.verts[1], tri.verts[0]);
        let d2 = distance(g, tri.verts[1], far_end);
        assert!((d1 - d2).abs() < 1e-12);
    }

    #[test]
    fn degenerate_pairs_are_rejected() {
        assert!(FundamentalTriangle::new(2, 2).is_err());
        assert!(FundamentalTriangle::new(1, 5).is_err());
        assert!(FundamentalTriangle::new(5, 0).is_err());
    }

    #[test]
    fn square_lattice_is_orthogonal() {
        let tri = FundamentalTriangle::new(4, 4).expect("valid");
        let [a, b] = tri.lattice();
        assert!((a.re * b.re + a.im * b.im).abs() < 1e-12);
        assert!((a.norm() - b.norm()).abs() < 1e-12);
    }
}
