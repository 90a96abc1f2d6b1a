//! Oriented circles and lines used as reflection mirrors.

use serde::{Deserialize, Serialize};

use super::core::{Point, Tolerance, unit_direction};

/// A generalized circle of the conformal model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MirrorShape {
    Circle { center: Point, radius: f64 },
    /// Line through `point` with unit `normal`.
    Line { point: Point, normal: Point },
}

impl MirrorShape {
    /// Line through two distinct points.
    #[must_use]
    pub fn line_through(a: Point, b: Point) -> Self {
        let dir = unit_direction(b - a);
        Self::Line { point: a, normal: Point::new(-dir.im, dir.re) }
    }

    /// Signed side value; approximately the Euclidean distance to the shape
    /// near it, positive outside a circle and on the normal's side of a line.
    #[must_use]
    pub fn side(&self, p: Point) -> f64 {
        match *self {
            Self::Circle { center, radius } => {
                ((p - center).norm_sqr() - radius * radius) / (2.0 * radius)
            }
            Self::Line { point, normal } => {
                let rel = p - point;
                rel.re * normal.re + rel.im * normal.im
            }
        }
    }

    /// Inversion in the circle, or Euclidean reflection in the line.
    #[must_use]
    pub fn reflect(&self, p: Point) -> Point {
        match *self {
            Self::Circle { center, radius } => {
                let rel = p - center;
                if rel.norm_sqr() == 0.0 {
                    return Point::new(f64::INFINITY, f64::INFINITY);
                }
                center + radius * radius / rel.conj()
            }
            Self::Line { normal, .. } => p - normal * (2.0 * self.side(p)),
        }
    }
}

/// A mirror with a designated inside: the side holding the reference point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedMirror {
    pub shape: MirrorShape,
    inside_sign: f64,
}

impl OrientedMirror {
    /// Orients `shape` so that `reference` lies on its inside.
    #[must_use]
    pub fn new(shape: MirrorShape, reference: Point) -> Self {
        let inside_sign = if shape.side(reference) < 0.0 { -1.0 } else { 1.0 };
        Self { shape, inside_sign }
    }

    /// Side value that is positive inside and negative outside.
    #[must_use]
    pub fn signed_side(&self, p: Point) -> f64 {
        self.shape.side(p) * self.inside_sign
    }

    /// Points within `tol` of the mirror count as inside.
    #[must_use]
    pub fn is_outside(&self, p: Point, tol: Tolerance) -> bool {
        self.signed_side(p) < -tol.eps
    }

    #[must_use]
    pub fn reflect(&self, p: Point) -> Point {
        self.shape.reflect(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::core::point;

    #[test]
    fn circle_reflection_is_involution() {
        let shape = MirrorShape::Circle { center: point(1.5, 0.2), radius: 0.9 };
        let p = point(0.3, -0.1);
        assert!((shape.reflect(shape.reflect(p)) - p).norm() < 1e-12);
    }

    #[test]
    fn line_reflection_swaps_sides() {
        let shape = MirrorShape::line_through(point(0.0, 0.0), point(1.0, 1.0));
        let p = point(1.0, 0.0);
        let q = shape.reflect(p);
        assert!((q - point(0.0, 1.0)).norm() < 1e-12);
        assert!(shape.side(p) * shape.side(q) < 0.0);
    }

    #[test]
    fn orientation_follows_reference() {
        let shape = MirrorShape::Circle { center: point(0.0, 0.0), radius: 1.0 };
        let mirror = OrientedMirror::new(shape, point(0.1, 0.0));
        assert!(!mirror.is_outside(point(0.5, 0.5), Tolerance::MIRROR_SIDE));
        assert!(mirror.is_outside(point(2.0, 0.0), Tolerance::MIRROR_SIDE));
        assert!(!mirror.is_outside(point(1.0, 0.0), Tolerance::MIRROR_SIDE));
    }
}
