//! Euclidean display models. Canonical model: the plane itself.
//!
//! The periodic models (conformal, spiral, loxodromic) wrap the plane with an
//! exponential whose period is a translation of the tiling, so they only
//! depend on the tiling through [`ModelContext::lattice`].

use serde::{Deserialize, Serialize};

use super::{ModelContext, ModelMapping, Registration, inv_two_pi_i, radial};
use crate::geom::{Point, point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EuclideanModel {
    Isometric,
    Conformal,
    Disk,
    UpperHalfPlane,
    Spiral,
    Loxodromic,
}

pub const REGISTRATIONS: &[Registration<EuclideanModel>] = &[
    Registration {
        names: &["Isometric", "Plane"],
        kind: EuclideanModel::Isometric,
        mapping: &Isometric,
    },
    Registration {
        names: &["Conformal", "Exponential"],
        kind: EuclideanModel::Conformal,
        mapping: &Conformal,
    },
    Registration {
        names: &["Disk"],
        kind: EuclideanModel::Disk,
        mapping: &Disk,
    },
    Registration {
        names: &["Upper Half Plane", "UpperHalfPlane", "UHP", "Half Plane"],
        kind: EuclideanModel::UpperHalfPlane,
        mapping: &UpperHalfPlane,
    },
    Registration {
        names: &["Spiral"],
        kind: EuclideanModel::Spiral,
        mapping: &Spiral,
    },
    Registration {
        names: &["Loxodromic", "Double Spiral"],
        kind: EuclideanModel::Loxodromic,
        mapping: &Loxodromic,
    },
];

#[must_use]
pub fn disk_to_plane(v: Point) -> Point {
    radial(v, |r| r / (1.0 - r))
}

#[must_use]
pub fn plane_to_disk(p: Point) -> Point {
    radial(p, |r| r / (1.0 + r))
}

/// `w ↦ (T / 2πi) log w`, periodic in `T`.
fn log_wrap(period: Point, w: Point) -> Point {
    period * inv_two_pi_i() * w.ln()
}

/// `z ↦ exp(2πi z / T)`.
fn exp_wrap(period: Point, z: Point) -> Point {
    (z / (period * inv_two_pi_i())).exp()
}

pub struct Isometric;

impl ModelMapping for Isometric {
    fn to_canonical(&self, _ctx: &ModelContext, v: Point) -> Point {
        v
    }

    fn from_canonical(&self, _ctx: &ModelContext, p: Point) -> Point {
        p
    }
}

/// The plane squeezed into the unit disk, `r ↦ r / (1 + r)`.
pub struct Disk;

impl ModelMapping for Disk {
    fn to_canonical(&self, _ctx: &ModelContext, v: Point) -> Point {
        disk_to_plane(v)
    }

    fn from_canonical(&self, _ctx: &ModelContext, p: Point) -> Point {
        plane_to_disk(p)
    }

    fn boundary_measure(&self, _ctx: &ModelContext, v: Point) -> Option<f64> {
        Some(v.norm())
    }
}

/// The disk model carried to the half-plane `y > -1`.
pub struct UpperHalfPlane;

impl ModelMapping for UpperHalfPlane {
    fn to_canonical(&self, ctx: &ModelContext, v: Point) -> Point {
        disk_to_plane(ctx.upper_inv().apply(v))
    }

    fn from_canonical(&self, ctx: &ModelContext, p: Point) -> Point {
        ctx.upper().apply(plane_to_disk(p))
    }

    fn boundary_measure(&self, _ctx: &ModelContext, v: Point) -> Option<f64> {
        Some(-v.im)
    }
}

/// Concentric rings: the first lattice vector wraps once around the origin.
pub struct Conformal;

impl ModelMapping for Conformal {
    fn to_canonical(&self, ctx: &ModelContext, v: Point) -> Point {
        log_wrap(ctx.lattice()[0], v)
    }

    fn from_canonical(&self, ctx: &ModelContext, p: Point) -> Point {
        exp_wrap(ctx.lattice()[0], p)
    }
}

/// Logarithmic spiral: an oblique lattice vector wraps around the origin.
pub struct Spiral;

impl ModelMapping for Spiral {
    fn to_canonical(&self, ctx: &ModelContext, v: Point) -> Point {
        log_wrap(ctx.spiral_period(), v)
    }

    fn from_canonical(&self, ctx: &ModelContext, p: Point) -> Point {
        exp_wrap(ctx.spiral_period(), p)
    }
}

/// Double spiral between the fixed points `±1`.
pub struct Loxodromic;

impl ModelMapping for Loxodromic {
    fn to_canonical(&self, ctx: &ModelContext, v: Point) -> Point {
        log_wrap(ctx.spiral_period(), (v - 1.0) / (v + 1.0))
    }

    fn from_canonical(&self, ctx: &ModelContext, p: Point) -> Point {
        let u = exp_wrap(ctx.spiral_period(), p);
        (u + 1.0) / (point(1.0, 0.0) - u)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_round_trip() {
        let p = point(3.0, -4.0);
        let v = plane_to_disk(p);
        assert!((v.norm() - 5.0 / 6.0).abs() < 1e-12);
        assert!((disk_to_plane(v) - p).norm() < 1e-12);
    }

    #[test]
    fn conformal_model_is_periodic_in_lattice() {
        let ctx = ModelContext::default().with_lattice([point(2.0, 0.0), point(0.0, 2.0)]);
        let z = point(0.3, 0.4);
        let a = Conformal.from_canonical(&ctx, z);
        let b = Conformal.from_canonical(&ctx, z + point(2.0, 0.0));
        assert!((a - b).norm() < 1e-12);
    }

    #[test]
    fn loxodromic_model_round_trips_from_model_side() {
        let ctx = ModelContext::default();
        let w = point(0.4, 0.9);
        let z = Loxodromic.to_canonical(&ctx, w);
        assert!((Loxodromic.from_canonical(&ctx, z) - w).norm() < 1e-12);
    }
}
