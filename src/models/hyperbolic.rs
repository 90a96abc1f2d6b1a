//! Hyperbolic display models. Canonical model: the Poincaré disk.

use std::f64::consts::PI;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::{ModelContext, ModelMapping, Registration, radial};
use crate::geom::{Point, point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HyperbolicModel {
    Poincare,
    Klein,
    UpperHalfPlane,
    Band,
    Orthographic,
    Square,
    InvertedPoincare,
    Joukowsky,
    Ring,
    AzimuthalEquidistant,
    AzimuthalEqualArea,
    SchwarzChristoffel,
}

pub const REGISTRATIONS: &[Registration<HyperbolicModel>] = &[
    Registration {
        names: &["Poincare", "Poincaré", "Poincare Disk", "Disk"],
        kind: HyperbolicModel::Poincare,
        mapping: &Poincare,
    },
    Registration {
        names: &["Klein", "Beltrami-Klein", "Projective"],
        kind: HyperbolicModel::Klein,
        mapping: &Klein,
    },
    Registration {
        names: &["Upper Half Plane", "UpperHalfPlane", "UHP", "Half Plane"],
        kind: HyperbolicModel::UpperHalfPlane,
        mapping: &UpperHalfPlane,
    },
    Registration {
        names: &["Band"],
        kind: HyperbolicModel::Band,
        mapping: &Band,
    },
    Registration {
        names: &["Orthographic", "Gans"],
        kind: HyperbolicModel::Orthographic,
        mapping: &Orthographic,
    },
    Registration {
        names: &["Square"],
        kind: HyperbolicModel::Square,
        mapping: &Square,
    },
    Registration {
        names: &["Inverted Poincare", "InvertedPoincare", "Inverted"],
        kind: HyperbolicModel::InvertedPoincare,
        mapping: &InvertedPoincare,
    },
    Registration {
        names: &["Joukowsky", "Ellipse"],
        kind: HyperbolicModel::Joukowsky,
        mapping: &Joukowsky,
    },
    Registration {
        names: &["Ring", "Annulus"],
        kind: HyperbolicModel::Ring,
        mapping: &Ring,
    },
    Registration {
        names: &["Azimuthal Equidistant", "Equidistant"],
        kind: HyperbolicModel::AzimuthalEquidistant,
        mapping: &AzimuthalEquidistant,
    },
    Registration {
        names: &["Azimuthal Equal Area", "Equal Area"],
        kind: HyperbolicModel::AzimuthalEqualArea,
        mapping: &AzimuthalEqualArea,
    },
    Registration {
        names: &["Schwarz-Christoffel", "Schwarz Christoffel", "Polygon"],
        kind: HyperbolicModel::SchwarzChristoffel,
        mapping: &SchwarzChristoffelModel,
    },
];

// ─────────────────────────────────────────────────────────────────────────────
// Shared conversions
// ─────────────────────────────────────────────────────────────────────────────

#[must_use]
pub fn poincare_to_klein(p: Point) -> Point {
    p * (2.0 / (1.0 + p.norm_sqr()))
}

#[must_use]
pub fn klein_to_poincare(k: Point) -> Point {
    let dot = k.norm_sqr().min(1.0);
    if dot == 0.0 {
        return k;
    }
    k * ((1.0 - (1.0 - dot).sqrt()) / dot)
}

#[must_use]
pub fn band_to_poincare(v: Point) -> Point {
    let e = (v * (PI / 2.0)).exp();
    (e - 1.0) / (e + 1.0)
}

#[must_use]
pub fn poincare_to_band(p: Point) -> Point {
    let one = Complex64::new(1.0, 0.0);
    ((one + p) / (one - p)).ln() * (2.0 / PI)
}

fn boundary_norm(v: Point) -> Option<f64> {
    Some(v.norm())
}

// ─────────────────────────────────────────────────────────────────────────────
// Models
// ─────────────────────────────────────────────────────────────────────────────

pub struct Poincare;

impl ModelMapping for Poincare {
    fn to_canonical(&self, _ctx: &ModelContext, v: Point) -> Point {
        v
    }

    fn from_canonical(&self, _ctx: &ModelContext, p: Point) -> Point {
        p
    }

    fn boundary_measure(&self, _ctx: &ModelContext, v: Point) -> Option<f64> {
        boundary_norm(v)
    }
}

pub struct Klein;

impl ModelMapping for Klein {
    fn to_canonical(&self, _ctx: &ModelContext, v: Point) -> Point {
        klein_to_poincare(v)
    }

    fn from_canonical(&self, _ctx: &ModelContext, p: Point) -> Point {
        poincare_to_klein(p)
    }

    fn boundary_measure(&self, _ctx: &ModelContext, v: Point) -> Option<f64> {
        boundary_norm(v)
    }
}

/// Half-plane `y > -1`, with the disk origin fixed.
pub struct UpperHalfPlane;

impl ModelMapping for UpperHalfPlane {
    fn to_canonical(&self, ctx: &ModelContext, v: Point) -> Point {
        ctx.upper_inv().apply(v)
    }

    fn from_canonical(&self, ctx: &ModelContext, p: Point) -> Point {
        ctx.upper().apply(p)
    }

    fn boundary_measure(&self, _ctx: &ModelContext, v: Point) -> Option<f64> {
        Some(-v.im)
    }
}

/// Strip `|y| < 1`.
pub struct Band;

impl ModelMapping for Band {
    fn to_canonical(&self, _ctx: &ModelContext, v: Point) -> Point {
        band_to_poincare(v)
    }

    fn from_canonical(&self, _ctx: &ModelContext, p: Point) -> Point {
        poincare_to_band(p)
    }

    fn boundary_measure(&self, _ctx: &ModelContext, v: Point) -> Option<f64> {
        Some(v.im.abs())
    }
}

/// Hyperboloid seen from above: the horizontal part of the lift.
pub struct Orthographic;

impl ModelMapping for Orthographic {
    fn to_canonical(&self, _ctx: &ModelContext, v: Point) -> Point {
        v / (1.0 + (1.0 + v.norm_sqr()).sqrt())
    }

    fn from_canonical(&self, _ctx: &ModelContext, p: Point) -> Point {
        p * (2.0 / (1.0 - p.norm_sqr()))
    }
}

/// Conformal square `[-1, 1]²`.
pub struct Square;

impl ModelMapping for Square {
    fn to_canonical(&self, ctx: &ModelContext, v: Point) -> Point {
        ctx.square().square_to_disk(v)
    }

    fn from_canonical(&self, ctx: &ModelContext, p: Point) -> Point {
        ctx.square().disk_to_square(p)
    }

    fn boundary_measure(&self, _ctx: &ModelContext, v: Point) -> Option<f64> {
        Some(v.re.abs().max(v.im.abs()))
    }
}

/// The disk turned inside out by inversion in the unit circle.
pub struct InvertedPoincare;

impl ModelMapping for InvertedPoincare {
    fn to_canonical(&self, _ctx: &ModelContext, v: Point) -> Point {
        invert(v)
    }

    fn from_canonical(&self, _ctx: &ModelContext, p: Point) -> Point {
        invert(p)
    }

    fn boundary_measure(&self, _ctx: &ModelContext, v: Point) -> Option<f64> {
        let r = v.norm();
        Some(if r == 0.0 { f64::INFINITY } else { 1.0 / r })
    }
}

fn invert(v: Point) -> Point {
    let r2 = v.norm_sqr();
    if r2 == 0.0 {
        return point(f64::INFINITY, f64::INFINITY);
    }
    v / r2
}

/// Exterior of the ellipse with semi-axes 1 and `joukowsky_minor`.
pub struct Joukowsky;

impl Joukowsky {
    fn coefficients(ctx: &ModelContext) -> (f64, f64) {
        let minor = ctx.params.joukowsky_minor.abs();
        ((1.0 - minor) / 2.0, (1.0 + minor) / 2.0)
    }
}

impl ModelMapping for Joukowsky {
    fn to_canonical(&self, ctx: &ModelContext, v: Point) -> Point {
        let (alpha, beta) = Self::coefficients(ctx);
        if alpha == 0.0 {
            return Complex64::new(beta, 0.0) / v;
        }
        // Roots of α z² - w z + β; their product β/α exceeds one, so exactly one lies in the disk.
        let disc = (v * v - 4.0 * alpha * beta).sqrt();
        let r1 = (v + disc) / (2.0 * alpha);
        let r2 = (v - disc) / (2.0 * alpha);
        if r1.norm() <= r2.norm() { r1 } else { r2 }
    }

    fn from_canonical(&self, ctx: &ModelContext, p: Point) -> Point {
        let (alpha, beta) = Self::coefficients(ctx);
        p * alpha + Complex64::new(beta, 0.0) / p
    }

    fn boundary_measure(&self, ctx: &ModelContext, v: Point) -> Option<f64> {
        let minor = ctx.params.joukowsky_minor.abs();
        if minor == 0.0 {
            return None;
        }
        let e = (v.re * v.re + (v.im / minor).powi(2)).sqrt();
        Some(if e == 0.0 { f64::INFINITY } else { 1.0 / e })
    }
}

/// Annulus obtained by wrapping the band model around the origin.
pub struct Ring;

impl Ring {
    fn period(ctx: &ModelContext) -> f64 {
        ctx.params.ring_period * f64::from(ctx.params.ring_copies.max(1))
    }

    fn inner_radius(ctx: &ModelContext) -> f64 {
        (-4.0 * PI / Self::period(ctx)).exp()
    }
}

impl ModelMapping for Ring {
    fn to_canonical(&self, ctx: &ModelContext, v: Point) -> Point {
        let i = Complex64::i();
        let band = -(i * v.ln()) * (Self::period(ctx) / (2.0 * PI)) - i;
        band_to_poincare(band)
    }

    fn from_canonical(&self, ctx: &ModelContext, p: Point) -> Point {
        let i = Complex64::i();
        let band = poincare_to_band(p);
        (i * (band + i) * (2.0 * PI / Self::period(ctx))).exp()
    }

    fn boundary_measure(&self, ctx: &ModelContext, v: Point) -> Option<f64> {
        let r = v.norm();
        let inner = Self::inner_radius(ctx);
        Some(if r == 0.0 { f64::INFINITY } else { r.max(inner / r) })
    }
}

/// Radius equals hyperbolic distance from the centre.
pub struct AzimuthalEquidistant;

impl ModelMapping for AzimuthalEquidistant {
    fn to_canonical(&self, _ctx: &ModelContext, v: Point) -> Point {
        radial(v, |d| (d / 2.0).tanh())
    }

    fn from_canonical(&self, _ctx: &ModelContext, p: Point) -> Point {
        radial(p, |r| 2.0 * r.atanh())
    }
}

/// Disk areas proportional to hyperbolic areas.
pub struct AzimuthalEqualArea;

impl ModelMapping for AzimuthalEqualArea {
    fn to_canonical(&self, _ctx: &ModelContext, v: Point) -> Point {
        radial(v, |rho| rho / (1.0 + rho * rho).sqrt())
    }

    fn from_canonical(&self, _ctx: &ModelContext, p: Point) -> Point {
        radial(p, |r| r / (1.0 - r * r).sqrt())
    }
}

/// Regular polygon with circumradius 1 and `polygon_sides` sides.
pub struct SchwarzChristoffelModel;

impl ModelMapping for SchwarzChristoffelModel {
    fn to_canonical(&self, ctx: &ModelContext, v: Point) -> Point {
        ctx.polygon().polygon_to_disk(v)
    }

    fn from_canonical(&self, ctx: &ModelContext, p: Point) -> Point {
        ctx.polygon().disk_to_polygon(p)
    }

    fn boundary_measure(&self, ctx: &ModelContext, v: Point) -> Option<f64> {
        Some(ctx.polygon().polygon_measure(v))
    }
}
