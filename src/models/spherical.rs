//! Spherical display models. Canonical model: stereographic projection with
//! the south pole at the origin.
//!
//! The cylindrical maps (equirectangular, Mercator, sinusoidal) treat the
//! canonical origin as the point of longitude and latitude zero.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use super::{ModelContext, ModelMapping, Registration, radial};
use crate::geom::{Point, Vec3, point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SphericalModel {
    Stereographic,
    Gnomonic,
    AzimuthalEquidistant,
    AzimuthalEqualArea,
    Equirectangular,
    Mercator,
    Sinusoidal,
    PeirceQuincuncial,
}

pub const REGISTRATIONS: &[Registration<SphericalModel>] = &[
    Registration {
        names: &["Stereographic", "Conformal"],
        kind: SphericalModel::Stereographic,
        mapping: &Stereographic,
    },
    Registration {
        names: &["Gnomonic", "Central"],
        kind: SphericalModel::Gnomonic,
        mapping: &Gnomonic,
    },
    Registration {
        names: &["Azimuthal Equidistant", "Equidistant"],
        kind: SphericalModel::AzimuthalEquidistant,
        mapping: &AzimuthalEquidistant,
    },
    Registration {
        names: &["Azimuthal Equal Area", "Equal Area", "Lambert"],
        kind: SphericalModel::AzimuthalEqualArea,
        mapping: &AzimuthalEqualArea,
    },
    Registration {
        names: &["Equirectangular", "Plate Carree"],
        kind: SphericalModel::Equirectangular,
        mapping: &Equirectangular,
    },
    Registration {
        names: &["Mercator"],
        kind: SphericalModel::Mercator,
        mapping: &Mercator,
    },
    Registration {
        names: &["Sinusoidal"],
        kind: SphericalModel::Sinusoidal,
        mapping: &Sinusoidal,
    },
    Registration {
        names: &["Peirce Quincuncial", "Peirce", "Quincuncial"],
        kind: SphericalModel::PeirceQuincuncial,
        mapping: &PeirceQuincuncial,
    },
];

// ─────────────────────────────────────────────────────────────────────────────
// Shared conversions
// ─────────────────────────────────────────────────────────────────────────────

#[must_use]
pub fn stereo_to_gnomonic(s: Point) -> Point {
    s * (2.0 / (1.0 - s.norm_sqr()))
}

#[must_use]
pub fn gnomonic_to_stereo(g: Point) -> Point {
    g / (1.0 + (1.0 + g.norm_sqr()).sqrt())
}

/// Longitude and latitude to the stereographic plane. The sphere is centred
/// so that (0, 0) sits at `(1, 0, 0)`, projected from `(-1, 0, 0)`.
#[must_use]
pub fn lon_lat_to_stereo(lon: f64, lat: f64) -> Point {
    let v = Vec3::new(lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin());
    point(v.y, v.z) / (1.0 + v.x)
}

/// Inverse of [`lon_lat_to_stereo`], returning `(lon, lat)`.
#[must_use]
pub fn stereo_to_lon_lat(s: Point) -> (f64, f64) {
    let r2 = s.norm_sqr();
    let scale = 1.0 / (1.0 + r2);
    let v = Vec3::new((1.0 - r2) * scale, 2.0 * s.re * scale, 2.0 * s.im * scale);
    (v.y.atan2(v.x), v.z.clamp(-1.0, 1.0).asin())
}

// ─────────────────────────────────────────────────────────────────────────────
// Models
// ─────────────────────────────────────────────────────────────────────────────

pub struct Stereographic;

impl ModelMapping for Stereographic {
    fn to_canonical(&self, _ctx: &ModelContext, v: Point) -> Point {
        v
    }

    fn from_canonical(&self, _ctx: &ModelContext, p: Point) -> Point {
        p
    }
}

/// Projection from the centre of the sphere; shows one hemisphere.
pub struct Gnomonic;

impl ModelMapping for Gnomonic {
    fn to_canonical(&self, _ctx: &ModelContext, v: Point) -> Point {
        gnomonic_to_stereo(v)
    }

    fn from_canonical(&self, _ctx: &ModelContext, p: Point) -> Point {
        stereo_to_gnomonic(p)
    }
}

/// Radius equals angular distance from the centre; boundary at π.
pub struct AzimuthalEquidistant;

impl ModelMapping for AzimuthalEquidistant {
    fn to_canonical(&self, _ctx: &ModelContext, v: Point) -> Point {
        radial(v, |theta| (theta / 2.0).tan())
    }

    fn from_canonical(&self, _ctx: &ModelContext, p: Point) -> Point {
        radial(p, |r| 2.0 * r.atan())
    }

    fn boundary_measure(&self, _ctx: &ModelContext, v: Point) -> Option<f64> {
        Some(v.norm() / PI)
    }

    fn draws_limit(&self) -> bool {
        false
    }
}

/// Lambert projection with radius `2 sin(θ/2)`; boundary at 2.
pub struct AzimuthalEqualArea;

impl ModelMapping for AzimuthalEqualArea {
    fn to_canonical(&self, _ctx: &ModelContext, v: Point) -> Point {
        radial(v, |rho| (rho / 2.0).clamp(-1.0, 1.0).asin().tan())
    }

    fn from_canonical(&self, _ctx: &ModelContext, p: Point) -> Point {
        radial(p, |r| 2.0 * r.atan().sin())
    }

    fn boundary_measure(&self, _ctx: &ModelContext, v: Point) -> Option<f64> {
        Some(v.norm() / 2.0)
    }

    fn draws_limit(&self) -> bool {
        false
    }
}

fn lon_lat_measure(lon: f64, lat: f64) -> f64 {
    (lon.abs() / PI).max(lat.abs() / FRAC_PI_2)
}

pub struct Equirectangular;

impl ModelMapping for Equirectangular {
    fn to_canonical(&self, _ctx: &ModelContext, v: Point) -> Point {
        lon_lat_to_stereo(v.re, v.im)
    }

    fn from_canonical(&self, _ctx: &ModelContext, p: Point) -> Point {
        let (lon, lat) = stereo_to_lon_lat(p);
        point(lon, lat)
    }

    fn boundary_measure(&self, _ctx: &ModelContext, v: Point) -> Option<f64> {
        Some(lon_lat_measure(v.re, v.im))
    }

    fn draws_limit(&self) -> bool {
        false
    }
}

pub struct Mercator;

impl ModelMapping for Mercator {
    fn to_canonical(&self, _ctx: &ModelContext, v: Point) -> Point {
        lon_lat_to_stereo(v.re, v.im.sinh().atan())
    }

    fn from_canonical(&self, _ctx: &ModelContext, p: Point) -> Point {
        let (lon, lat) = stereo_to_lon_lat(p);
        point(lon, lat.tan().asinh())
    }

    fn boundary_measure(&self, _ctx: &ModelContext, v: Point) -> Option<f64> {
        Some(v.re.abs() / PI)
    }

    fn draws_limit(&self) -> bool {
        false
    }
}

pub struct Sinusoidal;

impl ModelMapping for Sinusoidal {
    fn to_canonical(&self, _ctx: &ModelContext, v: Point) -> Point {
        let lat = v.im;
        let cos = lat.cos();
        let lon = if cos.abs() < f64::EPSILON { 0.0 } else { v.re / cos };
        lon_lat_to_stereo(lon, lat)
    }

    fn from_canonical(&self, _ctx: &ModelContext, p: Point) -> Point {
        let (lon, lat) = stereo_to_lon_lat(p);
        point(lon * lat.cos(), lat)
    }

    fn boundary_measure(&self, _ctx: &ModelContext, v: Point) -> Option<f64> {
        let lat = v.im;
        if lat.abs() >= FRAC_PI_2 {
            return Some(lat.abs() / FRAC_PI_2);
        }
        Some(lon_lat_measure(v.re / lat.cos(), lat))
    }

    fn draws_limit(&self) -> bool {
        false
    }
}

/// Southern hemisphere onto the diamond `|x| + |y| <= 1`, northern
/// hemisphere onto the four triangles completing the square `|x| + |y| <= 2`.
pub struct PeirceQuincuncial;

impl ModelMapping for PeirceQuincuncial {
    fn to_canonical(&self, ctx: &ModelContext, v: Point) -> Point {
        let square = ctx.square();
        if v.re.abs() + v.im.abs() <= 1.0 {
            return square.diamond_to_disk(v);
        }
        let folded = square.diamond_edge(v).reflect(v);
        let s = square.diamond_to_disk(folded);
        let r2 = s.norm_sqr();
        if r2 == 0.0 { point(f64::INFINITY, f64::INFINITY) } else { s / r2 }
    }

    fn from_canonical(&self, ctx: &ModelContext, p: Point) -> Point {
        let square = ctx.square();
        let r2 = p.norm_sqr();
        if r2 <= 1.0 {
            return square.disk_to_diamond(p);
        }
        let d = square.disk_to_diamond(p / r2);
        square.diamond_edge(p).reflect(d)
    }

    fn boundary_measure(&self, _ctx: &ModelContext, v: Point) -> Option<f64> {
        Some((v.re.abs() + v.im.abs()) / 2.0)
    }

    fn draws_limit(&self) -> bool {
        false
    }
}
