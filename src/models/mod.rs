//! Display models and their maps to the canonical conformal model.
//!
//! Every model converts between its own coordinates and the canonical model
//! of its geometry (Poincaré disk, stereographic plane, Euclidean plane).
//! Models are unit types implementing [`ModelMapping`] and are looked up by
//! [`ModelKind`] through per-geometry registration tables.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::geom::{Geometry, Mobius, Point, point};

pub mod conformal;
pub mod euclidean;
pub mod hyperbolic;
pub mod spherical;

pub use conformal::{SchwarzChristoffel, SquareMap};
pub use euclidean::EuclideanModel;
pub use hyperbolic::HyperbolicModel;
pub use spherical::SphericalModel;

/// Samples whose boundary measure lies in `[1, 1 + LIMIT_BAND]` are painted
/// as the limit set; larger values are background.
pub const LIMIT_BAND: f64 = 1.33e-3;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("unknown {geometry} model '{name}'{}", suggestion_suffix(.suggestion))]
    UnknownModel {
        geometry: Geometry,
        name: String,
        suggestion: Option<String>,
    },
    #[error("model {model} cannot display {geometry} geometry")]
    GeometryMismatch { model: ModelKind, geometry: Geometry },
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map(|name| format!(", did you mean '{name}'?"))
        .unwrap_or_default()
}

/// A display model's pair of maps and its drawable region.
pub trait ModelMapping: Sync {
    /// Model coordinates to the canonical conformal model.
    fn to_canonical(&self, ctx: &ModelContext, v: Point) -> Point;

    /// Canonical conformal model to model coordinates.
    fn from_canonical(&self, ctx: &ModelContext, p: Point) -> Point;

    /// Normalized distance to the edge of the drawable region: below 1
    /// inside, 1 on the boundary. `None` for models covering the whole plane.
    fn boundary_measure(&self, _ctx: &ModelContext, _v: Point) -> Option<f64> {
        None
    }

    /// Whether the boundary itself is drawn as a limit set.
    fn draws_limit(&self) -> bool {
        true
    }
}

/// Classification of a model-space sample before any folding happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Inside,
    Limit,
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Side count of the Schwarz–Christoffel polygon.
    pub polygon_sides: u32,
    /// Euclidean period of the tiling in the band model, used by the ring.
    pub ring_period: f64,
    /// Number of band periods wrapped around the ring.
    pub ring_copies: u32,
    /// Minor semi-axis of the Joukowsky ellipse; the major one is 1.
    pub joukowsky_minor: f64,
    /// Lattice coefficients of the Euclidean spiral period.
    pub spiral: (i32, i32),
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            polygon_sides: 5,
            ring_period: 2.0,
            ring_copies: 3,
            joukowsky_minor: 0.3,
            spiral: (1, 1),
        }
    }
}

/// Immutable per-render state shared by all model maps.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelContext {
    pub params: ModelParams,
    /// Disk onto the half-plane `y > -1`, fixing the origin.
    upper: Mobius,
    upper_inv: Mobius,
    polygon: SchwarzChristoffel,
    square: SquareMap,
    /// Translation lattice of a Euclidean tiling.
    lattice: [Point; 2],
}

impl ModelContext {
    #[must_use]
    pub fn new(params: ModelParams) -> Self {
        let shift = Mobius::isometry(Geometry::Euclidean, 0.0, point(0.0, -1.0));
        let upper = shift * Mobius::upper_half_plane();
        Self {
            params,
            upper,
            upper_inv: upper.inverse(),
            polygon: SchwarzChristoffel::new(params.polygon_sides),
            square: SquareMap::default(),
            lattice: [point(1.0, 0.0), point(0.0, 1.0)],
        }
    }

    #[must_use]
    pub fn with_lattice(mut self, lattice: [Point; 2]) -> Self {
        self.lattice = lattice;
        self
    }

    #[must_use]
    pub const fn upper(&self) -> &Mobius {
        &self.upper
    }

    #[must_use]
    pub const fn upper_inv(&self) -> &Mobius {
        &self.upper_inv
    }

    #[must_use]
    pub const fn polygon(&self) -> &SchwarzChristoffel {
        &self.polygon
    }

    #[must_use]
    pub const fn square(&self) -> &SquareMap {
        &self.square
    }

    #[must_use]
    pub const fn lattice(&self) -> [Point; 2] {
        self.lattice
    }

    /// Period of the Euclidean spiral models.
    #[must_use]
    pub fn spiral_period(&self) -> Point {
        let (m, n) = self.params.spiral;
        self.lattice[0] * f64::from(m) + self.lattice[1] * f64::from(n)
    }
}

impl Default for ModelContext {
    fn default() -> Self {
        Self::new(ModelParams::default())
    }
}

/// Metadata for a model registration.
#[derive(Clone, Copy)]
pub struct Registration<K: 'static> {
    pub names: &'static [&'static str],
    pub kind: K,
    pub mapping: &'static dyn ModelMapping,
}

impl<K: fmt::Debug> fmt::Debug for Registration<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("names", &self.names)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

fn find_registration<K: PartialEq + Copy>(
    table: &'static [Registration<K>],
    kind: K,
) -> &'static Registration<K> {
    table.iter().find(|registration| registration.kind == kind).unwrap_or(&table[0])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    Hyperbolic(HyperbolicModel),
    Spherical(SphericalModel),
    Euclidean(EuclideanModel),
}

impl ModelKind {
    #[must_use]
    pub const fn geometry(&self) -> Geometry {
        match self {
            Self::Hyperbolic(_) => Geometry::Hyperbolic,
            Self::Spherical(_) => Geometry::Spherical,
            Self::Euclidean(_) => Geometry::Euclidean,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.registration_names()[0]
    }

    fn registration_names(&self) -> &'static [&'static str] {
        match *self {
            Self::Hyperbolic(kind) => find_registration(hyperbolic::REGISTRATIONS, kind).names,
            Self::Spherical(kind) => find_registration(spherical::REGISTRATIONS, kind).names,
            Self::Euclidean(kind) => find_registration(euclidean::REGISTRATIONS, kind).names,
        }
    }

    #[must_use]
    pub fn mapping(&self) -> &'static dyn ModelMapping {
        match *self {
            Self::Hyperbolic(kind) => find_registration(hyperbolic::REGISTRATIONS, kind).mapping,
            Self::Spherical(kind) => find_registration(spherical::REGISTRATIONS, kind).mapping,
            Self::Euclidean(kind) => find_registration(euclidean::REGISTRATIONS, kind).mapping,
        }
    }

    /// Canonical model of `geometry`.
    #[must_use]
    pub const fn canonical(geometry: Geometry) -> Self {
        match geometry {
            Geometry::Hyperbolic => Self::Hyperbolic(HyperbolicModel::Poincare),
            Geometry::Spherical => Self::Spherical(SphericalModel::Stereographic),
            Geometry::Euclidean => Self::Euclidean(EuclideanModel::Isometric),
        }
    }

    /// Classifies a model-space sample against the drawable region.
    #[must_use]
    pub fn region(&self, ctx: &ModelContext, v: Point) -> Region {
        let mapping = self.mapping();
        match mapping.boundary_measure(ctx, v) {
            Some(measure) if measure > 1.0 + LIMIT_BAND => Region::Background,
            Some(measure) if measure >= 1.0 => {
                if mapping.draws_limit() { Region::Limit } else { Region::Background }
            }
            Some(measure) if measure.is_nan() => Region::Background,
            _ => Region::Inside,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.geometry())
    }
}

/// Maps a point of `model` into the canonical model of `geometry`, with
/// default model parameters and the unit-square lattice.
///
/// # Errors
///
/// Returns [`ModelError::GeometryMismatch`] when the model belongs to a
/// different geometry.
pub fn model_to_canonical(
    model: ModelKind,
    geometry: Geometry,
    p: Point,
) -> Result<Point, ModelError> {
    model_to_canonical_in(&ModelContext::default(), model, geometry, p)
}

/// Inverse of [`model_to_canonical`].
///
/// # Errors
///
/// Returns [`ModelError::GeometryMismatch`] when the model belongs to a
/// different geometry.
pub fn canonical_to_model(
    model: ModelKind,
    geometry: Geometry,
    p: Point,
) -> Result<Point, ModelError> {
    canonical_to_model_in(&ModelContext::default(), model, geometry, p)
}

/// [`model_to_canonical`] under the parameters and lattice of `ctx`.
///
/// # Errors
///
/// Returns [`ModelError::GeometryMismatch`] when the model belongs to a
/// different geometry.
pub fn model_to_canonical_in(
    ctx: &ModelContext,
    model: ModelKind,
    geometry: Geometry,
    p: Point,
) -> Result<Point, ModelError> {
    check_geometry(model, geometry)?;
    Ok(model.mapping().to_canonical(ctx, p))
}

/// [`canonical_to_model`] under the parameters and lattice of `ctx`.
///
/// # Errors
///
/// Returns [`ModelError::GeometryMismatch`] when the model belongs to a
/// different geometry.
pub fn canonical_to_model_in(
    ctx: &ModelContext,
    model: ModelKind,
    geometry: Geometry,
    p: Point,
) -> Result<Point, ModelError> {
    check_geometry(model, geometry)?;
    Ok(model.mapping().from_canonical(ctx, p))
}

fn check_geometry(model: ModelKind, geometry: Geometry) -> Result<(), ModelError> {
    if model.geometry() == geometry {
        Ok(())
    } else {
        Err(ModelError::GeometryMismatch { model, geometry })
    }
}

/// Name lookup for display models.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    by_name: HashMap<(Geometry, String), ModelKind>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        let mut registry = Self { by_name: HashMap::new() };
        for registration in hyperbolic::REGISTRATIONS {
            registry.register_names(registration.names, ModelKind::Hyperbolic(registration.kind));
        }
        for registration in spherical::REGISTRATIONS {
            registry.register_names(registration.names, ModelKind::Spherical(registration.kind));
        }
        for registration in euclidean::REGISTRATIONS {
            registry.register_names(registration.names, ModelKind::Euclidean(registration.kind));
        }
        registry
    }
}

impl ModelRegistry {
    pub fn register_names(&mut self, names: &[&str], kind: ModelKind) {
        for name in names {
            self.by_name.insert((kind.geometry(), normalize_name(name)), kind);
        }
    }

    /// Resolves a model by name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownModel`] with the closest registered
    /// name as a suggestion.
    pub fn resolve(&self, geometry: Geometry, name: &str) -> Result<ModelKind, ModelError> {
        let key = normalize_name(name);
        if let Some(kind) = self.by_name.get(&(geometry, key.clone())) {
            return Ok(*kind);
        }
        let suggestion = self
            .by_name
            .iter()
            .filter(|((g, _), _)| *g == geometry)
            .map(|((_, candidate), kind)| (levenshtein::levenshtein(&key, candidate), kind))
            .min_by_key(|(dist, kind)| (*dist, kind.name()))
            .filter(|(dist, _)| *dist <= key.len().max(3) / 2)
            .map(|(_, kind)| kind.name().to_string());
        Err(ModelError::UnknownModel {
            geometry,
            name: name.to_string(),
            suggestion,
        })
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared radial helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Applies a radius map along the ray through `p`.
pub(crate) fn radial(p: Point, f: impl FnOnce(f64) -> f64) -> Point {
    let r = p.norm();
    if r == 0.0 {
        return p;
    }
    p * (f(r) / r)
}

/// `1 / (2 π i)`.
pub(crate) fn inv_two_pi_i() -> Complex64 {
    Complex64::new(0.0, -1.0 / (2.0 * PI))
}
