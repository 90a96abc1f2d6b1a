use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::ColoringOptions;
use crate::geom::{Geometry, Mobius};
use crate::models::{EuclideanModel, HyperbolicModel, ModelKind, ModelParams, SphericalModel};

/// Everything a render request specifies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilingSpec {
    /// Sides of each tile.
    pub p: u32,
    /// Tiles meeting at each vertex.
    pub q: u32,
    /// Active mirror indices: 0 opposite the tile vertex, 1 opposite the
    /// edge midpoint, 2 opposite the tile centre.
    pub active: Vec<usize>,
    pub dual: bool,
    pub snub: bool,
    /// Metric half-width of drawn edges.
    pub edge_width: f64,
    /// Metric radius of drawn vertices.
    pub vertex_width: f64,
    pub centering: Centering,
    /// Isometry applied to every canonical sample, used as-is by
    /// [`Centering::General`].
    pub mobius: Mobius,
    pub models: DisplayModels,
    pub model_params: ModelParams,
    pub coloring: ColoringOptions,
    pub tolerances: Tolerances,
    pub raster: RasterSettings,
    /// Fail initialization instead of warning when the starting point
    /// search does not converge.
    pub strict_convergence: bool,
}

impl Default for TilingSpec {
    fn default() -> Self {
        Self {
            p: 7,
            q: 3,
            active: vec![0],
            dual: false,
            snub: false,
            edge_width: 0.025,
            vertex_width: 0.025,
            centering: Centering::General,
            mobius: Mobius::IDENTITY,
            models: DisplayModels::default(),
            model_params: ModelParams::default(),
            coloring: ColoringOptions::default(),
            tolerances: Tolerances::default(),
            raster: RasterSettings::default(),
            strict_convergence: false,
        }
    }
}

impl TilingSpec {
    /// Spec for `{p,q}` with the given active mirrors and defaults elsewhere.
    #[must_use]
    pub fn new(p: u32, q: u32, active: &[usize]) -> Self {
        Self {
            p,
            q,
            active: active.to_vec(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn geometry(&self) -> Geometry {
        Geometry::classify(self.p, self.q)
    }

    /// Display model for this spec's geometry.
    #[must_use]
    pub fn display_model(&self) -> ModelKind {
        self.models.for_geometry(self.geometry())
    }

    /// Half-width of the viewed window.
    #[must_use]
    pub fn bounds(&self) -> f64 {
        self.raster.bounds.unwrap_or_else(|| self.geometry().default_bounds())
    }

    /// Sorted, deduplicated active mirror set as a bit mask.
    #[must_use]
    pub fn active_mask(&self) -> [bool; 3] {
        let mut mask = [false; 3];
        for &i in &self.active {
            if i < 3 {
                mask[i] = true;
            }
        }
        mask
    }

    fn family_name(&self) -> &'static str {
        if self.snub {
            return "snub";
        }
        match self.active_mask() {
            [true, false, false] => "regular",
            [false, false, true] => "dual regular",
            [false, true, false] => "rectified",
            [true, true, false] => "truncated",
            [false, true, true] => "bitruncated",
            [true, false, true] => "cantellated",
            [true, true, true] => "omnitruncated",
            [false, false, false] => "empty",
        }
    }
}

impl fmt::Display for TilingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} {} tiling {{{},{}}} in the {} model",
            if self.dual { "dual " } else { "" },
            self.family_name(),
            self.geometry(),
            self.p,
            self.q,
            self.display_model().name(),
        )
    }
}

/// What the view is centred on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Centering {
    /// Use [`TilingSpec::mobius`] unchanged.
    #[default]
    General,
    /// The tile vertex of the fundamental triangle.
    FundamentalTriangleVertex1,
    /// The edge midpoint of the fundamental triangle.
    FundamentalTriangleVertex2,
    /// The tile centre of the fundamental triangle.
    FundamentalTriangleVertex3,
    /// The generating vertex of the uniform tiling.
    Vertex,
}

/// Display model per geometry; the one matching the tiling is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayModels {
    pub hyperbolic: HyperbolicModel,
    pub spherical: SphericalModel,
    pub euclidean: EuclideanModel,
}

impl Default for DisplayModels {
    fn default() -> Self {
        Self {
            hyperbolic: HyperbolicModel::Poincare,
            spherical: SphericalModel::Stereographic,
            euclidean: EuclideanModel::Isometric,
        }
    }
}

impl DisplayModels {
    #[must_use]
    pub const fn for_geometry(&self, geometry: Geometry) -> ModelKind {
        match geometry {
            Geometry::Hyperbolic => ModelKind::Hyperbolic(self.hyperbolic),
            Geometry::Spherical => ModelKind::Spherical(self.spherical),
            Geometry::Euclidean => ModelKind::Euclidean(self.euclidean),
        }
    }

    /// Replaces the entry for `model`'s geometry.
    pub fn set(&mut self, model: ModelKind) {
        match model {
            ModelKind::Hyperbolic(kind) => self.hyperbolic = kind,
            ModelKind::Spherical(kind) => self.spherical = kind,
            ModelKind::Euclidean(kind) => self.euclidean = kind,
        }
    }
}

/// Numeric tolerances and iteration caps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    /// Objective value below which the starting point counts as found.
    pub locator_threshold: f64,
    pub locator_max_iterations: usize,
    /// Fraction of a barycentric coordinate used as the first search step.
    pub locator_initial_step: f64,
    /// Divisor applied to the search step after every sweep.
    pub locator_step_decay: f64,
    pub fold_max_iterations: usize,
    /// Points this close to a mirror count as inside it.
    pub mirror_side: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            locator_threshold: 1e-14,
            locator_max_iterations: 1000,
            locator_initial_step: 0.5,
            locator_step_decay: 1.5,
            fold_max_iterations: 4000,
            mirror_side: 1e-10,
        }
    }
}

/// Output resolution and sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    pub width: u32,
    pub height: u32,
    /// Half-width of the window in model coordinates; the geometry's default
    /// when unset. The vertical half-extent follows the aspect ratio.
    pub bounds: Option<f64>,
    pub antialias: bool,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 1200,
            bounds: None,
            antialias: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_family_and_model() {
        let spec = TilingSpec::new(7, 3, &[0, 1]);
        let text = spec.to_string();
        assert!(text.contains("truncated hyperbolic tiling {7,3}"), "{text}");
        assert!(text.contains("Poincare"), "{text}");
    }

    #[test]
    fn bounds_default_per_geometry() {
        assert!((TilingSpec::new(4, 4, &[0]).bounds() - 2.0).abs() < 1e-12);
        assert!((TilingSpec::new(5, 3, &[0]).bounds() - 6.0).abs() < 1e-12);
        assert!((TilingSpec::new(7, 3, &[0]).bounds() - 1.01).abs() < 1e-12);
    }

    #[test]
    fn display_model_follows_geometry() {
        let mut spec = TilingSpec::new(4, 4, &[0]);
        spec.models.set(ModelKind::Euclidean(EuclideanModel::Disk));
        assert_eq!(spec.display_model(), ModelKind::Euclidean(EuclideanModel::Disk));
    }
}
