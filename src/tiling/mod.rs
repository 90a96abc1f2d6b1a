//! Tiling state: mirrors, generating vertex and the per-sample pipeline.
//!
//! [`TilingState::new`] runs the one-time setup (mirror construction,
//! starting point search, edge precomputation, centering). The resulting
//! state is immutable and shared by every sample query.

use std::f64::consts::PI;
use std::fmt;

pub mod fold;
pub mod generator;
pub mod locator;
pub mod mirrors;
pub mod spec;

pub use fold::{Fold, Folder};
pub use generator::{Edge, GeneratingElement, Proximity, Widths, closest_vertex_index};
pub use locator::{Locator, SNUB_ROTATIONS, StartingPoint};
pub use mirrors::FundamentalTriangle;
pub use spec::{Centering, DisplayModels, RasterSettings, TilingSpec, Tolerances};

use crate::color::{ColoringPolicy, Rgba};
use crate::geom::{Geometry, Mobius, Point, Tolerance, distance, is_finite_point};
use crate::models::{ModelContext, ModelKind, Region};

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TilingError {
    #[error("{{{p},{q}}} has no fundamental triangle")]
    DegenerateTriangle { p: u32, q: u32 },
    #[error("active mirror set {active:?} must be a non-empty subset of {{0, 1, 2}}")]
    InvalidActiveSet { active: Vec<usize> },
    #[error("snub tilings need all three mirrors active")]
    SnubRequiresAllMirrors,
    #[error("dual snub tilings are not supported")]
    DualSnubUnsupported,
    #[error("colour palette is empty")]
    EmptyPalette,
    #[error("invalid raster {width}x{height}")]
    InvalidRaster { width: u32, height: u32 },
    #[error(
        "starting point search stopped at objective {objective:e} after {iterations} iterations"
    )]
    NonConvergentStartingPoint { objective: f64, iterations: usize },
}

/// An iterative search that hit its cap, with the best estimate it reached.
#[derive(Debug, Clone, PartialEq)]
pub struct NonConvergence<T> {
    pub best: T,
    pub iterations: usize,
    pub residual: f64,
}

impl<T> fmt::Display for NonConvergence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no convergence after {} iterations (residual {:e})",
            self.iterations, self.residual
        )
    }
}

impl<T: fmt::Debug> std::error::Error for NonConvergence<T> {}

// ─────────────────────────────────────────────────────────────────────────────
// Sample results
// ─────────────────────────────────────────────────────────────────────────────

/// Result of [`TilingState::fold_point`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldOutcome {
    pub folded: Point,
    pub flips: [u32; 3],
    pub converged: bool,
}

/// Everything the colouring policies read about a folded sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleInfo {
    pub folded: Point,
    pub flips: [u32; 3],
    /// Face class, an index into the palette.
    pub face: usize,
    pub near_edge: bool,
    pub near_vertex: bool,
    pub near_mirror: bool,
    /// Metric distance to the closest edge.
    pub edge_distance: f64,
}

impl SampleInfo {
    #[must_use]
    pub fn parity_even(&self) -> bool {
        self.flips.iter().sum::<u32>() % 2 == 0
    }
}

/// Outcome of one display-space sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    Shaded(Rgba),
    /// Outside the model's drawable region.
    Background,
    /// On the model's boundary band.
    Limit,
    /// The fold hit its iteration cap.
    Unconverged,
}

impl Sample {
    #[must_use]
    pub const fn color(self) -> Rgba {
        match self {
            Self::Shaded(color) => color,
            Self::Background => Rgba::WHITE,
            Self::Limit => Rgba::BLACK,
            Self::Unconverged => Rgba::NEUTRAL_GRAY,
        }
    }
}

/// How the starting point search ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatorReport {
    pub iterations: usize,
    pub objective: f64,
    pub converged: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// State
// ─────────────────────────────────────────────────────────────────────────────

/// Read-only state derived from a [`TilingSpec`].
#[derive(Debug, Clone)]
pub struct TilingState {
    spec: TilingSpec,
    active: Vec<usize>,
    triangle: FundamentalTriangle,
    element: GeneratingElement,
    view: Mobius,
    model: ModelKind,
    context: ModelContext,
    locator: LocatorReport,
}

/// Builds the state for `spec`.
///
/// # Errors
///
/// See [`TilingState::new`].
pub fn init_tiling(spec: &TilingSpec) -> Result<TilingState, TilingError> {
    TilingState::new(spec)
}

impl TilingState {
    /// # Errors
    ///
    /// Rejects degenerate `{p,q}` pairs and inconsistent specs. A starting
    /// point search that does not converge is only logged, unless
    /// [`TilingSpec::strict_convergence`] is set.
    pub fn new(spec: &TilingSpec) -> Result<Self, TilingError> {
        let triangle = FundamentalTriangle::new(spec.p, spec.q)?;
        let active = validate(spec)?;
        let geometry = triangle.geometry;

        let locator = Locator::new(&triangle, spec.tolerances);
        let search = if spec.snub { locator.locate_snub() } else { locator.locate(&active) };
        let (start, converged) = match search {
            Ok(found) => (found, true),
            Err(err) => {
                if spec.strict_convergence {
                    return Err(TilingError::NonConvergentStartingPoint {
                        objective: err.residual,
                        iterations: err.iterations,
                    });
                }
                log::warn!("starting point for {spec}: {err}; using best estimate");
                (err.best, false)
            }
        };
        log::debug!(
            "{geometry} tiling {{{},{}}}: starting point {} after {} iterations (objective {:e})",
            spec.p,
            spec.q,
            start.point,
            start.iterations,
            start.objective
        );

        let element = if spec.snub {
            GeneratingElement::snub(&triangle, start)
        } else if spec.dual {
            GeneratingElement::dual(&triangle, &active, start)
        } else {
            GeneratingElement::uniform(&triangle, &active, start)
        };
        log::debug!("{} edges, {} vertices", element.edges.len(), element.vertices.len());

        let view = centering(spec, &triangle, start.point);
        let mut context = ModelContext::new(spec.model_params);
        if geometry == Geometry::Euclidean {
            context = context.with_lattice(triangle.lattice());
        }

        Ok(Self {
            spec: spec.clone(),
            active,
            model: spec.display_model(),
            triangle,
            element,
            view,
            context,
            locator: LocatorReport {
                iterations: start.iterations,
                objective: start.objective,
                converged,
            },
        })
    }

    #[must_use]
    pub const fn spec(&self) -> &TilingSpec {
        &self.spec
    }

    #[must_use]
    pub const fn geometry(&self) -> Geometry {
        self.triangle.geometry
    }

    #[must_use]
    pub const fn triangle(&self) -> &FundamentalTriangle {
        &self.triangle
    }

    #[must_use]
    pub const fn element(&self) -> &GeneratingElement {
        &self.element
    }

    #[must_use]
    pub const fn starting_point(&self) -> Point {
        self.element.start.point
    }

    /// Isometry applied to canonical samples before folding.
    #[must_use]
    pub const fn view(&self) -> &Mobius {
        &self.view
    }

    #[must_use]
    pub const fn model(&self) -> ModelKind {
        self.model
    }

    #[must_use]
    pub const fn context(&self) -> &ModelContext {
        &self.context
    }

    #[must_use]
    pub const fn locator_report(&self) -> LocatorReport {
        self.locator
    }

    fn folder(&self) -> Folder<'_> {
        let tol = &self.spec.tolerances;
        Folder::new(&self.triangle, tol.fold_max_iterations, Tolerance::new(tol.mirror_side))
    }

    const fn widths(&self) -> Widths {
        Widths { edge: self.spec.edge_width, vertex: self.spec.vertex_width }
    }

    /// Folds a canonical point into the fundamental triangle.
    #[must_use]
    pub fn fold_point(&self, p: Point) -> FoldOutcome {
        match self.folder().fold(p) {
            Ok(fold) => FoldOutcome { folded: fold.point, flips: fold.flips, converged: true },
            Err(err) => FoldOutcome {
                folded: err.best.point,
                flips: err.best.flips,
                converged: false,
            },
        }
    }

    /// Folds a canonical point and measures it against the generating element.
    ///
    /// # Errors
    ///
    /// Returns the fold diagnostic when the fold hits its iteration cap.
    pub fn classify(&self, p: Point) -> Result<SampleInfo, NonConvergence<Fold>> {
        let fold = self.folder().fold(p)?;
        let g = self.geometry();

        // Snubs keep only the rotation subgroup: odd samples move to R0(T).
        let folded = if self.element.is_snub() && !fold.parity_even() {
            self.triangle.reflect(0, fold.point)
        } else {
            fold.point
        };

        let proximity = self.element.proximity(g, folded, self.widths());
        let near_mirror = self.spec.coloring.show_mirrors
            && self
                .triangle
                .mirrors
                .iter()
                .any(|m| {
                    distance(g, fold.point, m.reflect(fold.point)) / 2.0 < self.spec.edge_width
                });

        Ok(SampleInfo {
            folded,
            flips: fold.flips,
            face: self.element.face_index(&self.triangle, folded),
            near_edge: proximity.near_edge,
            near_vertex: proximity.near_vertex,
            near_mirror,
            edge_distance: proximity.distance,
        })
    }

    /// Colour of a canonical point under `policy`.
    #[must_use]
    pub fn color_at(&self, p: Point, policy: ColoringPolicy) -> Rgba {
        match self.classify(p) {
            Ok(info) => self.spec.coloring.shade_as(policy, &info, self.element.edge_color),
            Err(_) => Rgba::NEUTRAL_GRAY,
        }
    }

    /// Display-model point to the canonical model, under this tiling's model
    /// parameters and translation lattice.
    #[must_use]
    pub fn model_to_canonical(&self, v: Point) -> Point {
        self.model.mapping().to_canonical(&self.context, v)
    }

    /// Inverse of [`TilingState::model_to_canonical`].
    #[must_use]
    pub fn canonical_to_model(&self, p: Point) -> Point {
        self.model.mapping().from_canonical(&self.context, p)
    }

    /// Full pipeline for a point in display-model coordinates.
    #[must_use]
    pub fn sample(&self, v: Point) -> Sample {
        match self.model.region(&self.context, v) {
            Region::Background => return Sample::Background,
            Region::Limit => return Sample::Limit,
            Region::Inside => {}
        }
        let canonical = self.model_to_canonical(v);
        if !is_finite_point(canonical) {
            return Sample::Background;
        }
        let p = self.view.apply(canonical);
        if !is_finite_point(p) {
            return Sample::Background;
        }
        match self.classify(p) {
            Ok(info) => Sample::Shaded(self.spec.coloring.shade(&info, self.element.edge_color)),
            Err(_) => Sample::Unconverged,
        }
    }

    /// Active triangle vertex closest to `p`.
    #[must_use]
    pub fn closest_vertex_index(&self, p: Point) -> usize {
        closest_vertex_index(&self.triangle, &self.active, p)
    }
}

fn validate(spec: &TilingSpec) -> Result<Vec<usize>, TilingError> {
    if spec.active.is_empty() || spec.active.iter().any(|&i| i > 2) {
        return Err(TilingError::InvalidActiveSet { active: spec.active.clone() });
    }
    let mut active = spec.active.clone();
    active.sort_unstable();
    active.dedup();

    if spec.dual && spec.snub {
        return Err(TilingError::DualSnubUnsupported);
    }
    if spec.snub && active.len() != 3 {
        return Err(TilingError::SnubRequiresAllMirrors);
    }
    if spec.coloring.palette.is_empty() {
        return Err(TilingError::EmptyPalette);
    }
    let raster = &spec.raster;
    let bad_bounds = raster.bounds.is_some_and(|b| !(b.is_finite() && b > 0.0));
    if raster.width == 0 || raster.height == 0 || bad_bounds {
        return Err(TilingError::InvalidRaster { width: raster.width, height: raster.height });
    }
    Ok(active)
}

fn centering(spec: &TilingSpec, triangle: &FundamentalTriangle, start: Point) -> Mobius {
    let g = triangle.geometry;
    match spec.centering {
        Centering::General => spec.mobius,
        Centering::FundamentalTriangleVertex1 => Mobius::isometry(g, 0.0, triangle.verts[0]),
        Centering::FundamentalTriangleVertex2 => {
            Mobius::isometry(g, PI / f64::from(triangle.p), triangle.verts[1])
        }
        Centering::FundamentalTriangleVertex3 => Mobius::isometry(g, 0.0, triangle.verts[2]),
        Centering::Vertex => Mobius::isometry(g, 0.0, start),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point;
    use crate::models::EuclideanModel;

    #[test]
    fn degenerate_pairs_fail_init() {
        let err = init_tiling(&TilingSpec::new(2, 2, &[0])).expect_err("degenerate");
        assert_eq!(err, TilingError::DegenerateTriangle { p: 2, q: 2 });
    }

    #[test]
    fn inconsistent_specs_are_rejected() {
        let bad_active = TilingSpec::new(5, 4, &[3]);
        assert!(matches!(init_tiling(&bad_active), Err(TilingError::InvalidActiveSet { .. })));
        let no_active = TilingSpec::new(5, 4, &[]);
        assert!(matches!(init_tiling(&no_active), Err(TilingError::InvalidActiveSet { .. })));

        let mut snub = TilingSpec::new(5, 4, &[0, 1]);
        snub.snub = true;
        assert_eq!(init_tiling(&snub).expect_err("snub"), TilingError::SnubRequiresAllMirrors);
        snub.dual = true;
        assert_eq!(init_tiling(&snub).expect_err("dual snub"), TilingError::DualSnubUnsupported);

        let mut empty = TilingSpec::new(5, 4, &[0]);
        empty.coloring.palette.clear();
        assert_eq!(init_tiling(&empty).expect_err("palette"), TilingError::EmptyPalette);

        let mut raster = TilingSpec::new(5, 4, &[0]);
        raster.raster.width = 0;
        assert!(matches!(init_tiling(&raster), Err(TilingError::InvalidRaster { .. })));
    }

    #[test]
    fn duplicate_active_mirrors_are_merged() {
        let state = init_tiling(&TilingSpec::new(6, 3, &[1, 0, 1])).expect("valid");
        assert_eq!(state.element().edges.len(), 2);
    }

    #[test]
    fn strict_convergence_turns_warning_into_error() {
        let mut spec = TilingSpec::new(5, 4, &[0, 1, 2]);
        spec.tolerances.locator_threshold = -1.0;
        let lenient = init_tiling(&spec).expect("warns only");
        assert!(!lenient.locator_report().converged);

        spec.strict_convergence = true;
        assert!(matches!(
            init_tiling(&spec),
            Err(TilingError::NonConvergentStartingPoint { .. })
        ));
    }

    #[test]
    fn heptagonal_origin_folds_to_itself() {
        let state = init_tiling(&TilingSpec::new(7, 3, &[0, 1])).expect("valid");
        let outcome = state.fold_point(point(0.0, 0.0));
        assert!(outcome.converged);
        assert_eq!(outcome.flips, [0, 0, 0]);
        assert!(outcome.folded.norm() < 1e-15);
    }

    #[test]
    fn vertex_centering_moves_generating_vertex_to_origin() {
        let mut spec = TilingSpec::new(7, 3, &[0, 1]);
        spec.centering = Centering::Vertex;
        let state = init_tiling(&spec).expect("valid");
        let centre = state.view().apply(point(0.0, 0.0));
        assert!((centre - state.starting_point()).norm() < 1e-12);
    }

    #[test]
    fn fundamental_vertex_centering_moves_each_vertex_to_origin() {
        let variants = [
            (Centering::FundamentalTriangleVertex1, 0, 0.0),
            (Centering::FundamentalTriangleVertex2, 1, PI / 5.0),
            (Centering::FundamentalTriangleVertex3, 2, 0.0),
        ];
        for (centering, index, rotation) in variants {
            let mut spec = TilingSpec::new(5, 4, &[0]);
            spec.centering = centering;
            let state = init_tiling(&spec).expect("valid");
            let view = state.view();
            let centre = view.apply(point(0.0, 0.0));
            assert!((centre - state.triangle().verts[index]).norm() < 1e-12, "{centering:?}");
            // Argument of the derivative at the origin is the applied rotation.
            let derivative = (view.a * view.d - view.b * view.c) / (view.d * view.d);
            assert!((derivative.arg() - rotation).abs() < 1e-12, "{centering:?}");
        }
    }

    #[test]
    fn periodic_models_use_the_tiling_lattice() {
        let mut spec = TilingSpec::new(3, 6, &[0]);
        spec.models.euclidean = EuclideanModel::Conformal;
        let state = init_tiling(&spec).expect("valid");
        let [period, _] = state.triangle().lattice();
        let p = point(0.13, -0.07);
        let v = state.canonical_to_model(p);
        assert!((state.canonical_to_model(p + period) - v).norm() < 1e-9);
        let back = state.canonical_to_model(state.model_to_canonical(v));
        assert!((back - v).norm() < 1e-9);
    }

    #[test]
    fn tile_centre_gets_first_palette_colour() {
        let state = init_tiling(&TilingSpec::new(7, 3, &[0])).expect("valid");
        assert_eq!(state.sample(point(0.0, 0.0)), Sample::Shaded(Rgba::rgb(72, 209, 204)));
        let domain = state.color_at(point(0.0, 0.0), ColoringPolicy::Domains);
        assert_eq!(domain, Rgba::rgb(72, 209, 204));
    }

    #[test]
    fn disk_exterior_is_background_and_rim_is_limit() {
        let state = init_tiling(&TilingSpec::new(7, 3, &[0])).expect("valid");
        assert_eq!(state.sample(point(1.5, 0.0)), Sample::Background);
        assert_eq!(state.sample(point(1.0005, 0.0)), Sample::Limit);
        assert_eq!(Sample::Limit.color(), Rgba::BLACK);
    }

    #[test]
    fn tile_vertex_is_drawn_as_edge() {
        let state = init_tiling(&TilingSpec::new(4, 4, &[0])).expect("valid");
        let info = state.classify(state.triangle().verts[0]).expect("folds");
        assert!(info.near_vertex && info.near_edge);
        assert!(info.edge_distance < 1e-12);
    }

    #[test]
    fn mirrors_are_flagged_only_when_requested() {
        let mut spec = TilingSpec::new(6, 3, &[0]);
        let info = sample_near_mid(&spec);
        assert!(!info.near_mirror);
        spec.coloring.show_mirrors = true;
        assert!(sample_near_mid(&spec).near_mirror);
    }

    fn sample_near_mid(spec: &TilingSpec) -> SampleInfo {
        let state = init_tiling(spec).expect("valid");
        let [_, mid, centre] = state.triangle().verts;
        state.classify((mid + centre) / 2.0).expect("folds")
    }

    #[test]
    fn closest_vertex_uses_active_set() {
        let state = init_tiling(&TilingSpec::new(5, 3, &[0, 2])).expect("valid");
        assert_eq!(state.closest_vertex_index(state.triangle().verts[1]), 0);
    }
}
