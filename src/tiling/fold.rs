//! Reduction of arbitrary points into the fundamental triangle.

use super::NonConvergence;
use super::mirrors::FundamentalTriangle;
use crate::geom::{Point, Tolerance};

/// A point carried into the fundamental triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fold {
    pub point: Point,
    /// Reflections applied per mirror.
    pub flips: [u32; 3],
}

impl Fold {
    #[must_use]
    pub fn total_flips(&self) -> u32 {
        self.flips.iter().sum()
    }

    /// Whether an even number of reflections was applied, so the map from the
    /// input to the folded point preserves orientation.
    #[must_use]
    pub fn parity_even(&self) -> bool {
        self.total_flips() % 2 == 0
    }
}

/// Greedy reflection folding.
///
/// The first two mirrors of `order` are alternated until both pass twice in
/// a row; only then is the third tested. A point within `tolerance` of a
/// mirror counts as inside it and is never reflected.
#[derive(Debug, Clone, Copy)]
pub struct Folder<'a> {
    triangle: &'a FundamentalTriangle,
    order: [usize; 3],
    max_iterations: usize,
    tolerance: Tolerance,
}

impl<'a> Folder<'a> {
    #[must_use]
    pub fn new(
        triangle: &'a FundamentalTriangle,
        max_iterations: usize,
        tolerance: Tolerance,
    ) -> Self {
        Self { triangle, order: [0, 1, 2], max_iterations, tolerance }
    }

    /// Uses a different mirror order; any permutation folds to the same point.
    #[must_use]
    pub fn with_order(mut self, order: [usize; 3]) -> Self {
        self.order = order;
        self
    }

    /// # Errors
    ///
    /// Returns the partially folded point when the iteration cap is reached.
    pub fn fold(&self, p: Point) -> Result<Fold, NonConvergence<Fold>> {
        let [first, second, outer] = self.order;
        let mut state = Fold { point: p, flips: [0; 3] };
        let mut iterations = 0;

        while iterations < self.max_iterations {
            if !self.fold_pair([first, second], &mut state, &mut iterations) {
                continue;
            }
            let mirror = &self.triangle.mirrors[outer];
            if mirror.is_outside(state.point, self.tolerance) {
                state.point = mirror.reflect(state.point);
                state.flips[outer] += 1;
                iterations += 1;
            } else {
                return Ok(state);
            }
        }

        Err(NonConvergence {
            best: state,
            iterations,
            residual: self.outside_distance(state.point),
        })
    }

    /// Alternates two mirrors until both pass consecutively. Returns false
    /// when the iteration budget runs out first.
    fn fold_pair(&self, pair: [usize; 2], state: &mut Fold, iterations: &mut usize) -> bool {
        let mut clean = 0;
        while *iterations < self.max_iterations {
            for i in pair {
                let mirror = &self.triangle.mirrors[i];
                if mirror.is_outside(state.point, self.tolerance) {
                    state.point = mirror.reflect(state.point);
                    state.flips[i] += 1;
                    clean = 0;
                } else {
                    clean += 1;
                    if clean >= pair.len() {
                        return true;
                    }
                }
            }
            *iterations += 1;
        }
        false
    }

    /// How far `p` still lies outside the triangle, in side units.
    fn outside_distance(&self, p: Point) -> f64 {
        self.triangle
            .mirrors
            .iter()
            .map(|m| (-m.signed_side(p)).max(0.0))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point;

    fn folder(tri: &FundamentalTriangle) -> Folder<'_> {
        Folder::new(tri, 4000, Tolerance::MIRROR_SIDE)
    }

    fn inside(tri: &FundamentalTriangle, p: Point) -> bool {
        tri.mirrors.iter().all(|m| !m.is_outside(p, Tolerance::MIRROR_SIDE))
    }

    #[test]
    fn origin_of_heptagonal_tiling_is_fixed() {
        let tri = FundamentalTriangle::new(7, 3).expect("valid");
        let fold = folder(&tri).fold(point(0.0, 0.0)).expect("converges");
        assert_eq!(fold.flips, [0, 0, 0]);
        assert!(fold.point.norm() < 1e-15);
    }

    #[test]
    fn folded_points_land_inside() {
        let tri = FundamentalTriangle::new(5, 4).expect("valid");
        for k in 0..40 {
            let t = f64::from(k) * 0.37;
            let r = 0.9 * (t * 0.21).sin().abs();
            let p = point(r * t.cos(), r * t.sin());
            let fold = folder(&tri).fold(p).expect("converges");
            assert!(inside(&tri, fold.point), "{p}");
        }
    }

    #[test]
    fn folding_is_idempotent() {
        let tri = FundamentalTriangle::new(4, 4).expect("valid");
        let once = folder(&tri).fold(point(3.7, -2.2)).expect("converges");
        let twice = folder(&tri).fold(once.point).expect("converges");
        assert_eq!(twice.flips, [0, 0, 0]);
        assert!((twice.point - once.point).norm() < 1e-15);
    }

    #[test]
    fn point_on_edge_mirror_does_not_flip() {
        let tri = FundamentalTriangle::new(7, 3).expect("valid");
        let [vertex, mid, _] = tri.verts;
        let on_edge = project_onto_edge(&tri, (vertex + mid) / 2.0);
        assert!(tri.mirrors[2].signed_side(on_edge).abs() < 1e-13);
        let fold = folder(&tri).fold(on_edge).expect("converges");
        assert_eq!(fold.flips, [0, 0, 0]);
        assert_eq!(fold.point, on_edge);
    }

    /// Slides a point along its ray from the origin onto mirror 2, ending on
    /// the outer side by rounding.
    fn project_onto_edge(tri: &FundamentalTriangle, p: Point) -> Point {
        let (mut lo, mut hi) = (0.0, 1.0 / p.norm());
        for _ in 0..200 {
            let mid = (lo + hi) / 2.0;
            if tri.mirrors[2].signed_side(p * mid) > 0.0 { lo = mid } else { hi = mid }
        }
        p * hi
    }

    #[test]
    fn mirror_order_does_not_change_result() {
        let tri = FundamentalTriangle::new(6, 3).expect("valid");
        let p = point(2.3, 1.9);
        let base = folder(&tri).fold(p).expect("converges");
        for order in [[1, 0, 2], [1, 2, 0], [2, 0, 1], [0, 2, 1]] {
            let other = folder(&tri).with_order(order).fold(p).expect("converges");
            assert!((other.point - base.point).norm() < 1e-9, "{order:?}");
            assert_eq!(other.parity_even(), base.parity_even(), "{order:?}");
        }
    }

    #[test]
    fn iteration_cap_reports_best_point() {
        let tri = FundamentalTriangle::new(7, 3).expect("valid");
        let err = Folder::new(&tri, 3, Tolerance::MIRROR_SIDE)
            .fold(point(0.999_999, 0.0003))
            .expect_err("cap too small");
        assert_eq!(err.iterations, 3);
        assert!(err.residual > 0.0);
    }
}
