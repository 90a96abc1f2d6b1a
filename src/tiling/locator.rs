//! Search for the generating vertex of a uniform tiling.
//!
//! The vertex is parametrised by barycentric weights over the fundamental
//! triangle. Weights are combined in a chart where geodesics are straight
//! (Klein disk, sphere lifts, the plane), so every candidate stays inside the
//! triangle. Inactive mirrors get weight zero, which pins the candidate onto
//! them.

use super::NonConvergence;
use super::mirrors::FundamentalTriangle;
use super::spec::Tolerances;
use crate::geom::{Geometry, Point, Vec3, distance, lift, project};
use crate::models::hyperbolic::{klein_to_poincare, poincare_to_klein};

/// Rotations whose displacements a snub vertex equalises: about the tile
/// centre, about the tile vertex and about the edge midpoint.
pub const SNUB_ROTATIONS: [[usize; 2]; 3] = [[1, 0], [2, 1], [0, 2]];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StartingPoint {
    pub point: Point,
    pub barycentric: [f64; 3],
    /// Sum of absolute deviations of the generator displacements from their mean.
    pub objective: f64,
    pub iterations: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Chart
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Chart {
    geometry: Geometry,
    corners: [Vec3; 3],
}

impl Chart {
    fn new(triangle: &FundamentalTriangle) -> Self {
        let geometry = triangle.geometry;
        let corners = triangle.verts.map(|v| match geometry {
            Geometry::Euclidean => Vec3::new(v.re, v.im, 1.0),
            Geometry::Hyperbolic => {
                let k = poincare_to_klein(v);
                Vec3::new(k.re, k.im, 1.0)
            }
            Geometry::Spherical => lift(geometry, v),
        });
        Self { geometry, corners }
    }

    fn point(&self, bary: [f64; 3]) -> Option<Point> {
        let v = self
            .corners
            .iter()
            .zip(bary)
            .fold(Vec3::ZERO, |acc, (&c, w)| acc + c.mul_scalar(w));
        match self.geometry {
            Geometry::Euclidean => Some(v.xy()),
            Geometry::Hyperbolic => {
                let k = v.xy();
                (k.norm_sqr() < 1.0).then(|| klein_to_poincare(k))
            }
            Geometry::Spherical => project(self.geometry, v),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Locator
// ─────────────────────────────────────────────────────────────────────────────

/// Coordinate-descent search with a Newton refinement.
#[derive(Debug, Clone)]
pub struct Locator<'a> {
    triangle: &'a FundamentalTriangle,
    tolerances: Tolerances,
    chart: Chart,
}

impl<'a> Locator<'a> {
    #[must_use]
    pub fn new(triangle: &'a FundamentalTriangle, tolerances: Tolerances) -> Self {
        Self { triangle, tolerances, chart: Chart::new(triangle) }
    }

    /// Point equidistant from its reflections in every `active` mirror.
    ///
    /// A single active mirror gives the opposite triangle vertex exactly.
    ///
    /// # Errors
    ///
    /// Returns the best point found when the objective stays above the
    /// threshold.
    pub fn locate(&self, active: &[usize]) -> Result<StartingPoint, NonConvergence<StartingPoint>> {
        if let [only] = active {
            let mut barycentric = [0.0; 3];
            barycentric[*only] = 1.0;
            return Ok(StartingPoint {
                point: self.triangle.verts[*only],
                barycentric,
                objective: 0.0,
                iterations: 0,
            });
        }
        let words: Vec<Vec<usize>> = active.iter().map(|&a| vec![a]).collect();
        self.search(active, &words)
    }

    /// Snub vertex: equal displacement under the three rotations.
    ///
    /// # Errors
    ///
    /// Returns the best point found when the objective stays above the
    /// threshold.
    pub fn locate_snub(&self) -> Result<StartingPoint, NonConvergence<StartingPoint>> {
        let words: Vec<Vec<usize>> = SNUB_ROTATIONS.iter().map(|w| w.to_vec()).collect();
        self.search(&[0, 1, 2], &words)
    }

    fn search(
        &self,
        coords: &[usize],
        words: &[Vec<usize>],
    ) -> Result<StartingPoint, NonConvergence<StartingPoint>> {
        let tol = &self.tolerances;
        let evaluate = |bary: [f64; 3]| self.objective(bary, words);

        let mut bary = [0.0; 3];
        for &c in coords {
            bary[c] = 1.0 / coords.len() as f64;
        }
        let mut step = tol.locator_initial_step * bary[coords[0]];
        let mut best = evaluate(bary);
        let mut iterations = 0;

        while iterations < tol.locator_max_iterations && best > tol.locator_threshold {
            for &c in coords {
                let base = bary;
                for delta in [step, -step] {
                    let mut trial = base;
                    trial[c] += delta;
                    normalize(&mut trial);
                    if trial[c] <= 0.0 || trial[c] >= 1.0 {
                        continue;
                    }
                    let value = evaluate(trial);
                    if value < best {
                        best = value;
                        bary = trial;
                    }
                }
            }
            step /= tol.locator_step_decay;
            iterations += 1;
        }

        if best > tol.locator_threshold {
            if let Some((polished, value)) = self.refine(coords, words, bary) {
                if value < best {
                    bary = polished;
                    best = value;
                }
            }
        }

        let found = StartingPoint {
            point: self.chart.point(bary).unwrap_or(self.triangle.verts[coords[0]]),
            barycentric: bary,
            objective: best,
            iterations,
        };
        if best <= tol.locator_threshold {
            Ok(found)
        } else {
            Err(NonConvergence { best: found, iterations, residual: best })
        }
    }

    fn displacements(&self, p: Point, words: &[Vec<usize>]) -> Vec<f64> {
        let g = self.triangle.geometry;
        words.iter().map(|w| distance(g, p, self.triangle.apply_word(w, p))).collect()
    }

    fn objective(&self, bary: [f64; 3], words: &[Vec<usize>]) -> f64 {
        let Some(p) = self.chart.point(bary) else {
            return f64::INFINITY;
        };
        let lengths = self.displacements(p, words);
        let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
        let total: f64 = lengths.iter().map(|d| (d - mean).abs()).sum();
        if total.is_nan() { f64::INFINITY } else { total }
    }

    /// Damped Newton on `d_i - d_0 = 0` over the free weights `coords[1..]`.
    fn refine(
        &self,
        coords: &[usize],
        words: &[Vec<usize>],
        start: [f64; 3],
    ) -> Option<([f64; 3], f64)> {
        const MAX_STEPS: usize = 50;
        const HALVINGS: usize = 30;
        const H: f64 = 1e-7;

        let free = coords.len() - 1;
        if free == 0 || free > 2 {
            return None;
        }
        let bary_of = |t: [f64; 2]| {
            let mut bary = [0.0; 3];
            for (k, &c) in coords[1..].iter().enumerate() {
                bary[c] = t[k];
            }
            bary[coords[0]] = 1.0 - t[..free].iter().sum::<f64>();
            bary
        };
        let residual = |t: [f64; 2]| -> Option<[f64; 2]> {
            let p = self.chart.point(bary_of(t))?;
            let d = self.displacements(p, words);
            let mut r = [0.0; 2];
            for k in 0..free {
                r[k] = d[k + 1] - d[0];
            }
            r.iter().all(|x| x.is_finite()).then_some(r)
        };

        let mut t = [0.0; 2];
        for (k, &c) in coords[1..].iter().enumerate() {
            t[k] = start[c];
        }
        let mut value = self.objective(bary_of(t), words);

        for _ in 0..MAX_STEPS {
            if value <= self.tolerances.locator_threshold {
                break;
            }
            let r = residual(t)?;
            let mut jacobian = [[0.0; 2]; 2];
            for col in 0..free {
                let mut shifted = t;
                shifted[col] += H;
                let rs = residual(shifted)?;
                for row in 0..free {
                    jacobian[row][col] = (rs[row] - r[row]) / H;
                }
            }
            let delta = solve(jacobian, r, free)?;

            let mut scale = 1.0;
            let mut improved = false;
            for _ in 0..HALVINGS {
                let mut trial = t;
                for k in 0..free {
                    trial[k] -= scale * delta[k];
                }
                let bary = bary_of(trial);
                if coords.iter().all(|&c| bary[c] > 0.0 && bary[c] < 1.0) {
                    let trial_value = self.objective(bary, words);
                    if trial_value < value {
                        t = trial;
                        value = trial_value;
                        improved = true;
                        break;
                    }
                }
                scale /= 2.0;
            }
            if !improved {
                break;
            }
        }
        Some((bary_of(t), value))
    }
}

fn normalize(bary: &mut [f64; 3]) {
    let sum: f64 = bary.iter().sum();
    if sum != 0.0 {
        for w in bary.iter_mut() {
            *w /= sum;
        }
    }
}

/// Solves the leading `n × n` block of `j x = r` for `n` in 1..=2.
fn solve(j: [[f64; 2]; 2], r: [f64; 2], n: usize) -> Option<[f64; 2]> {
    match n {
        1 => (j[0][0] != 0.0).then(|| [r[0] / j[0][0], 0.0]),
        _ => {
            let det = j[0][0] * j[1][1] - j[0][1] * j[1][0];
            if det == 0.0 || !det.is_finite() {
                return None;
            }
            Some([
                (r[0] * j[1][1] - j[0][1] * r[1]) / det,
                (j[0][0] * r[1] - j[1][0] * r[0]) / det,
            ])
        }
    }
}
