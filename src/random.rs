//! Random tiling specifications.

use std::f64::consts::PI;

use rand::Rng;

use crate::color::Rgba;
use crate::geom::{Mobius, point};
use crate::models::HyperbolicModel;
use crate::tiling::TilingSpec;

const HYPERBOLIC_CHOICES: [HyperbolicModel; 3] = [
    HyperbolicModel::Poincare,
    HyperbolicModel::Klein,
    HyperbolicModel::UpperHalfPlane,
];

/// Schläfli entry in `3..=19`, skewed towards small values.
fn random_order<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    let u: f64 = rng.random();
    3 + (u.powf(2.5) * 17.0).floor() as u32
}

/// A random tiling with random view, model and palette.
pub fn random_spec<R: Rng + ?Sized>(rng: &mut R) -> TilingSpec {
    let p = random_order(rng);
    let q = random_order(rng);

    let mut active: Vec<usize> = (0..3).filter(|_| rng.random_bool(0.5)).collect();
    if active.is_empty() {
        active.push(0);
    }

    let mut spec = TilingSpec::new(p, q, &active);
    let geometry = spec.geometry();

    let angle = rng.random::<f64>() * PI;
    let offset = point(rng.random::<f64>() / 2.0, rng.random::<f64>() / 2.0);
    spec.mobius = Mobius::isometry(geometry, angle, offset);
    spec.models.hyperbolic = HYPERBOLIC_CHOICES[rng.random_range(0..HYPERBOLIC_CHOICES.len())];

    spec.coloring.palette = (0..3)
        .map(|_| {
            Rgba::from_hsl(
                rng.random_range(0.0..360.0),
                rng.random_range(0.4..=0.9),
                rng.random_range(0.2..=0.9),
            )
        })
        .collect();
    spec.coloring.show_coxeter = rng.random::<f64>() * 3.0 > 0.5;
    spec
}

/// [`random_spec`] seeded from the thread-local generator.
#[must_use]
pub fn random_spec_from_entropy() -> TilingSpec {
    random_spec(&mut rand::rng())
}
