use std::f64::consts::PI;

use num_complex::Complex64;

use uniform_tiler::geom::{Geometry, Point, point};
use uniform_tiler::models::{
    EuclideanModel, HyperbolicModel, ModelContext, ModelError, ModelKind, ModelRegistry,
    canonical_to_model, canonical_to_model_in, euclidean, hyperbolic, model_to_canonical,
    model_to_canonical_in, spherical,
};

/// Polar grid with radii in `[0.1, 0.7]`, avoiding the origin where some
/// models have a pole.
fn grid() -> Vec<Point> {
    let mut points = Vec::new();
    for r in [0.1, 0.3, 0.5, 0.7] {
        for k in 0..12 {
            let angle = f64::from(k) * PI / 6.0 + 0.1;
            points.push(Complex64::from_polar(r, angle));
        }
    }
    points
}

fn assert_canonical_round_trip(model: ModelKind) {
    let g = model.geometry();
    for p in grid() {
        let v = canonical_to_model(model, g, p).expect("matching geometry");
        let back = model_to_canonical(model, g, v).expect("matching geometry");
        assert!((back - p).norm() < 1e-9, "{model}: {p} -> {v} -> {back}");
    }
}

#[test]
fn hyperbolic_models_round_trip() {
    for registration in hyperbolic::REGISTRATIONS {
        assert_canonical_round_trip(ModelKind::Hyperbolic(registration.kind));
    }
}

#[test]
fn spherical_models_round_trip() {
    for registration in spherical::REGISTRATIONS {
        assert_canonical_round_trip(ModelKind::Spherical(registration.kind));
    }
}

#[test]
fn euclidean_models_round_trip() {
    let periodic = [EuclideanModel::Conformal, EuclideanModel::Spiral, EuclideanModel::Loxodromic];
    for registration in euclidean::REGISTRATIONS {
        let model = ModelKind::Euclidean(registration.kind);
        if !periodic.contains(&registration.kind) {
            assert_canonical_round_trip(model);
            continue;
        }
        // Periodic models are many-to-one, so only the model side round-trips.
        for v in grid() {
            let p = model_to_canonical(model, Geometry::Euclidean, v).expect("matching geometry");
            let back =
                canonical_to_model(model, Geometry::Euclidean, p).expect("matching geometry");
            assert!((back - v).norm() < 1e-9, "{model}: {v} -> {p} -> {back}");
        }
    }
}

#[test]
fn conformal_model_wraps_with_the_supplied_lattice() {
    let model = ModelKind::Euclidean(EuclideanModel::Conformal);
    let period = point(0.5, 0.2);
    let ctx = ModelContext::default().with_lattice([period, period * point(0.0, 1.0)]);
    let p = point(0.11, 0.04);
    let v = canonical_to_model_in(&ctx, model, Geometry::Euclidean, p).expect("euclidean");
    let shifted =
        canonical_to_model_in(&ctx, model, Geometry::Euclidean, p + period).expect("euclidean");
    assert!((shifted - v).norm() < 1e-9);
    // The default lattice has a different period.
    let unit = canonical_to_model(model, Geometry::Euclidean, p + period).expect("euclidean");
    assert!((unit - v).norm() > 1e-3);
    let back = model_to_canonical_in(&ctx, model, Geometry::Euclidean, v).expect("euclidean");
    let again = canonical_to_model_in(&ctx, model, Geometry::Euclidean, back).expect("euclidean");
    assert!((again - v).norm() < 1e-9);
}

#[test]
fn klein_and_poincare_agree_at_half() {
    let klein = ModelKind::Hyperbolic(HyperbolicModel::Klein);
    let disk = model_to_canonical(klein, Geometry::Hyperbolic, point(0.5, 0.0)).expect("klein");
    let expected = 0.5 / (1.0 + 0.75_f64.sqrt());
    assert!((disk.re - expected).abs() < 1e-12);
    assert!(disk.im.abs() < 1e-15);
}

#[test]
fn model_of_another_geometry_is_refused() {
    let klein = ModelKind::Hyperbolic(HyperbolicModel::Klein);
    let err =
        canonical_to_model(klein, Geometry::Euclidean, point(0.2, 0.1)).expect_err("mismatch");
    assert_eq!(err, ModelError::GeometryMismatch { model: klein, geometry: Geometry::Euclidean });
    assert!(err.to_string().contains("cannot display"));
}

#[test]
fn registry_resolves_aliases_and_rejects_unknown_names() {
    let registry = ModelRegistry::default();
    assert_eq!(
        registry.resolve(Geometry::Hyperbolic, "Beltrami-Klein").expect("alias"),
        ModelKind::Hyperbolic(HyperbolicModel::Klein)
    );
    assert_eq!(
        registry.resolve(Geometry::Euclidean, "disk").expect("euclidean disk"),
        ModelKind::Euclidean(EuclideanModel::Disk)
    );
    let err = registry.resolve(Geometry::Hyperbolic, "mercator").expect_err("spherical only");
    assert!(matches!(err, ModelError::UnknownModel { geometry: Geometry::Hyperbolic, .. }));
}
