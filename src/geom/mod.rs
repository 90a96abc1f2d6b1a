//! Geometry kernel shared by the three constant-curvature geometries.

mod core;
mod lift;
mod metric;
mod mirror;
mod mobius;

pub use core::{Geometry, Point, Tolerance, Vec3, ccw_angle, is_finite_point, point, unit_direction};
pub use lift::{centroid, geodesic_dual, lift, project, signed_distance};
pub use metric::{conformal_radius, distance, distance_from_origin, metric_circle};
pub use mirror::{MirrorShape, OrientedMirror};
pub use mobius::Mobius;
