//! The generating vertex and the edge set every folded sample is tested against.

use super::locator::{SNUB_ROTATIONS, StartingPoint};
use super::mirrors::FundamentalTriangle;
use crate::color::Rgba;
use crate::geom::{
    Geometry, Mobius, Point, Tolerance, Vec3, ccw_angle, distance, geodesic_dual, metric_circle,
    signed_distance,
};

/// Metric widths used by the proximity tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Widths {
    pub edge: f64,
    pub vertex: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Edges
// ─────────────────────────────────────────────────────────────────────────────

/// A geodesic segment with its precomputed local frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub start: Point,
    pub end: Point,
    /// Moves `start` to the origin.
    to_origin: Mobius,
    /// Moves `start` to the origin and `end` onto the positive real axis.
    frame: Mobius,
    /// Same with the roles of the endpoints swapped.
    reverse_frame: Mobius,
    end_angle: f64,
    dual: Option<Vec3>,
}

impl Edge {
    #[must_use]
    pub fn new(geometry: Geometry, start: Point, end: Point) -> Self {
        let to_origin = Mobius::isometry(geometry, 0.0, -start);
        let end_angle = ccw_angle(to_origin.apply(end));
        Self {
            start,
            end,
            to_origin,
            frame: Mobius::rotation(-end_angle) * to_origin,
            reverse_frame: Mobius::geodesic_frame(geometry, end, start),
            end_angle,
            dual: geodesic_dual(geometry, start, end),
        }
    }

    /// Direction of `end` seen from `start`, in `[0, 2π)`.
    #[must_use]
    pub const fn end_angle(&self) -> f64 {
        self.end_angle
    }

    /// Direction of `p` seen from `start`, in `[0, 2π)`.
    #[must_use]
    pub fn angle_of(&self, p: Point) -> f64 {
        ccw_angle(self.to_origin.apply(p))
    }

    /// Whether `p` lies within `width` of the segment.
    ///
    /// In the edge frame the segment runs along the positive real axis from
    /// the origin, and the metric circle of radius `width` around `p` is a
    /// Euclidean circle that crosses that axis exactly when `p` is close.
    #[must_use]
    pub fn is_near(&self, geometry: Geometry, p: Point, width: f64) -> bool {
        let local = self.frame.apply(p);
        if local.re < 0.0 || self.reverse_frame.apply(p).re < 0.0 {
            return false;
        }
        let (center, radius) = metric_circle(geometry, local, width);
        radius > center.im.abs()
    }

    /// Metric distance from `p` to the segment.
    #[must_use]
    pub fn distance(&self, geometry: Geometry, p: Point) -> f64 {
        if self.frame.apply(p).re < 0.0 {
            return distance(geometry, p, self.start);
        }
        if self.reverse_frame.apply(p).re < 0.0 {
            return distance(geometry, p, self.end);
        }
        match self.dual {
            Some(dual) => signed_distance(geometry, dual, p).abs(),
            None => distance(geometry, p, self.start),
        }
    }

    fn coincides(&self, other: &Self) -> bool {
        let tol = Tolerance::COINCIDENT;
        (tol.approx_eq_point(self.start, other.start) && tol.approx_eq_point(self.end, other.end))
            || (tol.approx_eq_point(self.start, other.end)
                && tol.approx_eq_point(self.end, other.start))
    }
}

/// Proximity of a folded sample to the drawn skeleton.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proximity {
    pub near_edge: bool,
    pub near_vertex: bool,
    /// Metric distance to the closest edge.
    pub distance: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Generating element
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Faces {
    /// Sector between consecutive edges around the generating vertex.
    Sectors { order: Vec<usize>, angles: Vec<f64> },
    /// Closest active triangle vertex.
    Dual { active: Vec<usize> },
    Snub(SnubFan),
}

/// The generating vertex, its edges and the face classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratingElement {
    pub start: StartingPoint,
    pub edges: Vec<Edge>,
    pub vertices: Vec<Point>,
    pub edge_color: Rgba,
    faces: Faces,
}

impl GeneratingElement {
    /// Edges from the generating vertex to its mirror images.
    #[must_use]
    pub fn uniform(triangle: &FundamentalTriangle, active: &[usize], start: StartingPoint) -> Self {
        let g = triangle.geometry;
        let s = start.point;
        let edges: Vec<Edge> =
            active.iter().map(|&a| Edge::new(g, s, triangle.reflect(a, s))).collect();

        let mut order: Vec<usize> = (0..edges.len()).collect();
        order.sort_by(|&i, &j| edges[i].end_angle().total_cmp(&edges[j].end_angle()));
        let angles = order.iter().map(|&i| edges[i].end_angle()).collect();

        Self {
            start,
            edges,
            vertices: vec![s],
            edge_color: Rgba::mix(start.barycentric),
            faces: Faces::Sectors { order, angles },
        }
    }

    /// Mirror segments between the triangle vertices of each active mirror.
    #[must_use]
    pub fn dual(triangle: &FundamentalTriangle, active: &[usize], start: StartingPoint) -> Self {
        let g = triangle.geometry;
        let edges: Vec<Edge> = active
            .iter()
            .map(|&a| {
                let [from, to] = FundamentalTriangle::other_verts(a);
                Edge::new(g, triangle.verts[from], triangle.verts[to])
            })
            .collect();
        let vertices = dedup_points(edges.iter().map(|e| e.start));
        Self {
            start,
            edges,
            vertices,
            edge_color: Rgba::mix(start.barycentric).inverse(),
            faces: Faces::Dual { active: active.to_vec() },
        }
    }

    /// Snub edges around the doubled domain `T ∪ R0(T)`.
    #[must_use]
    pub fn snub(triangle: &FundamentalTriangle, start: StartingPoint) -> Self {
        let fan = SnubFan::new(triangle, start.point);
        let g = triangle.geometry;
        let mut edges: Vec<Edge> = Vec::new();
        for (vertex, word) in &fan.vertices {
            for neighbor in &fan.neighbors {
                let candidate = Edge::new(g, *vertex, triangle.apply_word(word, *neighbor));
                if !edges.iter().any(|e| e.coincides(&candidate)) {
                    edges.push(candidate);
                }
            }
        }
        let vertices = fan.vertices.iter().map(|(v, _)| *v).collect();
        Self {
            start,
            edges,
            vertices,
            edge_color: Rgba::mix(start.barycentric),
            faces: Faces::Snub(fan),
        }
    }

    #[must_use]
    pub const fn is_snub(&self) -> bool {
        matches!(self.faces, Faces::Snub(_))
    }

    #[must_use]
    pub fn proximity(&self, geometry: Geometry, p: Point, widths: Widths) -> Proximity {
        let near_vertex = self.vertices.iter().any(|&v| distance(geometry, p, v) < widths.vertex);
        let near_edge = self.edges.iter().any(|e| e.is_near(geometry, p, widths.edge));
        let distance = self
            .edges
            .iter()
            .map(|e| e.distance(geometry, p))
            .fold(f64::INFINITY, f64::min);
        Proximity { near_edge, near_vertex, distance }
    }

    /// Face class of a folded point.
    #[must_use]
    pub fn face_index(&self, triangle: &FundamentalTriangle, p: Point) -> usize {
        match &self.faces {
            Faces::Sectors { order, angles } => {
                let Some(first) = self.edges.first() else {
                    return 0;
                };
                let angle = first.angle_of(p);
                let pos = angles.partition_point(|&a| a <= angle);
                order.get(pos).or(order.first()).copied().unwrap_or(0)
            }
            Faces::Dual { active } => closest_vertex_index(triangle, active, p),
            Faces::Snub(fan) => fan.classify(triangle, p),
        }
    }
}

/// Index of the active triangle vertex closest to `p`.
#[must_use]
pub fn closest_vertex_index(triangle: &FundamentalTriangle, active: &[usize], p: Point) -> usize {
    let g = triangle.geometry;
    active
        .iter()
        .map(|&i| (i, distance(g, p, triangle.verts[i])))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(0, |(i, _)| i)
}

fn dedup_points(points: impl Iterator<Item = Point>) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::new();
    for p in points {
        if !out.iter().any(|&q| Tolerance::COINCIDENT.approx_eq_point(p, q)) {
            out.push(p);
        }
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Snub fan
// ─────────────────────────────────────────────────────────────────────────────

/// Face classes around a snub vertex.
const SNUB_TILE: usize = 0;
const SNUB_VERTEX_FIGURE: usize = 1;
const SNUB_TRIANGLE: usize = 2;

/// Snub vertices around the doubled domain with the rotation words that
/// produce them from the generating vertex.
#[derive(Debug, Clone, PartialEq)]
struct SnubFan {
    vertices: Vec<(Point, Vec<usize>)>,
    /// Images of the generating vertex under the five edge rotations.
    neighbors: Vec<Point>,
    /// Moves the generating vertex to the origin.
    to_origin: Mobius,
    /// Neighbour directions sorted by angle, with the rotation class of each.
    directions: Vec<(f64, usize)>,
}

impl SnubFan {
    fn new(triangle: &FundamentalTriangle, s: Point) -> Self {
        let [about_center, about_vertex, about_mid] = SNUB_ROTATIONS;
        let inverse = |w: [usize; 2]| [w[1], w[0]];
        let rotations: [(Vec<usize>, usize); 5] = [
            (about_center.to_vec(), SNUB_TILE),
            (inverse(about_center).to_vec(), SNUB_TILE),
            (about_vertex.to_vec(), SNUB_VERTEX_FIGURE),
            (inverse(about_vertex).to_vec(), SNUB_VERTEX_FIGURE),
            (about_mid.to_vec(), SNUB_TRIANGLE),
        ];
        let neighbors: Vec<Point> =
            rotations.iter().map(|(w, _)| triangle.apply_word(w, s)).collect();

        let to_origin = Mobius::isometry(triangle.geometry, 0.0, -s);
        let mut directions: Vec<(f64, usize)> = neighbors
            .iter()
            .zip(&rotations)
            .map(|(&n, (_, class))| (ccw_angle(to_origin.apply(n)), *class))
            .collect();
        directions.sort_by(|a, b| a.0.total_cmp(&b.0));

        let vertices = fan_words(triangle.p, triangle.q)
            .into_iter()
            .map(|w| (triangle.apply_word(&w, s), w))
            .collect();
        Self { vertices, neighbors, to_origin, directions }
    }

    /// Maps `p` back next to the generating vertex through its nearest fan
    /// vertex and reads the face class off the sector it falls in.
    fn classify(&self, triangle: &FundamentalTriangle, p: Point) -> usize {
        let g = triangle.geometry;
        let Some((_, word)) = self
            .vertices
            .iter()
            .min_by(|a, b| distance(g, p, a.0).total_cmp(&distance(g, p, b.0)))
        else {
            return SNUB_TRIANGLE;
        };
        let reversed: Vec<usize> = word.iter().rev().copied().collect();
        let local = self.to_origin.apply(triangle.apply_word(&reversed, p));
        let angle = ccw_angle(local);

        let n = self.directions.len();
        let pos = self.directions.partition_point(|&(a, _)| a <= angle);
        let before = self.directions[(pos + n - 1) % n].1;
        let after = self.directions[pos % n].1;
        if before == after { before } else { SNUB_TRIANGLE }
    }
}

/// Rotation words reaching every snub vertex adjacent to `T ∪ R0(T)`: turns
/// about the tile centre, the tile vertex, its mirror image and the edge
/// midpoint.
fn fan_words(p: u32, q: u32) -> Vec<Vec<usize>> {
    let [about_center, about_vertex, about_mid] = SNUB_ROTATIONS;
    let power = |w: [usize; 2], k: u32| -> Vec<usize> { (0..k).flat_map(|_| w).collect() };

    let mut words: Vec<Vec<usize>> = (0..p).map(|k| power(about_center, k)).collect();
    for k in 1..q {
        words.push(power(about_vertex, k));
        let mut conjugated = vec![0];
        conjugated.extend(power(about_vertex, k));
        conjugated.push(0);
        words.push(conjugated);
    }
    words.push(about_mid.to_vec());
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point;
    use crate::tiling::locator::Locator;
    use crate::tiling::spec::Tolerances;

    fn start(tri: &FundamentalTriangle, active: &[usize]) -> StartingPoint {
        Locator::new(tri, Tolerances::default()).locate(active).unwrap_or_else(|e| e.best)
    }

    const WIDTHS: Widths = Widths { edge: 0.025, vertex: 0.025 };

    #[test]
    fn edge_midpoint_is_near_and_far_point_is_not() {
        let tri = FundamentalTriangle::new(7, 3).expect("valid");
        let g = tri.geometry;
        let edge = Edge::new(g, tri.verts[0], tri.reflect(0, tri.verts[0]));
        assert!(edge.is_near(g, tri.verts[1], 0.01));
        assert!(!edge.is_near(g, tri.verts[2], 0.01));
        assert!(edge.distance(g, tri.verts[1]) < 1e-12);
    }

    #[test]
    fn points_behind_the_start_are_not_on_the_edge() {
        let g = Geometry::Euclidean;
        let edge = Edge::new(g, point(0.0, 0.0), point(1.0, 0.0));
        assert!(edge.is_near(g, point(0.5, 0.01), 0.02));
        assert!(!edge.is_near(g, point(-0.1, 0.0), 0.02));
        assert!(!edge.is_near(g, point(1.1, 0.0), 0.02));
        assert!((edge.distance(g, point(0.5, 0.01)) - 0.01).abs() < 1e-12);
        assert!((edge.distance(g, point(-0.3, 0.4)) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn edge_distance_matches_metric_circle_test() {
        let tri = FundamentalTriangle::new(5, 4).expect("valid");
        let g = tri.geometry;
        let s = start(&tri, &[0, 1]);
        let edge = Edge::new(g, s.point, tri.reflect(1, s.point));
        for k in 1..20 {
            let t = f64::from(k) / 20.0;
            let p = tri.verts[2] * t + s.point * (1.0 - t);
            let d = edge.distance(g, p);
            if (d - 0.03).abs() > 1e-6 {
                assert_eq!(edge.is_near(g, p, 0.03), d < 0.03, "t = {t}, d = {d}");
            }
        }
    }

    #[test]
    fn regular_tiling_has_one_face_class() {
        let tri = FundamentalTriangle::new(6, 3).expect("valid");
        let element = GeneratingElement::uniform(&tri, &[0], start(&tri, &[0]));
        assert_eq!(element.edges.len(), 1);
        assert_eq!(element.face_index(&tri, (tri.verts[1] + tri.verts[2]) / 2.0), 0);
    }

    #[test]
    fn truncated_tiling_separates_tiles_from_vertex_figures() {
        let tri = FundamentalTriangle::new(4, 3).expect("valid");
        let element = GeneratingElement::uniform(&tri, &[0, 1], start(&tri, &[0, 1]));
        let near_center = tri.verts[2] * 0.9 + tri.verts[0] * 0.05 + tri.verts[1] * 0.05;
        let near_vertex = tri.verts[0] * 0.98 + tri.verts[1] * 0.01 + tri.verts[2] * 0.01;
        assert_ne!(element.face_index(&tri, near_center), element.face_index(&tri, near_vertex));
    }

    #[test]
    fn dual_faces_follow_closest_active_vertex() {
        let tri = FundamentalTriangle::new(7, 3).expect("valid");
        let element = GeneratingElement::dual(&tri, &[0, 2], start(&tri, &[0, 2]));
        assert_eq!(element.face_index(&tri, tri.verts[0] * 0.99), 0);
        assert_eq!(element.face_index(&tri, tri.verts[2]), 2);
        let mix = Rgba::mix(element.start.barycentric);
        assert_eq!(element.edge_color, mix.inverse());
    }

    #[test]
    fn snub_edges_are_unique_and_tile_centre_is_a_tile() {
        let tri = FundamentalTriangle::new(4, 4).expect("valid");
        let s = Locator::new(&tri, Tolerances::default()).locate_snub().unwrap_or_else(|e| e.best);
        let element = GeneratingElement::snub(&tri, s);
        for (i, a) in element.edges.iter().enumerate() {
            assert!(element.edges[i + 1..].iter().all(|b| !a.coincides(b)));
        }
        assert_eq!(element.face_index(&tri, tri.verts[2]), SNUB_TILE);
        assert_eq!(element.face_index(&tri, tri.verts[0]), SNUB_VERTEX_FIGURE);
        let prox = element.proximity(tri.geometry, s.point, WIDTHS);
        assert!(prox.near_vertex && prox.near_edge);
    }

    #[test]
    fn fan_covers_every_corner() {
        let words = fan_words(5, 4);
        assert_eq!(words.len(), 5 + 2 * 3 + 1);
        assert!(words[0].is_empty());
        assert!(words.iter().all(|w| w.len() % 2 == 0));
    }

    #[test]
    fn closest_vertex_ignores_inactive_vertices() {
        let tri = FundamentalTriangle::new(5, 3).expect("valid");
        assert_eq!(closest_vertex_index(&tri, &[1, 2], tri.verts[0]), 1);
    }
}
