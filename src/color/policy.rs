use serde::{Deserialize, Serialize};

use super::{Rgba, average_square};
use crate::tiling::SampleInfo;

/// How a classified sample becomes a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColoringPolicy {
    /// Palette colour per face class, dark edges.
    #[default]
    Faces,
    /// Barycentric mix colour on edges over a plain background.
    Edges,
    /// Face colour darkened continuously towards the nearest edge.
    Intensity,
    /// Two-colour checkerboard of fundamental triangles by reflection parity.
    Domains,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColoringOptions {
    pub policy: ColoringPolicy,
    pub palette: Vec<Rgba>,
    /// Shade alternate fundamental triangles.
    pub show_coxeter: bool,
    /// Overlay every mirror geodesic.
    pub show_mirrors: bool,
    /// Distance scale of the intensity falloff.
    pub intensity_falloff: f64,
}

impl Default for ColoringOptions {
    fn default() -> Self {
        Self {
            policy: ColoringPolicy::Faces,
            palette: default_palette(),
            show_coxeter: false,
            show_mirrors: false,
            intensity_falloff: 0.05,
        }
    }
}

#[must_use]
pub fn default_palette() -> Vec<Rgba> {
    vec![Rgba::rgb(72, 209, 204), Rgba::rgb(123, 104, 238), Rgba::rgb(60, 179, 113)]
}

impl ColoringOptions {
    fn palette_color(&self, index: usize) -> Rgba {
        if self.palette.is_empty() {
            return Rgba::NEUTRAL_GRAY;
        }
        self.palette[index % self.palette.len()]
    }

    /// Colour of a sample that folded successfully.
    #[must_use]
    pub fn shade(&self, info: &SampleInfo, edge_color: Rgba) -> Rgba {
        self.shade_as(self.policy, info, edge_color)
    }

    /// Same as [`shade`](Self::shade) with another policy.
    #[must_use]
    pub fn shade_as(&self, policy: ColoringPolicy, info: &SampleInfo, edge_color: Rgba) -> Rgba {
        let on_edge = info.near_edge || info.near_vertex;
        let base = match policy {
            ColoringPolicy::Faces => {
                let mut colors = Vec::with_capacity(4);
                if on_edge {
                    colors.extend([Rgba::EDGE_DARK, Rgba::EDGE_DARK]);
                }
                colors.push(self.palette_color(info.face));
                if self.show_coxeter && !on_edge && info.parity_even() {
                    colors.push(Rgba::WHITE);
                }
                average_square(&colors)
            }
            ColoringPolicy::Edges => {
                if on_edge {
                    edge_color
                } else if self.show_coxeter && !info.parity_even() {
                    Rgba::PAPER_SHADE
                } else {
                    Rgba::PAPER
                }
            }
            ColoringPolicy::Intensity => {
                let face = self.palette_color(info.face);
                let (_, _, lightness) = face.to_hsl();
                let d = info.edge_distance.max(0.0);
                let falloff = self.intensity_falloff.max(f64::EPSILON);
                face.with_lightness(lightness * (1.0 - (-d / falloff).exp()))
            }
            ColoringPolicy::Domains => {
                let index = usize::from(!info.parity_even());
                if on_edge { Rgba::EDGE_DARK } else { self.palette_color(index) }
            }
        };
        if self.show_mirrors && info.near_mirror {
            average_square(&[base, Rgba::EDGE_DARK])
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::point;

    fn sample(face: usize, flips: [u32; 3], near_edge: bool) -> SampleInfo {
        SampleInfo {
            folded: point(0.1, 0.05),
            flips,
            face,
            near_edge,
            near_vertex: false,
            near_mirror: false,
            edge_distance: if near_edge { 0.0 } else { 1.0 },
        }
    }

    #[test]
    fn faces_use_palette_by_index() {
        let options = ColoringOptions::default();
        let c = options.shade(&sample(1, [0, 0, 0], false), Rgba::BLACK);
        assert_eq!(c, average_square(&[Rgba::rgb(123, 104, 238)]));
    }

    #[test]
    fn faces_darken_edges() {
        let options = ColoringOptions::default();
        let face = options.shade(&sample(0, [0, 0, 0], false), Rgba::BLACK);
        let edge = options.shade(&sample(0, [0, 0, 0], true), Rgba::BLACK);
        assert!(u32::from(edge.r) + u32::from(edge.g) < u32::from(face.r) + u32::from(face.g));
    }

    #[test]
    fn edges_policy_shades_odd_domains_when_requested() {
        let options = ColoringOptions {
            policy: ColoringPolicy::Edges,
            show_coxeter: true,
            ..ColoringOptions::default()
        };
        assert_eq!(options.shade(&sample(0, [1, 0, 0], false), Rgba::BLACK), Rgba::PAPER_SHADE);
        assert_eq!(options.shade(&sample(0, [1, 1, 0], false), Rgba::BLACK), Rgba::PAPER);
        assert_eq!(options.shade(&sample(0, [1, 1, 0], true), Rgba::MIX_RED), Rgba::MIX_RED);
    }

    #[test]
    fn intensity_is_dark_on_edges() {
        let options = ColoringOptions {
            policy: ColoringPolicy::Intensity,
            ..ColoringOptions::default()
        };
        let c = options.shade(&sample(0, [0, 0, 0], true), Rgba::BLACK);
        assert_eq!((c.r, c.g, c.b), (0, 0, 0));
    }

    #[test]
    fn domains_alternate_by_parity() {
        let options = ColoringOptions {
            policy: ColoringPolicy::Domains,
            ..ColoringOptions::default()
        };
        let even = options.shade(&sample(0, [0, 2, 0], false), Rgba::BLACK);
        let odd = options.shade(&sample(0, [0, 0, 1], false), Rgba::BLACK);
        assert_ne!(even, odd);
    }
}
