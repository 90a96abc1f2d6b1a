//! RGBA colours, HSL conversion and colour averaging.

mod policy;

pub use policy::{ColoringPolicy, ColoringOptions, default_palette};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Painted where folding does not converge.
    pub const NEUTRAL_GRAY: Self = Self::rgb(128, 128, 128);
    pub const EDGE_DARK: Self = Self::rgb(0x2a, 0x31, 0x32);
    pub const PAPER: Self = Self::rgb(0xF1, 0xF1, 0xF2);
    pub const PAPER_SHADE: Self = Self::rgb(0xBC, 0xBA, 0xBE);
    pub const MIX_RED: Self = Self::rgb(0xCF, 0x37, 0x21);
    pub const MIX_GREEN: Self = Self::rgb(0x25, 0x80, 0x39);
    pub const MIX_BLUE: Self = Self::rgb(0x37, 0x5E, 0x97);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[must_use]
    pub const fn inverse(self) -> Self {
        Self::rgb(255 - self.r, 255 - self.g, 255 - self.b)
    }

    #[must_use]
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Weighted blend of the three barycentric mix colours.
    #[must_use]
    pub fn mix(weights: [f64; 3]) -> Self {
        let palette = [Self::MIX_RED, Self::MIX_GREEN, Self::MIX_BLUE];
        let channel = |f: fn(Self) -> u8| {
            let value: f64 = palette.iter().zip(weights).map(|(c, w)| w * f64::from(f(*c))).sum();
            to_channel(value)
        };
        Self::rgb(channel(|c| c.r), channel(|c| c.g), channel(|c| c.b))
    }

    /// Hue in degrees, saturation and lightness in `[0, 1]`.
    #[must_use]
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let h = hue.rem_euclid(360.0) / 360.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);
        if s == 0.0 {
            let v = to_channel(l * 255.0);
            return Self::rgb(v, v, v);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let component = |t: f64| {
            let t = t.rem_euclid(1.0);
            let value = if t < 1.0 / 6.0 {
                p + (q - p) * 6.0 * t
            } else if t < 0.5 {
                q
            } else if t < 2.0 / 3.0 {
                p + (q - p) * (2.0 / 3.0 - t) * 6.0
            } else {
                p
            };
            to_channel(value * 255.0)
        };
        Self::rgb(component(h + 1.0 / 3.0), component(h), component(h - 1.0 / 3.0))
    }

    /// `(hue°, saturation, lightness)`.
    #[must_use]
    pub fn to_hsl(self) -> (f64, f64, f64) {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        if (max - min).abs() < f64::EPSILON {
            return (0.0, 0.0, l);
        }
        let d = max - min;
        let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
        let h = if (max - r).abs() < f64::EPSILON {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if (max - g).abs() < f64::EPSILON {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h * 60.0, s, l)
    }

    #[must_use]
    pub fn with_lightness(self, lightness: f64) -> Self {
        let (h, s, _) = self.to_hsl();
        Self { a: self.a, ..Self::from_hsl(h, s, lightness) }
    }
}

fn to_channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Per-channel arithmetic mean.
#[must_use]
pub fn average(colors: &[Rgba]) -> Rgba {
    blend(colors, |v| v, |v| v)
}

/// Per-channel root mean square, which keeps mixed edges from looking muddy.
#[must_use]
pub fn average_square(colors: &[Rgba]) -> Rgba {
    blend(colors, |v| v * v, f64::sqrt)
}

fn blend(colors: &[Rgba], lift: impl Fn(f64) -> f64, unlift: impl Fn(f64) -> f64) -> Rgba {
    if colors.is_empty() {
        return Rgba::NEUTRAL_GRAY;
    }
    let n = colors.len() as f64;
    let channel = |f: fn(&Rgba) -> u8| {
        let mean = colors.iter().map(|c| lift(f64::from(f(c)))).sum::<f64>() / n;
        // Truncation matches integer pixel averaging.
        unlift(mean).clamp(0.0, 255.0) as u8
    };
    Rgba {
        r: channel(|c| c.r),
        g: channel(|c| c.g),
        b: channel(|c| c.b),
        a: channel(|c| c.a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsl_round_trip_within_rounding() {
        let c = Rgba::rgb(72, 209, 204);
        let (h, s, l) = c.to_hsl();
        let back = Rgba::from_hsl(h, s, l);
        assert!((i32::from(back.r) - 72).abs() <= 1);
        assert!((i32::from(back.g) - 209).abs() <= 1);
        assert!((i32::from(back.b) - 204).abs() <= 1);
    }

    #[test]
    fn mix_of_unit_weight_is_palette_colour() {
        assert_eq!(Rgba::mix([1.0, 0.0, 0.0]), Rgba::MIX_RED);
        assert_eq!(Rgba::mix([0.0, 0.0, 1.0]), Rgba::MIX_BLUE);
    }

    #[test]
    fn square_average_is_brighter_than_mean() {
        let colors = [Rgba::BLACK, Rgba::WHITE];
        assert_eq!(average(&colors).r, 127);
        assert_eq!(average_square(&colors).r, 180);
    }

    #[test]
    fn inverse_is_involution() {
        let c = Rgba::rgb(10, 200, 99);
        assert_eq!(c.inverse().inverse(), c);
    }
}
