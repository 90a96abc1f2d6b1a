//! Schwarz–Christoffel maps between the unit disk and regular polygons.
//!
//! `f(z) = Σ a_n z^(1 + K n)` with `a_n = binom(n - 1 + 2/K, n) / (1 + n K)`
//! is the integral of `(1 - z^K)^(-2/K)`; it takes the disk onto a regular
//! K-gon whose vertices sit at the K-th roots of `C = f(1)`.

use std::f64::consts::{FRAC_PI_4, PI, SQRT_2};

use num_complex::Complex64;

use crate::geom::{MirrorShape, Point, point};

const MAX_TERMS: usize = 20_000;
const MAX_NEWTON_STEPS: usize = 60;
const LANCZOS: [f64; 8] = [
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Gamma function via the Lanczos approximation (g = 7), using the
/// reflection formula below one half.
#[must_use]
pub fn gamma(z: f64) -> f64 {
    if z < 0.5 {
        return PI / ((PI * z).sin() * gamma(1.0 - z));
    }
    let z = z - 1.0;
    let x = LANCZOS
        .iter()
        .enumerate()
        .fold(0.999_999_999_999_809_9, |acc, (i, p)| acc + p / (z + i as f64 + 1.0));
    let t = z + 7.5;
    (2.0 * PI).sqrt() * t.powf(z + 0.5) * (-t).exp() * x
}

#[must_use]
pub fn beta(a: f64, b: f64) -> f64 {
    gamma(a) * gamma(b) / gamma(a + b)
}

/// Generalized binomial coefficient `binom(a, n)`.
#[must_use]
pub fn binomial(a: f64, n: usize) -> f64 {
    (1..=n).rev().fold((1.0, a), |(s, a), i| (s * a / i as f64, a - 1.0)).0
}

/// Disk to regular polygon map for a fixed side count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchwarzChristoffel {
    sides: u32,
    /// `f(1)`, the circumradius of the unscaled polygon.
    scale: f64,
}

impl SchwarzChristoffel {
    #[must_use]
    pub fn new(sides: u32) -> Self {
        let sides = sides.max(3);
        let k = f64::from(sides);
        let scale = beta(1.0 / k, 1.0 - 2.0 / k) / k;
        Self { sides, scale }
    }

    #[must_use]
    pub const fn sides(&self) -> u32 {
        self.sides
    }

    #[must_use]
    pub const fn scale(&self) -> f64 {
        self.scale
    }

    /// The unscaled series `f(z)`.
    #[must_use]
    pub fn series(&self, z: Complex64) -> Complex64 {
        let k = f64::from(self.sides);
        let zk = z.powu(self.sides);
        let mut power = z;
        let mut binom = 1.0;
        let mut sum = Complex64::new(0.0, 0.0);
        for n in 0..MAX_TERMS {
            if n > 0 {
                binom *= (n as f64 - 1.0 + 2.0 / k) / n as f64;
            }
            let term = power * (binom / (1.0 + n as f64 * k));
            sum += term;
            if n > 0 && term.norm() <= 1e-17 * sum.norm().max(1e-300) {
                break;
            }
            power *= zk;
        }
        sum
    }

    /// `f'(z) = (1 - z^K)^(-2/K)`.
    #[must_use]
    pub fn derivative(&self, z: Complex64) -> Complex64 {
        let k = f64::from(self.sides);
        (Complex64::new(1.0, 0.0) - z.powu(self.sides)).powf(-2.0 / k)
    }

    /// Disk point to the polygon with circumradius one.
    #[must_use]
    pub fn disk_to_polygon(&self, z: Point) -> Point {
        self.series(z) / self.scale
    }

    /// Polygon point back to the disk: a closed-form series estimate
    /// refined by Newton's method on `f`.
    #[must_use]
    pub fn polygon_to_disk(&self, w: Point) -> Point {
        let target = w * self.scale;
        let mut z = clamp_to_disk(self.inverse_estimate(w));
        for _ in 0..MAX_NEWTON_STEPS {
            let step = (self.series(z) - target) / self.derivative(z);
            if !step.re.is_finite() || !step.im.is_finite() {
                break;
            }
            z = clamp_to_disk(z - step);
            if step.norm() <= 1e-14 {
                break;
            }
        }
        z
    }

    /// Fifth-order series inverse of `f`, accurate near the polygon centre.
    fn inverse_estimate(&self, w: Point) -> Point {
        let k = f64::from(self.sides);
        let cn: Vec<f64> = (0..=5)
            .map(|n| {
                if n == 0 {
                    0.0
                } else {
                    binomial(n as f64 - 1.0 + 2.0 / k, n) / (1.0 + n as f64 * k)
                }
            })
            .collect();
        let z = w * self.scale;
        let h = z.powf(k);
        let t1 = -cn[1];
        let t2 = -cn[2] + (k + 1.0) * cn[1].powi(2);
        let t3 = -cn[3] + (3.0 * k + 2.0) * (cn[1] * cn[2] - (k + 1.0) / 2.0 * cn[1].powi(3));
        let t4 = -cn[4]
            + (2.0 * k + 1.0)
                * (2.0 * cn[1] * cn[3] + cn[2].powi(2)
                    - (4.0 * k + 3.0) * (cn[1].powi(2) * cn[2] - (k + 1.0) / 3.0 * cn[1].powi(4)));
        let t5 = -cn[5]
            + (5.0 * k + 2.0)
                * (cn[1] * cn[4]
                    + cn[2] * cn[3]
                    + (5.0 * k + 3.0)
                        * (-0.5 * cn[1].powi(2) * cn[3] - 0.5 * cn[1] * cn[2].powi(2)
                            + (5.0 * k + 4.0)
                                * (cn[1].powi(3) * cn[2] / 6.0
                                    - (k + 1.0) * cn[1].powi(5) / 24.0)));
        let one = Complex64::new(1.0, 0.0);
        let x = one + h / self.scale.powf(k);
        z * (one + t1 * h + t2 * h.powu(2) + t3 * h.powu(3) + t4 * h.powu(4) + t5 * h.powu(5) / x)
    }

    /// Polygon boundary measure: 1 on the edges, below 1 inside.
    #[must_use]
    pub fn polygon_measure(&self, w: Point) -> f64 {
        let k = f64::from(self.sides);
        let apothem = (PI / k).cos();
        (0..self.sides)
            .map(|i| {
                let phi = (2.0 * f64::from(i) + 1.0) * PI / k;
                (w.re * phi.cos() + w.im * phi.sin()) / apothem
            })
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Vertex `i` of the circumradius-one polygon.
    #[must_use]
    pub fn vertex(&self, i: u32) -> Point {
        Complex64::from_polar(1.0, 2.0 * PI * f64::from(i % self.sides) / f64::from(self.sides))
    }
}

fn clamp_to_disk(z: Point) -> Point {
    const LIMIT: f64 = 1.0 - 1e-12;
    let r = z.norm();
    if r >= LIMIT { z * (LIMIT / r) } else { z }
}

/// Conformal map of the disk onto the square `[-1, 1]²`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquareMap {
    inner: SchwarzChristoffel,
}

impl Default for SquareMap {
    fn default() -> Self {
        Self { inner: SchwarzChristoffel::new(4) }
    }
}

impl SquareMap {
    #[must_use]
    pub fn disk_to_square(&self, z: Point) -> Point {
        let turn = Complex64::from_polar(1.0, FRAC_PI_4);
        turn * self.inner.disk_to_polygon(z / turn) * SQRT_2
    }

    #[must_use]
    pub fn square_to_disk(&self, q: Point) -> Point {
        let turn = Complex64::from_polar(1.0, FRAC_PI_4);
        turn * self.inner.polygon_to_disk(q / (turn * SQRT_2))
    }

    /// Disk to the diamond `|x| + |y| <= 1`, vertices on the axes.
    #[must_use]
    pub fn disk_to_diamond(&self, z: Point) -> Point {
        self.inner.disk_to_polygon(z)
    }

    #[must_use]
    pub fn diamond_to_disk(&self, w: Point) -> Point {
        self.inner.polygon_to_disk(w)
    }

    /// Diamond edge in the quadrant of `w`, as a reflection line.
    #[must_use]
    pub fn diamond_edge(&self, w: Point) -> MirrorShape {
        let sx = if w.re < 0.0 { -1.0 } else { 1.0 };
        let sy = if w.im < 0.0 { -1.0 } else { 1.0 };
        MirrorShape::line_through(point(sx, 0.0), point(0.0, sy))
    }
}
