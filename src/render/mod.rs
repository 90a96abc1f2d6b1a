//! Rasterizer: samples the tiling over a pixel grid.
//!
//! Rows are disjoint slices of the output buffer, so the parallel driver
//! needs no locking. The first stored row is the top of the view.

pub mod diagnostics;
pub mod metrics;

pub use diagnostics::RenderDiagnostics;
pub use metrics::{RenderMetrics, RenderTimingReport, TimingBucket};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::color::{Rgba, average};
use crate::geom::{Point, point};
use crate::tiling::{Sample, TilingError, TilingSpec, TilingState};

/// Fraction of the pixel covered by the antialiasing grid.
const ANTIALIAS_SPAN: f64 = 0.99;
/// Intervals per axis of the antialiasing grid; the grid has one more sample.
const ANTIALIAS_DIVISIONS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Image {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::WHITE; width as usize * height as usize],
        }
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at column `x` of row `y`, counted from the top.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y as usize * self.width as usize + x as usize).copied()
    }

    #[must_use]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Row-major RGBA bytes, ready for a canvas `ImageData`.
    #[must_use]
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_array()).collect()
    }
}

/// Maps pixel indices to display-model coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: u32,
    height: u32,
    x_bounds: f64,
    y_bounds: f64,
    step: f64,
}

impl Viewport {
    /// `bounds` is the horizontal half-extent; the vertical one follows the
    /// aspect ratio so pixels stay square.
    #[must_use]
    pub fn new(width: u32, height: u32, bounds: f64) -> Self {
        let step = 2.0 * bounds / f64::from(width);
        Self {
            width,
            height,
            x_bounds: bounds,
            y_bounds: bounds * f64::from(height) / f64::from(width),
            step,
        }
    }

    /// Centre of the pixel in column `i` and row `row` (top row first).
    #[must_use]
    pub fn pixel_center(&self, i: u32, row: u32) -> Point {
        let j = self.height - 1 - row;
        point(
            -self.x_bounds + self.step / 2.0 + f64::from(i) * self.step,
            -self.y_bounds + self.step / 2.0 + f64::from(j) * self.step,
        )
    }

    /// Sample positions of one pixel: its centre, or a 4×4 grid spanning
    /// almost all of it.
    #[must_use]
    pub fn samples(&self, i: u32, row: u32, antialias: bool) -> Vec<Point> {
        let center = self.pixel_center(i, row);
        if !antialias {
            return vec![center];
        }
        let span = self.step * ANTIALIAS_SPAN;
        let offset = |k: u32| -span / 2.0 + f64::from(k) * span / f64::from(ANTIALIAS_DIVISIONS);
        (0..=ANTIALIAS_DIVISIONS)
            .flat_map(|k| {
                (0..=ANTIALIAS_DIVISIONS).map(move |l| center + point(offset(k), offset(l)))
            })
            .collect()
    }
}

/// Initializes `spec` and renders it.
///
/// # Errors
///
/// Propagates initialization failures from [`TilingState::new`].
pub fn render_spec(spec: &TilingSpec) -> Result<(Image, RenderDiagnostics), TilingError> {
    let mut metrics = RenderMetrics::default();
    metrics.begin();
    let state = metrics.time(TimingBucket::Init, || TilingState::new(spec))?;
    Ok(render_with(&state, &mut metrics))
}

/// Renders an initialized tiling at its spec's raster settings.
#[must_use]
pub fn render(state: &TilingState) -> (Image, RenderDiagnostics) {
    let mut metrics = RenderMetrics::default();
    metrics.begin();
    render_with(state, &mut metrics)
}

fn render_with(state: &TilingState, metrics: &mut RenderMetrics) -> (Image, RenderDiagnostics) {
    let raster = state.spec().raster;
    let viewport = Viewport::new(raster.width, raster.height, state.spec().bounds());
    let mut image = Image::new(raster.width, raster.height);
    let mut diagnostics =
        RenderDiagnostics::new(raster.width, raster.height, state.locator_report());

    let rows = metrics.time(TimingBucket::Raster, || {
        render_rows(state, &viewport, raster.antialias, &mut image.pixels)
    });
    for row in &rows {
        diagnostics.merge(row);
    }
    if diagnostics.unconverged_count > 0 {
        diagnostics.add_warning(format!(
            "{} samples did not fold within {} iterations",
            diagnostics.unconverged_count,
            state.spec().tolerances.fold_max_iterations
        ));
    }
    diagnostics.timing = metrics.end();

    if diagnostics.is_clean() {
        log::debug!("rendered {}: {}", state.spec(), diagnostics.summary());
    } else {
        log::warn!("rendered {}: {}", state.spec(), diagnostics.summary());
    }
    (image, diagnostics)
}

#[cfg(feature = "parallel")]
fn render_rows(
    state: &TilingState,
    viewport: &Viewport,
    antialias: bool,
    pixels: &mut [Rgba],
) -> Vec<RenderDiagnostics> {
    pixels
        .par_chunks_mut(viewport.width as usize)
        .enumerate()
        .map(|(row, out)| render_row(state, viewport, antialias, row, out))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn render_rows(
    state: &TilingState,
    viewport: &Viewport,
    antialias: bool,
    pixels: &mut [Rgba],
) -> Vec<RenderDiagnostics> {
    pixels
        .chunks_mut(viewport.width as usize)
        .enumerate()
        .map(|(row, out)| render_row(state, viewport, antialias, row, out))
        .collect()
}

fn render_row(
    state: &TilingState,
    viewport: &Viewport,
    antialias: bool,
    row: usize,
    out: &mut [Rgba],
) -> RenderDiagnostics {
    let mut diagnostics = RenderDiagnostics::default();
    let row = u32::try_from(row).unwrap_or(u32::MAX);
    let mut colors = Vec::with_capacity(16);
    for (i, pixel) in (0..viewport.width).zip(out.iter_mut()) {
        colors.clear();
        for v in viewport.samples(i, row, antialias) {
            let sample = state.sample(v);
            diagnostics.sample_count += 1;
            match sample {
                Sample::Background => diagnostics.background_count += 1,
                Sample::Limit => diagnostics.limit_count += 1,
                Sample::Unconverged => diagnostics.unconverged_count += 1,
                Sample::Shaded(_) => {}
            }
            colors.push(sample.color());
        }
        *pixel = average(&colors);
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_centres_are_symmetric() {
        let viewport = Viewport::new(4, 2, 1.0);
        let top_left = viewport.pixel_center(0, 0);
        let bottom_right = viewport.pixel_center(3, 1);
        assert!((top_left + bottom_right).norm() < 1e-15);
        assert!((top_left - point(-0.75, 0.25)).norm() < 1e-15);
    }

    #[test]
    fn antialias_grid_stays_inside_pixel() {
        let viewport = Viewport::new(10, 10, 1.0);
        let center = viewport.pixel_center(3, 7);
        let samples = viewport.samples(3, 7, true);
        assert_eq!(samples.len(), 16);
        for s in samples {
            assert!((s.re - center.re).abs() < 0.1 && (s.im - center.im).abs() < 0.1);
        }
        assert_eq!(viewport.samples(3, 7, false), vec![center]);
    }

    #[test]
    fn rgba_bytes_follow_pixel_order() {
        let image = Image::new(2, 1);
        assert_eq!(image.to_rgba_bytes(), vec![255; 8]);
        assert_eq!(image.pixel(2, 0), None);
    }
}
