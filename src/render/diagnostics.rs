//! Per-image render diagnostics.

use std::fmt;

use super::metrics::RenderTimingReport;
use crate::tiling::LocatorReport;

/// Sample counts and search quality of one rendered image.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderDiagnostics {
    pub width: u32,
    pub height: u32,
    /// Model-space samples taken, antialiasing included.
    pub sample_count: usize,
    /// Samples outside the model's drawable region.
    pub background_count: usize,
    /// Samples on the model's boundary band.
    pub limit_count: usize,
    /// Samples whose fold hit the iteration cap and were painted grey.
    pub unconverged_count: usize,
    pub locator_iterations: usize,
    pub locator_objective: f64,
    pub locator_converged: bool,
    /// Only with the `render_metrics` feature on non-wasm targets.
    pub timing: Option<RenderTimingReport>,
    pub warnings: Vec<String>,
}

impl RenderDiagnostics {
    #[must_use]
    pub fn new(width: u32, height: u32, locator: LocatorReport) -> Self {
        Self {
            width,
            height,
            locator_iterations: locator.iterations,
            locator_objective: locator.objective,
            locator_converged: locator.converged,
            ..Self::default()
        }
    }

    /// No grey samples and a converged starting point.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.unconverged_count == 0 && self.locator_converged && self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Adds the sample counts of `other`; image size and locator fields are kept.
    pub fn merge(&mut self, other: &RenderDiagnostics) {
        self.sample_count += other.sample_count;
        self.background_count += other.background_count;
        self.limit_count += other.limit_count;
        self.unconverged_count += other.unconverged_count;
        self.warnings.extend(other.warnings.iter().cloned());
    }

    /// Short one-line form for logging.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "{}x{} samples:{}",
            self.width, self.height, self.sample_count
        )];
        if self.background_count > 0 {
            parts.push(format!("background:{}", self.background_count));
        }
        if self.limit_count > 0 {
            parts.push(format!("limit:{}", self.limit_count));
        }
        if self.unconverged_count > 0 {
            parts.push(format!("unconverged:{}", self.unconverged_count));
        }
        if !self.locator_converged {
            parts.push(format!("locator-residual:{:e}", self.locator_objective));
        }
        parts.join(" ")
    }
}

impl fmt::Display for RenderDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Render Diagnostics:")?;
        writeln!(f, "  Image: {}x{}", self.width, self.height)?;
        writeln!(f, "  Samples: {}", self.sample_count)?;
        if self.background_count > 0 || self.limit_count > 0 {
            writeln!(
                f,
                "  Outside model: {} background, {} limit",
                self.background_count, self.limit_count
            )?;
        }
        if self.unconverged_count > 0 {
            writeln!(f, "  Unconverged folds: {}", self.unconverged_count)?;
        }
        writeln!(
            f,
            "  Starting point: {} iterations, objective {:e}{}",
            self.locator_iterations,
            self.locator_objective,
            if self.locator_converged { "" } else { " (not converged)" }
        )?;
        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }
        if let Some(ref timing) = self.timing {
            writeln!(f, "  Timing: {} ms total", timing.total_ms())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn converged() -> LocatorReport {
        LocatorReport { iterations: 12, objective: 0.0, converged: true }
    }

    #[test]
    fn fresh_diagnostics_are_clean() {
        let diag = RenderDiagnostics::new(4, 4, converged());
        assert!(diag.is_clean());
        assert_eq!(diag.summary(), "4x4 samples:0");
    }

    #[test]
    fn merge_sums_counts() {
        let mut total = RenderDiagnostics::new(8, 2, converged());
        let row = RenderDiagnostics {
            sample_count: 8,
            background_count: 3,
            unconverged_count: 1,
            ..RenderDiagnostics::default()
        };
        total.merge(&row);
        total.merge(&row);
        assert_eq!(total.sample_count, 16);
        assert_eq!(total.background_count, 6);
        assert!(!total.is_clean());
        assert!(total.summary().contains("unconverged:2"));
        assert_eq!(total.width, 8);
    }

    #[test]
    fn display_flags_unconverged_locator() {
        let stalled = LocatorReport { iterations: 1000, objective: 1e-9, converged: false };
        let diag = RenderDiagnostics::new(1, 1, stalled);
        assert!(diag.to_string().contains("not converged"));
        assert!(diag.summary().contains("locator-residual"));
    }
}
