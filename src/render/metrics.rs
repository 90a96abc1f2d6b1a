//! Opt-in wall-clock timing for rendering.
//!
//! Active only with the `render_metrics` feature on non-wasm targets, where
//! `std::time::Instant` is available. Otherwise every call is a no-op and
//! [`RenderMetrics::end`] returns `None`.

/// Phases of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Mirror construction, starting point search and edge precomputation.
    Init,
    /// Per-pixel sampling.
    Raster,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderTimingReport {
    pub init_ns: u64,
    pub raster_ns: u64,
}

impl RenderTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.init_ns.saturating_add(self.raster_ns)
    }

    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

#[derive(Debug, Default)]
pub struct RenderMetrics {
    #[cfg(all(feature = "render_metrics", not(target_arch = "wasm32")))]
    report: RenderTimingReport,
}

impl RenderMetrics {
    pub fn begin(&mut self) {
        #[cfg(all(feature = "render_metrics", not(target_arch = "wasm32")))]
        {
            self.report = RenderTimingReport::default();
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<RenderTimingReport> {
        #[cfg(all(feature = "render_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "render_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f`, adding its elapsed time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "render_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            let slot = match bucket {
                TimingBucket::Init => &mut self.report.init_ns,
                TimingBucket::Raster => &mut self.report.raster_ns,
            };
            *slot = slot.saturating_add(nanos);
            result
        }

        #[cfg(not(all(feature = "render_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_totals_buckets() {
        let report = RenderTimingReport { init_ns: 1_000, raster_ns: 2_000 };
        assert_eq!(report.total_ns(), 3_000);
        assert!((report.total_ms() - 0.003).abs() < 1e-12);
    }

    #[test]
    fn time_returns_closure_result() {
        let mut metrics = RenderMetrics::default();
        metrics.begin();
        assert_eq!(metrics.time(TimingBucket::Raster, || 42), 42);
        let _ = metrics.end();
    }
}
