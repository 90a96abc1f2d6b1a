#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Uniform tilings of the sphere, the plane and the hyperbolic plane,
//! rendered by folding every sample into the fundamental triangle of a
//! triangle reflection group.
//!
//! The pipeline per sample is: display model → canonical conformal model →
//! centering isometry → fold → colour. [`tiling::TilingState`] holds the
//! one-time setup; [`render::render`] drives it over a pixel grid.

pub mod color;
pub mod geom;
pub mod models;
pub mod random;
pub mod render;
pub mod tiling;
pub mod wasm;

pub use color::{ColoringOptions, ColoringPolicy, Rgba};
pub use geom::{Geometry, Mobius, Point};
pub use models::{
    EuclideanModel, HyperbolicModel, ModelError, ModelKind, ModelRegistry, SphericalModel,
    canonical_to_model, canonical_to_model_in, model_to_canonical, model_to_canonical_in,
};
pub use random::{random_spec, random_spec_from_entropy};
pub use render::{Image, RenderDiagnostics, render, render_spec};
pub use tiling::{
    Centering, FoldOutcome, NonConvergence, SampleInfo, TilingError, TilingSpec, TilingState,
    init_tiling,
};

use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // the embedding application installs its own logger
}

#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
#[wasm_bindgen]
pub async fn initialize_parallel(worker_count: Option<u32>) -> Result<(), wasm_bindgen::JsError> {
    let threads = worker_count
        .map(|count| count.max(1) as usize)
        .or_else(|| {
            std::thread::available_parallelism()
                .map(|value| value.get())
                .ok()
        })
        .unwrap_or(1);

    wasm_bindgen_rayon::init_thread_pool(threads).await.map_err(|err| {
        wasm_bindgen::JsError::new(&format!("could not start the rayon thread pool: {err}"))
    })
}
