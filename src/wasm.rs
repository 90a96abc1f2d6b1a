//! JavaScript bindings for rendering into a canvas.

use std::fmt;

use wasm_bindgen::prelude::*;

use crate::models::ModelRegistry;
use crate::random::random_spec_from_entropy;
use crate::render::render;
use crate::tiling::{TilingSpec, TilingState};

#[wasm_bindgen]
pub struct TilingRenderer {
    state: TilingState,
    registry: ModelRegistry,
    last_summary: Option<String>,
}

#[wasm_bindgen]
impl TilingRenderer {
    /// Builds a renderer from a serialized `TilingSpec`; missing fields take
    /// their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(spec: JsValue) -> Result<TilingRenderer, JsValue> {
        let spec: TilingSpec = serde_wasm_bindgen::from_value(spec).map_err(to_js_error)?;
        Self::from_spec(&spec)
    }

    /// Renderer for a random tiling.
    #[wasm_bindgen]
    pub fn random() -> Result<TilingRenderer, JsValue> {
        Self::from_spec(&random_spec_from_entropy())
    }

    #[wasm_bindgen]
    pub fn width(&self) -> u32 {
        self.state.spec().raster.width
    }

    #[wasm_bindgen]
    pub fn height(&self) -> u32 {
        self.state.spec().raster.height
    }

    /// Human-readable name of the tiling.
    #[wasm_bindgen]
    pub fn describe(&self) -> String {
        self.state.spec().to_string()
    }

    /// Current spec as a JavaScript object.
    #[wasm_bindgen]
    pub fn spec(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.state.spec()).map_err(to_js_error)
    }

    /// Switches the display model by name, e.g. `"klein"` or `"mercator"`.
    #[wasm_bindgen]
    pub fn set_model(&mut self, name: &str) -> Result<(), JsValue> {
        let model = self.registry.resolve(self.state.geometry(), name).map_err(to_js_error)?;
        let mut spec = self.state.spec().clone();
        spec.models.set(model);
        self.state = TilingState::new(&spec).map_err(to_js_error)?;
        Ok(())
    }

    /// RGBA bytes, top row first.
    #[wasm_bindgen]
    pub fn render(&mut self) -> Vec<u8> {
        let (image, diagnostics) = render(&self.state);
        self.last_summary = Some(diagnostics.summary());
        image.to_rgba_bytes()
    }

    /// Summary of the last render.
    #[wasm_bindgen]
    pub fn diagnostics(&self) -> Option<String> {
        self.last_summary.clone()
    }
}

impl TilingRenderer {
    fn from_spec(spec: &TilingSpec) -> Result<Self, JsValue> {
        Ok(Self {
            state: TilingState::new(spec).map_err(to_js_error)?,
            registry: ModelRegistry::default(),
            last_summary: None,
        })
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        wasm_bindgen::JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
