//! WebAssembly exports for the editor.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images
//! cross the boundary as flat RGBA bytes, exactly what
//! `CanvasRenderingContext2D.getImageData().data` provides, plus width
//! and height. Each export returns a fresh byte array for `putImageData`.
//!
//! Engine errors surface as JavaScript exceptions.

use log::warn;
use wasm_bindgen::prelude::*;

use crate::buffer::PixelBuffer;
use crate::config::{BlurParams, CannyParams};
use crate::filters;
use crate::history::EditHistory;

fn buffer(data: &[u8], width: usize, height: usize) -> Result<PixelBuffer, JsError> {
    Ok(PixelBuffer::from_raw(width, height, data.to_vec())?)
}

// ============================================================================
// Pixel-wise filters
// ============================================================================

/// Invert RGB channels of a flat RGBA array.
#[wasm_bindgen]
pub fn invert_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsError> {
    Ok(filters::invert(&buffer(data, width, height)?).into_raw())
}

/// Convert a flat RGBA array to grayscale using BT.709 luminosity.
#[wasm_bindgen]
pub fn grayscale_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsError> {
    Ok(filters::grayscale(&buffer(data, width, height)?).into_raw())
}

/// Scale RGB channels by `1 + factor`, factor in [-1, 1].
#[wasm_bindgen]
pub fn brightness_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    factor: f32,
) -> Result<Vec<u8>, JsError> {
    let image = buffer(data, width, height)?;
    let result = filters::brightness(&image, factor).map_err(|err| {
        warn!("wasm: brightness rejected: {err}");
        err
    })?;
    Ok(result.into_raw())
}

// ============================================================================
// Convolution filters
// ============================================================================

/// Gaussian blur with an odd kernel size.
#[wasm_bindgen]
pub fn blur_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    size: usize,
    sigma: f32,
) -> Result<Vec<u8>, JsError> {
    let image = buffer(data, width, height)?;
    Ok(filters::blur(&image, &BlurParams { size, sigma })?.into_raw())
}

#[wasm_bindgen]
pub fn sobel_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsError> {
    Ok(filters::sobel(&buffer(data, width, height)?).into_raw())
}

#[wasm_bindgen]
pub fn prewitt_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsError> {
    Ok(filters::prewitt(&buffer(data, width, height)?).into_raw())
}

#[wasm_bindgen]
pub fn laplacian_wasm(data: &[u8], width: usize, height: usize) -> Result<Vec<u8>, JsError> {
    Ok(filters::laplacian(&buffer(data, width, height)?).into_raw())
}

#[wasm_bindgen]
pub fn find_edges_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    threshold: u8,
) -> Result<Vec<u8>, JsError> {
    Ok(filters::find_edges(&buffer(data, width, height)?, threshold).into_raw())
}

/// Canny edge detection.
///
/// # Arguments
/// * `sigma` - Standard deviation of the 5x5 smoothing kernel
/// * `low_percent` - Lower threshold slider, percent of the upper threshold (0-100)
/// * `high_percent` - Upper threshold slider, percent of the strongest gradient (0-100)
#[wasm_bindgen]
pub fn canny_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    sigma: f32,
    low_percent: f32,
    high_percent: f32,
) -> Result<Vec<u8>, JsError> {
    let image = buffer(data, width, height)?;
    let params = CannyParams::from_percent(sigma, low_percent, high_percent);
    Ok(filters::canny(&image, &params)?.into_raw())
}

// ============================================================================
// Edit history
// ============================================================================

/// Undo/redo stack owned by one editor tab.
#[wasm_bindgen]
pub struct History {
    inner: EditHistory,
}

#[wasm_bindgen]
impl History {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: EditHistory::new(),
        }
    }

    /// Store a copy of the canvas contents under `name`.
    pub fn add(&mut self, data: &[u8], width: usize, height: usize, name: &str) -> Result<(), JsError> {
        let image = buffer(data, width, height)?;
        self.inner.add(&image, name);
        Ok(())
    }

    /// Previous image, or `undefined` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<Option<Vec<u8>>, JsError> {
        Ok(self.inner.undo()?.map(|image| image.data().to_vec()))
    }

    /// Next image, or `undefined` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<Option<Vec<u8>>, JsError> {
        Ok(self.inner.redo()?.map(|image| image.data().to_vec()))
    }

    /// Go back to the originally opened image, discarding all edits.
    pub fn reset(&mut self) -> Result<Vec<u8>, JsError> {
        Ok(self.inner.reset()?.data().to_vec())
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn current(&self) -> Result<Vec<u8>, JsError> {
        Ok(self.inner.current_image()?.data().to_vec())
    }

    #[wasm_bindgen(js_name = currentWidth)]
    pub fn current_width(&self) -> Result<usize, JsError> {
        Ok(self.inner.current_image()?.width())
    }

    #[wasm_bindgen(js_name = currentHeight)]
    pub fn current_height(&self) -> Result<usize, JsError> {
        Ok(self.inner.current_image()?.height())
    }

    pub fn name(&self) -> Result<String, JsError> {
        Ok(self.inner.name()?.to_owned())
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
