//! Color adjustment filters: Brightness, Invert.
//!
//! These are pixel-wise operations that don't require spatial context.
//! Alpha is always preserved unchanged.

use crate::buffer::{clamp_u8, PixelBuffer, CHANNELS};
use crate::config::validate_brightness;
use crate::error::Result;

// ============================================================================
// Invert
// ============================================================================

/// Invert the color channels: `c' = 255 - c`.
pub fn invert(image: &PixelBuffer) -> PixelBuffer {
    let mut data = image.data().to_vec();
    for px in data.chunks_exact_mut(CHANNELS) {
        px[0] = 255 - px[0];
        px[1] = 255 - px[1];
        px[2] = 255 - px[2];
    }
    PixelBuffer::from_parts(image.width(), image.height(), data)
}

// ============================================================================
// Brightness
// ============================================================================

/// Scale the color channels by `1 + factor`, clamped to 0-255.
///
/// # Arguments
/// * `image` - RGBA image
/// * `factor` - Brightness adjustment: -1.0 (black) to 1.0 (double), 0.0 = no change
///
/// # Errors
/// `InvalidParameter` when `factor` is outside [-1, 1]; the image is not touched.
pub fn brightness(image: &PixelBuffer, factor: f32) -> Result<PixelBuffer> {
    validate_brightness(factor)?;

    let scale = 1.0 + factor;
    let mut data = image.data().to_vec();
    for px in data.chunks_exact_mut(CHANNELS) {
        for c in px.iter_mut().take(3) {
            *c = clamp_u8(*c as f32 * scale);
        }
    }
    Ok(PixelBuffer::from_parts(image.width(), image.height(), data))
}
