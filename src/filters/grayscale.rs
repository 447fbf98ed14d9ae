//! Grayscale conversion filter.
//!
//! Uses ITU-R BT.709 luminosity coefficients. The gray value is rounded
//! before it is stored, so converting an already gray image is a no-op.

use ndarray::Array2;

use crate::buffer::{clamp_u8, PixelBuffer, CHANNELS};

/// ITU-R BT.709 luminosity coefficients
const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// Luminance of a single RGB triple.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f32 {
    LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32
}

/// Convert an RGBA image to grayscale (luminosity method).
///
/// Output is RGBA with R=G=B=luminosity, A preserved.
pub fn grayscale(image: &PixelBuffer) -> PixelBuffer {
    let mut data = image.data().to_vec();

    for px in data.chunks_exact_mut(CHANNELS) {
        let gray = clamp_u8(luma(px[0], px[1], px[2]));
        px[0] = gray;
        px[1] = gray;
        px[2] = gray;
    }

    PixelBuffer::from_parts(image.width(), image.height(), data)
}

/// Red channel of an image as an `f32` plane of shape (height, width).
///
/// Edge detectors call this on grayscale output, where all three color
/// channels carry the same value.
pub fn intensity_plane(image: &PixelBuffer) -> Array2<f32> {
    let width = image.width();
    let data = image.data();
    Array2::from_shape_fn((image.height(), width), |(y, x)| {
        data[(y * width + x) * CHANNELS] as f32
    })
}
