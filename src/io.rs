//! Raster file import and export.
//!
//! Opening a file decodes it to RGBA and downscales it so the longer side
//! fits the editor canvas. Saving encodes the current image as PNG.

use std::io::Cursor;

use image::{imageops::FilterType, ImageFormat, RgbaImage};
use log::debug;

use crate::buffer::PixelBuffer;
use crate::config::ImportLimits;
use crate::error::{EngineError, Result};

/// Dimensions of a `width` x `height` image scaled so its longer side is at most `max_side`.
pub fn fit_within(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longer = width.max(height);
    if longer <= max_side {
        return (width, height);
    }
    let scale = max_side as f64 / longer as f64;
    let scaled = |v: u32| ((v as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Decode an encoded image (PNG, JPEG, GIF, BMP, WebP) into a [`PixelBuffer`].
///
/// # Errors
/// `InvalidParameter` if `limits.max_side` is zero, `Decode` if the bytes
/// are not a supported image.
pub fn decode(bytes: &[u8], limits: &ImportLimits) -> Result<PixelBuffer> {
    if limits.max_side == 0 {
        return Err(EngineError::invalid("max_side", "must be positive"));
    }

    let decoded = image::load_from_memory(bytes).map_err(EngineError::Decode)?;
    let (width, height) = (decoded.width(), decoded.height());
    let (target_w, target_h) = fit_within(width, height, limits.max_side);

    let rgba = if (target_w, target_h) == (width, height) {
        decoded.into_rgba8()
    } else {
        debug!("io: downscaling {width}x{height} to {target_w}x{target_h}");
        decoded
            .resize_exact(target_w, target_h, FilterType::Triangle)
            .into_rgba8()
    };

    PixelBuffer::from_raw(target_w as usize, target_h as usize, rgba.into_raw())
}

/// Encode an image as PNG bytes.
pub fn encode_png(image: &PixelBuffer) -> Result<Vec<u8>> {
    let (width, height) = (image.width() as u32, image.height() as u32);
    let rgba = RgbaImage::from_raw(width, height, image.data().to_vec()).ok_or(
        EngineError::InvalidDimensions {
            width: image.width(),
            height: image.height(),
            expected: image.width() * image.height() * 4,
            actual: image.data().len(),
        },
    )?;

    let mut bytes = Vec::new();
    rgba.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(EngineError::Encode)?;
    Ok(bytes)
}
