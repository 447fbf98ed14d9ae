//! Gaussian blur for RGBA images.
//!
//! Built on the convolution engine with edge replication, so a flat
//! image stays flat up to the border. Output alpha is 255.

use super::convolve::{convolve_with_border, Border};
use super::kernel::Kernel;
use crate::buffer::PixelBuffer;
use crate::config::BlurParams;
use crate::error::Result;

/// Convolve with an already generated kernel.
pub fn blur_with_kernel(image: &PixelBuffer, kernel: &Kernel) -> PixelBuffer {
    convolve_with_border(image, kernel, Border::Replicate)
}

/// Apply a `size` x `size` Gaussian blur.
///
/// # Errors
/// `InvalidParameter` if `size` is even or zero, or `sigma` is not positive.
pub fn gaussian_blur(image: &PixelBuffer, size: usize, sigma: f32) -> Result<PixelBuffer> {
    let kernel = Kernel::gaussian(size, sigma)?;
    Ok(blur_with_kernel(image, &kernel))
}

/// User-facing blur with toolbar parameters.
pub fn blur(image: &PixelBuffer, params: &BlurParams) -> Result<PixelBuffer> {
    params.validate()?;
    gaussian_blur(image, params.size, params.sigma)
}
