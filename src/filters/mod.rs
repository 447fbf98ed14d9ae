//! Filter modules for image processing effects.
//!
//! ## Format
//!
//! Every filter consumes and produces [`PixelBuffer`](crate::PixelBuffer)
//! values: RGBA, 8 bits per channel, row-major. Inputs are borrowed and
//! never modified; each call allocates its output.
//!
//! ## Architecture
//!
//! - **Kernel generator** - normalized Gaussians and fixed 3x3 operators
//! - **Convolution engine** - zero/replicate padding, RGBA and float-plane convolution
//! - **Pixel-wise** - invert, grayscale, brightness
//! - **Edge detection** - sobel, prewitt, laplacian, find_edges
//! - **Canny** - blur, gradient, non-maximum suppression, hysteresis
//!
//! Convolution output always carries alpha 255. Pixel-wise filters keep
//! the source alpha.

pub mod kernel;
pub mod convolve;
pub mod grayscale;
pub mod color_adjust;
pub mod blur;
pub mod edge;
pub mod canny;

pub use blur::{blur, gaussian_blur};
pub use canny::canny;
pub use color_adjust::{brightness, invert};
pub use convolve::{convolve, convolve_padded, convolve_with_border, pad, pad_with, Border};
pub use edge::{find_edges, laplacian, prewitt, prewitt_directional, sobel, sobel_directional, Direction};
pub use grayscale::grayscale;
pub use kernel::Kernel;
