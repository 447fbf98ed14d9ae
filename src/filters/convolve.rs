//! Convolution engine.
//!
//! Two flavours share the same kernel walk:
//! - RGBA byte buffers, where R, G and B are convolved independently and
//!   the output alpha is always 255. Rows are processed in parallel.
//! - Single-channel `f32` planes, used for signed gradients that must not
//!   be clamped to the byte range.
//!
//! The kernel is applied as a correlation: weight (ky, kx) multiplies the
//! sample at window offset (ky, kx), without flipping.

use ndarray::{Array2, ArrayView2, Zip};
use rayon::prelude::*;

use super::kernel::Kernel;
use crate::buffer::{clamp_u8, PixelBuffer, CHANNELS};
use crate::error::{EngineError, Result};

/// How samples outside the image are produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Border {
    /// Transparent black, including alpha.
    #[default]
    Zero,
    /// Nearest edge pixel.
    Replicate,
}

/// Zero-pad an image by `thickness` pixels on every side.
///
/// The source lands in the centred region; the border is all zero bytes.
pub fn pad(image: &PixelBuffer, thickness: usize) -> PixelBuffer {
    pad_with(image, thickness, Border::Zero)
}

/// Pad an image by `thickness` pixels on every side using `border`.
pub fn pad_with(image: &PixelBuffer, thickness: usize, border: Border) -> PixelBuffer {
    let (width, height) = (image.width(), image.height());
    let padded_width = width + 2 * thickness;
    let padded_height = height + 2 * thickness;
    let mut data = vec![0u8; padded_width * padded_height * CHANNELS];
    let src = image.data();

    match border {
        Border::Replicate if width > 0 && height > 0 => {
            for py in 0..padded_height {
                let sy = py.saturating_sub(thickness).min(height - 1);
                for px in 0..padded_width {
                    let sx = px.saturating_sub(thickness).min(width - 1);
                    let s = (sy * width + sx) * CHANNELS;
                    let d = (py * padded_width + px) * CHANNELS;
                    data[d..d + CHANNELS].copy_from_slice(&src[s..s + CHANNELS]);
                }
            }
        }
        _ => {
            let row_bytes = width * CHANNELS;
            for y in 0..height {
                let s = y * row_bytes;
                let d = ((y + thickness) * padded_width + thickness) * CHANNELS;
                data[d..d + row_bytes].copy_from_slice(&src[s..s + row_bytes]);
            }
        }
    }

    PixelBuffer::from_parts(padded_width, padded_height, data)
}

/// Convolve an image with zero padding. Output has the input's dimensions.
pub fn convolve(image: &PixelBuffer, kernel: &Kernel) -> PixelBuffer {
    convolve_with_border(image, kernel, Border::Zero)
}

/// Convolve an image, padding it internally by `kernel.radius()` with `border`.
pub fn convolve_with_border(image: &PixelBuffer, kernel: &Kernel, border: Border) -> PixelBuffer {
    let padded = pad_with(image, kernel.radius(), border);
    convolve_window(&padded, kernel, image.width(), image.height())
}

/// Convolve an already padded image.
///
/// The output shrinks by `2 * kernel.radius()` along each axis, so
/// `convolve_padded(&pad(img, t), k)` with a kernel of size `2t + 1` has
/// the dimensions of `img`.
///
/// # Errors
/// `InvalidParameter` if the input is narrower or shorter than the padding.
pub fn convolve_padded(padded: &PixelBuffer, kernel: &Kernel) -> Result<PixelBuffer> {
    let margin = 2 * kernel.radius();
    if padded.width() < margin || padded.height() < margin {
        return Err(EngineError::invalid(
            "padded",
            format!(
                "a {}x{} image cannot hold a padding of {} pixels",
                padded.width(),
                padded.height(),
                kernel.radius()
            ),
        ));
    }
    Ok(convolve_window(
        padded,
        kernel,
        padded.width() - margin,
        padded.height() - margin,
    ))
}

fn convolve_window(padded: &PixelBuffer, kernel: &Kernel, width: usize, height: usize) -> PixelBuffer {
    let mut output = vec![0u8; width * height * CHANNELS];
    if width == 0 || height == 0 {
        return PixelBuffer::from_parts(width, height, output);
    }

    let src = padded.data();
    let stride = padded.width();
    let size = kernel.size();

    output
        .par_chunks_mut(width * CHANNELS)
        .enumerate()
        .for_each(|(y, row)| {
            for x in 0..width {
                let mut sum = [0.0f32; 3];
                for ky in 0..size {
                    let base = ((y + ky) * stride + x) * CHANNELS;
                    for kx in 0..size {
                        let w = kernel.at(ky, kx);
                        let i = base + kx * CHANNELS;
                        sum[0] += w * src[i] as f32;
                        sum[1] += w * src[i + 1] as f32;
                        sum[2] += w * src[i + 2] as f32;
                    }
                }
                let o = x * CHANNELS;
                row[o] = clamp_u8(sum[0]);
                row[o + 1] = clamp_u8(sum[1]);
                row[o + 2] = clamp_u8(sum[2]);
                row[o + 3] = 255;
            }
        });

    PixelBuffer::from_parts(width, height, output)
}

/// Pad a single-channel plane.
pub fn pad_plane(plane: ArrayView2<f32>, thickness: usize, border: Border) -> Array2<f32> {
    let (height, width) = plane.dim();
    let shape = (height + 2 * thickness, width + 2 * thickness);
    if width == 0 || height == 0 {
        return Array2::zeros(shape);
    }

    Array2::from_shape_fn(shape, |(py, px)| {
        let inside = py >= thickness
            && px >= thickness
            && py - thickness < height
            && px - thickness < width;
        match border {
            Border::Zero if !inside => 0.0,
            _ => {
                let sy = py.saturating_sub(thickness).min(height - 1);
                let sx = px.saturating_sub(thickness).min(width - 1);
                plane[[sy, sx]]
            }
        }
    })
}

/// Convolve a single-channel plane without clamping. Output has the input's shape.
pub fn convolve_plane(plane: ArrayView2<f32>, kernel: &Kernel, border: Border) -> Array2<f32> {
    let size = kernel.size();
    let padded = pad_plane(plane, kernel.radius(), border);
    let mut output = Array2::<f32>::zeros(plane.dim());

    Zip::indexed(&mut output).par_for_each(|(y, x), value| {
        let mut sum = 0.0f32;
        for ky in 0..size {
            for kx in 0..size {
                sum += kernel.at(ky, kx) * padded[[y + ky, x + kx]];
            }
        }
        *value = sum;
    });

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image(width: usize, height: usize) -> PixelBuffer {
        let mut data = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[(x * 20) as u8, (y * 30) as u8, 7, 200]);
            }
        }
        PixelBuffer::from_raw(width, height, data).unwrap()
    }

    #[test]
    fn test_pad_dimensions_and_border() {
        let img = gradient_image(4, 3);
        let padded = pad(&img, 2);

        assert_eq!(padded.width(), 8);
        assert_eq!(padded.height(), 7);

        for y in 0..padded.height() {
            for x in 0..padded.width() {
                let inside = (2..6).contains(&x) && (2..5).contains(&y);
                let px = padded.pixel(x, y).unwrap();
                if inside {
                    assert_eq!(px, img.pixel(x - 2, y - 2).unwrap());
                } else {
                    assert_eq!(px, [0, 0, 0, 0]);
                }
            }
        }
    }

    #[test]
    fn test_pad_replicate_copies_edges() {
        let img = gradient_image(3, 3);
        let padded = pad_with(&img, 1, Border::Replicate);
        assert_eq!(padded.pixel(0, 0), img.pixel(0, 0));
        assert_eq!(padded.pixel(4, 4), img.pixel(2, 2));
        assert_eq!(padded.pixel(4, 2), img.pixel(2, 1));
    }

    #[test]
    fn test_identity_kernel_keeps_colors_and_sets_alpha() {
        let img = gradient_image(5, 4);
        let mut weights = vec![0.0; 9];
        weights[4] = 1.0;
        let identity = Kernel::new(3, weights).unwrap();

        let out = convolve(&img, &identity);
        assert_eq!(out.width(), 5);
        assert_eq!(out.height(), 4);
        for y in 0..4 {
            for x in 0..5 {
                let [r, g, b, _] = img.pixel(x, y).unwrap();
                assert_eq!(out.pixel(x, y).unwrap(), [r, g, b, 255]);
            }
        }
    }

    #[test]
    fn test_convolve_padded_restores_dimensions() {
        let img = gradient_image(6, 5);
        let kernel = Kernel::gaussian(5, 1.0).unwrap();
        let out = convolve_padded(&pad(&img, 2), &kernel).unwrap();
        assert_eq!((out.width(), out.height()), (6, 5));
        assert_eq!(out, convolve(&img, &kernel));
    }

    #[test]
    fn test_convolve_padded_rejects_small_input() {
        let tiny = PixelBuffer::new(3, 3).unwrap();
        let kernel = Kernel::gaussian(5, 1.0).unwrap();
        assert!(convolve_padded(&tiny, &kernel).is_err());
    }

    #[test]
    fn test_zero_border_darkens_edges() {
        let img = PixelBuffer::filled(4, 4, [100, 100, 100, 255]).unwrap();
        let kernel = Kernel::gaussian(3, 1.0).unwrap();

        let zero = convolve(&img, &kernel);
        assert!(zero.pixel(0, 0).unwrap()[0] < 100);

        let replicate = convolve_with_border(&img, &kernel, Border::Replicate);
        assert_eq!(replicate, img);
    }

    #[test]
    fn test_empty_image_convolves_to_empty() {
        let img = PixelBuffer::new(0, 0).unwrap();
        let out = convolve(&img, &Kernel::laplacian());
        assert_eq!(out.data().len(), 0);
    }

    #[test]
    fn test_convolve_plane_signed_response() {
        let plane = Array2::from_shape_fn((3, 4), |(_, x)| if x < 2 { 0.0 } else { 10.0 });
        let gx = convolve_plane(plane.view(), &Kernel::sobel_x(), Border::Replicate);
        // intensity grows eastward, the operator responds negatively
        assert_eq!(gx[[1, 1]], -40.0);
        assert_eq!(gx[[1, 2]], -40.0);
        assert_eq!(gx[[1, 0]], 0.0);
        assert_eq!(gx[[1, 3]], 0.0);
    }

    #[test]
    fn test_pad_plane_zero_and_replicate() {
        let plane = Array2::from_elem((2, 2), 5.0f32);
        let zero = pad_plane(plane.view(), 1, Border::Zero);
        assert_eq!(zero[[0, 0]], 0.0);
        assert_eq!(zero[[1, 1]], 5.0);
        let rep = pad_plane(plane.view(), 1, Border::Replicate);
        assert!(rep.iter().all(|&v| v == 5.0));
    }
}
