//! Edge detection filters: Sobel, Prewitt, Laplacian, Find Edges.
//!
//! Every detector converts its input to grayscale first. Gradients are
//! computed on a signed `f32` plane with edge replication and only
//! clamped to 0-255 when written back into an RGBA buffer.
//!
//! Output is always grayscale (same value for all color channels) with
//! alpha 255, except `find_edges` which keeps the source alpha.

use ndarray::{Array2, ArrayView2, Zip};

use super::convolve::{convolve_plane, convolve_with_border, Border};
use super::grayscale::{grayscale, intensity_plane};
use super::kernel::Kernel;
use crate::buffer::{clamp_u8, PixelBuffer, CHANNELS};

/// Which gradient component an edge filter reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// |Gx|: responds to vertical edges.
    Horizontal,
    /// |Gy|: responds to horizontal edges.
    Vertical,
    /// sqrt(Gx² + Gy²)
    #[default]
    Both,
}

/// Per-pixel gradient components of an intensity plane.
#[derive(Clone, Debug)]
pub struct Gradient {
    pub gx: Array2<f32>,
    pub gy: Array2<f32>,
}

impl Gradient {
    /// Convolve `plane` with a pair of operators.
    pub fn compute(plane: ArrayView2<f32>, op_x: &Kernel, op_y: &Kernel) -> Self {
        Self {
            gx: convolve_plane(plane, op_x, Border::Replicate),
            gy: convolve_plane(plane, op_y, Border::Replicate),
        }
    }

    /// Gradient magnitude sqrt(Gx² + Gy²).
    pub fn magnitude(&self) -> Array2<f32> {
        Zip::from(&self.gx)
            .and(&self.gy)
            .map_collect(|&gx, &gy| (gx * gx + gy * gy).sqrt())
    }

    fn response(&self, direction: Direction) -> Array2<f32> {
        match direction {
            Direction::Horizontal => self.gx.mapv(f32::abs),
            Direction::Vertical => self.gy.mapv(f32::abs),
            Direction::Both => self.magnitude(),
        }
    }
}

/// Write a plane into all three color channels, alpha 255.
pub(crate) fn plane_to_buffer(plane: &Array2<f32>) -> PixelBuffer {
    let (height, width) = plane.dim();
    let mut data = Vec::with_capacity(width * height * CHANNELS);
    for &v in plane.iter() {
        let g = clamp_u8(v);
        data.extend_from_slice(&[g, g, g, 255]);
    }
    PixelBuffer::from_parts(width, height, data)
}

fn gradient_filter(image: &PixelBuffer, op_x: &Kernel, op_y: &Kernel, direction: Direction) -> PixelBuffer {
    let gray = grayscale(image);
    let plane = intensity_plane(&gray);
    let gradient = Gradient::compute(plane.view(), op_x, op_y);
    plane_to_buffer(&gradient.response(direction))
}

// ============================================================================
// Sobel / Prewitt
// ============================================================================

/// Sobel edge magnitude.
pub fn sobel(image: &PixelBuffer) -> PixelBuffer {
    sobel_directional(image, Direction::Both)
}

/// Sobel edge detection restricted to one gradient component.
pub fn sobel_directional(image: &PixelBuffer, direction: Direction) -> PixelBuffer {
    gradient_filter(image, &Kernel::sobel_x(), &Kernel::sobel_y(), direction)
}

/// Prewitt edge magnitude.
pub fn prewitt(image: &PixelBuffer) -> PixelBuffer {
    prewitt_directional(image, Direction::Both)
}

/// Prewitt edge detection restricted to one gradient component.
pub fn prewitt_directional(image: &PixelBuffer, direction: Direction) -> PixelBuffer {
    gradient_filter(image, &Kernel::prewitt_x(), &Kernel::prewitt_y(), direction)
}

// ============================================================================
// Laplacian
// ============================================================================

/// Laplacian edge detection.
///
/// A single 8-neighbour convolution of the grayscale image; negative
/// responses clamp to 0.
pub fn laplacian(image: &PixelBuffer) -> PixelBuffer {
    convolve_with_border(&grayscale(image), &Kernel::laplacian(), Border::Replicate)
}

// ============================================================================
// Find Edges
// ============================================================================

/// Default threshold for [`find_edges`].
pub const FIND_EDGES_THRESHOLD: u8 = 10;

/// Mark pixels that differ from their forward neighbours.
///
/// Each gray value is compared with the mean of its East, South and
/// South-East neighbours (missing neighbours count as 0). A difference
/// above `threshold` becomes 255, anything else 0. The bottom-right pixel
/// has no forward neighbours and keeps its gray value.
pub fn find_edges(image: &PixelBuffer, threshold: u8) -> PixelBuffer {
    let gray = grayscale(image);
    let (width, height) = (gray.width(), gray.height());
    let src = gray.data();
    let mut data = src.to_vec();

    let at = |x: usize, y: usize| src[(y * width + x) * CHANNELS] as f32;

    for y in 0..height {
        for x in 0..width {
            let last_col = x + 1 == width;
            let last_row = y + 1 == height;
            if last_col && last_row {
                continue;
            }

            let east = if last_col { 0.0 } else { at(x + 1, y) };
            let south = if last_row { 0.0 } else { at(x, y + 1) };
            let south_east = if last_col || last_row { 0.0 } else { at(x + 1, y + 1) };

            let mean = (east + south + south_east) / 3.0;
            let value = if (at(x, y) - mean).abs() > threshold as f32 { 255 } else { 0 };

            let i = (y * width + x) * CHANNELS;
            data[i] = value;
            data[i + 1] = value;
            data[i + 2] = value;
        }
    }

    PixelBuffer::from_parts(width, height, data)
}
