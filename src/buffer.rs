//! RGBA8 raster buffer exchanged at the engine boundary.
//!
//! The layout matches a 2D canvas `ImageData`: row-major, four bytes per
//! pixel in R, G, B, A order, no row padding. Buffers have value
//! semantics; every filter borrows its input and returns a fresh buffer.

use ndarray::{Array3, ArrayView3};

use crate::error::{EngineError, Result};

/// Number of bytes per pixel.
pub const CHANNELS: usize = 4;

/// Byte length of a `width` x `height` RGBA image.
fn byte_len(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(CHANNELS))
        .ok_or(EngineError::ImageTooLarge { width, height })
}

/// An RGBA image with 8 bits per channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a fully transparent black image.
    ///
    /// # Errors
    /// `ImageTooLarge` if the byte length does not fit in `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    /// Create an image where every pixel has the given RGBA value.
    ///
    /// # Errors
    /// `ImageTooLarge` if the byte length does not fit in `usize`.
    pub fn filled(width: usize, height: usize, rgba: [u8; 4]) -> Result<Self> {
        let len = byte_len(width, height)?;
        let data = rgba.iter().copied().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap raw RGBA bytes.
    ///
    /// # Errors
    /// `InvalidDimensions` if `data.len() != width * height * 4`,
    /// `ImageTooLarge` if that product overflows.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(EngineError::InvalidDimensions {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Copy an ndarray of shape (height, width, 4).
    pub fn from_array(array: ArrayView3<u8>) -> Result<Self> {
        let (height, width, channels) = array.dim();
        if channels != CHANNELS {
            return Err(EngineError::InvalidDimensions {
                width,
                height,
                expected: byte_len(width, height)?,
                actual: array.len(),
            });
        }
        // iter() walks in logical order regardless of memory layout
        Self::from_raw(width, height, array.iter().copied().collect())
    }

    /// Unchecked constructor for buffers built inside the crate (length
    /// asserted in debug builds).
    pub(crate) fn from_parts(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height * CHANNELS);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Copy into an ndarray of shape (height, width, 4).
    pub fn to_array(&self) -> Array3<u8> {
        Array3::from_shape_fn((self.height, self.width, CHANNELS), |(y, x, c)| {
            self.data[(y * self.width + x) * CHANNELS + c]
        })
    }

    /// RGBA value at (x, y), or `None` outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * CHANNELS;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// True when the image has no pixels or every byte is zero.
    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }

    /// Reject blank images before they reach a filter.
    pub fn ensure_not_blank(&self) -> Result<()> {
        if self.is_blank() {
            return Err(EngineError::EmptyImage);
        }
        Ok(())
    }
}

/// Round and clamp a float into the 0-255 byte range.
#[inline]
pub(crate) fn clamp_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
