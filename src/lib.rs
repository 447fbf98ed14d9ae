//! ImageToolKit engine
//!
//! UI-independent core of a browser image editor: convolution filters,
//! edge detection (Sobel, Prewitt, Laplacian, Canny) and a linear
//! undo/redo history of image snapshots. Bindings are provided for
//! JavaScript via wasm-bindgen and for Python via PyO3.
//!
//! ## Image Format
//! All operations exchange [`PixelBuffer`] values: RGBA, 8 bits per
//! channel, row-major, matching a canvas `ImageData` byte for byte.
//!
//! ## Ownership
//! Filters borrow their input and allocate their output. Nothing mutates
//! a buffer in place, and [`EditHistory`] stores its own copies, so a
//! buffer can be handed to a background [`worker::Worker`] without
//! aliasing concerns.
//!
//! ```
//! use imagetoolkit::{filters, CannyParams, EditHistory, PixelBuffer};
//!
//! let image = PixelBuffer::filled(8, 8, [30, 60, 90, 255]).unwrap();
//! let mut history = EditHistory::new();
//! history.add(&image, "open");
//!
//! let edges = filters::canny(&image, &CannyParams::default()).unwrap();
//! history.add(&edges, "canny");
//! assert_eq!(history.len(), 2);
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod filters;
pub mod history;
pub mod operation;
pub mod worker;

#[cfg(feature = "io")]
pub mod io;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use buffer::PixelBuffer;
pub use config::{BlurParams, CannyParams, ImportLimits};
pub use error::{EngineError, Result};
pub use history::{EditHistory, HistoryEntry};
pub use operation::Operation;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray2, PyArray3, PyReadonlyArray2, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::buffer::PixelBuffer;
    use crate::config::{BlurParams, CannyParams};
    use crate::error::EngineError;
    use crate::filters::{self, edge::FIND_EDGES_THRESHOLD, Kernel};
    use crate::history::EditHistory;

    impl From<EngineError> for PyErr {
        fn from(err: EngineError) -> Self {
            PyValueError::new_err(err.to_string())
        }
    }

    fn to_buffer(image: PyReadonlyArray3<'_, u8>) -> PyResult<PixelBuffer> {
        Ok(PixelBuffer::from_array(image.as_array())?)
    }

    fn to_numpy<'py>(py: Python<'py>, image: &PixelBuffer) -> Bound<'py, PyArray3<u8>> {
        image.to_array().into_pyarray(py)
    }

    // ========================================================================
    // Pixel-wise filters
    // ========================================================================

    /// Invert RGB channels of an RGBA u8 image (H, W, 4). Alpha preserved.
    #[pyfunction]
    pub fn invert<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        Ok(to_numpy(py, &filters::invert(&to_buffer(image)?)))
    }

    /// Convert RGBA u8 image to grayscale using BT.709 luminosity.
    #[pyfunction]
    pub fn grayscale<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        Ok(to_numpy(py, &filters::grayscale(&to_buffer(image)?)))
    }

    /// Scale RGB channels by `1 + factor`; factor must lie in [-1, 1].
    #[pyfunction]
    pub fn brightness<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        factor: f32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = filters::brightness(&to_buffer(image)?, factor)?;
        Ok(to_numpy(py, &result))
    }

    // ========================================================================
    // Convolution
    // ========================================================================

    /// Normalized `size` x `size` Gaussian kernel.
    #[pyfunction]
    pub fn gaussian_kernel<'py>(
        py: Python<'py>,
        size: usize,
        sigma: f32,
    ) -> PyResult<Bound<'py, PyArray2<f32>>> {
        let kernel = Kernel::gaussian(size, sigma)?;
        let array = ndarray::Array2::from_shape_fn((size, size), |(y, x)| kernel.at(y, x));
        Ok(array.into_pyarray(py))
    }

    /// Zero-pad an image by `thickness` pixels on every side.
    #[pyfunction]
    pub fn pad<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        thickness: usize,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        Ok(to_numpy(py, &filters::pad(&to_buffer(image)?, thickness)))
    }

    /// Convolve with a square, odd-sized kernel using zero padding.
    #[pyfunction]
    pub fn convolve<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        kernel: PyReadonlyArray2<'py, f32>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let weights = kernel.as_array();
        let (rows, cols) = weights.dim();
        if rows != cols {
            return Err(PyValueError::new_err(format!(
                "kernel must be square, got {rows}x{cols}"
            )));
        }
        let kernel = Kernel::new(rows, weights.iter().copied().collect())?;
        Ok(to_numpy(py, &filters::convolve(&to_buffer(image)?, &kernel)))
    }

    /// Gaussian blur.
    #[pyfunction]
    #[pyo3(signature = (image, size=3, sigma=1.0))]
    pub fn blur<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        size: usize,
        sigma: f32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let result = filters::blur(&to_buffer(image)?, &BlurParams { size, sigma })?;
        Ok(to_numpy(py, &result))
    }

    // ========================================================================
    // Edge detection
    // ========================================================================

    #[pyfunction]
    pub fn sobel<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        Ok(to_numpy(py, &filters::sobel(&to_buffer(image)?)))
    }

    #[pyfunction]
    pub fn prewitt<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        Ok(to_numpy(py, &filters::prewitt(&to_buffer(image)?)))
    }

    #[pyfunction]
    pub fn laplacian<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        Ok(to_numpy(py, &filters::laplacian(&to_buffer(image)?)))
    }

    #[pyfunction]
    #[pyo3(signature = (image, threshold=FIND_EDGES_THRESHOLD))]
    pub fn find_edges<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        threshold: u8,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        Ok(to_numpy(py, &filters::find_edges(&to_buffer(image)?, threshold)))
    }

    /// Canny edge detection.
    ///
    /// # Arguments
    /// * `sigma` - Standard deviation of the 5x5 smoothing kernel
    /// * `low_ratio` - Lower threshold as a fraction of the upper threshold
    /// * `high_ratio` - Upper threshold as a fraction of the strongest gradient
    #[pyfunction]
    #[pyo3(signature = (image, sigma=2.0, low_ratio=0.4, high_ratio=0.5))]
    pub fn canny<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        sigma: f32,
        low_ratio: f32,
        high_ratio: f32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let params = CannyParams::new(sigma, low_ratio, high_ratio);
        let result = filters::canny(&to_buffer(image)?, &params)?;
        Ok(to_numpy(py, &result))
    }

    // ========================================================================
    // Edit history
    // ========================================================================

    #[pyclass(name = "EditHistory")]
    #[derive(Default)]
    pub struct PyEditHistory {
        inner: EditHistory,
    }

    #[pymethods]
    impl PyEditHistory {
        #[new]
        fn new() -> Self {
            Self::default()
        }

        fn add(&mut self, image: PyReadonlyArray3<'_, u8>, name: String) -> PyResult<()> {
            self.inner.add(&to_buffer(image)?, name);
            Ok(())
        }

        fn undo<'py>(&mut self, py: Python<'py>) -> PyResult<Option<Bound<'py, PyArray3<u8>>>> {
            Ok(self.inner.undo()?.map(|image| to_numpy(py, image)))
        }

        fn redo<'py>(&mut self, py: Python<'py>) -> PyResult<Option<Bound<'py, PyArray3<u8>>>> {
            Ok(self.inner.redo()?.map(|image| to_numpy(py, image)))
        }

        fn reset<'py>(&mut self, py: Python<'py>) -> PyResult<Bound<'py, PyArray3<u8>>> {
            Ok(to_numpy(py, self.inner.reset()?))
        }

        fn clear(&mut self) {
            self.inner.clear();
        }

        fn current<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray3<u8>>> {
            Ok(to_numpy(py, self.inner.current_image()?))
        }

        fn name(&self) -> PyResult<String> {
            Ok(self.inner.name()?.to_owned())
        }

        fn names(&self) -> Vec<String> {
            self.inner.names().map(str::to_owned).collect()
        }

        fn can_undo(&self) -> bool {
            self.inner.can_undo()
        }

        fn can_redo(&self) -> bool {
            self.inner.can_redo()
        }

        fn __len__(&self) -> usize {
            self.inner.len()
        }
    }

    #[pymodule]
    pub fn imagetoolkit(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Pixel-wise filters
        m.add_function(wrap_pyfunction!(invert, m)?)?;
        m.add_function(wrap_pyfunction!(grayscale, m)?)?;
        m.add_function(wrap_pyfunction!(brightness, m)?)?;

        // Convolution
        m.add_function(wrap_pyfunction!(gaussian_kernel, m)?)?;
        m.add_function(wrap_pyfunction!(pad, m)?)?;
        m.add_function(wrap_pyfunction!(convolve, m)?)?;
        m.add_function(wrap_pyfunction!(blur, m)?)?;

        // Edge detection
        m.add_function(wrap_pyfunction!(sobel, m)?)?;
        m.add_function(wrap_pyfunction!(prewitt, m)?)?;
        m.add_function(wrap_pyfunction!(laplacian, m)?)?;
        m.add_function(wrap_pyfunction!(find_edges, m)?)?;
        m.add_function(wrap_pyfunction!(canny, m)?)?;

        // History
        m.add_class::<PyEditHistory>()?;

        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::imagetoolkit;
