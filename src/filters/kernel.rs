//! Square convolution kernels.
//!
//! Provides the normalized Gaussian generator and the fixed 3x3
//! operators used by the edge detectors.

use crate::config::{validate_kernel_size, validate_sigma};
use crate::error::{EngineError, Result};

/// A square, odd-sized matrix of weights stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f32>,
}

impl Kernel {
    /// Build a kernel from row-major weights.
    ///
    /// # Errors
    /// `InvalidParameter` if `size` is even or zero, or the weight count is not `size * size`.
    pub fn new(size: usize, weights: Vec<f32>) -> Result<Self> {
        validate_kernel_size(size)?;
        if size.checked_mul(size) != Some(weights.len()) {
            return Err(EngineError::invalid(
                "weights",
                format!("expected {size}x{size} weights, got {}", weights.len()),
            ));
        }
        Ok(Self { size, weights })
    }

    fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self {
            size: 3,
            weights: rows.iter().flatten().copied().collect(),
        }
    }

    /// Normalized 2D Gaussian kernel.
    ///
    /// For offsets x, y in [-size/2, size/2] the raw weight is
    /// `exp(-(x² + y²) / 2σ²)`; the result is scaled to sum to 1, so the
    /// usual `1 / 2πσ²` factor is left out. As sigma approaches zero the
    /// kernel approaches the identity.
    ///
    /// # Errors
    /// `InvalidParameter` if `size` is even or zero, or sigma is not a
    /// positive finite number.
    pub fn gaussian(size: usize, sigma: f32) -> Result<Self> {
        validate_kernel_size(size)?;
        validate_sigma(sigma)?;

        let center = (size / 2) as isize;
        let two_variance = 2.0 * f64::from(sigma) * f64::from(sigma);
        let raw: Vec<f64> = (-center..=center)
            .flat_map(|y| (-center..=center).map(move |x| (x, y)))
            .map(|(x, y)| {
                let r = (x * x + y * y) as f64;
                (-r / two_variance).exp()
            })
            .collect();

        // the centre weight is exp(0) = 1, so the sum is at least 1
        let sum: f64 = raw.iter().sum();
        let weights = raw.iter().map(|w| (w / sum) as f32).collect();

        Ok(Self { size, weights })
    }

    /// Sobel horizontal operator.
    pub fn sobel_x() -> Self {
        Self::from_rows([[1.0, 0.0, -1.0], [2.0, 0.0, -2.0], [1.0, 0.0, -1.0]])
    }

    /// Sobel vertical operator.
    pub fn sobel_y() -> Self {
        Self::from_rows([[1.0, 2.0, 1.0], [0.0, 0.0, 0.0], [-1.0, -2.0, -1.0]])
    }

    /// Prewitt horizontal operator.
    pub fn prewitt_x() -> Self {
        Self::from_rows([[1.0, 0.0, -1.0], [1.0, 0.0, -1.0], [1.0, 0.0, -1.0]])
    }

    /// Prewitt vertical operator.
    pub fn prewitt_y() -> Self {
        Self::from_rows([[1.0, 1.0, 1.0], [0.0, 0.0, 0.0], [-1.0, -1.0, -1.0]])
    }

    /// 8-neighbour Laplacian operator.
    pub fn laplacian() -> Self {
        Self::from_rows([[-1.0, -1.0, -1.0], [-1.0, 8.0, -1.0], [-1.0, -1.0, -1.0]])
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Half the kernel width, i.e. the padding a full convolution needs.
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Weight at row `ky`, column `kx`.
    #[inline]
    pub fn at(&self, ky: usize, kx: usize) -> f32 {
        self.weights[ky * self.size + kx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gaussian_sums_to_one() {
        for (size, sigma) in [(1, 1.0), (3, 1.0), (5, 1.4), (7, 3.0)] {
            let k = Kernel::gaussian(size, sigma).unwrap();
            assert_eq!(k.weights().len(), size * size);
            let sum: f32 = k.weights().iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_gaussian_is_symmetric_and_peaked() {
        let k = Kernel::gaussian(5, 1.0).unwrap();
        let center = k.at(2, 2);
        for ky in 0..5 {
            for kx in 0..5 {
                assert!(k.at(ky, kx) <= center);
                assert_relative_eq!(k.at(ky, kx), k.at(4 - ky, 4 - kx));
                assert_relative_eq!(k.at(ky, kx), k.at(kx, ky));
            }
        }
    }

    #[test]
    fn test_gaussian_tiny_sigma_is_identity() {
        for sigma in [1e-23, f32::MIN_POSITIVE, 1e-45] {
            let k = Kernel::gaussian(3, sigma).unwrap();
            assert!(k.weights().iter().all(|w| w.is_finite()));
            let sum: f32 = k.weights().iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
            assert_eq!(k.at(1, 1), 1.0);
            assert_eq!(k.at(0, 0), 0.0);
        }
    }

    #[test]
    fn test_gaussian_size_one_is_identity() {
        let k = Kernel::gaussian(1, 2.0).unwrap();
        assert_eq!(k.weights(), &[1.0]);
    }

    #[test]
    fn test_gaussian_rejects_bad_parameters() {
        assert!(Kernel::gaussian(0, 1.0).is_err());
        assert!(Kernel::gaussian(4, 1.0).is_err());
        assert!(Kernel::gaussian(3, 0.0).is_err());
        assert!(Kernel::gaussian(3, -1.0).is_err());
    }

    #[test]
    fn test_new_checks_weight_count() {
        assert!(Kernel::new(3, vec![0.0; 9]).is_ok());
        assert!(Kernel::new(3, vec![0.0; 8]).is_err());
    }

    #[test]
    fn test_operator_layout() {
        let sx = Kernel::sobel_x();
        assert_eq!(sx.at(1, 0), 2.0);
        assert_eq!(sx.at(1, 2), -2.0);
        let sy = Kernel::sobel_y();
        assert_eq!(sy.at(0, 1), 2.0);
        assert_eq!(sy.at(2, 1), -2.0);
        let lap = Kernel::laplacian();
        assert_eq!(lap.weights().iter().sum::<f32>(), 0.0);
        assert_eq!(lap.radius(), 1);
    }
}
