//! Tunable parameters for the user-facing filters.
//!
//! Defaults match the editor's toolbar presets. Each struct validates
//! itself before a filter runs so a bad slider value never reaches the
//! pixel loops.

use std::ops::RangeInclusive;

use crate::error::{EngineError, Result};

/// Accepted brightness factors.
pub const BRIGHTNESS_RANGE: RangeInclusive<f32> = -1.0..=1.0;

/// Kernel size used by the Canny smoothing stage.
pub const CANNY_BLUR_SIZE: usize = 5;

/// Parameters of the Canny edge detector.
///
/// Ratios are fractions in [0, 1]. The upper threshold is
/// `high_ratio * max(G)` and the lower threshold is `low_ratio * upper`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CannyParams {
    /// Standard deviation of the 5x5 smoothing kernel.
    pub sigma: f32,
    pub low_ratio: f32,
    pub high_ratio: f32,
}

impl Default for CannyParams {
    fn default() -> Self {
        Self {
            sigma: 2.0,
            low_ratio: 0.4,
            high_ratio: 0.5,
        }
    }
}

impl CannyParams {
    pub fn new(sigma: f32, low_ratio: f32, high_ratio: f32) -> Self {
        Self {
            sigma,
            low_ratio,
            high_ratio,
        }
    }

    /// Build parameters from slider positions expressed in percent (0-100).
    pub fn from_percent(sigma: f32, low_percent: f32, high_percent: f32) -> Self {
        Self::new(sigma, low_percent / 100.0, high_percent / 100.0)
    }

    pub fn validate(&self) -> Result<()> {
        validate_sigma(self.sigma)?;
        validate_ratio("low_ratio", self.low_ratio)?;
        validate_ratio("high_ratio", self.high_ratio)
    }
}

/// Parameters of the user-facing Gaussian blur.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlurParams {
    /// Odd kernel size.
    pub size: usize,
    pub sigma: f32,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            size: 3,
            sigma: 1.0,
        }
    }
}

impl BlurParams {
    pub fn validate(&self) -> Result<()> {
        validate_kernel_size(self.size)?;
        validate_sigma(self.sigma)
    }
}

/// Limits applied when a file is opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportLimits {
    /// Longest allowed side in pixels; larger images are downscaled.
    pub max_side: u32,
}

impl Default for ImportLimits {
    fn default() -> Self {
        Self { max_side: 1000 }
    }
}

pub(crate) fn validate_brightness(factor: f32) -> Result<()> {
    if !BRIGHTNESS_RANGE.contains(&factor) {
        return Err(EngineError::invalid(
            "factor",
            format!("expected a value in [-1, 1], got {factor}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_kernel_size(size: usize) -> Result<()> {
    if size == 0 || size % 2 == 0 {
        return Err(EngineError::invalid(
            "size",
            format!("kernel size must be odd and positive, got {size}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_sigma(sigma: f32) -> Result<()> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(EngineError::invalid(
            "sigma",
            format!("expected a positive value, got {sigma}"),
        ));
    }
    Ok(())
}

fn validate_ratio(name: &'static str, ratio: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(EngineError::invalid(
            name,
            format!("expected a fraction in [0, 1], got {ratio}"),
        ));
    }
    Ok(())
}
