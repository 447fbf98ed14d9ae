//! Canny edge detection.
//!
//! Stages, each consuming the previous stage's output:
//! 1. grayscale
//! 2. 5x5 Gaussian blur with the caller's sigma
//! 3. Sobel gradients Gx, Gy on a signed float plane
//! 4. magnitude and its global maximum (a flat image stops here, all black)
//! 5. non-maximum suppression along the quantized gradient axis
//! 6. hysteresis thresholding with an explicit worklist
//!
//! The output is a binary RGBA image: 255 on edges, 0 elsewhere, alpha 255.

use std::collections::VecDeque;

use log::{debug, trace};
use ndarray::Array2;

use super::blur::blur_with_kernel;
use super::edge::Gradient;
use super::grayscale::{grayscale, intensity_plane};
use super::kernel::Kernel;
use crate::buffer::{PixelBuffer, CHANNELS};
use crate::config::{CannyParams, CANNY_BLUR_SIZE};
use crate::error::Result;

/// Offsets of the 8-connected neighbourhood as (dx, dy).
const NEIGHBOURS_8: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Undirected gradient orientation quantized to a compass axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradientAxis {
    /// East-West
    Deg0,
    /// North-East / South-West
    Deg45,
    /// North-South
    Deg90,
    /// North-West / South-East
    Deg135,
}

impl GradientAxis {
    /// Quantize the gradient of the Sobel operators.
    ///
    /// `gx` grows with intensity towards the west and `gy` with intensity
    /// towards the north (image rows run southward), so the angle is taken
    /// in an east/north frame as `atan2(gy, -gx)`, folded into [0°, 180°).
    pub fn from_gradient(gx: f32, gy: f32) -> Self {
        let degrees = gy.atan2(-gx).to_degrees();
        let folded = if degrees < 0.0 { degrees + 180.0 } else { degrees };

        if !(22.5..157.5).contains(&folded) {
            Self::Deg0
        } else if folded < 67.5 {
            Self::Deg45
        } else if folded < 112.5 {
            Self::Deg90
        } else {
            Self::Deg135
        }
    }

    /// The two neighbours along the axis as (dx, dy), earlier in raster order first.
    fn neighbours(self) -> [(isize, isize); 2] {
        match self {
            Self::Deg0 => [(-1, 0), (1, 0)],
            Self::Deg45 => [(1, -1), (-1, 1)],
            Self::Deg90 => [(0, -1), (0, 1)],
            Self::Deg135 => [(-1, -1), (1, 1)],
        }
    }
}

#[inline]
fn offset(x: usize, y: usize, (dx, dy): (isize, isize), width: usize, height: usize) -> Option<(usize, usize)> {
    let nx = x.checked_add_signed(dx)?;
    let ny = y.checked_add_signed(dy)?;
    (nx < width && ny < height).then_some((nx, ny))
}

/// Thin edges to local maxima along the gradient axis.
///
/// A pixel survives when its magnitude is at least that of the neighbour
/// earlier in raster order and strictly greater than the later one, so a
/// plateau of equal magnitudes keeps a single pixel. Neighbours outside
/// the image are skipped, and only that one comparison is dropped.
///
/// Gradients are taken over a replicate-padded plane, so at the image
/// border the outermost pixel sees a flat neighbour and its magnitude drops.
/// A step between the last two columns therefore thins onto the
/// second-to-last column instead of the last one.
pub fn non_maximum_suppression(gradient: &Gradient, magnitude: &Array2<f32>) -> Array2<f32> {
    let (height, width) = magnitude.dim();

    Array2::from_shape_fn((height, width), |(y, x)| {
        let g = magnitude[[y, x]];
        let axis = GradientAxis::from_gradient(gradient.gx[[y, x]], gradient.gy[[y, x]]);
        let [before, after] = axis.neighbours();

        let sample = |step| offset(x, y, step, width, height).map(|(nx, ny)| magnitude[[ny, nx]]);
        let keep = sample(before).map_or(true, |n| g >= n) && sample(after).map_or(true, |n| g > n);

        if keep {
            g
        } else {
            0.0
        }
    })
}

/// Two-threshold edge classification.
///
/// Pixels above `upper` are strong edges. Pixels in [`lower`, `upper`] are
/// weak and become edges only when 8-connected, transitively, to a strong
/// pixel. Zero magnitudes are never edges.
///
/// Promotion runs breadth-first from every strong pixel with a queue, so
/// memory is bounded by the image size and no recursion is involved.
pub fn hysteresis(magnitude: &Array2<f32>, lower: f32, upper: f32) -> Array2<bool> {
    let (height, width) = magnitude.dim();
    let mut edges = Array2::from_elem((height, width), false);
    let mut queue = VecDeque::new();

    for ((y, x), &g) in magnitude.indexed_iter() {
        if g > upper {
            edges[[y, x]] = true;
            queue.push_back((x, y));
        }
    }
    let strong = queue.len();

    let mut promoted = 0usize;
    while let Some((x, y)) = queue.pop_front() {
        for step in NEIGHBOURS_8 {
            let Some((nx, ny)) = offset(x, y, step, width, height) else {
                continue;
            };
            let g = magnitude[[ny, nx]];
            if !edges[[ny, nx]] && g > 0.0 && g >= lower && g <= upper {
                edges[[ny, nx]] = true;
                promoted += 1;
                queue.push_back((nx, ny));
            }
        }
    }

    trace!("hysteresis: {strong} strong, {promoted} weak promoted");
    edges
}

fn mask_to_buffer(mask: &Array2<bool>) -> PixelBuffer {
    let (height, width) = mask.dim();
    let mut data = Vec::with_capacity(width * height * CHANNELS);
    for &edge in mask.iter() {
        let v = if edge { 255 } else { 0 };
        data.extend_from_slice(&[v, v, v, 255]);
    }
    PixelBuffer::from_parts(width, height, data)
}

/// Run the full Canny pipeline.
///
/// The upper threshold is `high_ratio * max(G)` and the lower one
/// `low_ratio * upper`.
///
/// # Errors
/// `InvalidParameter` if sigma is not positive or a ratio is outside [0, 1].
pub fn canny(image: &PixelBuffer, params: &CannyParams) -> Result<PixelBuffer> {
    params.validate()?;
    let (width, height) = (image.width(), image.height());
    debug!(
        "canny: {width}x{height}, sigma={}, low={}, high={}",
        params.sigma, params.low_ratio, params.high_ratio
    );

    let gray = grayscale(image);
    let blurred = blur_with_kernel(&gray, &Kernel::gaussian(CANNY_BLUR_SIZE, params.sigma)?);
    let plane = intensity_plane(&blurred);
    let gradient = Gradient::compute(plane.view(), &Kernel::sobel_x(), &Kernel::sobel_y());

    let magnitude = gradient.magnitude();
    let max = magnitude.iter().copied().fold(0.0f32, f32::max);
    if max == 0.0 {
        debug!("canny: flat input, no edges");
        return PixelBuffer::filled(width, height, [0, 0, 0, 255]);
    }

    let thinned = non_maximum_suppression(&gradient, &magnitude);

    let upper = params.high_ratio * max;
    let lower = params.low_ratio * upper;
    trace!("canny: max={max}, upper={upper}, lower={lower}");

    Ok(mask_to_buffer(&hysteresis(&thinned, lower, upper)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertical_step(width: usize, height: usize, split: usize) -> PixelBuffer {
        let mut data = Vec::with_capacity(width * height * 4);
        for _ in 0..height {
            for x in 0..width {
                let v = if x < split { 0 } else { 255 };
                data.extend_from_slice(&[v, v, v, 255]);
            }
        }
        PixelBuffer::from_raw(width, height, data).unwrap()
    }

    #[test]
    fn test_canny_single_pixel_vertical_line() {
        let _ = env_logger::builder().is_test(true).try_init();

        let img = vertical_step(10, 6, 5);
        let params = CannyParams::new(2.0, 0.1, 0.3);
        let out = canny(&img, &params).unwrap();

        assert_eq!((out.width(), out.height()), (10, 6));
        for y in 0..6 {
            for x in 0..10 {
                let expected = if x == 5 { 255 } else { 0 };
                assert_eq!(
                    out.pixel(x, y),
                    Some([expected, expected, expected, 255]),
                    "pixel ({x}, {y})"
                );
            }
        }
    }

    #[test]
    fn test_canny_step_at_last_column_lands_inside() {
        let img = vertical_step(9, 6, 8);
        let out = canny(&img, &CannyParams::new(2.0, 0.1, 0.3)).unwrap();

        for y in 0..6 {
            assert_eq!(out.pixel(7, y), Some([255, 255, 255, 255]), "row {y}");
            assert_eq!(out.pixel(8, y), Some([0, 0, 0, 255]), "row {y}");
            let edges = (0..9).filter(|&x| out.pixel(x, y).unwrap()[0] == 255).count();
            assert_eq!(edges, 1, "row {y}");
        }
    }

    #[test]
    fn test_canny_uniform_is_black() {
        let img = PixelBuffer::filled(8, 8, [200, 10, 90, 255]).unwrap();
        let out = canny(&img, &CannyParams::default()).unwrap();
        assert_eq!(out, PixelBuffer::filled(8, 8, [0, 0, 0, 255]).unwrap());
    }

    #[test]
    fn test_canny_empty_image() {
        let out = canny(&PixelBuffer::new(0, 0).unwrap(), &CannyParams::default()).unwrap();
        assert_eq!(out.data().len(), 0);
    }

    #[test]
    fn test_canny_rejects_bad_ratios() {
        let img = vertical_step(4, 4, 2);
        assert!(canny(&img, &CannyParams::new(1.0, 0.2, 1.2)).is_err());
        assert!(canny(&img, &CannyParams::new(-1.0, 0.2, 0.5)).is_err());
    }

    #[test]
    fn test_gradient_axis_quantization() {
        // intensity rising eastward
        assert_eq!(GradientAxis::from_gradient(-4.0, 0.0), GradientAxis::Deg0);
        // rising westward, same axis
        assert_eq!(GradientAxis::from_gradient(4.0, 0.0), GradientAxis::Deg0);
        // rising northward
        assert_eq!(GradientAxis::from_gradient(0.0, 4.0), GradientAxis::Deg90);
        // rising towards the north-east
        assert_eq!(GradientAxis::from_gradient(-4.0, 4.0), GradientAxis::Deg45);
        // rising towards the south-west, same axis
        assert_eq!(GradientAxis::from_gradient(4.0, -4.0), GradientAxis::Deg45);
        // rising towards the north-west
        assert_eq!(GradientAxis::from_gradient(4.0, 4.0), GradientAxis::Deg135);
    }

    #[test]
    fn test_nms_keeps_ridge_only() {
        let magnitude = Array2::from_shape_vec((1, 5), vec![1.0, 3.0, 7.0, 3.0, 1.0]).unwrap();
        let gradient = Gradient {
            gx: Array2::from_elem((1, 5), -1.0),
            gy: Array2::zeros((1, 5)),
        };
        let thin = non_maximum_suppression(&gradient, &magnitude);
        assert_eq!(thin.as_slice().unwrap(), &[0.0, 0.0, 7.0, 0.0, 0.0]);
    }

    #[test]
    fn test_nms_plateau_keeps_one_pixel() {
        let magnitude = Array2::from_shape_vec((1, 4), vec![1.0, 5.0, 5.0, 1.0]).unwrap();
        let gradient = Gradient {
            gx: Array2::from_elem((1, 4), -1.0),
            gy: Array2::zeros((1, 4)),
        };
        let thin = non_maximum_suppression(&gradient, &magnitude);
        assert_eq!(thin.as_slice().unwrap(), &[0.0, 0.0, 5.0, 0.0]);
    }

    #[test]
    fn test_nms_border_skips_missing_side() {
        let gradient = Gradient {
            gx: Array2::from_elem((1, 2), -1.0),
            gy: Array2::zeros((1, 2)),
        };

        let falling = Array2::from_shape_vec((1, 2), vec![5.0, 1.0]).unwrap();
        let thin = non_maximum_suppression(&gradient, &falling);
        assert_eq!(thin.as_slice().unwrap(), &[5.0, 0.0]);

        let rising = Array2::from_shape_vec((1, 2), vec![1.0, 5.0]).unwrap();
        let thin = non_maximum_suppression(&gradient, &rising);
        assert_eq!(thin.as_slice().unwrap(), &[0.0, 5.0]);

        // a lone pixel has no neighbours to compare against
        let single = Array2::from_shape_vec((1, 1), vec![3.0]).unwrap();
        let lone = Gradient {
            gx: Array2::from_elem((1, 1), -1.0),
            gy: Array2::zeros((1, 1)),
        };
        let thin = non_maximum_suppression(&lone, &single);
        assert_eq!(thin[[0, 0]], 3.0);
    }

    #[test]
    fn test_hysteresis_follows_weak_chain() {
        let magnitude =
            Array2::from_shape_vec((1, 6), vec![200.0, 50.0, 50.0, 0.0, 50.0, 10.0]).unwrap();
        let edges = hysteresis(&magnitude, 40.0, 100.0);
        assert_eq!(
            edges.as_slice().unwrap(),
            &[true, true, true, false, false, false]
        );
    }

    #[test]
    fn test_hysteresis_diagonal_connectivity() {
        let mut magnitude = Array2::<f32>::zeros((3, 3));
        magnitude[[0, 0]] = 150.0;
        magnitude[[1, 1]] = 60.0;
        magnitude[[2, 2]] = 60.0;
        let edges = hysteresis(&magnitude, 40.0, 100.0);
        assert!(edges[[0, 0]] && edges[[1, 1]] && edges[[2, 2]]);
        assert!(!edges[[0, 1]]);
    }

    #[test]
    fn test_hysteresis_upper_bound_is_weak() {
        let magnitude = Array2::from_shape_vec((1, 2), vec![100.0, 100.0]).unwrap();
        let edges = hysteresis(&magnitude, 40.0, 100.0);
        assert!(edges.iter().all(|&e| !e));
    }

    #[test]
    fn test_hysteresis_long_chain_without_recursion() {
        let len = 200_000;
        let mut magnitude = Array2::from_elem((1, len), 50.0f32);
        magnitude[[0, 0]] = 200.0;
        let edges = hysteresis(&magnitude, 40.0, 100.0);
        assert!(edges.iter().all(|&e| e));
    }
}
