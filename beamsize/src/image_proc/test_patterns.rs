//! Synthetic beam patterns for validating the analysis pipeline
//!
//! Provides Gaussian beams and simple 1D profiles whose FWHM is known in
//! closed form, plus a quantizer for turning them into integer sensor frames
//! that can be written to disk with the `image` crate.

use ndarray::{Array1, Array2};
use num_traits::{Bounded, NumCast, Zero};

/// FWHM of a Gaussian in units of its standard deviation: 2·sqrt(2·ln 2).
pub const GAUSSIAN_FWHM_PER_SIGMA: f64 = 2.354_820_045_030_949;

/// Convert a Gaussian standard deviation to its FWHM
pub fn sigma_to_fwhm(sigma: f64) -> f64 {
    GAUSSIAN_FWHM_PER_SIGMA * sigma
}

/// Generate an elliptical 2D Gaussian beam
///
/// # Arguments
/// * `width` - Width of the frame in pixels
/// * `height` - Height of the frame in pixels
/// * `center` - Beam center as (x, y) in pixels
/// * `sigma` - Standard deviations as (sigma_x, sigma_y) in pixels
/// * `amplitude` - Peak value at the beam center
/// * `offset` - Constant pedestal added to every pixel
///
/// # Returns
/// Array2 indexed `[y, x]` with shape `(height, width)`
pub fn generate_gaussian_beam(
    width: usize,
    height: usize,
    center: (f64, f64),
    sigma: (f64, f64),
    amplitude: f64,
    offset: f64,
) -> Array2<f64> {
    let (cx, cy) = center;
    let (sx, sy) = sigma;

    // Separable: evaluate each axis once and take the outer product.
    let gx = Array1::from_shape_fn(width, |x| {
        let d = x as f64 - cx;
        (-(d * d) / (2.0 * sx * sx)).exp()
    });
    let gy = Array1::from_shape_fn(height, |y| {
        let d = y as f64 - cy;
        (-(d * d) / (2.0 * sy * sy)).exp()
    });

    Array2::from_shape_fn((height, width), |(y, x)| offset + amplitude * gy[y] * gx[x])
}

/// Generate a sampled 1D Gaussian profile
pub fn generate_gaussian_profile(len: usize, center: f64, sigma: f64, amplitude: f64) -> Array1<f64> {
    Array1::from_shape_fn(len, |i| {
        let d = i as f64 - center;
        amplitude * (-(d * d) / (2.0 * sigma * sigma)).exp()
    })
}

/// Generate a symmetric triangular profile
///
/// The triangle rises linearly from zero at `center - half_base` to
/// `amplitude` at `center` and falls back to zero at `center + half_base`,
/// so its FWHM is exactly `half_base`.
pub fn generate_triangle_profile(
    len: usize,
    center: f64,
    half_base: f64,
    amplitude: f64,
) -> Array1<f64> {
    Array1::from_shape_fn(len, |i| {
        let d = (i as f64 - center).abs();
        (amplitude * (1.0 - d / half_base)).max(0.0)
    })
}

/// Quantize a floating-point frame into an integer sensor type
///
/// Values are rounded and saturated to the range of `T`.
///
/// # Type Parameters
/// * `T` - Target pixel type such as `u8` or `u16`
pub fn quantize<T>(frame: &Array2<f64>) -> Array2<T>
where
    T: Clone + Zero + NumCast + Bounded,
{
    let lo: f64 = num_traits::cast(T::min_value()).unwrap_or(0.0);
    let hi: f64 = num_traits::cast(T::max_value()).unwrap_or(f64::MAX);
    frame.mapv(|v| {
        let clamped = if v.is_nan() { lo } else { v.round().clamp(lo, hi) };
        num_traits::cast(clamped).unwrap_or_else(T::zero)
    })
}
