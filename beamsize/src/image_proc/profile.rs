//! 1D intensity profiles extracted from a beam image.
//!
//! Two flavours are provided:
//!
//! - **Projections** sum the whole image along one axis.
//! - **Lineouts** sum a narrow band of `2 * band + 1` rows (or columns)
//!   centered on a chosen pixel; `band = 0` is a single-pixel lineout.
//!
//! Both produce one value per pixel along the profiled axis.

use ndarray::{s, Array1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

use crate::error::{BeamError, Result};

/// Transverse axis a profile runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileAxis {
    /// Horizontal: one value per column.
    X,
    /// Vertical: one value per row.
    Y,
}

impl fmt::Display for ProfileAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

/// Sum over rows: one value per column.
pub fn projection_x(image: &ArrayView2<'_, f64>) -> Array1<f64> {
    image.sum_axis(Axis(0))
}

/// Sum over columns: one value per row.
pub fn projection_y(image: &ArrayView2<'_, f64>) -> Array1<f64> {
    image.sum_axis(Axis(1))
}

/// Projection of `image` along `axis`.
pub fn project(image: &ArrayView2<'_, f64>, axis: ProfileAxis) -> Array1<f64> {
    match axis {
        ProfileAxis::X => projection_x(image),
        ProfileAxis::Y => projection_y(image),
    }
}

/// Elementwise sum of rows `ypixel - band ..= ypixel + band`.
pub fn lineout_x(image: &ArrayView2<'_, f64>, ypixel: usize, band: usize) -> Result<Array1<f64>> {
    let rows = band_range("lineout_x rows", ypixel, band, image.nrows())?;
    Ok(image.slice(s![rows, ..]).sum_axis(Axis(0)))
}

/// Elementwise sum of columns `xpixel - band ..= xpixel + band`.
pub fn lineout_y(image: &ArrayView2<'_, f64>, xpixel: usize, band: usize) -> Result<Array1<f64>> {
    let cols = band_range("lineout_y columns", xpixel, band, image.ncols())?;
    Ok(image.slice(s![.., cols]).sum_axis(Axis(1)))
}

/// Lineout along `axis` through `pixel` (a row for x, a column for y).
pub fn lineout(
    image: &ArrayView2<'_, f64>,
    axis: ProfileAxis,
    pixel: usize,
    band: usize,
) -> Result<Array1<f64>> {
    match axis {
        ProfileAxis::X => lineout_x(image, pixel, band),
        ProfileAxis::Y => lineout_y(image, pixel, band),
    }
}

fn band_range(what: &'static str, center: usize, band: usize, limit: usize) -> Result<Range<usize>> {
    let end = center.saturating_add(band).saturating_add(1);
    match center.checked_sub(band) {
        Some(start) if end <= limit => Ok(start..end),
        _ => Err(BeamError::Bounds {
            what,
            start: center as i64 - band as i64,
            end: end as i64,
            limit,
        }),
    }
}
