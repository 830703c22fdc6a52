//! Rectangular crops centered on a pixel.
//!
//! A [`CropSpec`] describes the half-open window
//! `[y - y_margin, y + y_margin) × [x - x_margin, x + x_margin)`. Windows that
//! run past the edge of the source are clipped to the array; only a window
//! with no pixels left after clipping is rejected.

use ndarray::{s, Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::{BeamError, Result};
use crate::image_proc::centroid::Centroid;

/// Center point plus half-widths of a crop window, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropSpec {
    /// Column of the window center
    pub center_x: usize,
    /// Row of the window center
    pub center_y: usize,
    /// Half-width along x
    pub x_margin: usize,
    /// Half-height along y
    pub y_margin: usize,
}

impl CropSpec {
    pub fn new(center_x: usize, center_y: usize, x_margin: usize, y_margin: usize) -> Self {
        Self {
            center_x,
            center_y,
            x_margin,
            y_margin,
        }
    }

    /// Window of the given half-widths around a located centroid.
    pub fn around(centroid: Centroid, x_margin: usize, y_margin: usize) -> Self {
        Self::new(centroid.x, centroid.y, x_margin, y_margin)
    }

    /// Row and column ranges of the window after clipping to `(height, width)`.
    pub fn clipped_ranges(&self, dim: (usize, usize)) -> Result<(Range<usize>, Range<usize>)> {
        let (height, width) = dim;
        let rows = clip_axis("crop rows", self.center_y, self.y_margin, height)?;
        let cols = clip_axis("crop columns", self.center_x, self.x_margin, width)?;
        Ok((rows, cols))
    }

    /// True when the unclipped window lies entirely inside `(height, width)`.
    pub fn fits_within(&self, dim: (usize, usize)) -> bool {
        let (height, width) = dim;
        self.center_y >= self.y_margin
            && self.center_x >= self.x_margin
            && self.center_y + self.y_margin <= height
            && self.center_x + self.x_margin <= width
    }
}

fn clip_axis(what: &'static str, center: usize, margin: usize, limit: usize) -> Result<Range<usize>> {
    let start = center.saturating_sub(margin);
    let end = center.saturating_add(margin).min(limit);
    if start >= end {
        return Err(BeamError::Bounds {
            what,
            start: center as i64 - margin as i64,
            end: center as i64 + margin as i64,
            limit,
        });
    }
    Ok(start..end)
}

/// Borrow the clipped window of `image` described by `spec`.
pub fn crop_view<'a, T>(image: ArrayView2<'a, T>, spec: &CropSpec) -> Result<ArrayView2<'a, T>> {
    let (rows, cols) = spec.clipped_ranges(image.dim())?;
    Ok(image.slice_move(s![rows, cols]))
}

/// Copy the clipped window of `image` described by `spec` into a new array.
pub fn crop<T: Clone>(image: &ArrayView2<'_, T>, spec: &CropSpec) -> Result<Array2<T>> {
    Ok(crop_view(image.view(), spec)?.to_owned())
}
