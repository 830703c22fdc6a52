//! Beam location from projected intensity.
//!
//! The beam center is taken as the position of maximum projected intensity
//! along each axis: `x = argmax(column sums)`, `y = argmax(row sums)`. This is
//! a peak estimate, not an intensity-weighted center of mass.

use ndarray::ArrayView1;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BeamError, Result};
use crate::image_proc::profile::{projection_x, projection_y};

/// Integer pixel position of the beam, relative to the analyzed array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Centroid {
    /// Column index
    pub x: usize,
    /// Row index
    pub y: usize,
}

impl fmt::Display for Centroid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Index of the largest value, lowest index on ties.
///
/// NaN never compares greater, so it can never be selected. Returns `None`
/// for an empty or all-NaN input.
pub fn argmax(values: &ArrayView1<'_, f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

/// Locate the beam in `image` as the argmax of its column and row sums.
pub fn locate(image: &ArrayView2<'_, f64>) -> Result<Centroid> {
    let x = argmax(&projection_x(image).view());
    let y = argmax(&projection_y(image).view());
    match (x, y) {
        (Some(x), Some(y)) => Ok(Centroid { x, y }),
        _ => {
            let (height, width) = image.dim();
            Err(BeamError::Input(format!(
                "cannot locate a centroid in a {width}x{height} image without finite pixels"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_single_bright_pixel() {
        for &(x0, y0) in &[(0usize, 0usize), (7, 3), (11, 8)] {
            let mut image = Array2::<f64>::zeros((9, 12));
            image[[y0, x0]] = 100.0;
            let c = locate(&image.view()).unwrap();
            assert_eq!(c, Centroid { x: x0, y: y0 });
        }
    }

    #[test]
    fn test_ties_resolve_to_lowest_index() {
        let image = array![[1.0, 5.0, 5.0], [1.0, 5.0, 5.0]];
        let c = locate(&image.view()).unwrap();
        assert_eq!(c, Centroid { x: 1, y: 0 });
    }

    #[test]
    fn test_uses_projection_not_brightest_pixel() {
        // Column 1 has the single brightest pixel but column 3 holds more total flux.
        let image = array![
            [0.0, 9.0, 0.0, 4.0],
            [0.0, 0.0, 0.0, 4.0],
            [0.0, 0.0, 0.0, 4.0],
        ];
        let c = locate(&image.view()).unwrap();
        assert_eq!(c.x, 3);
        assert_eq!(c.y, 0);
    }

    #[test]
    fn test_argmax_skips_nan() {
        let v = array![f64::NAN, 2.0, 3.0, f64::NAN];
        assert_eq!(argmax(&v.view()), Some(2));
        let all_nan = array![f64::NAN, f64::NAN];
        assert_eq!(argmax(&all_nan.view()), None);
    }

    #[test]
    fn test_empty_image_is_error() {
        let image = Array2::<f64>::zeros((0, 3));
        assert!(locate(&image.view()).is_err());
    }
}
