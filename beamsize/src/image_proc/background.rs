//! Background frame subtraction.
//!
//! A background frame (beam blocked, same exposure) is subtracted pixel by
//! pixel from the beam frame. Differences are clamped at zero.

use ndarray::{Array2, ArrayView2, Zip};

use crate::error::{BeamError, Result};

/// Subtract `background` from `image`, clamping negative differences to zero.
///
/// Both frames must share the same `(height, width)`.
pub fn subtract_background(
    image: &ArrayView2<'_, f64>,
    background: &ArrayView2<'_, f64>,
) -> Result<Array2<f64>> {
    if image.dim() != background.dim() {
        return Err(BeamError::ShapeMismatch {
            expected: image.dim(),
            actual: background.dim(),
        });
    }

    Ok(Zip::from(image)
        .and(background)
        .map_collect(|&signal, &dark| (signal - dark).max(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_subtracts_and_clamps() {
        let image = array![[10.0, 5.0], [3.0, 8.0]];
        let background = array![[2.0, 6.0], [3.0, 1.0]];
        let out = subtract_background(&image.view(), &background.view()).unwrap();
        assert_eq!(out, array![[8.0, 0.0], [0.0, 7.0]]);
    }

    #[test]
    fn test_shape_mismatch() {
        let image = Array2::<f64>::zeros((4, 5));
        let background = Array2::<f64>::zeros((5, 4));
        let err = subtract_background(&image.view(), &background.view()).unwrap_err();
        assert!(matches!(
            err,
            BeamError::ShapeMismatch {
                expected: (4, 5),
                actual: (5, 4)
            }
        ));
    }
}
