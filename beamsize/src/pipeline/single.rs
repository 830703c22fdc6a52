//! Beam size measurement for a single frame.
//!
//! The frame is processed in two crop-and-locate passes:
//!
//! 1. crop to the sensor's [`DeadPixelRegion`]
//! 2. locate the beam on that crop
//! 3. crop a region of interest of `x_margin` × `y_margin` half-widths around it
//! 4. locate the beam again on the region of interest
//! 5. extract x/y profiles (projections or lineouts) and measure their FWHM
//!
//! Widths are reported in pixels; [`crate::pipeline::dataset`] handles the
//! conversion to physical units.

use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algo::fwhm::{FwhmEstimator, DEFAULT_PROMINENCE_RATIO};
use crate::config::DeadPixelRegion;
use crate::error::{BeamError, Result};
use crate::image_proc::centroid::{locate, Centroid};
use crate::image_proc::crop::{crop, crop_view, CropSpec};
use crate::image_proc::profile::{lineout, project, ProfileAxis};

/// How the 1D profiles are taken from the region of interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileMode {
    /// Sum the whole region along each axis.
    #[default]
    Projection,
    /// Sum `2 * band + 1` rows/columns through a chosen pixel.
    ///
    /// An unset `xpixel` or `ypixel` falls back to the refined beam position.
    Lineout {
        /// Column used for the y lineout, relative to the region of interest
        xpixel: Option<usize>,
        /// Row used for the x lineout, relative to the region of interest
        ypixel: Option<usize>,
        /// Number of neighbouring lines summed on each side
        #[serde(default)]
        band: usize,
    },
}

/// Parameters of a single-image analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    /// Half-width of the region of interest around the beam
    pub x_margin: usize,
    /// Half-height of the region of interest around the beam
    pub y_margin: usize,
    pub mode: ProfileMode,
    /// Prominence window ratio passed to the FWHM estimator
    pub prominence_ratio: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            x_margin: 100,
            y_margin: 100,
            mode: ProfileMode::Projection,
            prominence_ratio: DEFAULT_PROMINENCE_RATIO,
        }
    }
}

impl AnalysisParams {
    /// Projection analysis with the given region-of-interest half-widths.
    pub fn projection(x_margin: usize, y_margin: usize) -> Self {
        Self {
            x_margin,
            y_margin,
            ..Self::default()
        }
    }

    /// Lineout analysis through the refined beam position.
    pub fn lineout(x_margin: usize, y_margin: usize, band: usize) -> Self {
        Self {
            x_margin,
            y_margin,
            mode: ProfileMode::Lineout {
                xpixel: None,
                ypixel: None,
                band,
            },
            ..Self::default()
        }
    }

    pub fn with_prominence_ratio(mut self, prominence_ratio: f64) -> Self {
        self.prominence_ratio = prominence_ratio;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.x_margin == 0 || self.y_margin == 0 {
            return Err(BeamError::InvalidParameter(format!(
                "region of interest margins must be non-zero, got {}x{}",
                self.x_margin, self.y_margin
            )));
        }
        FwhmEstimator::new(self.prominence_ratio).map(|_| ())
    }
}

/// Beam widths along both transverse axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamWidths {
    pub x_fwhm: f64,
    pub y_fwhm: f64,
}

impl BeamWidths {
    /// Widths multiplied by a pixel pitch.
    pub fn scaled(self, pixel_size: f64) -> Self {
        Self {
            x_fwhm: self.x_fwhm * pixel_size,
            y_fwhm: self.y_fwhm * pixel_size,
        }
    }
}

/// Everything a single-image analysis produces.
#[derive(Debug, Clone)]
pub struct SingleImageAnalysis {
    /// FWHM along x and y, in pixels
    pub widths: BeamWidths,
    /// Beam position in the dead-pixel-cropped frame
    pub coarse_centroid: Centroid,
    /// Beam position in the region of interest
    pub refined_centroid: Centroid,
    /// Region of interest the profiles were taken from
    pub cropped: Array2<f64>,
}

impl SingleImageAnalysis {
    /// `(x_fwhm, y_fwhm, cropped_image)`
    pub fn into_tuple(self) -> (f64, f64, Array2<f64>) {
        (self.widths.x_fwhm, self.widths.y_fwhm, self.cropped)
    }
}

/// Measure the beam FWHM of one frame.
pub fn analyze(
    image: &ArrayView2<'_, f64>,
    params: &AnalysisParams,
    dead_pixels: &DeadPixelRegion,
) -> Result<SingleImageAnalysis> {
    let estimator = FwhmEstimator::new(params.prominence_ratio)?;

    let sensor = crop_view(image.view(), &dead_pixels.to_crop_spec())?;
    let coarse_centroid = locate(&sensor)?;
    debug!(
        "Coarse centroid {} in {:?} sensor crop",
        coarse_centroid,
        sensor.dim()
    );

    let roi_spec = CropSpec::around(coarse_centroid, params.x_margin, params.y_margin);
    if !roi_spec.fits_within(sensor.dim()) {
        debug!(
            "Region of interest {:?} clipped to the {:?} sensor crop",
            roi_spec,
            sensor.dim()
        );
    }
    let cropped = crop(&sensor, &roi_spec)?;
    let refined_centroid = locate(&cropped.view())?;
    debug!(
        "Refined centroid {} in {:?} region of interest",
        refined_centroid,
        cropped.dim()
    );

    let (x_profile, y_profile) = extract_profiles(&cropped.view(), params.mode, refined_centroid)?;

    let x_fwhm = estimator
        .estimate(&x_profile.view())
        .map_err(|e| e.on_axis(ProfileAxis::X))?;
    let y_fwhm = estimator
        .estimate(&y_profile.view())
        .map_err(|e| e.on_axis(ProfileAxis::Y))?;
    debug!("FWHM x={x_fwhm:.3} px, y={y_fwhm:.3} px");

    Ok(SingleImageAnalysis {
        widths: BeamWidths { x_fwhm, y_fwhm },
        coarse_centroid,
        refined_centroid,
        cropped,
    })
}

fn extract_profiles(
    roi: &ArrayView2<'_, f64>,
    mode: ProfileMode,
    refined: Centroid,
) -> Result<(Array1<f64>, Array1<f64>)> {
    match mode {
        ProfileMode::Projection => Ok((
            project(roi, ProfileAxis::X),
            project(roi, ProfileAxis::Y),
        )),
        ProfileMode::Lineout {
            xpixel,
            ypixel,
            band,
        } => {
            let xpixel = xpixel.unwrap_or(refined.x);
            let ypixel = ypixel.unwrap_or(refined.y);
            debug!("Lineouts through row {ypixel} and column {xpixel}, band {band}");
            Ok((
                lineout(roi, ProfileAxis::X, ypixel, band)?,
                lineout(roi, ProfileAxis::Y, xpixel, band)?,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_proc::test_patterns::{generate_gaussian_beam, sigma_to_fwhm};
    use approx::assert_abs_diff_eq;

    fn small_region() -> DeadPixelRegion {
        DeadPixelRegion::new(100, 80, 95, 75)
    }

    #[test]
    fn test_projection_mode_measures_gaussian() {
        let beam = generate_gaussian_beam(200, 160, (120.0, 70.0), (6.0, 4.0), 250.0, 0.0);
        let result = analyze(
            &beam.view(),
            &AnalysisParams::projection(40, 30),
            &small_region(),
        )
        .unwrap();

        assert_eq!(result.cropped.dim(), (60, 80));
        assert_eq!(result.refined_centroid, Centroid { x: 40, y: 30 });
        assert_abs_diff_eq!(result.widths.x_fwhm, sigma_to_fwhm(6.0), epsilon = 0.3);
        assert_abs_diff_eq!(result.widths.y_fwhm, sigma_to_fwhm(4.0), epsilon = 0.3);
    }

    #[test]
    fn test_coarse_centroid_is_relative_to_sensor_crop() {
        let beam = generate_gaussian_beam(200, 160, (120.0, 70.0), (6.0, 4.0), 250.0, 0.0);
        let result = analyze(
            &beam.view(),
            &AnalysisParams::projection(40, 30),
            &small_region(),
        )
        .unwrap();
        // Sensor crop starts at column 5, row 5
        assert_eq!(result.coarse_centroid, Centroid { x: 115, y: 65 });
    }

    #[test]
    fn test_lineout_mode_uses_refined_centroid() {
        let beam = generate_gaussian_beam(200, 160, (90.0, 90.0), (5.0, 8.0), 250.0, 0.0);
        let params = AnalysisParams::lineout(30, 40, 0);
        let result = analyze(&beam.view(), &params, &small_region()).unwrap();

        assert_abs_diff_eq!(result.widths.x_fwhm, sigma_to_fwhm(5.0), epsilon = 0.3);
        assert_abs_diff_eq!(result.widths.y_fwhm, sigma_to_fwhm(8.0), epsilon = 0.3);
    }

    #[test]
    fn test_lineout_band_sums_neighbouring_lines() {
        let beam = generate_gaussian_beam(200, 160, (90.0, 90.0), (5.0, 8.0), 250.0, 0.0);
        let narrow = analyze(&beam.view(), &AnalysisParams::lineout(30, 40, 0), &small_region())
            .unwrap();
        let banded = analyze(&beam.view(), &AnalysisParams::lineout(30, 40, 3), &small_region())
            .unwrap();

        // Seven lines of a separable beam keep the profile shape
        assert_abs_diff_eq!(banded.widths.x_fwhm, sigma_to_fwhm(5.0), epsilon = 0.3);
        assert_abs_diff_eq!(banded.widths.y_fwhm, sigma_to_fwhm(8.0), epsilon = 0.3);
        assert_abs_diff_eq!(banded.widths.x_fwhm, narrow.widths.x_fwhm, epsilon = 1e-6);

        // The band must fit around the chosen row
        let params = AnalysisParams {
            mode: ProfileMode::Lineout {
                xpixel: None,
                ypixel: Some(2),
                band: 3,
            },
            ..AnalysisParams::projection(30, 40)
        };
        assert!(matches!(
            analyze(&beam.view(), &params, &small_region()),
            Err(BeamError::Bounds { start: -1, .. })
        ));
    }

    #[test]
    fn test_lineout_explicit_pixel_out_of_bounds() {
        let beam = generate_gaussian_beam(200, 160, (90.0, 90.0), (5.0, 8.0), 250.0, 0.0);
        let params = AnalysisParams {
            mode: ProfileMode::Lineout {
                xpixel: Some(0),
                ypixel: Some(10),
                band: 2,
            },
            ..AnalysisParams::projection(30, 40)
        };
        let result = analyze(&beam.view(), &params, &small_region());
        assert!(matches!(result, Err(BeamError::Bounds { .. })));
    }

    #[test]
    fn test_explicit_zero_pixel_is_honoured() {
        // Pixel index 0 is a real row, not an "unset" marker
        let beam = generate_gaussian_beam(200, 160, (90.0, 90.0), (5.0, 8.0), 250.0, 0.0);
        let params = AnalysisParams {
            mode: ProfileMode::Lineout {
                xpixel: None,
                ypixel: Some(0),
                band: 0,
            },
            ..AnalysisParams::projection(30, 40)
        };
        let through_centroid = analyze(
            &beam.view(),
            &AnalysisParams::lineout(30, 40, 0),
            &small_region(),
        )
        .unwrap();
        let through_edge = analyze(&beam.view(), &params, &small_region()).unwrap();
        // Gaussian is separable, so the x width is the same along any row
        assert_abs_diff_eq!(
            through_edge.widths.x_fwhm,
            through_centroid.widths.x_fwhm,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_flat_frame_reports_axis() {
        let flat = Array2::from_elem((160, 200), 10.0);
        let err = analyze(&flat.view(), &AnalysisParams::projection(20, 20), &small_region())
            .unwrap_err();
        assert!(matches!(
            err,
            BeamError::NoPeakFound {
                axis: Some(ProfileAxis::X)
            }
        ));
    }

    #[test]
    fn test_into_tuple() {
        let beam = generate_gaussian_beam(200, 160, (100.0, 80.0), (4.0, 4.0), 100.0, 0.0);
        let (x, y, img) = analyze(&beam.view(), &AnalysisParams::projection(25, 25), &small_region())
            .unwrap()
            .into_tuple();
        assert!(x > 0.0 && y > 0.0);
        assert_eq!(img.dim(), (50, 50));
    }

    #[test]
    fn test_invalid_params() {
        let params = AnalysisParams::projection(0, 10);
        assert!(params.validate().is_err());
        let params = AnalysisParams::projection(10, 10).with_prominence_ratio(0.2);
        assert!(params.validate().is_err());

        let beam = Array2::<f64>::zeros((10, 10));
        assert!(matches!(
            analyze(&beam.view(), &params, &DeadPixelRegion::full_frame((10, 10))),
            Err(BeamError::InvalidParameter(_))
        ));
    }
}
