//! Sensor and analysis configuration.
//!
//! The dead-pixel region is a property of the camera sensor, not of a single
//! measurement, so it lives here as an explicit value instead of being baked
//! into the pipeline. Configurations are stored as pretty-printed JSON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::error::{BeamError, Result};
use crate::image_proc::crop::CropSpec;
use crate::pipeline::single::AnalysisParams;

/// Physical pixel pitch of the reference camera, in micrometers.
pub const DEFAULT_PIXEL_SIZE_UM: f64 = 3.45;

/// Box of known-good sensor pixels, as a center point plus half-widths.
///
/// Everything outside it is discarded before the beam is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadPixelRegion {
    pub center_x: usize,
    pub center_y: usize,
    pub x_margin: usize,
    pub y_margin: usize,
}

impl DeadPixelRegion {
    pub fn new(center_x: usize, center_y: usize, x_margin: usize, y_margin: usize) -> Self {
        Self {
            center_x,
            center_y,
            x_margin,
            y_margin,
        }
    }

    /// Region covering the whole of a `(height, width)` frame.
    pub fn full_frame(dim: (usize, usize)) -> Self {
        let (height, width) = dim;
        let x_margin = width.div_ceil(2);
        let y_margin = height.div_ceil(2);
        Self::new(x_margin, y_margin, x_margin, y_margin)
    }

    pub fn to_crop_spec(&self) -> CropSpec {
        CropSpec::new(self.center_x, self.center_y, self.x_margin, self.y_margin)
    }
}

impl Default for DeadPixelRegion {
    /// Calibrated box for the reference 2448x2048 sensor.
    fn default() -> Self {
        Self::new(1212, 1012, 1000, 988)
    }
}

/// Complete configuration for a beam analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamConfig {
    /// Sensor region kept before locating the beam
    pub dead_pixel_region: DeadPixelRegion,
    /// Per-image analysis parameters
    pub analysis: AnalysisParams,
    /// Pixel pitch used to convert widths to physical units
    pub pixel_size: f64,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            dead_pixel_region: DeadPixelRegion::default(),
            analysis: AnalysisParams::default(),
            pixel_size: DEFAULT_PIXEL_SIZE_UM,
        }
    }
}

impl BeamConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        debug!("Loaded beam config from {}", path.display());
        Ok(config)
    }

    /// Save as pretty-printed JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check parameter domains that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if !self.pixel_size.is_finite() || self.pixel_size <= 0.0 {
            return Err(BeamError::InvalidParameter(format!(
                "pixel size must be positive, got {}",
                self.pixel_size
            )));
        }
        self.analysis.validate()
    }
}
