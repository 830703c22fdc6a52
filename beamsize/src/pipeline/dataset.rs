//! Beam size measurement over a dataset of frames.
//!
//! Every frame is analyzed independently with [`analyze`], so the batch is
//! spread over the rayon thread pool. Results come back in input order, one
//! [`ImageOutcome`] per frame; a frame that fails is recorded with its error
//! rather than dropped, so x/y lists stay aligned with the input.

use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{BeamConfig, DeadPixelRegion, DEFAULT_PIXEL_SIZE_UM};
use crate::error::{BeamError, Result};
use crate::image_proc::background::subtract_background;
use crate::image_proc::io::{resolve, ImageSource};
use crate::pipeline::single::{analyze, AnalysisParams, BeamWidths};

/// Parameters shared by every frame of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasetParams {
    pub analysis: AnalysisParams,
    /// Physical size of one pixel; widths are multiplied by it
    pub pixel_size: f64,
    pub dead_pixel_region: DeadPixelRegion,
    /// Analyze frames on the rayon pool instead of sequentially
    pub parallel: bool,
}

impl Default for DatasetParams {
    fn default() -> Self {
        Self {
            analysis: AnalysisParams::default(),
            pixel_size: DEFAULT_PIXEL_SIZE_UM,
            dead_pixel_region: DeadPixelRegion::default(),
            parallel: true,
        }
    }
}

impl DatasetParams {
    pub fn from_config(config: &BeamConfig) -> Self {
        Self {
            analysis: config.analysis,
            pixel_size: config.pixel_size,
            dead_pixel_region: config.dead_pixel_region,
            parallel: true,
        }
    }

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

/// Result of analyzing one frame of a dataset.
#[derive(Debug)]
pub struct ImageOutcome {
    /// Position of the frame in the input sequence
    pub index: usize,
    /// Source description (file path or array shape)
    pub label: String,
    /// Widths in physical units, or the reason the frame failed
    pub result: Result<BeamWidths>,
}

/// Per-frame outcomes of a dataset analysis, in input order.
#[derive(Debug, Default)]
pub struct DatasetReport {
    pub outcomes: Vec<ImageOutcome>,
}

impl DatasetReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// X widths aligned with the input; `None` where the frame failed.
    pub fn x_fwhms(&self) -> Vec<Option<f64>> {
        self.outcomes
            .iter()
            .map(|o| o.result.as_ref().ok().map(|w| w.x_fwhm))
            .collect()
    }

    /// Y widths aligned with the input; `None` where the frame failed.
    pub fn y_fwhms(&self) -> Vec<Option<f64>> {
        self.outcomes
            .iter()
            .map(|o| o.result.as_ref().ok().map(|w| w.y_fwhm))
            .collect()
    }

    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    /// Complete x/y lists, or the first failing frame's error.
    pub fn into_widths(self) -> Result<(Vec<f64>, Vec<f64>)> {
        let mut xs = Vec::with_capacity(self.outcomes.len());
        let mut ys = Vec::with_capacity(self.outcomes.len());
        for outcome in self.outcomes {
            match outcome.result {
                Ok(w) => {
                    xs.push(w.x_fwhm);
                    ys.push(w.y_fwhm);
                }
                Err(source) => {
                    return Err(BeamError::Dataset {
                        index: outcome.index,
                        source: Box::new(source),
                    })
                }
            }
        }
        Ok((xs, ys))
    }
}

/// Analyze every source and scale the widths by the pixel size.
pub fn analyze_all(sources: Vec<ImageSource>, params: &DatasetParams) -> Result<DatasetReport> {
    analyze_all_with_background(sources, params, None)
}

/// Like [`analyze_all`], subtracting `background` from each frame first.
pub fn analyze_all_with_background(
    sources: Vec<ImageSource>,
    params: &DatasetParams,
    background: Option<&ArrayView2<'_, f64>>,
) -> Result<DatasetReport> {
    params.validate()?;
    info!(
        "Analyzing {} frames ({} mode, pixel size {})",
        sources.len(),
        if params.parallel { "parallel" } else { "sequential" },
        params.pixel_size
    );

    let run = |(index, source): (usize, ImageSource)| {
        let label = source.label();
        let result = analyze_source(source, params, background);
        if let Err(e) = &result {
            warn!("Frame #{index} ({label}) failed: {e}");
        }
        ImageOutcome {
            index,
            label,
            result,
        }
    };

    let outcomes: Vec<ImageOutcome> = if params.parallel {
        sources.into_par_iter().enumerate().map(run).collect()
    } else {
        sources.into_iter().enumerate().map(run).collect()
    };

    let report = DatasetReport { outcomes };
    if report.failure_count() > 0 {
        warn!(
            "{} of {} frames failed",
            report.failure_count(),
            report.len()
        );
    }
    Ok(report)
}

fn analyze_source(
    source: ImageSource,
    params: &DatasetParams,
    background: Option<&ArrayView2<'_, f64>>,
) -> Result<BeamWidths> {
    let frame: Array2<f64> = resolve(source)?;
    let frame = match background {
        Some(bg) => subtract_background(&frame.view(), bg)?,
        None => frame,
    };
    let analysis = analyze(&frame.view(), &params.analysis, &params.dead_pixel_region)?;
    Ok(analysis.widths.scaled(params.pixel_size))
}
