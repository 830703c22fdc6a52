//! Beam profile analysis for laser and particle beam camera images.
//!
//! This crate estimates the transverse size of a beam, expressed as the
//! Full-Width at Half-Maximum (FWHM) along x and y, from a single grayscale
//! frame or from a whole dataset of frames.
//!
//! # Pipeline
//!
//! 1. Resolve the input into an `Array2<f64>` ([`image_proc::io`])
//! 2. Crop away the sensor's dead-pixel border ([`image_proc::crop`])
//! 3. Locate the beam as the argmax of the row/column sums ([`image_proc::centroid`])
//! 4. Crop a region of interest around it and locate again
//! 5. Extract projections or lineouts ([`image_proc::profile`])
//! 6. Measure the width of the prominent peak ([`algo::fwhm`])
//!
//! Coordinates follow ndarray conventions: images are indexed `[row, col]`,
//! which is `[y, x]`.

pub mod algo;
pub mod config;
pub mod error;
pub mod image_proc;
pub mod pipeline;

pub use algo::fwhm::{FwhmEstimator, DEFAULT_PROMINENCE_RATIO};
pub use config::{BeamConfig, DeadPixelRegion};
pub use error::{BeamError, Result};
pub use image_proc::centroid::Centroid;
pub use image_proc::crop::CropSpec;
pub use image_proc::io::ImageSource;
pub use image_proc::profile::ProfileAxis;
pub use pipeline::dataset::{analyze_all, DatasetParams, DatasetReport, ImageOutcome};
pub use pipeline::single::{analyze, AnalysisParams, BeamWidths, ProfileMode, SingleImageAnalysis};
