//! End-to-end beam size pipelines.
//!
//! - **single**: two-pass crop/locate on one frame, then FWHM along x and y
//! - **dataset**: the single-frame pipeline over many frames, in physical units

pub mod dataset;
pub mod single;

pub use dataset::{analyze_all, analyze_all_with_background, DatasetParams, DatasetReport, ImageOutcome};
pub use single::{analyze, AnalysisParams, BeamWidths, ProfileMode, SingleImageAnalysis};
