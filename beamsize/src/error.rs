//! Error types shared by every stage of the beam analysis pipeline.

use std::path::PathBuf;
use thiserror::Error;

use crate::image_proc::profile::ProfileAxis;

/// Errors produced while resolving, cropping, profiling or measuring a beam image.
///
/// Every variant is scoped to the analysis of a single image; none of them is
/// fatal to the process.
#[derive(Debug, Error)]
pub enum BeamError {
    /// Neither a usable path nor a non-empty array was supplied.
    #[error("invalid image source: {0}")]
    Input(String),

    /// The image file exists but could not be opened or decoded.
    #[error("failed to decode image {path:?}: {source}")]
    Decode {
        /// Path of the file that failed to decode.
        path: PathBuf,
        /// Underlying codec error.
        #[source]
        source: image::ImageError,
    },

    /// A crop or lineout window does not fit inside the source array.
    #[error("{what} window [{start}, {end}) is outside the valid range [0, {limit})")]
    Bounds {
        /// Which operation rejected the window.
        what: &'static str,
        /// Requested start index (may be negative before clipping).
        start: i64,
        /// Requested end index (exclusive).
        end: i64,
        /// Size of the dimension being indexed.
        limit: usize,
    },

    /// The profile has no peak whose prominence lies inside the search window.
    #[error(
        "no qualifying peak found{}",
        .axis.as_ref().map(|a| format!(" in {a} profile")).unwrap_or_default()
    )]
    NoPeakFound {
        /// Axis of the profile that was searched, when known.
        axis: Option<ProfileAxis>,
    },

    /// Two arrays that must share a shape do not.
    #[error("shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        /// Shape of the reference array as (height, width).
        expected: (usize, usize),
        /// Shape of the offending array as (height, width).
        actual: (usize, usize),
    },

    /// A numeric parameter is outside its valid domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// One image of a batch failed and the caller asked for an all-or-nothing result.
    #[error("image #{index} failed: {source}")]
    Dataset {
        /// Position of the failing image in the input sequence.
        index: usize,
        /// Error reported for that image.
        #[source]
        source: Box<BeamError>,
    },

    /// Reading or writing a configuration file failed.
    #[error("configuration I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// A configuration file could not be (de)serialized.
    #[error("configuration format error: {0}")]
    ConfigFormat(#[from] serde_json::Error),
}

impl BeamError {
    /// Attach the profile axis to a [`BeamError::NoPeakFound`] that lacks one.
    pub fn on_axis(self, axis: ProfileAxis) -> Self {
        match self {
            Self::NoPeakFound { axis: None } => Self::NoPeakFound { axis: Some(axis) },
            other => other,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BeamError>;
