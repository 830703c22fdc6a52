//! Numeric algorithms on 1D beam profiles
//!
//! - **peaks**: local maxima, prominences and interpolated peak widths
//! - **fwhm**: prominence-windowed FWHM estimation built on `peaks`

pub mod fwhm;
pub mod peaks;

pub use fwhm::{estimate_fwhm, FwhmEstimator, DEFAULT_PROMINENCE_RATIO, HALF_MAXIMUM};
pub use peaks::{
    find_peaks_by_prominence, local_maxima, peak_prominence, peak_width, PeakProminence, PeakWidth,
};
