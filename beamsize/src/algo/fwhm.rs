//! Full-Width at Half-Maximum estimation for beam profiles.
//!
//! The estimator looks for the peak that dominates the profile: only local
//! maxima whose prominence lies within `[max / ratio, max * ratio]` of the
//! profile maximum qualify. The first qualifying peak (lowest index) is
//! measured at half of its prominence.

use ndarray::ArrayView1;
use std::borrow::Cow;

use crate::algo::peaks::{find_peaks_by_prominence, peak_width, PeakWidth};
use crate::error::{BeamError, Result};

/// Default prominence window ratio around the profile maximum.
pub const DEFAULT_PROMINENCE_RATIO: f64 = 1.3;

/// Relative height at which the width is measured.
pub const HALF_MAXIMUM: f64 = 0.5;

/// Peak-based FWHM estimator with a configurable prominence window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FwhmEstimator {
    prominence_ratio: f64,
}

impl Default for FwhmEstimator {
    fn default() -> Self {
        Self {
            prominence_ratio: DEFAULT_PROMINENCE_RATIO,
        }
    }
}

impl FwhmEstimator {
    /// Create an estimator; `prominence_ratio` must be finite and at least 1.
    pub fn new(prominence_ratio: f64) -> Result<Self> {
        if !prominence_ratio.is_finite() || prominence_ratio < 1.0 {
            return Err(BeamError::InvalidParameter(format!(
                "prominence ratio must be finite and >= 1, got {prominence_ratio}"
            )));
        }
        Ok(Self { prominence_ratio })
    }

    pub fn prominence_ratio(&self) -> f64 {
        self.prominence_ratio
    }

    /// Inclusive prominence window for a profile whose maximum is `peak_max`.
    pub fn prominence_window(&self, peak_max: f64) -> (f64, f64) {
        (
            peak_max / self.prominence_ratio,
            peak_max * self.prominence_ratio,
        )
    }

    /// Half-maximum widths of every qualifying peak, in ascending index order.
    pub fn qualifying_peaks(&self, profile: &[f64]) -> Vec<PeakWidth> {
        let Some(peak_max) = profile
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::max)
        else {
            return Vec::new();
        };
        if !peak_max.is_finite() || peak_max <= 0.0 {
            return Vec::new();
        }

        let (lo, hi) = self.prominence_window(peak_max);
        find_peaks_by_prominence(profile, lo, hi)
            .into_iter()
            .map(|(peak, prom)| peak_width(profile, peak, prom, HALF_MAXIMUM))
            .collect()
    }

    /// Full width measurement of the first qualifying peak.
    pub fn measure(&self, profile: &ArrayView1<'_, f64>) -> Result<PeakWidth> {
        let samples: Cow<'_, [f64]> = match profile.as_slice() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(profile.to_vec()),
        };

        self.qualifying_peaks(&samples)
            .into_iter()
            .next()
            .ok_or(BeamError::NoPeakFound { axis: None })
    }

    /// FWHM of the first qualifying peak, in samples.
    pub fn estimate(&self, profile: &ArrayView1<'_, f64>) -> Result<f64> {
        self.measure(profile).map(|w| w.width)
    }
}

/// FWHM of `profile` using a one-off estimator with the given ratio.
pub fn estimate_fwhm(profile: &ArrayView1<'_, f64>, prominence_ratio: f64) -> Result<f64> {
    FwhmEstimator::new(prominence_ratio)?.estimate(profile)
}
