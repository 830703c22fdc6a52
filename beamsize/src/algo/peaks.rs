//! Peak finding, prominence and width measurement for 1D signals.
//!
//! These follow the conventions of the classic signal-processing primitives:
//!
//! - A **peak** is a sample strictly above its left neighbour and strictly
//!   above the first differing sample to its right. Flat plateaus report
//!   their midpoint (rounded down). The first and last samples are never peaks.
//! - The **prominence** is the peak height above the higher of its two bases,
//!   where each base is the lowest point reached walking outward until a
//!   strictly higher sample (or the signal edge) is met.
//! - The **width** at relative height `r` is measured at
//!   `height - r * prominence`, bounded by the bases, with linear
//!   interpolation between the samples flanking each crossing.

/// Prominence of a peak together with the bases it was measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakProminence {
    pub prominence: f64,
    /// Index of the lowest sample on the left, nearest the peak on ties
    pub left_base: usize,
    /// Index of the lowest sample on the right, nearest the peak on ties
    pub right_base: usize,
}

/// Width measurement of a single peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakWidth {
    /// Sample index of the peak
    pub peak: usize,
    /// Distance between the interpolated crossings, in samples
    pub width: f64,
    /// Signal level at which the width was evaluated
    pub width_height: f64,
    /// Interpolated left crossing position
    pub left_ip: f64,
    /// Interpolated right crossing position
    pub right_ip: f64,
    pub prominence: PeakProminence,
}

/// Indices of all local maxima in `x`, in ascending order.
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }

    let i_max = x.len() - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut i_ahead = i + 1;
            while i_ahead < i_max && x[i_ahead] == x[i] {
                i_ahead += 1;
            }
            if x[i_ahead] < x[i] {
                let left_edge = i;
                let right_edge = i_ahead - 1;
                peaks.push((left_edge + right_edge) / 2);
                i = i_ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Prominence of the peak at `peak`.
///
/// # Panics
/// If `peak` is not a valid index into `x`.
pub fn peak_prominence(x: &[f64], peak: usize) -> PeakProminence {
    let height = x[peak];

    let mut left_base = peak;
    let mut left_min = height;
    let mut i = peak;
    loop {
        if x[i] > height {
            break;
        }
        if x[i] < left_min {
            left_min = x[i];
            left_base = i;
        }
        if i == 0 {
            break;
        }
        i -= 1;
    }

    let mut right_base = peak;
    let mut right_min = height;
    for (j, &v) in x.iter().enumerate().skip(peak) {
        if v > height {
            break;
        }
        if v < right_min {
            right_min = v;
            right_base = j;
        }
    }

    PeakProminence {
        prominence: height - left_min.max(right_min),
        left_base,
        right_base,
    }
}

/// Width of the peak at `peak`, evaluated `rel_height` of the way down its prominence.
///
/// `rel_height = 0.5` gives the full width at half maximum.
pub fn peak_width(x: &[f64], peak: usize, prominence: PeakProminence, rel_height: f64) -> PeakWidth {
    let width_height = x[peak] - prominence.prominence * rel_height;

    let mut i = peak;
    while prominence.left_base < i && width_height < x[i] {
        i -= 1;
    }
    let mut left_ip = i as f64;
    if x[i] < width_height {
        left_ip += (width_height - x[i]) / (x[i + 1] - x[i]);
    }

    let mut i = peak;
    while i < prominence.right_base && width_height < x[i] {
        i += 1;
    }
    let mut right_ip = i as f64;
    if x[i] < width_height {
        right_ip -= (width_height - x[i]) / (x[i - 1] - x[i]);
    }

    PeakWidth {
        peak,
        width: right_ip - left_ip,
        width_height,
        left_ip,
        right_ip,
        prominence,
    }
}

/// Local maxima whose prominence lies in the inclusive range `[min, max]`.
pub fn find_peaks_by_prominence(x: &[f64], min: f64, max: f64) -> Vec<(usize, PeakProminence)> {
    local_maxima(x)
        .into_iter()
        .map(|p| (p, peak_prominence(x, p)))
        .filter(|(_, prom)| min <= prom.prominence && prom.prominence <= max)
        .collect()
}
