//! Image processing stages for beam profile analysis.
//!
//! # Module Organization
//!
//! - **io**: resolve a file path or caller array into an `Array2<f64>`
//! - **background**: background frame subtraction
//! - **crop**: rectangular windows around a center point, clipped to bounds
//! - **centroid**: argmax-of-projection beam location
//! - **profile**: full-axis projections and banded lineouts
//! - **test_patterns**: synthetic Gaussian beams and 1D profiles
//!
//! All stages operate on `ArrayView2<f64>` and return owned results, so a
//! pipeline can hand each intermediate to the next stage without copies of
//! the raw frame.

pub mod background;
pub mod centroid;
pub mod crop;
pub mod io;
pub mod profile;
pub mod test_patterns;

pub use background::subtract_background;
pub use centroid::{argmax, locate, Centroid};
pub use crop::{crop, crop_view, CropSpec};
pub use io::{gray16_image_to_array2, gray_image_to_array2, load_luminance, resolve, ImageSource};
pub use profile::{lineout, lineout_x, lineout_y, project, projection_x, projection_y, ProfileAxis};
