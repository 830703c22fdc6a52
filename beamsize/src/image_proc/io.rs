//! Image source resolution and decoding.
//!
//! A beam frame reaches the pipeline either as a file on disk or as an array
//! the caller already holds. Files are decoded with the `image` crate into a
//! single luminance channel and widened to `f64`.
//!
//! # Coordinate System Conversions
//!
//! - **ndarray**: matrix indexing `[row, col] = [y, x]` with `(height, width)` dimensions
//! - **image crate**: graphics indexing `(x, y)` with `(width, height)` dimensions

use image::{ColorType, DynamicImage, GrayImage, ImageBuffer, Luma};
use ndarray::Array2;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{BeamError, Result};

/// 16-bit grayscale image buffer.
pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Where a beam frame comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Grayscale (or color, converted to luminance) image file.
    Path(PathBuf),
    /// Caller-supplied intensity array, used verbatim.
    Array(Array2<f64>),
}

impl ImageSource {
    /// Short human-readable label used in logs and reports.
    pub fn label(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Array(array) => {
                let (height, width) = array.dim();
                format!("<array {width}x{height}>")
            }
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for ImageSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Array2<f64>> for ImageSource {
    fn from(array: Array2<f64>) -> Self {
        Self::Array(array)
    }
}

/// Resolve an [`ImageSource`] into an intensity array.
///
/// Arrays must be non-empty; paths are decoded with [`load_luminance`].
pub fn resolve(source: ImageSource) -> Result<Array2<f64>> {
    match source {
        ImageSource::Array(array) => resolve_parts(None, Some(array)),
        ImageSource::Path(path) => resolve_parts(Some(&path), None),
    }
}

/// Resolve an optional path / optional array pair.
///
/// A non-empty array always wins. Otherwise the path is decoded. Supplying
/// neither is an [`BeamError::Input`] error.
pub fn resolve_parts(path: Option<&Path>, array: Option<Array2<f64>>) -> Result<Array2<f64>> {
    match (array, path) {
        (Some(array), _) if !array.is_empty() => Ok(array),
        (_, Some(path)) => load_luminance(path),
        (Some(_), None) => Err(BeamError::Input(
            "supplied intensity array is empty".to_string(),
        )),
        (None, None) => Err(BeamError::Input(
            "neither an image path nor a non-empty array was provided".to_string(),
        )),
    }
}

/// Decode an image file into a luminance `Array2<f64>`.
///
/// 16-bit sources keep their full bit depth; everything else goes through an
/// 8-bit luminance conversion.
pub fn load_luminance<P: AsRef<Path>>(path: P) -> Result<Array2<f64>> {
    let path = path.as_ref();
    let decoded = image::open(path).map_err(|source| BeamError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let color = decoded.color();
    let array = if is_sixteen_bit(color) {
        gray16_image_to_array2(&decoded.to_luma16()).mapv(f64::from)
    } else {
        gray_image_to_array2(&to_gray8(decoded)).mapv(f64::from)
    };

    let (height, width) = array.dim();
    debug!("Decoded {} as {width}x{height} ({color:?})", path.display());

    if array.is_empty() {
        return Err(BeamError::Input(format!(
            "image {} has no pixels",
            path.display()
        )));
    }
    Ok(array)
}

fn is_sixteen_bit(color: ColorType) -> bool {
    matches!(
        color,
        ColorType::L16 | ColorType::La16 | ColorType::Rgb16 | ColorType::Rgba16
    )
}

fn to_gray8(image: DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray,
        other => other.to_luma8(),
    }
}

/// Convert an 8-bit GrayImage into an `Array2<u8>` indexed `[y, x]`.
pub fn gray_image_to_array2(img: &GrayImage) -> Array2<u8> {
    let (width, height) = img.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        img.get_pixel(x as u32, y as u32)[0]
    })
}

/// Convert a 16-bit grayscale image into an `Array2<u16>` indexed `[y, x]`.
pub fn gray16_image_to_array2(img: &Gray16Image) -> Array2<u16> {
    let (width, height) = img.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        img.get_pixel(x as u32, y as u32)[0]
    })
}

/// Convert an `Array2<u8>` back into a GrayImage (array `[y, x]` → pixel `(x, y)`).
pub fn array2_to_gray_image(arr: &Array2<u8>) -> GrayImage {
    let (height, width) = arr.dim();
    GrayImage::from_fn(width as u32, height as u32, |x, y| {
        Luma([arr[[y as usize, x as usize]]])
    })
}

/// Convert an `Array2<u16>` back into a 16-bit grayscale image.
pub fn array2_to_gray16_image(arr: &Array2<u16>) -> Gray16Image {
    let (height, width) = arr.dim();
    Gray16Image::from_fn(width as u32, height as u32, |x, y| {
        Luma([arr[[y as usize, x as usize]]])
    })
}
