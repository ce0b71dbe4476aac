//! Turns an uploaded scan into the NHWC tensor the classifier expects.

use crate::error::InferenceError;
use image::{DynamicImage, ImageReader, RgbImage, imageops::FilterType};
use ndarray::Array4;
use std::path::Path;

/// Spatial size the classifier was trained on.
pub const INPUT_SIZE: u32 = 224;

/// Decode the image at `path`, sniffing the format from its content.
///
/// The scratch copy always carries a `.jpg` name, so the extension cannot
/// be trusted to describe PNG uploads.
pub fn load_image(path: &Path) -> Result<DynamicImage, InferenceError> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|source| InferenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(reader.decode()?)
}

/// Stretch to `size`x`size`, drop alpha and scale intensities to [0, 1].
/// Returns a `(1, size, size, 3)` batch.
pub fn to_tensor(img: &DynamicImage, size: u32) -> Array4<f32> {
    let resized = resize_exact(img, size);
    let side = size as usize;
    let mut array = Array4::<f32>::zeros((1, side, side, 3));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let (row, col) = (y as usize, x as usize);
        array[[0, row, col, 0]] = scale(r);
        array[[0, row, col, 1]] = scale(g);
        array[[0, row, col, 2]] = scale(b);
    }
    array
}

pub fn preprocess_file(path: &Path, size: u32) -> Result<Array4<f32>, InferenceError> {
    let img = load_image(path)?;
    Ok(to_tensor(&img, size))
}

fn resize_exact(img: &DynamicImage, size: u32) -> RgbImage {
    img.resize_exact(size, size, FilterType::Nearest).to_rgb8()
}

fn scale(value: u8) -> f32 {
    value as f32 / 255.0
}
