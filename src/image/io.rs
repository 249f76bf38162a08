//! Loading and saving grids via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::Field;
use crate::util::{PartScoreError, PartScoreResult};
use std::path::Path;

/// Channel layout requested when decoding an image file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Single luma channel.
    #[default]
    Gray,
    /// Three interleaved RGB channels.
    Rgb,
}

impl ColorMode {
    /// Number of channels produced by this mode.
    pub fn channels(self) -> usize {
        match self {
            ColorMode::Gray => 1,
            ColorMode::Rgb => 3,
        }
    }
}

/// Converts a decoded image into an owned grid with the requested layout.
pub fn field_from_dynamic_image(
    img: &image::DynamicImage,
    mode: ColorMode,
) -> PartScoreResult<Field<u8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    let data = match mode {
        ColorMode::Gray => img.to_luma8().into_raw(),
        ColorMode::Rgb => img.to_rgb8().into_raw(),
    };
    Field::from_vec(data, width, height, mode.channels())
}

/// Loads an image from disk.
pub fn load_image<P: AsRef<Path>>(path: P, mode: ColorMode) -> PartScoreResult<Field<u8>> {
    let img = image::open(path).map_err(|err| PartScoreError::ImageIo {
        reason: err.to_string(),
    })?;
    field_from_dynamic_image(&img, mode)
}

/// Writes a single-channel field as an 8-bit PNG, linearly stretching its
/// finite range to `[0, 255]`. Non-finite samples are written as 255.
pub fn save_field_png<P: AsRef<Path>>(field: &Field<f64>, path: P) -> PartScoreResult<()> {
    if field.channels() != 1 {
        return Err(PartScoreError::UnsupportedChannels {
            expected: 1,
            got: field.channels(),
        });
    }
    let (lo, hi) = field.finite_range().unwrap_or((0.0, 0.0));
    let scale = if hi > lo { 255.0 / (hi - lo) } else { 0.0 };
    let pixels: Vec<u8> = field
        .data()
        .iter()
        .map(|&v| {
            if v.is_finite() {
                ((v - lo) * scale).round().clamp(0.0, 255.0) as u8
            } else {
                u8::MAX
            }
        })
        .collect();
    let img = image::GrayImage::from_raw(field.width() as u32, field.height() as u32, pixels)
        .ok_or(PartScoreError::InvalidInput("field does not fit an 8-bit image"))?;
    img.save(path).map_err(|err| PartScoreError::ImageIo {
        reason: err.to_string(),
    })
}
