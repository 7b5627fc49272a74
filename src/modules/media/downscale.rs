//! Display-time image downscaling.
//!
//! Large stored images are resampled to a bounded resolution before being
//! returned for viewing. The stored original is never modified.
//!
//! These functions are CPU-bound and should be called inside `spawn_blocking`.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{GenericImageView, ImageError, ImageFormat, ImageReader, Limits};
use thiserror::Error;

/// Maximum image dimension accepted by the decoder (guards against decompression bombs)
const MAX_IMAGE_DIMENSION: u32 = 16384;

#[derive(Debug, Error)]
pub enum DownscaleError {
    #[error("Image decode failed: {0}")]
    DecodeFailed(String),
    #[error("Image encoding failed: {0}")]
    EncodeFailed(String),
    /// Valid image that is larger than the decoder is allowed to allocate
    #[error("Image exceeds decoder limits: {0}")]
    ExceedsLimits(String),
}

/// Bounding box the displayed image must fit in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayBounds {
    pub max_width: u32,
    pub max_height: u32,
}

/// A resampled PNG
#[derive(Debug)]
pub struct ResizedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Target dimensions for an image of `width` x `height`, or `None` when it
/// already fits within `bounds`.
pub fn target_dimensions(width: u32, height: u32, bounds: DisplayBounds) -> Option<(u32, u32)> {
    if width <= bounds.max_width && height <= bounds.max_height {
        return None;
    }

    let scale = f64::min(
        bounds.max_width as f64 / width as f64,
        bounds.max_height as f64 / height as f64,
    );
    let scaled_width = ((width as f64 * scale).floor() as u32).clamp(1, bounds.max_width);
    let scaled_height = ((height as f64 * scale).floor() as u32).clamp(1, bounds.max_height);

    Some((scaled_width, scaled_height))
}

/// Resample a PNG so it fits within `bounds`.
///
/// Returns `Ok(None)` when the image already fits and no re-encoding is needed.
pub fn fit_within(data: &[u8], bounds: DisplayBounds) -> Result<Option<ResizedImage>, DownscaleError> {
    let mut reader = ImageReader::with_format(Cursor::new(data), ImageFormat::Png);
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_IMAGE_DIMENSION);
    limits.max_image_height = Some(MAX_IMAGE_DIMENSION);
    reader.limits(limits);

    let img = reader.decode().map_err(|e| match e {
        ImageError::Limits(limit) => DownscaleError::ExceedsLimits(limit.to_string()),
        other => DownscaleError::DecodeFailed(other.to_string()),
    })?;

    let (width, height) = img.dimensions();
    let Some((target_width, target_height)) = target_dimensions(width, height, bounds) else {
        return Ok(None);
    };

    let resized = img.resize_exact(target_width, target_height, FilterType::Triangle);

    let mut buf = Cursor::new(Vec::new());
    resized
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| DownscaleError::EncodeFailed(e.to_string()))?;

    Ok(Some(ResizedImage {
        data: buf.into_inner(),
        width: target_width,
        height: target_height,
    }))
}

/// Downscale PNG bytes to fit within `bounds`, handing the input back untouched
/// when it already fits or is too large for the decoder to resample.
#[allow(dead_code)]
pub fn downscale(data: Vec<u8>, bounds: DisplayBounds) -> Result<Vec<u8>, DownscaleError> {
    match fit_within(&data, bounds) {
        Ok(Some(resized)) => Ok(resized.data),
        Ok(None) | Err(DownscaleError::ExceedsLimits(_)) => Ok(data),
        Err(e) => Err(e),
    }
}
