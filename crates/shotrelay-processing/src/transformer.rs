//! Screenshot transformer - orchestrates the extraction chain
//!
//! This module provides the main `ScreenshotTransformer` that chains the
//! transform stages together: decode, then either an exact region crop
//! (manual mode) or trim -> pad -> optional resize (auto mode), and finally
//! a PNG encode. Every stage consumes the previous stage's output by value;
//! nothing is mutated in place.

use crate::region::{self, RegionRequest};
use crate::trim::trim_background;
use bytes::Bytes;
use image::{imageops, DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;

pub const DEFAULT_TRIM_THRESHOLD: u8 = 10;
pub const DEFAULT_PADDING: u32 = 8;
pub const MIN_RESIZE_WIDTH: u32 = 320;
pub const MAX_RESIZE_WIDTH: u32 = 4000;

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Could not decode source bytes as an image: {0}")]
    Decode(String),

    #[error("Computed an impossible extraction rectangle: {0}")]
    Geometry(String),

    #[error("Failed to encode output image: {0}")]
    Encode(String),
}

/// How the extraction rectangle is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformMode {
    /// Trim background margins, pad, optionally resize.
    Auto,
    /// Extract exactly the requested rectangle, clamped to the image.
    Manual(RegionRequest),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformOptions {
    pub mode: TransformMode,
    pub trim_threshold: u8,
    pub padding: u32,
    pub resize_width: Option<u32>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            mode: TransformMode::Auto,
            trim_threshold: DEFAULT_TRIM_THRESHOLD,
            padding: DEFAULT_PADDING,
            resize_width: None,
        }
    }
}

/// Final pipeline output: encoded PNG plus its dimensions.
#[derive(Debug, Clone)]
pub struct TransformedImage {
    pub bytes: Bytes,
    pub width: u32,
    pub height: u32,
}

/// Main transformer that orchestrates the extraction chain.
pub struct ScreenshotTransformer;

impl ScreenshotTransformer {
    /// Run the whole chain on encoded source bytes.
    ///
    /// Fails only when the source cannot be decoded at all (or, defensively,
    /// when geometry resolution misbehaves); clamping makes every requested
    /// rectangle extractable.
    pub fn process(
        data: &[u8],
        options: &TransformOptions,
    ) -> Result<TransformedImage, TransformError> {
        let cursor = Cursor::new(data);
        let img = image::ImageReader::new(cursor)
            .with_guessed_format()
            .map_err(|e| TransformError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| TransformError::Decode(e.to_string()))?;

        let (source_width, source_height) = img.dimensions();

        let result = match options.mode {
            TransformMode::Manual(request) => {
                tracing::debug!(
                    source_width,
                    source_height,
                    ?request,
                    "Extracting requested region"
                );
                Self::extract_region(&img, request)?
            }
            TransformMode::Auto => {
                let trimmed = trim_background(&img, options.trim_threshold);
                let padded = Self::pad(&trimmed, options.padding);
                match options.resize_width {
                    Some(width) => Self::resize_to_width(&padded, width),
                    None => padded,
                }
            }
        };

        let (width, height) = result.dimensions();
        tracing::debug!(
            source_width,
            source_height,
            width,
            height,
            "Transform chain complete"
        );

        Self::encode_png(&result)
    }

    /// Crop exactly the requested rectangle, clamped to the image bounds.
    pub fn extract_region(
        img: &DynamicImage,
        request: RegionRequest,
    ) -> Result<DynamicImage, TransformError> {
        let (width, height) = img.dimensions();
        let region = region::resolve(width, height, request);

        // resolve guarantees this; kept as a check because a crop outside
        // the buffer would panic deep inside the image crate otherwise
        if region.width == 0
            || region.height == 0
            || region.left + region.width > width
            || region.top + region.height > height
        {
            return Err(TransformError::Geometry(format!(
                "{:?} does not fit a {}x{} image",
                region, width, height
            )));
        }

        Ok(img.crop_imm(region.left, region.top, region.width, region.height))
    }

    /// Extend all four edges outward, filling the new pixels with opaque
    /// white. Re-adds the breathing room the trim stage removed.
    pub fn pad(img: &DynamicImage, padding: u32) -> DynamicImage {
        if padding == 0 {
            return img.clone();
        }
        let (width, height) = img.dimensions();
        let mut canvas = RgbaImage::from_pixel(
            width + 2 * padding,
            height + 2 * padding,
            Rgba([255, 255, 255, 255]),
        );
        imageops::overlay(
            &mut canvas,
            &img.to_rgba8(),
            i64::from(padding),
            i64::from(padding),
        );
        DynamicImage::ImageRgba8(canvas)
    }

    /// Scale to the requested width, preserving aspect ratio. The width is
    /// clamped to [MIN_RESIZE_WIDTH, MAX_RESIZE_WIDTH].
    pub fn resize_to_width(img: &DynamicImage, width: u32) -> DynamicImage {
        let target = width.clamp(MIN_RESIZE_WIDTH, MAX_RESIZE_WIDTH);
        let (current_width, current_height) = img.dimensions();
        if target == current_width {
            return img.clone();
        }
        let target_height = ((f64::from(target) * f64::from(current_height)
            / f64::from(current_width))
        .round() as u32)
            .max(1);
        img.resize_exact(target, target_height, imageops::FilterType::Lanczos3)
    }

    fn encode_png(img: &DynamicImage) -> Result<TransformedImage, TransformError> {
        let (width, height) = img.dimensions();
        let estimated_size = (width as usize) * (height as usize) * 4;
        let mut buffer = Vec::with_capacity(estimated_size);
        let mut cursor = Cursor::new(&mut buffer);
        img.write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| TransformError::Encode(e.to_string()))?;

        Ok(TransformedImage {
            bytes: Bytes::from(buffer),
            width,
            height,
        })
    }
}
