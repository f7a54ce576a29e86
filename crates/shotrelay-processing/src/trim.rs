//! Background trim.
//!
//! Finds the bounding box of pixels that differ from the top-left reference
//! pixel by more than a per-channel threshold, then crops to it. The default
//! threshold is small so thin table gridlines near the border are kept as
//! content instead of being stripped as background.

use image::{DynamicImage, GenericImageView, Rgba};

/// Remove uniform-colored margins from all four edges.
///
/// `threshold` is a 0-255 per-channel distance: pixels within `threshold` of
/// the top-left pixel count as background. A fully uniform image has no
/// content box to crop to and is returned unchanged.
pub fn trim_background(img: &DynamicImage, threshold: u8) -> DynamicImage {
    let (width, height) = img.dimensions();
    let rgba = img.to_rgba8();
    let reference = *rgba.get_pixel(0, 0);

    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found_content = false;

    for (x, y, pixel) in rgba.enumerate_pixels() {
        if channel_distance(*pixel, reference) > u16::from(threshold) {
            found_content = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if !found_content {
        tracing::debug!(width, height, "No content found while trimming, keeping image as is");
        return img.clone();
    }

    img.crop_imm(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
}

/// Largest absolute per-channel difference, alpha included.
fn channel_distance(a: Rgba<u8>, b: Rgba<u8>) -> u16 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(x, y)| u16::from(x.abs_diff(*y)))
        .max()
        .unwrap_or(0)
}
