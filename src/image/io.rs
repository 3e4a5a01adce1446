//! Decoding helpers built on the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{ColorMode, OwnedImage};
use crate::util::PctMatchResult;
use image::DynamicImage;

/// Alpha values strictly above this are treated as opaque.
pub const ALPHA_OPAQUE_THRESHOLD: u8 = 250;

/// Converts a decoded image to the channel layout of `mode`.
///
/// Gray goes through RGB and [`OwnedImage::to_mode`], so decoded assets and
/// in-memory frames share one luma conversion.
pub fn owned_from_dynamic(img: &DynamicImage, mode: ColorMode) -> PctMatchResult<OwnedImage> {
    let rgb = img.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    let color = OwnedImage::new(rgb.into_raw(), width, height, 3)?;
    Ok(color.to_mode(mode))
}

/// Extracts a hard binary mask from the alpha channel, if there is one.
///
/// Returns `None` when the image carries no alpha. The mask has the
/// channel count of `mode` so it lines up element-wise with the image.
pub fn alpha_mask(img: &DynamicImage, mode: ColorMode) -> PctMatchResult<Option<OwnedImage>> {
    if !img.color().has_alpha() {
        return Ok(None);
    }
    let rgba = img.to_rgba8();
    let (width, height) = (rgba.width() as usize, rgba.height() as usize);
    let channels = mode.channels();
    let mut data = Vec::with_capacity(width * height * channels);
    for px in rgba.pixels() {
        let value = if px.0[3] > ALPHA_OPAQUE_THRESHOLD { 255 } else { 0 };
        data.extend(std::iter::repeat(value).take(channels));
    }
    OwnedImage::new(data, width, height, channels).map(Some)
}
