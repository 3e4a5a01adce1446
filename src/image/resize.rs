//! Bilinear resampling for interleaved `u8` images.

use crate::image::{ImageView, OwnedImage};
use crate::util::{PctMatchError, PctMatchResult};

/// Resizes an image to `dst_width x dst_height` using bilinear sampling.
///
/// Destination pixel centers map to source coordinates with the half-pixel
/// convention `src = (dst + 0.5) * scale - 0.5`, clamped to the valid range,
/// so that scaling a constant image leaves it unchanged. Each channel is
/// interpolated independently and rounded to the nearest integer.
pub fn resize_bilinear(
    src: ImageView<'_, u8>,
    dst_width: usize,
    dst_height: usize,
) -> PctMatchResult<OwnedImage> {
    if dst_width == 0 || dst_height == 0 {
        return Err(PctMatchError::InvalidDimensions {
            width: dst_width,
            height: dst_height,
        });
    }

    let width = src.width();
    let height = src.height();
    let channels = src.channels();
    let scale_x = width as f32 / dst_width as f32;
    let scale_y = height as f32 / dst_height as f32;
    let max_x = width as f32 - 1.0;
    let max_y = height as f32 - 1.0;

    let mut out = Vec::with_capacity(dst_width * dst_height * channels);
    for y in 0..dst_height {
        let src_y = ((y as f32 + 0.5) * scale_y - 0.5).clamp(0.0, max_y);
        let y0 = src_y.floor() as usize;
        let y1 = (y0 + 1).min(height - 1);
        let fy = src_y - y0 as f32;
        let row0 = src.row(y0).ok_or(PctMatchError::BufferTooSmall {
            needed: y0 * src.stride() + width * channels,
            got: src.as_slice().len(),
        })?;
        let row1 = src.row(y1).ok_or(PctMatchError::BufferTooSmall {
            needed: y1 * src.stride() + width * channels,
            got: src.as_slice().len(),
        })?;

        for x in 0..dst_width {
            let src_x = ((x as f32 + 0.5) * scale_x - 0.5).clamp(0.0, max_x);
            let x0 = src_x.floor() as usize;
            let x1 = (x0 + 1).min(width - 1);
            let fx = src_x - x0 as f32;

            let w00 = (1.0 - fx) * (1.0 - fy);
            let w10 = fx * (1.0 - fy);
            let w01 = (1.0 - fx) * fy;
            let w11 = fx * fy;
            for c in 0..channels {
                let a = row0[x0 * channels + c] as f32;
                let b = row0[x1 * channels + c] as f32;
                let d = row1[x0 * channels + c] as f32;
                let e = row1[x1 * channels + c] as f32;
                let value = a * w00 + b * w10 + d * w01 + e * w11;
                out.push(value.round().clamp(0.0, 255.0) as u8);
            }
        }
    }

    OwnedImage::new(out, dst_width, dst_height, channels)
}
