//! Owned contiguous `u8` image buffers and color conversion.

use crate::image::{ColorMode, ImageView};
use crate::util::{PctMatchError, PctMatchResult};

/// Owned contiguous image buffer with interleaved channels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
    channels: usize,
}

impl OwnedImage {
    /// Creates an image from a contiguous buffer of exactly
    /// `width * height * channels` elements.
    pub fn new(
        data: Vec<u8>,
        width: usize,
        height: usize,
        channels: usize,
    ) -> PctMatchResult<Self> {
        if width == 0 || height == 0 {
            return Err(PctMatchError::InvalidDimensions { width, height });
        }
        if channels != 1 && channels != 3 {
            return Err(PctMatchError::UnsupportedChannels { channels });
        }
        let needed = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(channels))
            .ok_or(PctMatchError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(PctMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(PctMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Creates an image with every element set to `value`.
    pub fn filled(width: usize, height: usize, channels: usize, value: u8) -> PctMatchResult<Self> {
        let len = width
            .checked_mul(height)
            .and_then(|v| v.checked_mul(channels))
            .ok_or(PctMatchError::InvalidDimensions { width, height })?;
        Self::new(vec![value; len], width, height, channels)
    }

    /// Copies a (possibly strided) view into a contiguous buffer.
    pub fn from_view(view: ImageView<'_, u8>) -> PctMatchResult<Self> {
        let row_len = view.width() * view.channels();
        let mut data = Vec::with_capacity(row_len * view.height());
        for y in 0..view.height() {
            let row = view.row(y).ok_or(PctMatchError::BufferTooSmall {
                needed: y * view.stride() + row_len,
                got: view.as_slice().len(),
            })?;
            data.extend_from_slice(row);
        }
        Self::new(data, view.width(), view.height(), view.channels())
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, u8> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            channels: self.channels,
            stride: self.width * self.channels,
        }
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the raw interleaved buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the raw interleaved buffer mutably.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the image and returns its buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Converts to the channel layout of `mode`.
    ///
    /// Color to gray uses BT.601 luma weights with rounding; gray to color
    /// replicates the channel.
    pub fn to_mode(&self, mode: ColorMode) -> OwnedImage {
        match (self.channels, mode) {
            (1, ColorMode::Gray) | (3, ColorMode::Color) => self.clone(),
            (3, ColorMode::Gray) => {
                let data = self
                    .data
                    .chunks_exact(3)
                    .map(|px| {
                        let luma =
                            0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
                        luma.round().clamp(0.0, 255.0) as u8
                    })
                    .collect();
                OwnedImage {
                    data,
                    width: self.width,
                    height: self.height,
                    channels: 1,
                }
            }
            _ => {
                let data = self.data.iter().flat_map(|&v| [v, v, v]).collect();
                OwnedImage {
                    data,
                    width: self.width,
                    height: self.height,
                    channels: 3,
                }
            }
        }
    }
}
