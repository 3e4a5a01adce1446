//! Image views, owned buffers and resampling.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer of interleaved
//! channels with an explicit stride. The stride counts elements between the
//! starts of consecutive rows, so a stride larger than `width * channels`
//! represents padded rows. Band slices are zero-copy views into the same
//! backing slice and retain the original stride.
//!
//! Coordinates are `(x, y)` = (column, row) throughout the crate.

use crate::util::{PctMatchError, PctMatchResult};

#[cfg(feature = "image-io")]
pub mod io;
mod owned;
pub mod resize;

pub use owned::OwnedImage;

/// Color layout requested from frame sources and template loaders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Single luma channel.
    #[default]
    Gray,
    /// Three interleaved channels in source order (RGB for decoded files).
    Color,
}

impl ColorMode {
    /// Returns the number of interleaved channels for this mode.
    pub fn channels(self) -> usize {
        match self {
            ColorMode::Gray => 1,
            ColorMode::Color => 3,
        }
    }
}

/// Borrowed 2D image view with interleaved channels and an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width * channels`.
    pub fn from_slice(
        data: &'a [T],
        width: usize,
        height: usize,
        channels: usize,
    ) -> PctMatchResult<Self> {
        let stride = width.saturating_mul(channels);
        Self::new(data, width, height, channels, stride)
    }

    /// Creates a view with an explicit stride in elements.
    pub fn new(
        data: &'a [T],
        width: usize,
        height: usize,
        channels: usize,
        stride: usize,
    ) -> PctMatchResult<Self> {
        let needed = required_len(width, height, channels, stride)?;
        if data.len() < needed {
            return Err(PctMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
            stride,
        })
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

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element of channel `c` at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize, c: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height || c >= self.channels {
            return None;
        }
        let idx = y
            .checked_mul(self.stride)?
            .checked_add(x.checked_mul(self.channels)?)?
            .checked_add(c)?;
        self.data.get(idx)
    }

    /// Returns row `y` as a slice of `width * channels` elements.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width * self.channels)?;
        self.data.get(start..end)
    }

    /// Returns a zero-copy view of rows `y_min..=y_max` at full width.
    pub fn band(&self, y_min: usize, y_max: usize) -> PctMatchResult<ImageView<'a, T>> {
        if y_min > y_max || y_max >= self.height {
            return Err(PctMatchError::RoiOutOfBounds {
                y_min,
                y_max,
                height: self.height,
            });
        }
        let start = y_min
            .checked_mul(self.stride)
            .ok_or(PctMatchError::InvalidDimensions {
                width: self.width,
                height: self.height,
            })?;
        let data = self
            .data
            .get(start..)
            .ok_or(PctMatchError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;
        ImageView::new(
            data,
            self.width,
            y_max - y_min + 1,
            self.channels,
            self.stride,
        )
    }
}

fn required_len(
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
) -> PctMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(PctMatchError::InvalidDimensions { width, height });
    }
    if channels != 1 && channels != 3 {
        return Err(PctMatchError::UnsupportedChannels { channels });
    }
    let row_len = width
        .checked_mul(channels)
        .ok_or(PctMatchError::InvalidDimensions { width, height })?;
    if stride < row_len {
        return Err(PctMatchError::InvalidStride { row_len, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(row_len))
        .ok_or(PctMatchError::InvalidDimensions { width, height })
}
