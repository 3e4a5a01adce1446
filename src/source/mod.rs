//! Frame sources and their scoped ownership.
//!
//! A [`FrameSource`] hands out decoded frames by number. Sources are owned
//! by a [`SourceSession`], which releases them exactly once whether the
//! pipeline finishes, fails or is stopped.

#[cfg(feature = "image-io")]
mod sequence;
mod session;

#[cfg(feature = "image-io")]
pub use sequence::ImageSequenceSource;
pub use session::{SourceSession, StopSignal};

use crate::image::{ColorMode, OwnedImage};
use crate::util::{PctMatchError, PctMatchResult};

/// Random-access source of decoded video frames.
pub trait FrameSource {
    /// Returns the number of frames the source reports.
    fn frame_count(&self) -> usize;

    /// Returns frame `index` in the channel layout of `mode`.
    ///
    /// Fails with [`PctMatchError::EndOfStream`] past the last frame and
    /// [`PctMatchError::Decode`] when a frame cannot be decoded.
    fn frame(&mut self, index: usize, mode: ColorMode) -> PctMatchResult<OwnedImage>;

    /// Releases any underlying handle. Called once by [`SourceSession`].
    fn release(&mut self) {}
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn frame_count(&self) -> usize {
        (**self).frame_count()
    }

    fn frame(&mut self, index: usize, mode: ColorMode) -> PctMatchResult<OwnedImage> {
        (**self).frame(index, mode)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn frame_count(&self) -> usize {
        (**self).frame_count()
    }

    fn frame(&mut self, index: usize, mode: ColorMode) -> PctMatchResult<OwnedImage> {
        (**self).frame(index, mode)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Frame source backed by decoded frames held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    frames: Vec<OwnedImage>,
    fetches: usize,
    released: bool,
}

impl MemorySource {
    /// Wraps a sequence of frames; frame `i` is `frames[i]`.
    pub fn new(frames: Vec<OwnedImage>) -> Self {
        Self {
            frames,
            fetches: 0,
            released: false,
        }
    }

    /// Returns how many frames have been fetched.
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    /// Returns true once the source has been released.
    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl FrameSource for MemorySource {
    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame(&mut self, index: usize, mode: ColorMode) -> PctMatchResult<OwnedImage> {
        let frame = self.frames.get(index).ok_or(PctMatchError::EndOfStream {
            frame: index,
            frame_count: self.frames.len(),
        })?;
        self.fetches += 1;
        Ok(frame.to_mode(mode))
    }

    fn release(&mut self) {
        self.released = true;
    }
}
