//! Scoped ownership of a frame source and its display sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::image::{ColorMode, OwnedImage};
use crate::search::BoundingBox;
use crate::source::FrameSource;
use crate::util::{PctMatchError, PctMatchResult};
use crate::visual::{NullSink, SinkControl, VisualizationSink};
use crate::ImageView;

/// Shared flag that asks a running pipeline to stop.
///
/// Clones share the same flag, so a handle kept by a signal handler or
/// another thread can stop a pipeline it does not own.
#[derive(Clone, Debug, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// Creates a lowered signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the signal.
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once the signal has been raised.
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Exclusive owner of a frame source and visualization sink.
///
/// The source is released and the sink closed exactly once: by
/// [`SourceSession::close`], or on drop for every other exit path. Frame
/// fetches fail with [`PctMatchError::Stopped`] once the stop signal is
/// raised.
pub struct SourceSession<S: FrameSource, V: VisualizationSink = NullSink> {
    source: S,
    sink: V,
    stop: StopSignal,
    released: bool,
}

impl<S: FrameSource> SourceSession<S, NullSink> {
    /// Opens a session without a visualization sink.
    pub fn new(source: S) -> Self {
        Self::with_sink(source, NullSink)
    }
}

impl<S: FrameSource, V: VisualizationSink> SourceSession<S, V> {
    /// Opens a session that forwards diagnostics to `sink`.
    pub fn with_sink(source: S, sink: V) -> Self {
        Self {
            source,
            sink,
            stop: StopSignal::new(),
            released: false,
        }
    }

    /// Replaces the stop signal with a shared one.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Returns the stop signal observed by this session.
    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Returns the wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Sends a frame and its boxes to the sink and returns its answer.
    pub fn show(
        &mut self,
        frame: ImageView<'_, u8>,
        boxes: &[BoundingBox],
        label: &str,
    ) -> SinkControl {
        self.sink.show(frame, boxes, label)
    }

    /// Releases the source and closes the sink.
    pub fn close(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.source.release();
        self.sink.close();
    }
}

impl<S: FrameSource, V: VisualizationSink> FrameSource for SourceSession<S, V> {
    fn frame_count(&self) -> usize {
        self.source.frame_count()
    }

    fn frame(&mut self, index: usize, mode: ColorMode) -> PctMatchResult<OwnedImage> {
        if self.stop.is_raised() {
            return Err(PctMatchError::Stopped);
        }
        if self.released {
            return Err(PctMatchError::InvalidInput("frame source already released"));
        }
        self.source.frame(index, mode)
    }

    fn release(&mut self) {
        self.release_once();
    }
}

impl<S: FrameSource, V: VisualizationSink> Drop for SourceSession<S, V> {
    fn drop(&mut self) {
        self.release_once();
    }
}
