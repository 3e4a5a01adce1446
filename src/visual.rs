//! Optional display hook for diagnostics.

use crate::search::BoundingBox;
use crate::ImageView;

/// Answer of a sink after displaying a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SinkControl {
    /// Keep processing.
    Continue,
    /// Stop the running pass.
    Stop,
}

/// Receives frames with detection boxes for display.
///
/// Sinks are a debugging aid; no result depends on them.
pub trait VisualizationSink {
    /// Displays `frame` with `boxes` and a text label.
    fn show(
        &mut self,
        frame: ImageView<'_, u8>,
        boxes: &[BoundingBox],
        label: &str,
    ) -> SinkControl;

    /// Closes any display resources.
    fn close(&mut self) {}
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl VisualizationSink for NullSink {
    fn show(
        &mut self,
        _frame: ImageView<'_, u8>,
        _boxes: &[BoundingBox],
        _label: &str,
    ) -> SinkControl {
        SinkControl::Continue
    }
}

impl<V: VisualizationSink + ?Sized> VisualizationSink for &mut V {
    fn show(
        &mut self,
        frame: ImageView<'_, u8>,
        boxes: &[BoundingBox],
        label: &str,
    ) -> SinkControl {
        (**self).show(frame, boxes, label)
    }

    fn close(&mut self) {
        (**self).close()
    }
}
