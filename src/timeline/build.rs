//! Coarse presence labelling over a sampled frame range.

use crate::search::{FrameRange, FrameScorer, WorkingTemplate};
use crate::source::FrameSource;
use crate::timeline::{Presence, Timeline};
use crate::trace::{trace_event, trace_frame, trace_span};
use crate::util::PctMatchResult;

/// Labels every sampled frame of a range.
#[derive(Clone, Copy, Debug)]
pub struct TimelineBuilder {
    scorer: FrameScorer,
    threshold: f32,
}

impl TimelineBuilder {
    /// Creates a builder; a frame is Found when its best score is strictly
    /// above `threshold`.
    pub fn new(scorer: FrameScorer, threshold: f32) -> Self {
        Self { scorer, threshold }
    }

    /// Scores frames `start, start + step, ...` below the exclusive stop of
    /// `range` inside the working band.
    pub fn build<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        range: FrameRange,
        working: &WorkingTemplate,
    ) -> PctMatchResult<Timeline> {
        let _span = trace_span!("build_timeline", samples = range.len()).entered();

        let mode = working.template().color_mode();
        let mut labels = Vec::with_capacity(range.len());
        for index in range.frames() {
            let frame = source.frame(index, mode)?;
            let hit = self
                .scorer
                .best(frame.view(), working.template(), Some(working.roi()))?;
            trace_frame!("timeline_sample", frame = index, confidence = hit.confidence);
            labels.push(if hit.confidence > self.threshold {
                Presence::Found
            } else {
                Presence::NotFound
            });
        }

        let timeline = Timeline::new(range.start(), range.step(), labels);
        trace_event!(
            "timeline_built",
            samples = timeline.len(),
            found = timeline.found_count()
        );
        Ok(timeline)
    }
}
