//! Frame-accurate boundary refinement around coarse ranges.
//!
//! Each boundary of a coarse range is walked outward at a fine step until
//! the indicator has been missing for a run of consecutive steps, or until
//! the walk reaches the first or the stop frame.

use crate::search::{FrameScorer, MatchRange, WorkingTemplate};
use crate::source::FrameSource;
use crate::trace::{trace_event, trace_span};
use crate::util::math::offset_clamped;
use crate::util::{PctMatchError, PctMatchResult};

/// Configuration for boundary refinement.
#[derive(Clone, Copy, Debug)]
pub struct RefineConfig {
    /// Frames advanced per refinement step.
    pub fine_step: usize,
    /// Consecutive misses that confirm a boundary.
    pub miss_streak_limit: usize,
    /// A frame counts as a hit when its score is strictly above this.
    pub threshold: f32,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            fine_step: 2,
            miss_streak_limit: 4,
            threshold: 0.8,
        }
    }
}

/// Walk direction for one boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Toward frame 0; used for range starts.
    Backward,
    /// Toward the stop frame; used for range ends.
    Forward,
}

/// Refines coarse ranges by walking each boundary frame by frame.
#[derive(Clone, Copy, Debug)]
pub struct RangeRefiner {
    cfg: RefineConfig,
    scorer: FrameScorer,
}

impl RangeRefiner {
    /// Creates a refiner, rejecting a zero step or miss limit.
    pub fn new(scorer: FrameScorer, cfg: RefineConfig) -> PctMatchResult<Self> {
        if cfg.fine_step == 0 {
            return Err(PctMatchError::InvalidInput("fine step must be positive"));
        }
        if cfg.miss_streak_limit == 0 {
            return Err(PctMatchError::InvalidInput("miss streak limit must be positive"));
        }
        Ok(Self { cfg, scorer })
    }

    /// Returns the refinement configuration.
    pub fn config(&self) -> &RefineConfig {
        &self.cfg
    }

    /// Refines every range, preserving order.
    ///
    /// Range starts are walked backward and range ends forward; the walk
    /// never passes frame 0 or `stop_frame`.
    pub fn refine<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        coarse: &[MatchRange],
        working: &WorkingTemplate,
        stop_frame: usize,
    ) -> PctMatchResult<Vec<MatchRange>> {
        let _span = trace_span!("refine_ranges", ranges = coarse.len()).entered();

        let mut boundaries = Vec::with_capacity(coarse.len() * 2);
        for (i, frame) in coarse.iter().flat_map(|r| [r.start, r.end]).enumerate() {
            let direction = if i % 2 == 0 {
                Direction::Backward
            } else {
                Direction::Forward
            };
            boundaries.push(self.refine_boundary(source, frame, direction, working, stop_frame)?);
        }

        Ok(boundaries
            .chunks_exact(2)
            .map(|pair| MatchRange {
                start: pair[0],
                end: pair[1],
            })
            .collect())
    }

    /// Walks from `frame` in `direction` and returns the confirmed boundary.
    ///
    /// The terminator (frame 0 backward, `stop_frame` forward) is checked
    /// before the frame is scored, so reaching it ends the walk at that frame
    /// regardless of the miss count. Otherwise the walk ends when the miss
    /// streak reaches the limit, reporting
    /// `current - step * (limit + 1)` in the walk direction.
    pub fn refine_boundary<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        frame: usize,
        direction: Direction,
        working: &WorkingTemplate,
        stop_frame: usize,
    ) -> PctMatchResult<usize> {
        let step = self.cfg.fine_step;
        let limit = self.cfg.miss_streak_limit;
        let (terminator, signed_step) = match direction {
            Direction::Backward => (0, -(step as i64)),
            Direction::Forward => (stop_frame, step as i64),
        };
        let mode = working.template().color_mode();

        let mut current = frame.min(stop_frame);
        let mut misses = 0usize;
        loop {
            if current == terminator {
                trace_event!("boundary_at_limit", from = frame, frame = current);
                return Ok(current);
            }

            let image = source.frame(current, mode)?;
            let hit = self
                .scorer
                .best(image.view(), working.template(), Some(working.roi()))?;
            if hit.confidence > self.cfg.threshold {
                misses = 0;
            } else {
                misses += 1;
            }

            if misses == limit {
                let boundary =
                    offset_clamped(current, -signed_step * (limit as i64 + 1), stop_frame);
                trace_event!("boundary_confirmed", from = frame, frame = boundary);
                return Ok(boundary);
            }

            current = match direction {
                Direction::Backward => current.saturating_sub(step),
                Direction::Forward => current.saturating_add(step).min(stop_frame),
            };
        }
    }
}
