//! Sampled presence timeline and its conversion to frame ranges.
//!
//! [`TimelineBuilder`] labels every sampled frame, a [`TimelineCleaner`]
//! turns the noisy labels into runs of sample indices, and
//! [`Timeline::to_match_ranges`] maps those runs back to frame numbers.

mod build;
mod cleanup;

pub use build::TimelineBuilder;
pub use cleanup::{FillFilterCleaner, TimelineCleaner};

use crate::search::MatchRange;

/// Whether the indicator was detected on a sampled frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presence {
    /// Detected with confidence above the threshold.
    Found,
    /// Not detected.
    NotFound,
}

impl Presence {
    /// Returns true for [`Presence::Found`].
    pub fn is_found(self) -> bool {
        self == Presence::Found
    }
}

/// Inclusive run `first..=last` of sample indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleRange {
    /// First sample of the run.
    pub first: usize,
    /// Last sample of the run.
    pub last: usize,
}

/// Presence labels for frames `start, start + step, ...`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeline {
    start: usize,
    step: usize,
    labels: Vec<Presence>,
}

impl Timeline {
    /// Creates a timeline whose sample `i` is frame `start + i * step`.
    pub fn new(start: usize, step: usize, labels: Vec<Presence>) -> Self {
        Self { start, step, labels }
    }

    /// Returns the first sampled frame.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the sampling step.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Returns the per-sample labels.
    pub fn labels(&self) -> &[Presence] {
        &self.labels
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true when nothing was sampled.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the number of samples labelled [`Presence::Found`].
    pub fn found_count(&self) -> usize {
        self.labels.iter().filter(|p| p.is_found()).count()
    }

    /// Returns the frame number of sample `index`.
    pub fn frame_of(&self, index: usize) -> usize {
        self.start + index * self.step
    }

    /// Maps sample runs to coarse frame ranges, preserving order.
    pub fn to_match_ranges(&self, runs: &[SampleRange]) -> Vec<MatchRange> {
        runs.iter()
            .map(|run| MatchRange {
                start: self.frame_of(run.first),
                end: self.frame_of(run.last),
            })
            .collect()
    }
}
