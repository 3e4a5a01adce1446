//! Timeline cleanup: gap filling and short-run removal.

use crate::timeline::{Presence, SampleRange, Timeline};

/// Turns raw presence labels into runs of sample indices.
pub trait TimelineCleaner {
    /// Returns the detected runs in increasing order.
    fn clean(&self, timeline: &Timeline) -> Vec<SampleRange>;
}

/// Gap-filling, run-length-filtering cleaner.
///
/// NotFound gaps of at most `max_gap` samples with Found on both sides are
/// relabelled Found. Runs of Found shorter than `min_run` samples are then
/// dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillFilterCleaner {
    /// Longest interior gap that is filled.
    pub max_gap: usize,
    /// Shortest run that is kept.
    pub min_run: usize,
}

impl Default for FillFilterCleaner {
    fn default() -> Self {
        Self {
            max_gap: 2,
            min_run: 2,
        }
    }
}

impl FillFilterCleaner {
    fn fill_gaps(&self, labels: &mut [Presence]) {
        let mut last_found: Option<usize> = None;
        for i in 0..labels.len() {
            if !labels[i].is_found() {
                continue;
            }
            if let Some(prev) = last_found {
                let gap = i - prev - 1;
                if gap > 0 && gap <= self.max_gap {
                    labels[prev + 1..i].fill(Presence::Found);
                }
            }
            last_found = Some(i);
        }
    }
}

impl TimelineCleaner for FillFilterCleaner {
    fn clean(&self, timeline: &Timeline) -> Vec<SampleRange> {
        let mut labels = timeline.labels().to_vec();
        self.fill_gaps(&mut labels);

        let mut runs = Vec::new();
        let mut run_start: Option<usize> = None;
        for (i, label) in labels.iter().enumerate() {
            match (label.is_found(), run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(first)) => {
                    runs.push(SampleRange { first, last: i - 1 });
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(first) = run_start {
            runs.push(SampleRange {
                first,
                last: labels.len() - 1,
            });
        }

        runs.retain(|run| run.last - run.first + 1 >= self.min_run);
        runs
    }
}
