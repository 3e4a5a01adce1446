//! Detection and refinement stages.
//!
//! [`FrameScorer`] scores one frame against one template, [`Calibrator`]
//! finds the working template scale and search band, and [`RangeRefiner`]
//! turns coarse ranges into frame-accurate ones.

pub mod calibrate;
pub mod refine;
pub mod score;

pub use calibrate::{CalibrationConfig, CalibrationSample, Calibrator, WorkingTemplate};
pub use refine::{Direction, RangeRefiner, RefineConfig};
pub use score::{FrameScorer, Metric, ScorerConfig};

use crate::util::{PctMatchError, PctMatchResult};

/// Horizontal band of rows `y_min..=y_max` spanning the full frame width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoiBand {
    y_min: usize,
    y_max: usize,
}

impl RoiBand {
    /// Creates a band, rejecting `y_min > y_max`.
    pub fn new(y_min: usize, y_max: usize) -> PctMatchResult<Self> {
        if y_min > y_max {
            return Err(PctMatchError::InvalidInput("roi band y_min exceeds y_max"));
        }
        Ok(Self { y_min, y_max })
    }

    /// Returns the bottom quarter of a frame of `height` rows.
    pub fn bottom_quarter(height: usize) -> Self {
        let y_max = height.saturating_sub(1);
        Self {
            y_min: (height * 3 / 4).min(y_max),
            y_max,
        }
    }

    /// Returns the vertical union of `boxes`, grown by `tolerance` rows on
    /// each side and clamped to `[0, height - 1]`.
    ///
    /// Box bottoms are exclusive edges (`y + height`), as in the boxes
    /// themselves. Returns `None` when `boxes` is empty.
    pub fn covering(boxes: &[BoundingBox], tolerance: usize, height: usize) -> Option<Self> {
        let top = boxes.iter().map(|b| b.y).min()?;
        let bottom = boxes.iter().map(|b| b.bottom()).max()?;
        let y_max = height.saturating_sub(1);
        let y_min = top.saturating_sub(tolerance).min(y_max);
        Some(Self {
            y_min,
            y_max: bottom.saturating_add(tolerance).min(y_max).max(y_min),
        })
    }

    /// Returns the first row of the band.
    pub fn y_min(&self) -> usize {
        self.y_min
    }

    /// Returns the last row of the band (inclusive).
    pub fn y_max(&self) -> usize {
        self.y_max
    }

    /// Returns the number of rows in the band.
    pub fn height(&self) -> usize {
        self.y_max - self.y_min + 1
    }
}

/// Axis-aligned box spanning `[x, x + width) x [y, y + height)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundingBox {
    /// Left column.
    pub x: usize,
    /// Top row.
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl BoundingBox {
    /// Returns the exclusive right edge.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Returns the exclusive bottom edge.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }
}

/// Confidence and location of one template match.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Correlation score at the match.
    pub confidence: f32,
    /// Matched region in full-frame coordinates.
    pub bbox: BoundingBox,
}

/// Half-open frame range `[start, stop)` sampled every `step` frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRange {
    start: usize,
    stop: usize,
    step: usize,
}

impl FrameRange {
    /// Creates a range, rejecting a zero step or `start > stop`.
    pub fn new(start: usize, stop: usize, step: usize) -> PctMatchResult<Self> {
        if step == 0 {
            return Err(PctMatchError::InvalidInput("frame step must be positive"));
        }
        if start > stop {
            return Err(PctMatchError::InvalidInput("frame range start exceeds stop"));
        }
        Ok(Self { start, stop, step })
    }

    /// Returns the first frame.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns one past the last frame.
    pub fn stop(&self) -> usize {
        self.stop
    }

    /// Returns the sampling step.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Iterates the sampled frame numbers in increasing order.
    pub fn frames(&self) -> impl Iterator<Item = usize> {
        (self.start..self.stop).step_by(self.step)
    }

    /// Returns the number of sampled frames.
    pub fn len(&self) -> usize {
        (self.stop - self.start).div_ceil(self.step)
    }

    /// Returns true when no frame is sampled.
    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }
}

/// Start and end frame of a detected run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchRange {
    /// First frame of the run.
    pub start: usize,
    /// Last frame of the run.
    pub end: usize,
}

#[cfg(test)]
mod tests {
    use super::{BoundingBox, FrameRange, RoiBand};

    fn bbox(y: usize, height: usize) -> BoundingBox {
        BoundingBox {
            x: 10,
            y,
            width: 25,
            height,
        }
    }

    #[test]
    fn bottom_quarter_of_360p_starts_at_270() {
        assert_eq!(RoiBand::bottom_quarter(360), RoiBand::new(270, 359).unwrap());
    }

    #[test]
    fn covering_band_grows_by_tolerance_and_clamps() {
        let boxes = [bbox(300, 18), bbox(296, 19), bbox(301, 18)];
        let band = RoiBand::covering(&boxes, 3, 360).unwrap();
        assert_eq!(band, RoiBand::new(293, 322).unwrap());

        let low = [bbox(1, 18), bbox(345, 14)];
        let band = RoiBand::covering(&low, 3, 360).unwrap();
        assert_eq!(band, RoiBand::new(0, 359).unwrap());
        assert!(RoiBand::covering(&[], 3, 360).is_none());
    }

    #[test]
    fn frame_range_counts_partial_last_step() {
        let range = FrameRange::new(0, 125, 60).unwrap();
        assert_eq!(range.frames().collect::<Vec<_>>(), vec![0, 60, 120]);
        assert_eq!(range.len(), 3);
        assert!(FrameRange::new(0, 10, 0).is_err());
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        assert!(FrameRange::new(10, 4, 1).is_err());
        assert!(RoiBand::new(50, 49).is_err());

        let empty = FrameRange::new(7, 7, 3).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);
        assert_eq!(empty.frames().count(), 0);

        let band = RoiBand::new(12, 12).unwrap();
        assert_eq!((band.y_min(), band.y_max(), band.height()), (12, 12, 1));
    }
}
