//! Template scale calibration.
//!
//! The on-screen indicator is rendered at an unknown scale. Calibration
//! scores a small bank of template widths on randomly drawn frames, takes
//! the median of the confident winners as the working width, and derives a
//! search band from where those winners were found.

use std::ops::Range;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::search::{BoundingBox, FrameRange, FrameScorer, RoiBand};
use crate::source::FrameSource;
use crate::template::{Template, TemplateStore};
use crate::trace::{trace_event, trace_frame, trace_span};
use crate::util::math::median_truncated;
use crate::util::{PctMatchError, PctMatchResult};
use crate::ImageView;

/// Configuration for scale calibration.
#[derive(Clone, Debug)]
pub struct CalibrationConfig {
    /// Template widths searched, half-open.
    pub widths: Range<usize>,
    /// Number of frames drawn for calibration.
    pub samples: usize,
    /// Samples must score strictly above this to be kept.
    pub threshold: f32,
    /// Restrict uncalibrated searches to the bottom quarter of the frame.
    pub roi_enabled: bool,
    /// Rows added above and below the union of kept boxes.
    pub roi_tolerance: usize,
    /// Seed for frame sampling; `None` draws a seed from the OS.
    pub seed: Option<u64>,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            widths: 24..30,
            samples: 60,
            threshold: 0.8,
            roi_enabled: true,
            roi_tolerance: 3,
            seed: None,
        }
    }
}

/// Best match of the width bank on one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationSample {
    /// Matched region in full-frame coordinates.
    pub bbox: BoundingBox,
    /// Score of the winning width.
    pub confidence: f32,
    /// Winning template width.
    pub width: usize,
    /// Height of the winning template.
    pub height: usize,
}

/// Calibrated template and search band used by all later stages.
#[derive(Clone, Debug)]
pub struct WorkingTemplate {
    template: Template,
    roi: RoiBand,
}

impl WorkingTemplate {
    /// Pairs a template with the band it is searched in.
    pub fn new(template: Template, roi: RoiBand) -> Self {
        Self { template, roi }
    }

    /// Returns the scaled template.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Returns the search band.
    pub fn roi(&self) -> RoiBand {
        self.roi
    }

    /// Returns the template width.
    pub fn width(&self) -> usize {
        self.template.width()
    }
}

/// Multi-scale calibrator over a precomputed bank of template widths.
pub struct Calibrator {
    cfg: CalibrationConfig,
    scorer: FrameScorer,
    original: Template,
    bank: Vec<Template>,
}

impl Calibrator {
    /// Builds the width bank from the stored original template.
    pub fn new(
        store: &TemplateStore,
        scorer: FrameScorer,
        cfg: CalibrationConfig,
    ) -> PctMatchResult<Self> {
        if cfg.widths.is_empty() {
            return Err(PctMatchError::InvalidInput("calibration width range is empty"));
        }
        if cfg.samples == 0 {
            return Err(PctMatchError::InvalidInput("calibration needs at least one sample"));
        }
        let bank = cfg
            .widths
            .clone()
            .map(|width| store.resize(width))
            .collect::<PctMatchResult<Vec<_>>>()?;
        Ok(Self {
            cfg,
            scorer,
            original: store.original().clone(),
            bank,
        })
    }

    /// Returns the calibration configuration.
    pub fn config(&self) -> &CalibrationConfig {
        &self.cfg
    }

    /// Returns the band searched when no band is supplied.
    pub fn default_band(&self, frame_height: usize) -> Option<RoiBand> {
        self.cfg
            .roi_enabled
            .then(|| RoiBand::bottom_quarter(frame_height))
    }

    /// Finds the width whose template best matches `frame`.
    ///
    /// Widths are tried in increasing order and a later width replaces the
    /// current best only with a strictly higher confidence, so ties keep the
    /// smaller width.
    pub fn calibrate(
        &self,
        frame: ImageView<'_, u8>,
        roi: Option<RoiBand>,
    ) -> PctMatchResult<CalibrationSample> {
        let band = roi.or_else(|| self.default_band(frame.height()));
        let mut best: Option<CalibrationSample> = None;
        for tpl in &self.bank {
            let hit = self.scorer.best(frame, tpl, band)?;
            let better = match &best {
                Some(current) => hit.confidence > current.confidence,
                None => true,
            };
            if better {
                best = Some(CalibrationSample {
                    bbox: hit.bbox,
                    confidence: hit.confidence,
                    width: tpl.width(),
                    height: tpl.height(),
                });
            }
        }
        best.ok_or(PctMatchError::InvalidInput("calibration width range is empty"))
    }

    /// Draws the calibration frame numbers uniformly from `range`.
    pub fn sample_frames(&self, range: FrameRange) -> PctMatchResult<Vec<usize>> {
        if range.is_empty() {
            return Err(PctMatchError::InvalidInput("cannot sample an empty frame range"));
        }
        let mut rng = match self.cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok((0..self.cfg.samples)
            .map(|_| rng.random_range(range.start()..range.stop()))
            .collect())
    }

    /// Calibrates on sampled frames and returns the working template.
    ///
    /// Fails with [`PctMatchError::CalibrationFailed`] when no sample scores
    /// above the threshold.
    pub fn initialize_scale<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        range: FrameRange,
    ) -> PctMatchResult<WorkingTemplate> {
        let _span = trace_span!("initialize_scale", samples = self.cfg.samples).entered();

        let mode = self.original.color_mode();
        let mut widths = Vec::new();
        let mut boxes = Vec::new();
        let mut frame_height = 0;
        for index in self.sample_frames(range)? {
            let frame = source.frame(index, mode)?;
            frame_height = frame.height();
            let sample = self.calibrate(frame.view(), None)?;
            trace_frame!(
                "calibration_sample",
                frame = index,
                width = sample.width,
                confidence = sample.confidence
            );
            if sample.confidence > self.cfg.threshold {
                widths.push(sample.width);
                boxes.push(sample.bbox);
            }
        }

        let failed = || PctMatchError::CalibrationFailed {
            samples: self.cfg.samples,
            threshold: self.cfg.threshold,
        };
        let width = median_truncated(&widths).ok_or_else(failed)?;
        let roi =
            RoiBand::covering(&boxes, self.cfg.roi_tolerance, frame_height).ok_or_else(failed)?;
        let template = self.original.resized_to_width(width)?;

        trace_event!(
            "calibrated",
            kept = widths.len(),
            width = width,
            height = template.height(),
            y_min = roi.y_min(),
            y_max = roi.y_max()
        );
        Ok(WorkingTemplate::new(template, roi))
    }
}
