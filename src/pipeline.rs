//! End-to-end percent-indicator matcher.
//!
//! [`PercentMatcher`] owns a [`SourceSession`] and runs calibration, the
//! coarse timeline sweep, timeline cleanup and boundary refinement in
//! order. Each stage is also callable on its own.

use std::ops::Range;

use crate::image::ColorMode;
use crate::search::{
    CalibrationConfig, CalibrationSample, Calibrator, Detection, FrameRange, FrameScorer,
    MatchRange, Metric, RangeRefiner, RefineConfig, ScorerConfig, WorkingTemplate,
};
use crate::source::{FrameSource, SourceSession, StopSignal};
use crate::template::{Template, TemplateStore};
use crate::timeline::{FillFilterCleaner, Timeline, TimelineBuilder, TimelineCleaner};
use crate::trace::{trace_event, trace_span};
use crate::util::{PctMatchError, PctMatchResult};
use crate::visual::{NullSink, SinkControl, VisualizationSink};

/// Configuration for [`PercentMatcher`].
#[derive(Clone, Debug)]
pub struct MatcherConfig {
    /// Frames between coarse timeline samples.
    pub step_size: usize,
    /// Half-open frame range `[start, stop)`; the whole source when `None`.
    pub frame_range: Option<(usize, usize)>,
    /// Frames drawn for scale calibration.
    pub init_samples: usize,
    /// Channel layout used for template and frames.
    pub color_mode: ColorMode,
    /// Search only the bottom quarter of the frame before calibration.
    pub roi_enabled: bool,
    /// Chebyshev radius suppressed around each extracted maximum.
    pub suppression_radius: usize,
    /// A detection counts when its confidence is strictly above this.
    pub confidence_threshold: f32,
    /// Template widths tried during calibration, half-open.
    pub calib_widths: Range<usize>,
    /// Rows added around the calibrated band.
    pub roi_tolerance: usize,
    /// Frames advanced per refinement step.
    pub fine_step: usize,
    /// Consecutive misses that confirm a boundary.
    pub miss_streak_limit: usize,
    /// Scale of the template used before calibration.
    pub initial_scale: f32,
    /// Longest timeline gap filled by the default cleaner.
    pub max_gap: usize,
    /// Shortest timeline run kept by the default cleaner.
    pub min_run: usize,
    /// Correlation metric.
    pub metric: Metric,
    /// Compute score maps in parallel (requires the `rayon` feature).
    pub parallel: bool,
    /// Calibration sampling seed; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            step_size: 60,
            frame_range: None,
            init_samples: 60,
            color_mode: ColorMode::Gray,
            roi_enabled: true,
            suppression_radius: 2,
            confidence_threshold: 0.8,
            calib_widths: 24..30,
            roi_tolerance: 3,
            fine_step: 2,
            miss_streak_limit: 4,
            initial_scale: 360.0 / 480.0,
            max_gap: 2,
            min_run: 2,
            metric: Metric::CcorrNormed,
            parallel: false,
            seed: None,
        }
    }
}

impl MatcherConfig {
    /// Returns the scorer settings.
    pub fn scorer_config(&self) -> ScorerConfig {
        ScorerConfig {
            metric: self.metric,
            suppression_radius: self.suppression_radius,
            parallel: self.parallel,
        }
    }

    /// Returns the calibration settings.
    pub fn calibration_config(&self) -> CalibrationConfig {
        CalibrationConfig {
            widths: self.calib_widths.clone(),
            samples: self.init_samples,
            threshold: self.confidence_threshold,
            roi_enabled: self.roi_enabled,
            roi_tolerance: self.roi_tolerance,
            seed: self.seed,
        }
    }

    /// Returns the refinement settings.
    pub fn refine_config(&self) -> RefineConfig {
        RefineConfig {
            fine_step: self.fine_step,
            miss_streak_limit: self.miss_streak_limit,
            threshold: self.confidence_threshold,
        }
    }

    /// Returns the default timeline cleaner.
    pub fn cleaner(&self) -> FillFilterCleaner {
        FillFilterCleaner {
            max_gap: self.max_gap,
            min_run: self.min_run,
        }
    }

    fn validate(&self) -> PctMatchResult<()> {
        if self.step_size == 0 {
            return Err(PctMatchError::InvalidInput("step size must be positive"));
        }
        if !self.confidence_threshold.is_finite() {
            return Err(PctMatchError::InvalidInput("confidence threshold must be finite"));
        }
        Ok(())
    }
}

/// Detections of one sampled frame from [`PercentMatcher::sweep`].
#[derive(Clone, Debug, PartialEq)]
pub struct SweepFrame {
    /// Frame number.
    pub frame: usize,
    /// Best distinct detections, best first.
    pub detections: Vec<Detection>,
}

/// One frame of [`PercentMatcher::calibration_sweep`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationProbe {
    /// Frame number.
    pub frame: usize,
    /// Best width on this frame.
    pub sample: CalibrationSample,
    /// Confidence of the uncalibrated initial template.
    pub initial_confidence: f32,
}

/// Percent-indicator range detector over one frame source.
pub struct PercentMatcher<S: FrameSource, V: VisualizationSink = NullSink> {
    session: SourceSession<S, V>,
    cfg: MatcherConfig,
    range: FrameRange,
    initial: Template,
    scorer: FrameScorer,
    calibrator: Calibrator,
    refiner: RangeRefiner,
    cleaner: Box<dyn TimelineCleaner>,
}

impl<S: FrameSource> PercentMatcher<S, NullSink> {
    /// Creates a matcher without a visualization sink.
    pub fn new(source: S, store: &TemplateStore, cfg: MatcherConfig) -> PctMatchResult<Self> {
        Self::with_sink(source, NullSink, store, cfg)
    }
}

impl<S: FrameSource, V: VisualizationSink> PercentMatcher<S, V> {
    /// Creates a matcher that shows diagnostics on `sink`.
    ///
    /// Validates the configuration, resolves the frame range against the
    /// source length and builds the initial template. The source is released
    /// if construction fails.
    pub fn with_sink(
        source: S,
        sink: V,
        store: &TemplateStore,
        cfg: MatcherConfig,
    ) -> PctMatchResult<Self> {
        let session = SourceSession::with_sink(source, sink);
        cfg.validate()?;
        let expected = cfg.color_mode.channels();
        let got = store.original().channels();
        if expected != got {
            return Err(PctMatchError::ChannelMismatch { expected, got });
        }

        let frame_count = session.frame_count();
        let (start, stop) = cfg.frame_range.unwrap_or((0, frame_count));
        if stop > frame_count {
            return Err(PctMatchError::InvalidInput("frame range exceeds source length"));
        }
        let range = FrameRange::new(start, stop, cfg.step_size)?;

        let scorer = FrameScorer::new(cfg.scorer_config());
        let calibrator = Calibrator::new(store, scorer, cfg.calibration_config())?;
        let refiner = RangeRefiner::new(scorer, cfg.refine_config())?;
        let initial = store.scaled(cfg.initial_scale)?;
        let cleaner = Box::new(cfg.cleaner());

        Ok(Self {
            session,
            cfg,
            range,
            initial,
            scorer,
            calibrator,
            refiner,
            cleaner,
        })
    }

    /// Replaces the timeline cleaner.
    pub fn with_cleaner<C: TimelineCleaner + 'static>(mut self, cleaner: C) -> Self {
        self.cleaner = Box::new(cleaner);
        self
    }

    /// Shares `stop` with the running matcher.
    pub fn with_stop_signal(self, stop: StopSignal) -> Self {
        Self {
            session: self.session.with_stop_signal(stop),
            ..self
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MatcherConfig {
        &self.cfg
    }

    /// Returns the resolved sampling range.
    pub fn frame_range(&self) -> FrameRange {
        self.range
    }

    /// Returns the pre-calibration template.
    pub fn initial_template(&self) -> &Template {
        &self.initial
    }

    /// Returns the stop signal checked before every frame fetch.
    pub fn stop_signal(&self) -> &StopSignal {
        self.session.stop_signal()
    }

    /// Calibrates the template scale and search band.
    pub fn initialize(&mut self) -> PctMatchResult<WorkingTemplate> {
        self.calibrator.initialize_scale(&mut self.session, self.range)
    }

    /// Labels every `step_size`-th frame of the range.
    pub fn timeline(&mut self, working: &WorkingTemplate) -> PctMatchResult<Timeline> {
        TimelineBuilder::new(self.scorer, self.cfg.confidence_threshold).build(
            &mut self.session,
            self.range,
            working,
        )
    }

    /// Cleans a timeline and maps the kept runs to frame ranges.
    pub fn coarse_ranges(&self, timeline: &Timeline) -> Vec<MatchRange> {
        timeline.to_match_ranges(&self.cleaner.clean(timeline))
    }

    /// Refines coarse ranges to frame accuracy.
    pub fn refine(
        &mut self,
        working: &WorkingTemplate,
        coarse: &[MatchRange],
    ) -> PctMatchResult<Vec<MatchRange>> {
        self.refiner.refine(&mut self.session, coarse, working, self.range.stop())
    }

    /// Runs every stage and returns the precise ranges.
    pub fn run(&mut self) -> PctMatchResult<Vec<MatchRange>> {
        let _span = trace_span!("percent_matcher").entered();

        let working = self.initialize()?;
        let timeline = self.timeline(&working)?;
        let coarse = self.coarse_ranges(&timeline);
        let precise = self.refine(&working, &coarse)?;
        trace_event!("ranges", coarse = coarse.len(), precise = precise.len());
        Ok(precise)
    }

    /// Scores every sampled frame and shows the `num_results` best
    /// detections on the sink.
    ///
    /// Uses the working template and band when given, otherwise the initial
    /// template with the default band. Ends early when the sink answers
    /// [`SinkControl::Stop`].
    pub fn sweep(
        &mut self,
        num_results: usize,
        working: Option<&WorkingTemplate>,
    ) -> PctMatchResult<Vec<SweepFrame>> {
        let template = working.map_or(&self.initial, |w| w.template());
        let mode = template.color_mode();
        let mut frames = Vec::with_capacity(self.range.len());
        for index in self.range.frames() {
            let image = self.session.frame(index, mode)?;
            let band = match working {
                Some(w) => Some(w.roi()),
                None => self.calibrator.default_band(image.height()),
            };
            let detections = self.scorer.score(image.view(), template, band, num_results)?;

            let boxes: Vec<_> = detections.iter().map(|d| d.bbox).collect();
            let label = detections
                .iter()
                .map(|d| format!("{:0.3}", d.confidence))
                .collect::<Vec<_>>()
                .join(" ");
            let control = self.session.show(image.view(), &boxes, &label);
            frames.push(SweepFrame {
                frame: index,
                detections,
            });
            if control == SinkControl::Stop {
                break;
            }
        }
        Ok(frames)
    }

    /// Calibrates every sampled frame independently and compares it with
    /// the initial template.
    ///
    /// Ends early when the sink answers [`SinkControl::Stop`].
    pub fn calibration_sweep(&mut self) -> PctMatchResult<Vec<CalibrationProbe>> {
        let mode = self.initial.color_mode();
        let mut probes = Vec::with_capacity(self.range.len());
        for index in self.range.frames() {
            let image = self.session.frame(index, mode)?;
            let sample = self.calibrator.calibrate(image.view(), None)?;
            let band = self.calibrator.default_band(image.height());
            let initial = self.scorer.best(image.view(), &self.initial, band)?;

            let label = format!(
                "({}, {}) {:0.3} -> {:0.3}",
                sample.width, sample.height, initial.confidence, sample.confidence
            );
            let control = self.session.show(image.view(), &[sample.bbox], &label);
            probes.push(CalibrationProbe {
                frame: index,
                sample,
                initial_confidence: initial.confidence,
            });
            if control == SinkControl::Stop {
                break;
            }
        }
        Ok(probes)
    }

    /// Releases the source and closes the sink.
    pub fn close(self) {
        self.session.close();
    }
}
