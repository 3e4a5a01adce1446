//! Per-frame template scoring with iterative local-maximum suppression.

use crate::candidate::{extract_peaks, ScoreMap};
use crate::kernel::scalar::score_map;
use crate::kernel::{CcorrNormedScalar, Kernel, ZnccScalar};
use crate::search::{BoundingBox, Detection, RoiBand};
use crate::template::{CcorrPlan, Template, ZnccPlan};
use crate::util::{PctMatchError, PctMatchResult};
use crate::ImageView;

/// Correlation metric used to build score maps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Metric {
    /// Masked normalized cross-correlation (scores in `[0, 1]`).
    #[default]
    CcorrNormed,
    /// Masked zero-mean normalized cross-correlation (scores in `[-1, 1]`).
    Zncc,
}

/// Scoring configuration.
#[derive(Clone, Copy, Debug)]
pub struct ScorerConfig {
    /// Correlation metric.
    pub metric: Metric,
    /// Chebyshev radius zeroed around each extracted maximum.
    pub suppression_radius: usize,
    /// Compute score-map rows in parallel when the `rayon` feature is on.
    pub parallel: bool,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            metric: Metric::CcorrNormed,
            suppression_radius: 2,
            parallel: false,
        }
    }
}

/// Scores frames against a template.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameScorer {
    cfg: ScorerConfig,
}

impl FrameScorer {
    /// Creates a scorer with the given configuration.
    pub fn new(cfg: ScorerConfig) -> Self {
        Self { cfg }
    }

    /// Returns the scorer configuration.
    pub fn config(&self) -> &ScorerConfig {
        &self.cfg
    }

    /// Returns the `num_results` best distinct matches, best first.
    ///
    /// The frame is restricted to `roi` when given. Each extracted maximum
    /// zeroes its neighborhood before the next extraction, and locations are
    /// reported in full-frame coordinates.
    pub fn score(
        &self,
        frame: ImageView<'_, u8>,
        template: &Template,
        roi: Option<RoiBand>,
        num_results: usize,
    ) -> PctMatchResult<Vec<Detection>> {
        if num_results == 0 {
            return Ok(Vec::new());
        }
        let (search, y_offset) = match roi {
            Some(band) => (frame.band(band.y_min(), band.y_max())?, band.y_min()),
            None => (frame, 0),
        };

        let map = self.score_map(search, template)?;
        let peaks = extract_peaks(map, num_results, self.cfg.suppression_radius);
        Ok(peaks
            .into_iter()
            .map(|peak| Detection {
                confidence: peak.score,
                bbox: BoundingBox {
                    x: peak.x,
                    y: peak.y + y_offset,
                    width: template.width(),
                    height: template.height(),
                },
            })
            .collect())
    }

    /// Returns the single best match.
    pub fn best(
        &self,
        frame: ImageView<'_, u8>,
        template: &Template,
        roi: Option<RoiBand>,
    ) -> PctMatchResult<Detection> {
        self.score(frame, template, roi, 1)?
            .into_iter()
            .next()
            .ok_or(PctMatchError::InvalidInput("empty score map"))
    }

    fn score_map(&self, image: ImageView<'_, u8>, template: &Template) -> PctMatchResult<ScoreMap> {
        match self.cfg.metric {
            Metric::CcorrNormed => {
                let plan = CcorrPlan::from_template(template)?;
                self.run_kernel::<CcorrNormedScalar>(image, &plan)
            }
            Metric::Zncc => {
                let plan = ZnccPlan::from_template(template)?;
                self.run_kernel::<ZnccScalar>(image, &plan)
            }
        }
    }

    #[cfg(feature = "rayon")]
    fn run_kernel<K: Kernel>(
        &self,
        image: ImageView<'_, u8>,
        plan: &K::Plan,
    ) -> PctMatchResult<ScoreMap> {
        if self.cfg.parallel {
            crate::kernel::rayon::score_map_par::<K>(image, plan)
        } else {
            score_map::<K>(image, plan)
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn run_kernel<K: Kernel>(
        &self,
        image: ImageView<'_, u8>,
        plan: &K::Plan,
    ) -> PctMatchResult<ScoreMap> {
        score_map::<K>(image, plan)
    }
}
