//! PctMatch locates the frame ranges in which a percent indicator is shown
//! on screen in a video.
//!
//! The pipeline calibrates the template scale on random frames, sweeps the
//! video at a coarse step to label each sample, cleans the labels into runs
//! and walks each run boundary frame by frame. Scores are masked normalized
//! cross-correlation computed by scalar kernels, with optional row
//! parallelism via the `rayon` feature.

mod candidate;
pub mod image;
pub mod kernel;
pub mod pipeline;
pub mod search;
pub mod source;
pub mod template;
pub mod timeline;
mod trace;
pub mod util;
pub mod visual;

pub use candidate::ScoreMap;
pub use crate::image::{ColorMode, ImageView, OwnedImage};
pub use kernel::Kernel;
pub use pipeline::{CalibrationProbe, MatcherConfig, PercentMatcher, SweepFrame};
pub use search::{
    BoundingBox, CalibrationConfig, CalibrationSample, Calibrator, Detection, Direction,
    FrameRange, FrameScorer, MatchRange, Metric, RangeRefiner, RefineConfig, RoiBand,
    ScorerConfig, WorkingTemplate,
};
#[cfg(feature = "image-io")]
pub use source::ImageSequenceSource;
pub use source::{FrameSource, MemorySource, SourceSession, StopSignal};
pub use template::{Template, TemplateStore};
pub use timeline::{
    FillFilterCleaner, Presence, SampleRange, Timeline, TimelineBuilder, TimelineCleaner,
};
pub use util::{PctMatchError, PctMatchResult};
pub use visual::{NullSink, SinkControl, VisualizationSink};
