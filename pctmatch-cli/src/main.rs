use clap::Parser;
use pctmatch::{
    BoundingBox, CalibrationProbe, ColorMode, ImageSequenceSource, MatchRange, MatcherConfig,
    Metric, PercentMatcher, SweepFrame, TemplateStore, WorkingTemplate,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Percent indicator range finder (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for stage timings and results.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MetricConfig {
    CcorrNormed,
    Zncc,
}

impl From<MetricConfig> for Metric {
    fn from(value: MetricConfig) -> Self {
        match value {
            MetricConfig::CcorrNormed => Metric::CcorrNormed,
            MetricConfig::Zncc => Metric::Zncc,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Mode {
    /// Full pipeline; prints refined ranges.
    #[default]
    Run,
    /// Calibration only; prints the working width and band.
    Initialize,
    /// Top detections on every sampled frame.
    Sweep,
    /// Per-frame calibration results.
    Calibrate,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MatcherConfigJson {
    step_size: usize,
    frame_range: Option<[usize; 2]>,
    init_samples: usize,
    grayscale: bool,
    roi_enabled: bool,
    suppression_radius: usize,
    confidence_threshold: f32,
    calib_widths: [usize; 2],
    roi_tolerance: usize,
    fine_step: usize,
    miss_streak_limit: usize,
    initial_scale: f32,
    max_gap: usize,
    min_run: usize,
    metric: MetricConfig,
    parallel: bool,
    seed: Option<u64>,
}

impl Default for MatcherConfigJson {
    fn default() -> Self {
        let cfg = MatcherConfig::default();
        Self {
            step_size: cfg.step_size,
            frame_range: None,
            init_samples: cfg.init_samples,
            grayscale: cfg.color_mode == ColorMode::Gray,
            roi_enabled: cfg.roi_enabled,
            suppression_radius: cfg.suppression_radius,
            confidence_threshold: cfg.confidence_threshold,
            calib_widths: [cfg.calib_widths.start, cfg.calib_widths.end],
            roi_tolerance: cfg.roi_tolerance,
            fine_step: cfg.fine_step,
            miss_streak_limit: cfg.miss_streak_limit,
            initial_scale: cfg.initial_scale,
            max_gap: cfg.max_gap,
            min_run: cfg.min_run,
            metric: MetricConfig::CcorrNormed,
            parallel: cfg.parallel,
            seed: cfg.seed,
        }
    }
}

impl From<MatcherConfigJson> for MatcherConfig {
    fn from(value: MatcherConfigJson) -> Self {
        Self {
            step_size: value.step_size,
            frame_range: value.frame_range.map(|[start, stop]| (start, stop)),
            init_samples: value.init_samples,
            color_mode: if value.grayscale {
                ColorMode::Gray
            } else {
                ColorMode::Color
            },
            roi_enabled: value.roi_enabled,
            suppression_radius: value.suppression_radius,
            confidence_threshold: value.confidence_threshold,
            calib_widths: value.calib_widths[0]..value.calib_widths[1],
            roi_tolerance: value.roi_tolerance,
            fine_step: value.fine_step,
            miss_streak_limit: value.miss_streak_limit,
            initial_scale: value.initial_scale,
            max_gap: value.max_gap,
            min_run: value.min_run,
            metric: value.metric.into(),
            parallel: value.parallel,
            seed: value.seed,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    frames_dir: String,
    template_path: String,
    output_path: Option<String>,
    mode: Mode,
    sweep_results: usize,
    matcher: MatcherConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frames_dir: String::new(),
            template_path: "resources/pct.png".to_string(),
            output_path: None,
            mode: Mode::Run,
            sweep_results: 4,
            matcher: MatcherConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RangeRecord {
    start: usize,
    end: usize,
}

impl From<MatchRange> for RangeRecord {
    fn from(value: MatchRange) -> Self {
        Self {
            start: value.start,
            end: value.end,
        }
    }
}

#[derive(Debug, Serialize)]
struct BoxRecord {
    x: usize,
    y: usize,
    width: usize,
    height: usize,
}

impl From<BoundingBox> for BoxRecord {
    fn from(value: BoundingBox) -> Self {
        Self {
            x: value.x,
            y: value.y,
            width: value.width,
            height: value.height,
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    confidence: f32,
    bbox: BoxRecord,
}

#[derive(Debug, Serialize)]
struct SweepRecord {
    frame: usize,
    detections: Vec<DetectionRecord>,
}

impl From<SweepFrame> for SweepRecord {
    fn from(value: SweepFrame) -> Self {
        Self {
            frame: value.frame,
            detections: value
                .detections
                .into_iter()
                .map(|d| DetectionRecord {
                    confidence: d.confidence,
                    bbox: d.bbox.into(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ProbeRecord {
    frame: usize,
    width: usize,
    height: usize,
    confidence: f32,
    initial_confidence: f32,
    bbox: BoxRecord,
}

impl From<CalibrationProbe> for ProbeRecord {
    fn from(value: CalibrationProbe) -> Self {
        Self {
            frame: value.frame,
            width: value.sample.width,
            height: value.sample.height,
            confidence: value.sample.confidence,
            initial_confidence: value.initial_confidence,
            bbox: value.sample.bbox.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct WorkingRecord {
    width: usize,
    height: usize,
    roi_y_min: usize,
    roi_y_max: usize,
}

impl From<&WorkingTemplate> for WorkingRecord {
    fn from(value: &WorkingTemplate) -> Self {
        Self {
            width: value.width(),
            height: value.template().height(),
            roi_y_min: value.roi().y_min(),
            roi_y_max: value.roi().y_max(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Output {
    Ranges { ranges: Vec<RangeRecord> },
    Working { working: WorkingRecord },
    Sweep { frames: Vec<SweepRecord> },
    Calibration { probes: Vec<ProbeRecord> },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("pctmatch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.frames_dir.is_empty() {
        return Err("frames_dir must be set in the config".into());
    }
    let [lo, hi] = config.matcher.calib_widths;
    if lo >= hi {
        return Err("calib_widths must be an increasing [start, end) pair".into());
    }

    let matcher_cfg = MatcherConfig::from(config.matcher);
    let store = TemplateStore::load(&config.template_path, matcher_cfg.color_mode)?;
    let source = ImageSequenceSource::open(&config.frames_dir)?;
    let mut matcher = PercentMatcher::new(source, &store, matcher_cfg)?;

    let output = match config.mode {
        Mode::Run => Output::Ranges {
            ranges: matcher.run()?.into_iter().map(RangeRecord::from).collect(),
        },
        Mode::Initialize => Output::Working {
            working: WorkingRecord::from(&matcher.initialize()?),
        },
        Mode::Sweep => Output::Sweep {
            frames: matcher
                .sweep(config.sweep_results, None)?
                .into_iter()
                .map(SweepRecord::from)
                .collect(),
        },
        Mode::Calibrate => Output::Calibration {
            probes: matcher
                .calibration_sweep()?
                .into_iter()
                .map(ProbeRecord::from)
                .collect(),
        },
    };
    matcher.close();

    let json = serde_json::to_string_pretty(&output)?;
    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
