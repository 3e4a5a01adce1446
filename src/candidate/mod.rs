//! Score maps and peak extraction.
//!
//! Peaks are extracted greedily: take the global maximum, zero a square
//! neighborhood around it, repeat.

pub(crate) mod map;
pub(crate) mod nms;

pub use map::ScoreMap;
pub use nms::{extract_peaks, Peak};
