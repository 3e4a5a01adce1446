//! Correlation kernels that fill score maps.
//!
//! A kernel scores a single placement; [`scalar::score_map`] and, with the
//! `rayon` feature, [`rayon::score_map_par`] evaluate every valid placement
//! of the template inside an image.

use crate::ImageView;

/// Kernel trait for masked correlation metrics.
pub trait Kernel {
    /// Precomputed template statistics.
    type Plan: Sync;

    /// Returns `(width, height, channels)` of the planned template.
    fn shape(plan: &Self::Plan) -> (usize, usize, usize);

    /// Scores the placement with top-left `(x, y)`.
    ///
    /// Callers guarantee the template fits at `(x, y)` and that channel
    /// counts agree. Degenerate windows score 0.
    fn score_at(image: ImageView<'_, u8>, plan: &Self::Plan, x: usize, y: usize) -> f32;
}

pub mod scalar;

#[cfg(feature = "rayon")]
pub mod rayon;

pub(crate) use scalar::{CcorrNormedScalar, ZnccScalar};
