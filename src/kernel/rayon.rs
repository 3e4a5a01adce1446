//! Rayon row-parallel score-map evaluation (feature-gated).
//!
//! Rows of the placement grid are scored independently and concatenated in
//! order, so the map is identical to the one produced by
//! [`crate::kernel::scalar::score_map`].

use crate::candidate::ScoreMap;
use crate::kernel::scalar::placement_dims;
use crate::kernel::Kernel;
use crate::util::PctMatchResult;
use crate::ImageView;
use rayon::prelude::*;

/// Scores every valid placement, distributing rows across threads.
pub fn score_map_par<K: Kernel>(
    image: ImageView<'_, u8>,
    plan: &K::Plan,
) -> PctMatchResult<ScoreMap> {
    let (map_width, map_height) = placement_dims::<K>(image, plan)?;
    let rows: Vec<Vec<f32>> = (0..map_height)
        .into_par_iter()
        .map(|y| {
            (0..map_width)
                .map(|x| K::score_at(image, plan, x, y))
                .collect()
        })
        .collect();
    let data = rows.into_iter().flatten().collect();
    Ok(ScoreMap::from_vec(data, map_width, map_height).expect("score map shape matches buffer"))
}
