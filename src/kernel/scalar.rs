//! Scalar reference kernels and score-map evaluation.

use crate::candidate::ScoreMap;
use crate::kernel::Kernel;
use crate::template::{CcorrPlan, ZnccPlan};
use crate::util::{PctMatchError, PctMatchResult};
use crate::ImageView;

/// Scalar masked normalized cross-correlation kernel.
pub(crate) struct CcorrNormedScalar;

/// Scalar masked zero-mean normalized cross-correlation kernel.
pub(crate) struct ZnccScalar;

impl Kernel for CcorrNormedScalar {
    type Plan = CcorrPlan;

    fn shape(plan: &Self::Plan) -> (usize, usize, usize) {
        (plan.width(), plan.height(), plan.channels())
    }

    fn score_at(image: ImageView<'_, u8>, plan: &Self::Plan, x: usize, y: usize) -> f32 {
        let channels = plan.channels();
        let row_len = plan.width() * channels;
        let weights = plan.weights();
        let weighted_t = plan.weighted_t();

        let mut dot = 0.0f32;
        let mut sum_i2 = 0.0f32;
        for ty in 0..plan.height() {
            let img_row = image.row(y + ty).expect("row within bounds for score");
            let window = &img_row[x * channels..x * channels + row_len];
            let base = ty * row_len;
            for (k, &value) in window.iter().enumerate() {
                let idx = base + k;
                let w = weights[idx];
                if w == 0.0 {
                    continue;
                }
                let v = value as f32;
                dot += weighted_t[idx] * v;
                sum_i2 += w * v * v;
            }
        }

        let denom = (plan.sum_wt2() * sum_i2).sqrt();
        if denom <= f32::EPSILON {
            return 0.0;
        }
        let score = dot / denom;
        if score.is_finite() {
            score
        } else {
            0.0
        }
    }
}

impl Kernel for ZnccScalar {
    type Plan = ZnccPlan;

    fn shape(plan: &Self::Plan) -> (usize, usize, usize) {
        (plan.width(), plan.height(), plan.channels())
    }

    fn score_at(image: ImageView<'_, u8>, plan: &Self::Plan, x: usize, y: usize) -> f32 {
        let channels = plan.channels();
        let row_len = plan.width() * channels;
        let weights = plan.weights();
        let t_prime = plan.t_prime();

        let mut dot = 0.0f32;
        let mut sum_i = 0.0f32;
        let mut sum_i2 = 0.0f32;
        for ty in 0..plan.height() {
            let img_row = image.row(y + ty).expect("row within bounds for score");
            let window = &img_row[x * channels..x * channels + row_len];
            let base = ty * row_len;
            for (k, &value) in window.iter().enumerate() {
                let idx = base + k;
                let w = weights[idx];
                if w == 0.0 {
                    continue;
                }
                let v = value as f32;
                dot += t_prime[idx] * v;
                sum_i += w * v;
                sum_i2 += w * v * v;
            }
        }

        let var_i = sum_i2 - (sum_i * sum_i) / plan.sum_w();
        if var_i <= 1e-5 * sum_i2.max(1.0) {
            return 0.0;
        }
        let score = dot / (plan.var_t() * var_i).sqrt();
        if score.is_finite() {
            score
        } else {
            0.0
        }
    }
}

/// Returns the placement grid size for a template inside an image.
pub(crate) fn placement_dims<K: Kernel>(
    image: ImageView<'_, u8>,
    plan: &K::Plan,
) -> PctMatchResult<(usize, usize)> {
    let (tpl_width, tpl_height, tpl_channels) = K::shape(plan);
    if image.channels() != tpl_channels {
        return Err(PctMatchError::ChannelMismatch {
            expected: tpl_channels,
            got: image.channels(),
        });
    }
    let img_width = image.width();
    let img_height = image.height();
    if img_width < tpl_width || img_height < tpl_height {
        return Err(PctMatchError::TemplateExceedsImage {
            tpl_width,
            tpl_height,
            img_width,
            img_height,
        });
    }
    Ok((img_width - tpl_width + 1, img_height - tpl_height + 1))
}

/// Scores every valid placement and returns the dense map.
pub fn score_map<K: Kernel>(image: ImageView<'_, u8>, plan: &K::Plan) -> PctMatchResult<ScoreMap> {
    let (map_width, map_height) = placement_dims::<K>(image, plan)?;
    let mut data = Vec::with_capacity(map_width * map_height);
    for y in 0..map_height {
        for x in 0..map_width {
            data.push(K::score_at(image, plan, x, y));
        }
    }
    Ok(ScoreMap::from_vec(data, map_width, map_height).expect("score map shape matches buffer"))
}

#[cfg(test)]
mod tests {
    use super::{score_map, CcorrNormedScalar, ZnccScalar};
    use crate::image::OwnedImage;
    use crate::template::{CcorrPlan, Template, ZnccPlan};
    use crate::util::PctMatchError;

    fn pattern(width: usize, height: usize) -> Vec<u8> {
        (0..width * height)
            .map(|i| ((((i % width) * 73_856_093) ^ ((i / width) * 19_349_663)) % 251) as u8)
            .collect()
    }

    fn crop(data: &[u8], width: usize, x0: usize, y0: usize, w: usize, h: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(w * h);
        for y in y0..y0 + h {
            out.extend_from_slice(&data[y * width + x0..y * width + x0 + w]);
        }
        out
    }

    #[test]
    fn ccorr_map_peaks_at_source_location_on_non_square_input() {
        let (width, height) = (23, 11);
        let data = pattern(width, height);
        let tpl = Template::new(
            OwnedImage::new(crop(&data, width, 13, 4, 6, 5), 6, 5, 1).unwrap(),
            None,
        )
        .unwrap();
        let plan = CcorrPlan::from_template(&tpl).unwrap();
        let image = OwnedImage::new(data, width, height, 1).unwrap();
        let map = score_map::<CcorrNormedScalar>(image.view(), &plan).unwrap();
        assert_eq!((map.width(), map.height()), (18, 7));
        let (x, y, score) = map.argmax().unwrap();
        assert_eq!((x, y), (13, 4));
        assert!((score - 1.0).abs() < 1e-4);
        assert!(map.as_slice().iter().all(|&s| (0.0..=1.0001).contains(&s)));
    }

    #[test]
    fn ccorr_on_black_window_scores_zero() {
        let tpl = Template::new(OwnedImage::new(pattern(4, 3), 4, 3, 1).unwrap(), None).unwrap();
        let plan = CcorrPlan::from_template(&tpl).unwrap();
        let image = OwnedImage::filled(10, 6, 1, 0).unwrap();
        let map = score_map::<CcorrNormedScalar>(image.view(), &plan).unwrap();
        assert!(map.as_slice().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn zncc_ignores_masked_out_pixels() {
        let (width, height) = (20, 14);
        let data = pattern(width, height);
        let mut patch = crop(&data, width, 5, 7, 5, 5);
        let mut mask = vec![255u8; 25];
        patch[12] = 0;
        mask[12] = 0;
        let tpl = Template::new(
            OwnedImage::new(patch, 5, 5, 1).unwrap(),
            Some(OwnedImage::new(mask, 5, 5, 1).unwrap()),
        )
        .unwrap();
        let plan = ZnccPlan::from_template(&tpl).unwrap();
        let image = OwnedImage::new(data, width, height, 1).unwrap();
        let map = score_map::<ZnccScalar>(image.view(), &plan).unwrap();
        let (x, y, score) = map.argmax().unwrap();
        assert_eq!((x, y), (5, 7));
        assert!(score > 0.999);
    }

    #[test]
    fn channel_mismatch_is_reported() {
        let tpl = Template::new(OwnedImage::new(pattern(3, 3), 3, 3, 1).unwrap(), None).unwrap();
        let plan = CcorrPlan::from_template(&tpl).unwrap();
        let image = OwnedImage::filled(8, 8, 3, 10).unwrap();
        let err = score_map::<CcorrNormedScalar>(image.view(), &plan).err().unwrap();
        assert_eq!(err, PctMatchError::ChannelMismatch { expected: 1, got: 3 });
    }

    #[test]
    fn template_larger_than_image_is_reported() {
        let tpl = Template::new(OwnedImage::new(pattern(6, 4), 6, 4, 1).unwrap(), None).unwrap();
        let plan = CcorrPlan::from_template(&tpl).unwrap();
        let image = OwnedImage::filled(8, 3, 1, 10).unwrap();
        let err = score_map::<CcorrNormedScalar>(image.view(), &plan).err().unwrap();
        assert_eq!(
            err,
            PctMatchError::TemplateExceedsImage {
                tpl_width: 6,
                tpl_height: 4,
                img_width: 8,
                img_height: 3,
            }
        );
    }
}
