//! Precomputed template statistics for masked correlation metrics.
//!
//! Mask values act as weights `w = (m / 255)^2`; a binary mask therefore
//! selects the opaque pixels and a missing mask weights every element by 1.
//! All buffers are flattened row-major over `width * channels` elements.

use crate::template::Template;
use crate::util::{PctMatchError, PctMatchResult};

fn weights(tpl: &Template) -> Vec<f32> {
    match tpl.mask() {
        Some(mask) => mask
            .data()
            .iter()
            .map(|&m| {
                let w = m as f32 / 255.0;
                w * w
            })
            .collect(),
        None => vec![1.0; tpl.image().data().len()],
    }
}

/// Plan for masked normalized cross-correlation.
///
/// `R = Σ w·T·I / sqrt(Σ w·T² · Σ w·I²)`, which lies in `[0, 1]` for
/// non-negative images.
pub struct CcorrPlan {
    width: usize,
    height: usize,
    channels: usize,
    weights: Vec<f32>,
    weighted_t: Vec<f32>,
    sum_wt2: f32,
}

impl CcorrPlan {
    /// Builds a plan from a template and its mask.
    pub fn from_template(tpl: &Template) -> PctMatchResult<Self> {
        let weights = weights(tpl);
        let mut weighted_t = Vec::with_capacity(weights.len());
        let mut sum_wt2 = 0.0f64;
        for (&t, &w) in tpl.image().data().iter().zip(&weights) {
            let wt = w * t as f32;
            weighted_t.push(wt);
            sum_wt2 += wt as f64 * t as f64;
        }
        if sum_wt2 <= 1e-8 {
            return Err(PctMatchError::DegenerateTemplate {
                reason: "no energy under the mask",
            });
        }
        Ok(Self {
            width: tpl.width(),
            height: tpl.height(),
            channels: tpl.channels(),
            weights,
            weighted_t,
            sum_wt2: sum_wt2 as f32,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns per-element weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Returns the weighted template `w·T`.
    pub fn weighted_t(&self) -> &[f32] {
        &self.weighted_t
    }

    /// Returns the weighted template energy `Σ w·T²`.
    pub fn sum_wt2(&self) -> f32 {
        self.sum_wt2
    }
}

/// Plan for masked zero-mean normalized cross-correlation.
///
/// Template statistics use the weighted mean; `t_prime = w·(T - mean)`.
pub struct ZnccPlan {
    width: usize,
    height: usize,
    channels: usize,
    weights: Vec<f32>,
    t_prime: Vec<f32>,
    sum_w: f32,
    var_t: f32,
}

impl ZnccPlan {
    /// Builds a plan from a template and its mask.
    pub fn from_template(tpl: &Template) -> PctMatchResult<Self> {
        let weights = weights(tpl);
        let data = tpl.image().data();

        let mut sum_w = 0.0f64;
        let mut sum_wt = 0.0f64;
        for (&t, &w) in data.iter().zip(&weights) {
            sum_w += w as f64;
            sum_wt += w as f64 * t as f64;
        }
        if sum_w <= 1e-8 {
            return Err(PctMatchError::DegenerateTemplate {
                reason: "mask has no opaque pixels",
            });
        }
        let mean = sum_wt / sum_w;

        let mut t_prime = Vec::with_capacity(data.len());
        let mut var_t = 0.0f64;
        for (&t, &w) in data.iter().zip(&weights) {
            let centered = t as f64 - mean;
            t_prime.push((w as f64 * centered) as f32);
            var_t += w as f64 * centered * centered;
        }
        if var_t <= 1e-8 {
            return Err(PctMatchError::DegenerateTemplate {
                reason: "zero variance under the mask",
            });
        }

        Ok(Self {
            width: tpl.width(),
            height: tpl.height(),
            channels: tpl.channels(),
            weights,
            t_prime,
            sum_w: sum_w as f32,
            var_t: var_t as f32,
        })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns per-element weights.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Returns the weighted zero-mean template.
    pub fn t_prime(&self) -> &[f32] {
        &self.t_prime
    }

    /// Returns the total weight `Σ w`.
    pub fn sum_w(&self) -> f32 {
        self.sum_w
    }

    /// Returns the weighted template variance `Σ w·(T - mean)²`.
    pub fn var_t(&self) -> f32 {
        self.var_t
    }
}

#[cfg(test)]
mod tests {
    use super::{CcorrPlan, ZnccPlan};
    use crate::image::OwnedImage;
    use crate::template::Template;
    use crate::util::PctMatchError;

    #[test]
    fn binary_mask_zeroes_transparent_weights() {
        let image = OwnedImage::new(vec![10, 20, 30, 40], 2, 2, 1).unwrap();
        let mask = OwnedImage::new(vec![255, 0, 255, 0], 2, 2, 1).unwrap();
        let plan = CcorrPlan::from_template(&Template::new(image, Some(mask)).unwrap()).unwrap();
        assert_eq!(plan.weights(), &[1.0, 0.0, 1.0, 0.0]);
        assert_eq!(plan.weighted_t(), &[10.0, 0.0, 30.0, 0.0]);
        assert!((plan.sum_wt2() - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn black_template_is_degenerate_for_ccorr() {
        let image = OwnedImage::filled(3, 3, 1, 0).unwrap();
        let err = CcorrPlan::from_template(&Template::new(image, None).unwrap())
            .err()
            .unwrap();
        assert!(matches!(err, PctMatchError::DegenerateTemplate { .. }));
    }

    #[test]
    fn zncc_plan_centers_on_weighted_mean() {
        let image = OwnedImage::new(vec![10, 30, 200, 20], 2, 2, 1).unwrap();
        let mask = OwnedImage::new(vec![255, 255, 0, 255], 2, 2, 1).unwrap();
        let plan = ZnccPlan::from_template(&Template::new(image, Some(mask)).unwrap()).unwrap();
        assert!((plan.sum_w() - 3.0).abs() < 1e-6);
        let t_prime = plan.t_prime();
        assert!((t_prime[0] + 10.0).abs() < 1e-4);
        assert!((t_prime[1] - 10.0).abs() < 1e-4);
        assert_eq!(t_prime[2], 0.0);
        assert!(t_prime[3].abs() < 1e-4);
        assert!((plan.var_t() - 200.0).abs() < 1e-3);
    }
}
