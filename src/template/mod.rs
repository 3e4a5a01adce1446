//! Template storage, rescaling and scoring plans.
//!
//! A [`Template`] pairs an image with an optional mask of the same shape.
//! [`TemplateStore`] keeps the decoded original and derives every scaled
//! variant from it, so repeated rescales never compound resampling error.

use crate::image::resize::resize_bilinear;
use crate::image::{ColorMode, ImageView, OwnedImage};
use crate::util::{PctMatchError, PctMatchResult};

mod plan;

pub use plan::{CcorrPlan, ZnccPlan};

/// Template image with an optional transparency-derived mask.
///
/// A missing mask is equivalent to a fully opaque rectangle. When present,
/// the mask has exactly the width, height and channel count of the image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    image: OwnedImage,
    mask: Option<OwnedImage>,
}

impl Template {
    /// Creates a template, validating the mask shape against the image.
    pub fn new(image: OwnedImage, mask: Option<OwnedImage>) -> PctMatchResult<Self> {
        if let Some(mask) = &mask {
            if mask.width() != image.width() || mask.height() != image.height() {
                return Err(PctMatchError::MaskMismatch {
                    mask_width: mask.width(),
                    mask_height: mask.height(),
                    img_width: image.width(),
                    img_height: image.height(),
                });
            }
            if mask.channels() != image.channels() {
                return Err(PctMatchError::ChannelMismatch {
                    expected: image.channels(),
                    got: mask.channels(),
                });
            }
        }
        Ok(Self { image, mask })
    }

    /// Loads a template asset, deriving the mask from its alpha channel.
    ///
    /// Pixels with alpha above 250 are opaque and all others transparent.
    /// Images without alpha get no mask.
    #[cfg(feature = "image-io")]
    pub fn load<P: AsRef<std::path::Path>>(path: P, mode: ColorMode) -> PctMatchResult<Self> {
        use crate::image::io::{alpha_mask, owned_from_dynamic};

        let path = path.as_ref();
        let img = image::open(path).map_err(|err| PctMatchError::TemplateLoad {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        let mask = alpha_mask(&img, mode)?;
        let image = owned_from_dynamic(&img, mode)?;
        Self::new(image, mask)
    }

    /// Returns the template image.
    pub fn image(&self) -> &OwnedImage {
        &self.image
    }

    /// Returns the mask, if any.
    pub fn mask(&self) -> Option<&OwnedImage> {
        self.mask.as_ref()
    }

    /// Returns a view of the template image.
    pub fn view(&self) -> ImageView<'_, u8> {
        self.image.view()
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.image.width()
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.image.height()
    }

    /// Returns the number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.image.channels()
    }

    /// Returns the color mode matching the channel count.
    pub fn color_mode(&self) -> ColorMode {
        if self.channels() == 1 {
            ColorMode::Gray
        } else {
            ColorMode::Color
        }
    }

    /// Resizes image and mask to `width x height` with the same filter.
    pub fn resized(&self, width: usize, height: usize) -> PctMatchResult<Self> {
        let image = resize_bilinear(self.image.view(), width, height)?;
        let mask = match &self.mask {
            Some(mask) => Some(resize_bilinear(mask.view(), width, height)?),
            None => None,
        };
        Self::new(image, mask)
    }

    /// Resizes to `target_width`, deriving the height from the aspect ratio
    /// rounded down.
    pub fn resized_to_width(&self, target_width: usize) -> PctMatchResult<Self> {
        let height = scaled_height(self.width(), self.height(), target_width);
        self.resized(target_width, height)
    }

    /// Scales both axes by `factor`, rounding each dimension down.
    pub fn scaled(&self, factor: f32) -> PctMatchResult<Self> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(PctMatchError::InvalidInput("scale factor must be positive"));
        }
        let width = (self.width() as f32 * factor) as usize;
        let height = (self.height() as f32 * factor) as usize;
        self.resized(width, height)
    }
}

/// Height of a template of `width x height` rescaled to `target_width`.
pub fn scaled_height(width: usize, height: usize, target_width: usize) -> usize {
    target_width * height / width
}

/// Holder of the decoded template asset and source of scaled variants.
#[derive(Clone, Debug)]
pub struct TemplateStore {
    original: Template,
}

impl TemplateStore {
    /// Wraps an already decoded template.
    pub fn new(original: Template) -> Self {
        Self { original }
    }

    /// Loads and decodes the template asset at `path`.
    #[cfg(feature = "image-io")]
    pub fn load<P: AsRef<std::path::Path>>(path: P, mode: ColorMode) -> PctMatchResult<Self> {
        Template::load(path, mode).map(Self::new)
    }

    /// Returns the template as decoded.
    pub fn original(&self) -> &Template {
        &self.original
    }

    /// Returns the original rescaled to `target_width`.
    pub fn resize(&self, target_width: usize) -> PctMatchResult<Template> {
        self.original.resized_to_width(target_width)
    }

    /// Returns the original scaled by `factor` on both axes.
    pub fn scaled(&self, factor: f32) -> PctMatchResult<Template> {
        self.original.scaled(factor)
    }
}

#[cfg(test)]
mod tests {
    use super::{scaled_height, Template, TemplateStore};
    use crate::image::OwnedImage;
    use crate::util::PctMatchError;

    fn gradient(width: usize, height: usize) -> OwnedImage {
        let data = (0..width * height)
            .map(|i| ((i % width) * 9 + (i / width) * 5) as u8)
            .collect();
        OwnedImage::new(data, width, height, 1).unwrap()
    }

    #[test]
    fn mask_shape_must_match_image() {
        let image = gradient(8, 6);
        let mask = OwnedImage::filled(6, 8, 1, 255).unwrap();
        let err = Template::new(image, Some(mask)).err().unwrap();
        assert_eq!(
            err,
            PctMatchError::MaskMismatch {
                mask_width: 6,
                mask_height: 8,
                img_width: 8,
                img_height: 6,
            }
        );
    }

    #[test]
    fn resize_to_width_keeps_aspect_and_mask_shape() {
        let mask = OwnedImage::filled(32, 24, 1, 255).unwrap();
        let store = TemplateStore::new(Template::new(gradient(32, 24), Some(mask)).unwrap());
        for width in 24..30 {
            let scaled = store.resize(width).unwrap();
            assert_eq!(scaled.width(), width);
            assert_eq!(scaled.height(), width * 24 / 32);
            let mask = scaled.mask().unwrap();
            assert_eq!((mask.width(), mask.height()), (scaled.width(), scaled.height()));
        }
    }

    #[test]
    fn scaled_height_rounds_down() {
        assert_eq!(scaled_height(32, 24, 25), 18);
        assert_eq!(scaled_height(17, 11, 10), 6);
    }

    #[test]
    fn non_positive_factor_is_rejected() {
        let template = Template::new(gradient(4, 4), None).unwrap();
        assert!(template.scaled(0.0).is_err());
        assert!(template.scaled(f32::NAN).is_err());
    }
}
