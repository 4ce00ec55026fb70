//! Page binarization.
//!
//! Produces an inverted binary mask where ink (pixels darker than their local
//! neighbourhood) is foreground (255) and paper is background (0).

use image::{GrayImage, Luma, RgbImage, imageops};
use imageproc::filter::gaussian_blur_f32;
use serde::{Deserialize, Serialize};

use crate::core::{ImageProcessError, ProcessingStage, TableOcrError};

/// Parameters for [`ImageBinarizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinarizeConfig {
    /// Standard deviation of the denoising blur applied before thresholding.
    /// Default: 0.8 (the sigma of a 3x3 Gaussian kernel)
    #[serde(default = "BinarizeConfig::default_denoise_sigma")]
    pub denoise_sigma: f32,
    /// Side of the neighbourhood window used for the local threshold, odd. Default: 15
    #[serde(default = "BinarizeConfig::default_block_size")]
    pub block_size: u32,
    /// How much darker than its weighted local mean a pixel must be to count as ink.
    /// Default: 9
    #[serde(default = "BinarizeConfig::default_bias")]
    pub bias: i16,
}

impl BinarizeConfig {
    fn default_denoise_sigma() -> f32 {
        0.8
    }

    fn default_block_size() -> u32 {
        15
    }

    fn default_bias() -> i16 {
        9
    }

    /// Gaussian sigma equivalent to a `block_size` x `block_size` kernel.
    pub fn window_sigma(&self) -> f32 {
        0.3 * ((self.block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), TableOcrError> {
        if !(self.denoise_sigma > 0.0) {
            return Err(TableOcrError::invalid_field(
                "denoise_sigma",
                "a positive number",
                self.denoise_sigma.to_string(),
            ));
        }
        if self.block_size < 3 || self.block_size % 2 == 0 {
            return Err(TableOcrError::invalid_field(
                "block_size",
                "an odd number >= 3",
                self.block_size.to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BinarizeConfig {
    fn default() -> Self {
        Self {
            denoise_sigma: Self::default_denoise_sigma(),
            block_size: Self::default_block_size(),
            bias: Self::default_bias(),
        }
    }
}

/// Converts a page image into an ink mask with a locally adaptive threshold.
#[derive(Debug, Clone, Default)]
pub struct ImageBinarizer {
    config: BinarizeConfig,
}

impl ImageBinarizer {
    pub fn new(config: BinarizeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BinarizeConfig {
        &self.config
    }

    /// Binarizes `image`.
    ///
    /// A pixel becomes foreground iff its smoothed intensity is at most the
    /// Gaussian-weighted mean of its `block_size` neighbourhood minus `bias`.
    pub fn binarize(&self, image: &RgbImage) -> Result<GrayImage, TableOcrError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(TableOcrError::processing(
                ProcessingStage::Binarization,
                "cannot binarize an empty page",
                ImageProcessError::EmptyImage,
            ));
        }

        let gray = imageops::grayscale(image);
        let smoothed = gaussian_blur_f32(&gray, self.config.denoise_sigma);
        let local_mean = gaussian_blur_f32(&smoothed, self.config.window_sigma());

        let mut mask = GrayImage::new(image.width(), image.height());
        for ((out, value), mean) in mask
            .pixels_mut()
            .zip(smoothed.pixels())
            .zip(local_mean.pixels())
        {
            let threshold = i16::from(mean.0[0]) - self.config.bias;
            *out = if i16::from(value.0[0]) <= threshold {
                Luma([255])
            } else {
                Luma([0])
            };
        }

        tracing::trace!(
            target: "table",
            width = image.width(),
            height = image.height(),
            foreground = mask.pixels().filter(|p| p.0[0] > 0).count(),
            "binarized page"
        );

        Ok(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn white(width: u32, height: u32) -> RgbImage {
        ImageBuffer::from_pixel(width, height, Rgb([255, 255, 255]))
    }

    #[test]
    fn test_blank_page_has_no_foreground() {
        let mask = ImageBinarizer::default().binarize(&white(100, 100)).unwrap();
        assert_eq!(mask.dimensions(), (100, 100));
        assert!(mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_dark_line_becomes_foreground() {
        let mut img = white(60, 40);
        for x in 5..55 {
            for y in 19..21 {
                img.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
        let mask = ImageBinarizer::default().binarize(&img).unwrap();
        assert_eq!(mask.get_pixel(30, 20).0[0], 255);
        assert_eq!(mask.get_pixel(30, 5).0[0], 0);
    }

    #[test]
    fn test_empty_image_is_rejected() {
        let err = ImageBinarizer::default()
            .binarize(&RgbImage::new(0, 0))
            .unwrap_err();
        assert_eq!(err.stage(), Some(ProcessingStage::Binarization));
    }

    #[test]
    fn test_validate_rejects_even_block() {
        let config = BinarizeConfig {
            block_size: 14,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(BinarizeConfig::default().validate().is_ok());
    }

    #[test]
    fn test_window_sigma_for_default_block() {
        let sigma = BinarizeConfig::default().window_sigma();
        assert!((sigma - 2.6).abs() < 1e-5);
    }
}
