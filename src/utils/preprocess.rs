//! Grayscale helpers used to prepare crops for the OCR engine.

use image::{GrayImage, imageops};
use imageproc::contrast::{ThresholdType, otsu_level, threshold};

/// Scales `image` by `factor` with bilinear filtering when its longer side is
/// below `min_side`; returns it unchanged otherwise.
pub fn upscale_if_small(image: GrayImage, min_side: u32, factor: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if factor <= 1 || width.max(height) >= min_side {
        return image;
    }
    imageops::resize(
        &image,
        width * factor,
        height * factor,
        imageops::FilterType::Triangle,
    )
}

/// Global Otsu binarization: pixels brighter than the Otsu level become 255,
/// the rest 0. A uniform image has no threshold to find and is returned as is.
pub fn otsu_binarize(image: &GrayImage) -> GrayImage {
    let mut pixels = image.pixels().map(|p| p.0[0]);
    let Some(first) = pixels.next() else {
        return image.clone();
    };
    if pixels.all(|v| v == first) {
        return image.clone();
    }

    threshold(image, otsu_level(image), ThresholdType::Binary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_small_crop_is_doubled() {
        let image = GrayImage::new(120, 40);
        let scaled = upscale_if_small(image, 300, 2);
        assert_eq!(scaled.dimensions(), (240, 80));
    }

    #[test]
    fn test_large_crop_is_untouched() {
        let image = GrayImage::new(300, 40);
        assert_eq!(upscale_if_small(image, 300, 2).dimensions(), (300, 40));
    }

    #[test]
    fn test_otsu_separates_two_levels() {
        let image = GrayImage::from_fn(20, 10, |x, _| if x < 10 { Luma([40]) } else { Luma([210]) });
        let binary = otsu_binarize(&image);
        assert_eq!(binary.get_pixel(2, 5).0[0], 0);
        assert_eq!(binary.get_pixel(15, 5).0[0], 255);
    }

    #[test]
    fn test_otsu_output_is_binary_and_monotone() {
        let image = GrayImage::from_fn(64, 4, |x, _| Luma([(x * 4) as u8]));
        let binary = otsu_binarize(&image);
        let row: Vec<u8> = (0..64).map(|x| binary.get_pixel(x, 0).0[0]).collect();
        assert!(row.iter().all(|&v| v == 0 || v == 255));
        assert!(row.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(row[0], 0);
        assert_eq!(row[63], 255);
    }

    #[test]
    fn test_otsu_keeps_uniform_image() {
        let image = GrayImage::from_pixel(8, 8, Luma([255]));
        assert_eq!(otsu_binarize(&image), image);
    }
}
