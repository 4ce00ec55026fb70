//! Rectangle based image cropping utilities.

use crate::core::ImageProcessError;
use crate::processors::Rect;
use image::{RgbImage, imageops};

/// Rectangle based image cropping utilities.
pub struct BBoxCrop;

impl BBoxCrop {
    /// Crops the region covered by `rect` out of `image`.
    ///
    /// The rectangle must lie entirely inside the image; cell rectangles come from
    /// the same page they are cropped from, so anything else indicates a bug
    /// upstream and is reported instead of silently clipped.
    ///
    /// # Arguments
    ///
    /// * `image` - The source image
    /// * `rect` - The region to crop
    ///
    /// # Returns
    ///
    /// The cropped image, or an [`ImageProcessError`] describing why the region is
    /// invalid.
    pub fn crop_rect(image: &RgbImage, rect: &Rect) -> Result<RgbImage, ImageProcessError> {
        if rect.width == 0 || rect.height == 0 {
            return Err(ImageProcessError::InvalidCropSize);
        }
        if rect.x2() > image.width() || rect.y2() > image.height() {
            return Err(ImageProcessError::CropOutOfBounds {
                x: rect.x,
                y: rect.y,
                width: rect.width,
                height: rect.height,
                image_width: image.width(),
                image_height: image.height(),
            });
        }

        Ok(imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image())
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 0]))
    }

    #[test]
    fn test_crop_copies_region() {
        let image = gradient(50, 40);
        let crop = BBoxCrop::crop_rect(&image, &Rect::new(10, 5, 20, 15)).unwrap();
        assert_eq!(crop.dimensions(), (20, 15));
        assert_eq!(crop.get_pixel(0, 0), &Rgb([10, 5, 0]));
        assert_eq!(crop.get_pixel(19, 14), &Rgb([29, 19, 0]));
    }

    #[test]
    fn test_crop_out_of_bounds_is_rejected() {
        let image = gradient(50, 40);
        let err = BBoxCrop::crop_rect(&image, &Rect::new(40, 0, 20, 10)).unwrap_err();
        assert!(matches!(
            err,
            ImageProcessError::CropOutOfBounds {
                image_width: 50,
                ..
            }
        ));
    }
}
