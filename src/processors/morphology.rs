//! Morphological line isolation on binary masks.
//!
//! Opening (erode then dilate) a mask with a `length x 1` or `1 x length` line
//! element removes every stroke shorter than the element along that axis, leaving
//! only long ruling lines. Pixels outside the image count as foreground while
//! eroding and as background while dilating, so lines touching the border survive.

use image::{GrayImage, Luma};
use imageproc::map::map_colors2;
use imageproc::morphology::{Mask, grayscale_open};

/// Longest line element `imageproc` masks can hold.
pub const MAX_LINE_ELEMENT: u32 = 511;

/// Direction of the structuring element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAxis {
    /// A `length x 1` element (keeps horizontal lines).
    Horizontal,
    /// A `1 x length` element (keeps vertical lines).
    Vertical,
}

/// Line structuring element of `length` pixels anchored at its centre.
///
/// Lengths are clamped to `1..=MAX_LINE_ELEMENT`.
pub fn line_element(length: u32, axis: LineAxis) -> Mask {
    let length = length.clamp(1, MAX_LINE_ELEMENT);
    // length <= 511, so the anchor fits in a u8
    let anchor = (length / 2) as u8;
    match axis {
        LineAxis::Horizontal => {
            Mask::from_image(&GrayImage::from_pixel(length, 1, Luma([255])), anchor, 0)
        }
        LineAxis::Vertical => {
            Mask::from_image(&GrayImage::from_pixel(1, length, Luma([255])), 0, anchor)
        }
    }
}

/// Opens `mask` with a line element of `length` pixels along `axis`.
pub fn open_with_line(mask: &GrayImage, length: u32, axis: LineAxis) -> GrayImage {
    if mask.width() == 0 || mask.height() == 0 {
        return GrayImage::new(mask.width(), mask.height());
    }
    if length > MAX_LINE_ELEMENT {
        tracing::debug!(
            target: "table",
            requested = length,
            used = MAX_LINE_ELEMENT,
            ?axis,
            "line element clamped"
        );
    }
    grayscale_open(mask, &line_element(length, axis))
}

/// Pixel-wise union of two masks of equal size.
pub fn union(a: &GrayImage, b: &GrayImage) -> GrayImage {
    map_colors2(a, b, |p: Luma<u8>, q: Luma<u8>| Luma([p.0[0].max(q.0[0])]))
}
