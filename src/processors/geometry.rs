//! Axis-aligned rectangle primitives for cell geometry.
//!
//! Cells are tracked in two equivalent forms: corner form [`Rect`] (`x, y, width,
//! height`) and span form [`Span`] (`x1, y1, x2, y2`, exclusive right/bottom edges).
//! Conversions between them are exact.

use imageproc::contours::Contour;
use serde::{Deserialize, Serialize};

/// A rectangle in corner form, in page pixels. `width` and `height` are non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// X-coordinate of the top-left corner.
    pub x: u32,
    /// Y-coordinate of the top-left corner.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// A rectangle in span form; `x2`/`y2` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl Rect {
    /// Creates a new rectangle.
    ///
    /// # Arguments
    ///
    /// * `x` - The x-coordinate of the top-left corner.
    /// * `y` - The y-coordinate of the top-left corner.
    /// * `width` - Width in pixels, must be non-zero.
    /// * `height` - Height in pixels, must be non-zero.
    #[inline]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        debug_assert!(width > 0 && height > 0, "rect must have a non-zero extent");
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole `width` x `height` page.
    pub fn full_page(width: u32, height: u32) -> Self {
        Self::new(0, 0, width.max(1), height.max(1))
    }

    /// Builds a rectangle from span form. Returns `None` for empty spans.
    pub fn from_span(span: Span) -> Option<Self> {
        if span.x2 <= span.x1 || span.y2 <= span.y1 {
            return None;
        }
        Some(Self::new(
            span.x1,
            span.y1,
            span.x2 - span.x1,
            span.y2 - span.y1,
        ))
    }

    /// Converts to span form.
    pub fn to_span(&self) -> Span {
        Span {
            x1: self.x,
            y1: self.y,
            x2: self.x2(),
            y2: self.y2(),
        }
    }

    /// Exclusive right edge.
    #[inline]
    pub fn x2(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn y2(&self) -> u32 {
        self.y + self.height
    }

    /// Area in square pixels.
    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Region shared with `other`, or `None` when they only touch or are apart.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let (a, b) = (self.to_span(), other.to_span());
        Rect::from_span(Span {
            x1: a.x1.max(b.x1),
            y1: a.y1.max(b.y1),
            x2: a.x2.min(b.x2),
            y2: a.y2.min(b.y2),
        })
    }

    /// Area of the intersection with `other`; 0 when they do not overlap.
    pub fn intersection_area(&self, other: &Rect) -> u64 {
        self.intersection(other).map_or(0, |rect| rect.area())
    }

    /// Intersection area divided by the area of `self`.
    ///
    /// This is directional: `a.overlap_fraction(&b)` and `b.overlap_fraction(&a)`
    /// differ whenever the two areas differ.
    pub fn overlap_fraction(&self, other: &Rect) -> f64 {
        self.intersection_area(other) as f64 / self.area() as f64
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let (a, b) = (self.to_span(), other.to_span());
        let x1 = a.x1.min(b.x1);
        let y1 = a.y1.min(b.y1);
        Rect::new(x1, y1, a.x2.max(b.x2) - x1, a.y2.max(b.y2) - y1)
    }

    /// Axis-aligned bounding rectangle of a traced contour, inclusive of its
    /// border pixels. Returns `None` for a contour without points.
    pub fn from_contour(contour: &Contour<u32>) -> Option<Self> {
        let first = contour.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &contour.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Rect::from_span(Span {
            x1: min_x,
            y1: min_y,
            x2: max_x + 1,
            y2: max_y + 1,
        })
    }
}
