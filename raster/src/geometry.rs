//! Integer sizes and rectangles.

/// The dimensions of an image or frame.
///
/// Used both for physical pixel sizes of bitmaps and for logical sizes, depending on context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

/// An axis aligned region of an image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Size { width, height }
    }

    /// The number of pixels covered, computed without overflow.
    pub const fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Multiply both dimensions, rounding up.
    ///
    /// ```
    /// use image_raster::Size;
    /// assert_eq!(Size::new(16, 10).scaled(1.5), Size::new(24, 15));
    /// assert_eq!(Size::new(3, 3).scaled(0.5), Size::new(2, 2));
    /// ```
    pub fn scaled(self, scale: f32) -> Self {
        Size {
            width: ceil_to_u32(self.width as f32 * scale, 0.0),
            height: ceil_to_u32(self.height as f32 * scale, 0.0),
        }
    }

    /// Divide both dimensions, rounding up.
    ///
    /// Quotients within `1e-4` above an integer round down to it, so that a scale computed as
    /// `pixels / size` maps back to `size`.
    pub fn scaled_down(self, scale: f32) -> Self {
        Size {
            width: ceil_to_u32(self.width as f32 / scale, QUOTIENT_TOLERANCE),
            height: ceil_to_u32(self.height as f32 / scale, QUOTIENT_TOLERANCE),
        }
    }
}

impl Rectangle {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Rectangle {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle at the origin covering `size`.
    pub const fn with_size(size: Size) -> Self {
        Rectangle::new(0, 0, size.width, size.height)
    }

    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// One past the last column, saturating.
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// One past the last row, saturating.
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Check if `other` lies fully within this rectangle.
    pub const fn contains_rect(&self, other: &Rectangle) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Size { width, height }
    }
}

const QUOTIENT_TOLERANCE: f32 = 1e-4;

/// Round up to an integer dimension, clamping into the representable range.
///
/// Values at most `tolerance` above an integer round down to it.
fn ceil_to_u32(value: f32, tolerance: f32) -> u32 {
    if !(value > 0.0) {
        return 0;
    }

    let rounded = (value - tolerance).ceil();
    if rounded >= u32::MAX as f32 {
        u32::MAX
    } else {
        rounded as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_is_a_strict_ceiling() {
        assert_eq!(Size::new(16, 16).scaled(1.000001), Size::new(17, 17));
        assert_eq!(Size::new(10, 10).scaled(1.25), Size::new(13, 13));
        assert_eq!(Size::new(0, 4).scaled(2.0), Size::new(0, 8));
    }

    #[test]
    fn scaled_down_absorbs_float_noise() {
        assert_eq!(Size::new(128, 128).scaled_down(8.0), Size::new(16, 16));
        let scale = 100.0 / 30.0;
        assert_eq!(Size::new(100, 100).scaled_down(scale), Size::new(30, 30));
        assert_eq!(Size::new(10, 10).scaled_down(0.8), Size::new(13, 13));
    }

    #[test]
    fn rectangle_containment() {
        let outer = Rectangle::new(0, 0, 8, 8);
        assert!(outer.contains_rect(&Rectangle::new(2, 2, 6, 6)));
        assert!(!outer.contains_rect(&Rectangle::new(2, 2, 7, 6)));
        assert!(!outer.contains_rect(&Rectangle::new(u32::MAX, 0, 1, 1)));
    }
}
