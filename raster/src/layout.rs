//! Defines the byte layout of a raster image.
use crate::error::Error;
use crate::format::PixelFormat;
use crate::geometry::Size;

/// Rows are padded to a multiple of this many bytes by default.
pub(crate) const ROW_ALIGNMENT: usize = 4;

/// The order in which rows are stored in the buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RowOrder {
    /// The first row in memory is the top row of the image.
    #[default]
    TopDown,
    /// The first row in memory is the bottom row of the image.
    BottomUp,
}

/// The byte layout of a buffer.
///
/// An inner invariant is that the layout fits in memory, that is `stride * height` does not
/// overflow a `usize`, and that a row of pixels fits into the stride.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RowLayout {
    /// The number of pixels along our width.
    width: u32,
    /// The number of pixels along our height.
    height: u32,
    format: PixelFormat,
    /// The number of bytes per row, including padding.
    stride: usize,
    order: RowOrder,
}

impl RowLayout {
    /// A top-down layout with rows padded to four bytes.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self, Error> {
        let row = row_bytes(width, format)?;
        let stride = row
            .checked_add(ROW_ALIGNMENT - 1)
            .ok_or(Error::invalid_argument("image dimensions exceed memory"))?
            / ROW_ALIGNMENT
            * ROW_ALIGNMENT;
        Self::with_stride(width, height, format, stride, RowOrder::TopDown)
    }

    /// A layout with an explicit stride and row order.
    pub fn with_stride(
        width: u32,
        height: u32,
        format: PixelFormat,
        stride: usize,
        order: RowOrder,
    ) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_argument("width and height must be positive"));
        }

        if stride < row_bytes(width, format)? {
            return Err(Error::invalid_argument("stride is shorter than a row of pixels"));
        }

        stride
            .checked_mul(height as usize)
            .ok_or(Error::invalid_argument("image dimensions exceed memory"))?;

        Ok(RowLayout {
            width,
            height,
            format,
            stride,
            order,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Bytes from the start of one row to the start of the next in memory.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn row_order(&self) -> RowOrder {
        self.order
    }

    pub fn is_flipped(&self) -> bool {
        self.order == RowOrder::BottomUp
    }

    /// The total number of bytes of the buffer.
    pub fn byte_len(&self) -> usize {
        // Checked in the constructor.
        self.stride * self.height as usize
    }

    /// Byte offset of the start of the visual row `y`.
    pub(crate) fn row_start(&self, y: u32) -> usize {
        debug_assert!(y < self.height, "Invalid row: {}", y);
        let row = match self.order {
            RowOrder::TopDown => y,
            RowOrder::BottomUp => self.height - 1 - y,
        };
        row as usize * self.stride
    }

    /// Byte offset of the pixel at `(x, y)`.
    pub(crate) fn pixel_start(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width, "Invalid column: {}", x);
        self.row_start(y) + x as usize * self.format.bytes_per_pixel()
    }

    pub(crate) fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }
}

fn row_bytes(width: u32, format: PixelFormat) -> Result<usize, Error> {
    (width as usize)
        .checked_mul(format.bytes_per_pixel())
        .ok_or(Error::invalid_argument("image dimensions exceed memory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stride_is_aligned() -> Result<(), Error> {
        let layout = RowLayout::new(5, 2, PixelFormat::Format24bppRgb)?;
        assert_eq!(layout.stride(), 16);
        assert_eq!(layout.byte_len(), 32);

        let layout = RowLayout::new(5, 2, PixelFormat::Format32bppRgba)?;
        assert_eq!(layout.stride(), 20);
        Ok(())
    }

    #[test]
    fn flipped_rows_start_at_the_end() -> Result<(), Error> {
        let layout =
            RowLayout::with_stride(2, 3, PixelFormat::Format32bppRgb, 8, RowOrder::BottomUp)?;
        assert_eq!(layout.row_start(0), 16);
        assert_eq!(layout.row_start(2), 0);
        assert_eq!(layout.pixel_start(1, 0), 20);
        Ok(())
    }

    #[test]
    fn rejects_short_stride() {
        let err = RowLayout::with_stride(4, 1, PixelFormat::Format24bppRgb, 11, RowOrder::TopDown)
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
        assert!(RowLayout::new(0, 1, PixelFormat::Format24bppRgb).is_err());
    }
}
