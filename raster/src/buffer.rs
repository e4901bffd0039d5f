//! Scoped raw access to the pixels of a locked image.
use core::cell::RefMut;
use core::fmt;

use crate::color::Color;
use crate::format::Translation;
use crate::layout::RowLayout;
use crate::raster::RasterImage;

/// An open pixel buffer session on one [`RasterImage`].
///
/// Created by [`RasterImage::lock`]. While the session exists the image is locked: a second
/// `lock` fails and whole-image operations such as [`RasterImage::copy`] report an invalid
/// state. Finish the session with [`PixelBuffer::close`]. Dropping the session releases the lock
/// as well, so early returns do not leave the image locked. Only a leaked session
/// (`mem::forget`) keeps the image locked for good.
///
/// Per-pixel accessors do not check their coordinates beyond what slice indexing does. A
/// coordinate outside the image panics or, within padding, addresses an unrelated pixel.
///
/// # Usage
///
/// ```
/// use image_raster::{Color, PixelFormat, RasterImage};
///
/// let image = RasterImage::new(4, 4, PixelFormat::Format32bppRgba)?;
///
/// let mut buffer = image.lock()?;
/// buffer.set_pixels(std::iter::repeat(Color::WHITE));
/// assert!(buffer.pixels().all(|px| px == Color::WHITE));
/// buffer.close();
///
/// assert!(!image.is_locked());
/// # Ok::<(), image_raster::Error>(())
/// ```
pub struct PixelBuffer<'img> {
    image: &'img RasterImage,
    data: RefMut<'img, Vec<u8>>,
    layout: RowLayout,
    translation: Translation,
    closed: bool,
}

/// Iterator over the colors of a pixel buffer, in row-major order.
///
/// Created by [`PixelBuffer::pixels`].
pub struct Pixels<'buf> {
    data: &'buf [u8],
    layout: RowLayout,
    translation: Translation,
    x: u32,
    y: u32,
}

impl<'img> PixelBuffer<'img> {
    /// Called by the image after it set its lock flag.
    pub(crate) fn new(image: &'img RasterImage, data: RefMut<'img, Vec<u8>>) -> Self {
        let layout = *image.layout();
        PixelBuffer {
            image,
            data,
            layout,
            translation: layout.format().translation(),
            closed: false,
        }
    }

    /// The image this session belongs to.
    pub fn image(&self) -> &'img RasterImage {
        self.image
    }

    pub fn layout(&self) -> &RowLayout {
        &self.layout
    }

    pub fn width(&self) -> u32 {
        self.layout.width()
    }

    pub fn height(&self) -> u32 {
        self.layout.height()
    }

    /// Bytes between the starts of consecutive rows in memory.
    pub fn stride(&self) -> usize {
        self.layout.stride()
    }

    pub fn bits_per_pixel(&self) -> u32 {
        self.layout.format().bits_per_pixel()
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.layout.format().bytes_per_pixel()
    }

    /// Whether the rows are stored bottom to top.
    pub fn is_flipped(&self) -> bool {
        self.layout.is_flipped()
    }

    /// The whole backing store, starting at the base address and including row padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The whole mutable backing store, including row padding.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Byte offset of the pixel at `(x, y)` relative to the base address.
    ///
    /// This is `y * stride + x * bytes_per_pixel`, with `y` counted from the other end when the
    /// buffer is flipped.
    pub fn offset_of(&self, x: u32, y: u32) -> usize {
        self.layout.pixel_start(x, y)
    }

    /// The pixels of one visual row, without padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = self.layout.row_start(y);
        &self.data[start..start + self.row_len()]
    }

    /// The mutable pixels of one visual row, without padding.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = self.layout.row_start(y);
        let len = self.row_len();
        &mut self.data[start..start + len]
    }

    /// The color at `(x, y)`.
    ///
    /// Formats without alpha always read as opaque.
    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        Color::from_argb(self.get_argb(x, y))
    }

    /// Overwrite the color at `(x, y)`.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        self.set_argb(x, y, color.to_argb())
    }

    /// The native pixel at `(x, y)` as a `0xAARRGGBB` word.
    pub fn get_argb(&self, x: u32, y: u32) -> u32 {
        let start = self.layout.pixel_start(x, y);
        (self.translation.to_argb)(&self.data[start..start + self.bytes_per_pixel()])
    }

    /// Write a `0xAARRGGBB` word to the native pixel at `(x, y)`.
    pub fn set_argb(&mut self, x: u32, y: u32, argb: u32) {
        let start = self.layout.pixel_start(x, y);
        let end = start + self.bytes_per_pixel();
        (self.translation.from_argb)(argb, &mut self.data[start..end])
    }

    /// All colors, top to bottom and left to right.
    ///
    /// The iterator yields exactly `width * height` items and is not restartable; call this
    /// method again for another pass.
    pub fn pixels(&self) -> Pixels<'_> {
        Pixels {
            data: &self.data,
            layout: self.layout,
            translation: self.translation,
            x: 0,
            y: 0,
        }
    }

    /// Overwrite pixels in row-major order from a sequence of colors.
    ///
    /// Stops quietly when the sequence runs out before the image is filled, surplus colors are
    /// not consumed. Returns the number of pixels written.
    pub fn set_pixels<I>(&mut self, colors: I) -> usize
    where
        I: IntoIterator<Item = Color>,
    {
        let (width, height) = (self.width(), self.height());
        let coords = (0..height).flat_map(|y| (0..width).map(move |x| (x, y)));

        let mut written = 0;
        for ((x, y), color) in coords.zip(colors) {
            self.set_pixel(x, y, color);
            written += 1;
        }

        written
    }

    /// End the session and unlock the image.
    pub fn close(mut self) {
        self.closed = true;
    }

    fn row_len(&self) -> usize {
        self.width() as usize * self.bytes_per_pixel()
    }
}

impl Drop for PixelBuffer<'_> {
    fn drop(&mut self) {
        if !self.closed {
            log::debug!(
                "pixel buffer of {}x{} image released without close",
                self.width(),
                self.height()
            );
        }

        self.image.unlock();
    }
}

impl fmt::Debug for PixelBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("layout", &self.layout)
            .finish()
    }
}

impl Iterator for Pixels<'_> {
    type Item = Color;

    fn next(&mut self) -> Option<Color> {
        if self.y >= self.layout.height() {
            return None;
        }

        let start = self.layout.pixel_start(self.x, self.y);
        let end = start + self.layout.format().bytes_per_pixel();
        let argb = (self.translation.to_argb)(&self.data[start..end]);

        self.x += 1;
        if self.x == self.layout.width() {
            self.x = 0;
            self.y += 1;
        }

        Some(Color::from_argb(argb))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.remaining();
        (len, Some(len))
    }
}

impl ExactSizeIterator for Pixels<'_> {}

impl Pixels<'_> {
    fn remaining(&self) -> usize {
        let width = self.layout.width() as usize;
        let total = width * self.layout.height() as usize;
        let done = self.y as usize * width + self.x as usize;
        total.saturating_sub(done)
    }
}
