//! The reference counted raster image.
use core::cell::{Cell, Ref, RefCell};
use core::fmt;
use std::io::{Read, Write};
use std::path::Path;
use std::rc::Rc;

use crate::buffer::PixelBuffer;
use crate::codec::{Codec, ImageCodec};
use crate::color::Color;
use crate::error::Error;
use crate::format::{ImageFormat, PixelFormat};
use crate::frame::IconFrame;
use crate::geometry::{Rectangle, Size};
use crate::icon::Icon;
use crate::layout::{RowLayout, RowOrder};

/// A decoded bitmap with a fixed size and pixel format.
///
/// This is a handle: `clone` shares the same pixels, which are freed when the last handle is
/// dropped. Use [`RasterImage::copy`] for an independent copy.
///
/// Raw pixel access goes through a [`PixelBuffer`] session from [`RasterImage::lock`]. At most
/// one session is open per image.
///
/// Handles are neither `Send` nor `Sync`, images live on the thread that renders them.
#[derive(Clone)]
pub struct RasterImage {
    inner: Rc<Inner>,
}

struct Inner {
    layout: RowLayout,
    data: RefCell<Vec<u8>>,
    locked: Cell<bool>,
}

impl RasterImage {
    /// Allocate a zeroed image.
    ///
    /// # Usage
    ///
    /// ```
    /// use image_raster::{PixelFormat, RasterImage};
    ///
    /// let image = RasterImage::new(3, 2, PixelFormat::Format24bppRgb)?;
    /// assert_eq!(image.layout().stride(), 12);
    /// # Ok::<(), image_raster::Error>(())
    /// ```
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self, Error> {
        let layout = RowLayout::new(width, height, format)?;
        Ok(Self::with_layout(layout, vec![0; layout.byte_len()]))
    }

    /// Wrap existing pixel bytes.
    ///
    /// `bytes` must cover `stride * height` bytes, anything beyond is discarded.
    pub fn from_raw(
        width: u32,
        height: u32,
        format: PixelFormat,
        stride: usize,
        order: RowOrder,
        mut bytes: Vec<u8>,
    ) -> Result<Self, Error> {
        let layout = RowLayout::with_stride(width, height, format, stride, order)?;
        if bytes.len() < layout.byte_len() {
            return Err(Error::invalid_argument("pixel buffer is shorter than the layout"));
        }

        bytes.truncate(layout.byte_len());
        Ok(Self::with_layout(layout, bytes))
    }

    /// Decode an encoded image, detecting the container format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        ImageCodec::default().decode(bytes)
    }

    /// Read and decode an encoded image from a stream.
    pub fn from_reader(mut reader: impl Read) -> Result<Self, Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Read and decode an image file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub(crate) fn with_layout(layout: RowLayout, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), layout.byte_len());
        RasterImage {
            inner: Rc::new(Inner {
                layout,
                data: RefCell::new(data),
                locked: Cell::new(false),
            }),
        }
    }

    pub fn layout(&self) -> &RowLayout {
        &self.inner.layout
    }

    pub fn width(&self) -> u32 {
        self.inner.layout.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.layout.height()
    }

    pub fn size(&self) -> Size {
        self.inner.layout.size()
    }

    pub fn format(&self) -> PixelFormat {
        self.inner.layout.format()
    }

    /// Whether a pixel buffer session is currently open.
    pub fn is_locked(&self) -> bool {
        self.inner.locked.get()
    }

    /// Check if two handles refer to the same pixels.
    pub fn ptr_eq(&self, other: &RasterImage) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Open a pixel buffer session.
    ///
    /// Fails with an invalid state if a session is already open on this image. There is no
    /// waiting, the other session must be closed first.
    pub fn lock(&self) -> Result<PixelBuffer<'_>, Error> {
        if self.inner.locked.get() {
            return Err(Error::invalid_state(
                "image is already locked, close the open pixel buffer first",
            ));
        }

        let data = self
            .inner
            .data
            .try_borrow_mut()
            .map_err(|_| Error::invalid_state("image pixels are borrowed"))?;

        self.inner.locked.set(true);
        log::debug!("locked {}x{} image", self.width(), self.height());
        Ok(PixelBuffer::new(self, data))
    }

    pub(crate) fn unlock(&self) {
        self.inner.locked.set(false);
        log::debug!("unlocked {}x{} image", self.width(), self.height());
    }

    /// Read a single pixel.
    ///
    /// Opens and closes a session for every call. Prefer [`RasterImage::lock`] when touching
    /// many pixels.
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<Color, Error> {
        self.check_coord(x, y)?;
        let buffer = self.lock()?;
        let color = buffer.get_pixel(x, y);
        buffer.close();
        Ok(color)
    }

    /// Overwrite a single pixel.
    ///
    /// Opens and closes a session for every call, see [`RasterImage::get_pixel`].
    pub fn set_pixel(&self, x: u32, y: u32, color: Color) -> Result<(), Error> {
        self.check_coord(x, y)?;
        let mut buffer = self.lock()?;
        buffer.set_pixel(x, y, color);
        buffer.close();
        Ok(())
    }

    /// Copy the image, or a region of it, into new storage of the same pixel format.
    ///
    /// The copy is always stored top-down with the default stride.
    pub fn copy(&self, region: Option<Rectangle>) -> Result<RasterImage, Error> {
        let bounds = Rectangle::with_size(self.size());
        let region = region.unwrap_or(bounds);
        if region.size().is_empty() || !bounds.contains_rect(&region) {
            return Err(Error::invalid_argument("region is empty or outside the image"));
        }

        let source = self.pixel_data()?;
        let layout = RowLayout::new(region.width, region.height, self.format())?;
        let mut data = vec![0; layout.byte_len()];

        let row_len = region.width as usize * self.format().bytes_per_pixel();
        for (y, target) in (region.y..region.bottom()).zip(data.chunks_exact_mut(layout.stride())) {
            let start = self.layout().pixel_start(region.x, y);
            target[..row_len].copy_from_slice(&source[start..start + row_len]);
        }

        Ok(RasterImage::with_layout(layout, data))
    }

    /// A tightly packed, top-down RGBA copy of the pixels.
    pub fn to_rgba8(&self) -> Result<Vec<u8>, Error> {
        let source = self.pixel_data()?;
        let layout = self.layout();
        let translation = layout.format().translation();
        let bpp = layout.format().bytes_per_pixel();

        let mut rgba = Vec::with_capacity(self.size().area() as usize * 4);
        for y in 0..layout.height() {
            let start = layout.row_start(y);
            let row = &source[start..start + layout.width() as usize * bpp];
            for px in row.chunks_exact(bpp) {
                let [a, r, g, b] = (translation.to_argb)(px).to_be_bytes();
                rgba.extend_from_slice(&[r, g, b, a]);
            }
        }

        Ok(rgba)
    }

    /// Encode the image into `out`.
    pub fn save(&self, out: &mut dyn Write, format: ImageFormat) -> Result<(), Error> {
        ImageCodec::default().encode(self, format, out)
    }

    /// Encode the image into a new file at `path`.
    pub fn save_to_path(&self, path: impl AsRef<Path>, format: ImageFormat) -> Result<(), Error> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.save(&mut file, format)?;
        file.flush()?;
        Ok(())
    }

    /// A single frame icon that draws this image within `width` by `height` logical pixels.
    ///
    /// The pixels are not resampled. The frame's scale is chosen so that its logical size fits.
    pub fn with_size(&self, width: u32, height: u32) -> Result<Icon, Error> {
        let icon = Icon::new(vec![IconFrame::new(1.0, self.clone())?])?;
        icon.with_size(Size::new(width, height))
    }

    fn pixel_data(&self) -> Result<Ref<'_, Vec<u8>>, Error> {
        self.inner
            .data
            .try_borrow()
            .map_err(|_| Error::invalid_state("image is locked by an open pixel buffer"))
    }

    fn check_coord(&self, x: u32, y: u32) -> Result<(), Error> {
        if self.layout().contains(x, y) {
            Ok(())
        } else {
            Err(Error::invalid_argument("coordinate outside of the image"))
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if self.locked.get() {
            log::warn!(
                "{}x{} image dropped while locked, a pixel buffer was leaked",
                self.layout.width(),
                self.layout.height()
            );
        }
    }
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("layout", self.layout())
            .field("locked", &self.is_locked())
            .finish()
    }
}
