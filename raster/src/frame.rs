//! One resolution of an icon.
use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

use crate::error::Error;
use crate::geometry::Size;
use crate::raster::RasterImage;

/// Produces the bitmap of a deferred frame.
pub(crate) type FrameLoader = Box<dyn Fn() -> Result<RasterImage, Error>>;

/// The bitmap of a frame, possibly not read yet.
pub(crate) enum FrameSource {
    /// The loader has not run, or its last run failed.
    Unloaded(FrameLoader),
    Loaded(RasterImage),
}

/// A bitmap paired with the number of physical pixels per logical pixel.
///
/// Frames are immutable. Cloning a frame, or re-scaling it with [`IconFrame::with_scale`], shares
/// the bitmap and, for deferred frames, the loading state: the loader runs at most once
/// successfully for all of them.
#[derive(Clone)]
pub struct IconFrame {
    scale: f32,
    source: Rc<RefCell<FrameSource>>,
}

impl IconFrame {
    /// A frame over an already decoded bitmap.
    pub fn new(scale: f32, bitmap: RasterImage) -> Result<Self, Error> {
        Self::with_source(scale, FrameSource::Loaded(bitmap))
    }

    /// A frame whose bitmap is produced by `loader` on first use.
    ///
    /// No I/O happens here. The loader runs when the bitmap or its size is first requested.
    pub fn deferred<F>(scale: f32, loader: F) -> Result<Self, Error>
    where
        F: Fn() -> Result<RasterImage, Error> + 'static,
    {
        Self::with_source(scale, FrameSource::Unloaded(Box::new(loader)))
    }

    fn with_source(scale: f32, source: FrameSource) -> Result<Self, Error> {
        check_scale(scale)?;
        Ok(IconFrame {
            scale,
            source: Rc::new(RefCell::new(source)),
        })
    }

    /// A frame over the same bitmap with a different scale.
    pub fn with_scale(&self, scale: f32) -> Result<Self, Error> {
        check_scale(scale)?;
        Ok(IconFrame {
            scale,
            source: Rc::clone(&self.source),
        })
    }

    /// Physical pixels per logical pixel.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn is_loaded(&self) -> bool {
        matches!(*self.source.borrow(), FrameSource::Loaded(_))
    }

    /// Run the loader if the bitmap has not been produced yet.
    ///
    /// A failed load leaves the frame unloaded and returns the loader's error unchanged.
    pub fn resolve(&self) -> Result<RasterImage, Error> {
        let mut source = self
            .source
            .try_borrow_mut()
            .map_err(|_| Error::invalid_state("frame is being loaded"))?;

        let image = match &*source {
            FrameSource::Loaded(image) => return Ok(image.clone()),
            FrameSource::Unloaded(loader) => loader()?,
        };

        log::debug!(
            "loaded {}x{} bitmap of frame at scale {}",
            image.width(),
            image.height(),
            self.scale
        );

        *source = FrameSource::Loaded(image.clone());
        Ok(image)
    }

    /// The bitmap, loading it if necessary.
    pub fn bitmap(&self) -> Result<RasterImage, Error> {
        self.resolve()
    }

    /// Size of the bitmap in physical pixels.
    pub fn pixel_size(&self) -> Result<Size, Error> {
        Ok(self.resolve()?.size())
    }

    pub fn pixel_area(&self) -> Result<u64, Error> {
        Ok(self.pixel_size()?.area())
    }

    /// Size in logical pixels, the pixel size divided by the scale and rounded up.
    pub fn size(&self) -> Result<Size, Error> {
        Ok(self.pixel_size()?.scaled_down(self.scale))
    }

    /// Check if both frames share the same bitmap source.
    pub fn same_bitmap(&self, other: &IconFrame) -> bool {
        Rc::ptr_eq(&self.source, &other.source)
    }
}

fn check_scale(scale: f32) -> Result<(), Error> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_argument("scale must be positive and finite"))
    }
}

impl fmt::Debug for IconFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("IconFrame");
        dbg.field("scale", &self.scale);
        match self.source.try_borrow().as_deref() {
            Ok(FrameSource::Loaded(image)) => dbg.field("pixel_size", &image.size()),
            Ok(FrameSource::Unloaded(_)) => dbg.field("pixel_size", &"unloaded"),
            Err(_) => dbg.field("pixel_size", &"loading"),
        };
        dbg.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, PixelFormat};
    use std::cell::Cell;

    #[test]
    fn deferred_frame_loads_once() -> Result<(), Error> {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let frame = IconFrame::deferred(2.0, move || {
            counter.set(counter.get() + 1);
            RasterImage::new(64, 32, PixelFormat::Format32bppRgba)
        })?;

        assert_eq!(calls.get(), 0);
        assert!(!frame.is_loaded());

        let rescaled = frame.with_scale(4.0)?;
        assert_eq!(frame.size()?, Size::new(32, 16));
        assert_eq!(rescaled.size()?, Size::new(16, 8));
        assert_eq!(frame.pixel_area()?, 2048);
        assert_eq!(calls.get(), 1);
        assert!(rescaled.is_loaded());
        Ok(())
    }

    #[test]
    fn failed_load_stays_unloaded() -> Result<(), Error> {
        let frame = IconFrame::deferred(1.0, || Err(Error::not_found("gone")))?;
        assert_eq!(frame.bitmap().unwrap_err().kind(), ErrorKind::NotFound);
        assert!(!frame.is_loaded());
        Ok(())
    }

    #[test]
    fn rejects_bad_scale() -> Result<(), Error> {
        let image = RasterImage::new(1, 1, PixelFormat::Format24bppRgb)?;
        for scale in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let err = IconFrame::new(scale, image.clone()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }
        Ok(())
    }
}
