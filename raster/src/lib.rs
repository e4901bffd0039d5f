//! Lockable raster images and multi-resolution icons.
//!
//! A [`RasterImage`] owns decoded pixels in one of a few [`PixelFormat`]s. Raw access happens
//! through a [`PixelBuffer`], a session that locks the image until it is closed. An [`Icon`]
//! groups several [`IconFrame`]s, bitmaps tagged with a scale, and picks the one to draw for a
//! display scale or a target size.
//!
//! Decoding and encoding of containers (PNG, ICO, JPEG, …) is delegated to a [`Codec`], by
//! default the `image` crate.
//!
//! # Usage
//!
//! Bulk pixel access goes through a single session:
//!
//! ```
//! use image_raster::{Color, PixelFormat, RasterImage};
//!
//! let image = RasterImage::new(32, 32, PixelFormat::Format32bppRgba)?;
//!
//! let mut buffer = image.lock()?;
//! for y in 0..buffer.height() {
//!     for x in 0..buffer.width() {
//!         let shade = x as f32 / 31.0;
//!         buffer.set_pixel(x, y, Color::rgb(shade, shade, shade));
//!     }
//! }
//! buffer.close();
//!
//! assert_eq!(image.get_pixel(31, 0)?, Color::WHITE);
//! # Ok::<(), image_raster::Error>(())
//! ```
//!
//! Frames are chosen by scale, or by the size they will be drawn at:
//!
//! ```
//! use image_raster::{Icon, IconFrame, PixelFormat, RasterImage, Size};
//!
//! let small = RasterImage::new(16, 16, PixelFormat::Format32bppRgba)?;
//! let large = RasterImage::new(32, 32, PixelFormat::Format32bppRgba)?;
//! let icon = Icon::new(vec![IconFrame::new(1.0, small)?, IconFrame::new(1.0, large)?])?;
//!
//! let frame = icon.get_frame(2.0, Some(Size::new(16, 16)))?;
//! assert_eq!(frame.pixel_size()?, Size::new(32, 32));
//! # Ok::<(), image_raster::Error>(())
//! ```
#![deny(unsafe_code)]

mod buffer;
mod codec;
mod color;
mod error;
mod format;
mod frame;
mod geometry;
mod icon;
mod indexed;
mod layout;
/// The main image module.
mod raster;
mod resource;

#[cfg(test)]
mod tests;

pub use self::buffer::{PixelBuffer, Pixels};
pub use self::codec::{Codec, ImageCodec};
pub use self::color::Color;
pub use self::error::{Error, ErrorKind};
pub use self::format::{ImageFormat, PixelFormat, Translation};
pub use self::frame::IconFrame;
pub use self::geometry::{Rectangle, Size};
pub use self::icon::Icon;
pub use self::indexed::{IndexedImage, Palette};
pub use self::layout::{RowLayout, RowOrder};
pub use self::raster::RasterImage;
pub use self::resource::{DirectoryResources, EmbeddedResources, Resources};
