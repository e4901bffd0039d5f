//! Decoding and encoding of containers, delegated to the `image` crate.
use std::io::{Cursor, Write};

use image::DynamicImage;

use crate::error::{Error, ErrorKind};
use crate::format::{ImageFormat, PixelFormat};
use crate::layout::RowLayout;
use crate::raster::RasterImage;

/// Converts between encoded containers and raster images.
///
/// The crate itself only ever asks for "these bytes as pixels" and "these pixels as that
/// format". [`ImageCodec`] is the implementation used by the convenience constructors.
pub trait Codec {
    /// Decode the single (or primary) image in `bytes`.
    fn decode(&self, bytes: &[u8]) -> Result<RasterImage, Error>;

    /// Decode every frame of a multi-resolution container.
    ///
    /// Containers that only hold one image produce a single frame.
    fn decode_frames(&self, bytes: &[u8]) -> Result<Vec<RasterImage>, Error> {
        Ok(vec![self.decode(bytes)?])
    }

    /// Encode `image` as `format` into `out`.
    fn encode(
        &self,
        image: &RasterImage,
        format: ImageFormat,
        out: &mut dyn Write,
    ) -> Result<(), Error>;
}

/// The codec backed by the `image` crate.
///
/// Which containers are available depends on the enabled cargo features, missing ones are
/// reported as [`ErrorKind::NotSupported`]. Decoded images with an alpha channel use
/// [`PixelFormat::Format32bppRgba`], all others [`PixelFormat::Format32bppRgb`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageCodec {
    _private: (),
}

/// Size of the `ICONDIR` header.
const ICO_HEADER: usize = 6;
/// Size of one `ICONDIRENTRY`.
const ICO_ENTRY: usize = 16;

impl Codec for ImageCodec {
    fn decode(&self, bytes: &[u8]) -> Result<RasterImage, Error> {
        if bytes.is_empty() {
            return Err(Error::invalid_argument("no image data"));
        }

        let format = image::guess_format(bytes)?;
        let decoded = image::load_from_memory_with_format(bytes, format)?;
        from_dynamic(&decoded)
    }

    fn decode_frames(&self, bytes: &[u8]) -> Result<Vec<RasterImage>, Error> {
        if !is_icon_container(bytes) {
            return Ok(vec![self.decode(bytes)?]);
        }

        let entries = icon_entries(bytes)?;
        log::debug!("decoding {} icon container entries", entries.len());

        entries
            .iter()
            .map(|entry| {
                let single = entry.as_single_icon(bytes)?;
                let decoded = image::load_from_memory_with_format(&single, image::ImageFormat::Ico)?;
                from_dynamic(&decoded)
            })
            .collect()
    }

    fn encode(
        &self,
        image: &RasterImage,
        format: ImageFormat,
        out: &mut dyn Write,
    ) -> Result<(), Error> {
        let rgba = image.to_rgba8()?;
        let buffer = image::RgbaImage::from_raw(image.width(), image.height(), rgba)
            .ok_or(Error::invalid_argument("pixel data does not match the image size"))?;

        let mut dynamic = DynamicImage::ImageRgba8(buffer);
        if !(format.supports_alpha() && image.format().has_alpha()) {
            dynamic = DynamicImage::ImageRgb8(dynamic.to_rgb8());
        }

        // Some encoders (tiff) need to seek, so encode into memory first.
        let mut encoded = Cursor::new(Vec::new());
        dynamic.write_to(&mut encoded, format.to_image_format())?;
        out.write_all(encoded.get_ref())?;
        Ok(())
    }
}

fn from_dynamic(decoded: &DynamicImage) -> Result<RasterImage, Error> {
    let format = if decoded.color().has_alpha() {
        PixelFormat::Format32bppRgba
    } else {
        PixelFormat::Format32bppRgb
    };

    let rgba = decoded.to_rgba8();
    let layout = RowLayout::new(rgba.width(), rgba.height(), format)?;
    let translation = format.translation();
    let bpp = format.bytes_per_pixel();

    let texels = bytemuck::cast_slice::<u8, [u8; 4]>(rgba.as_raw());
    let mut data = vec![0; layout.byte_len()];
    for (row, target) in texels
        .chunks_exact(layout.width() as usize)
        .zip(data.chunks_exact_mut(layout.stride()))
    {
        for (&[r, g, b, a], px) in row.iter().zip(target.chunks_exact_mut(bpp)) {
            (translation.from_argb)(u32::from_be_bytes([a, r, g, b]), px);
        }
    }

    Ok(RasterImage::with_layout(layout, data))
}

/// One image of an icon directory.
struct IconEntry {
    /// The raw `ICONDIRENTRY`, with the offset field still pointing into the source.
    header: [u8; ICO_ENTRY],
    offset: usize,
    len: usize,
}

impl IconEntry {
    /// Re-wrap this entry as a container with exactly one image.
    fn as_single_icon(&self, source: &[u8]) -> Result<Vec<u8>, Error> {
        let payload = self
            .offset
            .checked_add(self.len)
            .and_then(|end| source.get(self.offset..end))
            .ok_or(truncated())?;

        let mut single = Vec::with_capacity(ICO_HEADER + ICO_ENTRY + payload.len());
        single.extend_from_slice(&[0, 0, 1, 0, 1, 0]);
        single.extend_from_slice(&self.header[..12]);
        single.extend_from_slice(&((ICO_HEADER + ICO_ENTRY) as u32).to_le_bytes());
        single.extend_from_slice(payload);
        Ok(single)
    }
}

fn is_icon_container(bytes: &[u8]) -> bool {
    // Icons are type 1, cursors type 2.
    matches!(bytes, [0, 0, 1 | 2, 0, ..])
}

fn icon_entries(bytes: &[u8]) -> Result<Vec<IconEntry>, Error> {
    let header = bytes.get(..ICO_HEADER).ok_or(truncated())?;
    let count = u16::from_le_bytes([header[4], header[5]]) as usize;
    if count == 0 {
        return Err(Error::new(ErrorKind::Decode, "icon container holds no images"));
    }

    (0..count)
        .map(|idx| {
            let start = ICO_HEADER + idx * ICO_ENTRY;
            let raw = bytes.get(start..start + ICO_ENTRY).ok_or(truncated())?;

            let mut header = [0; ICO_ENTRY];
            header.copy_from_slice(raw);
            let len = u32::from_le_bytes([raw[8], raw[9], raw[10], raw[11]]) as usize;
            let offset = u32::from_le_bytes([raw[12], raw[13], raw[14], raw[15]]) as usize;

            Ok(IconEntry {
                header,
                offset,
                len,
            })
        })
        .collect()
}

fn truncated() -> Error {
    Error::new(ErrorKind::Decode, "truncated icon container")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_directory_entries() -> Result<(), Error> {
        let mut ico = vec![0, 0, 1, 0, 1, 0];
        ico.extend_from_slice(&[16, 16, 0, 0, 1, 0, 32, 0]);
        ico.extend_from_slice(&4u32.to_le_bytes());
        ico.extend_from_slice(&22u32.to_le_bytes());
        ico.extend_from_slice(&[1, 2, 3, 4]);

        let entries = icon_entries(&ico)?;
        assert_eq!(entries.len(), 1);
        assert_eq!((entries[0].offset, entries[0].len), (22, 4));

        let single = entries[0].as_single_icon(&ico)?;
        assert_eq!(single, ico);
        Ok(())
    }

    #[test]
    fn truncated_directory() {
        let ico = [0, 0, 1, 0, 2, 0, 16, 16];
        assert_eq!(icon_entries(&ico).err().map(|e| e.kind()), Some(ErrorKind::Decode));
        assert!(is_icon_container(&ico));
        assert!(!is_icon_container(b"\x89PNG"));
    }
}
