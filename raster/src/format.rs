//! Pixel formats, their ARGB translation and the container formats for export.

/// The byte layout of a single pixel.
///
/// Channel order within a pixel, in memory order:
///
/// | Format            | Bytes | Order            |
/// |-------------------|-------|------------------|
/// | `Format32bppRgb`  | 4     | unused, R, G, B  |
/// | `Format24bppRgb`  | 3     | R, G, B          |
/// | `Format32bppRgba` | 4     | A, R, G, B       |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Format32bppRgb,
    Format24bppRgb,
    Format32bppRgba,
}

/// Converts between the native bytes of one pixel and a `0xAARRGGBB` word.
///
/// Obtained from [`PixelFormat::translation`]. The slices passed to either function must hold
/// exactly [`PixelFormat::bytes_per_pixel`] bytes.
#[derive(Clone, Copy)]
pub struct Translation {
    pub to_argb: fn(&[u8]) -> u32,
    pub from_argb: fn(u32, &mut [u8]),
}

/// A container format for exporting images.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ImageFormat {
    Jpeg,
    Bitmap,
    Tiff,
    Png,
    Gif,
}

impl PixelFormat {
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Format32bppRgb | PixelFormat::Format32bppRgba => 32,
            PixelFormat::Format24bppRgb => 24,
        }
    }

    pub const fn bytes_per_pixel(self) -> usize {
        (self.bits_per_pixel() as usize + 7) / 8
    }

    pub const fn has_alpha(self) -> bool {
        matches!(self, PixelFormat::Format32bppRgba)
    }

    /// The translation functions for this format.
    ///
    /// Formats without alpha read back as opaque and ignore alpha on write.
    pub const fn translation(self) -> Translation {
        match self {
            PixelFormat::Format32bppRgb => Translation {
                to_argb: xrgb_to_argb,
                from_argb: argb_to_xrgb,
            },
            PixelFormat::Format24bppRgb => Translation {
                to_argb: rgb_to_argb,
                from_argb: argb_to_rgb,
            },
            PixelFormat::Format32bppRgba => Translation {
                to_argb: argb_to_argb,
                from_argb: argb_from_argb,
            },
        }
    }
}

impl ImageFormat {
    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Bitmap => image::ImageFormat::Bmp,
            ImageFormat::Tiff => image::ImageFormat::Tiff,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Gif => image::ImageFormat::Gif,
        }
    }

    /// Whether the container can store an alpha channel.
    pub const fn supports_alpha(self) -> bool {
        !matches!(self, ImageFormat::Jpeg)
    }
}

fn xrgb_to_argb(px: &[u8]) -> u32 {
    u32::from_be_bytes([0xff, px[1], px[2], px[3]])
}

fn argb_to_xrgb(argb: u32, px: &mut [u8]) {
    let [_, r, g, b] = argb.to_be_bytes();
    px.copy_from_slice(&[0xff, r, g, b]);
}

fn rgb_to_argb(px: &[u8]) -> u32 {
    u32::from_be_bytes([0xff, px[0], px[1], px[2]])
}

fn argb_to_rgb(argb: u32, px: &mut [u8]) {
    let [_, r, g, b] = argb.to_be_bytes();
    px.copy_from_slice(&[r, g, b]);
}

fn argb_to_argb(px: &[u8]) -> u32 {
    u32::from_be_bytes([px[0], px[1], px[2], px[3]])
}

fn argb_from_argb(argb: u32, px: &mut [u8]) {
    px.copy_from_slice(&argb.to_be_bytes());
}
