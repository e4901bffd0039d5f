//! Palette based images.
use crate::color::Color;
use crate::error::Error;
use crate::format::PixelFormat;
use crate::layout::RowLayout;
use crate::raster::RasterImage;

/// An ordered list of colors addressed by index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

/// An image storing one palette index per pixel.
///
/// The palette always has exactly `1 << bits_per_pixel` entries.
///
/// # Usage
///
/// ```
/// use image_raster::{Color, IndexedImage, Palette};
///
/// let mut image = IndexedImage::new(2, 2, 1)?;
/// image.set_palette(Palette::new(vec![Color::BLACK, Color::WHITE]))?;
/// image.set_index(1, 1, 1)?;
///
/// let raster = image.to_raster()?;
/// assert_eq!(raster.get_pixel(1, 1)?, Color::WHITE);
/// # Ok::<(), image_raster::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct IndexedImage {
    width: u32,
    height: u32,
    bits_per_pixel: u32,
    indices: Vec<u8>,
    palette: Palette,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Palette { colors }
    }

    /// A ramp from black to white with `len` entries.
    pub fn grayscale(len: usize) -> Self {
        let last = len.saturating_sub(1).max(1) as f32;
        let colors = (0..len)
            .map(|idx| {
                let value = idx as f32 / last;
                Color::rgb(value, value, value)
            })
            .collect();
        Palette { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

impl IndexedImage {
    /// An image of index `0` everywhere, with a grayscale palette.
    ///
    /// `bits_per_pixel` must be one of 1, 4 or 8.
    pub fn new(width: u32, height: u32, bits_per_pixel: u32) -> Result<Self, Error> {
        if !matches!(bits_per_pixel, 1 | 4 | 8) {
            return Err(Error::invalid_argument("indexed images use 1, 4 or 8 bits per pixel"));
        }

        if width == 0 || height == 0 {
            return Err(Error::invalid_argument("width and height must be positive"));
        }

        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(Error::invalid_argument("image dimensions exceed memory"))?;

        Ok(IndexedImage {
            width,
            height,
            bits_per_pixel,
            indices: vec![0; len],
            palette: Palette::grayscale(1 << bits_per_pixel),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bits_per_pixel(&self) -> u32 {
        self.bits_per_pixel
    }

    /// The number of colors a palette for this image must have.
    pub fn palette_len(&self) -> usize {
        1 << self.bits_per_pixel
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Replace the palette.
    ///
    /// Fails as not supported unless the palette has exactly [`IndexedImage::palette_len`]
    /// colors.
    pub fn set_palette(&mut self, palette: Palette) -> Result<(), Error> {
        if palette.len() != self.palette_len() {
            return Err(Error::not_supported(
                "palette size does not match the bits per pixel of the image",
            ));
        }

        self.palette = palette;
        Ok(())
    }

    pub fn get_index(&self, x: u32, y: u32) -> Result<u8, Error> {
        let idx = self.offset(x, y)?;
        Ok(self.indices[idx])
    }

    pub fn set_index(&mut self, x: u32, y: u32, index: u8) -> Result<(), Error> {
        if usize::from(index) >= self.palette_len() {
            return Err(Error::invalid_argument("index outside of the palette"));
        }

        let idx = self.offset(x, y)?;
        self.indices[idx] = index;
        Ok(())
    }

    /// Resolve every index through the palette into a new RGBA image.
    pub fn to_raster(&self) -> Result<RasterImage, Error> {
        let format = PixelFormat::Format32bppRgba;
        let layout = RowLayout::new(self.width, self.height, format)?;
        let translation = format.translation();

        let mut data = vec![0; layout.byte_len()];
        for (row, target) in self
            .indices
            .chunks_exact(self.width as usize)
            .zip(data.chunks_exact_mut(layout.stride()))
        {
            for (&index, px) in row.iter().zip(target.chunks_exact_mut(format.bytes_per_pixel())) {
                let color = self.palette.get(index.into()).unwrap_or(Color::TRANSPARENT);
                (translation.from_argb)(color.to_argb(), px);
            }
        }

        Ok(RasterImage::with_layout(layout, data))
    }

    fn offset(&self, x: u32, y: u32) -> Result<usize, Error> {
        if x >= self.width || y >= self.height {
            return Err(Error::invalid_argument("coordinate outside of the image"));
        }

        Ok(y as usize * self.width as usize + x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn palette_size_must_match() -> Result<(), Error> {
        let mut image = IndexedImage::new(4, 4, 4)?;
        assert_eq!(image.palette().len(), 16);

        let err = image.set_palette(Palette::grayscale(256)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);

        image.set_palette(Palette::grayscale(16))?;
        Ok(())
    }

    #[test]
    fn index_range() -> Result<(), Error> {
        let mut image = IndexedImage::new(2, 1, 1)?;
        assert_eq!(image.set_index(0, 0, 2).unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert_eq!(image.get_index(2, 0).unwrap_err().kind(), ErrorKind::InvalidArgument);

        image.set_index(1, 0, 1)?;
        assert_eq!(image.get_index(1, 0)?, 1);
        Ok(())
    }

    #[test]
    fn unsupported_depth() {
        let err = IndexedImage::new(1, 1, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn grayscale_ramp() {
        let ramp = Palette::grayscale(2);
        assert_eq!(ramp.colors(), [Color::BLACK, Color::WHITE]);
        assert_eq!(Palette::grayscale(1).get(0), Some(Color::BLACK));
    }
}
