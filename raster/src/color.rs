/// A color with straight alpha, every channel within `0.0..=1.0`.
///
/// Pixel storage is always 8 bits per channel, so values read back from an image are quantized
/// to the nearest multiple of `1/255`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    /// An opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Color::new(r, g, b, 1.0)
    }

    pub fn from_rgba8([r, g, b, a]: [u8; 4]) -> Self {
        Color {
            r: unit(r),
            g: unit(g),
            b: unit(b),
            a: unit(a),
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        [
            quantize(self.r),
            quantize(self.g),
            quantize(self.b),
            quantize(self.a),
        ]
    }

    /// Unpack a `0xAARRGGBB` word.
    ///
    /// ```
    /// use image_raster::Color;
    /// let color = Color::from_argb(0xff_ff_00_00);
    /// assert_eq!(color, Color::rgb(1.0, 0.0, 0.0));
    /// ```
    pub fn from_argb(argb: u32) -> Self {
        let [a, r, g, b] = argb.to_be_bytes();
        Color::from_rgba8([r, g, b, a])
    }

    /// Pack into a `0xAARRGGBB` word, rounding every channel to 8 bits.
    pub fn to_argb(self) -> u32 {
        let [r, g, b, a] = self.to_rgba8();
        u32::from_be_bytes([a, r, g, b])
    }

    /// Compare two colors with a tolerance per channel.
    pub fn approx_eq(self, other: Color, tolerance: f32) -> bool {
        (self.r - other.r).abs() <= tolerance
            && (self.g - other.g).abs() <= tolerance
            && (self.b - other.b).abs() <= tolerance
            && (self.a - other.a).abs() <= tolerance
    }
}

fn unit(value: u8) -> f32 {
    f32::from(value) / 255.0
}

fn quantize(value: f32) -> u8 {
    // NaN maps to 0 through the saturating cast.
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[test]
fn argb_packing() {
    let color = Color::from_argb(0x80_10_20_30);
    assert_eq!(color.to_rgba8(), [0x10, 0x20, 0x30, 0x80]);
    assert_eq!(color.to_argb(), 0x80_10_20_30);
    assert_eq!(Color::new(2.0, -1.0, 0.5, 1.0).to_argb(), 0xff_ff_00_80);
}
