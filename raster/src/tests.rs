use crate::{Color, Error, ErrorKind, PixelFormat, RasterImage, Rectangle, RowOrder, Size};

const FORMATS: [PixelFormat; 3] = [
    PixelFormat::Format32bppRgb,
    PixelFormat::Format24bppRgb,
    PixelFormat::Format32bppRgba,
];

const TOLERANCE: f32 = 1.0 / 255.0 + 1e-6;

fn pattern(x: u32, y: u32, size: Size) -> Color {
    Color::new(
        x as f32 / size.width as f32,
        y as f32 / size.height as f32,
        0.3,
        (x + y) as f32 / (size.width + size.height) as f32,
    )
}

fn expected(color: Color, format: PixelFormat) -> Color {
    if format.has_alpha() {
        color
    } else {
        Color { a: 1.0, ..color }
    }
}

#[test]
fn pixel_round_trip() -> Result<(), Error> {
    for format in FORMATS {
        for (w, h) in [(1, 1), (3, 2), (5, 7), (16, 1)] {
            let size = Size::new(w, h);
            let image = RasterImage::new(w, h, format)?;

            let mut buffer = image.lock()?;
            for y in 0..h {
                for x in 0..w {
                    buffer.set_pixel(x, y, pattern(x, y, size));
                }
            }

            for y in 0..h {
                for x in 0..w {
                    let want = expected(pattern(x, y, size), format);
                    let got = buffer.get_pixel(x, y);
                    assert!(
                        got.approx_eq(want, TOLERANCE),
                        "{:?} {}x{} at ({}, {}): {:?} != {:?}",
                        format,
                        w,
                        h,
                        x,
                        y,
                        got,
                        want
                    );
                }
            }
            buffer.close();
        }
    }

    Ok(())
}

#[test]
fn second_lock_is_invalid_state() -> Result<(), Error> {
    let image = RasterImage::new(4, 4, PixelFormat::Format32bppRgba)?;
    let shared = image.clone();

    let buffer = image.lock()?;
    assert!(image.is_locked());

    let err = shared.lock().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);
    assert_eq!(image.get_pixel(0, 0).unwrap_err().kind(), ErrorKind::InvalidState);
    assert_eq!(image.copy(None).unwrap_err().kind(), ErrorKind::InvalidState);

    buffer.close();
    assert!(!image.is_locked());
    shared.lock()?.close();
    Ok(())
}

#[test]
fn dropped_session_unlocks() -> Result<(), Error> {
    let image = RasterImage::new(2, 2, PixelFormat::Format24bppRgb)?;

    let fails = || -> Result<(), Error> {
        let _buffer = image.lock()?;
        Err(Error::from(std::io::Error::from(std::io::ErrorKind::Other)))
    };
    assert_eq!(fails().unwrap_err().kind(), ErrorKind::Io);

    assert!(!image.is_locked());
    Ok(())
}

#[test]
fn leaked_session_keeps_lock() -> Result<(), Error> {
    let image = RasterImage::new(2, 2, PixelFormat::Format24bppRgb)?;
    core::mem::forget(image.lock()?);

    assert!(image.is_locked());
    assert_eq!(image.lock().unwrap_err().kind(), ErrorKind::InvalidState);
    Ok(())
}

#[test]
fn pixels_match_get_pixel() -> Result<(), Error> {
    for format in FORMATS {
        let size = Size::new(5, 3);
        let image = RasterImage::new(size.width, size.height, format)?;

        let mut buffer = image.lock()?;
        let written = buffer.set_pixels(
            (0..size.height).flat_map(|y| (0..size.width).map(move |x| pattern(x, y, size))),
        );
        assert_eq!(written, 15);

        let pixels = buffer.pixels();
        assert_eq!(pixels.len(), 15);

        let by_coord: Vec<Color> = (0..size.height)
            .flat_map(|y| (0..size.width).map(move |x| (x, y)))
            .map(|(x, y)| buffer.get_pixel(x, y))
            .collect();
        assert_eq!(pixels.collect::<Vec<_>>(), by_coord);
        buffer.close();
    }

    Ok(())
}

#[test]
fn set_pixels_short_and_long() -> Result<(), Error> {
    let image = RasterImage::new(2, 2, PixelFormat::Format32bppRgba)?;
    let mut buffer = image.lock()?;

    assert_eq!(buffer.set_pixels([Color::WHITE; 3]), 3);
    let colors: Vec<_> = buffer.pixels().collect();
    assert_eq!(colors[..3], [Color::WHITE; 3]);
    assert_eq!(colors[3], Color::TRANSPARENT);

    let mut surplus = std::iter::repeat(Color::BLACK).take(10);
    assert_eq!(buffer.set_pixels(surplus.by_ref()), 4);
    assert!(buffer.pixels().all(|c| c == Color::BLACK));
    assert_eq!(surplus.count(), 6);
    Ok(())
}

#[test]
fn flipped_rows() -> Result<(), Error> {
    // Two rows of one RGB pixel, stored bottom row first, with padding.
    let bytes = vec![0x00, 0x00, 0xff, 0xee, 0xff, 0x00, 0x00, 0xee];
    let image = RasterImage::from_raw(
        1,
        2,
        PixelFormat::Format24bppRgb,
        4,
        RowOrder::BottomUp,
        bytes,
    )?;

    let buffer = image.lock()?;
    assert!(buffer.is_flipped());
    assert_eq!(buffer.stride(), 4);
    assert_eq!(buffer.offset_of(0, 0), 4);
    assert_eq!(buffer.get_pixel(0, 0), Color::rgb(1.0, 0.0, 0.0));
    assert_eq!(buffer.get_pixel(0, 1), Color::rgb(0.0, 0.0, 1.0));
    assert_eq!(buffer.row(0), [0xff, 0x00, 0x00]);
    buffer.close();

    // Copies are normalized to top-down.
    let copy = image.copy(None)?;
    assert!(!copy.layout().is_flipped());
    assert_eq!(copy.get_pixel(0, 0)?, Color::rgb(1.0, 0.0, 0.0));
    Ok(())
}

#[test]
fn raw_buffer_must_cover_layout() {
    let err = RasterImage::from_raw(
        2,
        2,
        PixelFormat::Format32bppRgb,
        8,
        RowOrder::TopDown,
        vec![0; 15],
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn copy_region_is_independent() -> Result<(), Error> {
    let image = RasterImage::new(4, 4, PixelFormat::Format32bppRgba)?;
    image.set_pixel(2, 1, Color::WHITE)?;

    let crop = image.copy(Some(Rectangle::new(1, 1, 2, 3)))?;
    assert_eq!(crop.size(), Size::new(2, 3));
    assert_eq!(crop.get_pixel(1, 0)?, Color::WHITE);

    crop.set_pixel(1, 0, Color::BLACK)?;
    assert_eq!(image.get_pixel(2, 1)?, Color::WHITE);
    assert!(!crop.ptr_eq(&image));

    for region in [Rectangle::new(3, 3, 2, 1), Rectangle::new(0, 0, 0, 1)] {
        let err = image.copy(Some(region)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    Ok(())
}

#[test]
fn convenience_access_checks_bounds() -> Result<(), Error> {
    let image = RasterImage::new(2, 2, PixelFormat::Format32bppRgb)?;
    assert_eq!(image.get_pixel(2, 0).unwrap_err().kind(), ErrorKind::InvalidArgument);
    assert_eq!(
        image.set_pixel(0, 2, Color::WHITE).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    assert!(!image.is_locked());
    Ok(())
}

#[test]
fn rgba_export_order() -> Result<(), Error> {
    let image = RasterImage::new(2, 1, PixelFormat::Format24bppRgb)?;
    image.set_pixel(1, 0, Color::rgb(1.0, 0.0, 0.0))?;
    assert_eq!(image.to_rgba8()?, [0, 0, 0, 0xff, 0xff, 0, 0, 0xff]);
    Ok(())
}

#[test]
fn with_size_wraps_in_icon() -> Result<(), Error> {
    let image = RasterImage::new(64, 32, PixelFormat::Format32bppRgba)?;
    let icon = image.with_size(16, 16)?;

    assert_eq!(icon.frames().len(), 1);
    assert_eq!(icon.frames()[0].scale(), 4.0);
    assert_eq!(icon.size()?, Size::new(16, 8));
    assert!(icon.frames()[0].bitmap()?.ptr_eq(&image));
    Ok(())
}
