//! Benchmarks bulk pixel access through a session against per pixel convenience calls.
use brunch::Bench;

use image_raster::{Color, Error, Icon, IconFrame, PixelFormat, RasterImage, Size};

#[derive(Clone, Copy, Debug)]
enum Access {
    /// One session, every pixel read and written through it.
    Session,
    /// Every pixel read and written with its own lock.
    Convenience,
}

#[derive(Debug)]
struct Fill {
    format: PixelFormat,
    access: Access,
    sz: u32,
}

impl Fill {
    fn name(&self) -> String {
        format!("fill({:?}, {:?}, {})", self.format, self.access, self.sz)
    }

    fn prepare(&self) -> Result<impl FnMut(), Error> {
        let image = RasterImage::new(self.sz, self.sz, self.format)?;
        let (access, sz) = (self.access, self.sz);

        Ok(move || match access {
            Access::Session => {
                let mut buffer = image.lock().unwrap();
                for y in 0..sz {
                    for x in 0..sz {
                        let color = buffer.get_pixel(x, y);
                        buffer.set_pixel(x, y, Color { r: 1.0 - color.r, ..color });
                    }
                }
                buffer.close();
            }
            Access::Convenience => {
                for y in 0..sz {
                    for x in 0..sz {
                        let color = image.get_pixel(x, y).unwrap();
                        image.set_pixel(x, y, Color { r: 1.0 - color.r, ..color }).unwrap();
                    }
                }
            }
        })
    }
}

fn selection() -> Result<impl FnMut() -> Size, Error> {
    let frames = [16, 24, 32, 48, 64, 128, 256]
        .iter()
        .map(|&side| {
            let bitmap = RasterImage::new(side, side, PixelFormat::Format32bppRgba)?;
            IconFrame::new(1.0, bitmap)
        })
        .collect::<Result<Vec<_>, Error>>()?;
    let icon = Icon::new(frames)?.with_size(Size::new(16, 16))?;

    Ok(move || icon.get_frame(3.0, None).unwrap().pixel_size().unwrap())
}

fn main() {
    let mut tests = vec![];
    for format in [
        PixelFormat::Format32bppRgb,
        PixelFormat::Format24bppRgb,
        PixelFormat::Format32bppRgba,
    ] {
        for access in [Access::Session, Access::Convenience] {
            tests.push(Fill {
                format,
                access,
                sz: 128,
            });
        }
    }

    let mut benches = brunch::Benches::default();
    benches.extend(tests.iter().map(|fill| {
        let bench = match fill.prepare() {
            Ok(bench) => bench,
            Err(err) => panic!("Failed to setup benchmark {:?}: {:?}", fill, err),
        };

        Bench::new(format!("raster::access::main::{}", fill.name())).run(bench)
    }));

    let select = Bench::new("raster::access::main::select(7 frames)")
        .run(selection().expect("Failed to setup benchmark"));
    benches.extend([select]);
    benches.finish();
}
