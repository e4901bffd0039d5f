//! Multi-resolution icons and the choice of frame to draw.
use std::io::Read;
use std::path::Path;

use crate::codec::{Codec, ImageCodec};
use crate::error::Error;
use crate::frame::IconFrame;
use crate::geometry::Size;
use crate::resource::{self, Resources};

/// A set of frames showing the same picture at different resolutions.
///
/// An icon always has at least one frame and is immutable; [`Icon::with_size`] returns a new
/// icon.
///
/// # Usage
///
/// ```
/// use image_raster::{Icon, IconFrame, PixelFormat, RasterImage, Size};
///
/// let normal = RasterImage::new(16, 16, PixelFormat::Format32bppRgba)?;
/// let retina = RasterImage::new(32, 32, PixelFormat::Format32bppRgba)?;
/// let icon = Icon::new(vec![
///     IconFrame::new(1.0, normal)?,
///     IconFrame::new(2.0, retina)?,
/// ])?;
///
/// // On a display with two physical pixels per logical pixel.
/// let frame = icon.get_frame(2.0, None)?;
/// assert_eq!(frame.pixel_size()?, Size::new(32, 32));
/// # Ok::<(), image_raster::Error>(())
/// ```
#[derive(Clone, Debug)]
pub struct Icon {
    frames: Vec<IconFrame>,
}

impl Icon {
    /// An icon over explicit frames.
    ///
    /// Fails when `frames` is empty.
    pub fn new(frames: Vec<IconFrame>) -> Result<Self, Error> {
        if frames.is_empty() {
            return Err(Error::invalid_argument("an icon needs at least one frame"));
        }

        Ok(Icon { frames })
    }

    /// Decode an image or multi-resolution icon container.
    ///
    /// Every contained image becomes a frame of scale 1.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::decode_with(&ImageCodec::default(), bytes)
    }

    /// Decode with a specific codec, see [`Icon::from_bytes`].
    pub fn decode_with(codec: &dyn Codec, bytes: &[u8]) -> Result<Self, Error> {
        let frames = codec
            .decode_frames(bytes)?
            .into_iter()
            .map(|bitmap| IconFrame::new(1.0, bitmap))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(frames)
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self, Error> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Load `name` from `resources`, with any `@<scale>x` variants next to it.
    ///
    /// For `App.icon.png` this also picks up `App.icon@2x.png`, `App.icon@0.5x.png`, and so on.
    /// Variants are loaded on first use. An `.ico` resource is read as one container instead,
    /// without looking for variants.
    pub fn from_resource<R>(resources: &R, name: &str) -> Result<Self, Error>
    where
        R: Resources + Clone + 'static,
    {
        let frames = resource::scan(resources, name)?;
        Self::new(frames)
    }

    pub fn frames(&self) -> &[IconFrame] {
        &self.frames
    }

    /// The frame defining the logical size: the first frame of scale 1, or the first frame.
    pub fn default_frame(&self) -> &IconFrame {
        self.frames
            .iter()
            .find(|frame| frame.scale() == 1.0)
            .unwrap_or(&self.frames[0])
    }

    /// Size of the icon in logical pixels.
    pub fn size(&self) -> Result<Size, Error> {
        self.default_frame().size()
    }

    /// Choose the frame to draw at `scale` physical pixels per logical pixel.
    ///
    /// With a `fitting_size`, in logical pixels, the smallest frame with at least as many pixels
    /// as that size needs at `scale` wins, or the largest frame when none is big enough.
    ///
    /// Without it the frame with the smallest scale not below `scale` wins, or the largest scale
    /// below it. Among frames of equal scale the smallest one that still covers the icon's
    /// logical size at `scale` is taken. Ties keep the order of [`Icon::frames`].
    ///
    /// Loads deferred frames as needed for their pixel sizes.
    pub fn get_frame(&self, scale: f32, fitting_size: Option<Size>) -> Result<IconFrame, Error> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(Error::invalid_argument("scale must be positive and finite"));
        }

        let candidates = self.candidates()?;
        let chosen = match fitting_size {
            Some(fitting) => select_fitting(&candidates, fitting.scaled(scale).area()),
            None => {
                let required = self.size()?.scaled(scale).area();
                select_by_scale(&candidates, scale, required)
            }
        };

        let chosen = chosen
            .or_else(|| largest(&candidates))
            .ok_or(Error::invalid_state("icon has no frames"))?;
        log::trace!(
            "chose frame at scale {} ({} pixels) for scale {} and fitting size {:?}",
            chosen.frame.scale(),
            chosen.area,
            scale,
            fitting_size
        );

        Ok(chosen.frame.clone())
    }

    /// Re-tag every frame so that its logical size fits into `fitting`.
    ///
    /// Each frame's new scale is the larger of its pixel width over `fitting.width` and pixel
    /// height over `fitting.height`. Bitmaps are shared with this icon, not resampled.
    ///
    /// ```
    /// use image_raster::{Icon, IconFrame, PixelFormat, RasterImage, Size};
    ///
    /// let bitmap = RasterImage::new(128, 128, PixelFormat::Format32bppRgba)?;
    /// let icon = Icon::new(vec![IconFrame::new(1.0, bitmap)?])?;
    ///
    /// let small = icon.with_size(Size::new(16, 32))?;
    /// assert_eq!(small.frames()[0].scale(), 8.0);
    /// assert_eq!(small.size()?, Size::new(16, 16));
    /// # Ok::<(), image_raster::Error>(())
    /// ```
    pub fn with_size(&self, fitting: Size) -> Result<Icon, Error> {
        if fitting.is_empty() {
            return Err(Error::invalid_argument("fitting size must be positive"));
        }

        let frames = self
            .frames
            .iter()
            .map(|frame| {
                let pixels = frame.pixel_size()?;
                let scale = f32::max(
                    pixels.width as f32 / fitting.width as f32,
                    pixels.height as f32 / fitting.height as f32,
                );
                frame.with_scale(scale)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Icon::new(frames)
    }

    fn candidates(&self) -> Result<Vec<Candidate<'_>>, Error> {
        self.frames
            .iter()
            .map(|frame| {
                Ok(Candidate {
                    frame,
                    area: frame.pixel_area()?,
                })
            })
            .collect()
    }
}

/// A frame with its pixel area, resolved once per selection.
#[derive(Clone, Copy)]
struct Candidate<'icon> {
    frame: &'icon IconFrame,
    area: u64,
}

impl Candidate<'_> {
    fn scale(&self) -> f32 {
        self.frame.scale()
    }
}

/// The smallest frame of at least `required` pixels.
fn select_fitting<'a>(candidates: &[Candidate<'a>], required: u64) -> Option<Candidate<'a>> {
    let mut by_area = candidates.to_vec();
    // Stable, so equal areas keep frame order.
    by_area.sort_by_key(|c| c.area);
    by_area.into_iter().find(|c| c.area >= required)
}

/// Walk frames by ascending scale, then descending area.
///
/// The walk relies on that order: within a run of equal scales it stops advancing at the first
/// frame smaller than `required`, since all following frames of that scale are smaller still.
fn select_by_scale<'a>(
    candidates: &[Candidate<'a>],
    scale: f32,
    required: u64,
) -> Option<Candidate<'a>> {
    let mut ordered = candidates.to_vec();
    ordered.sort_by(|a, b| {
        a.scale()
            .total_cmp(&b.scale())
            .then_with(|| b.area.cmp(&a.area))
    });

    let mut best: Option<Candidate<'a>> = None;
    let mut run_exhausted = false;

    for candidate in ordered {
        if let Some(current) = best {
            if candidate.scale() == current.scale() {
                if run_exhausted || candidate.area < required {
                    run_exhausted = true;
                } else {
                    best = Some(candidate);
                }
                continue;
            }

            // The current run already reaches the requested scale, larger ones only over-fetch.
            if current.scale() >= scale {
                break;
            }
        }

        best = Some(candidate);
        run_exhausted = false;
    }

    best
}

fn largest<'a>(candidates: &[Candidate<'a>]) -> Option<Candidate<'a>> {
    // `max_by_key` keeps the last maximum, iterate in reverse to prefer the first frame.
    candidates.iter().rev().max_by_key(|c| c.area).copied()
}
