//! Named resources and the `@<scale>x` naming convention for icon frames.
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use crate::codec::{Codec, ImageCodec};
use crate::error::Error;
use crate::frame::IconFrame;

/// A flat namespace of binary resources.
pub trait Resources {
    /// All resource names, in a stable order.
    fn names(&self) -> Result<Vec<String>, Error>;

    /// The contents of `name`, failing with [`ErrorKind::NotFound`] if it does not exist.
    ///
    /// [`ErrorKind::NotFound`]: crate::ErrorKind::NotFound
    fn open(&self, name: &str) -> Result<Vec<u8>, Error>;
}

/// Resources held in memory, typically from `include_bytes!`.
///
/// ```
/// use image_raster::{EmbeddedResources, Resources};
///
/// static TABLE: &[(&str, &[u8])] = &[("App.icon.png", b"..." as &[u8])];
/// let resources = EmbeddedResources::from_static(TABLE);
/// assert_eq!(resources.names()?, ["App.icon.png"]);
/// # Ok::<(), image_raster::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct EmbeddedResources {
    entries: Rc<BTreeMap<String, Cow<'static, [u8]>>>,
}

/// Resources stored as files of one directory, named by their file name.
#[derive(Clone, Debug)]
pub struct DirectoryResources {
    root: PathBuf,
}

impl EmbeddedResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_static(table: &[(&str, &'static [u8])]) -> Self {
        let mut resources = Self::new();
        for &(name, bytes) in table {
            resources.insert(name, bytes);
        }
        resources
    }

    /// Add or replace a resource.
    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Cow<'static, [u8]>>) {
        Rc::make_mut(&mut self.entries).insert(name.into(), bytes.into());
    }
}

impl Resources for EmbeddedResources {
    fn names(&self) -> Result<Vec<String>, Error> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn open(&self, name: &str) -> Result<Vec<u8>, Error> {
        self.entries
            .get(name)
            .map(|bytes| bytes.to_vec())
            .ok_or(Error::not_found("no resource of that name"))
    }
}

impl DirectoryResources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryResources { root: root.into() }
    }
}

impl Resources for DirectoryResources {
    fn names(&self) -> Result<Vec<String>, Error> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            // Names that are not UTF-8 can not be requested anyway.
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }

    fn open(&self, name: &str) -> Result<Vec<u8>, Error> {
        if name.is_empty() || name.contains(&['/', '\\'][..]) || name == ".." {
            return Err(Error::invalid_argument("resource names are plain file names"));
        }

        Ok(std::fs::read(self.root.join(name))?)
    }
}

/// Build the frames for the resource `name` and its scaled variants.
pub(crate) fn scan<R>(resources: &R, name: &str) -> Result<Vec<IconFrame>, Error>
where
    R: Resources + Clone + 'static,
{
    let names = resources.names()?;
    if !names.iter().any(|candidate| candidate == name) {
        return Err(Error::not_found("no resource of that name"));
    }

    let (stem, extension) = split_extension(name);

    if extension.eq_ignore_ascii_case("ico") {
        let bytes = resources.open(name)?;
        return ImageCodec::default()
            .decode_frames(&bytes)?
            .into_iter()
            .map(|bitmap| IconFrame::new(1.0, bitmap))
            .collect();
    }

    let mut variants: Vec<(f32, &str)> = names
        .iter()
        .filter_map(|candidate| Some((variant_scale(candidate, stem, extension)?, &**candidate)))
        .collect();
    // Stable, duplicates such as `@2x` and `@2.0x` keep name order.
    variants.sort_by(|a, b| a.0.total_cmp(&b.0));

    log::debug!("resource {} has {} scaled variants", name, variants.len());

    let mut frames = vec![deferred_frame(resources, 1.0, name)?];
    for (scale, variant) in variants {
        frames.push(deferred_frame(resources, scale, variant)?);
    }

    Ok(frames)
}

fn deferred_frame<R>(resources: &R, scale: f32, name: &str) -> Result<IconFrame, Error>
where
    R: Resources + Clone + 'static,
{
    let resources = resources.clone();
    let name = name.to_owned();
    IconFrame::deferred(scale, move || {
        let bytes = resources.open(&name)?;
        ImageCodec::default().decode(&bytes)
    })
}

/// Split `App.icon.png` into `App.icon` and `png`.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, extension),
        _ => (name, ""),
    }
}

/// The scale of `candidate` if it is named `<stem>@<scale>x.<extension>`.
fn variant_scale(candidate: &str, stem: &str, extension: &str) -> Option<f32> {
    let rest = candidate.strip_prefix(stem)?.strip_prefix('@')?;
    let rest = if extension.is_empty() {
        rest
    } else {
        rest.strip_suffix(extension)?.strip_suffix('.')?
    };

    let scale: f32 = rest.strip_suffix(&['x', 'X'][..])?.parse().ok()?;
    (scale.is_finite() && scale > 0.0).then_some(scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_names() {
        let (stem, ext) = split_extension("App.icon.png");
        assert_eq!((stem, ext), ("App.icon", "png"));

        assert_eq!(variant_scale("App.icon@2x.png", stem, ext), Some(2.0));
        assert_eq!(variant_scale("App.icon@0.5x.png", stem, ext), Some(0.5));
        assert_eq!(variant_scale("App.icon@1.5X.png", stem, ext), Some(1.5));
        assert_eq!(variant_scale("App.icon.png", stem, ext), None);
        assert_eq!(variant_scale("App.icon@2x.jpg", stem, ext), None);
        assert_eq!(variant_scale("App.icon@x.png", stem, ext), None);
        assert_eq!(variant_scale("App.icon@0x.png", stem, ext), None);
        assert_eq!(variant_scale("App.icons@2x.png", stem, ext), None);
    }

    #[test]
    fn names_without_extension() {
        assert_eq!(split_extension("logo"), ("logo", ""));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(variant_scale("logo@3x", "logo", ""), Some(3.0));
    }

    #[test]
    fn missing_base_is_not_found() {
        let resources = EmbeddedResources::from_static(&[("Other.png", &b""[..])]);
        let err = scan(&resources, "App.icon.png").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::NotFound);
    }

    #[test]
    fn scan_defers_loading() -> Result<(), Error> {
        // Not valid images, but nothing is decoded until a bitmap is requested.
        let resources = EmbeddedResources::from_static(&[
            ("App.icon.png", &b"not an image"[..]),
            ("App.icon@2x.png", &b"not an image"[..]),
        ]);

        let frames = scan(&resources, "App.icon.png")?;
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|frame| !frame.is_loaded()));
        assert!(frames[1].bitmap().is_err());
        Ok(())
    }
}
