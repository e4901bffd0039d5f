//! The error type shared by all fallible operations.
use core::fmt;
use std::error::Error as StdError;

/// Error that occurs when an image, session or icon operation fails.
///
/// All failures are raised at the offending call. No operation of this crate partially mutates
/// an image before returning an error.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<&'static str>,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

/// The broad class of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A dimension, scale, coordinate or buffer was out of its valid domain.
    InvalidArgument,
    /// The object is in a state that forbids the call, e.g. a second lock on one image.
    InvalidState,
    /// A named resource does not exist.
    NotFound,
    /// The operation is not available for this input, e.g. a palette of the wrong size.
    NotSupported,
    /// The underlying reader, writer or file failed.
    Io,
    /// The codec rejected the encoded data.
    Decode,
}

impl Error {
    pub(crate) const fn new(kind: ErrorKind, message: &'static str) -> Self {
        Error {
            kind,
            message: Some(message),
            source: None,
        }
    }

    pub(crate) const fn invalid_argument(message: &'static str) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    pub(crate) const fn invalid_state(message: &'static str) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    pub(crate) const fn not_found(message: &'static str) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub(crate) const fn not_supported(message: &'static str) -> Self {
        Self::new(ErrorKind::NotSupported, message)
    }

    /// The class of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::InvalidState => "invalid state",
            ErrorKind::NotFound => "not found",
            ErrorKind::NotSupported => "not supported",
            ErrorKind::Io => "i/o failure",
            ErrorKind::Decode => "codec failure",
        })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.message, &self.source) {
            (Some(message), _) => write!(f, "{}: {}", self.kind, message),
            (None, Some(source)) => write!(f, "{}: {}", self.kind, source),
            (None, None) => fmt::Display::fmt(&self.kind, f),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn StdError + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::Io,
        };

        Error {
            kind,
            message: None,
            source: Some(Box::new(err)),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        use image::ImageError;

        let kind = match &err {
            ImageError::IoError(_) => ErrorKind::Io,
            ImageError::Unsupported(_) => ErrorKind::NotSupported,
            ImageError::Parameter(_) | ImageError::Limits(_) => ErrorKind::InvalidArgument,
            ImageError::Decoding(_) | ImageError::Encoding(_) => ErrorKind::Decode,
        };

        Error {
            kind,
            message: None,
            source: Some(Box::new(err)),
        }
    }
}
