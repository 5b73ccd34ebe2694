// SPDX-License-Identifier: MPL-2.0
use std::fmt;

/// Errors surfaced by the processing pipeline and its collaborators.
#[derive(Debug, Clone)]
pub enum Error {
    /// Generic I/O failure (file access, config read/write).
    Io(String),

    /// Input file cannot be opened or is not a valid image/video of the
    /// declared type. Fatal for the run; a partially written output file is
    /// not guaranteed to be valid.
    Decode(String),

    /// Output container or encoder failure while frames were still owed.
    Encode(String),

    /// Effect identifier outside the closed set. Boundary layers must catch
    /// this before the frame processor is reached.
    UnsupportedEffect(String),

    /// Brightness/contrast value outside the documented bounds, rejected at
    /// the boundary.
    InvalidParameter(String),

    /// Landmark model could not be loaded or inference failed.
    Inference(String),

    /// Closing the landmark detector or a media handle failed after the
    /// primary work completed. Logged by callers, not silently swallowed.
    ResourceRelease(String),

    /// Configuration file could not be parsed or written.
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(msg) => write!(f, "I/O error: {msg}"),
            Error::Decode(msg) => write!(f, "Decode error: {msg}"),
            Error::Encode(msg) => write!(f, "Encode error: {msg}"),
            Error::UnsupportedEffect(name) => write!(f, "Unsupported effect: {name:?}"),
            Error::InvalidParameter(msg) => write!(f, "Invalid parameter: {msg}"),
            Error::Inference(msg) => write!(f, "Inference error: {msg}"),
            Error::ResourceRelease(msg) => write!(f, "Resource release failed: {msg}"),
            Error::Config(msg) => write!(f, "Config error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_io_error() {
        let err = Error::Io("disk failure".to_string());
        assert_eq!(format!("{}", err), "I/O error: disk failure");
    }

    #[test]
    fn display_formats_decode_error() {
        let err = Error::Decode("could not read the image".to_string());
        assert_eq!(format!("{}", err), "Decode error: could not read the image");
    }

    #[test]
    fn display_quotes_effect_name() {
        let err = Error::UnsupportedEffect("sepia".to_string());
        assert_eq!(format!("{}", err), "Unsupported effect: \"sepia\"");
    }

    #[test]
    fn from_io_error_produces_io_variant() {
        let io_error = std::io::Error::other("boom");
        let err: Error = io_error.into();
        match err {
            Error::Io(message) => assert!(message.contains("boom")),
            _ => panic!("expected Io variant"),
        }
    }

    #[test]
    fn resource_release_formats_properly() {
        let err = Error::ResourceRelease("trailer write failed".into());
        assert!(format!("{}", err).contains("trailer write failed"));
    }

    #[test]
    fn invalid_parameter_formats_properly() {
        let err = Error::InvalidParameter("brightness 120 out of range".into());
        assert!(format!("{}", err).contains("brightness 120"));
    }
}
