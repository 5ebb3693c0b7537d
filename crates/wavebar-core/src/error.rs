//! Error types shared by the wavebar crates
//!
//! Construction-time problems (`ConfigError`) are returned synchronously and
//! are fatal for the instance being built. Load problems (`LoadError`) reject a
//! single load; the owning player stays usable for the next attempt.

use thiserror::Error;

/// Color parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("Invalid color format: {0:?} (expected 6-digit hex, e.g. #ff8800)")]
    InvalidColorFormat(String),
}

/// Errors raised while constructing a view or player
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Container element not found: {0}")]
    ElementNotFound(String),

    #[error("Invalid container element: {0}")]
    InvalidElement(String),

    #[error("Invalid color option: {0}")]
    InvalidColor(#[from] ColorError),
}

/// Category of a media element error, from the element's numeric error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaErrorKind {
    /// Fetching was aborted at the user's request (code 1)
    Aborted,
    /// A network error interrupted the download (code 2)
    Network,
    /// The media could not be decoded (code 3)
    Decode,
    /// The source format is not supported (code 4)
    UnsupportedFormat,
    /// Any other code
    Unknown,
}

impl MediaErrorKind {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::Aborted,
            2 => Self::Network,
            3 => Self::Decode,
            4 => Self::UnsupportedFormat,
            _ => Self::Unknown,
        }
    }

    /// Human readable description used in error messages
    pub fn message(&self) -> &'static str {
        match self {
            Self::Aborted => "playback aborted by the user",
            Self::Network => "a network error caused the audio download to fail",
            Self::Decode => "the audio could not be decoded",
            Self::UnsupportedFormat => "the audio format is not supported",
            Self::Unknown => "an unknown media error occurred",
        }
    }
}

impl std::fmt::Display for MediaErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Errors that reject a load operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Media error (code {code}): {kind}")]
    Media { kind: MediaErrorKind, code: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Load aborted")]
    Aborted,

    #[error("Invalid waveform data: {0}")]
    InvalidData(String),

    #[error("Load superseded by a newer load")]
    Superseded,
}

impl LoadError {
    /// Build a media error from the element's numeric code
    pub fn media(code: u16) -> Self {
        Self::Media {
            kind: MediaErrorKind::from_code(code),
            code,
        }
    }

    /// Stable lowercase category name for the error
    pub fn category(&self) -> &'static str {
        match self {
            Self::Media { kind, .. } => match kind {
                MediaErrorKind::Aborted => "aborted",
                MediaErrorKind::Network => "network",
                MediaErrorKind::Decode => "decode",
                MediaErrorKind::UnsupportedFormat => "unsupported-format",
                MediaErrorKind::Unknown => "unknown",
            },
            Self::Network(_) => "network",
            Self::Decode(_) => "decode",
            Self::UnsupportedFormat(_) => "unsupported-format",
            Self::Aborted => "aborted",
            Self::InvalidData(_) => "invalid-data",
            Self::Superseded => "superseded",
        }
    }
}
