use thiserror::Error;

/// Errors returned by fallible date operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Text did not match the layout, or named a date or time that doesn't exist.
    #[error("parsing {text:?} as {layout:?}: {reason}")]
    Parse {
        layout: String,
        text: String,
        reason: String,
    },

    /// The layout is malformed, or the value has no rendering under it.
    #[error("formatting with {layout:?}: {reason}")]
    Format { layout: String, reason: String },

    /// JSON and text encodings only cover four-digit years.
    #[error("year {year} outside of range [0,9999]")]
    YearOutOfRange { year: i64 },

    #[error("invalid binary encoding: {0}")]
    BinaryDecode(&'static str),

    #[error("unix time {unix_seconds}s cannot be encoded")]
    TimeOutOfRange { unix_seconds: i64 },

    #[error("zone offset {offset}s cannot be encoded")]
    ZoneOffset { offset: i32 },

    #[error("unknown time zone {name:?}: {reason}")]
    UnknownZone { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn parse(layout: &str, text: &str, reason: impl Into<String>) -> Self {
        Error::Parse {
            layout: layout.to_string(),
            text: text.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn format(layout: &str, reason: impl Into<String>) -> Self {
        Error::Format {
            layout: layout.to_string(),
            reason: reason.into(),
        }
    }
}
