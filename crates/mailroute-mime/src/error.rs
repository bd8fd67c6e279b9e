//! Error types for email parsing.

use std::string::FromUtf8Error;

/// Result type alias for parsing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Parse error types.
///
/// None of these abort parsing of a whole email: a failing attachment block
/// is dropped and recorded on the [`ParsedEmail`](crate::ParsedEmail).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid content type.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// Invalid encoded-word or escape sequence.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// UTF-8 decode error.
    #[error("UTF-8 decode error: {0}")]
    Utf8Decode(#[from] FromUtf8Error),

    /// Attachment block is missing a required sub-field.
    #[error("Malformed attachment: missing {0}")]
    MalformedAttachment(&'static str),
}
