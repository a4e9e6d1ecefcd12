//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to encode a value.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },

    /// Stored bytes do not match the expected encoding.
    #[error("decoding failed: {message}")]
    DecodingFailed {
        /// Description of the decoding error.
        message: String,
    },

    /// Input ended before a complete value was read.
    #[error("unexpected end of input while decoding {type_name}")]
    UnexpectedEof {
        /// Name of the type being decoded.
        type_name: &'static str,
    },

    /// Input had bytes left over after a complete value was read.
    #[error("{count} trailing bytes after decoding {type_name}")]
    TrailingBytes {
        /// Name of the type being decoded.
        type_name: &'static str,
        /// Number of unconsumed bytes.
        count: usize,
    },

    /// Invalid UTF-8 string.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// An escaped component contained an unknown escape sequence.
    #[error("invalid escape byte {byte:#04x} in key component")]
    InvalidEscape {
        /// The byte following the escape marker.
        byte: u8,
    },
}

impl CodecError {
    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Create a decoding failed error.
    pub fn decoding_failed(message: impl Into<String>) -> Self {
        Self::DecodingFailed {
            message: message.into(),
        }
    }

    /// Returns true if this error was raised while decoding stored bytes.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        !matches!(self, Self::EncodingFailed { .. })
    }
}
