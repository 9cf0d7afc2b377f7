//! # Error Hierarchy
//!
//! Structured error types for the identifier core, built with `thiserror`.
//!
//! Every error classifies into an [`ErrorClass`], the four-way signal the
//! HTTP boundary maps to transport status codes. Nothing in this crate
//! catches and swallows its own errors; they propagate to the boundary.

use thiserror::Error;

/// Coarse error taxonomy consumed by the boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Malformed or missing caller input (4xx).
    ClientInput,
    /// Upstream reports no matching record (404).
    NotFound,
    /// The caller was rejected by a key check (401/403).
    Authorization,
    /// Anything else. Details are never shown to the caller (500).
    Internal,
}

/// Errors raised by the identifier codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Token is malformed, was produced under another key, or was tampered with.
    #[error("token could not be verified")]
    InvalidToken,

    /// Token verified but its payload is not a non-negative integer.
    #[error("token payload is not a valid identifier: {0}")]
    Format(String),

    /// A configured key is not a valid Fernet key.
    #[error("invalid codec key: {0}")]
    InvalidKey(String),
}

impl CodecError {
    /// Classify for the boundary layer.
    pub fn class(&self) -> ErrorClass {
        ErrorClass::Internal
    }
}

/// Errors raised while normalizing requests or annotating responses.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An identifier token does not decode under the configured keys.
    #[error("unknown SDS identifier: {0}")]
    UnknownIdentifier(String),

    /// A content checksum is not 32 hexadecimal characters.
    #[error("unknown pdf_md5 checksum: {0}")]
    UnknownChecksum(String),

    /// A batch list exceeds the configured limit.
    #[error("too many values in {field}: at most {limit} are allowed")]
    BatchTooLarge {
        /// Name of the offending request field.
        field: &'static str,
        /// The configured limit.
        limit: usize,
    },

    /// Neither an identifier nor a checksum was supplied.
    #[error("at least one of sds_id or pdf_md5 is required")]
    MissingParameter,

    /// An upstream record does not have the expected shape.
    #[error("malformed upstream record: {0}")]
    MalformedRecord(String),

    /// The codec failed outside of input decoding.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

impl CoreError {
    /// Classify for the boundary layer.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::UnknownIdentifier(_)
            | Self::UnknownChecksum(_)
            | Self::BatchTooLarge { .. }
            | Self::MissingParameter => ErrorClass::ClientInput,
            Self::MalformedRecord(_) => ErrorClass::Internal,
            Self::Codec(e) => e.class(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_input_errors_classify_as_client_input() {
        for err in [
            CoreError::UnknownIdentifier("x".into()),
            CoreError::UnknownChecksum("y".into()),
            CoreError::BatchTooLarge {
                field: "sds_id",
                limit: 3,
            },
            CoreError::MissingParameter,
        ] {
            assert_eq!(err.class(), ErrorClass::ClientInput, "{err}");
        }
    }

    #[test]
    fn malformed_record_is_internal() {
        assert_eq!(
            CoreError::MalformedRecord("id".into()).class(),
            ErrorClass::Internal
        );
        assert_eq!(
            CoreError::from(CodecError::InvalidToken).class(),
            ErrorClass::Internal
        );
    }

    #[test]
    fn batch_too_large_names_limit() {
        let err = CoreError::BatchTooLarge {
            field: "pdf_md5",
            limit: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("100"), "got: {msg}");
        assert!(msg.contains("pdf_md5"), "got: {msg}");
    }
}
