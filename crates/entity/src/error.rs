use thiserror::Error;

/// Errors raised while building an entity or resetting a request.
///
/// Every variant is fatal for the call that produced it: none of them
/// become recoverable by retrying with the same arguments.
#[derive(Debug, Error)]
pub enum EntityError {
    #[error("unsupported encoding: {charset}")]
    UnsupportedEncoding { charset: String },

    #[error("byte range out of bounds, offset: {offset} length: {length} buffer length: {buffer_len}")]
    OutOfRange { offset: isize, length: isize, buffer_len: usize },

    #[error("request can not be reset: {reason}")]
    ResetUnsupported { reason: String },

    #[error("invalid content type: {reason}")]
    InvalidContentType { reason: String },

    #[error("invalid form: {source}")]
    InvalidForm {
        #[from]
        source: serde_urlencoded::ser::Error,
    },

    #[error("invalid request: {source}")]
    InvalidRequest {
        #[from]
        source: http::Error,
    },
}

impl EntityError {
    pub fn unsupported_encoding<S: ToString>(charset: S) -> Self {
        Self::UnsupportedEncoding { charset: charset.to_string() }
    }

    pub fn out_of_range(offset: isize, length: isize, buffer_len: usize) -> Self {
        Self::OutOfRange { offset, length, buffer_len }
    }

    pub fn reset_unsupported<S: ToString>(str: S) -> Self {
        Self::ResetUnsupported { reason: str.to_string() }
    }

    pub fn invalid_content_type<S: ToString>(str: S) -> Self {
        Self::InvalidContentType { reason: str.to_string() }
    }

    /// Returns true for the encoding failure class, so callers can tell a bad
    /// charset name apart from the other faults.
    pub fn is_unsupported_encoding(&self) -> bool {
        matches!(self, Self::UnsupportedEncoding { .. })
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }

    pub fn is_reset_unsupported(&self) -> bool {
        matches!(self, Self::ResetUnsupported { .. })
    }
}
