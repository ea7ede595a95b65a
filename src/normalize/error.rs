//! Normalization errors.

/// Error produced while building or reading a normalized request.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// The transport body could not be drained.
    #[error("failed to read request body: {0}")]
    BodyRead(#[source] axum::Error),

    /// The body exceeded the configured cache limit.
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// The request declared an encoding we cannot decode.
    #[error("unsupported character encoding: {0}")]
    UnsupportedCharset(String),

    /// Cached body text was requested on a multipart request.
    #[error("multipart request does not support preloaded body")]
    MultipartBody,

    /// An override parameter carried a value that cannot be applied.
    #[error("invalid value for override parameter {name}: {value:?}")]
    InvalidOverride { name: String, value: String },
}

impl NormalizeError {
    /// Short, stable label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::BodyRead(_) => "body_read",
            Self::BodyTooLarge { .. } => "body_too_large",
            Self::UnsupportedCharset(_) => "unsupported_charset",
            Self::MultipartBody => "multipart_body",
            Self::InvalidOverride { .. } => "invalid_override",
        }
    }
}
