//! Rejection responses for requests that cannot be normalized.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::normalize::NormalizeError;
use crate::observability::metrics;

/// Status code a normalization failure maps to.
pub fn status_for(error: &NormalizeError) -> StatusCode {
    match error {
        NormalizeError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        NormalizeError::MultipartBody => StatusCode::INTERNAL_SERVER_ERROR,
        NormalizeError::BodyRead(_)
        | NormalizeError::UnsupportedCharset(_)
        | NormalizeError::InvalidOverride { .. } => StatusCode::BAD_REQUEST,
    }
}

/// Log, count and answer a rejected request.
pub fn reject(error: NormalizeError) -> Response {
    let status = status_for(&error);
    tracing::warn!(
        error = %error,
        reason = error.reason(),
        status = status.as_u16(),
        "Rejecting request"
    );
    metrics::record_rejected(error.reason());
    (status, error.to_string()).into_response()
}
