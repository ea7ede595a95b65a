//! Handler-facing snapshot of a normalized request.

use std::sync::Arc;

use serde::Serialize;

use super::error::NormalizeError;

/// Resolved request facts, attached to the rewritten request as an extension.
///
/// Handlers extract it with `Extension<RequestContext>`.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext {
    pub proxied: bool,
    pub scheme: String,
    pub secure: bool,
    pub remote_addr: String,
    pub server_name: String,
    pub server_port: Option<u16>,
    pub request_url: String,
    pub multipart: bool,
    #[serde(skip)]
    pub(crate) original_body: Option<Arc<str>>,
    #[serde(skip)]
    pub(crate) body: Option<Arc<str>>,
}

impl RequestContext {
    /// Body as decoded from the transport.
    pub fn original_body(&self) -> Result<&str, NormalizeError> {
        self.original_body.as_deref().ok_or(NormalizeError::MultipartBody)
    }

    /// Effective body, after any `_body` override.
    pub fn body(&self) -> Result<&str, NormalizeError> {
        self.body.as_deref().ok_or(NormalizeError::MultipartBody)
    }
}
