//! Normalization middleware.
//!
//! Wraps every inbound request in a [`NormalizedRequest`] and forwards the
//! rewritten request, so handlers downstream see the client's view: overridden
//! method and headers, a replayable body, and a [`RequestContext`] extension.
//!
//! [`RequestContext`]: crate::normalize::RequestContext

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::config::NormalizerConfig;
use crate::http::inbound::InboundRequest;
use crate::http::response::reject;
use crate::normalize::NormalizedRequest;
use crate::observability::metrics;

/// State required by the normalization middleware.
#[derive(Debug, Clone)]
pub struct NormalizeState {
    pub config: Arc<NormalizerConfig>,
    /// Address the server is bound to, used when a request carries no `Host`.
    pub local_addr: Option<SocketAddr>,
}

pub async fn normalize_middleware(
    State(state): State<NormalizeState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let raw = InboundRequest::from_request(request, peer, state.local_addr, state.config.listener.secure);

    let normalized = match NormalizedRequest::new(raw, &state.config).await {
        Ok(normalized) => normalized,
        Err(e) => return reject(e),
    };

    metrics::record_normalized(
        normalized.is_proxied(),
        normalized.is_multipart(),
        &normalized.overrides_applied(),
    );

    match normalized.into_request() {
        Ok(request) => next.run(request).await,
        Err(e) => reject(e),
    }
}
