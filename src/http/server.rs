//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the echo handler
//! - Wire up middleware (tracing, request ID, timeout, normalization)
//! - Bind server to listener
//! - Graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    middleware,
    routing::any,
    Extension, Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::NormalizerConfig;
use crate::http::middleware::{normalize_middleware, NormalizeState};
use crate::http::request::{MakeRequestUuidV4, X_REQUEST_ID};
use crate::lifecycle::signals::shutdown_signal;
use crate::normalize::RequestContext;

/// What the echo handler saw.
#[derive(Debug, Serialize)]
pub struct EchoResponse {
    pub request_id: Option<String>,
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub accept: Vec<String>,
    #[serde(flatten)]
    pub context: RequestContext,
    /// Bytes read from the handler's body stream, as text.
    pub body: String,
    pub original_body: Option<String>,
}

/// HTTP server fronted by the normalization middleware.
pub struct HttpServer {
    config: Arc<NormalizerConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: NormalizerConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// `local_addr` is the address the listener is bound to, if known.
    #[allow(deprecated)]
    pub fn router(&self, local_addr: Option<SocketAddr>) -> Router {
        let state = NormalizeState {
            config: self.config.clone(),
            local_addr,
        };

        Router::new()
            .route("/", any(echo_handler))
            .route("/{*path}", any(echo_handler))
            .layer(middleware::from_fn_with_state(state, normalize_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(self.config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires or Ctrl+C is received.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            secure = self.config.listener.secure,
            "HTTP server starting"
        );

        let app = self
            .router(Some(addr))
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }
}

/// Echo the normalized view back as JSON.
async fn echo_handler(
    Extension(context): Extension<RequestContext>,
    request: Request<Body>,
) -> Result<Json<EchoResponse>, StatusCode> {
    let (parts, body) = request.into_parts();

    let header_text = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let bytes = axum::body::to_bytes(body, usize::MAX).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to read normalized body");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(Json(EchoResponse {
        request_id: header_text(X_REQUEST_ID.as_str()),
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        content_type: header_text(header::CONTENT_TYPE.as_str()),
        accept: parts
            .headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(ToString::to_string)
            .collect(),
        body: String::from_utf8_lossy(&bytes).into_owned(),
        original_body: context.original_body().ok().map(ToString::to_string),
        context,
    }))
}
