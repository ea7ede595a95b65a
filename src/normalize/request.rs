//! The normalized request.
//!
//! # Construction
//! ```text
//! InboundRequest
//!     → multipart check (content type, `_contentType` override)
//!     → body cache (skipped for multipart)
//!     → proxy resolution
//!     → NormalizedRequest (immutable)
//! ```
//!
//! Accessors consult, in order: override parameter, resolved proxy context,
//! raw request. Nothing re-reads the transport after construction.

use std::io::BufReader;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, Request};

use crate::config::{NormalizerConfig, OverrideConfig};
use crate::http::inbound::{InboundRequest, Parameters, RequestView};

use super::body::{self, is_form_urlencoded, is_multipart, resolve_charset, CachedBody};
use super::charset::DEFAULT_CHARSET;
use super::context::RequestContext;
use super::error::NormalizeError;
use super::proxy::ProxyContext;
use super::stream::ReplayableStream;
use super::url::canonical_port;

/// An override parameter that was present on the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub param: String,
    pub value: String,
}

impl Override {
    fn find(config: &OverrideConfig, params: &Parameters, param: &str) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        params.get(param).map(|value| Self {
            param: param.to_string(),
            value: value.to_string(),
        })
    }

    fn invalid(&self) -> NormalizeError {
        NormalizeError::InvalidOverride {
            name: self.param.clone(),
            value: self.value.clone(),
        }
    }
}

#[derive(Debug)]
enum BodyState {
    Cached(CachedBody),
    /// Native body, until taken.
    Multipart(Option<Body>),
}

/// Body access path handed out by [`NormalizedRequest::input_stream`].
#[derive(Debug)]
pub enum BodyStream {
    Cached(ReplayableStream),
    Passthrough(Body),
}

impl BodyStream {
    pub fn into_body(self) -> Body {
        match self {
            Self::Cached(stream) => stream.into_body(),
            Self::Passthrough(body) => body,
        }
    }
}

/// A request presented as if it arrived directly from the client.
#[derive(Debug)]
pub struct NormalizedRequest {
    raw: InboundRequest,
    parameters: Parameters,
    encoding: String,
    body: BodyState,
    proxy: ProxyContext,
    method_override: Option<Override>,
    content_type_override: Option<Override>,
    accept_override: Option<Override>,
    body_overridden: bool,
}

impl NormalizedRequest {
    /// Build the normalized view, draining the body unless it is multipart.
    ///
    /// Fails if the body cannot be drained, exceeds `body.max_size`, or declares
    /// an unsupported encoding. The caller must reject the request.
    pub async fn new(mut raw: InboundRequest, config: &NormalizerConfig) -> Result<Self, NormalizeError> {
        let overrides = &config.overrides;
        let mut parameters = raw.parameters().clone();

        let multipart = {
            let content_type = Override::find(overrides, &parameters, &overrides.content_type_param);
            is_multipart(content_type.as_ref().map(|o| o.value.as_str()).or(raw.content_type()))
        };

        let mut body_overridden = false;
        let body = if multipart {
            BodyState::Multipart(Some(raw.take_body()))
        } else {
            let charset = resolve_charset(raw.character_encoding())?;
            let bytes = body::drain(raw.take_body(), config.body.max_size).await?;
            if is_form_urlencoded(raw.content_type()) {
                parameters.extend_urlencoded(&bytes);
            }
            let override_body = Override::find(overrides, &parameters, &overrides.body_param);
            body_overridden = override_body.is_some();
            BodyState::Cached(CachedBody::new(
                &bytes,
                charset,
                override_body.as_ref().map(|o| o.value.as_str()),
            ))
        };

        let proxy = ProxyContext::resolve(&raw, &config.forwarding);

        let normalized = Self {
            encoding: raw.character_encoding().unwrap_or(DEFAULT_CHARSET).to_string(),
            method_override: Override::find(overrides, &parameters, &overrides.method_param),
            content_type_override: Override::find(overrides, &parameters, &overrides.content_type_param),
            accept_override: Override::find(overrides, &parameters, &overrides.accept_param),
            body_overridden,
            raw,
            parameters,
            body,
            proxy,
        };

        tracing::debug!(
            method = %normalized.method(),
            proxied = normalized.proxy.proxied,
            scheme = %normalized.proxy.scheme,
            multipart,
            overrides = ?normalized.overrides_applied(),
            "Request normalized"
        );

        Ok(normalized)
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self.body, BodyState::Multipart(_))
    }

    pub fn is_proxied(&self) -> bool {
        self.proxy.proxied
    }

    /// The request as received.
    pub fn raw(&self) -> &InboundRequest {
        &self.raw
    }

    /// Kinds of override that took effect.
    pub fn overrides_applied(&self) -> Vec<&'static str> {
        let mut applied = Vec::new();
        if self.method_override.is_some() {
            applied.push("method");
        }
        if self.content_type_override.is_some() {
            applied.push("content_type");
        }
        if self.accept_override.is_some() {
            applied.push("accept");
        }
        if self.body_overridden {
            applied.push("body");
        }
        applied
    }

    fn cached(&self) -> Result<&CachedBody, NormalizeError> {
        match &self.body {
            BodyState::Cached(cached) => Ok(cached),
            BodyState::Multipart(_) => Err(NormalizeError::MultipartBody),
        }
    }

    /// Body as decoded from the transport.
    pub fn original_body(&self) -> Result<&str, NormalizeError> {
        self.cached().map(CachedBody::original)
    }

    /// Effective body: the `_body` override if present, else the original.
    pub fn body(&self) -> Result<&str, NormalizeError> {
        self.cached().map(CachedBody::effective)
    }

    /// Independent reader over the effective body.
    pub fn replay(&self) -> Result<ReplayableStream, NormalizeError> {
        self.cached().map(CachedBody::replay)
    }

    /// Buffered reader over a fresh replay of the effective body.
    pub fn reader(&self) -> Result<BufReader<ReplayableStream>, NormalizeError> {
        self.cached().map(CachedBody::reader)
    }

    /// Body stream for any request.
    ///
    /// Cached bodies get a fresh replay on every call. Multipart bodies hand
    /// out the native stream once; later calls see it exhausted.
    pub fn input_stream(&mut self) -> BodyStream {
        match &mut self.body {
            BodyState::Cached(cached) => BodyStream::Cached(cached.replay()),
            BodyState::Multipart(native) => BodyStream::Passthrough(native.take().unwrap_or_default()),
        }
    }

    /// Snapshot for handlers.
    pub fn context(&self) -> RequestContext {
        RequestContext {
            proxied: self.proxy.proxied,
            scheme: self.scheme().to_string(),
            secure: self.is_secure(),
            remote_addr: self.remote_addr().to_string(),
            server_name: self.server_name().to_string(),
            server_port: self.server_port(),
            request_url: self.request_url(),
            multipart: self.is_multipart(),
            original_body: self.original_body().ok().map(Arc::from),
            body: self.body().ok().map(Arc::from),
        }
    }

    /// Rewrite into a request for downstream handlers.
    ///
    /// Method, `Content-Type` and `Accept` carry their overrides, the body is
    /// the cached replay (or the native multipart stream) and a
    /// [`RequestContext`] extension is attached.
    pub fn into_request(self) -> Result<Request<Body>, NormalizeError> {
        let context = self.context();

        let method = self
            .method_override
            .as_ref()
            .map(|o| Method::from_bytes(o.value.as_bytes()).map_err(|_| o.invalid()))
            .transpose()?;
        let content_type = header_override(self.content_type_override.as_ref())?;
        let accept = header_override(self.accept_override.as_ref())?;

        let Self { raw, body, .. } = self;
        let (mut parts, _) = raw.into_parts();

        if let Some(method) = method {
            parts.method = method;
        }
        if let Some(content_type) = content_type {
            parts.headers.insert(header::CONTENT_TYPE, content_type);
        }
        if let Some(accept) = accept {
            parts.headers.insert(header::ACCEPT, accept);
        }

        let body = match body {
            BodyState::Cached(cached) => {
                parts.headers.remove(header::TRANSFER_ENCODING);
                parts
                    .headers
                    .insert(header::CONTENT_LENGTH, HeaderValue::from(cached.bytes().len()));
                cached.replay().into_body()
            }
            BodyState::Multipart(native) => native.unwrap_or_default(),
        };

        parts.extensions.insert(context);
        Ok(Request::from_parts(parts, body))
    }
}

fn header_override(o: Option<&Override>) -> Result<Option<HeaderValue>, NormalizeError> {
    o.map(|o| HeaderValue::from_str(&o.value).map_err(|_| o.invalid()))
        .transpose()
}

fn is_accept(name: &str) -> bool {
    name.eq_ignore_ascii_case(header::ACCEPT.as_str())
}

impl RequestView for NormalizedRequest {
    fn method(&self) -> &str {
        match &self.method_override {
            Some(o) => o.value.as_str(),
            None => self.raw.method(),
        }
    }

    fn header(&self, name: &str) -> Option<&str> {
        match &self.accept_override {
            Some(o) if is_accept(name) => Some(o.value.as_str()),
            _ => self.raw.header(name),
        }
    }

    fn header_values(&self, name: &str) -> Vec<&str> {
        match &self.accept_override {
            Some(o) if is_accept(name) => vec![o.value.as_str()],
            _ => self.raw.header_values(name),
        }
    }

    fn content_type(&self) -> Option<&str> {
        match &self.content_type_override {
            Some(o) => Some(o.value.as_str()),
            None => self.raw.content_type(),
        }
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Declared encoding, or UTF-8.
    fn character_encoding(&self) -> Option<&str> {
        Some(self.encoding.as_str())
    }

    fn scheme(&self) -> &str {
        &self.proxy.scheme
    }

    fn is_secure(&self) -> bool {
        self.proxy.secure
    }

    fn remote_addr(&self) -> &str {
        if self.proxy.proxied {
            self.proxy.remote_addr.as_str()
        } else {
            self.raw.remote_addr()
        }
    }

    fn server_name(&self) -> &str {
        self.raw.server_name()
    }

    /// Behind a proxy, the canonical port of the resolved scheme.
    fn server_port(&self) -> Option<u16> {
        if self.proxy.proxied {
            if let Some(port) = canonical_port(&self.proxy.scheme) {
                return Some(port);
            }
        }
        self.raw.server_port()
    }

    fn request_uri(&self) -> &str {
        self.raw.request_uri()
    }
}
