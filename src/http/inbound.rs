//! Raw inbound request, as observed on the socket.
//!
//! # Responsibilities
//! - Capture method, headers, URI and body of an axum request
//! - Derive connection facts (scheme, server name/port, peer)
//! - Decode query parameters
//!
//! [`RequestView`] is the capability interface handlers program against; both
//! [`InboundRequest`] and the normalized request implement it.

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{header, request::Parts, HeaderMap, Request};

use crate::normalize::url::{build_request_url, canonical_port, SCHEME_HTTP, SCHEME_HTTPS};

/// Decoded request parameters, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters(Vec<(String, String)>);

impl Parameters {
    /// Decode an `application/x-www-form-urlencoded` query string.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        if let Some(query) = query {
            params.extend_urlencoded(query.as_bytes());
        }
        params
    }

    /// Append pairs decoded from an urlencoded payload.
    pub fn extend_urlencoded(&mut self, input: &[u8]) {
        self.0.extend(url::form_urlencoded::parse(input).into_owned());
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// All values for `name`.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Read-only view of an HTTP request.
pub trait RequestView {
    fn method(&self) -> &str;

    /// First value of a header. Names match case-insensitively.
    fn header(&self, name: &str) -> Option<&str>;

    /// Every value of a header, in order.
    fn header_values(&self, name: &str) -> Vec<&str>;

    fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
    }

    fn parameters(&self) -> &Parameters;

    fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters().get(name)
    }

    /// Declared body encoding.
    fn character_encoding(&self) -> Option<&str>;

    fn scheme(&self) -> &str;

    fn is_secure(&self) -> bool;

    /// Client address as text.
    fn remote_addr(&self) -> &str;

    fn server_name(&self) -> &str;

    /// Port the client addressed, if known.
    fn server_port(&self) -> Option<u16>;

    /// Path portion of the request target, without the query string.
    fn request_uri(&self) -> &str;

    /// Absolute URL the client addressed, without the query string.
    fn request_url(&self) -> String {
        build_request_url(
            self.scheme(),
            self.server_name(),
            self.server_port(),
            self.request_uri(),
        )
    }
}

/// A request exactly as the server received it.
#[derive(Debug)]
pub struct InboundRequest {
    parts: Parts,
    body: Body,
    scheme: String,
    secure: bool,
    remote_addr: String,
    server_name: String,
    server_port: Option<u16>,
    charset: Option<String>,
    parameters: Parameters,
}

impl InboundRequest {
    /// Capture a request.
    ///
    /// `peer` is the socket peer, `local` the address the server is bound to and
    /// `secure` whether the listener terminates TLS.
    pub fn from_request(
        request: Request<Body>,
        peer: Option<SocketAddr>,
        local: Option<SocketAddr>,
        secure: bool,
    ) -> Self {
        let (parts, body) = request.into_parts();

        let scheme = match parts.uri.scheme_str() {
            Some(scheme) => scheme.to_ascii_lowercase(),
            None if secure => SCHEME_HTTPS.to_string(),
            None => SCHEME_HTTP.to_string(),
        };

        let host = parts
            .headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .filter(|h| !h.is_empty())
            .map(split_host_port)
            .or_else(|| {
                parts
                    .uri
                    .authority()
                    .map(|a| (a.host().to_string(), a.port_u16()))
            });

        let (server_name, server_port) = match host {
            Some((name, Some(port))) => (name, Some(port)),
            Some((name, None)) => (name, canonical_port(&scheme)),
            None => (
                local
                    .map(|addr| addr.ip().to_string())
                    .unwrap_or_else(|| "localhost".to_string()),
                local.map(|addr| addr.port()),
            ),
        };

        let charset = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(content_type_charset);

        let parameters = Parameters::from_query(parts.uri.query());

        Self {
            body,
            scheme,
            secure,
            remote_addr: peer.map(|addr| addr.ip().to_string()).unwrap_or_default(),
            server_name,
            server_port,
            charset,
            parameters,
            parts,
        }
    }

    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Move the body out. The transport stream is single-pass, so the request
    /// is left holding an empty body.
    pub fn take_body(&mut self) -> Body {
        std::mem::take(&mut self.body)
    }

    pub fn into_parts(self) -> (Parts, Body) {
        (self.parts, self.body)
    }
}

impl RequestView for InboundRequest {
    fn method(&self) -> &str {
        self.parts.method.as_str()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name).and_then(|v| v.to_str().ok())
    }

    fn header_values(&self, name: &str) -> Vec<&str> {
        self.parts
            .headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    fn character_encoding(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    fn scheme(&self) -> &str {
        &self.scheme
    }

    fn is_secure(&self) -> bool {
        self.secure
    }

    fn remote_addr(&self) -> &str {
        &self.remote_addr
    }

    fn server_name(&self) -> &str {
        &self.server_name
    }

    fn server_port(&self) -> Option<u16> {
        self.server_port
    }

    fn request_uri(&self) -> &str {
        self.parts.uri.path()
    }
}

/// Split a `Host` value into name and optional port. Bracketed IPv6 literals keep their brackets.
fn split_host_port(host: &str) -> (String, Option<u16>) {
    if host.starts_with('[') {
        if let Some(end) = host.find(']') {
            let port = host[end + 1..]
                .strip_prefix(':')
                .and_then(|p| p.parse().ok());
            return (host[..=end].to_string(), port);
        }
    }
    match host.rsplit_once(':') {
        Some((name, port)) => match port.parse() {
            Ok(port) => (name.to_string(), Some(port)),
            Err(_) => (host.to_string(), None),
        },
        None => (host.to_string(), None),
    }
}

/// Extract the `charset` parameter of a content type.
pub fn content_type_charset(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (name, value) = param.split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}
