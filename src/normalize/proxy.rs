//! Proxy context resolution.
//!
//! Forwarding headers are read once, when the normalized request is built.
//! They are trusted unconditionally: the resolver assumes a correctly
//! configured reverse proxy in front of the server. `forwarding.enabled`
//! turns resolution off for deployments where that does not hold.

use crate::config::ForwardingConfig;
use crate::http::inbound::RequestView;

/// Scheme and client address as the client saw them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyContext {
    /// A forwarded protocol header was present.
    pub proxied: bool,
    pub scheme: String,
    pub secure: bool,
    /// Resolved client address.
    pub remote_addr: String,
}

impl ProxyContext {
    /// Context of a request that reached us directly.
    pub fn direct<R: RequestView + ?Sized>(raw: &R) -> Self {
        Self {
            proxied: false,
            scheme: raw.scheme().to_string(),
            secure: raw.is_secure(),
            remote_addr: raw.remote_addr().to_string(),
        }
    }

    /// Resolve the context from forwarding headers, falling back to the raw request.
    ///
    /// Only the protocol header marks a request as proxied. The client address
    /// chain is consulted for proxied requests alone, and the secure flag
    /// always mirrors the listener.
    pub fn resolve<R: RequestView + ?Sized>(raw: &R, config: &ForwardingConfig) -> Self {
        let mut context = Self::direct(raw);
        if !config.enabled {
            return context;
        }

        let Some(proto) = non_empty(raw.header(&config.proto_header)) else {
            return context;
        };
        context.proxied = true;
        context.scheme = proto.to_lowercase();

        if let Some(chain) = non_empty(raw.header(&config.for_header)) {
            context.remote_addr = first_hop(chain).to_string();
        }

        context
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Client end of an `x-forwarded-for` chain.
fn first_hop(chain: &str) -> &str {
    chain.split(',').next().unwrap_or(chain).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::inbound::InboundRequest;
    use axum::body::Body;
    use axum::http::Request;

    fn raw(headers: &[(&str, &str)]) -> InboundRequest {
        let mut builder = Request::builder().uri("/").header("host", "internal:8080");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        InboundRequest::from_request(
            builder.body(Body::empty()).unwrap(),
            Some("172.16.0.5:40000".parse().unwrap()),
            None,
            false,
        )
    }

    #[test]
    fn test_direct_request_mirrors_raw() {
        let context = ProxyContext::resolve(&raw(&[]), &ForwardingConfig::default());
        assert!(!context.proxied);
        assert_eq!(context.scheme, "http");
        assert!(!context.secure);
        assert_eq!(context.remote_addr, "172.16.0.5");
    }

    #[test]
    fn test_forwarded_proto_overrides_scheme() {
        let context = ProxyContext::resolve(
            &raw(&[("X-Forwarded-Proto", "HTTPS")]),
            &ForwardingConfig::default(),
        );
        assert!(context.proxied);
        assert_eq!(context.scheme, "https");
        assert!(!context.secure);
        assert_eq!(context.remote_addr, "172.16.0.5");
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let context = ProxyContext::resolve(
            &raw(&[("x-forwarded-proto", "https"), ("x-forwarded-for", " 1.2.3.4 , 5.6.7.8")]),
            &ForwardingConfig::default(),
        );
        assert_eq!(context.remote_addr, "1.2.3.4");
    }

    #[test]
    fn test_forwarded_for_without_proto_is_direct() {
        let context = ProxyContext::resolve(
            &raw(&[("x-forwarded-for", "1.2.3.4, 5.6.7.8")]),
            &ForwardingConfig::default(),
        );
        assert!(!context.proxied);
        assert_eq!(context.scheme, "http");
        assert_eq!(context.remote_addr, "172.16.0.5");
    }

    #[test]
    fn test_proto_is_lowercased_verbatim() {
        let context = ProxyContext::resolve(
            &raw(&[("x-forwarded-proto", "HTTPS ")]),
            &ForwardingConfig::default(),
        );
        assert!(context.proxied);
        assert_eq!(context.scheme, "https ");
    }

    #[test]
    fn test_empty_headers_are_ignored() {
        let context = ProxyContext::resolve(
            &raw(&[("x-forwarded-proto", ""), ("x-forwarded-for", "1.2.3.4")]),
            &ForwardingConfig::default(),
        );
        assert!(!context.proxied);
        assert_eq!(context.remote_addr, "172.16.0.5");

        let context = ProxyContext::resolve(
            &raw(&[("x-forwarded-proto", "https"), ("x-forwarded-for", "")]),
            &ForwardingConfig::default(),
        );
        assert!(context.proxied);
        assert_eq!(context.remote_addr, "172.16.0.5");
    }

    #[test]
    fn test_disabled_forwarding_ignores_headers() {
        let config = ForwardingConfig {
            enabled: false,
            ..ForwardingConfig::default()
        };
        let context = ProxyContext::resolve(
            &raw(&[("x-forwarded-proto", "https"), ("x-forwarded-for", "1.2.3.4")]),
            &config,
        );
        assert_eq!(context, ProxyContext::direct(&raw(&[])));
    }

    #[test]
    fn test_custom_header_names() {
        let config = ForwardingConfig {
            proto_header: "x-scheme".into(),
            for_header: "x-real-ip".into(),
            ..ForwardingConfig::default()
        };
        let context = ProxyContext::resolve(
            &raw(&[("x-scheme", "https"), ("x-real-ip", "9.9.9.9")]),
            &config,
        );
        assert_eq!(context.scheme, "https");
        assert_eq!(context.remote_addr, "9.9.9.9");
    }
}
