//! Scheme constants and absolute URL reconstruction.
//!
//! The port accessor and the URL builder both consult [`canonical_port`], so
//! they can never disagree about which port a scheme implies.

/// Plain HTTP scheme token.
pub const SCHEME_HTTP: &str = "http";

/// Secure HTTP scheme token.
pub const SCHEME_HTTPS: &str = "https";

/// Port implied by [`SCHEME_HTTP`].
pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Port implied by [`SCHEME_HTTPS`].
pub const DEFAULT_HTTPS_PORT: u16 = 443;

/// Default port for a scheme, if it has one.
pub fn canonical_port(scheme: &str) -> Option<u16> {
    match scheme {
        SCHEME_HTTP => Some(DEFAULT_HTTP_PORT),
        SCHEME_HTTPS => Some(DEFAULT_HTTPS_PORT),
        _ => None,
    }
}

/// Rebuild `scheme://host[:port]path`.
///
/// An unset port is treated as 80. The port is omitted only when it equals the
/// canonical port of the scheme; schemes without a canonical port always render it.
pub fn build_request_url(scheme: &str, host: &str, port: Option<u16>, path: &str) -> String {
    let port = port.unwrap_or(DEFAULT_HTTP_PORT);

    let mut url = String::with_capacity(scheme.len() + host.len() + path.len() + 9);
    url.push_str(scheme);
    url.push_str("://");
    url.push_str(host);
    if canonical_port(scheme) != Some(port) {
        url.push(':');
        url.push_str(&port.to_string());
    }
    url.push_str(path);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_default_port_rendered() {
        assert_eq!(
            build_request_url("http", "example.com", Some(8080), "/a/b"),
            "http://example.com:8080/a/b"
        );
    }

    #[test]
    fn test_default_port_omitted() {
        assert_eq!(
            build_request_url("http", "example.com", Some(80), "/a/b"),
            "http://example.com/a/b"
        );
        assert_eq!(
            build_request_url("https", "example.com", Some(443), "/"),
            "https://example.com/"
        );
    }

    #[test]
    fn test_cross_scheme_default_is_rendered() {
        assert_eq!(
            build_request_url("https", "example.com", Some(80), "/x"),
            "https://example.com:80/x"
        );
        assert_eq!(
            build_request_url("http", "example.com", Some(443), "/x"),
            "http://example.com:443/x"
        );
    }

    #[test]
    fn test_unset_port_treated_as_80() {
        assert_eq!(build_request_url("http", "h", None, "/p"), "http://h/p");
        assert_eq!(build_request_url("https", "h", None, "/p"), "https://h:80/p");
    }

    #[test]
    fn test_unknown_scheme_always_renders_port() {
        assert_eq!(build_request_url("ws", "h", Some(80), "/"), "ws://h:80/");
    }
}
