//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the normalizer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Listener configuration (bind address, TLS flag).
    pub listener: ListenerConfig,

    /// Body caching limits.
    pub body: BodyConfig,

    /// Override parameter names.
    pub overrides: OverrideConfig,

    /// Forwarding header handling.
    pub forwarding: ForwardingConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Whether connections on this listener are TLS-terminated.
    /// Drives the raw scheme and secure flag.
    pub secure: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            secure: false,
        }
    }
}

/// Body caching configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BodyConfig {
    /// Maximum body size cached in memory, in bytes.
    pub max_size: usize,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            max_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Names of the parameters that override transport-level properties.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OverrideConfig {
    /// Honour override parameters at all.
    pub enabled: bool,

    /// Replaces the effective body.
    pub body_param: String,

    /// Replaces the method.
    pub method_param: String,

    /// Replaces the content type.
    pub content_type_param: String,

    /// Replaces the Accept header.
    pub accept_param: String,
}

impl Default for OverrideConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            body_param: "_body".to_string(),
            method_param: "_method".to_string(),
            content_type_param: "_contentType".to_string(),
            accept_param: "_accept".to_string(),
        }
    }
}

/// Forwarding header configuration.
///
/// Forwarding headers are trusted unconditionally when enabled. Deployments
/// reachable without passing through a trusted proxy should disable them or
/// strip the headers upstream.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardingConfig {
    /// Resolve scheme and client address from forwarding headers.
    pub enabled: bool,

    /// Header carrying the client-facing protocol.
    pub proto_header: String,

    /// Header carrying the client address chain.
    pub for_header: String,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            proto_header: "x-forwarded-proto".to_string(),
            for_header: "x-forwarded-for".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: NormalizerConfig = toml::from_str(
            r#"
            [body]
            max_size = 1024

            [forwarding]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.body.max_size, 1024);
        assert!(!config.forwarding.enabled);
        assert_eq!(config.forwarding.proto_header, "x-forwarded-proto");
        assert_eq!(config.overrides.method_param, "_method");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
