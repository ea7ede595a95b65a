//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (sizes and timeouts > 0, addresses parse)
//! - Detect conflicting override parameter names
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: NormalizerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::HeaderName;

use crate::config::schema::NormalizerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &NormalizerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {:?}", config.listener.bind_address),
        ));
    }

    if config.body.max_size == 0 {
        errors.push(ValidationError::new("body.max_size", "must be greater than 0"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    let overrides = [
        ("overrides.body_param", &config.overrides.body_param),
        ("overrides.method_param", &config.overrides.method_param),
        ("overrides.content_type_param", &config.overrides.content_type_param),
        ("overrides.accept_param", &config.overrides.accept_param),
    ];
    let mut seen = HashSet::new();
    for (field, name) in overrides {
        if name.is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        } else if !seen.insert(name.as_str()) {
            errors.push(ValidationError::new(field, format!("duplicate parameter name {:?}", name)));
        }
    }

    let forwarding = [
        ("forwarding.proto_header", &config.forwarding.proto_header),
        ("forwarding.for_header", &config.forwarding.for_header),
    ];
    for (field, name) in forwarding {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::new(field, format!("invalid header name {:?}", name)));
        }
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("expected \"pretty\" or \"json\", got {:?}", config.observability.log_format),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("not a socket address: {:?}", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
