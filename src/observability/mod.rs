//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! middleware / normalize:
//!     → logging.rs (structured events via tracing)
//!     → metrics.rs (request, override and rejection counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
