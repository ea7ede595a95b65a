//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → middleware.rs (build InboundRequest, normalize, rewrite)
//!     → handler (sees RequestContext + replayable body)
//!     → response.rs (rejections when normalization fails)
//! ```

pub mod inbound;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use inbound::{InboundRequest, Parameters, RequestView};
pub use middleware::{normalize_middleware, NormalizeState};
pub use request::{MakeRequestUuidV4, X_REQUEST_ID};
pub use server::HttpServer;
