//! Request normalization layer.
//!
//! Presents every inbound request as if it arrived directly from the client:
//! forwarding headers set the scheme and client address, override parameters
//! (`_method`, `_contentType`, `_accept`, `_body`) stand in for transport
//! properties clients cannot set, and the body is cached so handlers can read
//! it any number of times.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod normalize;
pub mod observability;

pub use config::NormalizerConfig;
pub use http::{HttpServer, InboundRequest, RequestView};
pub use lifecycle::Shutdown;
pub use normalize::{NormalizeError, NormalizedRequest, RequestContext};
