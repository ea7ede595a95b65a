//! Request normalization.
//!
//! # Data Flow
//! ```text
//! InboundRequest (socket view)
//!     → body.rs (drain once, decode, `_body` override)
//!     → proxy.rs (x-forwarded-proto / x-forwarded-for)
//!     → request.rs (override-aware accessors)
//!     → into_request() → handler sees the client's view
//! ```
//!
//! # Design Decisions
//! - All state is computed at construction; accessors are pure reads
//! - Multipart bodies are never buffered and therefore never replayable
//! - Forwarding headers are trusted; disable them in config when not behind a proxy

pub mod body;
pub mod charset;
pub mod context;
pub mod error;
pub mod proxy;
pub mod request;
pub mod stream;
pub mod url;

pub use context::RequestContext;
pub use error::NormalizeError;
pub use proxy::ProxyContext;
pub use request::{BodyStream, NormalizedRequest};
pub use stream::ReplayableStream;
