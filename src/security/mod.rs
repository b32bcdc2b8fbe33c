//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (per-client admission on protected prefixes)
//!     → handler
//!     → headers.rs (attach security headers unless the path is excluded)
//! ```
//!
//! # Design Decisions
//! - Client identity is the peer address; forwarded headers are not trusted
//! - Excluded paths (API routes, static assets) are left untouched
//! - Denied requests never reach the handler

pub mod headers;
pub mod rate_limit;

pub use headers::{apply_security_headers, security_headers_middleware, PathExclusions, SecurityHeadersState};
pub use rate_limit::{throttle_middleware, ThrottleState};
