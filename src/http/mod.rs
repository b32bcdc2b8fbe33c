//! HTTP surface.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower-http layers, request ID)
//!     → security middleware (throttle, security headers)
//!     → handlers.rs
//! ```

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer};
