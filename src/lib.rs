//! Guard rails for a small web application: environment validation, a
//! per-client request throttle, a hosted-database client handle and
//! security-header middleware.

pub mod config;
pub mod database;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod throttle;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use throttle::{RequestThrottle, ThrottlePolicy};
