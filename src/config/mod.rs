//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → env.rs (required keys present? fail fast otherwise)
//!
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → cloned into each subsystem at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod env;
pub mod loader;
pub mod schema;
pub mod validation;

pub use env::{get_env_var, has_env_var, validate_env, EnvError};
pub use loader::{load_config, parse_config, with_bind_override, ConfigError};
pub use schema::{
    AppConfig, ListenerConfig, ObservabilityConfig, SecurityConfig, ThrottleConfig, TimeoutConfig,
};
