//! Environment variable validation.
//!
//! Required keys gate startup: when any is missing the process must not
//! continue. Optional keys only enable features and are reported, never fatal.
//! An empty value counts as missing.

use std::collections::HashMap;
use thiserror::Error;

/// Base URL of the hosted database service.
pub const DATABASE_URL_VAR: &str = "NEXT_PUBLIC_SUPABASE_URL";

/// Public access key for the hosted database service.
pub const DATABASE_KEY_VAR: &str = "NEXT_PUBLIC_SUPABASE_ANON_KEY";

/// Keys that must be present before startup.
pub const REQUIRED_ENV_VARS: &[&str] = &[DATABASE_URL_VAR, DATABASE_KEY_VAR];

/// Provider API keys that enable optional features.
pub const OPTIONAL_ENV_VARS: &[&str] = &[
    "OPENAI_API_KEY",
    "ANTHROPIC_API_KEY",
    "PERPLEXITY_API_KEY",
    "FAL_API_KEY",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    #[error(
        "Missing required environment variables: {}. Check your environment or .env file and ensure all required variables are set.",
        .0.join(", ")
    )]
    Missing(Vec<String>),

    #[error("Environment variable {0} is required but not set")]
    NotSet(String),
}

/// Where variables are read from.
pub trait EnvSource {
    /// The raw value of `name`, if set.
    fn var(&self, name: &str) -> Option<String>;

    /// The value of `name`, treating empty strings as unset.
    fn non_empty(&self, name: &str) -> Option<String> {
        self.var(name).filter(|v| !v.is_empty())
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Check every required key in `env`, reporting all missing ones at once.
pub fn validate_env_from(env: &impl EnvSource) -> Result<(), EnvError> {
    let missing: Vec<String> = REQUIRED_ENV_VARS
        .iter()
        .filter(|name| env.non_empty(name).is_none())
        .map(|name| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(EnvError::Missing(missing));
    }

    for name in OPTIONAL_ENV_VARS {
        if env.non_empty(name).is_none() {
            tracing::debug!(var = %name, "Optional environment variable not set");
        }
    }

    tracing::info!("All required environment variables are set");
    Ok(())
}

/// Check the process environment.
pub fn validate_env() -> Result<(), EnvError> {
    validate_env_from(&ProcessEnv)
}

/// Read `name` from `env`, falling back when it is unset.
pub fn get_env_var_from(
    env: &impl EnvSource,
    name: &str,
    fallback: Option<&str>,
) -> Result<String, EnvError> {
    match (env.non_empty(name), fallback) {
        (Some(value), _) => Ok(value),
        (None, Some(fallback)) => Ok(fallback.to_string()),
        (None, None) => Err(EnvError::NotSet(name.to_string())),
    }
}

/// Read `name` from the process environment.
pub fn get_env_var(name: &str, fallback: Option<&str>) -> Result<String, EnvError> {
    get_env_var_from(&ProcessEnv, name, fallback)
}

/// Whether `name` is set to a non-empty value in the process environment.
pub fn has_env_var(name: &str) -> bool {
    ProcessEnv.non_empty(name).is_some()
}
