//! Row types for the application's tables.

use serde::{Deserialize, Serialize};

/// Table holding user profiles.
pub const PROFILES_TABLE: &str = "profiles";

/// Table holding cached provider responses.
pub const AI_CACHE_TABLE: &str = "ai_cache";

/// A user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A cached response from an AI provider, keyed by a hash of the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiCacheEntry {
    pub id: String,
    pub query_hash: String,
    pub query: String,
    /// Provider payload, stored verbatim.
    pub response: serde_json::Value,
    pub provider: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    pub feedback_score: i64,
}
