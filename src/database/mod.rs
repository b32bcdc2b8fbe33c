//! Hosted database access.
//!
//! A thin handle over the service's REST interface. The handle is built once
//! from the service URL and access key and shared by cloning.

pub mod client;
pub mod models;

pub use client::{DatabaseClient, DatabaseError};
pub use models::{AiCacheEntry, Profile, AI_CACHE_TABLE, PROFILES_TABLE};
