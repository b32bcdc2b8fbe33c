//! REST client for the hosted database.
//!
//! # Responsibilities
//! - Build an HTTP client carrying the access key on every request
//! - Resolve table endpoints under `<service url>/rest/v1/`
//! - Fetch rows and decode them into typed records

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use std::fmt;
use thiserror::Error;
use url::Url;

use crate::config::env::{self, EnvError, EnvSource, DATABASE_KEY_VAR, DATABASE_URL_VAR};

const REST_PATH: &str = "rest/v1/";

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("invalid database URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("access key is not a valid header value")]
    InvalidKey,

    #[error("database request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error(transparent)]
    Env(#[from] EnvError),
}

/// Configured handle to the database service.
#[derive(Clone)]
pub struct DatabaseClient {
    http: reqwest::Client,
    rest_url: Url,
}

impl fmt::Debug for DatabaseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseClient")
            .field("rest_url", &self.rest_url.as_str())
            .finish_non_exhaustive()
    }
}

impl DatabaseClient {
    /// Build a client for the service at `url` authenticating with `key`.
    pub fn new(url: &str, key: &str) -> Result<Self, DatabaseError> {
        let mut base = Url::parse(url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_url = base.join(REST_PATH)?;

        let mut api_key = HeaderValue::from_str(key).map_err(|_| DatabaseError::InvalidKey)?;
        api_key.set_sensitive(true);
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {key}")).map_err(|_| DatabaseError::InvalidKey)?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        tracing::debug!(rest_url = %rest_url, "Database client configured");
        Ok(Self { http, rest_url })
    }

    /// Build a client from the required environment variables.
    pub fn from_env() -> Result<Self, DatabaseError> {
        Self::from_env_source(&env::ProcessEnv)
    }

    pub fn from_env_source(source: &impl EnvSource) -> Result<Self, DatabaseError> {
        let url = env::get_env_var_from(source, DATABASE_URL_VAR, None)?;
        let key = env::get_env_var_from(source, DATABASE_KEY_VAR, None)?;
        Self::new(&url, &key)
    }

    /// Root of the REST interface.
    pub fn rest_url(&self) -> &Url {
        &self.rest_url
    }

    /// Endpoint for `table`.
    pub fn table_url(&self, table: &str) -> Result<Url, DatabaseError> {
        Ok(self.rest_url.join(table)?)
    }

    /// Fetch rows from `table`, passing `query` as URL parameters
    /// (e.g. `[("select", "*"), ("id", "eq.42")]`).
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, DatabaseError> {
        let url = self.table_url(table)?;
        let rows = self
            .http
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<T>>()
            .await?;

        tracing::debug!(table, rows = rows.len(), "Fetched rows");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Profile, PROFILES_TABLE};
    use axum::{extract::Query, http::HeaderMap as AxumHeaders, routing::get, Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    #[test]
    fn test_table_url_under_rest_root() {
        let client = DatabaseClient::new("https://project.example.co", "anon").unwrap();
        assert_eq!(client.rest_url().as_str(), "https://project.example.co/rest/v1/");
        assert_eq!(
            client.table_url("profiles").unwrap().as_str(),
            "https://project.example.co/rest/v1/profiles"
        );
    }

    #[test]
    fn test_base_path_is_kept() {
        let client = DatabaseClient::new("http://localhost:54321/db", "anon").unwrap();
        assert_eq!(client.rest_url().as_str(), "http://localhost:54321/db/rest/v1/");
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(matches!(
            DatabaseClient::new("not a url", "anon"),
            Err(DatabaseError::InvalidUrl(_))
        ));
        assert!(matches!(
            DatabaseClient::new("https://x.example.co", "bad\nkey"),
            Err(DatabaseError::InvalidKey)
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let client = DatabaseClient::new("https://x.example.co", "super-secret").unwrap();
        assert!(!format!("{client:?}").contains("super-secret"));
    }

    #[test]
    fn test_from_env_requires_both_values() {
        let mut vars = HashMap::new();
        vars.insert(DATABASE_URL_VAR.to_string(), "https://x.example.co".to_string());

        let err = DatabaseClient::from_env_source(&vars).unwrap_err();
        assert!(matches!(err, DatabaseError::Env(EnvError::NotSet(ref name)) if name == DATABASE_KEY_VAR));

        vars.insert(DATABASE_KEY_VAR.to_string(), "anon".to_string());
        assert!(DatabaseClient::from_env_source(&vars).is_ok());
    }

    #[tokio::test]
    async fn test_select_sends_credentials_and_decodes_rows() {
        async fn profiles(
            headers: AxumHeaders,
            Query(params): Query<HashMap<String, String>>,
        ) -> Json<Value> {
            assert_eq!(headers["apikey"], "anon");
            assert_eq!(headers["authorization"], "Bearer anon");
            assert_eq!(params.get("select").map(String::as_str), Some("*"));
            Json(json!([{
                "id": "u1",
                "email": "a@example.com",
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            }]))
        }

        let app = Router::new().route("/rest/v1/profiles", get(profiles));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = DatabaseClient::new(&format!("http://{addr}"), "anon").unwrap();
        let rows: Vec<Profile> = client.select(PROFILES_TABLE, &[("select", "*")]).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].email, "a@example.com");
    }
}
