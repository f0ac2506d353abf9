/// HTTP client for the external marketing backend.
///
/// Communicates with the REST backend configured in `[backend]` using the
/// synchronous `ureq` client. Every request carries the caller's
/// `X-User-ID` header; the backend scopes all resources by it.
///
/// - **Raw fetch**: [`BackendClient::get_text`] keeps upstream status codes
///   apart from transport failures so the proxy routes can relay them.
/// - **Typed fetch**: competitors, posts, alerts, and preferences, decoded
///   leniently.
/// - **Health check**: `GET /health` with a short timeout.
pub mod types;

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::schema::BackendConfig;
use crate::settings::Preferences;

pub use types::{Alert, Competitor, CompetitorPost};

/// Header that identifies the signed-in user to the backend.
pub const USER_ID_HEADER: &str = "X-User-ID";

/// Failure of a raw backend request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The backend answered with a non-success status.
    #[error("backend returned HTTP {status}")]
    Status { status: u16, body: String },
    /// The request never produced a response (DNS, connect, timeout, I/O).
    #[error("backend request failed: {0}")]
    Transport(String),
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous backend client.
///
/// Cheap to build; the dashboard server creates one at startup and the CLI
/// creates one per invocation.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    timeout: Duration,
}

impl BackendClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` and return the body of a successful response.
    pub fn get_text(&self, path: &str, user_id: &str) -> Result<String, FetchError> {
        let url = self.url(path);
        log::debug!("GET {url}");

        let result = ureq::get(&url)
            .set(USER_ID_HEADER, user_id)
            .set("Accept", "application/json")
            .timeout(self.timeout)
            .call();

        match result {
            Ok(resp) => resp
                .into_string()
                .map_err(|e| FetchError::Transport(e.to_string())),
            Err(ureq::Error::Status(status, resp)) => Err(FetchError::Status {
                status,
                body: resp.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(t)) => Err(FetchError::Transport(t.to_string())),
        }
    }

    /// GET `path` and decode the JSON body.
    pub fn get_json<T: DeserializeOwned>(&self, path: &str, user_id: &str) -> Result<T> {
        let body = self
            .get_text(path, user_id)
            .with_context(|| format!("GET {path}"))?;
        serde_json::from_str(&body).with_context(|| format!("invalid JSON from {path}"))
    }

    /// Decode a list endpoint, skipping entries that don't fit `T`.
    fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        user_id: &str,
        keys: &[&str],
    ) -> Result<Vec<T>> {
        let value: Value = self.get_json(path, user_id)?;
        Ok(types::unwrap_list(value, keys)
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect())
    }

    /// `GET /competitors`
    pub fn fetch_competitors(&self, user_id: &str) -> Result<Vec<Competitor>> {
        self.get_list("competitors", user_id, &["competitors", "data", "items"])
    }

    /// `GET /monitoring/posts`
    pub fn fetch_posts(&self, user_id: &str) -> Result<Vec<CompetitorPost>> {
        self.get_list("monitoring/posts", user_id, &["posts", "data", "items"])
    }

    /// `GET /monitoring/alerts`
    pub fn fetch_alerts(&self, user_id: &str) -> Result<Vec<Alert>> {
        self.get_list("monitoring/alerts", user_id, &["alerts", "data", "items"])
    }

    /// `GET /users/preferences`
    pub fn fetch_preferences(&self, user_id: &str) -> Result<Preferences> {
        let value: Value = self.get_json("users/preferences", user_id)?;
        let value = match value {
            Value::Object(mut obj) if obj.contains_key("preferences") => {
                obj.remove("preferences").unwrap_or(Value::Null)
            }
            other => other,
        };
        Ok(Preferences::from_backend(&value))
    }

    /// Check whether the backend answers `GET /health`.
    ///
    /// Uses a short timeout (3 s) so health output is not held up by a dead
    /// backend.
    pub fn is_healthy(&self) -> bool {
        ureq::get(&self.url("health"))
            .timeout(Duration::from_secs(3))
            .call()
            .is_ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
