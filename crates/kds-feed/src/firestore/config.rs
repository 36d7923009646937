//! Firestore REST connection settings

use crate::backoff::ReconnectConfig;
use crate::error::{FeedError, FeedResult};
use std::time::Duration;

/// Default REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Default database id
pub const DEFAULT_DATABASE: &str = "(default)";

/// Settings for [`FirestoreStore`](super::FirestoreStore)
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// Google Cloud project id
    pub project_id: String,
    /// Database id
    pub database: String,
    /// Web API key, sent as the `key` query parameter
    pub api_key: Option<String>,
    /// REST endpoint (overridable for the emulator)
    pub base_url: String,
    /// How often feeds are re-fetched
    pub poll_interval: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Backoff after failed fetches
    pub reconnect: ReconnectConfig,
}

impl FirestoreConfig {
    /// Create a config for `project_id` with default settings
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            database: DEFAULT_DATABASE.to_string(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Set the database id
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Point at a different endpoint (e.g. `http://localhost:8080/v1` for the emulator)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the backoff policy
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Check the settings before any request is made
    pub fn validate(&self) -> FeedResult<()> {
        if self.project_id.trim().is_empty() {
            return Err(FeedError::Configuration("project id is empty".into()));
        }
        if self.project_id.contains('/') || self.database.contains('/') {
            return Err(FeedError::Configuration(
                "project and database ids must not contain '/'".into(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(FeedError::Configuration("poll interval must be positive".into()));
        }
        if self.request_timeout.is_zero() {
            return Err(FeedError::Configuration("request timeout must be positive".into()));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(FeedError::Configuration(format!(
                "base url must be http(s): {}",
                self.base_url
            )));
        }
        Ok(())
    }

    /// Resource name of the database root, `projects/{p}/databases/{d}/documents`
    pub fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database
        )
    }

    /// Resource name of one document
    pub fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_root(), collection, id)
    }

    /// Full URL for a resource name or `documents:` method
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}
