//! Settings read from the environment

use kds_board::BaselinePolicy;
use kds_feed::{FirestoreConfig, ReconnectConfig};
use std::time::Duration;

pub const DEFAULT_LOG_FILE: &str = "kds.log";

/// Runtime settings for the kitchen screen
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Firestore project; `None` runs the demo store
    pub project: Option<String>,
    pub api_key: Option<String>,
    pub poll_interval: Option<Duration>,
    pub baseline: BaselinePolicy,
    pub log_file: String,
}

impl Settings {
    /// Read from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let poll_interval = non_empty("KDS_POLL_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        let legacy = non_empty("KDS_LEGACY_BASELINE")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            project: non_empty("KDS_FIRESTORE_PROJECT"),
            api_key: non_empty("KDS_FIRESTORE_API_KEY"),
            poll_interval,
            baseline: if legacy {
                BaselinePolicy::CompareAgainstEmpty
            } else {
                BaselinePolicy::FirstSnapshotIsBaseline
            },
            log_file: non_empty("KDS_LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
        }
    }

    /// Returns true when no remote store is configured
    pub fn is_demo(&self) -> bool {
        self.project.is_none()
    }

    /// Firestore configuration, if a project is set
    pub fn firestore(&self) -> Option<FirestoreConfig> {
        let project = self.project.as_ref()?;
        let mut config = FirestoreConfig::new(project.clone())
            .with_reconnect(ReconnectConfig::default().with_max_delay(Duration::from_secs(30)));
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.clone());
        }
        if let Some(interval) = self.poll_interval {
            config = config.with_poll_interval(interval);
        }
        Some(config)
    }
}
