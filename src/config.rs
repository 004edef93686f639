//! Engine connection settings.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    9200
}

fn default_user() -> String {
    "admin".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Connection settings for the external search engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_user")]
    pub username: String,
    #[serde(default = "default_user")]
    pub password: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            username: default_user(),
            password: default_user(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EngineConfig {
    /// Load settings from the `ES_HOST`, `ES_PORT`, `ES_USER` and `ES_PASS`
    /// environment variables, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("ES_HOST").unwrap_or(defaults.host),
            port: env::var("ES_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            username: env::var("ES_USER").unwrap_or(defaults.username),
            password: env::var("ES_PASS").unwrap_or(defaults.password),
            timeout_secs: defaults.timeout_secs,
        }
    }

    /// The HTTP base URL for this engine.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// The request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
