//! Connection configuration
//!
//! Describes where a connector lives and how to talk to it. Loaded from
//! YAML (or JSON, which YAML accepts).

use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::{BackoffType, StringMap};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Top-Level Connection Config
// ============================================================================

/// Complete connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Base URL handed to the HTTP transport
    #[serde(default)]
    pub base_url: Option<String>,

    /// Connector route prefix, e.g. `/apim/sql/<connection id>`
    #[serde(default)]
    pub uri_prefix: String,

    /// Optional version segment inserted before dataset routes (e.g. `v2`)
    #[serde(default)]
    pub api_version: Option<String>,

    /// Where foreign-key relationships come from
    #[serde(default)]
    pub relationships: RelationshipSource,

    /// Headers sent with every request
    #[serde(default)]
    pub headers: StringMap,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,
}

impl ConnectionConfig {
    /// Create a config for a connector prefix with defaults elsewhere
    pub fn new(uri_prefix: impl Into<String>) -> Self {
        Self {
            base_url: None,
            uri_prefix: uri_prefix.into(),
            api_version: None,
            relationships: RelationshipSource::None,
            headers: StringMap::new(),
            http: HttpConfig::default(),
        }
    }

    /// Set the version segment
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Set the relationship source
    #[must_use]
    pub fn with_relationships(mut self, source: RelationshipSource) -> Self {
        self.relationships = source;
        self
    }

    /// Check required fields
    pub fn validate(&self) -> Result<()> {
        if self.uri_prefix.trim().is_empty() {
            return Err(Error::missing_field("uri_prefix"));
        }
        if !self.uri_prefix.starts_with('/') {
            return Err(Error::config(format!(
                "uri_prefix must start with '/': {}",
                self.uri_prefix
            )));
        }
        Ok(())
    }

    /// Build the HTTP client configuration for this connection
    pub fn http_client_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.http.timeout_seconds))
            .max_retries(self.http.max_retries)
            .backoff(
                self.http.retry_backoff.backoff_type,
                Duration::from_millis(self.http.retry_backoff.initial_ms),
                Duration::from_millis(self.http.retry_backoff.max_ms),
            );

        if let Some(base_url) = &self.base_url {
            builder = builder.base_url(base_url.clone());
        }
        builder = match &self.http.rate_limit {
            Some(limit) => builder.rate_limit(limit.clone()),
            None => builder.no_rate_limit(),
        };
        for (key, value) in &self.headers {
            builder = builder.header(key.clone(), value.clone());
        }

        builder.build()
    }
}

// ============================================================================
// Relationships
// ============================================================================

/// Source of table relationships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipSource {
    /// Backend exposes no relationships
    #[default]
    None,
    /// SQL Server family: query `sys.foreign_keys` through the query endpoint
    SqlForeignKeys,
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Rate limiting; absent means unthrottled
    #[serde(default)]
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffConfig::default(),
            rate_limit: None,
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    60000
}

// ============================================================================
// Loader Functions
// ============================================================================

/// Load a connection config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ConnectionConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    load_config_from_str(&content)
}

/// Load a connection config from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<ConnectionConfig> {
    let config: ConnectionConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}
