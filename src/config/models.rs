//! Configuration data structures for gemkit.
//!
//! This module defines the schema for client settings: the API endpoint,
//! credentials for either backend, and logging.
//!
//! Author: kelexine (<https://github.com/kelexine>)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use zeroize::Zeroizing;

/// The root configuration object for a client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    /// Endpoint and timeout settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// API key or Vertex AI project settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Logging and observability settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the upstream Gemini API connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Google AI endpoint.
    /// Default: `https://generativelanguage.googleapis.com`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API version path segment.
    /// Default: `v1beta`
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// The model used when a call does not name one.
    /// Default: `gemini-1.5-pro`
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Whole-request timeout in seconds.
    /// Default: `300` (5 minutes)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// TCP connect timeout in seconds.
    /// Default: `10`
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Overrides the Vertex AI host, `https://{region}-aiplatform.googleapis.com`.
    #[serde(default)]
    pub vertex_endpoint: Option<String>,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

/// Raw credential settings as they appear in files and the environment.
///
/// Use [`AuthConfig::credentials`] to resolve them into exactly one
/// [`Credentials`] value.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Google AI Studio API key.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Google Cloud project for the Vertex AI backend.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Vertex AI region.
    /// Default: `us-central1`
    #[serde(default = "default_region")]
    pub region: String,

    /// OAuth access token for the Vertex AI backend.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("project_id", &self.project_id)
            .field("region", &self.region)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Settings for application logging and output format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (`trace`, `debug`, `info`, `warn`, `error`).
    /// Default: `info`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format for logs (`pretty`, `json`, `compact`).
    /// Default: `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Resolved credentials. The two variants are the two mutually exclusive
/// ways of constructing a client.
#[derive(Clone)]
pub enum Credentials {
    /// Google AI backend, authenticated with an API key.
    ApiKey(Zeroizing<String>),

    /// Vertex AI backend, authenticated with an OAuth access token.
    VertexAi {
        project_id: String,
        region: String,
        access_token: Zeroizing<String>,
    },
}

impl Credentials {
    pub fn api_key(key: impl Into<String>) -> Self {
        Credentials::ApiKey(Zeroizing::new(key.into()))
    }

    pub fn vertex(
        project_id: impl Into<String>,
        region: Option<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Credentials::VertexAi {
            project_id: project_id.into(),
            region: region.unwrap_or_else(default_region),
            access_token: Zeroizing::new(access_token.into()),
        }
    }

    pub fn is_api_key(&self) -> bool {
        matches!(self, Credentials::ApiKey(_))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ApiKey(_) => f.write_str("Credentials::ApiKey([REDACTED])"),
            Credentials::VertexAi {
                project_id, region, ..
            } => f
                .debug_struct("Credentials::VertexAi")
                .field("project_id", project_id)
                .field("region", region)
                .field("access_token", &"[REDACTED]")
                .finish(),
        }
    }
}

// Default trait implementations linking to custom logic

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_version: default_api_version(),
            default_model: default_model(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            vertex_endpoint: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            project_id: None,
            region: default_region(),
            access_token: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

// Helper functions for serde defaults and shared constants
fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_api_version() -> String {
    "v1beta".to_string()
}

fn default_model() -> String {
    "gemini-1.5-pro".to_string()
}

fn default_timeout() -> u64 {
    300
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_region() -> String {
    "us-central1".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
