// Configuration module
// Author: kelexine (https://github.com/kelexine)

mod models;

pub use models::*;

use crate::error::{GemkitError, Result};
use config::{Config, Environment, File};
use std::path::{Path, PathBuf};
use zeroize::Zeroizing;

impl ClientConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Environment variables (highest), e.g. `GEMKIT__AUTH__API_KEY`
    /// 2. Config file (`~/.gemkit/config.toml`, optional)
    /// 3. Defaults (lowest)
    pub fn load() -> Result<Self> {
        Self::load_layered(&Self::default_config_path(), false)
    }

    /// Load configuration from an explicit file, still honoring the
    /// environment overrides. The file must exist.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_layered(&path.as_ref().to_string_lossy(), true)
    }

    fn load_layered(path: &str, required: bool) -> Result<Self> {
        let config = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::with_name(path).required(required))
            .add_source(Environment::with_prefix("GEMKIT").separator("__"))
            .build()?;

        config
            .try_deserialize()
            .map_err(|e| GemkitError::Config(e.to_string()))
    }

    fn default_config_path() -> String {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gemkit")
            .join("config.toml")
            .to_string_lossy()
            .to_string()
    }
}

impl AuthConfig {
    /// Resolve the configured credentials.
    ///
    /// An API key selects the Google AI backend; a project id (with an
    /// access token) selects Vertex AI. Configuring both, or neither, is an
    /// error.
    pub fn credentials(&self) -> Result<Credentials> {
        let api_key = non_empty(&self.api_key);
        let project_id = non_empty(&self.project_id);

        match (api_key, project_id) {
            (Some(_), Some(_)) => Err(GemkitError::Config(
                "api_key and project_id are mutually exclusive".to_string(),
            )),
            (Some(key), None) => Ok(Credentials::ApiKey(Zeroizing::new(key.to_string()))),
            (None, Some(project)) => {
                let token = non_empty(&self.access_token).ok_or_else(|| {
                    GemkitError::Config("Vertex AI requires an access_token".to_string())
                })?;
                Ok(Credentials::VertexAi {
                    project_id: project.to_string(),
                    region: self.region.clone(),
                    access_token: Zeroizing::new(token.to_string()),
                })
            }
            (None, None) => Err(GemkitError::Config(
                "either api_key or project_id must be configured".to_string(),
            )),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_credentials() {
        let auth = AuthConfig {
            api_key: Some("AIza-test".to_string()),
            ..AuthConfig::default()
        };
        let credentials = auth.credentials().unwrap();
        assert!(credentials.is_api_key());
        assert!(!format!("{:?}", credentials).contains("AIza-test"));
    }

    #[test]
    fn test_vertex_credentials() {
        let auth = AuthConfig {
            project_id: Some("my-project".to_string()),
            access_token: Some("ya29.token".to_string()),
            ..AuthConfig::default()
        };
        match auth.credentials().unwrap() {
            Credentials::VertexAi {
                project_id, region, ..
            } => {
                assert_eq!(project_id, "my-project");
                assert_eq!(region, "us-central1");
            }
            other => panic!("Expected Vertex AI credentials, got {:?}", other),
        }
    }

    #[test]
    fn test_conflicting_credentials() {
        let auth = AuthConfig {
            api_key: Some("key".to_string()),
            project_id: Some("project".to_string()),
            access_token: Some("token".to_string()),
            ..AuthConfig::default()
        };
        assert!(matches!(auth.credentials(), Err(GemkitError::Config(_))));
    }

    #[test]
    fn test_missing_credentials() {
        let auth = AuthConfig {
            api_key: Some("   ".to_string()),
            ..AuthConfig::default()
        };
        assert!(matches!(auth.credentials(), Err(GemkitError::Config(_))));
    }

    #[test]
    fn test_vertex_without_token() {
        let auth = AuthConfig {
            project_id: Some("project".to_string()),
            ..AuthConfig::default()
        };
        assert!(matches!(auth.credentials(), Err(GemkitError::Config(_))));
    }

    #[test]
    fn test_auth_debug_is_redacted() {
        let auth = AuthConfig {
            api_key: Some("AIzaSecret".to_string()),
            ..AuthConfig::default()
        };
        let debug = format!("{:?}", auth);
        assert!(!debug.contains("AIzaSecret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
