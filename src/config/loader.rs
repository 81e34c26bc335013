//! Load resource configuration from JSON (string or file).

use crate::config::{validate, ResourceManagementConfig};
use crate::error::ConfigError;
use std::path::Path;

/// Parse and validate a resource configuration document.
pub fn from_json_str(raw: &str) -> Result<ResourceManagementConfig, ConfigError> {
    let config: ResourceManagementConfig =
        serde_json::from_str(raw).map_err(|e| ConfigError::Load(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

/// Read, parse and validate the configuration file at `path`.
pub async fn load_from_path(path: impl AsRef<Path>) -> Result<ResourceManagementConfig, ConfigError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading resource config");
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    from_json_str(&raw)
}
