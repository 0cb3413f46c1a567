use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::EngineClass;
use crate::error::{AppError, Result};
use crate::qa::DEFAULT_ENDPOINT;
use crate::view::DETAIL_MODELS;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartscopeConfig {
    pub version: u32,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_vehicle: Option<String>,
    /// JSON catalog to use instead of the built-in showroom cars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<String>,
    #[serde(default = "default_detail_models")]
    pub detail_models: Vec<EngineClass>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_detail_models() -> Vec<EngineClass> {
    DETAIL_MODELS.to_vec()
}

impl Default for PartscopeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            endpoint: default_endpoint(),
            default_vehicle: None,
            catalog_path: None,
            detail_models: default_detail_models(),
        }
    }
}

/// `~/.partscope/config.json`
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".partscope").join("config.json"))
}

/// Read a config file. Returns `None` if it is missing or unreadable.
pub async fn load_config_from(path: &Path) -> Option<PartscopeConfig> {
    let content = tokio::fs::read_to_string(path).await.ok()?;
    match serde_json::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
            None
        }
    }
}

/// Load the user's config, falling back to defaults.
pub async fn load_config(path: Option<&Path>) -> PartscopeConfig {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => config_path(),
    };
    match path {
        Some(p) => load_config_from(&p).await.unwrap_or_default(),
        None => PartscopeConfig::default(),
    }
}

pub async fn save_config_to(path: &Path, config: &PartscopeConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(config)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

pub async fn save_config(config: &PartscopeConfig) -> Result<()> {
    let path = config_path()
        .ok_or_else(|| AppError::Custom("Cannot find home directory".into()))?;
    save_config_to(&path, config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let config = load_config(Some(path.as_path())).await;
        assert_eq!(config, PartscopeConfig::default());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.detail_models.len(), 3);
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = PartscopeConfig {
            endpoint: "http://localhost:9000/api/ask".into(),
            default_vehicle: Some("Gt".into()),
            detail_models: vec![EngineClass::V8],
            ..PartscopeConfig::default()
        };
        save_config_to(&path, &config).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"defaultVehicle\": \"Gt\""));
        assert!(!raw.contains("catalogPath"));

        assert_eq!(load_config(Some(path.as_path())).await, config);
    }

    #[tokio::test]
    async fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "version": 1, "defaultVehicle": "Car" }"#).unwrap();

        let config = load_config(Some(path.as_path())).await;
        assert_eq!(config.default_vehicle.as_deref(), Some("Car"));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.detail_models, DETAIL_MODELS.to_vec());
    }

    #[tokio::test]
    async fn malformed_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_config(Some(path.as_path())).await, PartscopeConfig::default());
    }
}
