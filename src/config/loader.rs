//! Configuration loading from and saving to disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::OperatorConfig;
use crate::config::validation::{normalize_node_url, validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<OperatorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: OperatorConfig = toml::from_str(&content)?;
    config.rpc.node_url = normalize_node_url(&config.rpc.node_url);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load the configuration if the file exists, defaults otherwise.
pub fn load_or_default(path: &Path) -> Result<OperatorConfig, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        Ok(OperatorConfig::default())
    }
}

/// Validate and persist a configuration.
pub fn save_config(path: &Path, config: &OperatorConfig) -> Result<(), ConfigError> {
    validate_config(config).map_err(ConfigError::Validation)?;

    let encoded = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, encoded)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Network;

    #[test]
    fn test_load_normalizes_node_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tezos-operator.toml");
        fs::write(
            &path,
            "[rpc]\nnetwork = \"custom\"\nnode_url = \"https://node.example.com\"\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.rpc.node_url, "https://node.example.com/");
        assert_eq!(config.rpc.network, Network::Custom);
    }

    #[test]
    fn test_load_rejects_http() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tezos-operator.toml");
        fs::write(&path, "[rpc]\nnode_url = \"http://node.example.com/\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("https://"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tezos-operator.toml");

        let mut config = OperatorConfig::default();
        config.rpc.network = Network::Ghostnet;
        config.rpc.node_url = "https://ghostnet.example.com/".into();
        save_config(&path, &config).unwrap();

        assert_eq!(load_config(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, OperatorConfig::default());
    }
}
