//! Titan preset export settings.
//!
//! Every field has a default matching the stock Titan File preset, so an
//! empty config file (or none at all) reproduces the fixed output.
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// Settings for the `commonencryption` fragment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TitanConfig {
    /// Key server element written before the `drm` entries.
    pub server: ServerConfig,
    /// Text of every `initialization_vector_size` element.
    pub initialization_vector_size: String,
}

impl Default for TitanConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            initialization_vector_size: "8_bytes".to_string(),
        }
    }
}

impl TitanConfig {
    /// Parse settings from YAML text; absent fields take their defaults.
    pub fn from_yaml_str(data: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(data)?)
    }

    /// Load settings from a YAML file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&data)
    }
}

/// The `server` element. Titan ignores it while `enabled` is false.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,
    #[serde(rename = "type")]
    pub server_type: String,
    pub url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            server_type: "piksel".to_string(),
            url: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TitanConfig;

    #[test]
    fn empty_mapping_gives_defaults() {
        let config = TitanConfig::from_yaml_str("{}").expect("parse");
        assert_eq!(config, TitanConfig::default());
        assert!(!config.server.enabled);
        assert_eq!(config.server.server_type, "piksel");
        assert_eq!(config.server.url, "");
        assert_eq!(config.initialization_vector_size, "8_bytes");
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let yaml = "server:\n  enabled: true\n  url: https://kms.example.com/cpix\n";
        let config = TitanConfig::from_yaml_str(yaml).expect("parse");
        assert!(config.server.enabled);
        assert_eq!(config.server.url, "https://kms.example.com/cpix");
        assert_eq!(config.server.server_type, "piksel");
        assert_eq!(config.initialization_vector_size, "8_bytes");
    }

    #[test]
    fn invalid_yaml_is_error() {
        assert!(TitanConfig::from_yaml_str("server: [").is_err());
    }
}
