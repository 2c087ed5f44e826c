//! Board configuration, read from YAML.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wb_resource::{ComponentLoader, ConnectorLoader};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "WIREBOARD_CONFIG";

/// File looked for in the working directory when [`CONFIG_ENV`] is unset.
pub const CONFIG_FILE: &str = "wireboard.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub assets: AssetConfig,
    /// Write the graph back to its file when it is dropped.
    #[serde(default = "default_true")]
    pub save_on_drop: bool,
    /// Start an empty graph when the board file does not exist yet.
    #[serde(default = "default_true")]
    pub create_missing: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            assets: AssetConfig::default(),
            save_on_drop: true,
            create_missing: true,
        }
    }
}

impl BoardConfig {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `$WIREBOARD_CONFIG` if set, else `./wireboard.yaml` if present, else
    /// the defaults.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_yaml_file(PathBuf::from(path));
        }
        let local = env::current_dir()
            .map(|dir| dir.join(CONFIG_FILE))
            .map_err(|source| ConfigError::Context {
                message: "failed to get the current working directory".to_string(),
                source,
            })?;
        if local.exists() {
            Self::from_yaml_file(local)
        } else {
            Ok(Self::default())
        }
    }
}

/// Where resource files live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetConfig {
    #[serde(default = "AssetConfig::default_components")]
    pub components: PathBuf,
    #[serde(default = "AssetConfig::default_connectors")]
    pub connectors: PathBuf,
}

impl AssetConfig {
    fn default_components() -> PathBuf {
        PathBuf::from(ComponentLoader::DEFAULT_DIR)
    }

    fn default_connectors() -> PathBuf {
        PathBuf::from(ConnectorLoader::DEFAULT_DIR)
    }

    /// Both directories resolved against `root`.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            components: root.join("components"),
            connectors: root.join("connectors"),
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            components: Self::default_components(),
            connectors: Self::default_connectors(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}
