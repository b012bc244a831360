use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dump::DumpOptions;
use crate::engine::Engine;

/// File name the tools look for when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = "tagengine.toml";

/// Settings shared by the command-line tools. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolConfig {
    pub tags: TagsConfig,
    pub dump: DumpConfig,
    pub upgrade: UpgradeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TagsConfig {
    /// Directory batch commands scan.
    pub root: PathBuf,
    /// Engine assumed by `layout` when none is given.
    pub engine: Engine,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("tags"),
            engine: Engine::Halo1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DumpConfig {
    pub indent: usize,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            indent: DumpOptions::default().indent,
        }
    }
}

impl DumpConfig {
    pub fn options(&self) -> DumpOptions {
        DumpOptions {
            indent: self.indent,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UpgradeConfig {
    /// Treat upgrade warnings as failures.
    pub strict: bool,
    /// Where `batch-upgrade` looks for donor tags, mirroring the source tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donor_root: Option<PathBuf>,
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    #[diagnostic(
        code("config.not_found"),
        help("create a 'tagengine.toml' next to your tags or pass --config")
    )]
    NotFound(PathBuf),

    #[error("failed to parse config: {0}")]
    #[diagnostic(code("config.parse_error"))]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    #[diagnostic(code("config.serialize_error"))]
    Serialize(#[from] toml::ser::Error),

    #[error("io error: {0}")]
    #[diagnostic(code("config.io_error"))]
    Io(#[from] std::io::Error),
}

impl ToolConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Loads `path` when given; otherwise `tagengine.toml` in the working
    /// directory if present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
