//! Project configuration file
//!
//! Reads `upgradeps.toml` from the project directory, or the file given
//! with `--config`. Every key mirrors a CLI flag:
//!
//! ```toml
//! groups = ["dependencies", "devDependencies"]
//! skip = ["react", "react-dom"]
//! minor-only = true
//! registry = "https://registry.npmjs.org"
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file name looked up in the project directory
pub const CONFIG_FILENAME: &str = "upgradeps.toml";

/// Contents of a configuration file; absent keys fall back to defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub groups: Option<Vec<String>>,
    pub skip: Option<Vec<String>>,
    pub dev_only: Option<bool>,
    pub minor_only: Option<bool>,
    pub fixed: Option<bool>,
    pub registry: Option<String>,
    pub test: Option<bool>,
    pub verbose: Option<bool>,
    pub minimal: Option<bool>,
    pub modules: Option<bool>,
    pub npm: Option<bool>,
}

impl ConfigFile {
    /// Load the configuration for a project directory
    ///
    /// An explicit path must exist. The default file is optional and
    /// `Ok(None)` is returned when it is missing.
    pub fn load(dir: &Path, explicit: Option<&Path>) -> Result<Option<Self>, ConfigError> {
        let path: PathBuf = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                path.to_path_buf()
            }
            None => {
                let path = dir.join(CONFIG_FILENAME);
                if !path.is_file() {
                    tracing::debug!(path = %path.display(), "no configuration file");
                    return Ok(None);
                }
                path
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            source: e,
        })?;
        let config = Self::parse(&path, &content)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Ok(Some(config))
    }

    /// Parse configuration content; `path` is used for error messages
    pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e: toml::de::Error| {
            ConfigError::parse_error(path, e.to_string().trim_end())
        })
    }
}
