use std::path::Path;

use serde::Deserialize;

use crate::core::{Error, Result};

/// Configuration file looked up beside the workspace manifest.
pub const CONFIG_FILE_NAME: &str = ".couplemap.toml";

/// Analysis configuration loaded from `.couplemap.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct CouplingConfig {
    /// Glob patterns for source files to skip.
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Namespace prefixes whose types are never reported as targets.
    #[serde(default = "default_exclude_namespaces")]
    pub exclude_namespaces: Vec<String>,
}

impl Default for CouplingConfig {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            exclude_namespaces: default_exclude_namespaces(),
        }
    }
}

fn default_exclude_namespaces() -> Vec<String> {
    vec!["std".to_string(), "core".to_string(), "alloc".to_string()]
}

impl CouplingConfig {
    /// Load from an explicit path, erroring if it does not exist.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read '{}': {e}", path.display()))
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load `.couplemap.toml` from `dir` if present, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Self::from_file(&path)
        } else {
            Ok(Self::default())
        }
    }
}
