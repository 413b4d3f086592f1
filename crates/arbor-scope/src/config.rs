//! Scope-tree configuration, loadable from TOML.
//!
//! ```toml
//! [naming]
//! function_prefix = "__fn_"
//! last_result_key = "_"
//!
//! [table]
//! compact_threshold = 64
//! ```

use std::path::Path;

use arbor_table::DEFAULT_COMPACT_THRESHOLD;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::naming::NamingConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScopeConfig {
    /// Key conventions for functions, call scopes, thread scopes and the last result.
    #[serde(default)]
    pub naming: NamingConfig,

    /// Tuning of the per-scope binding tables.
    #[serde(default)]
    pub table: TableConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Tombstones a binding table tolerates before compacting.
    #[serde(default = "default_compact_threshold")]
    pub compact_threshold: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            compact_threshold: default_compact_threshold(),
        }
    }
}

pub fn default_compact_threshold() -> usize {
    DEFAULT_COMPACT_THRESHOLD
}

impl ScopeConfig {
    /// Parses and validates a configuration from TOML source.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: ScopeConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        log::debug!("loading scope configuration from {}", path.display());
        Self::from_toml_str(&source)
    }

    /// Serializes the configuration back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Checks that the naming scheme cannot produce colliding keys.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let naming = &self.naming;
        let prefixes = naming.prefixes();

        for (field, prefix) in prefixes {
            if prefix.is_empty() {
                return Err(ConfigError::Invalid(format!("`naming.{field}` must not be empty")));
            }
        }

        for (i, (field, prefix)) in prefixes.iter().enumerate() {
            for (other_field, other) in prefixes.iter().skip(i + 1) {
                if prefix.starts_with(other) || other.starts_with(prefix) {
                    return Err(ConfigError::Invalid(format!(
                        "`naming.{field}` ({prefix:?}) and `naming.{other_field}` ({other:?}) overlap"
                    )));
                }
            }
        }

        if naming.last_result_key.is_empty() {
            return Err(ConfigError::Invalid("`naming.last_result_key` must not be empty".to_string()));
        }
        if let Some((field, _)) = prefixes
            .iter()
            .find(|(_, prefix)| naming.last_result_key.starts_with(prefix))
        {
            return Err(ConfigError::Invalid(format!(
                "`naming.last_result_key` ({:?}) falls inside the `naming.{field}` namespace",
                naming.last_result_key
            )));
        }

        Ok(())
    }
}
