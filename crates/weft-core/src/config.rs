//! Engine configuration.
//!
//! Every field has a default, so an empty JSON object is a valid config.
//!
//! ```json
//! {
//!   "api_version": "v1",
//!   "proxy_task_suffix": "_child",
//!   "parent_input": "_parent",
//!   "dynamic_output_task": "main"
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::WORKFLOW_API_VERSION;
use crate::validate::is_supported_api_version;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// API version given to dynamic workflows that do not set one.
    pub api_version: String,

    /// Appended to the parent task id to name its proxy task.
    pub proxy_task_suffix: String,

    /// Input of a proxy task that carries the parent invocation id.
    pub parent_input: String,

    /// Name of the single task of a workflow wrapping a dynamic task.
    pub dynamic_output_task: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_version: WORKFLOW_API_VERSION.to_string(),
            proxy_task_suffix: "_child".to_string(),
            parent_input: "_parent".to_string(),
            dynamic_output_task: "main".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_supported_api_version(&self.api_version) {
            return Err(ConfigError::Invalid(format!(
                "unsupported api_version '{}'",
                self.api_version
            )));
        }
        for (field, value) in [
            ("proxy_task_suffix", &self.proxy_task_suffix),
            ("parent_input", &self.parent_input),
            ("dynamic_output_task", &self.dynamic_output_task),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = EngineConfig::from_json_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.proxy_task_suffix, "_child");
    }

    #[test]
    fn fields_can_be_overridden() {
        let config = EngineConfig::from_json_str(r#"{ "proxy_task_suffix": "_nested" }"#).unwrap();
        assert_eq!(config.proxy_task_suffix, "_nested");
        assert_eq!(config.parent_input, "_parent");
    }

    #[test]
    fn unknown_fields_and_bad_values_are_rejected() {
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "proxy_suffix": "x" }"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "api_version": "v9" }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_json_str(r#"{ "parent_input": "" }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            EngineConfig::load("/definitely/not/here.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
