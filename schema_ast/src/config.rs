//! Generator configuration
//!
//! Every field has a default, so an empty JSON object is a valid configuration.

use std::collections::BTreeMap;
use std::path::Path;

use error_stack::{Report, ResultExt};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::{Error, Result};
use crate::reflection::TypePath;
use crate::support::TracingLevel;

/// What to do when a chain of owned references re-enters a type that is still being built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CyclePolicy {
    /// Stop at the re-entering property and leave its nested type unset, like a weak reference
    #[default]
    Truncate,
    /// Fail generation of the root type with [`Error::CyclicOwnership`]
    Error,
}

/// Settings for a generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Handling of cyclic ownership declarations
    pub cycle_policy:     CyclePolicy,
    /// Threads used to generate independent root types; 1 generates sequentially
    pub worker_threads:   usize,
    /// Do not recurse into sub-objects of editor-only classes or fields
    pub skip_editor_only: bool,
    /// Explicit schema names for selected classes
    pub schema_names:     BTreeMap<TypePath, String>,
    /// Log level for the `schema_dump` binary
    pub log_level:        TracingLevel,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            cycle_policy:     CyclePolicy::default(),
            worker_threads:   1,
            skip_editor_only: true,
            schema_names:     BTreeMap::new(),
            log_level:        TracingLevel::Warn,
        }
    }
}

impl GeneratorConfig {
    /// Load a configuration from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Report::new(Error::io_failed("read", path, e)))?;
        let config: Self = serde_json::from_str(&contents)
            .change_context(Error::config_failed("parse configuration", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check settings that deserialization alone cannot
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(Report::new(Error::Configuration(
                "worker_threads must be at least 1".to_string(),
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "tests")]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let (_dir, path) = write_config("{}");
        let config = GeneratorConfig::from_file(&path).expect("valid config");
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.cycle_policy, CyclePolicy::Truncate);
        assert!(config.skip_editor_only);
    }

    #[test]
    fn test_fields_are_read() {
        let (_dir, path) = write_config(
            r#"{
                "cycle_policy": "error",
                "worker_threads": 4,
                "schema_names": { "/Game/Pawn": "HeroPawn" },
                "log_level": "debug"
            }"#,
        );
        let config = GeneratorConfig::from_file(&path).unwrap();
        assert_eq!(config.cycle_policy, CyclePolicy::Error);
        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.log_level, TracingLevel::Debug);
        assert_eq!(
            config.schema_names.get(&TypePath::from("/Game/Pawn")).map(String::as_str),
            Some("HeroPawn")
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let (_dir, path) = write_config(r#"{ "max_depth": 3 }"#);
        let err = GeneratorConfig::from_file(&path).unwrap_err();
        assert!(matches!(err.current_context(), Error::Configuration(_)));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let (_dir, path) = write_config(r#"{ "worker_threads": 0 }"#);
        let err = GeneratorConfig::from_file(&path).unwrap_err();
        assert!(matches!(err.current_context(), Error::Configuration(_)));
    }
}
