//! Behaviour settings for a [`crate::store::ValueStore`].
//!
//! Settings are plain YAML:
//!
//! ```yaml
//! truncation: reject      # or `silent` (default)
//! validate_on_set: true   # default false
//! ```
//!
//! [`load_at`] takes an explicit path; a missing file yields the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What `set_value` does with a value longer than its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncationPolicy {
    /// Cut the value to `max_len` bytes and store it.
    #[default]
    Silent,
    /// Fail with [`crate::RegistryError::Truncated`] and store nothing.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    pub truncation: TruncationPolicy,
    /// Run the entry's validator inside `set_value`.
    pub validate_on_set: bool,
}

impl RegistryConfig {
    /// Reject overlong values and validate every write.
    pub fn strict() -> Self {
        Self {
            truncation: TruncationPolicy::Reject,
            validate_on_set: true,
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Load settings from `path`, falling back to defaults if it does not exist.
pub fn load_at(path: &Path) -> Result<RegistryConfig, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no registry config, using defaults");
            return Ok(RegistryConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    RegistryConfig::from_yaml_str(&contents).map_err(|e| match e {
        ConfigError::Yaml(source) => ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_legacy_behaviour() {
        let cfg = RegistryConfig::default();
        assert_eq!(cfg.truncation, TruncationPolicy::Silent);
        assert!(!cfg.validate_on_set);
    }

    #[test]
    fn parses_partial_document() {
        let cfg = RegistryConfig::from_yaml_str("truncation: reject\n").expect("parse");
        assert_eq!(cfg.truncation, TruncationPolicy::Reject);
        assert!(!cfg.validate_on_set);
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(
            RegistryConfig::from_yaml_str("  \n").expect("parse"),
            RegistryConfig::default()
        );
    }

    #[test]
    fn unknown_field_rejected() {
        let err = RegistryConfig::from_yaml_str("truncate: reject\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let cfg = load_at(&dir.path().join("registry.yaml")).expect("load");
        assert_eq!(cfg, RegistryConfig::default());
    }

    #[test]
    fn load_roundtrip() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("registry.yaml");
        std::fs::write(&path, serde_yaml::to_string(&RegistryConfig::strict()).unwrap())
            .expect("write");
        assert_eq!(load_at(&path).expect("load"), RegistryConfig::strict());
    }
}
