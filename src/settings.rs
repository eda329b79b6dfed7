//! File and environment settings for the caster.
//!
//! Only the data half of [`Configuration`] can come from a file; strategy
//! functions are always set in code.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{Configuration, DEFAULT_TYPE_KEY};
use crate::error::{Error, Result};

/// Environment variable overriding the tag key.
pub const TYPE_KEY_ENV: &str = "AUTOCAST_TYPE_KEY";

/// Settings loaded from YAML.
///
/// ```yaml
/// type_key: kind
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastSettings {
    #[serde(default = "default_type_key")]
    pub type_key: String,
}

fn default_type_key() -> String {
    DEFAULT_TYPE_KEY.to_string()
}

impl Default for CastSettings {
    fn default() -> Self {
        Self {
            type_key: default_type_key(),
        }
    }
}

impl CastSettings {
    /// Load settings from a YAML file.
    ///
    /// # Errors
    /// Returns error if the file can't be read or isn't valid YAML
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let settings: CastSettings = serde_yaml::from_str(yaml)?;
        if settings.type_key.is_empty() {
            return Err(Error::Schema("type_key must not be empty".to_string()));
        }
        Ok(settings)
    }

    /// Apply `AUTOCAST_TYPE_KEY` if it is set and non-empty.
    pub fn with_env_overrides(self) -> Self {
        self.with_type_key_override(env::var(TYPE_KEY_ENV).ok())
    }

    /// Replace the tag key with `type_key` unless it is absent or empty.
    pub fn with_type_key_override(mut self, type_key: Option<String>) -> Self {
        if let Some(type_key) = type_key.filter(|key| !key.is_empty()) {
            tracing::debug!("Using {}={}", TYPE_KEY_ENV, type_key);
            self.type_key = type_key;
        }
        self
    }

    pub fn apply(&self, config: &mut Configuration) {
        config.type_key = self.type_key.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_type_key_uses_default() {
        let settings = CastSettings::from_yaml_str("{}").unwrap();
        assert_eq!(settings, CastSettings::default());
    }

    #[test]
    fn test_empty_type_key_rejected() {
        let err = CastSettings::from_yaml_str("type_key: ''").unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_load_from_file_and_apply() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "type_key: kind").unwrap();

        let settings = CastSettings::load_from_file(file.path()).unwrap();
        let mut config = Configuration::default();
        settings.apply(&mut config);

        assert_eq!(config.type_key, "kind");
    }

    #[test]
    fn test_type_key_override() {
        let settings = CastSettings::default().with_type_key_override(Some("kind".to_string()));
        assert_eq!(settings.type_key, "kind");
    }

    #[test]
    fn test_empty_or_absent_override_is_ignored() {
        let base = CastSettings::from_yaml_str("type_key: kind").unwrap();

        let empty = base.clone().with_type_key_override(Some(String::new()));
        assert_eq!(empty.type_key, "kind");

        let absent = base.with_type_key_override(None);
        assert_eq!(absent.type_key, "kind");
    }

    #[test]
    fn test_env_override_reads_variable() {
        env::set_var(TYPE_KEY_ENV, "envKind");
        let overridden = CastSettings::default().with_env_overrides();
        env::set_var(TYPE_KEY_ENV, "");
        let ignored = CastSettings::default().with_env_overrides();
        env::remove_var(TYPE_KEY_ENV);

        assert_eq!(overridden.type_key, "envKind");
        assert_eq!(ignored.type_key, DEFAULT_TYPE_KEY);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = CastSettings::load_from_file("/nonexistent/autocast.yaml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/autocast.yaml"));
    }
}
