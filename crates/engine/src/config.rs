//! Mapping configuration via `docmap.toml`
//!
//! Every setting has a default, so an empty file (or no file at all) is a
//! valid configuration. To change settings, edit the file and reopen.

use docmap_core::{Error, Result, MAX_NESTING_DEPTH};
use docmap_mapper::{DecodeOptions, UnknownFieldPolicy};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name looked up by callers that keep one next to their data
pub const CONFIG_FILE_NAME: &str = "docmap.toml";

/// Mapping configuration loaded from `docmap.toml`.
///
/// # Example
///
/// ```toml
/// # Deepest document accepted on write (default: 20)
/// max_nesting_depth = 20
///
/// # Stored fields the target shape does not map: "ignore", "warn" or "reject"
/// unknown_fields = "warn"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocmapConfig {
    /// Deepest document accepted on write, counted in map/array levels.
    #[serde(default = "default_max_nesting_depth")]
    pub max_nesting_depth: usize,
    /// Policy for stored fields the target shape does not map.
    #[serde(default)]
    pub unknown_fields: UnknownFieldPolicy,
}

fn default_max_nesting_depth() -> usize {
    MAX_NESTING_DEPTH
}

impl Default for DocmapConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: default_max_nesting_depth(),
            unknown_fields: UnknownFieldPolicy::default(),
        }
    }
}

impl DocmapConfig {
    /// Decoder options derived from this config.
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::with_unknown_fields(self.unknown_fields)
    }

    /// Check values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `max_nesting_depth` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.max_nesting_depth == 0 {
            return Err(Error::Config(
                "max_nesting_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Docmap configuration
#
# Deepest document accepted on write, counted in map/array levels (default: 20)
max_nesting_depth = 20

# Stored fields the target shape does not map (default: "warn")
#   "ignore" = skip silently
#   "warn"   = skip and log a warning
#   "reject" = fail the decode
unknown_fields = "warn"
"#
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the text does not parse or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: DocmapConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, `Config` if it cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = DocmapConfig::default();
        assert_eq!(config.max_nesting_depth, 20);
        assert_eq!(config.unknown_fields, UnknownFieldPolicy::Warn);
    }

    #[test]
    fn test_default_toml_parses_to_default() {
        let config = DocmapConfig::from_toml_str(DocmapConfig::default_toml()).unwrap();
        assert_eq!(config, DocmapConfig::default());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = DocmapConfig::from_toml_str("").unwrap();
        assert_eq!(config, DocmapConfig::default());
    }

    #[test]
    fn test_parse_reject_policy() {
        let config = DocmapConfig::from_toml_str(
            "max_nesting_depth = 4\nunknown_fields = \"reject\"\n",
        )
        .unwrap();
        assert_eq!(config.max_nesting_depth, 4);
        assert_eq!(
            config.decode_options().unknown_fields,
            UnknownFieldPolicy::Reject
        );
    }

    #[test]
    fn test_invalid_policy_is_config_error() {
        let err = DocmapConfig::from_toml_str("unknown_fields = \"shout\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_zero_depth_rejected() {
        let err = DocmapConfig::from_toml_str("max_nesting_depth = 0").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_write_default_if_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        assert!(!path.exists());

        DocmapConfig::write_default_if_missing(&path).unwrap();
        assert!(path.exists());
        let config = DocmapConfig::from_file(&path).unwrap();
        assert_eq!(config, DocmapConfig::default());
    }

    #[test]
    fn test_write_default_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "unknown_fields = \"ignore\"\n").unwrap();

        DocmapConfig::write_default_if_missing(&path).unwrap();
        let config = DocmapConfig::from_file(&path).unwrap();
        assert_eq!(config.unknown_fields, UnknownFieldPolicy::Ignore);
    }

    #[test]
    fn test_write_to_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let config = DocmapConfig {
            max_nesting_depth: 8,
            unknown_fields: UnknownFieldPolicy::Reject,
        };
        config.write_to_file(&path).unwrap();
        assert_eq!(DocmapConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = DocmapConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_malformed_file_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "max_nesting_depth = \"deep\"").unwrap();
        let err = DocmapConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains(CONFIG_FILE_NAME));
    }
}
