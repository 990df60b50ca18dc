//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::PathBuf;

use serde::Deserialize;

use crate::eagle::mclib::{self, ExportOptions};
use crate::eagle::ReadOptions;
use crate::error::ConfigError;

/// Log levels accepted in `logging.level`.
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Directory searched for relative library paths.
    #[serde(default)]
    pub library_path: Option<PathBuf>,

    /// Default output directory for converted files.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Import settings.
    #[serde(default)]
    pub import: ImportConfig,

    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ext = &self.export.extension;
        if ext.is_empty() || ext.contains(['.', '/', '\\']) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid export extension '{ext}'. Must be non-empty, without '.' or path separators"
                ),
            });
        }

        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }
        Ok(())
    }

    /// Import options for the reader.
    #[must_use]
    pub const fn read_options(&self) -> ReadOptions {
        ReadOptions {
            strict: self.import.strict,
        }
    }

    /// Export options for the writer.
    #[must_use]
    pub const fn export_options(&self) -> ExportOptions {
        ExportOptions {
            backup_existing: self.export.backup_existing,
        }
    }

    /// Resolves an input path against `library_path` when it is relative
    /// and does not exist as given.
    #[must_use]
    pub fn resolve_input(&self, input: &std::path::Path) -> PathBuf {
        match &self.library_path {
            Some(base) if input.is_relative() && !input.exists() => base.join(input),
            _ => input.to_path_buf(),
        }
    }
}

/// Import configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    /// Reject unknown elements instead of skipping them.
    #[serde(default)]
    pub strict: bool,
}

/// Export configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Extension of converted files (without the dot).
    /// Default: "mclib"
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Keep a timestamped copy of a file before overwriting it.
    #[serde(default = "default_true")]
    pub backup_existing: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            backup_existing: default_true(),
        }
    }
}

fn default_extension() -> String {
    mclib::EXTENSION.to_string()
}

const fn default_true() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let json = r"{}";
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert!(!config.read_options().strict);
        assert!(config.export_options().backup_existing);
    }

    #[test]
    fn parse_full_config() {
        let json = r#"{
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "_comment": "Test config",
            "library_path": "/path/to/lbr",
            "output_dir": "/path/to/out",
            "import": {
                "strict": true
            },
            "export": {
                "extension": "yaml",
                "backup_existing": false
            },
            "logging": {
                "level": "debug"
            }
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.library_path, Some(PathBuf::from("/path/to/lbr")));
        assert_eq!(config.output_dir, Some(PathBuf::from("/path/to/out")));
        assert!(config.import.strict);
        assert_eq!(config.export.extension, "yaml");
        assert!(!config.export.backup_existing);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn example_config_is_valid() {
        let json = include_str!("../../config/example-config.json");
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn export_config_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.extension, "mclib");
        assert!(config.backup_existing);
    }

    #[test]
    fn logging_config_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
    }

    #[test]
    fn reject_invalid_extension() {
        for ext in ["", ".mclib", "a/b"] {
            let json = format!(r#"{{ "export": {{ "extension": "{ext}" }} }}"#);
            let config: Config = serde_json::from_str(&json).unwrap();
            assert!(config.validate().is_err(), "{ext:?} should be rejected");
        }
    }

    #[test]
    fn reject_invalid_log_level() {
        let json = r#"{ "logging": { "level": "loud" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolve_relative_input() {
        let config: Config = serde_json::from_str(r#"{ "library_path": "/libs" }"#).unwrap();
        assert_eq!(
            config.resolve_input(std::path::Path::new("does-not-exist.lbr")),
            PathBuf::from("/libs/does-not-exist.lbr")
        );
        assert_eq!(
            config.resolve_input(std::path::Path::new("/abs/x.lbr")),
            PathBuf::from("/abs/x.lbr")
        );
    }

    #[test]
    fn reject_unknown_fields() {
        let json = r#"{
            "unknown_field": "value"
        }"#;

        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
