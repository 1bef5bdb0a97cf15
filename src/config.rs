//! Transpiler Configuration - Fixed Vocabulary, Overridable
//!
//! Every literal the transpiler matches or emits lives here. Defaults
//! describe the LHP dialect targeting FastCGI C programs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error opening config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Config requires engine >= {required}, current is {current}")]
    EngineVersionMismatch { required: String, current: String },

    #[error("Invalid version string: {0}")]
    InvalidVersion(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct TranspileConfig {
    pub engine_min_version: String,
    pub tags: TagConfig,
    /// First line of every generated program.
    pub runtime_include: String,
    pub directive: DirectiveConfig,
    pub markers: MarkerConfig,
    pub prologue: RoutineConfig,
    pub epilogue: RoutineConfig,
    /// Announced by the prologue routine before any markup.
    pub content_type: String,
    /// Opening line of the serving loop; the loop is closed with `}`.
    pub serving_loop: String,
    /// Rewrite leading spaces of the entry-point line as tabs before trimming.
    pub normalize_entry_indent: bool,
}

impl Default for TranspileConfig {
    fn default() -> Self {
        Self {
            engine_min_version: crate::MIN_CONFIG_ENGINE_VERSION.to_string(),
            tags: TagConfig::default(),
            runtime_include: "#include \"fcgi_stdio.h\"".to_string(),
            directive: DirectiveConfig::default(),
            markers: MarkerConfig::default(),
            prologue: RoutineConfig {
                name: "header_html".to_string(),
                comment: "Header HTML Function.".to_string(),
            },
            epilogue: RoutineConfig {
                name: "footer_html".to_string(),
                comment: "Footer HTML Function.".to_string(),
            },
            content_type: "Content-type: text/html".to_string(),
            serving_loop: "while (FCGI_Accept() >= 0){".to_string(),
            normalize_entry_indent: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct TagConfig {
    pub open: String,
    pub close: String,
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            open: "<£lhp".to_string(),
            close: "£>".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct DirectiveConfig {
    /// Must be the first non-whitespace character of a directive line.
    pub marker: char,
    /// Must appear somewhere on a directive line.
    pub keyword: String,
}

impl Default for DirectiveConfig {
    fn default() -> Self {
        Self {
            marker: '#',
            keyword: "#include".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct MarkerConfig {
    pub entry_point: String,
    pub exit_statement: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            entry_point: "main(".to_string(),
            exit_statement: "return 0".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoutineConfig {
    pub name: String,
    pub comment: String,
}

impl TranspileConfig {
    /// Load a config from a JSON file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.check_engine_version()?;
        Ok(config)
    }

    pub fn check_engine_version(&self) -> Result<(), ConfigError> {
        let engine_ver = semver::Version::parse(ENGINE_VERSION)
            .map_err(|_| ConfigError::InvalidVersion(ENGINE_VERSION.to_string()))?;
        let min_ver = semver::Version::parse(&self.engine_min_version)
            .map_err(|_| ConfigError::InvalidVersion(self.engine_min_version.clone()))?;

        if engine_ver < min_ver {
            return Err(ConfigError::EngineVersionMismatch {
                required: self.engine_min_version.clone(),
                current: ENGINE_VERSION.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_describe_lhp() {
        let config = TranspileConfig::default();
        assert_eq!(config.tags.open, "<£lhp");
        assert_eq!(config.tags.close, "£>");
        assert_eq!(config.markers.exit_statement, "return 0");
        assert!(config.check_engine_version().is_ok());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let file = write_config(r#"{"markers": {"exitStatement": "return "}}"#);
        let config = TranspileConfig::from_file(file.path()).unwrap();
        assert_eq!(config.markers.exit_statement, "return ");
        assert_eq!(config.markers.entry_point, "main(");
        assert_eq!(config.prologue.name, "header_html");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let file = write_config(r#"{"exitMarker": "return"}"#);
        let err = TranspileConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_engine_version_gate() {
        let file = write_config(r#"{"engineMinVersion": "99.0.0"}"#);
        let err = TranspileConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::EngineVersionMismatch { .. }));
    }

    #[test]
    fn test_bad_version_string() {
        let config = TranspileConfig {
            engine_min_version: "one".to_string(),
            ..TranspileConfig::default()
        };
        assert!(matches!(
            config.check_engine_version(),
            Err(ConfigError::InvalidVersion(_))
        ));
    }
}
