//! Service configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vmf_audit::AuditError;
use vmf_core::DEFAULT_ACTOR;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parse but are inconsistent
    #[error("invalid config: {0}")]
    Invalid(String),

    /// Configured audit sink could not be opened
    #[error("audit sink unavailable: {0}")]
    Audit(#[from] AuditError),
}

/// Which audit sink the service writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSinkKind {
    /// In-process buffer
    #[default]
    Memory,
    /// JSON-lines file
    Jsonl,
    /// `tracing` events on the `vmf::audit` target
    Tracing,
}

/// Audit sink settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Sink kind
    pub sink: AuditSinkKind,
    /// File path, required for `jsonl`
    pub path: Option<PathBuf>,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: "info".to_string(),
        }
    }
}

/// Provisioning service configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Actor recorded when a request names none
    pub default_actor: String,
    /// Audit sink settings
    pub audit: AuditConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            default_actor: DEFAULT_ACTOR.to_string(),
            audit: AuditConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With default actor
    #[inline]
    #[must_use]
    pub fn with_default_actor(mut self, actor: impl Into<String>) -> Self {
        self.default_actor = actor.into();
        self
    }

    /// With audit sink
    #[inline]
    #[must_use]
    pub fn with_audit_sink(mut self, sink: AuditSinkKind, path: Option<PathBuf>) -> Self {
        self.audit = AuditConfig { sink, path };
        self
    }

    /// With log format
    #[inline]
    #[must_use]
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.logging.format = format;
        self
    }

    /// Parse and validate TOML text
    ///
    /// # Errors
    /// `ConfigError::Parse` or `ConfigError::Invalid`.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Check cross-field consistency
    ///
    /// # Errors
    /// `ConfigError::Invalid` describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_actor.trim().is_empty() {
            return Err(ConfigError::Invalid("default_actor must not be empty".into()));
        }
        if self.audit.sink == AuditSinkKind::Jsonl && self.audit.path.is_none() {
            return Err(ConfigError::Invalid("audit.path is required for the jsonl sink".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_yields_defaults() {
        let config = ServiceConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.default_actor, "system");
        assert_eq!(config.audit.sink, AuditSinkKind::Memory);
    }

    #[test]
    fn full_file_parses() {
        let raw = r#"
            default_actor = "ops"

            [audit]
            sink = "jsonl"
            path = "/var/log/vmf/audit.log"

            [logging]
            format = "json"
            filter = "vmf=debug"
        "#;
        let config = ServiceConfig::from_toml_str(raw).unwrap();
        assert_eq!(
            config,
            ServiceConfig::new()
                .with_default_actor("ops")
                .with_audit_sink(AuditSinkKind::Jsonl, Some("/var/log/vmf/audit.log".into()))
                .with_log_format(LogFormat::Json)
                .tap_filter("vmf=debug")
        );
    }

    #[test]
    fn jsonl_without_path_is_invalid() {
        let err = ServiceConfig::from_toml_str("[audit]\nsink = \"jsonl\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn unknown_sink_is_parse_error() {
        let err = ServiceConfig::from_toml_str("[audit]\nsink = \"kafka\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_missing_file_reports_path() {
        let err = ServiceConfig::load("/nonexistent/vmf.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/vmf.toml"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vmf.toml");
        std::fs::write(&path, "default_actor = \"alumno\"\n").unwrap();
        assert_eq!(ServiceConfig::load(&path).unwrap().default_actor, "alumno");
    }

    impl ServiceConfig {
        fn tap_filter(mut self, filter: &str) -> Self {
            self.logging.filter = filter.to_string();
            self
        }
    }
}
