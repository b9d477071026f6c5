use std::path::{Path, PathBuf};

use rowdelta_verify::{ErrorLog, LogFormat};
use serde::{Deserialize, Serialize};

use crate::error::SdkResult;

/// Where failed delta checks are written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogTarget {
    Stderr,
    Stdout,
    File { path: PathBuf },
}

/// Harness settings, usually loaded from a TOML file.
///
/// ```toml
/// log_format = "json"
///
/// [error_log]
/// kind = "file"
/// path = "target/delta-errors.log"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub log_format: LogFormat,
    /// No log unless set.
    pub error_log: Option<LogTarget>,
}

impl HarnessConfig {
    /// Log failed checks to standard error.
    pub fn stderr() -> Self {
        Self {
            error_log: Some(LogTarget::Stderr),
            ..Default::default()
        }
    }

    pub fn from_toml_str(s: &str) -> SdkResult<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Open the configured log. File targets are created (truncated) here.
    pub fn build_log(&self) -> SdkResult<Option<ErrorLog>> {
        let log = match &self.error_log {
            None => None,
            Some(LogTarget::Stderr) => Some(ErrorLog::stderr(self.log_format)),
            Some(LogTarget::Stdout) => Some(ErrorLog::stdout(self.log_format)),
            Some(LogTarget::File { path }) => Some(ErrorLog::file(path, self.log_format)?),
        };
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_no_log() {
        let c = HarnessConfig::default();
        assert!(c.error_log.is_none());
        assert_eq!(c.log_format, LogFormat::Text);
        assert!(c.build_log().unwrap().is_none());
    }

    #[test]
    fn parses_file_target() {
        let c = HarnessConfig::from_toml_str(
            r#"
            log_format = "json"

            [error_log]
            kind = "file"
            path = "errors.log"
            "#,
        )
        .unwrap();
        assert_eq!(c.log_format, LogFormat::Json);
        assert_eq!(
            c.error_log,
            Some(LogTarget::File {
                path: "errors.log".into()
            })
        );
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(HarnessConfig::from_toml_str("").unwrap(), HarnessConfig::default());
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = HarnessConfig::from_toml_str("log_format = 3").unwrap_err();
        assert!(matches!(err, crate::SdkError::Config(_)));
    }

    #[test]
    fn load_from_disk_and_open_file_log() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("delta.log");
        let cfg_path = dir.path().join("rowdelta.toml");
        let c = HarnessConfig {
            log_format: LogFormat::Text,
            error_log: Some(LogTarget::File {
                path: log_path.clone(),
            }),
        };
        std::fs::write(&cfg_path, toml::to_string(&c).unwrap()).unwrap();

        let loaded = HarnessConfig::load(&cfg_path).unwrap();
        assert_eq!(loaded, c);
        assert!(loaded.build_log().unwrap().is_some());
        assert!(log_path.exists());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = HarnessConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, crate::SdkError::Io(_)));
    }
}
