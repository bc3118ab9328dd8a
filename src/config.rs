//! Configuration
//!
//! Resolution order (highest priority first):
//! 1. CLI flags (applied via [`Settings::apply_overrides`])
//! 2. Environment variables (`FATIGUE_*`)
//! 3. Config file (`--config` path, or `fatigue.toml` in the working directory)
//! 4. Compiled defaults

use crate::audit::DEFAULT_HISTORY_LIMIT;
use crate::error::ComputeError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "fatigue.toml";

pub const ENV_AUDIT_LOG: &str = "FATIGUE_AUDIT_LOG";
pub const ENV_HISTORY_LIMIT: &str = "FATIGUE_HISTORY_LIMIT";

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where assessments are recorded; `None` disables the audit trail
    pub audit_log: Option<PathBuf>,
    /// Rows shown by `history` when no limit is given
    pub history_limit: usize,
    pub output_format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audit_log: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
            output_format: OutputFormat::Text,
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub audit_log: Option<PathBuf>,
    pub history_limit: Option<usize>,
    pub output_format: Option<OutputFormat>,
}

impl Settings {
    /// Resolve settings from file, environment and CLI flags.
    ///
    /// An explicit `config_path` must exist; the implicit `fatigue.toml` is
    /// optional.
    pub fn load(config_path: Option<&Path>, overrides: &CliOverrides) -> Result<Self, ComputeError> {
        let mut settings = match config_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.exists() {
                    Self::from_file(implicit)?
                } else {
                    Self::default()
                }
            }
        };

        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.apply_overrides(overrides);
        settings.validate()?;

        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ComputeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ComputeError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
            .map_err(|e| ComputeError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, ComputeError> {
        toml::from_str(toml_str).map_err(|e| ComputeError::Config(e.to_string()))
    }

    /// Apply `FATIGUE_*` variables read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ComputeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_AUDIT_LOG).filter(|p| !p.is_empty()) {
            self.audit_log = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(ENV_HISTORY_LIMIT) {
            self.history_limit = raw.trim().parse().map_err(|_| {
                ComputeError::Config(format!("{ENV_HISTORY_LIMIT} must be a positive integer, got {raw:?}"))
            })?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(path) = &overrides.audit_log {
            self.audit_log = Some(path.clone());
        }
        if let Some(limit) = overrides.history_limit {
            self.history_limit = limit;
        }
        if let Some(format) = overrides.output_format {
            self.output_format = format;
        }
    }

    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.history_limit == 0 {
            return Err(ComputeError::Config(
                "history_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.audit_log, None);
        assert_eq!(settings.history_limit, 100);
        assert_eq!(settings.output_format, OutputFormat::Text);
    }

    #[test]
    fn test_from_toml_partial() {
        let settings = Settings::from_toml(
            r#"
            audit_log = "/var/lib/fatigue/audit.jsonl"
            output_format = "json-pretty"
            "#,
        )
        .unwrap();

        assert_eq!(settings.audit_log, Some(PathBuf::from("/var/lib/fatigue/audit.jsonl")));
        assert_eq!(settings.output_format, OutputFormat::JsonPretty);
        assert_eq!(settings.history_limit, 100);
    }

    #[test]
    fn test_from_toml_rejects_bad_format() {
        assert!(Settings::from_toml(r#"output_format = "xml""#).is_err());
    }

    #[test]
    fn test_layering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fatigue.toml");
        std::fs::write(&path, "history_limit = 20\naudit_log = \"file.jsonl\"\n").unwrap();

        let mut settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.history_limit, 20);

        let env: HashMap<&str, &str> = [(ENV_AUDIT_LOG, "env.jsonl"), (ENV_HISTORY_LIMIT, "50")].into();
        settings
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(settings.audit_log, Some(PathBuf::from("env.jsonl")));
        assert_eq!(settings.history_limit, 50);

        settings.apply_overrides(&CliOverrides {
            history_limit: Some(5),
            output_format: Some(OutputFormat::Json),
            ..Default::default()
        });
        assert_eq!(settings.audit_log, Some(PathBuf::from("env.jsonl")));
        assert_eq!(settings.history_limit, 5);
        assert_eq!(settings.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_env_rejects_bad_limit() {
        let mut settings = Settings::default();
        let result = settings.apply_env(|key| (key == ENV_HISTORY_LIMIT).then(|| "lots".to_string()));
        assert!(matches!(result, Err(ComputeError::Config(_))));
    }

    #[test]
    fn test_zero_limit_is_invalid() {
        let settings = Settings {
            history_limit: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = Settings::load(Some(Path::new("/nonexistent/fatigue.toml")), &CliOverrides::default());
        assert!(matches!(result, Err(ComputeError::Config(_))));
    }
}
