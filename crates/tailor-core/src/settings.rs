//! Settings parsed from `.tailor/config.toml`
//!
//! Every section and key is optional; missing values take the defaults
//! below. Relative paths are resolved against the project root (the
//! directory containing `.tailor/`).
//!
//! ```toml
//! [document]
//! id = "resume"
//! store = ".tailor/documents"
//!
//! [history]
//! log = ".tailor/history.json"
//! queue = ".tailor/queue.json"
//!
//! [validation]
//! max_token_delta = 5
//!
//! [generator]
//! command = ["python3", "scripts/suggest.py"]
//! max_attempts = 3
//!
//! [monitor]
//! concurrency = 10
//! timeout_secs = 10
//! describe_command = ["python3", "scripts/describe.py"]
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tailor_fs::{ConfigStore, NormalizedPath};

use crate::generate::DEFAULT_MAX_ATTEMPTS;
use crate::probe::{DEFAULT_CONCURRENCY, DEFAULT_TIMEOUT, ProbeConfig};
use crate::replace::{DEFAULT_MAX_TOKEN_DELTA, ReplacementValidator};
use crate::{Error, Result};

/// Directory holding all tool state, relative to the project root.
pub const STATE_DIR: &str = ".tailor";
/// Settings file name inside [`STATE_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

fn default_document_id() -> String {
    "resume".to_string()
}

fn default_store() -> String {
    format!("{}/documents", STATE_DIR)
}

fn default_log() -> String {
    format!("{}/history.json", STATE_DIR)
}

fn default_queue() -> String {
    format!("{}/queue.json", STATE_DIR)
}

fn default_max_token_delta() -> usize {
    DEFAULT_MAX_TOKEN_DELTA
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSection {
    #[serde(default = "default_document_id")]
    pub id: String,
    /// Root directory of the local document store
    #[serde(default = "default_store")]
    pub store: String,
}

impl Default for DocumentSection {
    fn default() -> Self {
        Self {
            id: default_document_id(),
            store: default_store(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySection {
    #[serde(default = "default_log")]
    pub log: String,
    #[serde(default = "default_queue")]
    pub queue: String,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            log: default_log(),
            queue: default_queue(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSection {
    #[serde(default = "default_max_token_delta")]
    pub max_token_delta: usize,
}

impl Default for ValidationSection {
    fn default() -> Self {
        Self {
            max_token_delta: default_max_token_delta(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorSection {
    /// Program and arguments of the generation command
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorSection {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Program and arguments that print a posting's description for a URL
    #[serde(default)]
    pub describe_command: Vec<String>,
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            describe_command: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub document: DocumentSection,
    #[serde(default)]
    pub history: HistorySection,
    #[serde(default)]
    pub validation: ValidationSection,
    #[serde(default)]
    pub generator: GeneratorSection,
    #[serde(default)]
    pub monitor: MonitorSection,
}

impl Settings {
    /// Path of the settings file for a project root.
    pub fn config_path(root: &NormalizedPath) -> NormalizedPath {
        root.join(STATE_DIR).join(CONFIG_FILE)
    }

    /// Parse settings from TOML text.
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load the project's settings, or defaults if none are saved.
    pub fn load(root: &NormalizedPath) -> Result<Self> {
        Self::load_from(&Self::config_path(root))
    }

    /// Load settings from an explicit file, or defaults if it is missing.
    pub fn load_from(path: &NormalizedPath) -> Result<Self> {
        let settings: Settings = ConfigStore::new()
            .load_if_exists(path)?
            .unwrap_or_default();
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, root: &NormalizedPath) -> Result<()> {
        ConfigStore::new().save(&Self::config_path(root), self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.document.id.trim().is_empty() {
            return Err(Error::config("document.id must not be empty"));
        }
        if self.generator.max_attempts == 0 {
            return Err(Error::config("generator.max_attempts must be at least 1"));
        }
        if self.monitor.concurrency == 0 {
            return Err(Error::config("monitor.concurrency must be at least 1"));
        }
        if self.monitor.timeout_secs == 0 {
            return Err(Error::config("monitor.timeout_secs must be at least 1"));
        }
        Ok(())
    }

    pub fn store_path(&self, root: &NormalizedPath) -> NormalizedPath {
        NormalizedPath::new(&self.document.store).resolve_against(root)
    }

    pub fn log_path(&self, root: &NormalizedPath) -> NormalizedPath {
        NormalizedPath::new(&self.history.log).resolve_against(root)
    }

    pub fn queue_path(&self, root: &NormalizedPath) -> NormalizedPath {
        NormalizedPath::new(&self.history.queue).resolve_against(root)
    }

    pub fn validator(&self) -> ReplacementValidator {
        ReplacementValidator::new(self.validation.max_token_delta)
    }

    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            concurrency: self.monitor.concurrency,
            timeout: Duration::from_secs(self.monitor.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.validation.max_token_delta, 5);
        assert_eq!(settings.generator.max_attempts, 3);
        assert_eq!(settings.monitor.concurrency, 10);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let settings = Settings::parse(
            r#"
[document]
id = "cv-2024"

[validation]
max_token_delta = 3
"#,
        )
        .unwrap();
        assert_eq!(settings.document.id, "cv-2024");
        assert_eq!(settings.document.store, ".tailor/documents");
        assert_eq!(settings.validator().max_token_delta(), 3);
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let err = Settings::parse("[generator]\nmax_attempts = 0\n").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn relative_paths_resolve_against_root() {
        let root = NormalizedPath::new("/work/job-hunt");
        let settings = Settings::default();
        assert_eq!(
            settings.log_path(&root).as_str(),
            "/work/job-hunt/.tailor/history.json"
        );
    }
}
