// reconcile-core/src/infrastructure/config/settings.rs

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::{Validate, ValidationError};

/// Where a collaborator lives.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Files under the project directory.
    #[default]
    Local,
    /// The processing backend at `api.base_url`.
    Remote,
}

/// Contents of `reconcile.yaml`.
#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct Settings {
    #[validate(nested)]
    #[serde(default)]
    pub api: ApiSettings,

    #[validate(nested)]
    #[serde(default)]
    pub rules: RuleSettings,

    #[validate(nested)]
    #[serde(default)]
    pub export: ExportSettings,

    #[validate(length(min = 1, message = "data_dir cannot be empty"))]
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default)]
    pub batch_source: Target,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ApiSettings {
    #[validate(custom(function = "validate_base_url"))]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[validate(range(min = 1, max = 600, message = "timeout must be 1..=600 seconds"))]
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct RuleSettings {
    #[serde(default)]
    pub store: Target,

    #[validate(length(min = 1, message = "rules.path cannot be empty"))]
    #[serde(default = "default_rules_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate)]
pub struct ExportSettings {
    #[serde(default)]
    pub target: Target,

    #[validate(length(min = 1, message = "export.dir cannot be empty"))]
    #[serde(default = "default_export_dir")]
    pub dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            rules: RuleSettings::default(),
            export: ExportSettings::default(),
            data_dir: default_data_dir(),
            batch_source: Target::default(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for RuleSettings {
    fn default() -> Self {
        Self {
            store: Target::default(),
            path: default_rules_path(),
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            target: Target::default(),
            dir: default_export_dir(),
        }
    }
}

impl Settings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    pub fn rules_path(&self, root: &Path) -> PathBuf {
        root.join(&self.rules.path)
    }

    pub fn export_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.export.dir)
    }

    pub fn data_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.data_dir)
    }
}

fn validate_base_url(url: &str) -> Result<(), ValidationError> {
    match reqwest::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => Ok(()),
        _ => Err(ValidationError::new("base_url")
            .with_message("api.base_url must be an http(s) URL".into())),
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_rules_path() -> String {
    "rules/rules.json".to_string()
}
fn default_export_dir() -> String {
    "exports".to_string()
}
fn default_data_dir() -> String {
    "data".to_string()
}
