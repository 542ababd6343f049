// reconcile-core/src/infrastructure/config/loader.rs

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use validator::Validate;

use super::settings::Settings;
use crate::infrastructure::error::InfrastructureError;

pub const CONFIG_CANDIDATES: [&str; 2] = ["reconcile.yaml", "reconcile_conf.yaml"];

pub const ENV_API_URL: &str = "RECONCILE_API_URL";
pub const ENV_RULES_PATH: &str = "RECONCILE_RULES_PATH";
pub const ENV_EXPORT_DIR: &str = "RECONCILE_EXPORT_DIR";

#[instrument(skip(project_dir))]
pub fn load_settings(project_dir: &Path) -> Result<Settings, InfrastructureError> {
    // 1. Discover the file
    let config_path = find_config(project_dir)?;
    info!(path = ?config_path, "Loading settings");

    // 2. Parse
    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read settings at {:?}", config_path))?;
    let mut settings: Settings = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse settings YAML at {:?}", config_path))?;

    // 3. Environment layering, then validation of the final values
    apply_overrides(&mut settings, |key| std::env::var(key).ok());
    check(&settings)?;
    Ok(settings)
}

/// Like [`load_settings`], but a project without a settings file runs on defaults.
pub fn load_settings_or_default(project_dir: &Path) -> Result<Settings, InfrastructureError> {
    match load_settings(project_dir) {
        Err(InfrastructureError::ConfigNotFound(reason)) => {
            info!(%reason, "Using default settings");
            let mut settings = Settings::default();
            apply_overrides(&mut settings, |key| std::env::var(key).ok());
            check(&settings)?;
            Ok(settings)
        }
        other => other,
    }
}

fn find_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, CONFIG_CANDIDATES
    )))
}

fn check(settings: &Settings) -> Result<(), InfrastructureError> {
    settings
        .validate()
        .map_err(|e| InfrastructureError::ConfigError(e.to_string()))
}

/// RECONCILE_API_URL=http://backend:8000 reconcile review entradas.xlsx
pub fn apply_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup(ENV_API_URL) {
        info!(old = %settings.api.base_url, new = %val, "Overriding API URL via ENV");
        settings.api.base_url = val;
    }
    if let Some(val) = lookup(ENV_RULES_PATH) {
        info!(old = %settings.rules.path, new = %val, "Overriding rules path via ENV");
        settings.rules.path = val;
    }
    if let Some(val) = lookup(ENV_EXPORT_DIR) {
        info!(old = %settings.export.dir, new = %val, "Overriding export dir via ENV");
        settings.export.dir = val;
    }
}
