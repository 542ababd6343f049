// reconcile-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(reconcile::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(reconcile::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    // --- RULE FILES / EXPORTS ---
    #[error("JSON Error: {0}")]
    #[diagnostic(code(reconcile::infra::json))]
    Json(#[from] serde_json::Error),

    // --- HTTP TRANSPORT ---
    #[error("HTTP Error: {0}")]
    #[diagnostic(
        code(reconcile::infra::http),
        help("Is the processing backend running? Check `api.base_url` in reconcile.yaml.")
    )]
    Http(#[from] reqwest::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(reconcile::infra::config))]
    ConfigError(String),

    #[error("Project configuration not found at '{0}'")]
    #[diagnostic(code(reconcile::infra::config_missing))]
    ConfigNotFound(String),
}

// `load_settings` builds its messages with anyhow::Context
impl From<anyhow::Error> for InfrastructureError {
    fn from(err: anyhow::Error) -> Self {
        InfrastructureError::ConfigError(format!("{:#}", err))
    }
}
