// reconcile-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    // --- DOMAIN ERRORS (validation, missing keys, conflicts, transitions) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, parsing, transport) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- EXTERNAL COLLABORATORS (detector, processor, exporter, rule API) ---
    #[error("{service} failed: {message}")]
    Collaborator {
        service: &'static str,
        message: String,
    },

    // --- GENERIC ---
    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl ReconcileError {
    pub fn collaborator(service: &'static str, message: impl Into<String>) -> Self {
        ReconcileError::Collaborator {
            service,
            message: message.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ReconcileError::Domain(DomainError::Validation(_)))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ReconcileError::Domain(DomainError::NotFound(_)))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ReconcileError::Domain(DomainError::Conflict(_)))
    }
}

// Shortcuts so that `?` works directly on IO / JSON calls in adapters.
impl From<std::io::Error> for ReconcileError {
    fn from(err: std::io::Error) -> Self {
        ReconcileError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<serde_json::Error> for ReconcileError {
    fn from(err: serde_json::Error) -> Self {
        ReconcileError::Infrastructure(InfrastructureError::Json(err))
    }
}
