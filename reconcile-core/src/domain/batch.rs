// reconcile-core/src/domain/batch.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::domain::error::DomainError;

/// Spreadsheet extensions accepted for upload.
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["xls", "xlsx"];

/// Which side of the trade a batch belongs to, guessed from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchType {
    /// Purchases.
    Entradas,
    /// Sales.
    Salidas,
    #[default]
    #[serde(rename = "desconocido", alias = "unknown")]
    Unknown,
}

impl BatchType {
    pub fn classify(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("entrada") || lower.contains("compra") {
            BatchType::Entradas
        } else if lower.contains("salida") || lower.contains("venta") {
            BatchType::Salidas
        } else {
            BatchType::Unknown
        }
    }
}

impl fmt::Display for BatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BatchType::Entradas => "entradas",
            BatchType::Salidas => "salidas",
            BatchType::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}

/// A raw imported file available for analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFile {
    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "ruta", default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(rename = "tipo", default)]
    pub kind: BatchType,

    #[serde(rename = "tamano", default)]
    pub size: u64,

    /// Modification time as reported by the source (RFC 3339 locally).
    #[serde(rename = "fecha_modificacion", default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
}

impl BatchFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        Self {
            kind: BatchType::classify(&name),
            name,
            path: None,
            size,
            modified_at: None,
        }
    }
}

/// Rejects anything but `.xls` / `.xlsx` (case-insensitive) before upload.
pub fn validate_upload_name(path: &Path) -> Result<String, DomainError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| DomainError::Validation(format!("{:?} is not a file name", path)))?;

    let accepted = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| ACCEPTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false);

    if !accepted {
        return Err(DomainError::Validation(format!(
            "Only Excel files are accepted (.xls, .xlsx): '{}'",
            name
        )));
    }
    Ok(name.to_string())
}
