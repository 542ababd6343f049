// reconcile-core/src/ports/exporter.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::decision::DecisionRecord;
use crate::error::ReconcileError;

/// Document written by an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPayload {
    #[serde(rename = "decisiones")]
    pub decisions: Vec<DecisionRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportReceipt {
    #[serde(rename = "exitoso", default)]
    pub success: bool,

    #[serde(rename = "ruta_archivo", default)]
    pub path: String,

    #[serde(rename = "tamano_bytes", default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

#[async_trait]
pub trait Exporter: Send + Sync {
    async fn export(
        &self,
        payload: &ExportPayload,
        filename: &str,
    ) -> Result<ExportReceipt, ReconcileError>;
}
