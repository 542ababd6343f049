// reconcile-core/src/ports/batch_source.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::batch::BatchFile;
use crate::error::ReconcileError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    #[serde(rename = "exitoso", default)]
    pub success: bool,

    #[serde(rename = "mensaje", default)]
    pub message: String,

    /// Name under which the batch can now be analyzed.
    #[serde(rename = "archivo", default)]
    pub batch: String,
}

#[async_trait]
pub trait BatchSource: Send + Sync {
    async fn list_files(&self) -> Result<Vec<BatchFile>, ReconcileError>;

    /// Callers validate the extension first (see `domain::batch::validate_upload_name`).
    async fn upload(&self, path: &Path) -> Result<UploadReceipt, ReconcileError>;
}
