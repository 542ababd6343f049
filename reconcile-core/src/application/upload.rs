// reconcile-core/src/application/upload.rs
//
// USE CASE: Batch intake (list available batches, upload a spreadsheet).

use std::path::Path;
use tracing::{info, instrument};

use crate::domain::batch::{BatchFile, validate_upload_name};
use crate::error::ReconcileError;
use crate::ports::{BatchSource, UploadReceipt};

#[instrument(skip(source))]
pub async fn list_batches(source: &dyn BatchSource) -> Result<Vec<BatchFile>, ReconcileError> {
    let mut files = source.list_files().await?;
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Rejects non-spreadsheet files before the source is touched.
#[instrument(skip(source))]
pub async fn upload_batch(
    source: &dyn BatchSource,
    path: &Path,
) -> Result<UploadReceipt, ReconcileError> {
    let name = validate_upload_name(path)?;

    let receipt = source.upload(path).await?;
    if !receipt.success {
        return Err(ReconcileError::collaborator("upload", receipt.message));
    }
    info!(file = %name, batch = %receipt.batch, "Batch uploaded");
    Ok(receipt)
}
