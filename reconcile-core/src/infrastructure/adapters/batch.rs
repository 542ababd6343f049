// reconcile-core/src/infrastructure/adapters/batch.rs

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::domain::batch::{ACCEPTED_EXTENSIONS, BatchFile, validate_upload_name};
use crate::error::ReconcileError;
use crate::ports::{BatchSource, UploadReceipt};

/// Spreadsheets sitting in a local data directory.
pub struct LocalBatchSource {
    data_dir: PathBuf,
}

impl LocalBatchSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }
}

fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ACCEPTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
}

#[async_trait]
impl BatchSource for LocalBatchSource {
    #[instrument(skip(self), fields(dir = ?self.data_dir))]
    async fn list_files(&self) -> Result<Vec<BatchFile>, ReconcileError> {
        if !self.data_dir.exists() {
            debug!("Data directory missing, no batches");
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.data_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !entry.file_type().is_file() || !is_spreadsheet(path) {
                continue;
            }
            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    warn!(path = ?path, error = %e, "Skipping unreadable file");
                    continue;
                }
            };

            let mut file = BatchFile::new(entry.file_name().to_string_lossy(), metadata.len());
            file.path = Some(path.display().to_string());
            file.modified_at = metadata
                .modified()
                .ok()
                .map(|t| DateTime::<Utc>::from(t).to_rfc3339_opts(SecondsFormat::Secs, true));
            files.push(file);
        }
        Ok(files)
    }

    #[instrument(skip(self))]
    async fn upload(&self, path: &Path) -> Result<UploadReceipt, ReconcileError> {
        let name = validate_upload_name(path)?;
        let target = self.data_dir.join(&name);

        tokio::fs::create_dir_all(&self.data_dir).await?;
        if tokio::fs::canonicalize(path).await? != self.data_dir.canonicalize()?.join(&name) {
            let bytes = tokio::fs::copy(path, &target).await?;
            info!(target = ?target, bytes, "Batch copied into data directory");
        }

        Ok(UploadReceipt {
            success: true,
            message: format!("'{}' is ready for analysis", name),
            batch: name,
        })
    }
}
