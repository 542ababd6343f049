// reconcile-core/src/infrastructure/adapters/exporter.rs

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::error::DomainError;
use crate::error::ReconcileError;
use crate::infrastructure::fs::write_json;
use crate::ports::{ExportPayload, ExportReceipt, Exporter};

/// Writes decision exports as pretty JSON under one directory.
pub struct FileExporter {
    dir: PathBuf,
}

impl FileExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl Exporter for FileExporter {
    #[instrument(skip(self, payload), fields(decisions = payload.decisions.len()))]
    async fn export(
        &self,
        payload: &ExportPayload,
        filename: &str,
    ) -> Result<ExportReceipt, ReconcileError> {
        // Plain file names only, never a path out of the export directory
        let plain = Path::new(filename)
            .file_name()
            .is_some_and(|name| name == filename);
        if !plain {
            return Err(DomainError::Validation(format!(
                "export file name '{}' must not contain a path",
                filename
            ))
            .into());
        }

        let path = self.dir.join(filename);
        let size = write_json(&path, payload)?;
        info!(path = ?path, bytes = size, "Decisions exported");

        Ok(ExportReceipt {
            success: true,
            path: path.display().to_string(),
            size_bytes: Some(size),
        })
    }
}
