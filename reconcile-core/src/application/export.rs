// reconcile-core/src/application/export.rs
//
// USE CASE: Persist a finalized decision set without applying it.

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use tracing::{debug, instrument};

use crate::domain::decision::DecisionRecord;
use crate::error::ReconcileError;
use crate::ports::{ExportPayload, ExportReceipt, Exporter};

/// `decisions_<ISO-8601 timestamp>.json`, with `:` and `.` replaced by `-`
/// so the name is valid on every filesystem.
pub fn export_filename(now: DateTime<Utc>) -> Result<String, ReconcileError> {
    let unsafe_chars =
        Regex::new(r"[:.]").map_err(|e| ReconcileError::InternalError(e.to_string()))?;
    let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    Ok(format!(
        "decisions_{}.json",
        unsafe_chars.replace_all(&timestamp, "-")
    ))
}

#[instrument(skip_all, fields(decisions = records.len()))]
pub async fn export_decisions(
    exporter: &dyn Exporter,
    records: &[DecisionRecord],
    now: DateTime<Utc>,
) -> Result<ExportReceipt, ReconcileError> {
    let filename = export_filename(now)?;
    let payload = ExportPayload {
        decisions: records.to_vec(),
    };

    let receipt = exporter.export(&payload, &filename).await?;
    if !receipt.success {
        return Err(ReconcileError::collaborator(
            "exporter",
            format!("'{}' was not written", filename),
        ));
    }
    debug!(path = %receipt.path, bytes = ?receipt.size_bytes, "Export written");
    Ok(receipt)
}
