// reconcile-core/src/ports/processor.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::decision::DecisionRecord;
use crate::domain::session::ApplyReport;
use crate::error::ReconcileError;

/// What the processor answers after mutating the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyResponse {
    #[serde(rename = "exitoso", default)]
    pub success: bool,

    #[serde(rename = "cambios_aplicados", default)]
    pub changes_applied: u64,

    #[serde(rename = "reglas_creadas", default)]
    pub rules_created: u64,

    #[serde(rename = "registros_modificados", default)]
    pub records_modified: u64,
}

impl From<ApplyResponse> for ApplyReport {
    fn from(response: ApplyResponse) -> Self {
        ApplyReport {
            changes_applied: response.changes_applied,
            rules_created: response.rules_created,
            records_modified: response.records_modified,
        }
    }
}

#[async_trait]
pub trait Processor: Send + Sync {
    /// Applies every decision to the stored rows of `batch`. `confirm` must be
    /// true for the processor to write anything.
    async fn apply(
        &self,
        batch: &str,
        decisions: &[DecisionRecord],
        confirm: bool,
    ) -> Result<ApplyResponse, ReconcileError>;
}
