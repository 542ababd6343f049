// reconcile-core/src/ports/detector.rs

// Contract of the statistical detector: it gets a batch name and returns the
// problems it found, in the order they should be reviewed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::incongruence::Incongruence;
use crate::error::ReconcileError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(rename = "incongruencias", default)]
    pub incongruences: Vec<Incongruence>,

    #[serde(default)]
    pub total: usize,

    /// Detection levels the detector ran (1 to 5).
    #[serde(rename = "niveles_aplicados", default)]
    pub levels_applied: Vec<u32>,
}

#[async_trait]
pub trait Detector: Send + Sync {
    async fn analyze(&self, batch: &str) -> Result<AnalysisReport, ReconcileError>;
}
