// reconcile-core/src/application/testing.rs
//
// In-memory doubles for every port, shared by the use-case tests.

#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::domain::batch::BatchFile;
use crate::domain::decision::DecisionRecord;
use crate::domain::error::DomainError;
use crate::domain::incongruence::Incongruence;
use crate::domain::rules::{AutomaticRule, NormalizationRule, RuleListing, RuleSet, fold_pattern};
use crate::error::ReconcileError;
use crate::ports::{
    AnalysisReport, ApplyResponse, BatchSource, Detector, ExportPayload, ExportReceipt, Exporter,
    Processor, RuleStore, UploadReceipt,
};

#[derive(Default)]
struct MockState {
    calls: Vec<String>,
    incongruences: Vec<Incongruence>,
    detector_error: Option<String>,
    processor_error: Option<String>,
    processor_rejects: bool,
    applied: Vec<Vec<DecisionRecord>>,
    exported: Vec<(String, ExportPayload)>,
    rules: RuleSet,
    backup: Option<RuleSet>,
    batches: Vec<BatchFile>,
}

/// One object behind all five ports, recording every call.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
    gate: Option<Arc<Notify>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_incongruences(self, incongruences: Vec<Incongruence>) -> Self {
        self.state.lock().unwrap().incongruences = incongruences;
        self
    }

    pub fn with_batches(self, batches: Vec<BatchFile>) -> Self {
        self.state.lock().unwrap().batches = batches;
        self
    }

    pub fn failing_detector(self, message: &str) -> Self {
        self.state.lock().unwrap().detector_error = Some(message.to_string());
        self
    }

    pub fn failing_processor(self, message: &str) -> Self {
        self.state.lock().unwrap().processor_error = Some(message.to_string());
        self
    }

    /// Clears `failing_processor` on every clone.
    pub fn recover_processor(&self) {
        self.state.lock().unwrap().processor_error = None;
    }

    pub fn rejecting_processor(self) -> Self {
        self.state.lock().unwrap().processor_rejects = true;
        self
    }

    /// The detector waits for `gate` before answering.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn rules(&self) -> RuleSet {
        self.state.lock().unwrap().rules.clone()
    }

    pub fn applied(&self) -> Vec<Vec<DecisionRecord>> {
        self.state.lock().unwrap().applied.clone()
    }

    pub fn exported(&self) -> Vec<(String, ExportPayload)> {
        self.state.lock().unwrap().exported.clone()
    }

    fn log(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl Detector for MockBackend {
    async fn analyze(&self, batch: &str) -> Result<AnalysisReport, ReconcileError> {
        self.log(format!("analyze {}", batch));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let state = self.state.lock().unwrap();
        if let Some(message) = &state.detector_error {
            return Err(ReconcileError::collaborator("detector", message.clone()));
        }
        Ok(AnalysisReport {
            incongruences: state.incongruences.clone(),
            total: state.incongruences.len(),
            levels_applied: vec![1, 2, 3, 4, 5],
        })
    }
}

#[async_trait]
impl Processor for MockBackend {
    async fn apply(
        &self,
        batch: &str,
        decisions: &[DecisionRecord],
        confirm: bool,
    ) -> Result<ApplyResponse, ReconcileError> {
        self.log(format!("apply {} {} confirm={}", batch, decisions.len(), confirm));
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.processor_error {
            return Err(ReconcileError::collaborator("processor", message.clone()));
        }
        if state.processor_rejects {
            return Ok(ApplyResponse::default());
        }
        state.applied.push(decisions.to_vec());
        Ok(ApplyResponse {
            success: true,
            changes_applied: decisions.len() as u64,
            rules_created: decisions
                .iter()
                .filter(|r| r.decision.create_rule())
                .count() as u64,
            records_modified: decisions
                .iter()
                .filter_map(|r| r.incongruence.count())
                .sum(),
        })
    }
}

#[async_trait]
impl Exporter for MockBackend {
    async fn export(
        &self,
        payload: &ExportPayload,
        filename: &str,
    ) -> Result<ExportReceipt, ReconcileError> {
        self.log(format!("export {}", filename));
        let mut state = self.state.lock().unwrap();
        state.exported.push((filename.to_string(), payload.clone()));
        Ok(ExportReceipt {
            success: true,
            path: format!("exports/{}", filename),
            size_bytes: None,
        })
    }
}

#[async_trait]
impl RuleStore for MockBackend {
    async fn list(&self) -> Result<RuleListing, ReconcileError> {
        self.log("list_rules".to_string());
        Ok(self.state.lock().unwrap().rules.listing())
    }

    async fn create_normalization(&self, rule: NormalizationRule) -> Result<(), ReconcileError> {
        self.log(format!("create_normalization {}", fold_pattern(&rule.pattern)));
        self.state.lock().unwrap().rules.upsert_normalization(rule)?;
        Ok(())
    }

    async fn create_automatic(&self, rule: AutomaticRule) -> Result<(), ReconcileError> {
        self.log(format!("create_automatic {} {}", rule.kind, rule.field));
        self.state.lock().unwrap().rules.push_automatic(rule)?;
        Ok(())
    }

    async fn delete_normalization(&self, pattern: &str) -> Result<(), ReconcileError> {
        self.log(format!("delete_normalization {}", pattern));
        self.state.lock().unwrap().rules.remove_normalization(pattern)?;
        Ok(())
    }

    async fn delete_automatic(&self, index: usize) -> Result<(), ReconcileError> {
        self.log(format!("delete_automatic {}", index));
        self.state.lock().unwrap().rules.remove_automatic(index)?;
        Ok(())
    }

    async fn clear_all(&self, overwrite_backup: bool) -> Result<(), ReconcileError> {
        self.log("clear_all".to_string());
        let mut state = self.state.lock().unwrap();
        if state.backup.is_some() && !overwrite_backup {
            return Err(DomainError::Conflict("a backup already exists".into()).into());
        }
        let snapshot = std::mem::take(&mut state.rules);
        state.backup = Some(snapshot);
        Ok(())
    }

    async fn restore_backup(&self) -> Result<(), ReconcileError> {
        self.log("restore_backup".to_string());
        let mut state = self.state.lock().unwrap();
        let backup = state
            .backup
            .take()
            .ok_or_else(|| DomainError::NotFound("rule backup".into()))?;
        state.rules = backup;
        Ok(())
    }
}

#[async_trait]
impl BatchSource for MockBackend {
    async fn list_files(&self) -> Result<Vec<BatchFile>, ReconcileError> {
        self.log("list_files".to_string());
        Ok(self.state.lock().unwrap().batches.clone())
    }

    async fn upload(&self, path: &Path) -> Result<UploadReceipt, ReconcileError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.log(format!("upload {}", name));
        Ok(UploadReceipt {
            success: true,
            message: "uploaded".into(),
            batch: name,
        })
    }
}
