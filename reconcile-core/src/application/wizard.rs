// reconcile-core/src/application/wizard.rs
//
// USE CASE: Walk a reviewer through the incongruences of one batch.
//
// The session lives behind a std Mutex that is only held for the synchronous
// transition; collaborator calls run unlocked and report back with a ticket.

use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

use crate::application::apply::apply_decisions;
use crate::application::export::export_decisions;
use crate::application::rules::RuleService;
use crate::domain::decision::{DecisionDraft, DecisionRecord};
use crate::domain::session::{ApplyReport, Completion, Phase, SessionSummary, WizardSession};
use crate::error::ReconcileError;
use crate::ports::{Detector, ExportReceipt, Exporter, Processor};

pub struct ReconciliationWizard {
    detector: Arc<dyn Detector>,
    processor: Arc<dyn Processor>,
    exporter: Arc<dyn Exporter>,
    rules: RuleService,
    session: Mutex<WizardSession>,
}

impl ReconciliationWizard {
    pub fn new(
        detector: Arc<dyn Detector>,
        processor: Arc<dyn Processor>,
        exporter: Arc<dyn Exporter>,
        rules: RuleService,
    ) -> Self {
        Self {
            detector,
            processor,
            exporter,
            rules,
            session: Mutex::new(WizardSession::new()),
        }
    }

    fn session(&self) -> Result<MutexGuard<'_, WizardSession>, ReconcileError> {
        self.session
            .lock()
            .map_err(|_| ReconcileError::InternalError("wizard session lock poisoned".into()))
    }

    /// Read-only view of the session.
    pub fn inspect<R>(&self, read: impl FnOnce(&WizardSession) -> R) -> Result<R, ReconcileError> {
        let session = self.session()?;
        Ok(read(&*session))
    }

    pub fn phase(&self) -> Result<Phase, ReconcileError> {
        self.inspect(WizardSession::phase)
    }

    pub fn decisions(&self) -> Result<Vec<DecisionRecord>, ReconcileError> {
        self.inspect(|s| s.decisions().to_vec())
    }

    pub fn summary(&self) -> Result<SessionSummary, ReconcileError> {
        self.inspect(WizardSession::summary)
    }

    // --- ANALYSIS ---

    #[instrument(skip(self))]
    pub async fn select_batch(&self, batch: &str) -> Result<Completion, ReconcileError> {
        let ticket = self.session()?.begin_analysis(batch)?;
        info!("Analyzing batch");

        let result = self.detector.analyze(batch).await;

        let mut session = self.session()?;
        match result {
            Ok(report) => {
                debug!(
                    found = report.incongruences.len(),
                    total = report.total,
                    levels = ?report.levels_applied,
                    "Detector answered"
                );
                let completion = session.complete_analysis(ticket, Ok(report.incongruences));
                match completion {
                    Completion::Stale => {
                        warn!(generation = ticket.generation(), "Dropping stale analysis")
                    }
                    Completion::Accepted => info!(phase = %session.phase(), "Analysis complete"),
                }
                Ok(completion)
            }
            Err(err) => {
                if session.complete_analysis(ticket, Err(err.to_string())) == Completion::Stale {
                    warn!(error = %err, "Dropping stale analysis failure");
                    return Ok(Completion::Stale);
                }
                warn!(error = %err, "Analysis failed");
                Err(err)
            }
        }
    }

    // --- REVIEW ---

    pub fn confirm(&self, draft: &DecisionDraft) -> Result<(), ReconcileError> {
        let mut session = self.session()?;
        session.confirm(draft)?;
        debug!(decisions = session.decisions().len(), phase = %session.phase(), "Decision confirmed");
        Ok(())
    }

    pub fn skip(&self) -> Result<(), ReconcileError> {
        let mut session = self.session()?;
        session.skip()?;
        debug!(phase = %session.phase(), "Incongruence skipped");
        Ok(())
    }

    pub fn modify(&self, sequence_number: u32) -> Result<(), ReconcileError> {
        self.session()?.modify(sequence_number)?;
        info!(sequence_number, "Revising decision");
        Ok(())
    }

    // --- APPLY / EXPORT ---

    #[instrument(skip(self))]
    pub async fn apply(&self) -> Result<ApplyReport, ReconcileError> {
        let (ticket, batch, records, mut saved) = {
            let mut session = self.session()?;
            let (ticket, batch, records) = session.begin_apply()?;
            (ticket, batch, records, session.rules_saved().clone())
        };
        info!(batch = %batch, decisions = records.len(), "Applying decisions");

        let result =
            apply_decisions(self.processor.as_ref(), &self.rules, &batch, &records, &mut saved).await;

        let outcome = result.as_ref().copied().map_err(ToString::to_string);
        let completion = {
            let mut session = self.session()?;
            session.record_saved_rules(ticket, saved);
            session.finish_apply(ticket, outcome)
        };
        if completion == Completion::Stale {
            warn!(batch = %batch, operation = %ticket.operation(), "Dropping stale response");
        }
        if let Err(err) = &result {
            warn!(error = %err, "Apply failed; decisions kept");
        }
        result
    }

    #[instrument(skip(self))]
    pub async fn export(&self) -> Result<ExportReceipt, ReconcileError> {
        let (ticket, records) = self.session()?.begin_export()?;

        let result = export_decisions(self.exporter.as_ref(), &records, Utc::now()).await;

        let outcome = result
            .as_ref()
            .map(|receipt| receipt.path.clone())
            .map_err(ToString::to_string);
        if self.session()?.finish_export(ticket, outcome) == Completion::Stale {
            warn!(operation = %ticket.operation(), "Dropping stale response");
        }
        result
    }

    // --- CANCEL / RESET ---

    pub fn cancel(&self, confirmed: bool) -> Result<(), ReconcileError> {
        self.session()?.cancel(confirmed)?;
        info!("Session cancelled");
        Ok(())
    }

    pub fn reset(&self) -> Result<(), ReconcileError> {
        self.session()?.reset();
        info!("Session reset");
        Ok(())
    }
}
