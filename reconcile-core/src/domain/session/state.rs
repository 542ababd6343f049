// reconcile-core/src/domain/session/state.rs

use std::collections::BTreeSet;

use super::phase::{Completion, Operation, Phase, Ticket};
use crate::domain::decision::{Action, DecisionDraft, DecisionRecord};
use crate::domain::error::DomainError;
use crate::domain::incongruence::Incongruence;

pub const NO_INCONGRUENCES: &str = "No incongruences found";

/// Outcome of a successful apply, as reported by the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApplyReport {
    pub changes_applied: u64,
    pub rules_created: u64,
    pub records_modified: u64,
}

/// The incongruence on the decision card.
#[derive(Debug, Clone, Copy)]
pub struct CurrentItem<'a> {
    pub incongruence: &'a Incongruence,
    /// 1-based.
    pub position: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionSummary {
    pub decisions: usize,
    pub rules_flagged: usize,
    /// Non-zero tallies, in `Action::ALL` order.
    pub by_action: Vec<(Action, usize)>,
}

/// State of one reconciliation run.
///
/// Every transition is a method here; a method that returns an error leaves
/// the session untouched. Collaborator calls are split into `begin_*`, which
/// hands out a [`Ticket`], and `finish_*`, which drops responses whose ticket
/// predates the last reset.
#[derive(Debug, Default)]
pub struct WizardSession {
    phase: Phase,
    selected_batch: Option<String>,
    incongruences: Vec<Incongruence>,
    current_index: usize,
    decisions: Vec<DecisionRecord>,
    error: Option<String>,
    notice: Option<String>,
    last_report: Option<ApplyReport>,
    /// Positions of the records whose rules are already stored.
    rules_saved: BTreeSet<usize>,
    generation: u64,
    pending: Option<Operation>,
}

impl WizardSession {
    pub fn new() -> Self {
        Self::default()
    }

    // --- READ ACCESSORS ---

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn selected_batch(&self) -> Option<&str> {
        self.selected_batch.as_deref()
    }

    pub fn incongruences(&self) -> &[Incongruence] {
        &self.incongruences
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn decisions(&self) -> &[DecisionRecord] {
        &self.decisions
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn last_report(&self) -> Option<ApplyReport> {
        self.last_report
    }

    pub fn rules_saved(&self) -> &BTreeSet<usize> {
        &self.rules_saved
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending(&self) -> Option<Operation> {
        self.pending
    }

    pub fn current(&self) -> Option<CurrentItem<'_>> {
        if !matches!(self.phase, Phase::Reviewing | Phase::Revising(_)) {
            return None;
        }
        self.incongruences
            .get(self.current_index)
            .map(|incongruence| CurrentItem {
                incongruence,
                position: self.current_index + 1,
                total: self.incongruences.len(),
            })
    }

    pub fn summary(&self) -> SessionSummary {
        let by_action = Action::ALL
            .into_iter()
            .map(|action| {
                let n = self
                    .decisions
                    .iter()
                    .filter(|r| r.decision.action() == action)
                    .count();
                (action, n)
            })
            .filter(|(_, n)| *n > 0)
            .collect();

        SessionSummary {
            decisions: self.decisions.len(),
            rules_flagged: self
                .decisions
                .iter()
                .filter(|r| r.decision.create_rule())
                .count(),
            by_action,
        }
    }

    // --- ANALYSIS ---

    pub fn begin_analysis(&mut self, batch: &str) -> Result<Ticket, DomainError> {
        self.ensure_idle_line()?;
        self.require(&[Phase::Idle, Phase::Applied], "analyze")?;
        if batch.trim().is_empty() {
            return Err(DomainError::Validation("no batch selected".into()));
        }

        self.clear_work();
        self.selected_batch = Some(batch.to_string());
        self.phase = Phase::Analyzing;
        Ok(self.start(Operation::Analyze))
    }

    pub fn complete_analysis(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<Incongruence>, String>,
    ) -> Completion {
        if !self.settle(ticket) {
            return Completion::Stale;
        }
        match result {
            Ok(found) if found.is_empty() => {
                self.phase = Phase::Idle;
                self.notice = Some(NO_INCONGRUENCES.to_string());
            }
            Ok(found) => {
                self.incongruences = found;
                self.current_index = 0;
                self.phase = Phase::Reviewing;
            }
            Err(message) => {
                self.phase = Phase::Idle;
                self.error = Some(message);
            }
        }
        Completion::Accepted
    }

    // --- REVIEW ---

    pub fn confirm(&mut self, draft: &DecisionDraft) -> Result<(), DomainError> {
        let incongruence = self.card("confirm")?;
        let decision = draft.resolve(incongruence)?;

        let record = DecisionRecord {
            sequence_number: self.next_sequence(),
            incongruence: incongruence.clone(),
            decision,
            position: self.current_index,
        };
        self.decisions.push(record);
        self.error = None;
        self.move_on();
        Ok(())
    }

    pub fn skip(&mut self) -> Result<(), DomainError> {
        self.card("skip")?;
        self.error = None;
        self.move_on();
        Ok(())
    }

    /// Pulls record `sequence_number` back out for a new decision.
    pub fn modify(&mut self, sequence_number: u32) -> Result<(), DomainError> {
        self.ensure_idle_line()?;
        self.require(&[Phase::Finalizing], "modify")?;
        let index = self
            .decisions
            .iter()
            .position(|r| r.sequence_number == sequence_number)
            .ok_or_else(|| DomainError::NotFound(format!("decision #{}", sequence_number)))?;

        let record = self.decisions.remove(index);
        self.rules_saved.remove(&record.position);
        self.current_index = record.position;
        self.phase = Phase::Revising(sequence_number);
        self.error = None;
        Ok(())
    }

    // --- APPLY / EXPORT ---

    pub fn begin_apply(&mut self) -> Result<(Ticket, String, Vec<DecisionRecord>), DomainError> {
        self.ensure_idle_line()?;
        self.require(&[Phase::Finalizing], "apply")?;
        let batch = self
            .selected_batch
            .clone()
            .ok_or_else(|| DomainError::Validation("no batch selected".into()))?;

        self.error = None;
        Ok((self.start(Operation::Apply), batch, self.decisions.clone()))
    }

    pub fn finish_apply(&mut self, ticket: Ticket, result: Result<ApplyReport, String>) -> Completion {
        if !self.settle(ticket) {
            return Completion::Stale;
        }
        match result {
            Ok(report) => {
                self.last_report = Some(report);
                self.phase = Phase::Applied;
            }
            Err(message) => self.error = Some(message),
        }
        Completion::Accepted
    }

    /// Stores the positions whose rules were persisted by the apply behind
    /// `ticket`, even when the row mutation then fails.
    pub fn record_saved_rules(&mut self, ticket: Ticket, positions: BTreeSet<usize>) -> Completion {
        if ticket.generation != self.generation || self.pending != Some(ticket.operation) {
            return Completion::Stale;
        }
        self.rules_saved.extend(positions);
        Completion::Accepted
    }

    pub fn begin_export(&mut self) -> Result<(Ticket, Vec<DecisionRecord>), DomainError> {
        self.ensure_idle_line()?;
        self.require(&[Phase::Finalizing], "export")?;
        self.error = None;
        Ok((self.start(Operation::Export), self.decisions.clone()))
    }

    /// `Ok` carries where the export landed.
    pub fn finish_export(&mut self, ticket: Ticket, result: Result<String, String>) -> Completion {
        if !self.settle(ticket) {
            return Completion::Stale;
        }
        match result {
            Ok(path) => self.notice = Some(format!("Decisions exported to {}", path)),
            Err(message) => self.error = Some(message),
        }
        Completion::Accepted
    }

    // --- CANCEL / RESET ---

    pub fn cancel(&mut self, confirmed: bool) -> Result<(), DomainError> {
        if !confirmed {
            return Err(DomainError::Validation(
                "cancelling discards every decision and must be confirmed".into(),
            ));
        }
        self.reset();
        Ok(())
    }

    /// Back to idle from anywhere; responses still in flight become stale.
    pub fn reset(&mut self) {
        self.clear_work();
        self.selected_batch = None;
        self.phase = Phase::Idle;
        self.pending = None;
        self.generation += 1;
    }

    // --- INTERNALS ---

    fn require(&self, allowed: &[Phase], operation: &'static str) -> Result<(), DomainError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                operation,
                phase: self.phase.name(),
            })
        }
    }

    fn ensure_idle_line(&self) -> Result<(), DomainError> {
        match self.pending {
            Some(op) => Err(DomainError::Busy(op.as_str())),
            None => Ok(()),
        }
    }

    fn card(&self, operation: &'static str) -> Result<&Incongruence, DomainError> {
        if !matches!(self.phase, Phase::Reviewing | Phase::Revising(_)) {
            return Err(DomainError::InvalidTransition {
                operation,
                phase: self.phase.name(),
            });
        }
        self.incongruences
            .get(self.current_index)
            .ok_or_else(|| DomainError::NotFound(format!("incongruence #{}", self.current_index + 1)))
    }

    fn next_sequence(&self) -> u32 {
        u32::try_from(self.decisions.len() + 1).unwrap_or(u32::MAX)
    }

    fn move_on(&mut self) {
        match self.phase {
            Phase::Revising(_) => {
                self.renumber();
                self.current_index = self.incongruences.len();
                self.phase = Phase::Finalizing;
            }
            _ => {
                self.current_index += 1;
                if self.current_index >= self.incongruences.len() {
                    self.phase = Phase::Finalizing;
                }
            }
        }
    }

    fn renumber(&mut self) {
        for (i, record) in self.decisions.iter_mut().enumerate() {
            record.sequence_number = u32::try_from(i + 1).unwrap_or(u32::MAX);
        }
    }

    fn start(&mut self, operation: Operation) -> Ticket {
        self.pending = Some(operation);
        Ticket {
            generation: self.generation,
            operation,
        }
    }

    fn settle(&mut self, ticket: Ticket) -> bool {
        if ticket.generation != self.generation || self.pending != Some(ticket.operation) {
            return false;
        }
        self.pending = None;
        true
    }

    fn clear_work(&mut self) {
        self.incongruences.clear();
        self.decisions.clear();
        self.current_index = 0;
        self.error = None;
        self.notice = None;
        self.last_report = None;
        self.rules_saved.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::decision::Choice;
    use crate::domain::incongruence::IncongruenceKind;

    fn batch(n: usize) -> Vec<Incongruence> {
        (0..n)
            .map(|i| {
                Incongruence::builder(IncongruenceKind::ZeroValue)
                    .field(format!("Campo{}", i))
                    .impact(1, 10)
                    .build()
            })
            .collect()
    }

    fn reviewing(n: usize) -> WizardSession {
        let mut session = WizardSession::new();
        let ticket = session.begin_analysis("entradas.xlsx").unwrap();
        assert_eq!(session.complete_analysis(ticket, Ok(batch(n))), Completion::Accepted);
        session
    }

    fn finalized(n: usize) -> WizardSession {
        let mut session = reviewing(n);
        for _ in 0..n {
            session.confirm(&DecisionDraft::new(Choice::Favorite)).unwrap();
        }
        assert_eq!(session.phase(), Phase::Finalizing);
        session
    }

    fn sequence(session: &WizardSession) -> Vec<u32> {
        session.decisions().iter().map(|r| r.sequence_number).collect()
    }

    #[test]
    fn test_zero_incongruences_returns_to_idle_with_notice() {
        let mut session = WizardSession::new();
        let ticket = session.begin_analysis("salidas.xlsx").unwrap();
        assert_eq!(session.phase(), Phase::Analyzing);
        session.complete_analysis(ticket, Ok(vec![]));

        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.notice(), Some(NO_INCONGRUENCES));
        assert!(session.decisions().is_empty());
    }

    #[test]
    fn test_failed_analysis_records_error() {
        let mut session = WizardSession::new();
        let ticket = session.begin_analysis("salidas.xlsx").unwrap();
        session.complete_analysis(ticket, Err("detector down".into()));
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.error(), Some("detector down"));
    }

    #[test]
    fn test_index_advances_by_one_per_gesture() {
        let mut session = reviewing(4);
        assert_eq!(session.current().unwrap().position, 1);

        session.confirm(&DecisionDraft::pick("keep")).unwrap();
        assert_eq!(session.current_index(), 1);
        session.skip().unwrap();
        assert_eq!(session.current_index(), 2);
        session.confirm(&DecisionDraft::pick("delete")).unwrap();
        assert_eq!(session.current_index(), 3);
        assert_eq!(session.current().unwrap().total, 4);
        session.skip().unwrap();

        assert_eq!(session.phase(), Phase::Finalizing);
        assert_eq!(sequence(&session), [1, 2]);
        assert_eq!(session.decisions()[1].position, 2);
        assert!(session.current().is_none());
    }

    #[test]
    fn test_skip_everything_finalizes_empty() {
        let mut session = reviewing(3);
        for _ in 0..3 {
            session.skip().unwrap();
        }
        assert_eq!(session.phase(), Phase::Finalizing);
        assert!(session.decisions().is_empty());
    }

    #[test]
    fn test_invalid_draft_leaves_session_unchanged() {
        let mut session = reviewing(2);
        let err = session.confirm(&DecisionDraft::default()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(session.current_index(), 0);
        assert!(session.decisions().is_empty());
        assert_eq!(session.phase(), Phase::Reviewing);
    }

    #[test]
    fn test_modify_keeps_numbering_contiguous() {
        for target in [1u32, 2, 3] {
            let mut session = finalized(3);
            session.modify(target).unwrap();
            assert_eq!(session.phase(), Phase::Revising(target));
            assert_eq!(session.current_index(), (target - 1) as usize);
            assert_eq!(session.decisions().len(), 2);

            session.confirm(&DecisionDraft::pick("flag-for-review")).unwrap();
            assert_eq!(session.phase(), Phase::Finalizing);
            assert_eq!(sequence(&session), [1, 2, 3]);

            let revised = session.decisions().last().unwrap();
            assert_eq!(revised.position, (target - 1) as usize);
            assert_eq!(revised.decision.action(), Action::FlagForReview);
        }
    }

    #[test]
    fn test_skip_while_revising_drops_the_record() {
        let mut session = finalized(3);
        session.modify(2).unwrap();
        session.skip().unwrap();
        assert_eq!(session.phase(), Phase::Finalizing);
        assert_eq!(sequence(&session), [1, 2]);
        let positions: Vec<usize> = session.decisions().iter().map(|r| r.position).collect();
        assert_eq!(positions, [0, 2]);
    }

    #[test]
    fn test_modify_unknown_record() {
        let mut session = finalized(2);
        assert!(matches!(session.modify(7), Err(DomainError::NotFound(_))));
        assert_eq!(session.phase(), Phase::Finalizing);
    }

    #[test]
    fn test_transitions_outside_their_phase() {
        let mut session = WizardSession::new();
        assert!(matches!(
            session.confirm(&DecisionDraft::pick("keep")),
            Err(DomainError::InvalidTransition { operation: "confirm", phase: "idle" })
        ));
        assert!(session.begin_apply().is_err());
        assert!(session.begin_export().is_err());

        let mut reviewing = reviewing(1);
        assert!(matches!(
            reviewing.modify(1),
            Err(DomainError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_second_analysis_is_busy() {
        let mut session = WizardSession::new();
        let _ticket = session.begin_analysis("a.xlsx").unwrap();
        assert_eq!(
            session.begin_analysis("a.xlsx").unwrap_err(),
            DomainError::Busy("analyze")
        );
    }

    #[test]
    fn test_stale_analysis_after_reset_is_dropped() {
        let mut session = WizardSession::new();
        let ticket = session.begin_analysis("a.xlsx").unwrap();
        session.reset();

        assert_eq!(session.complete_analysis(ticket, Ok(batch(2))), Completion::Stale);
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.incongruences().is_empty());
    }

    #[test]
    fn test_stale_analysis_does_not_leak_into_new_run() {
        let mut session = WizardSession::new();
        let old = session.begin_analysis("a.xlsx").unwrap();
        session.cancel(true).unwrap();
        let new = session.begin_analysis("b.xlsx").unwrap();

        assert_eq!(session.complete_analysis(old, Ok(batch(5))), Completion::Stale);
        assert_eq!(session.phase(), Phase::Analyzing);
        assert_eq!(session.complete_analysis(new, Ok(batch(1))), Completion::Accepted);
        assert_eq!(session.incongruences().len(), 1);
        assert_eq!(session.selected_batch(), Some("b.xlsx"));
    }

    #[test]
    fn test_cancel_requires_confirmation() {
        let mut session = finalized(2);
        assert!(matches!(session.cancel(false), Err(DomainError::Validation(_))));
        assert_eq!(session.decisions().len(), 2);

        session.cancel(true).unwrap();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.decisions().is_empty());
        assert!(session.incongruences().is_empty());
        assert_eq!(session.selected_batch(), None);
    }

    #[test]
    fn test_failed_apply_keeps_decisions() {
        let mut session = finalized(2);
        let (ticket, batch, decisions) = session.begin_apply().unwrap();
        assert_eq!(batch, "entradas.xlsx");
        assert_eq!(decisions.len(), 2);
        assert_eq!(session.begin_export().unwrap_err(), DomainError::Busy("apply"));

        session.finish_apply(ticket, Err("processor failed: boom".into()));
        assert_eq!(session.phase(), Phase::Finalizing);
        assert_eq!(session.error(), Some("processor failed: boom"));
        assert_eq!(session.decisions().len(), 2);
        assert!(session.pending().is_none());
    }

    #[test]
    fn test_saved_rules_survive_failed_apply_until_modified() {
        let mut session = finalized(3);
        let (ticket, _, _) = session.begin_apply().unwrap();
        assert_eq!(
            session.record_saved_rules(ticket, BTreeSet::from([0, 1, 2])),
            Completion::Accepted
        );
        session.finish_apply(ticket, Err("processor failed: boom".into()));
        assert_eq!(session.rules_saved(), &BTreeSet::from([0, 1, 2]));

        session.modify(2).unwrap();
        assert_eq!(session.rules_saved(), &BTreeSet::from([0, 2]));

        session.reset();
        assert!(session.rules_saved().is_empty());
    }

    #[test]
    fn test_saved_rules_after_reset_are_dropped() {
        let mut session = finalized(1);
        let (ticket, _, _) = session.begin_apply().unwrap();
        session.reset();
        assert_eq!(
            session.record_saved_rules(ticket, BTreeSet::from([0])),
            Completion::Stale
        );
        assert!(session.rules_saved().is_empty());
    }

    #[test]
    fn test_successful_apply_then_new_batch() {
        let mut session = finalized(1);
        let (ticket, _, _) = session.begin_apply().unwrap();
        let report = ApplyReport {
            changes_applied: 1,
            rules_created: 0,
            records_modified: 4,
        };
        session.finish_apply(ticket, Ok(report));
        assert_eq!(session.phase(), Phase::Applied);
        assert_eq!(session.last_report(), Some(report));

        session.begin_analysis("salidas.xlsx").unwrap();
        assert!(session.decisions().is_empty());
        assert!(session.last_report().is_none());
    }

    #[test]
    fn test_export_does_not_change_phase() {
        let mut session = finalized(2);
        let (ticket, records) = session.begin_export().unwrap();
        assert_eq!(records, session.decisions());
        session.finish_export(ticket, Ok("exports/decisions.json".into()));
        assert_eq!(session.phase(), Phase::Finalizing);
        assert!(session.notice().unwrap().contains("exports/decisions.json"));
    }

    #[test]
    fn test_summary_tallies() {
        let mut session = reviewing(3);
        session.confirm(&DecisionDraft::pick("delete").with_rule()).unwrap();
        session.confirm(&DecisionDraft::pick("delete")).unwrap();
        session.confirm(&DecisionDraft::pick("keep")).unwrap();

        let summary = session.summary();
        assert_eq!(summary.decisions, 3);
        assert_eq!(summary.rules_flagged, 1);
        assert_eq!(summary.by_action, vec![(Action::Delete, 2), (Action::Keep, 1)]);
    }
}
