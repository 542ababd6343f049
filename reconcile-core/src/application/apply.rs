// reconcile-core/src/application/apply.rs
//
// USE CASE: Apply a finalized decision set.
// Rules first, so a failed mutation still leaves the learned rules behind;
// the processor's report is the only source of the final counts.

use chrono::Utc;
use futures::future::join_all;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::application::rules::RuleService;
use crate::domain::decision::DecisionRecord;
use crate::domain::rules::synthesize_rules;
use crate::domain::session::ApplyReport;
use crate::error::ReconcileError;
use crate::ports::Processor;

/// `saved` holds the positions whose rules are already stored; it gains
/// every record stored here, so a retry does not write them twice.
#[instrument(skip_all, fields(batch = %batch, decisions = records.len()))]
pub async fn apply_decisions(
    processor: &dyn Processor,
    rules: &RuleService,
    batch: &str,
    records: &[DecisionRecord],
    saved: &mut BTreeSet<usize>,
) -> Result<ApplyReport, ReconcileError> {
    let start = Instant::now();

    // 1. Rules, one write set per record
    let now = Utc::now();
    let due: Vec<_> = records
        .iter()
        .filter(|record| !saved.contains(&record.position))
        .map(|record| (record.position, synthesize_rules(record, now)))
        .filter(|(_, synthesized)| !synthesized.is_empty())
        .collect();
    if !due.is_empty() {
        let writes = due.into_iter().map(|(position, synthesized)| async move {
            rules.persist(synthesized).await.map(|count| (position, count))
        });

        let mut stored = 0;
        let mut first_error = None;
        for outcome in join_all(writes).await {
            match outcome {
                Ok((position, count)) => {
                    saved.insert(position);
                    stored += count;
                }
                Err(e) if first_error.is_none() => first_error = Some(e),
                Err(_) => {}
            }
        }
        if let Some(err) = first_error {
            warn!(stored, "Rule persistence failed; rows left untouched");
            return Err(err);
        }
        info!(rules = stored, "Rules saved before applying");
    }

    // 2. Row mutation
    let response = processor.apply(batch, records, true).await?;
    if !response.success {
        warn!("Processor answered without success");
        return Err(ReconcileError::collaborator(
            "processor",
            "decisions were not applied",
        ));
    }

    debug!("Apply finished in {:.2?}", start.elapsed());
    Ok(response.into())
}
