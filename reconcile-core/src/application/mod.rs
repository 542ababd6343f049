// reconcile-core/src/application/mod.rs

pub mod apply;
pub mod export;
pub mod rules;
pub mod upload;
pub mod wizard;

#[cfg(test)]
pub(crate) mod testing;

// --- RE-EXPORTS (FACADE PATTERN) ---
// Lets the CLI write:
// `use reconcile_core::application::{ReconciliationWizard, RuleService, upload_batch};`
// without knowing the internal file layout.

pub use apply::apply_decisions;
pub use export::{export_decisions, export_filename};
pub use rules::RuleService;
pub use upload::{list_batches, upload_batch};
pub use wizard::ReconciliationWizard;
