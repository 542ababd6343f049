// reconcile-core/src/domain/session/mod.rs

pub mod phase;
pub mod state;

pub use phase::{Completion, Operation, Phase, Ticket};
pub use state::{ApplyReport, CurrentItem, NO_INCONGRUENCES, SessionSummary, WizardSession};
