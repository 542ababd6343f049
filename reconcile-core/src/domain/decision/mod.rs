// reconcile-core/src/domain/decision/mod.rs

pub mod action;
pub mod model;

pub use action::{Action, custom_action, derive_action};
pub use model::{Choice, Decision, DecisionDraft, DecisionRecord, RangeOverride};
