// reconcile-core/src/domain/rules/mod.rs

pub mod model;
pub mod synthesis;

pub use model::{AutomaticRule, NormalizationRule, RuleListing, RuleSet, fold_pattern};
pub use synthesis::{ANY_FIELD, SynthesizedRule, synthesize_rules};
