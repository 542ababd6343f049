// reconcile-core/src/domain/rules/synthesis.rs

use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeSet;

use super::model::{AutomaticRule, NormalizationRule, fold_pattern};
use crate::domain::decision::{Action, DecisionRecord};

/// Field recorded on automatic rules for row-level incongruences.
pub const ANY_FIELD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesizedRule {
    Normalization(NormalizationRule),
    Automatic(AutomaticRule),
}

/// Rules implied by a confirmed decision; empty unless it asked for one.
///
/// A normalize decision on a naming problem maps every observed spelling to
/// the chosen value. Anything else becomes a single automatic rule.
pub fn synthesize_rules(record: &DecisionRecord, now: DateTime<Utc>) -> Vec<SynthesizedRule> {
    let decision = &record.decision;
    if !decision.create_rule() {
        return Vec::new();
    }
    let incongruence = &record.incongruence;
    let kind = incongruence.kind();

    if decision.action() == Action::Normalize && kind.is_naming() {
        if let Some(value) = decision.value() {
            let patterns: BTreeSet<String> = kind
                .variations()
                .iter()
                .map(|v| fold_pattern(v))
                .filter(|p| !p.is_empty())
                .collect();
            if !patterns.is_empty() {
                return patterns
                    .into_iter()
                    .map(|p| SynthesizedRule::Normalization(NormalizationRule::new(p, value)))
                    .collect();
            }
        }
    }

    vec![SynthesizedRule::Automatic(AutomaticRule {
        kind: kind.tag().to_string(),
        field: incongruence.field().unwrap_or(ANY_FIELD).to_string(),
        action: decision.action(),
        value: decision.value().map(str::to_string),
        created_at: Some(now.to_rfc3339_opts(SecondsFormat::Secs, true)),
    })]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::decision::DecisionDraft;
    use crate::domain::incongruence::{Incongruence, IncongruenceKind};
    use chrono::TimeZone;

    fn record(incongruence: Incongruence, draft: DecisionDraft) -> DecisionRecord {
        let decision = draft.resolve(&incongruence).unwrap();
        DecisionRecord {
            sequence_number: 1,
            incongruence,
            decision,
            position: 0,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_no_rule_without_flag() {
        let inc = Incongruence::builder(IncongruenceKind::ZeroValue)
            .field("Precio")
            .build();
        assert!(synthesize_rules(&record(inc, DecisionDraft::pick("delete")), now()).is_empty());
    }

    #[test]
    fn test_name_variation_yields_one_rule_per_folded_spelling() {
        let inc = Incongruence::builder(IncongruenceKind::NameVariation {
            variations: vec!["Manzana".into(), "manzana ".into(), "MANZANA".into(), "Manzna".into()],
        })
        .field("Especie")
        .build();
        let rules = synthesize_rules(&record(inc, DecisionDraft::pick("Manzana").with_rule()), now());

        assert_eq!(
            rules,
            vec![
                SynthesizedRule::Normalization(NormalizationRule::new("manzana", "Manzana")),
                SynthesizedRule::Normalization(NormalizationRule::new("manzna", "Manzana")),
            ]
        );
    }

    #[test]
    fn test_other_decisions_yield_an_automatic_rule() {
        let inc = Incongruence::builder(IncongruenceKind::EmptyValue)
            .field("Precio")
            .build();
        let rules = synthesize_rules(&record(inc, DecisionDraft::custom("0.0").with_rule()), now());

        assert_eq!(
            rules,
            vec![SynthesizedRule::Automatic(AutomaticRule {
                kind: "valores_vacios".into(),
                field: "Precio".into(),
                action: Action::Fill,
                value: Some("0.0".into()),
                created_at: Some("2024-05-02T09:30:00Z".into()),
            })]
        );
    }

    #[test]
    fn test_row_level_rule_uses_wildcard_field() {
        let inc = Incongruence::builder(IncongruenceKind::ExactDuplicate).build();
        let rules = synthesize_rules(
            &record(inc, DecisionDraft::pick("delete-duplicates").with_rule()),
            now(),
        );
        match &rules[..] {
            [SynthesizedRule::Automatic(rule)] => {
                assert_eq!(rule.field, ANY_FIELD);
                assert_eq!(rule.action, Action::Delete);
            }
            other => panic!("unexpected rules: {:?}", other),
        }
    }

    #[test]
    fn test_naming_without_variations_falls_back_to_automatic() {
        let inc = Incongruence::builder(IncongruenceKind::ClientIncoherence { variations: vec![] })
            .field("Cliente")
            .build();
        let rules = synthesize_rules(
            &record(inc, DecisionDraft::custom("Frutas Sur").with_rule()),
            now(),
        );
        assert!(matches!(&rules[..], [SynthesizedRule::Automatic(_)]));
    }
}
