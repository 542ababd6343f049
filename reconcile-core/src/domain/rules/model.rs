// reconcile-core/src/domain/rules/model.rs

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use crate::domain::decision::Action;
use crate::domain::error::DomainError;

/// Key under which a normalization pattern is stored.
pub fn fold_pattern(pattern: &str) -> String {
    pattern.trim().to_lowercase()
}

/// Rewrites a raw spelling to its canonical value on future imports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizationRule {
    #[serde(rename = "patron")]
    pub pattern: String,
    #[serde(rename = "valor_normalizado")]
    pub normalized_value: String,
}

impl NormalizationRule {
    pub fn new(pattern: impl Into<String>, normalized_value: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            normalized_value: normalized_value.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if fold_pattern(&self.pattern).is_empty() {
            return Err(DomainError::Validation(
                "normalization pattern is empty".into(),
            ));
        }
        if self.normalized_value.trim().is_empty() {
            return Err(DomainError::Validation(format!(
                "normalized value for '{}' is empty",
                self.pattern.trim()
            )));
        }
        Ok(())
    }
}

/// Re-applies a decision to every future incongruence of the same kind and field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomaticRule {
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "campo")]
    pub field: String,
    #[serde(rename = "accion")]
    pub action: Action,
    #[serde(rename = "valor", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// RFC 3339 creation time.
    #[serde(rename = "creada", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl AutomaticRule {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.kind.trim().is_empty() {
            return Err(DomainError::Validation("automatic rule has no kind".into()));
        }
        if self.field.trim().is_empty() {
            return Err(DomainError::Validation(format!(
                "automatic rule for '{}' has no field",
                self.kind
            )));
        }
        let has_value = self.value.as_deref().is_some_and(|v| !v.trim().is_empty());
        if self.action.requires_value() && !has_value {
            return Err(DomainError::Validation(format!(
                "a '{}' rule needs a value",
                self.action
            )));
        }
        Ok(())
    }
}

/// Every persisted rule.
///
/// Normalizations are keyed by folded pattern (last write wins); automatic
/// rules keep insertion order and are addressed by index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(
        rename = "normalizaciones",
        default,
        deserialize_with = "folded_keys"
    )]
    normalizations: BTreeMap<String, String>,

    #[serde(rename = "reglas_automaticas", default)]
    automatic_rules: Vec<AutomaticRule>,
}

impl RuleSet {
    pub fn is_empty(&self) -> bool {
        self.normalizations.is_empty() && self.automatic_rules.is_empty()
    }

    pub fn normalizations(&self) -> impl Iterator<Item = NormalizationRule> + '_ {
        self.normalizations
            .iter()
            .map(|(pattern, value)| NormalizationRule::new(pattern.clone(), value.clone()))
    }

    pub fn normalization(&self, pattern: &str) -> Option<&str> {
        self.normalizations
            .get(&fold_pattern(pattern))
            .map(String::as_str)
    }

    pub fn automatic_rules(&self) -> &[AutomaticRule] {
        &self.automatic_rules
    }

    pub fn total_normalizations(&self) -> usize {
        self.normalizations.len()
    }

    pub fn total_automatic_rules(&self) -> usize {
        self.automatic_rules.len()
    }

    /// Inserts or replaces; returns the value that was replaced.
    pub fn upsert_normalization(
        &mut self,
        rule: NormalizationRule,
    ) -> Result<Option<String>, DomainError> {
        rule.validate()?;
        let key = fold_pattern(&rule.pattern);
        Ok(self.normalizations.insert(key, rule.normalized_value))
    }

    /// Appends; returns the new rule's index.
    pub fn push_automatic(&mut self, rule: AutomaticRule) -> Result<usize, DomainError> {
        rule.validate()?;
        self.automatic_rules.push(rule);
        Ok(self.automatic_rules.len() - 1)
    }

    pub fn remove_normalization(&mut self, pattern: &str) -> Result<NormalizationRule, DomainError> {
        let key = fold_pattern(pattern);
        self.normalizations
            .remove(&key)
            .map(|value| NormalizationRule::new(key.clone(), value))
            .ok_or_else(|| DomainError::NotFound(format!("normalization rule '{}'", pattern)))
    }

    pub fn remove_automatic(&mut self, index: usize) -> Result<AutomaticRule, DomainError> {
        if index >= self.automatic_rules.len() {
            return Err(DomainError::NotFound(format!(
                "automatic rule #{} (there are {})",
                index,
                self.automatic_rules.len()
            )));
        }
        Ok(self.automatic_rules.remove(index))
    }

    pub fn listing(&self) -> RuleListing {
        RuleListing {
            total_normalizations: self.total_normalizations(),
            total_automatic_rules: self.total_automatic_rules(),
            rules: self.clone(),
        }
    }
}

fn folded_keys<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(pattern, value)| (fold_pattern(&pattern), value))
        .collect())
}

/// Rule listing with totals, as returned by `GET /reglas/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleListing {
    #[serde(flatten)]
    pub rules: RuleSet,
    #[serde(rename = "total_normalizaciones", default)]
    pub total_normalizations: usize,
    #[serde(rename = "total_reglas_automaticas", default)]
    pub total_automatic_rules: usize,
}
