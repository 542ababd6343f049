// reconcile-core/src/domain/decision/model.rs

use serde::{Deserialize, Serialize};

use super::action::{Action, custom_action, derive_action};
use crate::domain::error::DomainError;
use crate::domain::incongruence::Incongruence;

/// Reviewer-supplied bounds for range-sensitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl RangeOverride {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    fn validate(&self) -> Result<(), DomainError> {
        let bounds = [self.min, self.max];
        if bounds.iter().all(Option::is_none) {
            return Err(DomainError::Validation(
                "range override needs a min or a max".into(),
            ));
        }
        if bounds.iter().flatten().any(|b| !b.is_finite()) {
            return Err(DomainError::Validation(
                "range bounds must be finite numbers".into(),
            ));
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(DomainError::Validation(format!(
                    "range min {} is greater than max {}",
                    min, max
                )));
            }
        }
        Ok(())
    }
}

/// The reviewer's resolution for one incongruence.
///
/// [`DecisionDraft::resolve`] derives the action from the chosen value. A
/// bare `Decision` read from JSON is taken as sent; inside a
/// [`DecisionRecord`] it is checked against the record's incongruence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    #[serde(rename = "accion")]
    action: Action,

    #[serde(rename = "valor", default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,

    #[serde(rename = "crear_regla", default)]
    create_rule: bool,

    #[serde(rename = "tipo", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,

    #[serde(rename = "campo", default, skip_serializing_if = "Option::is_none")]
    field: Option<String>,

    #[serde(rename = "rango", default, skip_serializing_if = "Option::is_none")]
    range_override: Option<RangeOverride>,
}

impl Decision {
    /// Fails when the action is not one `resolve` could have produced for
    /// this value on `incongruence`.
    pub fn check_against(&self, incongruence: &Incongruence) -> Result<(), DomainError> {
        let Some(value) = self.value.as_deref() else {
            return Ok(());
        };
        let kind = incongruence.kind();
        if self.action == derive_action(kind, value) || self.action == custom_action(kind) {
            Ok(())
        } else {
            Err(DomainError::Validation(format!(
                "action {} does not follow from value '{}' on {}",
                self.action, value, kind
            )))
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn create_rule(&self) -> bool {
        self.create_rule
    }

    pub fn kind_tag(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn range_override(&self) -> Option<RangeOverride> {
        self.range_override
    }
}

/// What the reviewer picked on the decision card.
#[derive(Debug, Clone, PartialEq)]
pub enum Choice {
    /// The recommended option.
    Favorite,
    /// Option by 0-based index.
    Option(usize),
    /// Option by its raw value.
    Value(String),
    /// Free text typed by the reviewer.
    Custom(String),
}

/// Unvalidated input for a confirm gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecisionDraft {
    pub choice: Option<Choice>,
    pub create_rule: bool,
    pub range_override: Option<RangeOverride>,
}

impl DecisionDraft {
    pub fn new(choice: Choice) -> Self {
        Self {
            choice: Some(choice),
            ..Self::default()
        }
    }

    pub fn pick(value: impl Into<String>) -> Self {
        Self::new(Choice::Value(value.into()))
    }

    pub fn custom(text: impl Into<String>) -> Self {
        Self::new(Choice::Custom(text.into()))
    }

    pub fn with_rule(mut self) -> Self {
        self.create_rule = true;
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.range_override = Some(RangeOverride::new(min, max));
        self
    }

    /// Validates the draft against `incongruence` and derives the action.
    pub fn resolve(&self, incongruence: &Incongruence) -> Result<Decision, DomainError> {
        let kind = incongruence.kind();
        let options = incongruence.options();

        let (value, action) = match &self.choice {
            None => {
                return Err(DomainError::Validation(
                    "select an option or enter a custom value".into(),
                ));
            }
            Some(Choice::Custom(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(DomainError::Validation("custom value is empty".into()));
                }
                (text.to_string(), custom_action(kind))
            }
            Some(choice) => {
                let option = match choice {
                    Choice::Favorite => incongruence.favorite(),
                    Choice::Option(index) => options.get(*index),
                    Choice::Value(value) => options.iter().find(|o| &o.value == value),
                    Choice::Custom(_) => None,
                };
                let option = option.ok_or_else(|| {
                    DomainError::Validation(format!(
                        "{:?} is not one of the {} options for this {}",
                        choice,
                        options.len(),
                        kind
                    ))
                })?;
                (option.value.clone(), derive_action(kind, &option.value))
            }
        };

        if let Some(range) = &self.range_override {
            if !kind.is_range_sensitive() {
                return Err(DomainError::Validation(format!(
                    "a range override does not apply to {}",
                    kind
                )));
            }
            range.validate()?;
        }

        Ok(Decision {
            action,
            value: Some(value),
            create_rule: self.create_rule,
            kind: Some(kind.tag().to_string()),
            field: incongruence.field().map(str::to_string),
            range_override: self.range_override,
        })
    }
}

/// A confirmed decision paired with its incongruence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordWire")]
pub struct DecisionRecord {
    /// 1-based, in confirmation order.
    #[serde(rename = "numero")]
    pub sequence_number: u32,

    #[serde(rename = "incongruencia")]
    pub incongruence: Incongruence,

    pub decision: Decision,

    /// Index of the incongruence in the analyzed batch.
    #[serde(rename = "indice")]
    pub position: usize,
}

#[derive(Deserialize)]
struct RecordWire {
    #[serde(rename = "numero")]
    sequence_number: u32,
    #[serde(rename = "incongruencia")]
    incongruence: Incongruence,
    decision: Decision,
    #[serde(rename = "indice")]
    position: usize,
}

impl TryFrom<RecordWire> for DecisionRecord {
    type Error = DomainError;

    fn try_from(wire: RecordWire) -> Result<Self, Self::Error> {
        wire.decision.check_against(&wire.incongruence)?;
        Ok(Self {
            sequence_number: wire.sequence_number,
            incongruence: wire.incongruence,
            decision: wire.decision,
            position: wire.position,
        })
    }
}
