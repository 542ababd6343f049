// reconcile-core/src/domain/decision/action.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::incongruence::IncongruenceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "normalizar")]
    Normalize,
    #[serde(rename = "eliminar")]
    Delete,
    #[serde(rename = "mantener")]
    Keep,
    #[serde(rename = "marcar_revision")]
    FlagForReview,
    #[serde(rename = "rellenar")]
    Fill,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Normalize,
        Action::Delete,
        Action::Keep,
        Action::FlagForReview,
        Action::Fill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normalize => "normalize",
            Self::Delete => "delete",
            Self::Keep => "keep",
            Self::FlagForReview => "flag-for-review",
            Self::Fill => "fill",
        }
    }

    /// Tag expected by the processor and the rule API.
    pub fn wire_tag(&self) -> &'static str {
        match self {
            Self::Normalize => "normalizar",
            Self::Delete => "eliminar",
            Self::Keep => "mantener",
            Self::FlagForReview => "marcar_revision",
            Self::Fill => "rellenar",
        }
    }

    /// Actions that replace data need a value to replace it with.
    pub fn requires_value(&self) -> bool {
        matches!(self, Self::Normalize | Self::Fill)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == wanted || a.wire_tag() == wanted)
            .ok_or_else(|| format!("Unknown action: {}", s))
    }
}

const DELETE_WORDS: [&str; 2] = ["eliminar", "delete"];
const KEEP_WORDS: [&str; 2] = ["mantener", "keep"];
const REVIEW_WORDS: [&str; 3] = ["marcar", "revisar", "review"];
const FILL_WORDS: [&str; 4] = ["rellenar", "corregir", "fill", "correct"];

/// Action implied by picking the option `value` for an incongruence of `kind`.
///
/// Keyword groups are checked in order on the raw value (case-sensitive):
/// delete, keep, review, fill. Anything else normalizes a naming problem
/// and keeps the data otherwise.
pub fn derive_action(kind: &IncongruenceKind, value: &str) -> Action {
    if contains_any(value, &DELETE_WORDS) {
        Action::Delete
    } else if contains_any(value, &KEEP_WORDS) {
        Action::Keep
    } else if contains_any(value, &REVIEW_WORDS) {
        Action::FlagForReview
    } else if contains_any(value, &FILL_WORDS) {
        Action::Fill
    } else if kind.is_naming() {
        Action::Normalize
    } else {
        Action::Keep
    }
}

fn contains_any(value: &str, words: &[&str]) -> bool {
    words.iter().any(|w| value.contains(w))
}

/// Action implied by a free-text value typed by the reviewer.
///
/// Text is a new spelling for naming and whitespace problems, and a
/// corrected value for every other kind.
pub fn custom_action(kind: &IncongruenceKind) -> Action {
    match kind {
        IncongruenceKind::NameVariation { .. }
        | IncongruenceKind::ClientIncoherence { .. }
        | IncongruenceKind::ExcessWhitespace
        | IncongruenceKind::Unrecognized(_) => Action::Normalize,
        _ => Action::Fill,
    }
}
