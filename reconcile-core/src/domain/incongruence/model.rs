// reconcile-core/src/domain/incongruence/model.rs

use serde::{Deserialize, Serialize};

use super::impact::Impact;
use super::kind::{IncongruenceKind, ValueRange};
use super::options::{ResolutionOption, resolve_options};

/// How many raw examples are shown to the reviewer.
pub const EXAMPLE_SAMPLE_SIZE: usize = 3;

/// One data-quality problem found in a batch by the detector.
///
/// Immutable once built: options are resolved (and the favorite fixed) at
/// construction, the impact percentage is derived from its counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireIncongruence", into = "WireIncongruence")]
pub struct Incongruence {
    kind: IncongruenceKind,
    field: Option<String>,
    count: Option<u64>,
    examples: Vec<serde_json::Value>,
    impact: Option<Impact>,
    options: Vec<ResolutionOption>,
}

impl Incongruence {
    pub fn builder(kind: IncongruenceKind) -> IncongruenceBuilder {
        IncongruenceBuilder {
            kind,
            field: None,
            count: None,
            examples: Vec::new(),
            impact: None,
            options: Vec::new(),
        }
    }

    pub fn kind(&self) -> &IncongruenceKind {
        &self.kind
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Affected records as reported by the detector, falling back to the impact.
    pub fn count(&self) -> Option<u64> {
        self.count
            .or_else(|| self.impact.map(|i| i.affected_count()))
    }

    /// At most three examples, for operator context.
    pub fn sample(&self) -> &[serde_json::Value] {
        let end = self.examples.len().min(EXAMPLE_SAMPLE_SIZE);
        &self.examples[..end]
    }

    pub fn impact(&self) -> Option<Impact> {
        self.impact
    }

    pub fn options(&self) -> &[ResolutionOption] {
        &self.options
    }

    pub fn favorite(&self) -> Option<&ResolutionOption> {
        self.options.iter().find(|o| o.is_favorite)
    }
}

pub struct IncongruenceBuilder {
    kind: IncongruenceKind,
    field: Option<String>,
    count: Option<u64>,
    examples: Vec<serde_json::Value>,
    impact: Option<Impact>,
    options: Vec<ResolutionOption>,
}

impl IncongruenceBuilder {
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn examples(mut self, examples: Vec<serde_json::Value>) -> Self {
        self.examples = examples;
        self
    }

    pub fn impact(mut self, affected_count: u64, total_count: u64) -> Self {
        self.impact = Some(Impact::new(affected_count, total_count));
        self
    }

    pub fn options(mut self, options: Vec<ResolutionOption>) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Incongruence {
        let options = resolve_options(&self.kind, self.options);
        Incongruence {
            kind: self.kind,
            field: self.field,
            count: self.count,
            examples: self.examples,
            impact: self.impact,
            options,
        }
    }
}

// --- WIRE FORMAT (detector / processor / exports) ---
// Flat object keyed by `tipo`; nullable lists are accepted.

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireIncongruence {
    #[serde(rename = "tipo")]
    kind: String,

    #[serde(rename = "campo", default, skip_serializing_if = "Option::is_none")]
    field: Option<String>,

    #[serde(rename = "cantidad", default, skip_serializing_if = "Option::is_none")]
    count: Option<u64>,

    #[serde(rename = "variaciones", default, skip_serializing_if = "Option::is_none")]
    variations: Option<Vec<String>>,

    #[serde(rename = "ejemplos", default, skip_serializing_if = "Option::is_none")]
    examples: Option<Vec<serde_json::Value>>,

    #[serde(rename = "impacto", default, skip_serializing_if = "Option::is_none")]
    impact: Option<Impact>,

    #[serde(rename = "opciones", default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<ResolutionOption>>,

    #[serde(rename = "rango_actual", default, skip_serializing_if = "Option::is_none")]
    current_range: Option<ValueRange>,
}

impl From<WireIncongruence> for Incongruence {
    fn from(wire: WireIncongruence) -> Self {
        let kind = IncongruenceKind::from_wire(
            &wire.kind,
            wire.variations.unwrap_or_default(),
            wire.current_range,
        );
        IncongruenceBuilder {
            kind,
            field: wire.field,
            count: wire.count,
            examples: wire.examples.unwrap_or_default(),
            impact: wire.impact,
            options: wire.options.unwrap_or_default(),
        }
        .build()
    }
}

impl From<Incongruence> for WireIncongruence {
    fn from(inc: Incongruence) -> Self {
        let variations = inc.kind.variations().to_vec();
        WireIncongruence {
            kind: inc.kind.tag().to_string(),
            field: inc.field,
            count: inc.count,
            variations: (!variations.is_empty()).then_some(variations),
            examples: (!inc.examples.is_empty()).then_some(inc.examples),
            impact: inc.impact,
            options: (!inc.options.is_empty()).then_some(inc.options),
            current_range: inc.kind.current_range(),
        }
    }
}
