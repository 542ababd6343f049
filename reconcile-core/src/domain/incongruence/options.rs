// reconcile-core/src/domain/incongruence/options.rs

use serde::{Deserialize, Serialize};

use super::kind::IncongruenceKind;

// Raw values of the synthesized menus. They are chosen so that
// `derive_action` maps each of them to the intended action.
pub const DELETE: &str = "delete";
pub const KEEP: &str = "keep";
pub const FLAG_FOR_REVIEW: &str = "flag-for-review";
pub const FILL: &str = "fill";
pub const CLEAN: &str = "clean";
pub const REVIEW: &str = "review";
pub const DELETE_DUPLICATES: &str = "delete-duplicates";
pub const KEEP_ALL: &str = "keep-all";

/// One selectable resolution for an incongruence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionOption {
    #[serde(rename = "valor")]
    pub value: String,

    /// Observed occurrences of `value`; `None` when the detector did not say.
    #[serde(rename = "frecuencia", default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u64>,

    #[serde(rename = "porcentaje", default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,

    #[serde(rename = "descripcion", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "es_favorito", default)]
    pub is_favorite: bool,
}

impl ResolutionOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            frequency: None,
            percentage: None,
            description: None,
            is_favorite: false,
        }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_frequency(mut self, frequency: u64) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn favorite(mut self) -> Self {
        self.is_favorite = true;
        self
    }
}

/// Options used by an incongruence: the detector's when it sent any,
/// otherwise the fixed menu for its kind. Exactly one favorite is kept.
pub fn resolve_options(
    kind: &IncongruenceKind,
    supplied: Vec<ResolutionOption>,
) -> Vec<ResolutionOption> {
    let mut options = if supplied.is_empty() {
        synthesize_options(kind)
    } else {
        supplied
    };
    ensure_single_favorite(&mut options);
    options
}

/// Fixed menu of options for a kind, used when the detector sends none.
pub fn synthesize_options(kind: &IncongruenceKind) -> Vec<ResolutionOption> {
    use IncongruenceKind as K;

    match kind {
        K::NameVariation { variations } => {
            let mut options: Vec<ResolutionOption> = distinct(variations)
                .into_iter()
                .map(ResolutionOption::new)
                .collect();
            rank_by_frequency(&mut options);
            options
        }
        K::ZeroValue | K::NegativeValue => vec![
            ResolutionOption::new(DELETE).described("Delete records"),
            ResolutionOption::new(KEEP).described("Keep (may be valid)"),
            ResolutionOption::new(FLAG_FOR_REVIEW).described("Flag for manual review"),
        ],
        K::EmptyValue => vec![
            ResolutionOption::new(KEEP).described("Keep empty"),
            ResolutionOption::new(FILL).described("Fill with value"),
            ResolutionOption::new(FLAG_FOR_REVIEW).described("Flag for manual review"),
        ],
        K::FutureDate | K::PastDate => vec![
            ResolutionOption::new(FILL).described("Correct date manually"),
            ResolutionOption::new(DELETE).described("Delete record"),
            ResolutionOption::new(FLAG_FOR_REVIEW).described("Flag for manual review"),
        ],
        K::ExcessWhitespace => vec![
            ResolutionOption::new(CLEAN).described("Clean automatically"),
            ResolutionOption::new(REVIEW).described("Review manually"),
        ],
        K::ExactDuplicate => vec![
            ResolutionOption::new(DELETE_DUPLICATES).described("Remove duplicates (keep one)"),
            ResolutionOption::new(KEEP_ALL).described("Keep all"),
            ResolutionOption::new(REVIEW).described("Review one by one"),
        ],
        K::IllogicalRange { .. } => vec![
            ResolutionOption::new(DELETE).described("Delete record"),
            ResolutionOption::new(FILL).described("Correct manually"),
            ResolutionOption::new(FLAG_FOR_REVIEW).described("Flag for manual review"),
        ],
        K::ClientIncoherence { variations } => distinct(variations)
            .into_iter()
            .map(|v| {
                let description = format!("Normalize to \"{}\"", v);
                ResolutionOption::new(v).described(description)
            })
            .collect(),
        K::StatisticalOutlier { .. } => vec![
            ResolutionOption::new(KEEP).described("Keep value (may be valid)"),
            ResolutionOption::new(DELETE).described("Delete record"),
            ResolutionOption::new(FILL).described("Correct value manually"),
        ],
        K::AnomalousClientPattern { .. } => vec![
            ResolutionOption::new(KEEP).described("Keep (may be valid)"),
            ResolutionOption::new(REVIEW).described("Review manually"),
            ResolutionOption::new(FILL).described("Correct price"),
        ],
        K::Unrecognized(_) => vec![
            ResolutionOption::new(KEEP).described("Keep as is"),
            ResolutionOption::new(REVIEW).described("Review manually"),
        ],
    }
}

/// Stable sort, highest known frequency first; unknown frequencies go last
/// and keep their relative order.
fn rank_by_frequency(options: &mut [ResolutionOption]) {
    options.sort_by(|a, b| b.frequency.cmp(&a.frequency));
}

fn ensure_single_favorite(options: &mut [ResolutionOption]) {
    let favorite = options.iter().position(|o| o.is_favorite).unwrap_or(0);
    for (i, option) in options.iter_mut().enumerate() {
        option.is_favorite = i == favorite;
    }
}

fn distinct(values: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .iter()
        .filter(|v| seen.insert(v.as_str()))
        .cloned()
        .collect()
}
