// reconcile-core/src/domain/incongruence/kind.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Current bounds reported by the detector for range-sensitive problems.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

/// Category of a detected data-quality problem.
///
/// Only the variants that need extra data carry it: name problems carry the
/// observed spellings, range-sensitive problems carry the current bounds.
/// Tags the core does not know are preserved in `Unrecognized`.
#[derive(Debug, Clone, PartialEq)]
pub enum IncongruenceKind {
    NameVariation { variations: Vec<String> },
    ZeroValue,
    NegativeValue,
    EmptyValue,
    FutureDate,
    PastDate,
    ExcessWhitespace,
    ExactDuplicate,
    IllogicalRange { current_range: Option<ValueRange> },
    ClientIncoherence { variations: Vec<String> },
    StatisticalOutlier { current_range: Option<ValueRange> },
    AnomalousClientPattern { current_range: Option<ValueRange> },
    Unrecognized(String),
}

impl IncongruenceKind {
    /// Builds a kind from the detector's tag and the optional payload fields.
    pub fn from_wire(
        tag: &str,
        variations: Vec<String>,
        current_range: Option<ValueRange>,
    ) -> Self {
        match tag {
            "variaciones_nombre" => Self::NameVariation { variations },
            "valores_cero" => Self::ZeroValue,
            "valores_negativos" => Self::NegativeValue,
            "valores_vacios" => Self::EmptyValue,
            "fechas_futuras" => Self::FutureDate,
            "fechas_antiguas" => Self::PastDate,
            "espacios_multiples" => Self::ExcessWhitespace,
            "duplicados_exactos" => Self::ExactDuplicate,
            "rangos_illogicos" => Self::IllogicalRange { current_range },
            "incoherencia_cliente" => Self::ClientIncoherence { variations },
            "outliers_estadisticos" => Self::StatisticalOutlier { current_range },
            "patron_cliente_anomalo" => Self::AnomalousClientPattern { current_range },
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// Tag used by the detector, the processor and the rule API.
    pub fn tag(&self) -> &str {
        match self {
            Self::NameVariation { .. } => "variaciones_nombre",
            Self::ZeroValue => "valores_cero",
            Self::NegativeValue => "valores_negativos",
            Self::EmptyValue => "valores_vacios",
            Self::FutureDate => "fechas_futuras",
            Self::PastDate => "fechas_antiguas",
            Self::ExcessWhitespace => "espacios_multiples",
            Self::ExactDuplicate => "duplicados_exactos",
            Self::IllogicalRange { .. } => "rangos_illogicos",
            Self::ClientIncoherence { .. } => "incoherencia_cliente",
            Self::StatisticalOutlier { .. } => "outliers_estadisticos",
            Self::AnomalousClientPattern { .. } => "patron_cliente_anomalo",
            Self::Unrecognized(tag) => tag,
        }
    }

    /// Human label for terminals and logs.
    pub fn label(&self) -> &str {
        match self {
            Self::NameVariation { .. } => "name-variation",
            Self::ZeroValue => "zero-value",
            Self::NegativeValue => "negative-value",
            Self::EmptyValue => "empty-value",
            Self::FutureDate => "future-date",
            Self::PastDate => "past-date",
            Self::ExcessWhitespace => "excess-whitespace",
            Self::ExactDuplicate => "exact-duplicate",
            Self::IllogicalRange { .. } => "illogical-range",
            Self::ClientIncoherence { .. } => "client-incoherence",
            Self::StatisticalOutlier { .. } => "statistical-outlier",
            Self::AnomalousClientPattern { .. } => "anomalous-client-pattern",
            Self::Unrecognized(tag) => tag,
        }
    }

    pub fn variations(&self) -> &[String] {
        match self {
            Self::NameVariation { variations } | Self::ClientIncoherence { variations } => {
                variations
            }
            _ => &[],
        }
    }

    pub fn current_range(&self) -> Option<ValueRange> {
        match self {
            Self::IllogicalRange { current_range }
            | Self::StatisticalOutlier { current_range }
            | Self::AnomalousClientPattern { current_range } => *current_range,
            _ => None,
        }
    }

    /// Kinds whose resolution may carry a min/max override.
    pub fn is_range_sensitive(&self) -> bool {
        matches!(
            self,
            Self::IllogicalRange { .. }
                | Self::StatisticalOutlier { .. }
                | Self::AnomalousClientPattern { .. }
        )
    }

    /// Kinds resolved by picking a canonical spelling.
    pub fn is_naming(&self) -> bool {
        matches!(
            self,
            Self::NameVariation { .. } | Self::ClientIncoherence { .. }
        )
    }
}

impl fmt::Display for IncongruenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
