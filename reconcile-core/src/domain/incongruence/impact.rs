// reconcile-core/src/domain/incongruence/impact.rs

use serde::{Deserialize, Serialize};

/// Share of the batch touched by one incongruence.
///
/// The percentage is always derived from the two counts (rounded to one
/// decimal); a percentage sent by the detector is ignored on input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireImpact", into = "WireImpact")]
pub struct Impact {
    affected_count: u64,
    total_count: u64,
    percentage: f64,
}

impl Impact {
    pub fn new(affected_count: u64, total_count: u64) -> Self {
        Self {
            affected_count,
            total_count,
            percentage: percentage_of(affected_count, total_count),
        }
    }

    pub fn affected_count(&self) -> u64 {
        self.affected_count
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }
}

/// `round(part / whole * 100, 1)`, 0.0 for an empty batch.
pub fn percentage_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let ratio = part as f64 / whole as f64;
    (ratio * 1000.0).round() / 10.0
}

#[derive(Serialize, Deserialize)]
struct WireImpact {
    #[serde(rename = "registros_afectados")]
    affected: u64,
    #[serde(rename = "total_registros")]
    total: u64,
    #[serde(rename = "porcentaje", default)]
    percentage: f64,
}

impl From<WireImpact> for Impact {
    fn from(wire: WireImpact) -> Self {
        Impact::new(wire.affected, wire.total)
    }
}

impl From<Impact> for WireImpact {
    fn from(impact: Impact) -> Self {
        WireImpact {
            affected: impact.affected_count,
            total: impact.total_count,
            percentage: impact.percentage,
        }
    }
}
