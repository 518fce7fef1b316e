//! Risk score: a weighted, capped sum of issue severities
//!
//! The weights are policy, not contract. Scores are only meaningful for
//! ranking scans against each other.

use crate::scanner::SeverityTotals;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Points per issue of each severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            high: 25,
            medium: 10,
            low: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    None,
    Low,
    Moderate,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RiskLevel::None => "none",
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RiskScore {
    pub value: u32,
    pub cap: u32,
}

impl RiskScore {
    pub fn compute(totals: &SeverityTotals, weights: &ScoreWeights, cap: u32) -> Self {
        let points = |count: usize, weight: u32| (count as u64).saturating_mul(weight as u64);
        let raw = points(totals.high, weights.high)
            .saturating_add(points(totals.medium, weights.medium))
            .saturating_add(points(totals.low, weights.low));
        Self {
            value: raw.min(cap as u64) as u32,
            cap,
        }
    }

    /// Bands at 30% and 60% of the cap
    pub fn level(&self) -> RiskLevel {
        if self.value == 0 || self.cap == 0 {
            return RiskLevel::None;
        }
        let percent = self.value as u64 * 100 / self.cap as u64;
        match percent {
            0..30 => RiskLevel::Low,
            30..60 => RiskLevel::Moderate,
            _ => RiskLevel::High,
        }
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.cap)
    }
}
