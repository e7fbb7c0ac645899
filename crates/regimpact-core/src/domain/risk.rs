use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::Ticker;

/// Derived risk for one security, recomputed on every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRisk {
    pub ticker: Ticker,
    pub company: String,
    pub sector: String,
    /// Sum of matching rule weights, clamped to 1.
    pub base_risk: f64,
    pub direct_hit_bonus: f64,
    /// Market-cap tier multiplier.
    pub systemic_weight: f64,
    /// Final score in [0, 1], rounded to two decimals.
    pub risk_score: f64,
    pub why: String,
}

/// Per-sector aggregate over the scored securities of that sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorSummary {
    pub sector: String,
    /// Unweighted mean of member risk scores, rounded to two decimals.
    pub avg_risk: f64,
    pub tickers: BTreeSet<Ticker>,
    pub suggestion: String,
}

/// Complete engine output for one regulation insight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub per_security: Vec<SecurityRisk>,
    pub sector_summary: Vec<SectorSummary>,
    pub action: String,
}
