//! Security risk calculator.
//!
//! ```text
//! baseRisk       = min(1, Σ weight of rules in the security's sector matching a keyword)
//! directHitBonus = 0.3 if the ticker is mentioned, else 0
//! systemicWeight = 1.0 (cap > 500B) | 0.6 (cap > 100B) | 0.3
//! riskScore      = round2(clamp(clamp(baseRisk + bonus) * systemicWeight))
//! ```
//!
//! Scores below [`RELEVANCE_FLOOR`] after rounding are dropped.

use crate::directory::SecurityRecord;
use crate::rules::RuleTable;
use crate::{MarketSnapshot, RegulationInsight, SecurityRisk};

pub const DIRECT_HIT_BONUS: f64 = 0.3;
pub const RELEVANCE_FLOOR: f64 = 0.05;

pub const MEGA_CAP_THRESHOLD: f64 = 500_000_000_000.0;
pub const LARGE_CAP_THRESHOLD: f64 = 100_000_000_000.0;
pub const MEGA_CAP_WEIGHT: f64 = 1.0;
pub const LARGE_CAP_WEIGHT: f64 = 0.6;
pub const DEFAULT_SYSTEMIC_WEIGHT: f64 = 0.3;

pub const FALLBACK_WHY: &str = "general sector exposure to this regulatory measure";
const WHY_SEPARATOR: &str = " | ";

/// Keyword contribution for one sector.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseRisk {
    pub score: f64,
    /// One `"<keyword> → <rationale>"` entry per matching (keyword, rule) pair.
    pub fragments: Vec<String>,
}

impl BaseRisk {
    pub fn why(&self) -> String {
        if self.fragments.is_empty() {
            String::from(FALLBACK_WHY)
        } else {
            self.fragments.join(WHY_SEPARATOR)
        }
    }
}

/// Sum the weights of every rule of `sector` whose keyword occurs in one of
/// `keywords`. A rule matching two keywords counts twice.
pub fn base_risk(sector: &str, keywords: &[String], rules: &RuleTable) -> BaseRisk {
    let mut score = 0.0;
    let mut fragments = Vec::new();

    for keyword in keywords {
        for rule in rules.rules_for_sector(sector) {
            if rule.matches(keyword) {
                score += rule.weight;
                fragments.push(format!("{keyword} → {}", rule.rationale));
            }
        }
    }

    BaseRisk {
        score: unit_clamp(score),
        fragments,
    }
}

pub fn direct_hit_bonus(mentioned: bool) -> f64 {
    if mentioned {
        DIRECT_HIT_BONUS
    } else {
        0.0
    }
}

/// Market-cap tier multiplier. Unknown caps fall into the lowest tier.
pub fn systemic_weight(market_cap: Option<f64>) -> f64 {
    match market_cap {
        Some(cap) if cap > MEGA_CAP_THRESHOLD => MEGA_CAP_WEIGHT,
        Some(cap) if cap > LARGE_CAP_THRESHOLD => LARGE_CAP_WEIGHT,
        _ => DEFAULT_SYSTEMIC_WEIGHT,
    }
}

/// Score one security, or `None` when it falls under the relevance floor.
pub fn score_security(
    record: &SecurityRecord,
    insight: &RegulationInsight,
    rules: &RuleTable,
    snapshot: &MarketSnapshot,
) -> Option<SecurityRisk> {
    let base = base_risk(&record.sector, &insight.keywords, rules);
    let bonus = direct_hit_bonus(insight.mentions(&record.ticker));
    let weight = systemic_weight(snapshot.market_cap);

    let raw = unit_clamp(base.score + bonus);
    let risk_score = round2(unit_clamp(raw * weight));
    if risk_score < RELEVANCE_FLOOR {
        return None;
    }

    Some(SecurityRisk {
        ticker: record.ticker.clone(),
        company: record.display_name.clone(),
        sector: record.sector.clone(),
        why: base.why(),
        base_risk: base.score,
        direct_hit_bonus: bonus,
        systemic_weight: weight,
        risk_score,
    })
}

/// Stable sort, highest score first. Equal scores keep input order.
pub fn rank_securities(mut risks: Vec<SecurityRisk>) -> Vec<SecurityRisk> {
    risks.sort_by(|left, right| right.risk_score.total_cmp(&left.risk_score));
    risks
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Clamp into [0, 1]; NaN and infinities collapse to 0.
pub fn unit_clamp(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
