//! Sector aggregator.

use std::collections::{BTreeMap, BTreeSet};

use crate::scoring::round2;
use crate::{SectorSummary, SecurityRisk, Ticker};

/// Mean risk strictly above this suggests rotating out of the sector.
pub const REDUCE_THRESHOLD: f64 = 0.6;
/// Mean risk strictly above this suggests monitoring.
pub const MONITOR_THRESHOLD: f64 = 0.3;

#[derive(Default)]
struct SectorAccumulator {
    sum: f64,
    count: usize,
    tickers: BTreeSet<Ticker>,
}

impl SectorAccumulator {
    fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let mean = self.sum / self.count as f64;
        if mean.is_finite() {
            mean
        } else {
            0.0
        }
    }
}

/// Group scored securities by sector.
///
/// Only sectors with at least one scored member appear. The mean is rounded
/// to two decimals before the suggestion tier is chosen. Output is sorted by
/// descending `avg_risk`; equal averages keep sector-name order.
pub fn summarize_sectors(risks: &[SecurityRisk]) -> Vec<SectorSummary> {
    let mut groups: BTreeMap<&str, SectorAccumulator> = BTreeMap::new();
    for risk in risks {
        let group = groups.entry(risk.sector.as_str()).or_default();
        group.sum += risk.risk_score;
        group.count += 1;
        group.tickers.insert(risk.ticker.clone());
    }

    let mut summaries: Vec<SectorSummary> = groups
        .into_iter()
        .map(|(sector, group)| {
            // Tiered on the rounded average, the value reported and read by the action.
            let avg_risk = round2(group.mean());
            SectorSummary {
                sector: sector.to_owned(),
                suggestion: suggestion_for(sector, avg_risk),
                avg_risk,
                tickers: group.tickers,
            }
        })
        .collect();

    summaries.sort_by(|left, right| right.avg_risk.total_cmp(&left.avg_risk));
    summaries
}

pub fn suggestion_for(sector: &str, avg_risk: f64) -> String {
    if avg_risk > REDUCE_THRESHOLD {
        format!("Reduce exposure to {sector} (rotate out of {sector})")
    } else if avg_risk > MONITOR_THRESHOLD {
        format!("Monitor {sector}, moderate risk")
    } else {
        format!("Low risk on {sector}, no immediate adjustment")
    }
}
