//! Top-level recommendation derived from the worst sector.

use crate::aggregation::{MONITOR_THRESHOLD, REDUCE_THRESHOLD};
use crate::SectorSummary;

pub const NO_ACTION: &str = "No urgent reallocation suggested.";

/// One action string for the whole evaluation. `summaries` must already be
/// sorted by descending `avg_risk`; only the first entry is inspected.
pub fn top_level_action(summaries: &[SectorSummary]) -> String {
    let Some(worst) = summaries.first() else {
        return String::from(NO_ACTION);
    };

    if worst.avg_risk > REDUCE_THRESHOLD {
        format!(
            "Primary recommendation: partially exit {} and reallocate toward less regulation-exposed sectors.",
            worst.sector
        )
    } else if worst.avg_risk > MONITOR_THRESHOLD {
        format!(
            "Primary recommendation: monitor {}; regulatory impact identified but not critical.",
            worst.sector
        )
    } else {
        String::from("Primary recommendation: portfolio broadly stable against this regulation.")
    }
}
