//! Narrative severity enrichment.
//!
//! Classifies a regulation summary into a coarse severity bucket from the
//! vocabulary it uses. This is a side channel for callers: it is reported next
//! to an [`Evaluation`](crate::Evaluation), never folded into any risk score.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityAssessment {
    pub level: SeverityLevel,
    /// Lowercased terms that decided the level, in order of first appearance.
    pub matched_terms: Vec<String>,
}

const HIGH_PATTERN: &str = r"(?i)\b(bans?|banned|prohibit(?:s|ed|ion)?|sanctions?|export controls?|embargo(?:es)?|moratorium)\b";
const MEDIUM_PATTERN: &str = r"(?i)\b(tax(?:es)?|tariffs?|levy|levies|standards?|requirements?|disclosures?|quotas?)\b";

fn buckets() -> &'static [(SeverityLevel, Regex)] {
    static BUCKETS: OnceLock<Vec<(SeverityLevel, Regex)>> = OnceLock::new();
    BUCKETS.get_or_init(|| {
        [
            (SeverityLevel::High, HIGH_PATTERN),
            (SeverityLevel::Medium, MEDIUM_PATTERN),
        ]
        .into_iter()
        .filter_map(|(level, pattern)| Regex::new(pattern).ok().map(|regex| (level, regex)))
        .collect()
    })
}

/// Assess `summary`. The most severe bucket with at least one hit wins.
pub fn assess(summary: &str) -> SeverityAssessment {
    for (level, regex) in buckets() {
        let mut matched_terms: Vec<String> = Vec::new();
        for found in regex.find_iter(summary) {
            let term = found.as_str().to_lowercase();
            if !matched_terms.contains(&term) {
                matched_terms.push(term);
            }
        }
        if !matched_terms.is_empty() {
            return SeverityAssessment {
                level: *level,
                matched_terms,
            };
        }
    }

    SeverityAssessment {
        level: SeverityLevel::Low,
        matched_terms: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_patterns_compile() {
        assert_eq!(buckets().len(), 2);
    }

    #[test]
    fn prohibitions_are_high() {
        let assessment =
            assess("The bill prohibits sales of advanced chips and extends Export Controls.");
        assert_eq!(assessment.level, SeverityLevel::High);
        assert_eq!(assessment.matched_terms, ["prohibits", "export controls"]);
    }

    #[test]
    fn fiscal_measures_are_medium() {
        let assessment = assess(
            "A carbon tax on US commercial aviation, plus a new tax credit and emission standards.",
        );
        assert_eq!(assessment.level, SeverityLevel::Medium);
        assert_eq!(assessment.matched_terms, ["tax", "standards"]);
    }

    #[test]
    fn neutral_text_is_low() {
        let assessment = assess("The agency opens a consultation on reporting formats.");
        assert_eq!(assessment.level, SeverityLevel::Low);
        assert!(assessment.matched_terms.is_empty());
        assert!(SeverityLevel::High > SeverityLevel::Medium);
    }

    #[test]
    fn words_must_match_whole() {
        assert_eq!(assess("Taxonomy alignment and bandwidth").level, SeverityLevel::Low);
    }

    #[test]
    fn serializes_level_in_snake_case() {
        let json = serde_json::to_value(assess("an embargo")).expect("serializes");
        assert_eq!(json["level"], "high");
    }
}
