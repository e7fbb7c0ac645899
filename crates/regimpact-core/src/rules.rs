//! Keyword rule table.
//!
//! A rule ties a regulatory keyword to the sector it hits and the weight of
//! that hit. The table is versioned, validated once when loaded, and shared
//! read-only across evaluations.
//!
//! ```yaml
//! version: "1.0.0"
//! rules:
//!   - keyword: semiconductor
//!     sector: Information Technology
//!     weight: 0.9
//!     rationale: Chip and GPU export restrictions pressure chipmaker revenues
//! ```

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CoreError, ValidationError};

/// Version tag of the rule table compiled into the crate.
pub const BUILTIN_RULES_VERSION: &str = "1.0.0";

const BUILTIN_RULES: &[(&str, &str, f64, &str)] = &[
    (
        "semiconductor",
        "Information Technology",
        0.9,
        "chip and GPU export restrictions pressure chipmaker revenues",
    ),
    (
        "export control",
        "Information Technology",
        0.7,
        "controls on high-tech exports to restricted countries",
    ),
    (
        "carbon tax",
        "Industrials",
        0.8,
        "a carbon tax raises operating costs for industrials, aviation and logistics",
    ),
    (
        "emission standard",
        "Industrials",
        0.6,
        "stricter emission standards for aerospace and transport",
    ),
    (
        "bank capital requirement",
        "Financials",
        0.9,
        "higher capital requirements compress bank margins",
    ),
    (
        "windfall tax",
        "Energy",
        0.85,
        "exceptional tax on energy profits",
    ),
];

/// Static mapping keyword → sector, weight, rationale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub sector: String,
    pub weight: f64,
    pub rationale: String,
}

impl KeywordRule {
    pub fn new(
        keyword: impl Into<String>,
        sector: impl Into<String>,
        weight: f64,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            sector: sector.into(),
            weight,
            rationale: rationale.into(),
        }
    }

    /// True when this rule's keyword occurs, ignoring case, inside `text`.
    pub fn matches(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.keyword.to_lowercase())
    }

    fn validate(&self, index: usize) -> Result<(), ValidationError> {
        if self.keyword.trim().is_empty() {
            return Err(ValidationError::EmptyRuleField {
                index,
                field: "keyword",
            });
        }
        if self.sector.trim().is_empty() {
            return Err(ValidationError::EmptyRuleField {
                index,
                field: "sector",
            });
        }
        if self.rationale.trim().is_empty() {
            return Err(ValidationError::EmptyRuleField {
                index,
                field: "rationale",
            });
        }
        if !self.weight.is_finite() || !(0.0..=1.0).contains(&self.weight) {
            return Err(ValidationError::WeightOutOfRange {
                index,
                weight: self.weight,
            });
        }
        Ok(())
    }
}

/// The single canonical, versioned rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleTableFile")]
pub struct RuleTable {
    version: String,
    rules: Vec<KeywordRule>,
}

#[derive(Deserialize)]
struct RuleTableFile {
    version: String,
    rules: Vec<KeywordRule>,
}

impl TryFrom<RuleTableFile> for RuleTable {
    type Error = ValidationError;

    fn try_from(file: RuleTableFile) -> Result<Self, Self::Error> {
        Self::new(file.version, file.rules)
    }
}

impl RuleTable {
    pub fn new(version: impl Into<String>, rules: Vec<KeywordRule>) -> Result<Self, ValidationError> {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(ValidationError::EmptyRuleTableVersion);
        }
        if rules.is_empty() {
            return Err(ValidationError::EmptyRuleTable);
        }
        for (index, rule) in rules.iter().enumerate() {
            rule.validate(index)?;
        }
        Ok(Self { version, rules })
    }

    /// Rule table shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            version: String::from(BUILTIN_RULES_VERSION),
            rules: BUILTIN_RULES
                .iter()
                .map(|(keyword, sector, weight, rationale)| {
                    KeywordRule::new(*keyword, *sector, *weight, *rationale)
                })
                .collect(),
        }
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, CoreError> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|error| CoreError::io(path, error))?;
        Self::from_yaml_str(&contents)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules whose sector is exactly `sector`.
    pub fn rules_for_sector<'a>(&'a self, sector: &'a str) -> impl Iterator<Item = &'a KeywordRule> + 'a {
        self.rules.iter().filter(move |rule| rule.sector == sector)
    }

    pub fn sectors(&self) -> BTreeSet<&str> {
        self.rules.iter().map(|rule| rule.sector.as_str()).collect()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_is_valid() {
        let table = RuleTable::builtin();
        let revalidated = RuleTable::new(table.version(), table.rules().to_vec())
            .expect("builtin rules must pass validation");
        assert_eq!(revalidated, table);
        assert_eq!(table.version(), BUILTIN_RULES_VERSION);
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        let rule = KeywordRule::new("Carbon Tax", "Industrials", 0.8, "costs");
        assert!(rule.matches("EU carbon tax on aviation"));
        assert!(rule.matches("CARBON TAX"));
        assert!(!rule.matches("carbon"));
    }

    #[test]
    fn rejects_weight_outside_unit_interval() {
        let err = RuleTable::new(
            "test",
            vec![KeywordRule::new("tariff", "Industrials", 1.2, "costs")],
        )
        .expect_err("must fail");
        assert!(matches!(err, ValidationError::WeightOutOfRange { index: 0, .. }));

        let err = RuleTable::new(
            "test",
            vec![KeywordRule::new("tariff", "Industrials", f64::NAN, "costs")],
        )
        .expect_err("must fail");
        assert!(matches!(err, ValidationError::WeightOutOfRange { .. }));
    }

    #[test]
    fn rejects_empty_table_and_blank_fields() {
        assert_eq!(
            RuleTable::new("test", Vec::new()).expect_err("must fail"),
            ValidationError::EmptyRuleTable
        );
        assert_eq!(
            RuleTable::new(" ", vec![KeywordRule::new("a", "b", 0.1, "c")])
                .expect_err("must fail"),
            ValidationError::EmptyRuleTableVersion
        );
        assert_eq!(
            RuleTable::new("test", vec![KeywordRule::new("a", " ", 0.1, "c")])
                .expect_err("must fail"),
            ValidationError::EmptyRuleField {
                index: 0,
                field: "sector"
            }
        );
    }

    #[test]
    fn loads_and_validates_yaml() {
        let table = RuleTable::from_yaml_str(
            "version: \"2.1.0\"\nrules:\n  - keyword: tariff\n    sector: Industrials\n    weight: 0.4\n    rationale: import costs rise\n",
        )
        .expect("yaml should load");
        assert_eq!(table.version(), "2.1.0");
        assert_eq!(table.rules_for_sector("Industrials").count(), 1);

        let err = RuleTable::from_yaml_str(
            "version: \"2.1.0\"\nrules:\n  - keyword: tariff\n    sector: Industrials\n    weight: 4\n    rationale: import costs rise\n",
        )
        .expect_err("out-of-range weight must fail");
        assert!(err.to_string().contains("weight"));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rules.yaml");
        std::fs::write(
            &path,
            "version: file\nrules:\n  - keyword: windfall tax\n    sector: Energy\n    weight: 0.85\n    rationale: profits taxed\n",
        )
        .expect("write rules");

        let table = RuleTable::from_yaml_file(&path).expect("file should load");
        assert_eq!(table.version(), "file");

        let missing = RuleTable::from_yaml_file(dir.path().join("absent.yaml"))
            .expect_err("missing file must fail");
        assert!(matches!(missing, CoreError::Io { .. }));
    }
}
