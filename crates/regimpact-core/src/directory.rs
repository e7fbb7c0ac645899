//! Security directory: the reference universe scored on every evaluation.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CoreError, Ticker, ValidationError};

const BUILTIN_SECURITIES: &[(&str, &str, &str)] = &[
    ("AAPL", "Apple Inc.", "Information Technology"),
    ("MSFT", "Microsoft Corporation", "Information Technology"),
    ("NVDA", "NVIDIA Corporation", "Information Technology"),
    ("AMD", "Advanced Micro Devices, Inc.", "Information Technology"),
    ("INTC", "Intel Corporation", "Information Technology"),
    ("TSM", "Taiwan Semiconductor Manufacturing Company", "Information Technology"),
    ("JPM", "JPMorgan Chase & Co.", "Financials"),
    ("GS", "The Goldman Sachs Group, Inc.", "Financials"),
    ("BAC", "Bank of America Corporation", "Financials"),
    ("C", "Citigroup Inc.", "Financials"),
    ("MS", "Morgan Stanley", "Financials"),
    ("V", "Visa Inc.", "Financials"),
    ("XOM", "Exxon Mobil Corporation", "Energy"),
    ("CVX", "Chevron Corporation", "Energy"),
    ("BP", "BP p.l.c.", "Energy"),
    ("TTE", "TotalEnergies SE", "Energy"),
    ("BA", "The Boeing Company", "Industrials"),
    ("CAT", "Caterpillar Inc.", "Industrials"),
    ("GE", "GE Aerospace", "Industrials"),
    ("HON", "Honeywell International Inc.", "Industrials"),
    ("TSLA", "Tesla, Inc.", "Consumer Discretionary"),
    ("AMZN", "Amazon.com, Inc.", "Consumer Discretionary"),
    ("HD", "The Home Depot, Inc.", "Consumer Discretionary"),
    ("MCD", "McDonald's Corporation", "Consumer Discretionary"),
    ("PG", "The Procter & Gamble Company", "Consumer Staples"),
    ("KO", "The Coca-Cola Company", "Consumer Staples"),
    ("COST", "Costco Wholesale Corporation", "Consumer Staples"),
    ("JNJ", "Johnson & Johnson", "Health Care"),
    ("PFE", "Pfizer Inc.", "Health Care"),
    ("MRK", "Merck & Co., Inc.", "Health Care"),
    ("UNH", "UnitedHealth Group Incorporated", "Health Care"),
    ("NEE", "NextEra Energy, Inc.", "Utilities"),
    ("DUK", "Duke Energy Corporation", "Utilities"),
    ("SO", "The Southern Company", "Utilities"),
    ("EXC", "Exelon Corporation", "Utilities"),
    ("LIN", "Linde plc", "Materials"),
    ("SHW", "The Sherwin-Williams Company", "Materials"),
    ("APD", "Air Products and Chemicals, Inc.", "Materials"),
    ("GOOGL", "Alphabet Inc.", "Communication Services"),
    ("META", "Meta Platforms, Inc.", "Communication Services"),
    ("NFLX", "Netflix, Inc.", "Communication Services"),
    ("DIS", "The Walt Disney Company", "Communication Services"),
    ("PLD", "Prologis, Inc.", "Real Estate"),
    ("AMT", "American Tower Corporation", "Real Estate"),
    ("CCI", "Crown Castle Inc.", "Real Estate"),
];

/// One security of the reference universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRecord {
    pub ticker: Ticker,
    pub display_name: String,
    pub sector: String,
}

impl SecurityRecord {
    pub fn new(ticker: Ticker, display_name: impl Into<String>, sector: impl Into<String>) -> Self {
        Self {
            ticker,
            display_name: display_name.into(),
            sector: sector.into(),
        }
    }
}

/// Ordered, duplicate-free reference universe.
///
/// Directory order is the tie-break order of equally scored securities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DirectoryFile")]
pub struct SecurityDirectory {
    securities: Vec<SecurityRecord>,
}

#[derive(Deserialize)]
struct DirectoryFile {
    securities: Vec<SecurityRecord>,
}

impl TryFrom<DirectoryFile> for SecurityDirectory {
    type Error = ValidationError;

    fn try_from(file: DirectoryFile) -> Result<Self, Self::Error> {
        Self::new(file.securities)
    }
}

impl SecurityDirectory {
    pub fn new(securities: Vec<SecurityRecord>) -> Result<Self, ValidationError> {
        if securities.is_empty() {
            return Err(ValidationError::EmptyDirectory);
        }

        let mut seen = HashSet::with_capacity(securities.len());
        for record in &securities {
            if record.display_name.trim().is_empty() {
                return Err(ValidationError::EmptySecurityField {
                    ticker: record.ticker.to_string(),
                    field: "displayName",
                });
            }
            if record.sector.trim().is_empty() {
                return Err(ValidationError::EmptySecurityField {
                    ticker: record.ticker.to_string(),
                    field: "sector",
                });
            }
            if !seen.insert(&record.ticker) {
                return Err(ValidationError::DuplicateTicker {
                    ticker: record.ticker.to_string(),
                });
            }
        }

        Ok(Self { securities })
    }

    /// Universe shipped with the crate: large caps across all GICS sectors.
    pub fn builtin() -> Self {
        Self {
            securities: BUILTIN_SECURITIES
                .iter()
                .filter_map(|(ticker, name, sector)| {
                    Ticker::parse(ticker)
                        .ok()
                        .map(|ticker| SecurityRecord::new(ticker, *name, *sector))
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

    pub fn records(&self) -> &[SecurityRecord] {
        &self.securities
    }

    pub fn get(&self, ticker: &Ticker) -> Option<&SecurityRecord> {
        self.securities.iter().find(|record| &record.ticker == ticker)
    }

    pub fn len(&self) -> usize {
        self.securities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }

    pub fn sectors(&self) -> BTreeSet<&str> {
        self.securities
            .iter()
            .map(|record| record.sector.as_str())
            .collect()
    }
}

impl Default for SecurityDirectory {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleTable;

    fn ticker(raw: &str) -> Ticker {
        Ticker::parse(raw).expect("valid ticker")
    }

    #[test]
    fn builtin_universe_is_valid_and_complete() {
        let directory = SecurityDirectory::builtin();
        assert_eq!(directory.len(), BUILTIN_SECURITIES.len());
        SecurityDirectory::new(directory.records().to_vec())
            .expect("builtin directory must pass validation");
    }

    #[test]
    fn every_builtin_rule_sector_has_members() {
        let directory = SecurityDirectory::builtin();
        let sectors = directory.sectors();
        for sector in RuleTable::builtin().sectors() {
            assert!(sectors.contains(sector), "no securities in sector '{sector}'");
        }
    }

    #[test]
    fn looks_up_by_ticker() {
        let directory = SecurityDirectory::builtin();
        let record = directory.get(&ticker("BA")).expect("BA is in the universe");
        assert_eq!(record.sector, "Industrials");
        assert!(directory.get(&ticker("ZZZZ")).is_none());
    }

    #[test]
    fn rejects_duplicates_and_blank_fields() {
        let err = SecurityDirectory::new(vec![
            SecurityRecord::new(ticker("XOM"), "Exxon", "Energy"),
            SecurityRecord::new(ticker("xom"), "Exxon again", "Energy"),
        ])
        .expect_err("must fail");
        assert_eq!(
            err,
            ValidationError::DuplicateTicker {
                ticker: String::from("XOM")
            }
        );

        let err = SecurityDirectory::new(vec![SecurityRecord::new(ticker("XOM"), "Exxon", "")])
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::EmptySecurityField { field: "sector", .. }));

        assert_eq!(
            SecurityDirectory::new(Vec::new()).expect_err("must fail"),
            ValidationError::EmptyDirectory
        );
    }

    #[test]
    fn loads_yaml_with_camel_case_fields() {
        let directory = SecurityDirectory::from_yaml_str(
            "securities:\n  - ticker: nee\n    displayName: NextEra Energy\n    sector: Utilities\n",
        )
        .expect("yaml should load");
        assert_eq!(directory.records()[0].ticker.as_str(), "NEE");
        assert_eq!(directory.records()[0].display_name, "NextEra Energy");
    }
}
