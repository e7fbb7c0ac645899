use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Ticker, ValidationError};

/// Structured regulatory signals extracted upstream from a regulation text.
///
/// All four fields are required in the wire format. A `null` list or string is
/// read as empty; any other shape is rejected with the offending field named.
/// Mentioned tickers are kept as written (trimmed, blanks dropped): a mention
/// that does not name a directory security is ignored, whatever its spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct RegulationInsight {
    pub keywords: Vec<String>,
    pub affected_sectors: Vec<String>,
    pub mentioned_tickers: Vec<String>,
    pub summary: String,
}

impl RegulationInsight {
    pub fn new(
        keywords: Vec<String>,
        affected_sectors: Vec<String>,
        mentioned_tickers: impl IntoIterator<Item = impl Into<String>>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            keywords,
            affected_sectors,
            mentioned_tickers: mentioned_tickers.into_iter().map(Into::into).collect(),
            summary: summary.into(),
        }
    }

    /// Validate an already-parsed JSON document.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let object = value.as_object().ok_or(ValidationError::InsightNotAnObject)?;

        let keywords = string_list(object, "keywords")?;
        let affected_sectors = string_list(object, "affectedSectors")?;
        let mentioned_tickers = string_list(object, "mentionedTickers")?
            .into_iter()
            .map(|raw| raw.trim().to_owned())
            .filter(|raw| !raw.is_empty())
            .collect();
        let summary = string_field(object, "summary")?;

        Ok(Self {
            keywords,
            affected_sectors,
            mentioned_tickers,
            summary,
        })
    }

    /// Whether the regulation names this security explicitly. Case-insensitive.
    pub fn mentions(&self, ticker: &Ticker) -> bool {
        self.mentioned_tickers
            .iter()
            .any(|raw| raw.eq_ignore_ascii_case(ticker.as_str()))
    }
}

impl TryFrom<Value> for RegulationInsight {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

fn required<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, ValidationError> {
    object
        .get(field)
        .ok_or(ValidationError::MissingField { field })
}

fn string_list(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, ValidationError> {
    match required(object, field)? {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| ValidationError::InvalidFieldType {
                        field: format!("{field}[{index}]"),
                        expected: "a string",
                    })
            })
            .collect(),
        _ => Err(ValidationError::InvalidFieldType {
            field: field.to_owned(),
            expected: "an array of strings",
        }),
    }
}

fn string_field(object: &Map<String, Value>, field: &'static str) -> Result<String, ValidationError> {
    match required(object, field)? {
        Value::Null => Ok(String::new()),
        Value::String(text) => Ok(text.clone()),
        _ => Err(ValidationError::InvalidFieldType {
            field: field.to_owned(),
            expected: "a string",
        }),
    }
}
