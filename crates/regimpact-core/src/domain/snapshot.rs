use serde::{Deserialize, Serialize};

use crate::Ticker;

/// Point-in-time market data for one security.
///
/// Every field except `ticker` is optional: providers return a bare snapshot
/// when the upstream call fails, and scoring treats missing values as unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub ticker: Ticker,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl MarketSnapshot {
    /// Placeholder used when a provider has nothing to report.
    pub fn empty(ticker: Ticker) -> Self {
        Self {
            ticker,
            price: None,
            market_cap: None,
            beta: None,
            name: None,
        }
    }

    pub fn new(
        ticker: Ticker,
        price: Option<f64>,
        market_cap: Option<f64>,
        beta: Option<f64>,
        name: Option<String>,
    ) -> Self {
        Self {
            ticker,
            price,
            market_cap,
            beta,
            name,
        }
        .sanitized()
    }

    pub fn with_market_cap(mut self, market_cap: f64) -> Self {
        self.market_cap = non_negative(Some(market_cap));
        self
    }

    /// Drops values that cannot be used in arithmetic (NaN, infinities,
    /// negative prices or capitalizations) and blank names.
    pub fn sanitized(self) -> Self {
        Self {
            ticker: self.ticker,
            price: non_negative(self.price),
            market_cap: non_negative(self.market_cap),
            beta: self.beta.filter(|value| value.is_finite()),
            name: self
                .name
                .map(|name| name.trim().to_owned())
                .filter(|name| !name.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_none()
            && self.market_cap.is_none()
            && self.beta.is_none()
            && self.name.is_none()
    }
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite() && *value >= 0.0)
}
