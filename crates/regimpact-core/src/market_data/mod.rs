//! Market data provider contract and adapters.
//!
//! | Provider | Description |
//! |----------|-------------|
//! | [`YahooMarketData`] | Yahoo Finance quote endpoint over an [`HttpClient`](crate::HttpClient) |
//! | [`StaticMarketData`] | In-memory fixtures for offline runs and tests |
//!
//! Providers are infallible by signature: whatever goes wrong upstream is
//! logged and folded into a bare [`MarketSnapshot`] carrying only the ticker.

mod yahoo;

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

pub use yahoo::{YahooConfig, YahooMarketData};

use crate::{CoreError, MarketSnapshot, Ticker};

/// Source of per-ticker market snapshots.
///
/// Implementations must be `Send + Sync`; the engine fans out one call per
/// security of the universe and awaits them concurrently.
pub trait MarketDataProvider: Send + Sync {
    /// Short provider identifier used in logs and output metadata.
    fn id(&self) -> &'static str;

    /// One-off setup awaited before a batch of snapshots, outside any
    /// per-snapshot timeout. Failures are logged, never returned.
    fn prepare(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async {})
    }

    /// Snapshot for `ticker`. Never fails: on any upstream problem the
    /// provider returns [`MarketSnapshot::empty`].
    fn snapshot<'a>(
        &'a self,
        ticker: &'a Ticker,
    ) -> Pin<Box<dyn Future<Output = MarketSnapshot> + Send + 'a>>;
}

/// Adapter-internal failure classification. Never crosses the
/// [`MarketDataProvider`] boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketDataErrorKind {
    Unavailable,
    RateLimited,
    Unauthorized,
    InvalidResponse,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketDataError {
    kind: MarketDataErrorKind,
    message: String,
}

impl MarketDataError {
    pub fn new(kind: MarketDataErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(MarketDataErrorKind::Unavailable, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(MarketDataErrorKind::InvalidResponse, message)
    }

    pub const fn kind(&self) -> MarketDataErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether a later attempt could succeed. The engine never retries; this
    /// only feeds log output.
    pub const fn retryable(&self) -> bool {
        matches!(
            self.kind,
            MarketDataErrorKind::Unavailable | MarketDataErrorKind::RateLimited
        )
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            MarketDataErrorKind::Unavailable => "market_data.unavailable",
            MarketDataErrorKind::RateLimited => "market_data.rate_limited",
            MarketDataErrorKind::Unauthorized => "market_data.unauthorized",
            MarketDataErrorKind::InvalidResponse => "market_data.invalid_response",
            MarketDataErrorKind::NotFound => "market_data.not_found",
        }
    }
}

impl Display for MarketDataError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for MarketDataError {}

/// Fixture-backed provider. Unknown tickers yield an empty snapshot.
#[derive(Debug, Clone, Default)]
pub struct StaticMarketData {
    snapshots: HashMap<Ticker, MarketSnapshot>,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshots(snapshots: impl IntoIterator<Item = MarketSnapshot>) -> Self {
        Self {
            snapshots: snapshots
                .into_iter()
                .map(|snapshot| {
                    let snapshot = snapshot.sanitized();
                    (snapshot.ticker.clone(), snapshot)
                })
                .collect(),
        }
    }

    pub fn with_snapshot(mut self, snapshot: MarketSnapshot) -> Self {
        let snapshot = snapshot.sanitized();
        self.snapshots.insert(snapshot.ticker.clone(), snapshot);
        self
    }

    /// Shorthand for a snapshot that only carries a market capitalization.
    pub fn with_market_cap(self, ticker: Ticker, market_cap: f64) -> Self {
        self.with_snapshot(MarketSnapshot::empty(ticker).with_market_cap(market_cap))
    }

    /// Parse a JSON array of snapshots (`[{"ticker": "NVDA", "marketCap": 3.1e12}]`).
    pub fn from_json_str(input: &str) -> Result<Self, CoreError> {
        let snapshots: Vec<MarketSnapshot> = serde_json::from_str(input)?;
        Ok(Self::from_snapshots(snapshots))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|error| CoreError::io(path, error))?;
        Self::from_json_str(&contents)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

impl MarketDataProvider for StaticMarketData {
    fn id(&self) -> &'static str {
        "static"
    }

    fn snapshot<'a>(
        &'a self,
        ticker: &'a Ticker,
    ) -> Pin<Box<dyn Future<Output = MarketSnapshot> + Send + 'a>> {
        Box::pin(async move {
            self.snapshots
                .get(ticker)
                .cloned()
                .unwrap_or_else(|| MarketSnapshot::empty(ticker.clone()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker(raw: &str) -> Ticker {
        Ticker::parse(raw).expect("valid ticker")
    }

    #[tokio::test]
    async fn static_provider_returns_fixture_or_empty() {
        let provider = StaticMarketData::new().with_market_cap(ticker("NVDA"), 3.0e12);

        let known = provider.snapshot(&ticker("NVDA")).await;
        assert_eq!(known.market_cap, Some(3.0e12));

        let unknown = provider.snapshot(&ticker("XOM")).await;
        assert_eq!(unknown, MarketSnapshot::empty(ticker("XOM")));
    }

    #[tokio::test]
    async fn static_provider_loads_json_fixtures() {
        let provider = StaticMarketData::from_json_str(
            r#"[{"ticker":"aapl","price":190.1,"marketCap":2.9e12,"beta":1.2,"name":"Apple Inc."},
                {"ticker":"BA","marketCap":-1}]"#,
        )
        .expect("fixtures should parse");
        assert_eq!(provider.len(), 2);

        let apple = provider.snapshot(&ticker("AAPL")).await;
        assert_eq!(apple.name.as_deref(), Some("Apple Inc."));

        let boeing = provider.snapshot(&ticker("BA")).await;
        assert_eq!(boeing.market_cap, None, "negative caps are sanitized away");
    }

    #[test]
    fn error_codes_are_stable() {
        let error = MarketDataError::unavailable("upstream down");
        assert_eq!(error.code(), "market_data.unavailable");
        assert_eq!(error.to_string(), "upstream down (market_data.unavailable)");
        assert!(error.retryable());
        assert!(!MarketDataError::invalid_response("bad json").retryable());
    }
}
