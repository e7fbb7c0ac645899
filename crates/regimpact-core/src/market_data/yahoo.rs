use std::future::Future;
use std::num::NonZeroU32;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::{MarketDataError, MarketDataErrorKind, MarketDataProvider};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::{MarketSnapshot, Ticker};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const REFERER: &str = "https://finance.yahoo.com/";
const QUOTE_FIELDS: &str = "regularMarketPrice,marketCap,beta,longName,shortName";

/// Yahoo endpoint and throttling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct YahooConfig {
    /// Host serving `/v1/test/getcrumb` and `/v7/finance/quote`.
    pub query_base_url: String,
    /// Page visited first to obtain session cookies.
    pub session_url: String,
    pub requests_per_second: u32,
    pub request_timeout_ms: u64,
    /// Crumb lifetime before a fresh handshake is forced.
    pub session_ttl_secs: u64,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            query_base_url: String::from("https://query1.finance.yahoo.com"),
            session_url: String::from("https://fc.yahoo.com"),
            requests_per_second: 5,
            request_timeout_ms: 3_000,
            session_ttl_secs: 3_600,
        }
    }
}

#[derive(Debug)]
struct CachedCrumb {
    value: String,
    fetched_at: Instant,
}

/// Cookie/crumb session. The async mutex is held across the handshake so
/// concurrent callers wait for one refresh instead of racing.
#[derive(Debug, Default)]
struct YahooSession {
    crumb: Mutex<Option<CachedCrumb>>,
}

impl YahooSession {
    async fn crumb(
        &self,
        http_client: &dyn HttpClient,
        config: &YahooConfig,
    ) -> Result<String, MarketDataError> {
        let mut cached = self.crumb.lock().await;
        let ttl = Duration::from_secs(config.session_ttl_secs);
        if let Some(crumb) = cached.as_ref() {
            if crumb.fetched_at.elapsed() < ttl {
                return Ok(crumb.value.clone());
            }
        }

        let value = handshake(http_client, config).await?;
        *cached = Some(CachedCrumb {
            value: value.clone(),
            fetched_at: Instant::now(),
        });
        Ok(value)
    }

    async fn invalidate(&self) {
        *self.crumb.lock().await = None;
    }
}

async fn handshake(
    http_client: &dyn HttpClient,
    config: &YahooConfig,
) -> Result<String, MarketDataError> {
    let cookie_request = HttpRequest::get(config.session_url.as_str())
        .with_header("referer", REFERER)
        .with_timeout_ms(config.request_timeout_ms);
    // Yahoo answers the cookie page with a 404 while still setting the cookie,
    // so only transport failures matter here.
    http_client.execute(cookie_request).await.map_err(|error| {
        MarketDataError::unavailable(format!("yahoo session handshake failed: {}", error.message()))
    })?;

    let crumb_request = HttpRequest::get(format!("{}/v1/test/getcrumb", config.query_base_url))
        .with_header("referer", REFERER)
        .with_timeout_ms(config.request_timeout_ms);
    let response = http_client.execute(crumb_request).await.map_err(|error| {
        MarketDataError::unavailable(format!("yahoo crumb request failed: {}", error.message()))
    })?;

    let body = response.body.trim();
    if response.status == 429 || body.to_ascii_lowercase().contains("too many requests") {
        return Err(MarketDataError::new(
            MarketDataErrorKind::RateLimited,
            "yahoo rate limited the crumb request",
        ));
    }
    if !response.is_success() {
        return Err(MarketDataError::unavailable(format!(
            "yahoo crumb endpoint returned status {}",
            response.status
        )));
    }
    let looks_valid = !body.is_empty()
        && body.len() < 100
        && !body.contains(char::is_whitespace)
        && !body.contains('<');
    if !looks_valid {
        return Err(MarketDataError::invalid_response(
            "yahoo crumb endpoint returned an unexpected body",
        ));
    }

    debug!("yahoo session established");
    Ok(body.to_owned())
}

/// Yahoo Finance market data provider.
pub struct YahooMarketData {
    http_client: Arc<dyn HttpClient>,
    config: YahooConfig,
    session: YahooSession,
    limiter: DirectRateLimiter,
}

impl YahooMarketData {
    pub fn new(http_client: Arc<dyn HttpClient>, config: YahooConfig) -> Self {
        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            http_client,
            config,
            session: YahooSession::default(),
            limiter: RateLimiter::direct(Quota::per_second(per_second)),
        }
    }

    /// Provider backed by the production `reqwest` transport.
    pub fn with_reqwest(config: YahooConfig) -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()), config)
    }

    pub fn config(&self) -> &YahooConfig {
        &self.config
    }

    #[instrument(skip(self), fields(provider = "yahoo"))]
    async fn fetch(&self, ticker: &Ticker) -> Result<MarketSnapshot, MarketDataError> {
        self.limiter.until_ready().await;

        let crumb = self
            .session
            .crumb(self.http_client.as_ref(), &self.config)
            .await?;
        let url = format!(
            "{}/v7/finance/quote?symbols={}&fields={}&crumb={}",
            self.config.query_base_url,
            urlencoding::encode(ticker.as_str()),
            QUOTE_FIELDS,
            urlencoding::encode(&crumb)
        );
        let request = HttpRequest::get(url)
            .with_header("referer", REFERER)
            .with_timeout_ms(self.config.request_timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|error| {
            MarketDataError::unavailable(format!("yahoo transport error: {}", error.message()))
        })?;

        match response.status {
            401 | 403 => {
                self.session.invalidate().await;
                Err(MarketDataError::new(
                    MarketDataErrorKind::Unauthorized,
                    format!("yahoo rejected the session with status {}", response.status),
                ))
            }
            429 => Err(MarketDataError::new(
                MarketDataErrorKind::RateLimited,
                "yahoo rate limited the quote request",
            )),
            _ if !response.is_success() => Err(MarketDataError::unavailable(format!(
                "yahoo returned status {}",
                response.status
            ))),
            _ => parse_quote_response(ticker, &response.body),
        }
    }
}

impl MarketDataProvider for YahooMarketData {
    fn id(&self) -> &'static str {
        "yahoo"
    }

    /// Establish the crumb session so quote fetches start warm.
    fn prepare(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            self.limiter.until_ready().await;
            if let Err(error) = self
                .session
                .crumb(self.http_client.as_ref(), &self.config)
                .await
            {
                warn!(
                    code = error.code(),
                    error = error.message(),
                    "yahoo session warm-up failed, quote requests will retry the handshake"
                );
            }
        })
    }

    fn snapshot<'a>(
        &'a self,
        ticker: &'a Ticker,
    ) -> Pin<Box<dyn Future<Output = MarketSnapshot> + Send + 'a>> {
        Box::pin(async move {
            match self.fetch(ticker).await {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    warn!(
                        %ticker,
                        code = error.code(),
                        retryable = error.retryable(),
                        error = error.message(),
                        "market data unavailable, continuing with empty snapshot"
                    );
                    MarketSnapshot::empty(ticker.clone())
                }
            }
        })
    }
}

fn parse_quote_response(ticker: &Ticker, body: &str) -> Result<MarketSnapshot, MarketDataError> {
    let parsed: YahooQuoteResponse = serde_json::from_str(body).map_err(|error| {
        MarketDataError::invalid_response(format!("failed to parse yahoo quote: {error}"))
    })?;

    if let Some(error) = parsed.quote_response.error.filter(|value| !value.is_null()) {
        return Err(MarketDataError::unavailable(format!(
            "yahoo API error: {error}"
        )));
    }

    let quote = parsed
        .quote_response
        .result
        .into_iter()
        .find(|quote| quote.symbol.eq_ignore_ascii_case(ticker.as_str()))
        .ok_or_else(|| {
            MarketDataError::new(
                MarketDataErrorKind::NotFound,
                format!("yahoo returned no quote for {ticker}"),
            )
        })?;

    Ok(MarketSnapshot::new(
        ticker.clone(),
        quote.regular_market_price,
        quote.market_cap,
        quote.beta,
        quote.long_name.or(quote.short_name),
    ))
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: YahooQuoteResponseData,
}

#[derive(Debug, Deserialize)]
struct YahooQuoteResponseData {
    #[serde(default)]
    result: Vec<YahooQuoteData>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuoteData {
    symbol: String,
    regular_market_price: Option<f64>,
    market_cap: Option<f64>,
    beta: Option<f64>,
    long_name: Option<String>,
    short_name: Option<String>,
}
