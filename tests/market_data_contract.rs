//! Contract tests for market data providers
//!
//! Every provider must answer with a snapshot for the requested ticker and
//! must never fail: upstream trouble turns into an empty snapshot.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use regimpact_core::{
    HttpClient, HttpError, HttpRequest, HttpResponse, MarketDataProvider, MarketSnapshot,
    RegulationInsight, RiskEngine, RuleTable, SecurityDirectory, StaticMarketData, Ticker,
    YahooConfig, YahooMarketData,
};

fn ticker(raw: &str) -> Ticker {
    Ticker::parse(raw).expect("valid ticker")
}

fn test_config() -> YahooConfig {
    YahooConfig {
        query_base_url: String::from("https://quotes.test"),
        session_url: String::from("https://session.test"),
        requests_per_second: 1_000,
        ..YahooConfig::default()
    }
}

/// Fake Yahoo: answers quotes from a market-cap table, or fails every quote.
struct FakeYahoo {
    caps: HashMap<String, f64>,
    quote_status: u16,
    handshake_delay: Duration,
    requests: Mutex<Vec<String>>,
}

impl FakeYahoo {
    fn with_caps(caps: &[(&str, f64)]) -> Self {
        Self {
            caps: caps
                .iter()
                .map(|(symbol, cap)| (symbol.to_string(), *cap))
                .collect(),
            quote_status: 200,
            handshake_delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn with_slow_handshake(mut self, delay: Duration) -> Self {
        self.handshake_delay = delay;
        self
    }

    fn failing(status: u16) -> Self {
        Self {
            quote_status: status,
            ..Self::with_caps(&[])
        }
    }

    fn quote_body(&self, url: &str) -> String {
        let symbol = url
            .split("symbols=")
            .nth(1)
            .and_then(|rest| rest.split('&').next())
            .unwrap_or_default();
        let result = match self.caps.get(symbol) {
            Some(cap) => format!(
                r#"[{{"symbol":"{symbol}","regularMarketPrice":100.0,"marketCap":{cap},"beta":1.1,"shortName":"{symbol} Corp"}}]"#
            ),
            None => String::from("[]"),
        };
        format!(r#"{{"quoteResponse":{{"result":{result},"error":null}}}}"#)
    }

    fn count(&self, needle: &str) -> usize {
        self.requests
            .lock()
            .expect("request log should not be poisoned")
            .iter()
            .filter(|url| url.contains(needle))
            .count()
    }
}

impl HttpClient for FakeYahoo {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("request log should not be poisoned")
            .push(request.url.clone());
        let is_handshake =
            request.url.starts_with("https://session.test") || request.url.contains("getcrumb");
        let delay = if is_handshake {
            self.handshake_delay
        } else {
            Duration::ZERO
        };
        let response = if request.url.starts_with("https://session.test") {
            Ok(HttpResponse::new(404, ""))
        } else if request.url.contains("/v1/test/getcrumb") {
            Ok(HttpResponse::ok("AbCdEf12"))
        } else if self.quote_status != 200 {
            Ok(HttpResponse::new(self.quote_status, "upstream error"))
        } else {
            Ok(HttpResponse::ok(self.quote_body(&request.url)))
        };
        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            response
        })
    }
}

// =============================================================================
// Provider contract
// =============================================================================

async fn assert_answers_for_requested_ticker(provider: &dyn MarketDataProvider) {
    for raw in ["NVDA", "XOM", "ZZZZ"] {
        let snapshot = provider.snapshot(&ticker(raw)).await;
        assert_eq!(snapshot.ticker.as_str(), raw, "provider {}", provider.id());
    }
}

#[tokio::test]
async fn all_providers_answer_for_the_requested_ticker() {
    let yahoo = YahooMarketData::new(
        Arc::new(FakeYahoo::with_caps(&[("NVDA", 3.1e12)])),
        test_config(),
    );
    let failing_yahoo = YahooMarketData::new(Arc::new(FakeYahoo::failing(503)), test_config());
    let fixtures = StaticMarketData::new().with_market_cap(ticker("XOM"), 4.5e11);

    assert_answers_for_requested_ticker(&yahoo).await;
    assert_answers_for_requested_ticker(&failing_yahoo).await;
    assert_answers_for_requested_ticker(&fixtures).await;
}

#[tokio::test]
async fn yahoo_quote_fields_map_onto_the_snapshot() {
    // Given: Yahoo reports a market cap, price and beta for NVDA
    let provider = YahooMarketData::new(
        Arc::new(FakeYahoo::with_caps(&[("NVDA", 3.1e12)])),
        test_config(),
    );

    // When: a snapshot is requested
    let snapshot = provider.snapshot(&ticker("NVDA")).await;

    // Then: every field is carried over
    assert_eq!(snapshot.market_cap, Some(3.1e12));
    assert_eq!(snapshot.price, Some(100.0));
    assert_eq!(snapshot.beta, Some(1.1));
    assert_eq!(snapshot.name.as_deref(), Some("NVDA Corp"));
}

#[tokio::test]
async fn yahoo_outage_degrades_to_empty_snapshot() {
    // Given: Yahoo answers every quote with 503
    let provider = YahooMarketData::new(Arc::new(FakeYahoo::failing(503)), test_config());

    // When: a snapshot is requested
    let snapshot = provider.snapshot(&ticker("AAPL")).await;

    // Then: the provider still answers, with no data
    assert_eq!(snapshot, MarketSnapshot::empty(ticker("AAPL")));
}

#[tokio::test]
async fn yahoo_session_is_established_once_per_provider() {
    let client = Arc::new(FakeYahoo::with_caps(&[("NVDA", 3.1e12), ("AMD", 2.4e11)]));
    let provider = YahooMarketData::new(client.clone(), test_config());

    provider.snapshot(&ticker("NVDA")).await;
    provider.snapshot(&ticker("AMD")).await;
    provider.snapshot(&ticker("MSFT")).await;

    assert_eq!(client.count("session.test"), 1);
    assert_eq!(client.count("getcrumb"), 1);
    assert_eq!(client.count("/v7/finance/quote"), 3);
}

#[tokio::test]
async fn static_fixtures_load_from_a_json_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("snapshots.json");
    std::fs::write(
        &path,
        r#"[{"ticker":"NVDA","price":121.4,"marketCap":3.1e12},{"ticker":"BA","marketCap":"n/a"}]"#,
    )
    .expect("write fixtures");

    let err = StaticMarketData::from_json_file(&path).expect_err("marketCap must be numeric");
    assert!(err.to_string().contains("serialization"));

    std::fs::write(&path, r#"[{"ticker":"NVDA","price":121.4,"marketCap":3.1e12}]"#)
        .expect("rewrite fixtures");
    let provider = StaticMarketData::from_json_file(&path).expect("fixtures load");
    assert_eq!(provider.snapshot(&ticker("NVDA")).await.price, Some(121.4));
}

// =============================================================================
// Providers inside an evaluation
// =============================================================================

#[tokio::test]
async fn yahoo_backed_engine_applies_market_cap_tiers() {
    // Given: an engine reading market caps through the Yahoo adapter
    let client = Arc::new(FakeYahoo::with_caps(&[("NVDA", 3.1e12), ("AMD", 2.4e11)]));
    let provider = YahooMarketData::new(client, test_config());
    let engine = RiskEngine::new(
        Arc::new(RuleTable::builtin()),
        Arc::new(SecurityDirectory::builtin()),
        Arc::new(provider),
    );
    let insight = RegulationInsight::new(
        vec![String::from("semiconductor")],
        Vec::new(),
        vec![ticker("NVDA")],
        "",
    );

    // When: a semiconductor regulation naming NVDA is evaluated
    let run = engine.evaluate_detailed(&insight).await;

    // Then: the tiers come from Yahoo's market caps
    let scores: Vec<(&str, f64)> = run
        .evaluation
        .per_security
        .iter()
        .take(2)
        .map(|risk| (risk.ticker.as_str(), risk.risk_score))
        .collect();
    assert_eq!(scores, [("NVDA", 1.0), ("AMD", 0.54)]);
    assert_eq!(engine.provider_id(), "yahoo");
    assert_eq!(
        run.missing_market_data.len(),
        SecurityDirectory::builtin().len() - 2
    );
}

#[tokio::test]
async fn yahoo_outage_never_aborts_an_evaluation() {
    // Given: Yahoo is down for every quote
    let provider = YahooMarketData::new(Arc::new(FakeYahoo::failing(500)), test_config());
    let engine = RiskEngine::new(
        Arc::new(RuleTable::builtin()),
        Arc::new(SecurityDirectory::builtin()),
        Arc::new(provider),
    );
    let insight = RegulationInsight::new(
        vec![String::from("windfall tax")],
        Vec::new(),
        vec![ticker("XOM")],
        "",
    );

    // When: a windfall tax naming XOM is evaluated
    let evaluation = engine.evaluate(&insight).await;

    // Then: Energy is still scored with the default systemic weight
    assert_eq!(evaluation.per_security[0].ticker.as_str(), "XOM");
    assert_eq!(evaluation.per_security[0].risk_score, 0.3);
    assert!(evaluation
        .per_security
        .iter()
        .all(|risk| risk.systemic_weight == 0.3));
}

#[tokio::test]
async fn slow_session_handshake_is_not_charged_to_each_security() {
    // Given: each handshake request takes longer than half the per-security budget
    let client = Arc::new(
        FakeYahoo::with_caps(&[("NVDA", 3.1e12), ("AMD", 2.4e11)])
            .with_slow_handshake(Duration::from_millis(150)),
    );
    let provider = YahooMarketData::new(client.clone(), test_config());
    let engine = RiskEngine::new(
        Arc::new(RuleTable::builtin()),
        Arc::new(SecurityDirectory::builtin()),
        Arc::new(provider),
    )
    .with_fetch_timeout(Duration::from_millis(200));
    let insight = RegulationInsight::new(
        vec![String::from("semiconductor")],
        Vec::new(),
        vec![ticker("NVDA")],
        "",
    );

    // When: a cold provider evaluates the insight
    let run = engine.evaluate_detailed(&insight).await;

    // Then: the handshake ran once up front and no quote fetch timed out
    assert!(run.timed_out.is_empty(), "timed out: {:?}", run.timed_out);
    assert_eq!(run.evaluation.per_security[0].ticker.as_str(), "NVDA");
    assert_eq!(run.evaluation.per_security[0].risk_score, 1.0);
    assert_eq!(client.count("session.test"), 1);
    assert_eq!(client.count("getcrumb"), 1);
}
