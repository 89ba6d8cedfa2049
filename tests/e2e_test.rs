use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use marketsignal::data::{MarketScenario, SeriesProvider, SyntheticDataGenerator, SyntheticProvider};
use marketsignal::*;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

/// Provider with scripted failures; everything else is a synthetic uptrend
struct ScriptedProvider {
    inner: SyntheticProvider,
    fetches: AtomicUsize,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self {
            inner: SyntheticProvider::new(7, 120, MarketScenario::Uptrend),
            fetches: AtomicUsize::new(0),
        }
    }
}

impl SeriesProvider for ScriptedProvider {
    fn fetch(&self, ticker: &str) -> anyhow::Result<Vec<Bar>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        match ticker {
            "BAD" => anyhow::bail!("upstream returned 503"),
            "EMPTY" => Ok(Vec::new()),
            "PANIC" => panic!("provider blew up"),
            _ => self.inner.fetch(ticker),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[test]
fn test_full_pipeline_uptrend() {
    let _ = tracing_subscriber::fmt::try_init();

    let bars = SyntheticDataGenerator::new(42).generate(MarketScenario::Uptrend, 250, start());
    let report = analyze_bars(bars, &AnalysisParams::default()).unwrap();

    assert!(report.warnings.is_empty());
    assert_eq!(report.summary.trading_days, 250);
    assert!(report.summary.total_return_pct > 0.0);

    let fast = report.latest.fast_ma.unwrap();
    let slow = report.latest.slow_ma.unwrap();
    assert!(fast > slow, "fast {fast} should lead slow {slow} in an uptrend");

    // Every enabled indicator is present and classified
    assert!(report.moving_averages.is_some());
    assert!(report.rsi.is_some());
    assert!(report.macd.is_some());
    assert!(report.bollinger.is_some());
    assert!(report.recommendation.signals.len() >= 3);

    let rec = &report.recommendation;
    let expected = match rec.positive_score.cmp(&rec.negative_score) {
        std::cmp::Ordering::Greater => Action::Buy,
        std::cmp::Ordering::Less => Action::Sell,
        std::cmp::Ordering::Equal => Action::Hold,
    };
    assert_eq!(rec.action, expected);
}

#[test]
fn test_reversal_ends_in_death_cross() {
    let bars = SyntheticDataGenerator::new(3).generate(MarketScenario::Reversal, 250, start());
    let report = analyze_bars(bars, &AnalysisParams::default()).unwrap();

    let last = report.crossovers.last().expect("reversal should cross");
    assert_eq!(last.kind, CrossKind::DeathCross);

    // Events are in date order and priced at the close of their day
    for pair in report.crossovers.windows(2) {
        assert!(pair[0].date < pair[1].date);
    }
    assert!(report.crossovers.iter().all(|e| e.price > 0.0));
}

#[test]
fn test_short_series_warns_and_serializes_nulls() {
    let bars = SyntheticDataGenerator::new(1).generate(MarketScenario::Sideways, 30, start());
    let report = analyze_bars(bars, &AnalysisParams::default()).unwrap();

    assert!(report
        .warnings
        .iter()
        .any(|w| w.indicator == "slow_ma" && w.required == 50 && w.available == 30));
    assert_eq!(report.latest.slow_ma, None);
    assert!(report
        .recommendation
        .signals
        .iter()
        .all(|s| s.indicator != IndicatorKind::MovingAverage));

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["moving_averages"]["slow"]["latest"].is_null());
    assert!(json["moving_averages"]["slow"]["points"][0]["value"].is_null());
}

#[test]
fn test_empty_and_unsorted_input_rejected() {
    assert_eq!(
        analyze_bars(Vec::new(), &AnalysisParams::default()).unwrap_err(),
        EngineError::EmptyInput
    );

    let mut bars = SyntheticDataGenerator::new(1).generate(MarketScenario::Flat, 5, start());
    bars.swap(1, 3);
    assert!(matches!(
        analyze_bars(bars, &AnalysisParams::default()),
        Err(EngineError::MalformedSeries { .. })
    ));
}

#[tokio::test]
async fn test_portfolio_isolates_failures() {
    let _ = tracing_subscriber::fmt::try_init();

    let provider = Arc::new(ScriptedProvider::new());
    let analyzer = PortfolioAnalyzer::new(provider, AnalysisParams::default())
        .with_max_concurrency(2);

    let tickers: Vec<String> = ["AAPL", "BAD", "EMPTY", "PANIC", "MSFT"]
        .iter()
        .map(|t| t.to_string())
        .collect();
    let results = analyzer.analyze_all(&tickers).await;

    assert_eq!(results.len(), 5);
    assert!(results["AAPL"].is_ok());
    assert!(results["MSFT"].is_ok());
    assert!(matches!(&results["BAD"], Err(TickerError::Fetch(msg)) if msg.contains("503")));
    assert_eq!(
        results["EMPTY"].as_ref().unwrap_err(),
        &TickerError::Engine(EngineError::EmptyInput)
    );
    assert!(matches!(results["PANIC"], Err(TickerError::Panicked(_))));
}

#[tokio::test]
async fn test_portfolio_cache_hits_and_expiry() {
    let provider = Arc::new(ScriptedProvider::new());
    let tickers = vec!["AAPL".to_string(), "MSFT".to_string()];

    let cached = PortfolioAnalyzer::new(provider.clone(), AnalysisParams::default())
        .with_cache(SignalCache::new(chrono::Duration::minutes(15)));

    let first = cached.analyze_all(&tickers).await;
    let second = cached.analyze_all(&tickers).await;
    assert_eq!(provider.fetches.load(Ordering::SeqCst), 2);

    // A hit hands back the very same published report
    assert!(Arc::ptr_eq(
        first["AAPL"].as_ref().unwrap(),
        second["AAPL"].as_ref().unwrap()
    ));

    // Zero TTL: every entry is already expired
    let expiring = PortfolioAnalyzer::new(provider.clone(), AnalysisParams::default())
        .with_cache(SignalCache::new(chrono::Duration::zero()));
    expiring.analyze_all(&tickers).await;
    expiring.analyze_all(&tickers).await;
    assert_eq!(provider.fetches.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn test_portfolio_results_match_single_analysis() {
    let provider = Arc::new(SyntheticProvider::new(11, 90, MarketScenario::Volatile));
    let params = AnalysisParams::default();
    let analyzer = PortfolioAnalyzer::new(provider.clone(), params.clone());

    let results = analyzer.analyze_all(&["XYZ".to_string()]).await;
    let direct = analyze_bars(provider.fetch("XYZ").unwrap(), &params).unwrap();

    assert_eq!(**results["XYZ"].as_ref().unwrap(), direct);
}
