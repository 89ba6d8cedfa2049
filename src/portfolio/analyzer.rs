use std::collections::{BTreeSet, HashMap};
use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{Quota, RateLimiter};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinSet};

use super::SignalCache;
use crate::analysis::{analyze_bars, AnalysisParams, AnalysisReport};
use crate::data::SeriesProvider;
use crate::EngineError;

// Type alias for the rate limiter to simplify signatures
type ProviderRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Failure of one ticker in a portfolio run; siblings are unaffected
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TickerError {
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Analysis task panicked: {0}")]
    Panicked(String),
}

/// Per-ticker outcome of a portfolio run, in no particular order
pub type PortfolioResults = HashMap<String, Result<Arc<AnalysisReport>, TickerError>>;

type TickerResult = Result<Arc<AnalysisReport>, TickerError>;

/// Fans one analysis per ticker out over a bounded set of tokio tasks
///
/// This struct is cloneable to allow sharing across async tasks.
/// All clones share the same cache and rate limiter.
#[derive(Clone)]
pub struct PortfolioAnalyzer {
    provider: Arc<dyn SeriesProvider>,
    params: AnalysisParams,
    max_concurrency: usize,
    cache: Option<SignalCache>,
    rate_limiter: Option<Arc<ProviderRateLimiter>>,
}

impl PortfolioAnalyzer {
    pub fn new(provider: Arc<dyn SeriesProvider>, params: AnalysisParams) -> Self {
        Self {
            provider,
            params,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            cache: None,
            rate_limiter: None,
        }
    }

    /// At most `max_concurrency` tickers are fetched/analysed at once (minimum 1)
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: SignalCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Throttle provider fetches; 0 disables throttling
    #[must_use]
    pub fn with_rate_limit(mut self, requests_per_minute: u32) -> Self {
        self.rate_limiter = NonZeroU32::new(requests_per_minute)
            .map(|rpm| Arc::new(RateLimiter::direct(Quota::per_minute(rpm))));
        self
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    /// Analyse every ticker; duplicates are analysed once
    pub async fn analyze_all(&self, tickers: &[String]) -> PortfolioResults {
        let unique: BTreeSet<&String> = tickers.iter().collect();
        tracing::info!(
            "Analyzing {} tickers via {} (max {} concurrent)",
            unique.len(),
            self.provider.name(),
            self.max_concurrency
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();
        // Failed joins carry only the task id
        let mut task_tickers = HashMap::new();

        for ticker in unique {
            let analyzer = self.clone();
            let semaphore = semaphore.clone();
            let owned_ticker = ticker.clone();

            let handle = tasks.spawn(async move {
                // The semaphore is never closed
                let _permit = semaphore.acquire_owned().await.ok();
                analyzer.analyze_ticker(&owned_ticker).await
            });
            task_tickers.insert(handle.id(), ticker.clone());
        }

        join_tagged(tasks, task_tickers).await
    }

    /// Analyse one ticker, going through the cache and rate limiter
    pub async fn analyze_ticker(&self, ticker: &str) -> Result<Arc<AnalysisReport>, TickerError> {
        if let Some(cache) = &self.cache {
            match cache.get(ticker, &self.params) {
                Ok(Some(report)) => {
                    tracing::debug!("Cache hit for {}", ticker);
                    return Ok(report);
                }
                Ok(None) => tracing::debug!("Cache miss for {}", ticker),
                Err(e) => tracing::warn!("Cache read failed for {}: {}", ticker, e),
            }
        }

        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let provider = self.provider.clone();
        let params = self.params.clone();
        let owned_ticker = ticker.to_string();

        let report = tokio::task::spawn_blocking(move || -> Result<AnalysisReport, TickerError> {
            let bars = provider
                .fetch(&owned_ticker)
                .map_err(|e| TickerError::Fetch(format!("{e:#}")))?;
            Ok(analyze_bars(bars, &params)?)
        })
        .await
        .map_err(|e| TickerError::Panicked(e.to_string()))??;

        let report = Arc::new(report);
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.insert(ticker, &self.params, report.clone()) {
                tracing::warn!("Cache write failed for {}: {}", ticker, e);
            }
        }

        Ok(report)
    }
}

/// Collect every task result under its ticker; a failed join becomes `Panicked`
async fn join_tagged(
    mut tasks: JoinSet<TickerResult>,
    mut task_tickers: HashMap<Id, String>,
) -> PortfolioResults {
    let mut results = HashMap::new();
    while let Some(joined) = tasks.join_next_with_id().await {
        let (id, result) = match joined {
            Ok((id, result)) => (id, result),
            Err(e) => (e.id(), Err(TickerError::Panicked(e.to_string()))),
        };
        let Some(ticker) = task_tickers.remove(&id) else {
            tracing::error!("Portfolio task {} finished without a ticker", id);
            continue;
        };

        match &result {
            Ok(report) => tracing::info!(
                "✓ {}: {:?} (+{} / -{})",
                ticker,
                report.recommendation.action,
                report.recommendation.positive_score,
                report.recommendation.negative_score
            ),
            Err(e) => tracing::warn!("✗ {}: {}", ticker, e),
        }
        results.insert(ticker, result);
    }

    results
}
