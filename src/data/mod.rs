// Series providers: the seam to whatever supplies daily bars
pub mod synthetic;

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;

use crate::models::{Bar, RawBar};

pub use synthetic::{MarketScenario, SyntheticDataGenerator};

/// Supplies the daily bars for a ticker.
///
/// An empty Vec means "no data available" and is reported as
/// [`EngineError::EmptyInput`](crate::EngineError::EmptyInput), never as an
/// empty recommendation.
pub trait SeriesProvider: Send + Sync {
    fn fetch(&self, ticker: &str) -> anyhow::Result<Vec<Bar>>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Reads `<dir>/<TICKER>.json`, a JSON array of bars
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    dir: PathBuf,
}

impl JsonFileProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}.json"))
    }
}

/// Parse a JSON array of bars, rejecting partial rows
pub fn parse_bars_json(content: &str) -> anyhow::Result<Vec<Bar>> {
    let rows: Vec<RawBar> = serde_json::from_str(content).context("Invalid bar JSON")?;
    let bars = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| row.into_bar(i))
        .collect::<crate::Result<Vec<_>>>()?;
    Ok(bars)
}

impl SeriesProvider for JsonFileProvider {
    fn fetch(&self, ticker: &str) -> anyhow::Result<Vec<Bar>> {
        let path = self.path_for(ticker);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let bars = parse_bars_json(&content)
            .with_context(|| format!("Failed to parse bars for {ticker}"))?;
        tracing::debug!("Loaded {} bars for {} from {}", bars.len(), ticker, path.display());

        Ok(bars)
    }

    fn name(&self) -> &str {
        "json-file"
    }
}

/// Deterministic synthetic series; each ticker gets its own seed
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    seed: u64,
    days: usize,
    start: NaiveDate,
    default_scenario: MarketScenario,
    scenarios: HashMap<String, MarketScenario>,
}

impl SyntheticProvider {
    pub fn new(seed: u64, days: usize, default_scenario: MarketScenario) -> Self {
        Self {
            seed,
            days,
            start: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap_or(NaiveDate::MIN),
            default_scenario,
            scenarios: HashMap::new(),
        }
    }

    /// Use a specific scenario for one ticker
    #[must_use]
    pub fn with_scenario(mut self, ticker: &str, scenario: MarketScenario) -> Self {
        self.scenarios.insert(ticker.to_string(), scenario);
        self
    }

    fn seed_for(&self, ticker: &str) -> u64 {
        // FNV-1a, stable across runs
        ticker.bytes().fold(self.seed ^ 0xcbf2_9ce4_8422_2325, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        })
    }
}

impl SeriesProvider for SyntheticProvider {
    fn fetch(&self, ticker: &str) -> anyhow::Result<Vec<Bar>> {
        let scenario = self
            .scenarios
            .get(ticker)
            .copied()
            .unwrap_or(self.default_scenario);

        let mut generator = SyntheticDataGenerator::new(self.seed_for(ticker));
        Ok(generator.generate(scenario, self.days, self.start))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
