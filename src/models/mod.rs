use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::validation::SeriesValidator;
use crate::{EngineError, Result};

/// One trading day of OHLCV data
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Bar as delivered by a provider, before completeness is checked
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawBar {
    pub date: Option<NaiveDate>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl RawBar {
    /// Convert into a complete [`Bar`]; `index` is only used for error reporting.
    pub fn into_bar(self, index: usize) -> Result<Bar> {
        let missing = |field: &str| EngineError::malformed(index, format!("missing {field}"));

        Ok(Bar {
            date: self.date.ok_or_else(|| missing("date"))?,
            open: self.open.ok_or_else(|| missing("open"))?,
            high: self.high.ok_or_else(|| missing("high"))?,
            low: self.low.ok_or_else(|| missing("low"))?,
            close: self.close.ok_or_else(|| missing("close"))?,
            volume: self.volume.ok_or_else(|| missing("volume"))?,
        })
    }
}

impl From<Bar> for RawBar {
    fn from(bar: Bar) -> Self {
        Self {
            date: Some(bar.date),
            open: Some(bar.open),
            high: Some(bar.high),
            low: Some(bar.low),
            close: Some(bar.close),
            volume: Some(bar.volume),
        }
    }
}

/// Validated daily series: non-empty, strictly ascending dates, complete bars.
///
/// The only way to obtain one is [`OhlcvSeries::new`], so every engine
/// function can rely on these invariants.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OhlcvSeries {
    bars: Vec<Bar>,
}

impl OhlcvSeries {
    pub fn new(bars: Vec<Bar>) -> Result<Self> {
        SeriesValidator::new().validate(&bars)?;
        Ok(Self { bars })
    }

    /// Build from provider rows, rejecting partial bars.
    pub fn from_raw(rows: Vec<RawBar>) -> Result<Self> {
        let bars = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| row.into_bar(i))
            .collect::<Result<Vec<_>>>()?;
        Self::new(bars)
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn latest(&self) -> &Bar {
        // Non-empty by construction
        &self.bars[self.bars.len() - 1]
    }
}

/// Final trading recommendation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

/// Reading of a single indicator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    Bullish,
    Bearish,
    /// A neutral state with non-zero weight is a split signal and counts
    /// towards both scores.
    Neutral,
}

/// Indicators that can take part in the recommendation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    MovingAverage,
    Rsi,
    Macd,
    Bollinger,
}

impl IndicatorKind {
    pub const ALL: [IndicatorKind; 4] = [
        IndicatorKind::MovingAverage,
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::Bollinger,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IndicatorKind::MovingAverage => "moving_average",
            IndicatorKind::Rsi => "rsi",
            IndicatorKind::Macd => "macd",
            IndicatorKind::Bollinger => "bollinger",
        }
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Classified state of one enabled indicator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignalState {
    pub indicator: IndicatorKind,
    pub direction: Direction,
    pub weight: u32,
}

impl SignalState {
    pub fn new(indicator: IndicatorKind, direction: Direction, weight: u32) -> Self {
        Self {
            indicator,
            direction,
            weight,
        }
    }

    /// (positive, negative) contribution of this state
    pub fn contribution(&self) -> (u32, u32) {
        match self.direction {
            Direction::Bullish => (self.weight, 0),
            Direction::Bearish => (0, self.weight),
            Direction::Neutral => (self.weight, self.weight),
        }
    }
}

/// Aggregated recommendation with its score breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub action: Action,
    pub positive_score: u32,
    pub negative_score: u32,
    pub signals: Vec<SignalState>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CrossKind {
    GoldenCross,
    DeathCross,
}

/// Fast/slow moving-average crossing
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CrossoverEvent {
    pub date: NaiveDate,
    pub kind: CrossKind,
    pub price: f64,
}

/// Series shorter than an indicator's lookback window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryWarning {
    pub indicator: String,
    pub required: usize,
    pub available: usize,
}

impl std::fmt::Display for HistoryWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} needs {} bars, only {} available",
            self.indicator, self.required, self.available
        )
    }
}
