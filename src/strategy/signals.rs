use serde::{Deserialize, Serialize};

use crate::models::{Action, Direction, IndicatorKind, Recommendation, SignalState};

/// Configuration for signal classification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignalConfig {
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
        }
    }
}

/// Indicators that take part in the recommendation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct EnabledIndicators {
    pub moving_average: bool,
    pub rsi: bool,
    pub macd: bool,
    pub bollinger: bool,
}

impl Default for EnabledIndicators {
    fn default() -> Self {
        Self::all()
    }
}

impl EnabledIndicators {
    pub fn all() -> Self {
        Self {
            moving_average: true,
            rsi: true,
            macd: true,
            bollinger: true,
        }
    }

    pub fn none() -> Self {
        Self {
            moving_average: false,
            rsi: false,
            macd: false,
            bollinger: false,
        }
    }

    pub fn only(kind: IndicatorKind) -> Self {
        Self::none().with(kind, true)
    }

    #[must_use]
    pub fn with(mut self, kind: IndicatorKind, enabled: bool) -> Self {
        match kind {
            IndicatorKind::MovingAverage => self.moving_average = enabled,
            IndicatorKind::Rsi => self.rsi = enabled,
            IndicatorKind::Macd => self.macd = enabled,
            IndicatorKind::Bollinger => self.bollinger = enabled,
        }
        self
    }

    pub fn is_enabled(&self, kind: IndicatorKind) -> bool {
        match kind {
            IndicatorKind::MovingAverage => self.moving_average,
            IndicatorKind::Rsi => self.rsi,
            IndicatorKind::Macd => self.macd,
            IndicatorKind::Bollinger => self.bollinger,
        }
    }
}

/// Latest value of every indicator input; `None` when undefined or not computed
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct LatestValues {
    pub price: Option<f64>,
    pub fast_ma: Option<f64>,
    pub slow_ma: Option<f64>,
    pub rsi: Option<f64>,
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub upper_band: Option<f64>,
    pub lower_band: Option<f64>,
}

/// Moving averages: trend alignment of price, fast and slow MA
pub fn classify_moving_average(price: f64, fast_ma: f64, slow_ma: f64) -> SignalState {
    let (direction, weight) = if price > fast_ma && fast_ma > slow_ma {
        (Direction::Bullish, 2)
    } else if price < fast_ma && fast_ma < slow_ma {
        (Direction::Bearish, 2)
    } else {
        // Mixed: counts once on each side
        (Direction::Neutral, 1)
    };
    SignalState::new(IndicatorKind::MovingAverage, direction, weight)
}

/// RSI: overbought is bearish, oversold is bullish
pub fn classify_rsi(rsi: f64, config: &SignalConfig) -> SignalState {
    let (direction, weight) = if rsi > config.rsi_overbought {
        (Direction::Bearish, 1)
    } else if rsi < config.rsi_oversold {
        (Direction::Bullish, 1)
    } else {
        (Direction::Neutral, 0)
    };
    SignalState::new(IndicatorKind::Rsi, direction, weight)
}

/// MACD: line above signal is bullish, anything else bearish
pub fn classify_macd(line: f64, signal: f64) -> SignalState {
    let direction = if line > signal {
        Direction::Bullish
    } else {
        Direction::Bearish
    };
    SignalState::new(IndicatorKind::Macd, direction, 1)
}

/// Bollinger: above the upper band is bearish, below the lower band bullish
pub fn classify_bollinger(price: f64, upper: f64, lower: f64) -> SignalState {
    let (direction, weight) = if price > upper {
        (Direction::Bearish, 1)
    } else if price < lower {
        (Direction::Bullish, 1)
    } else {
        (Direction::Neutral, 0)
    };
    SignalState::new(IndicatorKind::Bollinger, direction, weight)
}

/// Classifies indicator states and scores them into a recommendation.
///
/// Pure: the result depends only on the enabled set and the latest values.
/// Disabled indicators, and enabled ones with an undefined input, contribute
/// no state at all.
#[derive(Debug, Clone, Default)]
pub struct SignalAggregator {
    config: SignalConfig,
}

impl SignalAggregator {
    pub fn new(config: SignalConfig) -> Self {
        Self { config }
    }

    pub fn aggregate(&self, enabled: &EnabledIndicators, latest: &LatestValues) -> Recommendation {
        let signals: Vec<SignalState> = IndicatorKind::ALL
            .iter()
            .filter(|kind| enabled.is_enabled(**kind))
            .filter_map(|kind| self.classify(*kind, latest))
            .collect();

        let (positive_score, negative_score) = signals
            .iter()
            .map(SignalState::contribution)
            .fold((0, 0), |(p, n), (dp, dn)| (p + dp, n + dn));

        let action = match positive_score.cmp(&negative_score) {
            std::cmp::Ordering::Greater => Action::Buy,
            std::cmp::Ordering::Less => Action::Sell,
            std::cmp::Ordering::Equal => Action::Hold,
        };

        tracing::debug!(
            "Aggregated {} signals: +{} / -{} -> {:?}",
            signals.len(),
            positive_score,
            negative_score,
            action
        );

        Recommendation {
            action,
            positive_score,
            negative_score,
            signals,
        }
    }

    fn classify(&self, kind: IndicatorKind, latest: &LatestValues) -> Option<SignalState> {
        let state = match kind {
            IndicatorKind::MovingAverage => {
                classify_moving_average(latest.price?, latest.fast_ma?, latest.slow_ma?)
            }
            IndicatorKind::Rsi => classify_rsi(latest.rsi?, &self.config),
            IndicatorKind::Macd => classify_macd(latest.macd_line?, latest.macd_signal?),
            IndicatorKind::Bollinger => {
                classify_bollinger(latest.price?, latest.upper_band?, latest.lower_band?)
            }
        };
        Some(state)
    }
}

/// Aggregate with the default RSI thresholds (70/30)
pub fn aggregate(enabled: &EnabledIndicators, latest: &LatestValues) -> Recommendation {
    SignalAggregator::default().aggregate(enabled, latest)
}
