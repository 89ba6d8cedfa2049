use serde::{Deserialize, Serialize};

use crate::strategy::{EnabledIndicators, SignalConfig};
use crate::{EngineError, Result};

/// Window sizes, thresholds and enabled indicators for one analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisParams {
    pub fast_ma: usize,
    pub slow_ma: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_k: f64,
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    pub enabled: EnabledIndicators,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            fast_ma: 20,
            slow_ma: 50,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_k: 2.0,
            rsi_overbought: 70.0,
            rsi_oversold: 30.0,
            enabled: EnabledIndicators::all(),
        }
    }
}

impl AnalysisParams {
    /// Classic 50/200-day Golden/Death Cross windows
    pub fn golden_cross() -> Self {
        Self {
            fast_ma: 50,
            slow_ma: 200,
            ..Self::default()
        }
    }

    pub fn signal_config(&self) -> SignalConfig {
        SignalConfig {
            rsi_overbought: self.rsi_overbought,
            rsi_oversold: self.rsi_oversold,
        }
    }

    /// Reject parameter sets that cannot produce meaningful indicators
    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("fast_ma", self.fast_ma),
            ("slow_ma", self.slow_ma),
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
        ];
        for (name, window) in windows {
            if window == 0 {
                return Err(EngineError::invalid(name, "must be at least 1"));
            }
        }

        if self.fast_ma >= self.slow_ma {
            return Err(EngineError::invalid(
                "fast_ma",
                format!("{} must be below slow_ma {}", self.fast_ma, self.slow_ma),
            ));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(EngineError::invalid(
                "macd_fast",
                format!("{} must be below macd_slow {}", self.macd_fast, self.macd_slow),
            ));
        }
        if self.bollinger_period < 2 {
            return Err(EngineError::invalid(
                "bollinger_period",
                "sample standard deviation needs at least 2 bars",
            ));
        }
        if !self.bollinger_k.is_finite() || self.bollinger_k <= 0.0 {
            return Err(EngineError::invalid(
                "bollinger_k",
                format!("{} is not a positive number", self.bollinger_k),
            ));
        }
        if !(0.0..=100.0).contains(&self.rsi_oversold)
            || !(0.0..=100.0).contains(&self.rsi_overbought)
            || self.rsi_oversold >= self.rsi_overbought
        {
            return Err(EngineError::invalid(
                "rsi_overbought",
                format!(
                    "thresholds {}/{} must satisfy 0 <= oversold < overbought <= 100",
                    self.rsi_oversold, self.rsi_overbought
                ),
            ));
        }

        Ok(())
    }

    /// Stable textual identity of this parameter set, used as a cache key
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}
