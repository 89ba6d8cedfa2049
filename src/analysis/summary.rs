use serde::Serialize;

use crate::indicators::rolling_std;
use crate::models::OhlcvSeries;

/// Headline statistics shown next to the indicators
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MarketSummary {
    pub latest_close: f64,
    /// Day-over-day change of the close, 0 with a single bar
    pub change_pct: f64,
    pub period_high: f64,
    pub period_low: f64,
    pub trading_days: usize,
    /// Sample std-dev of daily close returns, in percent
    pub volatility_pct: Option<f64>,
    pub total_return_pct: f64,
}

impl MarketSummary {
    pub fn from_series(series: &OhlcvSeries) -> Self {
        let closes = series.closes();
        let bars = series.bars();

        let latest_close = closes[closes.len() - 1];
        let previous_close = if closes.len() > 1 {
            closes[closes.len() - 2]
        } else {
            latest_close
        };

        let returns: Vec<f64> = closes.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        let volatility_pct = rolling_std(&returns, returns.len())
            .last()
            .copied()
            .filter(|v| !v.is_nan())
            .map(|v| v * 100.0);

        Self {
            latest_close,
            change_pct: (latest_close - previous_close) / previous_close * 100.0,
            period_high: bars.iter().map(|b| b.high).fold(f64::MIN, f64::max),
            period_low: bars.iter().map(|b| b.low).fold(f64::MAX, f64::min),
            trading_days: bars.len(),
            volatility_pct,
            total_return_pct: (latest_close / closes[0] - 1.0) * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Bar;
    use chrono::NaiveDate;

    fn bar(day: u32, low: f64, high: f64, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 500.0,
        }
    }

    #[test]
    fn test_summary() {
        let series = OhlcvSeries::new(vec![
            bar(1, 95.0, 105.0, 100.0),
            bar(2, 98.0, 112.0, 110.0),
            bar(5, 97.0, 111.0, 99.0),
        ])
        .unwrap();

        let summary = MarketSummary::from_series(&series);

        assert_eq!(summary.latest_close, 99.0);
        assert!((summary.change_pct - (-10.0)).abs() < 1e-9);
        assert_eq!(summary.period_high, 112.0);
        assert_eq!(summary.period_low, 95.0);
        assert_eq!(summary.trading_days, 3);
        assert!((summary.total_return_pct - (-1.0)).abs() < 1e-9);

        // Returns +10% and -10%: sample std = sqrt(0.02) ~ 14.14%
        let vol = summary.volatility_pct.unwrap();
        assert!((vol - 0.02_f64.sqrt() * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_single_bar() {
        let series = OhlcvSeries::new(vec![bar(1, 95.0, 105.0, 100.0)]).unwrap();
        let summary = MarketSummary::from_series(&series);

        assert_eq!(summary.change_pct, 0.0);
        assert_eq!(summary.total_return_pct, 0.0);
        assert_eq!(summary.volatility_pct, None);
    }

    #[test]
    fn test_summary_two_bars_no_volatility() {
        let series =
            OhlcvSeries::new(vec![bar(1, 95.0, 105.0, 100.0), bar(2, 95.0, 105.0, 101.0)])
                .unwrap();

        assert_eq!(MarketSummary::from_series(&series).volatility_pct, None);
    }
}
