// Technical indicators module
// Implements SMA, adjusted EWM, MACD, RSI and Bollinger Bands over daily closes

pub mod bollinger;
pub mod ewm;
pub mod macd;
pub mod moving_average;
pub mod rsi;
pub mod series;

pub use bollinger::{calculate_bollinger, BollingerBands};
pub use ewm::calculate_ewm;
pub use macd::{calculate_macd, Macd};
pub use moving_average::{calculate_sma, rolling_mean, rolling_std};
pub use rsi::calculate_rsi;
pub use series::IndicatorSeries;

#[cfg(test)]
pub(crate) fn test_series(closes: &[f64]) -> crate::models::OhlcvSeries {
    use crate::models::{Bar, OhlcvSeries};
    use chrono::NaiveDate;

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        })
        .collect();
    OhlcvSeries::new(bars).unwrap()
}
