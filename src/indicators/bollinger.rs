use serde::Serialize;

use super::moving_average::{rolling_mean, rolling_std};
use super::IndicatorSeries;
use crate::models::OhlcvSeries;

/// Volatility envelope around a rolling mean
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerBands {
    pub middle: IndicatorSeries,
    pub upper: IndicatorSeries,
    pub lower: IndicatorSeries,
}

/// Calculate Bollinger Bands: rolling mean +/- `k` rolling sample std-devs
pub fn calculate_bollinger(series: &OhlcvSeries, period: usize, k: f64) -> BollingerBands {
    let closes = series.closes();
    let middle = rolling_mean(&closes, period);
    let std = rolling_std(&closes, period);

    let upper = middle.iter().zip(&std).map(|(m, s)| m + k * s).collect();
    let lower = middle.iter().zip(&std).map(|(m, s)| m - k * s).collect();

    BollingerBands {
        middle: IndicatorSeries::aligned(series, middle),
        upper: IndicatorSeries::aligned(series, upper),
        lower: IndicatorSeries::aligned(series, lower),
    }
}
