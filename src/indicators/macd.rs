use serde::Serialize;

use super::{ewm, IndicatorSeries};
use crate::models::OhlcvSeries;

/// MACD line, its signal line and the histogram between them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Macd {
    pub line: IndicatorSeries,
    pub signal: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

/// Calculate MACD from adjusted EWMs of closes.
///
/// `line = ewm(close, fast) - ewm(close, slow)`, `signal = ewm(line, signal)`,
/// `histogram = line - signal`. All three are defined from the first bar.
pub fn calculate_macd(series: &OhlcvSeries, fast: usize, slow: usize, signal: usize) -> Macd {
    let closes = series.closes();
    let fast_ewm = ewm::ewm(&closes, fast);
    let slow_ewm = ewm::ewm(&closes, slow);

    let line: Vec<f64> = fast_ewm
        .iter()
        .zip(&slow_ewm)
        .map(|(f, s)| f - s)
        .collect();
    let signal_values = ewm::ewm(&line, signal);

    let line = IndicatorSeries::aligned(series, line);
    let signal = IndicatorSeries::aligned(series, signal_values);
    let histogram = line.zip_with(&signal, |l, s| l - s);

    Macd {
        line,
        signal,
        histogram,
    }
}
