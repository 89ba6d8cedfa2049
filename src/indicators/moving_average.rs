use super::IndicatorSeries;
use crate::models::OhlcvSeries;

/// Rolling arithmetic mean over a trailing window.
///
/// Index `i` is defined iff `i >= window - 1` and every value in the window
/// is defined; otherwise it is NaN. A zero or oversized window leaves the
/// whole output undefined.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 || window > values.len() {
        return out;
    }

    for (i, slice) in values.windows(window).enumerate() {
        // A NaN anywhere in the window makes the sum NaN
        out[i + window - 1] = slice.iter().sum::<f64>() / window as f64;
    }

    out
}

/// Rolling sample standard deviation (denominator `n - 1`).
///
/// Same definedness as [`rolling_mean`]; a window of 1 is always undefined.
pub fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 || window > values.len() {
        return out;
    }

    for (i, slice) in values.windows(window).enumerate() {
        let mean = slice.iter().sum::<f64>() / window as f64;
        let sum_sq: f64 = slice.iter().map(|x| (x - mean).powi(2)).sum();
        out[i + window - 1] = (sum_sq / (window as f64 - 1.0)).sqrt();
    }

    out
}

/// Calculate Simple Moving Average (SMA) of closes
pub fn calculate_sma(series: &OhlcvSeries, window: usize) -> IndicatorSeries {
    IndicatorSeries::aligned(series, rolling_mean(&series.closes(), window))
}
