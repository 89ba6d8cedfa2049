use super::{moving_average::rolling_mean, IndicatorSeries};
use crate::models::OhlcvSeries;

/// Relative Strength Index over raw values.
///
/// Average gain and loss are SIMPLE rolling means over `period` deltas, not
/// Wilder smoothing. The first delta is undefined, so the first defined RSI
/// is at index `period`.
///
/// Values:
/// - RSI > 70: Overbought
/// - RSI < 30: Oversold
/// - No losses in the window: 100
/// - No movement at all in the window: undefined (0/0)
pub fn rsi(values: &[f64], period: usize) -> Vec<f64> {
    let mut gains = Vec::with_capacity(values.len());
    let mut losses = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        let delta = if i == 0 {
            f64::NAN
        } else {
            values[i] - values[i - 1]
        };

        // f64::max would swallow the NaN
        if delta.is_nan() {
            gains.push(f64::NAN);
            losses.push(f64::NAN);
        } else {
            gains.push(delta.max(0.0));
            losses.push((-delta).max(0.0));
        }
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(gain, loss)| {
            // loss == 0 gives RS = inf and RSI = 100; 0/0 stays NaN
            let rs = gain / loss;
            100.0 - 100.0 / (1.0 + rs)
        })
        .collect()
}

/// Calculate Relative Strength Index (RSI) of closes
pub fn calculate_rsi(series: &OhlcvSeries, period: usize) -> IndicatorSeries {
    IndicatorSeries::aligned(series, rsi(&series.closes(), period))
}
