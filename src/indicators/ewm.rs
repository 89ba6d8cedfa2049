use super::IndicatorSeries;
use crate::models::OhlcvSeries;

/// Bias-corrected (adjusted) exponentially weighted mean.
///
/// With `alpha = 2 / (span + 1)` the value at `t` is
/// `sum((1 - alpha)^i * x[t - i]) / sum((1 - alpha)^i)` over all observations
/// up to `t`, so it is defined from the first observation on with no seed.
/// This differs from the recursive `alpha * x + (1 - alpha) * prev` form in
/// the early part of the series.
///
/// Leading NaNs stay NaN. A NaN after the first observation is NaN at its own
/// position, but the weights of earlier observations still decay across it.
pub fn ewm(values: &[f64], span: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if span == 0 {
        return out;
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let decay = 1.0 - alpha;

    // Running weighted sum and weight total
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    let mut started = false;

    for (i, &x) in values.iter().enumerate() {
        if x.is_nan() {
            if started {
                numerator *= decay;
                denominator *= decay;
            }
            continue;
        }

        numerator = x + decay * numerator;
        denominator = 1.0 + decay * denominator;
        started = true;
        out[i] = numerator / denominator;
    }

    out
}

/// Calculate the adjusted exponentially weighted mean of closes
pub fn calculate_ewm(series: &OhlcvSeries, span: usize) -> IndicatorSeries {
    IndicatorSeries::aligned(series, ewm(&series.closes(), span))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_series;

    /// Direct evaluation of the adjusted weighting formula
    fn adjusted_reference(values: &[f64], span: usize, t: usize) -> f64 {
        let decay = 1.0 - 2.0 / (span as f64 + 1.0);
        let mut num = 0.0;
        let mut den = 0.0;
        for i in 0..=t {
            let w = decay.powi(i as i32);
            num += w * values[t - i];
            den += w;
        }
        num / den
    }

    #[test]
    fn test_ewm_first_value_is_observation() {
        let values = vec![10.0, 11.0, 12.0, 13.0, 14.0];
        let out = ewm(&values, 3);

        assert_eq!(out[0], 10.0);
    }

    #[test]
    fn test_ewm_adjusted_second_value() {
        let values = vec![10.0, 11.0, 12.0, 13.0, 14.0];
        let out = ewm(&values, 3);

        // alpha = 0.5: (10 * 0.5 + 11 * 1) / (0.5 + 1)
        let expected = (10.0 * 0.5 + 11.0) / 1.5;
        assert!((out[1] - expected).abs() < 1e-12);
        assert!((out[1] - 10.667).abs() < 1e-3);

        // Recursive EMA seeded at the first value would give 10.5
        assert!((out[1] - 10.5).abs() > 0.1);
    }

    #[test]
    fn test_ewm_matches_reference_formula() {
        let values: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.3).cos() * 4.0).collect();
        let out = ewm(&values, 12);

        for t in 0..values.len() {
            assert!((out[t] - adjusted_reference(&values, 12, t)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ewm_span_one_is_identity() {
        let values = vec![3.0, 7.0, 1.0];
        assert_eq!(ewm(&values, 1), values);
    }

    #[test]
    fn test_ewm_leading_undefined() {
        let values = vec![f64::NAN, f64::NAN, 10.0, 11.0];
        let out = ewm(&values, 3);

        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert_eq!(out[2], 10.0);
        assert!((out[3] - (10.0 * 0.5 + 11.0) / 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_ewm_gap_decays_weights() {
        let values = vec![10.0, f64::NAN, 11.0];
        let out = ewm(&values, 3);

        assert!(out[1].is_nan());
        // The observation two steps back carries weight 0.25
        assert!((out[2] - (10.0 * 0.25 + 11.0) / 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_ewm_span_zero_undefined() {
        assert!(ewm(&[1.0, 2.0], 0).iter().all(|v| v.is_nan()));
    }

    #[test]
    fn test_calculate_ewm_fully_defined() {
        let series = test_series(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let out = calculate_ewm(&series, 26);

        assert_eq!(out.defined_count(), 5);
        assert_eq!(out.get(0), Some(10.0));
    }
}
