use crate::indicators::IndicatorSeries;
use crate::models::{CrossKind, CrossoverEvent, OhlcvSeries};

/// Detect Golden/Death crosses between a fast and a slow moving average.
///
/// Only dates where both averages are defined take part; consecutive points
/// of that clean range are compared pairwise:
/// - Golden cross at `curr` iff `prev.fast <= prev.slow` and `curr.fast > curr.slow`
/// - Death cross at `curr` iff `prev.fast >= prev.slow` and `curr.fast < curr.slow`
///
/// The event price is the close of `series` at the crossing date. Events are
/// returned in ascending date order.
pub fn detect_crossovers(
    series: &OhlcvSeries,
    fast: &IndicatorSeries,
    slow: &IndicatorSeries,
) -> Vec<CrossoverEvent> {
    debug_assert_eq!(fast.len(), series.len());
    debug_assert_eq!(slow.len(), series.len());

    let clean: Vec<(usize, f64, f64)> = (0..series.len())
        .filter_map(|i| Some((i, fast.get(i)?, slow.get(i)?)))
        .collect();

    if clean.len() < 2 {
        return Vec::new();
    }

    let bars = series.bars();
    let mut events = Vec::new();

    for pair in clean.windows(2) {
        let (_, prev_fast, prev_slow) = pair[0];
        let (index, curr_fast, curr_slow) = pair[1];

        let kind = if prev_fast <= prev_slow && curr_fast > curr_slow {
            CrossKind::GoldenCross
        } else if prev_fast >= prev_slow && curr_fast < curr_slow {
            CrossKind::DeathCross
        } else {
            continue;
        };

        let bar = &bars[index];
        tracing::debug!("{:?} on {} at {:.2}", kind, bar.date, bar.close);
        events.push(CrossoverEvent {
            date: bar.date,
            kind,
            price: bar.close,
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{calculate_sma, test_series};

    fn ma(series: &OhlcvSeries, values: Vec<f64>) -> IndicatorSeries {
        IndicatorSeries::new(series.dates(), values).unwrap()
    }

    #[test]
    fn test_single_golden_cross() {
        let series = test_series(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let fast = ma(&series, vec![f64::NAN, 8.0, 9.0, 10.5, 12.0, 13.0]);
        let slow = ma(&series, vec![f64::NAN, 10.0, 10.0, 10.0, 10.0, 10.0]);

        let events = detect_crossovers(&series, &fast, &slow);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, CrossKind::GoldenCross);
        assert_eq!(events[0].date, series.bars()[3].date);
        assert_eq!(events[0].price, 13.0);
    }

    #[test]
    fn test_death_cross() {
        let series = test_series(&[20.0, 19.0, 18.0, 17.0]);
        let fast = ma(&series, vec![12.0, 11.0, 9.0, 8.0]);
        let slow = ma(&series, vec![10.0, 10.0, 10.0, 10.0]);

        let events = detect_crossovers(&series, &fast, &slow);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, CrossKind::DeathCross);
        assert_eq!(events[0].date, series.bars()[2].date);
    }

    #[test]
    fn test_touch_then_rise_counts() {
        // Fast equals slow, then rises above: non-strict previous comparison
        let series = test_series(&[1.0, 2.0, 3.0]);
        let fast = ma(&series, vec![9.0, 10.0, 11.0]);
        let slow = ma(&series, vec![10.0, 10.0, 10.0]);

        let events = detect_crossovers(&series, &fast, &slow);

        // 9 -> 10 is not a cross (10 is not > 10), 10 -> 11 is
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, CrossKind::GoldenCross);
        assert_eq!(events[0].date, series.bars()[2].date);
    }

    #[test]
    fn test_equal_lines_no_event() {
        let series = test_series(&[1.0, 2.0, 3.0]);
        let flat = ma(&series, vec![10.0, 10.0, 10.0]);

        assert!(detect_crossovers(&series, &flat, &flat).is_empty());
    }

    #[test]
    fn test_requires_two_clean_points() {
        let series = test_series(&[1.0, 2.0, 3.0]);
        let fast = ma(&series, vec![f64::NAN, f64::NAN, 12.0]);
        let slow = ma(&series, vec![10.0, 10.0, 10.0]);

        assert!(detect_crossovers(&series, &fast, &slow).is_empty());
    }

    #[test]
    fn test_alternating_crosses_ordered() {
        let series = test_series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let fast = ma(&series, vec![9.0, 11.0, 9.0, 11.0, 12.0]);
        let slow = ma(&series, vec![10.0; 5]);

        let kinds: Vec<CrossKind> = detect_crossovers(&series, &fast, &slow)
            .into_iter()
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                CrossKind::GoldenCross,
                CrossKind::DeathCross,
                CrossKind::GoldenCross
            ]
        );
    }

    #[test]
    fn test_crossovers_from_real_moving_averages() {
        // Decline then recovery: the 3-day MA dips below the 6-day MA, then crosses back
        let mut closes: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        closes.extend((0..15).map(|i| 86.0 + i as f64 * 2.0));
        let series = test_series(&closes);

        let fast = calculate_sma(&series, 3);
        let slow = calculate_sma(&series, 6);
        let events = detect_crossovers(&series, &fast, &slow);

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, CrossKind::GoldenCross);
        assert!(events[0].date > series.bars()[15].date);
    }
}
