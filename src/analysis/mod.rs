// Analysis pipeline: validated series in, structured report out
pub mod params;
pub mod summary;

use chrono::NaiveDate;
use serde::Serialize;

use crate::indicators::{
    calculate_bollinger, calculate_macd, calculate_rsi, calculate_sma, BollingerBands,
    IndicatorSeries, Macd,
};
use crate::models::{Bar, CrossoverEvent, HistoryWarning, OhlcvSeries, Recommendation};
use crate::strategy::{detect_crossovers, LatestValues, SignalAggregator};
use crate::Result;

pub use params::AnalysisParams;
pub use summary::MarketSummary;

/// Fast and slow simple moving averages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovingAverages {
    pub fast_window: usize,
    pub slow_window: usize,
    pub fast: IndicatorSeries,
    pub slow: IndicatorSeries,
}

/// Everything a presentation layer needs, without further numeric work.
///
/// Disabled indicators are `None` and are not computed at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub latest_date: NaiveDate,
    pub latest_close: f64,
    pub moving_averages: Option<MovingAverages>,
    pub rsi: Option<IndicatorSeries>,
    pub macd: Option<Macd>,
    pub bollinger: Option<BollingerBands>,
    pub crossovers: Vec<CrossoverEvent>,
    pub latest: LatestValues,
    pub recommendation: Recommendation,
    pub summary: MarketSummary,
    pub warnings: Vec<HistoryWarning>,
}

/// Validate raw bars and analyse them
pub fn analyze_bars(bars: Vec<Bar>, params: &AnalysisParams) -> Result<AnalysisReport> {
    let series = OhlcvSeries::new(bars)?;
    analyze(&series, params)
}

/// Compute every enabled indicator, the crossovers and the recommendation.
///
/// Fails only on invalid parameters. A series shorter than some window still
/// yields a report; the affected indicators are undefined, a warning is
/// attached and the aggregator skips them.
pub fn analyze(series: &OhlcvSeries, params: &AnalysisParams) -> Result<AnalysisReport> {
    params.validate()?;

    let enabled = params.enabled;
    let latest_bar = *series.latest();
    let mut warnings = Vec::new();
    let mut latest = LatestValues {
        price: Some(latest_bar.close),
        ..Default::default()
    };

    let moving_averages = enabled.moving_average.then(|| {
        check_history(&mut warnings, "fast_ma", params.fast_ma, series.len());
        check_history(&mut warnings, "slow_ma", params.slow_ma, series.len());

        let fast = calculate_sma(series, params.fast_ma);
        let slow = calculate_sma(series, params.slow_ma);
        latest.fast_ma = fast.latest();
        latest.slow_ma = slow.latest();

        MovingAverages {
            fast_window: params.fast_ma,
            slow_window: params.slow_ma,
            fast,
            slow,
        }
    });

    let rsi = enabled.rsi.then(|| {
        // One extra bar: the first delta is undefined
        check_history(&mut warnings, "rsi", params.rsi_period + 1, series.len());

        let rsi = calculate_rsi(series, params.rsi_period);
        latest.rsi = rsi.latest();
        rsi
    });

    let macd = enabled.macd.then(|| {
        let macd = calculate_macd(series, params.macd_fast, params.macd_slow, params.macd_signal);
        latest.macd_line = macd.line.latest();
        latest.macd_signal = macd.signal.latest();
        macd
    });

    let bollinger = enabled.bollinger.then(|| {
        check_history(
            &mut warnings,
            "bollinger",
            params.bollinger_period,
            series.len(),
        );

        let bands = calculate_bollinger(series, params.bollinger_period, params.bollinger_k);
        latest.upper_band = bands.upper.latest();
        latest.lower_band = bands.lower.latest();
        bands
    });

    let crossovers = moving_averages
        .as_ref()
        .map(|ma| detect_crossovers(series, &ma.fast, &ma.slow))
        .unwrap_or_default();

    tracing::debug!(
        "Indicators on {}: Price={:.2}, Fast MA={:?}, Slow MA={:?}, RSI={:?}, MACD={:?}/{:?}, Bands={:?}/{:?}",
        latest_bar.date,
        latest_bar.close,
        latest.fast_ma,
        latest.slow_ma,
        latest.rsi,
        latest.macd_line,
        latest.macd_signal,
        latest.upper_band,
        latest.lower_band
    );

    let recommendation =
        SignalAggregator::new(params.signal_config()).aggregate(&enabled, &latest);

    tracing::info!(
        "{:?} on {} (+{} / -{}, {} crossovers)",
        recommendation.action,
        latest_bar.date,
        recommendation.positive_score,
        recommendation.negative_score,
        crossovers.len()
    );

    Ok(AnalysisReport {
        latest_date: latest_bar.date,
        latest_close: latest_bar.close,
        moving_averages,
        rsi,
        macd,
        bollinger,
        crossovers,
        latest,
        recommendation,
        summary: MarketSummary::from_series(series),
        warnings,
    })
}

fn check_history(
    warnings: &mut Vec<HistoryWarning>,
    indicator: &str,
    required: usize,
    available: usize,
) {
    if available < required {
        let warning = HistoryWarning {
            indicator: indicator.to_string(),
            required,
            available,
        };
        tracing::warn!("⚠️  Insufficient history: {}", warning);
        warnings.push(warning);
    }
}
