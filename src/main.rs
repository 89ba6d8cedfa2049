use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use marketsignal::config::AppConfig;
use marketsignal::data::{
    parse_bars_json, JsonFileProvider, MarketScenario, SeriesProvider, SyntheticProvider,
};
use marketsignal::{
    analyze_bars, AnalysisParams, AnalysisReport, IndicatorKind, PortfolioAnalyzer, SignalCache,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Technical indicators and Buy/Sell/Hold signals for daily OHLCV series"
)]
struct Cli {
    /// Path to the config file (default: ./marketsignal.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse a JSON file of daily bars
    Analyze {
        /// JSON array of {date, open, high, low, close, volume}
        file: PathBuf,

        #[command(flatten)]
        overrides: ParamOverrides,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyse a synthetic series
    Demo {
        #[arg(long, value_enum, default_value_t = MarketScenario::Uptrend)]
        scenario: MarketScenario,

        /// Number of trading days to generate
        #[arg(long, default_value_t = 250)]
        days: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[command(flatten)]
        overrides: ParamOverrides,

        #[arg(long)]
        json: bool,
    },

    /// Analyse several tickers concurrently
    Portfolio {
        #[arg(required = true)]
        tickers: Vec<String>,

        /// Use synthetic series instead of <data_dir>/<TICKER>.json
        #[arg(long)]
        synthetic: bool,

        /// Seed for --synthetic
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Trading days per ticker for --synthetic
        #[arg(long, default_value_t = 250)]
        days: usize,

        #[command(flatten)]
        overrides: ParamOverrides,

        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum IndicatorArg {
    Ma,
    Rsi,
    Macd,
    Bollinger,
}

impl From<IndicatorArg> for IndicatorKind {
    fn from(arg: IndicatorArg) -> Self {
        match arg {
            IndicatorArg::Ma => IndicatorKind::MovingAverage,
            IndicatorArg::Rsi => IndicatorKind::Rsi,
            IndicatorArg::Macd => IndicatorKind::Macd,
            IndicatorArg::Bollinger => IndicatorKind::Bollinger,
        }
    }
}

/// Command-line overrides on top of the configured parameters
#[derive(Args, Debug, Default)]
struct ParamOverrides {
    /// Fast moving-average window
    #[arg(long)]
    fast: Option<usize>,

    /// Slow moving-average window
    #[arg(long)]
    slow: Option<usize>,

    #[arg(long)]
    rsi_period: Option<usize>,

    #[arg(long)]
    bollinger_period: Option<usize>,

    /// Band width in standard deviations
    #[arg(long)]
    bollinger_k: Option<f64>,

    /// Leave an indicator out of the analysis (repeatable)
    #[arg(long, value_enum)]
    disable: Vec<IndicatorArg>,
}

impl ParamOverrides {
    fn apply(&self, mut params: AnalysisParams) -> AnalysisParams {
        if let Some(fast) = self.fast {
            params.fast_ma = fast;
        }
        if let Some(slow) = self.slow {
            params.slow_ma = slow;
        }
        if let Some(period) = self.rsi_period {
            params.rsi_period = period;
        }
        if let Some(period) = self.bollinger_period {
            params.bollinger_period = period;
        }
        if let Some(k) = self.bollinger_k {
            params.bollinger_k = k;
        }
        for indicator in &self.disable {
            params.enabled = params.enabled.with((*indicator).into(), false);
        }
        params
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    setup_logging(&config.log_filter);

    match cli.command {
        Commands::Analyze {
            file,
            overrides,
            json,
        } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let bars = parse_bars_json(&content)?;
            let params = overrides.apply(config.params.clone());

            let report = analyze_bars(bars, &params)?;
            output_report(&file.display().to_string(), &report, json)?;
        }

        Commands::Demo {
            scenario,
            days,
            seed,
            overrides,
            json,
        } => {
            let ticker = format!("{scenario:?}").to_uppercase();
            let provider = SyntheticProvider::new(seed, days, scenario);
            let params = overrides.apply(config.params.clone());

            tracing::info!("🎲 Generating {} days of {:?} data (seed {})", days, scenario, seed);
            let report = analyze_bars(provider.fetch(&ticker)?, &params)?;
            output_report(&ticker, &report, json)?;
        }

        Commands::Portfolio {
            tickers,
            synthetic,
            seed,
            days,
            overrides,
            json,
        } => {
            let provider: Arc<dyn SeriesProvider> = if synthetic {
                Arc::new(SyntheticProvider::new(seed, days, MarketScenario::Sideways))
            } else {
                Arc::new(JsonFileProvider::new(&config.data_dir))
            };
            let params = overrides.apply(config.params.clone());
            params.validate()?;

            let mut analyzer = PortfolioAnalyzer::new(provider, params)
                .with_max_concurrency(config.max_concurrency)
                .with_cache(SignalCache::new(config.cache_ttl()));
            if let Some(rpm) = config.requests_per_minute {
                analyzer = analyzer.with_rate_limit(rpm);
            }

            run_portfolio(&analyzer, &tickers, json).await?;
        }
    }

    Ok(())
}

fn setup_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// ============================================================================
// Output
// ============================================================================

fn output_report(label: &str, report: &AnalysisReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print_report(label, report);
    }
    Ok(())
}

async fn run_portfolio(
    analyzer: &PortfolioAnalyzer,
    tickers: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let results = analyzer.analyze_all(tickers).await;
    // HashMap order is arbitrary; print by ticker
    let sorted: BTreeMap<_, _> = results.iter().collect();

    if json {
        let mut out = serde_json::Map::new();
        for (ticker, result) in &sorted {
            let value = match result {
                Ok(report) => serde_json::to_value(&**report)?,
                Err(e) => serde_json::json!({ "error": e.to_string() }),
            };
            out.insert((*ticker).clone(), value);
        }
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║                 PORTFOLIO SIGNALS                     ║");
        println!("╚═══════════════════════════════════════════════════════╝\n");
        println!(
            "{:<10} {:<6} {:>6} {:>6} {:>12}",
            "Ticker", "Action", "+", "-", "Close"
        );
        println!("{}", "─".repeat(44));

        for (ticker, result) in &sorted {
            match result {
                Ok(report) => println!(
                    "{:<10} {:<6} {:>6} {:>6} {:>12.2}",
                    ticker,
                    format!("{:?}", report.recommendation.action),
                    report.recommendation.positive_score,
                    report.recommendation.negative_score,
                    report.latest_close
                ),
                Err(e) => println!("{:<10} ❌ {}", ticker, e),
            }
        }
        println!();
    }

    if !results.is_empty() && results.values().all(|r| r.is_err()) {
        bail!("Every ticker failed");
    }
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "n/a".to_string())
}

fn print_report(label: &str, report: &AnalysisReport) {
    let rec = &report.recommendation;

    println!("\n╔═══════════════════════════════════════════════════════╗");
    println!("║  {:<53}║", label);
    println!("╚═══════════════════════════════════════════════════════╝");
    println!(
        "\n📊 {:?} on {} @ {:.2}  (+{} / -{})",
        rec.action, report.latest_date, report.latest_close, rec.positive_score, rec.negative_score
    );

    println!("\nSignals:");
    if rec.signals.is_empty() {
        println!("  (none)");
    }
    for state in &rec.signals {
        println!(
            "  {:<16} {:<8} weight {}",
            state.indicator.to_string(),
            format!("{:?}", state.direction),
            state.weight
        );
    }

    let latest = &report.latest;
    println!("\nLatest values:");
    println!(
        "  MA fast/slow:   {} / {}",
        fmt_opt(latest.fast_ma),
        fmt_opt(latest.slow_ma)
    );
    println!("  RSI:            {}", fmt_opt(latest.rsi));
    println!(
        "  MACD/signal:    {} / {}",
        fmt_opt(latest.macd_line),
        fmt_opt(latest.macd_signal)
    );
    println!(
        "  Bands low/up:   {} / {}",
        fmt_opt(latest.lower_band),
        fmt_opt(latest.upper_band)
    );

    if !report.crossovers.is_empty() {
        println!("\nCrossovers ({} total, latest 5):", report.crossovers.len());
        for event in report.crossovers.iter().rev().take(5) {
            println!("  {} {:?} @ {:.2}", event.date, event.kind, event.price);
        }
    }

    let summary = &report.summary;
    println!("\nSummary:");
    println!("  Change:         {:+.2}%", summary.change_pct);
    println!(
        "  Range:          {:.2} - {:.2}",
        summary.period_low, summary.period_high
    );
    println!("  Trading days:   {}", summary.trading_days);
    println!(
        "  Volatility:     {}%",
        fmt_opt(summary.volatility_pct)
    );
    println!("  Total return:   {:+.2}%", summary.total_return_pct);

    for warning in &report.warnings {
        println!("⚠️  {}", warning);
    }
    println!();
}
