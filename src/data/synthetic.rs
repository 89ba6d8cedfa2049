use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::models::Bar;

/// Market scenario types for synthetic data generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum MarketScenario {
    /// Steady uptrend with noise (+0.3% daily average)
    Uptrend,
    /// Steady downtrend with noise (-0.3% daily average)
    Downtrend,
    /// Mean-reverting chop around the base price
    Sideways,
    /// Large random swings (up to 5% a day)
    Volatile,
    /// Rally for the first half, then a sell-off
    Reversal,
    /// Constant price, no intraday range
    Flat,
}

/// Generates deterministic daily OHLCV series (weekdays only)
pub struct SyntheticDataGenerator {
    rng: StdRng,
    base_price: f64,
    base_volume: f64,
}

impl SyntheticDataGenerator {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_price: 150.0,
            base_volume: 1_000_000.0,
        }
    }

    #[must_use]
    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = base_price;
        self
    }

    /// Generate `num_bars` trading days starting at the first weekday on or after `start`
    pub fn generate(
        &mut self,
        scenario: MarketScenario,
        num_bars: usize,
        start: NaiveDate,
    ) -> Vec<Bar> {
        let dates = trading_days(start, num_bars);
        let mut bars = Vec::with_capacity(num_bars);
        let mut price = self.base_price;

        for (i, date) in dates.into_iter().enumerate() {
            price = match scenario {
                MarketScenario::Uptrend => {
                    price * (1.0 + 0.003 + self.rng.gen_range(-0.01..0.01))
                }
                MarketScenario::Downtrend => {
                    price * (1.0 - 0.003 + self.rng.gen_range(-0.01..0.01))
                }
                MarketScenario::Sideways => {
                    // 10% pull to the mean plus ±1% noise
                    let reversion = (self.base_price - price) * 0.1;
                    price + reversion + price * self.rng.gen_range(-0.01..0.01)
                }
                MarketScenario::Volatile => {
                    let moved = price * (1.0 + self.rng.gen_range(-0.05..0.05));
                    moved.max(self.base_price * 0.5)
                }
                MarketScenario::Reversal => {
                    let drift = if i < num_bars / 2 { 0.006 } else { -0.008 };
                    price * (1.0 + drift + self.rng.gen_range(-0.005..0.005))
                }
                MarketScenario::Flat => self.base_price,
            };

            let bar = if scenario == MarketScenario::Flat {
                Bar {
                    date,
                    open: price,
                    high: price,
                    low: price,
                    close: price,
                    volume: self.base_volume,
                }
            } else {
                self.create_bar(price, date)
            };
            bars.push(bar);
        }

        bars
    }

    /// Realistic OHLC around a close
    fn create_bar(&mut self, close: f64, date: NaiveDate) -> Bar {
        let range_pct = 0.01; // ±1% intraday

        let high = close * (1.0 + self.rng.gen_range(0.0..range_pct));
        let low = close * (1.0 - self.rng.gen_range(0.0..range_pct));
        let open = (close * (1.0 + self.rng.gen_range(-range_pct..range_pct))).clamp(low, high);

        // Vary volume ±30%
        let volume = (self.base_volume * self.rng.gen_range(0.7..1.3)).round();

        Bar {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// The first `count` weekdays on or after `start`
fn trading_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut days = Vec::with_capacity(count);
    let mut date = start;

    while days.len() < count {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            days.push(date);
        }
        date += Duration::days(1);
    }

    days
}
