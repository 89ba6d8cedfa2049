// Crossover detection and signal aggregation
pub mod crossover;
pub mod signals;

pub use crossover::detect_crossovers;
pub use signals::{aggregate, EnabledIndicators, LatestValues, SignalAggregator, SignalConfig};
