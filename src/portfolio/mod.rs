// Multi-ticker fan-out and report caching
pub mod analyzer;
pub mod cache;

pub use analyzer::{PortfolioAnalyzer, PortfolioResults, TickerError};
pub use cache::SignalCache;
