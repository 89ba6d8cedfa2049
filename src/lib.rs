// Core modules
pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod models;
pub mod portfolio;
pub mod strategy;
pub mod validation;

// Re-export commonly used types
pub use analysis::{analyze, analyze_bars, AnalysisParams, AnalysisReport};
pub use models::*;
pub use portfolio::{PortfolioAnalyzer, SignalCache, TickerError};

// Error handling
pub use error::EngineError;
pub type Result<T> = std::result::Result<T, EngineError>;
