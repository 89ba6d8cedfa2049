//! Layered application configuration.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisParams;

/// Config file looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "marketsignal.toml";

/// Longest accepted cache TTL (ten years)
pub const MAX_CACHE_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Prefix for environment overrides, e.g. `MARKETSIGNAL__PARAMS__RSI_PERIOD=21`
pub const ENV_PREFIX: &str = "MARKETSIGNAL";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Tracing filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Directory holding `<TICKER>.json` bar files
    pub data_dir: PathBuf,
    /// Tickers analysed at once in a portfolio run
    pub max_concurrency: usize,
    /// Provider throttle; `None` disables it
    pub requests_per_minute: Option<u32>,
    pub cache_ttl_secs: u64,
    pub params: AnalysisParams,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: "marketsignal=info".to_string(),
            data_dir: PathBuf::from("data"),
            max_concurrency: 4,
            requests_per_minute: None,
            cache_ttl_secs: 900,
            params: AnalysisParams::default(),
        }
    }
}

impl AppConfig {
    /// Load defaults, then the config file, then `MARKETSIGNAL__*` env vars.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        let config: Self = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        config.params.validate()?;
        if config.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            anyhow::bail!(
                "cache_ttl_secs {} exceeds the maximum of {}",
                config.cache_ttl_secs,
                MAX_CACHE_TTL_SECS
            );
        }

        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        // Bounded by MAX_CACHE_TTL_SECS, so the cast cannot wrap
        chrono::Duration::seconds(self.cache_ttl_secs.min(MAX_CACHE_TTL_SECS) as i64)
    }
}
