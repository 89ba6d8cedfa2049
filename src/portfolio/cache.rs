use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::analysis::{AnalysisParams, AnalysisReport};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    ticker: String,
    params: String,
}

impl CacheKey {
    fn new(ticker: &str, params: &AnalysisParams) -> Self {
        Self {
            ticker: ticker.to_string(),
            params: params.fingerprint(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    report: Arc<AnalysisReport>,
    expires_at: DateTime<Utc>,
}

/// Thread-safe TTL cache of analysis reports
///
/// Keyed by (ticker, parameter set). An expired entry reads as a miss and is
/// overwritten by the next insert; nothing is evicted eagerly. Reports are
/// published whole behind an `Arc`, so readers never see a partial entry.
#[derive(Clone)]
pub struct SignalCache {
    data: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
    ttl: Duration,
}

impl SignalCache {
    /// Create a new cache
    ///
    /// # Arguments
    /// * `ttl` - How long an inserted report stays valid
    pub fn new(ttl: Duration) -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a live report for a ticker and parameter set
    pub fn get(
        &self,
        ticker: &str,
        params: &AnalysisParams,
    ) -> Result<Option<Arc<AnalysisReport>>, String> {
        self.get_at(ticker, params, Utc::now())
    }

    /// Same as [`get`](Self::get) with an explicit clock
    pub fn get_at(
        &self,
        ticker: &str,
        params: &AnalysisParams,
        now: DateTime<Utc>,
    ) -> Result<Option<Arc<AnalysisReport>>, String> {
        let data = self.data.read().map_err(|e| e.to_string())?;

        Ok(data
            .get(&CacheKey::new(ticker, params))
            .filter(|entry| now < entry.expires_at)
            .map(|entry| entry.report.clone()))
    }

    /// Publish a report, replacing any previous (possibly expired) entry
    pub fn insert(
        &self,
        ticker: &str,
        params: &AnalysisParams,
        report: Arc<AnalysisReport>,
    ) -> Result<(), String> {
        self.insert_at(ticker, params, report, Utc::now())
    }

    /// Same as [`insert`](Self::insert) with an explicit clock
    pub fn insert_at(
        &self,
        ticker: &str,
        params: &AnalysisParams,
        report: Arc<AnalysisReport>,
        now: DateTime<Utc>,
    ) -> Result<(), String> {
        // Saturate rather than overflow on very long TTLs
        let expires_at = now
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let key = CacheKey::new(ticker, params);

        let mut data = self.data.write().map_err(|e| e.to_string())?;
        data.insert(key, CacheEntry { report, expires_at });

        Ok(())
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> Result<usize, String> {
        let data = self.data.read().map_err(|e| e.to_string())?;
        Ok(data.len())
    }

    pub fn is_empty(&self) -> Result<bool, String> {
        Ok(self.len()? == 0)
    }

    /// Clear all data
    pub fn clear(&self) -> Result<(), String> {
        let mut data = self.data.write().map_err(|e| e.to_string())?;
        data.clear();
        Ok(())
    }
}
