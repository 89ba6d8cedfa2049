use crate::models::Bar;
use crate::{EngineError, Result};

/// Validates an incoming OHLCV series before any indicator is computed
pub struct SeriesValidator;

impl SeriesValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate the whole series, failing on the first offending bar
    pub fn validate(&self, bars: &[Bar]) -> Result<()> {
        if bars.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        for (index, bar) in bars.iter().enumerate() {
            self.validate_values(index, bar)?;
        }
        self.validate_ordering(bars)?;

        Ok(())
    }

    /// Validate that all values are finite, prices positive and volume non-negative
    fn validate_values(&self, index: usize, bar: &Bar) -> Result<()> {
        let prices = [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
        ];

        for (field, value) in prices {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::malformed(
                    index,
                    format!("Invalid {field} price: {value}"),
                ));
            }
        }

        // Volume can be 0.0 (index series, holidays)
        if !bar.volume.is_finite() || bar.volume < 0.0 {
            return Err(EngineError::malformed(
                index,
                format!("Invalid volume: {}", bar.volume),
            ));
        }

        Ok(())
    }

    /// Dates must be strictly ascending, which also rules out duplicates
    fn validate_ordering(&self, bars: &[Bar]) -> Result<()> {
        for (offset, window) in bars.windows(2).enumerate() {
            let (prev, curr) = (&window[0], &window[1]);

            if curr.date == prev.date {
                return Err(EngineError::malformed(
                    offset + 1,
                    format!("Duplicate date {}", curr.date),
                ));
            }
            if curr.date < prev.date {
                return Err(EngineError::malformed(
                    offset + 1,
                    format!(
                        "Bars are not sorted by date: {} follows {}",
                        curr.date, prev.date
                    ),
                ));
            }
        }

        Ok(())
    }
}

impl Default for SeriesValidator {
    fn default() -> Self {
        Self::new()
    }
}
