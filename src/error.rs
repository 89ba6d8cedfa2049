use thiserror::Error;

/// Errors raised by the indicator engine.
///
/// Insufficient history is not an error: a short series still produces
/// a report, with the affected indicators left undefined and a
/// [`HistoryWarning`](crate::models::HistoryWarning) attached.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// The provider returned zero bars.
    #[error("No data available: the series is empty")]
    EmptyInput,

    /// The series is unordered, has duplicate dates or a partial/invalid bar.
    #[error("Malformed series at bar {index}: {reason}")]
    MalformedSeries { index: usize, reason: String },

    /// An analysis parameter is out of range.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl EngineError {
    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        Self::MalformedSeries {
            index,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            EngineError::EmptyInput.to_string(),
            "No data available: the series is empty"
        );

        let err = EngineError::malformed(3, "duplicate date 2024-01-05");
        assert!(err.to_string().contains("bar 3"));
        assert!(err.to_string().contains("duplicate date"));

        let err = EngineError::invalid("fast_ma", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid parameter `fast_ma`: must be positive"
        );
    }
}
