use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::models::OhlcvSeries;
use crate::{EngineError, Result};

/// Indicator output aligned 1:1 with the dates of an [`OhlcvSeries`].
///
/// Dates whose lookback window is not satisfied hold `f64::NAN`. Every
/// accessor turns that marker into `None`, and arithmetic between series
/// keeps it, so an undefined input stays undefined downstream.
///
/// Equality treats two undefined entries as equal.
#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl IndicatorSeries {
    /// Build from explicit dates and values (NaN = undefined)
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(EngineError::malformed(
                dates.len().min(values.len()),
                format!(
                    "{} dates but {} indicator values",
                    dates.len(),
                    values.len()
                ),
            ));
        }
        Ok(Self { dates, values })
    }

    /// Attach raw values computed from `series` closes to its dates
    pub(crate) fn aligned(series: &OhlcvSeries, values: Vec<f64>) -> Self {
        debug_assert_eq!(series.len(), values.len());
        Self {
            dates: series.dates(),
            values,
        }
    }

    /// Element-wise combination of two aligned series
    pub(crate) fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        debug_assert_eq!(self.dates, other.dates);
        Self {
            dates: self.dates.clone(),
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Raw values, NaN where undefined
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().filter(|v| !v.is_nan())
    }

    /// Value at the last date, `None` if undefined there
    pub fn latest(&self) -> Option<f64> {
        self.values.last().copied().filter(|v| !v.is_nan())
    }

    pub fn first_defined_index(&self) -> Option<usize> {
        self.values.iter().position(|v| !v.is_nan())
    }

    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_nan()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, Option<f64>)> + '_ {
        self.dates
            .iter()
            .zip(&self.values)
            .map(|(&date, &v)| (date, (!v.is_nan()).then_some(v)))
    }
}

impl PartialEq for IndicatorSeries {
    fn eq(&self, other: &Self) -> bool {
        self.dates == other.dates
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

#[derive(Serialize)]
struct Point {
    date: NaiveDate,
    value: Option<f64>,
}

impl Serialize for IndicatorSeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let points: Vec<Point> = self
            .iter()
            .map(|(date, value)| Point { date, value })
            .collect();

        let mut state = serializer.serialize_struct("IndicatorSeries", 2)?;
        state.serialize_field("latest", &self.latest())?;
        state.serialize_field("points", &points)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: u32) -> Vec<NaiveDate> {
        (1..=n)
            .map(|d| NaiveDate::from_ymd_opt(2024, 5, d).unwrap())
            .collect()
    }

    #[test]
    fn test_undefined_marker() {
        let series = IndicatorSeries::new(dates(3), vec![f64::NAN, 2.0, 3.0]).unwrap();

        assert_eq!(series.get(0), None);
        assert_eq!(series.get(1), Some(2.0));
        assert_eq!(series.get(5), None);
        assert_eq!(series.latest(), Some(3.0));
        assert_eq!(series.first_defined_index(), Some(1));
        assert_eq!(series.defined_count(), 2);
    }

    #[test]
    fn test_equality_with_undefined_prefix() {
        let series = IndicatorSeries::new(dates(3), vec![f64::NAN, 2.0, 3.0]).unwrap();
        assert_eq!(series, series.clone());

        let shifted = IndicatorSeries::new(dates(3), vec![1.0, 2.0, 3.0]).unwrap();
        assert_ne!(series, shifted);

        let later = dates(4).split_off(1);
        let moved = IndicatorSeries::new(later, vec![f64::NAN, 2.0, 3.0]).unwrap();
        assert_ne!(series, moved);
    }

    #[test]
    fn test_length_mismatch() {
        let result = IndicatorSeries::new(dates(3), vec![1.0, 2.0]);
        assert!(matches!(
            result,
            Err(EngineError::MalformedSeries { index: 2, .. })
        ));
    }

    #[test]
    fn test_zip_with_propagates_undefined() {
        let a = IndicatorSeries::new(dates(3), vec![f64::NAN, 5.0, 7.0]).unwrap();
        let b = IndicatorSeries::new(dates(3), vec![1.0, f64::NAN, 2.0]).unwrap();

        let diff = a.zip_with(&b, |x, y| x - y);
        assert_eq!(diff.get(0), None);
        assert_eq!(diff.get(1), None);
        assert_eq!(diff.get(2), Some(5.0));
    }

    #[test]
    fn test_serialize_undefined_as_null() {
        let series = IndicatorSeries::new(dates(2), vec![f64::NAN, 1.5]).unwrap();
        let json = serde_json::to_value(&series).unwrap();

        assert_eq!(json["latest"], 1.5);
        assert!(json["points"][0]["value"].is_null());
        assert_eq!(json["points"][0]["date"], "2024-05-01");
        assert_eq!(json["points"][1]["value"], 1.5);
    }
}
