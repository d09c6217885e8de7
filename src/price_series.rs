use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single price observation: one date, one price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation date
    pub date: NaiveDate,
    /// Price on that date
    pub price: f64,
}

impl PricePoint {
    /// Creates a new PricePoint.
    pub fn new(date: NaiveDate, price: f64) -> Self {
        PricePoint { date, price }
    }
}

/// An ordered price series for one ticker.
///
/// Invariants enforced at construction: dates are strictly increasing, so
/// there are no duplicate dates. Price positivity is not a structural
/// invariant — providers can legitimately hand back bad prints — and is
/// checked by the analytics that require it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Creates a price series from observation points.
    ///
    /// # Errors
    /// Returns an error if any date repeats or appears out of order.
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for window in points.windows(2) {
            if window[1].date == window[0].date {
                return Err(SeriesError::DuplicateDate(window[1].date));
            }
            if window[1].date < window[0].date {
                return Err(SeriesError::OutOfOrder(window[1].date));
            }
        }
        Ok(PriceSeries { points })
    }

    /// Returns the observation points in date order.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First observation, if any.
    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    /// Last observation, if any.
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Observation dates in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Prices in date order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }
}

/// A derived observation: one date, one dimensionless value (a return, a
/// compounded return, ...).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl ReturnPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        ReturnPoint { date, value }
    }
}

/// Daily returns derived from a [`PriceSeries`].
///
/// Has one fewer element than its source series: the first date has no
/// prior-day reference. Each point is indexed by the later of the two dates
/// it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub(crate) fn from_points(points: Vec<ReturnPoint>) -> Self {
        ReturnSeries { points }
    }

    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Compounded returns derived from a [`ReturnSeries`].
///
/// Element `i` is `Π_{j<=i}(1 + r[j]) − 1`. Reflects compounding; not
/// monotonic in value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativeReturnSeries {
    points: Vec<ReturnPoint>,
}

impl CumulativeReturnSeries {
    pub(crate) fn from_points(points: Vec<ReturnPoint>) -> Self {
        CumulativeReturnSeries { points }
    }

    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&ReturnPoint> {
        self.points.last()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }
}

/// Errors that can occur when constructing an ordered series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    /// The same date appears more than once
    DuplicateDate(NaiveDate),
    /// A date appears before an earlier one
    OutOfOrder(NaiveDate),
    /// A requested field is absent from at least one bar
    MissingField {
        field: &'static str,
        date: NaiveDate,
    },
}

impl fmt::Display for SeriesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesError::DuplicateDate(date) => write!(f, "Duplicate date in series: {}", date),
            SeriesError::OutOfOrder(date) => write!(f, "Out-of-order date in series: {}", date),
            SeriesError::MissingField { field, date } => {
                write!(f, "Field '{}' missing for {}", field, date)
            }
        }
    }
}

impl std::error::Error for SeriesError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_price_series_creation_valid() {
        let series = PriceSeries::new(vec![
            PricePoint::new(date(15), 100.0),
            PricePoint::new(date(16), 101.0),
            PricePoint::new(date(17), 102.0),
        ])
        .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.first().unwrap().price, 100.0);
        assert_eq!(series.last().unwrap().price, 102.0);
    }

    #[test]
    fn test_price_series_empty_is_valid() {
        let series = PriceSeries::new(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert!(series.first().is_none());
    }

    #[test]
    fn test_price_series_rejects_duplicate_dates() {
        let result = PriceSeries::new(vec![
            PricePoint::new(date(15), 100.0),
            PricePoint::new(date(15), 101.0),
        ]);
        assert_eq!(result.unwrap_err(), SeriesError::DuplicateDate(date(15)));
    }

    #[test]
    fn test_price_series_rejects_out_of_order_dates() {
        let result = PriceSeries::new(vec![
            PricePoint::new(date(16), 100.0),
            PricePoint::new(date(15), 101.0),
        ]);
        assert_eq!(result.unwrap_err(), SeriesError::OutOfOrder(date(15)));
    }

    #[test]
    fn test_price_series_accessors() {
        let series = PriceSeries::new(vec![
            PricePoint::new(date(15), 100.0),
            PricePoint::new(date(16), 101.0),
        ])
        .unwrap();
        assert_eq!(series.dates(), vec![date(15), date(16)]);
        assert_eq!(series.values(), vec![100.0, 101.0]);
    }

    #[test]
    fn test_price_series_immutability() {
        let series = PriceSeries::new(vec![PricePoint::new(date(15), 100.0)]).unwrap();
        let copy = series.clone();
        assert_eq!(series, copy);
    }
}
