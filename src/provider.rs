//! The price-series provider boundary.
//!
//! Everything the analytics consume arrives through [`PriceProvider`]: a
//! mapping from (ticker, fetch range) to an ordered [`PriceHistory`]. The
//! field contract is fixed here — date, open/high/low, close, adjusted close,
//! volume — so nothing downstream discovers columns ad hoc.

use crate::price_series::{PricePoint, PriceSeries, SeriesError};
use crate::ticker::Ticker;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

/// Inclusive date range for querying price history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Start date (inclusive)
    pub start: NaiveDate,
    /// End date (inclusive)
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a new DateRange.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Creates a DateRange from a standard Range.
    pub fn from_range(range: Range<NaiveDate>) -> Self {
        DateRange {
            start: range.start,
            end: range.end,
        }
    }
}

/// Trailing lookback period for queries anchored at "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    FiveDays,
    OneMonth,
    SixMonths,
    OneYear,
    FiveYears,
    Max,
}

impl Period {
    /// Provider query-string code for this period.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::FiveYears => "5y",
            Period::Max => "max",
        }
    }

    /// Calendar-day approximation of the lookback window.
    ///
    /// `None` means unbounded (all available history).
    pub fn approx_days(&self) -> Option<i64> {
        match self {
            Period::FiveDays => Some(7),
            Period::OneMonth => Some(31),
            Period::SixMonths => Some(183),
            Period::OneYear => Some(365),
            Period::FiveYears => Some(1826),
            Period::Max => None,
        }
    }
}

/// Sampling interval between consecutive bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    Daily,
    Weekly,
    Monthly,
}

impl Interval {
    /// Provider query-string code for this interval.
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
        }
    }
}

/// What slice of history to fetch: an explicit date window, or a trailing
/// period sampled at a given interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchRange {
    /// Explicit inclusive date window, daily bars
    Dates(DateRange),
    /// Trailing window anchored at the present
    Trailing { period: Period, interval: Interval },
}

/// Named price field a bar can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    /// Close adjusted for splits and dividends
    AdjClose,
}

impl PriceField {
    pub fn name(&self) -> &'static str {
        match self {
            PriceField::Open => "open",
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
            PriceField::AdjClose => "adj_close",
        }
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One bar of price history.
///
/// Close is the only mandatory price; the remaining fields are optional and
/// stated explicitly by the provider, never inferred downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub adj_close: Option<f64>,
    pub volume: Option<u64>,
}

impl PriceBar {
    /// Creates a close-only bar; the optional fields start empty.
    pub fn close_only(date: NaiveDate, close: f64) -> Self {
        PriceBar {
            date,
            open: None,
            high: None,
            low: None,
            close,
            adj_close: None,
            volume: None,
        }
    }

    /// Returns the named price field for this bar, if present.
    pub fn field(&self, field: PriceField) -> Option<f64> {
        match field {
            PriceField::Open => self.open,
            PriceField::High => self.high,
            PriceField::Low => self.low,
            PriceField::Close => Some(self.close),
            PriceField::AdjClose => self.adj_close,
        }
    }
}

/// Ordered price history for one ticker, as returned by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    ticker: Ticker,
    bars: Vec<PriceBar>,
}

impl PriceHistory {
    /// Creates a price history from bars in date order.
    ///
    /// # Errors
    /// Returns an error if any bar date repeats or appears out of order.
    pub fn new(ticker: Ticker, bars: Vec<PriceBar>) -> Result<Self, SeriesError> {
        for window in bars.windows(2) {
            if window[1].date == window[0].date {
                return Err(SeriesError::DuplicateDate(window[1].date));
            }
            if window[1].date < window[0].date {
                return Err(SeriesError::OutOfOrder(window[1].date));
            }
        }
        Ok(PriceHistory { ticker, bars })
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The most recent `n` bars, for tabular preview.
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    /// Projects one named field into a [`PriceSeries`].
    ///
    /// # Errors
    /// Returns an error if the field is absent from any bar. A provider that
    /// supplies a field supplies it for every bar or not at all; a partial
    /// column is a provider defect, not something to paper over.
    pub fn series(&self, field: PriceField) -> Result<PriceSeries, SeriesError> {
        let mut points = Vec::with_capacity(self.bars.len());
        for bar in &self.bars {
            let price = bar.field(field).ok_or(SeriesError::MissingField {
                field: field.name(),
                date: bar.date,
            })?;
            points.push(PricePoint::new(bar.date, price));
        }
        // Bar dates were validated at construction, so this cannot fail.
        PriceSeries::new(points)
    }

    /// Consumes the history, returning its bars.
    pub fn into_bars(self) -> Vec<PriceBar> {
        self.bars
    }
}

/// Trait for price-history source abstraction.
///
/// Implementations can be an in-memory map (for testing), a database, or a
/// materialized download from a remote API. The provider states which price
/// fields it supplies; in particular whether `adj_close` is populated and
/// what adjustment it reflects.
pub trait PriceProvider {
    /// Retrieves price history for a ticker over a fetch range.
    ///
    /// # Errors
    /// Returns [`ProviderError::NoData`] when the source has no bars for the
    /// requested symbol and range — callers treat that as a request-level
    /// error, never as an empty-but-valid series.
    fn price_history(
        &self,
        ticker: &Ticker,
        range: &FetchRange,
    ) -> Result<PriceHistory, ProviderError>;
}

/// Errors that can occur when querying a price provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Provider returned no data for the requested symbol/range
    NoData { ticker: Ticker },
    /// Invalid date range (e.g., start > end)
    InvalidDateRange,
    /// Generic error message
    Other(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::NoData { ticker } => {
                write!(f, "No price data available for {}", ticker)
            }
            ProviderError::InvalidDateRange => write!(f, "Invalid date range"),
            ProviderError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// In-memory price provider implementation for testing.
///
/// Stores bars in a HashMap keyed by ticker. Trailing-period queries are
/// answered relative to the newest stored bar, using the period's
/// calendar-day approximation.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    data: HashMap<Ticker, Vec<PriceBar>>,
}

impl InMemoryProvider {
    /// Creates a new empty in-memory provider.
    pub fn new() -> Self {
        InMemoryProvider {
            data: HashMap::new(),
        }
    }

    /// Adds bars for a ticker (should be sorted by date).
    pub fn add_bars(&mut self, ticker: Ticker, bars: Vec<PriceBar>) {
        self.data.insert(ticker, bars);
    }

    /// Adds a downloaded history under its own ticker.
    pub fn add_history(&mut self, history: PriceHistory) {
        let ticker = history.ticker().clone();
        self.data.insert(ticker, history.into_bars());
    }

    /// Clears all data from the provider.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl PriceProvider for InMemoryProvider {
    fn price_history(
        &self,
        ticker: &Ticker,
        range: &FetchRange,
    ) -> Result<PriceHistory, ProviderError> {
        let all_bars = self.data.get(ticker).ok_or_else(|| ProviderError::NoData {
            ticker: ticker.clone(),
        })?;

        let filtered: Vec<PriceBar> = match range {
            FetchRange::Dates(dates) => {
                if dates.start > dates.end {
                    return Err(ProviderError::InvalidDateRange);
                }
                all_bars
                    .iter()
                    .filter(|bar| bar.date >= dates.start && bar.date <= dates.end)
                    .copied()
                    .collect()
            }
            FetchRange::Trailing { period, .. } => match period.approx_days() {
                None => all_bars.clone(),
                Some(days) => {
                    let Some(newest) = all_bars.last().map(|bar| bar.date) else {
                        return Err(ProviderError::NoData {
                            ticker: ticker.clone(),
                        });
                    };
                    let cutoff = newest - chrono::Duration::days(days);
                    all_bars
                        .iter()
                        .filter(|bar| bar.date >= cutoff)
                        .copied()
                        .collect()
                }
            },
        };

        if filtered.is_empty() {
            return Err(ProviderError::NoData {
                ticker: ticker.clone(),
            });
        }

        PriceHistory::new(ticker.clone(), filtered)
            .map_err(|e| ProviderError::Other(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn ticker(symbol: &str) -> Ticker {
        Ticker::new(symbol).unwrap()
    }

    fn bars(prices: &[(u32, f64)]) -> Vec<PriceBar> {
        prices
            .iter()
            .map(|&(day, close)| PriceBar::close_only(date(day), close))
            .collect()
    }

    #[test]
    fn test_in_memory_provider_add_and_query() {
        let mut provider = InMemoryProvider::new();
        provider.add_bars(ticker("AAPL"), bars(&[(15, 150.0), (16, 151.0), (17, 152.0)]));

        let range = FetchRange::Dates(DateRange::new(date(15), date(16)));
        let history = provider.price_history(&ticker("AAPL"), &range).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.bars()[0].close, 150.0);
        assert_eq!(history.bars()[1].close, 151.0);
    }

    #[test]
    fn test_in_memory_provider_unknown_ticker_is_no_data() {
        let provider = InMemoryProvider::new();
        let range = FetchRange::Dates(DateRange::new(date(15), date(16)));
        let result = provider.price_history(&ticker("AAPL"), &range);
        assert_eq!(
            result.unwrap_err(),
            ProviderError::NoData {
                ticker: ticker("AAPL")
            }
        );
    }

    #[test]
    fn test_in_memory_provider_empty_window_is_no_data() {
        let mut provider = InMemoryProvider::new();
        provider.add_bars(ticker("AAPL"), bars(&[(15, 150.0)]));

        let range = FetchRange::Dates(DateRange::new(date(20), date(25)));
        let result = provider.price_history(&ticker("AAPL"), &range);
        assert!(matches!(result, Err(ProviderError::NoData { .. })));
    }

    #[test]
    fn test_in_memory_provider_invalid_date_range() {
        let mut provider = InMemoryProvider::new();
        provider.add_bars(ticker("AAPL"), bars(&[(15, 150.0)]));

        let range = FetchRange::Dates(DateRange::new(date(16), date(15)));
        let result = provider.price_history(&ticker("AAPL"), &range);
        assert_eq!(result.unwrap_err(), ProviderError::InvalidDateRange);
    }

    #[test]
    fn test_in_memory_provider_trailing_period() {
        let mut provider = InMemoryProvider::new();
        let mut all = bars(&[(1, 100.0), (10, 101.0)]);
        all.extend(bars(&[(25, 102.0), (26, 103.0), (31, 104.0)]));
        provider.add_bars(ticker("AAPL"), all);

        let range = FetchRange::Trailing {
            period: Period::FiveDays,
            interval: Interval::Daily,
        };
        let history = provider.price_history(&ticker("AAPL"), &range).unwrap();
        // Newest bar is Jan 31; the 5d window keeps the last calendar week.
        assert_eq!(history.len(), 3);
        assert_eq!(history.bars()[0].date, date(25));
    }

    #[test]
    fn test_price_history_rejects_unordered_bars() {
        let result = PriceHistory::new(ticker("AAPL"), bars(&[(16, 150.0), (15, 151.0)]));
        assert_eq!(result.unwrap_err(), SeriesError::OutOfOrder(date(15)));
    }

    #[test]
    fn test_series_projection_close() {
        let history = PriceHistory::new(ticker("AAPL"), bars(&[(15, 150.0), (16, 151.0)])).unwrap();
        let series = history.series(PriceField::Close).unwrap();
        assert_eq!(series.values(), vec![150.0, 151.0]);
    }

    #[test]
    fn test_series_projection_missing_field() {
        let history = PriceHistory::new(ticker("AAPL"), bars(&[(15, 150.0)])).unwrap();
        let result = history.series(PriceField::AdjClose);
        assert_eq!(
            result.unwrap_err(),
            SeriesError::MissingField {
                field: "adj_close",
                date: date(15)
            }
        );
    }

    #[test]
    fn test_tail_preview() {
        let history = PriceHistory::new(
            ticker("AAPL"),
            bars(&[(15, 150.0), (16, 151.0), (17, 152.0)]),
        )
        .unwrap();
        let tail = history.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].date, date(16));
        assert_eq!(history.tail(10).len(), 3);
    }

    #[test]
    fn test_period_and_interval_codes() {
        assert_eq!(Period::OneYear.as_str(), "1y");
        assert_eq!(Period::Max.as_str(), "max");
        assert_eq!(Interval::Daily.as_str(), "1d");
        assert_eq!(Interval::Weekly.as_str(), "1wk");
        assert!(Period::Max.approx_days().is_none());
    }
}
