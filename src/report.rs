//! Request/response layer between a price provider and a renderer.
//!
//! A renderer (web page, TUI, notebook) hands over an explicit
//! [`AnalysisRequest`] — tickers, fetch range, price field — and gets back an
//! [`AnalysisReport`]: table previews, chart series and scalar summaries,
//! ready to serialize. Metrics fail independently: a correlation that cannot
//! be computed never suppresses a volatility that can.

use crate::analytics::{
    compute_correlation, compute_cumulative_returns, compute_returns, compute_total_return,
    compute_volatility, AnalyticsError,
};
use crate::price_series::PriceSeries;
use crate::provider::{FetchRange, PriceBar, PriceField, PriceProvider, ProviderError};
use crate::ticker::Ticker;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

/// Number of preview rows the dashboards show by default.
pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// One analysis request: which tickers, over what range, on which field.
///
/// All parameters are explicit — there is no ambient state to discover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Tickers to analyze; correlation is computed for every distinct pair
    pub tickers: Vec<Ticker>,
    /// What slice of history to fetch
    pub range: FetchRange,
    /// Which price field the analytics run on
    pub field: PriceField,
    /// How many most-recent bars to include in the tabular preview
    pub preview_rows: usize,
}

impl AnalysisRequest {
    /// Creates a request with the default field (adjusted close) and preview
    /// size.
    pub fn new(tickers: Vec<Ticker>, range: FetchRange) -> Self {
        AnalysisRequest {
            tickers,
            range,
            field: PriceField::AdjClose,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }

    /// Overrides the price field the analytics run on.
    pub fn with_field(mut self, field: PriceField) -> Self {
        self.field = field;
        self
    }

    /// Overrides the preview row count.
    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }
}

/// Metric being computed, for error context and chart naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    Prices,
    DailyReturns,
    CumulativeReturns,
    Volatility,
    TotalReturn,
    Correlation,
}

impl Metric {
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Prices => "prices",
            Metric::DailyReturns => "daily returns",
            Metric::CumulativeReturns => "cumulative returns",
            Metric::Volatility => "volatility",
            Metric::TotalReturn => "total return",
            Metric::Correlation => "correlation",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A metric that failed for a request, with enough context to display a
/// user-facing message: which tickers, which metric, and why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricError {
    pub metric: Metric,
    pub tickers: Vec<Ticker>,
    pub source: AnalyticsError,
}

impl MetricError {
    fn new(metric: Metric, tickers: Vec<Ticker>, source: AnalyticsError) -> Self {
        MetricError {
            metric,
            tickers,
            source,
        }
    }
}

impl fmt::Display for MetricError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<&str> = self.tickers.iter().map(|t| t.as_str()).collect();
        write!(
            f,
            "{} for {}: {}",
            self.metric,
            symbols.join("/"),
            self.source
        )
    }
}

impl std::error::Error for MetricError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// A named line series for charting: x dates, y values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    fn new(name: String, dates: Vec<NaiveDate>, values: Vec<f64>) -> Self {
        ChartSeries {
            name,
            dates,
            values,
        }
    }
}

/// Everything computed for one ticker. Each metric stands alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerReport {
    pub ticker: Ticker,
    /// Most recent bars, for tabular preview
    pub preview: Vec<PriceBar>,
    /// Price line series for the selected field
    pub prices: ChartSeries,
    pub daily_returns: Result<ChartSeries, MetricError>,
    pub cumulative_returns: Result<ChartSeries, MetricError>,
    pub volatility: Result<f64, MetricError>,
    pub total_return: Result<f64, MetricError>,
}

/// Return correlation for one ticker pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairCorrelation {
    pub first: Ticker,
    pub second: Ticker,
    pub correlation: Result<f64, MetricError>,
}

/// The full analysis result for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub tickers: Vec<TickerReport>,
    /// One entry per distinct ticker pair, in request order
    pub correlations: Vec<PairCorrelation>,
}

impl AnalysisReport {
    /// User-displayable messages for every metric that failed.
    pub fn failure_messages(&self) -> Vec<String> {
        let mut messages = Vec::new();
        for report in &self.tickers {
            for failure in [
                report.daily_returns.as_ref().err(),
                report.cumulative_returns.as_ref().err(),
            ]
            .into_iter()
            .flatten()
            {
                messages.push(failure.to_string());
            }
            if let Err(e) = &report.volatility {
                messages.push(e.to_string());
            }
            if let Err(e) = &report.total_return {
                messages.push(e.to_string());
            }
        }
        for pair in &self.correlations {
            if let Err(e) = &pair.correlation {
                messages.push(e.to_string());
            }
        }
        messages
    }
}

/// Runs one analysis request against a price provider.
///
/// Fetches each ticker's history once, projects the requested field, and
/// computes every metric independently. Provider failures — including the
/// no-data condition — abort the whole request; metric failures are recorded
/// per metric inside the report.
///
/// # Errors
/// Returns [`ProviderError`] if any ticker's history cannot be fetched or
/// lacks the requested field.
pub fn analyze<P: PriceProvider>(
    provider: &P,
    request: &AnalysisRequest,
) -> Result<AnalysisReport, ProviderError> {
    info!(
        tickers = request.tickers.len(),
        field = %request.field,
        "running analysis request"
    );

    let mut reports = Vec::with_capacity(request.tickers.len());
    let mut price_series: Vec<(Ticker, PriceSeries)> = Vec::with_capacity(request.tickers.len());

    for ticker in &request.tickers {
        let history = provider.price_history(ticker, &request.range)?;
        debug!(ticker = %ticker, bars = history.len(), "fetched price history");

        let series = history.series(request.field).map_err(|e| {
            ProviderError::Other(format!("{}: {}", ticker, e))
        })?;

        reports.push(ticker_report(ticker, history.tail(request.preview_rows).to_vec(), &series));
        price_series.push((ticker.clone(), series));
    }

    let mut correlations = Vec::new();
    for (i, (ticker_a, series_a)) in price_series.iter().enumerate() {
        for (ticker_b, series_b) in price_series.iter().skip(i + 1) {
            let correlation = compute_correlation(series_a, series_b).map_err(|e| {
                let err = MetricError::new(
                    Metric::Correlation,
                    vec![ticker_a.clone(), ticker_b.clone()],
                    e,
                );
                warn!(error = %err, "metric failed");
                err
            });
            correlations.push(PairCorrelation {
                first: ticker_a.clone(),
                second: ticker_b.clone(),
                correlation,
            });
        }
    }

    Ok(AnalysisReport {
        tickers: reports,
        correlations,
    })
}

fn ticker_report(ticker: &Ticker, preview: Vec<PriceBar>, series: &PriceSeries) -> TickerReport {
    let fail = |metric: Metric, source: AnalyticsError| {
        let err = MetricError::new(metric, vec![ticker.clone()], source);
        warn!(error = %err, "metric failed");
        err
    };

    let prices = ChartSeries::new(ticker.to_string(), series.dates(), series.values());

    let returns = compute_returns(series);

    let daily_returns = returns
        .as_ref()
        .map(|r| {
            ChartSeries::new(
                format!("{} Daily Return", ticker),
                r.dates(),
                r.values(),
            )
        })
        .map_err(|e| fail(Metric::DailyReturns, e.clone()));

    let cumulative_returns = returns
        .as_ref()
        .map(|r| {
            let cumulative = compute_cumulative_returns(r);
            ChartSeries::new(
                format!("{} Cumulative Return", ticker),
                cumulative.dates(),
                cumulative.values(),
            )
        })
        .map_err(|e| fail(Metric::CumulativeReturns, e.clone()));

    let volatility = returns
        .as_ref()
        .map_err(Clone::clone)
        .and_then(compute_volatility)
        .map_err(|e| fail(Metric::Volatility, e));

    let total_return =
        compute_total_return(series).map_err(|e| fail(Metric::TotalReturn, e));

    TickerReport {
        ticker: ticker.clone(),
        preview,
        prices,
        daily_returns,
        cumulative_returns,
        volatility,
        total_return,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{DateRange, InMemoryProvider, PriceBar};
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn ticker(symbol: &str) -> Ticker {
        Ticker::new(symbol).unwrap()
    }

    fn close_bars(prices: &[(u32, f64)]) -> Vec<PriceBar> {
        prices
            .iter()
            .map(|&(day, close)| PriceBar::close_only(date(day), close))
            .collect()
    }

    fn request(symbols: &[&str]) -> AnalysisRequest {
        let tickers = symbols.iter().map(|s| ticker(s)).collect();
        AnalysisRequest::new(
            tickers,
            FetchRange::Dates(DateRange::new(date(1), date(31))),
        )
        .with_field(PriceField::Close)
    }

    #[test]
    fn test_analyze_single_ticker() {
        let mut provider = InMemoryProvider::new();
        provider.add_bars(
            ticker("AAPL"),
            close_bars(&[(1, 100.0), (2, 110.0), (3, 99.0)]),
        );

        let report = analyze(&provider, &request(&["AAPL"])).unwrap();
        assert_eq!(report.tickers.len(), 1);
        assert!(report.correlations.is_empty());

        let aapl = &report.tickers[0];
        assert_eq!(aapl.prices.values, vec![100.0, 110.0, 99.0]);
        assert_eq!(aapl.preview.len(), 3);

        let returns = aapl.daily_returns.as_ref().unwrap();
        assert_eq!(returns.values.len(), 2);
        assert!((returns.values[0] - 0.10).abs() < 1e-9);

        let cumulative = aapl.cumulative_returns.as_ref().unwrap();
        assert!((cumulative.values[1] - (-0.01)).abs() < 1e-9);

        assert!((aapl.volatility.as_ref().unwrap() - 0.02_f64.sqrt()).abs() < 1e-9);
        assert!((aapl.total_return.as_ref().unwrap() - (-0.01)).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_pair_computes_correlation() {
        let mut provider = InMemoryProvider::new();
        let bars = close_bars(&[(1, 10.0), (2, 11.0), (3, 12.0), (4, 11.0), (5, 10.0)]);
        provider.add_bars(ticker("AAPL"), bars.clone());
        provider.add_bars(ticker("GOOGL"), bars);

        let report = analyze(&provider, &request(&["AAPL", "GOOGL"])).unwrap();
        assert_eq!(report.correlations.len(), 1);

        let pair = &report.correlations[0];
        assert_eq!(pair.first, ticker("AAPL"));
        assert_eq!(pair.second, ticker("GOOGL"));
        assert!((pair.correlation.as_ref().unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_three_tickers_all_pairs() {
        let mut provider = InMemoryProvider::new();
        for (symbol, base) in [("A", 100.0), ("B", 50.0), ("C", 10.0)] {
            provider.add_bars(
                ticker(symbol),
                close_bars(&[
                    (1, base),
                    (2, base * 1.01),
                    (3, base * 0.99),
                    (4, base * 1.02),
                ]),
            );
        }

        let report = analyze(&provider, &request(&["A", "B", "C"])).unwrap();
        assert_eq!(report.correlations.len(), 3);
    }

    #[test]
    fn test_metric_failure_does_not_block_other_metrics() {
        let mut provider = InMemoryProvider::new();
        // Flat prices: returns and total return are fine (all zero), but the
        // pair correlation is degenerate.
        let flat = close_bars(&[(1, 42.0), (2, 42.0), (3, 42.0), (4, 42.0)]);
        let moving = close_bars(&[(1, 100.0), (2, 103.0), (3, 99.0), (4, 105.0)]);
        provider.add_bars(ticker("FLAT"), flat);
        provider.add_bars(ticker("MOVE"), moving);

        let report = analyze(&provider, &request(&["FLAT", "MOVE"])).unwrap();

        let flat_report = &report.tickers[0];
        assert_eq!(*flat_report.volatility.as_ref().unwrap(), 0.0);
        assert_eq!(*flat_report.total_return.as_ref().unwrap(), 0.0);
        assert!(flat_report.daily_returns.is_ok());

        let pair = &report.correlations[0];
        let err = pair.correlation.as_ref().unwrap_err();
        assert_eq!(err.metric, Metric::Correlation);
        assert_eq!(err.source, AnalyticsError::DegenerateSeries);
        assert_eq!(err.tickers, vec![ticker("FLAT"), ticker("MOVE")]);
    }

    #[test]
    fn test_short_series_fails_derived_metrics_but_keeps_prices() {
        let mut provider = InMemoryProvider::new();
        provider.add_bars(ticker("AAPL"), close_bars(&[(1, 100.0)]));

        let report = analyze(&provider, &request(&["AAPL"])).unwrap();
        let aapl = &report.tickers[0];
        assert_eq!(aapl.prices.values, vec![100.0]);
        assert!(aapl.daily_returns.is_err());
        assert!(aapl.volatility.is_err());
        assert!(aapl.total_return.is_err());
    }

    #[test]
    fn test_no_data_aborts_the_request() {
        let provider = InMemoryProvider::new();
        let result = analyze(&provider, &request(&["AAPL"]));
        assert!(matches!(result, Err(ProviderError::NoData { .. })));
    }

    #[test]
    fn test_missing_field_aborts_the_request() {
        let mut provider = InMemoryProvider::new();
        provider.add_bars(ticker("AAPL"), close_bars(&[(1, 100.0), (2, 101.0)]));

        // Default field is the adjusted close, which close-only bars lack.
        let req = request(&["AAPL"]).with_field(PriceField::AdjClose);
        let result = analyze(&provider, &req);
        assert!(matches!(result, Err(ProviderError::Other(_))));
    }

    #[test]
    fn test_preview_respects_row_limit() {
        let mut provider = InMemoryProvider::new();
        provider.add_bars(
            ticker("AAPL"),
            close_bars(&[(1, 100.0), (2, 101.0), (3, 102.0), (4, 103.0)]),
        );

        let req = request(&["AAPL"]).with_preview_rows(2);
        let report = analyze(&provider, &req).unwrap();
        let preview = &report.tickers[0].preview;
        assert_eq!(preview.len(), 2);
        assert_eq!(preview[0].date, date(3));
    }

    #[test]
    fn test_failure_messages_carry_ticker_and_metric() {
        let mut provider = InMemoryProvider::new();
        provider.add_bars(ticker("AAPL"), close_bars(&[(1, 100.0)]));

        let report = analyze(&provider, &request(&["AAPL"])).unwrap();
        let messages = report.failure_messages();
        assert!(!messages.is_empty());
        assert!(messages.iter().all(|m| m.contains("AAPL")));
        assert!(messages.iter().any(|m| m.contains("volatility")));
    }

    #[test]
    fn test_report_serializes() {
        let mut provider = InMemoryProvider::new();
        provider.add_bars(ticker("AAPL"), close_bars(&[(1, 100.0), (2, 101.0)]));

        let report = analyze(&provider, &request(&["AAPL"])).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"AAPL\""));
    }
}
