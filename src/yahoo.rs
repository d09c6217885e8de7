//! Yahoo Finance downloader.
//!
//! Materializes [`PriceHistory`] values from Yahoo's historical-price CSV
//! endpoint. Downloading happens before any analytics run; the report layer
//! only ever sees already-fetched, in-memory histories (for example via
//! [`InMemoryProvider::add_history`](crate::provider::InMemoryProvider::add_history)).
//!
//! The CSV's "Adj Close" column is the split- and dividend-adjusted close;
//! it is surfaced as the `adj_close` bar field, which is also the default
//! analysis field.

use crate::provider::{FetchRange, Interval, PriceBar, PriceHistory};
use crate::ticker::Ticker;
use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

const ENDPOINT: &str = "https://query1.finance.yahoo.com/v7/finance/download";

/// Configuration for the Yahoo Finance downloader.
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    /// Maximum number of retry attempts for transient failures (default: 3)
    pub max_retries: u32,
    /// Request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        DownloaderConfig {
            max_retries: 3,
            timeout_seconds: 30,
        }
    }
}

/// Yahoo Finance historical price downloader.
#[derive(Debug)]
pub struct YahooDownloader {
    client: Client,
    config: DownloaderConfig,
}

impl YahooDownloader {
    /// Creates a downloader with the default configuration.
    pub fn new() -> Result<Self, DownloadError> {
        Self::with_config(DownloaderConfig::default())
    }

    /// Creates a downloader with a custom configuration.
    ///
    /// # Errors
    /// Returns an error if HTTP client creation fails.
    pub fn with_config(config: DownloaderConfig) -> Result<Self, DownloadError> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DownloadError::ClientCreation(e.to_string()))?;

        Ok(YahooDownloader { client, config })
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /// Downloads price history for one ticker.
    ///
    /// Transient failures (network errors, HTTP 5xx) are retried up to
    /// `max_retries` times with linear backoff.
    ///
    /// # Errors
    /// Returns [`DownloadError::Empty`] when the response carries no data
    /// rows — the caller must treat that as a request-level no-data
    /// condition, not as a valid empty series.
    pub async fn fetch_history(
        &self,
        ticker: &Ticker,
        range: &FetchRange,
    ) -> Result<PriceHistory, DownloadError> {
        let url = self.build_url(ticker, range)?;

        let mut attempt = 0;
        let body = loop {
            match self.fetch_once(&url).await {
                Ok(body) => break body,
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!(ticker = %ticker, attempt, error = %e, "retrying download");
                    tokio::time::sleep(Duration::from_millis(500 * attempt as u64)).await;
                }
                Err(e) => return Err(e),
            }
        };

        let history = parse_csv(ticker, &body)?;
        debug!(ticker = %ticker, bars = history.len(), "downloaded price history");
        Ok(history)
    }

    /// Downloads price history for several tickers concurrently.
    pub async fn fetch_many(
        &self,
        tickers: &[Ticker],
        range: &FetchRange,
    ) -> Result<Vec<PriceHistory>, DownloadError> {
        try_join_all(
            tickers
                .iter()
                .map(|ticker| self.fetch_history(ticker, range)),
        )
        .await
    }

    async fn fetch_once(&self, url: &str) -> Result<String, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Api {
                status: status.as_u16(),
                message: status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| DownloadError::Network(e.to_string()))
    }

    fn build_url(&self, ticker: &Ticker, range: &FetchRange) -> Result<String, DownloadError> {
        let (period1, period2, interval) = match range {
            FetchRange::Dates(dates) => {
                let start = dates
                    .start
                    .and_hms_opt(0, 0, 0)
                    .ok_or_else(|| DownloadError::InvalidDate(dates.start.to_string()))?
                    .and_utc()
                    .timestamp();
                let end = dates
                    .end
                    .and_hms_opt(23, 59, 59)
                    .ok_or_else(|| DownloadError::InvalidDate(dates.end.to_string()))?
                    .and_utc()
                    .timestamp();
                (start, end, Interval::Daily)
            }
            FetchRange::Trailing { period, interval } => {
                let end = Utc::now().timestamp();
                let start = match period.approx_days() {
                    Some(days) => end - days * 86_400,
                    None => 0,
                };
                (start, end, *interval)
            }
        };

        Ok(format!(
            "{}/{}?period1={}&period2={}&interval={}&events=history",
            ENDPOINT,
            ticker,
            period1,
            period2,
            interval.as_str()
        ))
    }
}

/// One row of Yahoo's historical CSV. Prices arrive as strings because Yahoo
/// writes the literal "null" into cells it has no data for.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: String,
    #[serde(rename = "High")]
    high: String,
    #[serde(rename = "Low")]
    low: String,
    #[serde(rename = "Close")]
    close: String,
    #[serde(rename = "Adj Close")]
    adj_close: String,
    #[serde(rename = "Volume")]
    volume: String,
}

fn parse_cell(cell: &str) -> Option<f64> {
    if cell == "null" || cell.is_empty() {
        return None;
    }
    cell.parse().ok()
}

/// Parses a CSV response body into a price history.
///
/// Rows without a close price are dropped (market holidays sometimes appear
/// as all-null rows).
fn parse_csv(ticker: &Ticker, body: &str) -> Result<PriceHistory, DownloadError> {
    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let mut bars = Vec::new();

    for record in reader.deserialize::<CsvRow>() {
        let row = record.map_err(|e| DownloadError::Parse(e.to_string()))?;
        let Some(close) = parse_cell(&row.close) else {
            debug!(ticker = %ticker, date = %row.date, "dropping bar without close");
            continue;
        };
        bars.push(PriceBar {
            date: row.date,
            open: parse_cell(&row.open),
            high: parse_cell(&row.high),
            low: parse_cell(&row.low),
            close,
            adj_close: parse_cell(&row.adj_close),
            volume: parse_cell(&row.volume).map(|v| v as u64),
        });
    }

    if bars.is_empty() {
        return Err(DownloadError::Empty {
            ticker: ticker.clone(),
        });
    }

    PriceHistory::new(ticker.clone(), bars).map_err(|e| DownloadError::Parse(e.to_string()))
}

/// Errors that can occur during Yahoo Finance downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    /// HTTP client creation failed
    ClientCreation(String),
    /// Network error occurred
    Network(String),
    /// API returned an error response
    Api { status: u16, message: String },
    /// Failed to parse response data
    Parse(String),
    /// Invalid date provided
    InvalidDate(String),
    /// Response carried no data rows for the ticker
    Empty { ticker: Ticker },
}

impl DownloadError {
    /// True for failures worth retrying.
    fn is_transient(&self) -> bool {
        match self {
            DownloadError::Network(_) => true,
            DownloadError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::ClientCreation(msg) => write!(f, "Client creation error: {}", msg),
            DownloadError::Network(msg) => write!(f, "Network error: {}", msg),
            DownloadError::Api { status, message } => write!(f, "API error: HTTP {} {}", status, message),
            DownloadError::Parse(msg) => write!(f, "Parse error: {}", msg),
            DownloadError::InvalidDate(msg) => write!(f, "Invalid date: {}", msg),
            DownloadError::Empty { ticker } => write!(f, "No data returned for {}", ticker),
        }
    }
}

impl std::error::Error for DownloadError {}
