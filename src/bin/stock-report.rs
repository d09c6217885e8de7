//! Stock comparison report binary
//!
//! Downloads price history for the given tickers, runs the full analysis,
//! and prints the report as JSON for an external renderer.
//!
//! Run with: `cargo run --bin stock-report -- AAPL GOOGL`
//!
//! Set RUST_LOG to control log level, e.g. `RUST_LOG=debug`.
//! Optional environment variables:
//!   START_DATE / END_DATE  - explicit window, YYYY-MM-DD (default: trailing 1y)
//!   PRICE_FIELD            - close | adj_close (default: adj_close)

use chrono::NaiveDate;
use stock_analytics::{
    analyze, AnalysisRequest, DateRange, FetchRange, InMemoryProvider, Interval, Period,
    PriceField, Ticker, YahooDownloader,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let symbols: Vec<String> = std::env::args().skip(1).collect();
    let symbols = if symbols.is_empty() {
        vec!["AAPL".to_string(), "GOOGL".to_string()]
    } else {
        symbols
    };

    let tickers = symbols
        .iter()
        .map(Ticker::new)
        .collect::<Result<Vec<_>, _>>()?;

    let range = match (std::env::var("START_DATE"), std::env::var("END_DATE")) {
        (Ok(start), Ok(end)) => FetchRange::Dates(DateRange::new(
            NaiveDate::parse_from_str(&start, "%Y-%m-%d")?,
            NaiveDate::parse_from_str(&end, "%Y-%m-%d")?,
        )),
        _ => FetchRange::Trailing {
            period: Period::OneYear,
            interval: Interval::Daily,
        },
    };

    let field = match std::env::var("PRICE_FIELD").as_deref() {
        Ok("close") => PriceField::Close,
        _ => PriceField::AdjClose,
    };

    let downloader = YahooDownloader::new()?;
    let histories = downloader.fetch_many(&tickers, &range).await?;

    let mut provider = InMemoryProvider::new();
    for history in histories {
        provider.add_history(history);
    }

    let request = AnalysisRequest::new(tickers, range).with_field(field);
    let report = analyze(&provider, &request)?;

    for message in report.failure_messages() {
        eprintln!("warning: {}", message);
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
