pub mod ticker;
pub mod market;
pub mod price_series;
pub mod provider;
pub mod analytics;
pub mod report;
pub mod yahoo;


pub use ticker::{Ticker, TickerError};
pub use market::{Listing, Market};
pub use price_series::{
    CumulativeReturnSeries, PricePoint, PriceSeries, ReturnPoint, ReturnSeries, SeriesError,
};
pub use provider::{
    DateRange, FetchRange, InMemoryProvider, Interval, Period, PriceBar, PriceField, PriceHistory,
    PriceProvider, ProviderError,
};
pub use analytics::{
    compute_correlation, compute_cumulative_returns, compute_returns, compute_total_return,
    compute_volatility, sample_std_dev, AnalyticsError,
};
pub use report::{
    analyze, AnalysisReport, AnalysisRequest, ChartSeries, Metric, MetricError, PairCorrelation,
    TickerReport,
};
pub use yahoo::{DownloadError, DownloaderConfig, YahooDownloader};
