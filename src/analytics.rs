//! Analytics Engine
//!
//! Stateless return/volatility/correlation analytics over already-materialized
//! price series. Every function here is a pure function of its inputs: no
//! I/O, no caching, no shared state, and recomputing on the same input yields
//! bit-identical results.
//!
//! Returns are arithmetic daily returns, `(p[t] − p[t−1]) / p[t−1]`, and all
//! dispersion statistics use the sample (n−1) form consistently.

use crate::price_series::{CumulativeReturnSeries, PricePoint, PriceSeries, ReturnPoint, ReturnSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that can occur when computing an analytic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnalyticsError {
    /// Fewer observations than the statistic requires
    InsufficientData { required: usize, actual: usize },
    /// Non-positive price where a positive price is required
    InvalidPrice { date: NaiveDate, price: f64 },
    /// Two series share too few common dates to correlate
    InsufficientOverlap { common_dates: usize },
    /// Zero-variance returns make the correlation ratio undefined
    DegenerateSeries,
}

impl fmt::Display for AnalyticsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyticsError::InsufficientData { required, actual } => write!(
                f,
                "Insufficient data: need at least {} observations, got {}",
                required, actual
            ),
            AnalyticsError::InvalidPrice { date, price } => {
                write!(f, "Invalid price {} on {}", price, date)
            }
            AnalyticsError::InsufficientOverlap { common_dates } => write!(
                f,
                "Series share only {} common dates; need at least 3 to correlate",
                common_dates
            ),
            AnalyticsError::DegenerateSeries => {
                write!(f, "Returns have zero variance; correlation is undefined")
            }
        }
    }
}

impl std::error::Error for AnalyticsError {}

/// Computes daily arithmetic returns from a price series.
///
/// Each return is `(p[t] − p[t−1]) / p[t−1]`, indexed by the later date, so
/// the output has one fewer point than the input.
///
/// # Errors
/// * [`AnalyticsError::InsufficientData`] if the series has fewer than 2 points
/// * [`AnalyticsError::InvalidPrice`] if any price is zero or negative
pub fn compute_returns(series: &PriceSeries) -> Result<ReturnSeries, AnalyticsError> {
    let values = return_values(series.points())?;
    let points = series
        .points()
        .iter()
        .skip(1)
        .zip(values)
        .map(|(point, value)| ReturnPoint::new(point.date, value))
        .collect();
    Ok(ReturnSeries::from_points(points))
}

/// Computes cumulative (compounded) returns from a return series.
///
/// Element `i` is `Π_{j<=i}(1 + r[j]) − 1`. A pure fold: empty input yields
/// empty output, not an error.
pub fn compute_cumulative_returns(returns: &ReturnSeries) -> CumulativeReturnSeries {
    let mut growth = 1.0;
    let points = returns
        .points()
        .iter()
        .map(|point| {
            growth *= 1.0 + point.value;
            ReturnPoint::new(point.date, growth - 1.0)
        })
        .collect();
    CumulativeReturnSeries::from_points(points)
}

/// Computes return volatility: the sample standard deviation of a return
/// series (n−1 denominator, not annualized).
///
/// # Errors
/// * [`AnalyticsError::InsufficientData`] if there are fewer than 2 returns
///   (zero degrees of freedom)
pub fn compute_volatility(returns: &ReturnSeries) -> Result<f64, AnalyticsError> {
    if returns.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            required: 2,
            actual: returns.len(),
        });
    }
    Ok(sample_std_dev(&returns.values()))
}

/// Computes the total return over a price series: `(last − first) / first`.
///
/// # Errors
/// * [`AnalyticsError::InsufficientData`] if the series has fewer than 2 points
/// * [`AnalyticsError::InvalidPrice`] if the first price is not positive
pub fn compute_total_return(series: &PriceSeries) -> Result<f64, AnalyticsError> {
    if series.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            required: 2,
            actual: series.len(),
        });
    }

    // len >= 2 guarantees both ends exist.
    let (first, last) = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(AnalyticsError::InsufficientData {
                required: 2,
                actual: series.len(),
            })
        }
    };

    if first.price <= 0.0 {
        return Err(AnalyticsError::InvalidPrice {
            date: first.date,
            price: first.price,
        });
    }

    Ok((last.price - first.price) / first.price)
}

/// Computes the Pearson correlation between the daily returns of two price
/// series.
///
/// The series are first inner-joined on date (dates not present in both are
/// dropped), returns are computed on each aligned side, and the coefficient
/// is `cov(a, b) / (σ_a · σ_b)` using the sample (n−1) form throughout. The
/// result is clamped to [−1, 1] against floating-point drift. Symmetric in
/// its arguments.
///
/// # Errors
/// * [`AnalyticsError::InsufficientOverlap`] if fewer than 3 dates are shared
///   (correlation needs at least 2 return observations per side)
/// * [`AnalyticsError::InvalidPrice`] if an aligned price is not positive
/// * [`AnalyticsError::DegenerateSeries`] if either return sequence has zero
///   variance
pub fn compute_correlation(a: &PriceSeries, b: &PriceSeries) -> Result<f64, AnalyticsError> {
    let (aligned_a, aligned_b) = align_by_date(a, b);

    if aligned_a.len() < 3 {
        return Err(AnalyticsError::InsufficientOverlap {
            common_dates: aligned_a.len(),
        });
    }

    let returns_a = return_values(&aligned_a)?;
    let returns_b = return_values(&aligned_b)?;

    let std_a = sample_std_dev(&returns_a);
    let std_b = sample_std_dev(&returns_b);
    if std_a == 0.0 || std_b == 0.0 {
        return Err(AnalyticsError::DegenerateSeries);
    }

    let correlation = sample_covariance(&returns_a, &returns_b) / (std_a * std_b);
    Ok(correlation.clamp(-1.0, 1.0))
}

/// Computes the sample standard deviation (n−1 denominator).
///
/// Returns NaN with fewer than 2 values; the analytics that call this check
/// their observation counts first.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sum_squared_diff: f64 = values.iter().map(|&v| (v - mean).powi(2)).sum();

    (sum_squared_diff / (n - 1.0)).sqrt()
}

/// Arithmetic returns over consecutive points, validating price positivity.
fn return_values(points: &[PricePoint]) -> Result<Vec<f64>, AnalyticsError> {
    if points.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            required: 2,
            actual: points.len(),
        });
    }

    if let Some(bad) = points.iter().find(|p| p.price <= 0.0) {
        return Err(AnalyticsError::InvalidPrice {
            date: bad.date,
            price: bad.price,
        });
    }

    Ok(points
        .windows(2)
        .map(|w| (w[1].price - w[0].price) / w[0].price)
        .collect())
}

/// Sample covariance (n−1 denominator) of two equal-length sequences.
fn sample_covariance(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;

    a.iter()
        .zip(b)
        .map(|(&x, &y)| (x - mean_a) * (y - mean_b))
        .sum::<f64>()
        / (n - 1.0)
}

/// Inner-joins two date-sorted price series on date.
///
/// Both inputs are sorted with unique dates (the series constructor enforces
/// it), so a single merge pass suffices.
fn align_by_date(a: &PriceSeries, b: &PriceSeries) -> (Vec<PricePoint>, Vec<PricePoint>) {
    let (points_a, points_b) = (a.points(), b.points());
    let mut aligned_a = Vec::new();
    let mut aligned_b = Vec::new();

    let (mut i, mut j) = (0, 0);
    while i < points_a.len() && j < points_b.len() {
        match points_a[i].date.cmp(&points_b[j].date) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                aligned_a.push(points_a[i]);
                aligned_b.push(points_b[j]);
                i += 1;
                j += 1;
            }
        }
    }

    (aligned_a, aligned_b)
}
