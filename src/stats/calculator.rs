//! Statistics Calculator Module
//! Descriptive revenue statistics per sales method.

use crate::stats::aggregator::{Aggregator, AggregatorError};
use polars::prelude::*;
use serde::Serialize;

/// Descriptive statistics for one group of revenue values.
#[derive(Debug, Clone, Serialize)]
pub struct RevenueStats {
    pub sales_method: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub p05: f64,
    pub p95: f64,
}

pub struct StatsCalculator;

impl StatsCalculator {
    /// Descriptive revenue statistics for every observed method. Methods with
    /// no rows are simply absent.
    pub fn revenue_stats_by_method(df: &DataFrame) -> Result<Vec<RevenueStats>, AggregatorError> {
        let by_method = Aggregator::revenue_by_method(df)?;
        Ok(by_method
            .into_iter()
            .filter_map(|(method, values)| Self::describe(&method, &values))
            .collect())
    }

    /// Compute descriptive statistics for an array of values.
    fn describe(sales_method: &str, values: &[f64]) -> Option<RevenueStats> {
        let n = values.len();
        if n == 0 {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        Some(RevenueStats {
            sales_method: sales_method.to_string(),
            count: n,
            mean,
            median,
            std: variance.sqrt(),
            p05: Self::percentile(&sorted, 5.0),
            p95: Self::percentile(&sorted, 95.0),
        })
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }
}
