//! Aggregator Module
//! Grouped summary statistics over the cleaned interaction table.

use crate::data::schema::columns;
use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("null value in column {column} at row {row}")]
    NullValue { column: &'static str, row: usize },
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodSummary {
    pub sales_method: String,
    pub count: usize,
    pub total_revenue: f64,
    pub mean_revenue: f64,
    pub mean_nb_sold: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodWeekSummary {
    pub sales_method: String,
    pub week: i64,
    pub count: usize,
    pub total_revenue: f64,
    pub mean_revenue: f64,
    pub mean_nb_sold: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MethodStateSummary {
    pub sales_method: String,
    pub state: String,
    pub count: usize,
    pub total_revenue: f64,
    pub mean_revenue: f64,
    pub mean_nb_sold: f64,
}

/// Running totals for one grouping key.
#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    count: usize,
    revenue_sum: f64,
    nb_sold_sum: i64,
}

impl Accumulator {
    fn add(&mut self, revenue: f64, nb_sold: i64) {
        self.count += 1;
        self.revenue_sum += revenue;
        self.nb_sold_sum += nb_sold;
    }

    fn mean_revenue(&self) -> f64 {
        self.revenue_sum / self.count as f64
    }

    fn mean_nb_sold(&self) -> f64 {
        self.nb_sold_sum as f64 / self.count as f64
    }
}

/// Pure grouped aggregation over the cleaned table. Identical input yields
/// identical output; keys with no rows are never materialized.
pub struct Aggregator;

impl Aggregator {
    /// Group by sales method.
    pub fn by_method(df: &DataFrame) -> Result<Vec<MethodSummary>, AggregatorError> {
        let groups = Self::accumulate(df, |method, _, _| method.to_string())?;
        Ok(groups
            .into_iter()
            .map(|(sales_method, acc)| MethodSummary {
                sales_method,
                count: acc.count,
                total_revenue: acc.revenue_sum,
                mean_revenue: acc.mean_revenue(),
                mean_nb_sold: acc.mean_nb_sold(),
            })
            .collect())
    }

    /// Group by (sales method, week) for temporal trend reporting.
    pub fn by_method_week(df: &DataFrame) -> Result<Vec<MethodWeekSummary>, AggregatorError> {
        let groups = Self::accumulate(df, |method, week, _| (method.to_string(), week))?;
        Ok(groups
            .into_iter()
            .map(|((sales_method, week), acc)| MethodWeekSummary {
                sales_method,
                week,
                count: acc.count,
                total_revenue: acc.revenue_sum,
                mean_revenue: acc.mean_revenue(),
                mean_nb_sold: acc.mean_nb_sold(),
            })
            .collect())
    }

    /// Group by (sales method, state) for geographic reporting.
    pub fn by_method_state(df: &DataFrame) -> Result<Vec<MethodStateSummary>, AggregatorError> {
        let groups = Self::accumulate(df, |method, _, state| (method.to_string(), state.to_string()))?;
        Ok(groups
            .into_iter()
            .map(|((sales_method, state), acc)| MethodStateSummary {
                sales_method,
                state,
                count: acc.count,
                total_revenue: acc.revenue_sum,
                mean_revenue: acc.mean_revenue(),
                mean_nb_sold: acc.mean_nb_sold(),
            })
            .collect())
    }

    /// Revenue values per method, for descriptive statistics.
    pub fn revenue_by_method(df: &DataFrame) -> Result<BTreeMap<String, Vec<f64>>, AggregatorError> {
        let method_cast = df.column(columns::SALES_METHOD)?.cast(&DataType::String)?;
        let method_ca = method_cast.as_materialized_series().str()?;
        let revenue_cast = df.column(columns::REVENUE)?.cast(&DataType::Float64)?;
        let revenue_ca = revenue_cast.as_materialized_series().f64()?;

        let mut values: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for row in 0..df.height() {
            let method = method_ca.get(row).ok_or(AggregatorError::NullValue {
                column: columns::SALES_METHOD,
                row,
            })?;
            let revenue = revenue_ca.get(row).ok_or(AggregatorError::NullValue {
                column: columns::REVENUE,
                row,
            })?;
            values.entry(method.to_string()).or_default().push(revenue);
        }
        Ok(values)
    }

    /// Single pass over the table, accumulating per key. BTreeMap keeps the
    /// output order deterministic.
    fn accumulate<K: Ord>(
        df: &DataFrame,
        key: impl Fn(&str, i64, &str) -> K,
    ) -> Result<BTreeMap<K, Accumulator>, AggregatorError> {
        let method_cast = df.column(columns::SALES_METHOD)?.cast(&DataType::String)?;
        let method_ca = method_cast.as_materialized_series().str()?;
        let state_cast = df.column(columns::STATE)?.cast(&DataType::String)?;
        let state_ca = state_cast.as_materialized_series().str()?;
        let week_cast = df.column(columns::WEEK)?.cast(&DataType::Int64)?;
        let week_ca = week_cast.as_materialized_series().i64()?;
        let revenue_cast = df.column(columns::REVENUE)?.cast(&DataType::Float64)?;
        let revenue_ca = revenue_cast.as_materialized_series().f64()?;
        let nb_sold_cast = df.column(columns::NB_SOLD)?.cast(&DataType::Int64)?;
        let nb_sold_ca = nb_sold_cast.as_materialized_series().i64()?;

        let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
        for row in 0..df.height() {
            let method = method_ca.get(row).ok_or(AggregatorError::NullValue {
                column: columns::SALES_METHOD,
                row,
            })?;
            let state = state_ca.get(row).ok_or(AggregatorError::NullValue {
                column: columns::STATE,
                row,
            })?;
            let week = week_ca.get(row).ok_or(AggregatorError::NullValue {
                column: columns::WEEK,
                row,
            })?;
            let revenue = revenue_ca.get(row).ok_or(AggregatorError::NullValue {
                column: columns::REVENUE,
                row,
            })?;
            let nb_sold = nb_sold_ca.get(row).ok_or(AggregatorError::NullValue {
                column: columns::NB_SOLD,
                row,
            })?;

            groups
                .entry(key(method, week, state))
                .or_default()
                .add(revenue, nb_sold);
        }
        Ok(groups)
    }
}
