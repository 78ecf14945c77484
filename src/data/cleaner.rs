//! Data Cleaner Module
//! Category normalization, duplicate removal, business-rule validation and
//! revenue imputation.

use crate::config::{AnalysisConfig, TenurePolicy};
use crate::data::schema::{canonical_method, columns, weeks};
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("unrecognized sales_method value {value:?} at row {row}")]
    SchemaViolation { value: String, row: usize },
    #[error("null value in column {column} at row {row}")]
    NullValue { column: &'static str, row: usize },
    #[error("no revenue observations to impute from for method {method:?}")]
    NoRevenueObservations { method: String },
}

/// A tenure value above the configured cap, and what was done about it.
#[derive(Debug, Clone)]
pub struct TenureCorrection {
    pub row: usize,
    pub customer_id: String,
    pub original: i64,
    /// `None` when the row was dropped or the value was left in place.
    pub corrected: Option<i64>,
}

/// A week value outside the campaign range. Recorded, never corrected.
#[derive(Debug, Clone)]
pub struct WeekFlag {
    pub row: usize,
    pub customer_id: String,
    pub week: i64,
}

/// What the cleaning pass changed.
#[derive(Debug, Default)]
pub struct CleanReport {
    pub rows_in: usize,
    pub rows_out: usize,
    pub duplicates_removed: usize,
    pub tenure_corrections: Vec<TenureCorrection>,
    pub week_flags: Vec<WeekFlag>,
    pub imputed_rows: usize,
}

/// One interaction while it moves through the cleaning steps.
#[derive(Debug, Clone)]
struct Row {
    week: i64,
    method: &'static str,
    customer_id: String,
    nb_sold: i64,
    revenue: Option<f64>,
    years_as_customer: i64,
    nb_site_visits: i64,
    state: String,
}

impl Row {
    /// Full-row identity used for exact-duplicate detection.
    fn identity(&self) -> (i64, &'static str, String, i64, Option<u64>, i64, i64, String) {
        (
            self.week,
            self.method,
            self.customer_id.clone(),
            self.nb_sold,
            self.revenue.map(f64::to_bits),
            self.years_as_customer,
            self.nb_site_visits,
            self.state.clone(),
        )
    }
}

/// Brings the raw table into its invariant-satisfying form.
pub struct DataCleaner;

impl DataCleaner {
    /// Run the cleaning steps in order: normalize categories, drop exact
    /// duplicates (first occurrence kept), apply the tenure rule, impute
    /// missing revenue from method means. The input frame is never mutated;
    /// a new frame is returned together with a report of the corrections.
    pub fn clean(
        df: &DataFrame,
        config: &AnalysisConfig,
    ) -> Result<(DataFrame, CleanReport), CleanerError> {
        let mut report = CleanReport {
            rows_in: df.height(),
            ..CleanReport::default()
        };

        let rows = Self::extract_rows(df)?;
        let rows = Self::drop_duplicates(rows, &mut report);
        let rows = Self::apply_tenure_rule(rows, config, &mut report);
        Self::flag_week_range(&rows, &mut report);
        let rows = Self::impute_revenue(rows, &mut report)?;

        report.rows_out = rows.len();
        Ok((Self::to_dataframe(&rows)?, report))
    }

    /// Pull typed values out of the frame, normalizing `sales_method` on the
    /// way. An unrecognized method value aborts the run; silent coercion
    /// would corrupt every downstream aggregate.
    fn extract_rows(df: &DataFrame) -> Result<Vec<Row>, CleanerError> {
        let week = int_values(df, columns::WEEK)?;
        let customer_id = str_values(df, columns::CUSTOMER_ID)?;
        let nb_sold = int_values(df, columns::NB_SOLD)?;
        let revenue = opt_float_values(df, columns::REVENUE)?;
        let years = int_values(df, columns::YEARS_AS_CUSTOMER)?;
        let visits = int_values(df, columns::NB_SITE_VISITS)?;
        let state = str_values(df, columns::STATE)?;

        let method_cast = df.column(columns::SALES_METHOD)?.cast(&DataType::String)?;
        let method_ca = method_cast.as_materialized_series().str()?;

        let mut rows = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let raw = method_ca.get(i).ok_or(CleanerError::NullValue {
                column: columns::SALES_METHOD,
                row: i,
            })?;
            let method = canonical_method(raw).ok_or_else(|| CleanerError::SchemaViolation {
                value: raw.to_string(),
                row: i,
            })?;

            rows.push(Row {
                week: week[i],
                method,
                customer_id: customer_id[i].clone(),
                nb_sold: nb_sold[i],
                revenue: revenue[i],
                years_as_customer: years[i],
                nb_site_visits: visits[i],
                state: state[i].clone(),
            });
        }
        Ok(rows)
    }

    /// Collapse rows identical across every column to their first occurrence.
    fn drop_duplicates(rows: Vec<Row>, report: &mut CleanReport) -> Vec<Row> {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(rows.len());
        for row in rows {
            if seen.insert(row.identity()) {
                kept.push(row);
            } else {
                report.duplicates_removed += 1;
            }
        }
        kept
    }

    /// Apply the configured corrective action to tenure values above the cap.
    fn apply_tenure_rule(
        rows: Vec<Row>,
        config: &AnalysisConfig,
        report: &mut CleanReport,
    ) -> Vec<Row> {
        let cap = config.tenure_cap;
        let mut kept = Vec::with_capacity(rows.len());
        for (i, mut row) in rows.into_iter().enumerate() {
            if row.years_as_customer <= cap {
                kept.push(row);
                continue;
            }

            let original = row.years_as_customer;
            let correction = TenureCorrection {
                row: i,
                customer_id: row.customer_id.clone(),
                original,
                corrected: match config.tenure_policy {
                    TenurePolicy::Clip => Some(cap),
                    TenurePolicy::Drop | TenurePolicy::Flag => None,
                },
            };
            warn!(
                row = i,
                customer_id = %row.customer_id,
                original,
                policy = ?config.tenure_policy,
                "years_as_customer above cap {cap}"
            );
            report.tenure_corrections.push(correction);

            match config.tenure_policy {
                TenurePolicy::Clip => {
                    row.years_as_customer = cap;
                    kept.push(row);
                }
                TenurePolicy::Drop => {}
                TenurePolicy::Flag => kept.push(row),
            }
        }
        kept
    }

    /// Record week values outside the campaign range. No corrective rule
    /// exists for these, so they are flagged only.
    fn flag_week_range(rows: &[Row], report: &mut CleanReport) {
        for (i, row) in rows.iter().enumerate() {
            if row.week < weeks::MIN || row.week > weeks::MAX {
                warn!(
                    row = i,
                    customer_id = %row.customer_id,
                    week = row.week,
                    "week outside expected range {}..={}",
                    weeks::MIN,
                    weeks::MAX
                );
                report.week_flags.push(WeekFlag {
                    row: i,
                    customer_id: row.customer_id.clone(),
                    week: row.week,
                });
            }
        }
    }

    /// Fill missing revenue with the mean over the non-missing rows of the
    /// same method. Means are taken from the already-deduplicated table and
    /// imputed values never feed back into them.
    fn impute_revenue(mut rows: Vec<Row>, report: &mut CleanReport) -> Result<Vec<Row>, CleanerError> {
        let mut sums: HashMap<&'static str, (f64, usize)> = HashMap::new();
        for row in &rows {
            if let Some(revenue) = row.revenue {
                let entry = sums.entry(row.method).or_insert((0.0, 0));
                entry.0 += revenue;
                entry.1 += 1;
            }
        }

        for row in &mut rows {
            if row.revenue.is_some() {
                continue;
            }
            let (sum, count) =
                sums.get(row.method)
                    .copied()
                    .ok_or_else(|| CleanerError::NoRevenueObservations {
                        method: row.method.to_string(),
                    })?;
            row.revenue = Some(sum / count as f64);
            report.imputed_rows += 1;
        }
        Ok(rows)
    }

    /// Rebuild a DataFrame from the cleaned rows.
    fn to_dataframe(rows: &[Row]) -> Result<DataFrame, CleanerError> {
        let df = DataFrame::new(vec![
            Column::new(
                columns::WEEK.into(),
                rows.iter().map(|r| r.week).collect::<Vec<i64>>(),
            ),
            Column::new(
                columns::SALES_METHOD.into(),
                rows.iter().map(|r| r.method.to_string()).collect::<Vec<String>>(),
            ),
            Column::new(
                columns::CUSTOMER_ID.into(),
                rows.iter().map(|r| r.customer_id.clone()).collect::<Vec<String>>(),
            ),
            Column::new(
                columns::NB_SOLD.into(),
                rows.iter().map(|r| r.nb_sold).collect::<Vec<i64>>(),
            ),
            Series::new(
                columns::REVENUE.into(),
                rows.iter().map(|r| r.revenue).collect::<Vec<Option<f64>>>(),
            )
            .into(),
            Column::new(
                columns::YEARS_AS_CUSTOMER.into(),
                rows.iter().map(|r| r.years_as_customer).collect::<Vec<i64>>(),
            ),
            Column::new(
                columns::NB_SITE_VISITS.into(),
                rows.iter().map(|r| r.nb_site_visits).collect::<Vec<i64>>(),
            ),
            Column::new(
                columns::STATE.into(),
                rows.iter().map(|r| r.state.clone()).collect::<Vec<String>>(),
            ),
        ])?;
        Ok(df)
    }
}

fn int_values(df: &DataFrame, column: &'static str) -> Result<Vec<i64>, CleanerError> {
    let cast = df.column(column)?.cast(&DataType::Int64)?;
    let ca = cast.as_materialized_series().i64()?;
    (0..ca.len())
        .map(|row| ca.get(row).ok_or(CleanerError::NullValue { column, row }))
        .collect()
}

fn str_values(df: &DataFrame, column: &'static str) -> Result<Vec<String>, CleanerError> {
    let cast = df.column(column)?.cast(&DataType::String)?;
    let ca = cast.as_materialized_series().str()?;
    (0..ca.len())
        .map(|row| {
            ca.get(row)
                .map(str::to_string)
                .ok_or(CleanerError::NullValue { column, row })
        })
        .collect()
}

fn opt_float_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>, CleanerError> {
    let cast = df.column(column)?.cast(&DataType::Float64)?;
    let ca = cast.as_materialized_series().f64()?;
    Ok(ca.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::schema::methods;

    fn raw_frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new(columns::WEEK.into(), &[1i64, 2, 3, 1, 1]).into(),
            Series::new(
                columns::SALES_METHOD.into(),
                &[" Email ", "email", "Email", "Call", "Call"],
            )
            .into(),
            Series::new(columns::CUSTOMER_ID.into(), &["c1", "c2", "c3", "c4", "c4"]).into(),
            Series::new(columns::NB_SOLD.into(), &[10i64, 8, 6, 5, 5]).into(),
            Series::new(
                columns::REVENUE.into(),
                &[Some(100.0), Some(90.0), None, Some(50.0), Some(50.0)],
            )
            .into(),
            Series::new(columns::YEARS_AS_CUSTOMER.into(), &[3i64, 45, 12, 2, 2]).into(),
            Series::new(columns::NB_SITE_VISITS.into(), &[20i64, 18, 15, 10, 10]).into(),
            Series::new(
                columns::STATE.into(),
                &["Texas", "Ohio", "Iowa", "Texas", "Texas"],
            )
            .into(),
        ])
        .unwrap()
    }

    fn revenues(df: &DataFrame) -> Vec<Option<f64>> {
        df.column(columns::REVENUE)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn methods_of(df: &DataFrame) -> Vec<String> {
        str_values(df, columns::SALES_METHOD).unwrap()
    }

    #[test]
    fn end_to_end_five_row_scenario() {
        let (clean, report) = DataCleaner::clean(&raw_frame(), &AnalysisConfig::default()).unwrap();

        // One exact duplicate collapsed
        assert_eq!(clean.height(), 4);
        assert_eq!(report.duplicates_removed, 1);

        // Variant spellings normalized
        let methods = methods_of(&clean);
        assert_eq!(methods, vec!["email", "email", "email", "call"]);

        // Tenure 45 clipped to the cap
        let years = int_values(&clean, columns::YEARS_AS_CUSTOMER).unwrap();
        assert_eq!(years, vec![3, 39, 12, 2]);
        assert_eq!(report.tenure_corrections.len(), 1);
        assert_eq!(report.tenure_corrections[0].original, 45);
        assert_eq!(report.tenure_corrections[0].corrected, Some(39));

        // Missing revenue filled with the mean of the other email rows
        let revenue = revenues(&clean);
        assert_eq!(revenue[2], Some(95.0));
        assert_eq!(report.imputed_rows, 1);
    }

    #[test]
    fn cleaned_table_satisfies_invariants() {
        let (clean, _) = DataCleaner::clean(&raw_frame(), &AnalysisConfig::default()).unwrap();

        assert!(revenues(&clean).iter().all(Option::is_some));
        assert!(methods_of(&clean)
            .iter()
            .all(|m| methods::ALL.contains(&m.as_str())));
        assert!(int_values(&clean, columns::YEARS_AS_CUSTOMER)
            .unwrap()
            .iter()
            .all(|&y| y <= 39));

        // No two rows identical across all columns
        let rows = DataCleaner::extract_rows(&clean).unwrap();
        let identities: HashSet<_> = rows.iter().map(Row::identity).collect();
        assert_eq!(identities.len(), rows.len());
    }

    #[test]
    fn cleaning_is_idempotent() {
        let config = AnalysisConfig::default();
        let (once, _) = DataCleaner::clean(&raw_frame(), &config).unwrap();
        let (twice, report) = DataCleaner::clean(&once, &config).unwrap();

        assert_eq!(report.duplicates_removed, 0);
        assert_eq!(report.imputed_rows, 0);
        assert!(report.tenure_corrections.is_empty());
        assert!(once.equals(&twice));
    }

    #[test]
    fn unknown_method_fails_loudly() {
        let mut df = raw_frame();
        df.with_column(Series::new(
            columns::SALES_METHOD.into(),
            &["Email", "fax", "Email", "Call", "Call"],
        ))
        .unwrap();

        let err = DataCleaner::clean(&df, &AnalysisConfig::default()).unwrap_err();
        match err {
            CleanerError::SchemaViolation { value, row } => {
                assert_eq!(value, "fax");
                assert_eq!(row, 1);
            }
            other => panic!("expected SchemaViolation, got {other:?}"),
        }
    }

    #[test]
    fn imputation_uses_mean_of_other_rows_of_same_method() {
        // Three call rows summing to 60.0 plus one missing: must get 60/3.
        let df = DataFrame::new(vec![
            Series::new(columns::WEEK.into(), &[1i64, 1, 2, 2]).into(),
            Series::new(columns::SALES_METHOD.into(), &["Call", "Call", "Call", "Call"]).into(),
            Series::new(columns::CUSTOMER_ID.into(), &["a", "b", "c", "d"]).into(),
            Series::new(columns::NB_SOLD.into(), &[1i64, 2, 3, 4]).into(),
            Series::new(
                columns::REVENUE.into(),
                &[Some(10.0), Some(20.0), Some(30.0), None],
            )
            .into(),
            Series::new(columns::YEARS_AS_CUSTOMER.into(), &[1i64, 1, 1, 1]).into(),
            Series::new(columns::NB_SITE_VISITS.into(), &[5i64, 5, 5, 5]).into(),
            Series::new(columns::STATE.into(), &["Ohio", "Ohio", "Iowa", "Iowa"]).into(),
        ])
        .unwrap();

        let (clean, _) = DataCleaner::clean(&df, &AnalysisConfig::default()).unwrap();
        assert_eq!(revenues(&clean)[3], Some(20.0));
    }

    #[test]
    fn imputation_without_any_observation_is_an_error() {
        let df = DataFrame::new(vec![
            Series::new(columns::WEEK.into(), &[1i64]).into(),
            Series::new(columns::SALES_METHOD.into(), &["Email + Call"]).into(),
            Series::new(columns::CUSTOMER_ID.into(), &["a"]).into(),
            Series::new(columns::NB_SOLD.into(), &[1i64]).into(),
            Series::new(columns::REVENUE.into(), &[None::<f64>]).into(),
            Series::new(columns::YEARS_AS_CUSTOMER.into(), &[1i64]).into(),
            Series::new(columns::NB_SITE_VISITS.into(), &[5i64]).into(),
            Series::new(columns::STATE.into(), &["Ohio"]).into(),
        ])
        .unwrap();

        let err = DataCleaner::clean(&df, &AnalysisConfig::default()).unwrap_err();
        match err {
            CleanerError::NoRevenueObservations { method } => {
                assert_eq!(method, methods::EMAIL_AND_CALL)
            }
            other => panic!("expected NoRevenueObservations, got {other:?}"),
        }
    }

    #[test]
    fn tenure_policy_drop_removes_the_row() {
        let config = AnalysisConfig {
            tenure_policy: TenurePolicy::Drop,
            ..AnalysisConfig::default()
        };
        let (clean, report) = DataCleaner::clean(&raw_frame(), &config).unwrap();

        assert_eq!(clean.height(), 3);
        assert_eq!(report.tenure_corrections.len(), 1);
        assert_eq!(report.tenure_corrections[0].corrected, None);
    }

    #[test]
    fn tenure_policy_flag_keeps_the_value() {
        let config = AnalysisConfig {
            tenure_policy: TenurePolicy::Flag,
            ..AnalysisConfig::default()
        };
        let (clean, report) = DataCleaner::clean(&raw_frame(), &config).unwrap();

        let years = int_values(&clean, columns::YEARS_AS_CUSTOMER).unwrap();
        assert!(years.contains(&45));
        assert_eq!(report.tenure_corrections.len(), 1);
    }

    #[test]
    fn out_of_range_weeks_are_flagged_not_corrected() {
        let mut df = raw_frame();
        df.with_column(Series::new(columns::WEEK.into(), &[1i64, 9, 3, 1, 1])).unwrap();

        let (clean, report) = DataCleaner::clean(&df, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.week_flags.len(), 1);
        assert_eq!(report.week_flags[0].week, 9);
        assert!(int_values(&clean, columns::WEEK).unwrap().contains(&9));
    }
}
