//! CSV Loader Module
//! Strict loading of the sales interaction table using Polars.

use crate::data::schema::columns;
use polars::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("input file not found: {path}")]
    FileNotFound { path: String },
    #[error("failed to read CSV {path}: {source}")]
    Csv { path: String, source: PolarsError },
    #[error("schema mismatch in {path}: missing columns {missing:?}, unexpected columns {extra:?}")]
    SchemaMismatch {
        path: String,
        missing: Vec<String>,
        extra: Vec<String>,
    },
}

/// Loads the sales interaction CSV into a DataFrame.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file and validate its column set against the declared schema.
    ///
    /// Parse errors are fatal: a malformed cell must fail the load rather
    /// than turn into a null that imputation would later fill with data.
    pub fn load_csv(file_path: &Path) -> Result<DataFrame, DataLoadError> {
        if !file_path.exists() {
            return Err(DataLoadError::FileNotFound {
                path: file_path.display().to_string(),
            });
        }

        // Use lazy evaluation for memory efficiency, then collect
        let df = LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(10000))
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|source| DataLoadError::Csv {
                path: file_path.display().to_string(),
                source,
            })?;

        Self::validate_columns(&df, file_path)?;
        Ok(df)
    }

    /// Check that the loaded column set matches the schema exactly.
    fn validate_columns(df: &DataFrame, file_path: &Path) -> Result<(), DataLoadError> {
        let present: HashSet<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut missing: Vec<String> = columns::ALL
            .iter()
            .filter(|c| !present.contains(**c))
            .map(|c| c.to_string())
            .collect();
        let mut extra: Vec<String> = present
            .iter()
            .filter(|c| !columns::ALL.contains(&c.as_str()))
            .cloned()
            .collect();

        if missing.is_empty() && extra.is_empty() {
            return Ok(());
        }

        missing.sort();
        extra.sort();
        Err(DataLoadError::SchemaMismatch {
            path: file_path.display().to_string(),
            missing,
            extra,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_fixture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("salescope_{}_{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    const HEADER: &str =
        "week,sales_method,customer_id,nb_sold,revenue,years_as_customer,nb_site_visits,state";

    #[test]
    fn loads_a_well_formed_file() {
        let path = write_fixture(
            "ok.csv",
            &format!("{HEADER}\n1,Email,a1,10,120.5,3,24,Texas\n2,Call,b2,7,52.0,1,12,Ohio\n"),
        );
        let df = DataLoader::load_csv(&path).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), columns::ALL.len());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let err = DataLoader::load_csv(Path::new("/nonexistent/product_sales.csv")).unwrap_err();
        match err {
            DataLoadError::FileNotFound { path } => assert!(path.contains("product_sales.csv")),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn column_set_mismatch_lists_missing_and_extra() {
        let path = write_fixture(
            "badschema.csv",
            "week,sales_method,customer_id,nb_sold,revenue,tenure,nb_site_visits,state,notes\n\
             1,Email,a1,10,120.5,3,24,Texas,hello\n",
        );
        let err = DataLoader::load_csv(&path).unwrap_err();
        match err {
            DataLoadError::SchemaMismatch { missing, extra, .. } => {
                assert_eq!(missing, vec!["years_as_customer".to_string()]);
                assert_eq!(extra, vec!["notes".to_string(), "tenure".to_string()]);
            }
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
        fs::remove_file(path).unwrap();
    }
}
