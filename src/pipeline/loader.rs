//! Appointment dataset loader for CSV and Parquet files

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use crate::utils::progress::create_spinner;

/// Column holding the patient's age in years.
pub const AGE_COLUMN: &str = "Age";
/// Binary flag recording whether an SMS reminder was sent.
pub const SMS_COLUMN: &str = "SMS_received";
/// Binary hypertension flag, spelled as in the source data.
pub const HYPERTENSION_COLUMN: &str = "Hipertension";
/// Binary diabetes flag.
pub const DIABETES_COLUMN: &str = "Diabetes";

/// Columns the analysis reads besides the configurable outcome column.
pub const ANALYSIS_COLUMNS: [&str; 4] =
    [AGE_COLUMN, SMS_COLUMN, HYPERTENSION_COLUMN, DIABETES_COLUMN];

/// Load a dataset from a file (CSV or Parquet based on extension)
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<LazyFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    // Schema length 0 means scan the entire file
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match extension.as_str() {
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(schema_length)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    Ok(lf)
}

/// Load a dataset and collect it into memory, showing a spinner while reading.
///
/// Returns the DataFrame together with its row count, column count, and
/// estimated in-memory size in megabytes.
pub fn load_dataset_with_progress(
    path: &Path,
    infer_schema_length: usize,
) -> Result<(DataFrame, usize, usize, f64)> {
    let spinner = create_spinner(&format!("Loading {}...", path.display()));

    let lf = load_dataset(path, infer_schema_length)?;
    let df = lf
        .collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))?;

    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);

    spinner.finish_and_clear();

    Ok((df, rows, cols, memory_mb))
}

/// Verify that every required column is present, failing with the full
/// column listing when one is missing.
pub fn ensure_required_columns(df: &DataFrame, required: &[&str]) -> Result<()> {
    let column_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let missing: Vec<&str> = required
        .iter()
        .filter(|name| !column_names.iter().any(|c| c == *name))
        .copied()
        .collect();

    if !missing.is_empty() {
        anyhow::bail!(
            "Required column(s) {:?} not found in dataset. Available columns: {:?}",
            missing,
            column_names
        );
    }

    Ok(())
}

/// Count nulls in the given columns, returning only columns that have any.
///
/// The reference dataset has none, so anything reported here is a data
/// quality warning for the run summary.
pub fn count_column_nulls(df: &DataFrame, columns: &[&str]) -> Vec<(String, usize)> {
    columns
        .iter()
        .filter_map(|name| {
            let nulls = df.column(name).ok()?.null_count();
            if nulls > 0 {
                Some((name.to_string(), nulls))
            } else {
                None
            }
        })
        .collect()
}
