//! Shared test utilities and fixture generators

use polars::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Create a small appointments DataFrame with known characteristics
///
/// The five rows cover the interesting cases:
/// - row 0 has a negative age and must be dropped by cleaning
/// - the remaining ages 10, 40, 60, 18 land in the four distinct brackets
/// - SMS flags split the cleaned rows into two groups of two
/// - disease flags give history scores 0, 1 and 2
/// - `Gender` is a passenger column the pipeline must carry untouched
pub fn create_appointments_dataframe() -> DataFrame {
    df! {
        "Gender" => ["F", "M", "F", "F", "M"],
        "Age" => [-1i32, 10, 40, 60, 18],
        "SMS_received" => [1i32, 0, 1, 1, 0],
        "Hipertension" => [0i32, 0, 1, 1, 0],
        "Diabetes" => [0i32, 0, 0, 1, 0],
        "No-show" => ["Yes", "No", "Yes", "No", "Yes"],
    }
    .unwrap()
}

/// Create a larger appointments DataFrame for stress and benchmark-style tests
pub fn create_large_appointments_dataframe(rows: usize) -> DataFrame {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    let ages: Vec<i32> = (0..rows).map(|_| rng.gen_range(0..100)).collect();
    let sms: Vec<i32> = (0..rows).map(|_| rng.gen_range(0..2)).collect();
    let hypertension: Vec<i32> = (0..rows).map(|_| rng.gen_range(0..2)).collect();
    let diabetes: Vec<i32> = (0..rows).map(|_| rng.gen_range(0..2)).collect();
    let outcome: Vec<&str> = (0..rows)
        .map(|_| if rng.gen::<f64>() < 0.2 { "Yes" } else { "No" })
        .collect();

    df! {
        "Age" => ages,
        "SMS_received" => sms,
        "Hipertension" => hypertension,
        "Diabetes" => diabetes,
        "No-show" => outcome,
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("appointments.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("appointments.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(
        rows, expected_rows,
        "Row count mismatch: expected {}, got {}",
        expected_rows, rows
    );
    assert_eq!(
        cols, expected_cols,
        "Column count mismatch: expected {}, got {}",
        expected_cols, cols
    );
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Collect a string column into owned values for easy assertions
pub fn string_column(df: &DataFrame, name: &str) -> Vec<Option<String>> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect()
}
