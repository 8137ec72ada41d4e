//! Tests for the data cleaning stage

use noshow::pipeline::{clean_dataset, DuplicatePolicy};
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_cleaning_drops_negative_ages() {
    let df = create_appointments_dataframe();

    let (cleaned, report) = clean_dataset(&df, DuplicatePolicy::Report).unwrap();

    assert_shape(&cleaned, 4, 6);
    assert_eq!(report.rows_before, 5);
    assert_eq!(report.negative_ages_dropped, 1);
    assert_eq!(report.rows_after, 4);

    let ages: Vec<i32> = cleaned
        .column("Age")
        .unwrap()
        .i32()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert!(ages.iter().all(|&age| age >= 0), "All ages should be non-negative");
}

#[test]
fn test_cleaning_twice_is_noop() {
    let df = create_appointments_dataframe();

    let (cleaned_once, _) = clean_dataset(&df, DuplicatePolicy::Drop).unwrap();
    let (cleaned_twice, second_report) = clean_dataset(&cleaned_once, DuplicatePolicy::Drop).unwrap();

    assert_eq!(cleaned_once.height(), cleaned_twice.height());
    assert_eq!(second_report.negative_ages_dropped, 0);
    assert_eq!(second_report.duplicates_dropped, 0);
}

#[test]
fn test_report_policy_counts_duplicates_without_dropping() {
    let df = df! {
        "Age" => [30i32, 30, 45],
        "SMS_received" => [1i32, 1, 0],
        "Hipertension" => [0i32, 0, 1],
        "Diabetes" => [0i32, 0, 0],
        "No-show" => ["Yes", "Yes", "No"],
    }
    .unwrap();

    let (cleaned, report) = clean_dataset(&df, DuplicatePolicy::Report).unwrap();

    assert_eq!(report.duplicates_found, 1);
    assert_eq!(report.duplicates_dropped, 0);
    assert_eq!(cleaned.height(), 3, "Report policy must keep every row");
}

#[test]
fn test_drop_policy_keeps_first_occurrence() {
    let df = df! {
        "Age" => [30i32, 30, 45, 30],
        "SMS_received" => [1i32, 1, 0, 1],
        "Hipertension" => [0i32, 0, 1, 0],
        "Diabetes" => [0i32, 0, 0, 0],
        "No-show" => ["Yes", "Yes", "No", "Yes"],
    }
    .unwrap();

    let (cleaned, report) = clean_dataset(&df, DuplicatePolicy::Drop).unwrap();

    assert_eq!(report.duplicates_found, 2);
    assert_eq!(report.duplicates_dropped, 2);
    assert_eq!(cleaned.height(), 2);

    let ages: Vec<i32> = cleaned
        .column("Age")
        .unwrap()
        .i32()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_eq!(ages, vec![30, 45], "First occurrence survives in original order");
}

#[test]
fn test_rows_differing_in_one_column_are_not_duplicates() {
    let df = df! {
        "Age" => [30i32, 30],
        "SMS_received" => [1i32, 1],
        "Hipertension" => [0i32, 0],
        "Diabetes" => [0i32, 0],
        "No-show" => ["Yes", "No"],
    }
    .unwrap();

    let (_, report) = clean_dataset(&df, DuplicatePolicy::Report).unwrap();

    assert_eq!(report.duplicates_found, 0);
}

#[test]
fn test_null_ages_survive_cleaning() {
    let df = df! {
        "Age" => [Some(30i32), None, Some(-5)],
        "SMS_received" => [1i32, 0, 1],
        "Hipertension" => [0i32, 0, 0],
        "Diabetes" => [0i32, 1, 0],
        "No-show" => ["Yes", "No", "Yes"],
    }
    .unwrap();

    let (cleaned, report) = clean_dataset(&df, DuplicatePolicy::Report).unwrap();

    assert_eq!(report.negative_ages_dropped, 1);
    assert_eq!(cleaned.height(), 2, "Null age rows are kept, only negatives go");
}
