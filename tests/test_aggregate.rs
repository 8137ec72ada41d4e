//! Tests for outcome aggregation across the grouping fields

use noshow::pipeline::{
    age_histogram, age_stats, aggregate_outcomes, build_outcome_mask, category_value_counts,
    clean_dataset, derive_features, AgeBins, DuplicatePolicy, EmptyCategoryPolicy, GroupField,
    OutcomeMapping, ZeroAgePolicy,
};
use polars::prelude::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

fn analysed_fixture() -> (DataFrame, Vec<Option<bool>>) {
    let df = create_appointments_dataframe();
    let (cleaned, _) = clean_dataset(&df, DuplicatePolicy::Report).unwrap();
    let derived = derive_features(&cleaned, &AgeBins::default(), ZeroAgePolicy::FirstBracket)
        .unwrap();
    let mask = build_outcome_mask(&derived, "No-show", &OutcomeMapping::default()).unwrap();
    (derived, mask)
}

#[test]
fn test_sms_groups_both_at_half() {
    let (df, mask) = analysed_fixture();

    let breakdown = aggregate_outcomes(
        &df,
        GroupField::SmsReceived,
        &mask,
        EmptyCategoryPolicy::Undefined,
    )
    .unwrap();

    assert_eq!(breakdown.categories.len(), 2);

    let not_received = &breakdown.categories[0];
    assert_eq!(not_received.value, "0");
    assert_eq!(not_received.total, 2);
    assert_eq!(not_received.no_shows, 1);
    assert_eq!(not_received.proportion, 0.5);

    let received = &breakdown.categories[1];
    assert_eq!(received.value, "1");
    assert_eq!(received.total, 2);
    assert_eq!(received.no_shows, 1);
    assert_eq!(received.proportion, 0.5);
}

#[test]
fn test_proportions_are_exact_fractions() {
    let (df, mask) = analysed_fixture();

    for field in [
        GroupField::SmsReceived,
        GroupField::AgeBracket,
        GroupField::DiseaseHistory,
    ] {
        let breakdown =
            aggregate_outcomes(&df, field, &mask, EmptyCategoryPolicy::Undefined).unwrap();
        for category in &breakdown.categories {
            if category.total > 0 {
                assert_eq!(
                    category.proportion,
                    category.no_shows as f64 / category.total as f64,
                    "Proportion must be the exact quotient for {}",
                    category.label
                );
                assert!((0.0..=1.0).contains(&category.proportion));
            } else {
                assert!(category.proportion.is_nan());
            }
        }
    }
}

#[test]
fn test_age_brackets_keep_fixed_order() {
    let (df, mask) = analysed_fixture();

    let breakdown = aggregate_outcomes(
        &df,
        GroupField::AgeBracket,
        &mask,
        EmptyCategoryPolicy::Undefined,
    )
    .unwrap();

    let order: Vec<&str> = breakdown
        .categories
        .iter()
        .map(|c| c.value.as_str())
        .collect();
    assert_eq!(order, vec!["child", "young", "adult", "old"]);
}

#[test]
fn test_disease_breakdown_counts() {
    let (df, mask) = analysed_fixture();

    let breakdown = aggregate_outcomes(
        &df,
        GroupField::DiseaseHistory,
        &mask,
        EmptyCategoryPolicy::Undefined,
    )
    .unwrap();

    // Cleaned rows carry scores 0, 1, 2 with outcomes No/Yes, Yes, No
    assert_eq!(breakdown.categories[0].total, 2);
    assert_eq!(breakdown.categories[0].no_shows, 1);
    assert_eq!(breakdown.categories[1].total, 1);
    assert_eq!(breakdown.categories[1].no_shows, 1);
    assert_eq!(breakdown.categories[2].total, 1);
    assert_eq!(breakdown.categories[2].no_shows, 0);
}

#[test]
fn test_empty_category_fail_policy_errors() {
    let df = df! {
        "Age" => [30i32, 45],
        "SMS_received" => [1i32, 1],
        "Hipertension" => [0i32, 0],
        "Diabetes" => [0i32, 0],
        "No-show" => ["Yes", "No"],
    }
    .unwrap();
    let derived =
        derive_features(&df, &AgeBins::default(), ZeroAgePolicy::FirstBracket).unwrap();
    let mask = build_outcome_mask(&derived, "No-show", &OutcomeMapping::default()).unwrap();

    // Nobody in the SMS=0 group
    let undefined = aggregate_outcomes(
        &derived,
        GroupField::SmsReceived,
        &mask,
        EmptyCategoryPolicy::Undefined,
    )
    .unwrap();
    assert!(undefined.categories[0].proportion.is_nan());

    let failed = aggregate_outcomes(
        &derived,
        GroupField::SmsReceived,
        &mask,
        EmptyCategoryPolicy::Fail,
    );
    assert!(failed.is_err());
}

#[test]
fn test_unmatched_outcomes_excluded_from_both_sides() {
    let df = df! {
        "Age" => [30i32, 45, 50],
        "SMS_received" => [1i32, 1, 1],
        "Hipertension" => [0i32, 0, 0],
        "Diabetes" => [0i32, 0, 0],
        "No-show" => ["Yes", "Maybe", "No"],
    }
    .unwrap();
    let derived =
        derive_features(&df, &AgeBins::default(), ZeroAgePolicy::FirstBracket).unwrap();
    let mask = build_outcome_mask(&derived, "No-show", &OutcomeMapping::default()).unwrap();

    let breakdown = aggregate_outcomes(
        &derived,
        GroupField::SmsReceived,
        &mask,
        EmptyCategoryPolicy::Undefined,
    )
    .unwrap();

    let received = &breakdown.categories[1];
    assert_eq!(received.total, 2, "The 'Maybe' row must not count");
    assert_eq!(received.no_shows, 1);
    assert_eq!(received.proportion, 0.5);
}

#[test]
fn test_age_stats_on_fixture() {
    let (df, _) = analysed_fixture();

    let stats = age_stats(&df).unwrap().unwrap();

    assert_eq!(stats.count, 4);
    assert_eq!(stats.min, 10.0);
    assert_eq!(stats.max, 60.0);
    assert_eq!(stats.mean, 32.0);
    assert_eq!(stats.median, 29.0);
}

#[test]
fn test_age_histogram_preserves_total() {
    let mut df = create_large_appointments_dataframe(500);
    let (cleaned, _) = clean_dataset(&df, DuplicatePolicy::Report).unwrap();
    df = cleaned;

    let histogram = age_histogram(&df, 10).unwrap();

    let total: usize = histogram.iter().map(|(_, count)| count).sum();
    assert_eq!(total, 500, "Every age lands in exactly one bin");
}

#[test]
fn test_category_value_counts_on_fixture() {
    let (df, _) = analysed_fixture();

    let counts = category_value_counts(&df, GroupField::DiseaseHistory).unwrap();

    let totals: Vec<usize> = counts.iter().map(|(_, count)| *count).collect();
    assert_eq!(totals, vec![2, 1, 1]);
}
