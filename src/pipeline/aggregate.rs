//! Attendance aggregation over categorical keys
//!
//! Crosses a grouping column (SMS flag, age bracket, or disease history)
//! with the outcome mask to produce per-category totals, no-show counts,
//! and proportions. Categories iterate in a fixed label order per key so
//! report output is reproducible run to run.

use anyhow::{Context, Result};
use polars::prelude::*;
use rayon::prelude::*;
use thiserror::Error;

use super::features::{AgeBracket, AGE_BRACKET_COLUMN, DISEASE_HISTORY_COLUMN};
use super::loader::{AGE_COLUMN, SMS_COLUMN};
use super::outcome::column_to_string_vec;

/// Grouping keys the analyses iterate, each with a fixed category order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    SmsReceived,
    AgeBracket,
    DiseaseHistory,
}

impl GroupField {
    /// The DataFrame column this key groups by
    pub fn column_name(&self) -> &'static str {
        match self {
            GroupField::SmsReceived => SMS_COLUMN,
            GroupField::AgeBracket => AGE_BRACKET_COLUMN,
            GroupField::DiseaseHistory => DISEASE_HISTORY_COLUMN,
        }
    }

    /// Title used in tables, charts, and the exported report
    pub fn title(&self) -> &'static str {
        match self {
            GroupField::SmsReceived => "SMS reminder",
            GroupField::AgeBracket => "Age bracket",
            GroupField::DiseaseHistory => "Disease history",
        }
    }

    /// Category values in reporting order, as stored in the column
    pub fn category_values(&self) -> Vec<String> {
        match self {
            GroupField::SmsReceived => vec!["0".to_string(), "1".to_string()],
            GroupField::AgeBracket => AgeBracket::ALL
                .iter()
                .map(|b| b.label().to_string())
                .collect(),
            GroupField::DiseaseHistory => {
                vec!["0".to_string(), "1".to_string(), "2".to_string()]
            }
        }
    }

    /// Human-readable label for a category value
    pub fn display_label(&self, value: &str) -> String {
        match self {
            GroupField::SmsReceived => match value {
                "0" => "SMS not received".to_string(),
                "1" => "SMS received".to_string(),
                other => other.to_string(),
            },
            GroupField::AgeBracket => value.to_string(),
            GroupField::DiseaseHistory => match value {
                "1" => "1 disease".to_string(),
                other => format!("{} diseases", other),
            },
        }
    }
}

impl std::fmt::Display for GroupField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Policy for a category with zero members when computing its proportion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmptyCategoryPolicy {
    /// Mark the proportion undefined: NaN in memory, "n/a" in tables,
    /// null in the exported JSON (default)
    #[default]
    Undefined,
    /// Abort the run naming the empty category
    Fail,
}

impl std::fmt::Display for EmptyCategoryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyCategoryPolicy::Undefined => write!(f, "undefined"),
            EmptyCategoryPolicy::Fail => write!(f, "fail"),
        }
    }
}

impl std::str::FromStr for EmptyCategoryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "undefined" => Ok(EmptyCategoryPolicy::Undefined),
            "fail" => Ok(EmptyCategoryPolicy::Fail),
            _ => Err(format!(
                "Unknown empty-category policy: '{}'. Use 'undefined' or 'fail'.",
                s
            )),
        }
    }
}

/// A grouping category with zero members under the fail policy
#[derive(Debug, Error)]
#[error("Category '{category}' of '{field}' has no records to compute a proportion from")]
pub struct EmptyCategoryError {
    pub field: String,
    pub category: String,
}

/// One category's counts and no-show proportion
#[derive(Debug, Clone)]
pub struct CategoryBreakdown {
    /// Raw category value as stored in the column
    pub value: String,
    /// Human-readable label for tables and charts
    pub label: String,
    /// Records in this category with a mapped outcome
    pub total: usize,
    /// Records in this category that were no-shows
    pub no_shows: usize,
    /// no_shows / total; NaN when total is 0 under the undefined policy
    pub proportion: f64,
}

impl CategoryBreakdown {
    /// Proportion of the category that attended (complement of no-show)
    pub fn attended_proportion(&self) -> f64 {
        if self.total == 0 {
            f64::NAN
        } else {
            1.0 - self.proportion
        }
    }
}

/// Breakdown of one grouping key over the whole dataset
#[derive(Debug, Clone)]
pub struct OutcomeBreakdown {
    pub field: GroupField,
    pub categories: Vec<CategoryBreakdown>,
}

/// Descriptive statistics for the age column
#[derive(Debug, Clone)]
pub struct AgeStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

/// Cross a grouping key with the outcome mask into per-category counts and
/// proportions. Rows whose outcome is unmatched, or whose grouping value is
/// null, are excluded from every count.
pub fn aggregate_outcomes(
    df: &DataFrame,
    field: GroupField,
    outcome_mask: &[Option<bool>],
    policy: EmptyCategoryPolicy,
) -> Result<OutcomeBreakdown> {
    let group_col = df
        .column(field.column_name())
        .with_context(|| format!("Grouping column '{}' not found", field.column_name()))?;
    let values = column_to_string_vec(group_col)?;

    if values.len() != outcome_mask.len() {
        anyhow::bail!(
            "Outcome mask length {} does not match dataset height {}",
            outcome_mask.len(),
            values.len()
        );
    }

    let categories = field
        .category_values()
        .par_iter()
        .map(|category| {
            let mut total = 0usize;
            let mut no_shows = 0usize;
            for (value, outcome) in values.iter().zip(outcome_mask) {
                if value.as_deref() != Some(category.as_str()) {
                    continue;
                }
                if let Some(is_no_show) = outcome {
                    total += 1;
                    if *is_no_show {
                        no_shows += 1;
                    }
                }
            }

            let proportion = if total > 0 {
                no_shows as f64 / total as f64
            } else {
                match policy {
                    EmptyCategoryPolicy::Undefined => f64::NAN,
                    EmptyCategoryPolicy::Fail => {
                        return Err(EmptyCategoryError {
                            field: field.title().to_string(),
                            category: category.clone(),
                        })
                    }
                }
            };

            Ok(CategoryBreakdown {
                value: category.clone(),
                label: field.display_label(category),
                total,
                no_shows,
                proportion,
            })
        })
        .collect::<Result<Vec<_>, EmptyCategoryError>>()?;

    Ok(OutcomeBreakdown { field, categories })
}

/// Count rows per category of the raw grouping column, outcome-independent.
/// This is the value-counts view of a key, in the same fixed order.
pub fn category_value_counts(df: &DataFrame, field: GroupField) -> Result<Vec<(String, usize)>> {
    let group_col = df
        .column(field.column_name())
        .with_context(|| format!("Grouping column '{}' not found", field.column_name()))?;
    let values = column_to_string_vec(group_col)?;

    let counts = field
        .category_values()
        .iter()
        .map(|category| {
            let count = values
                .iter()
                .filter(|v| v.as_deref() == Some(category.as_str()))
                .count();
            (field.display_label(category), count)
        })
        .collect();

    Ok(counts)
}

/// Descriptive stats over the non-null ages, or None when there are none.
/// Standard deviation is the sample estimate (n - 1 denominator).
pub fn age_stats(df: &DataFrame) -> Result<Option<AgeStats>> {
    let ages = collect_ages(df)?;
    if ages.is_empty() {
        return Ok(None);
    }

    let count = ages.len();
    let mean = ages.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let variance =
            ages.iter().map(|a| (a - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        variance.sqrt()
    } else {
        f64::NAN
    };

    let mut sorted = ages;
    sorted.sort_by(|a, b| a.total_cmp(b));
    let median = if count % 2 == 1 {
        sorted[count / 2]
    } else {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    };

    Ok(Some(AgeStats {
        count,
        mean,
        std,
        min: sorted[0],
        median,
        max: sorted[count - 1],
    }))
}

/// Equal-width histogram over the non-null ages. The last bin includes the
/// maximum value. Returns (label, count) pairs, empty when no ages exist.
pub fn age_histogram(df: &DataFrame, bin_count: usize) -> Result<Vec<(String, usize)>> {
    let ages = collect_ages(df)?;
    if ages.is_empty() || bin_count == 0 {
        return Ok(Vec::new());
    }

    let min = ages.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = ages.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return Ok(vec![(format!("{:.0}", min), ages.len())]);
    }

    let width = (max - min) / bin_count as f64;
    let mut counts = vec![0usize; bin_count];
    for age in &ages {
        let mut index = ((age - min) / width) as usize;
        if index >= bin_count {
            index = bin_count - 1;
        }
        counts[index] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lo = min + width * i as f64;
            let hi = min + width * (i + 1) as f64;
            (format!("{:.0}-{:.0}", lo, hi), count)
        })
        .collect();

    Ok(bins)
}

fn collect_ages(df: &DataFrame) -> Result<Vec<f64>> {
    let ages = df
        .column(AGE_COLUMN)
        .with_context(|| format!("Age column '{}' not found", AGE_COLUMN))?
        .cast(&DataType::Float64)?;

    Ok(ages.f64()?.into_iter().flatten().collect())
}
