//! Outcome column mapping
//!
//! This module maps the attendance outcome column ("Yes"/"No" in the source
//! encoding) to a per-row no-show mask used by the aggregation step.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

/// Mapping configuration for interpreting the outcome column
#[derive(Debug, Clone)]
pub struct OutcomeMapping {
    /// Value meaning the patient did not attend
    pub no_show_value: String,
    /// Value meaning the patient attended
    pub attended_value: String,
}

impl OutcomeMapping {
    /// Create a new outcome mapping
    pub fn new(no_show_value: String, attended_value: String) -> Self {
        Self {
            no_show_value,
            attended_value,
        }
    }
}

impl Default for OutcomeMapping {
    fn default() -> Self {
        Self::new("Yes".to_string(), "No".to_string())
    }
}

/// How many records matched each side of the outcome mapping
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OutcomeCounts {
    /// Records matching the no-show value
    pub no_shows: usize,
    /// Records matching the attended value
    pub attended: usize,
    /// Records matching neither value (excluded from every proportion)
    pub unmatched: usize,
}

/// Build a per-row outcome mask
///
/// Returns a Vec<Option<bool>> where:
/// - Some(true) for no-show values
/// - Some(false) for attended values
/// - None for values that match neither (excluded during aggregation)
pub fn build_outcome_mask(
    df: &DataFrame,
    outcome: &str,
    mapping: &OutcomeMapping,
) -> Result<Vec<Option<bool>>> {
    let outcome_col = df
        .column(outcome)
        .with_context(|| format!("Outcome column '{}' not found", outcome))?;

    let string_values = column_to_string_vec(outcome_col)?;

    let mask: Vec<Option<bool>> = string_values
        .iter()
        .map(|v| match v {
            Some(s) if s == &mapping.no_show_value => Some(true),
            Some(s) if s == &mapping.attended_value => Some(false),
            _ => None,
        })
        .collect();

    Ok(mask)
}

/// Validate the outcome column and count how many records map to each side.
///
/// Fails when the column is empty, all null, or when not a single record
/// matches either configured value (a sign the mapping is wrong for this
/// dataset); the error lists the values actually present.
pub fn validate_outcome_column(
    df: &DataFrame,
    outcome: &str,
    mapping: &OutcomeMapping,
) -> Result<OutcomeCounts> {
    let outcome_col = df
        .column(outcome)
        .with_context(|| format!("Outcome column '{}' not found", outcome))?;

    if outcome_col.len() == 0 {
        anyhow::bail!("Outcome column '{}' is empty", outcome);
    }

    if outcome_col.null_count() == outcome_col.len() {
        anyhow::bail!("Outcome column '{}' contains only null values", outcome);
    }

    let mask = build_outcome_mask(df, outcome, mapping)?;
    let counts = OutcomeCounts {
        no_shows: mask.iter().filter(|v| **v == Some(true)).count(),
        attended: mask.iter().filter(|v| **v == Some(false)).count(),
        unmatched: mask.iter().filter(|v| v.is_none()).count(),
    };

    if counts.no_shows == 0 && counts.attended == 0 {
        let unique_values = unique_values_as_strings(outcome_col)?;
        anyhow::bail!(
            "No record in '{}' matches '{}' or '{}'. Values present: {:?}",
            outcome,
            mapping.no_show_value,
            mapping.attended_value,
            unique_values
        );
    }

    Ok(counts)
}

/// Convert a column to a Vec of Option<String> for comparison
pub(crate) fn column_to_string_vec(col: &Column) -> Result<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 => {
            let cast = col.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 => {
            let cast = col.cast(&DataType::UInt64)?;
            cast.u64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::Float32 | DataType::Float64 => {
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| v.map(|n| format!("{}", n)))
                .collect()
        }
        DataType::Boolean => col
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect(),
        _ => {
            // For other types, try to cast to string
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}

/// Get unique values from a column as sorted strings
fn unique_values_as_strings(col: &Column) -> Result<Vec<String>> {
    let unique = col.unique()?;
    let mut values: Vec<String> = column_to_string_vec(&unique)?
        .into_iter()
        .flatten()
        .collect();
    values.sort();
    Ok(values)
}
