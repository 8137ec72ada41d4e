//! Cleaning pass - invalid-age removal and duplicate row handling
//!
//! The only field-level sanity check in the pipeline: records with a
//! negative age are structurally invalid and always removed. Exact
//! duplicate rows are detected here and either reported or dropped
//! depending on the configured policy.

use std::collections::HashSet;

use anyhow::{Context, Result};
use polars::prelude::*;
use rayon::prelude::*;
use serde::Serialize;

use super::loader::AGE_COLUMN;
use super::outcome::column_to_string_vec;

// Row keys encode null and value cells with distinct prefixes so that a
// null never collides with a literal string.
const NULL_CELL: &str = "\u{0}";
const VALUE_CELL: char = '\u{1}';
const CELL_SEPARATOR: char = '\u{1f}';

/// Policy for exact duplicate rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum DuplicatePolicy {
    /// Count and report duplicates without removing them (default)
    #[default]
    Report,
    /// Remove duplicates, keeping the first occurrence of each row
    Drop,
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicatePolicy::Report => write!(f, "report"),
            DuplicatePolicy::Drop => write!(f, "drop"),
        }
    }
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "report" => Ok(DuplicatePolicy::Report),
            "drop" => Ok(DuplicatePolicy::Drop),
            _ => Err(format!(
                "Unknown duplicate policy: '{}'. Use 'report' or 'drop'.",
                s
            )),
        }
    }
}

/// What the cleaning pass found and removed
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CleanReport {
    /// Rows before any cleaning
    pub rows_before: usize,
    /// Rows removed for having a negative age
    pub negative_ages_dropped: usize,
    /// Exact duplicate rows found (beyond each first occurrence)
    pub duplicates_found: usize,
    /// Duplicate rows actually removed (0 under the report policy)
    pub duplicates_dropped: usize,
    /// Rows remaining after cleaning
    pub rows_after: usize,
}

/// Run the full cleaning pass: drop negative ages, then handle duplicates
/// according to the policy. Returns a new DataFrame; the input is untouched.
pub fn clean_dataset(
    df: &DataFrame,
    policy: DuplicatePolicy,
) -> Result<(DataFrame, CleanReport)> {
    let rows_before = df.height();

    let filtered = drop_negative_ages(df)?;
    let negative_ages_dropped = rows_before - filtered.height();

    let keys = row_keys(&filtered)?;
    let (duplicates_found, keep_mask) = find_duplicates(&keys);

    let (cleaned, duplicates_dropped) = if policy == DuplicatePolicy::Drop && duplicates_found > 0
    {
        let mask = BooleanChunked::from_slice("keep".into(), &keep_mask);
        let deduped = filtered
            .filter(&mask)
            .context("Failed to drop duplicate rows")?;
        (deduped, duplicates_found)
    } else {
        (filtered, 0)
    };

    let report = CleanReport {
        rows_before,
        negative_ages_dropped,
        duplicates_found,
        duplicates_dropped,
        rows_after: cleaned.height(),
    };

    Ok((cleaned, report))
}

/// Remove every row whose age is negative. Null ages are kept; they carry
/// no sign information and later stages treat them as unbracketed.
pub fn drop_negative_ages(df: &DataFrame) -> Result<DataFrame> {
    let filtered = df
        .clone()
        .lazy()
        .filter(
            col(AGE_COLUMN)
                .is_null()
                .or(col(AGE_COLUMN).gt_eq(lit(0))),
        )
        .collect()
        .context("Failed to filter rows with negative ages")?;

    Ok(filtered)
}

/// Count exact duplicate rows and build a keep-first mask.
///
/// Returns the number of duplicates (rows identical to an earlier row
/// across all columns) and a boolean per row that is false exactly for
/// those duplicates.
fn find_duplicates(keys: &[String]) -> (usize, Vec<bool>) {
    let mut seen = HashSet::with_capacity(keys.len());
    let keep: Vec<bool> = keys.iter().map(|k| seen.insert(k.as_str())).collect();
    let duplicates = keep.iter().filter(|kept| !**kept).count();
    (duplicates, keep)
}

/// Build one comparison key per row from every column's string form.
/// Column extraction runs in parallel; key assembly is a cheap transpose.
fn row_keys(df: &DataFrame) -> Result<Vec<String>> {
    let columns: Vec<Vec<Option<String>>> = df
        .get_columns()
        .par_iter()
        .map(column_to_string_vec)
        .collect::<Result<_>>()?;

    let keys = (0..df.height())
        .map(|row| {
            let mut key = String::new();
            for cells in &columns {
                match &cells[row] {
                    Some(value) => {
                        key.push(VALUE_CELL);
                        key.push_str(value);
                    }
                    None => key.push_str(NULL_CELL),
                }
                key.push(CELL_SEPARATOR);
            }
            key
        })
        .collect();

    Ok(keys)
}
