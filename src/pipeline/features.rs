//! Feature derivation - age brackets and disease history
//!
//! Appends the two derived columns the analyses group by: an ordinal age
//! bracket assigned by interval membership, and a disease history score
//! summing the two comorbidity flags. Existing columns are never mutated.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

use super::loader::{AGE_COLUMN, DIABETES_COLUMN, HYPERTENSION_COLUMN};

/// Name of the derived age bracket column
pub const AGE_BRACKET_COLUMN: &str = "age_bracket";
/// Name of the derived disease history column
pub const DISEASE_HISTORY_COLUMN: &str = "disease_history";

/// Default bracket edges, pairing with the four labels youngest to oldest
pub const DEFAULT_AGE_EDGES: [f64; 5] = [0.0, 18.0, 37.0, 55.0, 115.0];

/// Tolerance for floating point comparison when checking binary 0/1 flags
const TOLERANCE: f64 = 1e-9;

/// Ordinal age bracket, youngest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AgeBracket {
    Child,
    Young,
    Adult,
    Old,
}

impl AgeBracket {
    /// All brackets in their fixed reporting order
    pub const ALL: [AgeBracket; 4] = [
        AgeBracket::Child,
        AgeBracket::Young,
        AgeBracket::Adult,
        AgeBracket::Old,
    ];

    /// The label stored in the derived column
    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::Child => "child",
            AgeBracket::Young => "young",
            AgeBracket::Adult => "adult",
            AgeBracket::Old => "old",
        }
    }
}

impl std::fmt::Display for AgeBracket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for AgeBracket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "child" => Ok(AgeBracket::Child),
            "young" => Ok(AgeBracket::Young),
            "adult" => Ok(AgeBracket::Adult),
            "old" => Ok(AgeBracket::Old),
            _ => Err(format!(
                "Unknown age bracket: '{}'. Use 'child', 'young', 'adult' or 'old'.",
                s
            )),
        }
    }
}

/// Policy for an age equal to the lowest bracket edge (age 0 with the
/// default edges)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ZeroAgePolicy {
    /// Include the lowest edge in the first bracket (default)
    #[default]
    FirstBracket,
    /// Leave the lowest edge outside every bracket
    Unbracketed,
}

impl std::fmt::Display for ZeroAgePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZeroAgePolicy::FirstBracket => write!(f, "first-bracket"),
            ZeroAgePolicy::Unbracketed => write!(f, "unbracketed"),
        }
    }
}

impl std::str::FromStr for ZeroAgePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first-bracket" => Ok(ZeroAgePolicy::FirstBracket),
            "unbracketed" => Ok(ZeroAgePolicy::Unbracketed),
            _ => Err(format!(
                "Unknown zero-age policy: '{}'. Use 'first-bracket' or 'unbracketed'.",
                s
            )),
        }
    }
}

/// Bracket edges: five ascending values defining four intervals.
///
/// Intervals are left-closed and right-open, except the last edge which is
/// inclusive: [e0,e1) [e1,e2) [e2,e3) [e3,e4]. Ages outside [e0,e4] are
/// unbracketed.
#[derive(Debug, Clone)]
pub struct AgeBins {
    edges: [f64; 5],
}

impl Default for AgeBins {
    fn default() -> Self {
        Self {
            edges: DEFAULT_AGE_EDGES,
        }
    }
}

impl AgeBins {
    /// Build bracket edges from a slice, validating count and ordering
    pub fn from_edges(edges: &[f64]) -> Result<Self> {
        if edges.len() != 5 {
            anyhow::bail!(
                "Age bins require exactly 5 edges (got {}): one per bracket boundary",
                edges.len()
            );
        }
        if edges.iter().any(|e| !e.is_finite() || *e < 0.0) {
            anyhow::bail!("Age bin edges must be non-negative numbers: {:?}", edges);
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            anyhow::bail!("Age bin edges must be strictly ascending: {:?}", edges);
        }

        let mut fixed = [0.0; 5];
        fixed.copy_from_slice(edges);
        Ok(Self { edges: fixed })
    }

    /// The five edges, ascending
    pub fn edges(&self) -> &[f64; 5] {
        &self.edges
    }

    /// Assign a bracket to an age, or None when the age falls outside
    /// every interval (or equals the lowest edge under the unbracketed
    /// policy)
    pub fn bracket_for(&self, age: f64, policy: ZeroAgePolicy) -> Option<AgeBracket> {
        if !age.is_finite() {
            return None;
        }
        if age == self.edges[0] && policy == ZeroAgePolicy::Unbracketed {
            return None;
        }
        for (i, bracket) in AgeBracket::ALL.iter().enumerate() {
            if age >= self.edges[i] && age < self.edges[i + 1] {
                return Some(*bracket);
            }
        }
        if age == self.edges[4] {
            return Some(AgeBracket::Old);
        }
        None
    }
}

/// Verify that a flag column contains only 0/1 values (nulls allowed)
pub fn validate_binary_flag(df: &DataFrame, column: &str) -> Result<()> {
    let flag_col = df
        .column(column)
        .with_context(|| format!("Flag column '{}' not found", column))?;

    let dtype = flag_col.dtype();
    if !dtype.is_primitive_numeric() && *dtype != DataType::Boolean {
        anyhow::bail!(
            "Flag column '{}' must be a numeric 0/1 column, found {}",
            column,
            dtype
        );
    }

    let float_col = flag_col.cast(&DataType::Float64)?;
    let unique = float_col.unique()?;
    let non_binary: Vec<f64> = unique
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| (v - 0.0).abs() >= TOLERANCE && (v - 1.0).abs() >= TOLERANCE)
        .collect();

    if !non_binary.is_empty() {
        anyhow::bail!(
            "Flag column '{}' contains non-binary value(s): {:?}",
            column,
            non_binary
        );
    }

    Ok(())
}

/// Append the derived age bracket and disease history columns.
///
/// Returns a new DataFrame; rows whose age is null or unbracketed get a
/// null bracket, and rows missing either comorbidity flag get a null
/// disease history. Fails if a comorbidity flag column is not binary.
pub fn derive_features(
    df: &DataFrame,
    bins: &AgeBins,
    policy: ZeroAgePolicy,
) -> Result<DataFrame> {
    validate_binary_flag(df, HYPERTENSION_COLUMN)?;
    validate_binary_flag(df, DIABETES_COLUMN)?;

    let ages = df
        .column(AGE_COLUMN)
        .with_context(|| format!("Age column '{}' not found", AGE_COLUMN))?
        .cast(&DataType::Float64)?;
    let brackets: Vec<Option<String>> = ages
        .f64()?
        .into_iter()
        .map(|age| {
            age.and_then(|a| bins.bracket_for(a, policy))
                .map(|b| b.label().to_string())
        })
        .collect();

    let hypertension = df.column(HYPERTENSION_COLUMN)?.cast(&DataType::Int64)?;
    let diabetes = df.column(DIABETES_COLUMN)?.cast(&DataType::Int64)?;
    let disease_history: Vec<Option<i64>> = hypertension
        .i64()?
        .into_iter()
        .zip(diabetes.i64()?)
        .map(|(h, d)| match (h, d) {
            (Some(h), Some(d)) => Some(h + d),
            _ => None,
        })
        .collect();

    let mut derived = df.clone();
    derived.with_column(Series::new(AGE_BRACKET_COLUMN.into(), brackets))?;
    derived.with_column(Series::new(DISEASE_HISTORY_COLUMN.into(), disease_history))?;

    Ok(derived)
}
