//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// No-show - Analyse appointment attendance by SMS reminder, age and disease history
#[derive(Parser, Debug)]
#[command(name = "noshow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Report bundle output path (.zip).
    /// Defaults to the input directory with a '_noshow_report.zip' suffix
    /// (e.g., appointments.csv -> appointments_noshow_report.zip).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Attendance outcome column name
    #[arg(long, default_value = "No-show")]
    pub outcome_column: String,

    /// Value in the outcome column that represents a missed appointment
    #[arg(long, default_value = "Yes")]
    pub no_show_value: String,

    /// Value in the outcome column that represents an attended appointment
    #[arg(long, default_value = "No")]
    pub attended_value: String,

    /// Age bracket edges (five ascending non-negative values, comma-separated).
    /// Brackets are child, young, adult, old; each spans from one edge up to
    /// the next, with the final edge included in the last bracket.
    #[arg(long, value_delimiter = ',', default_values_t = [0.0, 18.0, 37.0, 55.0, 115.0])]
    pub age_bins: Vec<f64>,

    /// How to bracket ages equal to the lowest edge.
    /// Options: "first-bracket" (default) or "unbracketed"
    #[arg(long, default_value = "first-bracket")]
    pub zero_age_policy: String,

    /// What to do with exact duplicate rows found during cleaning.
    /// Options: "report" (default, keep them) or "drop" (keep first occurrence)
    #[arg(long, default_value = "report")]
    pub duplicate_policy: String,

    /// How to report categories with no records during aggregation.
    /// Options: "undefined" (default, rate shown as n/a) or "fail"
    #[arg(long, default_value = "undefined")]
    pub empty_category_policy: String,

    /// Number of rows to use for schema inference (CSV only).
    /// Higher values improve type detection for ambiguous columns but may be slower.
    /// Use 0 for full table scan (very slow for large files).
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Print the analysis to the terminal only, without writing the report bundle
    #[arg(long, default_value = "false")]
    pub no_export: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert a CSV file to Parquet format
    Convert {
        /// Input file path (CSV)
        input: PathBuf,

        /// Output file path (optional, defaults to input with .parquet extension)
        output: Option<PathBuf>,

        /// Number of rows to use for schema inference.
        /// Higher values improve type detection for ambiguous columns but may be slower.
        /// Use 0 for full table scan (very slow for large files).
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },
}

impl Cli {
    /// Get the report bundle path, deriving from input if not explicitly provided.
    /// The derived path will be in the same directory as the input with a
    /// '_noshow_report.zip' suffix.
    pub fn output_path(&self) -> Option<PathBuf> {
        let input = self.input.as_ref()?;
        Some(self.output.clone().unwrap_or_else(|| {
            let parent = input.parent().unwrap_or_else(|| std::path::Path::new("."));
            let stem = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            parent.join(format!("{}_noshow_report.zip", stem))
        }))
    }
}
