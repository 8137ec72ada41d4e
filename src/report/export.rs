//! Analysis export and report bundling
//!
//! Serializes the full analysis (metadata, cleaning report, outcome counts,
//! the three breakdowns, and the age statistics) to pretty JSON, and
//! packages the JSON together with the rendered SVG charts into a single
//! zip archive.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{
    AgeBins, AgeStats, CleanReport, DuplicatePolicy, EmptyCategoryPolicy, OutcomeBreakdown,
    OutcomeCounts, OutcomeMapping, ZeroAgePolicy,
};

/// File name of the JSON report inside the bundle
pub const ANALYSIS_JSON_NAME: &str = "analysis.json";

/// Metadata about the analysis run
#[derive(Serialize)]
pub struct ReportMetadata {
    /// Timestamp of the analysis (ISO 8601 format)
    pub timestamp: String,
    /// No-show version
    pub noshow_version: String,
    /// Input file path
    pub input_file: String,
    /// Outcome column name
    pub outcome_column: String,
    /// Outcome value counted as a no-show
    pub no_show_value: String,
    /// Outcome value counted as attended
    pub attended_value: String,
    /// Age bracket edges used for derivation
    pub age_bins: Vec<f64>,
    /// Policy applied to ages equal to the lowest edge
    pub zero_age_policy: String,
    /// Policy applied to exact duplicate rows
    pub duplicate_policy: String,
    /// Policy applied to empty aggregation categories
    pub empty_category_policy: String,
}

/// One category of a breakdown as exported
#[derive(Serialize)]
pub struct CategoryEntry {
    /// Raw category value as stored in the column
    pub category: String,
    /// Human-readable label
    pub label: String,
    /// Records in the category with a mapped outcome
    pub appointments: usize,
    /// Records in the category that were no-shows
    pub no_shows: usize,
    /// no_shows / appointments; absent when the category is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_show_proportion: Option<f64>,
}

/// Age descriptive statistics as exported
#[derive(Serialize)]
pub struct AgeStatsEntry {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; absent for fewer than two ages
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

/// One bin of the age histogram as exported
#[derive(Serialize)]
pub struct HistogramBin {
    pub range: String,
    pub count: usize,
}

/// Complete analysis export with metadata
#[derive(Serialize)]
pub struct AnalysisExport {
    /// Metadata about the analysis run
    pub metadata: ReportMetadata,
    /// What cleaning found and removed
    pub cleaning: CleanReport,
    /// Outcome mapping totals over the cleaned dataset
    pub outcomes: OutcomeCounts,
    /// No-show breakdown by SMS reminder flag
    pub sms: Vec<CategoryEntry>,
    /// No-show breakdown by age bracket
    pub age_brackets: Vec<CategoryEntry>,
    /// No-show breakdown by disease history score
    pub disease_history: Vec<CategoryEntry>,
    /// Age descriptive statistics
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_stats: Option<AgeStatsEntry>,
    /// Equal-width age histogram
    pub age_histogram: Vec<HistogramBin>,
}

/// Parameters for building the export metadata
pub struct ExportParams<'a> {
    pub input_file: &'a str,
    pub outcome_column: &'a str,
    pub mapping: &'a OutcomeMapping,
    pub age_bins: &'a AgeBins,
    pub zero_age_policy: ZeroAgePolicy,
    pub duplicate_policy: DuplicatePolicy,
    pub empty_category_policy: EmptyCategoryPolicy,
}

/// Assemble the full export structure from the pipeline results
pub fn build_analysis_export(
    params: &ExportParams,
    cleaning: CleanReport,
    outcomes: OutcomeCounts,
    sms: &OutcomeBreakdown,
    age_brackets: &OutcomeBreakdown,
    disease_history: &OutcomeBreakdown,
    age_stats: Option<&AgeStats>,
    age_histogram: &[(String, usize)],
) -> AnalysisExport {
    AnalysisExport {
        metadata: ReportMetadata {
            timestamp: Utc::now().to_rfc3339(),
            noshow_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.to_string(),
            outcome_column: params.outcome_column.to_string(),
            no_show_value: params.mapping.no_show_value.clone(),
            attended_value: params.mapping.attended_value.clone(),
            age_bins: params.age_bins.edges().to_vec(),
            zero_age_policy: params.zero_age_policy.to_string(),
            duplicate_policy: params.duplicate_policy.to_string(),
            empty_category_policy: params.empty_category_policy.to_string(),
        },
        cleaning,
        outcomes,
        sms: breakdown_entries(sms),
        age_brackets: breakdown_entries(age_brackets),
        disease_history: breakdown_entries(disease_history),
        age_stats: age_stats.map(|stats| AgeStatsEntry {
            count: stats.count,
            mean: stats.mean,
            std: finite_or_none(stats.std),
            min: stats.min,
            median: stats.median,
            max: stats.max,
        }),
        age_histogram: age_histogram
            .iter()
            .map(|(range, count)| HistogramBin {
                range: range.clone(),
                count: *count,
            })
            .collect(),
    }
}

/// Write the export structure to a pretty-printed JSON file
pub fn export_analysis(export: &AnalysisExport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(export)
        .context("Failed to serialize analysis to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write analysis to {}", output_path.display()))?;

    Ok(())
}

/// Package the JSON report and chart files into a zip archive, removing
/// the loose files once they are bundled
pub fn package_report(json_path: &Path, chart_paths: &[PathBuf], zip_path: &Path) -> Result<()> {
    use std::io::{Read, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let zip_file = std::fs::File::create(zip_path)
        .with_context(|| format!("Failed to create zip file: {}", zip_path.display()))?;

    let mut zip = ZipWriter::new(zip_file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    // Helper closure to add a file to the zip
    let mut add_file_to_zip = |path: &Path| -> Result<()> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("report_file");
        zip.start_file(filename, options)
            .with_context(|| format!("Failed to add {} to zip", filename))?;
        let mut content = Vec::new();
        std::fs::File::open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?
            .read_to_end(&mut content)?;
        zip.write_all(&content)?;
        Ok(())
    };

    add_file_to_zip(json_path)?;
    for chart in chart_paths {
        add_file_to_zip(chart)?;
    }

    zip.finish().context("Failed to finalize zip file")?;

    // Remove the individual files after packaging
    std::fs::remove_file(json_path).ok();
    for chart in chart_paths {
        std::fs::remove_file(chart).ok();
    }

    Ok(())
}

fn breakdown_entries(breakdown: &OutcomeBreakdown) -> Vec<CategoryEntry> {
    breakdown
        .categories
        .iter()
        .map(|category| CategoryEntry {
            category: category.value.clone(),
            label: category.label.clone(),
            appointments: category.total,
            no_shows: category.no_shows,
            no_show_proportion: finite_or_none(category.proportion),
        })
        .collect()
}

fn finite_or_none(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}
