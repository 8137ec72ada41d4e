//! CSV to Parquet conversion utility with streaming support

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use polars::prelude::*;

use crate::pipeline::ANALYSIS_COLUMNS;
use crate::utils::{create_spinner, print_warning};

/// Run the CSV to Parquet conversion using streaming for memory efficiency
///
/// Streams via `sink_parquet()` so the dataset never has to fit in memory.
/// The appointment columns used by the analysis are checked against the CSV
/// schema; missing ones produce a warning but do not stop the conversion,
/// since converted files may be analysed with custom column flags later.
pub fn run_convert(input: &Path, output: Option<&Path>, infer_schema_length: usize) -> Result<()> {
    // Determine output path
    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => {
            let parent = input.parent().unwrap_or_else(|| Path::new("."));
            let stem = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            parent.join(format!("{}.parquet", stem))
        }
    };

    println!(
        "\n {} Converting CSV to Parquet",
        style("◆").cyan().bold()
    );
    println!("   Input:  {}", style(input.display()).dim());
    println!("   Output: {}", style(output_path.display()).dim());
    println!();

    // Convert schema length: 0 means full scan
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let spinner = create_spinner("Reading CSV schema...");
    let lf = LazyCsvReader::new(input)
        .with_infer_schema_length(schema_length)
        .with_rechunk(false) // No rechunking needed for streaming
        .finish()
        .with_context(|| format!("Failed to read CSV file: {}", input.display()))?;

    // Get column count from schema (cheap metadata operation)
    let schema = lf.clone().collect_schema()?;
    let num_cols = schema.len();
    spinner.finish_with_message(format!(
        "{} Schema loaded ({} columns)",
        style("✓").green(),
        num_cols
    ));

    // Flag appointment columns the analysis would miss
    let missing: Vec<&str> = ANALYSIS_COLUMNS
        .iter()
        .copied()
        .filter(|name| !schema.contains(name))
        .collect();
    if !missing.is_empty() {
        print_warning(&format!(
            "Converted file will lack analysis columns: {}",
            missing.join(", ")
        ));
    }

    // Stream directly to Parquet without collecting into memory
    let spinner = create_spinner("Streaming to Parquet...");

    let parquet_options = ParquetWriteOptions {
        compression: ParquetCompression::Snappy,
        statistics: StatisticsOptions::full(),
        row_group_size: Some(100_000), // Optimal row group size for query performance
        ..Default::default()
    };

    lf.sink_parquet(&output_path, parquet_options, None)
        .with_context(|| format!("Failed to write Parquet file: {}", output_path.display()))?;

    spinner.finish_with_message(format!("{} Parquet written", style("✓").green()));

    // Show file size comparison
    let input_size = file_size_mb(input);
    let output_size = file_size_mb(&output_path);

    // Get row count from the output file (Parquet metadata is fast to read)
    let row_count = parquet_row_count(&output_path).unwrap_or(0);

    println!();
    println!(
        "   {} rows × {} columns",
        style(row_count).yellow(),
        style(num_cols).yellow()
    );
    println!("   {} File sizes:", style("✧").cyan());
    println!("      CSV:     {:.2} MB", input_size);
    println!("      Parquet: {:.2} MB", output_size);

    if output_size < input_size && input_size > 0.0 {
        let reduction = ((input_size - output_size) / input_size) * 100.0;
        println!(
            "      {}",
            style(format!("↓ {:.1}% smaller", reduction)).green()
        );
    }

    println!();
    println!(
        " {} Conversion complete!",
        style("✓").green().bold()
    );

    Ok(())
}

fn file_size_mb(path: &Path) -> f64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0) as f64 / (1024.0 * 1024.0)
}

/// Get row count from a Parquet file using metadata (fast, no full scan)
fn parquet_row_count(path: &Path) -> Result<usize> {
    let lf = LazyFrame::scan_parquet(path, Default::default())?;
    let df = lf.select([len()]).collect()?;
    let count = df.column("len")?.get(0)?;
    match count {
        AnyValue::UInt32(n) => Ok(n as usize),
        AnyValue::UInt64(n) => Ok(n as usize),
        AnyValue::Int32(n) => Ok(n as usize),
        AnyValue::Int64(n) => Ok(n as usize),
        _ => Ok(0),
    }
}
