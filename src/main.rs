//! No-show: Appointment Attendance Analysis CLI Tool
//!
//! A command-line tool for analysing medical appointment attendance:
//! cleans the raw dataset, derives age bracket and disease history
//! features, and breaks no-show rates down by reminder, age and health.

mod cli;
mod pipeline;
mod report;
mod utils;

use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;

use cli::{run_convert, Cli, Commands};
use pipeline::{
    age_histogram, age_stats, aggregate_outcomes, build_outcome_mask, category_value_counts,
    clean_dataset, count_column_nulls, derive_features, ensure_required_columns,
    load_dataset_with_progress, validate_binary_flag, validate_outcome_column, AgeBins,
    DuplicatePolicy, EmptyCategoryPolicy, GroupField, OutcomeMapping, ZeroAgePolicy,
    ANALYSIS_COLUMNS, SMS_COLUMN,
};
use report::{
    build_analysis_export, display_age_stats, display_breakdown, display_count_bars,
    display_grouped_outcome_bars, display_proportion_bars, export_analysis, package_report,
    render_grouped_outcome_chart, render_histogram_chart, render_proportion_chart,
    AnalysisSummary, ExportParams, AGE_BRACKET_CHART_NAME, ANALYSIS_JSON_NAME, DISEASE_CHART_NAME,
    HISTOGRAM_CHART_NAME, SMS_CHART_NAME,
};
use utils::{
    create_spinner, finish_with_success, print_banner, print_completion, print_config,
    print_count, print_info, print_step_header, print_step_time, print_success, print_warning,
};

/// Number of equal-width bins in the age histogram
const HISTOGRAM_BINS: usize = 10;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle subcommands
    if let Some(command) = &cli.command {
        return match command {
            Commands::Convert {
                input,
                output,
                infer_schema_length,
            } => run_convert(input, output.as_deref(), *infer_schema_length),
        };
    }

    // Main analysis pipeline - require input
    let input = cli.input.as_ref().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Use -i/--input to specify a file.")
    })?;

    // Derive output path from input if not provided
    let output_path = cli.output_path().unwrap();

    // Resolve typed configuration from the CLI strings
    let bins = AgeBins::from_edges(&cli.age_bins)?;
    let zero_age_policy: ZeroAgePolicy = cli
        .zero_age_policy
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let duplicate_policy: DuplicatePolicy = cli
        .duplicate_policy
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let empty_category_policy: EmptyCategoryPolicy = cli
        .empty_category_policy
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let mapping = OutcomeMapping::new(cli.no_show_value.clone(), cli.attended_value.clone());

    // Print styled banner
    print_banner(env!("CARGO_PKG_VERSION"));

    // Print configuration card
    let policies = format!(
        "{} / {} / {}",
        zero_age_policy, duplicate_policy, empty_category_policy
    );
    print_config(
        input,
        &cli.outcome_column,
        if cli.no_export {
            None
        } else {
            Some(output_path.as_path())
        },
        bins.edges(),
        &policies,
    );

    // Load dataset (with progress spinner)
    let step_start = Instant::now();
    println!(); // Blank line before progress bar
    let (df, rows, cols, memory_mb) = load_dataset_with_progress(input, cli.infer_schema_length)?;
    print_success("Dataset loaded");

    // Display statistics (instant since data is already collected)
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);

    let mut summary = AnalysisSummary::new(rows);
    let load_elapsed = step_start.elapsed();
    summary.set_load_time(load_elapsed);
    print_step_time(load_elapsed);

    // Verify the analysis columns exist before any stage runs
    let mut required: Vec<&str> = ANALYSIS_COLUMNS.to_vec();
    if !required.contains(&cli.outcome_column.as_str()) {
        required.push(cli.outcome_column.as_str());
    }
    ensure_required_columns(&df, &required)?;

    for (column, nulls) in count_column_nulls(&df, &required) {
        print_warning(&format!("Column '{}' has {} null value(s)", column, nulls));
    }

    // Step 1: Data cleaning
    print_step_header(1, "Data Cleaning");

    let step_start = Instant::now();
    let spinner = create_spinner("Scanning for invalid rows...");
    let (df, clean_report) = clean_dataset(&df, duplicate_policy)?;
    finish_with_success(&spinner, "Cleaning pass complete");

    if clean_report.negative_ages_dropped == 0 {
        print_info("No negative ages found");
    } else {
        print_count(
            "row(s) with negative Age",
            clean_report.negative_ages_dropped,
            None,
        );
        print_success("Dropped rows with negative ages");
    }

    if clean_report.duplicates_found == 0 {
        print_info("No exact duplicate rows found");
    } else {
        print_count("exact duplicate row(s)", clean_report.duplicates_found, None);
        match duplicate_policy {
            DuplicatePolicy::Report => {
                print_info("Duplicates kept; rerun with --duplicate-policy drop to remove them");
            }
            DuplicatePolicy::Drop => {
                print_success("Dropped duplicate rows, keeping first occurrences");
            }
        }
    }

    summary.record_cleaning(&clean_report);
    let clean_elapsed = step_start.elapsed();
    summary.set_clean_time(clean_elapsed);
    print_step_time(clean_elapsed);

    // Step 2: Feature derivation
    print_step_header(2, "Feature Derivation");

    let step_start = Instant::now();
    let spinner = create_spinner("Deriving age bracket and disease history...");
    validate_binary_flag(&df, SMS_COLUMN)?;
    let df = derive_features(&df, &bins, zero_age_policy)?;
    finish_with_success(&spinner, "Derived age_bracket and disease_history");

    let outcome_counts = validate_outcome_column(&df, &cli.outcome_column, &mapping)?;
    if outcome_counts.unmatched > 0 {
        print_warning(&format!(
            "{} outcome value(s) matched neither '{}' nor '{}' and are excluded from rates",
            outcome_counts.unmatched, mapping.no_show_value, mapping.attended_value
        ));
    }
    let outcome_mask = build_outcome_mask(&df, &cli.outcome_column, &mapping)?;

    summary.record_outcomes(&outcome_counts);
    let derive_elapsed = step_start.elapsed();
    summary.set_derive_time(derive_elapsed);
    print_step_time(derive_elapsed);

    // Step 3: Attendance analysis
    print_step_header(3, "Attendance Analysis");

    let step_start = Instant::now();

    println!("\n    {} No-show by SMS reminder:", style("✧").cyan());
    let sms_breakdown = aggregate_outcomes(
        &df,
        GroupField::SmsReceived,
        &outcome_mask,
        empty_category_policy,
    )?;
    display_breakdown(&sms_breakdown);
    display_proportion_bars(&sms_breakdown);

    println!("\n    {} Age profile:", style("✧").cyan());
    let stats = age_stats(&df)?;
    match &stats {
        Some(stats) => display_age_stats(stats),
        None => print_info("No ages available to describe"),
    }
    let histogram = age_histogram(&df, HISTOGRAM_BINS)?;
    if !histogram.is_empty() {
        println!();
        display_count_bars(&histogram);
    }

    println!("\n    {} No-show by age bracket:", style("✧").cyan());
    let age_breakdown = aggregate_outcomes(
        &df,
        GroupField::AgeBracket,
        &outcome_mask,
        empty_category_policy,
    )?;
    display_breakdown(&age_breakdown);
    display_proportion_bars(&age_breakdown);

    println!("\n    {} No-show by disease history:", style("✧").cyan());
    let disease_counts = category_value_counts(&df, GroupField::DiseaseHistory)?;
    display_count_bars(&disease_counts);
    let disease_breakdown = aggregate_outcomes(
        &df,
        GroupField::DiseaseHistory,
        &outcome_mask,
        empty_category_policy,
    )?;
    println!();
    display_breakdown(&disease_breakdown);
    display_grouped_outcome_bars(&disease_breakdown);

    let analyze_elapsed = step_start.elapsed();
    summary.set_analyze_time(analyze_elapsed);
    print_step_time(analyze_elapsed);

    // Step 4: Report export
    if !cli.no_export {
        print_step_header(4, "Report Export");

        let step_start = Instant::now();
        let spinner = create_spinner("Rendering charts...");

        let bundle_dir = output_path.parent().unwrap_or_else(|| Path::new("."));
        let json_path = bundle_dir.join(ANALYSIS_JSON_NAME);
        let chart_paths = vec![
            bundle_dir.join(SMS_CHART_NAME),
            bundle_dir.join(AGE_BRACKET_CHART_NAME),
            bundle_dir.join(DISEASE_CHART_NAME),
            bundle_dir.join(HISTOGRAM_CHART_NAME),
        ];

        render_proportion_chart(
            &sms_breakdown,
            "No-show proportion by SMS reminder",
            &chart_paths[0],
        )?;
        render_proportion_chart(
            &age_breakdown,
            "No-show proportion by age bracket",
            &chart_paths[1],
        )?;
        render_grouped_outcome_chart(
            &disease_breakdown,
            "Attendance by disease history",
            &chart_paths[2],
        )?;
        render_histogram_chart(&histogram, &chart_paths[3])?;

        let input_display = input.display().to_string();
        let params = ExportParams {
            input_file: &input_display,
            outcome_column: &cli.outcome_column,
            mapping: &mapping,
            age_bins: &bins,
            zero_age_policy,
            duplicate_policy,
            empty_category_policy,
        };
        let export = build_analysis_export(
            &params,
            clean_report,
            outcome_counts,
            &sms_breakdown,
            &age_breakdown,
            &disease_breakdown,
            stats.as_ref(),
            &histogram,
        );
        export_analysis(&export, &json_path)?;
        package_report(&json_path, &chart_paths, &output_path)?;

        finish_with_success(
            &spinner,
            &format!("Report bundle written to {}", output_path.display()),
        );
        let export_elapsed = step_start.elapsed();
        summary.set_export_time(export_elapsed);
        print_step_time(export_elapsed);
    }

    // Display summary
    summary.display();

    // Final completion message
    print_completion();

    Ok(())
}
