//! Run summary report generation

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{CleanReport, OutcomeCounts};

/// Summary of an analysis run, displayed once the pipeline finishes
#[derive(Debug, Default)]
pub struct AnalysisSummary {
    pub rows_loaded: usize,
    pub rows_analyzed: usize,
    pub negative_ages_dropped: usize,
    pub duplicates_found: usize,
    pub duplicates_dropped: usize,
    pub unmatched_outcomes: usize,
    pub no_show_rate: f64,
    pub load_time: Duration,
    pub clean_time: Duration,
    pub derive_time: Duration,
    pub analyze_time: Duration,
    pub export_time: Duration,
}

impl AnalysisSummary {
    pub fn new(rows_loaded: usize) -> Self {
        Self {
            rows_loaded,
            rows_analyzed: rows_loaded,
            no_show_rate: f64::NAN,
            ..Default::default()
        }
    }

    /// Record what the cleaning pass found and removed
    pub fn record_cleaning(&mut self, report: &CleanReport) {
        self.negative_ages_dropped = report.negative_ages_dropped;
        self.duplicates_found = report.duplicates_found;
        self.duplicates_dropped = report.duplicates_dropped;
        self.rows_analyzed = report.rows_after;
    }

    /// Record the outcome mapping counts and the overall no-show rate
    pub fn record_outcomes(&mut self, counts: &OutcomeCounts) {
        self.unmatched_outcomes = counts.unmatched;
        let mapped = counts.no_shows + counts.attended;
        self.no_show_rate = if mapped > 0 {
            counts.no_shows as f64 / mapped as f64
        } else {
            f64::NAN
        };
    }

    pub fn set_load_time(&mut self, elapsed: Duration) {
        self.load_time = elapsed;
    }

    pub fn set_clean_time(&mut self, elapsed: Duration) {
        self.clean_time = elapsed;
    }

    pub fn set_derive_time(&mut self, elapsed: Duration) {
        self.derive_time = elapsed;
    }

    pub fn set_analyze_time(&mut self, elapsed: Duration) {
        self.analyze_time = elapsed;
    }

    pub fn set_export_time(&mut self, elapsed: Duration) {
        self.export_time = elapsed;
    }

    pub fn total_time(&self) -> Duration {
        self.load_time + self.clean_time + self.derive_time + self.analyze_time + self.export_time
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("RUN SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("📁 Rows loaded"),
            Cell::new(self.rows_loaded),
        ]);

        table.add_row(vec![
            Cell::new("🗑️  Negative ages dropped"),
            Cell::new(self.negative_ages_dropped).fg(if self.negative_ages_dropped == 0 {
                Color::White
            } else {
                Color::Red
            }),
        ]);

        table.add_row(vec![
            Cell::new("📑 Duplicate rows found"),
            Cell::new(self.duplicates_found).fg(if self.duplicates_found == 0 {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);

        table.add_row(vec![
            Cell::new("📑 Duplicate rows dropped"),
            Cell::new(self.duplicates_dropped),
        ]);

        table.add_row(vec![
            Cell::new("❔ Unmatched outcomes"),
            Cell::new(self.unmatched_outcomes).fg(if self.unmatched_outcomes == 0 {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);

        table.add_row(vec![
            Cell::new("✅ Rows analyzed"),
            Cell::new(self.rows_analyzed)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        let rate_cell = if self.no_show_rate.is_nan() {
            Cell::new("n/a")
        } else {
            let color = if self.no_show_rate > 0.3 {
                Color::Red
            } else if self.no_show_rate > 0.15 {
                Color::Yellow
            } else {
                Color::Green
            };
            Cell::new(format!("{:.1}%", self.no_show_rate * 100.0))
                .fg(color)
                .add_attribute(Attribute::Bold)
        };
        table.add_row(vec![Cell::new("📉 Overall no-show rate"), rate_cell]);

        table.add_row(vec![
            Cell::new("⏱️  Total time"),
            Cell::new(format!("{:.2}s", self.total_time().as_secs_f64())),
        ]);

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }
    }
}
