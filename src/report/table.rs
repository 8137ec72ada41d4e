//! Terminal rendering of breakdowns and statistics
//!
//! Tables follow the run summary style; bar lines scale block characters
//! against the largest value in the series so the relative differences
//! between categories stay visible at any magnitude.

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{AgeStats, OutcomeBreakdown};

/// Width in characters of the longest terminal bar
const BAR_WIDTH: usize = 28;

/// Print a breakdown as a table with per-category no-show rates
pub fn display_breakdown(breakdown: &OutcomeBreakdown) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new(breakdown.field.title()).add_attribute(Attribute::Bold),
        Cell::new("Appointments").add_attribute(Attribute::Bold),
        Cell::new("No-shows").add_attribute(Attribute::Bold),
        Cell::new("No-show rate").add_attribute(Attribute::Bold),
    ]);

    for category in &breakdown.categories {
        table.add_row(vec![
            Cell::new(&category.label),
            Cell::new(category.total),
            Cell::new(category.no_shows),
            rate_cell(category.proportion),
        ]);
    }

    // Indent the table
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

/// Print one bar per category, scaled to the largest no-show proportion
pub fn display_proportion_bars(breakdown: &OutcomeBreakdown) {
    let label_width = max_label_width(breakdown);
    let max_proportion = breakdown
        .categories
        .iter()
        .map(|c| c.proportion)
        .filter(|p| p.is_finite())
        .fold(0.0_f64, f64::max);

    for category in &breakdown.categories {
        if category.proportion.is_finite() {
            let bar = scaled_bar(category.proportion, max_proportion);
            println!(
                "    {:<width$}  {} {}",
                category.label,
                style(bar).yellow(),
                style(format!("({:.1}%)", category.proportion * 100.0)).dim(),
                width = label_width
            );
        } else {
            println!(
                "    {:<width$}  {}",
                category.label,
                style("n/a").dim(),
                width = label_width
            );
        }
    }
}

/// Print one bar per labelled count, scaled to the largest count
pub fn display_count_bars(counts: &[(String, usize)]) {
    let label_width = counts.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let max_count = counts.iter().map(|(_, count)| *count).max().unwrap_or(0);

    for (label, count) in counts {
        let bar = scaled_bar(*count as f64, max_count as f64);
        println!(
            "    {:<width$}  {} {}",
            label,
            style(bar).cyan(),
            style(format!("({})", count)).dim(),
            width = label_width
        );
    }
}

/// Print attended and no-show bars side by side for each category
pub fn display_grouped_outcome_bars(breakdown: &OutcomeBreakdown) {
    let max_count = breakdown
        .categories
        .iter()
        .map(|c| c.total.max(c.no_shows))
        .max()
        .unwrap_or(0) as f64;

    for category in &breakdown.categories {
        let attended = category.total - category.no_shows;
        println!("    {}", style(&category.label).white().bold());
        println!(
            "      {:<14}  {} {}",
            "Showed up",
            style(scaled_bar(attended as f64, max_count)).green(),
            style(format!("({})", attended)).dim()
        );
        println!(
            "      {:<14}  {} {}",
            "Didn't show up",
            style(scaled_bar(category.no_shows as f64, max_count)).red(),
            style(format!("({})", category.no_shows)).dim()
        );
    }
}

/// Print age descriptive statistics as a table
pub fn display_age_stats(stats: &AgeStats) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Age statistic").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    table.add_row(vec![Cell::new("Count"), Cell::new(stats.count)]);
    table.add_row(vec![
        Cell::new("Mean"),
        Cell::new(format!("{:.1}", stats.mean)),
    ]);
    table.add_row(vec![
        Cell::new("Std dev"),
        if stats.std.is_finite() {
            Cell::new(format!("{:.1}", stats.std))
        } else {
            Cell::new("n/a").fg(Color::DarkGrey)
        },
    ]);
    table.add_row(vec![
        Cell::new("Min"),
        Cell::new(format!("{:.0}", stats.min)),
    ]);
    table.add_row(vec![
        Cell::new("Median"),
        Cell::new(format!("{:.1}", stats.median)),
    ]);
    table.add_row(vec![
        Cell::new("Max"),
        Cell::new(format!("{:.0}", stats.max)),
    ]);

    // Indent the table
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn max_label_width(breakdown: &OutcomeBreakdown) -> usize {
    breakdown
        .categories
        .iter()
        .map(|c| c.label.len())
        .max()
        .unwrap_or(0)
}

fn rate_cell(proportion: f64) -> Cell {
    if !proportion.is_finite() {
        return Cell::new("n/a").fg(Color::DarkGrey);
    }

    let color = if proportion > 0.3 {
        Color::Red
    } else if proportion > 0.15 {
        Color::Yellow
    } else {
        Color::Green
    };

    Cell::new(format!("{:.1}%", proportion * 100.0)).fg(color)
}

fn scaled_bar(value: f64, max_value: f64) -> String {
    if max_value <= 0.0 || !value.is_finite() || value <= 0.0 {
        return String::new();
    }
    let length = ((value / max_value) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(length.min(BAR_WIDTH))
}
