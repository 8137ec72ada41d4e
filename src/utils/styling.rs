//! Terminal styling utilities for a modern, visually appealing TUI

use console::{style, Emoji};
use std::path::Path;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");

/// Print the application banner with ASCII art
pub fn print_banner(version: &str) {
    let banner = r#"
    ███╗   ██╗ ██████╗ ███████╗██╗  ██╗ ██████╗ ██╗    ██╗
    ████╗  ██║██╔═══██╗██╔════╝██║  ██║██╔═══██╗██║    ██║
    ██╔██╗ ██║██║   ██║███████╗███████║██║   ██║██║ █╗ ██║
    ██║╚██╗██║██║   ██║╚════██║██╔══██║██║   ██║██║███╗██║
    ██║ ╚████║╚██████╔╝███████║██║  ██║╚██████╔╝╚███╔███╔╝
    ╚═╝  ╚═══╝ ╚═════╝ ╚══════╝╚═╝  ╚═╝ ╚═════╝  ╚══╝╚══╝
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {} {}",
        style("✚").magenta().bold(),
        style("Appointment attendance at a glance").dim()
    );
    println!(
        "    {}",
        style(format!("v{}", version)).dim()
    );
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(
    input: &Path,
    outcome: &str,
    output: Option<&Path>,
    age_bins: &[f64],
    policies: &str,
) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    let output_display = match output {
        Some(path) => truncate_path(path, 38),
        None => "terminal only".to_string(),
    };
    let bins_display = age_bins
        .iter()
        .map(|edge| format!("{}", edge))
        .collect::<Vec<_>>()
        .join(", ");

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Input:   {:<38}│",
        FOLDER,
        truncate_path(input, 37)
    );
    println!(
        "    │  {} Outcome: {:<38}│",
        TARGET,
        truncate_string(outcome, 37)
    );
    println!(
        "    │  {} Report:  {:<38}│",
        SAVE,
        output_display
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Age bins:  {:<36}│",
        CHART,
        style(bins_display).yellow()
    );
    println!(
        "    │  {} Policies:  {:<36}│",
        INFO,
        style(policies).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print the elapsed time of a completed step
pub fn print_step_time(elapsed: std::time::Duration) {
    println!(
        "    {}",
        style(format!("⏱  {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a non-fatal data quality warning
pub fn print_warning(message: &str) {
    println!("    {} {}", WARNING, style(message).yellow());
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("No-show analysis complete!").green().bold()
    );
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, extra_info: Option<&str>) {
    if let Some(info) = extra_info {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!(
            "      Found {} {}",
            style(count).yellow().bold(),
            description
        );
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("...{}", &s[s.len() - max_len + 3..])
    }
}
