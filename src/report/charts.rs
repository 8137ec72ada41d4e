//! SVG chart rendering for the exported report bundle
//!
//! Renders the three proportion breakdowns and the age histogram as bar
//! charts. Categories keep their fixed ordering on the x axis; undefined
//! proportions leave an empty slot instead of a bar.

use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;
use plotters_svg::SVGBackend;

use crate::pipeline::OutcomeBreakdown;

/// Chart file names inside the report bundle
pub const SMS_CHART_NAME: &str = "sms_proportions.svg";
pub const AGE_BRACKET_CHART_NAME: &str = "age_bracket_proportions.svg";
pub const DISEASE_CHART_NAME: &str = "disease_history_attendance.svg";
pub const HISTOGRAM_CHART_NAME: &str = "age_distribution.svg";

/// Rendered size of every chart in pixels
const CHART_SIZE: (u32, u32) = (900, 540);

/// Render a breakdown as a single-series bar chart of no-show proportions
pub fn render_proportion_chart(
    breakdown: &OutcomeBreakdown,
    title: &str,
    output_path: &Path,
) -> Result<()> {
    let labels: Vec<String> = breakdown
        .categories
        .iter()
        .map(|c| c.label.clone())
        .collect();
    let max_proportion = breakdown
        .categories
        .iter()
        .map(|c| c.proportion)
        .filter(|p| p.is_finite())
        .fold(0.0_f64, f64::max);
    let y_max = (max_proportion * 1.25).clamp(0.05, 1.0);

    let root = SVGBackend::new(output_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20).into_font())
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(0..labels.len() as i32, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_labels(labels.len() + 1)
        .x_label_formatter(&|x| {
            labels
                .get(*x as usize)
                .cloned()
                .unwrap_or_default()
        })
        .x_desc(breakdown.field.title())
        .y_desc("No-show proportion")
        .draw()?;

    for (idx, category) in breakdown.categories.iter().enumerate() {
        if category.proportion.is_finite() {
            chart.draw_series(std::iter::once(Rectangle::new(
                [(idx as i32, 0.0), (idx as i32 + 1, category.proportion)],
                BLUE.filled(),
            )))?;
        }
    }

    root.present()?;
    Ok(())
}

/// Render a breakdown as grouped bars of attended vs no-show counts,
/// one sub-bar colour per category
pub fn render_grouped_outcome_chart(
    breakdown: &OutcomeBreakdown,
    title: &str,
    output_path: &Path,
) -> Result<()> {
    let group_names = ["Showed up", "Didn't show up"];
    let category_count = breakdown.categories.len().max(1);
    let max_count = breakdown
        .categories
        .iter()
        .map(|c| (c.total - c.no_shows).max(c.no_shows))
        .max()
        .unwrap_or(0);
    let y_max = (max_count as f64 * 1.15).max(1.0);

    let root = SVGBackend::new(output_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20).into_font())
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..group_names.len() as f64, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_labels(group_names.len() * 2 + 1)
        .x_label_formatter(&|x| {
            // Label only the group centres (0.5, 1.5)
            let centre = x - 0.5;
            if (centre - centre.round()).abs() < 0.05 && centre >= 0.0 {
                group_names
                    .get(centre.round() as usize)
                    .map(|s| s.to_string())
                    .unwrap_or_default()
            } else {
                String::new()
            }
        })
        .x_desc("Attendance outcome")
        .y_desc("Appointments")
        .draw()?;

    let bar_width = 0.8 / category_count as f64;
    for (series_idx, category) in breakdown.categories.iter().enumerate() {
        let color = Palette99::pick(series_idx).mix(1.0);
        let attended = category.total - category.no_shows;
        let counts = [attended, category.no_shows];

        let bars: Vec<Rectangle<(f64, f64)>> = counts
            .iter()
            .enumerate()
            .map(|(group_idx, count)| {
                let x0 = group_idx as f64 + 0.1 + series_idx as f64 * bar_width;
                Rectangle::new([(x0, 0.0), (x0 + bar_width, *count as f64)], color.filled())
            })
            .collect();

        chart
            .draw_series(bars)?
            .label(category.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 4), (x + 12, y + 4)], color.filled()));
    }

    chart.configure_series_labels().border_style(&BLACK).draw()?;
    root.present()?;
    Ok(())
}

/// Render the equal-width age histogram as a bar chart
pub fn render_histogram_chart(bins: &[(String, usize)], output_path: &Path) -> Result<()> {
    let labels: Vec<String> = bins.iter().map(|(range, _)| range.clone()).collect();
    let max_count = bins.iter().map(|(_, count)| *count).max().unwrap_or(0);
    let y_max = (max_count as f64 * 1.15).max(1.0);

    let root = SVGBackend::new(output_path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Age distribution", ("sans-serif", 20).into_font())
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(0..bins.len().max(1) as i32, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_labels(bins.len() + 1)
        .x_label_formatter(&|x| {
            labels
                .get(*x as usize)
                .cloned()
                .unwrap_or_default()
        })
        .x_desc("Age range")
        .y_desc("Appointments")
        .draw()?;

    for (idx, (_, count)) in bins.iter().enumerate() {
        chart.draw_series(std::iter::once(Rectangle::new(
            [(idx as i32, 0.0), (idx as i32 + 1, *count as f64)],
            BLUE.filled(),
        )))?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{CategoryBreakdown, GroupField};
    use tempfile::tempdir;

    fn sample_breakdown() -> OutcomeBreakdown {
        OutcomeBreakdown {
            field: GroupField::SmsReceived,
            categories: vec![
                CategoryBreakdown {
                    value: "0".to_string(),
                    label: "SMS not received".to_string(),
                    total: 4,
                    no_shows: 1,
                    proportion: 0.25,
                },
                CategoryBreakdown {
                    value: "1".to_string(),
                    label: "SMS received".to_string(),
                    total: 2,
                    no_shows: 1,
                    proportion: 0.5,
                },
            ],
        }
    }

    #[test]
    fn test_proportion_chart_writes_svg() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sms.svg");

        render_proportion_chart(&sample_breakdown(), "No-show proportion by SMS", &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
        assert!(content.contains("No-show proportion by SMS"));
    }

    #[test]
    fn test_proportion_chart_skips_undefined_categories() {
        let mut breakdown = sample_breakdown();
        breakdown.categories[1].total = 0;
        breakdown.categories[1].no_shows = 0;
        breakdown.categories[1].proportion = f64::NAN;
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.svg");

        render_proportion_chart(&breakdown, "Partial", &path).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_grouped_chart_writes_svg_with_legend() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grouped.svg");

        render_grouped_outcome_chart(&sample_breakdown(), "Attendance by group", &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
        assert!(content.contains("SMS received"));
    }

    #[test]
    fn test_histogram_chart_writes_svg() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ages.svg");
        let bins = vec![
            ("0-20".to_string(), 3usize),
            ("20-40".to_string(), 5),
            ("40-60".to_string(), 2),
        ];

        render_histogram_chart(&bins, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
        assert!(content.contains("Age distribution"));
    }
}
