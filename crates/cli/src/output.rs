//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};
use vpa_core::report::{ColumnSums, Row};

/// Output format for manifest-producing commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// YAML (default)
    #[default]
    Yaml,
    /// JSON
    Json,
    /// TOML
    Toml,
}

/// Encode a value in the selected format
pub fn encode<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Json => {
            let mut s = serde_json::to_string_pretty(value)?;
            s.push('\n');
            s
        }
        OutputFormat::Toml => toml::to_string(value)?,
    })
}

/// Display row for the comparison table
#[derive(Tabled)]
struct DisplayRow {
    #[tabled(rename = "Namespace")]
    namespace: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Container")]
    container: String,
    #[tabled(rename = "Req-CPU")]
    requested_cpu: String,
    #[tabled(rename = "VPA-CPU")]
    recommended_cpu: String,
    #[tabled(rename = "CPU diff%")]
    cpu_diff: String,
    #[tabled(rename = "Req-RAM")]
    requested_mib: String,
    #[tabled(rename = "VPA-RAM")]
    recommended_mib: String,
    #[tabled(rename = "Mem. diff%")]
    memory_diff: String,
    #[tabled(rename = "sum(Δ)")]
    combined: String,
}

impl DisplayRow {
    fn from_row(row: &Row) -> Self {
        DisplayRow {
            namespace: row.namespace.clone(),
            name: row.name.clone(),
            mode: row.mode_label(),
            container: row.container.clone(),
            requested_cpu: row.requested_cpu.to_string(),
            recommended_cpu: opt_int(row.recommended_cpu),
            cpu_diff: styled_diff(row.cpu_diff),
            requested_mib: format_mib(row.requested_mib),
            recommended_mib: row.recommended_mib.map(format_mib).unwrap_or_default(),
            memory_diff: styled_diff(row.memory_diff),
            combined: opt_int(row.combined),
        }
    }

    fn footer(sums: ColumnSums) -> Self {
        DisplayRow {
            namespace: String::new(),
            name: String::new(),
            mode: String::new(),
            container: "Σ".to_string(),
            requested_cpu: sums.requested_cpu.to_string(),
            recommended_cpu: sums.recommended_cpu.to_string(),
            cpu_diff: String::new(),
            requested_mib: format_mib(sums.requested_mib),
            recommended_mib: format_mib(sums.recommended_mib),
            memory_diff: String::new(),
            combined: String::new(),
        }
    }
}

/// Render the comparison table, with optional sum footers on the
/// value columns
pub fn render_table(rows: &[Row], sums: Option<ColumnSums>) -> String {
    let mut display: Vec<DisplayRow> = rows.iter().map(DisplayRow::from_row).collect();
    if let Some(sums) = sums {
        display.push(DisplayRow::footer(sums));
    }

    Table::new(display)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(4..)).with(Alignment::right()))
        .to_string()
}

/// Style a percentage deviation: one treatment above +10, another
/// below -10, neutral otherwise
pub fn styled_diff(diff: Option<i64>) -> String {
    match diff {
        None => String::new(),
        Some(d) if d > 10 => format!("{d}%").blue().to_string(),
        Some(d) if d < -10 => format!("{d}%").red().to_string(),
        Some(d) => format!("{d}%"),
    }
}

fn opt_int(v: Option<i64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

/// Mebibytes with one decimal place
pub fn format_mib(v: f64) -> String {
    format!("{v:.1}")
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_diffs_are_unstyled() {
        assert_eq!(styled_diff(Some(10)), "10%");
        assert_eq!(styled_diff(Some(-10)), "-10%");
        assert_eq!(styled_diff(None), "");
    }

    #[test]
    fn outliers_are_styled() {
        assert!(styled_diff(Some(11)).contains("11%"));
        assert!(styled_diff(Some(-11)).contains("-11%"));
    }

    #[test]
    fn mib_renders_one_decimal() {
        assert_eq!(format_mib(2.0), "2.0");
        assert_eq!(format_mib(1.5), "1.5");
    }
}
