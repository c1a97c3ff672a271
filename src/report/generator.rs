//! Report generation.
//!
//! Renders an analysis result for people: a terminal summary and table,
//! a Markdown report, and a JSON report. Currency symbols and subtotal
//! highlighting live here and never in the exported artifacts.

use crate::analysis::top_organizations;
use crate::models::{AnalysisResult, CombinedRow, CombinedTable, Report, ReportMetadata};
use anyhow::Result;

/// Format a count with thousands separators: `1234` → `1,234`.
pub fn format_count(n: usize) -> String {
    group_thousands(&n.to_string())
}

/// Format an amount with a currency symbol, thousands separators and two
/// decimals: `1234.5` → `₱1,234.50`.
pub fn format_currency(value: f64, symbol: &str) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };

    format!("{}{}{}.{}", symbol, sign, group_thousands(int_part), frac_part)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    out
}

/// Terminal summary: the four statistics.
pub fn render_summary(result: &AnalysisResult, symbol: &str) -> String {
    let mut lines = Vec::new();

    lines.push(format!("   📄 Total Rows: {}", format_count(result.row_count)));
    lines.push(format!(
        "   🏢 Unique Gencos: {}",
        format_count(result.organization_count)
    ));
    lines.push(format!(
        "   👥 Beneficiaries: {}",
        format_count(result.beneficiary_count)
    ));
    lines.push(format!(
        "   💰 Total Amount: {}",
        format_currency(result.total_amount, symbol)
    ));

    lines.join("\n")
}

/// Terminal table with aligned columns; subtotal rows are marked with `»`
/// and followed by a rule.
pub fn render_table(table: &CombinedTable, symbol: &str) -> String {
    let header = table.header();
    let body: Vec<Vec<String>> = table.rows.iter().map(|r| display_cells(r, symbol)).collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render_line = |cells: &[String], marker: &str| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(idx, (cell, width))| {
                // Text columns left-aligned, amounts right-aligned
                if idx < 2 {
                    format!("{:<width$}", cell, width = *width)
                } else {
                    format!("{:>width$}", cell, width = *width)
                }
            })
            .collect();
        format!("{} {}", marker, padded.join("  ")).trim_end().to_string()
    };

    let rule_len = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1) + 2;
    let rule = "─".repeat(rule_len);

    let mut lines = vec![render_line(header.as_slice(), " "), rule.clone()];
    for (row, cells) in table.rows.iter().zip(&body) {
        if row.is_subtotal() {
            lines.push(render_line(cells.as_slice(), "»"));
            lines.push(rule.clone());
        } else {
            lines.push(render_line(cells.as_slice(), " "));
        }
    }

    lines.join("\n")
}

fn display_cells(row: &CombinedRow, symbol: &str) -> Vec<String> {
    let mut cells = vec![row.organization.clone(), row.beneficiary.clone()];
    cells.extend(row.amounts.iter().map(|a| format_currency(*a, symbol)));
    cells
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str("# Genco & Beneficiary Fund Analysis\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.result, symbol));
    output.push_str(&generate_results_section(&report.result.combined_table, symbol));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Input:** `{}`\n", metadata.input_path));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Region:** {}\n", metadata.region));
    section.push_str(&format!(
        "- **Rows Read:** {}\n",
        format_count(metadata.input_rows)
    ));
    if metadata.filtered_rows != metadata.input_rows {
        section.push_str(&format!(
            "- **Rows After Region Filter:** {}\n",
            format_count(metadata.filtered_rows)
        ));
    }
    section.push_str(&format!(
        "- **Analysis Duration:** {:.2}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary statistics section.
fn generate_summary_section(result: &AnalysisResult, symbol: &str) -> String {
    let mut section = String::new();

    section.push_str("## Summary Statistics\n\n");
    section.push_str("| 📄 Total Rows | 🏢 Unique Gencos | 👥 Beneficiaries | 💰 Total Amount |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        format_count(result.row_count),
        format_count(result.organization_count),
        format_count(result.beneficiary_count),
        format_currency(result.total_amount, symbol)
    ));

    let top = top_organizations(&result.combined_table, 5);
    if top.len() > 1 {
        section.push_str("### Largest Gencos\n\n");
        section.push_str("| Genco | Total |\n");
        section.push_str("|:---|---:|\n");
        for (organization, total) in top {
            section.push_str(&format!(
                "| {} | {} |\n",
                organization,
                format_currency(total, symbol)
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the analysis results section. Subtotal rows are bold.
fn generate_results_section(table: &CombinedTable, symbol: &str) -> String {
    let mut section = String::new();

    section.push_str("## Analysis Results\n\n");

    let header = table.header();
    section.push_str(&format!("| {} |\n", header.join(" | ")));
    section.push_str("|:---|:---|");
    section.push_str(&"---:|".repeat(table.fund_columns.len()));
    section.push('\n');

    for row in &table.rows {
        let cells: Vec<String> = display_cells(row, symbol)
            .into_iter()
            .map(|cell| escape_cell(&cell))
            .map(|cell| {
                if row.is_subtotal() {
                    format!("**{}**", cell)
                } else {
                    cell
                }
            })
            .collect();
        section.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    section.push('\n');

    section
}

fn escape_cell(cell: &str) -> String {
    cell.replace('|', "\\|")
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!(
        "---\n\n*Report generated by Fund Analyzer v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RowKind;
    use chrono::Utc;

    fn create_test_report() -> Report {
        let combined_table = CombinedTable {
            fund_columns: vec!["EF".to_string(), "DLF".to_string(), "RWMHEEF".to_string()],
            rows: vec![
                CombinedRow {
                    organization: "GencoX".to_string(),
                    beneficiary: "BenA".to_string(),
                    kind: RowKind::Detail,
                    amounts: vec![100.0, 50.0, 0.0],
                },
                CombinedRow {
                    organization: "GencoX".to_string(),
                    beneficiary: "BenB".to_string(),
                    kind: RowKind::Detail,
                    amounts: vec![25.0, 0.0, 0.0],
                },
                CombinedRow {
                    organization: "GencoX".to_string(),
                    beneficiary: "TOTAL".to_string(),
                    kind: RowKind::Subtotal,
                    amounts: vec![125.0, 50.0, 0.0],
                },
            ],
        };

        Report {
            metadata: ReportMetadata {
                input_path: "funds.csv".to_string(),
                analysis_date: Utc::now(),
                region: "All Regions".to_string(),
                input_rows: 3,
                filtered_rows: 3,
                duration_seconds: 0.01,
            },
            result: AnalysisResult {
                combined_table,
                row_count: 2,
                organization_count: 1,
                beneficiary_count: 2,
                total_amount: 175.0,
            },
        }
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0, "₱"), "₱0.00");
        assert_eq!(format_currency(1234.5, "₱"), "₱1,234.50");
        assert_eq!(format_currency(1234567.891, "$"), "$1,234,567.89");
        assert_eq!(format_currency(-999.999, "₱"), "₱-1,000.00");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1234567), "1,234,567");
    }

    #[test]
    fn test_render_summary() {
        let report = create_test_report();
        let summary = render_summary(&report.result, "₱");

        assert!(summary.contains("Total Rows: 2"));
        assert!(summary.contains("Unique Gencos: 1"));
        assert!(summary.contains("Total Amount: ₱175.00"));
    }

    #[test]
    fn test_render_table_marks_subtotals() {
        let report = create_test_report();
        let table = render_table(&report.result.combined_table, "₱");

        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].contains("GENCO/ERD"));
        assert!(lines[0].contains("RWMHEEF"));
        assert!(lines.iter().any(|l| l.starts_with('»') && l.contains("TOTAL")));
        assert!(table.contains("₱125.00"));
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report();
        let markdown = generate_markdown_report(&report, "₱");

        assert!(markdown.contains("# Genco & Beneficiary Fund Analysis"));
        assert!(markdown.contains("## Summary Statistics"));
        assert!(markdown.contains("## Analysis Results"));
        assert!(markdown.contains("| GENCO/ERD | BENEFICIARIES | EF | DLF | RWMHEEF |"));
        assert!(markdown.contains("| **GencoX** | **TOTAL** | **₱125.00** |"));
        // Only one organization, so no ranking table
        assert!(!markdown.contains("Largest Gencos"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report();
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"combined_table\""));
        assert!(json.contains("\"total_amount\": 175.0"));
        assert!(json.contains("\"subtotal\""));
    }
}
