//! Human-readable rendering of run results.

use std::fmt::Write as _;

use itertools::Itertools;

use crate::{
    mapping::{ColumnMapping, normalize_header},
    pipeline::CleanOutcome,
    record::Field,
};

const RULE_WIDTH: usize = 48;

/// Summary block printed after a run; drop reasons follow when any rows were dropped.
pub fn render_summary(outcome: &CleanOutcome) -> String {
    let stats = &outcome.stats;
    let mut lines = vec![
        ("Original rows", stats.original_count.to_string()),
        ("Invalid filtered", stats.invalid_filtered.to_string()),
        ("Duplicates removed", stats.duplicates_removed.to_string()),
        ("Final clean rows", stats.final_count.to_string()),
        ("Data retained", format!("{:.1}%", stats.data_retained_pct)),
    ];
    let reasons = outcome
        .diagnostics
        .drop_reasons
        .iter()
        .map(|(reason, count)| (reason.as_str(), count.to_string()))
        .collect_vec();
    let issues = outcome.diagnostics.total_field_issues();
    if issues > 0 {
        lines.push(("Unusable field values", issues.to_string()));
    }

    let width = lines
        .iter()
        .chain(reasons.iter())
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0)
        + 1;
    let rule = "=".repeat(RULE_WIDTH);

    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "CLEANING SUMMARY ({} records)", outcome.record_type);
    let _ = writeln!(out, "{rule}");
    for (label, value) in &lines {
        let _ = writeln!(out, "  {:<width$} {value}", format!("{label}:"));
    }
    if !reasons.is_empty() {
        let _ = writeln!(out, "  Dropped by reason:");
        for (label, value) in &reasons {
            let _ = writeln!(out, "    {:<width$} {value}", format!("{label}:"));
        }
    }
    let _ = writeln!(out, "{rule}");
    out
}

/// One row per input header: position, header, normalized header, mapped field.
pub fn mapping_rows(headers: &[String], mapping: &ColumnMapping) -> Vec<Vec<String>> {
    let fields = mapping.record_type().fields();
    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let field = fields
                .iter()
                .find(|field| mapping.column_index(**field) == Some(idx))
                .map(Field::as_str)
                .unwrap_or("-");
            vec![
                (idx + 1).to_string(),
                header.clone(),
                normalize_header(header),
                field.to_string(),
            ]
        })
        .collect()
}

/// Left-aligned columns separated by two spaces, with a dashed rule under the header.
pub fn render_rows(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| h.chars().count()).collect_vec();
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(widths.len()) {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }
    let format_line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}", width = *width))
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", format_line(headers.to_vec()));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect_vec();
    let _ = writeln!(out, "{}", format_line(rule.iter().map(String::as_str).collect()));
    for row in rows {
        let _ = writeln!(out, "{}", format_line(row.iter().map(String::as_str).collect()));
    }
    out
}
