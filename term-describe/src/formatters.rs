//! Report rendering for dataset profiles and master summaries.
//!
//! Formatters turn profiles into strings; writing them anywhere is up to the
//! caller. Output contains no timestamps, so rendering the same profile twice
//! yields the same text.
//!
//! # Examples
//!
//! ```rust
//! use term_describe::formatters::{JsonFormatter, MarkdownFormatter, ReportFormatter};
//! use term_describe::identity::DatasetIdentity;
//! use term_describe::profile::DatasetProfile;
//!
//! let profile = DatasetProfile::failed(DatasetIdentity::new("/data/x.csv", None), "bad file");
//! let markdown = MarkdownFormatter::new().format_profile(&profile).unwrap();
//! assert!(markdown.contains("bad file"));
//! let json = JsonFormatter::new().with_pretty(false).format_profile(&profile).unwrap();
//! assert!(json.starts_with('{'));
//! ```

use std::fmt::{self, Write};

use serde::Serialize;
use serde_json::Value;

use crate::aggregate::{MasterSummary, PctDistribution};
use crate::error::{DescribeError, Result};
use crate::profile::{ColumnProfile, CorrelationProfile, DatasetProfile, ProfileStatus};
use crate::warnings::Severity;

/// Configuration options for rendering reports.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include the per-column statistics table
    pub include_columns: bool,
    /// Include warnings
    pub include_warnings: bool,
    /// Include preview rows
    pub include_preview: bool,
    /// Include notes about omitted statistics
    pub include_notes: bool,
    /// Maximum number of rows per rendered table (-1 for all)
    pub max_rows: i32,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_columns: true,
            include_warnings: true,
            include_preview: true,
            include_notes: true,
            max_rows: 50,
        }
    }
}

impl FormatterConfig {
    /// Creates a minimal configuration showing only the overview.
    pub fn minimal() -> Self {
        Self {
            include_columns: false,
            include_warnings: true,
            include_preview: false,
            include_notes: false,
            max_rows: 10,
        }
    }

    /// Creates a detailed configuration showing everything.
    pub fn detailed() -> Self {
        Self {
            include_columns: true,
            include_warnings: true,
            include_preview: true,
            include_notes: true,
            max_rows: -1,
        }
    }

    /// Sets whether to include the column table.
    pub fn with_columns(mut self, include: bool) -> Self {
        self.include_columns = include;
        self
    }

    /// Sets whether to include preview rows.
    pub fn with_preview(mut self, include: bool) -> Self {
        self.include_preview = include;
        self
    }

    /// Sets the maximum number of rows per table.
    pub fn with_max_rows(mut self, max: i32) -> Self {
        self.max_rows = max;
        self
    }

    fn limit<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        if self.max_rows < 0 {
            items
        } else {
            &items[..items.len().min(self.max_rows as usize)]
        }
    }
}

/// Trait for rendering profiles into an output format.
///
/// # Examples
///
/// ```rust
/// use term_describe::aggregate::MasterSummary;
/// use term_describe::formatters::ReportFormatter;
/// use term_describe::profile::DatasetProfile;
///
/// struct HeadlineFormatter;
///
/// impl ReportFormatter for HeadlineFormatter {
///     fn format_profile(&self, profile: &DatasetProfile) -> term_describe::error::Result<String> {
///         Ok(format!("{}: {} columns", profile.identity.title(), profile.columns.len()))
///     }
///
///     fn format_summary(&self, summary: &MasterSummary) -> term_describe::error::Result<String> {
///         Ok(format!("{} datasets", summary.totals.datasets_attempted))
///     }
/// }
/// ```
pub trait ReportFormatter {
    /// Renders one dataset profile.
    fn format_profile(&self, profile: &DatasetProfile) -> Result<String>;

    /// Renders the cross-dataset summary.
    fn format_summary(&self, summary: &MasterSummary) -> Result<String>;
}

/// Renders reports as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: true,
        }
    }

    /// Creates a new JSON formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.map_err(|e| DescribeError::Serialization(format!("Failed to render JSON: {e}")))
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format_profile(&self, profile: &DatasetProfile) -> Result<String> {
        let mut value = serde_json::to_value(profile)
            .map_err(|e| DescribeError::Serialization(format!("Failed to render JSON: {e}")))?;
        if let Value::Object(map) = &mut value {
            if !self.config.include_columns {
                map.remove("columns");
            }
            if !self.config.include_preview {
                map.remove("preview");
            }
            if !self.config.include_warnings {
                map.remove("warnings");
            }
            if !self.config.include_notes {
                map.remove("notes");
            }
        }
        self.render(&value)
    }

    fn format_summary(&self, summary: &MasterSummary) -> Result<String> {
        self.render(summary)
    }
}

/// Renders reports as Markdown documents.
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    /// Creates a new Markdown formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            heading_level: 1,
        }
    }

    /// Creates a new Markdown formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 1,
        }
    }

    /// Sets the base heading level for the output.
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 5);
        self
    }

    fn write_profile(&self, out: &mut String, profile: &DatasetProfile) -> fmt::Result {
        let config = &self.config;
        let h = "#".repeat(self.heading_level as usize);
        let identity = &profile.identity;

        writeln!(out, "{h} {}", escape(&identity.title()))?;
        writeln!(out)?;
        writeln!(out, "- **Dataset id:** `{}`", identity.id)?;
        writeln!(out, "- **Source:** `{}`", identity.source_path.display())?;
        if let Some(sheet) = &identity.sheet_name {
            writeln!(out, "- **Sheet:** {}", escape(sheet))?;
        }
        match &profile.status {
            ProfileStatus::Profiled => writeln!(out, "- **Status:** profiled")?,
            ProfileStatus::Empty => writeln!(out, "- **Status:** empty (no rows)")?,
            ProfileStatus::Failed { reason } => {
                writeln!(out, "- **Status:** failed")?;
                writeln!(out)?;
                writeln!(out, "> {}", escape(reason))?;
                return Ok(());
            }
        }

        if let Some(overview) = &profile.overview {
            writeln!(out)?;
            writeln!(out, "{h}# Overview")?;
            writeln!(out)?;
            writeln!(out, "| Metric | Value |")?;
            writeln!(out, "|--------|-------|")?;
            writeln!(out, "| Rows | {} |", overview.rows)?;
            writeln!(out, "| Columns | {} |", overview.columns)?;
            writeln!(
                out,
                "| Missing cells | {} ({:.2}%) |",
                overview.missing_cells, overview.missing_cell_pct
            )?;
            if let (Some(rows), Some(pct)) = (overview.duplicate_rows, overview.duplicate_row_pct)
            {
                writeln!(out, "| Duplicate rows | {rows} ({pct:.2}%) |")?;
            }
            writeln!(
                out,
                "| Memory estimate | {} bytes |",
                overview.memory_bytes_estimate
            )?;
        }

        let sampling = &profile.sampling;
        if sampling.sampled {
            writeln!(out)?;
            writeln!(
                out,
                "> Distribution statistics use the first {} of {} rows.",
                sampling.rows_profiled, sampling.rows_total
            )?;
        }

        if config.include_columns && !profile.columns.is_empty() {
            writeln!(out)?;
            writeln!(out, "{h}# Columns")?;
            writeln!(out)?;
            writeln!(out, "| Column | Type | Kind | Null % | Unique | Details |")?;
            writeln!(out, "|--------|------|------|--------|--------|---------|")?;
            for column in config.limit(&profile.columns) {
                writeln!(
                    out,
                    "| {} | {} | {:?} | {:.2} | {} | {} |",
                    escape(&column.name),
                    column.dtype,
                    column.kind,
                    column.null_pct,
                    column
                        .unique_count
                        .map_or_else(|| "-".to_string(), |u| u.to_string()),
                    escape(&column_details(column))
                )?;
            }
            self.write_truncation(out, profile.columns.len())?;

            let keys: Vec<&ColumnProfile> = profile
                .columns
                .iter()
                .filter(|c| c.key_candidate.is_some())
                .collect();
            if !keys.is_empty() {
                writeln!(out)?;
                writeln!(out, "{h}# Key candidates")?;
                writeln!(out)?;
                writeln!(
                    out,
                    "| Column | Unique ratio | Repeated keys | Rows in repeats | Severity |"
                )?;
                writeln!(
                    out,
                    "|--------|--------------|---------------|-----------------|----------|"
                )?;
                for column in keys {
                    if let Some(key) = &column.key_candidate {
                        writeln!(
                            out,
                            "| {} | {:.4} | {} ({:.2}%) | {} | {:?} |",
                            escape(&column.name),
                            key.unique_ratio,
                            key.repeated_keys,
                            key.repeated_keys_pct,
                            key.rows_in_repeated_keys,
                            key.repeat_severity
                        )?;
                    }
                }
            }
        }

        if let Some(correlation) = &profile.correlation {
            writeln!(out)?;
            writeln!(out, "{h}# Correlation")?;
            writeln!(out)?;
            match correlation {
                CorrelationProfile::Skipped { detail, .. } => {
                    writeln!(out, "Skipped: {}", escape(detail))?;
                }
                CorrelationProfile::Matrix { .. } => {
                    let pairs = strongest_pairs(correlation);
                    if pairs.is_empty() {
                        writeln!(out, "No correlated column pairs.")?;
                    } else {
                        writeln!(out, "| Column A | Column B | Pearson r |")?;
                        writeln!(out, "|----------|----------|-----------|")?;
                        for (a, b, r) in config.limit(&pairs) {
                            writeln!(out, "| {} | {} | {r:.3} |", escape(a), escape(b))?;
                        }
                    }
                }
            }
        }

        if let Some(range) = &profile.temporal_coverage {
            writeln!(out)?;
            writeln!(
                out,
                "**Temporal coverage:** {} to {}",
                range.min_year, range.max_year
            )?;
        }

        if config.include_warnings && !profile.warnings.is_empty() {
            writeln!(out)?;
            writeln!(out, "{h}# Quality warnings")?;
            writeln!(out)?;
            for warning in &profile.warnings {
                writeln!(
                    out,
                    "- {} **{}**: {}",
                    severity_icon(warning.severity),
                    warning.kind,
                    escape(&warning.message)
                )?;
            }
        }

        if config.include_preview {
            if let Some(preview) = profile.preview.as_ref().filter(|p| !p.rows.is_empty()) {
                writeln!(out)?;
                writeln!(out, "{h}# Preview")?;
                writeln!(out)?;
                let header: Vec<String> = preview.columns.iter().map(|c| escape(c)).collect();
                writeln!(out, "| {} |", header.join(" | "))?;
                writeln!(out, "|{}", "---|".repeat(header.len()))?;
                for row in config.limit(&preview.rows) {
                    let cells: Vec<String> = row
                        .iter()
                        .map(|cell| cell.as_deref().map(escape).unwrap_or_default())
                        .collect();
                    writeln!(out, "| {} |", cells.join(" | "))?;
                }
            }
        }

        if config.include_notes && !profile.notes.is_empty() {
            writeln!(out)?;
            writeln!(out, "{h}# Notes")?;
            writeln!(out)?;
            for note in &profile.notes {
                writeln!(out, "- {}", escape(note))?;
            }
        }
        Ok(())
    }

    fn write_summary(&self, out: &mut String, summary: &MasterSummary) -> fmt::Result {
        let config = &self.config;
        let h = "#".repeat(self.heading_level as usize);
        let totals = &summary.totals;

        writeln!(out, "{h} Master Summary")?;
        writeln!(out)?;
        writeln!(out, "- **Datasets attempted:** {}", totals.datasets_attempted)?;
        writeln!(
            out,
            "- **Profiled / empty / failed:** {} / {} / {}",
            totals.profiled, totals.empty, totals.failed
        )?;
        writeln!(out, "- **Total rows:** {}", totals.total_rows)?;
        writeln!(out, "- **Total columns:** {}", totals.total_columns)?;

        writeln!(out)?;
        writeln!(out, "{h}# Dataset inventory")?;
        writeln!(out)?;
        if summary.inventory.is_empty() {
            writeln!(out, "(none)")?;
        } else {
            writeln!(out, "| Dataset | Id | Rows | Columns | Missing % | Status |")?;
            writeln!(out, "|---------|----|------|---------|-----------|--------|")?;
            for entry in config.limit(&summary.inventory) {
                let status = match &entry.status {
                    ProfileStatus::Profiled => "profiled".to_string(),
                    ProfileStatus::Empty => "empty".to_string(),
                    ProfileStatus::Failed { reason } => format!("FAILED: {reason}"),
                };
                let name = match &entry.sheet_name {
                    Some(sheet) => format!("{} ({sheet})", entry.dataset_name),
                    None => entry.dataset_name.clone(),
                };
                writeln!(
                    out,
                    "| {} | `{}` | {} | {} | {} | {} |",
                    escape(&name),
                    entry.id,
                    entry.rows,
                    entry.columns,
                    entry
                        .missing_cell_pct
                        .map_or_else(|| "-".to_string(), |p| format!("{p:.2}")),
                    escape(&status)
                )?;
            }
            self.write_truncation(out, summary.inventory.len())?;
        }

        writeln!(out)?;
        writeln!(out, "{h}# Schema composition")?;
        writeln!(out)?;
        if summary.dtype_composition.is_empty() {
            writeln!(out, "(no columns)")?;
        } else {
            writeln!(out, "| Type | Columns | % |")?;
            writeln!(out, "|------|---------|---|")?;
            for share in &summary.dtype_composition {
                writeln!(out, "| {} | {} | {:.2} |", share.dtype, share.count, share.pct)?;
            }
        }

        writeln!(out)?;
        writeln!(out, "{h}# Missingness and duplicates")?;
        writeln!(out)?;
        if summary.missing_cell_pct.is_none() && summary.duplicate_row_pct.is_none() {
            writeln!(out, "(no profiled datasets)")?;
        } else {
            writeln!(out, "| Metric | Datasets | Avg % | Median % | P90 % |")?;
            writeln!(out, "|--------|----------|-------|----------|-------|")?;
            write_distribution(out, "Missing cells", summary.missing_cell_pct.as_ref())?;
            write_distribution(out, "Duplicate rows", summary.duplicate_row_pct.as_ref())?;
        }

        writeln!(out)?;
        writeln!(out, "{h}# Missingness hotspots")?;
        writeln!(out)?;
        if summary.missingness_hotspots.is_empty() {
            writeln!(out, "(none)")?;
        } else {
            writeln!(out, "| Dataset | Column | Nulls | Null % |")?;
            writeln!(out, "|---------|--------|-------|--------|")?;
            for spot in config.limit(&summary.missingness_hotspots) {
                writeln!(
                    out,
                    "| {} | {} | {} | {:.2} |",
                    escape(&spot.dataset_name),
                    escape(&spot.column),
                    spot.null_count,
                    spot.null_pct
                )?;
            }
        }

        writeln!(out)?;
        writeln!(out, "{h}# Columns with very high missingness (>= 80%)")?;
        writeln!(out)?;
        if summary.high_missing_columns.is_empty() {
            writeln!(out, "(none)")?;
        } else {
            writeln!(out, "| Dataset | Column | Null % |")?;
            writeln!(out, "|---------|--------|--------|")?;
            for spot in config.limit(&summary.high_missing_columns) {
                writeln!(
                    out,
                    "| {} | {} | {:.2} |",
                    escape(&spot.dataset_name),
                    escape(&spot.column),
                    spot.null_pct
                )?;
            }
        }

        let identifiers: Vec<_> = summary
            .inventory
            .iter()
            .filter(|e| !e.high_uniqueness_columns.is_empty())
            .collect();
        if !identifiers.is_empty() {
            writeln!(out)?;
            writeln!(out, "{h}# High-uniqueness columns")?;
            writeln!(out)?;
            for entry in identifiers {
                writeln!(
                    out,
                    "- **{}:** {}",
                    escape(&entry.dataset_name),
                    escape(&entry.high_uniqueness_columns.join(", "))
                )?;
            }
        }

        writeln!(out)?;
        writeln!(out, "{h}# High-cardinality text columns")?;
        writeln!(out)?;
        if summary.high_cardinality_text.is_empty() {
            writeln!(out, "(none)")?;
        } else {
            writeln!(out, "| Dataset | Column | Unique ratio | Non-null | Unique |")?;
            writeln!(out, "|---------|--------|--------------|----------|--------|")?;
            for column in config.limit(&summary.high_cardinality_text) {
                writeln!(
                    out,
                    "| {} | {} | {:.4} | {} | {} |",
                    escape(&column.dataset_name),
                    escape(&column.column),
                    column.unique_ratio,
                    column.non_null,
                    column.unique_count
                )?;
            }
        }

        writeln!(out)?;
        writeln!(out, "{h}# Constant columns")?;
        writeln!(out)?;
        if summary.constant_columns.is_empty() {
            writeln!(out, "(none)")?;
        } else {
            for column in config.limit(&summary.constant_columns) {
                writeln!(
                    out,
                    "- {} / {} ({})",
                    escape(&column.dataset_name),
                    escape(&column.column),
                    column.dtype
                )?;
            }
        }

        writeln!(out)?;
        writeln!(out, "{h}# Temporal coverage")?;
        writeln!(out)?;
        match summary.temporal_coverage.global {
            None => writeln!(out, "(no temporal columns detected)")?,
            Some(global) => {
                writeln!(
                    out,
                    "Overall: {} to {}",
                    global.min_year, global.max_year
                )?;
                writeln!(out)?;
                for dataset in &summary.temporal_coverage.datasets {
                    writeln!(
                        out,
                        "- {}: {} to {}",
                        escape(&dataset.dataset_name),
                        dataset.min_year,
                        dataset.max_year
                    )?;
                }
            }
        }

        if config.include_warnings {
            writeln!(out)?;
            writeln!(out, "{h}# Quality warnings")?;
            writeln!(out)?;
            if summary.warnings.is_empty() {
                writeln!(out, "(none)")?;
            } else {
                for attributed in config.limit(&summary.warnings) {
                    let warning = &attributed.warning;
                    writeln!(
                        out,
                        "- {} `{}` {} **{}**: {}",
                        severity_icon(warning.severity),
                        attributed.dataset_id,
                        escape(&attributed.dataset_name),
                        warning.kind,
                        escape(&warning.message)
                    )?;
                }
                self.write_truncation(out, summary.warnings.len())?;
            }
        }
        Ok(())
    }

    fn write_truncation(&self, out: &mut String, total: usize) -> fmt::Result {
        if self.config.max_rows >= 0 && total > self.config.max_rows as usize {
            writeln!(out)?;
            writeln!(
                out,
                "> **Note:** {} additional rows not shown.",
                total - self.config.max_rows as usize
            )?;
        }
        Ok(())
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format_profile(&self, profile: &DatasetProfile) -> Result<String> {
        let mut output = String::new();
        self.write_profile(&mut output, profile)
            .map_err(|e| DescribeError::Serialization(format!("Failed to render Markdown: {e}")))?;
        Ok(output)
    }

    fn format_summary(&self, summary: &MasterSummary) -> Result<String> {
        let mut output = String::new();
        self.write_summary(&mut output, summary)
            .map_err(|e| DescribeError::Serialization(format!("Failed to render Markdown: {e}")))?;
        Ok(output)
    }
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "🚨",
        Severity::Warning => "⚠️",
        Severity::Info => "ℹ️",
    }
}

fn escape(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

fn write_distribution(
    out: &mut String,
    label: &str,
    dist: Option<&PctDistribution>,
) -> fmt::Result {
    match dist {
        Some(d) => writeln!(
            out,
            "| {label} | {} | {:.2} | {:.2} | {:.2} |",
            d.datasets, d.avg, d.median, d.p90
        ),
        None => writeln!(out, "| {label} | 0 | - | - | - |"),
    }
}

/// One-line digest of the statistics a column carries.
fn column_details(column: &ColumnProfile) -> String {
    let mut parts = Vec::new();
    if let Some(n) = &column.numeric {
        parts.push(format!("min {} / mean {:.3} / max {}", n.min, n.mean, n.max));
    }
    if let Some(c) = &column.categorical {
        if let Some(top) = c.top.first() {
            parts.push(format!("top '{}' ({:.1}%)", top.value, top.pct));
        }
    }
    if let Some(t) = &column.text {
        parts.push(format!("avg len {:.1}, max {}", t.avg_len, t.max_len));
    }
    if let Some(t) = &column.temporal {
        parts.push(format!("years {}-{}", t.min_year, t.max_year));
    }
    if let Some(l) = &column.list_like {
        parts.push(format!(
            "list-like '{}' ({:.1}% of values)",
            l.delimiter, l.hit_pct
        ));
    }
    parts.join("; ")
}

/// Off-diagonal pairs ordered by absolute coefficient, then by names.
fn strongest_pairs(correlation: &CorrelationProfile) -> Vec<(String, String, f64)> {
    let CorrelationProfile::Matrix { columns, values, .. } = correlation else {
        return Vec::new();
    };
    let mut pairs = Vec::new();
    for (i, a) in columns.iter().enumerate() {
        for (j, b) in columns.iter().enumerate().skip(i + 1) {
            if let Some(r) = values.get(i).and_then(|row| row.get(j)).copied().flatten() {
                pairs.push((a.clone(), b.clone(), r));
            }
        }
    }
    pairs.sort_by(|x, y| {
        y.2.abs()
            .total_cmp(&x.2.abs())
            .then_with(|| x.0.cmp(&y.0))
            .then_with(|| x.1.cmp(&y.1))
    });
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::ProfileAssembler;
    use crate::config::ProfileConfig;
    use crate::identity::DatasetIdentity;
    use crate::table::Table;
    use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
    use std::sync::Arc;

    fn profile() -> DatasetProfile {
        let table = Table::from_columns(
            DatasetIdentity::new("/data/orders.csv", None),
            vec![
                ("id", Arc::new(Int64Array::from_iter_values(1..=12)) as ArrayRef),
                (
                    "amount",
                    Arc::new(Float64Array::from_iter_values((1..=12).map(|i| i as f64 * 1.5)))
                        as ArrayRef,
                ),
                ("note", Arc::new(StringArray::from(vec!["a|b"; 12])) as ArrayRef),
            ],
        )
        .unwrap();
        ProfileAssembler::new(ProfileConfig::default())
            .unwrap()
            .profile(&table)
    }

    #[test]
    fn test_json_profile_respects_config() {
        let profile = profile();
        let full = JsonFormatter::new().format_profile(&profile).unwrap();
        assert!(full.contains("\"preview\""));

        let slim = JsonFormatter::with_config(FormatterConfig::minimal())
            .with_pretty(false)
            .format_profile(&profile)
            .unwrap();
        let value: Value = serde_json::from_str(&slim).unwrap();
        assert!(value.get("preview").is_none());
        assert!(value.get("columns").is_none());
        assert!(value.get("overview").is_some());
    }

    #[test]
    fn test_markdown_profile_sections() {
        let output = MarkdownFormatter::new().format_profile(&profile()).unwrap();
        assert!(output.starts_with("# orders"));
        assert!(output.contains("## Overview"));
        assert!(output.contains("## Columns"));
        assert!(output.contains("## Key candidates"));
        assert!(output.contains("| id | amount | 1.000 |"));
        // Pipes inside values must not break the table
        assert!(output.contains("a\\|b"));
    }

    #[test]
    fn test_markdown_heading_level() {
        let output = MarkdownFormatter::new()
            .with_heading_level(2)
            .format_profile(&profile())
            .unwrap();
        assert!(output.starts_with("## orders"));
        assert!(output.contains("### Overview"));
    }

    #[test]
    fn test_markdown_summary_lists_failures() {
        let profiles = vec![
            profile(),
            DatasetProfile::failed(DatasetIdentity::new("/data/bad.csv", None), "unreadable"),
        ];
        let summary = MasterSummary::build(&profiles, &ProfileConfig::default());
        let output = MarkdownFormatter::new().format_summary(&summary).unwrap();

        assert!(output.contains("# Master Summary"));
        assert!(output.contains("FAILED: unreadable"));
        assert!(output.contains("**Profiled / empty / failed:** 1 / 0 / 1"));
    }

    #[test]
    fn test_markdown_summary_high_missing_section() {
        let sparse = Table::from_columns(
            DatasetIdentity::new("/data/sparse.csv", None),
            vec![(
                "remarks",
                Arc::new(StringArray::from_iter((0..10).map(|i| (i == 3).then_some("x"))))
                    as ArrayRef,
            )],
        )
        .unwrap();
        let sparse = ProfileAssembler::new(ProfileConfig::default())
            .unwrap()
            .profile(&sparse);
        let summary = MasterSummary::build(&[sparse], &ProfileConfig::default());
        let output = MarkdownFormatter::new().format_summary(&summary).unwrap();

        assert!(output.contains("## Columns with very high missingness (>= 80%)"));
        assert!(output.contains("| sparse | remarks | 90.00 |"));
    }

    #[test]
    fn test_rendering_is_stable() {
        let profile = profile();
        let formatter = MarkdownFormatter::new();
        assert_eq!(
            formatter.format_profile(&profile).unwrap(),
            formatter.format_profile(&profile).unwrap()
        );
    }
}
