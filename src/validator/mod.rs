//! Schema and quality validation for the Burmese/Zomi dataset.
//!
//! Every check is independent and all of them run; nothing short-circuits.
//! Failures become report findings, never errors; the only error this
//! module's caller can see is a failure to read the column data itself.

use crate::config::QaConfig;
use crate::error::Result;
use crate::schema::{
    Check, Finding, QaReport, DATE_FORMAT, REQUIRED_COLUMNS, VALID_LABELS, VALID_LANGUAGES,
};
use crate::utils::{has_column, string_values, value_counts};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::info;

/// Runs the full battery of quality checks without mutating the input.
pub struct SchemaValidator {
    min_len: usize,
    max_len: usize,
}

impl SchemaValidator {
    pub fn new(config: &QaConfig) -> Self {
        Self {
            min_len: config.min_len,
            max_len: config.max_len,
        }
    }

    /// Evaluate every check and collect the findings in evaluation order.
    ///
    /// Row-level checks that need a column the dataset does not carry are
    /// skipped; the missing column itself is already a finding.
    pub fn validate(&self, df: &DataFrame, input_path: &str) -> Result<QaReport> {
        let mut report = QaReport::new(input_path);

        report.push(check_required_columns(df));

        if has_column(df, "text") {
            let texts = string_values(df, "text")?;
            report.push(check_empty_text(&texts));
            let (too_short, too_long) = self.check_length_bounds(&texts);
            report.push(too_short);
            report.push(too_long);
        }

        if has_column(df, "label") {
            let labels = string_values(df, "label")?;
            report.push(check_closed_set(Check::LabelValidity, &labels, &VALID_LABELS));
        }

        if has_column(df, "language") {
            let languages = string_values(df, "language")?;
            report.push(check_closed_set(
                Check::LanguageValidity,
                &languages,
                &VALID_LANGUAGES,
            ));
        }

        if has_column(df, "id") {
            let ids = string_values(df, "id")?;
            report.push(check_duplicates(Check::DuplicateIds, &ids));
        }

        if has_column(df, "text") {
            let texts = string_values(df, "text")?;
            report.push(check_duplicates(Check::DuplicateTexts, &texts));
        }

        if has_column(df, "collection_date") {
            let dates = string_values(df, "collection_date")?;
            report.push(check_dates(&dates));
        }

        info!(
            "Validated {} rows: {} findings, status {}",
            df.height(),
            report.findings.len(),
            report.status()
        );
        Ok(report)
    }

    /// Texts shorter than `min_len` and longer than `max_len` are flagged
    /// separately. Lengths are character counts; a missing text counts as
    /// length zero.
    fn check_length_bounds(&self, texts: &[Option<String>]) -> (Finding, Finding) {
        let mut short_rows = Vec::new();
        let mut long_rows = Vec::new();
        for (row, text) in texts.iter().enumerate() {
            let len = text.as_deref().map_or(0, |t| t.chars().count());
            if len < self.min_len {
                short_rows.push(row.to_string());
            }
            if len > self.max_len {
                long_rows.push(row.to_string());
            }
        }
        let too_short = if short_rows.is_empty() {
            Finding::pass(Check::TooShortText)
        } else {
            Finding::fail(Check::TooShortText, short_rows.len(), short_rows)
        };
        let too_long = if long_rows.is_empty() {
            Finding::pass(Check::TooLongText)
        } else {
            Finding::fail(Check::TooLongText, long_rows.len(), long_rows)
        };
        (too_short, too_long)
    }
}

fn check_required_columns(df: &DataFrame) -> Finding {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !has_column(df, name))
        .map(|name| name.to_string())
        .collect();
    if missing.is_empty() {
        Finding::pass(Check::RequiredColumns)
    } else {
        Finding::fail(Check::RequiredColumns, missing.len(), missing)
    }
}

/// Rows whose text, after whitespace trimming, is the empty string.
/// Missing values are treated as empty.
fn check_empty_text(texts: &[Option<String>]) -> Finding {
    let rows: Vec<String> = texts
        .iter()
        .enumerate()
        .filter(|(_, text)| text.as_deref().is_none_or(|t| t.trim().is_empty()))
        .map(|(row, _)| row.to_string())
        .collect();
    if rows.is_empty() {
        Finding::pass(Check::EmptyText)
    } else {
        Finding::fail(Check::EmptyText, rows.len(), rows)
    }
}

/// Closed-set membership check. The full frequency distribution is recorded
/// as the finding's detail whether or not every value is valid.
fn check_closed_set(check: Check, values: &[Option<String>], valid: &[&str]) -> Finding {
    let invalid_rows: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.as_deref().is_some_and(|v| valid.contains(&v)))
        .map(|(row, _)| row)
        .collect();

    let distribution = render_distribution(values);

    let finding = if invalid_rows.is_empty() {
        Finding::pass(check)
    } else {
        let mut invalid_values: Vec<String> = invalid_rows
            .iter()
            .map(|&row| values[row].clone().unwrap_or_else(|| "<missing>".to_string()))
            .collect();
        invalid_values.sort();
        invalid_values.dedup();
        Finding::fail(check, invalid_rows.len(), invalid_values)
    };
    finding.with_detail(distribution)
}

/// Every occurrence of a repeated value is part of the duplicate set, not
/// just the second and later ones.
fn check_duplicates(check: Check, values: &[Option<String>]) -> Finding {
    let mut occurrences: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values.iter().flatten() {
        *occurrences.entry(value.as_str()).or_insert(0) += 1;
    }
    let duplicated: Vec<(&str, usize)> = occurrences
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .collect();

    if duplicated.is_empty() {
        Finding::pass(check)
    } else {
        let affected: usize = duplicated.iter().map(|(_, count)| count).sum();
        let samples: Vec<String> = duplicated
            .iter()
            .map(|(value, _)| value.to_string())
            .collect();
        Finding::fail(check, affected, samples)
    }
}

fn check_dates(dates: &[Option<String>]) -> Finding {
    let rows: Vec<String> = dates
        .iter()
        .enumerate()
        .filter(|(_, date)| {
            !date
                .as_deref()
                .is_some_and(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).is_ok())
        })
        .map(|(row, _)| row.to_string())
        .collect();
    if rows.is_empty() {
        Finding::pass(Check::DateValidity)
    } else {
        Finding::fail(Check::DateValidity, rows.len(), rows)
    }
}

fn render_distribution(values: &[Option<String>]) -> String {
    let counts = value_counts(values);
    let mut lines: Vec<String> = counts
        .into_iter()
        .map(|(value, count)| format!("{value}: {count}"))
        .collect();
    let missing = values.iter().filter(|v| v.is_none()).count();
    if missing > 0 {
        lines.push(format!("<missing>: {missing}"));
    }
    lines.join("\n")
}
