//! Dataset cleaning for the two preparation pipelines.
//!
//! The Burmese/Zomi QA pipeline and the generic English pipeline share the
//! same normalization; the QA variant additionally enforces the closed label
//! and language sets, deduplicates ids and applies an upper length bound.

mod sanitizers;

pub use sanitizers::clean_text;

use crate::config::QaConfig;
use crate::error::Result;
use crate::schema::{VALID_LABELS, VALID_LANGUAGES};
use crate::utils::{has_column, keep_first_mask, string_values};
use polars::prelude::*;
use tracing::{debug, info};

/// Row-dropping cleaner over a loaded dataset.
pub struct DataCleaner {
    min_len: usize,
    max_len: Option<usize>,
    enforce_schema: bool,
}

impl DataCleaner {
    /// Cleaner for the Burmese/Zomi QA pipeline: full schema enforcement
    /// plus both length bounds.
    pub fn burmese(config: &QaConfig) -> Self {
        Self {
            min_len: config.min_len,
            max_len: Some(config.max_len),
            enforce_schema: true,
        }
    }

    /// Cleaner for the generic English pipeline: normalization, text
    /// deduplication, null-label removal and the lower length bound only.
    pub fn english(min_len: usize) -> Self {
        Self {
            min_len,
            max_len: None,
            enforce_schema: false,
        }
    }

    /// Clean the dataset and describe every action taken.
    ///
    /// Cleaning only ever removes rows; the returned frame is never larger
    /// than the input. Columns the dataset does not carry are skipped, the
    /// validator already reported them as missing.
    pub fn clean(&self, df: DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let mut df = df;
        let mut actions = Vec::new();

        info!("Cleaning dataset ({} rows)...", df.height());

        if has_column(&df, "text") {
            df = self.normalize_text(df, &mut actions)?;
            df = drop_duplicates(df, "text", "duplicate texts", &mut actions)?;
        }

        if self.enforce_schema && has_column(&df, "id") {
            df = drop_duplicates(df, "id", "duplicate ids", &mut actions)?;
        }

        if has_column(&df, "label") {
            df = if self.enforce_schema {
                self.restrict_to_set(df, "label", &VALID_LABELS, &mut actions)?
            } else {
                self.drop_null_labels(df, &mut actions)?
            };
        }

        if self.enforce_schema && has_column(&df, "language") {
            df = self.restrict_to_set(df, "language", &VALID_LANGUAGES, &mut actions)?;
        }

        if has_column(&df, "text") {
            df = self.apply_length_bounds(df, &mut actions)?;
        }

        info!("Cleaning done ({} rows retained)", df.height());
        Ok((df, actions))
    }

    /// Replace every text value with its normalized form.
    fn normalize_text(&self, mut df: DataFrame, actions: &mut Vec<String>) -> Result<DataFrame> {
        let values = string_values(&df, "text")?;
        let normalized: Vec<String> = values.iter().map(|v| clean_text(v.as_deref())).collect();
        let changed = values
            .iter()
            .zip(&normalized)
            .filter(|(before, after)| before.as_deref() != Some(after.as_str()))
            .count();

        df.replace("text", Series::new("text".into(), normalized))?;

        if changed > 0 {
            actions.push(format!("Normalized {changed} text values"));
            debug!("Normalized {} text values", changed);
        }
        Ok(df)
    }

    /// Keep only rows whose `column` value is in `valid`. Rows dropped here
    /// fail validation too, but the clean pass removes them silently apart
    /// from this log line.
    fn restrict_to_set(
        &self,
        df: DataFrame,
        column: &str,
        valid: &[&str],
        actions: &mut Vec<String>,
    ) -> Result<DataFrame> {
        let values = string_values(&df, column)?;
        let mask: Vec<bool> = values
            .iter()
            .map(|v| v.as_deref().is_some_and(|v| valid.contains(&v)))
            .collect();
        filter_with_action(df, &mask, &format!("rows with invalid {column}"), actions)
    }

    fn drop_null_labels(&self, df: DataFrame, actions: &mut Vec<String>) -> Result<DataFrame> {
        let values = string_values(&df, "label")?;
        let mask: Vec<bool> = values.iter().map(|v| v.is_some()).collect();
        filter_with_action(df, &mask, "rows with missing label", actions)
    }

    /// Drop rows whose normalized text is shorter than `min_len` or, when an
    /// upper bound is configured, longer than `max_len`. Lengths are counted
    /// in characters, not bytes.
    fn apply_length_bounds(&self, df: DataFrame, actions: &mut Vec<String>) -> Result<DataFrame> {
        let values = string_values(&df, "text")?;
        let mask: Vec<bool> = values
            .iter()
            .map(|v| {
                let len = v.as_deref().map_or(0, |s| s.chars().count());
                len >= self.min_len && self.max_len.is_none_or(|max| len <= max)
            })
            .collect();
        filter_with_action(df, &mask, "length-bounded rows", actions)
    }
}

/// Keep the first occurrence of each value in `column`, in original order.
fn drop_duplicates(
    df: DataFrame,
    column: &str,
    what: &str,
    actions: &mut Vec<String>,
) -> Result<DataFrame> {
    let values = string_values(&df, column)?;
    let mask = keep_first_mask(&values);
    filter_with_action(df, &mask, what, actions)
}

fn filter_with_action(
    df: DataFrame,
    mask: &[bool],
    what: &str,
    actions: &mut Vec<String>,
) -> Result<DataFrame> {
    let before = df.height();
    let mask = BooleanChunked::from_slice("mask".into(), mask);
    let df = df.filter(&mask)?;
    let dropped = before - df.height();
    if dropped > 0 {
        actions.push(format!("Removed {dropped} {what}"));
        debug!("Removed {} {}", dropped, what);
    }
    Ok(df)
}
