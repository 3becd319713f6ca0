//! Small helpers shared across the pipeline modules.

use crate::error::Result;
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Read one column as owned optional strings, casting non-string dtypes
/// (integer ids, inferred dates) to their textual form first.
pub fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df.column(name)?.as_materialized_series();
    let series = if series.dtype() == &DataType::String {
        series.clone()
    } else {
        series.cast(&DataType::String)?
    };
    let chunked = series.str()?;
    Ok(chunked
        .into_iter()
        .map(|v| v.map(|s| s.to_string()))
        .collect())
}

/// True if the dataset has a column with this exact name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Frequency counts over non-null values, ordered by descending count and
/// then by value for a stable rendering.
pub fn value_counts(values: &[Option<String>]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values.iter().flatten() {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }
    let mut sorted: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

/// Mask that keeps only the first occurrence of each non-null value.
/// Null entries are always kept; downstream filters deal with them.
pub fn keep_first_mask(values: &[Option<String>]) -> Vec<bool> {
    let mut seen: HashSet<&str> = HashSet::new();
    values
        .iter()
        .map(|value| match value {
            Some(v) => seen.insert(v.as_str()),
            None => true,
        })
        .collect()
}

/// Create the parent directory of `path` if it does not exist yet.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
