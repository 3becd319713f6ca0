//! Seeded stratified train/dev/test splitting.
//!
//! Two stratified holdout draws: the test set comes off the full dataset at
//! `test_size`, then the dev set comes off the remainder at
//! `dev_size / (1 - test_size)`, so the dev share of the whole dataset is
//! still approximately `dev_size`. Both draws use the configured seed, so a
//! fixed `(seed, test_size, dev_size)` on an identical input reproduces the
//! exact same partitions.

use crate::config::SplitConfig;
use crate::error::{PrepError, Result};
use crate::utils::string_values;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use tracing::info;

/// The three disjoint partitions of one dataset.
#[derive(Debug)]
pub struct DatasetSplits {
    pub train: DataFrame,
    pub dev: DataFrame,
    pub test: DataFrame,
}

/// Label-preserving splitter over a cleaned dataset.
pub struct StratifiedSplitter {
    config: SplitConfig,
}

impl StratifiedSplitter {
    pub fn new(config: SplitConfig) -> Self {
        Self { config }
    }

    /// Partition the dataset into train/dev/test.
    ///
    /// Errors if the label column is absent or a class is too small for the
    /// requested fractions; fraction feasibility is never adjusted silently.
    pub fn split(&self, df: &DataFrame) -> Result<DatasetSplits> {
        let labels: Vec<String> = string_values(df, &self.config.label_column)?
            .into_iter()
            .enumerate()
            .map(|(row, label)| {
                label.ok_or_else(|| {
                    PrepError::SplitInfeasible(format!("row {row} has no label value"))
                })
            })
            .collect::<Result<_>>()?;

        let (train_idx, dev_idx, test_idx) = self.split_indices(&labels)?;

        info!(
            "Split {} rows into train={} dev={} test={}",
            df.height(),
            train_idx.len(),
            dev_idx.len(),
            test_idx.len()
        );

        Ok(DatasetSplits {
            train: take_rows(df, &train_idx)?,
            dev: take_rows(df, &dev_idx)?,
            test: take_rows(df, &test_idx)?,
        })
    }

    /// Compute the three index partitions. Indices are positions in the
    /// input; the partitions are pairwise disjoint and their union is the
    /// full index set.
    pub fn split_indices(&self, labels: &[String]) -> Result<(Vec<usize>, Vec<usize>, Vec<usize>)> {
        let (rest, test) = stratified_holdout(labels, self.config.test_size, self.config.seed)?;

        let rest_labels: Vec<String> = rest.iter().map(|&i| labels[i].clone()).collect();
        let dev_ratio = self.config.dev_size / (1.0 - self.config.test_size);
        let (train_rel, dev_rel) = stratified_holdout(&rest_labels, dev_ratio, self.config.seed)?;

        let train: Vec<usize> = train_rel.iter().map(|&i| rest[i]).collect();
        let dev: Vec<usize> = dev_rel.iter().map(|&i| rest[i]).collect();
        Ok((train, dev, test))
    }
}

/// One stratified holdout draw: per class, shuffle the class's row indices
/// with a seeded RNG and take `round(count * fraction)` of them for the
/// holdout. Returns `(rest, holdout)`, both sorted ascending.
///
/// Feasibility rules follow the usual stratified-sampling contract: every
/// class needs at least 2 members, and the rounded holdout share must leave
/// at least one member on each side.
fn stratified_holdout(
    labels: &[String],
    fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let mut classes: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (row, label) in labels.iter().enumerate() {
        classes.entry(label.as_str()).or_default().push(row);
    }
    if classes.is_empty() {
        return Err(PrepError::SplitInfeasible("dataset is empty".to_string()));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut rest = Vec::new();
    let mut holdout = Vec::new();

    for (class, mut rows) in classes {
        let count = rows.len();
        if count < 2 {
            return Err(PrepError::SplitInfeasible(format!(
                "class '{class}' has only {count} member(s); at least 2 are required"
            )));
        }
        let take = (count as f64 * fraction).round() as usize;
        if take == 0 || take >= count {
            return Err(PrepError::SplitInfeasible(format!(
                "class '{class}' with {count} member(s) cannot yield a holdout fraction of {fraction:.3}"
            )));
        }
        rows.shuffle(&mut rng);
        holdout.extend_from_slice(&rows[..take]);
        rest.extend_from_slice(&rows[take..]);
    }

    rest.sort_unstable();
    holdout.sort_unstable();
    Ok((rest, holdout))
}

fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let mut keep = vec![false; df.height()];
    for &row in indices {
        keep[row] = true;
    }
    let mask = BooleanChunked::from_slice("mask".into(), &keep);
    Ok(df.filter(&mask)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn labels(neutral: usize, distress: usize) -> Vec<String> {
        let mut labels = vec!["neutral".to_string(); neutral];
        labels.extend(vec!["distress".to_string(); distress]);
        labels
    }

    fn splitter(test_size: f64, dev_size: f64, seed: u64) -> StratifiedSplitter {
        StratifiedSplitter::new(
            SplitConfig::builder()
                .test_size(test_size)
                .dev_size(dev_size)
                .seed(seed)
                .build()
                .unwrap(),
        )
    }

    fn ratio(indices: &[usize], labels: &[String], class: &str) -> f64 {
        let hits = indices.iter().filter(|&&i| labels[i] == class).count();
        hits as f64 / indices.len() as f64
    }

    #[test]
    fn test_partitions_are_disjoint_and_cover_input() {
        let labels = labels(140, 60);
        let (train, dev, test) = splitter(0.1, 0.1, 42).split_indices(&labels).unwrap();

        let mut all: Vec<usize> = Vec::new();
        all.extend(&train);
        all.extend(&dev);
        all.extend(&test);
        assert_eq!(all.len(), labels.len());

        let unique: HashSet<usize> = all.iter().copied().collect();
        assert_eq!(unique.len(), labels.len());
    }

    #[test]
    fn test_split_is_deterministic_for_fixed_seed() {
        let labels = labels(70, 30);
        let first = splitter(0.1, 0.1, 42).split_indices(&labels).unwrap();
        let second = splitter(0.1, 0.1, 42).split_indices(&labels).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_seed_changes_partitions() {
        let labels = labels(70, 30);
        let first = splitter(0.1, 0.1, 42).split_indices(&labels).unwrap();
        let second = splitter(0.1, 0.1, 7).split_indices(&labels).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_label_proportions_preserved_within_tolerance() {
        let labels = labels(140, 60); // 70% / 30%
        let (train, dev, test) = splitter(0.1, 0.1, 42).split_indices(&labels).unwrap();

        for partition in [&train, &dev, &test] {
            let neutral = ratio(partition, &labels, "neutral");
            assert!(
                (neutral - 0.7).abs() <= 0.05,
                "neutral ratio {neutral} outside tolerance"
            );
        }
    }

    #[test]
    fn test_partition_sizes_approximate_fractions() {
        let labels = labels(140, 60);
        let (train, dev, test) = splitter(0.1, 0.1, 42).split_indices(&labels).unwrap();
        assert_eq!(test.len(), 20);
        assert_eq!(dev.len(), 20);
        assert_eq!(train.len(), 160);
    }

    #[test]
    fn test_singleton_class_is_fatal() {
        let mut labels = labels(20, 0);
        labels.push("distress".to_string());
        let err = splitter(0.1, 0.1, 42).split_indices(&labels).unwrap_err();
        assert!(matches!(err, PrepError::SplitInfeasible(_)));
    }

    #[test]
    fn test_class_too_small_for_fraction_is_fatal() {
        // 4 distress rows round to a zero-size test draw at 10%
        let labels = labels(100, 4);
        let err = splitter(0.1, 0.1, 42).split_indices(&labels).unwrap_err();
        assert!(matches!(err, PrepError::SplitInfeasible(_)));
    }

    #[test]
    fn test_split_dataframe_rows_match_indices() {
        let texts: Vec<String> = (0..40).map(|i| format!("sentence number {i}")).collect();
        let labels: Vec<&str> = (0..40)
            .map(|i| if i % 2 == 0 { "neutral" } else { "distress" })
            .collect();
        let df = df!["text" => texts, "label" => labels].unwrap();

        let splits = splitter(0.25, 0.25, 42).split(&df).unwrap();
        assert_eq!(
            splits.train.height() + splits.dev.height() + splits.test.height(),
            df.height()
        );
        assert_eq!(splits.test.height(), 10);
    }

    #[test]
    fn test_missing_label_column_is_fatal() {
        let df = df!["text" => ["only text here"]].unwrap();
        let err = splitter(0.1, 0.1, 42).split(&df).unwrap_err();
        assert!(matches!(err, PrepError::Polars(_)));
    }
}
