//! Core logic of the interactive classification flow.
//!
//! The model itself is an external collaborator behind the [`Classifier`]
//! trait: text in, probability vector out, in whatever label order the model
//! was trained with. Everything around it lives here: discovering which
//! index means `distress`, applying the decision threshold, and appending to
//! the prediction log. The flow is stateless per call; the UI layer owns its
//! own ephemeral state.

use crate::config::ConfigValidationError;
use crate::error::{PrepError, Result, ResultExt};
use crate::utils::ensure_parent_dir;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default decision threshold, matching the slider's initial position.
pub const DEFAULT_THRESHOLD: f32 = 0.45;

/// Valid range for the decision threshold.
pub const THRESHOLD_RANGE: std::ops::RangeInclusive<f32> = 0.10..=0.90;

/// Column order of the prediction log CSV.
pub const LOG_COLUMNS: [&str; 6] = [
    "timestamp",
    "text",
    "p_neutral",
    "p_distress",
    "threshold",
    "label",
];

/// The two target classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Neutral,
    Distress,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Neutral => "neutral",
            Label::Distress => "distress",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque classifier boundary. Implementations load an externally trained
/// model and must fail at construction time, not at predict time, when the
/// model cannot be loaded.
pub trait Classifier {
    /// Probability vector over the model's label order for one text.
    fn predict(&self, text: &str) -> Result<Vec<f32>>;
}

/// Which probability-vector index carries which class.
///
/// Discovered from model metadata with a documented fallback: index 0 =
/// neutral, index 1 = distress. The fallback is logged, never silent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMapping {
    pub neutral_index: usize,
    pub distress_index: usize,
}

impl LabelMapping {
    /// The hardcoded convention used when metadata is absent or unparsable.
    pub fn fallback() -> Self {
        Self {
            neutral_index: 0,
            distress_index: 1,
        }
    }

    /// Discover the mapping from the model directory's `config.json`
    /// (`id2label` entry). Any read or parse failure falls back to the
    /// default convention with a warning.
    pub fn from_model_dir(model_dir: &Path) -> Self {
        let config_path = model_dir.join("config.json");
        match Self::parse_config_file(&config_path) {
            Some(mapping) => {
                debug!(
                    "Label mapping from {}: distress_index={}",
                    config_path.display(),
                    mapping.distress_index
                );
                mapping
            }
            None => {
                warn!(
                    "Could not read id2label from {}; using fallback mapping (0=neutral, 1=distress)",
                    config_path.display()
                );
                Self::fallback()
            }
        }
    }

    fn parse_config_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        let value: serde_json::Value = serde_json::from_str(&content).ok()?;
        Self::parse_id2label(value.get("id2label")?)
    }

    /// The distress index is the entry whose label name starts with
    /// "distress" (case-insensitive); neutral takes the other slot of a
    /// two-class head.
    fn parse_id2label(id2label: &serde_json::Value) -> Option<Self> {
        let map = id2label.as_object()?;
        let mut distress_index = None;
        for (key, name) in map {
            let index: usize = key.parse().ok()?;
            if name.as_str()?.to_lowercase().starts_with("distress") {
                distress_index = Some(index);
            }
        }
        let distress_index = distress_index?;
        Some(Self {
            neutral_index: if distress_index == 1 { 0 } else { 1 },
            distress_index,
        })
    }
}

/// One thresholded classification result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub p_neutral: f32,
    pub p_distress: f32,
    pub threshold: f32,
    pub label: Label,
}

/// Apply the decision threshold to a raw probability vector:
/// `distress` iff `p_distress >= threshold`.
pub fn decide(probs: &[f32], mapping: LabelMapping, threshold: f32) -> Result<Prediction> {
    let index_bound = mapping.neutral_index.max(mapping.distress_index);
    if index_bound >= probs.len() {
        return Err(PrepError::BadProbabilityVector {
            len: probs.len(),
            index: index_bound,
        });
    }
    let p_neutral = probs[mapping.neutral_index];
    let p_distress = probs[mapping.distress_index];
    let label = if p_distress >= threshold {
        Label::Distress
    } else {
        Label::Neutral
    };
    Ok(Prediction {
        p_neutral,
        p_distress,
        threshold,
        label,
    })
}

/// Append-only CSV log of predictions. The header is written only when the
/// file is first created.
#[derive(Debug)]
pub struct PredictionLog {
    path: PathBuf,
}

impl PredictionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, text: &str, prediction: &Prediction) -> Result<()> {
        ensure_parent_dir(&self.path)?;
        let new_file = !self.path.exists();
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context(format!("Opening prediction log {}", self.path.display()))?;

        if new_file {
            writeln!(file, "{}", LOG_COLUMNS.join(","))?;
        }
        writeln!(
            file,
            "{},{},{},{},{},{}",
            Utc::now().to_rfc3339(),
            csv_field(text),
            prediction.p_neutral,
            prediction.p_distress,
            prediction.threshold,
            prediction.label
        )?;
        Ok(())
    }
}

/// Quote a CSV field when it contains a separator, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Configuration of the consolidated classification flow. The historical
/// variants (fixed threshold vs. slider, demo text, log location) are options
/// here, not separate code paths.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Decision threshold; higher means stricter distress.
    pub threshold: f32,
    /// Where classified texts are appended.
    pub log_path: PathBuf,
    /// Optional sample text the UI can offer to populate the input with.
    pub demo_text: Option<String>,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            log_path: PathBuf::from("reports/app_logs/predictions.csv"),
            demo_text: None,
        }
    }
}

impl FlowConfig {
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if !THRESHOLD_RANGE.contains(&self.threshold) {
            return Err(ConfigValidationError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}

/// The classification flow: classify one text, apply the threshold, log the
/// result. Holds no request state between calls.
#[derive(Debug)]
pub struct ClassificationFlow<C: Classifier> {
    classifier: C,
    mapping: LabelMapping,
    config: FlowConfig,
    log: PredictionLog,
}

impl<C: Classifier> ClassificationFlow<C> {
    pub fn new(classifier: C, mapping: LabelMapping, config: FlowConfig) -> Result<Self> {
        config.validate()?;
        let log = PredictionLog::new(config.log_path.clone());
        Ok(Self {
            classifier,
            mapping,
            config,
            log,
        })
    }

    /// Classify one text and append the result to the log. Empty input is
    /// rejected, never classified.
    pub fn classify(&self, text: &str) -> Result<Prediction> {
        let text = text.trim();
        if text.is_empty() {
            return Err(PrepError::EmptyText);
        }
        let probs = self.classifier.predict(text)?;
        let prediction = decide(&probs, self.mapping, self.config.threshold)?;
        self.log.append(text, &prediction)?;
        Ok(prediction)
    }

    pub fn demo_text(&self) -> Option<&str> {
        self.config.demo_text.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct FixedClassifier(Vec<f32>);

    impl Classifier for FixedClassifier {
        fn predict(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_threshold_above_distress_probability_yields_neutral() {
        let pred = decide(&[0.6, 0.4], LabelMapping::fallback(), 0.45).unwrap();
        assert_eq!(pred.label, Label::Neutral);
        assert_eq!(pred.p_neutral, 0.6);
        assert_eq!(pred.p_distress, 0.4);
    }

    #[test]
    fn test_threshold_below_distress_probability_yields_distress() {
        let pred = decide(&[0.6, 0.4], LabelMapping::fallback(), 0.35).unwrap();
        assert_eq!(pred.label, Label::Distress);
    }

    #[test]
    fn test_decide_respects_swapped_mapping() {
        let mapping = LabelMapping {
            neutral_index: 1,
            distress_index: 0,
        };
        let pred = decide(&[0.8, 0.2], mapping, 0.45).unwrap();
        assert_eq!(pred.label, Label::Distress);
        assert_eq!(pred.p_neutral, 0.2);
    }

    #[test]
    fn test_decide_rejects_short_probability_vector() {
        let err = decide(&[1.0], LabelMapping::fallback(), 0.45).unwrap_err();
        assert!(matches!(err, PrepError::BadProbabilityVector { .. }));
    }

    #[test]
    fn test_mapping_parsed_from_model_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"id2label": {"0": "DISTRESS", "1": "NEUTRAL"}}"#,
        )
        .unwrap();
        let mapping = LabelMapping::from_model_dir(dir.path());
        assert_eq!(mapping.distress_index, 0);
        assert_eq!(mapping.neutral_index, 1);
    }

    #[test]
    fn test_mapping_falls_back_on_malformed_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "not json at all").unwrap();
        assert_eq!(LabelMapping::from_model_dir(dir.path()), LabelMapping::fallback());
    }

    #[test]
    fn test_mapping_falls_back_when_config_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(LabelMapping::from_model_dir(dir.path()), LabelMapping::fallback());
    }

    #[test]
    fn test_log_header_written_only_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = PredictionLog::new(dir.path().join("logs/predictions.csv"));
        let pred = decide(&[0.6, 0.4], LabelMapping::fallback(), 0.45).unwrap();

        log.append("first text", &pred).unwrap();
        log.append("second text", &pred).unwrap();

        let content = std::fs::read_to_string(log.path()).unwrap();
        let header_lines = content
            .lines()
            .filter(|l| l.starts_with("timestamp,"))
            .count();
        assert_eq!(header_lines, 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_log_escapes_commas_and_quotes_in_text() {
        let dir = tempfile::tempdir().unwrap();
        let log = PredictionLog::new(dir.path().join("predictions.csv"));
        let pred = decide(&[0.6, 0.4], LabelMapping::fallback(), 0.45).unwrap();

        log.append("hello, \"world\"", &pred).unwrap();
        let content = std::fs::read_to_string(log.path()).unwrap();
        assert!(content.contains("\"hello, \"\"world\"\"\""));
    }

    #[test]
    fn test_flow_rejects_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let flow = ClassificationFlow::new(
            FixedClassifier(vec![0.6, 0.4]),
            LabelMapping::fallback(),
            FlowConfig {
                log_path: dir.path().join("predictions.csv"),
                ..FlowConfig::default()
            },
        )
        .unwrap();

        let err = flow.classify("   ").unwrap_err();
        assert!(matches!(err, PrepError::EmptyText));
        assert!(!dir.path().join("predictions.csv").exists());
    }

    #[test]
    fn test_flow_classifies_and_logs() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("predictions.csv");
        let flow = ClassificationFlow::new(
            FixedClassifier(vec![0.2, 0.8]),
            LabelMapping::fallback(),
            FlowConfig {
                log_path: log_path.clone(),
                ..FlowConfig::default()
            },
        )
        .unwrap();

        let pred = flow.classify("ဒီနေ့ စိတ်ပင်ပန်းနေတယ်").unwrap();
        assert_eq!(pred.label, Label::Distress);

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("distress"));
    }

    #[test]
    fn test_flow_rejects_out_of_range_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let result = ClassificationFlow::new(
            FixedClassifier(vec![0.6, 0.4]),
            LabelMapping::fallback(),
            FlowConfig {
                threshold: 0.95,
                log_path: dir.path().join("predictions.csv"),
                demo_text: None,
            },
        );
        assert!(matches!(
            result.unwrap_err(),
            PrepError::InvalidConfig(ConfigValidationError::InvalidThreshold(_))
        ));
    }
}
