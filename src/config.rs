//! Configuration types for the QA and splitting pipelines.
//!
//! Both configs use a small builder with validation, so bad parameter
//! combinations fail before any data is touched.

use serde::{Deserialize, Serialize};

/// Configuration for the QA pipeline (validation + cleaning).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaConfig {
    /// Minimum text length (in characters) kept after cleaning.
    /// Default: 5
    pub min_len: usize,

    /// Maximum text length (in characters) kept after cleaning.
    /// Default: 500
    pub max_len: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            min_len: 5,
            max_len: 500,
        }
    }
}

impl QaConfig {
    /// Create a new configuration builder.
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.min_len == 0 || self.min_len > self.max_len {
            return Err(ConfigValidationError::InvalidLengthBounds {
                min: self.min_len,
                max: self.max_len,
            });
        }
        Ok(())
    }
}

/// Builder for [`QaConfig`].
#[derive(Debug, Default)]
pub struct QaConfigBuilder {
    min_len: Option<usize>,
    max_len: Option<usize>,
}

impl QaConfigBuilder {
    /// Set the minimum text length retained after cleaning.
    pub fn min_len(mut self, len: usize) -> Self {
        self.min_len = Some(len);
        self
    }

    /// Set the maximum text length retained after cleaning.
    pub fn max_len(mut self, len: usize) -> Self {
        self.max_len = Some(len);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `QaConfig` or an error if validation fails.
    pub fn build(self) -> Result<QaConfig, ConfigValidationError> {
        let config = QaConfig {
            min_len: self.min_len.unwrap_or(5),
            max_len: self.max_len.unwrap_or(500),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration for the stratified train/dev/test split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of the dataset held out as the test set (0.0 - 1.0).
    /// Default: 0.1
    pub test_size: f64,

    /// Fraction of the full dataset held out as the dev set (0.0 - 1.0).
    /// The dev draw happens on the remainder after the test draw, so the
    /// effective ratio there is `dev_size / (1 - test_size)`.
    /// Default: 0.1
    pub dev_size: f64,

    /// Seed for the stratified shuffle. Identical seed and input yield
    /// identical partitions.
    /// Default: 42
    pub seed: u64,

    /// Column holding the class label used for stratification.
    /// Default: "label"
    pub label_column: String,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: 0.1,
            dev_size: 0.1,
            seed: 42,
            label_column: "label".to_string(),
        }
    }
}

impl SplitConfig {
    /// Create a new configuration builder.
    pub fn builder() -> SplitConfigBuilder {
        SplitConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in [("test_size", self.test_size), ("dev_size", self.dev_size)] {
            if !(value > 0.0 && value < 1.0) {
                return Err(ConfigValidationError::InvalidFraction {
                    field: field.to_string(),
                    value,
                });
            }
        }
        if self.test_size + self.dev_size >= 1.0 {
            return Err(ConfigValidationError::FractionSum {
                sum: self.test_size + self.dev_size,
            });
        }
        if self.label_column.is_empty() {
            return Err(ConfigValidationError::EmptyLabelColumn);
        }
        Ok(())
    }
}

/// Builder for [`SplitConfig`].
#[derive(Debug, Default)]
pub struct SplitConfigBuilder {
    test_size: Option<f64>,
    dev_size: Option<f64>,
    seed: Option<u64>,
    label_column: Option<String>,
}

impl SplitConfigBuilder {
    /// Set the test fraction of the full dataset.
    pub fn test_size(mut self, fraction: f64) -> Self {
        self.test_size = Some(fraction);
        self
    }

    /// Set the dev fraction of the full dataset.
    pub fn dev_size(mut self, fraction: f64) -> Self {
        self.dev_size = Some(fraction);
        self
    }

    /// Set the shuffle seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the label column used for stratification.
    pub fn label_column(mut self, column: impl Into<String>) -> Self {
        self.label_column = Some(column.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<SplitConfig, ConfigValidationError> {
        let config = SplitConfig {
            test_size: self.test_size.unwrap_or(0.1),
            dev_size: self.dev_size.unwrap_or(0.1),
            seed: self.seed.unwrap_or(42),
            label_column: self.label_column.unwrap_or_else(|| "label".to_string()),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid fraction for '{field}': {value} (must be strictly between 0.0 and 1.0)")]
    InvalidFraction { field: String, value: f64 },

    #[error("test_size + dev_size = {sum} leaves no training data (must be below 1.0)")]
    FractionSum { sum: f64 },

    #[error("Invalid length bounds: min={min}, max={max} (min must be at least 1 and not above max)")]
    InvalidLengthBounds { min: usize, max: usize },

    #[error("Label column name must not be empty")]
    EmptyLabelColumn,

    #[error("Invalid decision threshold: {0} (must be between 0.10 and 0.90)")]
    InvalidThreshold(f32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_qa_config() {
        let config = QaConfig::default();
        assert_eq!(config.min_len, 5);
        assert_eq!(config.max_len, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_split_config() {
        let config = SplitConfig::default();
        assert_eq!(config.test_size, 0.1);
        assert_eq!(config.dev_size, 0.1);
        assert_eq!(config.seed, 42);
        assert_eq!(config.label_column, "label");
    }

    #[test]
    fn test_qa_builder_custom_values() {
        let config = QaConfig::builder().min_len(3).max_len(280).build().unwrap();
        assert_eq!(config.min_len, 3);
        assert_eq!(config.max_len, 280);
    }

    #[test]
    fn test_qa_invalid_length_bounds() {
        let result = QaConfig::builder().min_len(100).max_len(10).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidLengthBounds { .. }
        ));
    }

    #[test]
    fn test_split_invalid_fraction() {
        let result = SplitConfig::builder().test_size(1.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidFraction { .. }
        ));
    }

    #[test]
    fn test_split_fractions_must_leave_training_data() {
        let result = SplitConfig::builder().test_size(0.6).dev_size(0.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::FractionSum { .. }
        ));
    }

    #[test]
    fn test_split_config_serialization() {
        let config = SplitConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: SplitConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.test_size, deserialized.test_size);
        assert_eq!(config.label_column, deserialized.label_column);
    }
}
