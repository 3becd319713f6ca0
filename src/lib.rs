//! Dataset preparation toolkit for a Burmese/Zomi mental-health text
//! classifier.
//!
//! # Overview
//!
//! Two pipelines share this crate:
//!
//! - **Dataset preparation**: schema/quality validation, text cleaning and a
//!   seeded stratified train/dev/test split over flat CSV files, with a
//!   Markdown QA report.
//! - **Classification flow core**: the non-UI logic of the interactive demo,
//!   covering label-index discovery from model metadata, threshold decisions and an
//!   append-only prediction log. The model itself stays behind the
//!   [`classify::Classifier`] trait.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use mh_textprep::{DataCleaner, QaConfig, ReportWriter, SchemaValidator};
//! use polars::prelude::*;
//!
//! let df = CsvReadOptions::default()
//!     .with_has_header(true)
//!     .try_into_reader_with_file_path(Some("data/burmese_sample.csv".into()))?
//!     .finish()?;
//!
//! let config = QaConfig::default();
//! let report = SchemaValidator::new(&config).validate(&df, "data/burmese_sample.csv")?;
//! ReportWriter::write_report(&report, "reports/qa_report.md".as_ref())?;
//!
//! let (mut cleaned, actions) = DataCleaner::burmese(&config).clean(df)?;
//! ReportWriter::write_csv(&mut cleaned, "data/burmese_sample_clean.csv".as_ref())?;
//! ```

pub mod classify;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod report;
pub mod schema;
pub mod splitter;
pub mod validator;
pub mod utils;

// Re-exports for convenient access
pub use classify::{
    ClassificationFlow, Classifier, FlowConfig, Label, LabelMapping, Prediction, PredictionLog,
    decide,
};
pub use cleaner::{DataCleaner, clean_text};
pub use config::{ConfigValidationError, QaConfig, SplitConfig};
pub use error::{PrepError, Result as PrepResult, ResultExt};
pub use report::ReportWriter;
pub use schema::{Check, Finding, QaReport, Status};
pub use splitter::{DatasetSplits, StratifiedSplitter};
pub use validator::SchemaValidator;
