//! Dataset schema constants and QA report types.

use serde::{Deserialize, Serialize};

/// Columns the Burmese/Zomi dataset must carry.
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "id",
    "text",
    "language",
    "label",
    "source",
    "license",
    "collection_date",
    "split",
    "translation_of",
    "collector",
    "notes",
];

/// The closed set of target classes.
pub const VALID_LABELS: [&str; 2] = ["distress", "neutral"];

/// The closed set of language tags.
pub const VALID_LANGUAGES: [&str; 3] = ["my", "zom", "en-my"];

/// Expected format of `collection_date` values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How many affected row indices or values a finding shows. Presentation
/// limit only; totals always count every affected row.
pub const SAMPLE_CAP: usize = 15;

/// Overall outcome of a QA run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Every check passed.
    Pass,
    /// At least one check failed; the dataset needs human review.
    Review,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Pass => write!(f, "PASS"),
            Status::Review => write!(f, "REVIEW"),
        }
    }
}

/// The individual quality checks, in evaluation (and report) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Check {
    RequiredColumns,
    EmptyText,
    TooShortText,
    TooLongText,
    LabelValidity,
    LanguageValidity,
    DuplicateIds,
    DuplicateTexts,
    DateValidity,
}

impl Check {
    /// Human-readable heading used in the report.
    pub fn title(&self) -> &'static str {
        match self {
            Check::RequiredColumns => "Required columns",
            Check::EmptyText => "Empty text",
            Check::TooShortText => "Too-short text",
            Check::TooLongText => "Too-long text",
            Check::LabelValidity => "Label validity",
            Check::LanguageValidity => "Language validity",
            Check::DuplicateIds => "Duplicate ids",
            Check::DuplicateTexts => "Duplicate texts",
            Check::DateValidity => "Collection date validity",
        }
    }
}

/// One check outcome with its evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub check: Check,
    pub passed: bool,
    /// Total number of affected rows (or values), uncapped.
    pub affected: usize,
    /// Bounded sample of affected row indices or values (at most
    /// [`SAMPLE_CAP`] entries).
    pub samples: Vec<String>,
    /// Extra evidence such as a frequency distribution, shown even when the
    /// check passes.
    pub detail: Option<String>,
}

impl Finding {
    /// A passing finding with no evidence.
    pub fn pass(check: Check) -> Self {
        Self {
            check,
            passed: true,
            affected: 0,
            samples: Vec::new(),
            detail: None,
        }
    }

    /// A failing finding. `samples` is truncated to [`SAMPLE_CAP`];
    /// `affected` keeps the full count.
    pub fn fail(check: Check, affected: usize, mut samples: Vec<String>) -> Self {
        samples.truncate(SAMPLE_CAP);
        Self {
            check,
            passed: false,
            affected,
            samples,
            detail: None,
        }
    }

    /// Attach extra evidence to the finding.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Result of validating one dataset: ordered findings plus an overall status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaReport {
    /// Path of the validated input, used in the report title.
    pub input_path: String,
    pub findings: Vec<Finding>,
}

impl QaReport {
    pub fn new(input_path: impl Into<String>) -> Self {
        Self {
            input_path: input_path.into(),
            findings: Vec::new(),
        }
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// PASS only when every finding passed.
    pub fn status(&self) -> Status {
        if self.findings.iter().all(|f| f.passed) {
            Status::Pass
        } else {
            Status::Review
        }
    }
}
