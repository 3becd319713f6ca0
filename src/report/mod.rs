//! Report rendering and output writing.
//!
//! The QA report is a Markdown document: a title naming the input, one block
//! per finding in evaluation order, and a trailing overall-status line.
//! This module also owns all CSV output (cleaned dataset and the three
//! splits), always UTF-8 with a header row and no index column.

use crate::error::{Result, ResultExt};
use crate::schema::{Finding, QaReport};
use crate::splitter::DatasetSplits;
use crate::utils::ensure_parent_dir;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct ReportWriter;

impl ReportWriter {
    /// Render the report as a Markdown document.
    pub fn render_markdown(report: &QaReport) -> String {
        let mut blocks = Vec::new();
        blocks.push(format!("# QA Report for {}", report.input_path));
        for finding in &report.findings {
            blocks.push(render_finding(finding));
        }
        blocks.push(format!("**Overall status:** {}", report.status()));
        blocks.join("\n\n") + "\n"
    }

    /// Write the rendered report to `path`, creating parent directories as
    /// needed. A failed write is fatal.
    pub fn write_report(report: &QaReport, path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;
        std::fs::write(path, Self::render_markdown(report))
            .context(format!("Writing QA report to {}", path.display()))?;
        info!("Wrote QA report to {}", path.display());
        Ok(())
    }

    /// Write a dataset to `path` as UTF-8 CSV with a header row, creating
    /// parent directories as needed.
    pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
        ensure_parent_dir(path)?;
        let mut file =
            File::create(path).context(format!("Creating output file {}", path.display()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .finish(df)?;
        info!("Wrote {} rows to {}", df.height(), path.display());
        Ok(())
    }

    /// Write the three split datasets as `train.csv`, `dev.csv` and
    /// `test.csv` under `out_dir`.
    pub fn write_splits(
        splits: &mut DatasetSplits,
        out_dir: &Path,
    ) -> Result<(PathBuf, PathBuf, PathBuf)> {
        let train_path = out_dir.join("train.csv");
        let dev_path = out_dir.join("dev.csv");
        let test_path = out_dir.join("test.csv");
        Self::write_csv(&mut splits.train, &train_path)?;
        Self::write_csv(&mut splits.dev, &dev_path)?;
        Self::write_csv(&mut splits.test, &test_path)?;
        Ok((train_path, dev_path, test_path))
    }
}

fn render_finding(finding: &Finding) -> String {
    let mut block = format!("## {}\n\n", finding.check.title());
    if finding.passed {
        block.push_str("Pass.");
    } else {
        block.push_str(&format!(
            "**{}:** {} affected (samples: {})",
            finding.check.title(),
            finding.affected,
            finding.samples.join(", ")
        ));
    }
    if let Some(detail) = &finding.detail {
        block.push_str("\n\n");
        block.push_str(detail);
    }
    block
}
