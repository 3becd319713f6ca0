//! CLI entry point for the dataset preparation pipelines.

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand};
use mh_textprep::{
    DataCleaner, QaConfig, ReportWriter, SchemaValidator, SplitConfig, StratifiedSplitter,
    utils::{string_values, value_counts},
};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "mh-textprep",
    version,
    about = "Dataset QA, cleaning and stratified splitting for Burmese/Zomi mental-health text",
    long_about = "Prepares labeled text datasets for classifier training.\n\n\
                  EXAMPLES:\n  \
                  # Validate and clean the Burmese/Zomi dataset\n  \
                  mh-textprep qa --in-path data/burmese/burmese_sample.csv\n\n  \
                  # Stratified train/dev/test split of a cleaned CSV\n  \
                  mh-textprep split --in-path data/burmese/burmese_sample_clean.csv --out-dir data/burmese/splits\n\n  \
                  # Clean and split a generic text,label CSV in one pass\n  \
                  mh-textprep preprocess --in-path data/english/raw/english_raw.csv --out-dir data/english"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run quality checks on the Burmese/Zomi dataset, write a Markdown
    /// report and a cleaned CSV
    Qa(QaArgs),

    /// Stratified train/dev/test split of a cleaned dataset
    Split(SplitArgs),

    /// Clean and split a generic text,label CSV (English pipeline)
    Preprocess(PreprocessArgs),
}

#[derive(Args, Debug)]
struct QaArgs {
    /// Path to the raw CSV file
    #[arg(long, default_value = "data/burmese/burmese_sample.csv")]
    in_path: PathBuf,

    /// Where the cleaned CSV is written
    #[arg(long, default_value = "data/burmese/burmese_sample_clean.csv")]
    out_clean: PathBuf,

    /// Where the Markdown QA report is written
    #[arg(long, default_value = "reports/qa_burmese_data_report.md")]
    report_path: PathBuf,

    /// Minimum text length (characters) retained after cleaning
    #[arg(long, default_value_t = 5)]
    min_len: usize,

    /// Maximum text length (characters) retained after cleaning
    #[arg(long, default_value_t = 500)]
    max_len: usize,
}

#[derive(Args, Debug)]
struct SplitArgs {
    /// Path to the cleaned CSV file
    #[arg(long, default_value = "data/burmese/burmese_sample_clean.csv")]
    in_path: PathBuf,

    /// Directory receiving train.csv, dev.csv and test.csv
    #[arg(long, default_value = "data/burmese/splits")]
    out_dir: PathBuf,

    /// Fraction of the dataset held out as the test set
    #[arg(long, default_value_t = 0.1)]
    test_size: f64,

    /// Fraction of the dataset held out as the dev set
    #[arg(long, default_value_t = 0.1)]
    dev_size: f64,

    /// Seed for the stratified shuffle
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Column holding the class label
    #[arg(long, default_value = "label")]
    label_col: String,
}

#[derive(Args, Debug)]
struct PreprocessArgs {
    /// Path to the raw CSV file (columns: text,label and optional id)
    #[arg(long, default_value = "data/english/raw/english_raw.csv")]
    in_path: PathBuf,

    /// Directory receiving clean/ and splits/ subdirectories
    #[arg(long, default_value = "data/english")]
    out_dir: PathBuf,

    /// Minimum text length (characters) retained after cleaning
    #[arg(long, default_value_t = 5)]
    min_len: usize,

    /// Fraction of the dataset held out as the test set
    #[arg(long, default_value_t = 0.1)]
    test_size: f64,

    /// Fraction of the dataset held out as the dev set
    #[arg(long, default_value_t = 0.1)]
    dev_size: f64,

    /// Seed for the stratified shuffle
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.quiet);

    match cli.command {
        Command::Qa(args) => run_qa(args),
        Command::Split(args) => run_split(args),
        Command::Preprocess(args) => run_preprocess(args),
    }
}

fn run_qa(args: QaArgs) -> Result<()> {
    let config = QaConfig::builder()
        .min_len(args.min_len)
        .max_len(args.max_len)
        .build()?;

    let df = load_csv(&args.in_path)?;
    info!("Loaded {} rows from {}", df.height(), args.in_path.display());

    let report = SchemaValidator::new(&config).validate(&df, &args.in_path.to_string_lossy())?;
    ReportWriter::write_report(&report, &args.report_path)?;

    let (mut cleaned, actions) = DataCleaner::burmese(&config).clean(df)?;
    for action in &actions {
        info!("{}", action);
    }
    ReportWriter::write_csv(&mut cleaned, &args.out_clean)?;

    println!("Wrote QA report to {}", args.report_path.display());
    println!("Wrote cleaned CSV to {}", args.out_clean.display());
    println!("Overall status: {}", report.status());
    Ok(())
}

fn run_split(args: SplitArgs) -> Result<()> {
    let config = SplitConfig::builder()
        .test_size(args.test_size)
        .dev_size(args.dev_size)
        .seed(args.seed)
        .label_column(&args.label_col)
        .build()?;

    let df = load_csv(&args.in_path)?;
    if df.column(&args.label_col).is_err() {
        return Err(anyhow!(
            "Expected '{}' column in {}",
            args.label_col,
            args.in_path.display()
        ));
    }

    let label_col = config.label_column.clone();
    let mut splits = StratifiedSplitter::new(config).split(&df)?;
    ReportWriter::write_splits(&mut splits, &args.out_dir)?;

    print_split_stats("TRAIN", &splits.train, &label_col)?;
    print_split_stats("DEV", &splits.dev, &label_col)?;
    print_split_stats("TEST", &splits.test, &label_col)?;
    Ok(())
}

fn run_preprocess(args: PreprocessArgs) -> Result<()> {
    let df = load_csv(&args.in_path)?;
    for required in ["text", "label"] {
        if df.column(required).is_err() {
            return Err(anyhow!(
                "Expected columns: text,label (and optional id) in {}",
                args.in_path.display()
            ));
        }
    }

    let (mut cleaned, actions) = DataCleaner::english(args.min_len).clean(df)?;
    for action in &actions {
        info!("{}", action);
    }
    let clean_path = args.out_dir.join("clean/cleaned.csv");
    ReportWriter::write_csv(&mut cleaned, &clean_path)?;

    let config = SplitConfig::builder()
        .test_size(args.test_size)
        .dev_size(args.dev_size)
        .seed(args.seed)
        .build()?;
    let mut splits = StratifiedSplitter::new(config).split(&cleaned)?;
    ReportWriter::write_splits(&mut splits, &args.out_dir.join("splits"))?;

    print_split_stats("TRAIN", &splits.train, "label")?;
    print_split_stats("DEV", &splits.dev, "label")?;
    print_split_stats("TEST", &splits.test, "label")?;
    Ok(())
}

/// Print one partition's size and normalized label ratios.
fn print_split_stats(name: &str, df: &DataFrame, label_col: &str) -> Result<()> {
    let labels = string_values(df, label_col)?;
    let total = labels.len().max(1) as f64;

    println!("{}: n={} | label ratio:", name, df.height());
    for (label, count) in value_counts(&labels) {
        println!("  {label}: {:.3}", count as f64 / total);
    }
    Ok(())
}

/// Load the input CSV. A missing or unparsable file is fatal.
fn load_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(anyhow!("Input file not found: {}", path.display()));
    }
    CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
        .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))
}
