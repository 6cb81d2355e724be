// 🧾 catalog-recon - compare a source catalog against a live target catalog

use anyhow::{Context, Result};
use catalog_recon::{
    export_csv, parse_query_response, ComparisonReport, MatchResult, ReconConfig,
    ReconciliationPipeline, SourceBatch, ValidationLevel,
};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "catalog-recon")]
#[command(about = "Reconcile a product catalog against its live website listing")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Match source records against target records and report differences
    Compare {
        /// Source catalog: CSV, JSON array of products, or a CRM query response
        #[arg(long, short = 's')]
        source: PathBuf,

        /// Target catalog: JSON array of products
        #[arg(long, short = 't')]
        target: PathBuf,

        /// JSON config file (missing keys use defaults)
        #[arg(long, short = 'c', env = "CATALOG_RECON_CONFIG")]
        config: Option<PathBuf>,

        /// Validation preset: lenient, standard or strict
        #[arg(long)]
        level: Option<ValidationLevel>,

        /// Relative price difference tolerated before reporting
        #[arg(long)]
        price_tolerance: Option<f64>,

        /// Name used for the target side in messages (e.g. a domain)
        #[arg(long)]
        target_label: Option<String>,

        #[arg(long, short = 'f', value_enum, default_value = "text")]
        format: OutputFormat,

        /// Write the report here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Load and validate a CSV without comparing it
    Inspect {
        file: PathBuf,

        #[arg(long, short = 'c', env = "CATALOG_RECON_CONFIG")]
        config: Option<PathBuf>,

        #[arg(long)]
        level: Option<ValidationLevel>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
    Text,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a ComparisonReport,
    results: &'a [MatchResult<'a>],
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            source,
            target,
            config,
            level,
            price_tolerance,
            target_label,
            format,
            output,
        } => {
            let mut config = load_config(config.as_deref(), level)?;
            if let Some(tolerance) = price_tolerance {
                config.diff.price_tolerance = tolerance;
            }
            if let Some(label) = target_label {
                config.diff.target_label = label;
            }
            config.validate()?;

            run_compare(config, &source, &target, format, output.as_deref())
        }
        Commands::Inspect {
            file,
            config,
            level,
        } => run_inspect(load_config(config.as_deref(), level)?, &file),
    }
}

fn load_config(path: Option<&Path>, level: Option<ValidationLevel>) -> Result<ReconConfig> {
    let config = match path {
        Some(path) => ReconConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ReconConfig::default(),
    };

    Ok(match level {
        Some(level) => config.with_level(level),
        None => config,
    })
}

fn run_compare(
    config: ReconConfig,
    source_path: &Path,
    target_path: &Path,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let pipeline = ReconciliationPipeline::new(config);

    let source = load_source(&pipeline, source_path)?;
    log_findings(&source);

    let target_json = fs::read_to_string(target_path)
        .with_context(|| format!("Failed to read target {}", target_path.display()))?;
    let target = pipeline
        .target_from_json(&target_json)
        .with_context(|| format!("Failed to parse target {}", target_path.display()))?;
    info!(records = target.len(), "target batch loaded");

    let verdicts = pipeline.compare(source.records(), &target);
    let report = ComparisonReport::new(pipeline.summarize(&verdicts));
    info!(run_id = %report.run_id, "{}", report.summary.summary());

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    match format {
        OutputFormat::Json => {
            let output = JsonReport {
                report: &report,
                results: &verdicts,
            };
            serde_json::to_writer_pretty(&mut writer, &output)?;
            writeln!(writer)?;
        }
        OutputFormat::Csv => export_csv(&verdicts, &mut writer)?,
        OutputFormat::Text => write!(writer, "{}", report.to_text())?,
    }

    writer.flush()?;
    Ok(())
}

/// CSV by default; `.json` files are either a CRM query response or a product array
fn load_source(pipeline: &ReconciliationPipeline, path: &Path) -> Result<SourceBatch> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if !is_json {
        return pipeline
            .load_source_path(path, |p| info!(percent = p.percent, "{}", p.message))
            .with_context(|| format!("Failed to load source {}", path.display()));
    }

    let body = fs::read_to_string(path)
        .with_context(|| format!("Failed to read source {}", path.display()))?;
    let value: Value = serde_json::from_str(&body)
        .with_context(|| format!("Source {} is not valid JSON", path.display()))?;

    let mappings: Vec<Map<String, Value>> = match value {
        Value::Object(_) => parse_query_response(&body)?
            .iter()
            .map(|product| product.to_mapping())
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => anyhow::bail!("Source {} must be a JSON object or array", path.display()),
    };

    info!(records = mappings.len(), "source mappings loaded");
    Ok(pipeline.source_from_mappings(&mappings))
}

fn run_inspect(config: ReconConfig, path: &Path) -> Result<()> {
    let pipeline = ReconciliationPipeline::new(config);
    let batch = pipeline
        .load_source_path(path, |p| info!(percent = p.percent, "{}", p.message))
        .with_context(|| format!("Failed to load {}", path.display()))?;

    log_findings(&batch);

    println!("📂 {}", path.display());
    if let Some(load) = &batch.load {
        println!("   {}", load.summary());
        println!("   Columns: {}", load.columns.join(", "));
    }
    println!("   {}", batch.validation.summary());
    for issue in &batch.validation.issues {
        println!("   • {}", issue.summary);
    }

    Ok(())
}

fn log_findings(batch: &SourceBatch) {
    for finding in batch.findings() {
        warn!("{finding}");
    }
}
