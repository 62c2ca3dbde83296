//! PGx Analyze CLI Tool
//!
//! Evaluate a patient's VCF against the pharmacogenomic rule tables.
//!
//! Usage:
//!   pgx-analyze analyze <file.vcf> --drug <name> [--patient-id <id>] [--output <file>]
//!   pgx-analyze extract <file.vcf> [--output <file>]
//!   pgx-analyze drugs [--data-dir <dir>]

use clap::{Parser, Subcommand};
use pgx_core::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Largest accepted input file
const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "pgx-analyze")]
#[command(version)]
#[command(about = "Evaluate drug-specific pharmacogenomic risk from a VCF", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the rule tables (builtin tables if not specified)
    #[arg(long, env = "PGX_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Output format: json or compact
    #[arg(short, long, default_value = "json", global = true)]
    format: String,

    /// Output file (stdout if not specified)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract variants and build a risk report for one drug
    Analyze {
        /// Path to VCF file
        file: PathBuf,

        /// Drug name (case-insensitive)
        #[arg(short, long)]
        drug: String,

        /// Patient identifier (defaults to PATIENT_<file stem>)
        #[arg(long)]
        patient_id: Option<String>,
    },

    /// Extract pharmacogene variants only
    Extract {
        /// Path to VCF file
        file: PathBuf,
    },

    /// List supported drugs
    Drugs,
}

#[derive(serde::Serialize)]
struct ExtractOutput {
    file: String,
    summary: ExtractionSummary,
    variants: Vec<VariantRecord>,
}

#[derive(serde::Serialize)]
struct DrugsOutput<'a> {
    drug_count: usize,
    drugs: Vec<&'a str>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let knowledge = match &cli.data_dir {
        Some(dir) => KnowledgeBase::load_from_dir(dir)?,
        None => KnowledgeBase::builtin()?,
    };
    let knowledge = Arc::new(knowledge);

    let output = match cli.command {
        Commands::Analyze { file, drug, patient_id } => {
            let report = analyze(knowledge, &file, &drug, patient_id)?;
            render(&report, &cli.format)?
        }
        Commands::Extract { file } => {
            check_upload(&file)?;
            let (variants, summary) = VcfExtractor::new().extract_with_summary(&file)?;
            let result = ExtractOutput {
                file: file.display().to_string(),
                summary,
                variants,
            };
            render(&result, &cli.format)?
        }
        Commands::Drugs => {
            let drugs = knowledge.supported_drugs();
            let result = DrugsOutput {
                drug_count: drugs.len(),
                drugs,
            };
            render(&result, &cli.format)?
        }
    };

    if let Some(output_path) = cli.output {
        fs::write(&output_path, &output)?;
        eprintln!("Output written to: {}", output_path.display());
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn analyze(
    knowledge: Arc<KnowledgeBase>,
    file: &Path,
    drug: &str,
    patient_id: Option<String>,
) -> Result<AnalysisReport, Box<dyn std::error::Error>> {
    check_upload(file)?;

    let patient_id = patient_id.unwrap_or_else(|| default_patient_id(file));
    let pipeline = EvaluationPipeline::new(knowledge);
    let analysis = pipeline.analyze_file(file, drug)?;
    info!(variants = analysis.variants.len(), "extracted variants");

    let report = ReportBuilder::new(patient_id).build(&analysis.variants, &analysis.evaluation)?;
    Ok(report)
}

fn render<T: serde::Serialize>(value: &T, format: &str) -> Result<String, serde_json::Error> {
    match format {
        "compact" => serde_json::to_string(value),
        _ => serde_json::to_string_pretty(value),
    }
}

/// Extension and size checks applied before any parsing
fn check_upload(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let name = file.to_string_lossy();
    let accepted = name.ends_with(".vcf") || (cfg!(feature = "gzip") && name.ends_with(".vcf.gz"));
    if !accepted {
        return Err(format!("Invalid file type: {}. Expected a .vcf file", name).into());
    }

    let size = fs::metadata(file)
        .map_err(|_| PgxError::FileNotFound { path: file.to_path_buf() })?
        .len();
    if size > MAX_UPLOAD_BYTES {
        return Err(format!("File too large: {} bytes (limit {} bytes)", size, MAX_UPLOAD_BYTES).into());
    }

    Ok(())
}

fn default_patient_id(file: &Path) -> String {
    let name = file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    let stem = name
        .strip_suffix(".vcf.gz")
        .or_else(|| name.strip_suffix(".vcf"))
        .unwrap_or(name.as_ref());
    format!("PATIENT_{}", stem)
}
