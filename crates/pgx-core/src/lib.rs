//! PGx Core - Pharmacogenomic Risk Evaluation
//!
//! Pure Rust pipeline that turns a patient's variant records and a requested
//! drug into a drug-specific risk classification.
//!
//! # Stages
//!
//! - VCF-style record extraction restricted to six pharmacogenes
//! - Diplotype resolution from detected star alleles
//! - Diplotype to phenotype code lookup (PM/IM/NM/RM/URM)
//! - Drug + phenotype to risk label, severity and recommendation
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use pgx_core::{EvaluationPipeline, KnowledgeBase, VcfExtractor};
//!
//! let vcf = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
//!            chr10\t94781859\trs4244285\tG\tA\t.\tPASS\tGENE=CYP2C19;STAR=*2\n";
//!
//! let variants = VcfExtractor::new().extract_from_reader(vcf.as_bytes()).unwrap();
//! let pipeline = EvaluationPipeline::new(Arc::new(KnowledgeBase::builtin().unwrap()));
//!
//! let result = pipeline.evaluate(&variants, " clopidogrel ");
//! assert_eq!(result.drug, "CLOPIDOGREL");
//! assert_eq!(result.evaluations[0].diplotype().to_string(), "*2/*2");
//! ```

pub mod vcf;
pub mod genotype;
pub mod phenotype;
pub mod guideline;
pub mod drugs;
pub mod knowledge;
pub mod pipeline;
pub mod report;

// Re-export commonly used types for convenience
pub use vcf::{VariantRecord, VcfExtractor, ExtractionSummary};
pub use genotype::{Diplotype, resolve, resolve_gene};
pub use phenotype::PhenotypeTable;
pub use guideline::{Guideline, GuidelineTable, RiskLabel, Severity};
pub use drugs::{DrugGeneTable, canonical_drug_name};
pub use knowledge::KnowledgeBase;
pub use pipeline::{Analysis, DrugEvaluation, EvaluationPipeline, EvaluationResult};
pub use report::{AnalysisReport, ReportBuilder};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Sentinel used wherever a value could not be determined
pub const UNKNOWN: &str = "Unknown";

/// The closed universe of pharmacogenes this crate evaluates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gene {
    #[serde(rename = "CYP2D6")]
    Cyp2d6,
    #[serde(rename = "CYP2C19")]
    Cyp2c19,
    #[serde(rename = "CYP2C9")]
    Cyp2c9,
    #[serde(rename = "SLCO1B1")]
    Slco1b1,
    #[serde(rename = "TPMT")]
    Tpmt,
    #[serde(rename = "DPYD")]
    Dpyd,
}

impl Gene {
    /// Every supported gene
    pub const ALL: [Gene; 6] = [
        Gene::Cyp2d6,
        Gene::Cyp2c19,
        Gene::Cyp2c9,
        Gene::Slco1b1,
        Gene::Tpmt,
        Gene::Dpyd,
    ];

    /// HGNC symbol
    pub fn as_str(&self) -> &'static str {
        match self {
            Gene::Cyp2d6 => "CYP2D6",
            Gene::Cyp2c19 => "CYP2C19",
            Gene::Cyp2c9 => "CYP2C9",
            Gene::Slco1b1 => "SLCO1B1",
            Gene::Tpmt => "TPMT",
            Gene::Dpyd => "DPYD",
        }
    }
}

impl fmt::Display for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gene {
    type Err = PgxError;

    /// Exact, case-sensitive symbol match
    fn from_str(s: &str) -> Result<Self> {
        Gene::ALL
            .iter()
            .copied()
            .find(|gene| gene.as_str() == s)
            .ok_or_else(|| PgxError::UnknownGene(s.to_string()))
    }
}

/// Metabolizer phenotype code
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhenotypeCode {
    /// Poor metabolizer
    #[serde(rename = "PM")]
    Poor,
    /// Intermediate metabolizer
    #[serde(rename = "IM")]
    Intermediate,
    /// Normal metabolizer
    #[serde(rename = "NM")]
    Normal,
    /// Rapid metabolizer
    #[serde(rename = "RM")]
    Rapid,
    /// Ultrarapid metabolizer
    #[serde(rename = "URM")]
    Ultrarapid,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl PhenotypeCode {
    /// Short code as used in the rule tables
    pub fn as_str(&self) -> &'static str {
        match self {
            PhenotypeCode::Poor => "PM",
            PhenotypeCode::Intermediate => "IM",
            PhenotypeCode::Normal => "NM",
            PhenotypeCode::Rapid => "RM",
            PhenotypeCode::Ultrarapid => "URM",
            PhenotypeCode::Unknown => UNKNOWN,
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            PhenotypeCode::Poor => "Poor Metabolizer",
            PhenotypeCode::Intermediate => "Intermediate Metabolizer",
            PhenotypeCode::Normal => "Normal Metabolizer",
            PhenotypeCode::Rapid => "Rapid Metabolizer",
            PhenotypeCode::Ultrarapid => "Ultra-rapid Metabolizer",
            PhenotypeCode::Unknown => UNKNOWN,
        }
    }
}

impl fmt::Display for PhenotypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while extracting, loading tables or reporting
#[derive(Debug, thiserror::Error)]
pub enum PgxError {
    /// Input record file does not exist
    #[error("VCF file not found at: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Failure while reading the input file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Symbol outside the supported gene universe
    #[error("Unsupported gene symbol: '{0}'")]
    UnknownGene(String),

    /// A rule table could not be read from disk
    #[error("Failed to read rule table {}: {source}", path.display())]
    TableRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rule table is not valid JSON or has values outside the vocabulary
    #[error("Failed to parse {table} table: {source}")]
    TableParse {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A rule table parsed but is structurally unusable
    #[error("Invalid rule table: {0}")]
    InvalidTable(String),

    /// Nothing in the file belongs to the gene universe
    #[error("No pharmacogenomic variants detected")]
    NoVariantsDetected,

    /// Drug has no entry in the drug-gene table
    #[error("Unsupported drug '{drug}': {message}")]
    UnsupportedDrug { drug: String, message: String },
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, PgxError>;
