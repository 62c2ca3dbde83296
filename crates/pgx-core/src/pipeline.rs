//! Evaluation Pipeline
//!
//! Drives resolution, classification and guideline lookup for every gene
//! relevant to a requested drug.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pgx_core::{EvaluationPipeline, KnowledgeBase};
//!
//! let kb = Arc::new(KnowledgeBase::load_from_dir("data")?);
//! let pipeline = EvaluationPipeline::new(kb);
//!
//! let analysis = pipeline.analyze_file("patient.vcf", "Warfarin")?;
//! for result in &analysis.evaluation.evaluations {
//!     println!("{} {} -> {}", result.gene(), result.diplotype(), result.risk_label());
//! }
//! ```

use crate::{
    canonical_drug_name, genotype, Diplotype, Gene, Guideline, KnowledgeBase, PhenotypeCode,
    Result, RiskLabel, Severity, VariantRecord, VcfExtractor,
};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Message attached to results for drugs missing from the drug-gene table
pub const UNSUPPORTED_DRUG_MESSAGE: &str = "Drug not supported by the pharmacogenomic rule tables.";

/// Recommendation for a relevant gene with no detected allele
pub const NO_VARIANT_RECOMMENDATION: &str = "No variant detected for this gene.";

/// Outcome for one gene
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    gene: Gene,
    diplotype: Diplotype,
    phenotype: PhenotypeCode,
    drug: String,
    risk_label: RiskLabel,
    severity: Severity,
    recommendation: String,
}

impl EvaluationResult {
    pub fn new(
        gene: Gene,
        diplotype: Diplotype,
        phenotype: PhenotypeCode,
        drug: &str,
        guideline: Guideline,
    ) -> Self {
        EvaluationResult {
            gene,
            diplotype,
            phenotype,
            drug: drug.to_string(),
            risk_label: guideline.risk_label,
            severity: guideline.severity,
            recommendation: guideline.recommendation,
        }
    }

    pub fn gene(&self) -> Gene {
        self.gene
    }

    pub fn diplotype(&self) -> &Diplotype {
        &self.diplotype
    }

    pub fn phenotype(&self) -> PhenotypeCode {
        self.phenotype
    }

    pub fn drug(&self) -> &str {
        &self.drug
    }

    pub fn risk_label(&self) -> RiskLabel {
        self.risk_label
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn recommendation(&self) -> &str {
        &self.recommendation
    }
}

/// All per-gene outcomes for one drug
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrugEvaluation {
    /// Canonical drug name
    pub drug: String,
    pub evaluations: Vec<EvaluationResult>,
    /// Set when the drug is not supported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DrugEvaluation {
    fn unsupported(drug: String) -> Self {
        DrugEvaluation {
            drug,
            evaluations: Vec::new(),
            message: Some(UNSUPPORTED_DRUG_MESSAGE.to_string()),
        }
    }

    /// An empty result means the request should be treated as a client error
    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }
}

/// Extracted variants plus their evaluation
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub variants: Vec<VariantRecord>,
    pub evaluation: DrugEvaluation,
}

/// Orchestrates resolver -> classifier -> guideline lookup
#[derive(Debug, Clone)]
pub struct EvaluationPipeline {
    knowledge: Arc<KnowledgeBase>,
    extractor: VcfExtractor,
}

impl EvaluationPipeline {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        EvaluationPipeline {
            knowledge,
            extractor: VcfExtractor::new(),
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Evaluate a variant set for one drug.
    ///
    /// Unsupported drugs yield an empty evaluation list with a message.
    /// Otherwise every relevant gene appears exactly once, in table order.
    pub fn evaluate(&self, variants: &[VariantRecord], drug_name: &str) -> DrugEvaluation {
        let drug = canonical_drug_name(drug_name);

        let relevant_genes = match self.knowledge.drug_genes().genes_for(&drug) {
            Some(genes) => genes,
            None => {
                debug!(drug = %drug, "drug not in drug-gene table");
                return DrugEvaluation::unsupported(drug);
            }
        };

        let diplotypes = genotype::resolve(variants, relevant_genes);

        let evaluations: Vec<EvaluationResult> = relevant_genes
            .iter()
            .map(|gene| {
                let diplotype = diplotypes.get(gene).cloned().unwrap_or(Diplotype::Unknown);
                self.evaluate_gene(*gene, diplotype, &drug)
            })
            .collect();

        info!(
            drug = %drug,
            genes = evaluations.len(),
            called = evaluations.iter().filter(|e| !e.diplotype.is_unknown()).count(),
            "evaluated drug"
        );

        DrugEvaluation {
            drug,
            evaluations,
            message: None,
        }
    }

    fn evaluate_gene(&self, gene: Gene, diplotype: Diplotype, drug: &str) -> EvaluationResult {
        if diplotype.is_unknown() {
            let guideline = Guideline {
                risk_label: RiskLabel::Unknown,
                severity: Severity::Low,
                recommendation: NO_VARIANT_RECOMMENDATION.to_string(),
            };
            return EvaluationResult::new(gene, diplotype, PhenotypeCode::Unknown, drug, guideline);
        }

        let phenotype = self.knowledge.phenotypes().classify(gene, &diplotype);
        let guideline = self.knowledge.guidelines().evaluate(drug, phenotype);
        debug!(gene = %gene, diplotype = %diplotype, phenotype = %phenotype, "classified gene");

        EvaluationResult::new(gene, diplotype, phenotype, drug, guideline)
    }

    /// Extract a file and evaluate it for one drug
    pub fn analyze_file<P: AsRef<Path>>(&self, path: P, drug_name: &str) -> Result<Analysis> {
        let variants = self.extractor.extract(path)?;
        let evaluation = self.evaluate(&variants, drug_name);
        Ok(Analysis { variants, evaluation })
    }

    /// Evaluate several drugs against one variant set, preserving input order
    #[cfg(not(feature = "parallel"))]
    pub fn evaluate_drugs(&self, variants: &[VariantRecord], drugs: &[&str]) -> Vec<DrugEvaluation> {
        drugs.iter().map(|drug| self.evaluate(variants, drug)).collect()
    }

    /// Evaluate several drugs against one variant set, preserving input order
    #[cfg(feature = "parallel")]
    pub fn evaluate_drugs(&self, variants: &[VariantRecord], drugs: &[&str]) -> Vec<DrugEvaluation> {
        use rayon::prelude::*;
        drugs.par_iter().map(|drug| self.evaluate(variants, drug)).collect()
    }
}
