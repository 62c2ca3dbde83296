//! Rule table loading
//!
//! The three lookup tables are loaded once and shared read-only for the life
//! of the process. Any load failure is returned to the caller, which is
//! expected to abort startup.
//!
//! # Files
//!
//! | file                   | shape                                              |
//! |------------------------|----------------------------------------------------|
//! | `drug_gene_map.json`   | `{ "DRUG": ["GENE", ...] }`                        |
//! | `gene_phenotypes.json` | `{ "GENE": { "A/B": "PM" } }`                      |
//! | `drug_guidelines.json` | `{ "DRUG": { "PM": { risk_label, severity, recommendation } } }` |

use crate::{DrugGeneTable, Gene, GuidelineTable, PgxError, PhenotypeTable, Result};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const DRUG_GENE_FILE: &str = "drug_gene_map.json";
pub const PHENOTYPE_FILE: &str = "gene_phenotypes.json";
pub const GUIDELINE_FILE: &str = "drug_guidelines.json";

const BUILTIN_DRUG_GENES: &str = include_str!("../data/drug_gene_map.json");
const BUILTIN_PHENOTYPES: &str = include_str!("../data/gene_phenotypes.json");
const BUILTIN_GUIDELINES: &str = include_str!("../data/drug_guidelines.json");

/// The immutable rule tables
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    drug_genes: DrugGeneTable,
    phenotypes: PhenotypeTable,
    guidelines: GuidelineTable,
}

impl KnowledgeBase {
    /// Assemble from already built tables
    pub fn new(drug_genes: DrugGeneTable, phenotypes: PhenotypeTable, guidelines: GuidelineTable) -> Self {
        let kb = KnowledgeBase {
            drug_genes,
            phenotypes,
            guidelines: guidelines.canonicalize_keys(),
        };
        kb.warn_inconsistencies();
        kb
    }

    /// Parse the three tables from JSON text
    pub fn from_json(drug_genes: &str, phenotypes: &str, guidelines: &str) -> Result<Self> {
        let drug_genes: HashMap<String, Vec<Gene>> = parse_table("drug-gene", drug_genes)?;
        let phenotypes: PhenotypeTable = parse_table("phenotype", phenotypes)?;
        let guidelines: GuidelineTable = parse_table("guideline", guidelines)?;

        Ok(KnowledgeBase::new(DrugGeneTable::new(drug_genes)?, phenotypes, guidelines))
    }

    /// Load the tables from a directory holding the three JSON files
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let read = |name: &str| {
            let path = dir.join(name);
            fs::read_to_string(&path).map_err(|source| PgxError::TableRead { path, source })
        };

        let kb = KnowledgeBase::from_json(
            &read(DRUG_GENE_FILE)?,
            &read(PHENOTYPE_FILE)?,
            &read(GUIDELINE_FILE)?,
        )?;
        info!(dir = %dir.display(), drugs = kb.drug_genes.len(), "loaded rule tables");
        Ok(kb)
    }

    /// Tables shipped with the crate
    pub fn builtin() -> Result<Self> {
        KnowledgeBase::from_json(BUILTIN_DRUG_GENES, BUILTIN_PHENOTYPES, BUILTIN_GUIDELINES)
    }

    pub fn drug_genes(&self) -> &DrugGeneTable {
        &self.drug_genes
    }

    pub fn phenotypes(&self) -> &PhenotypeTable {
        &self.phenotypes
    }

    pub fn guidelines(&self) -> &GuidelineTable {
        &self.guidelines
    }

    /// Canonical names of every supported drug, sorted
    pub fn supported_drugs(&self) -> Vec<&str> {
        self.drug_genes.drugs()
    }

    fn warn_inconsistencies(&self) {
        for drug in self.guidelines.drugs() {
            if !self.drug_genes.contains(drug) {
                warn!(drug, "guideline rows for a drug with no drug-gene entry");
            }
        }
        for drug in self.drug_genes.drugs() {
            for gene in self.drug_genes.genes_for(drug).unwrap_or_default() {
                if self.phenotypes.diplotype_count(*gene) == 0 {
                    warn!(drug, gene = %gene, "relevant gene has no phenotype rows");
                }
            }
        }
    }
}

fn parse_table<T: DeserializeOwned>(table: &'static str, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|source| PgxError::TableParse { table, source })
}
