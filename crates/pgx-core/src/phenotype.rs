//! Diplotype to phenotype classification

use crate::{Diplotype, Gene, PhenotypeCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Gene -> diplotype string -> phenotype code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhenotypeTable {
    entries: HashMap<Gene, HashMap<String, PhenotypeCode>>,
}

impl PhenotypeTable {
    pub fn new(entries: HashMap<Gene, HashMap<String, PhenotypeCode>>) -> Self {
        PhenotypeTable { entries }
    }

    /// Phenotype for a gene/diplotype pair.
    ///
    /// Total: unknown genes, unlisted diplotypes and the `Unknown` diplotype
    /// all classify as [`PhenotypeCode::Unknown`].
    pub fn classify(&self, gene: Gene, diplotype: &Diplotype) -> PhenotypeCode {
        if diplotype.is_unknown() {
            return PhenotypeCode::Unknown;
        }

        self.entries
            .get(&gene)
            .and_then(|diplotypes| diplotypes.get(diplotype.to_string().as_str()))
            .copied()
            .unwrap_or(PhenotypeCode::Unknown)
    }

    /// Number of diplotypes listed for a gene
    pub fn diplotype_count(&self, gene: Gene) -> usize {
        self.entries.get(&gene).map_or(0, |d| d.len())
    }

    pub fn genes(&self) -> impl Iterator<Item = Gene> + '_ {
        self.entries.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PhenotypeTable {
        serde_json::from_str(
            r#"{
                "CYP2C19": { "*1/*1": "NM", "*1/*2": "IM", "*2/*2": "PM", "*1/*17": "RM" },
                "TPMT": { "*1/*3A": "IM" }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_classify_hit() {
        let table = table();
        assert_eq!(table.classify(Gene::Cyp2c19, &Diplotype::homozygous("*2")), PhenotypeCode::Poor);
        assert_eq!(table.classify(Gene::Cyp2c19, &Diplotype::new("*17", "*1")), PhenotypeCode::Rapid);
        assert_eq!(table.classify(Gene::Tpmt, &Diplotype::new("*1", "*3A")), PhenotypeCode::Intermediate);
    }

    #[test]
    fn test_classify_defaults_to_unknown() {
        let table = table();
        // gene missing from table
        assert_eq!(table.classify(Gene::Dpyd, &Diplotype::homozygous("*1")), PhenotypeCode::Unknown);
        // diplotype missing for gene
        assert_eq!(table.classify(Gene::Cyp2c19, &Diplotype::homozygous("*3")), PhenotypeCode::Unknown);
        assert_eq!(table.classify(Gene::Cyp2c19, &Diplotype::Unknown), PhenotypeCode::Unknown);
    }

    #[test]
    fn test_unknown_diplotype_never_looked_up() {
        let table: PhenotypeTable =
            serde_json::from_str(r#"{ "CYP2D6": { "Unknown": "NM" } }"#).unwrap();
        assert_eq!(table.classify(Gene::Cyp2d6, &Diplotype::Unknown), PhenotypeCode::Unknown);
    }

    #[test]
    fn test_rejects_unknown_code() {
        let parsed = serde_json::from_str::<PhenotypeTable>(r#"{ "CYP2D6": { "*1/*1": "Normal" } }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_rejects_gene_outside_universe() {
        let parsed = serde_json::from_str::<PhenotypeTable>(r#"{ "CYP3A5": { "*1/*1": "NM" } }"#);
        assert!(parsed.is_err());
    }
}
