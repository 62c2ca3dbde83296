//! Drug name canonicalization and the drug -> gene table

use crate::{Gene, PgxError, Result};
use serde::Serialize;
use std::collections::HashMap;

/// Canonical form of a drug name: trimmed, uppercase
pub fn canonical_drug_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Canonical drug -> relevant genes, in table order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DrugGeneTable {
    entries: HashMap<String, Vec<Gene>>,
}

impl DrugGeneTable {
    /// Build a table, canonicalizing drug keys and collapsing repeated genes.
    ///
    /// Fails if a drug lists no genes.
    pub fn new(entries: HashMap<String, Vec<Gene>>) -> Result<Self> {
        let mut canonical = HashMap::with_capacity(entries.len());

        for (drug, genes) in entries {
            let drug = canonical_drug_name(&drug);
            let mut unique: Vec<Gene> = Vec::with_capacity(genes.len());
            for gene in genes {
                if !unique.contains(&gene) {
                    unique.push(gene);
                }
            }

            if unique.is_empty() {
                return Err(PgxError::InvalidTable(format!(
                    "drug '{}' has no relevant genes",
                    drug
                )));
            }
            canonical.insert(drug, unique);
        }

        Ok(DrugGeneTable { entries: canonical })
    }

    /// Relevant genes for an already canonical drug name
    pub fn genes_for(&self, drug: &str) -> Option<&[Gene]> {
        self.entries.get(drug).map(|genes| genes.as_slice())
    }

    pub fn contains(&self, drug: &str) -> bool {
        self.entries.contains_key(drug)
    }

    /// Supported drugs, sorted
    pub fn drugs(&self) -> Vec<&str> {
        let mut drugs: Vec<&str> = self.entries.keys().map(|d| d.as_str()).collect();
        drugs.sort_unstable();
        drugs
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_drug_name() {
        assert_eq!(canonical_drug_name("warfarin"), "WARFARIN");
        assert_eq!(canonical_drug_name("  WARFARIN"), "WARFARIN");
        assert_eq!(canonical_drug_name("Warfarin \n"), "WARFARIN");
    }

    #[test]
    fn test_keys_canonicalized_and_genes_deduped() {
        let mut entries = HashMap::new();
        entries.insert(
            "Amitriptyline ".to_string(),
            vec![Gene::Cyp2d6, Gene::Cyp2c19, Gene::Cyp2d6],
        );
        let table = DrugGeneTable::new(entries).unwrap();

        assert_eq!(table.genes_for("AMITRIPTYLINE"), Some(&[Gene::Cyp2d6, Gene::Cyp2c19][..]));
        assert!(table.genes_for("Amitriptyline").is_none());
    }

    #[test]
    fn test_empty_gene_list_rejected() {
        let mut entries = HashMap::new();
        entries.insert("CODEINE".to_string(), Vec::new());
        assert!(matches!(DrugGeneTable::new(entries), Err(PgxError::InvalidTable(_))));
    }

    #[test]
    fn test_drugs_sorted() {
        let mut entries = HashMap::new();
        entries.insert("WARFARIN".to_string(), vec![Gene::Cyp2c9]);
        entries.insert("CODEINE".to_string(), vec![Gene::Cyp2d6]);
        let table = DrugGeneTable::new(entries).unwrap();
        assert_eq!(table.drugs(), vec!["CODEINE", "WARFARIN"]);
    }
}

/// Property-based tests using proptest
#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Padding and case never change the canonical name
        #[test]
        fn canonical_ignores_padding_and_case(
            name in "[a-zA-Z0-9-]{1,20}",
            left in "[ \t]{0,3}",
            right in "[ \t\n]{0,3}"
        ) {
            let padded = format!("{}{}{}", left, name.to_lowercase(), right);
            prop_assert_eq!(canonical_drug_name(&padded), canonical_drug_name(&name));
        }
    }
}
