//! Diplotype Resolution
//!
//! Derives one diplotype per gene from the star alleles seen in a record set.
//!
//! There is no phase or zygosity information in the input, so the rule is
//! deliberately simple: the collected alleles are sorted lexicographically,
//! repeats included, and the first two entries are paired; a single allele is
//! paired with itself. Entries past the second are dropped, so `*1, *1, *2`
//! resolves to `*1/*1`. Downstream phenotype tables are keyed on exactly
//! this rendering (e.g. `*17/*2`, not `*2/*17`), so changing the rule changes
//! clinical output.

use crate::{Gene, VariantRecord, UNKNOWN};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Allele pair for one gene
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Diplotype {
    /// Two alleles with `first <= second`
    Called { first: String, second: String },
    /// No allele was detected for the gene
    Unknown,
}

impl Diplotype {
    /// Pair two alleles, ordering them lexicographically
    pub fn new(a: &str, b: &str) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Diplotype::Called {
            first: first.to_string(),
            second: second.to_string(),
        }
    }

    /// Homozygous diplotype `allele/allele`
    pub fn homozygous(allele: &str) -> Self {
        Diplotype::new(allele, allele)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Diplotype::Unknown)
    }

    /// Build from collected alleles using the first-two-sorted rule
    fn from_alleles(mut alleles: Vec<&str>) -> Self {
        alleles.sort_unstable();
        match alleles.as_slice() {
            [first, second, ..] => Diplotype::new(first, second),
            [only] => Diplotype::homozygous(only),
            [] => Diplotype::Unknown,
        }
    }
}

impl fmt::Display for Diplotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diplotype::Called { first, second } => write!(f, "{}/{}", first, second),
            Diplotype::Unknown => f.write_str(UNKNOWN),
        }
    }
}

impl Serialize for Diplotype {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Resolve a diplotype for every relevant gene.
///
/// Genes with no detected allele map to [`Diplotype::Unknown`]; every gene in
/// `relevant_genes` is present in the result.
pub fn resolve(variants: &[VariantRecord], relevant_genes: &[Gene]) -> HashMap<Gene, Diplotype> {
    let mut alleles: HashMap<Gene, Vec<&str>> = relevant_genes
        .iter()
        .map(|gene| (*gene, Vec::new()))
        .collect();

    for variant in variants {
        if let (Some(found), Some(star)) = (alleles.get_mut(&variant.primary_gene()), variant.star_allele()) {
            found.push(star);
        }
    }

    alleles
        .into_iter()
        .map(|(gene, found)| (gene, Diplotype::from_alleles(found)))
        .collect()
}

/// Resolve the diplotype for a single gene
pub fn resolve_gene(variants: &[VariantRecord], gene: Gene) -> Diplotype {
    let alleles: Vec<&str> = variants
        .iter()
        .filter(|v| v.primary_gene() == gene)
        .filter_map(|v| v.star_allele())
        .collect();
    Diplotype::from_alleles(alleles)
}
