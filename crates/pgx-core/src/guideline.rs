//! Drug + phenotype guideline evaluation
//!
//! Maps a canonical drug name and a phenotype code to a risk label, a
//! severity and a dosing recommendation.

use crate::PhenotypeCode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Recommendation used when no guideline row matches
pub const NO_GUIDELINE_RECOMMENDATION: &str = "No guideline available for this genotype.";

/// Clinical risk label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RiskLabel {
    Safe,
    #[serde(rename = "Adjust Dosage")]
    AdjustDosage,
    Toxic,
    Ineffective,
    #[default]
    Unknown,
}

impl RiskLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Safe => "Safe",
            RiskLabel::AdjustDosage => "Adjust Dosage",
            RiskLabel::Toxic => "Toxic",
            RiskLabel::Ineffective => "Ineffective",
            RiskLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Clinical severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    #[default]
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One guideline row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guideline {
    #[serde(default)]
    pub risk_label: RiskLabel,
    #[serde(default)]
    pub severity: Severity,
    pub recommendation: String,
}

impl Guideline {
    /// Fallback when the drug or phenotype has no row
    pub fn unavailable() -> Self {
        Guideline {
            risk_label: RiskLabel::Unknown,
            severity: Severity::Low,
            recommendation: NO_GUIDELINE_RECOMMENDATION.to_string(),
        }
    }
}

impl Default for Guideline {
    fn default() -> Self {
        Guideline::unavailable()
    }
}

/// Canonical drug -> phenotype code -> guideline
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuidelineTable {
    entries: HashMap<String, HashMap<PhenotypeCode, Guideline>>,
}

impl GuidelineTable {
    pub fn new(entries: HashMap<String, HashMap<PhenotypeCode, Guideline>>) -> Self {
        GuidelineTable { entries }
    }

    /// Guideline for a drug/phenotype pair, or [`Guideline::unavailable`].
    /// `drug` must already be canonical.
    pub fn evaluate(&self, drug: &str, phenotype: PhenotypeCode) -> Guideline {
        self.entries
            .get(drug)
            .and_then(|rows| rows.get(&phenotype))
            .cloned()
            .unwrap_or_else(Guideline::unavailable)
    }

    pub fn drugs(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(|d| d.as_str())
    }

    pub(crate) fn canonicalize_keys(self) -> Self {
        let entries = self
            .entries
            .into_iter()
            .map(|(drug, rows)| (crate::canonical_drug_name(&drug), rows))
            .collect();
        GuidelineTable { entries }
    }
}
