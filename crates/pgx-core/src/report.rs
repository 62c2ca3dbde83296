//! Analysis report assembly
//!
//! Turns extracted variants plus a [`DrugEvaluation`] into the structured
//! report handed to downstream consumers. Values are copied verbatim from
//! the evaluation; nothing here reclassifies.

use crate::{
    DrugEvaluation, EvaluationResult, Gene, PgxError, PhenotypeCode, Result, RiskLabel, Severity,
    VariantRecord,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

/// Headline risk, taken from the most severe evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub risk_label: RiskLabel,
    pub severity: Severity,
    pub primary_gene: Gene,
}

/// Per-gene genotype summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PharmacogenomicProfile {
    pub gene: Gene,
    pub diplotype: String,
    pub phenotype: PhenotypeCode,
    pub detected_variants: Vec<VariantRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClinicalRecommendation {
    pub gene: Gene,
    pub recommendation_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QualityMetrics {
    pub vcf_parsing_success: bool,
    /// At least one relevant gene has a called diplotype
    pub gene_detected: bool,
    pub rule_engine_applied: bool,
}

/// Complete report for one patient and one drug
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub patient_id: String,
    pub drug: String,
    pub timestamp: DateTime<Utc>,
    pub risk_assessment: RiskAssessment,
    pub pharmacogenomic_profiles: Vec<PharmacogenomicProfile>,
    pub clinical_recommendations: Vec<ClinicalRecommendation>,
    pub quality_metrics: QualityMetrics,
}

/// Builds [`AnalysisReport`]s for a patient
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    patient_id: String,
}

impl ReportBuilder {
    pub fn new(patient_id: impl Into<String>) -> Self {
        ReportBuilder {
            patient_id: patient_id.into(),
        }
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    /// Build a report stamped with the current time
    pub fn build(&self, variants: &[VariantRecord], evaluation: &DrugEvaluation) -> Result<AnalysisReport> {
        self.build_at(variants, evaluation, Utc::now())
    }

    /// Build a report with an explicit timestamp.
    ///
    /// Rejects an empty variant list and an evaluation without results.
    pub fn build_at(
        &self,
        variants: &[VariantRecord],
        evaluation: &DrugEvaluation,
        timestamp: DateTime<Utc>,
    ) -> Result<AnalysisReport> {
        if variants.is_empty() {
            return Err(PgxError::NoVariantsDetected);
        }

        let headline = most_severe(&evaluation.evaluations).ok_or_else(|| PgxError::UnsupportedDrug {
            drug: evaluation.drug.clone(),
            message: evaluation
                .message
                .clone()
                .unwrap_or_else(|| crate::pipeline::UNSUPPORTED_DRUG_MESSAGE.to_string()),
        })?;

        let risk_assessment = RiskAssessment {
            risk_label: headline.risk_label(),
            severity: headline.severity(),
            primary_gene: headline.gene(),
        };

        let pharmacogenomic_profiles = evaluation
            .evaluations
            .iter()
            .map(|result| PharmacogenomicProfile {
                gene: result.gene(),
                diplotype: result.diplotype().to_string(),
                phenotype: result.phenotype(),
                detected_variants: variants
                    .iter()
                    .filter(|v| v.primary_gene() == result.gene())
                    .cloned()
                    .collect(),
            })
            .collect();

        let clinical_recommendations = evaluation
            .evaluations
            .iter()
            .map(|result| ClinicalRecommendation {
                gene: result.gene(),
                recommendation_text: result.recommendation().to_string(),
            })
            .collect();

        let quality_metrics = QualityMetrics {
            vcf_parsing_success: true,
            gene_detected: evaluation.evaluations.iter().any(|r| !r.diplotype().is_unknown()),
            rule_engine_applied: true,
        };

        info!(
            patient = %self.patient_id,
            drug = %evaluation.drug,
            risk = %risk_assessment.risk_label,
            severity = %risk_assessment.severity,
            "built analysis report"
        );

        Ok(AnalysisReport {
            patient_id: self.patient_id.clone(),
            drug: evaluation.drug.clone(),
            timestamp,
            risk_assessment,
            pharmacogenomic_profiles,
            clinical_recommendations,
            quality_metrics,
        })
    }
}

/// Highest severity wins; ties keep the earliest result
fn most_severe(results: &[EvaluationResult]) -> Option<&EvaluationResult> {
    results.iter().fold(None, |best: Option<&EvaluationResult>, result| match best {
        Some(current) if current.severity() >= result.severity() => Some(current),
        _ => Some(result),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Diplotype, Guideline};
    use chrono::TimeZone;

    fn record(gene: Gene, star: &str) -> VariantRecord {
        VariantRecord::new(gene, Some(star), Some("rs1"), "chr1", "100", "")
    }

    fn result(gene: Gene, severity: Severity, label: RiskLabel, diplotype: Diplotype) -> EvaluationResult {
        let guideline = Guideline {
            risk_label: label,
            severity,
            recommendation: format!("{} advice", gene),
        };
        EvaluationResult::new(gene, diplotype, PhenotypeCode::Intermediate, "AMITRIPTYLINE", guideline)
    }

    fn evaluation(results: Vec<EvaluationResult>) -> DrugEvaluation {
        DrugEvaluation {
            drug: "AMITRIPTYLINE".to_string(),
            evaluations: results,
            message: None,
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_headline_is_most_severe() {
        let eval = evaluation(vec![
            result(Gene::Cyp2d6, Severity::Moderate, RiskLabel::AdjustDosage, Diplotype::new("*1", "*4")),
            result(Gene::Cyp2c19, Severity::High, RiskLabel::Toxic, Diplotype::homozygous("*2")),
        ]);
        let variants = vec![record(Gene::Cyp2d6, "*4"), record(Gene::Cyp2c19, "*2")];

        let report = ReportBuilder::new("PATIENT_1").build_at(&variants, &eval, fixed_time()).unwrap();

        assert_eq!(report.risk_assessment.primary_gene, Gene::Cyp2c19);
        assert_eq!(report.risk_assessment.risk_label, RiskLabel::Toxic);
        assert_eq!(report.risk_assessment.severity, Severity::High);
        assert_eq!(report.timestamp, fixed_time());
    }

    #[test]
    fn test_severity_tie_keeps_first() {
        let eval = evaluation(vec![
            result(Gene::Cyp2d6, Severity::High, RiskLabel::Ineffective, Diplotype::homozygous("*4")),
            result(Gene::Cyp2c19, Severity::High, RiskLabel::Toxic, Diplotype::homozygous("*2")),
        ]);
        let variants = vec![record(Gene::Cyp2d6, "*4")];

        let report = ReportBuilder::new("p").build_at(&variants, &eval, fixed_time()).unwrap();
        assert_eq!(report.risk_assessment.primary_gene, Gene::Cyp2d6);
        assert_eq!(report.risk_assessment.risk_label, RiskLabel::Ineffective);
    }

    #[test]
    fn test_profiles_carry_gene_variants() {
        let eval = evaluation(vec![
            result(Gene::Cyp2d6, Severity::Low, RiskLabel::Unknown, Diplotype::Unknown),
            result(Gene::Cyp2c19, Severity::Moderate, RiskLabel::AdjustDosage, Diplotype::new("*1", "*2")),
        ]);
        let variants = vec![
            record(Gene::Cyp2c19, "*1"),
            record(Gene::Tpmt, "*3A"),
            record(Gene::Cyp2c19, "*2"),
        ];

        let report = ReportBuilder::new("p").build_at(&variants, &eval, fixed_time()).unwrap();

        assert_eq!(report.pharmacogenomic_profiles.len(), 2);
        assert!(report.pharmacogenomic_profiles[0].detected_variants.is_empty());
        assert_eq!(report.pharmacogenomic_profiles[0].diplotype, "Unknown");
        assert_eq!(report.pharmacogenomic_profiles[1].detected_variants.len(), 2);
        assert_eq!(report.pharmacogenomic_profiles[1].diplotype, "*1/*2");
        assert_eq!(report.clinical_recommendations[1].recommendation_text, "CYP2C19 advice");
        assert!(report.quality_metrics.gene_detected);
    }

    #[test]
    fn test_gene_detected_false_when_all_unknown() {
        let eval = evaluation(vec![result(Gene::Cyp2d6, Severity::Low, RiskLabel::Unknown, Diplotype::Unknown)]);
        let variants = vec![record(Gene::Tpmt, "*3A")];

        let report = ReportBuilder::new("p").build_at(&variants, &eval, fixed_time()).unwrap();
        assert!(!report.quality_metrics.gene_detected);
    }

    #[test]
    fn test_no_variants_rejected() {
        let eval = evaluation(vec![result(Gene::Cyp2d6, Severity::Low, RiskLabel::Unknown, Diplotype::Unknown)]);
        let err = ReportBuilder::new("p").build(&[], &eval).unwrap_err();
        assert!(matches!(err, PgxError::NoVariantsDetected));
    }

    #[test]
    fn test_unsupported_drug_rejected() {
        let eval = DrugEvaluation {
            drug: "ASPIRIN".to_string(),
            evaluations: Vec::new(),
            message: Some("not supported".to_string()),
        };
        let err = ReportBuilder::new("p")
            .build(&[record(Gene::Cyp2d6, "*4")], &eval)
            .unwrap_err();

        match err {
            PgxError::UnsupportedDrug { drug, message } => {
                assert_eq!(drug, "ASPIRIN");
                assert_eq!(message, "not supported");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_report_json_shape() {
        let eval = evaluation(vec![result(
            Gene::Cyp2c19,
            Severity::Critical,
            RiskLabel::Ineffective,
            Diplotype::homozygous("*2"),
        )]);
        let variants = vec![record(Gene::Cyp2c19, "*2")];
        let report = ReportBuilder::new("PATIENT_x").build_at(&variants, &eval, fixed_time()).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["patient_id"], "PATIENT_x");
        assert_eq!(json["risk_assessment"]["severity"], "critical");
        assert_eq!(json["risk_assessment"]["primary_gene"], "CYP2C19");
        assert_eq!(json["pharmacogenomic_profiles"][0]["phenotype"], "IM");
        assert_eq!(json["pharmacogenomic_profiles"][0]["detected_variants"][0]["rsid"], "rs1");
        assert_eq!(json["quality_metrics"]["rule_engine_applied"], true);
        assert!(json["timestamp"].as_str().unwrap().starts_with("2024-03-01T12:00:00"));
    }
}
