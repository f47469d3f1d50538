// 📄 Evaluation Report - the evaluation JSON document and its text summary
//
// `build` turns an engine run into the document; `from_json` accepts a
// document produced elsewhere; `summary_text` renders either one.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::appetite::AppetiteStatus;
use crate::coverage::CoverageSet;
use crate::engine::evaluate_discipline;
use crate::error::{EligibilityError, Result};
use crate::ranker::{basic_major_medical_label, rank, PreferenceSet, RecommendationResult};
use crate::reference::{
    AgeBand, Category, Discipline, InsuredValue, Use, CLASSIC_NO_COINSURANCE_MIN_VALUE,
    DRESSAGE_MAJOR_MEDICAL_MIN_VALUE, MAJOR_MEDICAL_MIN_VALUE, REFERENCE_VERSION,
};
use crate::summary::{format_usd, ValueStatus};

/// Barrel horses only qualify for the $7,500 Basic product
pub const BARREL_BASIC_LIMIT: u32 = 7_500;

// ============================================================================
// REQUEST
// ============================================================================

/// One evaluation's inputs, as the CLI and the HTTP API receive them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub category: Category,
    #[serde(rename = "use")]
    pub use_: Use,
    pub value: InsuredValue,
    pub age: AgeBand,
    #[serde(default)]
    pub preferences: PreferenceSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horse_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horse_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_years: Option<u32>,
}

impl EvaluationRequest {
    pub fn new(category: Category, use_: Use, value: InsuredValue, age: AgeBand) -> Self {
        EvaluationRequest {
            category,
            use_,
            value,
            age,
            preferences: PreferenceSet::new(),
            horse_name: None,
            horse_id: None,
            age_years: None,
        }
    }

    pub fn discipline(&self) -> Result<Discipline> {
        Discipline::new(self.category, self.use_)
    }

    /// Engine run plus ranking for this request
    pub fn evaluate(&self) -> Result<(CoverageSet, RecommendationResult)> {
        let discipline = self.discipline()?;
        let coverage = evaluate_discipline(discipline, self.value, self.age);
        let ranking = rank(&coverage, &self.preferences, discipline);
        Ok((coverage, ranking))
    }
}

// ============================================================================
// DOCUMENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetadata {
    pub horse_id: String,
    pub horse_name: String,
    pub evaluated_at: String,
    #[serde(default)]
    pub age_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAppetite {
    pub status: AppetiteStatus,
    pub category: String,
    pub reason: String,
    #[serde(default)]
    pub underwriting_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueAssessment {
    pub insured_value: InsuredValue,
    pub qualifies_for_major_medical: bool,
    pub qualifies_for_classic_without_coinsurance: bool,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassicEligibility {
    pub eligible: bool,
    #[serde(default)]
    pub coinsurance_required: bool,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicEligibility {
    pub eligible: bool,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotedEligibility {
    pub eligible: bool,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    pub eligible: bool,
}

/// Field order is the display order of the summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibleCoverages {
    #[serde(default)]
    pub classic_major_medical: ClassicEligibility,
    #[serde(default)]
    pub basic_major_medical: BasicEligibility,
    #[serde(default)]
    pub special_major_medical: NotedEligibility,
    #[serde(default)]
    pub medical_assistance: NotedEligibility,
    #[serde(default)]
    pub external_accident_mm: Eligibility,
    #[serde(default)]
    pub surgical: Eligibility,
    #[serde(default)]
    pub colic: Eligibility,
}

impl EligibleCoverages {
    /// Wire keys of the eligible entries, in field order
    pub fn eligible_keys(&self) -> Vec<&'static str> {
        [
            ("classic_major_medical", self.classic_major_medical.eligible),
            ("basic_major_medical", self.basic_major_medical.eligible),
            ("special_major_medical", self.special_major_medical.eligible),
            ("medical_assistance", self.medical_assistance.eligible),
            ("external_accident_mm", self.external_accident_mm.eligible),
            ("surgical", self.surgical.eligible),
            ("colic", self.colic.eligible),
        ]
        .into_iter()
        .filter(|(_, eligible)| *eligible)
        .map(|(key, _)| key)
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Primary,
    Secondary,
    Alternative,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Primary => "PRIMARY",
            Priority::Secondary => "SECONDARY",
            Priority::Alternative => "ALTERNATIVE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecommendation {
    pub coverage_type: String,
    pub priority: Priority,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageEligibility {
    pub value_assessment: ValueAssessment,
    pub eligible_coverages: EligibleCoverages,
    #[serde(default)]
    pub recommendations: Vec<ReportRecommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub evaluation_metadata: EvaluationMetadata,
    pub risk_appetite: RiskAppetite,
    pub coverage_eligibility: CoverageEligibility,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

// ============================================================================
// BUILD
// ============================================================================

impl EvaluationReport {
    pub fn build(
        request: &EvaluationRequest,
        coverage: &CoverageSet,
        ranking: &RecommendationResult,
    ) -> Result<Self> {
        let discipline = request.discipline()?;
        let value = request.value;

        let evaluation_metadata = EvaluationMetadata {
            horse_id: request
                .horse_id
                .clone()
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            horse_name: request
                .horse_name
                .clone()
                .unwrap_or_else(|| "Unnamed horse".to_string()),
            evaluated_at: Utc::now().to_rfc3339(),
            age_years: request.age_years,
            reference_version: Some(REFERENCE_VERSION.to_string()),
        };

        let risk_appetite = if coverage.is_empty() {
            RiskAppetite {
                status: AppetiteStatus::Ineligible,
                category: request.category.key().to_string(),
                reason: format!("No coverage is available for {} horses with these answers.", request.use_.label()),
                underwriting_notes: None,
            }
        } else {
            RiskAppetite {
                status: AppetiteStatus::Eligible,
                category: request.category.key().to_string(),
                reason: format!(
                    "{} use is within appetite for the {} category.",
                    request.use_.label(),
                    request.category.label()
                ),
                underwriting_notes: if value.is_readable() {
                    None
                } else {
                    Some("Insured value could not be read; confirm before binding.".to_string())
                },
            }
        };

        let no_coinsurance = value.at_least(CLASSIC_NO_COINSURANCE_MIN_VALUE);
        let value_assessment = ValueAssessment {
            insured_value: value,
            qualifies_for_major_medical: value.at_least(MAJOR_MEDICAL_MIN_VALUE),
            qualifies_for_classic_without_coinsurance: no_coinsurance && coverage.classic,
            notes: ValueStatus::for_value(value).text,
        };

        let eligible_coverages = EligibleCoverages {
            classic_major_medical: ClassicEligibility {
                eligible: coverage.classic,
                coinsurance_required: coverage.classic && !no_coinsurance,
                notes: if !coverage.classic {
                    String::new()
                } else if no_coinsurance {
                    "Available without coinsurance at $100k+.".to_string()
                } else {
                    "20% coinsurance applies.".to_string()
                },
            },
            basic_major_medical: BasicEligibility {
                eligible: coverage.basic,
                limit: (coverage.basic && discipline.is_barrel()).then_some(BARREL_BASIC_LIMIT),
                notes: if coverage.basic {
                    basic_major_medical_label(discipline).to_string()
                } else {
                    String::new()
                },
            },
            special_major_medical: NotedEligibility {
                eligible: coverage.special,
                notes: String::new(),
            },
            medical_assistance: NotedEligibility {
                eligible: coverage.medical_assistance,
                notes: if coverage.medical_assistance && !value.at_least(MAJOR_MEDICAL_MIN_VALUE) {
                    "Available even under $20k.".to_string()
                } else {
                    String::new()
                },
            },
            external_accident_mm: Eligibility {
                eligible: coverage.external_accident,
            },
            surgical: Eligibility {
                eligible: coverage.surgical,
            },
            colic: Eligibility {
                eligible: coverage.colic,
            },
        };

        let recommendations = ranking
            .primary
            .iter()
            .enumerate()
            .map(|(i, rec)| ReportRecommendation {
                coverage_type: rec.kind.display_name().to_string(),
                priority: if i == 0 { Priority::Primary } else { Priority::Secondary },
                reason: rec.text.clone(),
            })
            .chain(ranking.supplemental.iter().map(|rec| ReportRecommendation {
                coverage_type: rec.kind.display_name().to_string(),
                priority: Priority::Alternative,
                reason: "Additional eligible option.".to_string(),
            }))
            .collect();

        Ok(EvaluationReport {
            evaluation_metadata,
            risk_appetite,
            coverage_eligibility: CoverageEligibility {
                value_assessment,
                eligible_coverages,
                recommendations,
            },
            next_steps: next_steps(coverage, value),
            warnings: warnings(discipline, request.age, value),
        })
    }

    /// Parse a document produced by `build` or by another evaluator.
    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).map_err(|e| EligibilityError::ReportParse(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| EligibilityError::ReportParse(e.to_string()))
    }

    /// Plain-text summary for pasting into notes or email
    pub fn summary_text(&self) -> String {
        let meta = &self.evaluation_metadata;
        let appetite = &self.risk_appetite;
        let eligibility = &self.coverage_eligibility;

        let age = match meta.age_years {
            Some(years) => format!("{} years", years),
            None => "not stated".to_string(),
        };

        let coverages: Vec<String> = eligibility
            .eligible_coverages
            .eligible_keys()
            .into_iter()
            .map(|key| format!("- {}", title_case_key(key)))
            .collect();

        let recommendations: Vec<String> = eligibility
            .recommendations
            .iter()
            .map(|r| format!("- [{}] {}: {}", r.priority.label(), r.coverage_type, r.reason))
            .collect();

        let steps: Vec<String> = self
            .next_steps
            .iter()
            .enumerate()
            .map(|(i, step)| format!("{}. {}", i + 1, step))
            .collect();

        let mut out = format!(
            "ELIGIBILITY SUMMARY - {name}\n\n\
             Horse Details:\n\
             - Name: {name}\n\
             - Age: {age}\n\
             - Value: {value}\n\
             - Category: {category}\n\n\
             Risk Appetite: {status}\n\
             {reason}\n\n\
             Eligible Coverages:\n{coverages}\n\n\
             Recommendations:\n{recommendations}\n\n\
             Next Steps:\n{steps}",
            name = meta.horse_name,
            age = age,
            value = format_usd(eligibility.value_assessment.insured_value),
            category = appetite.category.to_uppercase(),
            status = appetite.status.key(),
            reason = appetite.reason,
            coverages = coverages.join("\n"),
            recommendations = recommendations.join("\n"),
            steps = steps.join("\n"),
        );

        if !self.warnings.is_empty() {
            out.push_str("\n\nWarnings:\n");
            let lines: Vec<String> = self.warnings.iter().map(|w| format!("- {}", w)).collect();
            out.push_str(&lines.join("\n"));
        }

        out.trim().to_string()
    }
}

/// `external_accident_mm` → `External Accident Mm`
pub fn title_case_key(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn next_steps(coverage: &CoverageSet, value: InsuredValue) -> Vec<String> {
    let mut steps = Vec::new();
    if !value.is_readable() {
        steps.push("Confirm the insured value with the client.".to_string());
    }
    if coverage.is_empty() {
        steps.push("Submit to underwriting if the client still wants a quote.".to_string());
        return steps;
    }
    if coverage.has_major_medical() {
        steps.push("Confirm the horse's value with a bill of sale or appraisal.".to_string());
    }
    steps.push("Review the recommended coverages with the client.".to_string());
    steps.push("Complete the application for the selected coverage.".to_string());
    steps
}

fn warnings(discipline: Discipline, age: AgeBand, value: InsuredValue) -> Vec<String> {
    let mut warnings = Vec::new();
    if age == AgeBand::PonyOver20y {
        warnings.push(
            "Ponies over 20 are not eligible for Medical Assistance, Surgical or Colic coverage."
                .to_string(),
        );
    }
    if !value.is_readable() {
        warnings.push("Insured value could not be read; value-gated coverages were withheld.".to_string());
    }
    if discipline.use_() == Use::Dressage && !value.at_least(DRESSAGE_MAJOR_MEDICAL_MIN_VALUE) {
        warnings.push("Dressage horses under $50,000 are not eligible for Major Medical.".to_string());
    }
    if discipline.is_barrel() {
        warnings.push("Barrel horses qualify for the $7,500-limit Basic Major Medical only.".to_string());
    }
    warnings
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::Preference;

    fn request(use_: Use, value: f64, age: AgeBand) -> EvaluationRequest {
        let mut req = EvaluationRequest::new(
            use_.category(),
            use_,
            InsuredValue::new(value).unwrap(),
            age,
        );
        req.horse_name = Some("Biscuit".to_string());
        req.preferences = [Preference::BroadCoverage].into_iter().collect();
        req
    }

    fn build(req: &EvaluationRequest) -> EvaluationReport {
        let (coverage, ranking) = req.evaluate().unwrap();
        EvaluationReport::build(req, &coverage, &ranking).unwrap()
    }

    #[test]
    fn test_build_general_sport_report() {
        let report = build(&request(Use::GeneralSport, 150_000.0, AgeBand::Age31dTo20y));

        assert_eq!(report.risk_appetite.status, AppetiteStatus::Eligible);
        assert_eq!(report.risk_appetite.category, "sport");
        assert!(!report.evaluation_metadata.horse_id.is_empty());

        let value = &report.coverage_eligibility.value_assessment;
        assert!(value.qualifies_for_major_medical);
        assert!(value.qualifies_for_classic_without_coinsurance);

        let coverages = &report.coverage_eligibility.eligible_coverages;
        assert!(!coverages.classic_major_medical.coinsurance_required);
        assert_eq!(coverages.eligible_keys().len(), 7);

        let recs = &report.coverage_eligibility.recommendations;
        assert_eq!(recs[0].priority, Priority::Primary);
        assert_eq!(recs[1].priority, Priority::Secondary);
        assert_eq!(recs.last().unwrap().priority, Priority::Alternative);
    }

    #[test]
    fn test_build_polo_is_not_ineligible_because_of_colic() {
        let report = build(&request(Use::PoloOrRacing, 10_000.0, AgeBand::Age31dTo20y));
        assert_eq!(report.risk_appetite.status, AppetiteStatus::Eligible);
        assert_eq!(
            report.coverage_eligibility.eligible_coverages.eligible_keys(),
            vec!["colic"]
        );
    }

    #[test]
    fn test_build_all_false_is_ineligible() {
        let report = build(&request(Use::PoloOrRacing, 10_000.0, AgeBand::PonyOver20y));
        assert_eq!(report.risk_appetite.status, AppetiteStatus::Ineligible);
        assert!(report.coverage_eligibility.recommendations.is_empty());
        assert!(report.warnings[0].starts_with("Ponies over 20"));
        assert!(report.summary_text().contains("\n\nWarnings:\n- Ponies over 20"));
    }

    #[test]
    fn test_barrel_basic_limit() {
        let report = build(&request(Use::Barrel, 40_000.0, AgeBand::Age31dTo20y));
        let basic = &report.coverage_eligibility.eligible_coverages.basic_major_medical;
        assert!(basic.eligible);
        assert_eq!(basic.limit, Some(BARREL_BASIC_LIMIT));
    }

    #[test]
    fn test_mismatched_request_is_rejected() {
        let req = EvaluationRequest::new(
            Category::Western,
            Use::Dressage,
            InsuredValue::new(60_000.0).unwrap(),
            AgeBand::Age31dTo20y,
        );
        assert!(matches!(
            req.evaluate(),
            Err(EligibilityError::UseCategoryMismatch { .. })
        ));
    }

    #[test]
    fn test_json_round_trip_through_formatter() {
        let report = build(&request(Use::Dressage, 60_000.0, AgeBand::Age31dTo20y));
        let json = report.to_json_pretty().unwrap();
        let parsed = EvaluationReport::from_json(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_from_json_reports_parse_error() {
        let err = EvaluationReport::from_json("{ not json").unwrap_err();
        assert!(matches!(err, EligibilityError::ReportParse(_)));
        assert!(err.to_string().starts_with("Invalid evaluation JSON:"));
    }

    #[test]
    fn test_summary_text_layout() {
        let json = r#"{
            "evaluation_metadata": {
                "horse_id": "h-1",
                "horse_name": "Comet",
                "evaluated_at": "2025-01-01T00:00:00Z",
                "age_years": 9
            },
            "risk_appetite": {
                "status": "UW_SUBMIT",
                "category": "sport",
                "reason": "Eventing requires review.",
                "underwriting_notes": null
            },
            "coverage_eligibility": {
                "value_assessment": {
                    "insured_value": 45000,
                    "qualifies_for_major_medical": true,
                    "qualifies_for_classic_without_coinsurance": false,
                    "notes": ""
                },
                "eligible_coverages": {
                    "classic_major_medical": { "eligible": false, "coinsurance_required": true, "notes": "" },
                    "basic_major_medical": { "eligible": false, "limit": null, "notes": "" },
                    "special_major_medical": { "eligible": false, "notes": "" },
                    "medical_assistance": { "eligible": false, "notes": "" },
                    "external_accident_mm": { "eligible": true },
                    "surgical": { "eligible": true },
                    "colic": { "eligible": false }
                },
                "recommendations": [
                    { "coverage_type": "Surgical", "priority": "primary", "reason": "Eventing risk" }
                ]
            },
            "next_steps": ["Send to underwriting", "Collect vet records"],
            "warnings": []
        }"#;

        let text = EvaluationReport::from_json(json).unwrap().summary_text();
        let expected = "ELIGIBILITY SUMMARY - Comet\n\n\
            Horse Details:\n\
            - Name: Comet\n\
            - Age: 9 years\n\
            - Value: $45,000\n\
            - Category: SPORT\n\n\
            Risk Appetite: UW_SUBMIT\n\
            Eventing requires review.\n\n\
            Eligible Coverages:\n\
            - External Accident Mm\n\
            - Surgical\n\n\
            Recommendations:\n\
            - [PRIMARY] Surgical: Eventing risk\n\n\
            Next Steps:\n\
            1. Send to underwriting\n\
            2. Collect vet records";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_title_case_key() {
        assert_eq!(title_case_key("classic_major_medical"), "Classic Major Medical");
        assert_eq!(title_case_key("colic"), "Colic");
    }
}
