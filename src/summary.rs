// 📝 Result Summary - what the results screen shows for an evaluation
// Display-level derivations only; eligibility itself comes from the engine.

use serde::{Deserialize, Serialize};

use crate::coverage::{CoverageKind, CoverageSet};
use crate::ranker::basic_major_medical_label;
use crate::reference::{
    Discipline, InsuredValue, CLASSIC_NO_COINSURANCE_MIN_VALUE, MAJOR_MEDICAL_MIN_VALUE,
};

pub const NO_MAJOR_MEDICAL_MESSAGE: &str = "Major Medical not available based on the answers provided.";
pub const CLASSIC_NO_COINSURANCE_NOTE: &str = "Horses valued at $100,000+ are eligible for Classic Major Medical without coinsurance (subject to use & age).";
pub const DISCLAIMER: &str = "This tool summarizes potential eligibility and is not a final offer of coverage. Actual eligibility depends on full underwriting review and policy terms.";

// ============================================================================
// VALUE STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Error,
    Info,
    Ok,
}

/// Feedback shown while the agent types the insured value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueStatus {
    pub level: StatusLevel,
    pub text: String,
}

impl ValueStatus {
    /// `None` until something has been typed
    pub fn assess(raw: &str, value: InsuredValue) -> Option<ValueStatus> {
        if raw.is_empty() {
            return None;
        }
        Some(Self::for_value(value))
    }

    /// Status for an already-parsed value
    pub fn for_value(value: InsuredValue) -> ValueStatus {
        let (level, text) = if !value.is_readable() {
            (StatusLevel::Error, "Please enter a number.")
        } else if !value.at_least(MAJOR_MEDICAL_MIN_VALUE) {
            (
                StatusLevel::Info,
                "Not eligible for Major Medical (Under $20k). Medical Assistance still available.",
            )
        } else if value.at_least(CLASSIC_NO_COINSURANCE_MIN_VALUE) {
            (
                StatusLevel::Ok,
                "$100k+ value: eligible for Classic Major Medical without coinsurance (subject to use & age).",
            )
        } else {
            (
                StatusLevel::Ok,
                "Eligible for Major Medical (subject to use & age).",
            )
        };

        ValueStatus {
            level,
            text: text.to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == StatusLevel::Error
    }
}

// ============================================================================
// ELIGIBILITY SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilitySummary {
    /// Classic, special, basic, medical assistance - whichever are eligible
    pub major_medical: Vec<String>,
    /// External accident, surgical, colic
    pub other_options: Vec<String>,
    pub show_100k_note: bool,
}

impl EligibilitySummary {
    pub fn from_coverage(
        coverage: &CoverageSet,
        discipline: Discipline,
        value: InsuredValue,
    ) -> Self {
        let mut major_medical = Vec::new();
        if coverage.classic {
            major_medical.push(CoverageKind::ClassicMajorMedical.display_name().to_string());
        }
        if coverage.special {
            major_medical.push(CoverageKind::SpecialMajorMedical.display_name().to_string());
        }
        if coverage.basic {
            major_medical.push(basic_major_medical_label(discipline).to_string());
        }
        if coverage.medical_assistance {
            major_medical.push(CoverageKind::MedicalAssistance.display_name().to_string());
        }

        let other_options = CoverageKind::SUPPLEMENTAL
            .iter()
            .filter(|kind| coverage.get(**kind))
            .map(|kind| kind.display_name().to_string())
            .collect();

        EligibilitySummary {
            major_medical,
            other_options,
            show_100k_note: value.at_least(CLASSIC_NO_COINSURANCE_MIN_VALUE) && coverage.classic,
        }
    }

    pub fn has_major_medical(&self) -> bool {
        !self.major_medical.is_empty()
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// `$50,000`, `$19,999.5`; an em dash when unreadable
pub fn format_usd(value: InsuredValue) -> String {
    let Some(amount) = value.amount() else {
        return "—".to_string();
    };

    let amount = (amount * 100.0).round() / 100.0;
    let digits = format!("{:.0}", amount.trunc());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let fraction = amount - amount.trunc();
    if fraction > 0.0 {
        let cents = format!("{:.2}", fraction);
        let cents = cents.trim_start_matches('0').trim_end_matches('0');
        format!("${}{}", grouped, cents)
    } else {
        format!("${}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluate_discipline;
    use crate::reference::{AgeBand, Use};

    fn value(v: f64) -> InsuredValue {
        InsuredValue::new(v).unwrap()
    }

    #[test]
    fn test_value_status_levels() {
        assert_eq!(ValueStatus::assess("", InsuredValue::parse("")), None);

        let err = ValueStatus::assess("abc", InsuredValue::parse("abc")).unwrap();
        assert!(err.is_error());

        let info = ValueStatus::assess("15000", value(15_000.0)).unwrap();
        assert_eq!(info.level, StatusLevel::Info);

        let ok = ValueStatus::assess("20000", value(20_000.0)).unwrap();
        assert_eq!(ok.text, "Eligible for Major Medical (subject to use & age).");

        let high = ValueStatus::assess("100000", value(100_000.0)).unwrap();
        assert!(high.text.starts_with("$100k+"));
    }

    #[test]
    fn test_summary_lists_in_display_order() {
        let d = Discipline::from(Use::GeneralSport);
        let coverage = evaluate_discipline(d, value(150_000.0), AgeBand::Age31dTo20y);
        let summary = EligibilitySummary::from_coverage(&coverage, d, value(150_000.0));

        assert_eq!(
            summary.major_medical,
            vec![
                "Classic Major Medical (with coinsurance)",
                "Special Major Medical",
                "Basic Major Medical",
                "Medical Assistance",
            ]
        );
        assert_eq!(
            summary.other_options,
            vec!["Equine External Accident Major Medical", "Surgical", "Colic"]
        );
        assert!(summary.show_100k_note);
    }

    #[test]
    fn test_barrel_summary_uses_limited_basic_label() {
        let d = Discipline::from(Use::Barrel);
        let coverage = evaluate_discipline(d, value(150_000.0), AgeBand::Age31dTo20y);
        let summary = EligibilitySummary::from_coverage(&coverage, d, value(150_000.0));
        assert_eq!(summary.major_medical, vec!["Basic Major Medical — $7,500 limit only"]);
        assert!(!summary.show_100k_note);
    }

    #[test]
    fn test_no_major_medical_for_polo() {
        let d = Discipline::from(Use::PoloOrRacing);
        let coverage = evaluate_discipline(d, value(10_000.0), AgeBand::Age31dTo20y);
        let summary = EligibilitySummary::from_coverage(&coverage, d, value(10_000.0));
        assert!(!summary.has_major_medical());
        assert_eq!(summary.other_options, vec!["Colic"]);
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(value(50_000.0)), "$50,000");
        assert_eq!(format_usd(value(999.0)), "$999");
        assert_eq!(format_usd(value(1_234_567.0)), "$1,234,567");
        assert_eq!(format_usd(value(19_999.5)), "$19,999.5");
        assert_eq!(format_usd(InsuredValue::unreadable()), "—");
    }

    #[test]
    fn test_format_usd_beyond_u64() {
        assert_eq!(
            format_usd(value(1e20)),
            "$100,000,000,000,000,000,000"
        );
    }
}
