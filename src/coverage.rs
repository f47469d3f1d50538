// 🩺 Coverage Model - Kinds of medical coverage and per-evaluation eligibility flags

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// COVERAGE KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageKind {
    ClassicMajorMedical,
    BasicMajorMedical,
    SpecialMajorMedical,
    MedicalAssistance,
    ExternalAccidentMm,
    Surgical,
    Colic,
}

impl CoverageKind {
    pub const ALL: [CoverageKind; 7] = [
        CoverageKind::ClassicMajorMedical,
        CoverageKind::BasicMajorMedical,
        CoverageKind::SpecialMajorMedical,
        CoverageKind::MedicalAssistance,
        CoverageKind::ExternalAccidentMm,
        CoverageKind::Surgical,
        CoverageKind::Colic,
    ];

    /// Coverage offered next to Major Medical, in display order
    pub const SUPPLEMENTAL: [CoverageKind; 3] = [
        CoverageKind::ExternalAccidentMm,
        CoverageKind::Surgical,
        CoverageKind::Colic,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            CoverageKind::ClassicMajorMedical => "Classic Major Medical (with coinsurance)",
            CoverageKind::BasicMajorMedical => "Basic Major Medical",
            CoverageKind::SpecialMajorMedical => "Special Major Medical",
            CoverageKind::MedicalAssistance => "Medical Assistance",
            CoverageKind::ExternalAccidentMm => "Equine External Accident Major Medical",
            CoverageKind::Surgical => "Surgical",
            CoverageKind::Colic => "Colic",
        }
    }

    /// Classic, Basic or Special
    pub fn is_major_medical(&self) -> bool {
        matches!(
            self,
            CoverageKind::ClassicMajorMedical
                | CoverageKind::BasicMajorMedical
                | CoverageKind::SpecialMajorMedical
        )
    }
}

impl fmt::Display for CoverageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// COVERAGE SET
// ============================================================================

/// Seven independent eligibility flags, built fresh for every evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoverageSet {
    pub classic: bool,
    pub basic: bool,
    pub special: bool,
    pub medical_assistance: bool,
    pub external_accident: bool,
    pub surgical: bool,
    pub colic: bool,
}

impl CoverageSet {
    pub fn none() -> Self {
        CoverageSet::default()
    }

    pub fn all() -> Self {
        CoverageSet {
            classic: true,
            basic: true,
            special: true,
            medical_assistance: true,
            external_accident: true,
            surgical: true,
            colic: true,
        }
    }

    pub fn get(&self, kind: CoverageKind) -> bool {
        match kind {
            CoverageKind::ClassicMajorMedical => self.classic,
            CoverageKind::BasicMajorMedical => self.basic,
            CoverageKind::SpecialMajorMedical => self.special,
            CoverageKind::MedicalAssistance => self.medical_assistance,
            CoverageKind::ExternalAccidentMm => self.external_accident,
            CoverageKind::Surgical => self.surgical,
            CoverageKind::Colic => self.colic,
        }
    }

    pub fn set(&mut self, kind: CoverageKind, eligible: bool) {
        let flag = match kind {
            CoverageKind::ClassicMajorMedical => &mut self.classic,
            CoverageKind::BasicMajorMedical => &mut self.basic,
            CoverageKind::SpecialMajorMedical => &mut self.special,
            CoverageKind::MedicalAssistance => &mut self.medical_assistance,
            CoverageKind::ExternalAccidentMm => &mut self.external_accident,
            CoverageKind::Surgical => &mut self.surgical,
            CoverageKind::Colic => &mut self.colic,
        };
        *flag = eligible;
    }

    /// Builder-style variant of `set`
    pub fn with(mut self, kind: CoverageKind, eligible: bool) -> Self {
        self.set(kind, eligible);
        self
    }

    /// Eligible kinds in canonical order
    pub fn eligible(&self) -> Vec<CoverageKind> {
        CoverageKind::ALL
            .into_iter()
            .filter(|k| self.get(*k))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        CoverageKind::ALL.iter().all(|k| !self.get(*k))
    }

    pub fn has_major_medical(&self) -> bool {
        self.classic || self.basic || self.special
    }
}
