// 🥇 Recommendation Ranker - layers agent preferences over a CoverageSet
//
// Both preference branches may contribute. When neither produces anything,
// a single best-available pick is made: classic > special > basic > assistance.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::coverage::{CoverageKind, CoverageSet};
use crate::reference::{Discipline, Preference};

pub const BARREL_BASIC_LABEL: &str = "Basic Major Medical — $7,500 limit only";

// ============================================================================
// PREFERENCES
// ============================================================================

/// Zero, one or both preferences. The wizard requires one; the ranker does not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceSet(BTreeSet<Preference>);

impl PreferenceSet {
    pub fn new() -> Self {
        PreferenceSet(BTreeSet::new())
    }

    pub fn contains(&self, pref: Preference) -> bool {
        self.0.contains(&pref)
    }

    pub fn insert(&mut self, pref: Preference) {
        self.0.insert(pref);
    }

    /// Select when absent, deselect when present
    pub fn toggle(&mut self, pref: Preference) {
        if !self.0.remove(&pref) {
            self.0.insert(pref);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Preference> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Preference> for PreferenceSet {
    fn from_iter<I: IntoIterator<Item = Preference>>(iter: I) -> Self {
        PreferenceSet(iter.into_iter().collect())
    }
}

// ============================================================================
// RECOMMENDATIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: CoverageKind,
    pub text: String,
}

impl Recommendation {
    fn new(kind: CoverageKind, text: impl Into<String>) -> Self {
        Recommendation {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResult {
    /// Major Medical / assistance picks, in policy order
    pub primary: Vec<Recommendation>,
    /// External accident, surgical, colic - whichever are eligible
    pub supplemental: Vec<Recommendation>,
}

impl RecommendationResult {
    pub fn primary_lines(&self) -> Vec<&str> {
        self.primary.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn supplemental_lines(&self) -> Vec<&str> {
        self.supplemental.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.supplemental.is_empty()
    }
}

/// Basic Major Medical label; barrel horses only get the $7,500 product
pub fn basic_major_medical_label(discipline: Discipline) -> &'static str {
    if discipline.is_barrel() {
        BARREL_BASIC_LABEL
    } else {
        "Basic Major Medical"
    }
}

// ============================================================================
// RANK
// ============================================================================

pub fn rank(
    coverage: &CoverageSet,
    preferences: &PreferenceSet,
    context: Discipline,
) -> RecommendationResult {
    let mut primary = Vec::new();

    if preferences.contains(Preference::BroadCoverage) {
        if coverage.classic {
            primary.push(Recommendation::new(
                CoverageKind::ClassicMajorMedical,
                "Classic Major Medical (with coinsurance) — broadest coverage profile",
            ));
        }
        if coverage.special {
            primary.push(Recommendation::new(
                CoverageKind::SpecialMajorMedical,
                "Special Major Medical — broad coverage with sub-limits",
            ));
        }
    }

    if preferences.contains(Preference::NoCopay) {
        if coverage.basic {
            let text = if context.is_barrel() {
                BARREL_BASIC_LABEL
            } else {
                "Basic Major Medical — no co-pay, with diagnostic/lameness sub-limits"
            };
            primary.push(Recommendation::new(CoverageKind::BasicMajorMedical, text));
        }
        if coverage.special {
            primary.push(Recommendation::new(
                CoverageKind::SpecialMajorMedical,
                "Special Major Medical — broader than Basic, may fit no-co-pay preference",
            ));
        }
    }

    if primary.is_empty() {
        primary.extend(best_available(coverage, context));
    }

    let supplemental = CoverageKind::SUPPLEMENTAL
        .into_iter()
        .filter(|kind| coverage.get(*kind))
        .map(|kind| Recommendation::new(kind, kind.display_name()))
        .collect();

    RecommendationResult {
        primary,
        supplemental,
    }
}

fn best_available(coverage: &CoverageSet, context: Discipline) -> Option<Recommendation> {
    if coverage.classic {
        Some(Recommendation::new(
            CoverageKind::ClassicMajorMedical,
            CoverageKind::ClassicMajorMedical.display_name(),
        ))
    } else if coverage.special {
        Some(Recommendation::new(
            CoverageKind::SpecialMajorMedical,
            CoverageKind::SpecialMajorMedical.display_name(),
        ))
    } else if coverage.basic {
        Some(Recommendation::new(
            CoverageKind::BasicMajorMedical,
            basic_major_medical_label(context),
        ))
    } else if coverage.medical_assistance {
        Some(Recommendation::new(
            CoverageKind::MedicalAssistance,
            "Medical Assistance — available even under $20k",
        ))
    } else {
        None
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluate_discipline;
    use crate::reference::{AgeBand, InsuredValue, Use};
    use proptest::prelude::*;

    fn prefs(list: &[Preference]) -> PreferenceSet {
        list.iter().copied().collect()
    }

    fn kinds(result: &RecommendationResult) -> Vec<CoverageKind> {
        result.primary.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn test_broad_coverage_picks_classic_then_special() {
        let result = rank(
            &CoverageSet::all(),
            &prefs(&[Preference::BroadCoverage]),
            Discipline::from(Use::GeneralSport),
        );
        assert_eq!(
            kinds(&result),
            vec![CoverageKind::ClassicMajorMedical, CoverageKind::SpecialMajorMedical]
        );
    }

    #[test]
    fn test_both_preferences_contribute() {
        let result = rank(
            &CoverageSet::all(),
            &prefs(&[Preference::BroadCoverage, Preference::NoCopay]),
            Discipline::from(Use::GeneralWestern),
        );
        assert_eq!(
            kinds(&result),
            vec![
                CoverageKind::ClassicMajorMedical,
                CoverageKind::SpecialMajorMedical,
                CoverageKind::BasicMajorMedical,
                CoverageKind::SpecialMajorMedical,
            ]
        );
    }

    #[test]
    fn test_barrel_no_copay_uses_limited_label() {
        let coverage = CoverageSet {
            basic: true,
            external_accident: true,
            surgical: true,
            ..CoverageSet::none()
        };
        let result = rank(&coverage, &prefs(&[Preference::NoCopay]), Discipline::from(Use::Barrel));
        assert_eq!(result.primary_lines(), vec![BARREL_BASIC_LABEL]);
        assert_eq!(
            result.supplemental_lines(),
            vec!["Equine External Accident Major Medical", "Surgical"]
        );
    }

    #[test]
    fn test_fallback_when_preference_finds_nothing() {
        // Barrel has no classic/special, so broad coverage falls back to basic
        let coverage = CoverageSet {
            basic: true,
            ..CoverageSet::none()
        };
        let result = rank(
            &coverage,
            &prefs(&[Preference::BroadCoverage]),
            Discipline::from(Use::Barrel),
        );
        assert_eq!(result.primary_lines(), vec![BARREL_BASIC_LABEL]);
    }

    #[test]
    fn test_fallback_with_no_preferences_takes_first_true_flag() {
        let coverage = CoverageSet {
            special: true,
            basic: true,
            medical_assistance: true,
            ..CoverageSet::none()
        };
        let result = rank(&coverage, &PreferenceSet::new(), Discipline::from(Use::GeneralSport));
        assert_eq!(kinds(&result), vec![CoverageKind::SpecialMajorMedical]);

        let assistance_only = CoverageSet {
            medical_assistance: true,
            ..CoverageSet::none()
        };
        let result = rank(
            &assistance_only,
            &prefs(&[Preference::NoCopay]),
            Discipline::from(Use::GeneralSport),
        );
        assert_eq!(
            result.primary_lines(),
            vec!["Medical Assistance — available even under $20k"]
        );
    }

    #[test]
    fn test_all_false_gives_empty_result() {
        let result = rank(
            &CoverageSet::none(),
            &prefs(&[Preference::BroadCoverage, Preference::NoCopay]),
            Discipline::from(Use::PoloOrRacing),
        );
        assert!(result.is_empty());
    }

    #[test]
    fn test_supplemental_order_is_fixed() {
        let result = rank(
            &CoverageSet::all(),
            &PreferenceSet::new(),
            Discipline::from(Use::GeneralSport),
        );
        assert_eq!(
            result.supplemental.iter().map(|r| r.kind).collect::<Vec<_>>(),
            CoverageKind::SUPPLEMENTAL.to_vec()
        );
    }

    #[test]
    fn test_toggle_preference() {
        let mut set = PreferenceSet::new();
        set.toggle(Preference::NoCopay);
        assert!(set.contains(Preference::NoCopay));
        set.toggle(Preference::NoCopay);
        assert!(set.is_empty());
    }

    proptest! {
        #[test]
        fn prop_rank_is_referentially_transparent(
            d in prop::sample::select(Discipline::all()),
            v in 0.0f64..2_000_000.0,
            over20 in any::<bool>(),
            broad in any::<bool>(),
            no_copay in any::<bool>(),
        ) {
            let age = if over20 { AgeBand::PonyOver20y } else { AgeBand::Age31dTo20y };
            let mut p = PreferenceSet::new();
            if broad { p.insert(Preference::BroadCoverage); }
            if no_copay { p.insert(Preference::NoCopay); }

            let value = InsuredValue::new(v).unwrap();
            let first = rank(&evaluate_discipline(d, value, age), &p, d);
            let second = rank(&evaluate_discipline(d, value, age), &p, d);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_primary_only_names_eligible_coverage(
            d in prop::sample::select(Discipline::all()),
            v in 0.0f64..2_000_000.0,
            broad in any::<bool>(),
        ) {
            let coverage = evaluate_discipline(d, InsuredValue::new(v).unwrap(), AgeBand::Age31dTo20y);
            let p: PreferenceSet = if broad {
                [Preference::BroadCoverage].into_iter().collect()
            } else {
                PreferenceSet::new()
            };
            let result = rank(&coverage, &p, d);
            for rec in result.primary.iter().chain(result.supplemental.iter()) {
                prop_assert!(coverage.get(rec.kind));
            }
        }
    }
}
