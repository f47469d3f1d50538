// ⚖️ Eligibility Engine - (category, use, value, age) → CoverageSet
//
// Three pure stages, each a transform over a fresh CoverageSet:
//   1. base eligibility by discipline (dressage also looks at value)
//   2. age adjustment (ponies over 20 lose medical assistance/surgical/colic)
//   3. value gate (no Major Medical under $20k)
//
// The engine holds no state; callers pass every input on every call.

use tracing::debug;

use crate::coverage::CoverageSet;
use crate::error::Result;
use crate::reference::{
    AgeBand, Category, Discipline, InsuredValue, SportUse, Use, WesternUse,
    DRESSAGE_MAJOR_MEDICAL_MIN_VALUE, MAJOR_MEDICAL_MIN_VALUE,
};

/// Evaluate eligibility from loose category/use values.
///
/// Fails with `UseCategoryMismatch` when `use_` is not one of the
/// category's uses. An all-false result is a valid answer, not an error.
pub fn evaluate(
    category: Category,
    use_: Use,
    value: InsuredValue,
    age: AgeBand,
) -> Result<CoverageSet> {
    let discipline = Discipline::new(category, use_)?;
    Ok(evaluate_discipline(discipline, value, age))
}

/// Infallible variant for callers that already hold a valid pairing.
pub fn evaluate_discipline(discipline: Discipline, value: InsuredValue, age: AgeBand) -> CoverageSet {
    let base = base_eligibility(discipline, value);
    let aged = apply_age_adjustment(base, age);
    let gated = apply_value_gate(aged, value);

    debug!(
        category = discipline.category().key(),
        use_ = discipline.use_().key(),
        value = ?value.amount(),
        age = age.key(),
        ?base,
        ?gated,
        "evaluated eligibility"
    );

    gated
}

// ============================================================================
// STAGE 1: BASE ELIGIBILITY
// ============================================================================

pub fn base_eligibility(discipline: Discipline, value: InsuredValue) -> CoverageSet {
    let accident_and_surgical = CoverageSet {
        external_accident: true,
        surgical: true,
        ..CoverageSet::none()
    };

    match discipline {
        Discipline::Sport(SportUse::Eventing) => accident_and_surgical,
        Discipline::Sport(SportUse::Dressage) => {
            if value.at_least(DRESSAGE_MAJOR_MEDICAL_MIN_VALUE) {
                CoverageSet {
                    classic: true,
                    basic: true,
                    special: true,
                    medical_assistance: true,
                    ..accident_and_surgical
                }
            } else {
                accident_and_surgical
            }
        }
        Discipline::Sport(SportUse::PoloOrRacing) => CoverageSet {
            colic: true,
            ..CoverageSet::none()
        },
        Discipline::Sport(SportUse::General) => CoverageSet::all(),
        // Barrel basic is the $7,500-limit product only
        Discipline::Western(WesternUse::Barrel) => CoverageSet {
            basic: true,
            ..accident_and_surgical
        },
        Discipline::Western(WesternUse::General) => CoverageSet::all(),
    }
}

// ============================================================================
// STAGE 2: AGE ADJUSTMENT
// ============================================================================

/// Major Medical flags are left for the value gate.
pub fn apply_age_adjustment(mut coverage: CoverageSet, age: AgeBand) -> CoverageSet {
    if age == AgeBand::PonyOver20y {
        coverage.medical_assistance = false;
        coverage.surgical = false;
        coverage.colic = false;
    }
    coverage
}

// ============================================================================
// STAGE 3: VALUE GATE
// ============================================================================

/// Medical assistance is not value gated.
pub fn apply_value_gate(mut coverage: CoverageSet, value: InsuredValue) -> CoverageSet {
    if !value.at_least(MAJOR_MEDICAL_MIN_VALUE) {
        coverage.classic = false;
        coverage.basic = false;
        coverage.special = false;
    }
    coverage
}

// ============================================================================
// TESTS
// ============================================================================
