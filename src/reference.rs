// 📚 Reference Tables - Categories, uses, age bands, preferences
// Static, versioned data. No behavior beyond lookups and key parsing.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::{EligibilityError, Result};

/// Bumped whenever a table below changes meaning.
pub const REFERENCE_VERSION: &str = "2025.1";

/// Below this value Major Medical (classic/basic/special) is unavailable.
pub const MAJOR_MEDICAL_MIN_VALUE: f64 = 20_000.0;

/// Dressage horses need this value for Major Medical and Medical Assistance.
pub const DRESSAGE_MAJOR_MEDICAL_MIN_VALUE: f64 = 50_000.0;

/// Classic Major Medical is offered without coinsurance from this value.
pub const CLASSIC_NO_COINSURANCE_MIN_VALUE: f64 = 100_000.0;

// ============================================================================
// CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Western,
    Sport,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Western, Category::Sport];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Western => "western",
            Category::Sport => "sport",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Western => "Western",
            Category::Sport => "Sport Horse",
        }
    }

    /// Uses offered for this category, in wizard order
    pub fn uses(&self) -> &'static [Use] {
        match self {
            Category::Western => &[Use::Barrel, Use::GeneralWestern],
            Category::Sport => &[
                Use::Eventing,
                Use::Dressage,
                Use::PoloOrRacing,
                Use::GeneralSport,
            ],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = EligibilityError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.key() == key)
            .ok_or_else(|| EligibilityError::UnknownCategory(s.to_string()))
    }
}

// ============================================================================
// USE
// ============================================================================

/// Primary use / discipline. Only meaningful with its owning category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Use {
    #[serde(rename = "barrel")]
    Barrel,
    #[serde(rename = "general_western")]
    GeneralWestern,
    #[serde(rename = "eventing")]
    Eventing,
    #[serde(rename = "dressage")]
    Dressage,
    #[serde(rename = "polo_racing")]
    PoloOrRacing,
    #[serde(rename = "general_sport")]
    GeneralSport,
}

impl Use {
    pub const ALL: [Use; 6] = [
        Use::Barrel,
        Use::GeneralWestern,
        Use::Eventing,
        Use::Dressage,
        Use::PoloOrRacing,
        Use::GeneralSport,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Use::Barrel => "barrel",
            Use::GeneralWestern => "general_western",
            Use::Eventing => "eventing",
            Use::Dressage => "dressage",
            Use::PoloOrRacing => "polo_racing",
            Use::GeneralSport => "general_sport",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Use::Barrel => "Barrel",
            Use::GeneralWestern => "Cutting / Reining / Roping / Steer Wrestling / Ranch / Ranch Versatility / Breeding / Yearlings (31+ days) / Rearing / Breed Show / Pleasure (incl. under $20k with Medical Assistance)",
            Use::Eventing => "Eventing",
            Use::Dressage => "Dressage",
            Use::PoloOrRacing => "Polo or Racing",
            Use::GeneralSport => "Hunters / Jumpers / Fox Hunting / Show Driving / Breeding / Yearlings (31+ days) / Rearing / Breed Show / Pleasure (incl. under $20k with Medical Assistance)",
        }
    }

    /// Owning category
    pub fn category(&self) -> Category {
        match self {
            Use::Barrel | Use::GeneralWestern => Category::Western,
            Use::Eventing | Use::Dressage | Use::PoloOrRacing | Use::GeneralSport => {
                Category::Sport
            }
        }
    }
}

impl fmt::Display for Use {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Use {
    type Err = EligibilityError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase();
        Use::ALL
            .into_iter()
            .find(|u| u.key() == key)
            .ok_or_else(|| EligibilityError::UnknownUse(s.to_string()))
    }
}

// ============================================================================
// DISCIPLINE (category + use, valid by construction)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WesternUse {
    Barrel,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SportUse {
    Eventing,
    Dressage,
    PoloOrRacing,
    General,
}

/// A category paired with one of its own uses. Mismatched pairs cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Discipline {
    Western(WesternUse),
    Sport(SportUse),
}

impl Discipline {
    /// Pair a free-standing category and use, rejecting foreign uses
    pub fn new(category: Category, use_: Use) -> Result<Self> {
        match (category, use_) {
            (Category::Western, Use::Barrel) => Ok(Discipline::Western(WesternUse::Barrel)),
            (Category::Western, Use::GeneralWestern) => {
                Ok(Discipline::Western(WesternUse::General))
            }
            (Category::Sport, Use::Eventing) => Ok(Discipline::Sport(SportUse::Eventing)),
            (Category::Sport, Use::Dressage) => Ok(Discipline::Sport(SportUse::Dressage)),
            (Category::Sport, Use::PoloOrRacing) => Ok(Discipline::Sport(SportUse::PoloOrRacing)),
            (Category::Sport, Use::GeneralSport) => Ok(Discipline::Sport(SportUse::General)),
            (category, use_) => Err(EligibilityError::UseCategoryMismatch { category, use_ }),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Discipline::Western(_) => Category::Western,
            Discipline::Sport(_) => Category::Sport,
        }
    }

    pub fn use_(&self) -> Use {
        match self {
            Discipline::Western(WesternUse::Barrel) => Use::Barrel,
            Discipline::Western(WesternUse::General) => Use::GeneralWestern,
            Discipline::Sport(SportUse::Eventing) => Use::Eventing,
            Discipline::Sport(SportUse::Dressage) => Use::Dressage,
            Discipline::Sport(SportUse::PoloOrRacing) => Use::PoloOrRacing,
            Discipline::Sport(SportUse::General) => Use::GeneralSport,
        }
    }

    pub fn is_barrel(&self) -> bool {
        matches!(self, Discipline::Western(WesternUse::Barrel))
    }

    /// Every valid pairing, western first
    pub fn all() -> Vec<Discipline> {
        Category::ALL
            .iter()
            .flat_map(|c| c.uses().iter().map(move |u| (*c, *u)))
            .filter_map(|(c, u)| Discipline::new(c, u).ok())
            .collect()
    }
}

impl From<Use> for Discipline {
    fn from(use_: Use) -> Self {
        match use_ {
            Use::Barrel => Discipline::Western(WesternUse::Barrel),
            Use::GeneralWestern => Discipline::Western(WesternUse::General),
            Use::Eventing => Discipline::Sport(SportUse::Eventing),
            Use::Dressage => Discipline::Sport(SportUse::Dressage),
            Use::PoloOrRacing => Discipline::Sport(SportUse::PoloOrRacing),
            Use::GeneralSport => Discipline::Sport(SportUse::General),
        }
    }
}

// ============================================================================
// AGE BAND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "31d_20y")]
    Age31dTo20y,
    #[serde(rename = "over20")]
    PonyOver20y,
}

impl AgeBand {
    pub const ALL: [AgeBand; 2] = [AgeBand::Age31dTo20y, AgeBand::PonyOver20y];

    pub fn key(&self) -> &'static str {
        match self {
            AgeBand::Age31dTo20y => "31d_20y",
            AgeBand::PonyOver20y => "over20",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AgeBand::Age31dTo20y => "31 days – 20 years",
            AgeBand::PonyOver20y => "A Pony over 20 years",
        }
    }
}

impl FromStr for AgeBand {
    type Err = EligibilityError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase();
        AgeBand::ALL
            .into_iter()
            .find(|a| a.key() == key)
            .ok_or_else(|| EligibilityError::UnknownAgeBand(s.to_string()))
    }
}

// ============================================================================
// PREFERENCE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    BroadCoverage,
    NoCopay,
}

impl Preference {
    pub const ALL: [Preference; 2] = [Preference::BroadCoverage, Preference::NoCopay];

    pub fn key(&self) -> &'static str {
        match self {
            Preference::BroadCoverage => "broad_coverage",
            Preference::NoCopay => "no_copay",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Preference::BroadCoverage => "Broad coverage for diagnostics/lameness",
            Preference::NoCopay => "No co-pay (okay with diagnostic/lameness sub-limits)",
        }
    }
}

impl FromStr for Preference {
    type Err = EligibilityError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase();
        Preference::ALL
            .into_iter()
            .find(|p| p.key() == key)
            .ok_or_else(|| EligibilityError::UnknownPreference(s.to_string()))
    }
}

// ============================================================================
// INSURED VALUE
// ============================================================================

/// Declared value in USD.
///
/// An unreadable value (NaN) is accepted and compares below every threshold,
/// so value-gated coverage degrades to ineligible instead of failing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsuredValue(f64);

impl InsuredValue {
    pub fn new(amount: f64) -> Result<Self> {
        if amount.is_nan() {
            return Ok(InsuredValue(f64::NAN));
        }
        if amount < 0.0 || amount.is_infinite() {
            return Err(EligibilityError::InvalidValue(amount));
        }
        Ok(InsuredValue(amount))
    }

    pub fn unreadable() -> Self {
        InsuredValue(f64::NAN)
    }

    /// Parse free-form agent input such as "$50,000".
    ///
    /// Every character other than digits and '.' is dropped first, matching
    /// what agents type into the value field.
    pub fn parse(raw: &str) -> Self {
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        match cleaned.parse::<f64>() {
            Ok(n) if n.is_finite() => InsuredValue(n),
            _ => {
                if !raw.trim().is_empty() {
                    tracing::warn!(input = raw, "insured value is not a number");
                }
                InsuredValue::unreadable()
            }
        }
    }

    pub fn amount(&self) -> Option<f64> {
        if self.0.is_nan() {
            None
        } else {
            Some(self.0)
        }
    }

    pub fn is_readable(&self) -> bool {
        !self.0.is_nan()
    }

    /// `value >= threshold`; always false when unreadable
    pub fn at_least(&self, threshold: f64) -> bool {
        self.0 >= threshold
    }
}

impl Serialize for InsuredValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.amount().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for InsuredValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match Option::<f64>::deserialize(deserializer)? {
            None => Ok(InsuredValue::unreadable()),
            Some(amount) => InsuredValue::new(amount).map_err(serde::de::Error::custom),
        }
    }
}

// ============================================================================
// VERSIONING
// ============================================================================

/// SHA-256 over the canonical listing of every table and threshold.
pub fn reference_fingerprint() -> String {
    let mut hasher = Sha256::new();
    hasher.update(REFERENCE_VERSION.as_bytes());

    for category in Category::ALL {
        hasher.update(format!("category:{}", category.key()));
        for use_ in category.uses() {
            hasher.update(format!("|use:{}", use_.key()));
        }
        hasher.update("\n");
    }
    for age in AgeBand::ALL {
        hasher.update(format!("age:{}\n", age.key()));
    }
    for pref in Preference::ALL {
        hasher.update(format!("pref:{}\n", pref.key()));
    }
    hasher.update(format!(
        "thresholds:{}|{}|{}",
        MAJOR_MEDICAL_MIN_VALUE, DRESSAGE_MAJOR_MEDICAL_MIN_VALUE, CLASSIC_NO_COINSURANCE_MIN_VALUE
    ));

    format!("{:x}", hasher.finalize())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_use_listed_under_its_category() {
        for category in Category::ALL {
            for use_ in category.uses() {
                assert_eq!(use_.category(), category);
            }
        }
        let listed: usize = Category::ALL.iter().map(|c| c.uses().len()).sum();
        assert_eq!(listed, Use::ALL.len());
    }

    #[test]
    fn test_discipline_rejects_foreign_use() {
        let err = Discipline::new(Category::Western, Use::Eventing).unwrap_err();
        assert_eq!(
            err,
            EligibilityError::UseCategoryMismatch {
                category: Category::Western,
                use_: Use::Eventing,
            }
        );
    }

    #[test]
    fn test_discipline_round_trips_category_and_use() {
        let all = Discipline::all();
        assert_eq!(all.len(), 6);
        for d in all {
            assert_eq!(Discipline::new(d.category(), d.use_()), Ok(d));
            assert_eq!(Discipline::from(d.use_()), d);
        }
    }

    #[test]
    fn test_parse_wire_keys() {
        assert_eq!("SPORT".parse::<Category>(), Ok(Category::Sport));
        assert_eq!("polo_racing".parse::<Use>(), Ok(Use::PoloOrRacing));
        assert_eq!("over20".parse::<AgeBand>(), Ok(AgeBand::PonyOver20y));
        assert_eq!("no_copay".parse::<Preference>(), Ok(Preference::NoCopay));
        assert!(matches!(
            "rodeo".parse::<Use>(),
            Err(EligibilityError::UnknownUse(_))
        ));
    }

    #[test]
    fn test_serde_keys_match_wire_format() {
        assert_eq!(serde_json::to_string(&Use::GeneralSport).unwrap(), "\"general_sport\"");
        assert_eq!(serde_json::to_string(&AgeBand::Age31dTo20y).unwrap(), "\"31d_20y\"");
        assert_eq!(
            serde_json::to_string(&Preference::BroadCoverage).unwrap(),
            "\"broad_coverage\""
        );
    }

    #[test]
    fn test_insured_value_parse_strips_formatting() {
        assert_eq!(InsuredValue::parse("$50,000").amount(), Some(50_000.0));
        assert_eq!(InsuredValue::parse(" 19999.50 ").amount(), Some(19_999.5));
        assert!(!InsuredValue::parse("abc").is_readable());
        assert!(!InsuredValue::parse("").is_readable());
        assert!(!InsuredValue::parse("1.2.3").is_readable());
    }

    #[test]
    fn test_insured_value_rejects_negative_and_infinite() {
        assert_eq!(
            InsuredValue::new(-1.0),
            Err(EligibilityError::InvalidValue(-1.0))
        );
        assert!(InsuredValue::new(f64::INFINITY).is_err());
        assert!(!InsuredValue::new(f64::NAN).unwrap().is_readable());
    }

    #[test]
    fn test_unreadable_value_below_every_threshold() {
        let v = InsuredValue::unreadable();
        assert!(!v.at_least(0.0));
        assert!(!v.at_least(MAJOR_MEDICAL_MIN_VALUE));
    }

    #[test]
    fn test_insured_value_json_null_is_unreadable() {
        let v: InsuredValue = serde_json::from_str("null").unwrap();
        assert!(!v.is_readable());
        assert_eq!(serde_json::to_string(&v).unwrap(), "null");
        assert!(serde_json::from_str::<InsuredValue>("-5").is_err());
    }

    #[test]
    fn test_fingerprint_is_stable_hex() {
        let a = reference_fingerprint();
        assert_eq!(a, reference_fingerprint());
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
