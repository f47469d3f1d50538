// 📊 Product Explorer - side-by-side comparison of medical products
// Static catalogue of plans and rate options, with the explorer's filters.

use anyhow::{Context as AnyhowContext, Result as AnyhowResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Horse categories that also pick up rates filed for "Any"
const SPECIFIC_HORSE_CATEGORIES: [&str; 3] = ["Race Horse", "Sport Horse", "Western"];

pub const US_STATES: [(&str, &str); 51] = [
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

/// Full state name for a two-letter code
pub fn state_name(code: &str) -> Option<&'static str> {
    US_STATES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

// ============================================================================
// PLANS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateOption {
    pub horse_category: String,
    pub sum_insured: String,
    pub deductible: String,
    pub co_pay: String,
    pub limit: String,
    pub premium: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsurancePlan {
    pub id: String,
    pub plan_name: String,
    pub company: String,
    pub state_filing_approved: String,
    pub co_pay: String,
    pub age_eligibility: String,
    pub use_and_value_eligibility: String,
    pub special_limits: String,
    pub exclusions: String,
    #[serde(default)]
    pub rates: Vec<RateOption>,
}

impl InsurancePlan {
    /// Filing text is either "All states except X, Y" or a list of codes.
    pub fn is_available_in_state(&self, state: &str) -> bool {
        if state.eq_ignore_ascii_case("all") {
            return true;
        }
        let code = state.trim().to_uppercase();
        // ASCII lowering keeps byte offsets valid for the original string
        let filing = self.state_filing_approved.to_ascii_lowercase();

        if let Some(idx) = filing.find("all states except") {
            let excluded = state_codes(&self.state_filing_approved[idx + "all states except".len()..]);
            return !excluded.contains(&code);
        }

        state_codes(&self.state_filing_approved).contains(&code)
    }

    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        term.is_empty()
            || self.plan_name.to_lowercase().contains(&term)
            || self.company.to_lowercase().contains(&term)
            || self.use_and_value_eligibility.to_lowercase().contains(&term)
            || self.age_eligibility.to_lowercase().contains(&term)
    }

    /// Rates shown for a horse-category selection (`None` = all)
    pub fn filtered_rates(&self, horse_category: Option<&str>) -> Vec<&RateOption> {
        self.rates
            .iter()
            .filter(|r| horse_category.map_or(true, |c| rate_matches_category(&r.horse_category, c)))
            .collect()
    }
}

/// Two-letter codes in a filing string; separators are commas, '&' and "and".
fn state_codes(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c == '&' || c.is_whitespace())
        .map(str::trim)
        .filter(|token| token.len() == 2 && !token.eq_ignore_ascii_case("and"))
        .filter(|token| token.chars().all(|c| c.is_ascii_alphabetic()))
        .map(str::to_uppercase)
        .collect()
}

pub fn rate_matches_category(rate_category: &str, selected: &str) -> bool {
    if selected.eq_ignore_ascii_case("all") || rate_category == selected {
        return true;
    }
    SPECIFIC_HORSE_CATEGORIES.contains(&selected) && rate_category == "Any"
}

// ============================================================================
// FILTER
// ============================================================================

/// Explorer filters; `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanFilter {
    pub search: Option<String>,
    pub company: Option<String>,
    pub co_pay: Option<String>,
    pub state: Option<String>,
    pub horse_category: Option<String>,
}

impl PlanFilter {
    pub fn is_active(&self) -> bool {
        self.search.as_deref().is_some_and(|s| !s.is_empty())
            || self.company.is_some()
            || self.co_pay.is_some()
            || self.state.is_some()
            || self.horse_category.is_some()
    }

    pub fn matches(&self, plan: &InsurancePlan) -> bool {
        let matches_search = self.search.as_deref().map_or(true, |s| plan.matches_search(s));
        let matches_company = self.company.as_deref().map_or(true, |c| plan.company == c);
        let matches_co_pay = self.co_pay.as_deref().map_or(true, |c| plan.co_pay == c);
        let matches_state = self
            .state
            .as_deref()
            .map_or(true, |s| plan.is_available_in_state(s));
        let matches_category = self.horse_category.as_deref().map_or(true, |c| {
            plan.rates
                .iter()
                .any(|r| rate_matches_category(&r.horse_category, c))
        });

        matches_search && matches_company && matches_co_pay && matches_state && matches_category
    }
}

// ============================================================================
// CATALOGUE
// ============================================================================

#[derive(Debug, Serialize)]
struct RateRow<'a> {
    plan_id: &'a str,
    plan_name: &'a str,
    company: &'a str,
    plan_co_pay: &'a str,
    horse_category: &'a str,
    sum_insured: &'a str,
    deductible: &'a str,
    co_pay: &'a str,
    limit: &'a str,
    premium: &'a str,
    notes: &'a str,
}

pub struct PlanCatalog {
    plans: Vec<InsurancePlan>,
}

impl PlanCatalog {
    pub fn new(plans: Vec<InsurancePlan>) -> Self {
        PlanCatalog { plans }
    }

    /// Load a catalogue from a JSON array of plans
    pub fn from_file<P: AsRef<Path>>(path: P) -> AnyhowResult<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read plans file: {:?}", path.as_ref()))?;

        let plans: Vec<InsurancePlan> =
            serde_json::from_str(&content).context("Failed to parse plans JSON")?;

        info!(plans = plans.len(), path = %path.as_ref().display(), "loaded plan catalogue");
        Ok(PlanCatalog::new(plans))
    }

    pub fn plans(&self) -> &[InsurancePlan] {
        &self.plans
    }

    pub fn get(&self, id: &str) -> Option<&InsurancePlan> {
        self.plans.iter().find(|p| p.id == id)
    }

    pub fn filter(&self, filter: &PlanFilter) -> Vec<&InsurancePlan> {
        self.plans.iter().filter(|p| filter.matches(p)).collect()
    }

    /// Distinct companies, first-seen order
    pub fn companies(&self) -> Vec<&str> {
        distinct_in_order(self.plans.iter().map(|p| p.company.as_str()))
    }

    /// Distinct plan-level co-pays, first-seen order
    pub fn co_pays(&self) -> Vec<&str> {
        distinct_in_order(self.plans.iter().map(|p| p.co_pay.as_str()))
    }

    /// Distinct rate horse categories, sorted
    pub fn horse_categories(&self) -> Vec<&str> {
        self.plans
            .iter()
            .flat_map(|p| p.rates.iter().map(|r| r.horse_category.as_str()))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Comparison export: one CSV row per shown rate option
    pub fn write_csv<W: Write>(
        writer: W,
        plans: &[&InsurancePlan],
        horse_category: Option<&str>,
    ) -> AnyhowResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        for plan in plans {
            for rate in plan.filtered_rates(horse_category) {
                wtr.serialize(RateRow {
                    plan_id: &plan.id,
                    plan_name: &plan.plan_name,
                    company: &plan.company,
                    plan_co_pay: &plan.co_pay,
                    horse_category: &rate.horse_category,
                    sum_insured: &rate.sum_insured,
                    deductible: &rate.deductible,
                    co_pay: &rate.co_pay,
                    limit: &rate.limit,
                    premium: &rate.premium,
                    notes: rate.notes.as_deref().unwrap_or(""),
                })
                .context("Failed to write rate row")?;
            }
        }

        wtr.flush().context("Failed to flush CSV output")?;
        Ok(())
    }

    /// Built-in product catalogue
    pub fn with_defaults() -> Self {
        const ACCELERANT_STATES: &str = "AL, AZ, CO, CT, DE, DC, GA, FL, IA, ID, IL, IN, KS, KY, ME, MI, MN, MA, MO, MS, MT, NC, NE, NH, NJ, NM, NV, OH, PA, RI, SC, TN, TX, VA, WA and WV";
        const NATIONAL_STATES: &str = "AL, AR, AZ, CA, CO, CT, DE, DC, FL, GA, IA, ID, IL, IN, KS, KY, LA, MA, MD, ME, MI, MN, MO, MS, MT, NC, ND, NE, NH, NJ, NM, NV, NY, OH, OK, OR, PA, RI, SC, SD, TN, TX, UT, VA, VT, WA, WI, WV, WY";
        const STANDARD_EXCLUSIONS: &str = "Pre-existing conditions, routine maintenance, homeopathic treatments, elective surgeries";
        const SURGICAL_EXCLUSIONS: &str = "Pre-existing conditions, routine maintenance, homeopathic treatments. Surgery not under general anesthesia and elective surgery, non-essential procedures";
        const AFTER_CARE: &str = "After-care: 50% of surgery or 15 days";

        let major_medical_rates = |limits: [(&str, &str, &str); 3], category: &str| -> Vec<RateOption> {
            limits
                .iter()
                .map(|(deductible, limit, premium)| {
                    rate(category, "≥ $20,000", deductible, "0%", limit, premium)
                })
                .collect()
        };
        let sport_mm = [("$425", "$7,500", "$575"), ("$500", "$10,000", "$675"), ("$600", "$15,000", "$825")];
        let western_mm = [("$425", "$7,500", "$525"), ("$500", "$10,000", "$625"), ("$600", "$15,000", "$775")];
        let mm_rates = || {
            let mut rates = major_medical_rates(sport_mm, "Sport Horse");
            rates.extend(major_medical_rates(western_mm, "Western"));
            rates
        };

        let classic_rates = |sum: &str, co_pay: &str, premiums: [&str; 8]| -> Vec<RateOption> {
            let grid = [
                ("$500", "$7,500"),
                ("$500", "$10,000"),
                ("$500", "$12,500"),
                ("$500", "$15,000"),
                ("$1,000", "$7,500"),
                ("$1,000", "$10,000"),
                ("$1,000", "$12,500"),
                ("$1,000", "$15,000"),
            ];
            grid.iter()
                .zip(premiums)
                .map(|((deductible, limit), premium)| rate("Any", sum, deductible, co_pay, limit, premium))
                .collect()
        };

        PlanCatalog::new(vec![
            InsurancePlan {
                id: "1".to_string(),
                plan_name: "External Accident Major Medical".to_string(),
                company: "Accelerant".to_string(),
                state_filing_approved: ACCELERANT_STATES.to_string(),
                co_pay: "None".to_string(),
                age_eligibility: "31 days and up".to_string(),
                use_and_value_eligibility: "All uses & values; (Excludes: Racing & Polo); *Note, limit does not cap at the value of the horse*".to_string(),
                special_limits: "Coverage includes: Colic (medical or surgical), treatment for illness due to accidental injury (e.g., lacerations), neurological disorders from illness (EPM, West Nile, EHV), and Lyme disease. Diagnostics covered: Radiographs, ultrasound, blood work, and myelogram for visible, external, traumatic injuries.".to_string(),
                exclusions: "Diagnostics or treatment for lameness and ulcers (e.g., navicular, pedal osteitis, arthritis, DJD, vertebral/skeletal abnormalities, bone spavin, bone chips, OCD, tendonitis, ligament desmitis). Nuclear scintigraphy (bone scan) and MRI also excluded. Pre-existing conditions, routine maintenance, homeopathic treatments, elective surgeries".to_string(),
                rates: vec![
                    rate("Sport Horse", "> $0", "$375", "0%", "$5,000", "$525"),
                    rate("Western", "> $0", "$375", "0%", "$5,000", "$475"),
                ],
            },
            InsurancePlan {
                id: "2".to_string(),
                plan_name: "Basic Major Medical".to_string(),
                company: "Accelerant".to_string(),
                state_filing_approved: ACCELERANT_STATES.to_string(),
                co_pay: "None".to_string(),
                age_eligibility: "31 days and up".to_string(),
                use_and_value_eligibility: "All uses & values $20k+ (Excludes: Racing, Polo, Eventing, Dressage < $50k) Barrel horses qualify for $7,500 limit".to_string(),
                special_limits: "Lameness: $2.5k/claim, $4k/year; Diagnostics: $2.5k/claim, $4k/year; Gastric Ulcers: $2.5k max".to_string(),
                exclusions: "Only covers dental if caused by a visible external accident, pre-existing conditions, routine maintenance, homeopathic treatments, elective surgeries.".to_string(),
                rates: mm_rates(),
            },
            InsurancePlan {
                id: "3".to_string(),
                plan_name: "Special Major Medical".to_string(),
                company: "Accelerant".to_string(),
                state_filing_approved: ACCELERANT_STATES.to_string(),
                co_pay: "None".to_string(),
                age_eligibility: "31 days and up".to_string(),
                use_and_value_eligibility: "Values $20k+ (Excludes: Racing, Polo, Eventing, Barrel & Dressage < $50k)".to_string(),
                special_limits: "Lameness: $2.5k/claim; Diagnostics: 50% of limit; Gastric Ulcers: $2.5k max".to_string(),
                exclusions: STANDARD_EXCLUSIONS.to_string(),
                rates: mm_rates(),
            },
            InsurancePlan {
                id: "4".to_string(),
                plan_name: "Classic Major Medical (20% Co-Pay)".to_string(),
                company: "Accelerant & Hanover".to_string(),
                state_filing_approved: NATIONAL_STATES.to_string(),
                co_pay: "20%".to_string(),
                age_eligibility: "31 days through 20 years".to_string(),
                use_and_value_eligibility: "Values $20k+ (Excludes: Racing, Polo, Eventing, Barrel & Dressage < $50k)".to_string(),
                special_limits: "Shockwave: $1.2k/claim; Regenerative: $3k/claim; Ulcers: $2.5k max".to_string(),
                exclusions: STANDARD_EXCLUSIONS.to_string(),
                rates: classic_rates(
                    "≥ $20,000",
                    "20%",
                    ["$500", "$550", "$675", "$750", "$440", "$460", "$560", "$620"],
                ),
            },
            InsurancePlan {
                id: "5".to_string(),
                plan_name: "Classic Major Medical (No Co-Pay)".to_string(),
                company: "Accelerant & Hanover".to_string(),
                state_filing_approved: NATIONAL_STATES.to_string(),
                co_pay: "None".to_string(),
                age_eligibility: "31 days through 20 years".to_string(),
                use_and_value_eligibility: "Values $100k+ (Excludes: Racing, Polo, Eventing, Barrel)".to_string(),
                special_limits: "Shockwave: $1.2k/claim; Regenerative: $3k/claim; Ulcers: $2.5k max".to_string(),
                exclusions: STANDARD_EXCLUSIONS.to_string(),
                rates: classic_rates(
                    "≥ $100,000",
                    "0%",
                    ["$700", "$750", "$875", "$950", "$640", "$660", "$760", "$820"],
                ),
            },
            InsurancePlan {
                id: "6".to_string(),
                plan_name: "Medical Assistance".to_string(),
                company: "Accelerant & Hanover".to_string(),
                state_filing_approved: NATIONAL_STATES.to_string(),
                co_pay: "20%".to_string(),
                age_eligibility: "31 days through 20 years".to_string(),
                use_and_value_eligibility: "All values (Caps at value of horse) (Excludes: Racing, Polo, Eventing, Barrel Racers & Dressage <$50k)".to_string(),
                special_limits: "Shockwave/Bisphosphonate: $750; Regenerative: $500; Ulcers: $1.5k; Lameness: 6 months".to_string(),
                exclusions: STANDARD_EXCLUSIONS.to_string(),
                rates: vec![
                    rate("Any", "< $20,000", "$1,000", "20%", "$7,500", "$650"),
                    rate("Any", "≥ $20,000", "$500", "20%", "$7,500", "$400"),
                ],
            },
            InsurancePlan {
                id: "7".to_string(),
                plan_name: "Emergency Colic Surgery".to_string(),
                company: "Accelerant & Hanover".to_string(),
                state_filing_approved: NATIONAL_STATES.to_string(),
                co_pay: "None".to_string(),
                age_eligibility: "31 days through 20 years".to_string(),
                use_and_value_eligibility: "Any Value".to_string(),
                special_limits: "$5k total coverage".to_string(),
                exclusions: "Pre-existing conditions, routine maintenance, homeopathic treatments".to_string(),
                rates: vec![rate("Any", "> $0", "$0", "0%", "$5,000", "Included")],
            },
            InsurancePlan {
                id: "8".to_string(),
                plan_name: "Colic Treatment".to_string(),
                company: "Accelerant & Hanover".to_string(),
                state_filing_approved: NATIONAL_STATES.to_string(),
                co_pay: "20%".to_string(),
                age_eligibility: "31 days through 20 years".to_string(),
                use_and_value_eligibility: "Horses $15k+ & Any Use".to_string(),
                special_limits: "$5k total; $2k if no surgery; After-care: 50% of surgery or 15 days".to_string(),
                exclusions: "Pre-existing conditions, routine maintenance, homeopathic treatments".to_string(),
                rates: vec![rate("Any", "≥ $15,000", "$250", "20%", "$5,000", "$175")],
            },
            InsurancePlan {
                id: "9".to_string(),
                plan_name: "Surgical (Accelerant & Hanover)".to_string(),
                company: "Accelerant & Hanover".to_string(),
                state_filing_approved: NATIONAL_STATES.to_string(),
                co_pay: "20%".to_string(),
                age_eligibility: "31 days through 20 years".to_string(),
                use_and_value_eligibility: "Any use (excludes Race Horse)".to_string(),
                special_limits: AFTER_CARE.to_string(),
                exclusions: SURGICAL_EXCLUSIONS.to_string(),
                rates: vec![
                    rate("Any (excludes Race Horse)", "Any", "$250", "20%", "$5,000", "$100"),
                    rate("Any (excludes Race Horse)", "Any", "$250", "20%", "$10,000", "$150"),
                    rate("Any (excludes Race Horse)", "Any", "$250", "20%", "$15,000", "$200"),
                ],
            },
            InsurancePlan {
                id: "10".to_string(),
                plan_name: "Surgical (Accelerant - Zero Deductible)".to_string(),
                company: "Accelerant".to_string(),
                state_filing_approved: NATIONAL_STATES.to_string(),
                co_pay: "None".to_string(),
                age_eligibility: "31 days and up".to_string(),
                use_and_value_eligibility: "Any value (No value cap)".to_string(),
                special_limits: AFTER_CARE.to_string(),
                exclusions: SURGICAL_EXCLUSIONS.to_string(),
                rates: vec![
                    rate("Any", "Any", "$0", "0%", "$5,000", "$100"),
                    rate("Any", "Any", "$0", "0%", "$10,000", "$200"),
                ],
            },
            InsurancePlan {
                id: "11".to_string(),
                plan_name: "Surgical (Race Horse)".to_string(),
                company: "Accelerant & Hanover".to_string(),
                state_filing_approved: NATIONAL_STATES.to_string(),
                co_pay: "20%".to_string(),
                age_eligibility: "31 days through 20 years".to_string(),
                use_and_value_eligibility: "Race Horse Only".to_string(),
                special_limits: AFTER_CARE.to_string(),
                exclusions: SURGICAL_EXCLUSIONS.to_string(),
                rates: vec![rate("Race Horse", "Race Horse", "$250", "20%", "$5,000", "$200")],
            },
        ])
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn rate(
    horse_category: &str,
    sum_insured: &str,
    deductible: &str,
    co_pay: &str,
    limit: &str,
    premium: &str,
) -> RateOption {
    RateOption {
        horse_category: horse_category.to_string(),
        sum_insured: sum_insured.to_string(),
        deductible: deductible.to_string(),
        co_pay: co_pay.to_string(),
        limit: limit.to_string(),
        premium: premium.to_string(),
        notes: None,
    }
}

fn distinct_in_order<'a>(items: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> PlanFilter {
        PlanFilter::default()
    }

    #[test]
    fn test_default_catalogue() {
        let catalog = PlanCatalog::with_defaults();
        assert_eq!(catalog.plans().len(), 11);
        assert_eq!(catalog.get("4").unwrap().rates.len(), 8);
        assert_eq!(catalog.get("2").unwrap().rates.len(), 6);
        assert_eq!(catalog.companies(), vec!["Accelerant", "Accelerant & Hanover"]);
        assert_eq!(catalog.co_pays(), vec!["None", "20%"]);
    }

    #[test]
    fn test_horse_categories_sorted_and_distinct() {
        let catalog = PlanCatalog::with_defaults();
        assert_eq!(
            catalog.horse_categories(),
            vec!["Any", "Any (excludes Race Horse)", "Race Horse", "Sport Horse", "Western"]
        );
    }

    #[test]
    fn test_state_availability_list() {
        let catalog = PlanCatalog::with_defaults();
        let accident = catalog.get("1").unwrap();
        assert!(accident.is_available_in_state("WV"));
        assert!(accident.is_available_in_state("wa"));
        assert!(!accident.is_available_in_state("CA"));
        // "WA and WV" must not read as North Dakota
        assert!(!accident.is_available_in_state("ND"));
        assert!(accident.is_available_in_state("all"));
    }

    #[test]
    fn test_state_availability_all_except() {
        let plan = InsurancePlan {
            state_filing_approved: "All states except NY, HI & AK".to_string(),
            ..PlanCatalog::with_defaults().get("7").unwrap().clone()
        };
        assert!(!plan.is_available_in_state("NY"));
        assert!(!plan.is_available_in_state("AK"));
        assert!(plan.is_available_in_state("TX"));
    }

    #[test]
    fn test_state_availability_non_ascii_filing() {
        let plan = InsurancePlan {
            state_filing_approved: "ȺȺ all states except ÉÉ, NY".to_string(),
            ..PlanCatalog::with_defaults().get("7").unwrap().clone()
        };
        assert!(!plan.is_available_in_state("NY"));
        assert!(plan.is_available_in_state("TX"));
    }

    #[test]
    fn test_rate_category_matching() {
        assert!(rate_matches_category("Any", "Western"));
        assert!(rate_matches_category("Any", "Race Horse"));
        assert!(!rate_matches_category("Any (excludes Race Horse)", "Race Horse"));
        assert!(!rate_matches_category("Sport Horse", "Western"));
        assert!(rate_matches_category("Sport Horse", "all"));
        assert!(!rate_matches_category("Western", "Any"));
    }

    #[test]
    fn test_filter_by_company_and_copay() {
        let catalog = PlanCatalog::with_defaults();
        let f = PlanFilter {
            company: Some("Accelerant".to_string()),
            co_pay: Some("None".to_string()),
            ..filter()
        };
        let ids: Vec<&str> = catalog.filter(&f).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "10"]);
        assert!(f.is_active());
        assert!(!filter().is_active());
    }

    #[test]
    fn test_filter_by_state_and_search() {
        let catalog = PlanCatalog::with_defaults();
        let in_california = catalog.filter(&PlanFilter {
            state: Some("CA".to_string()),
            ..filter()
        });
        assert_eq!(in_california.len(), 8);

        let colic = catalog.filter(&PlanFilter {
            search: Some("COLIC".to_string()),
            ..filter()
        });
        let names: Vec<&str> = colic.iter().map(|p| p.plan_name.as_str()).collect();
        assert_eq!(names, vec!["Emergency Colic Surgery", "Colic Treatment"]);
    }

    #[test]
    fn test_filter_by_horse_category_includes_any_rates() {
        let catalog = PlanCatalog::with_defaults();
        let race = catalog.filter(&PlanFilter {
            horse_category: Some("Race Horse".to_string()),
            ..filter()
        });
        let ids: Vec<&str> = race.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["4", "5", "6", "7", "8", "10", "11"]);

        let western_rates = catalog.get("2").unwrap().filtered_rates(Some("Western"));
        assert_eq!(western_rates.len(), 3);
    }

    #[test]
    fn test_csv_export_rows() {
        let catalog = PlanCatalog::with_defaults();
        let plans: Vec<&InsurancePlan> = vec![catalog.get("1").unwrap(), catalog.get("7").unwrap()];

        let mut out = Vec::new();
        PlanCatalog::write_csv(&mut out, &plans, None).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("plan_id,plan_name,company"));
        assert!(lines[1].contains("External Accident Major Medical"));
        assert!(lines[3].contains("Included"));
    }

    #[test]
    fn test_state_name_lookup() {
        assert_eq!(state_name("dc"), Some("District of Columbia"));
        assert_eq!(state_name("XX"), None);
    }
}
