// Equine Eligibility - Core Library
// Coverage eligibility rules for equine medical products, shared by the CLI,
// the TUI wizard, the HTTP server and tests.

pub mod error;
pub mod reference;      // Reference Tables - categories, uses, age bands, thresholds
pub mod coverage;       // CoverageKind + CoverageSet
pub mod engine;         // Eligibility Engine - three-stage evaluation
pub mod ranker;         // Recommendation Ranker - preferences over a CoverageSet
pub mod summary;        // Result Summary - display derivations
pub mod wizard;         // Wizard State - caller-held step machine
pub mod appetite;       // Appetite Guide - breed/use appetite as data
pub mod plans;          // Product Explorer - plan catalogue + filters
pub mod report;         // Evaluation Report - JSON document + text summary
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{EligibilityError, Result};
pub use reference::{
    AgeBand, Category, Discipline, InsuredValue, Preference, SportUse, Use, WesternUse,
    reference_fingerprint, REFERENCE_VERSION,
    MAJOR_MEDICAL_MIN_VALUE, DRESSAGE_MAJOR_MEDICAL_MIN_VALUE, CLASSIC_NO_COINSURANCE_MIN_VALUE,
};
pub use coverage::{CoverageKind, CoverageSet};
pub use engine::{evaluate, evaluate_discipline};
pub use ranker::{rank, PreferenceSet, Recommendation, RecommendationResult};
pub use summary::{format_usd, EligibilitySummary, StatusLevel, ValueStatus};
pub use wizard::{Step, Wizard, WizardOutcome};
pub use appetite::{
    AppetiteCategory, AppetiteGuide, AppetiteRule, AppetiteSelection, AppetiteStatus,
};
pub use plans::{InsurancePlan, PlanCatalog, PlanFilter, RateOption};
pub use report::{EvaluationReport, EvaluationRequest, Priority, ReportRecommendation};
pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
