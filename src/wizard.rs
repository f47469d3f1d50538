// 🧭 Wizard State - Type → Value → Use → Age → Preferences → Results
//
// The step machine is held by the caller (TUI, tests, server clients).
// Nothing here is global; the engine is called fresh from `outcome()`.

use serde::Serialize;

use crate::coverage::CoverageSet;
use crate::engine::evaluate_discipline;
use crate::error::Result;
use crate::ranker::{rank, PreferenceSet, RecommendationResult};
use crate::reference::{AgeBand, Category, Discipline, InsuredValue, Preference, Use};
use crate::summary::{EligibilitySummary, ValueStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Step {
    Category,
    Value,
    Use,
    Age,
    Preferences,
    Results,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::Category,
        Step::Value,
        Step::Use,
        Step::Age,
        Step::Preferences,
        Step::Results,
    ];

    pub fn next(&self) -> Self {
        match self {
            Step::Category => Step::Value,
            Step::Value => Step::Use,
            Step::Use => Step::Age,
            Step::Age => Step::Preferences,
            Step::Preferences | Step::Results => Step::Results,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Step::Category | Step::Value => Step::Category,
            Step::Use => Step::Value,
            Step::Age => Step::Use,
            Step::Preferences => Step::Age,
            Step::Results => Step::Preferences,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::Category => "Type",
            Step::Value => "Value",
            Step::Use => "Use",
            Step::Age => "Age",
            Step::Preferences => "Preferences",
            Step::Results => "Results",
        }
    }

    /// 1-based position for progress display
    pub fn number(&self) -> usize {
        Step::ALL.iter().position(|s| s == self).map_or(1, |i| i + 1)
    }
}

/// Everything the results step shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WizardOutcome {
    pub category: Category,
    #[serde(rename = "use")]
    pub use_: Use,
    pub age: AgeBand,
    pub value: InsuredValue,
    pub coverage: CoverageSet,
    pub recommendations: RecommendationResult,
    pub summary: EligibilitySummary,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    step: Step,
    category: Option<Category>,
    value_input: String,
    use_: Option<Use>,
    age: Option<AgeBand>,
    preferences: PreferenceSet,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Wizard {
            step: Step::Category,
            category: None,
            value_input: String::new(),
            use_: None,
            age: None,
            preferences: PreferenceSet::new(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn use_(&self) -> Option<Use> {
        self.use_
    }

    pub fn age(&self) -> Option<AgeBand> {
        self.age
    }

    pub fn preferences(&self) -> &PreferenceSet {
        &self.preferences
    }

    pub fn value_input(&self) -> &str {
        &self.value_input
    }

    pub fn value(&self) -> InsuredValue {
        InsuredValue::parse(&self.value_input)
    }

    pub fn value_status(&self) -> Option<ValueStatus> {
        ValueStatus::assess(&self.value_input, self.value())
    }

    /// Uses for the selected category; empty before one is chosen
    pub fn available_uses(&self) -> &'static [Use] {
        self.category.map(|c| c.uses()).unwrap_or(&[])
    }

    // ========================================================================
    // SELECTIONS
    // ========================================================================

    /// A previously chosen use from the other category is dropped.
    pub fn select_category(&mut self, category: Category) {
        self.category = Some(category);
        if self.use_.is_some_and(|u| u.category() != category) {
            self.use_ = None;
        }
    }

    pub fn set_value_input(&mut self, raw: impl Into<String>) {
        self.value_input = raw.into();
    }

    pub fn push_value_char(&mut self, ch: char) {
        self.value_input.push(ch);
    }

    pub fn pop_value_char(&mut self) {
        self.value_input.pop();
    }

    /// Without a category yet, the use's own category is adopted.
    pub fn select_use(&mut self, use_: Use) -> Result<()> {
        match self.category {
            Some(category) => {
                Discipline::new(category, use_)?;
            }
            None => self.category = Some(use_.category()),
        }
        self.use_ = Some(use_);
        Ok(())
    }

    pub fn select_age(&mut self, age: AgeBand) {
        self.age = Some(age);
    }

    pub fn toggle_preference(&mut self, pref: Preference) {
        self.preferences.toggle(pref);
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    pub fn can_advance(&self) -> bool {
        match self.step {
            Step::Category => self.category.is_some(),
            Step::Value => self.value_status().is_some_and(|s| !s.is_error()),
            Step::Use => self.use_.is_some(),
            Step::Age => self.age.is_some(),
            Step::Preferences => !self.preferences.is_empty(),
            Step::Results => false,
        }
    }

    /// Moves forward when the current step is complete. Returns whether it moved.
    pub fn advance(&mut self) -> bool {
        if !self.can_advance() {
            return false;
        }
        self.step = self.step.next();
        true
    }

    pub fn back(&mut self) {
        self.step = self.step.previous();
    }

    pub fn reset(&mut self) {
        *self = Wizard::new();
    }

    // ========================================================================
    // OUTCOME
    // ========================================================================

    /// Evaluation for the current answers, once category, use and age are set.
    pub fn outcome(&self) -> Option<WizardOutcome> {
        let category = self.category?;
        let use_ = self.use_?;
        let age = self.age?;
        let discipline = Discipline::new(category, use_).ok()?;
        let value = self.value();

        let coverage = evaluate_discipline(discipline, value, age);
        let recommendations = rank(&coverage, &self.preferences, discipline);
        let summary = EligibilitySummary::from_coverage(&coverage, discipline, value);

        Some(WizardOutcome {
            category,
            use_,
            age,
            value,
            coverage,
            recommendations,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk_to_results(w: &mut Wizard) {
        w.select_category(Category::Sport);
        assert!(w.advance());
        w.set_value_input("$60,000");
        assert!(w.advance());
        w.select_use(Use::Dressage).unwrap();
        assert!(w.advance());
        w.select_age(AgeBand::Age31dTo20y);
        assert!(w.advance());
        w.toggle_preference(Preference::BroadCoverage);
        assert!(w.advance());
    }

    #[test]
    fn test_full_walk_produces_outcome() {
        let mut w = Wizard::new();
        walk_to_results(&mut w);
        assert_eq!(w.step(), Step::Results);

        let outcome = w.outcome().unwrap();
        assert!(outcome.coverage.classic);
        assert_eq!(outcome.recommendations.primary.len(), 2);
        assert_eq!(outcome.summary.major_medical.len(), 4);
    }

    #[test]
    fn test_steps_are_gated() {
        let mut w = Wizard::new();
        assert!(!w.advance());
        w.select_category(Category::Western);
        assert!(w.advance());

        assert!(!w.advance(), "empty value blocks");
        w.set_value_input("abc");
        assert!(!w.advance(), "unreadable value blocks");
        w.set_value_input("5000");
        assert!(w.advance(), "under 20k is informational only");
    }

    #[test]
    fn test_preferences_required_before_results() {
        let mut w = Wizard::new();
        walk_to_results(&mut w);
        w.back();
        assert_eq!(w.step(), Step::Preferences);
        w.toggle_preference(Preference::BroadCoverage);
        assert!(!w.can_advance());
    }

    #[test]
    fn test_changing_category_drops_foreign_use() {
        let mut w = Wizard::new();
        w.select_category(Category::Sport);
        w.select_use(Use::Eventing).unwrap();
        w.select_category(Category::Sport);
        assert_eq!(w.use_(), Some(Use::Eventing));
        w.select_category(Category::Western);
        assert_eq!(w.use_(), None);
        assert_eq!(w.available_uses(), Category::Western.uses());
    }

    #[test]
    fn test_select_use_rejects_other_category() {
        let mut w = Wizard::new();
        w.select_category(Category::Western);
        assert!(w.select_use(Use::Dressage).is_err());
        assert_eq!(w.use_(), None);
    }

    #[test]
    fn test_reset_returns_to_start() {
        let mut w = Wizard::new();
        walk_to_results(&mut w);
        w.reset();
        assert_eq!(w.step(), Step::Category);
        assert!(w.outcome().is_none());
        assert!(w.preferences().is_empty());
    }

    #[test]
    fn test_step_numbers() {
        assert_eq!(Step::Category.number(), 1);
        assert_eq!(Step::Results.number(), 6);
        assert_eq!(Step::Results.next(), Step::Results);
        assert_eq!(Step::Category.previous(), Step::Category);
    }
}
