// 🐴 Appetite Guide - Rules as Data
// Breed/use appetite by category: eligible, ineligible, or submit to underwriting.
//
// The default dataset is compiled in; an updated guide can be loaded from JSON
// without a rebuild as appetite evolves.

use anyhow::{Context as AnyhowContext, Result as AnyhowResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::{EligibilityError, Result};

pub const UNDERWRITING_EMAIL: &str = "underwriting@basculeuw.com";

// ============================================================================
// STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppetiteStatus {
    Eligible,
    Ineligible,
    #[serde(rename = "UW_SUBMIT")]
    UwSubmit,
    Conditional,
}

impl AppetiteStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AppetiteStatus::Eligible => "Eligible",
            AppetiteStatus::Ineligible => "Ineligible",
            AppetiteStatus::UwSubmit => "Submit to Underwriting",
            AppetiteStatus::Conditional => "Conditional",
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            AppetiteStatus::Eligible => "ELIGIBLE",
            AppetiteStatus::Ineligible => "INELIGIBLE",
            AppetiteStatus::UwSubmit => "UW_SUBMIT",
            AppetiteStatus::Conditional => "CONDITIONAL",
        }
    }
}

// ============================================================================
// DATASET
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppetiteRule {
    pub label: String,
    pub status: AppetiteStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppetiteCategory {
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub rules: Vec<AppetiteRule>,
}

/// A rule together with the category it was found under
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppetiteSelection<'a> {
    pub category: &'a str,
    pub rule: &'a AppetiteRule,
}

impl AppetiteSelection<'_> {
    /// Plain-text summary for copying into notes or email
    pub fn printable_summary(&self) -> String {
        format!(
            "Category: {}\nUse/Breed: {}\nStatus: {}\nNotes: {}",
            self.category,
            self.rule.label,
            self.rule.status.label(),
            self.rule.note.as_deref().unwrap_or("—"),
        )
    }

    /// Pre-filled email to underwriting for this risk
    pub fn underwriting_mailto(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            UNDERWRITING_EMAIL,
            urlencoding::encode(&format!("Submit for UW: {}", self.rule.label)),
            urlencoding::encode(&self.printable_summary()),
        )
    }
}

pub struct AppetiteGuide {
    categories: Vec<AppetiteCategory>,
}

impl AppetiteGuide {
    pub fn new(categories: Vec<AppetiteCategory>) -> Self {
        AppetiteGuide { categories }
    }

    /// Load a guide from a JSON array of categories
    pub fn from_file<P: AsRef<Path>>(path: P) -> AnyhowResult<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read appetite file: {:?}", path.as_ref()))?;

        let categories: Vec<AppetiteCategory> = serde_json::from_str(&content)
            .context("Failed to parse appetite JSON")?;

        info!(
            categories = categories.len(),
            path = %path.as_ref().display(),
            "loaded appetite guide"
        );
        Ok(AppetiteGuide::new(categories))
    }

    pub fn categories(&self) -> &[AppetiteCategory] {
        &self.categories
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.category.as_str()).collect()
    }

    pub fn rule_count(&self) -> usize {
        self.categories.iter().map(|c| c.rules.len()).sum()
    }

    /// Case-insensitive filter over category names and rule labels.
    ///
    /// A category whose name matches keeps all its rules. Categories left
    /// with no rules are dropped. `category` restricts to one exact name.
    pub fn search(&self, query: &str, category: Option<&str>) -> Vec<AppetiteCategory> {
        let q = query.trim().to_lowercase();

        self.categories
            .iter()
            .filter(|cat| category.map_or(true, |name| cat.category == name))
            .filter_map(|cat| {
                let rules: Vec<AppetiteRule> = cat
                    .rules
                    .iter()
                    .filter(|rule| {
                        q.is_empty()
                            || cat.category.to_lowercase().contains(&q)
                            || rule.label.to_lowercase().contains(&q)
                    })
                    .cloned()
                    .collect();

                if rules.is_empty() {
                    None
                } else {
                    Some(AppetiteCategory {
                        category: cat.category.clone(),
                        notes: cat.notes.clone(),
                        rules,
                    })
                }
            })
            .collect()
    }

    pub fn lookup(&self, category: &str, rule: &str) -> Result<AppetiteSelection<'_>> {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .and_then(|c| {
                c.rules.iter().find(|r| r.label == rule).map(|r| AppetiteSelection {
                    category: c.category.as_str(),
                    rule: r,
                })
            })
            .ok_or_else(|| EligibilityError::UnknownAppetiteEntry {
                category: category.to_string(),
                rule: rule.to_string(),
            })
    }

    /// Built-in mortality appetite guide
    pub fn with_defaults() -> Self {
        use AppetiteStatus::{Eligible, Ineligible, UwSubmit};

        AppetiteGuide::new(vec![
            category(
                "Western",
                Some("Performance uses should be specified."),
                vec![
                    rule("Cutting", Eligible, None),
                    rule("Reining", Eligible, None),
                    rule("Ranch Versatility", Eligible, None),
                    rule("Ranch", Eligible, None),
                    rule("Roping", Eligible, None),
                    rule("Steer Wrestling", Eligible, None),
                    rule("Trail Riding", Eligible, None),
                    rule("Barrel Racing", Eligible, None),
                    rule("Performance (specify use)", Eligible, None),
                    rule("Halter", Ineligible, None),
                    rule("Western Pleasure Show (Appaloosa / QH / Paint)", Ineligible, None),
                ],
            ),
            category(
                "Sport Horse (incl. Thoroughbred)",
                None,
                vec![
                    rule("Hunters", Eligible, None),
                    rule("Jumpers", Eligible, None),
                    rule("Dressage", Eligible, None),
                    rule("Foxhunting", Eligible, None),
                    rule("Eventing", Eligible, None),
                    rule("Combined Driving", Eligible, None),
                    rule("Polo", Eligible, None),
                    rule("TB Breeding", Ineligible, None),
                    rule("Racing (Non-QH)", Ineligible, None),
                    rule("Bloodstock (Rearing / Yearlings)", Ineligible, None),
                ],
            ),
            category(
                "Breed-Specific Show Horses",
                None,
                vec![
                    rule("Saddlebred", Eligible, None),
                    rule("Arabian", Eligible, None),
                    rule("Morgan", Eligible, None),
                    rule("Racking Horse", Ineligible, None),
                    rule("Paso Fino", Ineligible, None),
                    rule("Non-flat Shod Horses", Ineligible, None),
                    rule("Miniature Horse", Ineligible, None),
                    rule("Donkey", Ineligible, None),
                    rule("Mule", Ineligible, None),
                    rule("Tennessee Walker", Ineligible, None),
                    rule(
                        "Friesian (pleasure / breeding)",
                        Ineligible,
                        Some("USEF Dressage use may be acceptable — see Pleasure/Sport rules"),
                    ),
                ],
            ),
            category("Ponies", None, vec![rule("All Types", Eligible, None)]),
            category(
                "Draft Horses (Under Saddle)",
                None,
                vec![
                    rule(
                        "Under Saddle (non-utility)",
                        UwSubmit,
                        Some("Submit for approval prior to binding; clean loss history required."),
                    ),
                    rule("Utility / Pulling / Farm Work", Ineligible, None),
                    rule("Amish Cart / Farm (Standardbred, Draft)", Ineligible, None),
                ],
            ),
            category(
                "Breeding Horses",
                None,
                vec![
                    rule("Broodmare (≥60 days post-foaling)", Eligible, None),
                    rule("Due to foal within 3 months (not currently insured)", Ineligible, None),
                ],
            ),
            category(
                "Pleasure Horses",
                None,
                vec![
                    rule("Show Driving", Eligible, None),
                    rule("Trail Riding", Eligible, None),
                    rule("Spanish Dancing Horses", Ineligible, None),
                    rule("Parade Horses", Ineligible, None),
                    rule(
                        "Friesian (USEF Dressage)",
                        Eligible,
                        Some("Per Sport/Dressage appetite; confirm use and show level."),
                    ),
                ],
            ),
            category(
                "Mounted Activities",
                None,
                vec![
                    rule("Mounted Shooting", Ineligible, Some("Not eligible.")),
                    rule("Mounted Patrol", Ineligible, Some("Not eligible.")),
                ],
            ),
            category(
                "Quarter Horse Racing",
                None,
                vec![
                    rule("Racing ≤ $50,000 value", Eligible, None),
                    rule("Racing > $50,000 value", UwSubmit, Some("Submit to UW.")),
                ],
            ),
        ])
    }
}

impl Default for AppetiteGuide {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn category(name: &str, notes: Option<&str>, rules: Vec<AppetiteRule>) -> AppetiteCategory {
    AppetiteCategory {
        category: name.to_string(),
        notes: notes.map(str::to_string),
        rules,
    }
}

fn rule(label: &str, status: AppetiteStatus, note: Option<&str>) -> AppetiteRule {
    AppetiteRule {
        label: label.to_string(),
        status,
        note: note.map(str::to_string),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_guide_shape() {
        let guide = AppetiteGuide::with_defaults();
        assert_eq!(guide.categories().len(), 9);
        assert_eq!(guide.category_names()[0], "Western");
        assert_eq!(guide.rule_count(), 47);
    }

    #[test]
    fn test_search_matches_rule_labels_case_insensitively() {
        let guide = AppetiteGuide::with_defaults();
        let hits = guide.search("DRESSAGE", None);

        let names: Vec<&str> = hits.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(
            names,
            vec!["Sport Horse (incl. Thoroughbred)", "Pleasure Horses"]
        );
        assert!(hits.iter().all(|c| c.rules.len() == 1));
    }

    #[test]
    fn test_search_on_category_name_keeps_all_rules() {
        let guide = AppetiteGuide::with_defaults();
        let hits = guide.search("draft", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].rules.len(), 3);
    }

    #[test]
    fn test_search_with_category_filter() {
        let guide = AppetiteGuide::with_defaults();
        let hits = guide.search("trail", Some("Pleasure Horses"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].rules[0].label, "Trail Riding");

        assert!(guide.search("", Some("Nope")).is_empty());
        assert_eq!(guide.search("", None).len(), 9);
    }

    #[test]
    fn test_lookup_and_summary() {
        let guide = AppetiteGuide::with_defaults();
        let sel = guide
            .lookup("Draft Horses (Under Saddle)", "Under Saddle (non-utility)")
            .unwrap();
        assert_eq!(sel.rule.status, AppetiteStatus::UwSubmit);

        let summary = sel.printable_summary();
        assert!(summary.contains("Status: Submit to Underwriting"));
        assert!(summary.contains("clean loss history"));

        let mailto = sel.underwriting_mailto();
        assert!(mailto.starts_with("mailto:underwriting@basculeuw.com?subject=Submit%20for%20UW%3A%20"));
        assert!(!mailto.contains('\n'));
    }

    #[test]
    fn test_lookup_unknown_entry() {
        let guide = AppetiteGuide::with_defaults();
        let err = guide.lookup("Western", "Bucking").unwrap_err();
        assert!(matches!(err, EligibilityError::UnknownAppetiteEntry { .. }));
    }

    #[test]
    fn test_status_wire_keys() {
        assert_eq!(
            serde_json::to_string(&AppetiteStatus::UwSubmit).unwrap(),
            "\"UW_SUBMIT\""
        );
        let s: AppetiteStatus = serde_json::from_str("\"INELIGIBLE\"").unwrap();
        assert_eq!(s, AppetiteStatus::Ineligible);
    }

    #[test]
    fn test_from_file_round_trip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = r#"[
            {"category": "Ponies", "rules": [{"label": "All Types", "status": "ELIGIBLE"}]},
            {"category": "Mules", "notes": "new", "rules": [{"label": "Any", "status": "CONDITIONAL", "note": "ask"}]}
        ]"#;
        file.write_all(json.as_bytes()).unwrap();

        let guide = AppetiteGuide::from_file(file.path()).unwrap();
        assert_eq!(guide.rule_count(), 2);
        let sel = guide.lookup("Mules", "Any").unwrap();
        assert_eq!(sel.rule.status, AppetiteStatus::Conditional);
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        let err = AppetiteGuide::from_file(file.path()).err().unwrap();
        assert!(err.to_string().contains("Failed to parse appetite JSON"));
    }
}
