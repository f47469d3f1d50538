// ⚠️ Errors - invalid caller input
// Everything the core rejects is a caller-input problem; nothing here is retried.

use thiserror::Error;

use crate::reference::{Category, Use};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EligibilityError {
    #[error("Use '{}' does not belong to category '{}'", use_.key(), category.key())]
    UseCategoryMismatch { category: Category, use_: Use },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown use: {0}")]
    UnknownUse(String),

    #[error("Unknown age band: {0}")]
    UnknownAgeBand(String),

    #[error("Unknown preference: {0}")]
    UnknownPreference(String),

    #[error("Invalid insured value {0}: must be finite and non-negative")]
    InvalidValue(f64),

    #[error("Invalid evaluation JSON: {0}")]
    ReportParse(String),

    #[error("No appetite entry for {category} / {rule}")]
    UnknownAppetiteEntry { category: String, rule: String },
}

impl EligibilityError {
    /// True for errors raised by the `(category, use, value, age)` contract.
    pub fn is_invalid_input(&self) -> bool {
        !matches!(
            self,
            Self::ReportParse(_) | Self::UnknownAppetiteEntry { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EligibilityError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{Category, Use};

    #[test]
    fn test_mismatch_message_uses_wire_keys() {
        let err = EligibilityError::UseCategoryMismatch {
            category: Category::Western,
            use_: Use::Dressage,
        };
        assert_eq!(
            err.to_string(),
            "Use 'dressage' does not belong to category 'western'"
        );
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_report_parse_is_not_input_error() {
        let err = EligibilityError::ReportParse("expected value".to_string());
        assert!(!err.is_invalid_input());
        assert!(err.to_string().starts_with("Invalid evaluation JSON"));
    }
}
