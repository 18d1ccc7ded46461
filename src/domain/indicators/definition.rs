//! Risk indicator definitions.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Severity, ValidationError};

/// A named, pre-defined risk pattern.
///
/// Loaded once at startup (built-in table or YAML override) and never mutated
/// at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskIndicatorDefinition {
    /// Unique snake_case name (e.g. "unilateral_termination").
    pub name: String,
    /// Severity when this indicator fires on its own.
    pub severity: Severity,
    /// Risk category (e.g. "data_privacy", "dispute_resolution").
    pub category: String,
    /// Keyword phrases matched by the pattern detector.
    pub phrases: Vec<String>,
    /// Canonical risky exemplar sentences embedded once by the semantic
    /// detector at initialization.
    #[serde(default)]
    pub exemplars: Vec<String>,
}

impl RiskIndicatorDefinition {
    /// Creates a definition, validating that name, category and phrases are
    /// non-empty.
    pub fn new(
        name: impl Into<String>,
        severity: Severity,
        category: impl Into<String>,
        phrases: Vec<String>,
        exemplars: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let category = category.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if category.trim().is_empty() {
            return Err(ValidationError::empty_field("category"));
        }
        if phrases.is_empty() {
            return Err(ValidationError::empty_field("phrases"));
        }
        Ok(Self {
            name,
            severity,
            category,
            phrases,
            exemplars,
        })
    }
}
