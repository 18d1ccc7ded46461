//! The compound pattern library - named multi-indicator combinations.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Severity, ValidationError};

/// A named combination of indicators forming a systemic risk.
///
/// The pattern fires iff every `required` indicator is present in the
/// document's finding set; `optional` indicators raise the confidence when
/// matched but are never necessary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundRiskPattern {
    pub pattern_id: String,
    pub required: Vec<String>,
    pub optional: Vec<String>,
    /// Typical severity of the constituents on their own.
    pub base_severity: Severity,
    /// Severity of the synthesized compound finding.
    pub compound_severity: Severity,
    /// Score amplifier applied by the ranker via the compound bonus path.
    pub risk_multiplier: f64,
    pub explanation: String,
    pub recommendation: String,
}

/// Lookup over the static compound pattern table.
#[derive(Debug, Clone)]
pub struct CompoundPatternLibrary {
    patterns: Vec<CompoundRiskPattern>,
}

impl CompoundPatternLibrary {
    /// Builds a library from a list of patterns.
    ///
    /// Duplicate ids and patterns with no required indicators are rejected.
    pub fn new(patterns: Vec<CompoundRiskPattern>) -> Result<Self, ValidationError> {
        let mut seen = std::collections::HashSet::new();
        for pattern in &patterns {
            if pattern.required.is_empty() {
                return Err(ValidationError::empty_field("required"));
            }
            if !seen.insert(pattern.pattern_id.clone()) {
                return Err(ValidationError::invalid_format(
                    "patterns",
                    format!("duplicate pattern id '{}'", pattern.pattern_id),
                ));
            }
        }
        Ok(Self { patterns })
    }

    /// The built-in pattern table shipped with the crate.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Loads a library from a YAML table (list of patterns).
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ValidationError> {
        let patterns: Vec<CompoundRiskPattern> = serde_yaml::from_str(yaml)
            .map_err(|e| ValidationError::invalid_format("patterns_yaml", e.to_string()))?;
        Self::new(patterns)
    }

    /// All patterns in definition order.
    pub fn all(&self) -> &[CompoundRiskPattern] {
        &self.patterns
    }

    /// Looks up a pattern by id.
    pub fn get(&self, pattern_id: &str) -> Option<&CompoundRiskPattern> {
        self.patterns.iter().find(|p| p.pattern_id == pattern_id)
    }

    /// Number of patterns in the table.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn pattern(
    pattern_id: &str,
    required: &[&str],
    optional: &[&str],
    base_severity: Severity,
    compound_severity: Severity,
    risk_multiplier: f64,
    explanation: &str,
    recommendation: &str,
) -> CompoundRiskPattern {
    CompoundRiskPattern {
        pattern_id: pattern_id.to_string(),
        required: required.iter().map(|s| s.to_string()).collect(),
        optional: optional.iter().map(|s| s.to_string()).collect(),
        base_severity,
        compound_severity,
        risk_multiplier,
        explanation: explanation.to_string(),
        recommendation: recommendation.to_string(),
    }
}

static BUILTIN: Lazy<CompoundPatternLibrary> = Lazy::new(|| {
    let patterns = vec![
        pattern(
            "lock_in_trap",
            &["auto_renewal", "no_refunds"],
            &["difficult_cancellation", "price_increase", "cancellation_fee"],
            Severity::Medium,
            Severity::Critical,
            1.5,
            "The subscription renews automatically, payments are non-refundable, \
             and leaving is made costly or cumbersome. Together these terms trap \
             subscribers into continued payment.",
            "Before subscribing, set a reminder ahead of the renewal date and \
             confirm the exact cancellation steps in writing.",
        ),
        pattern(
            "data_harvesting",
            &["data_sharing_third_party", "data_retention_indefinite"],
            &["data_sale", "content_license_broad"],
            Severity::Medium,
            Severity::Critical,
            1.5,
            "Personal data is shared with third parties and retained without \
             limit, so information handed over once can circulate indefinitely \
             beyond this provider.",
            "Limit the personal information you provide and request deletion \
             of your data when you stop using the service.",
        ),
        pattern(
            "liability_shield",
            &["liability_waiver", "indemnification"],
            &["warranty_disclaimer", "jurisdiction_foreign"],
            Severity::Medium,
            Severity::High,
            1.3,
            "The provider disclaims its own liability while requiring you to \
             cover its legal costs, shifting essentially all risk of the \
             relationship onto you.",
            "Check whether your local consumer protection law overrides these \
             clauses before relying on the service for anything important.",
        ),
        pattern(
            "no_recourse",
            &["binding_arbitration", "class_action_waiver"],
            &["jurisdiction_foreign", "unilateral_changes"],
            Severity::High,
            Severity::Critical,
            1.5,
            "Disputes must go to individual arbitration and collective action \
             is waived, leaving no practical remedy for small-dollar harms \
             affecting many users.",
            "Look for an arbitration opt-out window in the terms; many \
             agreements allow opting out within 30 days of acceptance.",
        ),
        pattern(
            "content_grab",
            &["content_license_broad", "unilateral_changes"],
            &["data_sale", "unilateral_termination"],
            Severity::Medium,
            Severity::High,
            1.3,
            "The provider takes a sweeping license to your content and \
             reserves the right to rewrite the terms at will, so the scope of \
             that license can expand after you upload.",
            "Keep original copies of anything you upload and avoid posting \
             content you may want to commercialize elsewhere.",
        ),
    ];

    CompoundPatternLibrary::new(patterns).expect("built-in pattern table must be valid")
});
