//! Severity levels for risk indicators and findings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a detected risk is.
///
/// Indicators in the static taxonomy use `Low` through `High`; `Critical` is
/// reserved for synthesized compound risks where several indicators combine
/// into a systemic pattern.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Weight used by the alert ranker's score formula.
    pub fn weight(&self) -> f64 {
        match self {
            Severity::Low => 1.0,
            Severity::Medium => 2.0,
            Severity::High => 3.0,
            Severity::Critical => 4.0,
        }
    }

    /// Returns the display label for this severity.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_low_to_critical() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn severity_weights_match_rank_formula() {
        assert_eq!(Severity::Low.weight(), 1.0);
        assert_eq!(Severity::Medium.weight(), 2.0);
        assert_eq!(Severity::High.weight(), 3.0);
        assert_eq!(Severity::Critical.weight(), 4.0);
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::High).unwrap();
        assert_eq!(json, "\"high\"");
    }

    #[test]
    fn max_of_members_is_overall() {
        let severities = [Severity::Low, Severity::High, Severity::Medium];
        assert_eq!(severities.iter().max(), Some(&Severity::High));
    }
}
