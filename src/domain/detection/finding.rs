//! Findings - merged detections with provenance.
//!
//! A finding is the unit that flows through Stages 2-6. The variant carries
//! method-specific evidence behind an explicit discriminant; shared fields
//! (indicator, severity, confidence, provenance) live on the struct itself.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Confidence, FindingId, Severity};

use super::DetectionMethod;

/// Evidence variant for a finding, selected by explicit discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FindingKind {
    /// Keyword match from the pattern detector.
    Pattern {
        matched_phrase: String,
    },
    /// Embedding similarity from the semantic detector.
    Semantic {
        similarity: f64,
    },
    /// Baseline deviation from the statistical detector.
    Statistical {
        anomaly_score: f64,
    },
    /// Document-level systemic risk synthesized by the compound detector.
    Compound {
        pattern_id: String,
        /// Ids of every contributing original finding, for traceability.
        constituents: Vec<FindingId>,
        explanation: String,
        recommendation: String,
    },
}

/// A candidate risk detection tied to one clause and one indicator
/// (or, for compound findings, to the whole document).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Stable identifier, referenced by feedback records.
    pub id: FindingId,
    /// Clause index within the document; `None` for document-level compound
    /// findings.
    pub clause_index: Option<usize>,
    /// Section the clause appeared under.
    pub section: String,
    /// Clause text (or synthesized summary for compound findings).
    pub excerpt: String,
    /// Indicator name, or the compound pattern id.
    pub indicator: String,
    /// Risk category.
    pub category: String,
    /// Severity of the finding.
    pub severity: Severity,
    /// Highest raw confidence across contributing methods.
    pub raw_confidence: Confidence,
    /// Every method that flagged this clause+indicator.
    pub methods: Vec<DetectionMethod>,
    /// Evidence from the winning (highest-score) method.
    pub kind: FindingKind,
}

impl Finding {
    /// True if this finding was synthesized by the compound risk detector.
    pub fn is_compound(&self) -> bool {
        matches!(self.kind, FindingKind::Compound { .. })
    }

    /// Constituent finding ids for compound findings, empty otherwise.
    pub fn constituents(&self) -> &[FindingId] {
        match &self.kind {
            FindingKind::Compound { constituents, .. } => constituents,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern_finding() -> Finding {
        Finding {
            id: FindingId::new(),
            clause_index: Some(0),
            section: "1".into(),
            excerpt: "No refunds.".into(),
            indicator: "no_refunds".into(),
            category: "refunds".into(),
            severity: Severity::High,
            raw_confidence: Confidence::new(0.9),
            methods: vec![DetectionMethod::Pattern],
            kind: FindingKind::Pattern {
                matched_phrase: "no refunds".into(),
            },
        }
    }

    #[test]
    fn pattern_finding_is_not_compound() {
        let f = pattern_finding();
        assert!(!f.is_compound());
        assert!(f.constituents().is_empty());
    }

    #[test]
    fn compound_finding_exposes_constituents() {
        let a = FindingId::new();
        let b = FindingId::new();
        let f = Finding {
            id: FindingId::new(),
            clause_index: None,
            section: String::new(),
            excerpt: "Lock-in trap".into(),
            indicator: "lock_in_trap".into(),
            category: "systemic".into(),
            severity: Severity::Critical,
            raw_confidence: Confidence::new(0.8),
            methods: vec![],
            kind: FindingKind::Compound {
                pattern_id: "lock_in_trap".into(),
                constituents: vec![a, b],
                explanation: "x".into(),
                recommendation: "y".into(),
            },
        };
        assert!(f.is_compound());
        assert_eq!(f.constituents(), &[a, b]);
    }

    #[test]
    fn finding_kind_serializes_with_discriminant() {
        let f = pattern_finding();
        let json = serde_json::to_string(&f.kind).unwrap();
        assert!(json.contains("\"kind\":\"pattern\""));
    }
}
