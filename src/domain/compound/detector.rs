//! Compound risk detection over a document's clustered findings.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::domain::clustering::ClusterSummary;
use crate::domain::detection::{Finding, FindingKind};
use crate::domain::foundation::{Confidence, FindingId};

use super::pattern::{CompoundPatternLibrary, CompoundRiskPattern};

/// Confidence floor when only the required indicators matched.
const BASE_CONFIDENCE: f64 = 0.70;

/// Confidence added per matched optional indicator.
const OPTIONAL_STEP: f64 = 0.05;

/// Total confidence headroom above the floor.
const OPTIONAL_CAP: f64 = 0.30;

/// Stage-4 detector matching the document's indicator set against the
/// compound pattern library.
pub struct CompoundRiskDetector {
    library: CompoundPatternLibrary,
}

impl CompoundRiskDetector {
    pub fn new(library: CompoundPatternLibrary) -> Self {
        Self { library }
    }

    /// Synthesizes one document-level finding per pattern whose required
    /// indicators are all present among `clusters`.
    pub fn detect(&self, clusters: &[ClusterSummary]) -> Vec<Finding> {
        // Every finding id per indicator, in cluster order.
        let mut by_indicator: HashMap<&str, Vec<FindingId>> = HashMap::new();
        for cluster in clusters {
            for member in &cluster.members {
                by_indicator
                    .entry(member.finding.indicator.as_str())
                    .or_default()
                    .push(member.finding.id);
            }
        }

        let mut synthesized = Vec::new();
        for pattern in self.library.all() {
            if let Some(finding) = self.try_pattern(pattern, &by_indicator) {
                debug!(pattern = %pattern.pattern_id, "compound pattern fired");
                synthesized.push(finding);
            }
        }
        synthesized
    }

    fn try_pattern(
        &self,
        pattern: &CompoundRiskPattern,
        by_indicator: &HashMap<&str, Vec<FindingId>>,
    ) -> Option<Finding> {
        if !pattern
            .required
            .iter()
            .all(|name| by_indicator.contains_key(name.as_str()))
        {
            return None;
        }

        let matched_optional = pattern
            .optional
            .iter()
            .filter(|name| by_indicator.contains_key(name.as_str()))
            .count();
        let confidence =
            BASE_CONFIDENCE + (OPTIONAL_STEP * matched_optional as f64).min(OPTIONAL_CAP);

        // Back-reference every contributing finding, deduplicated, in
        // required-then-optional order.
        let mut seen = HashSet::new();
        let mut constituents = Vec::new();
        for name in pattern.required.iter().chain(pattern.optional.iter()) {
            if let Some(ids) = by_indicator.get(name.as_str()) {
                for &id in ids {
                    if seen.insert(id) {
                        constituents.push(id);
                    }
                }
            }
        }

        let matched_names: Vec<&str> = pattern
            .required
            .iter()
            .chain(pattern.optional.iter())
            .filter(|name| by_indicator.contains_key(name.as_str()))
            .map(String::as_str)
            .collect();
        let excerpt = format!(
            "Combined risk across {} clauses: {}",
            constituents.len(),
            matched_names.join(", ")
        );

        Some(Finding {
            id: FindingId::new(),
            clause_index: None,
            section: "document".into(),
            excerpt,
            indicator: pattern.pattern_id.clone(),
            category: "compound_risk".into(),
            severity: pattern.compound_severity,
            raw_confidence: Confidence::new(confidence),
            methods: Vec::new(),
            kind: FindingKind::Compound {
                pattern_id: pattern.pattern_id.clone(),
                constituents,
                explanation: pattern.explanation.clone(),
                recommendation: pattern.recommendation.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::ContextualFinding;
    use crate::domain::detection::DetectionMethod;
    use crate::domain::foundation::Severity;

    fn cluster_for(indicator: &str, id: usize) -> ClusterSummary {
        let member = ContextualFinding {
            finding: Finding {
                id: FindingId::new(),
                clause_index: Some(id),
                section: format!("{}", id + 1),
                excerpt: format!("Clause about {}.", indicator),
                indicator: indicator.into(),
                category: "test".into(),
                severity: Severity::Medium,
                raw_confidence: Confidence::new(0.8),
                methods: vec![DetectionMethod::Pattern],
                kind: FindingKind::Pattern {
                    matched_phrase: indicator.replace('_', " "),
                },
            },
            context_score: 0.5,
            keep: true,
            disclosure_required: false,
            adjusted_score: 2.0,
            kept_by: vec![],
            flags: vec![],
        };
        ClusterSummary::from_members(id, vec![member], false)
    }

    fn clusters_for(indicators: &[&str]) -> Vec<ClusterSummary> {
        indicators
            .iter()
            .enumerate()
            .map(|(i, name)| cluster_for(name, i))
            .collect()
    }

    fn detector() -> CompoundRiskDetector {
        CompoundRiskDetector::new(CompoundPatternLibrary::builtin())
    }

    #[test]
    fn fires_when_all_required_present() {
        let findings = detector().detect(&clusters_for(&["auto_renewal", "no_refunds"]));
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.indicator, "lock_in_trap");
        assert!(f.is_compound());
        assert_eq!(f.severity, Severity::Critical);
        assert!((f.raw_confidence.value() - 0.70).abs() < 1e-9);
        assert_eq!(f.constituents().len(), 2);
    }

    #[test]
    fn does_not_fire_with_missing_required() {
        let findings = detector().detect(&clusters_for(&["auto_renewal", "price_increase"]));
        assert!(findings.is_empty());
    }

    #[test]
    fn optional_indicators_raise_confidence_monotonically() {
        let base = detector().detect(&clusters_for(&["auto_renewal", "no_refunds"]));
        let one = detector().detect(&clusters_for(&[
            "auto_renewal",
            "no_refunds",
            "price_increase",
        ]));
        let two = detector().detect(&clusters_for(&[
            "auto_renewal",
            "no_refunds",
            "price_increase",
            "cancellation_fee",
        ]));

        let c0 = base[0].raw_confidence.value();
        let c1 = one[0].raw_confidence.value();
        let c2 = two[0].raw_confidence.value();
        assert!(c0 < c1 && c1 < c2);
        assert!((c1 - 0.75).abs() < 1e-9);
        assert!((c2 - 0.80).abs() < 1e-9);
    }

    #[test]
    fn confidence_never_exceeds_one() {
        for pattern in CompoundPatternLibrary::builtin().all() {
            let confidence = BASE_CONFIDENCE
                + (OPTIONAL_STEP * pattern.optional.len() as f64).min(OPTIONAL_CAP);
            assert!(confidence <= 1.0);
        }
    }

    #[test]
    fn compound_finding_back_references_constituents() {
        let clusters = clusters_for(&["auto_renewal", "no_refunds", "cancellation_fee"]);
        let member_ids: Vec<FindingId> = clusters
            .iter()
            .flat_map(|c| c.members.iter().map(|m| m.finding.id))
            .collect();

        let findings = detector().detect(&clusters);
        let constituents = findings[0].constituents();
        assert_eq!(constituents.len(), 3);
        for id in constituents {
            assert!(member_ids.contains(id));
        }
    }

    #[test]
    fn multiple_patterns_can_fire_on_one_document() {
        let findings = detector().detect(&clusters_for(&[
            "auto_renewal",
            "no_refunds",
            "binding_arbitration",
            "class_action_waiver",
        ]));
        let ids: Vec<&str> = findings.iter().map(|f| f.indicator.as_str()).collect();
        assert!(ids.contains(&"lock_in_trap"));
        assert!(ids.contains(&"no_recourse"));
    }

    #[test]
    fn compound_finding_is_document_level() {
        let findings = detector().detect(&clusters_for(&["auto_renewal", "no_refunds"]));
        assert_eq!(findings[0].clause_index, None);
        assert_eq!(findings[0].category, "compound_risk");
        assert!(!findings[0].excerpt.is_empty());
    }
}
