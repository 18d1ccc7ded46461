//! Clustering module - Stage 3 deduplication and semantic grouping.
//!
//! Two phases: a near-duplicate pass over pairwise embedding similarity
//! consolidates repeated clauses, then the consolidated uniques are reduced
//! to a low-dimensional space and density-clustered to group related (but
//! not duplicate) findings. Points assigned to no cluster are noise and pass
//! through individually.

mod engine;
mod math;

pub use engine::{ClusterEngine, ClusterOutcome};
pub use math::{dbscan, project_2d, PointLabel};

use serde::{Deserialize, Serialize};

use crate::domain::context::ContextualFinding;
use crate::domain::foundation::Severity;

/// A consolidated group of related findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster_id: usize,
    /// The member with the highest raw detection confidence.
    pub representative: ContextualFinding,
    /// Every member, including the representative.
    pub members: Vec<ContextualFinding>,
    /// Text shown for the whole cluster.
    pub consolidated_text: String,
    /// Always equals `members.len()`.
    pub cluster_size: usize,
    /// Mean raw confidence over members.
    pub average_confidence: f64,
    /// Maximum severity over members.
    pub overall_severity: Severity,
    /// Unique sections covered by members, in member order.
    pub sections: Vec<String>,
    /// True when the density pass assigned this finding to no cluster.
    pub is_noise: bool,
}

impl ClusterSummary {
    /// Builds a summary from a non-empty member list, deriving every
    /// aggregate field.
    ///
    /// # Panics
    ///
    /// Panics on an empty member list; callers guarantee at least one member.
    pub fn from_members(
        cluster_id: usize,
        members: Vec<ContextualFinding>,
        is_noise: bool,
    ) -> Self {
        assert!(!members.is_empty(), "cluster must have at least one member");

        let rep_index = members
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| {
                a.finding
                    .raw_confidence
                    .value()
                    .partial_cmp(&b.finding.raw_confidence.value())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    // Ties break toward the earliest original index.
                    .then(ib.cmp(ia))
            })
            .map(|(i, _)| i)
            .unwrap_or(0);
        let representative = members[rep_index].clone();

        let cluster_size = members.len();
        let average_confidence = members
            .iter()
            .map(|m| m.finding.raw_confidence.value())
            .sum::<f64>()
            / cluster_size as f64;
        let overall_severity = members
            .iter()
            .map(|m| m.finding.severity)
            .max()
            .unwrap_or(representative.finding.severity);

        let mut sections = Vec::new();
        for member in &members {
            if !sections.contains(&member.finding.section) {
                sections.push(member.finding.section.clone());
            }
        }

        let consolidated_text = match cluster_size {
            1 => representative.finding.excerpt.clone(),
            2 => format!("{} (and 1 similar clause)", representative.finding.excerpt),
            n => format!(
                "{} (and {} similar clauses)",
                representative.finding.excerpt,
                n - 1
            ),
        };

        Self {
            cluster_id,
            representative,
            members,
            consolidated_text,
            cluster_size,
            average_confidence,
            overall_severity,
            sections,
            is_noise,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::detection::{DetectionMethod, Finding, FindingKind};
    use crate::domain::foundation::{Confidence, FindingId};

    fn member(confidence: f64, severity: Severity, section: &str) -> ContextualFinding {
        ContextualFinding {
            finding: Finding {
                id: FindingId::new(),
                clause_index: Some(0),
                section: section.into(),
                excerpt: "No refunds.".into(),
                indicator: "no_refunds".into(),
                category: "refunds".into(),
                severity,
                raw_confidence: Confidence::new(confidence),
                methods: vec![DetectionMethod::Pattern],
                kind: FindingKind::Pattern {
                    matched_phrase: "no refunds".into(),
                },
            },
            context_score: 0.5,
            keep: true,
            disclosure_required: false,
            adjusted_score: 2.0,
            kept_by: vec![],
            flags: vec![],
        }
    }

    #[test]
    fn summary_size_equals_member_count() {
        let summary = ClusterSummary::from_members(
            0,
            vec![member(0.8, Severity::Medium, "1"), member(0.9, Severity::High, "2")],
            false,
        );
        assert_eq!(summary.cluster_size, summary.members.len());
        assert_eq!(summary.cluster_size, 2);
    }

    #[test]
    fn representative_is_highest_confidence() {
        let summary = ClusterSummary::from_members(
            0,
            vec![
                member(0.7, Severity::Low, "1"),
                member(0.95, Severity::Low, "2"),
                member(0.8, Severity::Low, "3"),
            ],
            false,
        );
        assert_eq!(summary.representative.finding.raw_confidence.value(), 0.95);
    }

    #[test]
    fn confidence_tie_breaks_to_first_member() {
        let a = member(0.8, Severity::Low, "first");
        let b = member(0.8, Severity::Low, "second");
        let summary = ClusterSummary::from_members(0, vec![a.clone(), b], false);
        assert_eq!(summary.representative.finding.id, a.finding.id);
    }

    #[test]
    fn severity_is_max_over_members() {
        let summary = ClusterSummary::from_members(
            0,
            vec![
                member(0.9, Severity::Low, "1"),
                member(0.5, Severity::High, "2"),
            ],
            false,
        );
        assert_eq!(summary.overall_severity, Severity::High);
    }

    #[test]
    fn sections_are_unique_in_order() {
        let summary = ClusterSummary::from_members(
            0,
            vec![
                member(0.9, Severity::Low, "3. Refunds"),
                member(0.8, Severity::Low, "3. Refunds"),
                member(0.7, Severity::Low, "9. Misc"),
            ],
            false,
        );
        assert_eq!(summary.sections, vec!["3. Refunds", "9. Misc"]);
    }

    #[test]
    fn consolidated_text_pluralizes_on_member_count() {
        let pair = ClusterSummary::from_members(
            0,
            vec![member(0.9, Severity::Low, "1"), member(0.8, Severity::Low, "2")],
            false,
        );
        assert!(pair.consolidated_text.ends_with("(and 1 similar clause)"));

        let trio = ClusterSummary::from_members(
            0,
            vec![
                member(0.9, Severity::Low, "1"),
                member(0.8, Severity::Low, "2"),
                member(0.7, Severity::Low, "3"),
            ],
            false,
        );
        assert!(trio.consolidated_text.ends_with("(and 2 similar clauses)"));
    }
}
