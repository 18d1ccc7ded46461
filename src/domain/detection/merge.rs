//! Merge policy - unioning candidates from the three detectors.
//!
//! Candidates for the same clause+indicator are merged into one finding:
//! the highest raw score wins and supplies the evidence variant, while every
//! contributing method is recorded in provenance.

use std::collections::BTreeMap;

use crate::domain::foundation::FindingId;

use super::{DetectionCandidate, Finding, FindingKind, MethodDetail};

/// Merges raw candidates into findings.
///
/// Output order is deterministic: by clause index, then indicator name.
pub fn merge_candidates(candidates: Vec<DetectionCandidate>) -> Vec<Finding> {
    let mut groups: BTreeMap<(usize, String), Vec<DetectionCandidate>> = BTreeMap::new();
    for candidate in candidates {
        groups
            .entry((candidate.clause_index, candidate.indicator.clone()))
            .or_default()
            .push(candidate);
    }

    groups
        .into_values()
        .map(|mut group| {
            // Highest raw score supplies the winning evidence; stable against
            // input order because groups never reorder equal scores.
            let winner_idx = group
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| {
                    a.raw_score
                        .value()
                        .partial_cmp(&b.raw_score.value())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(i, _)| i)
                .unwrap_or(0);
            let winner = group.swap_remove(winner_idx);

            let mut methods = vec![winner.method()];
            for other in &group {
                if !methods.contains(&other.method()) {
                    methods.push(other.method());
                }
            }
            methods.sort_by_key(|m| format!("{}", m));

            Finding {
                id: FindingId::new(),
                clause_index: Some(winner.clause_index),
                section: winner.section,
                excerpt: winner.excerpt,
                indicator: winner.indicator,
                category: winner.category,
                severity: winner.severity,
                raw_confidence: winner.raw_score,
                methods,
                kind: detail_to_kind(winner.detail),
            }
        })
        .collect()
}

fn detail_to_kind(detail: MethodDetail) -> FindingKind {
    match detail {
        MethodDetail::Pattern { matched_phrase, .. } => FindingKind::Pattern { matched_phrase },
        MethodDetail::Semantic { similarity } => FindingKind::Semantic { similarity },
        MethodDetail::Statistical { anomaly_score } => FindingKind::Statistical { anomaly_score },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clause::Clause;
    use crate::domain::detection::DetectionMethod;
    use crate::domain::foundation::{Confidence, DocumentId, Severity};

    fn clause(n: u32, text: &str) -> Clause {
        Clause::new(DocumentId::new("doc-1").unwrap(), "1", n, text).unwrap()
    }

    fn candidate(
        clause_index: usize,
        indicator: &str,
        score: f64,
        detail: MethodDetail,
    ) -> DetectionCandidate {
        DetectionCandidate::new(
            clause_index,
            &clause(1, "No refunds will be issued."),
            indicator,
            "refunds",
            Severity::High,
            Confidence::new(score),
            detail,
        )
    }

    #[test]
    fn same_clause_indicator_merges_keeping_highest_score() {
        let findings = merge_candidates(vec![
            candidate(
                0,
                "no_refunds",
                0.7,
                MethodDetail::Pattern {
                    matched_phrase: "no refunds".into(),
                    exact: false,
                },
            ),
            candidate(0, "no_refunds", 0.92, MethodDetail::Semantic { similarity: 0.9 }),
        ]);

        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.raw_confidence.value(), 0.92);
        assert!(matches!(f.kind, FindingKind::Semantic { .. }));
        assert!(f.methods.contains(&DetectionMethod::Pattern));
        assert!(f.methods.contains(&DetectionMethod::Semantic));
    }

    #[test]
    fn different_indicators_stay_separate() {
        let findings = merge_candidates(vec![
            candidate(
                0,
                "no_refunds",
                0.9,
                MethodDetail::Pattern {
                    matched_phrase: "no refunds".into(),
                    exact: true,
                },
            ),
            candidate(0, "auto_renewal", 0.8, MethodDetail::Semantic { similarity: 0.82 }),
        ]);
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn same_indicator_different_clauses_stay_separate() {
        let findings = merge_candidates(vec![
            candidate(0, "no_refunds", 0.9, MethodDetail::Semantic { similarity: 0.85 }),
            candidate(3, "no_refunds", 0.9, MethodDetail::Semantic { similarity: 0.85 }),
        ]);
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn output_order_is_deterministic() {
        let a = vec![
            candidate(2, "no_refunds", 0.9, MethodDetail::Semantic { similarity: 0.85 }),
            candidate(0, "auto_renewal", 0.8, MethodDetail::Semantic { similarity: 0.8 }),
        ];
        let mut b = a.clone();
        b.reverse();

        let fa: Vec<_> = merge_candidates(a)
            .into_iter()
            .map(|f| (f.clause_index, f.indicator))
            .collect();
        let fb: Vec<_> = merge_candidates(b)
            .into_iter()
            .map(|f| (f.clause_index, f.indicator))
            .collect();
        assert_eq!(fa, fb);
    }

    #[test]
    fn empty_input_yields_no_findings() {
        assert!(merge_candidates(Vec::new()).is_empty());
    }
}
