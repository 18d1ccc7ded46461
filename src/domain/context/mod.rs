//! Context module - Stage 2 re-weighting filters.
//!
//! Three independent pure functions re-weight each merged finding against
//! the document context. Composition rule: a finding is kept if ANY filter
//! marks it keep, while the industry and temporal score multipliers always
//! apply regardless of the service-type keep/drop decision.

mod industry;
mod service_type;
mod temporal;

pub use industry::{IndustryAdjustment, IndustryBaselineFilter, IndustryProfile};
pub use service_type::{DisclosureQuality, Expectation, ServiceTypeDecision, ServiceTypeFilter};
pub use temporal::{TemporalAdjustment, TemporalFilter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::clause::DocumentContext;
use crate::domain::detection::Finding;

/// Cap on the adjusted score after all multipliers.
pub const ADJUSTED_SCORE_CAP: f64 = 10.0;

/// Which filter decided to keep a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Industry,
    ServiceType,
    Temporal,
}

/// Informational flags raised by the filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextFlag {
    /// Industry not in the profile table; neutral modifier applied,
    /// manual review suggested.
    UnknownIndustry,
    /// Clause text contains an industry-prohibited term.
    ProhibitedTerm,
    /// Change-triggered analysis without a usable change date.
    MissingChangeDate,
    /// Change date lies in the future; neutral multiplier applied.
    FutureChangeDate,
    /// Policy last changed more than five years ago.
    VeryOldPolicy,
    /// Change happened within the temporal decay window (90 days).
    RecentChange,
}

/// A finding augmented with Stage-2 context decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextualFinding {
    pub finding: Finding,
    /// Expectedness score from the service-type filter: 0.1 alarming,
    /// 0.5 neutral, 0.9 expected.
    pub context_score: f64,
    /// Whether the finding survives to clustering.
    pub keep: bool,
    /// Whether the service type demands a disclosure for this category.
    pub disclosure_required: bool,
    /// Severity-weighted confidence after industry and temporal multipliers,
    /// capped at [`ADJUSTED_SCORE_CAP`].
    pub adjusted_score: f64,
    /// Provenance: every filter that marked this finding keep.
    pub kept_by: Vec<FilterKind>,
    /// Informational flags raised while filtering.
    pub flags: Vec<ContextFlag>,
}

/// Applies all three filters to one finding.
///
/// `position_fraction` is the clause's relative position in the document
/// (0.0 front, 1.0 back), used by the disclosure prominence check.
pub fn apply_context_filters(
    finding: Finding,
    position_fraction: f64,
    ctx: &DocumentContext,
    now: DateTime<Utc>,
) -> ContextualFinding {
    let industry = IndustryBaselineFilter::apply(&finding, ctx.industry.as_deref());
    let service = ServiceTypeFilter::apply(&finding, ctx.service_type, position_fraction);
    let temporal = TemporalFilter::apply(ctx, now);

    let mut kept_by = Vec::new();
    if industry.keep {
        kept_by.push(FilterKind::Industry);
    }
    if service.keep {
        kept_by.push(FilterKind::ServiceType);
    }
    let keep = !kept_by.is_empty();

    let mut flags = industry.flags;
    flags.extend(temporal.flags);

    let adjusted_score = (finding.severity.weight()
        * finding.raw_confidence.value()
        * industry.multiplier
        * temporal.multiplier)
        .min(ADJUSTED_SCORE_CAP);

    ContextualFinding {
        finding,
        context_score: service.context_score,
        keep,
        disclosure_required: service.disclosure_required,
        adjusted_score,
        kept_by,
        flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clause::ServiceType;
    use crate::domain::detection::{DetectionMethod, FindingKind};
    use crate::domain::foundation::{Confidence, FindingId, Severity};

    fn finding(indicator: &str, category: &str, severity: Severity, text: &str) -> Finding {
        Finding {
            id: FindingId::new(),
            clause_index: Some(0),
            section: "1".into(),
            excerpt: text.into(),
            indicator: indicator.into(),
            category: category.into(),
            severity,
            raw_confidence: Confidence::new(0.9),
            methods: vec![DetectionMethod::Pattern],
            kind: FindingKind::Pattern {
                matched_phrase: indicator.replace('_', " "),
            },
        }
    }

    #[test]
    fn alarming_category_is_kept_with_low_context_score() {
        let ctx = DocumentContext::new().with_service_type(ServiceType::Subscription);
        let f = finding(
            "unilateral_termination",
            "account_termination",
            Severity::High,
            "We may terminate your account at any time without notice.",
        );
        let result = apply_context_filters(f, 0.5, &ctx, Utc::now());

        assert!(result.keep);
        assert_eq!(result.context_score, 0.1);
        assert!(result.kept_by.contains(&FilterKind::ServiceType));
    }

    #[test]
    fn adjusted_score_is_capped() {
        let ctx = DocumentContext::new()
            .with_industry("finance")
            .with_change(Some(Utc::now()));
        let f = finding(
            "data_sale",
            "regulatory_violation",
            Severity::High,
            "We may sell your personal information to advertisers.",
        );
        let result = apply_context_filters(f, 0.1, &ctx, Utc::now());
        assert!(result.adjusted_score <= ADJUSTED_SCORE_CAP);
    }

    #[test]
    fn no_context_yields_neutral_keep() {
        let ctx = DocumentContext::default();
        let f = finding(
            "liability_waiver",
            "liability",
            Severity::Medium,
            "We shall not be liable for any damages.",
        );
        let result = apply_context_filters(f, 0.5, &ctx, Utc::now());

        assert!(result.keep);
        assert_eq!(result.context_score, 0.5);
        assert!(result.flags.is_empty());
    }

    #[test]
    fn provenance_records_every_keeping_filter() {
        let ctx = DocumentContext::new()
            .with_industry("healthcare")
            .with_service_type(ServiceType::Subscription);
        // data_sale is prohibited for healthcare, so both filters keep.
        let f = finding(
            "data_sale",
            "regulatory_violation",
            Severity::High,
            "We may sell your personal information to third parties.",
        );
        let result = apply_context_filters(f, 0.5, &ctx, Utc::now());
        assert!(result.kept_by.contains(&FilterKind::Industry));
        assert!(result.kept_by.contains(&FilterKind::ServiceType));
    }
}
