//! Industry baseline filter - industry-specific severity re-weighting.
//!
//! Looks up a static industry profile and applies: a prevalence adjustment
//! (common clauses down-weighted, rare ones up-weighted), a strict-category
//! multiplier, and a prohibited-term check that both up-weights and forces
//! the finding to be kept. Unknown industries are neutral with a review flag.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::detection::Finding;

use super::ContextFlag;

/// Down-weight for categories found in >= 70% of the industry baseline.
const PREVALENT_MULTIPLIER: f64 = 0.5;

/// Up-weight for categories found in < 30% of the industry baseline.
const RARE_MULTIPLIER: f64 = 1.3;

/// Up-weight for industry-strict categories.
const STRICT_MULTIPLIER: f64 = 1.5;

/// Up-weight when clause text contains an industry-prohibited term.
const PROHIBITED_MULTIPLIER: f64 = 1.5;

/// Static per-industry baseline profile.
#[derive(Debug, Clone)]
pub struct IndustryProfile {
    /// Canonical industry key.
    pub name: &'static str,
    /// Baseline severity modifier for the industry as a whole.
    pub modifier: f64,
    /// Categories this industry is held to a stricter standard on.
    pub strict_categories: &'static [&'static str],
    /// Terms that should never appear in this industry's documents.
    pub prohibited_terms: &'static [&'static str],
    /// Categories present in >= 70% of the industry's baseline corpus.
    pub common_categories: &'static [&'static str],
    /// Categories present in < 30% of the industry's baseline corpus.
    pub rare_categories: &'static [&'static str],
}

static PROFILES: Lazy<HashMap<&'static str, IndustryProfile>> = Lazy::new(|| {
    let profiles = [
        IndustryProfile {
            name: "saas",
            modifier: 1.0,
            strict_categories: &["data_privacy"],
            prohibited_terms: &[],
            common_categories: &["liability", "auto_renewal", "policy_changes"],
            rare_categories: &["content_rights"],
        },
        IndustryProfile {
            name: "finance",
            modifier: 1.2,
            strict_categories: &["data_privacy", "regulatory_violation", "dispute_resolution"],
            prohibited_terms: &["sell your personal information", "no liability whatsoever"],
            common_categories: &["dispute_resolution", "liability"],
            rare_categories: &["content_rights", "auto_renewal"],
        },
        IndustryProfile {
            name: "healthcare",
            modifier: 1.3,
            strict_categories: &["data_privacy", "regulatory_violation"],
            prohibited_terms: &[
                "sell your personal information",
                "share your health information with third parties",
            ],
            common_categories: &["liability"],
            rare_categories: &["content_rights", "auto_renewal", "refunds"],
        },
        IndustryProfile {
            name: "ecommerce",
            modifier: 1.0,
            strict_categories: &["refunds", "pricing"],
            prohibited_terms: &[],
            common_categories: &["refunds", "pricing", "liability"],
            rare_categories: &["dispute_resolution", "content_rights"],
        },
        IndustryProfile {
            name: "social_media",
            modifier: 1.1,
            strict_categories: &["content_rights", "data_privacy"],
            prohibited_terms: &["sell your personal information"],
            common_categories: &["content_rights", "data_privacy", "account_termination"],
            rare_categories: &["refunds", "cancellation"],
        },
        IndustryProfile {
            name: "gaming",
            modifier: 1.0,
            strict_categories: &["pricing"],
            prohibited_terms: &[],
            common_categories: &["account_termination", "content_rights"],
            rare_categories: &["dispute_resolution"],
        },
    ];
    profiles.into_iter().map(|p| (p.name, p)).collect()
});

/// Result of applying the industry filter to one finding.
#[derive(Debug, Clone, PartialEq)]
pub struct IndustryAdjustment {
    /// Combined multiplier to apply to the finding's score.
    pub multiplier: f64,
    /// True when the industry filter insists the finding be kept
    /// (prohibited term present).
    pub keep: bool,
    /// Flags raised while filtering.
    pub flags: Vec<ContextFlag>,
}

/// The industry baseline filter.
pub struct IndustryBaselineFilter;

impl IndustryBaselineFilter {
    /// Looks up a profile by declared industry name.
    pub fn profile(industry: &str) -> Option<&'static IndustryProfile> {
        let normalized: String = industry
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        PROFILES.get(normalized.trim_matches('_'))
    }

    /// Applies the filter to one finding.
    pub fn apply(finding: &Finding, industry: Option<&str>) -> IndustryAdjustment {
        let Some(profile) = industry.and_then(Self::profile) else {
            let flags = if industry.is_some() {
                vec![ContextFlag::UnknownIndustry]
            } else {
                Vec::new()
            };
            return IndustryAdjustment {
                multiplier: 1.0,
                keep: false,
                flags,
            };
        };

        let mut multiplier = profile.modifier;
        let mut keep = false;
        let mut flags = Vec::new();

        let category = finding.category.as_str();
        if profile.common_categories.contains(&category) {
            multiplier *= PREVALENT_MULTIPLIER;
        } else if profile.rare_categories.contains(&category) {
            multiplier *= RARE_MULTIPLIER;
        }

        if profile.strict_categories.contains(&category) {
            multiplier *= STRICT_MULTIPLIER;
        }

        let text = finding.excerpt.to_lowercase();
        if profile
            .prohibited_terms
            .iter()
            .any(|term| text.contains(term))
        {
            multiplier *= PROHIBITED_MULTIPLIER;
            keep = true;
            flags.push(ContextFlag::ProhibitedTerm);
        }

        IndustryAdjustment {
            multiplier,
            keep,
            flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::detection::{DetectionMethod, FindingKind};
    use crate::domain::foundation::{Confidence, FindingId, Severity};

    fn finding(category: &str, text: &str) -> Finding {
        Finding {
            id: FindingId::new(),
            clause_index: Some(0),
            section: "1".into(),
            excerpt: text.into(),
            indicator: "test".into(),
            category: category.into(),
            severity: Severity::Medium,
            raw_confidence: Confidence::new(0.8),
            methods: vec![DetectionMethod::Pattern],
            kind: FindingKind::Pattern {
                matched_phrase: "test".into(),
            },
        }
    }

    #[test]
    fn unknown_industry_is_neutral_with_review_flag() {
        let adj = IndustryBaselineFilter::apply(&finding("liability", "text"), Some("carpentry"));
        assert_eq!(adj.multiplier, 1.0);
        assert!(!adj.keep);
        assert_eq!(adj.flags, vec![ContextFlag::UnknownIndustry]);
    }

    #[test]
    fn missing_industry_is_neutral_without_flag() {
        let adj = IndustryBaselineFilter::apply(&finding("liability", "text"), None);
        assert_eq!(adj.multiplier, 1.0);
        assert!(adj.flags.is_empty());
    }

    #[test]
    fn prevalent_category_is_down_weighted() {
        // liability is common for saas (modifier 1.0): 1.0 * 0.5.
        let adj = IndustryBaselineFilter::apply(&finding("liability", "text"), Some("saas"));
        assert!((adj.multiplier - 0.5).abs() < 1e-9);
    }

    #[test]
    fn rare_category_is_up_weighted() {
        // content_rights is rare for saas: 1.0 * 1.3.
        let adj = IndustryBaselineFilter::apply(&finding("content_rights", "text"), Some("saas"));
        assert!((adj.multiplier - 1.3).abs() < 1e-9);
    }

    #[test]
    fn strict_category_multiplies_one_point_five() {
        // data_privacy for saas: strict only -> 1.0 * 1.5.
        let adj = IndustryBaselineFilter::apply(&finding("data_privacy", "text"), Some("saas"));
        assert!((adj.multiplier - 1.5).abs() < 1e-9);
    }

    #[test]
    fn prohibited_term_forces_keep() {
        let adj = IndustryBaselineFilter::apply(
            &finding(
                "regulatory_violation",
                "We may sell your personal information to partners.",
            ),
            Some("healthcare"),
        );
        assert!(adj.keep);
        assert!(adj.flags.contains(&ContextFlag::ProhibitedTerm));
        // healthcare modifier 1.3, strict 1.5, prohibited 1.5.
        assert!((adj.multiplier - 1.3 * 1.5 * 1.5).abs() < 1e-9);
    }

    #[test]
    fn profile_lookup_normalizes_spelling() {
        assert!(IndustryBaselineFilter::profile("Social Media").is_some());
        assert!(IndustryBaselineFilter::profile("SAAS").is_some());
        assert!(IndustryBaselineFilter::profile("unknown-field").is_none());
    }
}
