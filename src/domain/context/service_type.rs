//! Service-type filter - expected-vs-alarming category classification.
//!
//! Some clause categories are unremarkable for a business model (auto-renewal
//! in a subscription) and alarming in another (auto-renewal in a one-time
//! purchase). Expected categories that require disclosure are only dropped
//! when the clause actually discloses well.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::clause::ServiceType;
use crate::domain::detection::{ClauseFeatures, Finding};

/// Jargon density (per 100 words) below which a clause counts as plain
/// language.
const PLAIN_LANGUAGE_JARGON_MAX: f64 = 3.0;

/// Document-position fraction at or before which a clause counts as
/// prominently placed.
const PROMINENT_POSITION_MAX: f64 = 0.3;

/// Per-service-type expectation lists.
#[derive(Debug, Clone)]
struct ServiceProfile {
    expected: &'static [&'static str],
    alarming: &'static [&'static str],
    /// Expected categories that must be disclosed to be dropped.
    requires_disclosure: &'static [&'static str],
}

static PROFILES: Lazy<HashMap<ServiceType, ServiceProfile>> = Lazy::new(|| {
    HashMap::from([
        (
            ServiceType::Subscription,
            ServiceProfile {
                expected: &["auto_renewal", "pricing", "cancellation"],
                alarming: &[
                    "account_termination",
                    "regulatory_violation",
                    "content_rights",
                    "refunds",
                ],
                requires_disclosure: &["auto_renewal", "pricing", "cancellation"],
            },
        ),
        (
            ServiceType::OneTimePurchase,
            ServiceProfile {
                expected: &["refunds", "liability"],
                alarming: &["auto_renewal", "account_termination", "regulatory_violation"],
                requires_disclosure: &["refunds"],
            },
        ),
        (
            ServiceType::Freemium,
            ServiceProfile {
                expected: &["pricing", "account_termination"],
                alarming: &["regulatory_violation", "content_rights", "cancellation"],
                requires_disclosure: &["pricing"],
            },
        ),
        (
            ServiceType::AdSupported,
            ServiceProfile {
                expected: &["data_privacy"],
                alarming: &["regulatory_violation", "auto_renewal", "refunds"],
                requires_disclosure: &["data_privacy"],
            },
        ),
        (
            ServiceType::Trial,
            ServiceProfile {
                expected: &["auto_renewal", "pricing"],
                alarming: &["account_termination", "cancellation", "regulatory_violation"],
                requires_disclosure: &["auto_renewal", "pricing"],
            },
        ),
    ])
});

/// How a category reads for the declared business model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Expected,
    Alarming,
    Neutral,
}

/// The three disclosure-quality checks and their majority vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisclosureQuality {
    pub plain_language: bool,
    pub prominent_placement: bool,
    pub concrete_details: bool,
}

impl DisclosureQuality {
    /// Evaluates the three checks for a clause.
    pub fn evaluate(text: &str, position_fraction: f64) -> Self {
        let features = ClauseFeatures::extract(text);
        Self {
            plain_language: features.jargon_density() < PLAIN_LANGUAGE_JARGON_MAX,
            prominent_placement: position_fraction <= PROMINENT_POSITION_MAX,
            concrete_details: has_concrete_details(text),
        }
    }

    /// Majority vote: at least 2 of 3 checks pass.
    pub fn passes(&self) -> bool {
        [
            self.plain_language,
            self.prominent_placement,
            self.concrete_details,
        ]
        .iter()
        .filter(|&&b| b)
        .count()
            >= 2
    }
}

/// Whether the text carries concrete numeric or date details.
fn has_concrete_details(text: &str) -> bool {
    let lower = text.to_lowercase();
    let has_digit = lower.chars().any(|c| c.is_ascii_digit());
    let date_words = [
        "day", "days", "week", "weeks", "month", "months", "year", "years", "january",
        "february", "march", "april", "may", "june", "july", "august", "september", "october",
        "november", "december",
    ];
    has_digit
        || lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|w| date_words.contains(&w))
}

/// Result of the service-type filter for one finding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceTypeDecision {
    pub expectation: Expectation,
    pub keep: bool,
    pub context_score: f64,
    pub disclosure_required: bool,
}

/// The service-type filter.
pub struct ServiceTypeFilter;

impl ServiceTypeFilter {
    /// Classifies a category against the declared service type.
    pub fn classify(category: &str, service_type: ServiceType) -> Expectation {
        let Some(profile) = PROFILES.get(&service_type) else {
            return Expectation::Neutral;
        };
        if list_matches(profile.alarming, category) {
            Expectation::Alarming
        } else if list_matches(profile.expected, category) {
            Expectation::Expected
        } else {
            Expectation::Neutral
        }
    }

    /// Applies the decision table to one finding.
    pub fn apply(
        finding: &Finding,
        service_type: Option<ServiceType>,
        position_fraction: f64,
    ) -> ServiceTypeDecision {
        let Some(service_type) = service_type else {
            // No declared model: everything is neutral.
            return ServiceTypeDecision {
                expectation: Expectation::Neutral,
                keep: true,
                context_score: 0.5,
                disclosure_required: false,
            };
        };

        let expectation = Self::classify(&finding.category, service_type);
        match expectation {
            Expectation::Alarming => ServiceTypeDecision {
                expectation,
                keep: true,
                context_score: 0.1,
                disclosure_required: false,
            },
            Expectation::Neutral => ServiceTypeDecision {
                expectation,
                keep: true,
                context_score: 0.5,
                disclosure_required: false,
            },
            Expectation::Expected => {
                let disclosure_required = PROFILES
                    .get(&service_type)
                    .map(|p| list_matches(p.requires_disclosure, &finding.category))
                    .unwrap_or(false);
                if !disclosure_required {
                    return ServiceTypeDecision {
                        expectation,
                        keep: false,
                        context_score: 0.9,
                        disclosure_required,
                    };
                }
                let quality = DisclosureQuality::evaluate(&finding.excerpt, position_fraction);
                if quality.passes() {
                    ServiceTypeDecision {
                        expectation,
                        keep: false,
                        context_score: 0.9,
                        disclosure_required,
                    }
                } else {
                    ServiceTypeDecision {
                        expectation,
                        keep: true,
                        context_score: 0.5,
                        disclosure_required,
                    }
                }
            }
        }
    }
}

/// Exact-then-fuzzy list membership: separator-insensitive equality, then
/// substring in either direction.
fn list_matches(list: &[&str], category: &str) -> bool {
    let needle = normalize(category);
    list.iter().any(|entry| {
        let entry = normalize(entry);
        entry == needle || entry.contains(&needle) || needle.contains(&entry)
    })
}

fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}
