//! The indicator library - lookup over the static risk taxonomy.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::foundation::{Severity, ValidationError};

use super::RiskIndicatorDefinition;

/// Static taxonomy of named risk patterns.
///
/// Pure lookup with no state beyond the loaded table.
#[derive(Debug, Clone)]
pub struct IndicatorLibrary {
    indicators: Vec<RiskIndicatorDefinition>,
    by_name: HashMap<String, usize>,
}

impl IndicatorLibrary {
    /// Builds a library from a list of definitions.
    ///
    /// Duplicate names are rejected.
    pub fn new(indicators: Vec<RiskIndicatorDefinition>) -> Result<Self, ValidationError> {
        let mut by_name = HashMap::with_capacity(indicators.len());
        for (idx, def) in indicators.iter().enumerate() {
            if by_name.insert(def.name.clone(), idx).is_some() {
                return Err(ValidationError::invalid_format(
                    "indicators",
                    format!("duplicate indicator name '{}'", def.name),
                ));
            }
        }
        Ok(Self {
            indicators,
            by_name,
        })
    }

    /// The built-in taxonomy shipped with the crate.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Loads a library from a YAML table (list of definitions).
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ValidationError> {
        let indicators: Vec<RiskIndicatorDefinition> = serde_yaml::from_str(yaml)
            .map_err(|e| ValidationError::invalid_format("indicators_yaml", e.to_string()))?;
        Self::new(indicators)
    }

    /// Looks up an indicator by name.
    pub fn get(&self, name: &str) -> Option<&RiskIndicatorDefinition> {
        self.by_name.get(name).map(|&idx| &self.indicators[idx])
    }

    /// All indicators in definition order.
    pub fn all(&self) -> &[RiskIndicatorDefinition] {
        &self.indicators
    }

    /// Indicators in a given category.
    pub fn by_category<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a RiskIndicatorDefinition> {
        self.indicators.iter().filter(move |d| d.category == category)
    }

    /// Number of indicators in the taxonomy.
    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    /// True if the taxonomy is empty.
    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }
}

fn def(
    name: &str,
    severity: Severity,
    category: &str,
    phrases: &[&str],
    exemplars: &[&str],
) -> RiskIndicatorDefinition {
    RiskIndicatorDefinition {
        name: name.to_string(),
        severity,
        category: category.to_string(),
        phrases: phrases.iter().map(|p| p.to_string()).collect(),
        exemplars: exemplars.iter().map(|e| e.to_string()).collect(),
    }
}

static BUILTIN: Lazy<IndicatorLibrary> = Lazy::new(|| {
    let indicators = vec![
        def(
            "unilateral_termination",
            Severity::High,
            "account_termination",
            &[
                "terminate your account at any time",
                "suspend or terminate",
                "terminate without notice",
                "at our sole discretion terminate",
                "terminate your account without notice",
            ],
            &[
                "We may terminate your account at any time without notice.",
                "We reserve the right to suspend or terminate your access at our sole discretion.",
            ],
        ),
        def(
            "no_refunds",
            Severity::High,
            "refunds",
            &["no refunds", "non-refundable", "all sales are final", "not be refunded"],
            &[
                "All payments are final and non-refundable.",
                "No refunds will be issued under any circumstances.",
            ],
        ),
        def(
            "auto_renewal",
            Severity::Medium,
            "auto_renewal",
            &[
                "automatically renew",
                "auto-renew",
                "renews automatically",
                "automatic renewal",
            ],
            &[
                "Your subscription automatically renews at the end of each billing period.",
                "This plan will auto-renew unless cancelled before the renewal date.",
            ],
        ),
        def(
            "difficult_cancellation",
            Severity::High,
            "cancellation",
            &[
                "cancel only by",
                "cancellation must be submitted in writing",
                "call to cancel",
                "written notice to cancel",
            ],
            &[
                "Cancellation requests must be submitted in writing by certified mail.",
                "You may only cancel your subscription by calling customer service during business hours.",
            ],
        ),
        def(
            "cancellation_fee",
            Severity::Medium,
            "cancellation",
            &["cancellation fee", "early termination fee", "termination charge"],
            &["An early termination fee applies if you cancel before the end of your term."],
        ),
        def(
            "price_increase",
            Severity::Medium,
            "pricing",
            &[
                "we may change prices",
                "prices are subject to change",
                "modify the fees",
                "increase the price",
            ],
            &["We reserve the right to change subscription prices at any time."],
        ),
        def(
            "data_sharing_third_party",
            Severity::High,
            "data_privacy",
            &[
                "share your information with third parties",
                "share your data with partners",
                "disclose your information to affiliates",
                "provide your data to third parties",
            ],
            &[
                "We may share your personal information with third-party partners.",
                "Your data may be disclosed to our affiliates and business partners.",
            ],
        ),
        def(
            "data_sale",
            Severity::High,
            "regulatory_violation",
            &["sell your personal information", "sell your data", "sale of personal data"],
            &["We may sell your personal information to advertisers."],
        ),
        def(
            "data_retention_indefinite",
            Severity::Medium,
            "data_privacy",
            &[
                "retain your data indefinitely",
                "keep your information for as long as",
                "retain your information after termination",
            ],
            &["We retain your personal data indefinitely, even after account closure."],
        ),
        def(
            "binding_arbitration",
            Severity::High,
            "dispute_resolution",
            &["binding arbitration", "agree to arbitrate", "arbitration agreement"],
            &[
                "Any dispute shall be resolved exclusively through binding arbitration.",
                "You agree to arbitrate all claims on an individual basis.",
            ],
        ),
        def(
            "class_action_waiver",
            Severity::High,
            "dispute_resolution",
            &["class action waiver", "waive your right to a class action", "no class actions"],
            &["You waive any right to participate in a class action lawsuit."],
        ),
        def(
            "liability_waiver",
            Severity::Medium,
            "liability",
            &[
                "not be liable",
                "disclaim all liability",
                "limitation of liability",
                "to the maximum extent permitted",
            ],
            &[
                "We shall not be liable for any damages arising from your use of the service.",
                "Our total liability is limited to the amount you paid in the last month.",
            ],
        ),
        def(
            "warranty_disclaimer",
            Severity::Low,
            "liability",
            &["as is", "without warranty", "disclaim all warranties"],
            &["The service is provided as is, without warranties of any kind."],
        ),
        def(
            "indemnification",
            Severity::Medium,
            "liability",
            &["indemnify", "hold harmless", "defend and indemnify"],
            &["You agree to indemnify and hold us harmless from any claims."],
        ),
        def(
            "content_license_broad",
            Severity::High,
            "content_rights",
            &[
                "perpetual license",
                "irrevocable license",
                "royalty-free license to use your content",
                "worldwide license",
            ],
            &[
                "You grant us a perpetual, irrevocable, worldwide, royalty-free license to use your content.",
            ],
        ),
        def(
            "unilateral_changes",
            Severity::Medium,
            "policy_changes",
            &[
                "modify these terms at any time",
                "change these terms without notice",
                "update this agreement at our discretion",
            ],
            &["We may modify these terms at any time without prior notice to you."],
        ),
        def(
            "jurisdiction_foreign",
            Severity::Low,
            "jurisdiction",
            &["exclusive jurisdiction", "governed by the laws of", "courts located in"],
            &["These terms are governed by the laws of a jurisdiction other than your own."],
        ),
    ];

    IndicatorLibrary::new(indicators).expect("built-in taxonomy must be valid")
});
