//! Document context - the declared facts about a document that drive
//! Stage-2 re-weighting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;
use crate::domain::ranking::UserPreferences;

/// Business model of the service whose terms are being analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Subscription,
    OneTimePurchase,
    Freemium,
    AdSupported,
    Trial,
}

impl ServiceType {
    /// Canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Subscription => "subscription",
            ServiceType::OneTimePurchase => "one_time_purchase",
            ServiceType::Freemium => "freemium",
            ServiceType::AdSupported => "ad_supported",
            ServiceType::Trial => "trial",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept underscore, hyphen and space separated spellings.
        let normalized: String = s
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "subscription" => Ok(ServiceType::Subscription),
            "onetimepurchase" | "onetime" => Ok(ServiceType::OneTimePurchase),
            "freemium" => Ok(ServiceType::Freemium),
            "adsupported" => Ok(ServiceType::AdSupported),
            "trial" | "freetrial" => Ok(ServiceType::Trial),
            _ => Err(ValidationError::invalid_format(
                "service_type",
                format!("unknown service type '{}'", s),
            )),
        }
    }
}

/// Declared facts about the document being analyzed.
///
/// Everything is optional: an empty context yields neutral Stage-2
/// adjustments (multiplier 1.0, no expected/alarming classification).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentContext {
    /// Declared industry (e.g. "saas", "finance"). Unknown industries use a
    /// neutral modifier and a review flag.
    pub industry: Option<String>,
    /// Declared business model.
    pub service_type: Option<ServiceType>,
    /// Whether this analysis was triggered by a document change event.
    pub is_change: bool,
    /// When the change happened, if known. Missing or future dates fall back
    /// to a neutral temporal multiplier with a warning flag.
    pub change_date: Option<DateTime<Utc>>,
    /// Company the document belongs to.
    pub company_name: Option<String>,
    /// Per-user ranking preferences, if a user is known.
    pub preferences: Option<UserPreferences>,
}

impl DocumentContext {
    /// Creates an empty (fully neutral) context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the declared industry.
    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    /// Sets the declared service type.
    pub fn with_service_type(mut self, service_type: ServiceType) -> Self {
        self.service_type = Some(service_type);
        self
    }

    /// Marks the analysis as change-triggered, with the change timestamp.
    pub fn with_change(mut self, change_date: Option<DateTime<Utc>>) -> Self {
        self.is_change = true;
        self.change_date = change_date;
        self
    }

    /// Sets the company name.
    pub fn with_company(mut self, name: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self
    }

    /// Sets per-user ranking preferences.
    pub fn with_preferences(mut self, preferences: UserPreferences) -> Self {
        self.preferences = Some(preferences);
        self
    }
}
