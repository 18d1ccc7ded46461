//! Indicator module - Static taxonomy of named risk patterns.
//!
//! Pure lookup, no runtime mutation. The built-in taxonomy ships with the
//! crate; deployments can override it with a YAML table.

mod baseline;
mod definition;
mod library;

pub use baseline::builtin_baseline_corpus;
pub use definition::RiskIndicatorDefinition;
pub use library::IndicatorLibrary;

/// Category assigned to statistical outliers, which have no taxonomy entry.
pub const OUTLIER_CATEGORY: &str = "statistical_anomaly";

/// Indicator name assigned to statistical outliers.
pub const OUTLIER_INDICATOR: &str = "statistical_outlier";

/// Category treated as a regulatory violation by the alert ranker.
pub const REGULATORY_CATEGORY: &str = "regulatory_violation";
