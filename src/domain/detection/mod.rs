//! Detection module - Stage 1 candidate detectors and merge policy.
//!
//! Three independent detectors run over the same clause set:
//!
//! - `pattern` - fuzzy keyword matching against the indicator taxonomy
//! - `semantic` - embedding similarity against canonical exemplar phrases
//! - `statistical` - feature-vector deviation from a baseline corpus
//!
//! Their candidates are unioned per clause+indicator by `merge`, keeping the
//! highest raw score and recording all contributing methods.

mod candidate;
mod features;
mod finding;
mod merge;
mod pattern;
mod semantic;
mod statistical;

pub use candidate::{DetectionCandidate, DetectionMethod, MethodDetail};
pub use features::ClauseFeatures;
pub use finding::{Finding, FindingKind};
pub use merge::merge_candidates;
pub use pattern::PatternDetector;
pub use semantic::{SemanticDetection, SemanticDetector};
pub use statistical::StatisticalOutlierDetector;

use serde::{Deserialize, Serialize};

/// First-class capability state of a model-backed detector.
///
/// Degraded mode is a state checked by the orchestrator, not an exception
/// path: a detector that cannot reach its backend reports `Unavailable` and
/// the pipeline continues without its signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Availability {
    /// Detector is fully operational.
    Available,
    /// Detector cannot produce a signal; the reason is surfaced in
    /// ranking metadata.
    Unavailable { reason: String },
}

impl Availability {
    /// Creates an unavailable state with a reason.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Availability::Unavailable {
            reason: reason.into(),
        }
    }

    /// Returns true if the detector can produce a signal.
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}
