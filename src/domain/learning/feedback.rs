//! Feedback records - user reactions to surfaced findings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Confidence, FindingId, ValidationError};

/// What the user did with a surfaced finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    /// The user marked the finding useful.
    Helpful,
    /// The user took an action because of the finding.
    ActedOn,
    /// The user dismissed the finding.
    Dismissed,
    /// The user marked the finding wrong.
    FalsePositive,
}

impl UserAction {
    /// Whether this action counts as the detection having been correct.
    pub fn is_correct(&self) -> bool {
        matches!(self, UserAction::Helpful | UserAction::ActedOn)
    }

    /// Whether this action counts toward the dismissal rate.
    pub fn is_dismissal(&self) -> bool {
        matches!(self, UserAction::Dismissed | UserAction::FalsePositive)
    }
}

impl fmt::Display for UserAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UserAction::Helpful => "helpful",
            UserAction::ActedOn => "acted_on",
            UserAction::Dismissed => "dismissed",
            UserAction::FalsePositive => "false_positive",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for UserAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "helpful" => Ok(UserAction::Helpful),
            "acted_on" | "acted-on" | "actedon" => Ok(UserAction::ActedOn),
            "dismissed" => Ok(UserAction::Dismissed),
            "false_positive" | "false-positive" | "falsepositive" => Ok(UserAction::FalsePositive),
            other => Err(ValidationError::invalid_format(
                "user_action",
                format!("unknown action '{}'", other),
            )),
        }
    }
}

/// One user reaction to one finding, append-only until consumed by a refit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub finding_id: FindingId,
    pub action: UserAction,
    /// Raw confidence the detector reported when the finding was shown.
    pub confidence_at_detection: Confidence,
    /// Derived from the action: helpful and acted-on count as correct.
    pub was_correct: bool,
    pub timestamp: DateTime<Utc>,
}

impl FeedbackRecord {
    /// Creates a record stamped now, validating the detection confidence.
    pub fn new(
        finding_id: FindingId,
        action: UserAction,
        confidence_at_detection: f64,
    ) -> Result<Self, ValidationError> {
        let confidence = Confidence::try_new(confidence_at_detection)?;
        Ok(Self {
            finding_id,
            action,
            confidence_at_detection: confidence,
            was_correct: action.is_correct(),
            timestamp: Utc::now(),
        })
    }

    /// The binary outcome label used by calibrator fitting.
    pub fn outcome(&self) -> f64 {
        if self.was_correct {
            1.0
        } else {
            0.0
        }
    }
}
