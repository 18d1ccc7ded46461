//! Detection candidates - raw detector output before merging.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::clause::Clause;
use crate::domain::foundation::{Confidence, Severity};

/// Which detector produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Pattern,
    Semantic,
    Statistical,
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DetectionMethod::Pattern => "pattern",
            DetectionMethod::Semantic => "semantic",
            DetectionMethod::Statistical => "statistical",
        };
        write!(f, "{}", s)
    }
}

/// Method-specific evidence carried by a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum MethodDetail {
    Pattern {
        /// The taxonomy phrase that matched.
        matched_phrase: String,
        /// True for exact substring matches, false for windowed fuzzy matches.
        exact: bool,
    },
    Semantic {
        /// Best cosine similarity against the indicator's exemplars.
        similarity: f64,
    },
    Statistical {
        /// Normalized distance from the baseline distribution.
        anomaly_score: f64,
    },
}

impl MethodDetail {
    /// The detection method this detail belongs to.
    pub fn method(&self) -> DetectionMethod {
        match self {
            MethodDetail::Pattern { .. } => DetectionMethod::Pattern,
            MethodDetail::Semantic { .. } => DetectionMethod::Semantic,
            MethodDetail::Statistical { .. } => DetectionMethod::Statistical,
        }
    }
}

/// A raw detection produced by one detector for one clause and one indicator.
///
/// One clause may yield zero or many candidates. Candidates from the three
/// detectors are merged (union, not deduped) before Stage 2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionCandidate {
    /// Index of the clause within the analyzed document's clause list.
    pub clause_index: usize,
    /// Section the clause appeared under, carried for cluster summaries.
    pub section: String,
    /// Clause text the candidate is tied to.
    pub excerpt: String,
    /// Indicator name from the taxonomy (or the outlier pseudo-indicator).
    pub indicator: String,
    /// Risk category of the indicator.
    pub category: String,
    /// Severity inherited from the indicator definition.
    pub severity: Severity,
    /// Raw detection confidence in [0, 1].
    pub raw_score: Confidence,
    /// Method-specific evidence.
    pub detail: MethodDetail,
}

impl DetectionCandidate {
    /// Creates a candidate tied to a clause.
    pub fn new(
        clause_index: usize,
        clause: &Clause,
        indicator: impl Into<String>,
        category: impl Into<String>,
        severity: Severity,
        raw_score: Confidence,
        detail: MethodDetail,
    ) -> Self {
        Self {
            clause_index,
            section: clause.section.clone(),
            excerpt: clause.text.clone(),
            indicator: indicator.into(),
            category: category.into(),
            severity,
            raw_score,
            detail,
        }
    }

    /// The detector that produced this candidate.
    pub fn method(&self) -> DetectionMethod {
        self.detail.method()
    }
}
