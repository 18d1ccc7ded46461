//! Ranking module - Stage 6 scoring and alert budget allocation.
//!
//! Every surviving finding is scored (severity x calibrated confidence x
//! user relevance, plus additive bonuses), bucketed by confidence tier, and
//! fitted into a fixed alert budget. Findings outside the budget are
//! suppressed, not discarded: they stay in the output for audit.

mod preferences;
mod ranker;

pub use preferences::{RelevanceLevel, UserPreferences};
pub use ranker::{Alert, AlertRanker, RankedAlertSet, RankingMetadata};
