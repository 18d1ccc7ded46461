//! User ranking preferences - per-category relevance and the budget bypass.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How much a user cares about a risk category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceLevel {
    /// Actively uninterested; halves the score.
    Muted,
    /// Less interested than average.
    Reduced,
    /// No adjustment.
    #[default]
    Normal,
    /// More interested than average.
    Elevated,
    /// Top priority for this user.
    Critical,
}

impl RelevanceLevel {
    /// Multiplicative factor applied to the rank score.
    pub fn factor(&self) -> f64 {
        match self {
            RelevanceLevel::Muted => 0.5,
            RelevanceLevel::Reduced => 0.7,
            RelevanceLevel::Normal => 1.0,
            RelevanceLevel::Elevated => 1.3,
            RelevanceLevel::Critical => 1.5,
        }
    }
}

/// Per-user ranking preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Category name to relevance level; unlisted categories are Normal.
    pub priorities: HashMap<String, RelevanceLevel>,
    /// When true the alert budget is bypassed and nothing is suppressed.
    pub show_all: bool,
}

impl UserPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the relevance level for one category.
    pub fn with_priority(mut self, category: impl Into<String>, level: RelevanceLevel) -> Self {
        self.priorities.insert(category.into(), level);
        self
    }

    /// Disables the alert budget.
    pub fn with_show_all(mut self, show_all: bool) -> Self {
        self.show_all = show_all;
        self
    }

    /// Relevance factor for a category; 1.0 when unlisted.
    pub fn relevance_for(&self, category: &str) -> f64 {
        self.priorities
            .get(category)
            .copied()
            .unwrap_or_default()
            .factor()
    }
}
