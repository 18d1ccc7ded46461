//! The alert ranker - scoring, tier bucketing, and budget allocation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::calibration::{CalibratedConfidence, ConfidenceTier};
use crate::domain::clause::DocumentContext;
use crate::domain::clustering::ClusterSummary;
use crate::domain::context::{ContextFlag, IndustryBaselineFilter};
use crate::domain::detection::Finding;

/// Default number of alerts drawn from the HIGH tier.
pub const DEFAULT_TARGET_ALERTS: usize = 5;

/// Default cap on total shown alerts.
pub const DEFAULT_MAX_ALERTS: usize = 10;

/// Additive bonus for document-level compound findings.
const COMPOUND_BONUS: f64 = 5.0;

/// Additive bonus for findings tied to a recent document change.
const RECENT_CHANGE_BONUS: f64 = 2.0;

/// Additive bonus when the category is strict for the declared industry.
const INDUSTRY_CRITICAL_BONUS: f64 = 1.5;

/// Additive bonus for regulatory-violation findings.
const REGULATORY_BONUS: f64 = 3.0;

/// One rankable alert: a finding with its cluster context and calibrated
/// confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub finding: Finding,
    /// Text shown to the user (cluster-consolidated when applicable).
    pub display_text: String,
    /// Number of clauses consolidated into this alert.
    pub cluster_size: usize,
    /// Sections the consolidated clauses appeared under.
    pub sections: Vec<String>,
    /// Context flags inherited from the representative finding.
    pub flags: Vec<ContextFlag>,
    pub confidence: CalibratedConfidence,
    /// Final rank score; set by the ranker.
    pub rank_score: f64,
    /// Plain-language explanation attached by the orchestrator.
    pub explanation: Option<String>,
}

impl Alert {
    /// Builds an alert from a cluster's representative finding.
    pub fn from_cluster(cluster: &ClusterSummary, confidence: CalibratedConfidence) -> Self {
        Self {
            finding: cluster.representative.finding.clone(),
            display_text: cluster.consolidated_text.clone(),
            cluster_size: cluster.cluster_size,
            sections: cluster.sections.clone(),
            flags: cluster.representative.flags.clone(),
            confidence,
            rank_score: 0.0,
            explanation: None,
        }
    }

    /// Builds an alert from a document-level compound finding.
    pub fn from_compound(finding: Finding, confidence: CalibratedConfidence) -> Self {
        let display_text = finding.excerpt.clone();
        Self {
            finding,
            display_text,
            cluster_size: 1,
            sections: Vec::new(),
            flags: Vec::new(),
            confidence,
            rank_score: 0.0,
            explanation: None,
        }
    }
}

/// Bookkeeping attached to a ranked alert set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingMetadata {
    pub total_detected: usize,
    pub total_shown: usize,
    pub target_alerts: usize,
    pub max_alerts: usize,
    pub show_all: bool,
    /// Degradation notes surfaced from earlier stages.
    pub notes: Vec<String>,
}

/// Output of Stage 6: alerts partitioned by display bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAlertSet {
    pub high: Vec<Alert>,
    pub medium: Vec<Alert>,
    pub low: Vec<Alert>,
    pub suppressed: Vec<Alert>,
    pub metadata: RankingMetadata,
}

impl RankedAlertSet {
    /// All shown alerts in bucket order.
    pub fn shown(&self) -> impl Iterator<Item = &Alert> {
        self.high
            .iter()
            .chain(self.medium.iter())
            .chain(self.low.iter())
    }

    /// Number of shown alerts.
    pub fn total_shown(&self) -> usize {
        self.high.len() + self.medium.len() + self.low.len()
    }
}

/// Stage-6 ranker with a fixed alert budget.
#[derive(Debug, Clone)]
pub struct AlertRanker {
    target_alerts: usize,
    max_alerts: usize,
}

impl Default for AlertRanker {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_ALERTS, DEFAULT_MAX_ALERTS)
    }
}

impl AlertRanker {
    /// Creates a ranker; the target is clamped to the maximum.
    pub fn new(target_alerts: usize, max_alerts: usize) -> Self {
        Self {
            target_alerts: target_alerts.min(max_alerts),
            max_alerts,
        }
    }

    /// Rank score for one alert in the given document context.
    pub fn score(&self, alert: &Alert, ctx: &DocumentContext) -> f64 {
        let relevance = ctx
            .preferences
            .as_ref()
            .map(|p| p.relevance_for(&alert.finding.category))
            .unwrap_or(1.0);

        let mut score = alert.finding.severity.weight()
            * alert.confidence.calibrated.value()
            * relevance;

        if alert.finding.is_compound() {
            score += COMPOUND_BONUS;
        }
        if alert.flags.contains(&ContextFlag::RecentChange) {
            score += RECENT_CHANGE_BONUS;
        }
        if is_industry_critical(&alert.finding.category, ctx) {
            score += INDUSTRY_CRITICAL_BONUS;
        }
        if alert.finding.category == "regulatory_violation" {
            score += REGULATORY_BONUS;
        }
        score
    }

    /// Scores, buckets, and budget-allocates the document's alerts.
    pub fn rank(
        &self,
        mut alerts: Vec<Alert>,
        ctx: &DocumentContext,
        notes: Vec<String>,
    ) -> RankedAlertSet {
        let total_detected = alerts.len();
        for alert in &mut alerts {
            alert.rank_score = self.score(alert, ctx);
        }
        alerts.sort_by(|a, b| {
            b.rank_score
                .partial_cmp(&a.rank_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let show_all = ctx
            .preferences
            .as_ref()
            .map(|p| p.show_all)
            .unwrap_or(false);

        let mut high_pool = Vec::new();
        let mut moderate_pool = Vec::new();
        let mut low_pool = Vec::new();
        for alert in alerts {
            match alert.confidence.tier {
                ConfidenceTier::High => high_pool.push(alert),
                ConfidenceTier::Moderate => moderate_pool.push(alert),
                ConfidenceTier::Low => low_pool.push(alert),
            }
        }

        if show_all {
            let metadata = RankingMetadata {
                total_detected,
                total_shown: total_detected,
                target_alerts: self.target_alerts,
                max_alerts: self.max_alerts,
                show_all,
                notes,
            };
            return RankedAlertSet {
                high: high_pool,
                medium: moderate_pool,
                low: low_pool,
                suppressed: Vec::new(),
                metadata,
            };
        }

        // Up to the target from the HIGH tier; overflow demotes into the
        // moderate pool at its scored position.
        let high: Vec<Alert> = take_up_to(&mut high_pool, self.target_alerts);
        let mut demoted = std::mem::take(&mut high_pool);
        demoted.append(&mut moderate_pool);
        demoted.sort_by(|a, b| {
            b.rank_score
                .partial_cmp(&a.rank_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut moderate_pool = demoted;

        let mut remaining = self.max_alerts.saturating_sub(high.len());
        let medium = take_up_to(&mut moderate_pool, remaining);
        remaining -= medium.len();
        let low = take_up_to(&mut low_pool, remaining);

        let mut suppressed = moderate_pool;
        suppressed.append(&mut low_pool);

        let total_shown = high.len() + medium.len() + low.len();
        debug!(total_detected, total_shown, "alert budget applied");

        RankedAlertSet {
            high,
            medium,
            low,
            suppressed,
            metadata: RankingMetadata {
                total_detected,
                total_shown,
                target_alerts: self.target_alerts,
                max_alerts: self.max_alerts,
                show_all,
                notes,
            },
        }
    }
}

fn take_up_to(pool: &mut Vec<Alert>, n: usize) -> Vec<Alert> {
    let n = n.min(pool.len());
    pool.drain(..n).collect()
}

fn is_industry_critical(category: &str, ctx: &DocumentContext) -> bool {
    ctx.industry
        .as_deref()
        .and_then(IndustryBaselineFilter::profile)
        .map(|profile| profile.strict_categories.contains(&category))
        .unwrap_or(false)
}
