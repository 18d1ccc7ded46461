//! Temporal filter - recency-of-change decay.
//!
//! Change-triggered findings are boosted while the change is fresh and decay
//! back to neutral after 90 days. Static (non-change) analyses are always
//! neutral. Missing or future change dates fall back to neutral with a
//! warning flag.

use chrono::{DateTime, Utc};

use crate::domain::clause::DocumentContext;

use super::ContextFlag;

/// Days after which a policy counts as very old (informational only).
const VERY_OLD_DAYS: i64 = 5 * 365;

/// Result of the temporal filter.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalAdjustment {
    /// Recency multiplier applied to the finding score.
    pub multiplier: f64,
    /// Flags raised while filtering.
    pub flags: Vec<ContextFlag>,
}

/// The temporal filter.
pub struct TemporalFilter;

impl TemporalFilter {
    /// Computes the decay multiplier for a document context at time `now`.
    pub fn apply(ctx: &DocumentContext, now: DateTime<Utc>) -> TemporalAdjustment {
        if !ctx.is_change {
            // Long-standing clauses are never boosted, but a known old
            // change date still earns the informational flag.
            let mut flags = Vec::new();
            if let Some(date) = ctx.change_date {
                if (now - date).num_days() > VERY_OLD_DAYS {
                    flags.push(ContextFlag::VeryOldPolicy);
                }
            }
            return TemporalAdjustment {
                multiplier: 1.0,
                flags,
            };
        }

        let Some(change_date) = ctx.change_date else {
            return TemporalAdjustment {
                multiplier: 1.0,
                flags: vec![ContextFlag::MissingChangeDate],
            };
        };

        let days = (now - change_date).num_days();
        if days < 0 {
            return TemporalAdjustment {
                multiplier: 1.0,
                flags: vec![ContextFlag::FutureChangeDate],
            };
        }

        let mut flags = Vec::new();
        let multiplier = match days {
            0..=30 => 3.0,
            31..=60 => 2.0,
            61..=90 => 1.5,
            _ => 1.0,
        };
        if days <= 90 {
            flags.push(ContextFlag::RecentChange);
        }
        if days > VERY_OLD_DAYS {
            flags.push(ContextFlag::VeryOldPolicy);
        }

        TemporalAdjustment { multiplier, flags }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn change_ctx(days_ago: i64, now: DateTime<Utc>) -> DocumentContext {
        DocumentContext::new().with_change(Some(now - Duration::days(days_ago)))
    }

    #[test]
    fn decay_ladder_matches_day_buckets() {
        let now = Utc::now();
        assert_eq!(TemporalFilter::apply(&change_ctx(10, now), now).multiplier, 3.0);
        assert_eq!(TemporalFilter::apply(&change_ctx(30, now), now).multiplier, 3.0);
        assert_eq!(TemporalFilter::apply(&change_ctx(45, now), now).multiplier, 2.0);
        assert_eq!(TemporalFilter::apply(&change_ctx(75, now), now).multiplier, 1.5);
        assert_eq!(TemporalFilter::apply(&change_ctx(120, now), now).multiplier, 1.0);
    }

    #[test]
    fn static_clauses_are_always_neutral() {
        let now = Utc::now();
        let ctx = DocumentContext::new();
        let adj = TemporalFilter::apply(&ctx, now);
        assert_eq!(adj.multiplier, 1.0);
        assert!(adj.flags.is_empty());
    }

    #[test]
    fn missing_date_on_change_is_neutral_with_warning() {
        let now = Utc::now();
        let mut ctx = DocumentContext::new();
        ctx.is_change = true;
        let adj = TemporalFilter::apply(&ctx, now);
        assert_eq!(adj.multiplier, 1.0);
        assert_eq!(adj.flags, vec![ContextFlag::MissingChangeDate]);
    }

    #[test]
    fn future_date_is_neutral_with_warning() {
        let now = Utc::now();
        let ctx = DocumentContext::new().with_change(Some(now + Duration::days(30)));
        let adj = TemporalFilter::apply(&ctx, now);
        assert_eq!(adj.multiplier, 1.0);
        assert_eq!(adj.flags, vec![ContextFlag::FutureChangeDate]);
    }

    #[test]
    fn very_old_policy_is_flagged_informationally() {
        let now = Utc::now();
        let adj = TemporalFilter::apply(&change_ctx(6 * 365, now), now);
        assert_eq!(adj.multiplier, 1.0);
        assert!(adj.flags.contains(&ContextFlag::VeryOldPolicy));
    }

    #[test]
    fn recent_change_is_flagged() {
        let now = Utc::now();
        let adj = TemporalFilter::apply(&change_ctx(5, now), now);
        assert!(adj.flags.contains(&ContextFlag::RecentChange));
    }
}
