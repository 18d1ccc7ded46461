//! The feedback service - recording user reactions to surfaced alerts.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::domain::foundation::{CalibrationError, FindingId};
use crate::domain::learning::{CalibrationState, FeedbackRecord, UserAction};

/// Acknowledgement returned to the feedback caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackSummary {
    pub total_received: u64,
    pub dismissal_rate: f64,
    /// Records currently awaiting the next refit.
    pub buffered: usize,
    pub retrain_count: u64,
    /// True when the dismissal rate exceeds the quality threshold.
    pub quality_alert: bool,
    /// True when this submission triggered a successful refit.
    pub refit_ran: bool,
}

/// Application service wrapping the shared calibration state.
#[derive(Clone)]
pub struct FeedbackService {
    calibration: Arc<CalibrationState>,
}

impl FeedbackService {
    pub fn new(calibration: Arc<CalibrationState>) -> Self {
        Self { calibration }
    }

    /// Records one piece of user feedback.
    ///
    /// The action string accepts the documented spellings
    /// (`helpful`, `acted_on`, `dismissed`, `false_positive`). Invalid
    /// actions and out-of-range confidences are rejected; a failed refit
    /// surfaces as an error with the buffer preserved for retry.
    pub fn submit(
        &self,
        finding_id: FindingId,
        action: &str,
        confidence_at_detection: f64,
    ) -> Result<FeedbackSummary, CalibrationError> {
        let action: UserAction = action.parse().map_err(CalibrationError::InvalidInput)?;
        let record = FeedbackRecord::new(finding_id, action, confidence_at_detection)?;

        let report = self.calibration.record(record)?;
        let stats = self.calibration.stats();
        debug!(
            finding = %finding_id,
            %action,
            refit = report.is_some(),
            "feedback recorded"
        );

        Ok(FeedbackSummary {
            total_received: stats.total,
            dismissal_rate: stats.dismissal_rate(),
            buffered: stats.buffered,
            retrain_count: stats.retrain_count,
            quality_alert: stats.quality_signal(),
            refit_ran: report.is_some(),
        })
    }
}
