//! Calibration state - the shared feedback buffer and fitted model.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

use crate::domain::calibration::{CalibratedConfidence, CalibrationReport, ConfidenceCalibrator};
use crate::domain::detection::Finding;
use crate::domain::foundation::{CalibrationError, Confidence};

use super::feedback::FeedbackRecord;

/// Dismissal rate above which the quality signal fires.
pub const DISMISSAL_RATE_THRESHOLD: f64 = 0.20;

/// Default feedback buffer capacity before a refit triggers.
const DEFAULT_CAPACITY: usize = 100;

/// Aggregate counters over all feedback ever recorded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeedbackStats {
    pub total: u64,
    pub dismissals: u64,
    pub buffered: usize,
    pub retrain_count: u64,
}

impl FeedbackStats {
    /// Share of all feedback that dismissed or rejected the finding.
    pub fn dismissal_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.dismissals as f64 / self.total as f64
        }
    }

    /// True when the dismissal rate exceeds the quality threshold.
    pub fn quality_signal(&self) -> bool {
        self.dismissal_rate() > DISMISSAL_RATE_THRESHOLD
    }
}

#[derive(Debug, Default)]
struct Counters {
    total: u64,
    dismissals: u64,
}

/// Shared, injectable calibration state.
///
/// Owns the append-only feedback buffer and the calibrator. Reaching
/// capacity triggers a synchronous refit from the buffered records; the
/// buffer is cleared only when the refit succeeds, so a failure leaves
/// everything in place for the next attempt.
#[derive(Debug)]
pub struct CalibrationState {
    capacity: usize,
    buffer: Mutex<Vec<FeedbackRecord>>,
    counters: Mutex<Counters>,
    calibrator: RwLock<ConfidenceCalibrator>,
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl CalibrationState {
    /// Creates state with the given buffer capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            buffer: Mutex::new(Vec::new()),
            counters: Mutex::new(Counters::default()),
            calibrator: RwLock::new(ConfidenceCalibrator::new()),
        }
    }

    /// Appends one feedback record, refitting when the buffer reaches
    /// capacity.
    ///
    /// Returns the fit report when a refit ran. A failed refit surfaces the
    /// error but preserves the buffer and the prior model.
    pub fn record(
        &self,
        record: FeedbackRecord,
    ) -> Result<Option<CalibrationReport>, CalibrationError> {
        {
            let mut counters = lock(&self.counters);
            counters.total += 1;
            if record.action.is_dismissal() {
                counters.dismissals += 1;
            }
        }

        let mut buffer = lock(&self.buffer);
        buffer.push(record);
        if buffer.len() < self.capacity {
            return Ok(None);
        }

        let raw: Vec<f64> = buffer
            .iter()
            .map(|r| r.confidence_at_detection.value())
            .collect();
        let outcomes: Vec<f64> = buffer.iter().map(|r| r.outcome()).collect();

        // The buffer lock is held across the refit so concurrent appends
        // observe either the full pre-refit buffer or the cleared one.
        let mut calibrator = write(&self.calibrator);
        match calibrator.fit(&raw, &outcomes) {
            Ok(report) => {
                buffer.clear();
                info!(samples = report.samples, "feedback buffer consumed by refit");
                Ok(Some(report))
            }
            Err(err) => {
                warn!(error = %err, buffered = buffer.len(), "refit failed, buffer preserved");
                Err(err)
            }
        }
    }

    /// Calibrates a raw confidence with the current model snapshot.
    pub fn calibrate(&self, raw: Confidence) -> CalibratedConfidence {
        read(&self.calibrator).calibrate(raw)
    }

    /// True once at least one refit has succeeded.
    pub fn is_fitted(&self) -> bool {
        read(&self.calibrator).is_fitted()
    }

    /// ECE from the most recent fit, if any.
    pub fn last_ece(&self) -> Option<f64> {
        read(&self.calibrator).last_report().ok().map(|r| r.ece)
    }

    /// Aggregate feedback counters.
    pub fn stats(&self) -> FeedbackStats {
        let counters = lock(&self.counters);
        FeedbackStats {
            total: counters.total,
            dismissals: counters.dismissals,
            buffered: lock(&self.buffer).len(),
            retrain_count: read(&self.calibrator).retrain_count(),
        }
    }

    /// Selects up to `n` findings whose calibrated confidence is closest to
    /// 0.5, the ones user feedback would teach the most about.
    pub fn select_uncertain<'a>(&self, findings: &'a [Finding], n: usize) -> Vec<&'a Finding> {
        let mut scored: Vec<(f64, &Finding)> = findings
            .iter()
            .map(|f| {
                let calibrated = self.calibrate(f.raw_confidence).calibrated;
                (calibrated.uncertainty_distance(), f)
            })
            .collect();
        scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(n).map(|(_, f)| f).collect()
    }
}

// Poisoned locks carry state that is still internally consistent here
// (counters and append-only buffers), so recover the guard.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn read<T>(rwlock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    match rwlock.read() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn write<T>(rwlock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    match rwlock.write() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::detection::{DetectionMethod, FindingKind};
    use crate::domain::foundation::{FindingId, Severity};
    use crate::domain::learning::UserAction;

    fn record(action: UserAction, confidence: f64) -> FeedbackRecord {
        FeedbackRecord::new(FindingId::new(), action, confidence).unwrap()
    }

    fn finding(confidence: f64) -> Finding {
        Finding {
            id: FindingId::new(),
            clause_index: Some(0),
            section: "1".into(),
            excerpt: "No refunds.".into(),
            indicator: "no_refunds".into(),
            category: "refunds".into(),
            severity: Severity::High,
            raw_confidence: Confidence::new(confidence),
            methods: vec![DetectionMethod::Pattern],
            kind: FindingKind::Pattern {
                matched_phrase: "no refunds".into(),
            },
        }
    }

    #[test]
    fn buffer_below_capacity_does_not_refit() {
        let state = CalibrationState::new(10);
        for _ in 0..9 {
            assert!(state.record(record(UserAction::Helpful, 0.8)).unwrap().is_none());
        }
        assert!(!state.is_fitted());
        assert_eq!(state.stats().buffered, 9);
    }

    #[test]
    fn reaching_capacity_refits_and_clears_buffer() {
        let state = CalibrationState::new(4);
        state.record(record(UserAction::Helpful, 0.9)).unwrap();
        state.record(record(UserAction::Dismissed, 0.3)).unwrap();
        state.record(record(UserAction::ActedOn, 0.8)).unwrap();
        let report = state.record(record(UserAction::FalsePositive, 0.2)).unwrap();

        assert!(report.is_some());
        assert!(state.is_fitted());
        assert_eq!(state.stats().buffered, 0);
        assert_eq!(state.stats().retrain_count, 1);
    }

    #[test]
    fn dismissal_rate_and_quality_signal() {
        let state = CalibrationState::new(100);
        for _ in 0..7 {
            state.record(record(UserAction::Helpful, 0.8)).unwrap();
        }
        for _ in 0..3 {
            state.record(record(UserAction::Dismissed, 0.8)).unwrap();
        }
        let stats = state.stats();
        assert!((stats.dismissal_rate() - 0.3).abs() < 1e-12);
        assert!(stats.quality_signal());
    }

    #[test]
    fn quality_signal_quiet_at_low_dismissal() {
        let state = CalibrationState::new(100);
        for _ in 0..9 {
            state.record(record(UserAction::Helpful, 0.8)).unwrap();
        }
        state.record(record(UserAction::Dismissed, 0.8)).unwrap();
        assert!(!state.stats().quality_signal());
    }

    #[test]
    fn calibrate_passes_through_before_any_refit() {
        let state = CalibrationState::new(100);
        let result = state.calibrate(Confidence::new(0.7));
        assert!(!result.is_calibrated);
        assert_eq!(result.calibrated.value(), 0.7);
    }

    #[test]
    fn select_uncertain_prefers_scores_near_half() {
        let state = CalibrationState::new(100);
        let findings = vec![finding(0.95), finding(0.52), finding(0.1), finding(0.48)];
        let selected = state.select_uncertain(&findings, 2);
        assert_eq!(selected.len(), 2);
        let values: Vec<f64> = selected.iter().map(|f| f.raw_confidence.value()).collect();
        assert!(values.contains(&0.52));
        assert!(values.contains(&0.48));
    }

    #[test]
    fn select_uncertain_caps_at_available_findings() {
        let state = CalibrationState::new(100);
        let findings = vec![finding(0.5)];
        assert_eq!(state.select_uncertain(&findings, 10).len(), 1);
    }
}
