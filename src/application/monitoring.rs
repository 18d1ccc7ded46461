//! Health monitoring over the running pipeline.
//!
//! Snapshots are computed from counters the hot path already maintains,
//! so taking one never touches a document.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

use crate::domain::learning::CalibrationState;

/// Dismissal rate above this is a warning sign.
pub const DISMISSAL_WARNING: f64 = 0.20;
/// Dismissal rate above this means users have stopped trusting alerts.
pub const DISMISSAL_CRITICAL: f64 = 0.40;
/// Expected calibration error above this is a warning sign.
pub const ECE_WARNING: f64 = 0.15;
/// Expected calibration error above this means confidences are unusable.
pub const ECE_CRITICAL: f64 = 0.30;

/// Lock-free counters updated by the pipeline after each document.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    documents: AtomicU64,
    total_ms: AtomicU64,
}

impl PipelineMetrics {
    pub fn record_document(&self, elapsed_ms: u64) {
        self.documents.fetch_add(1, Ordering::Relaxed);
        self.total_ms.fetch_add(elapsed_ms, Ordering::Relaxed);
    }

    pub fn documents_processed(&self) -> u64 {
        self.documents.load(Ordering::Relaxed)
    }

    /// Mean end-to-end latency per document, or zero before any work.
    pub fn mean_latency_ms(&self) -> f64 {
        let docs = self.documents.load(Ordering::Relaxed);
        if docs == 0 {
            return 0.0;
        }
        self.total_ms.load(Ordering::Relaxed) as f64 / docs as f64
    }
}

/// Traffic-light health classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

/// Point-in-time view of pipeline health.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSnapshot {
    pub dismissal_rate: f64,
    /// Expected calibration error from the last refit, if one has run.
    pub calibration_error: Option<f64>,
    pub retrain_count: u64,
    pub feedback_total: u64,
    pub documents_processed: u64,
    pub mean_latency_ms: f64,
    pub health: HealthStatus,
}

/// Reads health off the shared calibration state and pipeline counters.
#[derive(Clone)]
pub struct PerformanceMonitor {
    calibration: Arc<CalibrationState>,
    metrics: Arc<PipelineMetrics>,
}

impl PerformanceMonitor {
    pub fn new(calibration: Arc<CalibrationState>, metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            calibration,
            metrics,
        }
    }

    /// Computes the current snapshot. Overall health is the worst of the
    /// dismissal-rate and calibration-error signals.
    pub fn snapshot(&self) -> PerformanceSnapshot {
        let stats = self.calibration.stats();
        let dismissal_rate = stats.dismissal_rate();
        let calibration_error = self.calibration.last_ece();

        let dismissal_health = classify(dismissal_rate, DISMISSAL_WARNING, DISMISSAL_CRITICAL);
        let ece_health = calibration_error
            .map(|ece| classify(ece, ECE_WARNING, ECE_CRITICAL))
            .unwrap_or(HealthStatus::Healthy);
        let health = dismissal_health.max(ece_health);

        if health != HealthStatus::Healthy {
            warn!(
                ?health,
                dismissal_rate,
                ece = ?calibration_error,
                "pipeline health degraded"
            );
        }

        PerformanceSnapshot {
            dismissal_rate,
            calibration_error,
            retrain_count: stats.retrain_count,
            feedback_total: stats.total,
            documents_processed: self.metrics.documents_processed(),
            mean_latency_ms: self.metrics.mean_latency_ms(),
            health,
        }
    }
}

fn classify(value: f64, warning: f64, critical: f64) -> HealthStatus {
    if value > critical {
        HealthStatus::Critical
    } else if value > warning {
        HealthStatus::Warning
    } else {
        HealthStatus::Healthy
    }
}
