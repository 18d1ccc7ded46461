//! The pipeline orchestrator - Stage 1-6 sequencing per document.

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::adapters::TemplateExplainer;
use crate::config::AppConfig;
use crate::domain::calibration::CalibratedConfidence;
use crate::domain::clause::{Clause, DocumentContext};
use crate::domain::clustering::{ClusterEngine, ClusterOutcome};
use crate::domain::compound::{CompoundPatternLibrary, CompoundRiskDetector};
use crate::domain::context::{apply_context_filters, ContextualFinding};
use crate::domain::detection::{
    merge_candidates, Availability, DetectionCandidate, PatternDetector, SemanticDetector,
    StatisticalOutlierDetector,
};
use crate::domain::foundation::{DocumentId, ValidationError};
use crate::domain::indicators::{builtin_baseline_corpus, IndicatorLibrary};
use crate::domain::learning::CalibrationState;
use crate::domain::ranking::{Alert, AlertRanker, RankedAlertSet};
use crate::ports::{ExplanationGenerator, ExplanationRequest, TextEmbedder};

use super::monitoring::PipelineMetrics;

/// Document-level risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Buckets an overall risk score: Low below 4.0, Medium below 7.0,
    /// High at or above.
    pub fn from_score(score: f64) -> Self {
        if score >= 7.0 {
            RiskLevel::High
        } else if score >= 4.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Per-stage counts and timings for one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageStats {
    pub clauses: usize,
    pub candidates: usize,
    pub merged_findings: usize,
    pub kept_findings: usize,
    pub clusters: usize,
    pub compound_findings: usize,
    pub detection_ms: u64,
    pub context_ms: u64,
    pub clustering_ms: u64,
    pub ranking_ms: u64,
    pub total_ms: u64,
}

/// Final output for one analyzed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub document_id: DocumentId,
    pub alerts: RankedAlertSet,
    /// Severity-weighted document score on a 1-10 scale.
    pub overall_risk_score: f64,
    pub risk_level: RiskLevel,
    pub stage_stats: StageStats,
    /// True when any stage ran in a degraded mode.
    pub degraded: bool,
    pub generated_at: DateTime<Utc>,
}

/// The full detection pipeline for one deployment.
///
/// Owns the fitted detectors, the clusterer, the compound library, and the
/// shared calibration state. One instance serves many documents.
pub struct RiskPipeline {
    pattern: PatternDetector,
    semantic: SemanticDetector,
    statistical: StatisticalOutlierDetector,
    clusterer: ClusterEngine,
    compound: CompoundRiskDetector,
    ranker: AlertRanker,
    calibration: Arc<CalibrationState>,
    explainer: Arc<dyn ExplanationGenerator>,
    metrics: Arc<PipelineMetrics>,
}

impl RiskPipeline {
    /// Builds the pipeline: embeds the exemplar table, fits the statistical
    /// baseline, and wires the stages from configuration.
    ///
    /// An unreachable embedding backend yields a degraded (pattern +
    /// statistical only) pipeline, not an error.
    pub async fn initialize(
        config: &AppConfig,
        embedder: Arc<dyn TextEmbedder>,
        explainer: Arc<dyn ExplanationGenerator>,
        calibration: Arc<CalibrationState>,
    ) -> Result<Self, ValidationError> {
        let library = Arc::new(IndicatorLibrary::builtin());

        let semantic = SemanticDetector::initialize(
            embedder.clone(),
            &library,
            config.detection.semantic_threshold,
        )
        .await;

        let mut statistical = StatisticalOutlierDetector::new();
        statistical.fit(&builtin_baseline_corpus(), config.detection.contamination)?;

        let clusterer = ClusterEngine::new(
            embedder,
            config.detection.dedup_threshold,
            config.detection.cluster_eps,
            config.detection.cluster_min_points,
        );

        info!(
            semantic_available = semantic.availability().is_available(),
            "risk pipeline initialized"
        );

        Ok(Self {
            pattern: PatternDetector::new(library, config.detection.fuzzy_window),
            semantic,
            statistical,
            clusterer,
            compound: CompoundRiskDetector::new(CompoundPatternLibrary::builtin()),
            ranker: AlertRanker::new(config.alerts.target_alerts, config.alerts.max_alerts),
            calibration,
            explainer,
            metrics: Arc::new(PipelineMetrics::default()),
        })
    }

    /// Shared calibration state, for the feedback service and monitor.
    pub fn calibration(&self) -> Arc<CalibrationState> {
        self.calibration.clone()
    }

    /// Throughput counters, for the monitor.
    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        self.metrics.clone()
    }

    /// Analyzes one document.
    ///
    /// Never fails: stage-level problems degrade the report and are noted in
    /// the ranking metadata instead of surfacing as errors.
    pub async fn detect(
        &self,
        clauses: &[Clause],
        document_id: DocumentId,
        ctx: &DocumentContext,
    ) -> RiskReport {
        let started = Instant::now();
        let mut stats = StageStats {
            clauses: clauses.len(),
            ..Default::default()
        };
        let mut notes: Vec<String> = Vec::new();

        // Stage 1: the three detectors, joined concurrently.
        let stage_started = Instant::now();
        let (semantic, pattern_candidates, statistical) = tokio::join!(
            self.semantic.detect(clauses),
            async { self.pattern.detect(clauses) },
            async { self.statistical.detect(clauses) },
        );

        let mut candidates: Vec<DetectionCandidate> = pattern_candidates;
        if let Availability::Unavailable { reason } = &semantic.availability {
            notes.push(format!("semantic detector unavailable: {}", reason));
        }
        candidates.extend(semantic.candidates);
        match statistical {
            Ok(statistical_candidates) => candidates.extend(statistical_candidates),
            Err(err) => {
                warn!(error = %err, "statistical detection skipped");
                notes.push(format!("statistical detector skipped: {}", err));
            }
        }
        stats.candidates = candidates.len();

        let findings = merge_candidates(candidates);
        stats.merged_findings = findings.len();
        stats.detection_ms = stage_started.elapsed().as_millis() as u64;

        // Stage 2: context filters.
        let stage_started = Instant::now();
        let now = Utc::now();
        let clause_count = clauses.len();
        let kept: Vec<ContextualFinding> = findings
            .into_iter()
            .map(|finding| {
                let position = position_fraction(finding.clause_index, clause_count);
                apply_context_filters(finding, position, ctx, now)
            })
            .filter(|f| f.keep)
            .collect();
        stats.kept_findings = kept.len();
        stats.context_ms = stage_started.elapsed().as_millis() as u64;

        // Stage 3: clustering.
        let stage_started = Instant::now();
        let ClusterOutcome {
            clusters,
            availability,
        } = self.clusterer.cluster(kept).await;
        if let Availability::Unavailable { reason } = &availability {
            notes.push(format!("clustering degraded: {}", reason));
        }
        stats.clusters = clusters.len();
        stats.clustering_ms = stage_started.elapsed().as_millis() as u64;

        // Stage 4: compound synthesis.
        let compound_findings = self.compound.detect(&clusters);
        stats.compound_findings = compound_findings.len();

        // Stage 5: calibration.
        let stage_started = Instant::now();
        let mut alerts: Vec<Alert> = clusters
            .iter()
            .map(|cluster| {
                let confidence = self.calibrate(cluster.representative.finding.raw_confidence);
                Alert::from_cluster(cluster, confidence)
            })
            .collect();
        alerts.extend(compound_findings.into_iter().map(|finding| {
            let confidence = self.calibrate(finding.raw_confidence);
            Alert::from_compound(finding, confidence)
        }));

        // Stage 6: ranking and budget.
        let degraded = !notes.is_empty();
        let mut ranked = self.ranker.rank(alerts, ctx, notes);
        self.attach_explanations(&mut ranked).await;
        stats.ranking_ms = stage_started.elapsed().as_millis() as u64;

        let overall_risk_score = overall_score(&ranked);
        stats.total_ms = started.elapsed().as_millis() as u64;
        self.metrics.record_document(stats.total_ms);

        info!(
            document = %document_id,
            shown = ranked.total_shown(),
            suppressed = ranked.suppressed.len(),
            score = overall_risk_score,
            "document analyzed"
        );

        RiskReport {
            document_id,
            alerts: ranked,
            overall_risk_score,
            risk_level: RiskLevel::from_score(overall_risk_score),
            stage_stats: stats,
            degraded,
            generated_at: Utc::now(),
        }
    }

    /// Analyzes many documents with bounded concurrency.
    ///
    /// Output order matches input order; a degraded document never affects
    /// its neighbors.
    pub async fn detect_batch(
        &self,
        documents: Vec<(DocumentId, Vec<Clause>, DocumentContext)>,
        concurrency: usize,
    ) -> Vec<RiskReport> {
        futures::stream::iter(documents)
            .map(|(document_id, clauses, ctx)| async move {
                self.detect(&clauses, document_id, &ctx).await
            })
            .buffered(concurrency.max(1))
            .collect()
            .await
    }

    fn calibrate(&self, raw: crate::domain::foundation::Confidence) -> CalibratedConfidence {
        self.calibration.calibrate(raw)
    }

    /// Attaches a non-empty explanation to every shown alert, falling back
    /// to the deterministic template when the generator fails.
    async fn attach_explanations(&self, ranked: &mut RankedAlertSet) {
        for alert in ranked
            .high
            .iter_mut()
            .chain(ranked.medium.iter_mut())
            .chain(ranked.low.iter_mut())
        {
            let request = ExplanationRequest {
                indicator: alert.finding.indicator.clone(),
                category: alert.finding.category.clone(),
                severity: alert.finding.severity,
                excerpt: alert.display_text.clone(),
            };
            let explanation = match self.explainer.explain(&request).await {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) | Err(_) => TemplateExplainer::render(&request),
            };
            alert.explanation = Some(explanation);
        }
    }
}

/// Relative clause position in the document: 0.0 front, 1.0 back.
fn position_fraction(clause_index: Option<usize>, clause_count: usize) -> f64 {
    match clause_index {
        Some(index) if clause_count > 1 => index as f64 / (clause_count - 1) as f64,
        _ => 0.0,
    }
}

/// Severity-weighted document score on a 1-10 scale.
///
/// Mean of severity_weight x calibrated over shown alerts (range 0-4),
/// stretched onto [1, 10]. No shown alerts scores 1.0.
fn overall_score(ranked: &RankedAlertSet) -> f64 {
    let shown: Vec<&Alert> = ranked.shown().collect();
    if shown.is_empty() {
        return 1.0;
    }
    let mean = shown
        .iter()
        .map(|a| a.finding.severity.weight() * a.confidence.calibrated.value())
        .sum::<f64>()
        / shown.len() as f64;
    (1.0 + mean * 2.25).clamp(1.0, 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::HashEmbedder;
    use crate::domain::clause::ServiceType;

    fn doc() -> DocumentId {
        DocumentId::new("doc-1").unwrap()
    }

    fn clause(section: &str, number: u32, text: &str) -> Clause {
        Clause::new(doc(), section, number, text).unwrap()
    }

    async fn pipeline() -> RiskPipeline {
        RiskPipeline::initialize(
            &AppConfig::default(),
            Arc::new(HashEmbedder::new(256)),
            Arc::new(TemplateExplainer::new()),
            Arc::new(CalibrationState::default()),
        )
        .await
        .unwrap()
    }

    #[test]
    fn risk_level_buckets_at_documented_thresholds() {
        assert_eq!(RiskLevel::from_score(1.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(3.99), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(4.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(6.99), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(7.0), RiskLevel::High);
    }

    #[test]
    fn position_fraction_spans_document() {
        assert_eq!(position_fraction(Some(0), 5), 0.0);
        assert_eq!(position_fraction(Some(4), 5), 1.0);
        assert_eq!(position_fraction(Some(0), 1), 0.0);
        assert_eq!(position_fraction(None, 5), 0.0);
    }

    #[tokio::test]
    async fn empty_document_yields_empty_low_report() {
        let p = pipeline().await;
        let report = p.detect(&[], doc(), &DocumentContext::new()).await;

        assert_eq!(report.alerts.total_shown(), 0);
        assert_eq!(report.overall_risk_score, 1.0);
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert!(!report.degraded);
    }

    #[tokio::test]
    async fn termination_clause_surfaces_as_alert() {
        let p = pipeline().await;
        let clauses = vec![clause(
            "7. Termination",
            1,
            "We may terminate your account at any time without notice.",
        )];
        let ctx = DocumentContext::new().with_service_type(ServiceType::Subscription);
        let report = p.detect(&clauses, doc(), &ctx).await;

        let shown: Vec<_> = report.alerts.shown().collect();
        assert!(shown
            .iter()
            .any(|a| a.finding.indicator == "unilateral_termination"));
        // Every shown alert carries a non-empty explanation.
        for alert in shown {
            assert!(alert
                .explanation
                .as_ref()
                .is_some_and(|e| !e.trim().is_empty()));
        }
    }

    #[tokio::test]
    async fn stage_stats_account_for_clause_count() {
        let p = pipeline().await;
        let clauses = vec![
            clause("1", 1, "No refunds will be issued under any circumstances."),
            clause("2", 2, "Your subscription automatically renews each month."),
        ];
        let report = p.detect(&clauses, doc(), &DocumentContext::new()).await;

        assert_eq!(report.stage_stats.clauses, 2);
        assert!(report.stage_stats.candidates >= report.stage_stats.merged_findings);
        assert!(report.stage_stats.kept_findings <= report.stage_stats.merged_findings);
    }

    #[tokio::test]
    async fn pipeline_is_deterministic_without_feedback() {
        let p = pipeline().await;
        let clauses = vec![
            clause("1", 1, "No refunds will be issued under any circumstances."),
            clause("2", 2, "We may terminate your account at any time without notice."),
            clause("3", 3, "Any dispute shall be resolved exclusively through binding arbitration."),
        ];
        let ctx = DocumentContext::new().with_service_type(ServiceType::Subscription);

        let a = p.detect(&clauses, doc(), &ctx).await;
        let b = p.detect(&clauses, doc(), &ctx).await;

        let indicators = |r: &RiskReport| -> Vec<String> {
            r.alerts
                .shown()
                .map(|a| a.finding.indicator.clone())
                .collect()
        };
        assert_eq!(indicators(&a), indicators(&b));
        assert_eq!(a.overall_risk_score, b.overall_risk_score);
        assert_eq!(a.risk_level, b.risk_level);
    }

    #[tokio::test]
    async fn detect_batch_preserves_input_order() {
        let p = pipeline().await;
        let docs: Vec<(DocumentId, Vec<Clause>, DocumentContext)> = (0..4)
            .map(|i| {
                let id = DocumentId::new(format!("doc-{}", i)).unwrap();
                let clauses = vec![Clause::new(
                    id.clone(),
                    "1",
                    1,
                    "All payments are final and non-refundable.",
                )
                .unwrap()];
                (id, clauses, DocumentContext::new())
            })
            .collect();

        let reports = p.detect_batch(docs, 2).await;
        assert_eq!(reports.len(), 4);
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.document_id.as_str(), format!("doc-{}", i));
        }
    }

    #[tokio::test]
    async fn compound_pattern_surfaces_as_top_alert() {
        let p = pipeline().await;
        let clauses = vec![
            clause("3. Billing", 1, "Your subscription automatically renews at the end of each billing period."),
            clause("4. Refunds", 2, "All payments are final and non-refundable."),
            clause("5. Cancellation", 3, "An early termination fee applies if you cancel before the end of your term."),
        ];
        let report = p.detect(&clauses, doc(), &DocumentContext::new()).await;

        let compound: Vec<_> = report
            .alerts
            .shown()
            .filter(|a| a.finding.is_compound())
            .collect();
        assert_eq!(compound.len(), 1);
        assert_eq!(compound[0].finding.indicator, "lock_in_trap");
        assert!(!compound[0].finding.constituents().is_empty());
        // The compound bonus puts it ahead of its constituents.
        let top = report.alerts.shown().next().unwrap();
        assert!(top.finding.is_compound());
    }
}
