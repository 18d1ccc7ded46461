//! End-to-end tests over the full detection pipeline with the in-process
//! deterministic embedder.

use std::sync::Arc;

use proptest::prelude::*;

use fineprint::adapters::{HashEmbedder, TemplateExplainer};
use fineprint::application::{FeedbackService, PerformanceMonitor, RiskPipeline};
use fineprint::config::AppConfig;
use fineprint::domain::calibration::{
    CalibratedConfidence, ConfidenceCalibrator, ConfidenceTier,
};
use fineprint::domain::clause::{Clause, DocumentContext, ServiceType};
use fineprint::domain::detection::{DetectionMethod, Finding, FindingKind};
use fineprint::domain::foundation::{Confidence, DocumentId, FindingId, Severity};
use fineprint::domain::learning::CalibrationState;
use fineprint::domain::ranking::{Alert, AlertRanker};

/// Routes pipeline tracing through the test harness; `RUST_LOG` filters it.
fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn doc_id(name: &str) -> DocumentId {
    DocumentId::new(name).unwrap()
}

fn clause(section: &str, number: u32, text: &str) -> Clause {
    Clause::new(doc_id("terms"), section, number, text).unwrap()
}

async fn pipeline_with(calibration: Arc<CalibrationState>) -> RiskPipeline {
    init_tracing();
    RiskPipeline::initialize(
        &AppConfig::default(),
        Arc::new(HashEmbedder::new(256)),
        Arc::new(TemplateExplainer::new()),
        calibration,
    )
    .await
    .unwrap()
}

async fn pipeline() -> RiskPipeline {
    pipeline_with(Arc::new(CalibrationState::default())).await
}

fn subscription_clauses() -> Vec<Clause> {
    vec![
        clause(
            "3. Billing",
            1,
            "Your subscription automatically renews at the end of each billing period.",
        ),
        clause(
            "4. Refunds",
            2,
            "All payments are final and non-refundable.",
        ),
        clause(
            "7. Termination",
            3,
            "We may terminate your account at any time without notice.",
        ),
        clause(
            "12. Disputes",
            4,
            "Any dispute shall be resolved exclusively through binding arbitration.",
        ),
    ]
}

#[tokio::test]
async fn subscription_terms_produce_ranked_explained_alerts() {
    let p = pipeline().await;
    let ctx = DocumentContext::new().with_service_type(ServiceType::Subscription);
    let report = p
        .detect(&subscription_clauses(), doc_id("terms"), &ctx)
        .await;

    assert!(report.alerts.total_shown() > 0);
    assert!(report.overall_risk_score > 1.0);
    assert!(report
        .alerts
        .shown()
        .any(|a| a.finding.indicator == "unilateral_termination"));
    assert!(report
        .alerts
        .shown()
        .any(|a| a.finding.indicator == "binding_arbitration"));

    for alert in report.alerts.shown() {
        assert!(alert
            .explanation
            .as_ref()
            .is_some_and(|e| !e.trim().is_empty()));
        assert!((0.0..=1.0).contains(&alert.confidence.calibrated.value()));
    }

    // Shown alerts come out in descending rank order within each bucket.
    for bucket in [&report.alerts.high, &report.alerts.medium, &report.alerts.low] {
        for pair in bucket.windows(2) {
            assert!(pair[0].rank_score >= pair[1].rank_score);
        }
    }
}

#[tokio::test]
async fn repeated_clauses_consolidate_into_one_alert() {
    let p = pipeline().await;
    let text = "No refunds will be issued under any circumstances.";
    let clauses: Vec<Clause> = (0..5)
        .map(|i| clause(&format!("{}. Section", i + 1), i + 1, text))
        .collect();

    let report = p
        .detect(&clauses, doc_id("terms"), &DocumentContext::new())
        .await;

    let refund_alerts: Vec<&Alert> = report
        .alerts
        .shown()
        .filter(|a| a.finding.indicator == "no_refunds")
        .collect();
    assert_eq!(refund_alerts.len(), 1);

    let alert = refund_alerts[0];
    assert!(alert.cluster_size >= 5);
    assert!(alert.sections.len() >= 5);
    assert!(alert.display_text.contains("similar clauses"));
}

#[tokio::test]
async fn feedback_refit_pulls_overconfident_scores_down() {
    let calibration = Arc::new(CalibrationState::new(100));
    let p = pipeline_with(calibration.clone()).await;
    let feedback = FeedbackService::new(calibration.clone());

    // Half of the 0.9-confidence detections turned out wrong.
    let mut last = None;
    for i in 0..100 {
        let action = if i % 2 == 0 { "helpful" } else { "dismissed" };
        last = Some(feedback.submit(FindingId::new(), action, 0.9).unwrap());
    }
    let last = last.unwrap();
    assert!(last.refit_ran);
    assert_eq!(last.retrain_count, 1);

    let calibrated = calibration.calibrate(Confidence::new(0.9));
    assert!(calibrated.is_calibrated);
    assert!(calibrated.calibrated.value() < 0.6);

    // The pipeline picks the new model up through the shared state.
    let ctx = DocumentContext::new().with_service_type(ServiceType::Subscription);
    let report = p
        .detect(&subscription_clauses(), doc_id("terms"), &ctx)
        .await;
    for alert in report.alerts.shown() {
        assert!(alert.confidence.is_calibrated);
    }
}

#[tokio::test]
async fn monitor_reflects_pipeline_and_feedback_activity() {
    let calibration = Arc::new(CalibrationState::new(100));
    let p = pipeline_with(calibration.clone()).await;
    let monitor = PerformanceMonitor::new(calibration, p.metrics());

    p.detect(&subscription_clauses(), doc_id("terms"), &DocumentContext::new())
        .await;
    p.detect(&subscription_clauses(), doc_id("terms"), &DocumentContext::new())
        .await;

    let snapshot = monitor.snapshot();
    assert_eq!(snapshot.documents_processed, 2);
    assert_eq!(snapshot.feedback_total, 0);
}

#[tokio::test]
async fn analysis_is_idempotent_and_budget_consistent() {
    let p = pipeline().await;
    let ctx = DocumentContext::new().with_service_type(ServiceType::Subscription);
    let clauses = subscription_clauses();

    let a = p.detect(&clauses, doc_id("terms"), &ctx).await;
    let b = p.detect(&clauses, doc_id("terms"), &ctx).await;

    let indicators = |r: &fineprint::application::RiskReport| -> Vec<String> {
        r.alerts
            .shown()
            .map(|a| a.finding.indicator.clone())
            .collect()
    };
    assert_eq!(indicators(&a), indicators(&b));
    assert_eq!(a.overall_risk_score, b.overall_risk_score);

    let meta = &a.alerts.metadata;
    assert!(a.alerts.total_shown() <= meta.max_alerts);
    assert_eq!(
        a.alerts.total_shown() + a.alerts.suppressed.len(),
        meta.total_detected
    );
}

fn synthetic_alert(severity: Severity, calibrated: f64) -> Alert {
    let confidence = Confidence::new(calibrated);
    Alert {
        finding: Finding {
            id: FindingId::new(),
            clause_index: Some(0),
            section: "1".into(),
            excerpt: "We may change these terms at any time.".into(),
            indicator: "unilateral_changes".into(),
            category: "terms_changes".into(),
            severity,
            raw_confidence: confidence,
            methods: vec![DetectionMethod::Pattern],
            kind: FindingKind::Pattern {
                matched_phrase: "change these terms".into(),
            },
        },
        display_text: "We may change these terms at any time.".into(),
        cluster_size: 1,
        sections: vec!["1".into()],
        flags: Vec::new(),
        confidence: CalibratedConfidence {
            raw: confidence,
            calibrated: confidence,
            tier: ConfidenceTier::from_confidence(confidence),
            is_calibrated: true,
        },
        rank_score: 0.0,
        explanation: None,
    }
}

#[test]
fn twenty_high_tier_alerts_respect_the_budget() {
    let alerts: Vec<Alert> = (0..20)
        .map(|_| synthetic_alert(Severity::High, 0.9))
        .collect();
    let ranked = AlertRanker::new(5, 10).rank(alerts, &DocumentContext::new(), Vec::new());

    assert_eq!(ranked.high.len(), 5);
    assert_eq!(ranked.medium.len(), 5);
    assert_eq!(ranked.low.len(), 0);
    assert_eq!(ranked.suppressed.len(), 10);
    assert_eq!(ranked.total_shown(), 10);
    assert_eq!(ranked.metadata.total_detected, 20);
}

proptest! {
    #[test]
    fn ranking_budget_arithmetic_holds(
        specs in prop::collection::vec((0u8..4, 0.0f64..=1.0), 0..40)
    ) {
        let alerts: Vec<Alert> = specs
            .iter()
            .map(|&(sev, conf)| {
                let severity = match sev {
                    0 => Severity::Low,
                    1 => Severity::Medium,
                    2 => Severity::High,
                    _ => Severity::Critical,
                };
                synthetic_alert(severity, conf)
            })
            .collect();
        let total = alerts.len();
        let ranked = AlertRanker::new(5, 10).rank(alerts, &DocumentContext::new(), Vec::new());

        prop_assert!(ranked.total_shown() <= 10);
        prop_assert!(ranked.high.len() <= 5);
        prop_assert_eq!(ranked.total_shown() + ranked.suppressed.len(), total);
    }

    #[test]
    fn fitted_calibration_is_monotone_and_bounded(
        samples in prop::collection::vec((0.0f64..=1.0, prop::bool::ANY), 1..60)
    ) {
        let raw: Vec<f64> = samples.iter().map(|&(r, _)| r).collect();
        let outcomes: Vec<f64> = samples
            .iter()
            .map(|&(_, y)| if y { 1.0 } else { 0.0 })
            .collect();

        let mut cal = ConfidenceCalibrator::new();
        cal.fit(&raw, &outcomes).unwrap();

        let mut prev = 0.0;
        for i in 0..=50 {
            let c = cal.calibrate(Confidence::new(i as f64 / 50.0));
            let v = c.calibrated.value();
            prop_assert!((0.0..=1.0).contains(&v));
            prop_assert!(v >= prev);
            prev = v;
        }
    }
}
