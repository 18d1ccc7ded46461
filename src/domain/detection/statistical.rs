//! Statistical outlier detector - baseline deviation scoring.
//!
//! Requires a one-time fit over a baseline corpus. The fit computes a
//! per-feature z-score scaler and the distance threshold above which a
//! clause counts as anomalous (the contamination quantile of the baseline's
//! own distances). Queried before fitting it returns `NotFitted`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::clause::Clause;
use crate::domain::foundation::{Confidence, DetectorError, Severity, ValidationError};
use crate::domain::indicators::{OUTLIER_CATEGORY, OUTLIER_INDICATOR};

use super::features::{ClauseFeatures, FEATURE_DIMENSIONS};
use super::{DetectionCandidate, MethodDetail};

/// Minimum baseline size for a meaningful fit.
const MIN_BASELINE: usize = 5;

/// Variance floor so constant features do not blow up z-scores.
const STD_FLOOR: f64 = 1e-6;

/// Confidence floor for flagged outliers.
const OUTLIER_CONFIDENCE_FLOOR: f64 = 0.5;

/// The immutable fitted model: feature scaler plus anomaly threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FittedModel {
    means: [f64; FEATURE_DIMENSIONS],
    stds: [f64; FEATURE_DIMENSIONS],
    threshold: f64,
}

impl FittedModel {
    /// Normalized distance of a feature vector from the baseline centroid
    /// (root mean square of z-scores).
    fn distance(&self, features: &ClauseFeatures) -> f64 {
        let v = features.as_vector();
        let mut sum = 0.0;
        for i in 0..FEATURE_DIMENSIONS {
            let z = (v[i] - self.means[i]) / self.stds[i];
            sum += z * z;
        }
        (sum / FEATURE_DIMENSIONS as f64).sqrt()
    }
}

/// Detector flagging clauses whose feature vectors deviate from a baseline
/// corpus distribution.
#[derive(Debug, Clone, Default)]
pub struct StatisticalOutlierDetector {
    model: Option<FittedModel>,
}

impl StatisticalOutlierDetector {
    /// Creates an unfitted detector.
    pub fn new() -> Self {
        Self { model: None }
    }

    /// True once [`StatisticalOutlierDetector::fit`] has succeeded.
    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    /// One-time fit over a baseline corpus of ordinary clause texts.
    ///
    /// `contamination` is the expected outlier fraction (0, 0.5]; the anomaly
    /// threshold is the (1 - contamination) quantile of the baseline's own
    /// distances.
    pub fn fit(&mut self, baseline: &[String], contamination: f64) -> Result<(), ValidationError> {
        if baseline.len() < MIN_BASELINE {
            return Err(ValidationError::out_of_range(
                "baseline",
                MIN_BASELINE as f64,
                f64::MAX,
                baseline.len() as f64,
            ));
        }
        if !(0.0..=0.5).contains(&contamination) || contamination == 0.0 {
            return Err(ValidationError::out_of_range(
                "contamination",
                0.0,
                0.5,
                contamination,
            ));
        }

        let vectors: Vec<[f64; FEATURE_DIMENSIONS]> = baseline
            .iter()
            .map(|text| ClauseFeatures::extract(text).as_vector())
            .collect();

        let n = vectors.len() as f64;
        let mut means = [0.0; FEATURE_DIMENSIONS];
        for v in &vectors {
            for i in 0..FEATURE_DIMENSIONS {
                means[i] += v[i];
            }
        }
        for m in &mut means {
            *m /= n;
        }

        let mut stds = [0.0; FEATURE_DIMENSIONS];
        for v in &vectors {
            for i in 0..FEATURE_DIMENSIONS {
                let d = v[i] - means[i];
                stds[i] += d * d;
            }
        }
        for s in &mut stds {
            *s = (*s / n).sqrt().max(STD_FLOOR);
        }

        let mut model = FittedModel {
            means,
            stds,
            threshold: 0.0,
        };

        let mut distances: Vec<f64> = baseline
            .iter()
            .map(|text| model.distance(&ClauseFeatures::extract(text)))
            .collect();
        distances.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let quantile_index =
            (((1.0 - contamination) * (distances.len() - 1) as f64).round() as usize)
                .min(distances.len() - 1);
        model.threshold = distances[quantile_index].max(STD_FLOOR);

        debug!(
            baseline = baseline.len(),
            threshold = model.threshold,
            "statistical detector fitted"
        );
        self.model = Some(model);
        Ok(())
    }

    /// Scores one clause; `Some` when it falls in the anomalous region.
    pub fn score(
        &self,
        clause_index: usize,
        clause: &Clause,
    ) -> Result<Option<DetectionCandidate>, DetectorError> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| DetectorError::not_fitted("statistical"))?;

        let features = ClauseFeatures::extract(&clause.text);
        let distance = model.distance(&features);
        if distance <= model.threshold {
            return Ok(None);
        }

        // Distance-derived confidence with a 0.5 floor for flagged outliers.
        let excess = (distance - model.threshold) / model.threshold;
        let confidence = (OUTLIER_CONFIDENCE_FLOOR + 0.5 * excess)
            .clamp(OUTLIER_CONFIDENCE_FLOOR, 1.0);

        Ok(Some(DetectionCandidate::new(
            clause_index,
            clause,
            OUTLIER_INDICATOR,
            OUTLIER_CATEGORY,
            Severity::Medium,
            Confidence::new(confidence),
            MethodDetail::Statistical {
                anomaly_score: distance,
            },
        )))
    }

    /// Runs the detector over a document's clause list.
    pub fn detect(&self, clauses: &[Clause]) -> Result<Vec<DetectionCandidate>, DetectorError> {
        let mut candidates = Vec::new();
        for (idx, clause) in clauses.iter().enumerate() {
            if let Some(candidate) = self.score(idx, clause)? {
                candidates.push(candidate);
            }
        }
        Ok(candidates)
    }
}
