//! Isotonic regression via pool-adjacent-violators.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CalibrationError, ValidationError};

/// A fitted monotone step function from raw score to calibrated probability.
///
/// Immutable once fitted; refits construct a new model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsotonicModel {
    /// Raw-score block boundaries, strictly increasing.
    thresholds: Vec<f64>,
    /// Calibrated value per block, non-decreasing, same length.
    values: Vec<f64>,
}

impl IsotonicModel {
    /// Fits the model from (raw score, binary outcome) pairs.
    ///
    /// Callers validate shape and ranges; this checks only that at least one
    /// pair remains after pooling.
    pub fn fit(raw: &[f64], outcomes: &[f64]) -> Result<Self, CalibrationError> {
        if raw.is_empty() {
            return Err(ValidationError::empty_field("samples").into());
        }
        if raw.len() != outcomes.len() {
            return Err(ValidationError::length_mismatch(
                "raw_confidences",
                "outcomes",
                raw.len(),
                outcomes.len(),
            )
            .into());
        }

        let mut pairs: Vec<(f64, f64)> = raw.iter().copied().zip(outcomes.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        // Pool-adjacent-violators over weighted blocks.
        struct Block {
            x_max: f64,
            sum: f64,
            weight: f64,
        }
        let mut blocks: Vec<Block> = Vec::with_capacity(pairs.len());
        for (x, y) in pairs {
            blocks.push(Block {
                x_max: x,
                sum: y,
                weight: 1.0,
            });
            while blocks.len() >= 2 {
                let n = blocks.len();
                let last = blocks[n - 1].sum / blocks[n - 1].weight;
                let prev = blocks[n - 2].sum / blocks[n - 2].weight;
                if prev <= last {
                    break;
                }
                let merged = Block {
                    x_max: blocks[n - 1].x_max,
                    sum: blocks[n - 1].sum + blocks[n - 2].sum,
                    weight: blocks[n - 1].weight + blocks[n - 2].weight,
                };
                blocks.truncate(n - 2);
                blocks.push(merged);
            }
        }

        let thresholds: Vec<f64> = blocks.iter().map(|b| b.x_max).collect();
        let values: Vec<f64> = blocks.iter().map(|b| b.sum / b.weight).collect();
        Ok(Self { thresholds, values })
    }

    /// Evaluates the step function at `raw`.
    ///
    /// Inputs below the first block clamp to the first value; above the last,
    /// to the last value.
    pub fn predict(&self, raw: f64) -> f64 {
        // partition_point finds the first block whose upper bound covers raw.
        let idx = self.thresholds.partition_point(|&t| t < raw);
        let idx = idx.min(self.values.len() - 1);
        self.values[idx]
    }

    /// Number of pooled blocks in the step function.
    pub fn blocks(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfectly_ordered_data_fits_identity_like_steps() {
        let raw = vec![0.1, 0.3, 0.5, 0.7, 0.9];
        let out = vec![0.0, 0.0, 1.0, 1.0, 1.0];
        let model = IsotonicModel::fit(&raw, &out).unwrap();
        assert!(model.predict(0.1) < model.predict(0.9));
        assert_eq!(model.predict(0.9), 1.0);
        assert_eq!(model.predict(0.1), 0.0);
    }

    #[test]
    fn violators_are_pooled_to_their_mean() {
        // Outcomes decrease with score, so everything pools into one block.
        let raw = vec![0.2, 0.4, 0.6, 0.8];
        let out = vec![1.0, 1.0, 0.0, 0.0];
        let model = IsotonicModel::fit(&raw, &out).unwrap();
        assert_eq!(model.blocks(), 1);
        assert!((model.predict(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn prediction_is_monotone() {
        let raw = vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];
        let out = vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0];
        let model = IsotonicModel::fit(&raw, &out).unwrap();
        let mut prev = f64::NEG_INFINITY;
        for i in 0..=100 {
            let p = model.predict(i as f64 / 100.0);
            assert!(p >= prev);
            prev = p;
        }
    }

    #[test]
    fn out_of_range_inputs_clamp_to_edge_values() {
        let raw = vec![0.3, 0.7];
        let out = vec![0.0, 1.0];
        let model = IsotonicModel::fit(&raw, &out).unwrap();
        assert_eq!(model.predict(0.0), model.predict(0.3));
        assert_eq!(model.predict(1.0), model.predict(0.7));
    }

    #[test]
    fn half_correct_at_same_score_predicts_half() {
        let raw = vec![0.9; 100];
        let out: Vec<f64> = (0..100).map(|i| if i < 50 { 1.0 } else { 0.0 }).collect();
        let model = IsotonicModel::fit(&raw, &out).unwrap();
        assert!((model.predict(0.9) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn fit_rejects_empty_and_mismatched_input() {
        assert!(IsotonicModel::fit(&[], &[]).is_err());
        assert!(IsotonicModel::fit(&[0.5], &[1.0, 0.0]).is_err());
    }
}
