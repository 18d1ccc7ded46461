//! Calibration quality metrics.

/// Number of equal-width bins used for expected calibration error.
pub const ECE_BINS: usize = 10;

/// Expected calibration error over equal-width confidence bins.
///
/// The weighted mean gap between a bin's average predicted confidence and
/// its observed accuracy. Empty input yields 0.0.
pub fn expected_calibration_error(predictions: &[f64], outcomes: &[f64]) -> f64 {
    let n = predictions.len().min(outcomes.len());
    if n == 0 {
        return 0.0;
    }

    let mut bin_conf = [0.0f64; ECE_BINS];
    let mut bin_correct = [0.0f64; ECE_BINS];
    let mut bin_count = [0usize; ECE_BINS];

    for i in 0..n {
        let p = predictions[i].clamp(0.0, 1.0);
        let bin = ((p * ECE_BINS as f64) as usize).min(ECE_BINS - 1);
        bin_conf[bin] += p;
        bin_correct[bin] += outcomes[i];
        bin_count[bin] += 1;
    }

    let mut ece = 0.0;
    for bin in 0..ECE_BINS {
        if bin_count[bin] == 0 {
            continue;
        }
        let count = bin_count[bin] as f64;
        let avg_conf = bin_conf[bin] / count;
        let accuracy = bin_correct[bin] / count;
        ece += (count / n as f64) * (avg_conf - accuracy).abs();
    }
    ece
}

/// Brier score: mean squared error between predictions and binary outcomes.
///
/// Lower is better. Empty input yields 0.0.
pub fn brier_score(predictions: &[f64], outcomes: &[f64]) -> f64 {
    let n = predictions.len().min(outcomes.len());
    if n == 0 {
        return 0.0;
    }
    predictions
        .iter()
        .zip(outcomes.iter())
        .take(n)
        .map(|(p, y)| (p - y).powi(2))
        .sum::<f64>()
        / n as f64
}
