//! Detection stage configuration

use serde::Deserialize;

use super::error::ConfigValidationError;

/// Configuration for the Stage-1 detectors and the Stage-3 clusterer
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Cosine similarity above which the semantic detector fires
    #[serde(default = "default_semantic_threshold")]
    pub semantic_threshold: f64,

    /// Token window for any-order fuzzy phrase matching
    #[serde(default = "default_fuzzy_window")]
    pub fuzzy_window: usize,

    /// Expected outlier share used to set the statistical threshold
    #[serde(default = "default_contamination")]
    pub contamination: f64,

    /// Cosine similarity at or above which findings are near-duplicates
    #[serde(default = "default_dedup_threshold")]
    pub dedup_threshold: f64,

    /// DBSCAN neighborhood radius in the projected 2-D space
    #[serde(default = "default_cluster_eps")]
    pub cluster_eps: f64,

    /// DBSCAN density threshold (points, including the candidate itself)
    #[serde(default = "default_cluster_min_points")]
    pub cluster_min_points: usize,
}

impl DetectionConfig {
    /// Validate detection configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.semantic_threshold > 0.0 && self.semantic_threshold <= 1.0) {
            return Err(ConfigValidationError::InvalidSemanticThreshold);
        }
        if self.fuzzy_window == 0 {
            return Err(ConfigValidationError::InvalidFuzzyWindow);
        }
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(ConfigValidationError::InvalidContamination);
        }
        if !(self.dedup_threshold > 0.0 && self.dedup_threshold <= 1.0) {
            return Err(ConfigValidationError::InvalidDedupThreshold);
        }
        if self.cluster_eps <= 0.0 {
            return Err(ConfigValidationError::InvalidClusterEps);
        }
        Ok(())
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            semantic_threshold: default_semantic_threshold(),
            fuzzy_window: default_fuzzy_window(),
            contamination: default_contamination(),
            dedup_threshold: default_dedup_threshold(),
            cluster_eps: default_cluster_eps(),
            cluster_min_points: default_cluster_min_points(),
        }
    }
}

fn default_semantic_threshold() -> f64 {
    0.78
}

fn default_fuzzy_window() -> usize {
    20
}

fn default_contamination() -> f64 {
    0.1
}

fn default_dedup_threshold() -> f64 {
    0.95
}

fn default_cluster_eps() -> f64 {
    0.5
}

fn default_cluster_min_points() -> usize {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(config.semantic_threshold, 0.78);
        assert_eq!(config.fuzzy_window, 20);
        assert_eq!(config.dedup_threshold, 0.95);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_threshold() {
        let config = DetectionConfig {
            semantic_threshold: 1.2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_contamination() {
        let config = DetectionConfig {
            contamination: 0.7,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
