//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ConfigValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("Semantic threshold must lie in (0, 1]")]
    InvalidSemanticThreshold,

    #[error("Fuzzy match window must be at least 1 token")]
    InvalidFuzzyWindow,

    #[error("Outlier contamination must lie in (0, 0.5]")]
    InvalidContamination,

    #[error("Duplicate threshold must lie in (0, 1]")]
    InvalidDedupThreshold,

    #[error("Cluster neighborhood radius must be positive")]
    InvalidClusterEps,

    #[error("Target alerts cannot exceed max alerts")]
    TargetExceedsMax,

    #[error("Max alerts must be at least 1")]
    InvalidMaxAlerts,

    #[error("Feedback buffer capacity must be at least 1")]
    InvalidBufferCapacity,

    #[error("Embedding dimensions must be at least 1")]
    InvalidEmbeddingDimensions,

    #[error("Embedding request timeout must be at least 1 second")]
    InvalidEmbeddingTimeout,

    #[error("Embedding endpoint must be an http(s) URL")]
    InvalidEmbeddingEndpoint,
}
