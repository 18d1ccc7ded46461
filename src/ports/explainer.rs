//! ExplanationGenerator port - Interface for LLM-backed explanations.
//!
//! Shown alerts carry a short plain-language explanation. Generation is an
//! external collaborator concern (an LLM call that can fail); the pipeline
//! only requires that a non-empty explanation is attached, falling back to a
//! deterministic template when this port errors.

use async_trait::async_trait;

use crate::domain::foundation::Severity;

/// Inputs for generating an explanation of a single finding.
#[derive(Debug, Clone)]
pub struct ExplanationRequest {
    /// Indicator or compound pattern name.
    pub indicator: String,
    /// Risk category.
    pub category: String,
    /// Finding severity.
    pub severity: Severity,
    /// Clause excerpt the finding is tied to.
    pub excerpt: String,
}

/// Port for natural-language explanation generation.
#[async_trait]
pub trait ExplanationGenerator: Send + Sync {
    /// Generates a short plain-language explanation for a finding.
    ///
    /// Must return non-empty text on success. Implementations enforce their
    /// own timeouts.
    async fn explain(&self, request: &ExplanationRequest) -> Result<String, ExplanationError>;
}

/// Explanation generation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExplanationError {
    /// Backend is unreachable.
    #[error("explanation backend unavailable: {message}")]
    Unavailable { message: String },

    /// Request exceeded the configured timeout.
    #[error("explanation request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The backend returned output that could not be used.
    #[error("malformed explanation output: {0}")]
    Malformed(String),
}
