//! Template explainer - deterministic fallback explanation generation.
//!
//! Used when no LLM-backed generator is configured or when the configured
//! one fails. The wording is a heuristic substitute; callers only rely on
//! the explanation being present and non-empty.

use async_trait::async_trait;

use crate::domain::foundation::Severity;
use crate::ports::{ExplanationError, ExplanationGenerator, ExplanationRequest};

/// Deterministic template-based explanation generator.
#[derive(Debug, Clone, Default)]
pub struct TemplateExplainer;

impl TemplateExplainer {
    /// Creates the explainer.
    pub fn new() -> Self {
        Self
    }

    /// Renders the template synchronously.
    pub fn render(request: &ExplanationRequest) -> String {
        let concern = match request.severity {
            Severity::Low => "is worth being aware of",
            Severity::Medium => "deserves a closer look",
            Severity::High => "could significantly affect you",
            Severity::Critical => "combines multiple risks that could seriously affect you",
        };
        let topic = request.category.replace(['_', '-'], " ");
        format!(
            "This clause {} ({}): it was flagged as \"{}\". Review the original text before agreeing.",
            concern,
            topic,
            request.indicator.replace(['_', '-'], " ")
        )
    }
}

#[async_trait]
impl ExplanationGenerator for TemplateExplainer {
    async fn explain(&self, request: &ExplanationRequest) -> Result<String, ExplanationError> {
        Ok(Self::render(request))
    }
}
