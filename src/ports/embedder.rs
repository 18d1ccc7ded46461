//! TextEmbedder port - Interface for embedding service integrations.
//!
//! The semantic detector and the clusterer compare clause texts in embedding
//! space. The embedding backend may be remote and may be down; callers treat
//! every error here as a degradation signal, never a pipeline failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for text embedding services.
///
/// Implementations connect to external embedding backends and must enforce
/// their own request timeouts: no call through this port may block
/// indefinitely.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embeds a single text into a dense vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embeds a batch of texts, preserving order.
    ///
    /// The default implementation calls [`TextEmbedder::embed`] sequentially;
    /// backends with a batch endpoint should override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// Backend information (name, model, output dimensions).
    fn info(&self) -> EmbedderInfo;
}

/// Embedding backend information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedderInfo {
    /// Backend name (e.g. "openai", "local-hash").
    pub name: String,
    /// Model identifier.
    pub model: String,
    /// Output vector dimensions.
    pub dimensions: usize,
}

impl EmbedderInfo {
    /// Creates new embedder info.
    pub fn new(name: impl Into<String>, model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            dimensions,
        }
    }
}

/// Embedding service errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EmbeddingError {
    /// Backend is unreachable or returned a server error.
    #[error("embedding backend unavailable: {message}")]
    Unavailable { message: String },

    /// Request exceeded the configured timeout.
    #[error("embedding request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Rate limited by the backend.
    #[error("embedding backend rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// API key or authentication failed.
    #[error("embedding authentication failed")]
    AuthenticationFailed,

    /// Failed to parse the backend response.
    #[error("embedding parse error: {0}")]
    Parse(String),

    /// The input cannot be embedded (e.g. empty text).
    #[error("invalid embedding input: {0}")]
    InvalidInput(String),
}

impl EmbeddingError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EmbeddingError::Unavailable { .. }
                | EmbeddingError::Timeout { .. }
                | EmbeddingError::RateLimited { .. }
        )
    }
}

/// Cosine similarity between two embedding vectors.
///
/// Returns 0.0 for mismatched lengths or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        dot += f64::from(x) * f64::from(y);
        norm_a += f64::from(x) * f64::from(x);
        norm_b += f64::from(y) * f64::from(y);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
