//! Ports - Interfaces to external collaborators.
//!
//! The pipeline consumes text embeddings and natural-language explanations
//! from external services; these ports keep the domain independent of how
//! they are produced.

mod embedder;
mod explainer;

pub use embedder::{cosine_similarity, EmbedderInfo, EmbeddingError, TextEmbedder};
pub use explainer::{ExplanationError, ExplanationGenerator, ExplanationRequest};
