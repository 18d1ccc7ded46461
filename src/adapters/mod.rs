//! Adapters - Concrete implementations of the ports.
//!
//! - `embedding` - a remote HTTP embedding client and a deterministic local
//!   hash embedder for tests and offline mode
//! - `explain` - a deterministic template fallback for explanations

mod embedding;
mod explain;

pub use embedding::{HashEmbedder, HttpEmbedder, HttpEmbedderConfig};
pub use explain::TemplateExplainer;
