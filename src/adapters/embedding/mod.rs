//! Embedding adapters.

mod hash;
mod http;

pub use hash::HashEmbedder;
pub use http::{HttpEmbedder, HttpEmbedderConfig};
