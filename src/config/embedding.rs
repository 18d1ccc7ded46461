//! Embedding backend configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ConfigValidationError;
use crate::adapters::HttpEmbedderConfig;

/// Configuration for the remote embedding backend
///
/// With no API key configured the pipeline runs on the in-process
/// deterministic embedder instead of the remote service.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// API key for the embedding service; absent means offline mode
    pub api_key: Option<String>,

    /// Embeddings endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with each request
    #[serde(default = "default_model")]
    pub model: String,

    /// Output vector dimensions
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl EmbeddingConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if a remote backend is configured
    pub fn has_remote(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Build the HTTP client configuration, if a remote backend is
    /// configured
    pub fn http_config(&self) -> Option<HttpEmbedderConfig> {
        let api_key = self.api_key.as_ref().filter(|k| !k.is_empty())?;
        Some(
            HttpEmbedderConfig::new(api_key.clone(), self.endpoint.clone())
                .with_model(self.model.clone())
                .with_dimensions(self.dimensions)
                .with_timeout(self.timeout()),
        )
    }

    /// Validate embedding configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.dimensions == 0 {
            return Err(ConfigValidationError::InvalidEmbeddingDimensions);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigValidationError::InvalidEmbeddingTimeout);
        }
        if self.has_remote() && !self.endpoint.starts_with("http") {
            return Err(ConfigValidationError::InvalidEmbeddingEndpoint);
        }
        Ok(())
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            model: default_model(),
            dimensions: default_dimensions(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/embeddings".to_string()
}

fn default_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_dimensions() -> usize {
    1536
}

fn default_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_defaults() {
        let config = EmbeddingConfig::default();
        assert!(!config.has_remote());
        assert!(config.http_config().is_none());
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_remote_configured_with_key() {
        let config = EmbeddingConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert!(config.has_remote());
        assert!(config.http_config().is_some());
    }

    #[test]
    fn test_empty_key_counts_as_offline() {
        let config = EmbeddingConfig {
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert!(!config.has_remote());
        assert!(config.http_config().is_none());
    }

    #[test]
    fn test_validation_rejects_non_http_endpoint() {
        let config = EmbeddingConfig {
            api_key: Some("sk-test".to_string()),
            endpoint: "ftp://example.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
