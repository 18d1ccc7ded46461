//! HTTP embedding client - TextEmbedder over a remote embedding API.
//!
//! Speaks the common `{"model": ..., "input": [...]}` embeddings shape
//! (OpenAI-compatible). Every request carries the configured timeout so a
//! slow backend degrades the semantic signal instead of hanging the
//! pipeline.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{EmbedderInfo, EmbeddingError, TextEmbedder};

/// Configuration for the HTTP embedding client.
#[derive(Debug, Clone)]
pub struct HttpEmbedderConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Embeddings endpoint URL.
    pub endpoint: String,
    /// Model identifier sent with each request.
    pub model: String,
    /// Output vector dimensions.
    pub dimensions: usize,
    /// Request timeout.
    pub timeout: Duration,
}

impl HttpEmbedderConfig {
    /// Creates a configuration with the given API key and endpoint.
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            endpoint: endpoint.into(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the output dimensions.
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Remote embedding service client.
pub struct HttpEmbedder {
    config: HttpEmbedderConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    /// Creates a client with the given configuration.
    ///
    /// Fails only on TLS initialization problems in the HTTP stack.
    pub fn new(config: HttpEmbedderConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EmbeddingError::unavailable(e.to_string()))?;
        Ok(Self { config, client })
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(EmbeddingError::InvalidInput("empty text in batch".into()));
        }

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(self.config.api_key())
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else {
                    EmbeddingError::unavailable(e.to_string())
                }
            })?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(EmbeddingError::AuthenticationFailed);
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30);
                return Err(EmbeddingError::RateLimited { retry_after_secs });
            }
            status => {
                return Err(EmbeddingError::unavailable(format!(
                    "embedding API returned {}",
                    status
                )));
            }
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::parse(e.to_string()))?;

        if body.data.len() != texts.len() {
            return Err(EmbeddingError::parse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.data.len()
            )));
        }

        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl TextEmbedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let batch = self.request(&[text.to_string()]).await?;
        batch
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::parse("empty embedding response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.request(texts).await
    }

    fn info(&self) -> EmbedderInfo {
        EmbedderInfo::new("http", &self.config.model, self.config.dimensions)
    }
}
