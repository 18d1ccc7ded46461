//! Semantic detector - embedding similarity against exemplar phrases.
//!
//! At initialization the detector embeds every indicator's canonical
//! exemplar sentences once. At detection time each clause is embedded and
//! compared by cosine similarity to every exemplar; an indicator fires when
//! the best similarity reaches the threshold.
//!
//! The embedding backend may be remote and may be down. Degradation is a
//! first-class state: construction and every detect call report
//! [`Availability`], and an unavailable detector contributes no candidates
//! rather than an error.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::clause::Clause;
use crate::domain::foundation::{Confidence, Severity};
use crate::domain::indicators::IndicatorLibrary;
use crate::ports::{cosine_similarity, TextEmbedder};

use super::{Availability, DetectionCandidate, MethodDetail};

/// Canonical embeddings for one indicator.
#[derive(Debug, Clone)]
struct IndicatorExemplars {
    name: String,
    category: String,
    severity: Severity,
    embeddings: Vec<Vec<f32>>,
}

/// Result of one semantic detection pass.
#[derive(Debug, Clone)]
pub struct SemanticDetection {
    /// Candidates produced; empty when unavailable.
    pub candidates: Vec<DetectionCandidate>,
    /// Whether the embedding backend answered for this pass.
    pub availability: Availability,
}

impl SemanticDetection {
    fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            candidates: Vec::new(),
            availability: Availability::unavailable(reason),
        }
    }
}

/// Embedding-similarity detector over the indicator taxonomy.
pub struct SemanticDetector {
    embedder: Arc<dyn TextEmbedder>,
    threshold: f64,
    exemplars: Vec<IndicatorExemplars>,
    availability: Availability,
}

impl SemanticDetector {
    /// Builds the detector, embedding all exemplar phrases once.
    ///
    /// When the backend is unreachable the detector is constructed in the
    /// unavailable state instead of failing; the orchestrator checks
    /// [`SemanticDetector::availability`].
    pub async fn initialize(
        embedder: Arc<dyn TextEmbedder>,
        library: &IndicatorLibrary,
        threshold: f64,
    ) -> Self {
        let mut exemplars = Vec::new();
        for indicator in library.all() {
            if indicator.exemplars.is_empty() {
                continue;
            }
            match embedder.embed_batch(&indicator.exemplars).await {
                Ok(embeddings) => exemplars.push(IndicatorExemplars {
                    name: indicator.name.clone(),
                    category: indicator.category.clone(),
                    severity: indicator.severity,
                    embeddings,
                }),
                Err(err) => {
                    warn!(
                        indicator = %indicator.name,
                        error = %err,
                        "semantic detector initialization failed; running unavailable"
                    );
                    return Self {
                        embedder,
                        threshold,
                        exemplars: Vec::new(),
                        availability: Availability::unavailable(format!(
                            "exemplar embedding failed: {}",
                            err
                        )),
                    };
                }
            }
        }
        debug!(
            indicators = exemplars.len(),
            threshold, "semantic detector initialized"
        );
        Self {
            embedder,
            threshold,
            exemplars,
            availability: Availability::Available,
        }
    }

    /// Capability state decided at construction.
    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    /// Runs the detector over a document's clause list.
    pub async fn detect(&self, clauses: &[Clause]) -> SemanticDetection {
        if let Availability::Unavailable { reason } = &self.availability {
            return SemanticDetection::unavailable(reason.clone());
        }

        let texts: Vec<String> = clauses.iter().map(|c| c.text.clone()).collect();
        let clause_embeddings = match self.embedder.embed_batch(&texts).await {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "semantic detection degraded: embedding backend failed");
                return SemanticDetection::unavailable(err.to_string());
            }
        };

        let mut candidates = Vec::new();
        for (clause_index, (clause, embedding)) in
            clauses.iter().zip(clause_embeddings.iter()).enumerate()
        {
            for indicator in &self.exemplars {
                let best = indicator
                    .embeddings
                    .iter()
                    .map(|ex| cosine_similarity(embedding, ex))
                    .fold(f64::NEG_INFINITY, f64::max);
                if best >= self.threshold {
                    candidates.push(DetectionCandidate::new(
                        clause_index,
                        clause,
                        &indicator.name,
                        &indicator.category,
                        indicator.severity,
                        Confidence::new(self.rescale(best)),
                        MethodDetail::Semantic { similarity: best },
                    ));
                }
            }
        }
        SemanticDetection {
            candidates,
            availability: Availability::Available,
        }
    }

    /// Linear rescale of a similarity at-or-above the threshold into [0.5, 1].
    fn rescale(&self, similarity: f64) -> f64 {
        if self.threshold >= 1.0 {
            return 1.0;
        }
        let above = (similarity - self.threshold) / (1.0 - self.threshold);
        0.5 + 0.5 * above.clamp(0.0, 1.0)
    }
}
