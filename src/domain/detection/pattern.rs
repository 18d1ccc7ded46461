//! Pattern detector - keyword phrase matching against the taxonomy.
//!
//! Deterministic, O(indicators x phrases) per clause. Matches each indicator
//! phrase two ways: exact lowercase substring, and a word-order-insensitive
//! match where every phrase word appears within a small token window.

use std::sync::Arc;
use tracing::debug;

use crate::domain::clause::Clause;
use crate::domain::foundation::Confidence;
use crate::domain::indicators::IndicatorLibrary;

use super::{DetectionCandidate, MethodDetail};

/// Confidence assigned to exact substring matches.
const EXACT_MATCH_CONFIDENCE: f64 = 0.9;

/// Confidence assigned to windowed fuzzy matches.
const FUZZY_MATCH_CONFIDENCE: f64 = 0.7;

/// Rule-based detector over the indicator taxonomy.
#[derive(Debug, Clone)]
pub struct PatternDetector {
    library: Arc<IndicatorLibrary>,
    /// Token window for the word-order-insensitive match.
    window: usize,
}

impl PatternDetector {
    /// Creates a detector over a taxonomy with the given fuzzy window.
    pub fn new(library: Arc<IndicatorLibrary>, window: usize) -> Self {
        Self { library, window }
    }

    /// Runs the detector over a document's clause list.
    ///
    /// At most one candidate per clause+indicator: the best-matching phrase
    /// wins (exact beats fuzzy).
    pub fn detect(&self, clauses: &[Clause]) -> Vec<DetectionCandidate> {
        let mut candidates = Vec::new();
        for (clause_index, clause) in clauses.iter().enumerate() {
            let text = clause.text_lower();
            let tokens = tokenize(&text);
            for indicator in self.library.all() {
                let mut best: Option<(f64, String, bool)> = None;
                for phrase in &indicator.phrases {
                    let phrase_lower = phrase.to_lowercase();
                    if text.contains(&phrase_lower) {
                        best = Some((EXACT_MATCH_CONFIDENCE, phrase.clone(), true));
                        break;
                    }
                    if best.is_none() && words_within_window(&tokens, &phrase_lower, self.window) {
                        best = Some((FUZZY_MATCH_CONFIDENCE, phrase.clone(), false));
                    }
                }
                if let Some((score, matched_phrase, exact)) = best {
                    candidates.push(DetectionCandidate::new(
                        clause_index,
                        clause,
                        &indicator.name,
                        &indicator.category,
                        indicator.severity,
                        Confidence::new(score),
                        MethodDetail::Pattern {
                            matched_phrase,
                            exact,
                        },
                    ));
                }
            }
        }
        debug!(
            clauses = clauses.len(),
            candidates = candidates.len(),
            "pattern detection complete"
        );
        candidates
    }
}

/// Lowercase alphanumeric word tokens.
fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_ascii_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .collect()
}

/// True if every word of `phrase` occurs within some `window`-token span of
/// `tokens`, in any order.
fn words_within_window(tokens: &[&str], phrase: &str, window: usize) -> bool {
    let words: Vec<&str> = phrase
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .collect();
    if words.is_empty() || words.len() > tokens.len() {
        return false;
    }
    // Single-word phrases reduce to token membership.
    if words.len() == 1 {
        return tokens.contains(&words[0]);
    }
    let window = window.max(words.len());
    for start in 0..tokens.len() {
        let end = (start + window).min(tokens.len());
        let span = &tokens[start..end];
        if words.iter().all(|w| span.contains(w)) {
            return true;
        }
        if end == tokens.len() {
            break;
        }
    }
    false
}
