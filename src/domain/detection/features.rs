//! Clause feature extraction for the statistical outlier detector.
//!
//! Produces the fixed 9-dimensional vector: character length, sentence count,
//! average sentence length, readability, modal-verb count, negation count,
//! conditional count, risk-keyword count, and legal-jargon density per 100
//! words.

use serde::{Deserialize, Serialize};

/// Number of features extracted per clause.
pub const FEATURE_DIMENSIONS: usize = 9;

const MODAL_VERBS: &[&str] = &[
    "may", "shall", "must", "might", "could", "would", "should", "will", "can",
];

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "neither", "nor", "without", "cannot",
];

const CONDITIONALS: &[&str] = &["if", "unless", "provided", "except", "whereas", "notwithstanding"];

const RISK_KEYWORDS: &[&str] = &[
    "terminate",
    "termination",
    "liability",
    "waive",
    "waiver",
    "arbitration",
    "disclaim",
    "indemnify",
    "forfeit",
    "penalty",
    "irrevocable",
    "perpetual",
    "non-refundable",
    "binding",
];

const LEGAL_JARGON: &[&str] = &[
    "hereinafter",
    "whereas",
    "thereof",
    "herein",
    "notwithstanding",
    "aforementioned",
    "pursuant",
    "hereto",
    "thereto",
    "forthwith",
    "indemnification",
    "severability",
    "heretofore",
    "thereunder",
];

/// The fixed feature vector extracted from one clause.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClauseFeatures {
    pub char_length: f64,
    pub sentence_count: f64,
    pub avg_sentence_length: f64,
    pub readability: f64,
    pub modal_count: f64,
    pub negation_count: f64,
    pub conditional_count: f64,
    pub risk_keyword_count: f64,
    pub jargon_density_per_100: f64,
}

impl ClauseFeatures {
    /// Extracts the feature vector from clause text.
    pub fn extract(text: &str) -> Self {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_ascii_alphanumeric() && c != '\'' && c != '-')
            .filter(|w| !w.is_empty())
            .collect();
        let word_count = words.len();

        let sentence_count = text
            .split(['.', '!', '?', ';'])
            .filter(|s| s.split_whitespace().count() > 1)
            .count()
            .max(1);

        let avg_sentence_length = word_count as f64 / sentence_count as f64;

        let modal_count = count_in(&words, MODAL_VERBS);
        let negation_count = count_in(&words, NEGATIONS);
        let conditional_count = count_in(&words, CONDITIONALS);
        let risk_keyword_count = count_in(&words, RISK_KEYWORDS);
        let jargon_count = count_in(&words, LEGAL_JARGON);

        let jargon_density_per_100 = if word_count == 0 {
            0.0
        } else {
            jargon_count * 100.0 / word_count as f64
        };

        Self {
            char_length: text.chars().count() as f64,
            sentence_count: sentence_count as f64,
            avg_sentence_length,
            readability: flesch_reading_ease(&words, sentence_count),
            modal_count,
            negation_count,
            conditional_count,
            risk_keyword_count,
            jargon_density_per_100,
        }
    }

    /// The feature vector in fixed order.
    pub fn as_vector(&self) -> [f64; FEATURE_DIMENSIONS] {
        [
            self.char_length,
            self.sentence_count,
            self.avg_sentence_length,
            self.readability,
            self.modal_count,
            self.negation_count,
            self.conditional_count,
            self.risk_keyword_count,
            self.jargon_density_per_100,
        ]
    }

    /// Jargon density, reused by the service-type filter's plain-language
    /// disclosure check.
    pub fn jargon_density(&self) -> f64 {
        self.jargon_density_per_100
    }
}

fn count_in(words: &[&str], vocabulary: &[&str]) -> f64 {
    words.iter().filter(|w| vocabulary.contains(w)).count() as f64
}

/// Flesch reading-ease estimate over pre-tokenized words.
///
/// Syllables are approximated by vowel-group counting; good enough for a
/// relative feature, not a linguistic claim.
fn flesch_reading_ease(words: &[&str], sentence_count: usize) -> f64 {
    if words.is_empty() {
        return 100.0;
    }
    let syllables: usize = words.iter().map(|w| estimate_syllables(w)).sum();
    let words_per_sentence = words.len() as f64 / sentence_count as f64;
    let syllables_per_word = syllables as f64 / words.len() as f64;
    206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word
}

fn estimate_syllables(word: &str) -> usize {
    let mut count = 0;
    let mut prev_vowel = false;
    for c in word.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    count.max(1)
}
