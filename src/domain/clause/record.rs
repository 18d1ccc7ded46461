//! The clause record - one segmented unit of a legal document.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DocumentId, ValidationError};

/// One segmented clause of a legal document.
///
/// Immutable once constructed. Produced by the external structure extractor;
/// every detector consumes clauses read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    /// Document this clause belongs to.
    pub document_id: DocumentId,
    /// Section heading the clause appeared under (e.g. "7. Termination").
    pub section: String,
    /// Position of the clause within the document, starting at 1.
    pub clause_number: u32,
    /// Full clause text.
    pub text: String,
}

impl Clause {
    /// Creates a new clause, rejecting empty text.
    pub fn new(
        document_id: DocumentId,
        section: impl Into<String>,
        clause_number: u32,
        text: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::empty_field("text"));
        }
        Ok(Self {
            document_id,
            section: section.into(),
            clause_number,
            text,
        })
    }

    /// Lowercased text, used by the keyword detectors.
    pub fn text_lower(&self) -> String {
        self.text.to_lowercase()
    }

    /// Whitespace-separated word count.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> DocumentId {
        DocumentId::new("doc-1").unwrap()
    }

    #[test]
    fn clause_new_rejects_empty_text() {
        assert!(Clause::new(doc(), "1. Intro", 1, "").is_err());
        assert!(Clause::new(doc(), "1. Intro", 1, "  \n ").is_err());
    }

    #[test]
    fn clause_stores_all_fields() {
        let clause = Clause::new(doc(), "7. Termination", 12, "We may terminate.").unwrap();
        assert_eq!(clause.section, "7. Termination");
        assert_eq!(clause.clause_number, 12);
        assert_eq!(clause.text, "We may terminate.");
    }

    #[test]
    fn word_count_splits_on_whitespace() {
        let clause = Clause::new(doc(), "s", 1, "one two  three\nfour").unwrap();
        assert_eq!(clause.word_count(), 4);
    }
}
