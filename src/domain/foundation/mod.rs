//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the Fineprint domain.

mod confidence;
mod errors;
mod ids;
mod severity;

pub use confidence::Confidence;
pub use errors::{CalibrationError, DetectorError, ValidationError};
pub use ids::{DocumentId, FindingId};
pub use severity::Severity;
