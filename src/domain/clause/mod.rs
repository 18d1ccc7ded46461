//! Clause module - Immutable input units and document context.
//!
//! Clauses are produced by the (external) structure extractor and consumed
//! read-only by every detector. The document context carries the declared
//! industry, service type, and change history that drive Stage-2 re-weighting.

mod context;
mod record;

pub use context::{DocumentContext, ServiceType};
pub use record::Clause;
