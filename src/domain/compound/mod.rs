//! Compound risk module - Stage 4 multi-indicator pattern synthesis.
//!
//! Individual findings can be unremarkable alone and alarming together:
//! auto-renewal plus no-refunds plus a cancellation obstacle is a lock-in
//! trap no single detector sees. A fixed pattern library names these
//! combinations; when every required indicator of a pattern is present in
//! the document's finding set, a document-level compound finding is
//! synthesized and injected into the pool for ranking.

mod detector;
mod pattern;

pub use detector::CompoundRiskDetector;
pub use pattern::{CompoundPatternLibrary, CompoundRiskPattern};
