//! Domain layer containing the detection pipeline's business logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `clause` - Input units: clauses and document context
//! - `indicators` - Static taxonomy of named risk patterns
//! - `detection` - Stage 1: the three candidate detectors and merge policy
//! - `context` - Stage 2: industry / service-type / temporal re-weighting
//! - `clustering` - Stage 3: duplicate consolidation and semantic grouping
//! - `compound` - Stage 4: multi-indicator systemic risk synthesis
//! - `calibration` - Stage 5: isotonic confidence calibration
//! - `learning` - Stage 5 support: feedback buffer and active learning
//! - `ranking` - Stage 6: alert scoring and budget allocation

pub mod calibration;
pub mod clause;
pub mod clustering;
pub mod compound;
pub mod context;
pub mod detection;
pub mod foundation;
pub mod indicators;
pub mod learning;
pub mod ranking;
