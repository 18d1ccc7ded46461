//! Fineprint - Risk Detection & Ranking Pipeline
//!
//! This crate flags risky or unusual clauses in consumer legal documents
//! (Terms & Conditions, privacy policies) and surfaces a bounded, ranked set
//! of alerts, continuously improving its confidence estimates from user
//! feedback.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
