//! Learning module - feedback capture and calibrator lifecycle.
//!
//! User feedback on surfaced findings accumulates in a bounded buffer; when
//! the buffer fills, the calibrator is refitted synchronously from the
//! buffered records. The state object is explicit and injectable so the
//! orchestrator, tests, and the monitor all share one instance without
//! module-level globals.

mod feedback;
mod state;

pub use feedback::{FeedbackRecord, UserAction};
pub use state::{CalibrationState, FeedbackStats, DISMISSAL_RATE_THRESHOLD};
