//! Application layer - orchestration over the domain pipeline.
//!
//! - `pipeline` - per-document Stage 1-6 sequencing and batch analysis
//! - `feedback` - the feedback submission service
//! - `monitoring` - off-hot-path health snapshots

mod feedback;
mod monitoring;
mod pipeline;

pub use feedback::{FeedbackService, FeedbackSummary};
pub use monitoring::{HealthStatus, PerformanceMonitor, PerformanceSnapshot, PipelineMetrics};
pub use pipeline::{RiskLevel, RiskPipeline, RiskReport, StageStats};
