//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Configuration is loaded with the
//! `FINEPRINT_` prefix and nested values use double underscores as
//! separators. Every field has a working default, so an empty environment
//! yields a valid offline configuration.
//!
//! # Example
//!
//! ```no_run
//! use fineprint::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("semantic threshold {}", config.detection.semantic_threshold);
//! ```

mod alerts;
mod calibration;
mod detection;
mod embedding;
mod error;

pub use alerts::AlertConfig;
pub use calibration::CalibrationConfig;
pub use detection::DetectionConfig;
pub use embedding::EmbeddingConfig;
pub use error::{ConfigError, ConfigValidationError};

use serde::Deserialize;

/// Root application configuration
///
/// Contains all configuration sections for the detection pipeline. Load
/// using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Detector and clusterer thresholds
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Alert budget
    #[serde(default)]
    pub alerts: AlertConfig,

    /// Feedback buffer and calibrator lifecycle
    #[serde(default)]
    pub calibration: CalibrationConfig,

    /// Remote embedding backend
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `FINEPRINT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `FINEPRINT__ALERTS__MAX_ALERTS=100` -> `alerts.max_alerts = 100`
    /// - `FINEPRINT__EMBEDDING__API_KEY=...` -> `embedding.api_key = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("FINEPRINT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.detection.validate()?;
        self.alerts.validate()?;
        self.calibration.validate()?;
        self.embedding.validate()?;
        Ok(())
    }
}
