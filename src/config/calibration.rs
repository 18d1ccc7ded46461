//! Calibration and feedback configuration

use serde::Deserialize;

use super::error::ConfigValidationError;

/// Configuration for the feedback buffer and calibrator lifecycle
#[derive(Debug, Clone, Deserialize)]
pub struct CalibrationConfig {
    /// Feedback records buffered before a refit triggers
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

impl CalibrationConfig {
    /// Validate calibration configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.buffer_capacity == 0 {
            return Err(ConfigValidationError::InvalidBufferCapacity);
        }
        Ok(())
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

fn default_buffer_capacity() -> usize {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_defaults() {
        let config = CalibrationConfig::default();
        assert_eq!(config.buffer_capacity, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_capacity() {
        let config = CalibrationConfig { buffer_capacity: 0 };
        assert!(config.validate().is_err());
    }
}
