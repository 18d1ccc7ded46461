//! Alert budget configuration

use serde::Deserialize;

use super::error::ConfigValidationError;

/// Configuration for the Stage-6 alert budget
///
/// Defaults follow the documented alert-fatigue intent (5 from the high
/// tier, 10 total); deployments wanting a wider surface override via
/// environment.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    /// Alerts drawn from the HIGH confidence tier
    #[serde(default = "default_target_alerts")]
    pub target_alerts: usize,

    /// Cap on total shown alerts
    #[serde(default = "default_max_alerts")]
    pub max_alerts: usize,
}

impl AlertConfig {
    /// Validate alert configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.max_alerts == 0 {
            return Err(ConfigValidationError::InvalidMaxAlerts);
        }
        if self.target_alerts > self.max_alerts {
            return Err(ConfigValidationError::TargetExceedsMax);
        }
        Ok(())
    }
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            target_alerts: default_target_alerts(),
            max_alerts: default_max_alerts(),
        }
    }
}

fn default_target_alerts() -> usize {
    5
}

fn default_max_alerts() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_defaults() {
        let config = AlertConfig::default();
        assert_eq!(config.target_alerts, 5);
        assert_eq!(config.max_alerts, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_target_above_max() {
        let config = AlertConfig {
            target_alerts: 20,
            max_alerts: 10,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_max() {
        let config = AlertConfig {
            target_alerts: 0,
            max_alerts: 0,
        };
        assert!(config.validate().is_err());
    }
}
