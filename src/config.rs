//! Analysis configuration: business-rule parameters and the per-method
//! time-cost constants behind the efficiency metric.

use crate::data::schema::methods;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("time cost for {method} must be a positive number of minutes, got {minutes}")]
    NonPositiveTimeCost { method: &'static str, minutes: f64 },
    #[error("years_as_customer cap must be at least 1")]
    ZeroTenureCap,
}

/// Corrective action for tenure values above the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenurePolicy {
    /// Replace the value with the cap.
    #[default]
    Clip,
    /// Remove the offending row.
    Drop,
    /// Keep the value, record the violation only.
    Flag,
}

/// Estimated minutes of effort per interaction, by sales method.
///
/// These are configuration inputs, never derived from the data. The defaults
/// reflect the campaign's own effort estimates: an email costs next to
/// nothing, a call averages half an hour, the combined approach adds about
/// ten minutes of call time on top of the email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeCosts {
    pub email_minutes: f64,
    pub call_minutes: f64,
    pub email_and_call_minutes: f64,
}

impl Default for TimeCosts {
    fn default() -> Self {
        Self {
            email_minutes: 1.0,
            call_minutes: 30.0,
            email_and_call_minutes: 10.0,
        }
    }
}

impl TimeCosts {
    /// Minutes per interaction for a canonical method name.
    pub fn minutes_for(&self, method: &str) -> Option<f64> {
        match method {
            methods::EMAIL => Some(self.email_minutes),
            methods::CALL => Some(self.call_minutes),
            methods::EMAIL_AND_CALL => Some(self.email_and_call_minutes),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let costs = [
            (methods::EMAIL, self.email_minutes),
            (methods::CALL, self.call_minutes),
            (methods::EMAIL_AND_CALL, self.email_and_call_minutes),
        ];
        for (method, minutes) in costs {
            if !(minutes.is_finite() && minutes > 0.0) {
                return Err(ConfigError::NonPositiveTimeCost { method, minutes });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Largest valid `years_as_customer` (the business is 40 years old).
    pub tenure_cap: i64,
    pub tenure_policy: TenurePolicy,
    pub time_costs: TimeCosts,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tenure_cap: 39,
            tenure_policy: TenurePolicy::default(),
            time_costs: TimeCosts::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tenure_cap < 1 {
            return Err(ConfigError::ZeroTenureCap);
        }
        self.time_costs.validate()
    }
}
