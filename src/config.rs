use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::io;

/// What a frame below the confidence threshold does to a running confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LowConfidencePolicy {
    /// Discard the frame and restart the run.
    #[default]
    Reset,
    /// Discard the frame and leave the run untouched.
    Ignore,
}

/// Pipeline options. Every field may be omitted from a JSON config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Consecutive qualifying frames needed to confirm a gesture.
    pub confirmation_threshold: u32,
    /// Minimum classifier confidence for a frame to qualify.
    pub confidence_threshold: f32,
    pub low_confidence_policy: LowConfidencePolicy,
    /// Frame deadline for per-hand classification, `None` waits for every hand.
    /// Zero is rejected.
    pub classify_timeout_ms: Option<u64>,
    /// Log landmarks and events to an attached rerun recording.
    pub debug: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confirmation_threshold: 10,
            confidence_threshold: 0.7,
            low_confidence_policy: LowConfidencePolicy::Reset,
            classify_timeout_ms: Some(200),
            debug: false,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.confirmation_threshold == 0 {
            return Err(ConfigError::Invalid(
                "confirmation_threshold must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Invalid(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if self.classify_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "classify_timeout_ms must be at least 1, use null to wait without limit".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads and validates a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<PipelineConfig, ConfigError> {
        let config: PipelineConfig = io::object_from_json::<_, ConfigError>(path)?;
        config.validate()?;
        Ok(config)
    }
}
