//! Session configuration for the transcription engine.

use std::time::Duration;

use crate::error::EngineError;

/// Maximum age of a streaming recognition connection before it is
/// proactively replaced (4 minutes). Cloud backends impose a maximum
/// streaming session duration; rotating below it keeps recognition
/// uninterrupted.
pub const ROTATION_THRESHOLD: Duration = Duration::from_secs(4 * 60);

/// Configuration for a streaming recognition session.
#[derive(Debug, Clone)]
pub struct RecognitionConfig {
    /// BCP-47 language code sent to the backend
    pub language_code: String,
    /// Sample rate of the decoded linear audio fed to the backend
    pub sample_rate_hz: u32,
    /// Channel count of the decoded linear audio
    pub channel_count: u16,
    /// Whether the backend should emit interim (non-final) results.
    /// Interim results are ignored by the engine either way.
    pub interim_results: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            language_code: "en-US".to_string(),
            sample_rate_hz: 44_100,
            channel_count: 1,
            interim_results: true,
        }
    }
}

impl RecognitionConfig {
    /// Check that the configuration describes a usable recognition session.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.language_code.trim().is_empty() {
            return Err(EngineError::InvalidConfig(
                "language code must not be empty".to_string(),
            ));
        }
        if self.sample_rate_hz == 0 {
            return Err(EngineError::InvalidConfig(
                "sample rate must be non-zero".to_string(),
            ));
        }
        if self.channel_count == 0 {
            return Err(EngineError::InvalidConfig(
                "channel count must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-call configuration for the transcription engine.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Recognition session parameters
    pub recognition: RecognitionConfig,
    /// Maximum streaming connection age before proactive rotation
    pub rotation_threshold: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            recognition: RecognitionConfig::default(),
            rotation_threshold: ROTATION_THRESHOLD,
        }
    }
}

impl SessionConfig {
    /// Check that the whole session configuration is usable.
    pub fn validate(&self) -> Result<(), EngineError> {
        self.recognition.validate()?;
        if self.rotation_threshold.is_zero() {
            return Err(EngineError::InvalidConfig(
                "rotation threshold must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
