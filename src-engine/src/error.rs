//! Error types for the transcription engine.
//!
//! Nothing in this engine is fatal to a call: recoverable conditions are
//! logged and absorbed at the component boundary, and the worst user-visible
//! effect of a failure is a gap in transcript delivery.

use std::fmt;

/// Error type for transcription engine operations.
#[derive(Debug)]
pub enum EngineError {
    /// The speech backend refused or dropped a connection
    Backend(String),
    /// A write was attempted on a stream that is already closed
    StreamClosed,
    /// The decode pipeline could not be created or failed
    Decode(String),
    /// Invalid session configuration
    InvalidConfig(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Backend(msg) => write!(f, "Speech backend error: {}", msg),
            EngineError::StreamClosed => write!(f, "Recognition stream is closed"),
            EngineError::Decode(msg) => write!(f, "Decode pipeline error: {}", msg),
            EngineError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<EngineError> for String {
    fn from(err: EngineError) -> Self {
        err.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            EngineError::Backend("no route".into()).to_string(),
            "Speech backend error: no route"
        );
        assert_eq!(
            EngineError::StreamClosed.to_string(),
            "Recognition stream is closed"
        );
    }
}
