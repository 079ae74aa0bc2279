//! Speech-recognition backend contract.
//!
//! The engine streams decoded linear audio to a cloud recognition backend
//! and receives recognition results with per-word time offsets. The backend
//! implementation (transport, wire protocol, credentials) lives outside this
//! crate; the engine only depends on the traits defined here.
//!
//! Word offsets in a [`RecognitionResult`] are relative to the connection's
//! own audio timeline, not to wall-clock time. Re-anchoring them onto an
//! absolute timeline is the job of
//! [`SpeechStreamManager`](crate::transcription::SpeechStreamManager).

use crate::config::RecognitionConfig;
use crate::error::EngineError;

/// One word boundary reported by the backend. Offsets are milliseconds
/// relative to the connection's audio timeline.
#[derive(Debug, Clone)]
pub struct RecognizedWord {
    /// The recognized text
    pub text: String,
    /// Start offset of the word, in milliseconds
    pub start_offset_ms: i64,
    /// End offset of the word, in milliseconds
    pub end_offset_ms: i64,
}

/// One recognition result from the backend.
#[derive(Debug, Clone)]
pub struct RecognitionResult {
    /// Whether this result is finalized. Interim results may be revised by
    /// later ones and carry no reliable word boundaries.
    pub is_final: bool,
    /// Word boundaries, in recognition order
    pub words: Vec<RecognizedWord>,
}

/// Events surfaced by a streaming connection, in arrival order.
#[derive(Debug, Clone)]
pub enum RecognitionEvent {
    /// A recognition result (interim or final)
    Result(RecognitionResult),
    /// The connection reported an error; a `Closed` event usually follows
    Error(String),
    /// The connection closed (backend-initiated or network failure)
    Closed,
}

/// Callback invoked by the backend for each connection event.
pub type RecognitionEventListener = Box<dyn Fn(RecognitionEvent) + Send + Sync>;

/// An open streaming connection to the recognition backend.
pub trait RecognitionStream: Send {
    /// Write one chunk of decoded linear audio. Must not block the caller
    /// on network I/O.
    fn write(&mut self, chunk: &[u8]) -> Result<(), EngineError>;

    /// Terminate the connection. Safe to call more than once.
    fn close(&mut self);
}

/// Factory for streaming recognition connections.
pub trait SpeechBackend: Send + Sync {
    /// Open a new streaming connection.
    ///
    /// `open` must not invoke `events` before it returns; events are
    /// delivered afterwards, one at a time, from the backend's own context.
    fn open(
        &self,
        config: &RecognitionConfig,
        events: RecognitionEventListener,
    ) -> Result<Box<dyn RecognitionStream>, EngineError>;
}
