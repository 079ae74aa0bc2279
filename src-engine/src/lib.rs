//! Speaker-attributed transcription for multi-party calls.
//!
//! The engine sits between a call service's media layer and a streaming
//! speech-recognition backend. It tracks the dominant speaker, routes only
//! that speaker's audio through the decode pipeline into the recognition
//! stream, keeps the stream alive across provider-imposed connection limits,
//! and joins recognized words against the speaker timeline to emit
//! [`callscribe_common::Transcription`] lines attributed to the right user.
//!
//! [`call::CallTranscriber`] is the entry point: one instance per call,
//! constructed with the service's [`backend::SpeechBackend`],
//! [`media::DecodePipelineFactory`], and [`media::ProducerControl`]
//! implementations.

pub mod backend;
pub mod call;
pub mod config;
pub mod error;
pub mod media;
pub mod transcription;

pub use call::CallTranscriber;
pub use config::{RecognitionConfig, SessionConfig};
pub use error::EngineError;
pub use transcription::{ListenerId, TranscriptionListener};
