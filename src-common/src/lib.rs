//! Callscribe Common Library
//!
//! Shared data-model types for the callscribe transcription engine and the
//! call-service components that consume it.

pub mod logging;
pub mod types;

pub use types::*;
