//! Speaker-attributed transcription core.
//!
//! One active speaker's audio is routed through the decode pipeline into a
//! streaming recognition session; recognized words are joined against the
//! speaker-interval timeline to produce attributed transcript lines.
//!
//! ```text
//! media layer ──rtp──► AudioRoutingGate ──► decode pipeline
//!      │                    ▲                     │ pcm
//!      │ dominant           │                     ▼
//!      │ speaker    ActiveSpeakerTracker   SpeechStreamManager
//!      └───────────────────►│                     │ words
//!                 intervals │                     ▼
//!                           └──────► TranscriptionCorrelator ──► listeners
//! ```

mod correlator;
mod interval_queue;
mod routing_gate;
mod speaker_tracker;
mod speech_stream;

pub use correlator::{ListenerId, TranscriptionCorrelator, TranscriptionListener};
pub use interval_queue::IntervalQueue;
pub use routing_gate::AudioRoutingGate;
pub use speaker_tracker::ActiveSpeakerTracker;
pub use speech_stream::{BatchListener, SpeechStreamManager};
