//! Collaborator contracts for the media layer and the audio decode pipeline.
//!
//! The SFU/media transport and the audio codec pipeline are external
//! components; the engine consumes them through the traits here. The decode
//! pipeline accepts compressed RTP audio for one producer at a time and
//! asynchronously emits decoded linear-audio chunks. The media layer polls
//! for dominant-speaker changes on a 100 ms cadence and delivers the
//! notifications in real time order; the engine relies on that ordering.

use std::sync::Arc;

use crate::error::EngineError;

/// Codec parameters for a call's audio producers, taken from the first
/// audio producer's RTP parameters.
#[derive(Debug, Clone, Copy)]
pub struct DecodeConfig {
    /// RTP payload type of the audio codec
    pub payload_type: u8,
    /// RTP clock rate in Hz
    pub clock_rate: u32,
}

/// Callback for decoded linear-audio chunks.
pub type PcmListener = Box<dyn Fn(&[u8]) + Send + Sync>;

/// The audio decode pipeline: compressed RTP audio in, linear PCM out.
pub trait DecodePipeline: Send + Sync {
    /// Feed one RTP packet into the pipeline.
    fn receive(&self, rtp_packet: &[u8]);

    /// Register the listener for decoded audio chunks.
    fn on_pcm_ready(&self, listener: PcmListener);

    /// Whether the pipeline has been closed.
    fn closed(&self) -> bool;

    /// Tear down the pipeline. Safe to call more than once.
    fn close(&self);
}

/// Creates a decode pipeline for a call once its codec parameters are known.
pub trait DecodePipelineFactory: Send + Sync {
    fn create(&self, config: &DecodeConfig) -> Result<Arc<dyn DecodePipeline>, EngineError>;
}

/// Transport-level pause/resume of a producer's audio delivery.
///
/// Pausing suspends RTP delivery at the media layer, so audio the engine
/// will not forward is never decoded in the first place.
pub trait ProducerControl: Send + Sync {
    fn pause(&self, producer_id: &str);
    fn resume(&self, producer_id: &str);
}
