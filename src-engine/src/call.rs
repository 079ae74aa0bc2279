//! Per-call transcription wiring.
//!
//! One [`CallTranscriber`] serves a whole call. It owns the routing gate,
//! the decode pipeline, the speech stream manager, and the correlator, and
//! wires them together: RTP for the allowed producer flows into the decode
//! pipeline, decoded audio flows into the recognition stream, finalized
//! batches flow into the correlator, and attributed transcriptions flow out
//! to registered listeners.
//!
//! The decode pipeline is created lazily when the first audio producer is
//! registered, because its codec parameters come from that producer's RTP
//! parameters.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::backend::SpeechBackend;
use crate::config::SessionConfig;
use crate::error::EngineError;
use crate::media::{DecodeConfig, DecodePipeline, DecodePipelineFactory, ProducerControl};
use crate::transcription::{
    ActiveSpeakerTracker, AudioRoutingGate, ListenerId, SpeechStreamManager,
    TranscriptionCorrelator, TranscriptionListener,
};

/// The transcription subsystem of one call.
pub struct CallTranscriber {
    correlator: Arc<TranscriptionCorrelator>,
    gate: Arc<AudioRoutingGate>,
    tracker: ActiveSpeakerTracker,
    speech: Arc<SpeechStreamManager>,
    decode_factory: Arc<dyn DecodePipelineFactory>,
    decoder: Mutex<Option<Arc<dyn DecodePipeline>>>,
    closed: AtomicBool,
}

impl CallTranscriber {
    /// Validates `config` and wires up the per-call components.
    pub fn new(
        config: SessionConfig,
        backend: Arc<dyn SpeechBackend>,
        decode_factory: Arc<dyn DecodePipelineFactory>,
        control: Arc<dyn ProducerControl>,
    ) -> Result<Arc<Self>, EngineError> {
        config.validate()?;
        let correlator = Arc::new(TranscriptionCorrelator::new());
        let gate = Arc::new(AudioRoutingGate::new(control));
        let tracker = ActiveSpeakerTracker::new(Arc::clone(&correlator), Arc::clone(&gate));
        let speech = SpeechStreamManager::new(backend, config);

        // Finalized recognition batches feed the join engine.
        let words_sink = Arc::clone(&correlator);
        speech.on_batch_ready(Box::new(move |batch| {
            words_sink.push_words(batch.clone());
        }));

        Ok(Arc::new(Self {
            correlator,
            gate,
            tracker,
            speech,
            decode_factory,
            decoder: Mutex::new(None),
            closed: AtomicBool::new(false),
        }))
    }

    /// Register an audio producer as a transcription source.
    ///
    /// The first registration creates the decode pipeline from the
    /// producer's codec parameters and wires its output into the
    /// recognition stream.
    pub fn register_producer(
        &self,
        producer_id: &str,
        decode: &DecodeConfig,
    ) -> Result<(), EngineError> {
        if self.closed.load(Ordering::SeqCst) {
            warn!("Attempted to register a producer on a closed call transcriber");
            return Ok(());
        }
        self.gate.register_producer(producer_id);

        let mut decoder = self.decoder.lock().unwrap();
        if decoder.is_none() {
            let pipeline = self.decode_factory.create(decode)?;
            let speech = Arc::clone(&self.speech);
            pipeline.on_pcm_ready(Box::new(move |pcm| {
                speech.receive(pcm);
            }));
            info!(
                "Decode pipeline created (payload type {}, clock rate {})",
                decode.payload_type, decode.clock_rate
            );
            *decoder = Some(pipeline);
        }
        Ok(())
    }

    /// Remove an audio producer (e.g. the participant left the call).
    pub fn unregister_producer(&self, producer_id: &str) {
        self.gate.unregister_producer(producer_id);
    }

    /// Feed one RTP packet from the media layer. Only packets from the
    /// producer currently allowed by the routing gate continue into the
    /// decode pipeline.
    pub fn receive_rtp(&self, producer_id: &str, rtp_packet: &[u8]) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        if !self.gate.should_forward(producer_id) {
            return;
        }
        let decoder = self.decoder.lock().unwrap();
        if let Some(pipeline) = decoder.as_ref() {
            if !pipeline.closed() {
                pipeline.receive(rtp_packet);
            }
        }
    }

    /// Handle a dominant-speaker-change notification from the media layer.
    pub fn on_dominant_speaker_changed(&self, producer_id: &str, user_id: &str, at_ms: i64) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        self.tracker
            .on_dominant_speaker_changed(producer_id, user_id, at_ms);
    }

    /// Register a listener for emitted transcriptions.
    pub fn on_transcription_emitted(&self, listener: TranscriptionListener) -> ListenerId {
        self.correlator.on_transcription(listener)
    }

    /// Unregister a transcription listener.
    pub fn off_transcription_emitted(&self, id: ListenerId) -> bool {
        self.correlator.off_transcription(id)
    }

    /// Whether `close` has been called.
    pub fn closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Tear down the call's transcription: the decode pipeline and the
    /// recognition stream are closed, and no transcription is delivered
    /// afterwards. Idempotent.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            warn!("Attempted to close the call transcriber twice");
            return;
        }
        let decoder = self.decoder.lock().unwrap();
        if let Some(pipeline) = decoder.as_ref() {
            if !pipeline.closed() {
                pipeline.close();
            }
        }
        self.speech.close();
        info!("Call transcriber closed");
    }
}
