//! Active-speaker interval tracking.
//!
//! Converts the media layer's dominant-speaker-change notifications into the
//! speaker-interval sequence consumed by the correlator, and re-targets the
//! audio routing gate so only the new speaker's audio reaches the decode
//! pipeline. The media layer delivers these notifications in real time
//! order; that ordering is a precondition, not something enforced here.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use super::correlator::TranscriptionCorrelator;
use super::routing_gate::AudioRoutingGate;

/// Tracks the current dominant speaker and drives interval production and
/// audio routing.
pub struct ActiveSpeakerTracker {
    correlator: Arc<TranscriptionCorrelator>,
    gate: Arc<AudioRoutingGate>,
    active_producer: Mutex<Option<String>>,
}

impl ActiveSpeakerTracker {
    pub fn new(correlator: Arc<TranscriptionCorrelator>, gate: Arc<AudioRoutingGate>) -> Self {
        Self {
            correlator,
            gate,
            active_producer: Mutex::new(None),
        }
    }

    /// Handle a dominant-speaker-change notification from the media layer.
    ///
    /// A notification for the already-active producer is a no-op: no
    /// duplicate interval, no redundant routing change. Otherwise the
    /// previous interval is closed at `at_ms`, a new open interval begins,
    /// and the routing gate switches to the new producer.
    pub fn on_dominant_speaker_changed(&self, producer_id: &str, user_id: &str, at_ms: i64) {
        let mut active = self.active_producer.lock().unwrap();
        if active.as_deref() == Some(producer_id) {
            debug!(
                "Producer {} is already the dominant speaker, ignoring",
                producer_id
            );
            return;
        }
        info!(
            "Dominant speaker changed to {} (producer {}) at {}",
            user_id, producer_id, at_ms
        );
        *active = Some(producer_id.to_string());
        self.correlator.push_interval(producer_id, user_id, at_ms);
        self.gate.set_allowed(producer_id);
    }

    /// The producer whose audio is currently routed, if any speaker has
    /// been detected yet.
    pub fn active_producer(&self) -> Option<String> {
        self.active_producer.lock().unwrap().clone()
    }
}
