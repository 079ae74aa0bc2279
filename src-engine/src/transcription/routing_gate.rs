//! Producer-keyed pass-through gate for inbound audio.
//!
//! Exactly one speech-recognition stream serves a call, so exactly one
//! producer's audio may flow into the decode pipeline at a time. The gate
//! tracks which producer is allowed through and pauses every other
//! registered producer at the transport level, resuming them when they
//! become the allowed producer again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::media::ProducerControl;

struct GateState {
    allowed: Option<String>,
    /// Registered producers and whether each is currently paused
    producers: HashMap<String, bool>,
}

/// Decides which incoming audio continues downstream to the decode pipeline.
pub struct AudioRoutingGate {
    control: Arc<dyn ProducerControl>,
    state: Mutex<GateState>,
}

impl AudioRoutingGate {
    pub fn new(control: Arc<dyn ProducerControl>) -> Self {
        Self {
            control,
            state: Mutex::new(GateState {
                allowed: None,
                producers: HashMap::new(),
            }),
        }
    }

    /// Register a producer as a routable audio source. Producers start
    /// unpaused, matching how the media layer delivers them.
    pub fn register_producer(&self, producer_id: &str) {
        let mut state = self.state.lock().unwrap();
        if state.producers.contains_key(producer_id) {
            warn!("Producer {} is already registered with the gate", producer_id);
            return;
        }
        state.producers.insert(producer_id.to_string(), false);
    }

    /// Remove a producer from the gate (e.g. the participant left).
    pub fn unregister_producer(&self, producer_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.producers.remove(producer_id);
        if state.allowed.as_deref() == Some(producer_id) {
            state.allowed = None;
        }
    }

    /// Mark one producer as the sole pass-through target, pausing every
    /// other registered producer and resuming the target. Pause/resume is
    /// only issued when a producer's state actually changes.
    pub fn set_allowed(&self, producer_id: &str) {
        let mut state = self.state.lock().unwrap();
        state.allowed = Some(producer_id.to_string());
        for (id, paused) in state.producers.iter_mut() {
            if id == producer_id {
                if *paused {
                    self.control.resume(id);
                    *paused = false;
                }
            } else if !*paused {
                self.control.pause(id);
                *paused = true;
            }
        }
        debug!("Audio routing now allows producer {}", producer_id);
    }

    /// Whether an incoming audio unit from this producer should be
    /// forwarded to the decode pipeline.
    pub fn should_forward(&self, producer_id: &str) -> bool {
        self.state.lock().unwrap().allowed.as_deref() == Some(producer_id)
    }

    /// The currently allowed producer, if any.
    pub fn allowed(&self) -> Option<String> {
        self.state.lock().unwrap().allowed.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingControl {
        ops: Mutex<Vec<String>>,
    }

    impl RecordingControl {
        fn ops(&self) -> Vec<String> {
            self.ops.lock().unwrap().clone()
        }
    }

    impl ProducerControl for RecordingControl {
        fn pause(&self, producer_id: &str) {
            self.ops.lock().unwrap().push(format!("pause:{}", producer_id));
        }

        fn resume(&self, producer_id: &str) {
            self.ops.lock().unwrap().push(format!("resume:{}", producer_id));
        }
    }

    #[test]
    fn test_only_allowed_producer_forwards() {
        let control = Arc::new(RecordingControl::default());
        let gate = AudioRoutingGate::new(Arc::clone(&control) as Arc<dyn ProducerControl>);
        gate.register_producer("p1");
        gate.register_producer("p2");

        assert!(!gate.should_forward("p1"));
        gate.set_allowed("p1");
        assert!(gate.should_forward("p1"));
        assert!(!gate.should_forward("p2"));
        assert_eq!(gate.allowed().as_deref(), Some("p1"));
    }

    #[test]
    fn test_others_paused_and_resumed_on_switch() {
        let control = Arc::new(RecordingControl::default());
        let gate = AudioRoutingGate::new(Arc::clone(&control) as Arc<dyn ProducerControl>);
        gate.register_producer("p1");
        gate.register_producer("p2");

        gate.set_allowed("p1");
        assert_eq!(control.ops(), vec!["pause:p2"]);

        gate.set_allowed("p2");
        let ops = control.ops();
        assert!(ops.contains(&"pause:p1".to_string()));
        assert!(ops.contains(&"resume:p2".to_string()));
    }

    #[test]
    fn test_no_redundant_transport_ops() {
        let control = Arc::new(RecordingControl::default());
        let gate = AudioRoutingGate::new(Arc::clone(&control) as Arc<dyn ProducerControl>);
        gate.register_producer("p1");
        gate.register_producer("p2");

        gate.set_allowed("p1");
        let ops_after_first = control.ops().len();
        // Re-allowing the same producer changes no pause state.
        gate.set_allowed("p1");
        assert_eq!(control.ops().len(), ops_after_first);
    }

    #[test]
    fn test_duplicate_registration_is_noop() {
        let control = Arc::new(RecordingControl::default());
        let gate = AudioRoutingGate::new(Arc::clone(&control) as Arc<dyn ProducerControl>);
        gate.register_producer("p1");
        gate.set_allowed("p1");
        gate.register_producer("p1");
        // Registration again must not reset pause bookkeeping.
        assert!(gate.should_forward("p1"));
    }

    #[test]
    fn test_unregister_clears_allowed() {
        let control = Arc::new(RecordingControl::default());
        let gate = AudioRoutingGate::new(Arc::clone(&control) as Arc<dyn ProducerControl>);
        gate.register_producer("p1");
        gate.set_allowed("p1");

        gate.unregister_producer("p1");
        assert!(!gate.should_forward("p1"));
        assert_eq!(gate.allowed(), None);
    }
}
