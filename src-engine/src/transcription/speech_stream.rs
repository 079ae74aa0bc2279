//! Speech-recognition stream lifecycle and timestamp continuity.
//!
//! Exactly one streaming connection to the recognition backend is live at a
//! time. The manager opens it on first audio, rotates it before the
//! backend's maximum session duration, reconnects on unexpected close, and
//! re-anchors the backend's relative word offsets onto absolute wall-clock
//! time.
//!
//! ## Anchoring
//!
//! Each connection reports word offsets relative to its own audio timeline.
//! The first finalized batch after a (re)connect is anchored at the
//! wall-clock time the connection was opened; every later batch on the same
//! connection is anchored at the previous batch's end (previous anchor plus
//! the last word's end offset), so consecutive batches form a gapless
//! absolute timeline regardless of where the backend draws batch
//! boundaries. A reconnect resets the anchor to the new connection's open
//! time; audio flows continuously, so absolute timestamps stay meaningful
//! across the bridge even though they are no longer derived from a single
//! monotonic source.

use std::sync::{Arc, Mutex, Weak};

use callscribe_common::{SpeechBatch, Word};
use tracing::{debug, info, warn};

use crate::backend::{
    RecognitionEvent, RecognitionEventListener, RecognitionResult, RecognitionStream,
    SpeechBackend,
};
use crate::config::SessionConfig;
use crate::error::EngineError;

/// Callback invoked once per finalized recognition batch, in arrival order.
///
/// Listeners run inside the manager's lock and must not call back into the
/// manager.
pub type BatchListener = Box<dyn Fn(&SpeechBatch) + Send + Sync>;

struct Inner {
    stream: Option<Box<dyn RecognitionStream>>,
    /// Wall-clock time the current connection was opened
    stream_opened_at_ms: Option<i64>,
    /// Absolute end of the previous batch on the current connection
    last_batch_ended_at_ms: Option<i64>,
    /// Bumped on every (re)connect and on close; events carrying an older
    /// generation belong to a replaced connection and are dropped
    generation: u64,
    closed: bool,
    listeners: Vec<BatchListener>,
}

/// Owns the lifetime of the connection to the speech-recognition backend.
pub struct SpeechStreamManager {
    backend: Arc<dyn SpeechBackend>,
    config: SessionConfig,
    inner: Mutex<Inner>,
}

impl SpeechStreamManager {
    pub fn new(backend: Arc<dyn SpeechBackend>, config: SessionConfig) -> Arc<Self> {
        Arc::new(Self {
            backend,
            config,
            inner: Mutex::new(Inner {
                stream: None,
                stream_opened_at_ms: None,
                last_batch_ended_at_ms: None,
                generation: 0,
                closed: false,
                listeners: Vec::new(),
            }),
        })
    }

    /// Register a listener for finalized recognition batches.
    pub fn on_batch_ready(&self, listener: BatchListener) {
        self.inner.lock().unwrap().listeners.push(listener);
    }

    /// Feed one chunk of decoded linear audio to the backend.
    ///
    /// Opens a connection if none is live, and rotates a connection that has
    /// outlived the rotation threshold before writing. A chunk that arrives
    /// while no connection can be established is dropped; transcription is
    /// best-effort and the next chunk retries.
    pub fn receive(self: &Arc<Self>, chunk: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return;
        }

        let now = now_ms();
        let rotation_threshold_ms = self.config.rotation_threshold.as_millis() as i64;
        let needs_connect = match (inner.stream.is_some(), inner.stream_opened_at_ms) {
            (false, _) => true,
            (true, Some(opened_at_ms)) => now - opened_at_ms > rotation_threshold_ms,
            (true, None) => true,
        };
        if needs_connect {
            if inner.stream.is_some() {
                info!(
                    "Recognition stream exceeded rotation threshold ({}ms), rotating",
                    rotation_threshold_ms
                );
            }
            if let Err(err) = self.connect(&mut inner) {
                warn!("Failed to open recognition stream: {}", err);
                return;
            }
        }

        if let Some(stream) = inner.stream.as_mut() {
            if let Err(err) = stream.write(chunk) {
                warn!("Error writing to recognition stream: {}", err);
            }
        }
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }

    /// Terminate the connection and stop listener delivery. Idempotent; no
    /// listener is invoked after this returns.
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            warn!("Attempted to close the speech stream manager twice");
            return;
        }
        inner.closed = true;
        inner.generation += 1;
        if let Some(mut stream) = inner.stream.take() {
            stream.close();
        }
        info!("Speech stream manager closed");
    }

    /// Replace the current connection (if any) with a fresh one and reset
    /// the anchor to the new connection's open time.
    fn connect(self: &Arc<Self>, inner: &mut Inner) -> Result<(), EngineError> {
        if let Some(mut old) = inner.stream.take() {
            old.close();
        }
        inner.generation += 1;
        let generation = inner.generation;

        let manager = Arc::downgrade(self);
        let events: RecognitionEventListener = Box::new(move |event| {
            if let Some(manager) = Weak::upgrade(&manager) {
                manager.handle_event(generation, event);
            }
        });

        let stream = self.backend.open(&self.config.recognition, events)?;
        inner.stream = Some(stream);
        inner.stream_opened_at_ms = Some(now_ms());
        inner.last_batch_ended_at_ms = None;
        info!("Recognition stream opened (generation {})", generation);
        Ok(())
    }

    fn handle_event(self: &Arc<Self>, generation: u64, event: RecognitionEvent) {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed || generation != inner.generation {
            // A replaced or closed connection may still flush events.
            return;
        }
        match event {
            RecognitionEvent::Result(result) => Self::handle_result(&self.config, &mut inner, result),
            RecognitionEvent::Error(message) => {
                warn!("Recognition stream error: {}", message);
            }
            RecognitionEvent::Closed => {
                info!("Recognition stream closed unexpectedly, reconnecting");
                inner.stream = None;
                if let Err(err) = self.connect(&mut inner) {
                    warn!(
                        "Reconnect failed: {} (retrying on next audio chunk)",
                        err
                    );
                }
            }
        }
    }

    fn handle_result(config: &SessionConfig, inner: &mut Inner, result: RecognitionResult) {
        if !result.is_final {
            return;
        }
        if result.words.is_empty() {
            warn!("Final recognition result has no word boundaries, dropping batch");
            return;
        }
        let Some(opened_at_ms) = inner.stream_opened_at_ms else {
            return;
        };

        let anchor = inner.last_batch_ended_at_ms.unwrap_or(opened_at_ms);
        let mut words = Vec::with_capacity(result.words.len());
        let mut batch_ended_at_ms = anchor;
        for recognized in &result.words {
            words.push(Word {
                text: recognized.text.clone(),
                started_at_ms: anchor + recognized.start_offset_ms,
            });
            batch_ended_at_ms = anchor + recognized.end_offset_ms;
        }
        inner.last_batch_ended_at_ms = Some(batch_ended_at_ms);

        let batch = SpeechBatch {
            language_code: config.recognition.language_code.clone(),
            batch_started_at_ms: anchor,
            words,
        };
        debug!(
            "Recognition batch: {} words anchored at {}",
            batch.words.len(),
            batch.batch_started_at_ms
        );
        for listener in &inner.listeners {
            listener(&batch);
        }
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
