//! The transcription join engine.
//!
//! Correlates two independently-paced, unbounded event sequences — recognized
//! words and speaker intervals — and emits speaker-attributed transcript
//! lines. Words and intervals share one absolute timeline (epoch
//! milliseconds); the join walks both buffers from the head and attributes
//! each word to the interval whose window contains its start time.
//!
//! The correlator is the single owner of both buffers. Producers append
//! through [`push_words`](TranscriptionCorrelator::push_words) and
//! [`push_interval`](TranscriptionCorrelator::push_interval); all queue
//! mutation happens under one lock, which is the per-call single-writer
//! discipline the rest of the engine relies on.

use std::sync::Mutex;

use callscribe_common::{SpeakerInterval, SpeechBatch, Transcription, Word};
use tracing::{debug, warn};

use super::interval_queue::IntervalQueue;

/// Callback invoked once per emitted transcription, in emission order.
///
/// Listeners run inside the correlator's lock and must not call back into
/// the correlator.
pub type TranscriptionListener = Box<dyn Fn(&Transcription) + Send + Sync>;

/// Handle for a registered transcription listener, used to unregister it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

struct Inner {
    words: IntervalQueue<Word>,
    speakers: IntervalQueue<SpeakerInterval>,
    listeners: Vec<(ListenerId, TranscriptionListener)>,
    next_listener_id: u64,
}

/// Joins the word stream against the speaker-interval stream and emits
/// attributed [`Transcription`] records.
pub struct TranscriptionCorrelator {
    inner: Mutex<Inner>,
}

impl TranscriptionCorrelator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                words: IntervalQueue::new(),
                speakers: IntervalQueue::new(),
                listeners: Vec::new(),
                next_listener_id: 0,
            }),
        }
    }

    /// Register a listener for emitted transcriptions.
    pub fn on_transcription(&self, listener: TranscriptionListener) -> ListenerId {
        let mut inner = self.inner.lock().unwrap();
        let id = ListenerId(inner.next_listener_id);
        inner.next_listener_id += 1;
        inner.listeners.push((id, listener));
        id
    }

    /// Unregister a previously registered listener. Returns whether a
    /// listener with that id was found.
    pub fn off_transcription(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.listeners.len();
        inner.listeners.retain(|(listener_id, _)| *listener_id != id);
        if inner.listeners.len() == before {
            warn!("Attempted to unregister an unknown transcription listener");
            return false;
        }
        true
    }

    /// Append a finalized recognition batch to the word buffer and drain
    /// every transcription that can now be attributed.
    pub fn push_words(&self, batch: SpeechBatch) {
        let mut inner = self.inner.lock().unwrap();
        debug!(
            "Buffering {} words (batch started at {})",
            batch.words.len(),
            batch.batch_started_at_ms
        );
        inner.words.extend(batch.words);
        Self::drain(&mut inner);
    }

    /// Append a new speaker interval, closing the previous open interval at
    /// the new interval's start, then drain. Draining here lets words that
    /// were buffered before any interval existed emit retroactively as soon
    /// as a qualifying interval arrives.
    pub fn push_interval(&self, producer_id: &str, user_id: &str, started_at_ms: i64) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(previous) = inner.speakers.peek_back_mut() {
            if previous.ended_at_ms.is_none() {
                previous.ended_at_ms = Some(started_at_ms);
            }
        }
        inner.speakers.push_back(SpeakerInterval {
            producer_id: producer_id.to_string(),
            user_id: user_id.to_string(),
            started_at_ms,
            ended_at_ms: None,
        });
        Self::drain(&mut inner);
    }

    /// Number of words currently buffered and unattributed.
    pub fn buffered_words(&self) -> usize {
        self.inner.lock().unwrap().words.len()
    }

    /// Repeatedly assemble and deliver transcriptions until no progress can
    /// be made. A single word push may span several now-closed speaker
    /// intervals, so one call can emit more than one transcription.
    fn drain(inner: &mut Inner) {
        while let Some(transcription) = Self::next_transcription(inner) {
            debug!(
                "Emitting transcription for {} at {} ({} chars)",
                transcription.user_id,
                transcription.emitted_at_ms,
                transcription.text.len()
            );
            for (_, listener) in &inner.listeners {
                listener(&transcription);
            }
        }
    }

    /// Assemble the next transcription, or `None` when either no word is
    /// buffered or no known interval can claim the head word yet.
    fn next_transcription(inner: &mut Inner) -> Option<Transcription> {
        // Seek the interval that owns the head word, discarding closed
        // intervals whose window has fully passed. Once discarded, an
        // interval can never be referenced again: batches arrive in
        // non-decreasing time order, so no later word can fall inside it.
        let head_started_at_ms = inner.words.peek_front()?.started_at_ms;
        let speaker = loop {
            let speaker = inner.speakers.peek_front()?;
            match speaker.ended_at_ms {
                None => break speaker.clone(),
                Some(ended_at_ms) if head_started_at_ms < ended_at_ms => break speaker.clone(),
                Some(_) => {
                    inner.speakers.pop_front();
                }
            }
        };

        // Consume every buffered word inside the interval's window. An open
        // interval claims everything that is buffered.
        let mut words: Vec<String> = Vec::new();
        loop {
            let qualifies = match inner.words.peek_front() {
                Some(word) => match speaker.ended_at_ms {
                    Some(ended_at_ms) => word.started_at_ms < ended_at_ms,
                    None => true,
                },
                None => false,
            };
            if !qualifies {
                break;
            }
            if let Some(word) = inner.words.pop_front() {
                words.push(word.text);
            }
        }

        if words.is_empty() {
            return None;
        }
        Some(Transcription {
            user_id: speaker.user_id,
            text: words.join(" "),
            emitted_at_ms: speaker.started_at_ms,
        })
    }
}

impl Default for TranscriptionCorrelator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn collector(
        correlator: &TranscriptionCorrelator,
    ) -> (Arc<Mutex<Vec<Transcription>>>, ListenerId) {
        let emitted: Arc<Mutex<Vec<Transcription>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&emitted);
        let id = correlator.on_transcription(Box::new(move |transcription| {
            sink.lock().unwrap().push(transcription.clone());
        }));
        (emitted, id)
    }

    fn batch(words: &[(&str, i64)]) -> SpeechBatch {
        SpeechBatch {
            language_code: "en-US".into(),
            batch_started_at_ms: words.first().map(|(_, t)| *t).unwrap_or(0),
            words: words
                .iter()
                .map(|(text, started_at_ms)| Word {
                    text: (*text).to_string(),
                    started_at_ms: *started_at_ms,
                })
                .collect(),
        }
    }

    #[test]
    fn test_attribution_across_two_intervals() {
        let correlator = TranscriptionCorrelator::new();
        let (emitted, _) = collector(&correlator);

        correlator.push_interval("p1", "alice", 0);
        correlator.push_interval("p2", "bob", 1000);
        correlator.push_words(batch(&[
            ("hi", 100),
            ("there", 400),
            ("how", 1200),
            ("are", 1500),
        ]));

        let emitted = emitted.lock().unwrap();
        assert_eq!(emitted.len(), 2);
        assert_eq!(emitted[0].user_id, "alice");
        assert_eq!(emitted[0].text, "hi there");
        assert_eq!(emitted[0].emitted_at_ms, 0);
        assert_eq!(emitted[1].user_id, "bob");
        assert_eq!(emitted[1].text, "how are");
        assert_eq!(emitted[1].emitted_at_ms, 1000);
    }

    #[test]
    fn test_single_push_spans_three_intervals() {
        let correlator = TranscriptionCorrelator::new();
        let (emitted, _) = collector(&correlator);

        correlator.push_interval("p1", "alice", 0);
        correlator.push_interval("p2", "bob", 1000);
        correlator.push_interval("p3", "carol", 2000);
        correlator.push_words(batch(&[("one", 100), ("two", 1100), ("three", 2100)]));

        let emitted = emitted.lock().unwrap();
        assert_eq!(emitted.len(), 3);
        assert_eq!(
            emitted
                .iter()
                .map(|t| t.user_id.as_str())
                .collect::<Vec<_>>(),
            vec!["alice", "bob", "carol"]
        );
        assert_eq!(
            emitted.iter().map(|t| t.emitted_at_ms).collect::<Vec<_>>(),
            vec![0, 1000, 2000]
        );
    }

    #[test]
    fn test_open_interval_claims_everything_buffered() {
        let correlator = TranscriptionCorrelator::new();
        let (emitted, _) = collector(&correlator);

        // Words straddle the open interval's start; all of them attribute to
        // it, with no split.
        correlator.push_interval("p1", "alice", 500);
        correlator.push_words(batch(&[("early", 100), ("late", 900)]));

        let emitted = emitted.lock().unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].text, "early late");
        assert_eq!(emitted[0].emitted_at_ms, 500);
    }

    #[test]
    fn test_words_wait_without_any_interval() {
        let correlator = TranscriptionCorrelator::new();
        let (emitted, _) = collector(&correlator);

        correlator.push_words(batch(&[("hello", 100)]));
        assert!(emitted.lock().unwrap().is_empty());
        assert_eq!(correlator.buffered_words(), 1);

        // The first qualifying interval triggers retroactive emission.
        correlator.push_interval("p1", "alice", 2000);
        let emitted = emitted.lock().unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].text, "hello");
        assert_eq!(emitted[0].emitted_at_ms, 2000);
        assert_eq!(correlator.buffered_words(), 0);
    }

    #[test]
    fn test_emission_order_is_non_decreasing() {
        let correlator = TranscriptionCorrelator::new();
        let (emitted, _) = collector(&correlator);

        correlator.push_interval("p1", "alice", 0);
        correlator.push_words(batch(&[("a", 10)]));
        correlator.push_interval("p2", "bob", 100);
        correlator.push_words(batch(&[("b", 50), ("c", 150)]));
        correlator.push_interval("p1", "alice", 300);
        correlator.push_words(batch(&[("d", 350)]));

        let emitted = emitted.lock().unwrap();
        assert!(emitted.len() >= 3);
        let mut previous = i64::MIN;
        for transcription in emitted.iter() {
            assert!(transcription.emitted_at_ms >= previous);
            previous = transcription.emitted_at_ms;
        }
    }

    #[test]
    fn test_fully_passed_intervals_are_discarded() {
        let correlator = TranscriptionCorrelator::new();
        let (emitted, _) = collector(&correlator);

        correlator.push_interval("p1", "alice", 0);
        correlator.push_interval("p2", "bob", 10);
        correlator.push_interval("p3", "carol", 20);
        // Word far past both closed intervals; only the open one can claim it.
        correlator.push_words(batch(&[("word", 30)]));

        let emitted = emitted.lock().unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].user_id, "carol");
    }

    #[test]
    fn test_word_at_interval_end_belongs_to_next_interval() {
        let correlator = TranscriptionCorrelator::new();
        let (emitted, _) = collector(&correlator);

        correlator.push_interval("p1", "alice", 0);
        correlator.push_interval("p2", "bob", 1000);
        // Start time equal to the boundary falls in the later interval.
        correlator.push_words(batch(&[("boundary", 1000)]));

        let emitted = emitted.lock().unwrap();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].user_id, "bob");
    }

    #[test]
    fn test_off_transcription_stops_delivery() {
        let correlator = TranscriptionCorrelator::new();
        let (emitted, id) = collector(&correlator);

        correlator.push_interval("p1", "alice", 0);
        correlator.push_words(batch(&[("one", 10)]));
        assert_eq!(emitted.lock().unwrap().len(), 1);

        assert!(correlator.off_transcription(id));
        correlator.push_words(batch(&[("two", 20)]));
        assert_eq!(emitted.lock().unwrap().len(), 1);

        // Unknown ids are a warned no-op.
        assert!(!correlator.off_transcription(id));
    }
}
