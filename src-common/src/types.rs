//! Shared types for speaker-attributed transcription.
//!
//! All timestamps are absolute wall-clock milliseconds since the Unix epoch
//! unless a field name says otherwise. Words and speaker intervals carry
//! absolute timestamps so that two independently-paced event streams can be
//! joined on a single timeline.

use serde::{Deserialize, Serialize};

/// One recognized word with its absolute start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    /// The recognized text
    pub text: String,
    /// Absolute start time of the word (epoch milliseconds)
    pub started_at_ms: i64,
}

/// One finalized recognition result from the speech backend.
///
/// Words within a batch are non-decreasing by `started_at_ms`, and batches
/// arrive in non-decreasing time order across the lifetime of a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechBatch {
    /// BCP-47 language code of the recognition session (e.g. `en-US`)
    pub language_code: String,
    /// Absolute start time of the batch (epoch milliseconds)
    pub batch_started_at_ms: i64,
    /// Recognized words in recognition order
    pub words: Vec<Word>,
}

/// A continuous period during which one participant was the call's
/// dominant speaker.
///
/// `ended_at_ms` is `None` while the speaker is still active; it is set to
/// the `started_at_ms` of the next interval the instant a new dominant
/// speaker is detected, and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerInterval {
    /// Media-layer producer carrying this speaker's audio
    pub producer_id: String,
    /// The participant speaking
    pub user_id: String,
    /// Absolute start of the interval (epoch milliseconds)
    pub started_at_ms: i64,
    /// Absolute end of the interval, absent while the speaker is active
    pub ended_at_ms: Option<i64>,
}

impl SpeakerInterval {
    /// Whether the interval is still open (the speaker is still active).
    pub fn is_open(&self) -> bool {
        self.ended_at_ms.is_none()
    }
}

/// A speaker-attributed transcript line delivered to call participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcription {
    /// The participant the text is attributed to
    pub user_id: String,
    /// Space-joined recognized words, in arrival order
    pub text: String,
    /// Start of the speaker interval the text was attributed to
    /// (epoch milliseconds) — not the time of emission
    pub emitted_at_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_open_state() {
        let mut interval = SpeakerInterval {
            producer_id: "p1".into(),
            user_id: "alice".into(),
            started_at_ms: 1000,
            ended_at_ms: None,
        };
        assert!(interval.is_open());

        interval.ended_at_ms = Some(2000);
        assert!(!interval.is_open());
    }

    #[test]
    fn test_transcription_wire_shape() {
        // Transcriptions cross the signaling channel as camelCase JSON.
        let transcription = Transcription {
            user_id: "alice".into(),
            text: "hi there".into(),
            emitted_at_ms: 1234,
        };
        let json = serde_json::to_value(&transcription).unwrap();
        assert_eq!(json["userId"], "alice");
        assert_eq!(json["text"], "hi there");
        assert_eq!(json["emittedAtMs"], 1234);
    }

    #[test]
    fn test_open_interval_wire_shape() {
        let interval = SpeakerInterval {
            producer_id: "p1".into(),
            user_id: "bob".into(),
            started_at_ms: 500,
            ended_at_ms: None,
        };
        let json = serde_json::to_value(&interval).unwrap();
        assert!(json["endedAtMs"].is_null());
        assert_eq!(json["producerId"], "p1");
    }
}
