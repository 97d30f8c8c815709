//! SSE event classification and payload decoding.
//!
//! The upstream synthesis endpoint speaks a minimal server-sent-event dialect:
//! every interesting line is `data: <json>`, the stream is terminated by the
//! literal `data: [DONE]`, and anything else (comments, keep-alives, event
//! names) is noise that must be ignored without failing the stream.

use serde::Deserialize;
use tracing::warn;

/// Sentinel payload that terminates the event stream.
pub const DONE_SENTINEL: &str = "[DONE]";

const DATA_PREFIX: &str = "data:";

/// One classified SSE line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// The JSON payload of a `data:` line. Only this variant can carry audio.
    Data(String),
    /// The `[DONE]` terminator; no further lines should be decoded.
    Done,
    /// Any line without a `data:` prefix. Logged for diagnostics, then ignored.
    Other(String),
}

/// Classifies a single trimmed event line.
pub fn classify(line: &str) -> SseEvent {
    match line.strip_prefix(DATA_PREFIX) {
        Some(rest) => {
            let payload = rest.trim();
            if payload == DONE_SENTINEL {
                SseEvent::Done
            } else {
                SseEvent::Data(payload.to_string())
            }
        }
        None => SseEvent::Other(line.to_string()),
    }
}

/// Schema of a `data:` payload. Only the `audio` field matters to the
/// pipeline; everything else the upstream sends is ignored.
#[derive(Debug, Deserialize)]
struct SpeechEventPayload {
    #[serde(default)]
    audio: Option<String>,
}

/// Extracts the base64 audio field from a `data:` payload.
///
/// Malformed JSON and payloads without a non-empty `audio` field are logged
/// and skipped; both are transient per-event anomalies, never fatal to the
/// request.
pub fn audio_payload(json_text: &str) -> Option<String> {
    let payload: SpeechEventPayload = match serde_json::from_str(json_text) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, payload = %truncate(json_text), "Skipping non-JSON data payload");
            return None;
        }
    };
    match payload.audio {
        Some(audio) if !audio.is_empty() => Some(audio),
        _ => {
            warn!(payload = %truncate(json_text), "Skipping data payload without audio");
            None
        }
    }
}

/// Clips long payloads for log output.
fn truncate(text: &str) -> &str {
    match text.char_indices().nth(100) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
