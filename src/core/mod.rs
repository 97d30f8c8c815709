//! Core synthesis-relay machinery: SSE framing, audio normalization, and the
//! upstream provider client.

pub mod audio;
pub mod sse;
pub mod upstream;

use http::StatusCode;
use thiserror::Error;

use audio::WavParseError;

/// Errors that abort one synthesis request.
///
/// Skippable per-event anomalies (non-`data:` lines, malformed JSON payloads,
/// missing audio fields) never surface here; they are logged and recovered
/// inside the pipeline. Everything below is fatal to its request, while the
/// service keeps serving other requests.
#[derive(Debug, Error)]
pub enum SpeechError {
    /// The upstream call failed at the transport level.
    #[error("upstream transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream call completed with a non-success status before any
    /// audio was produced.
    #[error("upstream returned status {0}")]
    UpstreamStatus(StatusCode),

    /// An `audio` field was present but not valid standard base64.
    #[error("invalid base64 audio payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A fragment claiming to be a WAV container failed to parse.
    #[error("malformed WAV fragment: {0}")]
    Wav(#[from] WavParseError),
}
