//! The streaming audio transcoding pipeline.
//!
//! Consumes the upstream SSE byte stream, decodes each audio fragment, strips
//! per-fragment WAV headers, and forwards raw PCM chunks downstream as they
//! arrive. One streaming WAV header (sentinel lengths, see
//! [`super::wav::STREAMING_LENGTH_SENTINEL`]) is prepended to the first chunk
//! that follows a WAV-bearing fragment; nothing is buffered beyond the
//! fragment currently being decoded.

use async_stream::try_stream;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use futures::Stream;
use tracing::debug;

use super::wav::{WavParameters, WavParseError, is_wav_container, parse_wav_container};
use crate::core::SpeechError;
use crate::core::sse::{SseEvent, audio_payload, classify, event_lines};

/// Per-request normalizer state. Created when a synthesis request starts,
/// discarded when it completes; never shared across requests.
#[derive(Debug, Default)]
pub struct StreamState {
    header_emitted: bool,
    params: Option<WavParameters>,
}

impl StreamState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters captured from the first WAV-bearing fragment, if any.
    pub fn params(&self) -> Option<WavParameters> {
        self.params
    }

    /// Normalizes one decoded audio fragment into the bytes to forward.
    ///
    /// A fragment that is itself a WAV container has its metadata stripped and
    /// only the PCM payload forwarded; parameters are captured from the first
    /// such fragment and deliberately never updated afterwards, even if a
    /// later fragment declares different ones. The synthesized streaming
    /// header is prepended exactly once, to the first chunk produced after
    /// parameters become known. Non-container fragments pass through as
    /// already-raw PCM.
    pub fn normalize(&mut self, fragment: &[u8]) -> Result<Bytes, WavParseError> {
        if !is_wav_container(fragment) {
            return Ok(Bytes::copy_from_slice(fragment));
        }

        let (params, pcm) = parse_wav_container(fragment)?;
        if self.params.is_none() {
            self.params = Some(params);
        }

        if self.header_emitted {
            return Ok(Bytes::copy_from_slice(pcm));
        }
        // First WAV-bearing fragment: emit the one-and-only stream header.
        self.header_emitted = true;
        let header = self
            .params
            .expect("params were captured above")
            .streaming_header();
        let mut chunk = Vec::with_capacity(header.len() + pcm.len());
        chunk.extend_from_slice(&header);
        chunk.extend_from_slice(pcm);
        Ok(Bytes::from(chunk))
    }
}

/// Builds the full transcoding pipeline over an upstream SSE byte stream.
///
/// Yields WAV/PCM chunks in exact event-decode order, stopping at the
/// `[DONE]` sentinel or at the natural end of the upstream stream. Skippable
/// anomalies (non-`data:` lines, malformed JSON, missing audio) are logged
/// and recovered locally; base64 or container failures abort the stream with
/// an error item and the response is left truncated.
pub fn wav_stream<S>(upstream: S) -> impl Stream<Item = Result<Bytes, SpeechError>>
where
    S: Stream<Item = Result<Bytes, SpeechError>>,
{
    try_stream! {
        let mut state = StreamState::new();
        let lines = event_lines(upstream);
        for await line in lines {
            let line = line?;
            match classify(&line) {
                SseEvent::Done => {
                    debug!("Upstream signalled end of stream");
                    break;
                }
                SseEvent::Other(line) => {
                    debug!(%line, "Ignoring non-data line");
                }
                SseEvent::Data(payload) => {
                    let Some(encoded) = audio_payload(&payload) else {
                        continue;
                    };
                    let fragment = BASE64.decode(encoded).map_err(SpeechError::Base64)?;
                    let chunk = state.normalize(&fragment).map_err(SpeechError::Wav)?;
                    debug!(len = chunk.len(), "Forwarding audio chunk");
                    if !chunk.is_empty() {
                        yield chunk;
                    }
                }
            }
        }
    }
}
