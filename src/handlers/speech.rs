//! The `/v1/audio/speech` relay handler.
//!
//! Owns the outbound response for one synthesis request: calls the upstream
//! provider, hands its SSE byte stream to the transcoding pipeline, and
//! streams the resulting WAV chunks to the client as they arrive. The body is
//! finalized when the pipeline ends; a fatal decode error mid-stream aborts
//! the body, leaving the client a truncated (headerless trailer) WAV, per the
//! streaming contract. If the client disconnects, dropping the body stream
//! cancels the upstream read and releases the connection.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use http::HeaderMap;
use serde::{Deserialize, Deserializer};
use tracing::info;
use uuid::Uuid;

use crate::auth;
use crate::core::audio::wav_stream;
use crate::core::upstream::SynthesisRequest;
use crate::errors::AppResult;
use crate::state::AppState;

/// Client-facing synthesis request, accepted as a JSON body or as query
/// parameters. Every field is optional with a documented default.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SpeechRequest {
    /// Voice id; defaults to the configured voice.
    pub voice: Option<String>,
    /// Text to synthesize (OpenAI-style field name).
    pub input: Option<String>,
    /// Alias for `input`; `input` wins when both are present.
    pub text: Option<String>,
    /// Playback speed, default 1, truncated to one decimal place.
    #[serde(deserialize_with = "number_or_string")]
    pub speed: Option<f64>,
    /// Volume, default 1.
    #[serde(deserialize_with = "integer_or_string")]
    pub volume: Option<i64>,
    /// Upstream account the synthesis is billed to; defaults from config.
    pub user_id: Option<String>,
}

impl SpeechRequest {
    fn input_text(&self) -> String {
        self.input
            .clone()
            .or_else(|| self.text.clone())
            .unwrap_or_default()
    }

    /// Speed truncated (toward zero) to one decimal place, as the upstream
    /// API requires.
    fn effective_speed(&self) -> f64 {
        (self.speed.unwrap_or(1.0) * 10.0).trunc() / 10.0
    }
}

/// `* /v1/audio/speech` streams synthesized audio as `audio/wav`.
///
/// A JSON body takes precedence; otherwise parameters come from the query
/// string. An upstream failure before any audio surfaces the upstream status
/// instead of an empty stream.
pub async fn synthesize_speech(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SpeechRequest>,
    headers: HeaderMap,
    body: Option<axum::Json<SpeechRequest>>,
) -> AppResult<Response> {
    let request = body.map(|axum::Json(b)| b).unwrap_or(query);
    let request_id = Uuid::new_v4();

    let token = auth::resolve_token(&headers, &state.config.zai_token);
    let voice_id = request
        .voice
        .clone()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| state.config.default_voice.clone());
    let user_id = request
        .user_id
        .clone()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| state.config.zai_user_id.clone());
    let voice_name = state
        .catalog
        .voice_name(&state.upstream, &token, &user_id, &voice_id)
        .await;

    let upstream_request = SynthesisRequest {
        voice_name,
        voice_id,
        user_id,
        input_text: request.input_text(),
        speed: request.effective_speed(),
        volume: request.volume.unwrap_or(1),
    };
    info!(
        %request_id,
        voice_id = %upstream_request.voice_id,
        text_chars = upstream_request.input_text.chars().count(),
        "Starting synthesis relay"
    );

    let byte_stream = state.upstream.synthesize(&upstream_request, &token).await?;

    let response = (
        [(http::header::CONTENT_TYPE, "audio/wav")],
        Body::from_stream(wav_stream(byte_stream)),
    );
    Ok(response.into_response())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

/// Accepts a JSON number, a numeric string (query parameters always arrive
/// as strings), or nothing.
fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::String(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Like [`number_or_string`], truncating fractional values.
fn integer_or_string<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number_or_string(deserializer)?.map(|n| n.trunc() as i64))
}
