//! HTTP client for the Z-Audio provider API.
//!
//! One pooled [`reqwest::Client`] is built at startup and shared by every
//! request handler through [`crate::state::AppState`]; there is no ambient
//! global session. Connection establishment is bounded by a timeout, but no
//! overall request timeout is applied because synthesis streams are expected
//! to stay open for as long as the audio runs.

use std::time::Duration;

use bytes::Bytes;
use futures::Stream;
use futures_util::TryStreamExt;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::core::SpeechError;

/// Provider endpoint for streaming speech synthesis (SSE response).
pub const SYNTHESIS_PATH: &str = "/api/v1/z-audio/tts/create";
/// Provider endpoint listing the built-in system voices.
pub const SYSTEM_VOICES_PATH: &str = "/api/v1/z-audio/voices/list_system";
/// Provider endpoint listing the caller's own voices.
pub const USER_VOICES_PATH: &str = "/api/v1/z-audio/voices/list";

const VOICES_PAGE_SIZE: u32 = 200;

/// Body of the upstream synthesis call.
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisRequest {
    pub voice_name: String,
    pub voice_id: String,
    pub user_id: String,
    pub input_text: String,
    pub speed: f64,
    pub volume: i64,
}

/// One entry of the upstream voice catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voice {
    pub voice_id: String,
    #[serde(default)]
    pub voice_name: String,
}

#[derive(Debug, Deserialize)]
struct VoiceListResponse {
    #[serde(default)]
    data: Vec<Voice>,
}

/// Client for the upstream TTS provider, carrying the browser-style identity
/// headers the provider expects on every call.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl UpstreamClient {
    /// Builds the shared client from server configuration.
    pub fn new(config: &ServerConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            user_agent: config.user_agent.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .header(http::header::USER_AGENT, &self.user_agent)
            .header(http::header::REFERER, format!("{}/", self.base_url))
            .header(http::header::ORIGIN, &self.base_url)
    }

    /// Starts a synthesis call and returns the raw SSE byte stream.
    ///
    /// A non-success status is fatal before any audio is produced; the status
    /// is carried in the error so the handler can surface it to the client.
    pub async fn synthesize(
        &self,
        request: &SynthesisRequest,
        token: &str,
    ) -> Result<impl Stream<Item = Result<Bytes, SpeechError>> + use<>, SpeechError> {
        debug!(
            voice_id = %request.voice_id,
            text_len = request.input_text.len(),
            speed = request.speed,
            volume = request.volume,
            "Calling upstream synthesis endpoint"
        );

        let response = self
            .request(reqwest::Method::POST, SYNTHESIS_PATH, token)
            .header(http::header::ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Upstream synthesis call failed");
            return Err(SpeechError::UpstreamStatus(
                StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
            ));
        }

        Ok(response.bytes_stream().map_err(SpeechError::Transport))
    }

    /// Fetches the full voice catalog: system voices plus the caller's own.
    ///
    /// A failure of the user-voice listing is logged and tolerated, matching
    /// the provider's behavior for accounts without custom voices; a failure
    /// of the system listing is an error.
    pub async fn list_voices(&self, token: &str, user_id: &str) -> Result<Vec<Voice>, SpeechError> {
        let params = [
            ("page", "1".to_string()),
            ("page_size", VOICES_PAGE_SIZE.to_string()),
            ("user_id", user_id.to_string()),
        ];

        let response = self
            .request(reqwest::Method::GET, SYSTEM_VOICES_PATH, token)
            .query(&params)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "System voice listing failed");
            return Err(SpeechError::UpstreamStatus(
                StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
            ));
        }
        let mut voices = response.json::<VoiceListResponse>().await?.data;

        match self
            .request(reqwest::Method::GET, USER_VOICES_PATH, token)
            .query(&params)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                match response.json::<VoiceListResponse>().await {
                    Ok(list) => voices.extend(list.data),
                    Err(err) => warn!(error = %err, "User voice listing returned invalid JSON"),
                }
            }
            Ok(response) => {
                warn!(status = %response.status(), "User voice listing failed");
            }
            Err(err) => {
                warn!(error = %err, "User voice listing request failed");
            }
        }

        debug!(count = voices.len(), "Fetched upstream voice catalog");
        Ok(voices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn test_config() -> ServerConfig {
        ServerConfig {
            base_url: "https://audio.example.com".to_string(),
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_client_keeps_base_url() {
        let client = UpstreamClient::new(&test_config()).unwrap();
        assert_eq!(client.base_url(), "https://audio.example.com");
    }

    #[tokio::test]
    async fn test_request_carries_identity_headers() {
        let client = UpstreamClient::new(&test_config()).unwrap();
        let request = client
            .request(reqwest::Method::POST, SYNTHESIS_PATH, "tok-123")
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://audio.example.com/api/v1/z-audio/tts/create"
        );
        let headers = request.headers();
        assert_eq!(headers.get("authorization").unwrap(), "Bearer tok-123");
        assert_eq!(
            headers.get("referer").unwrap(),
            "https://audio.example.com/"
        );
        assert_eq!(headers.get("origin").unwrap(), "https://audio.example.com");
        assert!(headers.contains_key("user-agent"));
    }

    #[test]
    fn test_synthesis_request_serializes_all_fields() {
        let body = SynthesisRequest {
            voice_name: "活泼女声".to_string(),
            voice_id: "system_001".to_string(),
            user_id: "u-1".to_string(),
            input_text: "hello".to_string(),
            speed: 1.2,
            volume: 1,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["voice_name"], "活泼女声");
        assert_eq!(json["voice_id"], "system_001");
        assert_eq!(json["user_id"], "u-1");
        assert_eq!(json["input_text"], "hello");
        assert_eq!(json["speed"], 1.2);
        assert_eq!(json["volume"], 1);
    }

    #[test]
    fn test_voice_deserializes_with_extra_fields() {
        let voice: Voice = serde_json::from_str(
            "{\"voice_id\": \"v1\", \"voice_name\": \"n\", \"preview\": \"x\"}",
        )
        .unwrap();
        assert_eq!(voice.voice_id, "v1");
        assert_eq!(voice.voice_name, "n");
    }
}
