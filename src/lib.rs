//! Z-Audio TTS bridging gateway.
//!
//! Exposes an OpenAI-style `/v1/audio/speech` endpoint and relays each
//! request to the Z-Audio synthesis API. The upstream answers with an SSE
//! stream of base64 WAV fragments; this crate re-frames that stream into a
//! single continuous `audio/wav` response with an unknown-length header, so
//! ordinary media clients can start playback before synthesis finishes.
//!
//! Module layout:
//! - [`core::sse`] re-frames upstream bytes into SSE data lines
//! - [`core::audio`] parses WAV fragments and builds the streaming container
//! - [`core::upstream`] is the Z-Audio HTTP client and voice catalog
//! - [`handlers`] and [`routes`] form the axum surface

pub mod auth;
pub mod config;
pub mod core;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use errors::{AppError, AppResult};
pub use state::AppState;
