//! Upstream Z-Audio provider integration.

mod catalog;
mod client;

pub use catalog::{VoiceCatalog, builtin_voice_name};
pub use client::{
    SYNTHESIS_PATH, SYSTEM_VOICES_PATH, SynthesisRequest, USER_VOICES_PATH, UpstreamClient, Voice,
};
