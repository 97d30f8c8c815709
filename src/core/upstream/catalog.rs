//! Per-process voice catalog with TTL caching.
//!
//! The synthesis endpoint needs a display name (`voice_name`) for the chosen
//! voice id. Names come from the upstream catalog, fetched lazily and cached
//! per user id; when the catalog is unreachable or has no entry, the
//! well-known system voices fall back to their built-in names so synthesis
//! still works.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::warn;

use super::client::{UpstreamClient, Voice};

/// Built-in names of the provider's stock system voices.
const SYSTEM_VOICES: [(&str, &str); 3] = [
    ("system_001", "活泼女声"),
    ("system_002", "通用男声"),
    ("system_003", "温柔女声"),
];

/// Built-in display name for a stock system voice id.
pub fn builtin_voice_name(voice_id: &str) -> Option<&'static str> {
    SYSTEM_VOICES
        .iter()
        .find(|(id, _)| *id == voice_id)
        .map(|(_, name)| *name)
}

/// Cached view of the upstream voice catalog, keyed by user id.
///
/// Replaces the one-shot module-global catalog of earlier deployments with an
/// explicit per-process object owned by [`crate::state::AppState`].
#[derive(Debug, Clone)]
pub struct VoiceCatalog {
    cache: Cache<String, Arc<Vec<Voice>>>,
}

impl VoiceCatalog {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(1024)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Returns the catalog for one user, fetching and caching it on miss.
    /// Fetch failures are logged and yield an empty (uncached) catalog.
    pub async fn voices(
        &self,
        client: &UpstreamClient,
        token: &str,
        user_id: &str,
    ) -> Arc<Vec<Voice>> {
        if let Some(voices) = self.cache.get(user_id).await {
            return voices;
        }
        match client.list_voices(token, user_id).await {
            Ok(voices) => {
                let voices = Arc::new(voices);
                self.cache
                    .insert(user_id.to_string(), Arc::clone(&voices))
                    .await;
                voices
            }
            Err(err) => {
                warn!(error = %err, "Voice catalog fetch failed");
                Arc::new(Vec::new())
            }
        }
    }

    /// Resolves the display name for a voice id.
    ///
    /// Catalog entry wins; stock system voices fall back to their built-in
    /// names; unknown voices resolve to an empty name, which the upstream
    /// accepts as "id only".
    pub async fn voice_name(
        &self,
        client: &UpstreamClient,
        token: &str,
        user_id: &str,
        voice_id: &str,
    ) -> String {
        let voices = self.voices(client, token, user_id).await;
        voices
            .iter()
            .find(|v| v.voice_id == voice_id)
            .map(|v| v.voice_name.clone())
            .or_else(|| builtin_voice_name(voice_id).map(str::to_string))
            .unwrap_or_default()
    }
}
