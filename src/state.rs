//! Shared application state.

use std::time::Duration;

use crate::config::ServerConfig;
use crate::core::upstream::{UpstreamClient, VoiceCatalog};

/// Per-process context handed to every request handler as `Arc<AppState>`.
///
/// Owns the pooled upstream HTTP client and the voice catalog cache; nothing
/// here is mutated per request, so handlers share it without locking.
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub upstream: UpstreamClient,
    pub catalog: VoiceCatalog,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Result<Self, reqwest::Error> {
        let upstream = UpstreamClient::new(&config)?;
        let catalog = VoiceCatalog::new(Duration::from_secs(config.catalog_ttl_secs));
        Ok(Self {
            config,
            upstream,
            catalog,
        })
    }
}
