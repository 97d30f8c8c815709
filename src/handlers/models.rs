//! Health check and model/voice listing endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Json;
use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::auth;
use crate::state::AppState;

/// Synthesis model exposed by the upstream provider.
pub const MODEL_ID: &str = "cog-tts";

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Serialize)]
pub struct ModelEntry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Query parameters of the models listing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ModelsQuery {
    /// Upstream account whose voices to list; defaults from config.
    pub user_id: Option<String>,
}

/// `GET /` liveness probe.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /v1/models` returns the synthesis model plus the voices currently
/// available upstream. Catalog failures degrade to the model entry alone.
pub async fn list_models(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModelsQuery>,
    headers: HeaderMap,
) -> Json<ModelsResponse> {
    let token = auth::resolve_token(&headers, &state.config.zai_token);
    let user_id = query
        .user_id
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| state.config.zai_user_id.clone());
    let voices = state
        .catalog
        .voices(&state.upstream, &token, &user_id)
        .await;

    let mut data = vec![ModelEntry {
        id: MODEL_ID.to_string(),
        name: None,
    }];
    data.extend(voices.iter().map(|voice| ModelEntry {
        id: voice.voice_id.clone(),
        name: (!voice.voice_name.is_empty()).then(|| voice.voice_name.clone()),
    }));

    Json(ModelsResponse { data })
}
