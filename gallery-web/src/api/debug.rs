//! Debug endpoint: store counts and runtime configuration at a glance
//!
//! Admin-gated; exposes the data file path, so it stays off the public
//! surface.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DebugResponse {
    pub success: bool,
    pub version: String,
    pub data_file: String,
    pub photo_count: usize,
    pub collection_count: usize,
    pub cloud_photos: usize,
    pub inline_photos: usize,
    pub cloud_configured: bool,
    pub active_sessions: usize,
}

/// GET /api/debug
pub async fn debug_info(State(state): State<AppState>) -> Json<DebugResponse> {
    let counts = state.store.counts().await;
    Json(DebugResponse {
        success: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        data_file: state.store.path().display().to_string(),
        photo_count: counts.photos,
        collection_count: counts.collections,
        cloud_photos: counts.cloud_photos,
        inline_photos: counts.inline_photos,
        cloud_configured: state.cloud.is_some(),
        active_sessions: state.sessions.len().await,
    })
}
