//! Collection endpoints: listing, creation, rename, deletion

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::response::ApiError;
use crate::store::CollectionSummary;
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CollectionsResponse {
    pub success: bool,
    pub collections: Vec<CollectionSummary>,
}

#[derive(Debug, Deserialize)]
pub struct CollectionNameRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct CollectionResponse {
    pub success: bool,
    pub message: String,
    pub collection: CollectionSummary,
}

#[derive(Debug, Serialize)]
pub struct DeleteCollectionResponse {
    pub success: bool,
    pub message: String,
    pub unassigned_count: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/collections - list collections with photo counts, newest first
pub async fn list_collections(State(state): State<AppState>) -> Json<CollectionsResponse> {
    let collections = state.store.list_collections().await;
    Json(CollectionsResponse {
        success: true,
        collections,
    })
}

/// POST /api/collections
pub async fn create_collection(
    State(state): State<AppState>,
    Json(req): Json<CollectionNameRequest>,
) -> Result<(StatusCode, Json<CollectionResponse>), ApiError> {
    let collection = state.store.create_collection(&req.name).await?;
    info!(collection_id = collection.id, name = %collection.name, "Created collection");

    Ok((
        StatusCode::CREATED,
        Json(CollectionResponse {
            success: true,
            message: format!("Collection \"{}\" created successfully", collection.name),
            collection: CollectionSummary {
                id: collection.id,
                name: collection.name,
                created_at: collection.created_at,
                photo_count: 0,
            },
        }),
    ))
}

/// PUT /api/collections/:id - rename
pub async fn rename_collection(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<CollectionNameRequest>,
) -> Result<Json<CollectionResponse>, ApiError> {
    let collection = state.store.rename_collection(id, &req.name).await?;
    let photo_count = state
        .store
        .list_collections()
        .await
        .into_iter()
        .find(|c| c.id == id)
        .map(|c| c.photo_count)
        .unwrap_or(0);

    info!(collection_id = id, name = %collection.name, "Renamed collection");
    Ok(Json(CollectionResponse {
        success: true,
        message: "Collection updated successfully".to_string(),
        collection: CollectionSummary {
            id: collection.id,
            name: collection.name,
            created_at: collection.created_at,
            photo_count,
        },
    }))
}

/// DELETE /api/collections/:id
///
/// Unassigns the collection's photos; never deletes them.
pub async fn delete_collection(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteCollectionResponse>, ApiError> {
    let (removed, unassigned) = state.store.delete_collection(id).await?;

    info!(
        collection_id = id,
        name = %removed.name,
        unassigned = unassigned,
        "Deleted collection"
    );
    Ok(Json(DeleteCollectionResponse {
        success: true,
        message: format!(
            "Collection deleted successfully. {unassigned} photos were unassigned from this collection."
        ),
        unassigned_count: unassigned,
    }))
}
