//! Photo endpoints: listing, multipart upload, metadata updates, deletion,
//! and bulk collection assignment / deletion
//!
//! Uploads go through two-tier storage: the Cloudinary client when one is
//! configured, otherwise (or on upload failure) an inline base64 data URL in
//! the metadata record.

use std::collections::HashMap;

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use gallery_common::model::{Photo, PhotoStorage};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::api::response::ApiError;
use crate::cloud::inline;
use crate::store::NewPhoto;
use crate::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Photo record as presented by the API: storage flattened into a servable
/// URL plus a storage-kind label, with the owning collection's name resolved.
#[derive(Debug, Serialize)]
pub struct PhotoView {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub url: String,
    pub storage: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
    pub original_filename: Option<String>,
    pub format: Option<String>,
    pub file_size: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub uploaded_at: DateTime<Utc>,
    pub collection_id: Option<u64>,
    pub collection_name: Option<String>,
}

impl PhotoView {
    fn build(photo: &Photo, collection_names: &HashMap<u64, String>) -> Self {
        let (storage, public_id) = match &photo.storage {
            PhotoStorage::Cloud { public_id, .. } => ("cloud", Some(public_id.clone())),
            PhotoStorage::Inline { .. } => ("inline", None),
        };
        Self {
            id: photo.id,
            title: photo.title.clone(),
            description: photo.description.clone(),
            url: photo.storage.url().to_string(),
            storage,
            public_id,
            original_filename: photo.original_filename.clone(),
            format: photo.format.clone(),
            file_size: photo.file_size,
            width: photo.width,
            height: photo.height,
            uploaded_at: photo.uploaded_at,
            collection_id: photo.collection_id,
            collection_name: photo
                .collection_id
                .and_then(|id| collection_names.get(&id).cloned()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListPhotosQuery {
    pub collection_id: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct PhotosResponse {
    pub success: bool,
    pub photos: Vec<PhotoView>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub photos: Vec<PhotoView>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePhotoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetCollectionRequest {
    pub collection_id: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct PhotoResponse {
    pub success: bool,
    pub message: String,
    pub photo: PhotoView,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdateRequest {
    #[serde(default)]
    pub photo_ids: Vec<u64>,
    pub collection_id: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct BulkUpdateResponse {
    pub success: bool,
    pub message: String,
    pub updated_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    #[serde(default)]
    pub photo_ids: Vec<u64>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: usize,
}

// ============================================================================
// Two-tier storage
// ============================================================================

struct StoredImage {
    storage: PhotoStorage,
    format: Option<String>,
    file_size: Option<u64>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Store image bytes: cloud upload when a client is configured, inline data
/// URL otherwise or when the upload call fails. Single attempt, no retry.
async fn store_image(state: &AppState, bytes: Vec<u8>, filename: &str) -> StoredImage {
    let byte_count = bytes.len() as u64;

    if let Some(cloud) = &state.cloud {
        match cloud.upload(bytes.clone(), filename).await {
            Ok(upload) => {
                return StoredImage {
                    storage: PhotoStorage::Cloud {
                        public_id: upload.public_id,
                        secure_url: upload.secure_url,
                    },
                    format: upload.format,
                    file_size: upload.bytes,
                    width: upload.width,
                    height: upload.height,
                };
            }
            Err(e) => {
                warn!(
                    filename = filename,
                    "Cloud upload failed, falling back to inline storage: {}", e
                );
            }
        }
    }

    StoredImage {
        storage: PhotoStorage::Inline {
            data_url: inline::encode_data_url(&bytes, filename),
        },
        format: inline::format_for_filename(filename),
        file_size: Some(byte_count),
        width: None,
        height: None,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/photos - list photos, optionally filtered by collection
pub async fn list_photos(
    State(state): State<AppState>,
    Query(query): Query<ListPhotosQuery>,
) -> Json<PhotosResponse> {
    let photos = state.store.list_photos(query.collection_id).await;
    let names = state.store.collection_names().await;
    Json(PhotosResponse {
        success: true,
        photos: photos.iter().map(|p| PhotoView::build(p, &names)).collect(),
    })
}

/// POST /api/photos - multipart upload of one or more photos
///
/// Repeated `files` parts carry the images; optional repeated `titles` and
/// `descriptions` pair up with the files by position; an optional
/// `collection_id` assigns every uploaded photo.
pub async fn upload_photos(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut files: Vec<(String, Vec<u8>)> = Vec::new();
    let mut titles: Vec<String> = Vec::new();
    let mut descriptions: Vec<String> = Vec::new();
    let mut collection_id: Option<u64> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart request: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "files" | "photos" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;
                if !data.is_empty() {
                    files.push((filename, data.to_vec()));
                }
            }
            "titles" => titles.push(read_text_field(field).await?),
            "descriptions" => descriptions.push(read_text_field(field).await?),
            "collection_id" => {
                let text = read_text_field(field).await?;
                let text = text.trim();
                // The admin form sends "" / "0" for "no collection"
                if !text.is_empty() && text != "0" {
                    collection_id = Some(text.parse().map_err(|_| {
                        ApiError::bad_request(format!("Invalid collection_id: {text}"))
                    })?);
                }
            }
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(ApiError::bad_request("No files provided"));
    }

    if let Some(cid) = collection_id {
        if !state.store.collection_exists(cid).await {
            return Err(ApiError::not_found("Collection not found"));
        }
    }

    let mut uploaded = Vec::new();
    for (i, (filename, bytes)) in files.into_iter().enumerate() {
        let title = titles
            .get(i)
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| filename.clone());
        let description = descriptions
            .get(i)
            .map(|d| d.trim().to_string())
            .unwrap_or_default();

        let stored = store_image(&state, bytes, &filename).await;
        let new_photo = NewPhoto {
            title,
            description,
            storage: stored.storage,
            original_filename: Some(filename.clone()),
            format: stored.format,
            file_size: stored.file_size,
            width: stored.width,
            height: stored.height,
            collection_id,
        };

        match state.store.insert_photo(new_photo).await {
            Ok(photo) => {
                info!(photo_id = photo.id, title = %photo.title, "Uploaded photo");
                uploaded.push(photo);
            }
            Err(e) => {
                error!("Failed to record uploaded photo {}: {}", filename, e);
                continue;
            }
        }
    }

    if uploaded.is_empty() {
        return Err(ApiError::internal("Failed to upload any photos"));
    }

    let names = state.store.collection_names().await;
    Ok(Json(UploadResponse {
        success: true,
        message: format!("Successfully uploaded {} photo(s)", uploaded.len()),
        photos: uploaded
            .iter()
            .map(|p| PhotoView::build(p, &names))
            .collect(),
    }))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read form field: {e}")))
}

/// PUT /api/photos/:id - update title/description
pub async fn update_photo(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<UpdatePhotoRequest>,
) -> Result<Json<PhotoResponse>, ApiError> {
    let photo = state
        .store
        .update_photo(id, req.title, req.description)
        .await?;
    let names = state.store.collection_names().await;
    Ok(Json(PhotoResponse {
        success: true,
        message: "Photo updated successfully".to_string(),
        photo: PhotoView::build(&photo, &names),
    }))
}

/// PUT /api/photos/:id/collection - assign or clear the owning collection
pub async fn update_photo_collection(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<SetCollectionRequest>,
) -> Result<Json<PhotoResponse>, ApiError> {
    let photo = state
        .store
        .set_photo_collection(id, req.collection_id)
        .await?;
    let names = state.store.collection_names().await;
    Ok(Json(PhotoResponse {
        success: true,
        message: "Photo collection updated successfully".to_string(),
        photo: PhotoView::build(&photo, &names),
    }))
}

/// DELETE /api/photos/:id
///
/// The metadata record is authoritative: local deletion succeeds even when
/// the cloud destroy fails (that failure is logged and swallowed).
pub async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let removed = state.store.delete_photo(id).await?;
    destroy_cloud_copy(&state, &removed).await;

    info!(photo_id = id, title = %removed.title, "Deleted photo");
    Ok(Json(DeleteResponse {
        success: true,
        message: "Photo deleted successfully".to_string(),
    }))
}

/// PUT /api/photos/bulk-update - assign many photos to one collection
pub async fn bulk_update_photos(
    State(state): State<AppState>,
    Json(req): Json<BulkUpdateRequest>,
) -> Result<Json<BulkUpdateResponse>, ApiError> {
    if req.photo_ids.is_empty() {
        return Err(ApiError::bad_request("No photo IDs provided"));
    }

    let updated = state
        .store
        .bulk_set_collection(&req.photo_ids, req.collection_id)
        .await?;

    info!(updated = updated, "Bulk collection update");
    Ok(Json(BulkUpdateResponse {
        success: true,
        message: format!("Successfully updated {updated} photos"),
        updated_count: updated,
    }))
}

/// DELETE /api/photos/bulk-delete
pub async fn bulk_delete_photos(
    State(state): State<AppState>,
    Json(req): Json<BulkDeleteRequest>,
) -> Result<Json<BulkDeleteResponse>, ApiError> {
    if req.photo_ids.is_empty() {
        return Err(ApiError::bad_request("No photo IDs provided"));
    }

    let removed = state.store.bulk_delete(&req.photo_ids).await?;
    for photo in &removed {
        destroy_cloud_copy(&state, photo).await;
    }

    info!(deleted = removed.len(), "Bulk photo delete");
    Ok(Json(BulkDeleteResponse {
        success: true,
        message: format!("Successfully deleted {} photos", removed.len()),
        deleted_count: removed.len(),
    }))
}

/// Best-effort cloud cleanup for a removed photo record
async fn destroy_cloud_copy(state: &AppState, photo: &Photo) {
    if let (Some(cloud), Some(public_id)) = (&state.cloud, photo.storage.public_id()) {
        if let Err(e) = cloud.destroy(public_id).await {
            warn!(public_id = public_id, "Cloud destroy failed: {}", e);
        }
    }
}
