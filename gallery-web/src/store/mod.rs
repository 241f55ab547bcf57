//! JSON-file-backed metadata store
//!
//! The whole gallery state lives in one `GalleryData` document guarded by an
//! async RwLock. Every mutating operation persists the document before
//! returning, via a temp-file write followed by a rename so a crash mid-save
//! never leaves a truncated file behind.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use gallery_common::model::{Collection, GalleryData, Photo, PhotoStorage};
use gallery_common::{Error, Result};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Fields for a photo record about to be inserted; the store assigns the id
/// and timestamp.
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub title: String,
    pub description: String,
    pub storage: PhotoStorage,
    pub original_filename: Option<String>,
    pub format: Option<String>,
    pub file_size: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub collection_id: Option<u64>,
}

/// Collection with its derived photo count, as returned by listings
#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    pub id: u64,
    pub name: String,
    pub created_at: chrono::DateTime<Utc>,
    pub photo_count: usize,
}

/// Storage-kind counts for the debug endpoint
#[derive(Debug, Clone, Serialize)]
pub struct StoreCounts {
    pub photos: usize,
    pub collections: usize,
    pub cloud_photos: usize,
    pub inline_photos: usize,
}

/// Metadata store over a single JSON document
pub struct MetadataStore {
    path: PathBuf,
    data: RwLock<GalleryData>,
}

impl MetadataStore {
    /// Open the store. A missing file starts an empty gallery; an unreadable
    /// or unparseable file is an error (refusing to start beats silently
    /// clobbering someone's metadata).
    pub fn open(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let data: GalleryData = serde_json::from_str(&content)?;
            info!(
                "Loaded {} photos, {} collections from {}",
                data.photos.len(),
                data.collections.len(),
                path.display()
            );
            data
        } else {
            info!("Metadata file {} not found, starting empty", path.display());
            GalleryData::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the document atomically: temp file in the same directory, then
    /// rename over the target.
    fn persist(&self, data: &GalleryData) -> Result<()> {
        let tmp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(data)?;
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &self.path)?;
        debug!("Saved metadata to {}", self.path.display());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Photos
    // ------------------------------------------------------------------

    /// List photos, newest first, optionally filtered by collection
    pub async fn list_photos(&self, collection_id: Option<u64>) -> Vec<Photo> {
        let data = self.data.read().await;
        let mut photos: Vec<Photo> = data
            .photos
            .iter()
            .filter(|p| collection_id.is_none() || p.collection_id == collection_id)
            .cloned()
            .collect();
        photos.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        photos
    }

    /// Look up one photo
    pub async fn photo(&self, id: u64) -> Option<Photo> {
        let data = self.data.read().await;
        data.photos.iter().find(|p| p.id == id).cloned()
    }

    /// Insert a photo record, validating its collection reference
    pub async fn insert_photo(&self, new: NewPhoto) -> Result<Photo> {
        let mut data = self.data.write().await;

        if let Some(cid) = new.collection_id {
            if data.collection(cid).is_none() {
                return Err(Error::NotFound(format!("Collection {cid}")));
            }
        }

        let photo = Photo {
            id: data.next_photo_id,
            title: new.title,
            description: new.description,
            storage: new.storage,
            original_filename: new.original_filename,
            format: new.format,
            file_size: new.file_size,
            width: new.width,
            height: new.height,
            uploaded_at: Utc::now(),
            collection_id: new.collection_id,
        };
        data.next_photo_id += 1;
        data.photos.push(photo.clone());

        self.persist(&data)?;
        Ok(photo)
    }

    /// Update photo title/description; None leaves a field unchanged
    pub async fn update_photo(
        &self,
        id: u64,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<Photo> {
        let mut data = self.data.write().await;

        let photo = data
            .photos
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("Photo {id}")))?;

        if let Some(title) = title {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(Error::InvalidInput("Photo title cannot be empty".to_string()));
            }
            photo.title = title;
        }
        if let Some(description) = description {
            photo.description = description.trim().to_string();
        }
        let updated = photo.clone();

        self.persist(&data)?;
        Ok(updated)
    }

    /// Assign a photo to a collection (or clear with None)
    pub async fn set_photo_collection(
        &self,
        id: u64,
        collection_id: Option<u64>,
    ) -> Result<Photo> {
        let mut data = self.data.write().await;

        if let Some(cid) = collection_id {
            if data.collection(cid).is_none() {
                return Err(Error::NotFound(format!("Collection {cid}")));
            }
        }

        let photo = data
            .photos
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("Photo {id}")))?;
        photo.collection_id = collection_id;
        let updated = photo.clone();

        self.persist(&data)?;
        Ok(updated)
    }

    /// Remove a photo, returning the removed record so callers can clean up
    /// any cloud copy
    pub async fn delete_photo(&self, id: u64) -> Result<Photo> {
        let mut data = self.data.write().await;

        let index = data
            .photos
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("Photo {id}")))?;
        let removed = data.photos.remove(index);

        self.persist(&data)?;
        Ok(removed)
    }

    /// Assign every existing photo among `ids` to a collection. Unknown ids
    /// are skipped, not errors; returns how many records changed.
    pub async fn bulk_set_collection(
        &self,
        ids: &[u64],
        collection_id: Option<u64>,
    ) -> Result<usize> {
        let mut data = self.data.write().await;

        if let Some(cid) = collection_id {
            if data.collection(cid).is_none() {
                return Err(Error::NotFound(format!("Collection {cid}")));
            }
        }

        let mut updated = 0;
        for photo in data.photos.iter_mut() {
            if ids.contains(&photo.id) {
                photo.collection_id = collection_id;
                updated += 1;
            }
        }

        if updated > 0 {
            self.persist(&data)?;
        }
        Ok(updated)
    }

    /// Remove every existing photo among `ids`, returning the removed records
    pub async fn bulk_delete(&self, ids: &[u64]) -> Result<Vec<Photo>> {
        let mut data = self.data.write().await;

        let mut removed = Vec::new();
        data.photos.retain(|p| {
            if ids.contains(&p.id) {
                removed.push(p.clone());
                false
            } else {
                true
            }
        });

        if !removed.is_empty() {
            self.persist(&data)?;
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Collections
    // ------------------------------------------------------------------

    /// List collections, newest first, with derived photo counts
    pub async fn list_collections(&self) -> Vec<CollectionSummary> {
        let data = self.data.read().await;
        let mut summaries: Vec<CollectionSummary> = data
            .collections
            .iter()
            .map(|c| CollectionSummary {
                id: c.id,
                name: c.name.clone(),
                created_at: c.created_at,
                photo_count: data.photo_count(c.id),
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        summaries
    }

    /// Does a collection with this id exist?
    pub async fn collection_exists(&self, id: u64) -> bool {
        let data = self.data.read().await;
        data.collection(id).is_some()
    }

    /// Map of collection id to name, for building photo views
    pub async fn collection_names(&self) -> HashMap<u64, String> {
        let data = self.data.read().await;
        data.collections
            .iter()
            .map(|c| (c.id, c.name.clone()))
            .collect()
    }

    /// Create a collection. Names are trimmed, must be non-empty, and must be
    /// unique case-insensitively.
    pub async fn create_collection(&self, name: &str) -> Result<Collection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Collection name is required".to_string()));
        }

        let mut data = self.data.write().await;
        if data.collection_by_name(name).is_some() {
            return Err(Error::Conflict(format!(
                "Collection with name \"{name}\" already exists"
            )));
        }

        let collection = Collection {
            id: data.next_collection_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        data.next_collection_id += 1;
        data.collections.push(collection.clone());

        self.persist(&data)?;
        Ok(collection)
    }

    /// Rename a collection, with the same name validation as creation
    pub async fn rename_collection(&self, id: u64, name: &str) -> Result<Collection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Collection name is required".to_string()));
        }

        let mut data = self.data.write().await;

        if let Some(existing) = data.collection_by_name(name) {
            if existing.id != id {
                return Err(Error::Conflict(format!(
                    "Collection with name \"{name}\" already exists"
                )));
            }
        }

        let collection = data
            .collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::NotFound(format!("Collection {id}")))?;
        collection.name = name.to_string();
        let renamed = collection.clone();

        self.persist(&data)?;
        Ok(renamed)
    }

    /// Delete a collection, unassigning (never deleting) its photos.
    /// Returns the removed collection and how many photos were unassigned.
    pub async fn delete_collection(&self, id: u64) -> Result<(Collection, usize)> {
        let mut data = self.data.write().await;

        let index = data
            .collections
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| Error::NotFound(format!("Collection {id}")))?;
        let removed = data.collections.remove(index);

        let mut unassigned = 0;
        for photo in data.photos.iter_mut() {
            if photo.collection_id == Some(id) {
                photo.collection_id = None;
                unassigned += 1;
            }
        }

        self.persist(&data)?;
        Ok((removed, unassigned))
    }

    /// Counts for the debug endpoint
    pub async fn counts(&self) -> StoreCounts {
        let data = self.data.read().await;
        let cloud_photos = data
            .photos
            .iter()
            .filter(|p| matches!(p.storage, PhotoStorage::Cloud { .. }))
            .count();
        StoreCounts {
            photos: data.photos.len(),
            collections: data.collections.len(),
            cloud_photos,
            inline_photos: data.photos.len() - cloud_photos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inline_photo(title: &str, collection_id: Option<u64>) -> NewPhoto {
        NewPhoto {
            title: title.to_string(),
            description: String::new(),
            storage: PhotoStorage::Inline {
                data_url: "data:image/png;base64,AA==".to_string(),
            },
            original_filename: Some(format!("{title}.png")),
            format: Some("png".to_string()),
            file_size: Some(1),
            width: None,
            height: None,
            collection_id,
        }
    }

    fn temp_store() -> (tempfile::TempDir, MetadataStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::open(dir.path().join("gallery_data.json")).unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn test_open_missing_file_starts_empty() {
        let (_dir, store) = temp_store();
        assert!(store.list_photos(None).await.is_empty());
        assert!(store.list_collections().await.is_empty());
    }

    #[tokio::test]
    async fn test_open_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallery_data.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(MetadataStore::open(path).is_err());
    }

    #[tokio::test]
    async fn test_insert_and_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallery_data.json");

        {
            let store = MetadataStore::open(path.clone()).unwrap();
            let collection = store.create_collection("Travel").await.unwrap();
            store
                .insert_photo(inline_photo("Sunset", Some(collection.id)))
                .await
                .unwrap();
        }

        // Reopen from disk
        let store = MetadataStore::open(path).unwrap();
        let photos = store.list_photos(None).await;
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].title, "Sunset");

        let collections = store.list_collections().await;
        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].photo_count, 1);
    }

    #[tokio::test]
    async fn test_insert_photo_rejects_unknown_collection() {
        let (_dir, store) = temp_store();
        let result = store.insert_photo(inline_photo("Sunset", Some(42))).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_ids_are_monotonic_and_stable() {
        let (_dir, store) = temp_store();
        let a = store.insert_photo(inline_photo("a", None)).await.unwrap();
        let b = store.insert_photo(inline_photo("b", None)).await.unwrap();
        assert_eq!(b.id, a.id + 1);

        store.delete_photo(a.id).await.unwrap();
        let c = store.insert_photo(inline_photo("c", None)).await.unwrap();
        // Deleted ids are never reused
        assert_eq!(c.id, b.id + 1);
    }

    #[tokio::test]
    async fn test_duplicate_collection_name_case_insensitive() {
        let (_dir, store) = temp_store();
        store.create_collection("Travel").await.unwrap();

        let result = store.create_collection("travel").await;
        assert!(matches!(result, Err(Error::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_collection_rejects_blank_name() {
        let (_dir, store) = temp_store();
        assert!(matches!(
            store.create_collection("   ").await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_rename_collection_allows_same_id_same_name() {
        let (_dir, store) = temp_store();
        let c = store.create_collection("Travel").await.unwrap();

        // Renaming to its own name (case change) is not a conflict
        let renamed = store.rename_collection(c.id, "TRAVEL").await.unwrap();
        assert_eq!(renamed.name, "TRAVEL");

        let other = store.create_collection("Family").await.unwrap();
        assert!(matches!(
            store.rename_collection(other.id, "travel").await,
            Err(Error::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_collection_unassigns_but_keeps_photos() {
        let (_dir, store) = temp_store();
        let c = store.create_collection("Travel").await.unwrap();
        let p = store
            .insert_photo(inline_photo("Sunset", Some(c.id)))
            .await
            .unwrap();

        let (_removed, unassigned) = store.delete_collection(c.id).await.unwrap();
        assert_eq!(unassigned, 1);

        let photo = store.photo(p.id).await.unwrap();
        assert_eq!(photo.collection_id, None);
        assert_eq!(store.list_photos(None).await.len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_set_collection_updates_exactly_requested() {
        let (_dir, store) = temp_store();
        let c = store.create_collection("Travel").await.unwrap();
        let a = store.insert_photo(inline_photo("a", None)).await.unwrap();
        let b = store.insert_photo(inline_photo("b", None)).await.unwrap();
        let untouched = store.insert_photo(inline_photo("c", None)).await.unwrap();

        // 999 does not exist; it is skipped, not an error
        let updated = store
            .bulk_set_collection(&[a.id, b.id, 999], Some(c.id))
            .await
            .unwrap();
        assert_eq!(updated, 2);

        assert_eq!(store.photo(a.id).await.unwrap().collection_id, Some(c.id));
        assert_eq!(store.photo(b.id).await.unwrap().collection_id, Some(c.id));
        assert_eq!(store.photo(untouched.id).await.unwrap().collection_id, None);
    }

    #[tokio::test]
    async fn test_bulk_delete_returns_removed_records() {
        let (_dir, store) = temp_store();
        let a = store.insert_photo(inline_photo("a", None)).await.unwrap();
        let _b = store.insert_photo(inline_photo("b", None)).await.unwrap();

        let removed = store.bulk_delete(&[a.id, 999]).await.unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id, a.id);
        assert_eq!(store.list_photos(None).await.len(), 1);
    }

    #[tokio::test]
    async fn test_list_photos_filters_by_collection() {
        let (_dir, store) = temp_store();
        let c = store.create_collection("Travel").await.unwrap();
        store
            .insert_photo(inline_photo("in", Some(c.id)))
            .await
            .unwrap();
        store.insert_photo(inline_photo("out", None)).await.unwrap();

        let filtered = store.list_photos(Some(c.id)).await;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].title, "in");
    }

    #[tokio::test]
    async fn test_no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallery_data.json");
        let store = MetadataStore::open(path.clone()).unwrap();
        store.create_collection("Travel").await.unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
