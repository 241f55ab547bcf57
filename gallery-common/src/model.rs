//! Data model for the gallery metadata document
//!
//! The whole gallery state is one flat JSON document (`GalleryData`) holding
//! photo records and collection records. Photo counts per collection are
//! derived at read time, never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the image bytes for a photo live.
///
/// `Cloud` points at an image uploaded to the cloud storage service.
/// `Inline` is the fallback: the image encoded as a base64 data URL directly
/// inside the metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhotoStorage {
    Cloud {
        public_id: String,
        secure_url: String,
    },
    Inline {
        data_url: String,
    },
}

impl PhotoStorage {
    /// Servable URL for this photo regardless of storage kind
    pub fn url(&self) -> &str {
        match self {
            PhotoStorage::Cloud { secure_url, .. } => secure_url,
            PhotoStorage::Inline { data_url } => data_url,
        }
    }

    /// Cloud public id, if this photo has a cloud copy to destroy
    pub fn public_id(&self) -> Option<&str> {
        match self {
            PhotoStorage::Cloud { public_id, .. } => Some(public_id),
            PhotoStorage::Inline { .. } => None,
        }
    }
}

/// A single photo record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub storage: PhotoStorage,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    pub uploaded_at: DateTime<Utc>,
    /// Owning collection; must reference an existing collection or be None
    #[serde(default)]
    pub collection_id: Option<u64>,
}

/// A named grouping of photos
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: u64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// The persisted metadata document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryData {
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub collections: Vec<Collection>,
    #[serde(default = "first_id")]
    pub next_photo_id: u64,
    #[serde(default = "first_id")]
    pub next_collection_id: u64,
}

fn first_id() -> u64 {
    1
}

impl Default for GalleryData {
    fn default() -> Self {
        Self {
            photos: Vec::new(),
            collections: Vec::new(),
            next_photo_id: 1,
            next_collection_id: 1,
        }
    }
}

impl GalleryData {
    /// Number of photos assigned to a collection (derived, never stored)
    pub fn photo_count(&self, collection_id: u64) -> usize {
        self.photos
            .iter()
            .filter(|p| p.collection_id == Some(collection_id))
            .count()
    }

    /// Look up a collection by id
    pub fn collection(&self, id: u64) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    /// Look up a collection by name, case-insensitive
    pub fn collection_by_name(&self, name: &str) -> Option<&Collection> {
        self.collections
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(id: u64, collection_id: Option<u64>) -> Photo {
        Photo {
            id,
            title: format!("photo-{id}"),
            description: String::new(),
            storage: PhotoStorage::Inline {
                data_url: "data:image/png;base64,AA==".to_string(),
            },
            original_filename: None,
            format: None,
            file_size: None,
            width: None,
            height: None,
            uploaded_at: Utc::now(),
            collection_id,
        }
    }

    #[test]
    fn test_photo_count_is_derived() {
        let mut data = GalleryData::default();
        data.collections.push(Collection {
            id: 1,
            name: "Travel".to_string(),
            created_at: Utc::now(),
        });
        data.photos.push(photo(1, Some(1)));
        data.photos.push(photo(2, Some(1)));
        data.photos.push(photo(3, None));

        assert_eq!(data.photo_count(1), 2);
        assert_eq!(data.photo_count(99), 0);
    }

    #[test]
    fn test_collection_lookup_case_insensitive() {
        let mut data = GalleryData::default();
        data.collections.push(Collection {
            id: 7,
            name: "Family".to_string(),
            created_at: Utc::now(),
        });

        assert!(data.collection_by_name("family").is_some());
        assert!(data.collection_by_name("FAMILY").is_some());
        assert!(data.collection_by_name("friends").is_none());
    }

    #[test]
    fn test_storage_url_accessor() {
        let cloud = PhotoStorage::Cloud {
            public_id: "photo_gallery/abc".to_string(),
            secure_url: "https://res.example.com/abc.jpg".to_string(),
        };
        assert_eq!(cloud.url(), "https://res.example.com/abc.jpg");
        assert_eq!(cloud.public_id(), Some("photo_gallery/abc"));

        let inline = PhotoStorage::Inline {
            data_url: "data:image/jpeg;base64,AA==".to_string(),
        };
        assert_eq!(inline.url(), "data:image/jpeg;base64,AA==");
        assert_eq!(inline.public_id(), None);
    }

    #[test]
    fn test_document_roundtrip_defaults() {
        // Older documents may omit counters entirely
        let json = r#"{"photos": [], "collections": []}"#;
        let data: GalleryData = serde_json::from_str(json).unwrap();
        assert_eq!(data.next_photo_id, 1);
        assert_eq!(data.next_collection_id, 1);
    }
}
