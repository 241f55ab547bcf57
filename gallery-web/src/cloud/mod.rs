//! Cloudinary REST API client
//!
//! Signed uploads and deletes against the Cloudinary image API. Uploads are a
//! single attempt; callers fall back to inline storage on failure, so no retry
//! or backoff lives here.

use std::time::Duration;

use gallery_common::config::CloudinaryConfig;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

pub mod inline;

const API_BASE_URL: &str = "https://api.cloudinary.com/v1_1";
/// All uploads land in one folder, mirroring the gallery's flat namespace
const UPLOAD_FOLDER: &str = "photo_gallery";
const USER_AGENT: &str = concat!("gallery-web/", env!("CARGO_PKG_VERSION"));

/// Cloud client errors
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Upload result mapped from the Cloudinary response
#[derive(Debug, Clone, Deserialize)]
pub struct CloudUpload {
    pub public_id: String,
    pub secure_url: String,
    pub format: Option<String>,
    pub bytes: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Cloudinary API client
pub struct CloudinaryClient {
    http_client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self, CloudError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CloudError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Upload one image; the filename seasons Cloudinary's public id
    pub async fn upload(&self, bytes: Vec<u8>, filename: &str) -> Result<CloudUpload, CloudError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let sign_params = [
            ("folder", UPLOAD_FOLDER),
            ("timestamp", timestamp.as_str()),
        ];
        let signature = sign_request(&sign_params, &self.config.api_secret);

        let file_part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", UPLOAD_FOLDER)
            .text("signature", signature);

        let url = format!(
            "{}/{}/image/upload",
            API_BASE_URL, self.config.cloud_name
        );

        tracing::debug!(filename = filename, "Uploading image to Cloudinary");

        let response = self
            .http_client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CloudError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CloudError::ApiError(status.as_u16(), error_text));
        }

        let upload: CloudUpload = response
            .json()
            .await
            .map_err(|e| CloudError::ParseError(e.to_string()))?;

        tracing::info!(
            public_id = %upload.public_id,
            bytes = upload.bytes.unwrap_or(0),
            "Cloudinary upload successful"
        );

        Ok(upload)
    }

    /// Delete a cloud image. "not found" counts as success: the record is
    /// gone either way.
    pub async fn destroy(&self, public_id: &str) -> Result<(), CloudError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let sign_params = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
        ];
        let signature = sign_request(&sign_params, &self.config.api_secret);

        let form = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", self.config.api_key.as_str()),
            ("signature", signature.as_str()),
        ];

        let url = format!(
            "{}/{}/image/destroy",
            API_BASE_URL, self.config.cloud_name
        );

        let response = self
            .http_client
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| CloudError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CloudError::ApiError(status.as_u16(), error_text));
        }

        let destroy: DestroyResponse = response
            .json()
            .await
            .map_err(|e| CloudError::ParseError(e.to_string()))?;

        match destroy.result.as_str() {
            "ok" | "not found" => {
                tracing::info!(public_id = public_id, result = %destroy.result, "Cloudinary destroy finished");
                Ok(())
            }
            other => Err(CloudError::ApiError(200, format!("destroy result: {other}"))),
        }
    }
}

/// Build the Cloudinary string-to-sign: parameters sorted by key, joined as
/// `key=value` pairs with `&`.
fn string_to_sign(params: &[(&str, &str)]) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by_key(|(key, _)| *key);
    sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// SHA-256 request signature: hex digest of the string-to-sign with the API
/// secret appended.
fn sign_request(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(string_to_sign(params).as_bytes());
    hasher.update(api_secret.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CloudinaryClient::new(CloudinaryConfig {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        });
        assert!(client.is_ok());
    }

    #[test]
    fn test_string_to_sign_sorts_params() {
        let params = [("timestamp", "1730000000"), ("folder", "photo_gallery")];
        assert_eq!(
            string_to_sign(&params),
            "folder=photo_gallery&timestamp=1730000000"
        );
    }

    #[test]
    fn test_signature_is_order_independent() {
        let a = sign_request(
            &[("folder", "photo_gallery"), ("timestamp", "1730000000")],
            "secret",
        );
        let b = sign_request(
            &[("timestamp", "1730000000"), ("folder", "photo_gallery")],
            "secret",
        );
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_signature_depends_on_secret() {
        let params = [("timestamp", "1730000000")];
        assert_ne!(
            sign_request(&params, "secret-a"),
            sign_request(&params, "secret-b")
        );
    }
}
