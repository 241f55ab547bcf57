//! gallery-web library - photo gallery web service
//!
//! Public gallery view plus a password-gated admin panel. Photo metadata is
//! persisted to a JSON document; image bytes go to Cloudinary when credentials
//! are configured, otherwise they are stored inline as base64 data URLs.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post, put};
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::auth::SessionStore;
use crate::cloud::CloudinaryClient;
use crate::store::MetadataStore;

pub mod api;
pub mod cloud;
pub mod store;

/// Upload request body cap (25 MB) - covers multi-file photo uploads
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// JSON-file-backed metadata store
    pub store: Arc<MetadataStore>,
    /// Cloud storage client; None means inline-only fallback mode
    pub cloud: Option<Arc<CloudinaryClient>>,
    /// Live admin session tokens
    pub sessions: SessionStore,
    /// Shared admin password
    pub admin_password: Arc<String>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        store: MetadataStore,
        cloud: Option<CloudinaryClient>,
        admin_password: String,
    ) -> Self {
        Self {
            store: Arc::new(store),
            cloud: cloud.map(Arc::new),
            sessions: SessionStore::default(),
            admin_password: Arc::new(admin_password),
        }
    }
}

/// Build application router
///
/// Admin routes sit behind the session middleware; the gallery view, listing
/// endpoints, auth endpoints, and health check are public.
pub fn build_router(state: AppState) -> Router {
    // Protected routes (require a live admin session)
    let admin = Router::new()
        .route("/api/photos", post(api::upload_photos))
        .route("/api/photos/bulk-update", put(api::bulk_update_photos))
        .route("/api/photos/bulk-delete", delete(api::bulk_delete_photos))
        .route("/api/photos/:id", put(api::update_photo))
        .route("/api/photos/:id", delete(api::delete_photo))
        .route("/api/photos/:id/collection", put(api::update_photo_collection))
        .route("/api/collections", post(api::create_collection))
        .route("/api/collections/:id", put(api::rename_collection))
        .route("/api/collections/:id", delete(api::delete_collection))
        .route("/api/debug", get(api::debug_info))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::require_admin,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/admin", get(api::serve_admin))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/static/admin.js", get(api::serve_admin_js))
        .route("/static/style.css", get(api::serve_style_css))
        .route("/api/photos", get(api::list_photos))
        .route("/api/collections", get(api::list_collections))
        .route("/api/auth/login", post(api::login))
        .route("/api/auth/logout", post(api::logout))
        .route("/api/auth/status", get(api::auth_status))
        .merge(api::health_routes());

    Router::new()
        .merge(admin)
        .merge(public)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
