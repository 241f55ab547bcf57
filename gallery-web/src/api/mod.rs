//! HTTP API handlers for gallery-web

pub mod auth;
pub mod collections;
pub mod debug;
pub mod health;
pub mod photos;
pub mod response;
pub mod ui;

pub use auth::{auth_status, login, logout};
pub use collections::{create_collection, delete_collection, list_collections, rename_collection};
pub use debug::debug_info;
pub use health::health_routes;
pub use photos::{
    bulk_delete_photos, bulk_update_photos, delete_photo, list_photos, update_photo,
    update_photo_collection, upload_photos,
};
pub use ui::{serve_admin, serve_admin_js, serve_app_js, serve_index, serve_style_css};
