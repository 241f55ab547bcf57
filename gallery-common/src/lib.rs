//! # Gallery Common Library
//!
//! Shared code for the photo gallery service:
//! - Data model (photos, collections, the persisted document)
//! - Configuration resolution (data folder, credentials, admin password)
//! - Common error type

pub mod config;
pub mod error;
pub mod model;

pub use error::{Error, Result};
