//! Tests for configuration resolution and graceful degradation
//!
//! Covers:
//! - Data folder priority order (CLI > env > default)
//! - Automatic data folder creation
//! - Admin password and Cloudinary credential resolution
//!
//! Note: Uses serial_test to prevent ENV variable race conditions. Tests that
//! manipulate environment variables are marked with #[serial] so they run
//! sequentially, not in parallel.

use gallery_common::config::{
    default_data_folder, resolve_admin_password, resolve_cloudinary, DataFolderInitializer,
    DataFolderResolver, TomlConfig, ADMIN_PASSWORD_ENV, CLOUD_API_KEY_ENV, CLOUD_API_SECRET_ENV,
    CLOUD_NAME_ENV, DATA_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

fn clear_env() {
    env::remove_var(DATA_FOLDER_ENV);
    env::remove_var(ADMIN_PASSWORD_ENV);
    env::remove_var(CLOUD_NAME_ENV);
    env::remove_var(CLOUD_API_KEY_ENV);
    env::remove_var(CLOUD_API_SECRET_ENV);
}

#[test]
#[serial]
fn test_resolver_cli_arg_takes_precedence() {
    env::set_var(DATA_FOLDER_ENV, "/tmp/gallery-env-folder");

    let resolver = DataFolderResolver::new(Some(PathBuf::from("/tmp/gallery-cli-folder")));
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/gallery-cli-folder"));

    env::remove_var(DATA_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_env_var() {
    clear_env();
    env::set_var(DATA_FOLDER_ENV, "/tmp/gallery-env-folder");

    let resolver = DataFolderResolver::new(None);
    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/gallery-env-folder"));

    env::remove_var(DATA_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_blank_env_var_ignored() {
    clear_env();
    env::set_var(DATA_FOLDER_ENV, "   ");

    let resolver = DataFolderResolver::new(None);
    // Blank value falls through to the compiled default
    assert_eq!(resolver.resolve(), default_data_folder());

    env::remove_var(DATA_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_default_when_nothing_configured() {
    clear_env();

    let resolver = DataFolderResolver::new(None);
    let folder = resolver.resolve();

    assert!(!folder.as_os_str().is_empty());
    assert_eq!(folder, default_data_folder());
}

#[test]
fn test_initializer_metadata_path() {
    let folder = PathBuf::from("/tmp/gallery-test-root");
    let initializer = DataFolderInitializer::new(folder.clone());

    assert_eq!(initializer.metadata_path(), folder.join("gallery_data.json"));
}

#[test]
fn test_initializer_creates_directory_idempotently() {
    let folder = PathBuf::from(format!("/tmp/gallery-test-create-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&folder);

    let initializer = DataFolderInitializer::new(folder.clone());
    assert!(initializer.ensure_directory_exists().is_ok());
    assert!(folder.is_dir());

    // Second call must also succeed
    assert!(initializer.ensure_directory_exists().is_ok());

    let _ = std::fs::remove_dir_all(&folder);
}

#[test]
#[serial]
fn test_admin_password_from_env() {
    clear_env();
    env::set_var(ADMIN_PASSWORD_ENV, "hunter2");

    let password = resolve_admin_password(None).unwrap();
    assert_eq!(password, "hunter2");

    env::remove_var(ADMIN_PASSWORD_ENV);
}

#[test]
#[serial]
fn test_admin_password_from_toml_fallback() {
    clear_env();

    let toml_config = TomlConfig {
        admin_password: Some("from-toml".to_string()),
        ..Default::default()
    };

    let password = resolve_admin_password(Some(&toml_config)).unwrap();
    assert_eq!(password, "from-toml");
}

#[test]
#[serial]
fn test_admin_password_env_beats_toml() {
    clear_env();
    env::set_var(ADMIN_PASSWORD_ENV, "from-env");

    let toml_config = TomlConfig {
        admin_password: Some("from-toml".to_string()),
        ..Default::default()
    };

    let password = resolve_admin_password(Some(&toml_config)).unwrap();
    assert_eq!(password, "from-env");

    env::remove_var(ADMIN_PASSWORD_ENV);
}

#[test]
#[serial]
fn test_admin_password_missing_is_error() {
    clear_env();
    assert!(resolve_admin_password(None).is_err());
}

#[test]
#[serial]
fn test_cloudinary_requires_complete_credential_set() {
    clear_env();
    env::set_var(CLOUD_NAME_ENV, "demo");
    env::set_var(CLOUD_API_KEY_ENV, "key");
    // Secret missing: incomplete set resolves to None

    assert!(resolve_cloudinary(None).is_none());

    env::set_var(CLOUD_API_SECRET_ENV, "secret");
    let creds = resolve_cloudinary(None).expect("complete credential set");
    assert_eq!(creds.cloud_name, "demo");
    assert_eq!(creds.api_key, "key");
    assert_eq!(creds.api_secret, "secret");

    clear_env();
}

#[test]
#[serial]
fn test_cloudinary_absent_means_inline_only() {
    clear_env();
    assert!(resolve_cloudinary(None).is_none());
}
