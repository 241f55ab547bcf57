//! Configuration loading and data folder resolution
//!
//! The data folder (which holds the metadata document) resolves through four
//! tiers, highest priority first:
//! 1. Command-line argument
//! 2. `GALLERY_DATA_FOLDER` environment variable
//! 3. TOML config file (`config.toml` under the platform config dir)
//! 4. OS-dependent compiled default
//!
//! Cloudinary credentials and the admin password resolve ENV → TOML, with a
//! warning when both tiers carry a value.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming the data folder
pub const DATA_FOLDER_ENV: &str = "GALLERY_DATA_FOLDER";
/// Environment variable holding the shared admin password
pub const ADMIN_PASSWORD_ENV: &str = "GALLERY_ADMIN_PASSWORD";
/// Cloudinary credential environment variables
pub const CLOUD_NAME_ENV: &str = "CLOUDINARY_CLOUD_NAME";
pub const CLOUD_API_KEY_ENV: &str = "CLOUDINARY_API_KEY";
pub const CLOUD_API_SECRET_ENV: &str = "CLOUDINARY_API_SECRET";

/// File name of the metadata document inside the data folder
pub const METADATA_FILE_NAME: &str = "gallery_data.json";

/// Optional TOML configuration file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub data_folder: Option<PathBuf>,
    #[serde(default)]
    pub admin_password: Option<String>,
    #[serde(default)]
    pub cloudinary: Option<CloudinaryToml>,
}

/// Cloudinary credential block in the TOML config file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudinaryToml {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Cloudinary credentials, fully resolved
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Data folder resolution following the 4-tier priority order
pub struct DataFolderResolver {
    cli_arg: Option<PathBuf>,
}

impl DataFolderResolver {
    pub fn new(cli_arg: Option<PathBuf>) -> Self {
        Self { cli_arg }
    }

    /// Resolve the data folder. Never fails; the lowest tier is a compiled
    /// default.
    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(DATA_FOLDER_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }

        // Priority 3: TOML config file
        if let Some(config) = load_toml_config() {
            if let Some(folder) = config.data_folder {
                return folder;
            }
        }

        // Priority 4: OS-dependent compiled default
        default_data_folder()
    }
}

/// Data folder initialization: directory creation and file path helpers
pub struct DataFolderInitializer {
    folder: PathBuf,
}

impl DataFolderInitializer {
    pub fn new(folder: PathBuf) -> Self {
        Self { folder }
    }

    /// Create the data folder (and parents) if missing. Idempotent.
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.folder)?;
        Ok(())
    }

    /// Path of the metadata document inside the data folder
    pub fn metadata_path(&self) -> PathBuf {
        self.folder.join(METADATA_FILE_NAME)
    }

    pub fn metadata_exists(&self) -> bool {
        self.metadata_path().exists()
    }
}

/// Locate the config file for the platform, if one exists
fn config_file_path() -> Option<PathBuf> {
    if cfg!(target_os = "linux") {
        // ~/.config/photo-gallery/config.toml first, then /etc/photo-gallery/config.toml
        if let Some(path) = dirs::config_dir().map(|d| d.join("photo-gallery").join("config.toml"))
        {
            if path.exists() {
                return Some(path);
            }
        }
        let system = PathBuf::from("/etc/photo-gallery/config.toml");
        if system.exists() {
            return Some(system);
        }
        None
    } else {
        dirs::config_dir()
            .map(|d| d.join("photo-gallery").join("config.toml"))
            .filter(|p| p.exists())
    }
}

/// Best-effort TOML config load. A missing or unparseable file never stops
/// startup; parse failures are logged and ignored.
pub fn load_toml_config() -> Option<TomlConfig> {
    let path = config_file_path()?;
    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<TomlConfig>(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring unparseable config file {}: {}", path.display(), e);
                None
            }
        },
        Err(e) => {
            warn!("Ignoring unreadable config file {}: {}", path.display(), e);
            None
        }
    }
}

/// OS-dependent default data folder
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("photo-gallery"))
        .unwrap_or_else(|| PathBuf::from("./gallery_data"))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolve Cloudinary credentials, ENV → TOML.
///
/// Returns None when no complete credential set exists; the service then runs
/// in inline-only storage mode.
pub fn resolve_cloudinary(toml_config: Option<&TomlConfig>) -> Option<CloudinaryConfig> {
    let env_creds = match (
        non_blank(std::env::var(CLOUD_NAME_ENV).ok()),
        non_blank(std::env::var(CLOUD_API_KEY_ENV).ok()),
        non_blank(std::env::var(CLOUD_API_SECRET_ENV).ok()),
    ) {
        (Some(cloud_name), Some(api_key), Some(api_secret)) => Some(CloudinaryConfig {
            cloud_name,
            api_key,
            api_secret,
        }),
        _ => None,
    };

    let toml_creds = toml_config
        .and_then(|c| c.cloudinary.as_ref())
        .map(|c| CloudinaryConfig {
            cloud_name: c.cloud_name.clone(),
            api_key: c.api_key.clone(),
            api_secret: c.api_secret.clone(),
        });

    if env_creds.is_some() && toml_creds.is_some() {
        warn!("Cloudinary credentials found in both environment and TOML. Using environment (highest priority).");
    }

    if let Some(creds) = env_creds {
        info!("Cloudinary credentials loaded from environment");
        return Some(creds);
    }
    if let Some(creds) = toml_creds {
        info!("Cloudinary credentials loaded from TOML config");
        return Some(creds);
    }
    None
}

/// Resolve the shared admin password, ENV → TOML.
///
/// The service refuses to start without one; a passwordless admin panel is
/// worse than no service.
pub fn resolve_admin_password(toml_config: Option<&TomlConfig>) -> Result<String> {
    let env_password = non_blank(std::env::var(ADMIN_PASSWORD_ENV).ok());
    let toml_password = toml_config.and_then(|c| non_blank(c.admin_password.clone()));

    if env_password.is_some() && toml_password.is_some() {
        warn!("Admin password found in both environment and TOML. Using environment (highest priority).");
    }

    if let Some(password) = env_password {
        info!("Admin password loaded from environment");
        return Ok(password);
    }
    if let Some(password) = toml_password {
        info!("Admin password loaded from TOML config");
        return Ok(password);
    }

    Err(Error::Config(format!(
        "Admin password not configured. Set {} or add admin_password to the config file.",
        ADMIN_PASSWORD_ENV
    )))
}

/// Validate a credential or password value (non-empty, non-whitespace)
pub fn is_valid_value(value: &str) -> bool {
    !value.trim().is_empty()
}

impl AsRef<Path> for DataFolderInitializer {
    fn as_ref(&self) -> &Path {
        &self.folder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_value() {
        assert!(is_valid_value("secret"));
        assert!(!is_valid_value(""));
        assert!(!is_valid_value("   "));
    }

    #[test]
    fn test_default_data_folder_nonempty() {
        assert!(!default_data_folder().as_os_str().is_empty());
    }

    #[test]
    fn test_toml_roundtrip_with_cloudinary_block() {
        let config = TomlConfig {
            data_folder: Some(PathBuf::from("/srv/gallery")),
            admin_password: Some("hunter2".to_string()),
            cloudinary: Some(CloudinaryToml {
                cloud_name: "demo".to_string(),
                api_key: "key".to_string(),
                api_secret: "secret".to_string(),
            }),
        };

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: TomlConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.data_folder, Some(PathBuf::from("/srv/gallery")));
        assert_eq!(parsed.admin_password, Some("hunter2".to_string()));
        assert_eq!(parsed.cloudinary.unwrap().cloud_name, "demo");
    }

    #[test]
    fn test_backward_compatible_missing_fields() {
        let config: TomlConfig = toml::from_str(r#"data_folder = "/srv/gallery""#).unwrap();
        assert_eq!(config.data_folder, Some(PathBuf::from("/srv/gallery")));
        assert!(config.admin_password.is_none());
        assert!(config.cloudinary.is_none());
    }
}
