//! gallery-web - personal photo gallery web service
//!
//! Public gallery view plus a password-gated admin panel. Photo metadata
//! lives in a JSON document under the data folder; image bytes go to
//! Cloudinary when credentials are configured, otherwise inline into the
//! metadata as base64 data URLs.

use anyhow::Result;
use clap::Parser;
use gallery_common::config::{
    load_toml_config, resolve_admin_password, resolve_cloudinary, DataFolderInitializer,
    DataFolderResolver,
};
use gallery_web::cloud::CloudinaryClient;
use gallery_web::store::MetadataStore;
use gallery_web::{build_router, AppState};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "gallery-web", version, about = "Personal photo gallery web service")]
struct Args {
    /// Data folder holding the metadata document (overrides env and config file)
    #[arg(long)]
    data_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "GALLERY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "GALLERY_PORT", default_value_t = 5810)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber first
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification immediately after tracing init
    info!(
        "Starting gallery-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let toml_config = load_toml_config();

    // Data folder: CLI > env > TOML > OS default
    let resolver = DataFolderResolver::new(args.data_folder);
    let data_folder = resolver.resolve();

    let initializer = DataFolderInitializer::new(data_folder);
    initializer.ensure_directory_exists()?;

    let metadata_path = initializer.metadata_path();
    info!("Metadata file: {}", metadata_path.display());

    let store = MetadataStore::open(metadata_path)?;

    let admin_password = resolve_admin_password(toml_config.as_ref())?;

    let cloud = match resolve_cloudinary(toml_config.as_ref()) {
        Some(config) => {
            info!("✓ Cloud storage configured (cloud_name: {})", config.cloud_name);
            Some(CloudinaryClient::new(config)?)
        }
        None => {
            warn!("Cloud storage not configured - uploads will use inline fallback storage");
            None
        }
    };

    let state = AppState::new(store, cloud, admin_password);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port)).await?;
    info!("gallery-web listening on http://{}:{}", args.host, args.port);
    info!("Admin panel: http://{}:{}/admin", args.host, args.port);

    axum::serve(listener, app).await?;

    Ok(())
}
