use engine::{resolve_app_paths, AssetError, AssetRegistry, LoopConfig, StartupError};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::assets::asset_manifest;
use super::config::{load_config, CafeConfig, ConfigError};

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Assets(#[from] AssetError),
}

pub(crate) struct AppWiring {
    pub(crate) loop_config: LoopConfig,
    pub(crate) assets: AssetRegistry,
    pub(crate) cafe_config: CafeConfig,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Barista Simulator Startup ===");

    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), "project_root_resolved");
    let cafe_config = load_config()?;
    info!(
        seed = cafe_config.seed,
        drinks = cafe_config.menu.drinks.len(),
        "cafe_config_loaded"
    );
    let assets = AssetRegistry::load(&paths.asset_root, &asset_manifest())?;

    Ok(AppWiring {
        loop_config: LoopConfig::default(),
        assets,
        cafe_config,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
