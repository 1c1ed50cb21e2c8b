use strata_engine::{
    load_level_manifest, load_story, resolve_app_paths, AppError, AppPaths, DirMapSource,
    ExplorationSession, LevelRegistry, LoopConfig, ModeMachine,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::modes;
use super::settings::resolve_settings;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) machine: ModeMachine,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    info!("=== Strata Startup ===");
    let paths = resolve_app_paths()?;
    build_app_at(&paths)
}

/// Composition root: settings, levels, maps, story, session, modes, in that order.
pub(crate) fn build_app_at(paths: &AppPaths) -> Result<AppWiring, AppError> {
    info!(
        root = %paths.root.display(),
        assets = %paths.assets_dir.display(),
        "app_paths_resolved"
    );
    let settings = resolve_settings(&paths.settings_file());

    let levels = load_level_manifest(&paths.level_manifest())?;
    info!(
        levels = levels.len(),
        initial = levels.first().map_or("-", |level| level.id.as_str()),
        "level_manifest_loaded"
    );
    let registry = LevelRegistry::new(levels).with_tile_size(settings.tile_size);
    info!(tile_size = registry.tile_size(), "level_registry_ready");
    let maps = DirMapSource::new(paths.maps_dir());

    let story = load_story(&paths.story_script())?;
    info!(arcs = story.arcs.len(), "story_loaded");

    let session = ExplorationSession::new(registry, Box::new(maps), settings.physics);
    let handlers = modes::build_handlers(&paths.assets_dir, story);

    Ok(AppWiring {
        config: settings.loop_config(),
        machine: ModeMachine::new(handlers, session),
    })
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
