use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod app;
pub mod content;
pub mod world;

pub use app::{
    measure_text, run_app, world_to_screen, AppError, AudioBackend, AudioClip, Camera2D, Canvas,
    FixedStepClock, FrameCanvas, InputAction, InputSnapshot, IterationPlan, Key, KeyAction,
    KeyEvent, LoopConfig, LoopMetricsSnapshot, Mode, ModeCommand, ModeController, ModeHandler,
    ModeHandlers, ModeMachine, Renderer, ResourceCache, Rgba, ScreenRect, SilentAudio, Simulation,
    Texture, TextureHandle, Viewport, DEFAULT_RATE_HZ, RENDER_RATE_ENV_VAR, UPDATE_RATE_ENV_VAR,
};
pub use content::{
    load_level_manifest, load_story, parse_json_with_path, parse_level_manifest, parse_map,
    parse_story, ChoiceView, DialogueChoice, DialogueError, DialogueLine, DialogueRunner,
    DialogueView, DirMapSource, JsonPathError, ManifestError, MapError, MapSource, MapSourceError,
    MemoryMapSource, StoryArc, StoryScene, StoryScript,
};
pub use world::{
    Aabb, Actor, AxisCollision, ExplorationSession, Inventory, LevelDescriptor, LevelError,
    LevelRegistry, MapObject, ObjectId, ObjectKind, PhysicsConfig, StepReport, TickEvent,
    TileGrid, TileGridError, TileKind, TransitionPoint, Vec2, BASE_LAYER, DEFAULT_ACTOR_SIZE,
    DEFAULT_ITEM_NAME, DEFAULT_TILE_SIZE,
};

pub const ROOT_ENV_VAR: &str = "STRATA_ROOT";

/// Project root and the asset layout beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
}

impl AppPaths {
    pub fn from_root(root: PathBuf) -> Self {
        let assets_dir = root.join("assets");
        Self { root, assets_dir }
    }

    pub fn level_manifest(&self) -> PathBuf {
        self.assets_dir.join("levels.json")
    }

    pub fn maps_dir(&self) -> PathBuf {
        self.assets_dir.join("maps")
    }

    pub fn story_script(&self) -> PathBuf {
        self.assets_dir.join("story.json")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.assets_dir.join("settings.json")
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error(
        "STRATA_ROOT is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
PowerShell: $env:{env_var}=\"C:\\path\\to\\strata\"\n\
Bash/zsh: export {env_var}=\"/path/to/strata\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    resolve_root().map(AppPaths::from_root)
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let raw = PathBuf::from(value);
            let normalized = normalize_path(&raw);
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot { path: normalized })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

            for candidate in exe_dir.ancestors() {
                if is_repo_marker(candidate) {
                    return Ok(normalize_path(candidate));
                }
            }

            Err(StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
