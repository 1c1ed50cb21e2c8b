mod clock;
mod input;
mod loop_runner;
mod metrics;
mod mode;
mod rendering;
mod resources;
mod simulation;

pub use clock::{FixedStepClock, IterationPlan, DEFAULT_RATE_HZ};
pub use input::{InputAction, InputSnapshot, Key, KeyAction, KeyEvent};
pub use loop_runner::{run_app, AppError, LoopConfig, RENDER_RATE_ENV_VAR, UPDATE_RATE_ENV_VAR};
pub use metrics::LoopMetricsSnapshot;
pub use mode::{Mode, ModeCommand, ModeController, ModeHandler, ModeHandlers, ModeMachine};
pub use rendering::{
    measure_text, world_to_screen, Camera2D, Canvas, FrameCanvas, Renderer, Rgba, ScreenRect,
    Viewport,
};
pub use resources::{AudioBackend, AudioClip, ResourceCache, SilentAudio, Texture, TextureHandle};
pub use simulation::Simulation;
