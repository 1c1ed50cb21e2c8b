use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::run_on_demand::EventLoopExtRunOnDemand;
use winit::window::WindowBuilder;

use crate::content::{DialogueError, ManifestError};
use crate::StartupError;

use super::input::{Key, KeyAction, KeyEvent};
use super::mode::ModeMachine;
use super::rendering::Renderer;
use super::simulation::Simulation;

pub const UPDATE_RATE_ENV_VAR: &str = "STRATA_UPDATE_HZ";
pub const RENDER_RATE_ENV_VAR: &str = "STRATA_RENDER_HZ";

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub update_rate_hz: u32,
    pub render_rate_hz: u32,
    pub vsync: bool,
    pub max_frame_delta: Duration,
    pub max_consecutive_faults: u32,
    pub metrics_log_interval: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Strata".to_string(),
            window_width: 800,
            window_height: 600,
            update_rate_hz: 60,
            render_rate_hz: 60,
            vsync: true,
            max_frame_delta: Duration::from_millis(250),
            max_consecutive_faults: 8,
            metrics_log_interval: Duration::from_secs(1),
        }
    }
}

impl LoopConfig {
    /// Applies `STRATA_UPDATE_HZ` / `STRATA_RENDER_HZ`; bad values keep the configured rate.
    pub fn with_env_overrides(mut self) -> Self {
        self.update_rate_hz = resolve_rate_override(
            UPDATE_RATE_ENV_VAR,
            env::var(UPDATE_RATE_ENV_VAR),
            self.update_rate_hz,
        );
        self.render_rate_hz = resolve_rate_override(
            RENDER_RATE_ENV_VAR,
            env::var(RENDER_RATE_ENV_VAR),
            self.render_rate_hz,
        );
        self
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error("failed to load level manifest: {0}")]
    Manifest(#[from] ManifestError),
    #[error("failed to load story script: {0}")]
    Story(#[from] DialogueError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
    #[error("stopped after {limit} consecutive faulted ticks or frames")]
    TooManyFaults { limit: u32 },
}

/// Opens the window and drives `machine` until a close request, an exit command or the
/// fault limit. Loaded modes are unloaded before this returns.
pub fn run_app(config: LoopConfig, machine: ModeMachine) -> Result<(), AppError> {
    let config = config.with_env_overrides();
    info!(
        title = %config.window_title,
        width = config.window_width,
        height = config.window_height,
        update_rate_hz = config.update_rate_hz,
        render_rate_hz = config.render_rate_hz,
        vsync = config.vsync,
        max_frame_delta_ms = config.max_frame_delta.as_millis() as u64,
        max_consecutive_faults = config.max_consecutive_faults,
        "loop_config"
    );

    let mut event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer =
        Renderer::new(Arc::clone(&window), config.vsync).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let mut simulation = Simulation::new(machine, &config);
    simulation.start();
    info!(mode = %simulation.machine().current_mode(), "mode_started");

    let vsync = config.vsync;
    let mut last_iteration = Instant::now();
    let mut last_frame = last_iteration;
    let mut shut_down = false;

    let run_result = event_loop.run_on_demand(|event, window_target| match event {
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested => simulation.request_close("window_close"),
            WindowEvent::Resized(size) => {
                if let Err(error) = renderer.resize(size.width, size.height) {
                    warn!(
                        error = %error,
                        width = size.width,
                        height = size.height,
                        "renderer_resize_failed"
                    );
                }
            }
            WindowEvent::Focused(false) => simulation.focus_lost(),
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(key_event) = map_key_event(&event) {
                    simulation.push_key(key_event);
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            let now = Instant::now();
            let elapsed = now.saturating_duration_since(last_iteration);
            last_iteration = now;

            let plan = simulation.advance(elapsed);
            if plan.render && simulation.should_continue() {
                let frame_dt = now.saturating_duration_since(last_frame);
                last_frame = now;
                let draw_result =
                    renderer.draw_frame(|canvas| simulation.render(canvas, frame_dt));
                if let Err(error) = draw_result {
                    error!(error = %error, "render_present_failed");
                    simulation.request_close("render_present_failed");
                }
            }
            simulation.publish_metrics(now);

            if !simulation.should_continue() {
                window_target.exit();
                return;
            }
            if !vsync {
                let budget = simulation.remaining_render_budget();
                if !budget.is_zero() {
                    thread::sleep(budget);
                }
            }
        }
        Event::LoopExiting => {
            if !shut_down {
                simulation.shutdown();
                shut_down = true;
                info!(ticks = simulation.tick_counter(), "shutdown");
            }
        }
        _ => {}
    });

    if !shut_down {
        simulation.shutdown();
    }
    run_result.map_err(AppError::EventLoopRun)?;

    if simulation.fault_limit_reached() {
        return Err(AppError::TooManyFaults {
            limit: config.max_consecutive_faults.max(1),
        });
    }
    Ok(())
}

fn map_key_event(event: &winit::event::KeyEvent) -> Option<KeyEvent> {
    let PhysicalKey::Code(code) = event.physical_key else {
        return None;
    };
    let key = map_key_code(code)?;
    Some(KeyEvent::new(key, map_key_action(event.state, event.repeat)))
}

fn map_key_code(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::Space => Some(Key::Space),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(Key::Enter),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyC => Some(Key::C),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::KeyP => Some(Key::P),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyV => Some(Key::V),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::F3 => Some(Key::F3),
        _ => None,
    }
}

fn map_key_action(state: ElementState, repeat: bool) -> KeyAction {
    match state {
        ElementState::Released => KeyAction::Release,
        ElementState::Pressed if repeat => KeyAction::Repeat,
        ElementState::Pressed => KeyAction::Press,
    }
}

fn resolve_rate_override(
    env_var: &'static str,
    lookup: Result<String, env::VarError>,
    config_rate_hz: u32,
) -> u32 {
    match lookup {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(rate_hz) if rate_hz > 0 => rate_hz,
            _ => {
                warn!(
                    env_var,
                    value = value.as_str(),
                    "invalid rate env var value; falling back to config"
                );
                config_rate_hz
            }
        },
        Err(env::VarError::NotPresent) => config_rate_hz,
        Err(err) => {
            warn!(
                env_var,
                error = %err,
                "unable to read rate env var; falling back to config"
            );
            config_rate_hz
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    #[test]
    fn defaults_match_documented_loop_settings() {
        let config = LoopConfig::default();
        assert_eq!(config.update_rate_hz, 60);
        assert_eq!(config.render_rate_hz, 60);
        assert!(config.vsync);
        assert_eq!(config.max_frame_delta, Duration::from_millis(250));
        assert_eq!(config.max_consecutive_faults, 8);
    }

    #[test]
    fn rate_override_accepts_positive_integer() {
        let rate = resolve_rate_override(UPDATE_RATE_ENV_VAR, Ok(" 120 ".to_string()), 60);
        assert_eq!(rate, 120);
    }

    #[test]
    fn rate_override_falls_back_on_invalid_value() {
        assert_eq!(
            resolve_rate_override(UPDATE_RATE_ENV_VAR, Ok("fast".to_string()), 60),
            60
        );
        assert_eq!(
            resolve_rate_override(RENDER_RATE_ENV_VAR, Ok("0".to_string()), 30),
            30
        );
    }

    #[test]
    fn rate_override_absent_keeps_config() {
        assert_eq!(
            resolve_rate_override(UPDATE_RATE_ENV_VAR, Err(env::VarError::NotPresent), 75),
            75
        );
        assert_eq!(
            resolve_rate_override(
                UPDATE_RATE_ENV_VAR,
                Err(env::VarError::NotUnicode(OsString::from("x"))),
                75
            ),
            75
        );
    }

    #[test]
    fn key_codes_map_to_mode_keys() {
        assert_eq!(map_key_code(KeyCode::ArrowLeft), Some(Key::Left));
        assert_eq!(map_key_code(KeyCode::NumpadEnter), Some(Key::Enter));
        assert_eq!(map_key_code(KeyCode::F3), Some(Key::F3));
        assert_eq!(map_key_code(KeyCode::KeyZ), None);
    }

    #[test]
    fn held_key_repeat_is_distinct_from_press() {
        assert_eq!(map_key_action(ElementState::Pressed, false), KeyAction::Press);
        assert_eq!(map_key_action(ElementState::Pressed, true), KeyAction::Repeat);
        assert_eq!(map_key_action(ElementState::Released, true), KeyAction::Release);
    }
}
