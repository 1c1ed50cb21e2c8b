use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use super::clock::{FixedStepClock, IterationPlan};
use super::input::{InputQueue, Key, KeyEvent};
use super::loop_runner::LoopConfig;
use super::metrics::{LoopMetricsSnapshot, MetricsAccumulator};
use super::mode::ModeMachine;
use super::rendering::{draw_overlay, Canvas, OverlayData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Input,
    Update,
    Render,
}

impl Stage {
    fn name(self) -> &'static str {
        match self {
            Stage::Input => "input",
            Stage::Update => "update",
            Stage::Render => "render",
        }
    }
}

/// Window-independent half of the loop: input dispatch, fixed-step updates, guarded
/// rendering and metrics.
pub struct Simulation {
    machine: ModeMachine,
    clock: FixedStepClock,
    input: InputQueue,
    metrics: MetricsAccumulator,
    latest_metrics: LoopMetricsSnapshot,
    update_rate_hz: u32,
    render_rate_hz: u32,
    overlay_visible: bool,
    max_consecutive_faults: u32,
    update_faults: u32,
    render_faults: u32,
    fault_limit_reached: bool,
    close_requested: bool,
    tick_counter: u64,
}

impl Simulation {
    pub fn new(machine: ModeMachine, config: &LoopConfig) -> Self {
        Self {
            machine,
            clock: FixedStepClock::new(
                config.update_rate_hz,
                config.render_rate_hz,
                config.max_frame_delta,
            ),
            input: InputQueue::default(),
            metrics: MetricsAccumulator::new(config.metrics_log_interval),
            latest_metrics: LoopMetricsSnapshot::default(),
            update_rate_hz: config.update_rate_hz,
            render_rate_hz: config.render_rate_hz,
            overlay_visible: false,
            max_consecutive_faults: config.max_consecutive_faults.max(1),
            update_faults: 0,
            render_faults: 0,
            fault_limit_reached: false,
            close_requested: false,
            tick_counter: 0,
        }
    }

    pub fn machine(&self) -> &ModeMachine {
        &self.machine
    }

    pub fn tick_counter(&self) -> u64 {
        self.tick_counter
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn fault_limit_reached(&self) -> bool {
        self.fault_limit_reached
    }

    pub fn latest_metrics(&self) -> LoopMetricsSnapshot {
        self.latest_metrics
    }

    pub fn should_continue(&self) -> bool {
        !self.close_requested && !self.fault_limit_reached && !self.machine.exit_requested()
    }

    pub fn start(&mut self) {
        self.machine.start();
    }

    /// Buffered until the next iteration.
    pub fn push_key(&mut self, event: KeyEvent) {
        self.input.push(event);
    }

    pub fn focus_lost(&mut self) {
        self.input.release_all();
    }

    pub fn request_close(&mut self, reason: &'static str) {
        if !self.close_requested {
            info!(reason, "shutdown_requested");
        }
        self.close_requested = true;
    }

    /// Dispatches buffered input, then runs every logic tick that is due. The returned plan
    /// says whether a render is due.
    pub fn advance(&mut self, elapsed: Duration) -> IterationPlan {
        let plan = self.clock.advance(elapsed);
        self.dispatch_input();

        let fixed_dt_seconds = self.clock.update_tick().as_secs_f32();
        for _ in 0..plan.updates {
            if !self.should_continue() {
                break;
            }
            let snapshot = self.input.snapshot();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.machine.update(fixed_dt_seconds, &snapshot);
            }));
            if self.record_outcome(Stage::Update, outcome) {
                self.tick_counter = self.tick_counter.saturating_add(1);
                self.metrics.record_tick();
            }
        }
        plan
    }

    pub fn render(&mut self, canvas: &mut dyn Canvas, frame_dt: Duration) {
        let overlay = self.overlay_visible.then(|| OverlayData {
            metrics: self.latest_metrics,
            update_rate_hz: self.update_rate_hz,
            render_rate_hz: self.render_rate_hz,
            mode: self.machine.current_mode(),
            suspended: self.machine.suspended_mode(),
            title: self.machine.debug_title(),
        });
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.machine.render(canvas);
            if let Some(overlay) = &overlay {
                draw_overlay(canvas, overlay);
            }
        }));
        if self.record_outcome(Stage::Render, outcome) {
            self.metrics.record_frame(frame_dt);
        }
    }

    /// Emits `loop_metrics` once per interval.
    pub fn publish_metrics(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let snapshot = self.metrics.maybe_snapshot(now)?;
        info!(
            fps = snapshot.fps,
            tps = snapshot.tps,
            frame_time_ms = snapshot.frame_time_ms,
            faults = snapshot.faults,
            mode = %self.machine.current_mode(),
            "loop_metrics"
        );
        self.latest_metrics = snapshot;
        Some(snapshot)
    }

    pub fn remaining_render_budget(&self) -> Duration {
        self.clock.remaining_render_budget()
    }

    pub fn shutdown(&mut self) {
        self.machine.shutdown();
    }

    fn dispatch_input(&mut self) {
        for event in self.input.drain() {
            if event.key == Key::F3 {
                if event.is_press() {
                    self.overlay_visible = !self.overlay_visible;
                    info!(visible = self.overlay_visible, "metrics_overlay_toggled");
                }
                continue;
            }
            if !self.should_continue() {
                break;
            }
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.machine.handle_input(event);
            }));
            self.record_outcome(Stage::Input, outcome);
        }
    }

    /// A contained panic counts toward the stage's consecutive-fault streak.
    fn record_outcome(&mut self, stage: Stage, outcome: thread::Result<()>) -> bool {
        match outcome {
            Ok(()) => {
                match stage {
                    Stage::Update => self.update_faults = 0,
                    Stage::Render => self.render_faults = 0,
                    Stage::Input => {}
                }
                true
            }
            Err(payload) => {
                self.metrics.record_fault();
                let consecutive = match stage {
                    Stage::Render => &mut self.render_faults,
                    Stage::Update | Stage::Input => &mut self.update_faults,
                };
                *consecutive = consecutive.saturating_add(1);
                let consecutive = *consecutive;
                error!(
                    stage = stage.name(),
                    consecutive,
                    limit = self.max_consecutive_faults,
                    message = panic_message(payload.as_ref()),
                    "tick_fault"
                );
                if consecutive >= self.max_consecutive_faults && !self.fault_limit_reached {
                    warn!(
                        stage = stage.name(),
                        consecutive, "fault_limit_reached"
                    );
                    self.fault_limit_reached = true;
                }
                false
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
