use std::fmt;

use tracing::info;

use super::input::{InputSnapshot, KeyEvent};
use super::rendering::Canvas;
use crate::world::ExplorationSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Frontend,
    Exploration,
    Dialogue,
    Paused,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Frontend, Mode::Exploration, Mode::Dialogue, Mode::Paused];

    pub fn name(self) -> &'static str {
        match self {
            Mode::Frontend => "frontend",
            Mode::Exploration => "exploration",
            Mode::Dialogue => "dialogue",
            Mode::Paused => "paused",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a handler asks the machine to do once it has returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeCommand {
    None,
    SwitchTo(Mode),
    /// Unload and reload the target before switching to it.
    Restart(Mode),
    Pause,
    Resume,
    Exit,
}

/// Current mode plus the mode a pause returns to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeController {
    current: Mode,
    suspended: Mode,
}

impl Default for ModeController {
    fn default() -> Self {
        Self {
            current: Mode::Frontend,
            suspended: Mode::Frontend,
        }
    }
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Mode {
        self.current
    }

    pub fn suspended(&self) -> Mode {
        self.suspended
    }

    /// Leaving `Paused` keeps `suspended` untouched.
    pub fn switch_to(&mut self, mode: Mode) {
        if self.current != Mode::Paused {
            self.suspended = self.current;
        }
        self.current = mode;
    }

    /// No-op while already paused or in the front end.
    pub fn request_pause(&mut self) -> bool {
        if matches!(self.current, Mode::Paused | Mode::Frontend) {
            return false;
        }
        self.suspended = self.current;
        self.current = Mode::Paused;
        true
    }

    pub fn resume(&mut self) {
        self.current = self.suspended;
    }
}

pub trait ModeHandler {
    fn load(&mut self, session: &mut ExplorationSession);
    fn update(
        &mut self,
        fixed_dt_seconds: f32,
        input: &InputSnapshot,
        session: &mut ExplorationSession,
    ) -> ModeCommand;
    fn render(&mut self, canvas: &mut dyn Canvas, session: &ExplorationSession);
    fn handle_input(&mut self, event: KeyEvent, session: &mut ExplorationSession) -> ModeCommand;
    fn unload(&mut self, session: &mut ExplorationSession);
    fn debug_title(&self, _session: &ExplorationSession) -> Option<String> {
        None
    }
}

/// One handler per mode, handed over by the composition root.
pub struct ModeHandlers {
    pub frontend: Box<dyn ModeHandler>,
    pub exploration: Box<dyn ModeHandler>,
    pub dialogue: Box<dyn ModeHandler>,
    pub paused: Box<dyn ModeHandler>,
}

struct ModeRuntime {
    handler: Box<dyn ModeHandler>,
    is_loaded: bool,
}

impl ModeRuntime {
    fn new(handler: Box<dyn ModeHandler>) -> Self {
        Self {
            handler,
            is_loaded: false,
        }
    }
}

/// Owns the controller, the four handlers and the exploration session they share.
pub struct ModeMachine {
    controller: ModeController,
    frontend: ModeRuntime,
    exploration: ModeRuntime,
    dialogue: ModeRuntime,
    paused: ModeRuntime,
    session: ExplorationSession,
    exit_requested: bool,
}

impl ModeMachine {
    pub fn new(handlers: ModeHandlers, session: ExplorationSession) -> Self {
        Self {
            controller: ModeController::new(),
            frontend: ModeRuntime::new(handlers.frontend),
            exploration: ModeRuntime::new(handlers.exploration),
            dialogue: ModeRuntime::new(handlers.dialogue),
            paused: ModeRuntime::new(handlers.paused),
            session,
            exit_requested: false,
        }
    }

    pub fn current_mode(&self) -> Mode {
        self.controller.current()
    }

    pub fn suspended_mode(&self) -> Mode {
        self.controller.suspended()
    }

    pub fn controller(&self) -> &ModeController {
        &self.controller
    }

    pub fn session(&self) -> &ExplorationSession {
        &self.session
    }

    pub fn is_loaded(&self, mode: Mode) -> bool {
        self.runtime_ref(mode).is_loaded
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub fn start(&mut self) {
        self.load_if_needed(self.controller.current());
    }

    pub fn update(&mut self, fixed_dt_seconds: f32, input: &InputSnapshot) -> ModeCommand {
        let current = self.controller.current();
        self.load_if_needed(current);
        let (runtime, session) = self.runtime_and_session(current);
        let command = runtime.handler.update(fixed_dt_seconds, input, session);
        self.apply(command);
        command
    }

    pub fn handle_input(&mut self, event: KeyEvent) -> ModeCommand {
        let current = self.controller.current();
        self.load_if_needed(current);
        let (runtime, session) = self.runtime_and_session(current);
        let command = runtime.handler.handle_input(event, session);
        self.apply(command);
        command
    }

    /// The pause overlay draws over the frame of the mode it interrupted.
    pub fn render(&mut self, canvas: &mut dyn Canvas) {
        let current = self.controller.current();
        if current == Mode::Paused {
            self.render_mode(self.controller.suspended(), canvas);
        }
        self.render_mode(current, canvas);
    }

    pub fn debug_title(&self) -> Option<String> {
        self.runtime_ref(self.controller.current())
            .handler
            .debug_title(&self.session)
    }

    /// Returns whether the current mode changed.
    pub fn apply(&mut self, command: ModeCommand) -> bool {
        let before = self.controller.current();
        match command {
            ModeCommand::None => return false,
            ModeCommand::SwitchTo(mode) => {
                self.load_if_needed(mode);
                self.controller.switch_to(mode);
            }
            ModeCommand::Restart(mode) => {
                self.unload(mode);
                self.load_if_needed(mode);
                self.controller.switch_to(mode);
            }
            ModeCommand::Pause => {
                if !self.controller.request_pause() {
                    return false;
                }
                self.load_if_needed(Mode::Paused);
            }
            ModeCommand::Resume => {
                self.controller.resume();
                self.load_if_needed(self.controller.current());
            }
            ModeCommand::Exit => {
                info!(mode = %before, "exit_requested");
                self.exit_requested = true;
                return false;
            }
        }
        let after = self.controller.current();
        if before != after {
            info!(
                from = %before,
                to = %after,
                suspended = %self.controller.suspended(),
                "mode_switched"
            );
        }
        before != after
    }

    pub fn shutdown(&mut self) {
        for mode in Mode::ALL {
            self.unload(mode);
        }
    }

    fn render_mode(&mut self, mode: Mode, canvas: &mut dyn Canvas) {
        let runtime = match mode {
            Mode::Frontend => &mut self.frontend,
            Mode::Exploration => &mut self.exploration,
            Mode::Dialogue => &mut self.dialogue,
            Mode::Paused => &mut self.paused,
        };
        if runtime.is_loaded {
            runtime.handler.render(canvas, &self.session);
        }
    }

    fn load_if_needed(&mut self, mode: Mode) {
        let (runtime, session) = self.runtime_and_session(mode);
        if runtime.is_loaded {
            return;
        }
        runtime.handler.load(session);
        runtime.is_loaded = true;
        info!(mode = %mode, "mode_loaded");
    }

    fn unload(&mut self, mode: Mode) {
        let (runtime, session) = self.runtime_and_session(mode);
        if !runtime.is_loaded {
            return;
        }
        runtime.handler.unload(session);
        runtime.is_loaded = false;
        info!(mode = %mode, "mode_unloaded");
    }

    fn runtime_and_session(&mut self, mode: Mode) -> (&mut ModeRuntime, &mut ExplorationSession) {
        let runtime = match mode {
            Mode::Frontend => &mut self.frontend,
            Mode::Exploration => &mut self.exploration,
            Mode::Dialogue => &mut self.dialogue,
            Mode::Paused => &mut self.paused,
        };
        (runtime, &mut self.session)
    }

    fn runtime_ref(&self, mode: Mode) -> &ModeRuntime {
        match mode {
            Mode::Frontend => &self.frontend,
            Mode::Exploration => &self.exploration,
            Mode::Dialogue => &self.dialogue,
            Mode::Paused => &self.paused,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::app::input::Key;
    use crate::app::rendering::{Rgba, ScreenRect};
    use crate::app::resources::Texture;
    use crate::content::MemoryMapSource;
    use crate::world::{LevelRegistry, PhysicsConfig};

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records lifecycle calls and returns a fixed command for a chosen key.
    struct ScriptedHandler {
        name: &'static str,
        log: Log,
        on_enter: ModeCommand,
    }

    impl ScriptedHandler {
        fn boxed(name: &'static str, log: &Log, on_enter: ModeCommand) -> Box<dyn ModeHandler> {
            Box::new(Self {
                name,
                log: Rc::clone(log),
                on_enter,
            })
        }

        fn record(&self, call: &str) {
            self.log.borrow_mut().push(format!("{}:{call}", self.name));
        }
    }

    impl ModeHandler for ScriptedHandler {
        fn load(&mut self, _session: &mut ExplorationSession) {
            self.record("load");
        }

        fn update(
            &mut self,
            _fixed_dt_seconds: f32,
            _input: &InputSnapshot,
            _session: &mut ExplorationSession,
        ) -> ModeCommand {
            self.record("update");
            ModeCommand::None
        }

        fn render(&mut self, _canvas: &mut dyn Canvas, _session: &ExplorationSession) {
            self.record("render");
        }

        fn handle_input(
            &mut self,
            event: KeyEvent,
            _session: &mut ExplorationSession,
        ) -> ModeCommand {
            if event.key == Key::Enter && event.is_press() {
                self.on_enter
            } else {
                ModeCommand::None
            }
        }

        fn unload(&mut self, _session: &mut ExplorationSession) {
            self.record("unload");
        }
    }

    struct NullCanvas;

    impl Canvas for NullCanvas {
        fn size(&self) -> (u32, u32) {
            (0, 0)
        }
        fn clear(&mut self, _color: Rgba) {}
        fn fill_rect(&mut self, _rect: ScreenRect, _color: Rgba) {}
        fn stroke_rect(&mut self, _rect: ScreenRect, _color: Rgba) {}
        fn draw_texture(&mut self, _texture: &Texture, _dest: ScreenRect) {}
        fn draw_text(&mut self, _text: &str, _x: i32, _y: i32, _scale: i32, _color: Rgba) {}
    }

    fn empty_session() -> ExplorationSession {
        ExplorationSession::new(
            LevelRegistry::new(Vec::new()),
            Box::new(MemoryMapSource::new()),
            PhysicsConfig::default(),
        )
    }

    fn machine(log: &Log) -> ModeMachine {
        let handlers = ModeHandlers {
            frontend: ScriptedHandler::boxed(
                "frontend",
                log,
                ModeCommand::Restart(Mode::Exploration),
            ),
            exploration: ScriptedHandler::boxed("exploration", log, ModeCommand::Pause),
            dialogue: ScriptedHandler::boxed("dialogue", log, ModeCommand::None),
            paused: ScriptedHandler::boxed("paused", log, ModeCommand::Resume),
        };
        ModeMachine::new(handlers, empty_session())
    }

    fn take(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    #[test]
    fn controller_starts_in_frontend() {
        let controller = ModeController::new();
        assert_eq!(controller.current(), Mode::Frontend);
        assert_eq!(controller.suspended(), Mode::Frontend);
    }

    #[test]
    fn pausing_twice_keeps_first_suspended_mode() {
        let mut controller = ModeController::new();
        controller.switch_to(Mode::Exploration);

        assert!(controller.request_pause());
        assert!(!controller.request_pause());
        assert_eq!(controller.current(), Mode::Paused);
        assert_eq!(controller.suspended(), Mode::Exploration);
    }

    #[test]
    fn switch_while_paused_leaves_suspended() {
        let mut controller = ModeController::new();
        controller.switch_to(Mode::Dialogue);
        controller.request_pause();

        controller.switch_to(Mode::Frontend);
        assert_eq!(controller.current(), Mode::Frontend);
        assert_eq!(controller.suspended(), Mode::Dialogue);
    }

    #[test]
    fn pause_is_refused_in_frontend() {
        let mut controller = ModeController::new();
        assert!(!controller.request_pause());
        assert_eq!(controller.current(), Mode::Frontend);
    }

    #[test]
    fn resume_returns_to_suspended_mode() {
        let mut controller = ModeController::new();
        controller.switch_to(Mode::Exploration);
        controller.request_pause();
        controller.resume();
        assert_eq!(controller.current(), Mode::Exploration);
    }

    #[test]
    fn switch_records_previous_mode() {
        let mut controller = ModeController::new();
        controller.switch_to(Mode::Exploration);
        controller.switch_to(Mode::Dialogue);
        assert_eq!(controller.suspended(), Mode::Exploration);
    }

    #[test]
    fn handlers_load_lazily_on_first_activation() {
        let log = Log::default();
        let mut machine = machine(&log);
        machine.start();
        assert_eq!(take(&log), vec!["frontend:load"]);
        assert!(!machine.is_loaded(Mode::Exploration));

        machine.handle_input(KeyEvent::press(Key::Enter));
        assert_eq!(machine.current_mode(), Mode::Exploration);
        assert_eq!(take(&log), vec!["exploration:load"]);

        machine.update(1.0 / 60.0, &InputSnapshot::empty());
        assert_eq!(take(&log), vec!["exploration:update"]);
    }

    #[test]
    fn restart_unloads_and_reloads_target() {
        let log = Log::default();
        let mut machine = machine(&log);
        machine.start();
        machine.apply(ModeCommand::SwitchTo(Mode::Exploration));
        machine.apply(ModeCommand::SwitchTo(Mode::Frontend));
        take(&log);

        machine.apply(ModeCommand::Restart(Mode::Exploration));
        assert_eq!(take(&log), vec!["exploration:unload", "exploration:load"]);
        assert_eq!(machine.current_mode(), Mode::Exploration);
    }

    #[test]
    fn pause_command_then_resume_restores_mode() {
        let log = Log::default();
        let mut machine = machine(&log);
        machine.start();
        machine.apply(ModeCommand::SwitchTo(Mode::Exploration));

        machine.handle_input(KeyEvent::press(Key::Enter));
        assert_eq!(machine.current_mode(), Mode::Paused);
        assert_eq!(machine.suspended_mode(), Mode::Exploration);

        machine.handle_input(KeyEvent::press(Key::Enter));
        assert_eq!(machine.current_mode(), Mode::Exploration);
    }

    #[test]
    fn pause_command_in_frontend_is_ignored() {
        let log = Log::default();
        let mut machine = machine(&log);
        machine.start();
        assert!(!machine.apply(ModeCommand::Pause));
        assert_eq!(machine.current_mode(), Mode::Frontend);
        assert!(!machine.is_loaded(Mode::Paused));
    }

    #[test]
    fn paused_render_draws_suspended_mode_first() {
        let log = Log::default();
        let mut machine = machine(&log);
        machine.start();
        machine.apply(ModeCommand::SwitchTo(Mode::Exploration));
        machine.apply(ModeCommand::Pause);
        take(&log);

        machine.render(&mut NullCanvas);
        assert_eq!(take(&log), vec!["exploration:render", "paused:render"]);
    }

    #[test]
    fn exit_sets_flag_without_switching() {
        let log = Log::default();
        let mut machine = machine(&log);
        machine.start();
        assert!(!machine.apply(ModeCommand::Exit));
        assert!(machine.exit_requested());
        assert_eq!(machine.current_mode(), Mode::Frontend);
    }

    #[test]
    fn shutdown_unloads_every_loaded_handler() {
        let log = Log::default();
        let mut machine = machine(&log);
        machine.start();
        machine.apply(ModeCommand::SwitchTo(Mode::Exploration));
        take(&log);

        machine.shutdown();
        assert_eq!(take(&log), vec!["frontend:unload", "exploration:unload"]);
        assert!(!machine.is_loaded(Mode::Frontend));
    }
}
