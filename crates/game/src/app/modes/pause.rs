use strata_engine::{
    Canvas, ExplorationSession, InputSnapshot, Key, KeyEvent, Mode, ModeCommand, ModeHandler,
    Rgba, ScreenRect,
};

use super::draw_centered_text;
use super::menu::{Menu, MenuInput};

const OPTIONS: &[&str] = &["Resume Game", "Back to Main Menu", "Exit Game"];
const RESUME_GAME: usize = 0;
const MAIN_MENU: usize = 1;
const EXIT_GAME: usize = 2;

const SHADE_COLOR: Rgba = Rgba([0, 0, 0, 150]);
const HEADING_COLOR: Rgba = Rgba([240, 236, 220, 255]);
const HEADING_SCALE: i32 = 5;

/// Translucent menu drawn over the suspended mode.
pub(crate) struct PauseMode {
    menu: Menu,
}

impl PauseMode {
    pub(crate) fn new() -> Self {
        Self {
            menu: Menu::new(OPTIONS),
        }
    }
}

impl ModeHandler for PauseMode {
    fn load(&mut self, _session: &mut ExplorationSession) {
        self.menu.reset();
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        _input: &InputSnapshot,
        _session: &mut ExplorationSession,
    ) -> ModeCommand {
        ModeCommand::None
    }

    fn render(&mut self, canvas: &mut dyn Canvas, _session: &ExplorationSession) {
        let (width, height) = canvas.size();
        canvas.fill_rect(
            ScreenRect::new(0, 0, width as i32, height as i32),
            SHADE_COLOR,
        );
        let heading_y = height as i32 / 4;
        draw_centered_text(canvas, "PAUSED", heading_y, HEADING_SCALE, HEADING_COLOR);
        self.menu
            .render(canvas, width as i32 / 2, heading_y + HEADING_SCALE * 5 + 40);
    }

    fn handle_input(&mut self, event: KeyEvent, _session: &mut ExplorationSession) -> ModeCommand {
        let command = if event.is_press() && matches!(event.key, Key::Escape | Key::P) {
            ModeCommand::Resume
        } else {
            match self.menu.handle_key(event) {
                MenuInput::Activated(RESUME_GAME) => ModeCommand::Resume,
                MenuInput::Activated(MAIN_MENU) => ModeCommand::SwitchTo(Mode::Frontend),
                MenuInput::Activated(EXIT_GAME) => ModeCommand::Exit,
                _ => ModeCommand::None,
            }
        };
        // Loaded once across pauses; each pause starts on the first option.
        if command != ModeCommand::None {
            self.menu.reset();
        }
        command
    }

    fn unload(&mut self, _session: &mut ExplorationSession) {
        self.menu.reset();
    }
}

#[cfg(test)]
mod tests {
    use strata_engine::{FrameCanvas, KeyAction};

    use super::super::test_support;
    use super::*;

    #[test]
    fn escape_and_p_resume() {
        let mut mode = PauseMode::new();
        let mut session = test_support::session();
        assert_eq!(
            mode.handle_input(KeyEvent::press(Key::Escape), &mut session),
            ModeCommand::Resume
        );
        assert_eq!(
            mode.handle_input(KeyEvent::press(Key::P), &mut session),
            ModeCommand::Resume
        );
        assert_eq!(
            mode.handle_input(KeyEvent::new(Key::P, KeyAction::Release), &mut session),
            ModeCommand::None
        );
    }

    #[test]
    fn menu_options_map_to_mode_commands() {
        let mut mode = PauseMode::new();
        let mut session = test_support::session();
        assert_eq!(
            mode.handle_input(KeyEvent::press(Key::Enter), &mut session),
            ModeCommand::Resume
        );
        mode.handle_input(KeyEvent::press(Key::Down), &mut session);
        assert_eq!(
            mode.handle_input(KeyEvent::press(Key::Enter), &mut session),
            ModeCommand::SwitchTo(Mode::Frontend)
        );
        mode.handle_input(KeyEvent::press(Key::Up), &mut session);
        assert_eq!(
            mode.handle_input(KeyEvent::press(Key::Enter), &mut session),
            ModeCommand::Exit
        );
    }

    #[test]
    fn each_pause_opens_on_resume_game() {
        let mut mode = PauseMode::new();
        let mut session = test_support::session();
        mode.load(&mut session);
        mode.handle_input(KeyEvent::press(Key::Down), &mut session);
        mode.handle_input(KeyEvent::press(Key::Down), &mut session);
        assert_eq!(
            mode.handle_input(KeyEvent::press(Key::Escape), &mut session),
            ModeCommand::Resume
        );

        // Second pause without a reload.
        assert_eq!(
            mode.handle_input(KeyEvent::press(Key::Enter), &mut session),
            ModeCommand::Resume
        );

        mode.handle_input(KeyEvent::press(Key::Down), &mut session);
        assert_eq!(
            mode.handle_input(KeyEvent::press(Key::Enter), &mut session),
            ModeCommand::SwitchTo(Mode::Frontend)
        );
        assert_eq!(
            mode.handle_input(KeyEvent::press(Key::Enter), &mut session),
            ModeCommand::Resume
        );
    }

    #[test]
    fn render_dims_the_frame_underneath() {
        let mut mode = PauseMode::new();
        let session = test_support::session();
        let mut frame = vec![200u8; 64 * 48 * 4];
        let mut canvas = FrameCanvas::new(&mut frame, 64, 48);
        mode.render(&mut canvas, &session);
        let corner = &frame[0..4];
        assert!(corner[0] < 200);
        assert_eq!(corner[3], 255);
    }
}
