use strata_engine::{
    Canvas, ExplorationSession, InputSnapshot, KeyEvent, Mode, ModeCommand, ModeHandler,
    ResourceCache, Rgba, ScreenRect, TextureHandle,
};
use tracing::debug;

use super::draw_centered_text;
use super::menu::{Menu, MenuInput};

const BACKGROUND_TEXTURE: &str = "textures/menu_background.png";
const MENU_MUSIC: &str = "audio/menu.wav";
const OPTIONS: &[&str] = &["Start New Game", "Continue Game", "Exit Game"];
const START_NEW_GAME: usize = 0;
const CONTINUE_GAME: usize = 1;
const EXIT_GAME: usize = 2;

const CLEAR_COLOR: Rgba = Rgba([18, 20, 30, 255]);
const TITLE_COLOR: Rgba = Rgba([240, 236, 220, 255]);
const TITLE_TEXT: &str = "STRATA";
const TITLE_SCALE: i32 = 6;

/// Main menu shown at startup.
pub(crate) struct FrontendMode {
    resources: ResourceCache,
    background: Option<TextureHandle>,
    menu: Menu,
}

impl FrontendMode {
    pub(crate) fn new(resources: ResourceCache) -> Self {
        Self {
            resources,
            background: None,
            menu: Menu::new(OPTIONS),
        }
    }
}

impl ModeHandler for FrontendMode {
    fn load(&mut self, _session: &mut ExplorationSession) {
        let handle = self.resources.load_texture(BACKGROUND_TEXTURE);
        self.background = (!handle.is_placeholder()).then_some(handle);
        self.resources.play_audio(MENU_MUSIC, true);
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
        canvas.clear(CLEAR_COLOR);
        if let Some(handle) = self.background {
            canvas.draw_texture(
                self.resources.texture(handle),
                ScreenRect::new(0, 0, width as i32, height as i32),
            );
        }
        let title_y = height as i32 / 5;
        draw_centered_text(canvas, TITLE_TEXT, title_y, TITLE_SCALE, TITLE_COLOR);
        self.menu
            .render(canvas, width as i32 / 2, title_y + TITLE_SCALE * 5 + 48);
    }

    fn handle_input(&mut self, event: KeyEvent, _session: &mut ExplorationSession) -> ModeCommand {
        match self.menu.handle_key(event) {
            MenuInput::Activated(START_NEW_GAME) => ModeCommand::Restart(Mode::Exploration),
            MenuInput::Activated(CONTINUE_GAME) => ModeCommand::SwitchTo(Mode::Exploration),
            MenuInput::Activated(EXIT_GAME) => ModeCommand::Exit,
            MenuInput::Activated(other) => {
                debug!(option = other, "frontend_option_ignored");
                ModeCommand::None
            }
            MenuInput::Moved | MenuInput::Idle => ModeCommand::None,
        }
    }

    fn unload(&mut self, _session: &mut ExplorationSession) {
        self.background = None;
        self.resources.release();
    }
}

#[cfg(test)]
mod tests {
    use strata_engine::{FrameCanvas, Key};

    use super::super::test_support;
    use super::*;

    fn activate(mode: &mut FrontendMode, downs: usize) -> ModeCommand {
        let mut session = test_support::session();
        for _ in 0..downs {
            mode.handle_input(KeyEvent::press(Key::Down), &mut session);
        }
        mode.handle_input(KeyEvent::press(Key::Enter), &mut session)
    }

    #[test]
    fn menu_options_map_to_mode_commands() {
        let mut mode = FrontendMode::new(test_support::cache());
        assert_eq!(activate(&mut mode, 0), ModeCommand::Restart(Mode::Exploration));

        let mut mode = FrontendMode::new(test_support::cache());
        assert_eq!(activate(&mut mode, 1), ModeCommand::SwitchTo(Mode::Exploration));

        let mut mode = FrontendMode::new(test_support::cache());
        assert_eq!(activate(&mut mode, 2), ModeCommand::Exit);
    }

    #[test]
    fn up_from_first_option_wraps_to_exit() {
        let mut mode = FrontendMode::new(test_support::cache());
        let mut session = test_support::session();
        mode.handle_input(KeyEvent::press(Key::W), &mut session);
        assert_eq!(
            mode.handle_input(KeyEvent::press(Key::Space), &mut session),
            ModeCommand::Exit
        );
    }

    #[test]
    fn load_resets_selection_and_tolerates_missing_assets() {
        let mut mode = FrontendMode::new(test_support::cache());
        let mut session = test_support::session();
        mode.handle_input(KeyEvent::press(Key::Down), &mut session);
        mode.load(&mut session);
        assert!(mode.background.is_none());
        assert_eq!(
            mode.handle_input(KeyEvent::press(Key::Enter), &mut session),
            ModeCommand::Restart(Mode::Exploration)
        );
    }

    #[test]
    fn render_draws_over_clear_color() {
        let mut mode = FrontendMode::new(test_support::cache());
        let mut session = test_support::session();
        mode.load(&mut session);
        let mut frame = vec![0u8; 320 * 240 * 4];
        let mut canvas = FrameCanvas::new(&mut frame, 320, 240);
        mode.render(&mut canvas, &session);
        assert_eq!(&frame[0..4], &CLEAR_COLOR.0);
        assert!(frame
            .chunks_exact(4)
            .any(|pixel| pixel == TITLE_COLOR.0.as_slice()));
    }
}
