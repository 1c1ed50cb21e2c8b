use strata_engine::{
    Canvas, DialogueRunner, DialogueView, ExplorationSession, InputSnapshot, Key, KeyAction,
    KeyEvent, Mode, ModeCommand, ModeHandler, ResourceCache, Rgba, ScreenRect, StoryScript,
};
use tracing::{debug, info};

const BACKDROP_COLOR: Rgba = Rgba([10, 12, 22, 255]);
const BOX_COLOR: Rgba = Rgba([16, 18, 34, 230]);
const BOX_BORDER: Rgba = Rgba([200, 200, 220, 255]);
const SPEAKER_COLOR: Rgba = Rgba([255, 214, 110, 255]);
const TEXT_COLOR: Rgba = Rgba([236, 236, 240, 255]);
const CHOICE_COLOR: Rgba = Rgba([210, 214, 224, 255]);
const SELECTED_CHOICE_COLOR: Rgba = Rgba([255, 226, 120, 255]);
const UNAVAILABLE_CHOICE_COLOR: Rgba = Rgba([110, 110, 120, 255]);

const TEXT_SCALE: i32 = 2;
const LINE_SPACING: i32 = 14;
const BOX_MARGIN: i32 = 16;
const BOX_PADDING: i32 = 12;
const PORTRAIT_SIZE: i32 = 96;

/// Greedy word wrap to at most `max_chars` per line; overlong words are split.
pub(crate) fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let needed = if current.is_empty() {
            word.len()
        } else {
            current.chars().count() + 1 + word.len()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Story conversation on its own dark backdrop.
pub(crate) struct DialogueMode {
    runner: DialogueRunner,
    resources: ResourceCache,
}

impl DialogueMode {
    pub(crate) fn new(story: StoryScript, resources: ResourceCache) -> Self {
        Self {
            runner: DialogueRunner::new(story),
            resources,
        }
    }

    /// Rewinds a finished story and hands control back to exploration.
    fn finish_if_done(&mut self) -> ModeCommand {
        if !self.runner.is_finished() {
            return ModeCommand::None;
        }
        info!("dialogue_finished");
        self.runner.restart();
        ModeCommand::SwitchTo(Mode::Exploration)
    }
}

impl ModeHandler for DialogueMode {
    fn load(&mut self, _session: &mut ExplorationSession) {
        self.runner.restart();
        debug!(
            arc = self.runner.current_arc_id().unwrap_or("-"),
            scene = self.runner.current_scene_id().unwrap_or("-"),
            "dialogue_started"
        );
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        _input: &InputSnapshot,
        _session: &mut ExplorationSession,
    ) -> ModeCommand {
        self.finish_if_done()
    }

    fn render(&mut self, canvas: &mut dyn Canvas, session: &ExplorationSession) {
        let (width, height) = canvas.size();
        let (width, height) = (width as i32, height as i32);
        canvas.clear(BACKDROP_COLOR);

        let box_height = (height / 3).max(PORTRAIT_SIZE + BOX_PADDING * 2);
        let dialog_box = ScreenRect::new(
            BOX_MARGIN,
            height - box_height - BOX_MARGIN,
            width - BOX_MARGIN * 2,
            box_height,
        );
        canvas.fill_rect(dialog_box, BOX_COLOR);
        canvas.stroke_rect(dialog_box, BOX_BORDER);

        let mut text_x = dialog_box.x + BOX_PADDING;
        let mut y = dialog_box.y + BOX_PADDING;
        let (glyph_width, _) = canvas.measure_text("M", TEXT_SCALE);
        let glyph_advance = glyph_width.max(1) + TEXT_SCALE;

        match self.runner.view(session.inventory()) {
            DialogueView::Line {
                speaker,
                text,
                portrait,
            } => {
                if let Some(portrait) = portrait {
                    let handle = self.resources.load_texture(portrait);
                    canvas.draw_texture(
                        self.resources.texture(handle),
                        ScreenRect::new(text_x, y, PORTRAIT_SIZE, PORTRAIT_SIZE),
                    );
                    text_x += PORTRAIT_SIZE + BOX_PADDING;
                }
                canvas.draw_text(speaker, text_x, y, TEXT_SCALE, SPEAKER_COLOR);
                y += LINE_SPACING + 4;
                let available = dialog_box.x + dialog_box.width - BOX_PADDING - text_x;
                let max_chars = (available / glyph_advance).max(1) as usize;
                for line in wrap_text(text, max_chars) {
                    canvas.draw_text(&line, text_x, y, TEXT_SCALE, TEXT_COLOR);
                    y += LINE_SPACING;
                }
            }
            DialogueView::Choices { options, selected } => {
                for (index, option) in options.iter().enumerate() {
                    let (marker, color) = if !option.available {
                        ("  ", UNAVAILABLE_CHOICE_COLOR)
                    } else if index == selected {
                        ("> ", SELECTED_CHOICE_COLOR)
                    } else {
                        ("  ", CHOICE_COLOR)
                    };
                    let label = format!("{marker}{}", option.text);
                    canvas.draw_text(&label, text_x, y, TEXT_SCALE, color);
                    y += LINE_SPACING;
                }
            }
            DialogueView::Finished => {}
        }
    }

    fn handle_input(&mut self, event: KeyEvent, session: &mut ExplorationSession) -> ModeCommand {
        if event.action == KeyAction::Release {
            return ModeCommand::None;
        }
        let inventory = session.inventory();
        match event.key {
            Key::Up | Key::W => self.runner.select_previous(inventory),
            Key::Down | Key::S => self.runner.select_next(inventory),
            _ if !event.is_press() => {}
            Key::Space | Key::Enter => {
                self.runner.advance(inventory);
                return self.finish_if_done();
            }
            Key::P => return ModeCommand::SwitchTo(Mode::Exploration),
            Key::Escape => return ModeCommand::Pause,
            _ => {}
        }
        ModeCommand::None
    }

    fn unload(&mut self, _session: &mut ExplorationSession) {
        self.resources.release();
    }
}
