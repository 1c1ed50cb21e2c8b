use strata_engine::{Canvas, Key, KeyAction, KeyEvent, Rgba, ScreenRect};

const ITEM_SCALE: i32 = 3;
const ITEM_SPACING: i32 = 36;
const HIGHLIGHT_PAD: i32 = 8;
const TEXT_COLOR: Rgba = Rgba([210, 214, 224, 255]);
const SELECTED_TEXT_COLOR: Rgba = Rgba([255, 226, 120, 255]);
const HIGHLIGHT_COLOR: Rgba = Rgba([60, 66, 90, 200]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MenuInput {
    Idle,
    Moved,
    Activated(usize),
}

/// Vertical list of options with a wrapping selection.
#[derive(Debug, Clone)]
pub(crate) struct Menu {
    options: &'static [&'static str],
    selected: usize,
}

impl Menu {
    pub(crate) fn new(options: &'static [&'static str]) -> Self {
        Self {
            options,
            selected: 0,
        }
    }

    pub(crate) fn selected(&self) -> usize {
        self.selected
    }

    pub(crate) fn reset(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_next(&mut self) {
        if !self.options.is_empty() {
            self.selected = (self.selected + 1) % self.options.len();
        }
    }

    pub(crate) fn select_previous(&mut self) {
        if !self.options.is_empty() {
            self.selected = (self.selected + self.options.len() - 1) % self.options.len();
        }
    }

    /// Navigation follows key repeat; activation needs a fresh press.
    pub(crate) fn handle_key(&mut self, event: KeyEvent) -> MenuInput {
        if event.action == KeyAction::Release {
            return MenuInput::Idle;
        }
        match event.key {
            Key::Up | Key::W => {
                self.select_previous();
                MenuInput::Moved
            }
            Key::Down | Key::S => {
                self.select_next();
                MenuInput::Moved
            }
            Key::Enter | Key::Space if event.is_press() && !self.options.is_empty() => {
                MenuInput::Activated(self.selected())
            }
            _ => MenuInput::Idle,
        }
    }

    /// Options centred on `center_x`, first one at `top`.
    pub(crate) fn render(&self, canvas: &mut dyn Canvas, center_x: i32, top: i32) {
        for (index, option) in self.options.iter().enumerate() {
            let (width, height) = canvas.measure_text(option, ITEM_SCALE);
            let x = center_x - width / 2;
            let y = top + index as i32 * ITEM_SPACING;
            let color = if index == self.selected {
                canvas.fill_rect(
                    ScreenRect::new(
                        x - HIGHLIGHT_PAD,
                        y - HIGHLIGHT_PAD / 2,
                        width + HIGHLIGHT_PAD * 2,
                        height + HIGHLIGHT_PAD,
                    ),
                    HIGHLIGHT_COLOR,
                );
                SELECTED_TEXT_COLOR
            } else {
                TEXT_COLOR
            };
            canvas.draw_text(option, x, y, ITEM_SCALE, color);
        }
    }
}
