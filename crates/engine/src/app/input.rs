/// Keys the modes react to; everything else is dropped at the window boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Space,
    Enter,
    Escape,
    A,
    C,
    D,
    P,
    S,
    V,
    W,
    F3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Press,
    Release,
    Repeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub action: KeyAction,
}

impl KeyEvent {
    pub const fn new(key: Key, action: KeyAction) -> Self {
        Self { key, action }
    }

    pub const fn press(key: Key) -> Self {
        Self::new(key, KeyAction::Press)
    }

    pub fn is_press(&self) -> bool {
        self.action == KeyAction::Press
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Jump,
}

const ACTION_COUNT: usize = 5;

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Jump => 4,
        }
    }

    /// Held-key bindings; both arrows and WASD move.
    pub const fn for_key(key: Key) -> Option<Self> {
        match key {
            Key::Up | Key::W => Some(InputAction::MoveUp),
            Key::Down | Key::S => Some(InputAction::MoveDown),
            Key::Left | Key::A => Some(InputAction::MoveLeft),
            Key::Right | Key::D => Some(InputAction::MoveRight),
            Key::Space => Some(InputAction::Jump),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

/// Held-action state sampled once per logic tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn new(actions: ActionStates) -> Self {
        Self { actions }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }
}

/// Buffers key events between iterations and tracks held actions.
#[derive(Debug, Default)]
pub(crate) struct InputQueue {
    pending: Vec<KeyEvent>,
    held: ActionStates,
}

impl InputQueue {
    pub(crate) fn push(&mut self, event: KeyEvent) {
        if let Some(action) = InputAction::for_key(event.key) {
            match event.action {
                KeyAction::Press | KeyAction::Repeat => self.held.set(action, true),
                KeyAction::Release => self.held.set(action, false),
            }
        }
        self.pending.push(event);
    }

    /// Leaves the queue empty so dispatch never observes events arriving mid-drain.
    pub(crate) fn drain(&mut self) -> Vec<KeyEvent> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn snapshot(&self) -> InputSnapshot {
        InputSnapshot::new(self.held)
    }

    /// Focus loss: nothing stays held.
    pub(crate) fn release_all(&mut self) {
        self.held = ActionStates::default();
    }
}
