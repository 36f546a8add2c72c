#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Sprint,
    Interact,
    Confirm,
    Continue,
    Option1,
    Option2,
    Option3,
    Option4,
    Option5,
    Option6,
    Option7,
    Option8,
    Option9,
    Quit,
}

const ACTION_COUNT: usize = 18;

const OPTION_ACTIONS: [InputAction; 9] = [
    InputAction::Option1,
    InputAction::Option2,
    InputAction::Option3,
    InputAction::Option4,
    InputAction::Option5,
    InputAction::Option6,
    InputAction::Option7,
    InputAction::Option8,
    InputAction::Option9,
];

/// Text typed during a frame, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextInput {
    Char(char),
    Backspace,
}

impl TextInput {
    /// Keeps printable ASCII only.
    pub fn printable(ch: char) -> Option<Self> {
        (' '..='~').contains(&ch).then_some(Self::Char(ch))
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

impl InputAction {
    /// The option actions in key order, `Option1` first.
    pub const OPTIONS: [InputAction; 9] = OPTION_ACTIONS;

    /// Zero-based option index for `Option1..=Option9`.
    pub const fn option_index(self) -> Option<usize> {
        match self {
            InputAction::Option1 => Some(0),
            InputAction::Option2 => Some(1),
            InputAction::Option3 => Some(2),
            InputAction::Option4 => Some(3),
            InputAction::Option5 => Some(4),
            InputAction::Option6 => Some(5),
            InputAction::Option7 => Some(6),
            InputAction::Option8 => Some(7),
            InputAction::Option9 => Some(8),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Sprint => 4,
            InputAction::Interact => 5,
            InputAction::Confirm => 6,
            InputAction::Continue => 7,
            InputAction::Option1 => 8,
            InputAction::Option2 => 9,
            InputAction::Option3 => 10,
            InputAction::Option4 => 11,
            InputAction::Option5 => 12,
            InputAction::Option6 => 13,
            InputAction::Option7 => 14,
            InputAction::Option8 => 15,
            InputAction::Option9 => 16,
            InputAction::Quit => 17,
        }
    }
}
