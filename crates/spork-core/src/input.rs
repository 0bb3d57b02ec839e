use serde::{Deserialize, Serialize};

/// Per-tick input intent shared by manual and AI-driven entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputIntent {
    pub move_left: bool,
    pub move_right: bool,
    pub jump: bool,
}

impl InputIntent {
    pub const IDLE: InputIntent = InputIntent {
        move_left: false,
        move_right: false,
        jump: false,
    };

    /// Horizontal direction as -1, 0 or +1. Left wins when both are held.
    pub fn horizontal(&self) -> i8 {
        if self.move_left {
            -1
        } else if self.move_right {
            1
        } else {
            0
        }
    }
}

/// Raw key flags sampled by the host once per tick for the human entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub jump: bool,
}

impl KeyState {
    /// Build a key state from a set of pressed key names.
    ///
    /// Recognised aliases: `ArrowLeft`/`a`, `ArrowRight`/`d`, `ArrowUp`/`w`,
    /// and `" "`/`Space` for jump. Anything else is ignored.
    pub fn from_keys<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut state = KeyState::default();
        for key in keys {
            match key {
                "ArrowLeft" | "a" | "A" => state.left = true,
                "ArrowRight" | "d" | "D" => state.right = true,
                "ArrowUp" | "w" | "W" => state.up = true,
                " " | "Space" => state.jump = true,
                _ => {},
            }
        }
        state
    }

    pub fn intent(&self) -> InputIntent {
        InputIntent {
            move_left: self.left,
            move_right: self.right,
            jump: self.up || self.jump,
        }
    }
}
