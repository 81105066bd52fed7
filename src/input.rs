//! Logical input state.  Written by the front-end's input handling, read-only
//! to the simulation.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Fire,
}

/// Which actions are currently held.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyStatus {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub fire: bool,
}

impl KeyStatus {
    pub fn set(&mut self, action: Action, held: bool) {
        match action {
            Action::Left => self.left = held,
            Action::Right => self.right = held,
            Action::Up => self.up = held,
            Action::Down => self.down = held,
            Action::Fire => self.fire = held,
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        match action {
            Action::Left => self.left,
            Action::Right => self.right,
            Action::Up => self.up,
            Action::Down => self.down,
            Action::Fire => self.fire,
        }
    }

    pub fn any_direction(&self) -> bool {
        self.left || self.right || self.up || self.down
    }
}
