//! Exit door that opens once every room of the level has been visited.

use crate::types::TimerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialDoorState {
    Locked,
    /// Unlocked but still playing its opening delay.
    Unlocking { timer: TimerId },
    Open,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialDoorContact {
    Locked,
    Opening,
    LevelComplete,
}

#[derive(Clone, Debug)]
pub struct SpecialDoor {
    pub(crate) state: SpecialDoorState,
    pub(crate) poll: Option<TimerId>,
}

impl Default for SpecialDoor {
    fn default() -> Self {
        Self { state: SpecialDoorState::Locked, poll: None }
    }
}

impl SpecialDoor {
    pub fn state(&self) -> SpecialDoorState {
        self.state
    }

    pub fn is_unlocked(&self) -> bool {
        self.state != SpecialDoorState::Locked
    }

    pub fn contact(&self) -> SpecialDoorContact {
        match self.state {
            SpecialDoorState::Locked => SpecialDoorContact::Locked,
            SpecialDoorState::Unlocking { .. } => SpecialDoorContact::Opening,
            SpecialDoorState::Open => SpecialDoorContact::LevelComplete,
        }
    }
}
