//! Input sources
//!
//! Sources report which controls are held. `InputTracker` turns successive
//! held snapshots into a `TickInput` with press edges, so a key held across
//! many ticks jumps, dashes or pauses only once.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::settings::Action;
use crate::sim::TickInput;

/// Held state of every control
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub dash: bool,
    pub pause: bool,
}

impl InputState {
    /// Record a key going down (`true`) or up (`false`)
    pub fn set(&mut self, action: Action, down: bool) {
        match action {
            Action::Left => self.left = down,
            Action::Right => self.right = down,
            Action::Jump => self.jump = down,
            Action::Dash => self.dash = down,
            Action::Pause => self.pause = down,
        }
    }
}

/// Anything that can be polled for held controls once per tick
pub trait InputSource {
    fn poll(&mut self) -> InputState;
    /// Stop listening. Later polls report nothing held.
    fn detach(&mut self);
}

/// Derives press edges from held snapshots
#[derive(Debug, Clone, Copy, Default)]
pub struct InputTracker {
    prev: InputState,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, held: InputState) -> TickInput {
        let prev = std::mem::replace(&mut self.prev, held);
        TickInput {
            left: held.left,
            right: held.right,
            jump_held: held.jump,
            jump_pressed: held.jump && !prev.jump,
            dash_pressed: held.dash && !prev.dash,
            pause_pressed: held.pause && !prev.pause,
        }
    }

    /// Forget previous state (a key still held afterwards counts as a new press)
    pub fn reset(&mut self) {
        self.prev = InputState::default();
    }
}

/// Replays a fixed sequence of snapshots, then reports nothing held
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<InputState>,
    detached: bool,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = InputState>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            detached: false,
        }
    }

    /// Append `state` for `ticks` polls
    pub fn hold(mut self, state: InputState, ticks: usize) -> Self {
        self.frames.extend(std::iter::repeat_n(state, ticks));
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> InputState {
        if self.detached {
            return InputState::default();
        }
        self.frames.pop_front().unwrap_or_default()
    }

    fn detach(&mut self) {
        self.detached = true;
        self.frames.clear();
    }
}
