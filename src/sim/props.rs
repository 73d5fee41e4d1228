//! Level props: gears, the goal door, checkpoints and traps

use serde::{Deserialize, Serialize};

use crate::consts::{GEAR_POINTS, TRAP_DAMPING};

/// Collectible gear
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gear {
    pub collected: bool,
    /// Score awarded on pickup
    pub points: u64,
}

impl Default for Gear {
    fn default() -> Self {
        Self {
            collected: false,
            points: GEAR_POINTS,
        }
    }
}

impl Gear {
    /// Mark collected. Returns false if it already was.
    pub fn collect(&mut self) -> bool {
        if self.collected {
            return false;
        }
        self.collected = true;
        true
    }
}

/// Level exit, opens once enough gears are held
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Goal {
    pub unlocked: bool,
}

/// Respawn anchor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    pub activated: bool,
}

impl Checkpoint {
    /// Returns true only on the first activation
    pub fn activate(&mut self) -> bool {
        let first = !self.activated;
        self.activated = true;
        first
    }
}

/// Static hazard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trap {
    pub damage: u32,
    /// Multiplier applied to the player's horizontal velocity on contact
    pub damping: f32,
}

impl Default for Trap {
    fn default() -> Self {
        Self {
            damage: 1,
            damping: TRAP_DAMPING,
        }
    }
}
