//! Tilliman - tick-based platformer engine for the arcade cabinet
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, physics, collisions, levels, game state)
//! - `engine`: Embedding facade (frame scheduling, lifecycle, rendering dispatch)
//! - `input`: Edge-aware input sources
//! - `render`: Drawing context contract and procedural asset fallback
//! - `platform`: Browser input/canvas adapters (wasm only)
//! - `progress`: Level unlocks and run history
//! - `settings`: Player preferences

pub mod engine;
pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod platform;
pub mod progress;
pub mod render;
pub mod settings;
pub mod sim;

pub use engine::Engine;
pub use progress::{Progress, ProgressStore};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta accepted by the scheduler (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Longest single tick; larger deltas are clamped to avoid tunneling
    pub const MAX_TICK_DT: f32 = 1.0 / 30.0;

    /// Default viewport
    pub const VIEWPORT_WIDTH: f32 = 800.0;
    pub const VIEWPORT_HEIGHT: f32 = 600.0;

    /// Player dimensions
    pub const PLAYER_WIDTH: f32 = 32.0;
    pub const PLAYER_HEIGHT: f32 = 48.0;
    pub const STARTING_LIVES: u32 = 3;

    /// Horizontal movement (pixels/s)
    pub const MOVE_SPEED: f32 = 260.0;
    /// Fraction of the gap to target speed closed per second
    pub const GROUND_ACCEL: f32 = 12.0;
    /// Velocity kept per 1/60 s with no direction held
    pub const FRICTION: f32 = 0.8;

    /// Vertical movement (pixels/s, y grows downward)
    pub const GRAVITY: f32 = 1800.0;
    pub const TERMINAL_FALL_SPEED: f32 = 900.0;
    pub const JUMP_VELOCITY: f32 = -620.0;
    /// Upward speed kept when jump is released early
    pub const SHORT_HOP_VELOCITY: f32 = -240.0;
    /// Vertical speed separating idle from jump/fall
    pub const JUMP_STATE_THRESHOLD: f32 = 10.0;

    /// Dash
    pub const DASH_SPEED: f32 = 640.0;
    pub const DASH_DURATION: f32 = 0.18;
    pub const DASH_COOLDOWN: f32 = 0.6;

    /// Damage response
    pub const HIT_INVULNERABILITY: f32 = 1.0;
    pub const RESPAWN_INVULNERABILITY: f32 = 2.0;
    pub const KNOCKBACK_VELOCITY: f32 = -300.0;
    pub const STOMP_BOUNCE_VELOCITY: f32 = -420.0;
    pub const TRAP_DAMPING: f32 = 0.5;

    /// Grounding sensor below the player's feet
    pub const FEET_HEIGHT: f32 = 6.0;
    pub const FEET_INSET: f32 = 4.0;
    /// How far below a platform top the feet may have been last tick and still land
    pub const LANDING_TOLERANCE: f32 = 12.0;

    /// Scoring
    pub const STOMP_BONUS: u64 = 50;
    pub const GEAR_POINTS: u64 = 100;
    pub const LEVEL_COMPLETE_BONUS: u64 = 500;
    pub const DEFAULT_REQUIRED_GEARS: u32 = 3;

    /// Simulated seconds between touching an unlocked goal and loading the next level
    pub const LEVEL_TRANSITION_DELAY: f32 = 2.0;
}
