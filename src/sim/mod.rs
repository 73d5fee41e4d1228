//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Entity motion is a function of elapsed level time
//! - Stable iteration order (arena slot order)
//! - No platform dependencies; drawing goes through `render` traits

pub mod aabb;
pub mod arena;
pub mod collision;
pub mod enemy;
pub mod entity;
pub mod level;
pub mod platform;
pub mod player;
pub mod props;
pub mod state;
pub mod tick;

pub use aabb::Rect;
pub use arena::{EntityArena, EntityHandle};
pub use collision::{Contact, resolve_collisions};
pub use enemy::{Enemy, EnemyKind, MovementPattern, PatternShape};
pub use entity::{Entity, EntityKind, EntityType, WorldView};
pub use level::{EntityDescriptor, LevelCatalog, LevelData, LevelError, LevelManager, Progression};
pub use platform::MovingPath;
pub use player::{Player, PlayerState};
pub use props::{Checkpoint, Gear, Goal, Trap};
pub use state::{GameEvent, GamePhase, GameState, World};
pub use tick::{TickInput, tick};
