//! Non-player entities
//!
//! Each entity carries the shared base fields (handle, position, size,
//! velocity, active flag) and a closed `EntityKind` payload. Behaviour is
//! dispatched with exhaustive matches, so adding a variant is a compile
//! error until every match handles it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Rect;
use super::arena::EntityHandle;
use super::enemy::Enemy;
use super::platform::MovingPath;
use super::props::{Checkpoint, Gear, Goal, Trap};
use crate::render::{self, AssetProvider, DrawContext};

/// Closed set of entity type tags (matches the level catalog `type` field)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityType {
    Player,
    Platform,
    MovingPlatform,
    Enemy,
    Collectible,
    Goal,
    Checkpoint,
    Trap,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Player => "player",
            EntityType::Platform => "platform",
            EntityType::MovingPlatform => "movingPlatform",
            EntityType::Enemy => "enemy",
            EntityType::Collectible => "collectible",
            EntityType::Goal => "goal",
            EntityType::Checkpoint => "checkpoint",
            EntityType::Trap => "trap",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "player" => Some(EntityType::Player),
            "platform" => Some(EntityType::Platform),
            "movingPlatform" => Some(EntityType::MovingPlatform),
            "enemy" => Some(EntityType::Enemy),
            "collectible" => Some(EntityType::Collectible),
            "goal" => Some(EntityType::Goal),
            "checkpoint" => Some(EntityType::Checkpoint),
            "trap" => Some(EntityType::Trap),
            _ => None,
        }
    }
}

/// Type-specific entity payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntityKind {
    Platform,
    MovingPlatform(MovingPath),
    Enemy(Enemy),
    Collectible(Gear),
    Goal(Goal),
    Checkpoint(Checkpoint),
    Trap(Trap),
}

/// Read-only view of the world handed to entities during update
#[derive(Debug, Clone, Copy)]
pub struct WorldView {
    /// Seconds of simulated time since the level loaded
    pub elapsed: f32,
    pub dt: f32,
    /// Gears the player currently holds
    pub gears: u32,
    pub required_gears: u32,
}

/// A simulated level object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityHandle,
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub active: bool,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(pos: Vec2, size: Vec2, kind: EntityKind) -> Self {
        Self {
            id: EntityHandle::DETACHED,
            pos,
            size,
            vel: Vec2::ZERO,
            active: true,
            kind,
        }
    }

    pub fn platform(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos, size, EntityKind::Platform)
    }

    /// Moving platform starting at `pos` and travelling to `end`
    pub fn moving_platform(pos: Vec2, size: Vec2, end: Vec2, speed: f32) -> Self {
        Self::new(pos, size, EntityKind::MovingPlatform(MovingPath::new(pos, end, speed)))
    }

    pub fn enemy(size: Vec2, enemy: Enemy) -> Self {
        let mut entity = Self::new(enemy.origin, size, EntityKind::Enemy(enemy));
        entity.update(&WorldView {
            elapsed: 0.0,
            dt: 0.0,
            gears: 0,
            required_gears: 0,
        });
        entity
    }

    pub fn gear(pos: Vec2, size: Vec2, points: u64) -> Self {
        Self::new(
            pos,
            size,
            EntityKind::Collectible(Gear {
                collected: false,
                points,
            }),
        )
    }

    pub fn goal(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos, size, EntityKind::Goal(Goal::default()))
    }

    pub fn checkpoint(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos, size, EntityKind::Checkpoint(Checkpoint::default()))
    }

    pub fn trap(pos: Vec2, size: Vec2, damage: u32) -> Self {
        Self::new(
            pos,
            size,
            EntityKind::Trap(Trap {
                damage,
                ..Trap::default()
            }),
        )
    }

    pub fn entity_type(&self) -> EntityType {
        match self.kind {
            EntityKind::Platform => EntityType::Platform,
            EntityKind::MovingPlatform(_) => EntityType::MovingPlatform,
            EntityKind::Enemy(_) => EntityType::Enemy,
            EntityKind::Collectible(_) => EntityType::Collectible,
            EntityKind::Goal(_) => EntityType::Goal,
            EntityKind::Checkpoint(_) => EntityType::Checkpoint,
            EntityKind::Trap(_) => EntityType::Trap,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    /// Platforms block movement; everything else is a trigger
    pub fn is_solid(&self) -> bool {
        matches!(self.kind, EntityKind::Platform | EntityKind::MovingPlatform(_))
    }

    /// Active and currently able to touch the player
    pub fn is_tangible(&self) -> bool {
        match &self.kind {
            EntityKind::Enemy(enemy) => self.active && enemy.visible,
            _ => self.active,
        }
    }

    /// Advance one tick
    pub fn update(&mut self, view: &WorldView) {
        match &mut self.kind {
            EntityKind::Platform | EntityKind::Checkpoint(_) | EntityKind::Trap(_) => {}
            EntityKind::MovingPlatform(path) => {
                let next = path.position_at(view.elapsed);
                path.delta = next - self.pos;
                self.vel = if view.dt > 0.0 {
                    path.delta / view.dt
                } else {
                    Vec2::ZERO
                };
                self.pos = next;
            }
            EntityKind::Enemy(enemy) => {
                self.pos = enemy.origin + enemy.offset_at(view.elapsed);
                self.vel = enemy.velocity_at(view.elapsed);
                enemy.visible = enemy.visible_at(view.elapsed);
            }
            EntityKind::Collectible(gear) => {
                if gear.collected {
                    self.active = false;
                }
            }
            EntityKind::Goal(goal) => {
                goal.unlocked = view.gears >= view.required_gears;
            }
        }
    }

    fn asset_name(&self) -> &'static str {
        match &self.kind {
            EntityKind::Platform => "platform",
            EntityKind::MovingPlatform(_) => "moving_platform",
            EntityKind::Enemy(enemy) => enemy.kind.asset_name(),
            EntityKind::Collectible(_) => "gear",
            EntityKind::Goal(goal) if goal.unlocked => "goal_open",
            EntityKind::Goal(_) => "goal_locked",
            EntityKind::Checkpoint(cp) if cp.activated => "checkpoint_active",
            EntityKind::Checkpoint(_) => "checkpoint",
            EntityKind::Trap(_) => "trap",
        }
    }

    /// Draw at the camera-shifted position. Intangible entities are skipped.
    pub fn render(&self, ctx: &mut dyn DrawContext, camera_x: f32, assets: &dyn AssetProvider) {
        if !self.is_tangible() {
            return;
        }
        let rect = self.bounds().translated(Vec2::new(-camera_x, 0.0));
        render::draw_sprite(ctx, assets, self.asset_name(), rect);
    }
}
