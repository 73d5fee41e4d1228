//! Level catalog and level manager
//!
//! Levels are declarative JSON: world size, spawn point, gear threshold and
//! a list of entity descriptors. The manager turns a descriptor list into a
//! fresh `World` and tracks which catalog entry is loaded.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::enemy::{Enemy, EnemyKind, MovementPattern, PatternShape};
use super::entity::{Entity, EntityType};
use super::state::World;
use crate::consts::{DEFAULT_REQUIRED_GEARS, GEAR_POINTS};
use crate::progress::ProgressStore;

/// Built-in level catalog
const BUILTIN_LEVELS: &str = include_str!("../../assets/levels.json");

/// Level loading failures
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level index {index} is out of range (catalog has {len} levels)")]
    OutOfRange { index: usize, len: usize },
    #[error("failed to parse level catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A 2D point in level data
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

fn default_required_gears() -> u32 {
    DEFAULT_REQUIRED_GEARS
}

/// Declarative entity entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Entity type tag; kept as a string so unknown types can be skipped
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Type-specific parameters
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl EntityDescriptor {
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn prop_f32(&self, key: &str, default: f32) -> f32 {
        self.properties
            .get(key)
            .and_then(Value::as_f64)
            .map(|v| v as f32)
            .unwrap_or(default)
    }

    pub fn prop_u32(&self, key: &str, default: u32) -> u32 {
        self.properties
            .get(key)
            .and_then(Value::as_u64)
            .map(|v| v.min(u32::MAX as u64) as u32)
            .unwrap_or(default)
    }

    pub fn prop_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

/// One catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    pub id: u32,
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub player_start: Point,
    #[serde(default = "default_required_gears")]
    pub required_gears: u32,
    #[serde(default)]
    pub entities: Vec<EntityDescriptor>,
}

/// Ordered list of levels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelCatalog {
    pub levels: Vec<LevelData>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<LevelData>) -> Self {
        Self { levels }
    }

    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The catalog shipped with the game. A broken build-in catalog logs and yields no levels.
    pub fn builtin() -> Self {
        match Self::from_json(BUILTIN_LEVELS) {
            Ok(catalog) => catalog,
            Err(e) => {
                log::error!("Built-in level catalog is invalid: {}", e);
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LevelData> {
        self.levels.get(index)
    }
}

/// Result of advancing through the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progression {
    Loaded(usize),
    CatalogComplete,
}

/// Loads levels into a `World` and tracks the current index
#[derive(Debug, Clone, Default)]
pub struct LevelManager {
    catalog: LevelCatalog,
    current: Option<usize>,
}

impl LevelManager {
    pub fn new(catalog: LevelCatalog) -> Self {
        Self {
            catalog,
            current: None,
        }
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    /// Index of the loaded level, if any
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// Load catalog entry `index` into `world`. On error `world` is untouched.
    pub fn load_level(&mut self, index: usize, world: &mut World) -> Result<(), LevelError> {
        let Some(level) = self.catalog.get(index) else {
            let err = LevelError::OutOfRange {
                index,
                len: self.catalog.len(),
            };
            log::warn!("Ignoring load request: {}", err);
            return Err(err);
        };

        let mut next = World::new(level.width, level.height, level.player_start.into());
        next.level_index = Some(index);
        next.name = level.name.clone();
        next.required_gears = level.required_gears;

        let mut skipped = 0;
        for desc in &level.entities {
            match build_entity(desc) {
                Some(entity) => {
                    next.entities.insert(entity);
                }
                None => skipped += 1,
            }
        }

        log::info!(
            "Loaded level {} '{}' ({} entities, {} skipped)",
            index + 1,
            level.name,
            next.entities.len(),
            skipped
        );

        *world = next;
        self.current = Some(index);
        Ok(())
    }

    /// Move the existing player back to its checkpoint; entities and gears stay
    pub fn respawn_player(&self, world: &mut World) {
        world.player.respawn();
        log::debug!("Player respawned at {:?}", world.player.pos);
    }

    /// Advance to the next catalog entry
    pub fn next_level(&mut self, world: &mut World) -> Result<Progression, LevelError> {
        let next = self.current.map_or(0, |i| i + 1);
        if next >= self.catalog.len() {
            log::info!("Level catalog complete");
            return Ok(Progression::CatalogComplete);
        }
        self.load_level(next, world)?;
        Ok(Progression::Loaded(next))
    }

    /// Level 0 is always open; the rest are delegated to the progress store
    pub fn is_unlocked(&self, index: usize, progress: &dyn ProgressStore) -> bool {
        index < self.catalog.len() && (index == 0 || progress.is_unlocked(index))
    }
}

/// Build one entity from its descriptor. Unknown or unsupported types yield `None`.
pub fn build_entity(desc: &EntityDescriptor) -> Option<Entity> {
    let Some(kind) = EntityType::from_str(&desc.kind) else {
        log::warn!("Skipping unknown entity type '{}'", desc.kind);
        return None;
    };

    let pos = desc.pos();
    let size = desc.size();
    let entity = match kind {
        EntityType::Player => {
            log::warn!("Skipping player descriptor; spawn comes from playerStart");
            return None;
        }
        EntityType::Platform => Entity::platform(pos, size),
        EntityType::MovingPlatform => {
            let end = Vec2::new(desc.prop_f32("endX", desc.x), desc.prop_f32("endY", desc.y));
            Entity::moving_platform(pos, size, end, desc.prop_f32("speed", 60.0))
        }
        EntityType::Enemy => Entity::enemy(size, build_enemy(desc)?),
        EntityType::Collectible => {
            Entity::gear(pos, size, desc.prop_u32("value", GEAR_POINTS as u32) as u64)
        }
        EntityType::Goal => Entity::goal(pos, size),
        EntityType::Checkpoint => Entity::checkpoint(pos, size),
        EntityType::Trap => Entity::trap(pos, size, desc.prop_u32("damage", 1)),
    };
    Some(entity)
}

fn build_enemy(desc: &EntityDescriptor) -> Option<Enemy> {
    let kind_name = desc.prop_str("enemyType").unwrap_or("tickspike");
    let Some(kind) = EnemyKind::from_str(kind_name) else {
        log::warn!("Skipping enemy with unknown enemyType '{}'", kind_name);
        return None;
    };

    let shape = match desc.prop_str("pattern") {
        Some(name) => PatternShape::from_str(name).unwrap_or_else(|| {
            log::warn!("Unknown enemy pattern '{}', using default", name);
            PatternShape::default_for(kind)
        }),
        None => PatternShape::default_for(kind),
    };
    if kind == EnemyKind::Cuckooshadow && shape != PatternShape::Visibility {
        log::warn!("cuckooshadow with pattern {:?} moves but never phases out", shape);
    }

    let pattern = match shape {
        PatternShape::Horizontal => MovementPattern::Horizontal {
            speed: desc.prop_f32("speed", 2.0),
            range: desc.prop_f32("range", 48.0),
            phase: desc.prop_f32("phase", 0.0),
        },
        PatternShape::Vertical => MovementPattern::Vertical {
            speed: desc.prop_f32("speed", 2.0),
            range: desc.prop_f32("range", 24.0),
            phase: desc.prop_f32("phase", 0.0),
        },
        PatternShape::Visibility => MovementPattern::Visibility {
            period: desc.prop_f32("period", 3.0),
            duty: desc.prop_f32("duty", 0.6),
            phase: desc.prop_f32("phase", 0.0),
        },
    };

    Some(Enemy::new(kind, desc.pos(), pattern, desc.prop_u32("damage", 1)))
}
