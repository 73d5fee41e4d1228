//! Enemy kinds and movement patterns
//!
//! Every pattern is a closed-form function of elapsed level time, so an
//! enemy's position never depends on how many ticks it took to get there.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Enemy sub-types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Clockwork spike crawling back and forth along the floor
    Tickspike,
    /// Leaf pile bobbing up and down
    Rustling,
    /// Shade that fades in and out of existence
    Cuckooshadow,
}

impl EnemyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Tickspike => "tickspike",
            EnemyKind::Rustling => "rustling",
            EnemyKind::Cuckooshadow => "cuckooshadow",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tickspike" => Some(EnemyKind::Tickspike),
            "rustling" => Some(EnemyKind::Rustling),
            "cuckooshadow" => Some(EnemyKind::Cuckooshadow),
            _ => None,
        }
    }

    pub fn asset_name(&self) -> &'static str {
        match self {
            EnemyKind::Tickspike => "enemy_tickspike",
            EnemyKind::Rustling => "enemy_rustling",
            EnemyKind::Cuckooshadow => "enemy_cuckooshadow",
        }
    }
}

/// How an enemy moves or phases over time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MovementPattern {
    /// `range * sin(t * speed + phase)` along x
    Horizontal { speed: f32, range: f32, phase: f32 },
    /// `range * sin(t * speed + phase)` along y
    Vertical { speed: f32, range: f32, phase: f32 },
    /// Tangible for the first `duty` fraction of every `period` seconds.
    /// `phase` shifts the cycle, as a fraction of one period.
    Visibility { period: f32, duty: f32, phase: f32 },
}

/// Pattern selector used while building enemies from level data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternShape {
    Horizontal,
    Vertical,
    Visibility,
}

impl PatternShape {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "horizontal" | "horizontal-oscillation" => Some(PatternShape::Horizontal),
            "vertical" | "vertical-oscillation" => Some(PatternShape::Vertical),
            "visibility" | "periodic-visibility" => Some(PatternShape::Visibility),
            _ => None,
        }
    }

    /// Default pattern for each enemy kind
    pub fn default_for(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Tickspike => PatternShape::Horizontal,
            EnemyKind::Rustling => PatternShape::Vertical,
            EnemyKind::Cuckooshadow => PatternShape::Visibility,
        }
    }
}

/// Enemy-specific state carried by an enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    /// Lives removed on a non-stomp contact
    pub damage: u32,
    pub pattern: MovementPattern,
    /// Spawn point the pattern oscillates around
    pub origin: Vec2,
    /// False while a phasing enemy is intangible
    pub visible: bool,
}

impl Enemy {
    pub fn new(kind: EnemyKind, origin: Vec2, pattern: MovementPattern, damage: u32) -> Self {
        let mut enemy = Self {
            kind,
            damage,
            pattern,
            origin,
            visible: true,
        };
        enemy.visible = enemy.visible_at(0.0);
        enemy
    }

    /// Offset from `origin` at elapsed time `t`
    pub fn offset_at(&self, t: f32) -> Vec2 {
        match self.pattern {
            MovementPattern::Horizontal { speed, range, phase } => {
                Vec2::new(range * (t * speed + phase).sin(), 0.0)
            }
            MovementPattern::Vertical { speed, range, phase } => {
                Vec2::new(0.0, range * (t * speed + phase).sin())
            }
            MovementPattern::Visibility { .. } => Vec2::ZERO,
        }
    }

    /// Time derivative of `offset_at`
    pub fn velocity_at(&self, t: f32) -> Vec2 {
        match self.pattern {
            MovementPattern::Horizontal { speed, range, phase } => {
                Vec2::new(range * speed * (t * speed + phase).cos(), 0.0)
            }
            MovementPattern::Vertical { speed, range, phase } => {
                Vec2::new(0.0, range * speed * (t * speed + phase).cos())
            }
            MovementPattern::Visibility { .. } => Vec2::ZERO,
        }
    }

    /// Whether the enemy is tangible at elapsed time `t`
    pub fn visible_at(&self, t: f32) -> bool {
        match self.pattern {
            MovementPattern::Visibility { period, duty, phase } => {
                if period <= 0.0 {
                    return true;
                }
                let cycle = (t / period + phase).rem_euclid(1.0);
                cycle < duty.clamp(0.0, 1.0)
            }
            _ => true,
        }
    }
}
