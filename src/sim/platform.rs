//! Moving platform paths

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Ping-pong linear path between two points at a fixed speed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingPath {
    pub start: Vec2,
    pub end: Vec2,
    /// Pixels per second along the path
    pub speed: f32,
    /// Displacement applied during the last update
    #[serde(default)]
    pub delta: Vec2,
}

impl MovingPath {
    pub fn new(start: Vec2, end: Vec2, speed: f32) -> Self {
        Self {
            start,
            end,
            speed: speed.abs(),
            delta: Vec2::ZERO,
        }
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    /// Seconds for one full out-and-back cycle (0 for a degenerate path)
    pub fn cycle_duration(&self) -> f32 {
        if self.speed <= 0.0 {
            return 0.0;
        }
        2.0 * self.length() / self.speed
    }

    /// Position after `elapsed` seconds. Pure in `elapsed`.
    pub fn position_at(&self, elapsed: f32) -> Vec2 {
        let length = self.length();
        if length <= f32::EPSILON || self.speed <= 0.0 {
            return self.start;
        }
        let travelled = (elapsed.max(0.0) * self.speed).rem_euclid(2.0 * length);
        let along = if travelled <= length {
            travelled
        } else {
            2.0 * length - travelled
        };
        self.start + (self.end - self.start) * (along / length)
    }
}
