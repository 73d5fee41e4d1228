//! Game state and core simulation types
//!
//! `GameState` owns the loaded world and is the only place score, lives and
//! gears change. Every change queues a `GameEvent` for the embedder.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::{EntityArena, EntityHandle};
use super::collision::Contact;
use super::entity::Entity;
use super::level::{LevelCatalog, LevelError, LevelManager, Progression};
use super::player::Player;
use crate::consts::*;

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing simulates
    Menu,
    /// Active gameplay
    Playing,
    /// Simulation frozen
    Paused,
    /// Goal reached, counting down to the next level
    LevelComplete,
    /// Out of lives
    GameOver,
    /// Every catalog level cleared
    Finished,
}

/// Outward notifications, drained by the embedding application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged(GamePhase),
    LevelLoaded { index: usize, name: String },
    ScoreChanged(u64),
    LivesChanged(u32),
    GearsChanged(u32),
    EnemyStomped,
    CheckpointActivated,
    LevelComplete { index: usize, score: u64 },
    GameOver { index: usize, score: u64 },
    CatalogComplete { score: u64 },
}

/// Everything that belongs to one loaded level
#[derive(Debug, Clone)]
pub struct World {
    pub player: Player,
    pub entities: EntityArena,
    pub width: f32,
    pub height: f32,
    pub spawn: Vec2,
    pub required_gears: u32,
    /// Catalog index, `None` before the first load
    pub level_index: Option<usize>,
    pub name: String,
    /// Simulated seconds since the level loaded
    pub elapsed: f32,
}

impl Default for World {
    fn default() -> Self {
        Self::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT, Vec2::ZERO)
    }
}

impl World {
    pub fn new(width: f32, height: f32, spawn: Vec2) -> Self {
        Self {
            player: Player::new(spawn),
            entities: EntityArena::new(),
            width,
            height,
            spawn,
            required_gears: DEFAULT_REQUIRED_GEARS,
            level_index: None,
            name: String::new(),
            elapsed: 0.0,
        }
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Current phase
    pub phase: GamePhase,
    /// Loaded level
    pub world: World,
    /// Catalog and current index
    pub levels: LevelManager,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Seconds left before the pending level transition
    transition: Option<f32>,
    events: Vec<GameEvent>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(LevelCatalog::builtin())
    }
}

impl GameState {
    /// Create a game sitting at the menu with nothing loaded
    pub fn new(catalog: LevelCatalog) -> Self {
        Self {
            phase: GamePhase::Menu,
            world: World::default(),
            levels: LevelManager::new(catalog),
            time_ticks: 0,
            transition: None,
            events: Vec::new(),
        }
    }

    pub fn player(&self) -> &Player {
        &self.world.player
    }

    /// Seconds remaining on a pending level transition
    pub fn pending_transition(&self) -> Option<f32> {
        self.transition
    }

    /// Queued events not yet drained
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.phase != phase {
            log::info!("Phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
            self.emit(GameEvent::PhaseChanged(phase));
        }
    }

    fn emit_counters(&mut self) {
        let player = &self.world.player;
        let (score, lives, gears) = (player.score, player.lives, player.gears);
        self.emit(GameEvent::ScoreChanged(score));
        self.emit(GameEvent::LivesChanged(lives));
        self.emit(GameEvent::GearsChanged(gears));
    }

    // === Lifecycle ===

    /// Enter play. Loads the first level if nothing is loaded yet.
    pub fn start(&mut self) {
        match self.phase {
            GamePhase::Menu => {
                if self.world.level_index.is_none() && self.load_level(0).is_err() {
                    return;
                }
                self.set_phase(GamePhase::Playing);
            }
            GamePhase::GameOver | GamePhase::Finished => {
                if let Err(e) = self.restart() {
                    log::warn!("Could not restart: {}", e);
                }
            }
            GamePhase::Paused => self.resume(),
            GamePhase::Playing | GamePhase::LevelComplete => {}
        }
    }

    /// Freeze play. A pending level transition stays pending.
    pub fn pause(&mut self) {
        if matches!(self.phase, GamePhase::Playing | GamePhase::LevelComplete) {
            self.set_phase(GamePhase::Paused);
        }
    }

    /// Back to play, or to the level-complete countdown if one is pending
    pub fn resume(&mut self) {
        if self.phase == GamePhase::Paused {
            let phase = if self.transition.is_some() {
                GamePhase::LevelComplete
            } else {
                GamePhase::Playing
            };
            self.set_phase(phase);
        }
    }

    /// Reset counters and reload the first level
    pub fn restart(&mut self) -> Result<(), LevelError> {
        self.advance_to_level(0)
    }

    /// Reset counters and load level `index`. Out of range changes nothing.
    pub fn advance_to_level(&mut self, index: usize) -> Result<(), LevelError> {
        self.load_level(index)?;
        self.set_phase(GamePhase::Playing);
        Ok(())
    }

    /// Load level `index` with a fresh player; counters start at their defaults
    pub fn load_level(&mut self, index: usize) -> Result<(), LevelError> {
        self.levels.load_level(index, &mut self.world)?;
        self.transition = None;
        let name = self.world.name.clone();
        self.emit(GameEvent::LevelLoaded { index, name });
        self.emit_counters();
        Ok(())
    }

    /// Sequential progression: carries score and lives into the next level
    pub fn next_level(&mut self) {
        let (lives, score) = (self.world.player.lives, self.world.player.score);
        self.transition = None;
        match self.levels.next_level(&mut self.world) {
            Ok(Progression::Loaded(index)) => {
                self.world.player.lives = lives;
                self.world.player.score = score;
                let name = self.world.name.clone();
                self.emit(GameEvent::LevelLoaded { index, name });
                self.emit_counters();
                self.set_phase(GamePhase::Playing);
            }
            Ok(Progression::CatalogComplete) => {
                self.emit(GameEvent::CatalogComplete { score });
                self.set_phase(GamePhase::Finished);
            }
            Err(e) => {
                log::warn!("Could not advance: {}", e);
                self.set_phase(GamePhase::Finished);
            }
        }
    }

    /// Count down a pending level transition
    pub fn advance_transition(&mut self, dt: f32) {
        let Some(remaining) = self.transition else {
            return;
        };
        let remaining = remaining - dt;
        if remaining <= 0.0 {
            self.next_level();
        } else {
            self.transition = Some(remaining);
        }
    }

    // === Entities ===

    pub fn add_entity(&mut self, entity: Entity) -> EntityHandle {
        self.world.entities.insert(entity)
    }

    pub fn remove_entity(&mut self, handle: EntityHandle) -> Option<Entity> {
        self.world.entities.remove(handle)
    }

    // === Counters ===

    pub fn add_score(&mut self, points: u64) {
        self.world.player.score = self.world.player.score.saturating_add(points);
        let score = self.world.player.score;
        self.emit(GameEvent::ScoreChanged(score));
    }

    /// One more gear, plus its point value
    pub fn collect_gear(&mut self, points: u64) {
        self.world.player.gears += 1;
        let gears = self.world.player.gears;
        self.emit(GameEvent::GearsChanged(gears));
        if points > 0 {
            self.add_score(points);
        }
    }

    pub fn has_all_gears(&self) -> bool {
        self.world.player.gears >= self.world.required_gears
    }

    /// Damage the player. Ignored while invulnerable.
    pub fn damage_player(&mut self, amount: u32) {
        if !self.world.player.take_damage(amount) {
            return;
        }
        self.after_life_lost();
    }

    /// Player fell out of the world: costs a life even while invulnerable
    pub fn lose_life(&mut self) {
        self.world.player.lose_life();
        self.after_life_lost();
    }

    fn after_life_lost(&mut self) {
        let lives = self.world.player.lives;
        self.emit(GameEvent::LivesChanged(lives));
        if lives == 0 {
            self.game_over();
        } else {
            self.levels.respawn_player(&mut self.world);
        }
    }

    fn game_over(&mut self) {
        let index = self.world.level_index.unwrap_or(0);
        let score = self.world.player.score;
        log::info!("Game over on level {} with {} points", index + 1, score);
        self.transition = None;
        self.emit(GameEvent::GameOver { index, score });
        self.set_phase(GamePhase::GameOver);
    }

    /// Award the completion bonus and schedule the next level. Fires once per completion.
    pub fn level_complete(&mut self) {
        if self.phase != GamePhase::Playing || self.transition.is_some() {
            return;
        }
        self.add_score(LEVEL_COMPLETE_BONUS);
        let index = self.world.level_index.unwrap_or(0);
        let score = self.world.player.score;
        log::info!("Level {} complete with {} points", index + 1, score);
        self.emit(GameEvent::LevelComplete { index, score });
        self.transition = Some(LEVEL_TRANSITION_DELAY);
        self.set_phase(GamePhase::LevelComplete);
    }

    /// Apply a collision outcome through the counter methods
    pub fn apply_contact(&mut self, contact: Contact) {
        match contact {
            Contact::Stomped { points } => {
                self.emit(GameEvent::EnemyStomped);
                self.add_score(points);
            }
            Contact::Hurt { damage } => self.damage_player(damage),
            Contact::Gear { points } => self.collect_gear(points),
            Contact::GoalReached => {
                if self.has_all_gears() {
                    self.level_complete();
                }
            }
            Contact::Checkpoint => self.emit(GameEvent::CheckpointActivated),
        }
    }
}
