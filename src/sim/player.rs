//! The player character
//!
//! Movement, jump/dash physics, damage and respawn. The animation state is
//! derived from timers and velocity after collisions have run, never from
//! raw input.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Rect;
use super::arena::EntityHandle;
use super::tick::TickInput;
use crate::consts::*;
use crate::render::{self, AssetProvider, DrawContext};

/// Animation/logic state of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerState {
    #[default]
    Idle,
    Jump,
    Fall,
    Dash,
    Hit,
}

impl PlayerState {
    pub fn asset_name(&self) -> &'static str {
        match self {
            PlayerState::Idle => "player_idle",
            PlayerState::Jump => "player_jump",
            PlayerState::Fall => "player_fall",
            PlayerState::Dash => "player_dash",
            PlayerState::Hit => "player_hit",
        }
    }
}

/// The player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityHandle,
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub active: bool,
    pub state: PlayerState,
    pub lives: u32,
    pub score: u64,
    /// Gears collected in the current level
    pub gears: u32,
    pub grounded: bool,
    /// -1.0 facing left, 1.0 facing right
    pub facing: f32,
    /// Refilled on landing
    pub dash_available: bool,
    pub dash_cooldown: f32,
    /// Remaining dash time (> 0 while dashing)
    pub dash_timer: f32,
    pub dash_dir: f32,
    /// Remaining invulnerability (> 0 while invulnerable)
    pub invuln_timer: f32,
    /// Respawn position (spawn point until a checkpoint is touched)
    pub checkpoint: Vec2,
    /// Bottom edge before the last integration step, used by landing checks
    #[serde(default)]
    pub prev_bottom: f32,
    /// Set by a jump impulse; releasing jump early only cuts a rise it started
    #[serde(default)]
    pub jump_cut_armed: bool,
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        let size = Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT);
        Self {
            id: EntityHandle::PLAYER,
            pos: spawn,
            size,
            vel: Vec2::ZERO,
            active: true,
            state: PlayerState::Idle,
            lives: STARTING_LIVES,
            score: 0,
            gears: 0,
            grounded: false,
            facing: 1.0,
            dash_available: true,
            dash_cooldown: 0.0,
            dash_timer: 0.0,
            dash_dir: 1.0,
            invuln_timer: 0.0,
            checkpoint: spawn,
            prev_bottom: spawn.y + size.y,
            jump_cut_armed: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    /// Thin sensor straddling the bottom edge, inset from the sides
    pub fn feet(&self) -> Rect {
        Rect::new(
            Vec2::new(
                self.pos.x + FEET_INSET,
                self.pos.y + self.size.y - FEET_HEIGHT / 2.0,
            ),
            Vec2::new(self.size.x - 2.0 * FEET_INSET, FEET_HEIGHT),
        )
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invuln_timer > 0.0
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_timer > 0.0
    }

    pub fn can_dash(&self) -> bool {
        self.dash_available && self.dash_cooldown <= 0.0 && !self.is_dashing()
    }

    /// Apply one tick of input and physics, then clamp to the world
    pub fn update(&mut self, input: &TickInput, dt: f32, world_width: f32) {
        self.prev_bottom = self.pos.y + self.size.y;
        self.tick_timers(dt);

        let dir = input.direction();
        if dir != 0.0 {
            self.facing = dir;
        }

        if input.dash_pressed && self.can_dash() {
            self.start_dash(dir);
        }

        if self.is_dashing() {
            self.vel = Vec2::new(self.dash_dir * DASH_SPEED, 0.0);
        } else {
            self.apply_horizontal(dir, dt);

            if input.jump_pressed && self.grounded && self.vel.y >= 0.0 {
                self.vel.y = JUMP_VELOCITY;
                self.jump_cut_armed = true;
            }
            // Short hop: releasing jump early caps the rise
            if self.jump_cut_armed && !input.jump_held && self.vel.y < SHORT_HOP_VELOCITY {
                self.vel.y = SHORT_HOP_VELOCITY;
            }
            self.vel.y = (self.vel.y + GRAVITY * dt).min(TERMINAL_FALL_SPEED);
            if self.vel.y >= 0.0 {
                self.jump_cut_armed = false;
            }
        }

        self.pos += self.vel * dt;
        self.grounded = false;
        self.clamp_to_world(world_width);
    }

    fn tick_timers(&mut self, dt: f32) {
        self.invuln_timer = (self.invuln_timer - dt).max(0.0);
        self.dash_timer = (self.dash_timer - dt).max(0.0);
        self.dash_cooldown = (self.dash_cooldown - dt).max(0.0);
    }

    fn start_dash(&mut self, dir: f32) {
        self.dash_dir = if dir != 0.0 { dir } else { self.facing };
        self.dash_timer = DASH_DURATION;
        self.dash_cooldown = DASH_COOLDOWN;
        self.dash_available = false;
    }

    fn apply_horizontal(&mut self, dir: f32, dt: f32) {
        if dir != 0.0 {
            let target = dir * MOVE_SPEED;
            let t = (GROUND_ACCEL * dt).min(1.0);
            self.vel.x += (target - self.vel.x) * t;
        } else {
            self.vel.x *= FRICTION.powf(dt * 60.0);
            if self.vel.x.abs() < 1.0 {
                self.vel.x = 0.0;
            }
        }
    }

    /// Keep x inside `[0, world_width - size.x]`
    pub fn clamp_to_world(&mut self, world_width: f32) {
        let max_x = (world_width - self.size.x).max(0.0);
        if self.pos.x < 0.0 {
            self.pos.x = 0.0;
            self.vel.x = self.vel.x.max(0.0);
        } else if self.pos.x > max_x {
            self.pos.x = max_x;
            self.vel.x = self.vel.x.min(0.0);
        }
    }

    /// Rest on a surface whose top edge is at `top`
    pub fn land_on(&mut self, top: f32) {
        self.pos.y = top - self.size.y;
        self.vel.y = 0.0;
        self.grounded = true;
        self.dash_available = true;
        self.jump_cut_armed = false;
    }

    /// Launch upward off an enemy. Not a jump, so releasing jump keeps the full height.
    pub fn bounce(&mut self, velocity: f32) {
        self.vel.y = velocity;
        self.grounded = false;
        self.jump_cut_armed = false;
    }

    /// Derive the state tag from timers and velocity
    pub fn refresh_state(&mut self) {
        self.state = if self.is_invulnerable() {
            PlayerState::Hit
        } else if self.is_dashing() {
            PlayerState::Dash
        } else if self.vel.y < -JUMP_STATE_THRESHOLD {
            PlayerState::Jump
        } else if self.vel.y > JUMP_STATE_THRESHOLD && !self.grounded {
            PlayerState::Fall
        } else {
            PlayerState::Idle
        };
    }

    /// Apply damage. Returns false (and changes nothing) while invulnerable.
    pub fn take_damage(&mut self, amount: u32) -> bool {
        if self.is_invulnerable() || amount == 0 {
            return false;
        }
        self.lives = self.lives.saturating_sub(amount);
        self.invuln_timer = HIT_INVULNERABILITY;
        self.vel.y = KNOCKBACK_VELOCITY;
        self.jump_cut_armed = false;
        self.dash_timer = 0.0;
        self.grounded = false;
        self.refresh_state();
        true
    }

    /// Lose a life regardless of invulnerability (falling out of the world)
    pub fn lose_life(&mut self) {
        self.lives = self.lives.saturating_sub(1);
    }

    /// Return to the checkpoint with a grace period
    pub fn respawn(&mut self) {
        self.pos = self.checkpoint;
        self.vel = Vec2::ZERO;
        self.prev_bottom = self.pos.y + self.size.y;
        self.dash_timer = 0.0;
        self.grounded = false;
        self.jump_cut_armed = false;
        self.invuln_timer = RESPAWN_INVULNERABILITY;
        self.refresh_state();
    }

    pub fn set_checkpoint(&mut self, pos: Vec2) {
        self.checkpoint = pos;
    }

    pub fn render(&self, ctx: &mut dyn DrawContext, camera_x: f32, assets: &dyn AssetProvider) {
        let rect = self.bounds().translated(Vec2::new(-camera_x, 0.0));
        render::draw_sprite(ctx, assets, self.state.asset_name(), rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grounded_player() -> Player {
        let mut p = Player::new(Vec2::new(100.0, 100.0));
        p.land_on(148.0);
        p
    }

    #[test]
    fn test_new_player_defaults() {
        let p = Player::new(Vec2::new(40.0, 300.0));
        assert_eq!(p.lives, STARTING_LIVES);
        assert_eq!(p.gears, 0);
        assert_eq!(p.score, 0);
        assert_eq!(p.checkpoint, Vec2::new(40.0, 300.0));
        assert_eq!(p.state, PlayerState::Idle);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let jump = TickInput {
            jump_pressed: true,
            jump_held: true,
            ..Default::default()
        };

        let mut airborne = Player::new(Vec2::new(100.0, 100.0));
        airborne.update(&jump, SIM_DT, 1000.0);
        assert!(airborne.vel.y > 0.0, "no jump in mid air");

        let mut p = grounded_player();
        p.update(&jump, SIM_DT, 1000.0);
        assert!(p.vel.y < 0.0);
        p.refresh_state();
        assert_eq!(p.state, PlayerState::Jump);
    }

    #[test]
    fn test_short_hop_clamps_rise() {
        let mut p = grounded_player();
        let jump = TickInput {
            jump_pressed: true,
            jump_held: true,
            ..Default::default()
        };
        p.update(&jump, SIM_DT, 1000.0);
        assert!(p.vel.y < SHORT_HOP_VELOCITY);

        p.update(&TickInput::default(), SIM_DT, 1000.0);
        assert!(p.vel.y >= SHORT_HOP_VELOCITY);
    }

    #[test]
    fn test_bounce_keeps_full_height_without_jump() {
        let mut p = Player::new(Vec2::new(100.0, 300.0));
        p.bounce(STOMP_BOUNCE_VELOCITY);
        p.update(&TickInput::default(), SIM_DT, 1000.0);
        assert!(p.vel.y < SHORT_HOP_VELOCITY, "bounce was cut to {}", p.vel.y);
        p.update(&TickInput::default(), SIM_DT, 1000.0);
        assert!((p.vel.y - (STOMP_BOUNCE_VELOCITY + 2.0 * GRAVITY * SIM_DT)).abs() < 1e-3);
    }

    #[test]
    fn test_jump_cut_disarms_on_landing() {
        let mut p = grounded_player();
        let jump = TickInput {
            jump_pressed: true,
            jump_held: true,
            ..Default::default()
        };
        p.update(&jump, SIM_DT, 1000.0);
        assert!(p.jump_cut_armed);
        p.land_on(148.0);
        assert!(!p.jump_cut_armed);
    }

    #[test]
    fn test_gravity_caps_at_terminal_speed() {
        let mut p = Player::new(Vec2::ZERO);
        for _ in 0..600 {
            p.update(&TickInput::default(), SIM_DT, 1000.0);
        }
        assert!((p.vel.y - TERMINAL_FALL_SPEED).abs() < 1e-3);
        p.refresh_state();
        assert_eq!(p.state, PlayerState::Fall);
    }

    #[test]
    fn test_friction_decays_to_rest() {
        let mut p = grounded_player();
        p.vel.x = MOVE_SPEED;
        for _ in 0..120 {
            p.update(&TickInput::default(), SIM_DT, 10_000.0);
            p.land_on(p.pos.y + p.size.y);
        }
        assert_eq!(p.vel.x, 0.0);
    }

    #[test]
    fn test_dash_overrides_then_cools_down() {
        let mut p = grounded_player();
        let dash = TickInput {
            left: true,
            dash_pressed: true,
            ..Default::default()
        };
        p.update(&dash, SIM_DT, 10_000.0);
        assert!(p.is_dashing());
        assert_eq!(p.vel, Vec2::new(-DASH_SPEED, 0.0));
        p.refresh_state();
        assert_eq!(p.state, PlayerState::Dash);

        // Run out the dash without landing: no second dash available
        for _ in 0..60 {
            p.update(&TickInput::default(), SIM_DT, 10_000.0);
        }
        assert!(!p.is_dashing());
        assert!(!p.can_dash());

        p.land_on(500.0);
        assert!(p.can_dash());
    }

    #[test]
    fn test_take_damage_respects_invulnerability() {
        let mut p = Player::new(Vec2::ZERO);
        assert!(p.take_damage(1));
        assert_eq!(p.lives, 2);
        assert!(p.is_invulnerable());
        assert_eq!(p.state, PlayerState::Hit);

        assert!(!p.take_damage(1));
        assert_eq!(p.lives, 2);

        p.invuln_timer = 0.0;
        assert!(p.take_damage(2));
        assert_eq!(p.lives, 0);
        assert!(!p.take_damage(0));
    }

    #[test]
    fn test_lives_never_underflow() {
        let mut p = Player::new(Vec2::ZERO);
        assert!(p.take_damage(10));
        assert_eq!(p.lives, 0);
        p.lose_life();
        assert_eq!(p.lives, 0);
    }

    #[test]
    fn test_respawn_at_checkpoint_with_grace() {
        let mut p = Player::new(Vec2::new(10.0, 10.0));
        p.set_checkpoint(Vec2::new(500.0, 200.0));
        p.pos = Vec2::new(900.0, 900.0);
        p.vel = Vec2::new(100.0, 100.0);
        p.respawn();
        assert_eq!(p.pos, Vec2::new(500.0, 200.0));
        assert_eq!(p.vel, Vec2::ZERO);
        assert!((p.invuln_timer - RESPAWN_INVULNERABILITY).abs() < 1e-6);
    }

    #[test]
    fn test_narrow_world_clamps_to_zero() {
        let mut p = Player::new(Vec2::new(5.0, 0.0));
        p.clamp_to_world(10.0);
        assert_eq!(p.pos.x, 0.0);
    }

    proptest! {
        #[test]
        fn prop_horizontal_position_stays_in_world(
            start_x in 0.0f32..600.0,
            inputs in proptest::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 1..200),
        ) {
            let world_width = 640.0;
            let mut p = Player::new(Vec2::new(start_x, 0.0));
            for (left, right, dash) in inputs {
                let input = TickInput { left, right, dash_pressed: dash, ..Default::default() };
                p.update(&input, SIM_DT, world_width);
                prop_assert!(p.pos.x >= 0.0);
                prop_assert!(p.pos.x <= world_width - p.size.x);
            }
        }
    }
}
