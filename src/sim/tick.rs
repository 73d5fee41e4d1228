//! Fixed timestep simulation tick
//!
//! Advances the game deterministically in a fixed order: player, entities,
//! collisions, contacts, pruning, then the fall-out check.

use super::collision::resolve_collisions;
use super::entity::WorldView;
use super::state::{GamePhase, GameState};
use crate::consts::MAX_TICK_DT;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Jump button currently down
    pub jump_held: bool,
    /// Jump went down this tick
    pub jump_pressed: bool,
    /// Dash went down this tick
    pub dash_pressed: bool,
    /// Pause toggle went down this tick
    pub pause_pressed: bool,
}

impl TickInput {
    /// -1.0, 0.0 or 1.0. Opposing keys cancel.
    pub fn direction(&self) -> f32 {
        match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}

/// Advance the game state by one timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Large steps would tunnel through thin platforms
    let dt = dt.clamp(0.0, MAX_TICK_DT);

    match state.phase {
        GamePhase::Paused => {
            if input.pause_pressed {
                state.resume();
            }
            return;
        }
        GamePhase::LevelComplete => {
            if input.pause_pressed {
                state.pause();
            } else {
                state.advance_transition(dt);
            }
            return;
        }
        GamePhase::Playing => {}
        GamePhase::Menu | GamePhase::GameOver | GamePhase::Finished => return,
    }

    if input.pause_pressed {
        state.pause();
        return;
    }

    state.time_ticks += 1;
    let world = &mut state.world;
    world.elapsed += dt;

    world.player.update(input, dt, world.width);

    let view = WorldView {
        elapsed: world.elapsed,
        dt,
        gears: world.player.gears,
        required_gears: world.required_gears,
    };
    for entity in world.entities.iter_mut().filter(|e| e.active) {
        entity.update(&view);
    }

    let contacts = resolve_collisions(&mut world.player, &mut world.entities, world.required_gears);
    world.player.clamp_to_world(world.width);
    world.player.refresh_state();

    // Once the level is won or lost, later contacts in the same tick are void
    for contact in contacts {
        state.apply_contact(contact);
        if state.phase != GamePhase::Playing {
            break;
        }
    }
    if state.phase != GamePhase::Playing {
        return;
    }

    let removed = state.world.entities.purge_inactive();
    if removed > 0 {
        log::trace!("Pruned {} inactive entities", removed);
    }

    if state.world.player.pos.y > state.world.height {
        log::debug!("Player fell out of the world");
        state.lose_life();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::entity::EntityKind;
    use crate::sim::level::LevelCatalog;
    use glam::Vec2;
    use proptest::prelude::*;

    const FLOOR_LEVEL: &str = r#"[
        { "id": 1, "name": "Floor", "width": 2000, "height": 600,
          "playerStart": { "x": 100, "y": 452 },
          "entities": [
            { "type": "platform", "x": 0, "y": 500, "width": 2000, "height": 100 }
          ] }
    ]"#;

    fn state_from(json: &str) -> GameState {
        let mut state = GameState::new(LevelCatalog::from_json(json).unwrap());
        state.start();
        state
    }

    fn settle(state: &mut GameState) {
        for _ in 0..30 {
            tick(state, &TickInput::default(), SIM_DT);
        }
    }

    #[test]
    fn test_direction() {
        let both = TickInput {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(both.direction(), 0.0);
        let left = TickInput {
            left: true,
            ..Default::default()
        };
        assert_eq!(left.direction(), -1.0);
    }

    #[test]
    fn test_player_rests_on_floor() {
        let mut state = state_from(FLOOR_LEVEL);
        settle(&mut state);
        assert!(state.player().grounded);
        assert!((state.player().pos.y + PLAYER_HEIGHT - 500.0).abs() < 1e-3);
    }

    #[test]
    fn test_pause_skips_simulation() {
        let mut state = state_from(FLOOR_LEVEL);
        let pause = TickInput {
            pause_pressed: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        let before = state.player().pos;
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..10 {
            tick(&mut state, &right, SIM_DT);
        }
        assert_eq!(state.player().pos, before);
        assert_eq!(state.world.elapsed, 0.0);

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_menu_does_not_simulate() {
        let mut state = GameState::new(LevelCatalog::from_json(FLOOR_LEVEL).unwrap());
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_oversized_dt_is_clamped() {
        let mut state = state_from(FLOOR_LEVEL);
        tick(&mut state, &TickInput::default(), 5.0);
        assert!((state.world.elapsed - MAX_TICK_DT).abs() < 1e-6);
        assert!(state.player().pos.y < 500.0);
    }

    #[test]
    fn test_determinism() {
        let script: Vec<TickInput> = (0..240)
            .map(|i| TickInput {
                right: i % 50 < 30,
                left: i % 70 > 60,
                jump_held: i % 40 < 10,
                jump_pressed: i % 40 == 0,
                dash_pressed: i % 90 == 45,
                pause_pressed: false,
            })
            .collect();

        let run = || {
            let mut state = state_from(FLOOR_LEVEL);
            for input in &script {
                tick(&mut state, input, SIM_DT);
            }
            (state.player().pos, state.player().vel, state.world.elapsed)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_tickspike_hit_costs_life_and_respawns() {
        let mut state = state_from(
            r#"[
                { "id": 1, "name": "Spike", "width": 2000, "height": 600,
                  "playerStart": { "x": 100, "y": 452 },
                  "entities": [
                    { "type": "platform", "x": 0, "y": 500, "width": 2000, "height": 100 },
                    { "type": "enemy", "x": 220, "y": 468, "width": 32, "height": 32,
                      "properties": { "enemyType": "tickspike", "range": 0 } }
                  ] }
            ]"#,
        );
        settle(&mut state);
        assert_eq!(state.player().lives, 3);

        let right = TickInput {
            right: true,
            ..Default::default()
        };
        let mut hit = false;
        for _ in 0..120 {
            tick(&mut state, &right, SIM_DT);
            if state.player().lives < 3 {
                hit = true;
                break;
            }
        }
        assert!(hit, "walking into the spike should hurt");
        assert_eq!(state.player().lives, 2);
        assert_eq!(state.player().pos, Vec2::new(100.0, 452.0));
        assert!(state.player().is_invulnerable());
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_gears_then_goal_completes_level() {
        let mut state = state_from(
            r#"[
                { "id": 1, "name": "Gears", "width": 2000, "height": 600,
                  "playerStart": { "x": 100, "y": 452 },
                  "entities": [
                    { "type": "platform", "x": 0, "y": 500, "width": 2000, "height": 100 },
                    { "type": "collectible", "x": 160, "y": 470, "width": 16, "height": 16 },
                    { "type": "collectible", "x": 200, "y": 470, "width": 16, "height": 16 },
                    { "type": "collectible", "x": 240, "y": 470, "width": 16, "height": 16 },
                    { "type": "goal", "x": 320, "y": 436, "width": 32, "height": 64 }
                  ] },
                { "id": 2, "name": "Next", "width": 1000, "height": 600,
                  "playerStart": { "x": 40, "y": 100 } }
            ]"#,
        );
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        for _ in 0..240 {
            tick(&mut state, &right, SIM_DT);
            if state.phase != GamePhase::Playing {
                break;
            }
        }
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert_eq!(state.player().gears, 3);
        assert_eq!(state.player().score, 3 * GEAR_POINTS + LEVEL_COMPLETE_BONUS);
        // Gears are pruned once collected
        assert_eq!(state.world.entities.len(), 2);

        let ticks = (LEVEL_TRANSITION_DELAY / SIM_DT).ceil() as usize + 1;
        for _ in 0..ticks {
            tick(&mut state, &right, SIM_DT);
        }
        assert_eq!(state.world.level_index, Some(1));
        assert_eq!(state.player().score, 3 * GEAR_POINTS + LEVEL_COMPLETE_BONUS);
        let completions = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, crate::sim::GameEvent::LevelComplete { .. }))
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_falling_out_costs_life() {
        let mut state = state_from(
            r#"[
                { "id": 1, "name": "Pit", "width": 800, "height": 600,
                  "playerStart": { "x": 100, "y": 100 } }
            ]"#,
        );
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            if state.player().lives < STARTING_LIVES {
                break;
            }
        }
        assert_eq!(state.player().lives, STARTING_LIVES - 1);
        assert_eq!(state.player().pos, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_rides_moving_platform_for_full_cycle() {
        let mut state = state_from(
            r#"[
                { "id": 1, "name": "Ride", "width": 2000, "height": 800,
                  "playerStart": { "x": 148, "y": 252 },
                  "entities": [
                    { "type": "movingPlatform", "x": 100, "y": 300, "width": 128, "height": 16,
                      "properties": { "endX": 400, "speed": 120 } }
                  ] }
            ]"#,
        );
        settle(&mut state);
        assert!(state.player().grounded);

        let platform_x = |state: &GameState| {
            state
                .world
                .entities
                .iter()
                .find(|e| matches!(e.kind, EntityKind::MovingPlatform(_)))
                .map(|e| e.pos.x)
                .unwrap()
        };
        let offset = state.player().pos.x - platform_x(&state);
        let start_player = state.player().pos.x;
        let start_platform = platform_x(&state);

        // 300 px each way at 120 px/s: a 5 second cycle
        let cycle_ticks = (5.0 / SIM_DT).round() as usize;
        for _ in 0..cycle_ticks {
            tick(&mut state, &TickInput::default(), SIM_DT);
            assert!(state.player().grounded);
            let drift = state.player().pos.x - platform_x(&state) - offset;
            assert!(drift.abs() < 1e-2, "drifted {drift}");
        }

        let player_moved = state.player().pos.x - start_player;
        let platform_moved = platform_x(&state) - start_platform;
        assert!((player_moved - platform_moved).abs() < 1e-2);
    }

    #[test]
    fn test_pause_holds_level_transition() {
        let mut state = state_from(
            r#"[
                { "id": 1, "name": "A", "width": 1000, "height": 600,
                  "playerStart": { "x": 100, "y": 452 },
                  "entities": [ { "type": "platform", "x": 0, "y": 500, "width": 1000, "height": 100 } ] },
                { "id": 2, "name": "B", "width": 1000, "height": 600,
                  "playerStart": { "x": 100, "y": 452 } }
            ]"#,
        );
        state.level_complete();
        tick(&mut state, &TickInput::default(), SIM_DT);
        let remaining = state.pending_transition();
        assert!(remaining.is_some());

        let pause = TickInput {
            pause_pressed: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);
        for _ in 0..200 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.world.level_index, Some(0));
        assert_eq!(state.pending_transition(), remaining);

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::LevelComplete);
        let ticks = (LEVEL_TRANSITION_DELAY / SIM_DT).ceil() as usize + 1;
        for _ in 0..ticks {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.world.level_index, Some(1));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_won_level_ignores_later_hits() {
        // Goal and spike overlap the same spot; the goal comes first in load order
        let mut state = state_from(
            r#"[
                { "id": 1, "name": "Both", "width": 1000, "height": 600,
                  "playerStart": { "x": 100, "y": 452 },
                  "entities": [
                    { "type": "platform", "x": 0, "y": 500, "width": 1000, "height": 100 },
                    { "type": "goal", "x": 100, "y": 436, "width": 32, "height": 64 },
                    { "type": "enemy", "x": 100, "y": 468, "width": 32, "height": 32,
                      "properties": { "enemyType": "tickspike", "range": 0 } }
                  ] },
                { "id": 2, "name": "Next", "width": 1000, "height": 600,
                  "playerStart": { "x": 100, "y": 452 } }
            ]"#,
        );
        state.world.required_gears = 0;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert_eq!(state.player().lives, STARTING_LIVES);
    }

    #[test]
    fn test_won_level_skips_fall_out() {
        let mut state = state_from(
            r#"[
                { "id": 1, "name": "Edge", "width": 1000, "height": 600,
                  "playerStart": { "x": 100, "y": 590 },
                  "entities": [
                    { "type": "goal", "x": 100, "y": 570, "width": 32, "height": 64 }
                  ] },
                { "id": 2, "name": "Next", "width": 1000, "height": 600,
                  "playerStart": { "x": 100, "y": 452 } }
            ]"#,
        );
        state.world.required_gears = 0;
        state.world.player.vel.y = 600.0;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.player().pos.y > state.world.height);
        assert_eq!(state.phase, GamePhase::LevelComplete);
        assert_eq!(state.player().lives, STARTING_LIVES);
    }

    const WALLED_LEVEL: &str = r#"[
        { "id": 1, "name": "Walls", "width": 640, "height": 600,
          "playerStart": { "x": 300, "y": 452 },
          "entities": [
            { "type": "platform", "x": 0, "y": 500, "width": 640, "height": 100 },
            { "type": "platform", "x": 0, "y": 300, "width": 24, "height": 200 },
            { "type": "platform", "x": 616, "y": 300, "width": 24, "height": 200 },
            { "type": "movingPlatform", "x": 40, "y": 400, "width": 96, "height": 16,
              "properties": { "endX": 500, "speed": 200 } }
          ] }
    ]"#;

    proptest! {
        #[test]
        fn prop_position_stays_in_world_through_ticks(
            inputs in proptest::collection::vec(
                (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()),
                1..300,
            ),
        ) {
            let mut state = state_from(WALLED_LEVEL);
            for (left, right, jump_held, jump_pressed, dash_pressed) in inputs {
                let input = TickInput {
                    left,
                    right,
                    jump_held,
                    jump_pressed: jump_pressed && jump_held,
                    dash_pressed,
                    pause_pressed: false,
                };
                tick(&mut state, &input, SIM_DT);
                let max_x = state.world.width - state.player().size.x;
                prop_assert!(state.player().pos.x >= 0.0);
                prop_assert!(state.player().pos.x <= max_x);
            }
        }
    }
}
