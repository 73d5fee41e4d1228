//! Player-versus-world collision detection and response
//!
//! Runs in three passes each tick:
//! 1. grounding against platform tops (feet sensor), with moving-platform carry
//! 2. side/ceiling push-out along the axis of least penetration
//! 3. trigger contacts with enemies, gears, traps, the goal and checkpoints
//!
//! The resolver only touches physical state (positions, velocities, entity
//! flags). Score, lives and gears are reported back as [`Contact`]s and
//! applied by the game state through its own methods.

use super::arena::EntityArena;
use super::entity::EntityKind;
use super::player::Player;
use crate::consts::{LANDING_TOLERANCE, STOMP_BONUS, STOMP_BOUNCE_VELOCITY};

/// Outcome of a trigger contact that affects counters or progression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    /// Enemy destroyed from above
    Stomped { points: u64 },
    /// Enemy side hit or trap
    Hurt { damage: u32 },
    /// Gear picked up
    Gear { points: u64 },
    /// Unlocked goal touched
    GoalReached,
    /// Checkpoint touched for the first time
    Checkpoint,
}

/// Resolve all player collisions for one tick
pub fn resolve_collisions(
    player: &mut Player,
    entities: &mut EntityArena,
    required_gears: u32,
) -> Vec<Contact> {
    ground_player(player, entities);
    push_out_of_platforms(player, entities);
    dispatch_contacts(player, entities, required_gears)
}

/// Snap the player onto the highest platform under its feet
fn ground_player(player: &mut Player, entities: &EntityArena) {
    if player.vel.y < 0.0 {
        return;
    }
    let feet = player.feet();

    let support = entities
        .iter()
        .filter(|e| e.active && e.is_solid())
        .filter(|e| {
            let bounds = e.bounds();
            feet.overlaps(&bounds) && player.prev_bottom <= bounds.top() + LANDING_TOLERANCE
        })
        .min_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    if let Some(platform) = support {
        player.land_on(platform.bounds().top());
        if let EntityKind::MovingPlatform(path) = &platform.kind {
            player.pos.x += path.delta.x;
        }
    }
}

/// Push the player out of any platform it still overlaps
fn push_out_of_platforms(player: &mut Player, entities: &EntityArena) {
    for platform in entities.iter().filter(|e| e.active && e.is_solid()) {
        let bounds = platform.bounds();
        let Some(pen) = player.bounds().penetration(&bounds) else {
            continue;
        };

        let player_center = player.center();
        let platform_center = bounds.center();
        if pen.x < pen.y {
            if player_center.x < platform_center.x {
                player.pos.x -= pen.x;
            } else {
                player.pos.x += pen.x;
            }
            player.vel.x = 0.0;
        } else if player_center.y < platform_center.y {
            player.land_on(bounds.top());
        } else {
            // Head hit the underside
            player.pos.y += pen.y;
            if player.vel.y < 0.0 {
                player.vel.y = 0.0;
            }
        }
    }
}

fn dispatch_contacts(
    player: &mut Player,
    entities: &mut EntityArena,
    required_gears: u32,
) -> Vec<Contact> {
    let mut contacts = Vec::new();

    for entity in entities.iter_mut() {
        if entity.is_solid() || !entity.is_tangible() {
            continue;
        }
        if !player.bounds().overlaps(&entity.bounds()) {
            continue;
        }

        let entity_top = entity.pos.y;
        match &mut entity.kind {
            EntityKind::Enemy(enemy) => {
                // Stomp: falling and above the enemy. Glancing side hits near
                // platform edges can still qualify.
                if player.vel.y > 0.0 && player.pos.y < entity_top {
                    entity.active = false;
                    player.bounce(STOMP_BOUNCE_VELOCITY);
                    log::debug!("Stomped {}", enemy.kind.as_str());
                    contacts.push(Contact::Stomped {
                        points: STOMP_BONUS,
                    });
                } else {
                    contacts.push(Contact::Hurt {
                        damage: enemy.damage,
                    });
                }
            }
            EntityKind::Collectible(gear) => {
                if gear.collect() {
                    entity.active = false;
                    contacts.push(Contact::Gear {
                        points: gear.points,
                    });
                }
            }
            EntityKind::Trap(trap) => {
                player.vel.x *= trap.damping;
                contacts.push(Contact::Hurt {
                    damage: trap.damage,
                });
            }
            EntityKind::Goal(_) => {
                if player.gears >= required_gears {
                    contacts.push(Contact::GoalReached);
                }
            }
            EntityKind::Checkpoint(checkpoint) => {
                // Respawn standing on the same floor as the checkpoint post
                let bottom = entity.pos.y + entity.size.y;
                player.set_checkpoint(glam::Vec2::new(entity.pos.x, bottom - player.size.y));
                if checkpoint.activate() {
                    contacts.push(Contact::Checkpoint);
                }
            }
            EntityKind::Platform | EntityKind::MovingPlatform(_) => {}
        }
    }

    contacts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::enemy::{Enemy, EnemyKind, MovementPattern};
    use crate::sim::entity::{Entity, WorldView};
    use glam::Vec2;

    fn spike_at(pos: Vec2) -> Entity {
        Entity::enemy(
            Vec2::new(32.0, 32.0),
            Enemy::new(
                EnemyKind::Tickspike,
                pos,
                MovementPattern::Horizontal {
                    speed: 0.0,
                    range: 0.0,
                    phase: 0.0,
                },
                1,
            ),
        )
    }

    #[test]
    fn test_lands_on_platform() {
        let mut entities = EntityArena::new();
        entities.insert(Entity::platform(Vec2::new(0.0, 200.0), Vec2::new(400.0, 32.0)));
        let mut player = Player::new(Vec2::new(50.0, 150.0));
        player.prev_bottom = 198.0;
        player.pos.y = 153.0; // bottom 201, sunk 1px
        player.vel.y = 180.0;

        resolve_collisions(&mut player, &mut entities, 3);
        assert!(player.grounded);
        assert_eq!(player.vel.y, 0.0);
        assert!((player.pos.y + player.size.y - 200.0).abs() < 1e-4);
    }

    #[test]
    fn test_rising_player_is_not_grounded() {
        let mut entities = EntityArena::new();
        entities.insert(Entity::platform(Vec2::new(0.0, 200.0), Vec2::new(400.0, 32.0)));
        let mut player = Player::new(Vec2::new(50.0, 150.0));
        player.pos.y = 152.5;
        player.vel.y = -300.0;

        resolve_collisions(&mut player, &mut entities, 3);
        assert!(!player.grounded || player.vel.y == 0.0);
        assert!(player.pos.y + player.size.y <= 200.0 + 1e-4);
    }

    #[test]
    fn test_side_push_zeroes_horizontal_velocity() {
        let mut entities = EntityArena::new();
        // Wall to the right
        entities.insert(Entity::platform(Vec2::new(100.0, 0.0), Vec2::new(50.0, 400.0)));
        let mut player = Player::new(Vec2::new(72.0, 100.0));
        player.prev_bottom = player.pos.y + player.size.y;
        player.vel.x = 200.0;

        resolve_collisions(&mut player, &mut entities, 3);
        assert!((player.pos.x + player.size.x - 100.0).abs() < 1e-4);
        assert_eq!(player.vel.x, 0.0);
    }

    #[test]
    fn test_ceiling_bump_stops_rise() {
        let mut entities = EntityArena::new();
        entities.insert(Entity::platform(Vec2::new(0.0, 0.0), Vec2::new(400.0, 100.0)));
        let mut player = Player::new(Vec2::new(100.0, 96.0));
        player.vel.y = -400.0;

        resolve_collisions(&mut player, &mut entities, 3);
        assert!((player.pos.y - 100.0).abs() < 1e-4);
        assert_eq!(player.vel.y, 0.0);
    }

    #[test]
    fn test_stomp_destroys_enemy() {
        let mut entities = EntityArena::new();
        let spike = entities.insert(spike_at(Vec2::new(100.0, 200.0)));
        let mut player = Player::new(Vec2::new(100.0, 160.0)); // bottom 208 overlaps
        player.vel.y = 300.0;

        let contacts = resolve_collisions(&mut player, &mut entities, 3);
        assert_eq!(contacts, vec![Contact::Stomped { points: STOMP_BONUS }]);
        assert!(!entities.get(spike).unwrap().active);
        assert_eq!(player.vel.y, STOMP_BOUNCE_VELOCITY);
        assert!(!player.jump_cut_armed);
    }

    #[test]
    fn test_side_hit_hurts() {
        let mut entities = EntityArena::new();
        entities.insert(spike_at(Vec2::new(120.0, 200.0)));
        let mut player = Player::new(Vec2::new(100.0, 190.0));
        player.vel.y = 0.0;

        let contacts = resolve_collisions(&mut player, &mut entities, 3);
        assert_eq!(contacts, vec![Contact::Hurt { damage: 1 }]);
    }

    #[test]
    fn test_intangible_shadow_is_ignored() {
        let mut entities = EntityArena::new();
        let mut shadow = Entity::enemy(
            Vec2::new(32.0, 32.0),
            Enemy::new(
                EnemyKind::Cuckooshadow,
                Vec2::new(100.0, 200.0),
                MovementPattern::Visibility {
                    period: 2.0,
                    duty: 0.5,
                    phase: 0.0,
                },
                1,
            ),
        );
        shadow.update(&WorldView {
            elapsed: 1.5,
            dt: SIM_DT,
            gears: 0,
            required_gears: 3,
        });
        entities.insert(shadow);
        let mut player = Player::new(Vec2::new(100.0, 190.0));

        assert!(resolve_collisions(&mut player, &mut entities, 3).is_empty());
    }

    #[test]
    fn test_gear_collects_once() {
        let mut entities = EntityArena::new();
        let gear = entities.insert(Entity::gear(Vec2::new(100.0, 100.0), Vec2::new(16.0, 16.0), 100));
        let mut player = Player::new(Vec2::new(95.0, 90.0));

        let first = resolve_collisions(&mut player, &mut entities, 3);
        assert_eq!(first, vec![Contact::Gear { points: 100 }]);
        assert!(!entities.get(gear).unwrap().active);

        let second = resolve_collisions(&mut player, &mut entities, 3);
        assert!(second.is_empty());
    }

    #[test]
    fn test_trap_damps_and_hurts() {
        let mut entities = EntityArena::new();
        entities.insert(Entity::trap(Vec2::new(100.0, 100.0), Vec2::new(32.0, 16.0), 1));
        let mut player = Player::new(Vec2::new(90.0, 70.0));
        player.vel.x = 200.0;

        let contacts = resolve_collisions(&mut player, &mut entities, 3);
        assert_eq!(contacts, vec![Contact::Hurt { damage: 1 }]);
        assert!((player.vel.x - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_goal_requires_gears() {
        let mut entities = EntityArena::new();
        entities.insert(Entity::goal(Vec2::new(100.0, 100.0), Vec2::new(32.0, 64.0)));
        let mut player = Player::new(Vec2::new(100.0, 100.0));

        player.gears = 2;
        assert!(resolve_collisions(&mut player, &mut entities, 3).is_empty());
        player.gears = 3;
        assert_eq!(
            resolve_collisions(&mut player, &mut entities, 3),
            vec![Contact::GoalReached]
        );
    }

    #[test]
    fn test_checkpoint_sets_respawn() {
        let mut entities = EntityArena::new();
        entities.insert(Entity::checkpoint(Vec2::new(300.0, 236.0), Vec2::new(16.0, 64.0)));
        let mut player = Player::new(Vec2::new(295.0, 250.0));

        let contacts = resolve_collisions(&mut player, &mut entities, 3);
        assert_eq!(contacts, vec![Contact::Checkpoint]);
        assert_eq!(player.checkpoint, Vec2::new(300.0, 300.0 - PLAYER_HEIGHT));

        assert!(resolve_collisions(&mut player, &mut entities, 3).is_empty());
    }
}
