//! Damage and scoring for a single impact

use super::state::Player;
use super::vector::Vec3;
use crate::consts::TANK_SIZE;

/// Damage dealt to one tank
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub victim: usize,
    pub damage: f32,
    pub killed: bool,
}

/// Damage a blast of `weapon_size` deals at `distance` from a tank center
///
/// Zero outside `weapon_size + TANK_SIZE`. Falloff uses the distance to the
/// tank's hull, never below 1.
pub fn blast_damage(distance: f32, weapon_size: f32, hit_points: f32) -> f32 {
    if !(distance < weapon_size + TANK_SIZE) || hit_points <= 0.0 {
        return 0.0;
    }
    let effective = (distance - TANK_SIZE).max(1.0);
    (weapon_size * weapon_size / (effective * effective)).min(hit_points)
}

/// Apply an impact to every living tank and settle scores
///
/// The shooter scores the damage it deals to others plus `kill_bonus` per
/// kill. Damage a shooter does to itself is split evenly between the other
/// surviving players' scores instead.
pub fn resolve_damage(
    players: &mut [Player],
    shooter: usize,
    impact: Vec3,
    weapon_size: f32,
    kill_bonus: i64,
) -> Vec<Hit> {
    let mut hits = Vec::new();
    let mut self_damage = 0.0;

    for victim in 0..players.len() {
        let player = &mut players[victim];
        if !player.is_alive() {
            continue;
        }
        let Some(tank) = player.tank else {
            continue;
        };
        let distance = tank.position.distance(impact);
        let damage = blast_damage(distance, weapon_size, player.hit_points);
        if damage <= 0.0 {
            continue;
        }

        player.hit_points = (player.hit_points - damage).max(0.0);
        player.stats.damage_taken += damage;
        let killed = !player.is_alive();
        hits.push(Hit {
            victim,
            damage,
            killed,
        });
        log::debug!(
            "Player {} took {:.1} damage at {:.1} ({:.1} hp left)",
            victim,
            damage,
            distance,
            player.hit_points
        );

        if victim == shooter {
            self_damage += damage;
            continue;
        }
        if let Some(attacker) = players.get_mut(shooter) {
            attacker.score += damage.round() as i64;
            attacker.stats.hits += 1;
            attacker.stats.damage_dealt += damage;
            if killed {
                attacker.score += kill_bonus;
                attacker.stats.kills += 1;
            }
        }
    }

    if self_damage > 0.0 {
        let others: Vec<usize> = (0..players.len())
            .filter(|&i| i != shooter && players[i].is_alive())
            .collect();
        if !others.is_empty() {
            let share = (self_damage / others.len() as f32).round() as i64;
            for i in others {
                players[i].score += share;
            }
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Tank;
    use proptest::prelude::*;

    fn player_at(index: usize, pos: Vec3) -> Player {
        let mut player = Player::new(index, 0, 100.0);
        player.tank = Some(Tank::new(pos));
        player
    }

    #[test]
    fn test_blast_damage_falloff() {
        // Inside the hull: effective distance floors at 1
        assert_eq!(blast_damage(0.0, 5.0, 100.0), 25.0);
        assert_eq!(blast_damage(11.0, 5.0, 100.0), 25.0);
        // 2 units past the hull
        assert_eq!(blast_damage(12.0, 6.0, 100.0), 9.0);
        // Out of range
        assert_eq!(blast_damage(15.0, 5.0, 100.0), 0.0);
        // Capped at remaining hit points
        assert_eq!(blast_damage(0.0, 50.0, 30.0), 30.0);
    }

    #[test]
    fn test_shooter_scores_damage_and_kill_bonus() {
        let mut players = vec![
            player_at(0, Vec3::new(0.0, 0.0, 0.0)),
            player_at(1, Vec3::new(100.0, 0.0, 0.0)),
        ];
        players[1].hit_points = 20.0;
        let hits = resolve_damage(&mut players, 0, Vec3::new(100.0, 0.0, 0.0), 10.0, 500);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].killed);
        assert_eq!(players[1].hit_points, 0.0);
        assert_eq!(players[0].score, 20 + 500);
        assert_eq!(players[0].stats.kills, 1);
    }

    #[test]
    fn test_self_damage_credits_others() {
        let mut players = vec![
            player_at(0, Vec3::new(0.0, 0.0, 0.0)),
            player_at(1, Vec3::new(300.0, 0.0, 0.0)),
            player_at(2, Vec3::new(0.0, 300.0, 0.0)),
        ];
        // 36 damage to self: split between the two others
        resolve_damage(&mut players, 0, Vec3::ZERO, 6.0, 500);
        assert_eq!(players[0].hit_points, 64.0);
        assert_eq!(players[0].score, 0);
        assert_eq!(players[1].score, 18);
        assert_eq!(players[2].score, 18);
    }

    #[test]
    fn test_dead_tanks_are_skipped() {
        let mut players = vec![player_at(0, Vec3::ZERO), player_at(1, Vec3::new(1.0, 0.0, 0.0))];
        players[1].hit_points = 0.0;
        let hits = resolve_damage(&mut players, 0, Vec3::new(1.0, 0.0, 0.0), 10.0, 500);
        assert!(hits.iter().all(|h| h.victim != 1));
    }

    proptest! {
        #[test]
        fn prop_damage_never_exceeds_hit_points(
            distance in 0.0f32..200.0,
            size in 0.0f32..80.0,
            hp in 0.0f32..2000.0,
        ) {
            let damage = blast_damage(distance, size, hp);
            prop_assert!(damage >= 0.0);
            prop_assert!(damage <= hp);
            prop_assert!(hp - damage >= 0.0);
        }

        #[test]
        fn prop_hit_points_stay_non_negative(
            x in -50.0f32..50.0,
            y in -50.0f32..50.0,
            size in 0.0f32..80.0,
            hp in 0.0f32..500.0,
        ) {
            let mut players = vec![player_at(0, Vec3::new(-20.0, 0.0, 0.0)), player_at(1, Vec3::new(20.0, 0.0, 0.0))];
            players[0].hit_points = hp;
            players[1].hit_points = hp;
            resolve_damage(&mut players, 0, Vec3::new(x, y, 0.0), size, 100);
            for p in &players {
                prop_assert!(p.hit_points >= 0.0);
            }
        }
    }
}
