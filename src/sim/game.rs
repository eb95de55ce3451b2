//! Match state machine
//!
//! `MatchState` owns the board and every player and is the only writer of
//! the terrain grids. A round is active until a shot leaves at most one tank
//! standing; the next round then starts immediately on fresh terrain.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::damage::resolve_damage;
use super::explosion::apply_explosion;
use super::heightfield::{Channel, check_dimensions};
use super::state::{AiHandle, FireResult, GameBoard, Player, ShotRecord, Tank, Wind};
use super::terrain::{choose_tank_sites, flatten_circle, generate, surface_normal};
use super::trajectory::integrate;
use super::vector::{Vec3, containing_cell};
use super::weapons::{Weapon, default_weapons, lookup};
use crate::config::GameConfig;
use crate::consts::ROUND_BONUS;
use crate::error::SimError;
use crate::highscores::{HighScoreEntry, RoundConfig};

/// The simulation core: board, players, weapons and RNG
#[derive(Debug, Clone)]
pub struct MatchState {
    config: GameConfig,
    board: GameBoard,
    weapons: Vec<Weapon>,
    round_config: RoundConfig,
    rng: Pcg32,
}

impl MatchState {
    /// Create an empty match; call `start_match` before playing
    pub fn new(config: GameConfig) -> Self {
        Self::with_weapons(config, default_weapons())
    }

    /// Create an empty match with a custom weapon catalogue
    pub fn with_weapons(config: GameConfig, weapons: Vec<Weapon>) -> Self {
        Self {
            board: GameBoard::new(config.board_size, config.elevation_scale),
            rng: Pcg32::seed_from_u64(config.seed),
            round_config: RoundConfig::default(),
            weapons,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &GameBoard {
        &self.board
    }

    /// Mutable board access for hosts restoring a saved or networked state
    pub fn board_mut(&mut self) -> &mut GameBoard {
        &mut self.board
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    /// Set up a fresh match and start its first round
    ///
    /// Humans come first, then AIs. `names` is matched to players in that
    /// order; missing or empty entries get the default name. The RNG is
    /// reseeded, so repeating the call with the same config repeats the match.
    pub fn start_match(
        &mut self,
        num_humans: usize,
        num_ais: usize,
        num_rounds: u32,
        names: &[String],
        starting_credit: i64,
    ) -> Result<(), SimError> {
        self.config.num_rounds = num_rounds;
        self.config.starting_credit = starting_credit;
        self.rng = Pcg32::seed_from_u64(self.config.seed);
        self.round_config = RoundConfig {
            num_humans,
            num_ais,
            num_rounds,
            board_size: self.config.board_size,
        };

        let mut board = GameBoard::new(self.config.board_size, self.config.elevation_scale);
        board.total_rounds = num_rounds;
        board.current_round = 1;
        board.players = (0..num_humans + num_ais)
            .map(|i| {
                let mut player = Player::new(i, starting_credit, self.config.hit_points);
                if let Some(name) = names.get(i).filter(|n| !n.is_empty()) {
                    player.name = name.clone();
                    player.did_set_name = true;
                }
                if i >= num_humans {
                    player.ai = Some(AiHandle::default());
                }
                player
            })
            .collect();
        self.board = board;

        log::info!(
            "Match start: {} humans, {} AIs, {} rounds",
            num_humans,
            num_ais,
            num_rounds
        );
        self.start_round()
    }

    /// Regenerate terrain, redraw wind, re-place tanks and heal everyone
    pub fn start_round(&mut self) -> Result<(), SimError> {
        let size = self.config.board_size;
        self.board.surface = generate(
            size,
            self.config.min_elevation,
            self.config.max_elevation,
            self.config.elevation_scale,
            &mut self.rng,
        )?;
        // Fresh terrain means fresh ground cover, sized with the new field
        self.board.material.set_size(size, size);
        self.board.board_size = size;

        let max_wind = self.config.max_wind.max(0.0);
        self.board.wind = Wind {
            speed: if max_wind > 0.0 { self.rng.random_range(0.0..=max_wind) } else { 0.0 },
            direction: self.rng.random_range(0.0..360.0),
        };

        self.place_tanks(self.config.tank_margin, self.config.min_tank_separation);

        for player in &mut self.board.players {
            player.hit_points = self.config.hit_points;
            player.prev_trajectory.clear();
            if let Some(ai) = &mut player.ai {
                ai.reset();
            }
        }
        self.board.current_player = 0;

        log::info!(
            "Round {}/{} started: wind {:.1} m/s at {:.0} degrees",
            self.board.current_round,
            self.board.total_rounds,
            self.board.wind.speed,
            self.board.wind.direction
        );
        Ok(())
    }

    /// Place every player's tank on a flattened pad
    pub fn place_tanks(&mut self, margin: f32, min_separation: f32) {
        let sites = choose_tank_sites(
            self.board.players.len(),
            self.board.board_size,
            margin,
            min_separation,
            &mut self.rng,
        );

        let flatten_radius = self.config.flatten_radius;
        for (player, &(x, y)) in self.board.players.iter_mut().zip(&sites) {
            let position = Vec3::new(x, y, 0.0);
            let (cx, cy) = containing_cell(position);
            flatten_circle(&mut self.board.surface, cx, cy, flatten_radius);

            // Keep the previous round's aim
            let mut tank = player.tank.unwrap_or_else(|| Tank::new(position));
            tank.position = position;
            player.tank = Some(tank);
        }

        // Later pads may overlap earlier ones
        self.settle_tanks();
    }

    /// Put every tank back on the surface under it
    fn settle_tanks(&mut self) {
        let surface = &self.board.surface;
        for player in &mut self.board.players {
            if let Some(tank) = &mut player.tank {
                let (cx, cy) = containing_cell(tank.position);
                let ground = surface.get(cx, cy);
                if ground >= 0.0 {
                    tank.position.z = ground;
                }
            }
        }
    }

    pub fn get_tank(&self, player_id: usize) -> Result<Tank, SimError> {
        self.board.player(player_id)?.tank(player_id).copied()
    }

    /// Elevation at a cell, or -1 off the board
    pub fn get_elevation(&self, x: i32, y: i32) -> f32 {
        self.board.surface.get(x, y)
    }

    pub fn get_normal(&self, x: i32, y: i32) -> Vec3 {
        surface_normal(&self.board.surface, x, y, self.config.normal_offset)
    }

    fn current_mut(&mut self) -> Result<&mut Player, SimError> {
        let id = self.board.current_player;
        self.board.player_mut(id)
    }

    /// Aim the current player's tank (azimuth wraps, altitude clamps)
    pub fn set_tank_aim(&mut self, azimuth: f32, altitude: f32) -> Result<(), SimError> {
        let id = self.board.current_player;
        self.current_mut()?.tank_mut(id)?.aim(azimuth, altitude);
        Ok(())
    }

    /// Set the current player's launch speed, clamped to [0, max_power]
    pub fn set_tank_power(&mut self, power: f32) -> Result<(), SimError> {
        let id = self.board.current_player;
        let max_power = self.config.max_power;
        self.current_mut()?.tank_mut(id)?.set_power(power, max_power);
        Ok(())
    }

    /// Choose the current player's weapon; the size is clamped to the weapon
    pub fn select_weapon(&mut self, weapon_id: usize, size_id: usize) -> Result<(), SimError> {
        let size_count = self
            .weapons
            .get(weapon_id)
            .map(|w| w.sizes.len())
            .filter(|&n| n > 0)
            .ok_or(SimError::InvalidWeapon {
                weapon: weapon_id,
                size: size_id,
            })?;
        let player = self.current_mut()?;
        player.weapon_id = weapon_id;
        player.weapon_size_id = size_id.min(size_count - 1);
        Ok(())
    }

    pub fn set_targeting_computer(&mut self, enabled: bool) -> Result<(), SimError> {
        self.current_mut()?.use_targeting_computer = enabled;
        Ok(())
    }

    /// Record that the aim assist already solved the current player's shot
    ///
    /// The solver lives in the presentation layer. A solved shot is billed
    /// the computer surcharge even if the request flag was turned off.
    pub fn mark_computer_used(&mut self) -> Result<(), SimError> {
        self.current_mut()?.used_computer = true;
        Ok(())
    }

    /// Rename the current player; an empty name restores the default
    pub fn set_player_name(&mut self, name: &str) -> Result<(), SimError> {
        let id = self.board.current_player;
        let player = self.current_mut()?;
        if name.is_empty() {
            player.name = Player::default_name(id);
            player.did_set_name = false;
        } else {
            player.name = name.to_string();
            player.did_set_name = true;
        }
        Ok(())
    }

    /// Points the player's next shot will cost
    pub fn shot_cost(&self, player_id: usize) -> Result<i64, SimError> {
        let player = self.board.player(player_id)?;
        let (_, size) = lookup(&self.weapons, player.weapon_id, player.weapon_size_id)?;
        let surcharge = if player.computer_engaged() { self.config.computer_cost } else { 0 };
        Ok(size.cost + surcharge)
    }

    /// Store a shot outcome in an AI player's per-round memory
    pub fn record_ai_shot(&mut self, player_id: usize, shot: ShotRecord) -> Result<(), SimError> {
        if let Some(ai) = &mut self.board.player_mut(player_id)?.ai {
            ai.record(shot);
        }
        Ok(())
    }

    /// Resolve one shot by the current player
    ///
    /// Charges the shot, flies it, deforms the terrain, applies damage,
    /// ends the round if at most one tank survives, and hands the turn to
    /// the next living player. Returns everything needed to animate it.
    pub fn fire(&mut self, muzzle_pos: Vec3, muzzle_vel: Vec3) -> Result<FireResult, SimError> {
        if self.board.living_players() == 0 {
            return Err(SimError::NoLivingPlayers);
        }
        check_dimensions(&self.board.surface, &self.board.material)?;

        let shooter = self.board.current_player;
        let cost = self.shot_cost(shooter)?;
        let (radius, style) = {
            let player = self.board.player(shooter)?;
            let (weapon, size) = lookup(&self.weapons, player.weapon_id, player.weapon_size_id)?;
            (size.size, weapon.style)
        };

        // Pay for the shot; any shortfall comes out of score
        {
            let player = self.board.player_mut(shooter)?;
            if cost > player.credit {
                player.score -= cost - player.credit;
                player.credit = 0;
            } else {
                player.credit -= cost;
            }
            player.stats.points_spent += cost;
            player.stats.shots_fired += 1;
        }

        // Fly
        let targets: Vec<Vec3> = self
            .board
            .players
            .iter()
            .filter(|p| p.is_alive())
            .filter_map(|p| p.tank.map(|t| t.position))
            .collect();
        let time_step = self.config.time_step;
        let trajectory = integrate(
            muzzle_pos,
            muzzle_vel,
            self.board.wind.vector(),
            &self.board.surface,
            &targets,
            time_step,
        );
        let impact = trajectory.impact();
        {
            let player = self.board.player_mut(shooter)?;
            player.prev_trajectory = trajectory.samples.clone();
            player.use_targeting_computer = false;
            player.used_computer = false;
        }

        // Deform
        let old = self.board.surface.snapshot(Channel::Elevation);
        let old_material = self.board.material.clone();
        let snapshots = apply_explosion(
            &mut self.board.surface,
            &mut self.board.material,
            impact,
            radius,
            style,
        )?;
        self.board.surface.clear_scratch();
        let final_surface = self.board.surface.snapshot(Channel::Elevation);
        let final_material = self.board.material.clone();

        // Damage
        let hits = resolve_damage(
            &mut self.board.players,
            shooter,
            impact,
            radius,
            self.config.kill_bonus,
        );
        log::debug!(
            "Player {} fired {} (r={}) landing at ({:.1}, {:.1}, {:.1}): {} hits",
            shooter,
            style.as_str(),
            radius,
            impact.x,
            impact.y,
            impact.z,
            hits.len()
        );

        // Round end
        let new_round = self.board.living_players() <= 1;
        let mut round_winner = None;
        if new_round {
            round_winner = self
                .board
                .players
                .iter()
                .find(|p| p.is_alive())
                .map(|p| p.name.clone());
            log::info!(
                "Round {} over, winner: {}",
                self.board.current_round,
                round_winner.as_deref().unwrap_or("nobody")
            );
            for player in &mut self.board.players {
                if player.score > 0 {
                    player.score = (player.score as f64 * ROUND_BONUS).round() as i64;
                }
                player.prev_trajectory.clear();
            }
            self.board.current_round += 1;
            self.start_round()?;
        } else {
            self.settle_tanks();
        }

        self.demote_unaffordable_weapon(shooter);

        if !new_round {
            self.advance_player();
        }

        Ok(FireResult {
            player_id: shooter,
            time_step,
            trajectory: trajectory.samples,
            explosion_radius: radius,
            weapon_style: style,
            old,
            top: snapshots.top,
            middle: snapshots.middle,
            bottom: snapshots.bottom,
            final_surface,
            old_material,
            top_material: snapshots.top_material,
            bottom_material: snapshots.bottom_material,
            final_material,
            new_round,
            round_winner,
        })
    }

    /// Step the selection down until the player can pay for it
    fn demote_unaffordable_weapon(&mut self, player_id: usize) {
        let computer_cost = self.config.computer_cost;
        let Some(player) = self.board.players.get_mut(player_id) else {
            return;
        };
        let points = player.available_points();
        let surcharge = if player.computer_engaged() { computer_cost } else { 0 };

        let Some(weapon) = self.weapons.get(player.weapon_id).filter(|w| !w.sizes.is_empty()) else {
            player.weapon_id = 0;
            player.weapon_size_id = 0;
            return;
        };
        let mut size_id = player.weapon_size_id.min(weapon.sizes.len() - 1);
        while size_id > 0 && weapon.sizes[size_id].cost + surcharge > points {
            size_id -= 1;
        }
        if weapon.sizes[size_id].cost + surcharge > points && player.weapon_id != 0 {
            log::debug!("Player {} can't afford {}, back to base weapon", player_id, weapon.name);
            player.weapon_id = 0;
            size_id = 0;
        }
        player.weapon_size_id = size_id;
    }

    /// Hand the turn to the next living player, wrapping around
    fn advance_player(&mut self) {
        let count = self.board.players.len();
        if count == 0 {
            return;
        }
        let start = self.board.current_player;
        for offset in 1..=count {
            let candidate = (start + offset) % count;
            if self.board.players[candidate].is_alive() {
                self.board.current_player = candidate;
                return;
            }
        }
    }

    /// All configured rounds have been played
    pub fn is_match_over(&self) -> bool {
        self.board.current_round > self.board.total_rounds
    }

    /// Highest-scoring player (first one on ties)
    pub fn winner(&self) -> Option<&Player> {
        self.board
            .players
            .iter()
            .reduce(|best, p| if p.score > best.score { p } else { best })
    }

    /// One high score record per human player, for the persistence layer
    ///
    /// Computer players never enter the leaderboard.
    pub fn high_score_entries(&self, timestamp: f64) -> Vec<HighScoreEntry> {
        self.board
            .players
            .iter()
            .filter(|p| !p.is_ai())
            .map(|p| HighScoreEntry {
                name: p.name.clone(),
                score: p.score,
                timestamp,
                config: self.round_config.clone(),
                stats: p.stats.clone(),
            })
            .collect()
    }
}
