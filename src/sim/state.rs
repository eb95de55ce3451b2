//! Match state types
//!
//! Players, tanks and the board are mutated only through `MatchState`.
//! `FireResult` is produced once per shot and never touched again.

use serde::{Deserialize, Serialize};

use super::heightfield::{HeightField, MaterialGrid};
use super::vector::{Vec3, wind_vector};
use super::weapons::WeaponStyle;
use crate::consts::{BARREL_LENGTH, MUZZLE_HEIGHT};
use crate::error::SimError;
use crate::{aim_to_direction, clamp_altitude, normalize_azimuth};

/// A tank's pose and aim
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    /// Model-space position (x/y cell coordinates, z elevation)
    pub position: Vec3,
    /// Degrees in [0, 360)
    pub azimuth: f32,
    /// Degrees in [0, 180]
    pub altitude: f32,
    /// Launch speed (m/s) in [0, max_power]
    pub velocity: f32,
}

impl Tank {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            azimuth: 0.0,
            altitude: 45.0,
            velocity: 20.0,
        }
    }

    /// Set aim, normalizing azimuth and clamping altitude
    pub fn aim(&mut self, azimuth: f32, altitude: f32) {
        self.azimuth = normalize_azimuth(azimuth);
        self.altitude = clamp_altitude(altitude);
    }

    /// Set launch speed, clamped to [0, max_power]
    pub fn set_power(&mut self, power: f32, max_power: f32) {
        self.velocity = if power.is_nan() { 0.0 } else { power.clamp(0.0, max_power.max(0.0)) };
    }

    /// Unit vector along the barrel
    pub fn aim_direction(&self) -> Vec3 {
        aim_to_direction(self.azimuth, self.altitude)
    }

    /// Launch velocity for the current aim and power
    pub fn muzzle_velocity(&self) -> Vec3 {
        self.aim_direction() * self.velocity
    }

    /// Tip of the barrel in model space
    pub fn muzzle_position(&self) -> Vec3 {
        self.position + Vec3::new(0.0, 0.0, MUZZLE_HEIGHT) + self.aim_direction() * BARREL_LENGTH
    }
}

/// Per-player running totals, reported with high scores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub shots_fired: u32,
    pub hits: u32,
    pub kills: u32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub points_spent: i64,
}

/// A shot as seen by an AI collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub azimuth: f32,
    pub altitude: f32,
    pub velocity: f32,
    pub impact: Vec3,
}

/// Marks a player as computer-controlled and holds its per-round memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiHandle {
    /// Shots fed back by the presentation layer this round
    pub history: Vec<ShotRecord>,
}

impl AiHandle {
    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn record(&mut self, shot: ShotRecord) {
        self.history.push(shot);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// `None` until the first round places it
    pub tank: Option<Tank>,
    pub name: String,
    /// Whether the player chose `name` (vs. the default)
    pub did_set_name: bool,
    pub credit: i64,
    /// May go negative
    pub score: i64,
    pub weapon_id: usize,
    pub weapon_size_id: usize,
    /// Floors at 0
    pub hit_points: f32,
    /// `Some` for computer players
    pub ai: Option<AiHandle>,
    /// Path of the most recent shot, kept for replay
    pub prev_trajectory: Vec<Vec3>,
    /// Targeting computer requested for the next shot
    pub use_targeting_computer: bool,
    /// Aim assist already solved the next shot (set by the presentation
    /// layer through `MatchState::mark_computer_used`)
    pub used_computer: bool,
    pub stats: PlayerStats,
}

impl Player {
    pub fn new(index: usize, credit: i64, hit_points: f32) -> Self {
        Self {
            tank: None,
            name: Self::default_name(index),
            did_set_name: false,
            credit,
            score: 0,
            weapon_id: 0,
            weapon_size_id: 0,
            hit_points,
            ai: None,
            prev_trajectory: Vec::new(),
            use_targeting_computer: false,
            used_computer: false,
            stats: PlayerStats::default(),
        }
    }

    pub fn default_name(index: usize) -> String {
        format!("Player {}", index + 1)
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.hit_points > 0.0
    }

    #[inline]
    pub fn is_ai(&self) -> bool {
        self.ai.is_some()
    }

    /// Spendable points (credit plus score)
    #[inline]
    pub fn available_points(&self) -> i64 {
        self.credit + self.score
    }

    /// Whether the targeting computer will be billed on the next shot
    #[inline]
    pub fn computer_engaged(&self) -> bool {
        self.use_targeting_computer || self.used_computer
    }

    /// Placed tank, or `TankNotPlaced`
    pub fn tank(&self, index: usize) -> Result<&Tank, SimError> {
        self.tank.as_ref().ok_or(SimError::TankNotPlaced(index))
    }

    pub fn tank_mut(&mut self, index: usize) -> Result<&mut Tank, SimError> {
        self.tank.as_mut().ok_or(SimError::TankNotPlaced(index))
    }
}

/// Wind as speed + direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f32,
    /// Degrees, same convention as azimuth
    pub direction: f32,
}

impl Wind {
    pub fn vector(&self) -> Vec3 {
        wind_vector(self.speed, self.direction)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameBoard {
    pub board_size: usize,
    pub surface: HeightField,
    pub material: MaterialGrid,
    pub wind: Wind,
    pub players: Vec<Player>,
    pub current_player: usize,
    /// 1-based
    pub current_round: u32,
    pub total_rounds: u32,
}

impl GameBoard {
    pub fn new(board_size: usize, scale: f32) -> Self {
        Self {
            board_size,
            surface: HeightField::new(board_size, board_size, scale),
            material: MaterialGrid::new(board_size, board_size),
            wind: Wind::default(),
            players: Vec::new(),
            current_player: 0,
            current_round: 0,
            total_rounds: 0,
        }
    }

    pub fn living_players(&self) -> usize {
        self.players.iter().filter(|p| p.is_alive()).count()
    }

    pub fn player(&self, index: usize) -> Result<&Player, SimError> {
        self.players.get(index).ok_or(SimError::UnknownPlayer(index))
    }

    pub fn player_mut(&mut self, index: usize) -> Result<&mut Player, SimError> {
        self.players.get_mut(index).ok_or(SimError::UnknownPlayer(index))
    }
}

/// Everything one shot produced, for animation and bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireResult {
    pub player_id: usize,
    /// Seconds between trajectory samples
    pub time_step: f32,
    pub trajectory: Vec<Vec3>,
    pub explosion_radius: f32,
    pub weapon_style: WeaponStyle,

    pub old: HeightField,
    pub top: HeightField,
    pub middle: HeightField,
    pub bottom: HeightField,
    pub final_surface: HeightField,

    pub old_material: MaterialGrid,
    pub top_material: MaterialGrid,
    pub bottom_material: MaterialGrid,
    pub final_material: MaterialGrid,

    pub new_round: bool,
    pub round_winner: Option<String>,
}

impl FireResult {
    /// Where the shell came down
    pub fn impact(&self) -> Option<Vec3> {
        self.trajectory.last().copied()
    }
}
