//! Match configuration
//!
//! Everything a caller may tune per match. Loaded from JSON by the host
//! application; missing fields fall back to defaults.

use serde::{Deserialize, Serialize};

use crate::consts::ELEVATION_SCALE;
use crate::error::SimError;

/// Match configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Board ===
    /// Board edge length in cells (must be 2^n + 1)
    pub board_size: usize,
    /// Real-unit elevation of a normalized 1.0
    pub elevation_scale: f32,
    /// Lowest generated elevation
    pub min_elevation: f32,
    /// Highest generated elevation
    pub max_elevation: f32,

    // === Match ===
    /// Rounds per match
    pub num_rounds: u32,
    /// Credit every player starts the match with
    pub starting_credit: i64,
    /// Hit points restored at the start of every round
    pub hit_points: f32,
    /// Score awarded for destroying another tank
    pub kill_bonus: i64,
    /// Surcharge for the targeting computer assist
    pub computer_cost: i64,
    /// Upper bound on launch speed (m/s)
    pub max_power: f32,

    // === Placement ===
    /// Keep tanks this far from the board edge
    pub tank_margin: f32,
    /// Minimum horizontal distance between tanks
    pub min_tank_separation: f32,
    /// Radius of the landing pad flattened under each tank
    pub flatten_radius: f32,

    // === Physics ===
    /// Seconds between trajectory samples
    pub time_step: f32,
    /// Wind speed is drawn from [0, max_wind]
    pub max_wind: f32,
    /// Sampling offset for surface normals
    pub normal_offset: i32,

    /// RNG seed (terrain, placement, wind)
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: 257,
            elevation_scale: ELEVATION_SCALE,
            min_elevation: 50.0,
            max_elevation: 200.0,

            num_rounds: 3,
            starting_credit: 1000,
            hit_points: 1000.0,
            kill_bonus: 1000,
            computer_cost: 1000,
            max_power: 100.0,

            tank_margin: 20.0,
            min_tank_separation: 50.0,
            flatten_radius: 15.0,

            time_step: 0.1,
            max_wind: 10.0,
            normal_offset: 1,

            seed: 0x5eed,
        }
    }
}

impl GameConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json)?;
        log::info!(
            "Loaded config: board {}, {} rounds, seed {:#x}",
            config.board_size,
            config.num_rounds,
            config.seed
        );
        Ok(config)
    }

    /// Serialize the configuration to JSON
    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
