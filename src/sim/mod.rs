//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed time step only
//! - Seeded RNG only (reseeded by `start_match`)
//! - Stable iteration order (by player index)
//! - No rendering, audio or platform dependencies

pub mod ai;
pub mod damage;
pub mod explosion;
pub mod game;
pub mod heightfield;
pub mod state;
pub mod terrain;
pub mod trajectory;
pub mod vector;
pub mod weapons;

pub use ai::{AimChoice, AimContext, AimPolicy};
pub use damage::{Hit, blast_damage, resolve_damage};
pub use explosion::{ExplosionSnapshots, apply_explosion};
pub use game::MatchState;
pub use heightfield::{Channel, HeightField, Material, MaterialGrid, OUT_OF_BOUNDS};
pub use state::{
    AiHandle, FireResult, GameBoard, Player, PlayerStats, ShotRecord, Tank, Wind,
};
pub use terrain::{choose_tank_sites, flatten_circle, generate, surface_normal};
pub use trajectory::{ShellFlight, StopReason, Trajectory, integrate};
pub use vector::Vec3;
pub use weapons::{Weapon, WeaponSize, WeaponStyle, default_weapons};
