//! Interface to the opponent AI
//!
//! The core never drives an AI itself. After `fire()` returns, the host
//! feeds the outcome to the player's policy and applies the returned aim
//! through `set_tank_aim` / `set_tank_power` before the next shot.

use super::state::{GameBoard, ShotRecord};
use super::vector::Vec3;

/// Aim and power chosen for the next shot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimChoice {
    pub azimuth: f32,
    pub altitude: f32,
    pub velocity: f32,
}

/// Context handed to a policy along with a shot outcome
pub struct AimContext<'a> {
    pub board: &'a GameBoard,
    pub player_id: usize,
    /// Shots this player has taken this round, oldest first
    pub history: &'a [ShotRecord],
}

/// An opponent decision policy (black box to the core)
pub trait AimPolicy {
    /// Learn from a finished shot and choose the next aim
    fn record_result(
        &mut self,
        ctx: &AimContext<'_>,
        azimuth: f32,
        altitude: f32,
        velocity: f32,
        impact: Vec3,
    ) -> AimChoice;

    /// Forget everything learned; called when a new round starts
    fn reset(&mut self);
}
