//! Tanks Core - deterministic simulation for a turn-based artillery duel
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain, ballistics, explosions, match state)
//! - `config`: Data-driven match configuration
//! - `highscores`: High score records supplied to the persistence layer
//! - `error`: Caller contract violations

pub mod config;
pub mod error;
pub mod highscores;
pub mod sim;

pub use config::GameConfig;
pub use error::SimError;
pub use highscores::HighScores;

/// Game configuration constants
pub mod consts {
    /// Gravitational acceleration along z (m/s², negative is down)
    pub const GRAVITY: f32 = -9.80665;
    /// Terminal fall speed of a shell under linear drag (m/s)
    pub const TERMINAL_SPEED: f32 = 100.0;

    /// Collision radius of a tank, also the damage falloff baseline
    pub const TANK_SIZE: f32 = 10.0;
    /// Height of the muzzle above the tank's resting position
    pub const MUZZLE_HEIGHT: f32 = 5.0;
    /// Barrel length along the aim direction
    pub const BARREL_LENGTH: f32 = 8.0;

    /// Hard cap on trajectory samples (safety bound, not a gameplay rule)
    pub const MAX_TRAJECTORY_STEPS: usize = 10_000;

    /// Random draws per player when placing tanks
    pub const PLACEMENT_ATTEMPTS: u32 = 100;
    /// Full placement passes before settling for a best effort
    pub const PLACEMENT_PASSES: u32 = 10;

    /// Real-unit elevation represented by a normalized value of 1.0
    pub const ELEVATION_SCALE: f32 = 512.0;

    /// Score multiplier applied to positive scores when a round ends
    pub const ROUND_BONUS: f64 = 1.1;
}

/// Normalize an azimuth in degrees to [0, 360)
#[inline]
pub fn normalize_azimuth(azimuth: f32) -> f32 {
    let wrapped = azimuth.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Clamp an altitude (elevation angle) in degrees to [0, 180]
#[inline]
pub fn clamp_altitude(altitude: f32) -> f32 {
    altitude.clamp(0.0, 180.0)
}

/// Convert an azimuth/altitude pair (degrees) into a unit direction
#[inline]
pub fn aim_to_direction(azimuth: f32, altitude: f32) -> glam::Vec3 {
    let az = azimuth.to_radians();
    let alt = altitude.to_radians();
    glam::Vec3::new(alt.cos() * az.cos(), alt.cos() * az.sin(), alt.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_azimuth() {
        assert!((normalize_azimuth(370.0) - 10.0).abs() < 1e-4);
        assert!((normalize_azimuth(-10.0) - 350.0).abs() < 1e-4);
        assert_eq!(normalize_azimuth(0.0), 0.0);
        assert_eq!(normalize_azimuth(360.0), 0.0);
        assert!((normalize_azimuth(725.0) - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_clamp_altitude() {
        assert_eq!(clamp_altitude(-5.0), 0.0);
        assert_eq!(clamp_altitude(45.0), 45.0);
        assert_eq!(clamp_altitude(200.0), 180.0);
    }

    #[test]
    fn test_aim_to_direction() {
        let up = aim_to_direction(0.0, 90.0);
        assert!(up.z > 0.999);

        let east = aim_to_direction(0.0, 0.0);
        assert!((east.x - 1.0).abs() < 1e-5);

        let north = aim_to_direction(90.0, 0.0);
        assert!((north.y - 1.0).abs() < 1e-5);
        assert!((north.length() - 1.0).abs() < 1e-5);
    }
}
