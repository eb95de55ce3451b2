//! Shell trajectory integration
//!
//! Uses the closed-form solution for linear drag toward a terminal velocity
//! instead of stepping the velocity. With `v_inf = (wind_x, wind_y, -T)` and
//! `k = -g / (2T)`:
//!
//! ```text
//! p(t) = p0 + v_inf * t + (v0 - v_inf) * (1 - exp(-2kt)) / (2k)
//! ```

use serde::{Deserialize, Serialize};

use super::heightfield::HeightField;
use super::vector::{Vec3, containing_cell};
use crate::consts::{GRAVITY, MAX_TRAJECTORY_STEPS, TANK_SIZE, TERMINAL_SPEED};

/// Why a trajectory stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Dropped below the terrain surface
    Terrain,
    /// Dropped below elevation zero (e.g. off the board)
    BelowZero,
    /// Came within tank size of a target (index into the target list)
    TankHit(usize),
    /// Hit the iteration cap; the path is truncated
    Timeout,
}

/// A finished shell path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Samples from the launch point to the impact point (never empty)
    pub samples: Vec<Vec3>,
    pub stop: StopReason,
}

impl Trajectory {
    /// Final sample, consumed as the impact point
    pub fn impact(&self) -> Vec3 {
        self.samples.last().copied().unwrap_or(Vec3::ZERO)
    }
}

/// Closed-form shell motion under gravity, drag and wind
#[derive(Debug, Clone, Copy)]
pub struct ShellFlight {
    origin: Vec3,
    launch_vel: Vec3,
    terminal_vel: Vec3,
    k: f32,
}

impl ShellFlight {
    pub fn new(origin: Vec3, launch_vel: Vec3, wind: Vec3) -> Self {
        Self {
            origin,
            launch_vel,
            terminal_vel: Vec3::new(wind.x, wind.y, -TERMINAL_SPEED),
            k: -GRAVITY / (2.0 * TERMINAL_SPEED),
        }
    }

    /// Position `t` seconds after launch
    #[inline]
    pub fn position_at(&self, t: f32) -> Vec3 {
        let two_k = 2.0 * self.k;
        let decay = (1.0 - (-two_k * t).exp()) / two_k;
        self.origin + self.terminal_vel * t + (self.launch_vel - self.terminal_vel) * decay
    }
}

/// Sample a shell path until it lands, hits a tank, or the cap is reached
///
/// `targets` are the positions of living tanks. A target only counts once the
/// shell has been outside its radius, so the firing tank never hits itself on
/// the way out of the barrel.
pub fn integrate(
    launch_pos: Vec3,
    launch_vel: Vec3,
    wind: Vec3,
    field: &HeightField,
    targets: &[Vec3],
    time_step: f32,
) -> Trajectory {
    let mut samples = vec![launch_pos];
    if time_step.is_nan() || time_step <= 0.0 {
        log::warn!("Non-positive time step {}; shell never leaves the barrel", time_step);
        return Trajectory {
            samples,
            stop: StopReason::Timeout,
        };
    }

    let flight = ShellFlight::new(launch_pos, launch_vel, wind);
    let mut armed: Vec<bool> = targets
        .iter()
        .map(|t| t.distance(launch_pos) >= TANK_SIZE)
        .collect();

    for step in 1..MAX_TRAJECTORY_STEPS {
        let pos = flight.position_at(step as f32 * time_step);
        samples.push(pos);

        let (cx, cy) = containing_cell(pos);
        let ground = field.get(cx, cy);
        // Off-board cells read as the -1 sentinel and only the zero floor applies
        if ground >= 0.0 && pos.z < ground {
            return Trajectory {
                samples,
                stop: StopReason::Terrain,
            };
        }
        if pos.z < 0.0 {
            return Trajectory {
                samples,
                stop: StopReason::BelowZero,
            };
        }
        for (i, target) in targets.iter().enumerate() {
            let inside = target.distance(pos) < TANK_SIZE;
            if armed[i] && inside {
                return Trajectory {
                    samples,
                    stop: StopReason::TankHit(i),
                };
            }
            if !inside {
                armed[i] = true;
            }
        }
    }

    log::warn!(
        "Trajectory truncated at {} samples from {:?}",
        MAX_TRAJECTORY_STEPS,
        launch_pos
    );
    Trajectory {
        samples,
        stop: StopReason::Timeout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn flat(elevation: f32) -> HeightField {
        HeightField::flat(201, 201, 512.0, elevation)
    }

    #[test]
    fn test_position_at_zero_is_origin() {
        let flight = ShellFlight::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(5.0, 0.0, 5.0), Vec3::ZERO);
        assert!((flight.position_at(0.0) - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_velocity_approaches_terminal() {
        let wind = Vec3::new(3.0, -2.0, 0.0);
        let flight = ShellFlight::new(Vec3::ZERO, Vec3::new(50.0, 0.0, 50.0), wind);
        let t = 500.0;
        let vel = (flight.position_at(t + 0.01) - flight.position_at(t)) / 0.01;
        assert!((vel.x - 3.0).abs() < 0.1);
        assert!((vel.y + 2.0).abs() < 0.1);
        assert!((vel.z + TERMINAL_SPEED).abs() < 0.5);
    }

    #[test]
    fn test_early_motion_matches_gravity() {
        // For small t drag is negligible: z ~ v0 t + g t^2 / 2
        let flight = ShellFlight::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 20.0), Vec3::ZERO);
        let t = 0.5;
        let expected = 20.0 * t + 0.5 * GRAVITY * t * t;
        assert!((flight.position_at(t).z - expected).abs() < 0.1);
    }

    #[test]
    fn test_lands_on_terrain() {
        let field = flat(50.0);
        let traj = integrate(
            Vec3::new(50.0, 100.0, 60.0),
            Vec3::new(15.0, 0.0, 15.0),
            Vec3::ZERO,
            &field,
            &[],
            0.1,
        );
        assert_eq!(traj.stop, StopReason::Terrain);
        assert_eq!(traj.samples[0], Vec3::new(50.0, 100.0, 60.0));
        assert!(traj.impact().z < 50.0);
        assert!(traj.impact().x > 50.0);
    }

    #[test]
    fn test_off_board_falls_below_zero() {
        let field = flat(10.0);
        let traj = integrate(
            Vec3::new(195.0, 100.0, 20.0),
            Vec3::new(40.0, 0.0, 10.0),
            Vec3::ZERO,
            &field,
            &[],
            0.1,
        );
        assert_eq!(traj.stop, StopReason::BelowZero);
        assert!(traj.impact().z < 0.0);
    }

    #[test]
    fn test_hits_other_tank() {
        let field = flat(0.0);
        let target = Vec3::new(120.0, 100.0, 10.0);
        // Fire straight along x at tank height with plenty of speed
        let traj = integrate(
            Vec3::new(60.0, 100.0, 10.0),
            Vec3::new(60.0, 0.0, 3.0),
            Vec3::ZERO,
            &field,
            &[target],
            0.05,
        );
        assert_eq!(traj.stop, StopReason::TankHit(0));
        assert!(traj.impact().distance(target) < TANK_SIZE);
    }

    #[test]
    fn test_shooter_does_not_hit_itself_on_launch() {
        let field = flat(20.0);
        let shooter = Vec3::new(100.0, 100.0, 20.0);
        let traj = integrate(
            shooter + Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(10.0, 0.0, 30.0),
            Vec3::ZERO,
            &field,
            &[shooter],
            0.1,
        );
        assert!(traj.samples.len() > 2);
        assert_ne!(traj.stop, StopReason::TankHit(0));
    }

    #[test]
    fn test_timeout_truncates() {
        // Dropped from far too high to land within the cap
        let field = flat(0.0);
        let traj = integrate(
            Vec3::new(100.0, 100.0, 1.0e7),
            Vec3::ZERO,
            Vec3::ZERO,
            &field,
            &[],
            0.01,
        );
        assert_eq!(traj.stop, StopReason::Timeout);
        assert_eq!(traj.samples.len(), MAX_TRAJECTORY_STEPS);
    }

    #[test]
    fn test_zero_time_step_returns_launch_point() {
        let field = flat(0.0);
        let traj = integrate(Vec3::new(1.0, 1.0, 1.0), Vec3::X, Vec3::ZERO, &field, &[], 0.0);
        assert_eq!(traj.samples, vec![Vec3::new(1.0, 1.0, 1.0)]);
    }

    proptest! {
        #[test]
        fn prop_trajectory_terminates(
            vx in -60.0f32..60.0,
            vy in -60.0f32..60.0,
            vz in 0.0f32..80.0,
            wx in -10.0f32..10.0,
            wy in -10.0f32..10.0,
        ) {
            let field = flat(30.0);
            let traj = integrate(
                Vec3::new(100.0, 100.0, 40.0),
                Vec3::new(vx, vy, vz),
                Vec3::new(wx, wy, 0.0),
                &field,
                &[Vec3::new(150.0, 150.0, 30.0)],
                0.1,
            );
            prop_assert!(!traj.samples.is_empty());
            prop_assert!(traj.samples.len() <= MAX_TRAJECTORY_STEPS);
            let last = traj.impact();
            let (cx, cy) = containing_cell(last);
            match traj.stop {
                StopReason::Terrain => {
                    prop_assert!(field.get(cx, cy) >= 0.0);
                    prop_assert!(last.z < field.get(cx, cy));
                }
                StopReason::BelowZero => prop_assert!(last.z < 0.0),
                StopReason::TankHit(_) => {
                    prop_assert!(last.distance(Vec3::new(150.0, 150.0, 30.0)) < TANK_SIZE)
                }
                StopReason::Timeout => prop_assert_eq!(traj.samples.len(), MAX_TRAJECTORY_STEPS),
            }
        }
    }
}
