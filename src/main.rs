//! Tanks Core headless runner
//!
//! Plays a full match on the console: one autopiloted human seat against
//! one AI. Only the human seat is eligible for the high score list. Usage:
//! `tanks-core [config.json]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use tanks_core::sim::{AimChoice, AimContext, AimPolicy, MatchState, Vec3};
    use tanks_core::sim::vector::horizontal_distance;
    use tanks_core::{GameConfig, HighScores, SimError};

    /// Safety bound on shots per match
    const MAX_SHOTS: usize = 2_000;
    const NUM_HUMANS: usize = 1;
    const NUM_AIS: usize = 1;
    const NUM_PLAYERS: usize = NUM_HUMANS + NUM_AIS;

    /// Aims straight at the nearest enemy and scales power by the range error
    #[derive(Debug, Default)]
    pub struct BracketingAim {
        last_ratio: Option<f32>,
    }

    impl BracketingAim {
        /// Nearest living enemy tank, if any
        fn target(ctx: &AimContext<'_>, from: Vec3) -> Option<Vec3> {
            ctx.board
                .players
                .iter()
                .enumerate()
                .filter(|(i, p)| *i != ctx.player_id && p.is_alive())
                .filter_map(|(_, p)| p.tank.map(|t| t.position))
                .min_by(|a, b| {
                    horizontal_distance(*a, from).total_cmp(&horizontal_distance(*b, from))
                })
        }

        /// Opening shot: no drag, no wind, 45 degrees
        pub fn first_shot(ctx: &AimContext<'_>, from: Vec3, max_power: f32) -> Option<AimChoice> {
            let target = Self::target(ctx, from)?;
            let delta = target - from;
            let range = horizontal_distance(target, from).max(1.0);
            Some(AimChoice {
                azimuth: delta.y.atan2(delta.x).to_degrees(),
                altitude: 45.0,
                velocity: (range * 9.80665).sqrt().min(max_power),
            })
        }
    }

    impl AimPolicy for BracketingAim {
        fn record_result(
            &mut self,
            ctx: &AimContext<'_>,
            azimuth: f32,
            altitude: f32,
            velocity: f32,
            impact: Vec3,
        ) -> AimChoice {
            let Some(from) = ctx
                .board
                .players
                .get(ctx.player_id)
                .and_then(|p| p.tank)
                .map(|t| t.position) else {
                return AimChoice { azimuth, altitude, velocity };
            };
            let Some(target) = Self::target(ctx, from) else {
                return AimChoice { azimuth, altitude, velocity };
            };
            let wanted = horizontal_distance(target, from).max(1.0);
            let got = horizontal_distance(impact, from).max(1.0);
            // Range goes roughly with v^2
            let mut ratio = (wanted / got).sqrt().clamp(0.5, 2.0);
            if let Some(prev) = self.last_ratio {
                // Overshot then undershot (or the reverse): halve the step
                if (prev > 1.0) != (ratio > 1.0) {
                    ratio = 1.0 + (ratio - 1.0) * 0.5;
                }
            }
            self.last_ratio = Some(ratio);

            // Correct the bearing for wherever the wind pushed the last shell
            let to_target = (target - from).truncate();
            let to_impact = (impact - from).truncate();
            let drift = to_impact.y.atan2(to_impact.x) - to_target.y.atan2(to_target.x);
            AimChoice {
                azimuth: azimuth - drift.to_degrees(),
                altitude,
                velocity: velocity * ratio,
            }
        }

        fn reset(&mut self) {
            self.last_ratio = None;
        }
    }

    fn now_ms() -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }

    fn load_config() -> Result<GameConfig, SimError> {
        match std::env::args().nth(1) {
            Some(path) => match std::fs::read_to_string(&path) {
                Ok(json) => GameConfig::from_json(&json),
                Err(e) => {
                    log::warn!("Could not read {}: {}; using defaults", path, e);
                    Ok(GameConfig::default())
                }
            },
            None => Ok(GameConfig::default()),
        }
    }

    pub fn run() -> Result<(), SimError> {
        let config = load_config()?;
        let max_power = config.max_power;
        let rounds = config.num_rounds;
        let credit = config.starting_credit;

        let mut game = MatchState::new(config);
        game.start_match(NUM_HUMANS, NUM_AIS, rounds, &["Autopilot".to_string()], credit)?;

        let mut policies: Vec<BracketingAim> = (0..NUM_PLAYERS).map(|_| BracketingAim::default()).collect();
        let mut pending: Vec<Option<AimChoice>> = vec![None; NUM_PLAYERS];

        for shot in 0..MAX_SHOTS {
            if game.is_match_over() {
                break;
            }
            let id = game.board().current_player;
            let tank = game.get_tank(id)?;

            let choice = match pending[id].take() {
                Some(choice) => Some(choice),
                None => {
                    let ctx = AimContext {
                        board: game.board(),
                        player_id: id,
                        history: &[],
                    };
                    BracketingAim::first_shot(&ctx, tank.position, max_power)
                }
            };
            if let Some(choice) = choice {
                game.set_tank_aim(choice.azimuth, choice.altitude)?;
                game.set_tank_power(choice.velocity)?;
            }

            let tank = game.get_tank(id)?;
            let result = game.fire(tank.muzzle_position(), tank.muzzle_velocity())?;
            let impact = result.impact().unwrap_or(tank.position);
            println!(
                "shot {:4}: {} at az {:6.1} alt {:5.1} v {:5.1} -> ({:6.1}, {:6.1}, {:6.1})",
                shot,
                game.board().players[id].name,
                tank.azimuth,
                tank.altitude,
                tank.velocity,
                impact.x,
                impact.y,
                impact.z
            );

            if result.new_round {
                println!(
                    "round over, winner: {}",
                    result.round_winner.as_deref().unwrap_or("nobody")
                );
                for policy in &mut policies {
                    policy.reset();
                }
                pending.iter_mut().for_each(|p| *p = None);
                continue;
            }

            game.record_ai_shot(
                id,
                tanks_core::sim::ShotRecord {
                    azimuth: tank.azimuth,
                    altitude: tank.altitude,
                    velocity: tank.velocity,
                    impact,
                },
            )?;
            let history = game.board().players[id]
                .ai
                .as_ref()
                .map(|ai| ai.history.as_slice())
                .unwrap_or(&[]);
            let ctx = AimContext {
                board: game.board(),
                player_id: id,
                history,
            };
            pending[id] = Some(policies[id].record_result(
                &ctx,
                tank.azimuth,
                tank.altitude,
                tank.velocity,
                impact,
            ));
        }

        for player in &game.board().players {
            println!("{:>10}: score {:6}  credit {:6}", player.name, player.score, player.credit);
        }
        if let Some(winner) = game.winner() {
            println!("match winner: {}", winner.name);
        }

        let mut scores = HighScores::new();
        for entry in game.high_score_entries(now_ms()) {
            scores.add_score(entry);
        }
        println!("{}", scores.to_json()?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tanks Core (headless) starting...");

    if let Err(e) = headless::run() {
        log::error!("Match aborted: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host; there is nothing to run here
}
