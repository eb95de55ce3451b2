//! Caller contract violations
//!
//! Almost everything in the simulation clamps instead of failing. The few
//! conditions below mean the caller broke a contract and are surfaced loudly.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("fire requested with no living players")]
    NoLivingPlayers,

    #[error("weapon {weapon} size {size} is not in the weapon catalogue")]
    InvalidWeapon { weapon: usize, size: usize },

    #[error("grid dimensions disagree: heightfield {field:?}, material {material:?}")]
    DimensionMismatch {
        field: (usize, usize),
        material: (usize, usize),
    },

    #[error("board size {0} is not 2^n + 1")]
    InvalidBoardSize(usize),

    #[error("player {0} has no tank placed")]
    TankNotPlaced(usize),

    #[error("player {0} does not exist")]
    UnknownPlayer(usize),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
