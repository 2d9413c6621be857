//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One discrete tick per external trigger
//! - Seeded RNG only (owned by each game state)
//! - Stable iteration order
//! - No rendering or platform dependencies

pub mod asteroids;
pub mod collision;
pub mod minesweeper;
pub mod missile_command;
pub mod session;
pub mod stratego;

use std::fmt;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::ActionError;

pub use collision::{Body, collides, within_blast};
pub use session::Session;

/// Which game a state or snapshot belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Asteroids,
    Minesweeper,
    Stratego,
    MissileCommand,
}

impl GameKind {
    pub const ALL: [GameKind; 4] = [
        GameKind::Asteroids,
        GameKind::Minesweeper,
        GameKind::Stratego,
        GameKind::MissileCommand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Asteroids => "asteroids",
            GameKind::Minesweeper => "minesweeper",
            GameKind::Stratego => "stratego",
            GameKind::MissileCommand => "missile_command",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Held-key state for one tick, as delivered by the input bridge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub thrust: bool,
    /// Already debounced by the bridge
    pub fire: bool,
}

/// Read-only summary for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub phase: &'static str,
    pub score: u64,
    pub level: u32,
    pub lives: Option<u32>,
    pub finished: bool,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] score {} level {}", self.phase, self.score, self.level)?;
        if let Some(lives) = self.lives {
            write!(f, " lives {lives}")?;
        }
        Ok(())
    }
}

/// A game whose whole state is one owned, serializable value
pub trait Simulation: Serialize + DeserializeOwned {
    type Action: fmt::Debug;

    const KIND: GameKind;

    /// Fresh game seeded for reproducibility
    fn new_game(seed: u64) -> Self;

    /// Advance by one discrete tick
    fn tick(&mut self, controls: &Controls);

    /// Apply a discrete input. Rejected actions leave the state untouched.
    fn apply_input(&mut self, action: Self::Action) -> Result<(), ActionError>;

    fn status(&self) -> Status;

    /// Structural checks run on every decoded snapshot
    fn validate(&self) -> Result<(), &'static str>;

    /// Discard everything and start over
    fn reset(&mut self);
}

/// Seeded generator used by every game state
pub fn seeded_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}
