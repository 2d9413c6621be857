//! Error types shared by the simulations and the persistence layer

use thiserror::Error;

use crate::sim::GameKind;

/// Why an input was rejected. The game state is unchanged when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: i32, col: i32 },

    #[error("action not allowed during the {0} phase")]
    WrongPhase(&'static str),

    #[error("no piece at the source cell")]
    EmptySource,

    #[error("piece belongs to the other side")]
    NotYourPiece,

    #[error("piece cannot move")]
    Immovable,

    #[error("illegal destination")]
    IllegalDestination,

    #[error("cell is not available")]
    CellUnavailable,

    #[error("no pieces of that kind left to place")]
    NoneRemaining,

    #[error("no base can fire")]
    OutOfAmmo,

    #[error("too many projectiles in flight")]
    ProjectileLimit,

    #[error("game is over")]
    GameOver,
}

/// Failures while loading or saving a persisted snapshot.
///
/// None of these are fatal: sessions log them and fall back to a fresh game.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported snapshot version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("snapshot holds a {found} game, expected {expected}")]
    WrongGame { found: GameKind, expected: GameKind },

    #[error("snapshot failed validation: {0}")]
    Invalid(&'static str),
}
