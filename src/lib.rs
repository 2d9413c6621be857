//! Arcade Sims - simulation cores for four small arcade games
//!
//! Core modules:
//! - `sim`: Deterministic per-game simulations (Asteroids, Minesweeper, Stratego, Missile Command)
//! - `persistence`: Versioned snapshots and stores for resuming sessions
//! - `platform`: Input bridge (held keys, fire debounce)
//! - `settings`: Runner configuration
//! - `highscores`: Per-game leaderboards

pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{ActionError, PersistError};
pub use highscores::HighScores;
pub use settings::Settings;
pub use sim::{Controls, GameKind, Simulation, Status};

use glam::Vec2;

/// Wrap a coordinate into `[0, extent)`
#[inline]
pub fn wrap_coordinate(value: f32, extent: f32) -> f32 {
    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs
    if wrapped >= extent { 0.0 } else { wrapped }
}

/// Wrap a position into the `[0, width) x [0, height)` field
#[inline]
pub fn wrap_position(pos: Vec2, width: f32, height: f32) -> Vec2 {
    Vec2::new(wrap_coordinate(pos.x, width), wrap_coordinate(pos.y, height))
}

/// Unit vector for a heading in degrees, screen space (y grows downward)
#[inline]
pub fn heading_vector(degrees: f32) -> Vec2 {
    let rad = degrees.to_radians();
    Vec2::new(rad.cos(), -rad.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_coordinate() {
        assert_eq!(wrap_coordinate(805.0, 800.0), 5.0);
        assert_eq!(wrap_coordinate(-5.0, 800.0), 795.0);
        assert_eq!(wrap_coordinate(800.0, 800.0), 0.0);
        assert!(wrap_coordinate(-1e-9, 800.0) < 800.0);
    }

    #[test]
    fn test_heading_vector_points_up_at_90() {
        let v = heading_vector(90.0);
        assert!(v.x.abs() < 1e-5);
        assert!((v.y + 1.0).abs() < 1e-5);
    }
}
