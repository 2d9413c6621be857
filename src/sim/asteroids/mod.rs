//! Asteroids: a ship, wrapping bullets and splitting rocks on an 800x600 field

pub mod state;
pub mod tick;

pub use state::{Asteroid, AsteroidSize, AsteroidsState, Bullet, Phase, Ship};
pub use tick::{AsteroidsAction, spawn_chance, tick};

/// Game configuration constants (units are pixels and ticks)
pub mod consts {
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    pub const STARTING_LIVES: u32 = 3;

    /// Ship defaults
    pub const SHIP_RADIUS: f32 = 15.0;
    pub const SHIP_THRUST: f32 = 0.8;
    pub const SHIP_MAX_SPEED: f32 = 24.0;
    pub const SHIP_DRAG: f32 = 0.99;
    pub const ROTATION_STEP_DEG: f32 = 10.0;
    /// One rotate button press turns this many steps
    pub const BUTTON_ROTATION_STEPS: i32 = 5;
    /// Idle spin while waiting for the player to start
    pub const ATTRACT_SPIN_DEG: f32 = 0.2;
    pub const RESPAWN_INVULNERABLE_TICKS: u32 = 30;

    /// Bullet defaults
    pub const BULLET_SPEED: f32 = 10.0;
    pub const BULLET_LIFE: u32 = 60;
    pub const BULLET_RADIUS: f32 = 2.0;
    pub const MAX_BULLETS: usize = 5;

    /// Asteroid motion
    pub const MIN_ASTEROID_SPEED: f32 = 3.0;
    pub const MAX_ASTEROID_SPEED: f32 = 6.0;
    pub const MIN_VELOCITY_COMPONENT: f32 = 0.5;
    pub const MIN_SPIN: f32 = 0.02;
    pub const MAX_SPIN: f32 = 0.1;
    /// How far off screen new asteroids may appear
    pub const SPAWN_DEPTH: f32 = 100.0;
    pub const OUTLINE_VERTICES: usize = 12;
    pub const OUTLINE_JITTER: f32 = 0.3;

    /// Spawn scheduler
    pub const ASTEROID_MAX_COUNT: usize = 10;
    pub const ASTEROID_SPAWN_INTERVAL: u64 = 300;
    pub const SPAWN_CHANCE_BASE: f64 = 0.3;
    pub const SPAWN_CHANCE_MAX: f64 = 0.8;
    pub const SPAWN_CHANCE_PER_POINT: f64 = 1.0 / 1000.0;

    pub const ATTRACT_ASTEROIDS: usize = 2;
    pub const ATTRACT_MAX_ASTEROIDS: usize = 3;
    pub const START_EXTRA_ASTEROIDS: usize = 3;
}
