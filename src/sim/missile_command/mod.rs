//! Missile Command on a 15x12 grid: defend four cities with three launch sites

pub mod state;
pub mod tick;

pub use state::{
    ActivePowerUp, Base, City, Explosion, ExplosionStage, Missile, MissileCommandState, MissileKind, Phase,
    PowerUp,
};
pub use tick::{MissileCommandAction, max_enemy_missiles, spawn_interval_ticks, tick};

pub mod consts {
    pub const BOARD_WIDTH: i32 = 15;
    pub const BOARD_HEIGHT: i32 = 12;
    pub const GROUND_ROW: i32 = BOARD_HEIGHT - 1;
    /// Row cities and bases stand on, and where enemy missiles aim
    pub const SKYLINE_ROW: i32 = GROUND_ROW - 1;

    pub const CITY_COLUMNS: [i32; 4] = [2, 5, 8, 11];
    pub const BASE_COLUMNS: [i32; 3] = [0, 7, 14];
    pub const BASE_MISSILES: u32 = 10;

    /// Simulation rate used to turn the wall-clock rules into ticks
    pub const TICKS_PER_SECOND: f64 = 4.0;

    /// Enemy spawning
    pub const SPAWN_INTERVAL_BASE_SECS: f64 = 4.0;
    pub const SPAWN_INTERVAL_MIN_SECS: f64 = 3.0;
    pub const SPAWN_INTERVAL_PER_LEVEL_SECS: f64 = 0.2;
    pub const MAX_ENEMY_MISSILES: usize = 5;
    /// Start column keeps more than this many columns from the target
    pub const SAFE_START_DISTANCE: i32 = 1;
    pub const BASE_TARGET_LEVEL: u32 = 3;

    /// Enemy missile step counts (more steps = slower)
    pub const MIN_MISSILE_STEPS: f64 = 25.0;
    pub const MAX_MISSILE_STEPS: f64 = 35.0;
    pub const LEVEL_SPEED_FACTOR: f64 = 0.1;
    pub const MISSILE_STEPS_FLOOR: i64 = 12;
    pub const FAST_MISSILE_STEPS: u32 = 15;
    pub const FAST_MISSILE_LEVEL: u32 = 3;
    pub const FAST_MISSILE_CHANCE: f64 = 0.15;
    pub const SPLIT_MISSILE_STEPS: u32 = 28;
    pub const SPLIT_MISSILE_LEVEL: u32 = 5;
    pub const SPLIT_MISSILE_CHANCE: f64 = 0.1;
    pub const MISSILE_STEP_SPREAD: u32 = 5;
    /// Fragments aim within this many columns of the split point
    pub const SPLIT_TARGET_SPREAD: i32 = 4;
    pub const SPLIT_CHILD_STEPS_MIN: u32 = 21;
    pub const SPLIT_CHILD_STEPS_MAX: u32 = 27;
    pub const ENEMY_CURVE: f32 = 0.2;

    pub const PLAYER_MISSILE_STEPS: u32 = 6;
    pub const FAST_PLAYER_MISSILE_STEPS: u32 = 4;

    /// Explosions
    pub const PLAYER_BLAST_RADIUS: i32 = 2;
    pub const LARGE_BLAST_RADIUS: i32 = 3;
    pub const IMPACT_BLAST_RADIUS: i32 = 1;
    pub const EXPLOSION_HOLD_TICKS: u32 = 3;

    /// Scoring
    pub const COMBO_TIMEOUT_SECS: f64 = 2.0;
    pub const COMBO_BONUS_THRESHOLD: u32 = 3;
    pub const COMBO_BONUS_PER_HIT: u64 = 10;
    pub const LEFTOVER_MISSILE_POINTS: u64 = 10;
    pub const LEFTOVER_DRAIN_EVERY: u64 = 5;
    pub const LEVEL_BONUS_PER_LEVEL: u64 = 100;

    /// Level flow
    pub const LEVEL_MIN_FRAMES: u64 = 30;
    pub const LEVEL_REFILL: u32 = 10;
    pub const POWER_UP_CHANCE: f64 = 0.3;
    pub const POWER_UP_SECS: f64 = 30.0;
    pub const EXTRA_MISSILES: u32 = 5;

    /// Convert seconds of wall-clock rules into whole ticks
    pub fn secs_to_ticks(secs: f64) -> u64 {
        (secs * TICKS_PER_SECOND).round() as u64
    }
}
