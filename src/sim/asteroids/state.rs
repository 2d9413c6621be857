//! Asteroids entities and game state
//!
//! Everything that must survive a resume lives in `AsteroidsState`, including
//! the RNG stream.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::consts::*;
use crate::sim::collision::{Body, reenter_past_margin};
use crate::sim::seeded_rng;
use crate::{heading_vector, wrap_position};

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Initialized but not started: asteroids drift, ship idles
    Attract,
    /// Active gameplay
    Playing,
    /// Out of lives
    GameOver,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Attract => "attract",
            Phase::Playing => "playing",
            Phase::GameOver => "game_over",
        }
    }
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub pos: Vec2,
    /// Heading in degrees, 90 = up
    pub heading: f32,
    pub speed: f32,
    pub radius: f32,
    /// Ticks left before asteroids can hit the ship again
    #[serde(default)]
    pub invulnerable_ticks: u32,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            pos: Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0),
            heading: 90.0,
            speed: 0.0,
            radius: SHIP_RADIUS,
            invulnerable_ticks: 0,
        }
    }
}

impl Ship {
    /// Fresh ship at the center, briefly immune
    pub fn respawned() -> Self {
        Self {
            invulnerable_ticks: RESPAWN_INVULNERABLE_TICKS,
            ..Self::default()
        }
    }

    /// Move along the heading, wrap, then apply drag
    pub fn update(&mut self) {
        self.pos = wrap_position(
            self.pos + heading_vector(self.heading) * self.speed,
            FIELD_WIDTH,
            FIELD_HEIGHT,
        );
        self.speed *= SHIP_DRAG;
        self.invulnerable_ticks = self.invulnerable_ticks.saturating_sub(1);
    }

    /// Rotate by whole steps (positive = counter-clockwise)
    pub fn rotate(&mut self, steps: i32) {
        self.heading = (self.heading + steps as f32 * ROTATION_STEP_DEG).rem_euclid(360.0);
    }

    pub fn thrust(&mut self) {
        self.speed = (self.speed + SHIP_THRUST).min(SHIP_MAX_SPEED);
    }

    /// Tip of the ship, where bullets spawn
    pub fn nose(&self) -> Vec2 {
        self.pos + heading_vector(self.heading) * self.radius
    }

    pub fn is_vulnerable(&self) -> bool {
        self.invulnerable_ticks == 0
    }
}

impl Body for Ship {
    fn center(&self) -> Vec2 {
        self.pos
    }
    fn radius(&self) -> f32 {
        self.radius
    }
}

/// Asteroid size classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsteroidSize {
    Large,
    Medium,
    Small,
}

impl AsteroidSize {
    pub fn radius(&self) -> f32 {
        match self {
            AsteroidSize::Large => 50.0,
            AsteroidSize::Medium => 25.0,
            AsteroidSize::Small => 12.0,
        }
    }

    /// Points for destroying one. Smaller is worth more.
    pub fn points(&self) -> u64 {
        match self {
            AsteroidSize::Large => 20,
            AsteroidSize::Medium => 50,
            AsteroidSize::Small => 100,
        }
    }

    /// Size of the two fragments and their velocity spread, if it splits at all
    pub fn split(&self) -> Option<(AsteroidSize, f32)> {
        match self {
            AsteroidSize::Large => Some((AsteroidSize::Medium, 2.0)),
            AsteroidSize::Medium => Some((AsteroidSize::Small, 3.0)),
            AsteroidSize::Small => None,
        }
    }
}

/// A drifting, spinning rock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: AsteroidSize,
    /// Radians
    pub rotation: f32,
    pub rotation_speed: f32,
    /// Radial offset per outline vertex, sampled once so the outline stays stable
    pub outline: Vec<f32>,
}

impl Asteroid {
    /// New asteroid entering from a random edge with a guaranteed minimum speed
    pub fn spawn(rng: &mut Pcg32, size: AsteroidSize) -> Self {
        let pos = match rng.random_range(0..4) {
            0 => Vec2::new(
                rng.random_range(0.0..=FIELD_WIDTH),
                rng.random_range(-SPAWN_DEPTH..=0.0),
            ),
            1 => Vec2::new(
                rng.random_range(FIELD_WIDTH..=FIELD_WIDTH + SPAWN_DEPTH),
                rng.random_range(0.0..=FIELD_HEIGHT),
            ),
            2 => Vec2::new(
                rng.random_range(0.0..=FIELD_WIDTH),
                rng.random_range(FIELD_HEIGHT..=FIELD_HEIGHT + SPAWN_DEPTH),
            ),
            _ => Vec2::new(
                rng.random_range(-SPAWN_DEPTH..=0.0),
                rng.random_range(0.0..=FIELD_HEIGHT),
            ),
        };

        let vel = Self::sample_velocity(rng);
        Self::with_motion(rng, pos, vel, size)
    }

    /// Fragment of a destroyed asteroid
    pub fn fragment(rng: &mut Pcg32, pos: Vec2, size: AsteroidSize, spread: f32) -> Self {
        let vel = Vec2::new(
            rng.random_range(-spread..=spread),
            rng.random_range(-spread..=spread),
        );
        Self::with_motion(rng, pos, vel, size)
    }

    fn with_motion(rng: &mut Pcg32, pos: Vec2, vel: Vec2, size: AsteroidSize) -> Self {
        let rotation = rng.random_range(0.0..std::f32::consts::TAU);
        let spin = rng.random_range(MIN_SPIN..=MAX_SPIN);
        let rotation_speed = if rng.random_bool(0.5) { spin } else { -spin };
        let jitter = size.radius() * OUTLINE_JITTER;
        let outline = (0..OUTLINE_VERTICES)
            .map(|_| rng.random_range(-jitter..=jitter))
            .collect();

        Self {
            pos,
            vel,
            size,
            rotation,
            rotation_speed,
            outline,
        }
    }

    /// Each component is resampled until it clears the dead zone, then the
    /// vector is stretched up to the speed floor.
    fn sample_velocity(rng: &mut Pcg32) -> Vec2 {
        let mut component = || loop {
            let v = rng.random_range(-MAX_ASTEROID_SPEED..=MAX_ASTEROID_SPEED);
            if v.abs() >= MIN_VELOCITY_COMPONENT {
                return v;
            }
        };
        let vel = Vec2::new(component(), component());

        let speed = vel.length();
        if speed < MIN_ASTEROID_SPEED {
            vel * (MIN_ASTEROID_SPEED / speed)
        } else {
            vel
        }
    }

    pub fn update(&mut self) {
        self.pos = reenter_past_margin(
            self.pos + self.vel,
            self.radius(),
            FIELD_WIDTH,
            FIELD_HEIGHT,
        );
        self.rotation += self.rotation_speed;
    }

    /// Outline vertices in field coordinates for rendering
    pub fn outline_points(&self) -> Vec<Vec2> {
        let n = self.outline.len().max(1) as f32;
        self.outline
            .iter()
            .enumerate()
            .map(|(i, offset)| {
                let angle = std::f32::consts::TAU * i as f32 / n + self.rotation;
                let r = self.radius() + offset;
                self.pos + Vec2::new(angle.cos(), angle.sin()) * r
            })
            .collect()
    }
}

impl Body for Asteroid {
    fn center(&self) -> Vec2 {
        self.pos
    }
    fn radius(&self) -> f32 {
        self.size.radius()
    }
}

/// A shot from the ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub heading: f32,
    /// Ticks left to live
    pub life: u32,
}

impl Bullet {
    pub fn fired_from(ship: &Ship) -> Self {
        Self {
            pos: ship.nose(),
            heading: ship.heading,
            life: BULLET_LIFE,
        }
    }

    pub fn update(&mut self) {
        self.pos = wrap_position(
            self.pos + heading_vector(self.heading) * BULLET_SPEED,
            FIELD_WIDTH,
            FIELD_HEIGHT,
        );
        self.life = self.life.saturating_sub(1);
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0
    }
}

impl Body for Bullet {
    fn center(&self) -> Vec2 {
        self.pos
    }
    fn radius(&self) -> f32 {
        BULLET_RADIUS
    }
}

/// Complete Asteroids state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsteroidsState {
    pub rng: Pcg32,
    pub phase: Phase,
    pub score: u64,
    pub lives: u32,
    pub ship: Ship,
    pub asteroids: Vec<Asteroid>,
    pub bullets: Vec<Bullet>,
    /// Simulation tick counter
    pub frame: u64,
    /// Tick of the last scheduled spawn
    pub last_spawn_frame: u64,
}

impl AsteroidsState {
    /// Initialized but not started: ship at center, two asteroids drifting
    pub fn new(seed: u64) -> Self {
        let mut rng = seeded_rng(seed);
        let asteroids = (0..ATTRACT_ASTEROIDS)
            .map(|_| Asteroid::spawn(&mut rng, AsteroidSize::Large))
            .collect();

        Self {
            rng,
            phase: Phase::Attract,
            score: 0,
            lives: STARTING_LIVES,
            ship: Ship::default(),
            asteroids,
            bullets: Vec::new(),
            frame: 0,
            last_spawn_frame: 0,
        }
    }

    /// Enter play, topping the field up with extra asteroids
    pub fn start(&mut self) {
        for _ in 0..START_EXTRA_ASTEROIDS {
            let asteroid = Asteroid::spawn(&mut self.rng, AsteroidSize::Large);
            self.asteroids.push(asteroid);
        }
        self.phase = Phase::Playing;
        log::info!("Asteroids started with {} asteroids", self.asteroids.len());
    }

    /// Fire a bullet if the in-flight limit allows
    pub fn fire(&mut self) -> bool {
        if self.bullets.len() >= MAX_BULLETS {
            return false;
        }
        self.bullets.push(Bullet::fired_from(&self.ship));
        true
    }
}
