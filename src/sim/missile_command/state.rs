//! Missile Command entities and game state
//!
//! The play field is a coarse grid. Missiles interpolate between a start and
//! a target cell; explosions are integer-radius discs on the same grid.

use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::consts::*;
use crate::sim::seeded_rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Playing,
    GameOver,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Playing => "playing",
            Phase::GameOver => "game_over",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub col: i32,
    pub alive: bool,
}

/// Launch site with its own missile stock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Base {
    pub col: i32,
    pub missiles: u32,
    pub alive: bool,
}

impl Base {
    pub fn can_fire(&self) -> bool {
        self.alive && self.missiles > 0
    }
}

/// Enemy missile variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissileKind {
    Normal,
    Fast,
    /// Breaks into several normal missiles when shot down
    Split,
}

impl MissileKind {
    pub fn points(&self) -> u64 {
        match self {
            MissileKind::Normal => 25,
            MissileKind::Fast => 50,
            MissileKind::Split => 35,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Missile {
    pub start: (f32, f32),
    /// (col, row)
    pub target: (i32, i32),
    /// (col, row), fractional while in flight
    pub current: (f32, f32),
    pub enemy: bool,
    pub kind: MissileKind,
    pub steps: u32,
    pub max_steps: u32,
}

impl Missile {
    pub fn new(start: (f32, f32), target: (i32, i32), enemy: bool, kind: MissileKind, max_steps: u32) -> Self {
        Self {
            start,
            target,
            current: start,
            enemy,
            kind,
            steps: 0,
            max_steps: max_steps.max(1),
        }
    }

    /// Advance one step. Enemy missiles bow along a sine curve, player
    /// missiles fly straight. Returns true on arrival.
    pub fn update(&mut self) -> bool {
        self.steps += 1;
        let progress = (self.steps as f32 / self.max_steps as f32).min(1.0);
        let (sc, sr) = self.start;
        let (tc, tr) = (self.target.0 as f32, self.target.1 as f32);

        let bow = if self.enemy {
            ENEMY_CURVE * (progress * std::f32::consts::PI).sin() * (tc - sc)
        } else {
            0.0
        };

        self.current = (sc + (tc - sc) * progress, sr + (tr - sr) * progress + bow);
        self.steps >= self.max_steps
    }

    /// Grid cell the missile currently occupies
    pub fn cell(&self) -> (i32, i32) {
        (self.current.0.round() as i32, self.current.1.round() as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionStage {
    Growing,
    Holding,
    Fading,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub col: i32,
    pub row: i32,
    pub radius: i32,
    pub max_radius: i32,
    pub held: u32,
    pub stage: ExplosionStage,
    /// Drawn differently when boosted by a power-up
    #[serde(default)]
    pub large: bool,
}

impl Explosion {
    pub fn new(col: i32, row: i32, max_radius: i32) -> Self {
        let stage = if max_radius > 1 {
            ExplosionStage::Growing
        } else {
            ExplosionStage::Holding
        };
        Self {
            col,
            row,
            radius: 1,
            max_radius,
            held: 0,
            stage,
            large: false,
        }
    }

    /// Grow to full size, hold, then shrink away. Returns true when finished.
    pub fn update(&mut self) -> bool {
        match self.stage {
            ExplosionStage::Growing => {
                self.radius += 1;
                if self.radius >= self.max_radius {
                    self.stage = ExplosionStage::Holding;
                }
            }
            ExplosionStage::Holding => {
                self.held += 1;
                if self.held >= EXPLOSION_HOLD_TICKS {
                    self.stage = ExplosionStage::Fading;
                }
            }
            ExplosionStage::Fading => self.radius -= 1,
        }
        self.stage == ExplosionStage::Fading && self.radius <= 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUp {
    LargeExplosion,
    FasterMissiles,
    ExtraMissiles,
}

impl PowerUp {
    pub const ALL: [PowerUp; 3] = [PowerUp::LargeExplosion, PowerUp::FasterMissiles, PowerUp::ExtraMissiles];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub kind: PowerUp,
    /// Clock tick after which it expires
    pub until: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissileCommandState {
    pub rng: Pcg32,
    pub phase: Phase,
    pub score: u64,
    pub level: u32,
    pub cities: Vec<City>,
    pub bases: Vec<Base>,
    pub selected_base: usize,
    pub player_missiles: Vec<Missile>,
    pub enemy_missiles: Vec<Missile>,
    pub explosions: Vec<Explosion>,
    /// Ticks since the current level started
    pub frame: u64,
    /// Ticks since the game started
    pub clock: u64,
    /// None until the first enemy launch
    pub last_enemy_spawn: Option<u64>,
    pub combo: u32,
    pub last_hit: u64,
    #[serde(default)]
    pub power_up: Option<ActivePowerUp>,
}

impl MissileCommandState {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: seeded_rng(seed),
            phase: Phase::Playing,
            score: 0,
            level: 1,
            cities: CITY_COLUMNS
                .iter()
                .map(|&col| City { col, alive: true })
                .collect(),
            bases: BASE_COLUMNS
                .iter()
                .map(|&col| Base {
                    col,
                    missiles: BASE_MISSILES,
                    alive: true,
                })
                .collect(),
            selected_base: 1,
            player_missiles: Vec::new(),
            enemy_missiles: Vec::new(),
            explosions: Vec::new(),
            frame: 0,
            clock: 0,
            last_enemy_spawn: None,
            combo: 0,
            last_hit: 0,
            power_up: None,
        }
    }

    pub fn cities_alive(&self) -> usize {
        self.cities.iter().filter(|c| c.alive).count()
    }

    /// Missiles left across live bases
    pub fn missiles_left(&self) -> u32 {
        self.bases
            .iter()
            .filter(|b| b.alive)
            .map(|b| b.missiles)
            .sum()
    }

    pub fn power_up_active(&self, kind: PowerUp) -> bool {
        self.power_up.is_some_and(|p| p.kind == kind)
    }
}
