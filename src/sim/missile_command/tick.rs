//! Missile Command tick and input handling
//!
//! Each tick: combo and power-up timers, explosions, enemy launches, player
//! missiles, enemy missiles (shot down or impacting), then the between-wave
//! bookkeeping that drains leftover ammo and advances the level.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

use super::consts::*;
use super::state::{ActivePowerUp, Explosion, Missile, MissileCommandState, MissileKind, Phase, PowerUp};
use crate::error::ActionError;
use crate::sim::collision::within_blast;
use crate::sim::{Controls, GameKind, Simulation, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissileCommandAction {
    /// Launch at a sky cell from the selected base
    Fire { col: i32, row: i32 },
    /// Select the next base that can still fire
    CycleBase,
    NewGame,
}

/// Ticks between enemy launches at this level
pub fn spawn_interval_ticks(level: u32) -> u64 {
    let secs = SPAWN_INTERVAL_BASE_SECS - level.saturating_sub(1) as f64 * SPAWN_INTERVAL_PER_LEVEL_SECS;
    secs_to_ticks(secs.max(SPAWN_INTERVAL_MIN_SECS))
}

/// Enemy missiles allowed in flight at this level
pub fn max_enemy_missiles(level: u32) -> usize {
    (2 + level as usize / 2).min(MAX_ENEMY_MISSILES)
}

pub fn tick(state: &mut MissileCommandState, _controls: &Controls) {
    if state.phase == Phase::GameOver {
        return;
    }
    let now = state.clock;

    if state.combo > 0 && now.saturating_sub(state.last_hit) > secs_to_ticks(COMBO_TIMEOUT_SECS) {
        state.combo = 0;
    }
    if state.power_up.is_some_and(|p| now > p.until) {
        log::debug!("Power-up expired");
        state.power_up = None;
    }

    state.explosions.retain_mut(|e| !e.update());

    let due = state
        .last_enemy_spawn
        .is_none_or(|t| now.saturating_sub(t) > spawn_interval_ticks(state.level));
    if due && state.enemy_missiles.len() < max_enemy_missiles(state.level) {
        spawn_enemy(state);
    }

    advance_player_missiles(state);
    advance_enemy_missiles(state);

    if state.cities_alive() == 0 {
        state.phase = Phase::GameOver;
        log::info!("Missile Command over at level {}, score {}", state.level, state.score);
    } else if state.enemy_missiles.is_empty() {
        between_waves(state);
    }

    state.frame += 1;
    state.clock += 1;
}

/// Launch one enemy missile at a live city (or base, from the base-target level)
fn spawn_enemy(state: &mut MissileCommandState) -> bool {
    let mut targets: Vec<i32> = state
        .cities
        .iter()
        .filter(|c| c.alive)
        .map(|c| c.col)
        .collect();
    if state.level >= BASE_TARGET_LEVEL {
        targets.extend(state.bases.iter().filter(|b| b.alive).map(|b| b.col));
    }
    let Some(&target_col) = targets.choose(&mut state.rng) else {
        return false;
    };

    let starts: Vec<i32> = (0..BOARD_WIDTH)
        .filter(|c| (c - target_col).abs() > SAFE_START_DISTANCE)
        .collect();
    let start_col = match starts.choose(&mut state.rng) {
        Some(&col) => col,
        None => state.rng.random_range(0..BOARD_WIDTH),
    };

    let (kind, steps) = roll_enemy(&mut state.rng, state.level);
    let missile = Missile::new(
        (start_col as f32, 0.0),
        (target_col, SKYLINE_ROW),
        true,
        kind,
        steps,
    );
    log::debug!("Enemy {kind:?} missile from column {start_col} at column {target_col}");

    state.enemy_missiles.push(missile);
    state.last_enemy_spawn = Some(state.clock);
    true
}

/// Pick the variant and step count for a new enemy missile. Split wins when
/// both the fast and split rolls succeed.
fn roll_enemy(rng: &mut Pcg32, level: u32) -> (MissileKind, u32) {
    let shift = level as f64 * LEVEL_SPEED_FACTOR;
    let low = (MIN_MISSILE_STEPS - shift) as i64;
    let high = (MAX_MISSILE_STEPS - shift) as i64;
    let mut kind = MissileKind::Normal;
    let mut steps = rng.random_range(low..=high).max(MISSILE_STEPS_FLOOR) as u32;

    if level >= FAST_MISSILE_LEVEL && rng.random_bool(FAST_MISSILE_CHANCE) {
        kind = MissileKind::Fast;
        steps = rng.random_range(FAST_MISSILE_STEPS..=FAST_MISSILE_STEPS + MISSILE_STEP_SPREAD);
    }
    if level >= SPLIT_MISSILE_LEVEL && rng.random_bool(SPLIT_MISSILE_CHANCE) {
        kind = MissileKind::Split;
        steps = rng.random_range(SPLIT_MISSILE_STEPS..=SPLIT_MISSILE_STEPS + MISSILE_STEP_SPREAD);
    }
    (kind, steps)
}

fn advance_player_missiles(state: &mut MissileCommandState) {
    let large = state.power_up_active(PowerUp::LargeExplosion);
    let radius = if large { LARGE_BLAST_RADIUS } else { PLAYER_BLAST_RADIUS };

    let mut arrived = Vec::new();
    state.player_missiles.retain_mut(|m| {
        if m.update() {
            arrived.push(m.target);
            false
        } else {
            true
        }
    });

    for (col, row) in arrived {
        let mut explosion = Explosion::new(col, row, radius);
        explosion.large = large;
        state.explosions.push(explosion);
    }
}

fn caught_in_blast(explosions: &[Explosion], (col, row): (i32, i32)) -> bool {
    let point = Vec2::new(col as f32, row as f32);
    explosions
        .iter()
        .any(|e| within_blast(point, Vec2::new(e.col as f32, e.row as f32), e.radius as f32))
}

/// Shoot down missiles sitting in a blast, move the rest, and resolve impacts.
/// Fragments of split missiles start moving on the next tick.
fn advance_enemy_missiles(state: &mut MissileCommandState) {
    let missiles = std::mem::take(&mut state.enemy_missiles);
    let mut survivors = Vec::with_capacity(missiles.len());
    let mut fragments = Vec::new();

    for mut missile in missiles {
        if caught_in_blast(&state.explosions, missile.cell()) {
            register_kill(state, missile.kind);
            if missile.kind == MissileKind::Split {
                fragments.extend(split_missile(&mut state.rng, &missile));
            }
            continue;
        }

        if missile.update() {
            impact(state, missile.target);
        } else {
            survivors.push(missile);
        }
    }

    survivors.extend(fragments);
    state.enemy_missiles = survivors;
}

fn register_kill(state: &mut MissileCommandState, kind: MissileKind) {
    state.score += kind.points();
    state.combo += 1;
    state.last_hit = state.clock;
    if state.combo >= COMBO_BONUS_THRESHOLD {
        state.score += state.combo as u64 * COMBO_BONUS_PER_HIT;
    }
}

fn split_missile(rng: &mut Pcg32, parent: &Missile) -> Vec<Missile> {
    let (col, row) = parent.current;
    let anchor = col as i32;
    let low = (anchor - SPLIT_TARGET_SPREAD).max(0);
    let high = (anchor + SPLIT_TARGET_SPREAD).min(BOARD_WIDTH - 1);
    let count = rng.random_range(2..=3);

    (0..count)
        .map(|_| {
            let target_col = rng.random_range(low..=high);
            let steps = rng.random_range(SPLIT_CHILD_STEPS_MIN..=SPLIT_CHILD_STEPS_MAX);
            Missile::new((col, row), (target_col, SKYLINE_ROW), true, MissileKind::Normal, steps)
        })
        .collect()
}

/// An enemy missile reached the ground
fn impact(state: &mut MissileCommandState, (col, row): (i32, i32)) {
    state.explosions.push(Explosion::new(col, row, IMPACT_BLAST_RADIUS));
    if row != SKYLINE_ROW {
        return;
    }
    if let Some(city) = state.cities.iter_mut().find(|c| c.alive && c.col == col) {
        city.alive = false;
        log::info!("City at column {col} destroyed");
    }
    if let Some(base) = state.bases.iter_mut().find(|b| b.alive && b.col == col) {
        base.alive = false;
        log::info!("Base at column {col} destroyed");
    }
}

/// Runs while no enemy missile is in flight
fn between_waves(state: &mut MissileCommandState) {
    if state.frame % LEFTOVER_DRAIN_EVERY == 0 {
        if let Some(base) = state.bases.iter_mut().find(|b| b.can_fire()) {
            base.missiles -= 1;
            state.score += LEFTOVER_MISSILE_POINTS;
        }
    }

    if state.player_missiles.is_empty() && state.explosions.is_empty() && state.frame > LEVEL_MIN_FRAMES {
        level_up(state);
    }
}

fn level_up(state: &mut MissileCommandState) {
    state.level += 1;
    state.score += state.level as u64 * LEVEL_BONUS_PER_LEVEL;
    for base in state.bases.iter_mut().filter(|b| b.alive) {
        base.missiles += LEVEL_REFILL;
    }
    state.last_enemy_spawn = Some(state.clock);
    state.frame = 0;

    if state.rng.random_bool(POWER_UP_CHANCE) {
        let kind = PowerUp::ALL[state.rng.random_range(0..PowerUp::ALL.len())];
        state.power_up = Some(ActivePowerUp {
            kind,
            until: state.clock + secs_to_ticks(POWER_UP_SECS),
        });
        if kind == PowerUp::ExtraMissiles {
            for base in state.bases.iter_mut().filter(|b| b.alive) {
                base.missiles += EXTRA_MISSILES;
            }
        }
        log::info!("Power-up {kind:?} active");
    }

    log::info!("Level {} reached, score {}", state.level, state.score);
}

fn fire(state: &mut MissileCommandState, col: i32, row: i32) -> Result<(), ActionError> {
    if state.phase == Phase::GameOver {
        return Err(ActionError::GameOver);
    }
    if !(0..BOARD_WIDTH).contains(&col) || !(0..GROUND_ROW).contains(&row) {
        return Err(ActionError::OutOfBounds { row, col });
    }

    let selected = state.selected_base;
    let idx = if state.bases.get(selected).is_some_and(|b| b.can_fire()) {
        selected
    } else {
        state
            .bases
            .iter()
            .position(|b| b.can_fire())
            .ok_or(ActionError::OutOfAmmo)?
    };
    state.selected_base = idx;

    let steps = if state.power_up_active(PowerUp::FasterMissiles) {
        FAST_PLAYER_MISSILE_STEPS
    } else {
        PLAYER_MISSILE_STEPS
    };
    let base = &mut state.bases[idx];
    base.missiles -= 1;
    let missile = Missile::new(
        (base.col as f32, SKYLINE_ROW as f32),
        (col, row),
        false,
        MissileKind::Normal,
        steps,
    );
    state.player_missiles.push(missile);
    Ok(())
}

fn cycle_base(state: &mut MissileCommandState) -> Result<(), ActionError> {
    let count = state.bases.len();
    let next = (1..=count)
        .map(|offset| (state.selected_base + offset) % count)
        .find(|&idx| state.bases[idx].can_fire())
        .ok_or(ActionError::OutOfAmmo)?;
    state.selected_base = next;
    Ok(())
}

impl Simulation for MissileCommandState {
    type Action = MissileCommandAction;

    const KIND: GameKind = GameKind::MissileCommand;

    fn new_game(seed: u64) -> Self {
        MissileCommandState::new(seed)
    }

    fn tick(&mut self, controls: &Controls) {
        tick(self, controls);
    }

    fn apply_input(&mut self, action: MissileCommandAction) -> Result<(), ActionError> {
        match action {
            MissileCommandAction::Fire { col, row } => fire(self, col, row),
            MissileCommandAction::CycleBase => cycle_base(self),
            MissileCommandAction::NewGame => {
                self.reset();
                Ok(())
            }
        }
    }

    fn status(&self) -> Status {
        Status {
            phase: self.phase.as_str(),
            score: self.score,
            level: self.level,
            lives: Some(self.cities_alive() as u32),
            finished: self.phase == Phase::GameOver,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.cities.len() != CITY_COLUMNS.len() || self.bases.len() != BASE_COLUMNS.len() {
            return Err("wrong number of cities or bases");
        }
        if self.selected_base >= self.bases.len() {
            return Err("selected base out of range");
        }
        if self.level == 0 {
            return Err("level starts at 1");
        }
        if self.last_hit > self.clock {
            return Err("combo timer ahead of clock");
        }
        if self.last_enemy_spawn.is_some_and(|t| t > self.clock) {
            return Err("spawn timer ahead of clock");
        }
        if self.frame > self.clock {
            return Err("level timer ahead of clock");
        }
        let missiles = self.player_missiles.iter().chain(&self.enemy_missiles);
        for m in missiles {
            if !m.current.0.is_finite() || !m.current.1.is_finite() || m.max_steps == 0 {
                return Err("malformed missile");
            }
        }
        if self
            .explosions
            .iter()
            .any(|e| e.radius < 0 || e.max_radius > LARGE_BLAST_RADIUS)
        {
            return Err("explosion radius out of range");
        }
        Ok(())
    }

    fn reset(&mut self) {
        let seed = self.rng.random();
        *self = MissileCommandState::new(seed);
        log::info!("Missile Command reset");
    }
}
