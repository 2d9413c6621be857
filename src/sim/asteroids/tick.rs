//! Asteroids tick and input handling
//!
//! Order within a tick: asteroids drift, controls apply, ship moves, bullets
//! move and hit asteroids, spent bullets expire, asteroids hit the ship, then
//! the spawn scheduler runs.

use rand::Rng;

use super::consts::*;
use super::state::{Asteroid, AsteroidSize, AsteroidsState, Phase, Ship};
use crate::error::ActionError;
use crate::sim::collision::collides;
use crate::sim::{Controls, GameKind, Simulation, Status};

/// Discrete inputs from buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsteroidsAction {
    Start,
    Restart,
    RotateLeft,
    RotateRight,
    Thrust,
    Fire,
}

/// Probability of a scheduled spawn for the current score
pub fn spawn_chance(score: u64) -> f64 {
    (SPAWN_CHANCE_BASE + score as f64 * SPAWN_CHANCE_PER_POINT).min(SPAWN_CHANCE_MAX)
}

/// Advance the game by one tick
pub fn tick(state: &mut AsteroidsState, controls: &Controls) {
    if state.phase == Phase::GameOver {
        return;
    }

    for asteroid in &mut state.asteroids {
        asteroid.update();
    }

    if state.phase == Phase::Attract {
        state.ship.heading = (state.ship.heading + ATTRACT_SPIN_DEG).rem_euclid(360.0);
        if state.asteroids.len() < ATTRACT_MAX_ASTEROIDS
            && state.frame % ASTEROID_SPAWN_INTERVAL == 0
        {
            let asteroid = Asteroid::spawn(&mut state.rng, AsteroidSize::Large);
            state.asteroids.push(asteroid);
        }
        state.frame += 1;
        return;
    }

    // Held keys
    if controls.left {
        state.ship.rotate(1);
    }
    if controls.right {
        state.ship.rotate(-1);
    }
    if controls.thrust {
        state.ship.thrust();
    }
    if controls.fire {
        state.fire();
    }

    state.ship.update();

    for bullet in &mut state.bullets {
        bullet.update();
    }
    // A bullet on its last tick of life can still hit
    resolve_bullet_hits(state);
    state.bullets.retain(|b| b.is_alive());

    resolve_ship_hit(state);
    schedule_spawn(state);

    if state.lives == 0 {
        state.phase = Phase::GameOver;
        log::info!("Asteroids game over, final score {}", state.score);
    }

    state.frame += 1;
}

/// Each bullet destroys at most one asteroid. Fragments join the field after
/// the pass so they cannot be hit by the bullet that created them.
fn resolve_bullet_hits(state: &mut AsteroidsState) {
    let mut fragments = Vec::new();
    let mut bullet_idx = 0;

    while bullet_idx < state.bullets.len() {
        let bullet = &state.bullets[bullet_idx];
        let hit = state.asteroids.iter().position(|a| collides(bullet, a));

        match hit {
            Some(asteroid_idx) => {
                state.bullets.remove(bullet_idx);
                let rock = state.asteroids.remove(asteroid_idx);
                state.score += rock.size.points();

                if let Some((child, spread)) = rock.size.split() {
                    for _ in 0..2 {
                        fragments.push(Asteroid::fragment(&mut state.rng, rock.pos, child, spread));
                    }
                }
            }
            None => bullet_idx += 1,
        }
    }

    state.asteroids.extend(fragments);
}

fn resolve_ship_hit(state: &mut AsteroidsState) {
    if !state.ship.is_vulnerable() {
        return;
    }
    if state.asteroids.iter().any(|a| collides(&state.ship, a)) {
        state.lives = state.lives.saturating_sub(1);
        state.ship = Ship::respawned();
        log::debug!("Ship destroyed, {} lives left", state.lives);
    }
}

/// Spawn a new asteroid if below the cap and the interval has passed.
/// Returns true when one was added.
fn schedule_spawn(state: &mut AsteroidsState) -> bool {
    if state.asteroids.len() >= ASTEROID_MAX_COUNT {
        return false;
    }
    if state.frame.saturating_sub(state.last_spawn_frame) <= ASTEROID_SPAWN_INTERVAL {
        return false;
    }
    if !state.rng.random_bool(spawn_chance(state.score)) {
        return false;
    }

    let asteroid = Asteroid::spawn(&mut state.rng, AsteroidSize::Large);
    state.asteroids.push(asteroid);
    state.last_spawn_frame = state.frame;
    log::debug!("Spawned asteroid at frame {}", state.frame);
    true
}

fn require(state: &AsteroidsState, phase: Phase) -> Result<(), ActionError> {
    if state.phase == phase {
        Ok(())
    } else {
        Err(ActionError::WrongPhase(state.phase.as_str()))
    }
}

/// Apply a button press
pub fn apply_action(state: &mut AsteroidsState, action: AsteroidsAction) -> Result<(), ActionError> {
    match action {
        AsteroidsAction::Restart => {
            state.reset();
            state.start();
        }
        AsteroidsAction::Start => {
            require(state, Phase::Attract)?;
            state.start();
        }
        AsteroidsAction::RotateLeft => {
            require(state, Phase::Playing)?;
            state.ship.rotate(BUTTON_ROTATION_STEPS);
        }
        AsteroidsAction::RotateRight => {
            require(state, Phase::Playing)?;
            state.ship.rotate(-BUTTON_ROTATION_STEPS);
        }
        AsteroidsAction::Thrust => {
            require(state, Phase::Playing)?;
            state.ship.thrust();
        }
        AsteroidsAction::Fire => {
            require(state, Phase::Playing)?;
            if !state.fire() {
                return Err(ActionError::ProjectileLimit);
            }
        }
    }
    Ok(())
}

impl Simulation for AsteroidsState {
    type Action = AsteroidsAction;

    const KIND: GameKind = GameKind::Asteroids;

    fn new_game(seed: u64) -> Self {
        AsteroidsState::new(seed)
    }

    fn tick(&mut self, controls: &Controls) {
        tick(self, controls);
    }

    fn apply_input(&mut self, action: AsteroidsAction) -> Result<(), ActionError> {
        apply_action(self, action)
    }

    fn status(&self) -> Status {
        Status {
            phase: self.phase.as_str(),
            score: self.score,
            level: 1,
            lives: Some(self.lives),
            finished: self.phase == Phase::GameOver,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.lives > STARTING_LIVES {
            return Err("more lives than a game starts with");
        }
        if self.bullets.len() > MAX_BULLETS {
            return Err("too many bullets");
        }
        if self.bullets.iter().any(|b| b.life > BULLET_LIFE) {
            return Err("bullet lifetime out of range");
        }
        if !self.ship.pos.is_finite() || !self.ship.speed.is_finite() {
            return Err("ship motion is not finite");
        }
        if self
            .asteroids
            .iter()
            .any(|a| !a.pos.is_finite() || !a.vel.is_finite() || a.outline.len() != OUTLINE_VERTICES)
        {
            return Err("malformed asteroid");
        }
        Ok(())
    }

    fn reset(&mut self) {
        let seed = self.rng.random();
        *self = AsteroidsState::new(seed);
        log::info!("Asteroids reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::asteroids::state::Bullet;
    use glam::Vec2;
    use proptest::prelude::*;

    fn still_rock(pos: Vec2, size: AsteroidSize) -> Asteroid {
        Asteroid {
            pos,
            vel: Vec2::ZERO,
            size,
            rotation: 0.0,
            rotation_speed: 0.0,
            outline: vec![0.0; OUTLINE_VERTICES],
        }
    }

    fn playing_state(seed: u64) -> AsteroidsState {
        let mut state = AsteroidsState::new(seed);
        state.asteroids.clear();
        state.phase = Phase::Playing;
        state
    }

    #[test]
    fn test_new_game_is_in_attract() {
        let state = AsteroidsState::new(7);
        assert_eq!(state.phase, Phase::Attract);
        assert_eq!(state.asteroids.len(), ATTRACT_ASTEROIDS);
        assert_eq!(state.score, 0);
        assert_eq!(state.lives, STARTING_LIVES);
    }

    #[test]
    fn test_start_adds_asteroids() {
        let mut state = AsteroidsState::new(7);
        state.apply_input(AsteroidsAction::Start).unwrap();
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.asteroids.len(), ATTRACT_ASTEROIDS + START_EXTRA_ASTEROIDS);

        // Starting twice is rejected
        assert_eq!(
            state.apply_input(AsteroidsAction::Start),
            Err(ActionError::WrongPhase("playing"))
        );
    }

    #[test]
    fn test_controls_rejected_before_start() {
        let mut state = AsteroidsState::new(7);
        let heading = state.ship.heading;
        assert!(state.apply_input(AsteroidsAction::RotateLeft).is_err());
        assert!(state.apply_input(AsteroidsAction::Fire).is_err());
        assert_eq!(state.ship.heading, heading);
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_spawned_asteroids_respect_speed_floor() {
        let mut rng = crate::sim::seeded_rng(99);
        for _ in 0..200 {
            let a = Asteroid::spawn(&mut rng, AsteroidSize::Large);
            assert!(a.vel.x.abs() >= MIN_VELOCITY_COMPONENT);
            assert!(a.vel.y.abs() >= MIN_VELOCITY_COMPONENT);
            assert!(a.vel.length() >= MIN_ASTEROID_SPEED - 1e-4);
            assert_eq!(a.outline.len(), OUTLINE_VERTICES);
        }
    }

    #[test]
    fn test_outline_is_stable_between_frames() {
        let mut rng = crate::sim::seeded_rng(3);
        let rock = Asteroid::spawn(&mut rng, AsteroidSize::Medium);
        assert_eq!(rock.outline_points(), rock.outline_points());
    }

    #[test]
    fn test_large_asteroid_splits_into_two_mediums() {
        let mut state = playing_state(1);
        state.asteroids.push(still_rock(Vec2::new(100.0, 100.0), AsteroidSize::Large));
        state.bullets.push(Bullet {
            pos: Vec2::new(100.0, 100.0),
            heading: 0.0,
            life: BULLET_LIFE,
        });

        tick(&mut state, &Controls::default());

        assert_eq!(state.score, AsteroidSize::Large.points());
        assert!(state.bullets.is_empty());
        assert_eq!(state.asteroids.len(), 2);
        assert!(state.asteroids.iter().all(|a| a.size == AsteroidSize::Medium));
        assert!(state.asteroids.iter().all(|a| a.pos == Vec2::new(100.0, 100.0)));
    }

    #[test]
    fn test_small_asteroid_is_removed() {
        let mut state = playing_state(1);
        state.asteroids.push(still_rock(Vec2::new(100.0, 100.0), AsteroidSize::Small));
        state.bullets.push(Bullet {
            pos: Vec2::new(95.0, 100.0),
            heading: 0.0,
            life: BULLET_LIFE,
        });

        tick(&mut state, &Controls::default());

        assert_eq!(state.score, 100);
        assert!(state.asteroids.is_empty());
    }

    #[test]
    fn test_bullet_hits_only_one_asteroid() {
        let mut state = playing_state(1);
        state.asteroids.push(still_rock(Vec2::new(100.0, 100.0), AsteroidSize::Small));
        state.asteroids.push(still_rock(Vec2::new(105.0, 100.0), AsteroidSize::Small));
        state.bullets.push(Bullet {
            pos: Vec2::new(92.0, 100.0),
            heading: 0.0,
            life: BULLET_LIFE,
        });

        tick(&mut state, &Controls::default());

        assert_eq!(state.score, 100);
        assert_eq!(state.asteroids.len(), 1);
    }

    #[test]
    fn test_bullet_expires() {
        let mut state = playing_state(1);
        state.bullets.push(Bullet {
            pos: Vec2::new(10.0, 10.0),
            heading: 0.0,
            life: 1,
        });
        tick(&mut state, &Controls::default());
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_bullet_hits_on_its_last_tick() {
        let mut state = playing_state(1);
        state.asteroids.push(still_rock(Vec2::new(100.0, 100.0), AsteroidSize::Small));
        state.bullets.push(Bullet {
            pos: Vec2::new(95.0, 100.0),
            heading: 0.0,
            life: 1,
        });

        tick(&mut state, &Controls::default());

        assert_eq!(state.score, 100);
        assert!(state.asteroids.is_empty());
        assert!(state.bullets.is_empty());
    }

    #[test]
    fn test_ship_collision_costs_a_life() {
        let mut state = playing_state(1);
        let center = state.ship.pos;
        state.asteroids.push(still_rock(center, AsteroidSize::Large));

        tick(&mut state, &Controls::default());
        assert_eq!(state.lives, STARTING_LIVES - 1);
        assert_eq!(state.ship.pos, center);

        // Respawn immunity keeps the rock parked on the ship from draining lives
        tick(&mut state, &Controls::default());
        assert_eq!(state.lives, STARTING_LIVES - 1);
    }

    #[test]
    fn test_game_over_when_out_of_lives() {
        let mut state = playing_state(1);
        state.lives = 1;
        let center = state.ship.pos;
        state.asteroids.push(still_rock(center, AsteroidSize::Large));

        tick(&mut state, &Controls::default());
        assert_eq!(state.phase, Phase::GameOver);
        assert!(state.status().finished);

        // Frozen afterwards
        let frame = state.frame;
        tick(&mut state, &Controls::default());
        assert_eq!(state.frame, frame);
    }

    #[test]
    fn test_spawn_chance_is_capped() {
        assert!((spawn_chance(0) - 0.3).abs() < 1e-9);
        assert!((spawn_chance(200) - 0.5).abs() < 1e-9);
        assert!((spawn_chance(10_000) - SPAWN_CHANCE_MAX).abs() < 1e-9);
    }

    #[test]
    fn test_scheduler_never_spawns_at_cap() {
        let mut state = playing_state(5);
        for i in 0..ASTEROID_MAX_COUNT {
            state
                .asteroids
                .push(still_rock(Vec2::new(60.0 * i as f32 + 30.0, 60.0), AsteroidSize::Small));
        }
        state.frame = 10_000;
        state.score = 10_000;
        assert!(!schedule_spawn(&mut state));
        assert_eq!(state.asteroids.len(), ASTEROID_MAX_COUNT);
    }

    #[test]
    fn test_reset_twice_is_idempotent() {
        let mut state = AsteroidsState::new(11);
        state.apply_input(AsteroidsAction::Start).unwrap();
        state.score = 500;
        state.lives = 1;

        for _ in 0..2 {
            state.reset();
            assert_eq!(state.score, 0);
            assert_eq!(state.lives, STARTING_LIVES);
            assert_eq!(state.phase, Phase::Attract);
            assert_eq!(state.asteroids.len(), ATTRACT_ASTEROIDS);
            assert!(state.bullets.is_empty());
        }
    }

    #[test]
    fn test_determinism() {
        let mut a = AsteroidsState::new(424242);
        let mut b = AsteroidsState::new(424242);
        a.start();
        b.start();
        let controls = Controls {
            thrust: true,
            fire: true,
            ..Default::default()
        };
        for _ in 0..500 {
            tick(&mut a, &controls);
            tick(&mut b, &controls);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.asteroids.len(), b.asteroids.len());
        assert_eq!(a.ship.pos, b.ship.pos);
    }

    proptest! {
        #[test]
        fn prop_ship_and_bullets_stay_in_field(
            seed in any::<u64>(),
            script in proptest::collection::vec(any::<(bool, bool, bool, bool)>(), 1..300),
        ) {
            let mut state = AsteroidsState::new(seed);
            state.start();
            for (left, right, thrust, fire) in script {
                tick(&mut state, &Controls { left, right, thrust, fire });
                let p = state.ship.pos;
                prop_assert!(p.x >= 0.0 && p.x < FIELD_WIDTH && p.y >= 0.0 && p.y < FIELD_HEIGHT);
                for b in &state.bullets {
                    prop_assert!(b.pos.x >= 0.0 && b.pos.x < FIELD_WIDTH);
                    prop_assert!(b.pos.y >= 0.0 && b.pos.y < FIELD_HEIGHT);
                    prop_assert!(b.life > 0);
                }
                prop_assert!(state.bullets.len() <= MAX_BULLETS);
                for a in &state.asteroids {
                    let margin = a.size.radius() * 2.0;
                    prop_assert!(a.pos.x >= -margin - MAX_ASTEROID_SPEED && a.pos.x <= FIELD_WIDTH + margin + MAX_ASTEROID_SPEED);
                }
            }
        }
    }
}
