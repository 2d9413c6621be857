//! Session driver: one game state plus the store it is persisted to
//!
//! The snapshot is read once when the session starts and written after every
//! tick and every accepted action. Storage problems are logged and never stop
//! the game.

use crate::error::ActionError;
use crate::highscores::HighScores;
use crate::persistence::{SnapshotStore, decode, encode};
use crate::sim::{Controls, Simulation, Status};

/// Score table and the store it lives in
struct ScoreBoard<S> {
    table: HighScores,
    store: S,
}

pub struct Session<G: Simulation, S: SnapshotStore> {
    state: G,
    tick: u64,
    store: S,
    scores: Option<ScoreBoard<S>>,
    /// Final score of the current game already went to the table
    recorded: bool,
}

impl<G: Simulation, S: SnapshotStore> Session<G, S> {
    /// Resume the snapshot in `store`, or start a new game from `seed` when
    /// there is none or it cannot be decoded.
    pub fn resume(store: S, seed: u64) -> Self {
        let restored = match store.load() {
            Ok(Some(json)) => match decode::<G>(&json) {
                Ok(restored) => Some(restored),
                Err(e) => {
                    log::warn!("Discarding {} snapshot: {e}", G::KIND);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                log::warn!("Could not read {} snapshot: {e}", G::KIND);
                None
            }
        };

        match restored {
            Some((state, tick)) => {
                log::info!("Resumed {} at tick {tick}", G::KIND);
                let recorded = state.status().finished;
                Self {
                    state,
                    tick,
                    store,
                    scores: None,
                    recorded,
                }
            }
            None => Self::fresh(store, seed),
        }
    }

    /// Start a new game, ignoring whatever `store` holds
    pub fn fresh(store: S, seed: u64) -> Self {
        log::info!("New {} game (seed {seed})", G::KIND);
        let mut session = Self {
            state: G::new_game(seed),
            tick: 0,
            store,
            scores: None,
            recorded: false,
        };
        session.persist();
        session
    }

    /// Record final scores into the table kept in `store`
    pub fn with_high_scores(mut self, store: S) -> Self {
        self.scores = Some(ScoreBoard {
            table: HighScores::load(&store),
            store,
        });
        self
    }

    /// Advance one tick and persist
    pub fn step(&mut self, controls: &Controls) {
        self.state.tick(controls);
        self.tick += 1;
        self.after_change();
    }

    /// Apply one discrete input. Accepted inputs are persisted; rejected ones
    /// change nothing.
    pub fn act(&mut self, action: G::Action) -> Result<(), ActionError> {
        let label = format!("{action:?}");
        match self.state.apply_input(action) {
            Ok(()) => {
                self.after_change();
                Ok(())
            }
            Err(e) => {
                log::debug!("{} rejected {label}: {e}", G::KIND);
                Err(e)
            }
        }
    }

    /// Discard the current game and start over
    pub fn reset(&mut self) {
        self.state.reset();
        self.tick = 0;
        self.recorded = false;
        log::info!("Reset {}", G::KIND);
        self.persist();
    }

    pub fn state(&self) -> &G {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.state.status()
    }

    /// Ticks stepped since the game started
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn high_scores(&self) -> Option<&HighScores> {
        self.scores.as_ref().map(|board| &board.table)
    }

    fn after_change(&mut self) {
        let status = self.state.status();
        if !status.finished {
            self.recorded = false;
        } else if !self.recorded {
            self.recorded = true;
            log::info!("{} finished: {status}", G::KIND);
            self.record_score(&status);
        }
        self.persist();
    }

    fn record_score(&mut self, status: &Status) {
        let Some(board) = self.scores.as_mut() else {
            return;
        };
        if let Some(rank) = board.table.add_score(status.score, status.level, self.tick) {
            log::info!("New {} high score #{rank}: {}", G::KIND, status.score);
            if let Err(e) = board.table.save(&mut board.store) {
                log::warn!("Could not save {} high scores: {e}", G::KIND);
            }
        }
    }

    fn persist(&mut self) {
        let result = encode(&self.state, self.tick).and_then(|json| self.store.save(&json));
        if let Err(e) = result {
            log::warn!("Could not save {} snapshot: {e}", G::KIND);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::asteroids::{AsteroidsAction, AsteroidsState};
    use crate::sim::minesweeper::{MinesweeperAction, MinesweeperState};

    #[test]
    fn test_fresh_session_is_saved() {
        let session: Session<AsteroidsState, _> = Session::resume(MemoryStore::default(), 5);
        assert_eq!(session.tick(), 0);
        assert!(session.store().contents.is_some());
    }

    #[test]
    fn test_resume_picks_up_where_it_left_off() {
        let mut session: Session<AsteroidsState, _> = Session::resume(MemoryStore::default(), 5);
        session.act(AsteroidsAction::Start).unwrap();
        for _ in 0..10 {
            session.step(&Controls::default());
        }

        let resumed: Session<AsteroidsState, _> = Session::resume(session.store().clone(), 999);
        assert_eq!(resumed.tick(), 10);
        assert_eq!(resumed.status(), session.status());
        assert_eq!(resumed.state().asteroids.len(), session.state().asteroids.len());
    }

    #[test]
    fn test_corrupt_snapshot_starts_fresh() {
        let store = MemoryStore::with_contents("{\"format_version\": 1, \"game\": \"asteroids\"");
        let session: Session<AsteroidsState, _> = Session::resume(store, 5);
        assert_eq!(session.tick(), 0);
        assert_eq!(session.status().score, 0);
        // Replaced by a decodable snapshot
        let json = session.store().contents.clone().unwrap();
        assert!(decode::<AsteroidsState>(&json).is_ok());
    }

    #[test]
    fn test_other_games_snapshot_starts_fresh() {
        let asteroids: Session<AsteroidsState, _> = Session::resume(MemoryStore::default(), 5);
        let session: Session<MinesweeperState, _> = Session::resume(asteroids.store().clone(), 5);
        assert_eq!(session.status().phase, "ready");
    }

    #[test]
    fn test_save_failure_is_not_fatal() {
        let store = MemoryStore {
            contents: None,
            fail_saves: true,
        };
        let mut session: Session<AsteroidsState, _> = Session::resume(store, 5);
        session.act(AsteroidsAction::Start).unwrap();
        session.step(&Controls::default());
        assert_eq!(session.tick(), 1);
        assert_eq!(session.status().phase, "playing");
    }

    #[test]
    fn test_rejected_action_is_not_saved() {
        let mut session: Session<AsteroidsState, _> = Session::resume(MemoryStore::default(), 5);
        let before = session.store().contents.clone();
        assert!(session.act(AsteroidsAction::Fire).is_err());
        assert_eq!(session.store().contents, before);
    }

    #[test]
    fn test_finished_game_recorded_once() {
        let mut session: Session<MinesweeperState, _> =
            Session::resume(MemoryStore::default(), 11).with_high_scores(MemoryStore::default());
        session.act(MinesweeperAction::Reveal { row: 4, col: 4 }).unwrap();

        if !session.status().finished {
            // Step on a mine
            let mine = session
                .state()
                .board
                .cells
                .iter()
                .position(|c| c.mine)
                .unwrap();
            let cols = session.state().board.cols;
            session
                .act(MinesweeperAction::Reveal {
                    row: (mine / cols) as i32,
                    col: (mine % cols) as i32,
                })
                .unwrap();
        }
        assert!(session.status().finished);

        let score = session.status().score;
        for _ in 0..3 {
            session.step(&Controls::default());
        }
        let table = session.high_scores().unwrap();
        assert_eq!(table.entries.len(), 1);
        assert_eq!(table.top_score(), Some(score));
    }

    #[test]
    fn test_reset_clears_tick() {
        let mut session: Session<AsteroidsState, _> = Session::resume(MemoryStore::default(), 5);
        session.step(&Controls::default());
        session.step(&Controls::default());
        session.reset();
        assert_eq!(session.tick(), 0);
        assert_eq!(session.status().score, 0);
    }
}
