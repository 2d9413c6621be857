//! Versioned snapshot envelope

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::sim::{GameKind, Simulation};

/// Current snapshot format. Bump when a state layout changes incompatibly.
pub const FORMAT_VERSION: u32 = 1;

/// Outer wrapper around a serialized game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub format_version: u32,
    pub game: GameKind,
    /// Session tick count when the snapshot was taken
    pub tick: u64,
    pub state: T,
}

/// Just the tag fields, checked before the state is decoded
#[derive(Deserialize)]
struct Header {
    format_version: u32,
    game: GameKind,
}

/// Serialize a game state with its tick count
pub fn encode<G: Simulation>(state: &G, tick: u64) -> Result<String, PersistError> {
    let envelope = Envelope {
        format_version: FORMAT_VERSION,
        game: G::KIND,
        tick,
        state,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Decode and validate a snapshot for game `G`, returning the state and tick
pub fn decode<G: Simulation>(json: &str) -> Result<(G, u64), PersistError> {
    let header: Header = serde_json::from_str(json)?;
    if header.format_version != FORMAT_VERSION {
        return Err(PersistError::Version {
            found: header.format_version,
            expected: FORMAT_VERSION,
        });
    }
    if header.game != G::KIND {
        return Err(PersistError::WrongGame {
            found: header.game,
            expected: G::KIND,
        });
    }

    let envelope: Envelope<G> = serde_json::from_str(json)?;
    envelope.state.validate().map_err(PersistError::Invalid)?;
    Ok((envelope.state, envelope.tick))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::asteroids::AsteroidsState;
    use crate::sim::minesweeper::{MinesweeperAction, MinesweeperState};
    use crate::sim::missile_command::MissileCommandState;
    use crate::sim::stratego::StrategoState;
    use crate::sim::{Controls, Session};

    fn assert_invalid<G: Simulation>(state: &G) {
        let json = encode(state, 0).unwrap();
        assert!(matches!(decode::<G>(&json), Err(PersistError::Invalid(_))));
    }

    #[test]
    fn test_resumed_state_continues_identically() {
        let mut game = MinesweeperState::new_game(77);
        game.apply_input(MinesweeperAction::Reveal { row: 4, col: 4 })
            .unwrap();
        let json = encode(&game, 12).unwrap();

        let (restored, tick): (MinesweeperState, u64) = decode(&json).unwrap();
        assert_eq!(tick, 12);
        assert_eq!(restored.board.cells, game.board.cells);

        // Same RNG stream after the round trip
        let mut a = game.clone();
        let mut b = restored;
        a.reset();
        b.reset();
        assert_eq!(a.board.cells, b.board.cells);
        a.apply_input(MinesweeperAction::Reveal { row: 0, col: 0 }).unwrap();
        b.apply_input(MinesweeperAction::Reveal { row: 0, col: 0 }).unwrap();
        assert_eq!(a.board.cells, b.board.cells);
    }

    #[test]
    fn test_wrong_game_rejected() {
        let json = encode(&AsteroidsState::new_game(1), 0).unwrap();
        match decode::<StrategoState>(&json) {
            Err(PersistError::WrongGame { found, expected }) => {
                assert_eq!(found, GameKind::Asteroids);
                assert_eq!(expected, GameKind::Stratego);
            }
            other => panic!("expected WrongGame, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_version_rejected() {
        let json = encode(&AsteroidsState::new_game(1), 0)
            .unwrap()
            .replace("\"format_version\":1", "\"format_version\":99");
        assert!(matches!(
            decode::<AsteroidsState>(&json),
            Err(PersistError::Version { found: 99, .. })
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(decode::<AsteroidsState>("not json"), Err(PersistError::Json(_))));
        assert!(matches!(decode::<AsteroidsState>("{}"), Err(PersistError::Json(_))));
        let truncated = r#"{"format_version":1,"game":"asteroids","tick":3,"state":{"score":5}}"#;
        assert!(matches!(decode::<AsteroidsState>(truncated), Err(PersistError::Json(_))));
    }

    #[test]
    fn test_invalid_state_rejected() {
        let mut game = MinesweeperState::new_game(3);
        game.board.cells.truncate(10);
        let json = encode(&game, 0).unwrap();
        assert!(matches!(
            decode::<MinesweeperState>(&json),
            Err(PersistError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_asteroids_rejected() {
        let mut game = AsteroidsState::new_game(3);
        game.asteroids[0].outline.truncate(4);
        assert_invalid(&game);

        let mut game = AsteroidsState::new_game(3);
        game.lives = 99;
        assert_invalid(&game);
    }

    #[test]
    fn test_missile_timers_ahead_of_clock_rejected() {
        let mut game = MissileCommandState::new_game(3);
        game.combo = 2;
        game.last_hit = 50;
        assert_invalid(&game);

        let mut game = MissileCommandState::new_game(3);
        game.last_enemy_spawn = Some(50);
        assert_invalid(&game);

        // The session falls back to a fresh game that ticks normally
        let store = MemoryStore::with_contents(encode(&game, 7).unwrap());
        let mut session: Session<MissileCommandState, _> = Session::resume(store, 3);
        assert_eq!(session.tick(), 0);
        session.step(&Controls::default());
        assert_eq!(session.tick(), 1);
    }

    #[test]
    fn test_runaway_stratego_ids_rejected() {
        let mut game = StrategoState::new_game(3);
        game.next_id = u16::MAX;
        assert_invalid(&game);

        let store = MemoryStore::with_contents(encode(&game, 7).unwrap());
        let mut session: Session<StrategoState, _> = Session::resume(store, 3);
        assert_eq!(session.state().next_id, 0);
        session.act(crate::sim::stratego::StrategoAction::AutoArrange).unwrap();
        assert_eq!(session.state().next_id, 80);
    }
}
