//! Sessions persisted to disk, resumed, and recorded into score tables

use std::fs;
use std::path::PathBuf;

use arcade_sims::highscores::HighScores;
use arcade_sims::persistence::{FileStore, SnapshotStore, encode};
use arcade_sims::sim::missile_command::{MissileCommandAction, MissileCommandState};
use arcade_sims::sim::stratego::{Phase, Piece, PieceId, PieceKind, Side, StrategoAction, StrategoState, ai};
use arcade_sims::sim::{Controls, GameKind, Session};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("arcade-sims-it-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn test_missile_command_resumes_from_disk() {
    let dir = scratch_dir("missile");
    let store = FileStore::for_game(&dir, GameKind::MissileCommand);

    let mut session: Session<MissileCommandState, _> = Session::resume(store.clone(), 21);
    for tick in 0..40 {
        if tick % 4 == 0 {
            let _ = session.act(MissileCommandAction::Fire { col: 7, row: 5 });
        }
        session.step(&Controls::default());
    }

    let mut resumed: Session<MissileCommandState, _> = Session::resume(store.clone(), 999);
    assert_eq!(resumed.tick(), 40);
    assert_eq!(resumed.status(), session.status());

    // Both copies continue along the same path
    for _ in 0..20 {
        session.step(&Controls::default());
        resumed.step(&Controls::default());
    }
    assert_eq!(resumed.status(), session.status());
    assert_eq!(
        resumed.state().enemy_missiles.len(),
        session.state().enemy_missiles.len()
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_garbage_file_is_replaced() {
    let dir = scratch_dir("garbage");
    let mut store = FileStore::for_game(&dir, GameKind::Stratego);
    store.save("{\"format_version\": 7}").unwrap();

    let session: Session<StrategoState, _> = Session::resume(store.clone(), 3);
    assert_eq!(session.tick(), 0);
    assert_eq!(session.state().phase, Phase::Setup);

    let again: Session<StrategoState, _> = Session::resume(store, 4);
    assert_eq!(again.state().board.cells, session.state().board.cells);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_stratego_flag_capture_records_score() {
    let dir = scratch_dir("stratego");
    let mut store = FileStore::for_game(&dir, GameKind::Stratego);
    let scores = FileStore::for_scores(&dir, GameKind::Stratego);

    // Red's marshal stands next to Blue's flag
    let mut endgame = StrategoState::new(8);
    endgame.phase = Phase::Play;
    endgame.turn = Side::Red;
    endgame.reserve.clear();
    let pieces = [
        ((1, 0), Side::Red, PieceKind::Marshal),
        ((9, 9), Side::Red, PieceKind::Flag),
        ((0, 0), Side::Blue, PieceKind::Flag),
        ((0, 9), Side::Blue, PieceKind::Scout),
    ];
    for (id, (pos, side, kind)) in pieces.into_iter().enumerate() {
        endgame.board.set(pos, Some(Piece { id: id as PieceId, side, kind }));
    }
    endgame.next_id = pieces.len() as PieceId;
    store.save(&encode(&endgame, 30).unwrap()).unwrap();

    let mut session: Session<StrategoState, _> =
        Session::resume(store, 1).with_high_scores(scores.clone());
    assert_eq!(session.tick(), 30);
    session
        .act(StrategoAction::Move { from: (1, 0), to: (0, 0) })
        .unwrap();

    assert!(session.status().finished);
    assert_eq!(session.state().winner, Some(Side::Red));
    assert_eq!(session.status().score, 110);

    // Later ticks do not record the same game again
    session.step(&Controls::default());
    let table = HighScores::load(&scores);
    assert_eq!(table.entries.len(), 1);
    assert_eq!(table.top_score(), Some(110));
    assert_eq!(table.entries[0].tick, 30);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_stratego_autoplay_stays_valid_across_resumes() {
    let dir = scratch_dir("stratego-autoplay");
    let store = FileStore::for_game(&dir, GameKind::Stratego);

    let mut session: Session<StrategoState, _> = Session::resume(store.clone(), 8);
    session.act(StrategoAction::AutoArrange).unwrap();
    assert_eq!(session.state().phase, Phase::Play);

    let mut rng = arcade_sims::sim::seeded_rng(80);
    for _ in 0..200 {
        if session.status().finished {
            break;
        }
        if session.state().turn == Side::Red {
            if let Some((from, to)) = ai::choose_move(&session.state().board, Side::Red, &mut rng) {
                session
                    .act(StrategoAction::Move {
                        from: (from.0 as i32, from.1 as i32),
                        to: (to.0 as i32, to.1 as i32),
                    })
                    .unwrap();
            }
        }
        session.step(&Controls::default());
    }
    assert!(session.state().moves_played > 0);

    let resumed: Session<StrategoState, _> = Session::resume(store, 99);
    assert_eq!(resumed.tick(), session.tick());
    assert_eq!(resumed.state().board.cells, session.state().board.cells);
    assert_eq!(resumed.status(), session.status());

    let _ = fs::remove_dir_all(&dir);
}
