//! Arcade Sims entry point
//!
//! Headless runner: drives a persisted session for one game with a scripted
//! autopilot, and manages snapshots and score tables on disk.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::Rng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;

use arcade_sims::highscores::HighScores;
use arcade_sims::persistence::{FileStore, SnapshotStore};
use arcade_sims::platform::{InputBridge, Key, KeyEvent};
use arcade_sims::sim::asteroids::{AsteroidsAction, AsteroidsState, Phase as AsteroidsPhase};
use arcade_sims::sim::minesweeper::{CellView, Difficulty, MinesweeperAction, MinesweeperState};
use arcade_sims::sim::missile_command::{MissileCommandAction, MissileCommandState};
use arcade_sims::sim::stratego::{Phase as StrategoPhase, Side, StrategoAction, StrategoState, ai};
use arcade_sims::sim::{Controls, GameKind, Session, Simulation, seeded_rng};
use arcade_sims::{Settings, Status};

#[derive(Parser)]
#[command(name = "arcade-sims", version, about = "Headless runner for the arcade simulations")]
struct Cli {
    /// Settings file (JSON). Missing or malformed files fall back to defaults.
    #[arg(long, default_value = "arcade-sims.json")]
    config: PathBuf,

    /// Overrides the state directory from the settings file
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resume (or start) a game and run it under the autopilot
    Run {
        game: GameArg,
        #[arg(long, default_value_t = 200)]
        ticks: u64,
        #[arg(long)]
        seed: Option<u64>,
        /// Ignore any saved snapshot
        #[arg(long)]
        fresh: bool,
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// Sleep the game's refresh interval between ticks
        #[arg(long)]
        realtime: bool,
    },
    /// Print the high score table
    Scores { game: GameArg },
    /// Delete the saved snapshot
    Reset { game: GameArg },
}

#[derive(Clone, Copy, ValueEnum)]
enum GameArg {
    Asteroids,
    Minesweeper,
    Stratego,
    MissileCommand,
}

impl From<GameArg> for GameKind {
    fn from(arg: GameArg) -> Self {
        match arg {
            GameArg::Asteroids => GameKind::Asteroids,
            GameArg::Minesweeper => GameKind::Minesweeper,
            GameArg::Stratego => GameKind::Stratego,
            GameArg::MissileCommand => GameKind::MissileCommand,
        }
    }
}

/// Options shared by every game's run loop
struct RunOptions {
    ticks: u64,
    seed: u64,
    fresh: bool,
    realtime: bool,
    refresh_ms: u64,
    difficulty: Difficulty,
    record_high_scores: bool,
}

/// Scripted player: queues discrete actions and returns held controls for
/// the next tick
trait Autopilot: Simulation + Sized {
    fn drive(
        session: &mut Session<Self, FileStore>,
        pilot: &mut Pilot,
        opts: &RunOptions,
    ) -> Controls;
}

/// Autopilot scratch state
struct Pilot {
    rng: Pcg32,
    bridge: InputBridge,
    clock_ms: u64,
}

impl Autopilot for AsteroidsState {
    fn drive(session: &mut Session<Self, FileStore>, pilot: &mut Pilot, _opts: &RunOptions) -> Controls {
        match session.state().phase {
            AsteroidsPhase::Attract => {
                let _ = session.act(AsteroidsAction::Start);
            }
            AsteroidsPhase::GameOver => {
                let _ = session.act(AsteroidsAction::Restart);
            }
            AsteroidsPhase::Playing => {}
        }

        let now = pilot.clock_ms;
        let turning = (session.tick() / 10) % 3 == 0;
        pilot
            .bridge
            .handle(if turning { KeyEvent::Down(Key::Left) } else { KeyEvent::Up(Key::Left) }, now);
        let thrusting = pilot.rng.random_bool(0.2);
        pilot.bridge.handle(
            if thrusting { KeyEvent::Down(Key::Thrust) } else { KeyEvent::Up(Key::Thrust) },
            now,
        );
        pilot.bridge.handle(KeyEvent::Down(Key::Fire), now);
        pilot.bridge.handle(KeyEvent::Up(Key::Fire), now);
        pilot.bridge.controls()
    }
}

impl Autopilot for MinesweeperState {
    fn drive(session: &mut Session<Self, FileStore>, pilot: &mut Pilot, opts: &RunOptions) -> Controls {
        let needs_new_game = {
            let state = session.state();
            state.difficulty != opts.difficulty || state.phase.is_over()
        };
        if needs_new_game {
            let _ = session.act(MinesweeperAction::NewGame(opts.difficulty));
            return Controls::default();
        }

        let state = session.state();
        let board = &state.board;
        let hidden: Vec<(usize, usize)> = (0..board.rows)
            .flat_map(|row| (0..board.cols).map(move |col| (row, col)))
            .filter(|&(row, col)| state.view(row, col) == CellView::Hidden)
            .collect();
        if let Some(&(row, col)) = hidden.choose(&mut pilot.rng) {
            let _ = session.act(MinesweeperAction::Click {
                row: row as i32,
                col: col as i32,
            });
        }
        Controls::default()
    }
}

impl Autopilot for MissileCommandState {
    fn drive(session: &mut Session<Self, FileStore>, pilot: &mut Pilot, _opts: &RunOptions) -> Controls {
        if session.status().finished {
            let _ = session.act(MissileCommandAction::NewGame);
            return Controls::default();
        }

        // Intercept the lowest incoming missile, a little ahead of it
        let lowest = session
            .state()
            .enemy_missiles
            .iter()
            .max_by(|a, b| a.current.1.total_cmp(&b.current.1))
            .map(|m| {
                let (col, row) = m.cell();
                (col, (row + 1).min(m.target.1))
            });
        if let Some((col, row)) = lowest {
            if pilot.rng.random_bool(0.5) {
                let _ = session.act(MissileCommandAction::Fire { col, row });
            }
        }
        if pilot.rng.random_bool(0.1) {
            let _ = session.act(MissileCommandAction::CycleBase);
        }
        Controls::default()
    }
}

impl Autopilot for StrategoState {
    fn drive(session: &mut Session<Self, FileStore>, pilot: &mut Pilot, _opts: &RunOptions) -> Controls {
        let action = match session.state().phase {
            StrategoPhase::Setup => Some(StrategoAction::AutoArrange),
            StrategoPhase::GameOver => Some(StrategoAction::NewGame),
            StrategoPhase::Play if session.state().turn == Side::Red => {
                ai::choose_move(&session.state().board, Side::Red, &mut pilot.rng).map(|(from, to)| {
                    StrategoAction::Move {
                        from: (from.0 as i32, from.1 as i32),
                        to: (to.0 as i32, to.1 as i32),
                    }
                })
            }
            StrategoPhase::Play => None,
        };
        if let Some(action) = action {
            let _ = session.act(action);
        }
        Controls::default()
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut settings = Settings::load(&cli.config);
    if let Some(dir) = cli.state_dir {
        settings.state_dir = dir;
    }

    match cli.command {
        Command::Run {
            game,
            ticks,
            seed,
            fresh,
            difficulty,
            realtime,
        } => {
            let kind = GameKind::from(game);
            let opts = RunOptions {
                ticks,
                seed: seed.or(settings.seed).unwrap_or_else(clock_seed),
                fresh,
                realtime,
                refresh_ms: settings.refresh_ms(kind),
                difficulty: difficulty.unwrap_or(settings.minesweeper_difficulty),
                record_high_scores: settings.record_high_scores,
            };
            let status = match kind {
                GameKind::Asteroids => run::<AsteroidsState>(&settings, &opts),
                GameKind::Minesweeper => run::<MinesweeperState>(&settings, &opts),
                GameKind::Stratego => run::<StrategoState>(&settings, &opts),
                GameKind::MissileCommand => run::<MissileCommandState>(&settings, &opts),
            };
            println!("{kind}: {status}");
            if !status.finished {
                let scores = HighScores::load(&FileStore::for_scores(&settings.state_dir, kind));
                if let Some(rank) = scores.potential_rank(status.score) {
                    println!("Current score would place #{rank} on the {kind} table");
                }
            }
        }
        Command::Scores { game } => {
            let kind = GameKind::from(game);
            let scores = HighScores::load(&FileStore::for_scores(&settings.state_dir, kind));
            if scores.is_empty() {
                println!("No {kind} high scores yet");
            }
            for (rank, entry) in scores.entries.iter().enumerate() {
                println!(
                    "{:>2}. {:>8}  level {:>2}  tick {}",
                    rank + 1,
                    entry.score,
                    entry.level,
                    entry.tick
                );
            }
        }
        Command::Reset { game } => {
            let kind = GameKind::from(game);
            let mut store = FileStore::for_game(&settings.state_dir, kind);
            store
                .clear()
                .with_context(|| format!("clearing {}", store.path().display()))?;
            println!("Cleared saved {kind} game");
        }
    }

    Ok(())
}

fn run<G: Autopilot>(settings: &Settings, opts: &RunOptions) -> Status {
    let store = FileStore::for_game(&settings.state_dir, G::KIND);
    let mut session = if opts.fresh {
        Session::fresh(store, opts.seed)
    } else {
        Session::resume(store, opts.seed)
    };
    if opts.record_high_scores {
        session = session.with_high_scores(FileStore::for_scores(&settings.state_dir, G::KIND));
    }

    let mut pilot = Pilot {
        rng: seeded_rng(opts.seed.rotate_left(17)),
        bridge: InputBridge::new(settings.fire_cooldown_ms),
        clock_ms: 0,
    };

    for _ in 0..opts.ticks {
        let controls = G::drive(&mut session, &mut pilot, opts);
        session.step(&controls);
        pilot.clock_ms += opts.refresh_ms;

        if session.tick() % 50 == 0 {
            log::info!("{} tick {}: {}", G::KIND, session.tick(), session.status());
        }
        if opts.realtime {
            std::thread::sleep(Duration::from_millis(opts.refresh_ms));
        }
    }

    session.status()
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
