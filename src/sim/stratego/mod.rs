//! Stratego against a computer opponent
//!
//! Red (the player) deploys by hand or auto-arranges; Blue deploys at random
//! once Red is done. During play Blue answers on the tick after each Red move.

pub mod ai;
pub mod board;
pub mod pieces;

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

pub use board::{BOARD_SIZE, Board, Pos, WATER, is_water};
pub use pieces::{Outcome, Piece, PieceId, PieceKind, Side, resolve};

use crate::error::ActionError;
use crate::sim::{Controls, GameKind, Simulation, Status, seeded_rng};

/// Rows each side deploys on, and the row its flag goes on
const RED_ROWS: std::ops::RangeInclusive<usize> = 6..=9;
const RED_FLAG_ROW: usize = 9;
const BLUE_ROWS: std::ops::RangeInclusive<usize> = 0..=3;
const BLUE_FLAG_ROW: usize = 0;

/// Points per enemy piece removed, and for taking the flag
const CAPTURE_POINTS: u64 = 10;
const FLAG_POINTS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    Play,
    GameOver,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Play => "play",
            Phase::GameOver => "game_over",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategoAction {
    /// Put a reserve piece on a free cell of Red's rows
    Place { kind: PieceKind, row: i32, col: i32 },
    /// Place every remaining reserve piece at random
    AutoArrange,
    /// Move (or attack with) a piece of the side to move
    Move { from: (i32, i32), to: (i32, i32) },
    NewGame,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battle {
    pub attacker: Piece,
    pub defender: Piece,
    pub outcome: Outcome,
    pub at: Pos,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastMove {
    pub side: Side,
    pub kind: PieceKind,
    pub from: Pos,
    pub to: Pos,
    pub battle: Option<Battle>,
    pub flag_captured: bool,
}

/// A cell as one side sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Empty,
    Water,
    Own(PieceKind),
    /// Enemy piece whose identity has been revealed
    Known(PieceKind),
    /// Enemy piece of unknown rank
    Hidden,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategoState {
    pub rng: Pcg32,
    pub phase: Phase,
    pub board: Board,
    pub turn: Side,
    pub winner: Option<Side>,
    /// Red pieces still waiting to be placed
    pub reserve: BTreeMap<PieceKind, u8>,
    /// Pieces whose identity the opponent has seen
    pub revealed: BTreeSet<PieceId>,
    pub battle_log: Vec<Battle>,
    pub last_move: Option<LastMove>,
    pub next_id: PieceId,
    #[serde(default)]
    pub moves_played: u32,
}

impl StrategoState {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: seeded_rng(seed),
            phase: Phase::Setup,
            board: Board::default(),
            turn: Side::Red,
            winner: None,
            reserve: PieceKind::ALL.iter().map(|k| (*k, k.army_count())).collect(),
            revealed: BTreeSet::new(),
            battle_log: Vec::new(),
            last_move: None,
            next_id: 0,
            moves_played: 0,
        }
    }

    pub fn reserve_left(&self) -> usize {
        self.reserve.values().map(|&n| n as usize).sum()
    }

    /// Fog-of-war view of a cell for `viewer`. Everything shows once the game is over.
    pub fn view(&self, viewer: Side, pos: Pos) -> CellView {
        if is_water(pos) {
            return CellView::Water;
        }
        match self.board.get(pos) {
            None => CellView::Empty,
            Some(p) if p.side == viewer => CellView::Own(p.kind),
            Some(p) if self.phase == Phase::GameOver || self.revealed.contains(&p.id) => CellView::Known(p.kind),
            Some(_) => CellView::Hidden,
        }
    }

    /// Enemy pieces removed by Red, in battles either side started
    pub fn red_captures(&self) -> usize {
        self.battle_log
            .iter()
            .filter(|b| match b.outcome {
                Outcome::AttackerWins => b.defender.side == Side::Blue,
                Outcome::DefenderWins => b.attacker.side == Side::Blue,
            })
            .count()
    }

    fn place(&mut self, kind: PieceKind, row: i32, col: i32) -> Result<(), ActionError> {
        if self.phase != Phase::Setup {
            return Err(ActionError::WrongPhase(self.phase.as_str()));
        }
        let pos = Board::locate(row, col).ok_or(ActionError::OutOfBounds { row, col })?;
        if !RED_ROWS.contains(&pos.0) || !self.board.is_free(pos) {
            return Err(ActionError::CellUnavailable);
        }
        let left = self.reserve.get_mut(&kind).ok_or(ActionError::NoneRemaining)?;
        if *left == 0 {
            return Err(ActionError::NoneRemaining);
        }
        *left -= 1;

        self.board.set(
            pos,
            Some(Piece {
                id: self.next_id,
                side: Side::Red,
                kind,
            }),
        );
        self.next_id += 1;

        if self.reserve_left() == 0 {
            self.finish_setup();
        }
        Ok(())
    }

    fn auto_arrange(&mut self) -> Result<(), ActionError> {
        if self.phase != Phase::Setup {
            return Err(ActionError::WrongPhase(self.phase.as_str()));
        }
        let kinds: Vec<PieceKind> = self
            .reserve
            .iter()
            .flat_map(|(&kind, &n)| std::iter::repeat_n(kind, n as usize))
            .collect();
        ai::deploy(
            &mut self.board,
            &mut self.rng,
            Side::Red,
            &kinds,
            RED_ROWS,
            RED_FLAG_ROW,
            &mut self.next_id,
        );
        self.reserve.values_mut().for_each(|n| *n = 0);
        self.finish_setup();
        Ok(())
    }

    /// Blue deploys, then Red moves first
    fn finish_setup(&mut self) {
        let army = PieceKind::army();
        ai::deploy(
            &mut self.board,
            &mut self.rng,
            Side::Blue,
            &army,
            BLUE_ROWS,
            BLUE_FLAG_ROW,
            &mut self.next_id,
        );
        self.phase = Phase::Play;
        self.turn = Side::Red;
        log::info!("Stratego setup complete, red to move");
    }

    fn try_move(&mut self, from: (i32, i32), to: (i32, i32)) -> Result<(), ActionError> {
        if self.phase != Phase::Play {
            return Err(ActionError::WrongPhase(self.phase.as_str()));
        }
        let src = Board::locate(from.0, from.1).ok_or(ActionError::OutOfBounds {
            row: from.0,
            col: from.1,
        })?;
        let dst = Board::locate(to.0, to.1).ok_or(ActionError::OutOfBounds { row: to.0, col: to.1 })?;

        let piece = self.board.get(src).ok_or(ActionError::EmptySource)?;
        if piece.side != self.turn {
            return Err(ActionError::NotYourPiece);
        }
        if !piece.kind.movable() {
            return Err(ActionError::Immovable);
        }
        if !self.board.destinations(src).contains(&dst) {
            return Err(ActionError::IllegalDestination);
        }

        self.execute(src, dst);
        Ok(())
    }

    /// Carry out a move already known to be legal
    fn execute(&mut self, from: Pos, to: Pos) {
        let Some(mover) = self.board.take(from) else {
            return;
        };
        let mut flag_captured = false;
        let mut battle = None;

        match self.board.take(to) {
            None => self.board.set(to, Some(mover)),
            Some(defender) => {
                let outcome = resolve(mover.kind, defender.kind);
                let survivor = match outcome {
                    Outcome::AttackerWins => mover,
                    Outcome::DefenderWins => defender,
                };
                self.board.set(to, Some(survivor));
                self.revealed.insert(survivor.id);
                flag_captured = defender.kind == PieceKind::Flag && outcome == Outcome::AttackerWins;

                log::debug!(
                    "{:?} {:?} attacks {:?} {:?}: {:?}",
                    mover.side,
                    mover.kind,
                    defender.side,
                    defender.kind,
                    outcome
                );
                let record = Battle {
                    attacker: mover,
                    defender,
                    outcome,
                    at: to,
                };
                self.battle_log.push(record.clone());
                battle = Some(record);
            }
        }

        self.last_move = Some(LastMove {
            side: mover.side,
            kind: mover.kind,
            from,
            to,
            battle,
            flag_captured,
        });
        self.moves_played += 1;

        if flag_captured {
            self.end(mover.side, "flag captured");
            return;
        }

        self.turn = mover.side.opponent();
        if !self.board.has_moves(self.turn) {
            self.end(mover.side, "opponent has no legal move");
        }
    }

    fn end(&mut self, winner: Side, reason: &str) {
        self.phase = Phase::GameOver;
        self.winner = Some(winner);
        log::info!("Stratego over, {} wins ({reason})", winner.as_str());
    }
}

impl Simulation for StrategoState {
    type Action = StrategoAction;

    const KIND: GameKind = GameKind::Stratego;

    fn new_game(seed: u64) -> Self {
        StrategoState::new(seed)
    }

    /// Blue moves when it is Blue's turn
    fn tick(&mut self, _controls: &Controls) {
        if self.phase != Phase::Play || self.turn != Side::Blue {
            return;
        }
        match ai::choose_move(&self.board, Side::Blue, &mut self.rng) {
            Some((from, to)) => self.execute(from, to),
            None => self.end(Side::Red, "opponent has no legal move"),
        }
    }

    fn apply_input(&mut self, action: StrategoAction) -> Result<(), ActionError> {
        match action {
            StrategoAction::Place { kind, row, col } => self.place(kind, row, col),
            StrategoAction::AutoArrange => self.auto_arrange(),
            StrategoAction::Move { from, to } => self.try_move(from, to),
            StrategoAction::NewGame => {
                self.reset();
                Ok(())
            }
        }
    }

    fn status(&self) -> Status {
        let captures = self.red_captures() as u64 * CAPTURE_POINTS;
        let bonus = if self.winner == Some(Side::Red) { FLAG_POINTS } else { 0 };
        Status {
            phase: self.phase.as_str(),
            score: captures + bonus,
            level: 1,
            lives: None,
            finished: self.phase == Phase::GameOver,
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.board.cells.len() != BOARD_SIZE * BOARD_SIZE {
            return Err("board has the wrong number of cells");
        }
        // Ids are handed out once per piece, two armies per game
        if usize::from(self.next_id) > 2 * PieceKind::army().len() {
            return Err("piece id counter past both armies");
        }
        if WATER.iter().any(|&pos| self.board.get(pos).is_some()) {
            return Err("piece standing in water");
        }

        let mut ids = BTreeSet::new();
        let mut counts: BTreeMap<(bool, PieceKind), u8> = BTreeMap::new();
        for (_, piece) in self.board.pieces() {
            if !ids.insert(piece.id) || piece.id >= self.next_id {
                return Err("duplicate or unassigned piece id");
            }
            *counts.entry((piece.side == Side::Red, piece.kind)).or_default() += 1;
        }
        if counts.iter().any(|((_, kind), &n)| n > kind.army_count()) {
            return Err("more pieces than an army holds");
        }
        if self.reserve.iter().any(|(kind, &n)| n > kind.army_count()) {
            return Err("reserve larger than an army");
        }
        if self.phase == Phase::Setup && self.board.pieces().any(|(_, p)| p.side == Side::Blue) {
            return Err("blue deployed before red finished");
        }
        if self.phase == Phase::GameOver && self.winner.is_none() {
            return Err("finished game without a winner");
        }
        Ok(())
    }

    fn reset(&mut self) {
        let seed = self.rng.random();
        *self = StrategoState::new(seed);
        log::info!("Stratego reset");
    }
}
