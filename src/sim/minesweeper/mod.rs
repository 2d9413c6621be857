//! Minesweeper
//!
//! Mines are laid on the first reveal so the opening click and its
//! neighbours are always safe. The game is won once every hidden cell is a mine.

pub mod board;

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

pub use board::{Board, Cell, Reveal};

use crate::error::ActionError;
use crate::sim::{Controls, GameKind, Simulation, Status, seeded_rng};

/// Board presets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Expert,
}

impl Difficulty {
    /// (rows, cols, mines)
    pub fn layout(&self) -> (usize, usize, usize) {
        match self {
            Difficulty::Beginner => (9, 9, 10),
            Difficulty::Intermediate => (16, 16, 40),
            Difficulty::Expert => (16, 30, 99),
        }
    }

    pub fn level(&self) -> u32 {
        match self {
            Difficulty::Beginner => 1,
            Difficulty::Intermediate => 2,
            Difficulty::Expert => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "expert" => Ok(Difficulty::Expert),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No mines laid yet
    Ready,
    Playing,
    Won,
    Lost,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Ready => "ready",
            Phase::Playing => "playing",
            Phase::Won => "won",
            Phase::Lost => "lost",
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self, Phase::Won | Phase::Lost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinesweeperAction {
    Reveal { row: i32, col: i32 },
    ToggleFlag { row: i32, col: i32 },
    Chord { row: i32, col: i32 },
    /// Flag, chord or reveal depending on flag mode and the cell
    Click { row: i32, col: i32 },
    SetFlagMode(bool),
    NewGame(Difficulty),
}

/// What the player can see of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Hidden,
    Flagged,
    Number(u8),
    Mine,
    /// The mine that ended the game
    Exploded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinesweeperState {
    pub rng: Pcg32,
    pub difficulty: Difficulty,
    pub board: Board,
    pub mines: usize,
    pub phase: Phase,
    /// Ticks spent in the Playing phase
    pub elapsed_ticks: u64,
    #[serde(default)]
    pub flag_mode: bool,
    #[serde(default)]
    pub exploded: Option<(usize, usize)>,
}

impl MinesweeperState {
    pub fn with_difficulty(seed: u64, difficulty: Difficulty) -> Self {
        let (rows, cols, mines) = difficulty.layout();
        log::info!("New {difficulty} minesweeper board {rows}x{cols} with {mines} mines");
        Self {
            rng: seeded_rng(seed),
            difficulty,
            board: Board::new(rows, cols),
            mines,
            phase: Phase::Ready,
            elapsed_ticks: 0,
            flag_mode: false,
            exploded: None,
        }
    }

    /// Mines minus flags; negative when over-flagged
    pub fn mines_remaining(&self) -> i64 {
        self.mines as i64 - self.board.flag_count() as i64
    }

    /// Revealed cells that are not mines
    pub fn safe_revealed(&self) -> usize {
        self.board
            .cells
            .iter()
            .filter(|c| c.revealed && !c.mine)
            .count()
    }

    pub fn view(&self, row: usize, col: usize) -> CellView {
        let cell = self.board.cell(row, col);
        if cell.revealed {
            if !cell.mine {
                CellView::Number(cell.adjacent)
            } else if self.exploded == Some((row, col)) {
                CellView::Exploded
            } else {
                CellView::Mine
            }
        } else if cell.flagged {
            CellView::Flagged
        } else {
            CellView::Hidden
        }
    }

    fn locate(&self, row: i32, col: i32) -> Result<(usize, usize), ActionError> {
        if self.phase.is_over() {
            return Err(ActionError::GameOver);
        }
        self.board
            .locate(row, col)
            .ok_or(ActionError::OutOfBounds { row, col })
    }

    fn reveal(&mut self, row: i32, col: i32) -> Result<(), ActionError> {
        let (r, c) = self.locate(row, col)?;
        let cell = self.board.cell(r, c);
        if cell.flagged || cell.revealed {
            return Err(ActionError::CellUnavailable);
        }

        if self.phase == Phase::Ready {
            self.mines = self.board.place_mines(&mut self.rng, self.mines, (r, c));
            self.phase = Phase::Playing;
        }

        self.open(r, c);
        Ok(())
    }

    /// Reveal a hidden cell and settle the outcome
    fn open(&mut self, row: usize, col: usize) {
        match self.board.reveal(row, col) {
            Reveal::Mine => {
                self.phase = Phase::Lost;
                self.exploded = Some((row, col));
                log::info!("Mine hit at ({row}, {col}) after {} ticks", self.elapsed_ticks);
            }
            Reveal::Safe(_) => self.check_win(),
        }
    }

    fn check_win(&mut self) {
        if self.board.hidden_count() != self.mines {
            return;
        }
        self.phase = Phase::Won;
        for cell in self.board.cells.iter_mut().filter(|c| c.mine) {
            cell.flagged = true;
        }
        log::info!("Board cleared in {} ticks", self.elapsed_ticks);
    }

    fn toggle_flag(&mut self, row: i32, col: i32) -> Result<(), ActionError> {
        let (r, c) = self.locate(row, col)?;
        let cell = self.board.cell_mut(r, c);
        if cell.revealed {
            return Err(ActionError::CellUnavailable);
        }
        cell.flagged = !cell.flagged;
        Ok(())
    }

    /// Open every unflagged neighbour of a satisfied number
    fn chord(&mut self, row: i32, col: i32) -> Result<(), ActionError> {
        let (r, c) = self.locate(row, col)?;
        let cell = *self.board.cell(r, c);
        if !cell.revealed || cell.adjacent == 0 {
            return Err(ActionError::CellUnavailable);
        }
        if self.board.adjacent_flags(r, c) != cell.adjacent as usize {
            return Err(ActionError::CellUnavailable);
        }

        for (nr, nc) in self.board.neighbors(r, c) {
            let next = self.board.cell(nr, nc);
            if next.revealed || next.flagged {
                continue;
            }
            self.open(nr, nc);
            if self.phase.is_over() {
                break;
            }
        }
        Ok(())
    }

    fn click(&mut self, row: i32, col: i32) -> Result<(), ActionError> {
        if self.flag_mode {
            return self.toggle_flag(row, col);
        }
        let (r, c) = self.locate(row, col)?;
        let cell = self.board.cell(r, c);
        if cell.revealed && cell.adjacent > 0 {
            self.chord(row, col)
        } else {
            self.reveal(row, col)
        }
    }
}

impl Simulation for MinesweeperState {
    type Action = MinesweeperAction;

    const KIND: GameKind = GameKind::Minesweeper;

    fn new_game(seed: u64) -> Self {
        Self::with_difficulty(seed, Difficulty::default())
    }

    fn tick(&mut self, _controls: &Controls) {
        if self.phase == Phase::Playing {
            self.elapsed_ticks += 1;
        }
    }

    fn apply_input(&mut self, action: MinesweeperAction) -> Result<(), ActionError> {
        match action {
            MinesweeperAction::Reveal { row, col } => self.reveal(row, col),
            MinesweeperAction::ToggleFlag { row, col } => self.toggle_flag(row, col),
            MinesweeperAction::Chord { row, col } => self.chord(row, col),
            MinesweeperAction::Click { row, col } => self.click(row, col),
            MinesweeperAction::SetFlagMode(on) => {
                self.flag_mode = on;
                Ok(())
            }
            MinesweeperAction::NewGame(difficulty) => {
                let seed = self.rng.random();
                *self = Self::with_difficulty(seed, difficulty);
                Ok(())
            }
        }
    }

    fn status(&self) -> Status {
        Status {
            phase: self.phase.as_str(),
            score: self.safe_revealed() as u64,
            level: self.difficulty.level(),
            lives: None,
            finished: self.phase.is_over(),
        }
    }

    fn validate(&self) -> Result<(), &'static str> {
        let (rows, cols, mines) = self.difficulty.layout();
        if self.board.rows != rows || self.board.cols != cols {
            return Err("board size does not match difficulty");
        }
        if self.board.cells.len() != rows * cols {
            return Err("cell count does not match board size");
        }
        if self.mines > mines {
            return Err("too many mines");
        }
        if self.board.cells.iter().any(|c| c.adjacent > 8) {
            return Err("adjacency count out of range");
        }
        if self.phase == Phase::Ready {
            if self.board.cells.iter().any(|c| c.mine || c.revealed) {
                return Err("mines laid before the first reveal");
            }
        } else if self.board.mine_count() != self.mines {
            return Err("mine count mismatch");
        }
        if self.exploded.is_some_and(|(r, c)| r >= rows || c >= cols) {
            return Err("exploded cell outside the board");
        }
        Ok(())
    }

    fn reset(&mut self) {
        let seed = self.rng.random();
        *self = Self::with_difficulty(seed, self.difficulty);
    }
}
