//! 10x10 Stratego board with two lakes and move generation

use serde::{Deserialize, Serialize};

use super::pieces::{Piece, Side};

pub const BOARD_SIZE: usize = 10;

/// Lake cells as (row, col)
pub const WATER: [Pos; 8] = [(4, 2), (4, 3), (5, 2), (5, 3), (4, 6), (4, 7), (5, 6), (5, 7)];

/// (row, col)
pub type Pos = (usize, usize);

const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

pub fn is_water(pos: Pos) -> bool {
    WATER.contains(&pos)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    /// Row-major, `BOARD_SIZE * BOARD_SIZE` cells
    pub cells: Vec<Option<Piece>>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            cells: vec![None; BOARD_SIZE * BOARD_SIZE],
        }
    }
}

impl Board {
    /// Checked conversion from signed coordinates
    pub fn locate(row: i32, col: i32) -> Option<Pos> {
        let (r, c) = (usize::try_from(row).ok()?, usize::try_from(col).ok()?);
        (r < BOARD_SIZE && c < BOARD_SIZE).then_some((r, c))
    }

    pub fn get(&self, (row, col): Pos) -> Option<&Piece> {
        self.cells.get(row * BOARD_SIZE + col)?.as_ref()
    }

    pub fn set(&mut self, (row, col): Pos, piece: Option<Piece>) {
        self.cells[row * BOARD_SIZE + col] = piece;
    }

    pub fn take(&mut self, (row, col): Pos) -> Option<Piece> {
        self.cells[row * BOARD_SIZE + col].take()
    }

    pub fn is_free(&self, pos: Pos) -> bool {
        !is_water(pos) && self.get(pos).is_none()
    }

    /// All pieces with their positions, in row-major order
    pub fn pieces(&self) -> impl Iterator<Item = (Pos, &Piece)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, cell)| cell.as_ref().map(|p| ((idx / BOARD_SIZE, idx % BOARD_SIZE), p)))
    }

    /// Where the piece at `from` may go. Steps stop at the edge, at water and
    /// at the first occupied cell, which is included when it holds an enemy.
    /// Only scouts continue past the first step.
    pub fn destinations(&self, from: Pos) -> Vec<Pos> {
        let Some(piece) = self.get(from) else {
            return Vec::new();
        };
        if !piece.kind.movable() {
            return Vec::new();
        }

        let mut out = Vec::new();
        for (dr, dc) in DIRECTIONS {
            let (mut row, mut col) = (from.0 as i32, from.1 as i32);
            loop {
                row += dr;
                col += dc;
                let Some(pos) = Board::locate(row, col) else {
                    break;
                };
                if is_water(pos) {
                    break;
                }
                match self.get(pos) {
                    Some(other) => {
                        if other.side != piece.side {
                            out.push(pos);
                        }
                        break;
                    }
                    None => out.push(pos),
                }
                if !piece.kind.runs() {
                    break;
                }
            }
        }
        out
    }

    /// Every legal (from, to) pair for a side, in board order
    pub fn moves_for(&self, side: Side) -> Vec<(Pos, Pos)> {
        self.pieces()
            .filter(|(_, p)| p.side == side)
            .flat_map(|(from, _)| self.destinations(from).into_iter().map(move |to| (from, to)))
            .collect()
    }

    pub fn has_moves(&self, side: Side) -> bool {
        self.pieces()
            .filter(|(_, p)| p.side == side)
            .any(|(from, _)| !self.destinations(from).is_empty())
    }
}
