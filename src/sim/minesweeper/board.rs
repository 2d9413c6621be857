//! Minesweeper grid: mine placement, counts and flood reveal

use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// One grid cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub mine: bool,
    /// Mines among the eight neighbours
    pub adjacent: u8,
    pub revealed: bool,
    pub flagged: bool,
}

/// What a reveal uncovered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    /// Number of cells newly revealed (flood fill included)
    Safe(usize),
    Mine,
}

/// Row-major grid of cells
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Cell>,
}

impl Board {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::default(); rows * cols],
        }
    }

    /// Checked conversion from signed coordinates
    pub fn locate(&self, row: i32, col: i32) -> Option<(usize, usize)> {
        let (r, c) = (usize::try_from(row).ok()?, usize::try_from(col).ok()?);
        (r < self.rows && c < self.cols).then_some((r, c))
    }

    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.cells[row * self.cols + col]
    }

    #[inline]
    pub fn cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        &mut self.cells[row * self.cols + col]
    }

    /// In-bounds neighbours of a cell, excluding the cell itself
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> + use<> {
        let (rows, cols) = (self.rows as i64, self.cols as i64);
        let (row, col) = (row as i64, col as i64);
        (-1..=1)
            .flat_map(move |dr| (-1..=1).map(move |dc| (dr, dc)))
            .filter(|&(dr, dc)| (dr, dc) != (0, 0))
            .map(move |(dr, dc)| (row + dr, col + dc))
            .filter(move |&(r, c)| r >= 0 && r < rows && c >= 0 && c < cols)
            .map(|(r, c)| (r as usize, c as usize))
    }

    /// Scatter mines anywhere except the 3x3 block around `safe`, then fill
    /// in the adjacency counts. Returns the number of mines placed.
    pub fn place_mines(&mut self, rng: &mut Pcg32, mines: usize, safe: (usize, usize)) -> usize {
        let (safe_row, safe_col) = safe;
        let mut candidates: Vec<usize> = (0..self.cells.len())
            .filter(|&idx| {
                let (r, c) = (idx / self.cols, idx % self.cols);
                r.abs_diff(safe_row) > 1 || c.abs_diff(safe_col) > 1
            })
            .collect();

        let count = mines.min(candidates.len());
        let (chosen, _) = candidates.partial_shuffle(rng, count);
        for &idx in chosen.iter() {
            self.cells[idx].mine = true;
        }

        for row in 0..self.rows {
            for col in 0..self.cols {
                let adjacent = self
                    .neighbors(row, col)
                    .filter(|&(r, c)| self.cell(r, c).mine)
                    .count() as u8;
                self.cell_mut(row, col).adjacent = adjacent;
            }
        }

        count
    }

    /// Reveal a hidden, unflagged cell. Zero cells open their whole region
    /// using an explicit work stack.
    pub fn reveal(&mut self, row: usize, col: usize) -> Reveal {
        let cell = self.cell_mut(row, col);
        cell.revealed = true;
        if cell.mine {
            return Reveal::Mine;
        }
        if cell.adjacent > 0 {
            return Reveal::Safe(1);
        }

        let mut opened = 1;
        let mut stack = vec![(row, col)];
        while let Some((r, c)) = stack.pop() {
            for (nr, nc) in self.neighbors(r, c) {
                let next = self.cell_mut(nr, nc);
                if next.revealed || next.flagged {
                    continue;
                }
                next.revealed = true;
                opened += 1;
                if next.adjacent == 0 && !next.mine {
                    stack.push((nr, nc));
                }
            }
        }
        Reveal::Safe(opened)
    }

    pub fn hidden_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.revealed).count()
    }

    pub fn flag_count(&self) -> usize {
        self.cells.iter().filter(|c| c.flagged).count()
    }

    pub fn mine_count(&self) -> usize {
        self.cells.iter().filter(|c| c.mine).count()
    }

    /// Number of flags around a cell
    pub fn adjacent_flags(&self, row: usize, col: usize) -> usize {
        self.neighbors(row, col)
            .filter(|&(r, c)| self.cell(r, c).flagged)
            .count()
    }
}
