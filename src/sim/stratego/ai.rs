//! Computer opponent: random deployment and a bucketed move heuristic

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand_pcg::Pcg32;

use super::board::{Board, Pos};
use super::pieces::{Piece, PieceId, PieceKind, Side};

/// Deploy `kinds` onto the free cells of `rows`. The flag, if present, goes on
/// a random free cell of `flag_row` first. Returns how many pieces found a cell.
pub fn deploy(
    board: &mut Board,
    rng: &mut Pcg32,
    side: Side,
    kinds: &[PieceKind],
    rows: std::ops::RangeInclusive<usize>,
    flag_row: usize,
    next_id: &mut PieceId,
) -> usize {
    let mut spawn = |board: &mut Board, pos: Pos, kind: PieceKind| {
        board.set(pos, Some(Piece { id: *next_id, side, kind }));
        *next_id += 1;
    };

    let mut remaining: Vec<PieceKind> = kinds.to_vec();
    let mut placed = 0;

    if let Some(flag_idx) = remaining.iter().position(|k| *k == PieceKind::Flag) {
        let back_row: Vec<Pos> = (0..super::board::BOARD_SIZE)
            .map(|col| (flag_row, col))
            .filter(|&pos| board.is_free(pos))
            .collect();
        if let Some(&pos) = back_row.choose(rng) {
            spawn(board, pos, PieceKind::Flag);
            remaining.remove(flag_idx);
            placed += 1;
        }
    }

    let mut free: Vec<Pos> = rows
        .flat_map(|row| (0..super::board::BOARD_SIZE).map(move |col| (row, col)))
        .filter(|&pos| board.is_free(pos))
        .collect();
    free.shuffle(rng);
    remaining.shuffle(rng);

    for (kind, pos) in remaining.into_iter().zip(free) {
        spawn(board, pos, kind);
        placed += 1;
    }
    placed
}

/// Pick a move for `side`: captures first, then advances toward the enemy's
/// home edge, then anything else. Uniform within the chosen bucket.
pub fn choose_move(board: &Board, side: Side, rng: &mut Pcg32) -> Option<(Pos, Pos)> {
    let mut captures = Vec::new();
    let mut advances = Vec::new();
    let mut others = Vec::new();

    for (from, to) in board.moves_for(side) {
        let row_delta = to.0 as i32 - from.0 as i32;
        if board.get(to).is_some_and(|p| p.side != side) {
            captures.push((from, to));
        } else if row_delta * side.forward() > 0 {
            advances.push((from, to));
        } else {
            others.push((from, to));
        }
    }

    [captures, advances, others]
        .into_iter()
        .find(|bucket| !bucket.is_empty())
        .and_then(|bucket| {
            let idx = rng.random_range(0..bucket.len());
            bucket.get(idx).copied()
        })
}
