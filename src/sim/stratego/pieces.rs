//! Sides, piece kinds and combat resolution

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Human player, deploys on rows 6-9
    Red,
    /// Computer player, deploys on rows 0-3
    Blue,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Red => Side::Blue,
            Side::Blue => Side::Red,
        }
    }

    /// Row delta that moves a piece toward the enemy's home edge
    pub fn forward(&self) -> i32 {
        match self {
            Side::Red => -1,
            Side::Blue => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Red => "red",
            Side::Blue => "blue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Flag,
    Bomb,
    Spy,
    Scout,
    Miner,
    Sergeant,
    Lieutenant,
    Captain,
    Major,
    Colonel,
    General,
    Marshal,
}

impl PieceKind {
    pub const ALL: [PieceKind; 12] = [
        PieceKind::Flag,
        PieceKind::Bomb,
        PieceKind::Spy,
        PieceKind::Scout,
        PieceKind::Miner,
        PieceKind::Sergeant,
        PieceKind::Lieutenant,
        PieceKind::Captain,
        PieceKind::Major,
        PieceKind::Colonel,
        PieceKind::General,
        PieceKind::Marshal,
    ];

    /// Combat strength. Bombs outrank everything so only a Miner clears them.
    pub fn rank(&self) -> u8 {
        match self {
            PieceKind::Flag => 0,
            PieceKind::Spy => 1,
            PieceKind::Scout => 2,
            PieceKind::Miner => 3,
            PieceKind::Sergeant => 4,
            PieceKind::Lieutenant => 5,
            PieceKind::Captain => 6,
            PieceKind::Major => 7,
            PieceKind::Colonel => 8,
            PieceKind::General => 9,
            PieceKind::Marshal => 10,
            PieceKind::Bomb => 11,
        }
    }

    pub fn movable(&self) -> bool {
        !matches!(self, PieceKind::Flag | PieceKind::Bomb)
    }

    /// Scouts run any distance in a straight line
    pub fn runs(&self) -> bool {
        *self == PieceKind::Scout
    }

    /// Pieces of this kind in a full army
    pub fn army_count(&self) -> u8 {
        match self {
            PieceKind::Flag => 1,
            PieceKind::Bomb => 6,
            PieceKind::Spy => 1,
            PieceKind::Scout => 8,
            PieceKind::Miner => 5,
            PieceKind::Sergeant => 4,
            PieceKind::Lieutenant => 4,
            PieceKind::Captain => 4,
            PieceKind::Major => 3,
            PieceKind::Colonel => 2,
            PieceKind::General => 1,
            PieceKind::Marshal => 1,
        }
    }

    /// Every piece of a full army, in kind order
    pub fn army() -> Vec<PieceKind> {
        PieceKind::ALL
            .iter()
            .flat_map(|&kind| std::iter::repeat_n(kind, kind.army_count() as usize))
            .collect()
    }
}

pub type PieceId = u16;

/// A piece on the board. The id stays with it for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub side: Side,
    pub kind: PieceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    AttackerWins,
    /// Also the result of a tie
    DefenderWins,
}

/// Decide a battle between two piece kinds
pub fn resolve(attacker: PieceKind, defender: PieceKind) -> Outcome {
    let special = matches!(
        (attacker, defender),
        (PieceKind::Spy, PieceKind::Marshal) | (PieceKind::Miner, PieceKind::Bomb)
    );
    if special || attacker.rank() > defender.rank() {
        Outcome::AttackerWins
    } else {
        Outcome::DefenderWins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_army_has_forty_pieces() {
        assert_eq!(PieceKind::army().len(), 40);
        assert_eq!(PieceKind::army().iter().filter(|k| **k == PieceKind::Scout).count(), 8);
    }

    #[test]
    fn test_spy_attacking_marshal_wins() {
        assert_eq!(resolve(PieceKind::Spy, PieceKind::Marshal), Outcome::AttackerWins);
        // Only when the Spy strikes first
        assert_eq!(resolve(PieceKind::Marshal, PieceKind::Spy), Outcome::AttackerWins);
        assert_eq!(resolve(PieceKind::Spy, PieceKind::General), Outcome::DefenderWins);
    }

    #[test]
    fn test_only_miners_clear_bombs() {
        assert_eq!(resolve(PieceKind::Miner, PieceKind::Bomb), Outcome::AttackerWins);
        assert_eq!(resolve(PieceKind::Marshal, PieceKind::Bomb), Outcome::DefenderWins);
        assert_eq!(resolve(PieceKind::Scout, PieceKind::Bomb), Outcome::DefenderWins);
    }

    #[test]
    fn test_ties_favour_defender() {
        assert_eq!(resolve(PieceKind::Captain, PieceKind::Captain), Outcome::DefenderWins);
    }

    #[test]
    fn test_anything_takes_the_flag() {
        for kind in PieceKind::ALL.iter().filter(|k| k.movable()) {
            assert_eq!(resolve(*kind, PieceKind::Flag), Outcome::AttackerWins);
        }
    }

    #[test]
    fn test_forward_direction() {
        assert_eq!(Side::Red.forward(), -1);
        assert_eq!(Side::Blue.forward(), 1);
        assert_eq!(Side::Red.opponent(), Side::Blue);
    }

    proptest! {
        #[test]
        fn prop_resolve_is_deterministic(a in 0usize..12, d in 0usize..12) {
            let (attacker, defender) = (PieceKind::ALL[a], PieceKind::ALL[d]);
            prop_assert_eq!(resolve(attacker, defender), resolve(attacker, defender));
            // Rank wins are one-way outside the Spy/Marshal and Miner/Bomb pairings
            let special = |x: PieceKind, y: PieceKind| matches!((x, y), (PieceKind::Spy, PieceKind::Marshal) | (PieceKind::Miner, PieceKind::Bomb));
            if attacker != defender
                && resolve(attacker, defender) == Outcome::AttackerWins
                && !special(attacker, defender)
                && !special(defender, attacker)
            {
                prop_assert_eq!(resolve(defender, attacker), Outcome::DefenderWins);
            }
        }
    }
}
