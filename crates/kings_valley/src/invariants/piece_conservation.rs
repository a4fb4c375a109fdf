//! Piece conservation: pieces relocate, never vanish or duplicate.

use super::Invariant;
use crate::engine::MatchEngine;
use crate::types::{PieceKind, Side};
use strum::IntoEnumIterator;

/// Invariant: each side has exactly one king and four pawns on the board.
pub struct PieceConservationInvariant;

impl Invariant<MatchEngine> for PieceConservationInvariant {
    fn holds(engine: &MatchEngine) -> bool {
        Side::iter().all(|side| {
            let count = |kind: PieceKind| {
                engine
                    .board()
                    .pieces()
                    .filter(|(_, piece)| piece.owner == side && piece.kind == kind)
                    .count()
            };
            count(PieceKind::King) == 1 && count(PieceKind::Pawn) == 4
        })
    }

    fn description() -> &'static str {
        "Each side keeps exactly one king and four pawns"
    }
}
