//! Win detection for King's Valley.

use crate::board::Board;
use crate::types::{Position, Side};
use tracing::instrument;

/// Returns the side whose king occupies the center cell, if any.
#[instrument(skip(board))]
pub fn winner(board: &Board) -> Option<Side> {
    board
        .at(Position::CENTER)
        .ok()
        .flatten()
        .filter(|piece| piece.is_king())
        .map(|piece| piece.owner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Piece;

    #[test]
    fn test_no_winner_at_start() {
        assert_eq!(winner(&Board::initial()), None);
    }

    #[test]
    fn test_king_on_center_wins() {
        let mut board = Board::empty();
        board.place(Position::CENTER, Some(Piece::king(Side::Two))).unwrap();
        assert_eq!(winner(&board), Some(Side::Two));
    }

    #[test]
    fn test_pawn_on_center_does_not_win() {
        let mut board = Board::initial();
        board.place(Position::CENTER, Some(Piece::pawn(Side::One))).unwrap();
        assert_eq!(winner(&board), None);
    }
}
