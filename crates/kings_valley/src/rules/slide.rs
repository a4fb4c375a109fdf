//! Sliding move validation.
//!
//! A piece travels along one of eight rays and must stop on the farthest
//! empty cell before the board edge or another piece. Shorter stops are
//! illegal, and there are no captures.

use crate::board::Board;
use crate::error::MatchError;
use crate::types::{Direction, Position, Side};
use strum::IntoEnumIterator;
use tracing::{debug, instrument};

/// Returns where a piece on `from` comes to rest when slid along `direction`.
///
/// `None` when the first cell along the ray is occupied or off the board.
pub fn slide_destination(board: &Board, from: Position, direction: Direction) -> Option<Position> {
    let mut last = None;
    let mut cursor = from.step(direction);
    while let Ok(None) = board.at(cursor) {
        last = Some(cursor);
        cursor = cursor.step(direction);
    }
    last
}

/// Validates a proposed relocation for `mover`.
///
/// # Errors
///
/// Returns [`MatchError::OutOfBounds`] if either coordinate is off the board
/// and [`MatchError::IllegalMove`] for every other rule violation.
#[instrument(skip(board))]
pub fn check_move(
    board: &Board,
    from: Position,
    to: Position,
    mover: Side,
) -> Result<(), MatchError> {
    let origin = board.at(from)?;
    let target = board.at(to)?;
    let illegal = MatchError::IllegalMove { from, to };

    if !origin.is_some_and(|piece| piece.owner == mover) {
        debug!("origin is empty or owned by the opponent");
        return Err(illegal);
    }
    if target.is_some() {
        debug!("destination is occupied");
        return Err(illegal);
    }
    let Some(direction) = Direction::between(from, to) else {
        debug!("destination is not on a straight or diagonal ray");
        return Err(illegal);
    };
    if slide_destination(board, from, direction) != Some(to) {
        debug!(?direction, "destination is not where the piece comes to rest");
        return Err(illegal);
    }
    Ok(())
}

/// Returns true if `mover` may slide the piece on `from` to `to`.
pub fn is_legal(board: &Board, from: Position, to: Position, mover: Side) -> bool {
    check_move(board, from, to, mover).is_ok()
}

/// Lists every legal destination for the piece on `from`, at most one per ray.
///
/// Empty when `from` is off the board or unoccupied.
#[instrument(skip(board))]
pub fn legal_destinations(board: &Board, from: Position) -> Vec<Position> {
    match board.at(from) {
        Ok(Some(_)) => Direction::iter()
            .filter_map(|direction| slide_destination(board, from, direction))
            .collect(),
        _ => Vec::new(),
    }
}
