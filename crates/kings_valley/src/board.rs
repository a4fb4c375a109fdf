//! The 5x5 King's Valley board.

use crate::error::MatchError;
use crate::types::{BOARD_SIZE, Piece, Position, Side};
use serde::{Deserialize, Serialize};
use tracing::instrument;

const SIZE: usize = BOARD_SIZE as usize;

/// Fixed 5x5 grid of optionally occupied cells, row-major.
///
/// Serializes as a 5x5 array of `{owner, kind}` objects or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Option<Piece>; SIZE]; SIZE],
}

impl Board {
    /// Creates a board with no pieces. Only useful for building fixtures.
    pub fn empty() -> Self {
        Self {
            cells: [[None; SIZE]; SIZE],
        }
    }

    /// Creates the starting position.
    ///
    /// Side Two occupies row 0 and side One row 4, each with the king in
    /// column 2 and pawns on the remaining columns.
    #[instrument]
    pub fn initial() -> Self {
        let mut board = Self::empty();
        for (row, side) in [(0, Side::Two), (SIZE - 1, Side::One)] {
            for col in 0..SIZE {
                board.cells[row][col] = Some(if col == SIZE / 2 {
                    Piece::king(side)
                } else {
                    Piece::pawn(side)
                });
            }
        }
        board
    }

    /// Builds a board from explicit rows.
    pub fn from_rows(cells: [[Option<Piece>; SIZE]; SIZE]) -> Self {
        Self { cells }
    }

    /// Returns the occupant of `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::OutOfBounds`] when `pos` is off the board.
    pub fn at(&self, pos: Position) -> Result<Option<Piece>, MatchError> {
        let (row, col) = Self::index(pos).ok_or(MatchError::OutOfBounds(pos))?;
        Ok(self.cells[row][col])
    }

    /// Returns a new board with the piece on `from` relocated to `to`.
    ///
    /// Legality is not checked here. The caller guarantees that `from` is
    /// occupied, `to` is empty and both are on the board; otherwise the
    /// board is returned unchanged.
    pub fn with_move(&self, from: Position, to: Position) -> Self {
        let mut next = self.clone();
        if let (Some((fr, fc)), Some((tr, tc))) = (Self::index(from), Self::index(to))
            && next.cells[tr][tc].is_none()
            && let Some(piece) = next.cells[fr][fc].take()
        {
            next.cells[tr][tc] = Some(piece);
        }
        next
    }

    /// Places a piece, replacing any occupant. Fixture helper.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::OutOfBounds`] when `pos` is off the board.
    pub fn place(&mut self, pos: Position, piece: Option<Piece>) -> Result<(), MatchError> {
        let (row, col) = Self::index(pos).ok_or(MatchError::OutOfBounds(pos))?;
        self.cells[row][col] = piece;
        Ok(())
    }

    /// Returns all cells, row-major.
    pub fn cells(&self) -> &[[Option<Piece>; SIZE]; SIZE] {
        &self.cells
    }

    /// Iterates over every occupied cell.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells.iter().enumerate().filter_map(move |(col, cell)| {
                cell.map(|piece| (Position::new(row as i32, col as i32), piece))
            })
        })
    }

    /// Formats the board as a human-readable grid, e.g. `P2 P2 K2 P2 P2`.
    pub fn display(&self) -> String {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Some(piece) => format!("{}{}", piece.kind, piece.owner),
                        None => "..".to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn index(pos: Position) -> Option<(usize, usize)> {
        pos.in_bounds().then(|| (pos.row as usize, pos.col as usize))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}
