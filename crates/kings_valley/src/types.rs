//! Core domain types for King's Valley.

use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// Number of rows and columns on the board.
pub const BOARD_SIZE: i32 = 5;

/// Opaque identifier of a seated player.
pub type PlayerId = String;

/// Opaque identifier of a match.
pub type MatchId = String;

/// Short human-shareable code used to join a waiting match.
pub type JoinCode = String;

/// One of the two competing sides. Side One moves first.
///
/// Serialized as the integers `1` and `2`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, derive_more::Display,
)]
#[serde(into = "u8", try_from = "u8")]
pub enum Side {
    /// Seat 1, starts on row 4 and moves first.
    #[display("1")]
    One,
    /// Seat 2, starts on row 0.
    #[display("2")]
    Two,
}

impl Side {
    /// Returns the opposing side.
    pub fn opponent(self) -> Self {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> Self {
        match side {
            Side::One => 1,
            Side::Two => 2,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Side::One),
            2 => Ok(Side::Two),
            other => Err(format!("invalid side {other}, expected 1 or 2")),
        }
    }
}

/// Kind of piece. Behavior never varies by kind except for win detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum PieceKind {
    /// The piece that wins by reaching the center.
    #[serde(rename = "K")]
    #[display("K")]
    King,
    /// Blocking piece.
    #[serde(rename = "P")]
    #[display("P")]
    Pawn,
}

/// A piece on the board. Pieces are values: moving one moves the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    /// Side that owns the piece.
    pub owner: Side,
    /// King or pawn.
    pub kind: PieceKind,
}

impl Piece {
    /// Creates a king for the given side.
    pub fn king(owner: Side) -> Self {
        Self {
            owner,
            kind: PieceKind::King,
        }
    }

    /// Creates a pawn for the given side.
    pub fn pawn(owner: Side) -> Self {
        Self {
            owner,
            kind: PieceKind::Pawn,
        }
    }

    /// Returns true if this piece is a king.
    pub fn is_king(&self) -> bool {
        self.kind == PieceKind::King
    }
}

/// A board coordinate.
///
/// Coordinates are signed so that requests pointing off the board can be
/// represented and rejected with `OutOfBounds` rather than failing to parse.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[display("({row}, {col})")]
pub struct Position {
    /// Row, 0 at side Two's home row.
    pub row: i32,
    /// Column, 0 on the left.
    pub col: i32,
}

impl Position {
    /// The center cell, the only win-triggering destination.
    pub const CENTER: Position = Position { row: 2, col: 2 };

    /// Creates a position. No bounds check.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Returns true if the position lies on the board.
    pub fn in_bounds(&self) -> bool {
        (0..BOARD_SIZE).contains(&self.row) && (0..BOARD_SIZE).contains(&self.col)
    }

    /// Returns the neighbouring position one step along `direction`.
    pub fn step(self, direction: Direction) -> Self {
        let (dr, dc) = direction.delta();
        Self::new(self.row + dr, self.col + dc)
    }
}

/// One of the eight rays a piece can slide along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Direction {
    /// Toward row 0.
    North,
    /// Toward row 0 and column 4.
    NorthEast,
    /// Toward column 4.
    East,
    /// Toward row 4 and column 4.
    SouthEast,
    /// Toward row 4.
    South,
    /// Toward row 4 and column 0.
    SouthWest,
    /// Toward column 0.
    West,
    /// Toward row 0 and column 0.
    NorthWest,
}

impl Direction {
    /// Unit step `(row, col)` for this direction.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Returns the ray leading from `from` to `to`, if they share one.
    ///
    /// `None` for the zero vector and for displacements that are neither
    /// orthogonal nor exactly diagonal.
    pub fn between(from: Position, to: Position) -> Option<Self> {
        let dr = to.row - from.row;
        let dc = to.col - from.col;
        if dr == 0 && dc == 0 {
            return None;
        }
        if dr != 0 && dc != 0 && dr.abs() != dc.abs() {
            return None;
        }
        match (dr.signum(), dc.signum()) {
            (-1, 0) => Some(Direction::North),
            (-1, 1) => Some(Direction::NorthEast),
            (0, 1) => Some(Direction::East),
            (1, 1) => Some(Direction::SouthEast),
            (1, 0) => Some(Direction::South),
            (1, -1) => Some(Direction::SouthWest),
            (0, -1) => Some(Direction::West),
            (-1, -1) => Some(Direction::NorthWest),
            _ => None,
        }
    }
}

/// A player seated in a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Opaque identifier assigned at join time.
    pub id: PlayerId,
    /// Name shown to the opponent.
    pub display_name: String,
    /// Seat, which is also the side this player controls.
    pub seat: Side,
}

/// Lifecycle status of a match.
///
/// [`AsRef<str>`] yields the wire name used in JSON and storage, e.g.
/// `in_progress`; `Display` is the human-readable form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MatchStatus {
    /// Created, waiting for the second player.
    #[display("waiting")]
    Waiting,
    /// Both seats filled, moves accepted.
    #[display("in progress")]
    InProgress,
    /// A king reached the center. Terminal.
    #[display("finished")]
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_swaps_sides() {
        assert_eq!(Side::One.opponent(), Side::Two);
        assert_eq!(Side::Two.opponent(), Side::One);
    }

    #[test]
    fn test_side_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Side::Two).unwrap(), "2");
        let side: Side = serde_json::from_str("1").unwrap();
        assert_eq!(side, Side::One);
        assert!(serde_json::from_str::<Side>("3").is_err());
    }

    #[test]
    fn test_direction_between_rejects_knight_jump() {
        let from = Position::new(4, 0);
        assert_eq!(Direction::between(from, Position::new(2, 1)), None);
        assert_eq!(Direction::between(from, from), None);
    }

    #[test]
    fn test_direction_between_normalizes_distance() {
        let from = Position::new(4, 0);
        assert_eq!(
            Direction::between(from, Position::new(1, 3)),
            Some(Direction::NorthEast)
        );
        assert_eq!(
            Direction::between(from, Position::new(0, 0)),
            Some(Direction::North)
        );
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&MatchStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        for status in [MatchStatus::Waiting, MatchStatus::InProgress, MatchStatus::Finished] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_ref()));
        }
    }
}
