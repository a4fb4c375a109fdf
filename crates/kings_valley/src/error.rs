//! Error taxonomy for match operations.
//!
//! Every variant is a recoverable, user-facing condition. A rejected
//! operation never changes match state.

use crate::types::{MatchStatus, PlayerId, Position, Side};

/// Error returned by board, engine and registry operations.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MatchError {
    /// A coordinate lies outside the 5x5 board.
    #[display("Position {} is off the board", _0)]
    OutOfBounds(Position),

    /// The relocation breaks the sliding rules.
    #[display("Illegal move from {} to {}", from, to)]
    IllegalMove {
        /// Requested origin.
        from: Position,
        /// Requested destination.
        to: Position,
    },

    /// The requester is seated but it is the other side's turn.
    #[display("Not your turn, waiting for player {}", _0)]
    NotYourTurn(Side),

    /// The match is not accepting moves.
    #[display("Match is not in progress (status: {})", _0)]
    NotInProgress(MatchStatus),

    /// The requester is not seated in this match.
    #[display("Unknown player '{}'", _0)]
    UnknownPlayer(PlayerId),

    /// Both seats are taken, or the match already started.
    #[display("Match is full")]
    MatchFull,

    /// No match resolves from the given id or join code.
    #[display("Match '{}' not found", _0)]
    NotFound(String),

    /// A collaborator (persistence) could not complete the operation.
    #[display("Service unavailable: {}", _0)]
    Unavailable(String),

    /// A postcondition failed after a transition was computed.
    #[display("Invariant violation: {}", _0)]
    InvariantViolation(String),
}

impl std::error::Error for MatchError {}
