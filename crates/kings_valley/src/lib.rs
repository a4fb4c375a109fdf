//! King's Valley game rules and match state machine.
//!
//! Two sides each start with a king and four pawns on a 5x5 board. Pieces
//! slide along straight or diagonal lines as far as they can go, and a side
//! wins by bringing its king to the center cell.
//!
//! # Example
//!
//! ```
//! use kings_valley::{MatchEngine, MatchStatus, Position};
//!
//! let mut engine = MatchEngine::create("match-1".into(), "ABC123".into(), "Alice");
//! let alice = engine.players()[0].id.clone();
//! engine.join("Bob").unwrap();
//!
//! let winner = engine
//!     .apply_move(&alice, Position::new(4, 0), Position::new(1, 0))
//!     .unwrap();
//! assert_eq!(winner, None);
//! assert_eq!(engine.status(), MatchStatus::InProgress);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod board;
mod engine;
mod error;
mod snapshot;
mod types;

pub mod contracts;
pub mod invariants;
pub mod rules;

pub use action::Move;
pub use board::Board;
pub use engine::MatchEngine;
pub use error::MatchError;
pub use snapshot::MatchSnapshot;
pub use types::{
    BOARD_SIZE, Direction, JoinCode, MatchId, MatchStatus, Piece, PieceKind, Player, PlayerId,
    Position, Side,
};
