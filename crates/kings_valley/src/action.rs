//! Move records.
//!
//! A move is a domain event: it is created only after validation succeeds
//! and is never mutated afterwards.

use crate::types::{Position, Side};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An accepted relocation, as stored in the match log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Where the piece started.
    pub from: Position,
    /// Where the piece came to rest.
    pub to: Position,
    /// Side that made the move.
    pub mover: Side,
    /// When the move was accepted.
    pub timestamp: DateTime<Utc>,
}

impl Move {
    pub(crate) fn new(from: Position, to: Position, mover: Side) -> Self {
        Self {
            from,
            to,
            mover,
            timestamp: Utc::now(),
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player {}: {} -> {}", self.mover, self.from, self.to)
    }
}
