//! Serializable match state consumed by presentation and persistence.

use crate::action::Move;
use crate::board::Board;
use crate::types::{JoinCode, MatchId, MatchStatus, Player, Side};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time copy of a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    /// Match identifier.
    pub id: MatchId,
    /// Join code for the second seat.
    pub join_code: JoinCode,
    /// 5x5 board, `null` for empty cells.
    pub board: Board,
    /// Side to move.
    pub current_turn: Side,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// Seated players.
    pub players: Vec<Player>,
    /// Winner, once finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Side>,
    /// Accepted moves, oldest first.
    pub move_log: Vec<Move>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the last accepted change.
    pub updated_at: DateTime<Utc>,
}
