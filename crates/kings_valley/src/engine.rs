//! The match state machine.
//!
//! A match moves through `Waiting -> InProgress -> Finished` and never
//! backwards. Every operation either completes fully or leaves the engine
//! exactly as it was.

use crate::action::Move;
use crate::board::Board;
use crate::contracts::{self, Contract, LegalMove, MoveContract, MoveRequest};
use crate::error::MatchError;
use crate::rules;
use crate::snapshot::MatchSnapshot;
use crate::types::{JoinCode, MatchId, MatchStatus, Player, Position, Side};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

/// State of one match: board, roster, turn pointer, log and status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchEngine {
    id: MatchId,
    join_code: JoinCode,
    board: Board,
    players: Vec<Player>,
    current_turn: Side,
    move_log: Vec<Move>,
    status: MatchStatus,
    winner: Option<Side>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MatchEngine {
    /// Creates a waiting match with the creator seated as side One.
    #[instrument(skip(id, join_code), fields(match_id = %id, join_code = %join_code))]
    pub fn create(id: MatchId, join_code: JoinCode, creator_name: &str) -> Self {
        let now = Utc::now();
        let creator = new_player(creator_name, Side::One);
        info!(player_id = %creator.id, "Creating match");
        Self {
            id,
            join_code,
            board: Board::initial(),
            players: vec![creator],
            current_turn: Side::One,
            move_log: Vec::new(),
            status: MatchStatus::Waiting,
            winner: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds an engine from a persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::InvariantViolation`] if the snapshot describes
    /// a state the engine could never have reached.
    #[instrument(skip(snapshot), fields(match_id = %snapshot.id))]
    pub fn from_snapshot(snapshot: MatchSnapshot) -> Result<Self, MatchError> {
        let engine = Self {
            id: snapshot.id,
            join_code: snapshot.join_code,
            board: snapshot.board,
            players: snapshot.players,
            current_turn: snapshot.current_turn,
            move_log: snapshot.move_log,
            status: snapshot.status,
            winner: snapshot.winner,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        };
        if engine.players.len() > 2 {
            return Err(MatchError::InvariantViolation(
                "a match seats at most two players".to_string(),
            ));
        }
        contracts::check_invariants(&engine)?;
        debug!(status = %engine.status, "Rehydrated match");
        Ok(engine)
    }

    /// Seats a second player and starts the match.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::MatchFull`] if both seats are taken or the
    /// match is no longer waiting.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn join(&mut self, player_name: &str) -> Result<Player, MatchError> {
        if self.players.len() >= 2 || self.status != MatchStatus::Waiting {
            warn!(status = %self.status, seated = self.players.len(), "Join rejected");
            return Err(MatchError::MatchFull);
        }
        let player = new_player(player_name, Side::Two);
        self.players.push(player.clone());
        self.status = MatchStatus::InProgress;
        self.updated_at = Utc::now();
        info!(player_id = %player.id, "Second player joined, match started");
        Ok(player)
    }

    /// Validates and applies a move for `requester_id`.
    ///
    /// Returns the winning side if the move ended the match.
    ///
    /// # Errors
    ///
    /// Checked in this order: [`MatchError::NotInProgress`],
    /// [`MatchError::UnknownPlayer`], [`MatchError::NotYourTurn`], then
    /// [`MatchError::OutOfBounds`] or [`MatchError::IllegalMove`]. On any
    /// error the engine is unchanged.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub fn apply_move(
        &mut self,
        requester_id: &str,
        from: Position,
        to: Position,
    ) -> Result<Option<Side>, MatchError> {
        let request = MoveRequest::new(requester_id, from, to);
        let mover = LegalMove::check(self, &request).inspect_err(|e| {
            warn!(error = %e, "Move rejected");
        })?;

        let mut next = self.clone();
        next.board = self.board.with_move(from, to);
        next.move_log.push(Move::new(from, to, mover));
        next.updated_at = Utc::now();

        let winner = rules::winner(&next.board);
        match winner {
            Some(side) => {
                next.winner = Some(side);
                next.status = MatchStatus::Finished;
            }
            None => next.current_turn = mover.opponent(),
        }

        #[cfg(debug_assertions)]
        MoveContract::post(self, &next)?;

        *self = next;
        match winner {
            Some(side) => {
                info!(%from, %to, winner = %side, "King reached the center, match finished")
            }
            None => info!(%from, %to, next_turn = %self.current_turn, "Move applied"),
        }
        Ok(winner)
    }

    /// Checks the move preconditions without applying anything.
    ///
    /// # Errors
    ///
    /// Same as [`MatchEngine::apply_move`].
    pub fn validate_move(
        &self,
        requester_id: &str,
        from: Position,
        to: Position,
    ) -> Result<(), MatchError> {
        MoveContract::pre(self, &MoveRequest::new(requester_id, from, to))
    }

    /// Legal destinations for the piece on `from`, regardless of whose turn it is.
    pub fn legal_destinations(&self, from: Position) -> Vec<Position> {
        rules::legal_destinations(&self.board, from)
    }

    /// Returns a serializable copy of the full state.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            id: self.id.clone(),
            join_code: self.join_code.clone(),
            board: self.board.clone(),
            current_turn: self.current_turn,
            status: self.status,
            players: self.players.clone(),
            winner: self.winner,
            move_log: self.move_log.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Returns the seated player with the given id.
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// Match identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Join code handed to the second player.
    pub fn join_code(&self) -> &str {
        &self.join_code
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Seated players, seat One first.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Side to move.
    pub fn current_turn(&self) -> Side {
        self.current_turn
    }

    /// Accepted moves, oldest first.
    pub fn move_log(&self) -> &[Move] {
        &self.move_log
    }

    /// Lifecycle status.
    pub fn status(&self) -> MatchStatus {
        self.status
    }

    /// Winning side, once finished.
    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Time of the last accepted join or move.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }
}

fn new_player(name: &str, seat: Side) -> Player {
    Player {
        id: uuid::Uuid::new_v4().to_string(),
        display_name: name.to_string(),
        seat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: i32, col: i32) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_create_starts_waiting() {
        let engine = MatchEngine::create("m".into(), "CODE01".into(), "Alice");
        assert_eq!(engine.status(), MatchStatus::Waiting);
        assert_eq!(engine.players().len(), 1);
        assert_eq!(engine.players()[0].seat, Side::One);
        assert_eq!(engine.current_turn(), Side::One);
        assert!(engine.move_log().is_empty());
        assert_eq!(engine.winner(), None);
    }

    #[test]
    fn test_join_twice_is_full() {
        let mut engine = MatchEngine::create("m".into(), "CODE01".into(), "Alice");
        let bob = engine.join("Bob").unwrap();
        assert_eq!(bob.seat, Side::Two);
        assert_eq!(engine.status(), MatchStatus::InProgress);
        assert_eq!(engine.join("Carol"), Err(MatchError::MatchFull));
    }

    #[test]
    fn test_validate_move_does_not_mutate() {
        let mut engine = MatchEngine::create("m".into(), "CODE01".into(), "Alice");
        engine.join("Bob").unwrap();
        let alice = engine.players()[0].id.clone();
        let before = engine.clone();
        assert!(engine.validate_move(&alice, pos(4, 0), pos(1, 0)).is_ok());
        assert_eq!(engine, before);
    }

    #[test]
    fn test_from_snapshot_round_trips_live_state() {
        let mut engine = MatchEngine::create("m".into(), "CODE01".into(), "Alice");
        let alice = engine.players()[0].id.clone();
        engine.join("Bob").unwrap();
        engine.apply_move(&alice, pos(4, 0), pos(1, 0)).unwrap();
        let restored = MatchEngine::from_snapshot(engine.snapshot()).unwrap();
        assert_eq!(restored, engine);
    }

    #[test]
    fn test_from_snapshot_rejects_tampered_board() {
        let engine = MatchEngine::create("m".into(), "CODE01".into(), "Alice");
        let mut snapshot = engine.snapshot();
        snapshot.board = Board::empty();
        assert!(matches!(
            MatchEngine::from_snapshot(snapshot),
            Err(MatchError::InvariantViolation(_))
        ));
    }
}
