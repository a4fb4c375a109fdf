//! Contract-based validation for moves.
//!
//! Contracts define correctness through preconditions and postconditions,
//! in the Hoare style `{P} action {Q}`. Preconditions run in a fixed order
//! and all of them complete before the engine mutates anything.

use crate::engine::MatchEngine;
use crate::error::MatchError;
use crate::invariants::{InvariantSet, MatchInvariants};
use crate::rules;
use crate::types::{MatchStatus, Position, Side};
use tracing::{instrument, warn};

// ─────────────────────────────────────────────────────────────
//  Contract Trait
// ─────────────────────────────────────────────────────────────

/// A contract defines preconditions and postconditions for state transitions.
pub trait Contract<S, A> {
    /// Checks preconditions before applying the action.
    fn pre(state: &S, action: &A) -> Result<(), MatchError>;

    /// Checks postconditions of a computed transition.
    fn post(before: &S, after: &S) -> Result<(), MatchError>;
}

/// A move as requested by a client, before it is known to be legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest<'a> {
    /// Player id claimed by the requester.
    pub requester: &'a str,
    /// Origin cell.
    pub from: Position,
    /// Destination cell.
    pub to: Position,
}

impl<'a> MoveRequest<'a> {
    /// Creates a move request.
    pub fn new(requester: &'a str, from: Position, to: Position) -> Self {
        Self {
            requester,
            from,
            to,
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  Move Preconditions
// ─────────────────────────────────────────────────────────────

/// Precondition: the match accepts moves.
pub struct MatchInProgress;

impl MatchInProgress {
    /// Fails with [`MatchError::NotInProgress`] unless status is `InProgress`.
    pub fn check(engine: &MatchEngine) -> Result<(), MatchError> {
        match engine.status() {
            MatchStatus::InProgress => Ok(()),
            status => Err(MatchError::NotInProgress(status)),
        }
    }
}

/// Precondition: the requester holds a seat.
pub struct SeatedPlayer;

impl SeatedPlayer {
    /// Returns the requester's seat or [`MatchError::UnknownPlayer`].
    pub fn check(engine: &MatchEngine, requester: &str) -> Result<Side, MatchError> {
        engine
            .player(requester)
            .map(|player| player.seat)
            .ok_or_else(|| MatchError::UnknownPlayer(requester.to_string()))
    }
}

/// Precondition: it is the requester's turn.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Fails with [`MatchError::NotYourTurn`] naming the side to move.
    pub fn check(engine: &MatchEngine, seat: Side) -> Result<(), MatchError> {
        if seat == engine.current_turn() {
            Ok(())
        } else {
            Err(MatchError::NotYourTurn(engine.current_turn()))
        }
    }
}

/// Precondition: the relocation obeys the sliding rules.
pub struct SlidingMove;

impl SlidingMove {
    /// Delegates to [`rules::check_move`].
    pub fn check(
        engine: &MatchEngine,
        request: &MoveRequest<'_>,
        seat: Side,
    ) -> Result<(), MatchError> {
        rules::check_move(engine.board(), request.from, request.to, seat)
    }
}

/// Composite precondition, in the order errors are reported.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions, returning the mover's seat.
    #[instrument(skip(engine), fields(match_id = %engine.id()))]
    pub fn check(engine: &MatchEngine, request: &MoveRequest<'_>) -> Result<Side, MatchError> {
        MatchInProgress::check(engine)?;
        let seat = SeatedPlayer::check(engine, request.requester)?;
        PlayersTurn::check(engine, seat)?;
        SlidingMove::check(engine, request, seat)?;
        Ok(seat)
    }
}

// ─────────────────────────────────────────────────────────────
//  Move Contract (Pre + Post)
// ─────────────────────────────────────────────────────────────

/// Contract for move actions.
///
/// Preconditions: match in progress, seated requester, requester's turn,
/// legal slide.
///
/// Postconditions: exactly one log entry appended, and the match
/// invariant set still holds.
pub struct MoveContract;

impl Contract<MatchEngine, MoveRequest<'_>> for MoveContract {
    fn pre(engine: &MatchEngine, request: &MoveRequest<'_>) -> Result<(), MatchError> {
        LegalMove::check(engine, request).map(|_| ())
    }

    fn post(before: &MatchEngine, after: &MatchEngine) -> Result<(), MatchError> {
        if after.move_log().len() != before.move_log().len() + 1 {
            warn!("move log did not grow by exactly one entry");
            return Err(MatchError::InvariantViolation(
                "Postcondition failed: move log must grow by one".to_string(),
            ));
        }
        check_invariants(after)
    }
}

/// Checks the full invariant set, joining all violations into one error.
pub fn check_invariants(engine: &MatchEngine) -> Result<(), MatchError> {
    MatchInvariants::check_all(engine).map_err(|violations| {
        let descriptions = violations
            .iter()
            .map(|v| v.description.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        warn!(match_id = %engine.id(), %descriptions, "Invariant violated");
        MatchError::InvariantViolation(descriptions)
    })
}
