//! Inbound match operations.
//!
//! [`GameService`] combines the in-memory [`MatchRegistry`] with a
//! [`MatchStore`]. Every mutation is computed on a copy of the engine,
//! persisted, and only then committed in memory, so a store outage never
//! leaves memory and storage disagreeing. Matches missing from memory,
//! after a restart or an eviction, are reloaded from the store.

use crate::registry::MatchRegistry;
use crate::store::MatchStore;
use chrono::Duration;
use kings_valley::{
    JoinCode, MatchError, MatchId, MatchSnapshot, Player, PlayerId, Position, Side,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Response to creating a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedMatch {
    /// Allocated match id.
    pub match_id: MatchId,
    /// Code to share with the opponent.
    pub join_code: JoinCode,
    /// The creator, seated as side One.
    pub player: Player,
    /// Initial state.
    pub state: MatchSnapshot,
}

/// Response to joining a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinedMatch {
    /// Id of the joined match.
    pub match_id: MatchId,
    /// Seat assigned to the joiner.
    pub seat: Side,
    /// The joiner.
    pub player: Player,
    /// State after the join.
    pub state: MatchSnapshot,
}

/// Response to an accepted move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveOutcome {
    /// Always true; rejected moves are reported as errors.
    pub accepted: bool,
    /// Winner, if this move ended the match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Side>,
    /// State after the move.
    pub state: MatchSnapshot,
}

/// How a caller refers to a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchLookup {
    /// By match id.
    Id(MatchId),
    /// By join code.
    Code(JoinCode),
}

/// Entry point for create, join, read and move operations.
#[derive(Clone)]
pub struct GameService {
    registry: Arc<MatchRegistry>,
    store: Arc<dyn MatchStore>,
}

impl std::fmt::Debug for GameService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameService")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl GameService {
    /// Creates a service over the given registry and store.
    pub fn new(registry: Arc<MatchRegistry>, store: Arc<dyn MatchStore>) -> Self {
        Self { registry, store }
    }

    /// The registry owning live matches.
    pub fn registry(&self) -> &MatchRegistry {
        &self.registry
    }

    /// Creates a match with `creator_name` in seat One.
    ///
    /// # Errors
    ///
    /// [`MatchError::Unavailable`] if the store rejects the initial snapshot.
    #[instrument(skip(self))]
    pub fn create_match(&self, creator_name: &str) -> Result<CreatedMatch, MatchError> {
        let created = self
            .registry
            .create_match_with(creator_name, |snapshot| Ok(self.store.put(snapshot)?))?;
        Ok(CreatedMatch {
            match_id: created.match_id,
            join_code: created.join_code,
            player: created.creator,
            state: created.snapshot,
        })
    }

    /// Seats `player_name` in the waiting match owning `join_code`.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotFound`] if no waiting match owns the code,
    /// [`MatchError::MatchFull`] if the seat was taken, or
    /// [`MatchError::Unavailable`] if the store fails.
    #[instrument(skip(self))]
    pub fn join_match(
        &self,
        join_code: &str,
        player_name: &str,
    ) -> Result<JoinedMatch, MatchError> {
        let joined = self
            .registry
            .join_match_with(
                join_code,
                player_name,
                |code| Ok(self.store.get_by_code(code)?),
                |snapshot| Ok(self.store.put(snapshot)?),
            )?;
        Ok(JoinedMatch {
            match_id: joined.match_id,
            seat: joined.player.seat,
            player: joined.player,
            state: joined.snapshot,
        })
    }

    /// Returns the current state of a match.
    ///
    /// Live matches are read from the registry; matches no longer held in
    /// memory (reaped, or from an earlier process) are read from the store.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotFound`] if neither knows the match, or
    /// [`MatchError::Unavailable`] if the store fails.
    #[instrument(skip(self))]
    pub fn get_state(&self, lookup: &MatchLookup) -> Result<MatchSnapshot, MatchError> {
        let live_id = match lookup {
            MatchLookup::Id(id) => Some(id.clone()),
            MatchLookup::Code(code) => self.registry.resolve_code(code),
        };
        if let Some(id) = live_id {
            match self.registry.with_match(&id, |engine| Ok(engine.snapshot())) {
                Err(MatchError::NotFound(_)) => {}
                result => return result,
            }
        }

        debug!("Match not live, falling back to store");
        let stored = match lookup {
            MatchLookup::Id(id) => self.store.get(id)?,
            MatchLookup::Code(code) => self.store.get_by_code(code)?,
        };
        stored.ok_or_else(|| {
            MatchError::NotFound(match lookup {
                MatchLookup::Id(id) => id.clone(),
                MatchLookup::Code(code) => code.clone(),
            })
        })
    }

    /// Validates and applies a move for `player_id`.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotFound`] if neither memory nor the store knows the
    /// match, any rule error from the engine, or
    /// [`MatchError::Unavailable`] if the store fails. In every case the
    /// match is unchanged.
    #[instrument(skip(self))]
    pub fn submit_move(
        &self,
        match_id: &str,
        player_id: &PlayerId,
        from: Position,
        to: Position,
    ) -> Result<MoveOutcome, MatchError> {
        self.registry.with_match_or_load(match_id, |id| self.load(id), |engine| {
            let mut next = engine.clone();
            let winner = next.apply_move(player_id, from, to)?;
            let state = next.snapshot();
            self.store.put(&state)?;
            *engine = next;
            if let Some(side) = winner {
                info!(match_id, winner = %side, "Match won");
            }
            Ok(MoveOutcome {
                accepted: true,
                winner,
                state,
            })
        })
    }

    /// Lists legal destinations of the piece on `from` in a live match.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotFound`] for an unknown match, or
    /// [`MatchError::OutOfBounds`] if `from` is off the board.
    #[instrument(skip(self))]
    pub fn legal_moves(
        &self,
        match_id: &str,
        from: Position,
    ) -> Result<Vec<Position>, MatchError> {
        self.registry.with_match_or_load(match_id, |id| self.load(id), |engine| {
            engine.board().at(from)?;
            Ok(engine.legal_destinations(from))
        })
    }

    /// Removes finished and idle matches from memory. They are restored
    /// from the store the next time they are used.
    pub fn reap(&self, max_idle: Duration) -> usize {
        self.registry.reap(max_idle)
    }

    fn load(&self, match_id: &str) -> Result<Option<MatchSnapshot>, MatchError> {
        Ok(self.store.get(match_id)?)
    }
}
