//! Match registry: the per-match concurrency boundary.
//!
//! The registry owns every live [`MatchEngine`]. Each engine sits behind its
//! own mutex, so operations on one match are serialized while different
//! matches proceed in parallel. The index is locked only to resolve an id
//! or code to an engine handle, to register a match, or to evict one.
//!
//! Lock order is always index, then match. While the index write lock is
//! held, match locks are only ever tried, never waited on, and no store
//! call runs. Closures passed to [`MatchRegistry::with_match`] must not
//! call back into the registry.
//!
//! The registry is a cache over the store: a match that is not live is
//! rehydrated from its last persisted snapshot on first use.

use crate::join_code::{JoinCodeGenerator, RandomJoinCodes};
use chrono::{DateTime, Duration, Utc};
use kings_valley::{
    JoinCode, MatchEngine, MatchError, MatchId, MatchSnapshot, MatchStatus, Player,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, TryLockError};
use tracing::{debug, info, instrument, warn};

/// A live engine plus its registration state.
#[derive(Debug)]
struct Slot {
    engine: MatchEngine,
    /// Set once the slot is evicted. Holders of a stale handle must look
    /// the match up again.
    retired: bool,
}

type MatchHandle = Arc<Mutex<Slot>>;

fn new_handle(engine: MatchEngine) -> MatchHandle {
    Arc::new(Mutex::new(Slot {
        engine,
        retired: false,
    }))
}

/// A freshly created match.
#[derive(Debug, Clone)]
pub struct NewMatch {
    /// Allocated match id.
    pub match_id: MatchId,
    /// Join code for the second player.
    pub join_code: JoinCode,
    /// The creator, seated as side One.
    pub creator: Player,
    /// State right after creation.
    pub snapshot: MatchSnapshot,
}

/// Result of joining a match by code.
#[derive(Debug, Clone)]
pub struct JoinedMatch {
    /// Id of the joined match.
    pub match_id: MatchId,
    /// The newly seated player.
    pub player: Player,
    /// State right after the join.
    pub snapshot: MatchSnapshot,
}

struct Index {
    matches: HashMap<MatchId, MatchHandle>,
    codes: HashMap<JoinCode, MatchId>,
    generator: Box<dyn JoinCodeGenerator>,
}

impl Index {
    /// True if `code` belongs to a registered match that has not finished.
    ///
    /// A match whose lock is held is busy, and a busy match counts as
    /// unfinished.
    fn code_in_use(&self, code: &str) -> bool {
        self.codes
            .get(code)
            .and_then(|id| self.matches.get(id))
            .is_some_and(|handle| match try_lock(handle) {
                Some(slot) => slot.engine.status() != MatchStatus::Finished,
                None => true,
            })
    }

    /// Drops `match_id` and its join code, if the code still points at it.
    fn unregister(&mut self, match_id: &str, join_code: &str) {
        self.matches.remove(match_id);
        if self.codes.get(join_code).is_some_and(|id| id == match_id) {
            self.codes.remove(join_code);
        }
    }
}

/// Maps match ids and join codes to exclusively owned match engines.
pub struct MatchRegistry {
    index: RwLock<Index>,
}

impl std::fmt::Debug for MatchRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchRegistry")
            .field("matches", &self.len())
            .finish()
    }
}

impl MatchRegistry {
    /// Creates an empty registry issuing random join codes.
    #[instrument]
    pub fn new() -> Self {
        Self::with_generator(RandomJoinCodes)
    }

    /// Creates an empty registry with a custom join code source.
    pub fn with_generator(generator: impl JoinCodeGenerator + 'static) -> Self {
        info!("Creating match registry");
        Self {
            index: RwLock::new(Index {
                matches: HashMap::new(),
                codes: HashMap::new(),
                generator: Box::new(generator),
            }),
        }
    }

    /// Creates a match without a persistence step.
    ///
    /// # Errors
    ///
    /// None in practice; see [`MatchRegistry::create_match_with`].
    pub fn create_match(&self, creator_name: &str) -> Result<NewMatch, MatchError> {
        self.create_match_with(creator_name, |_| Ok(()))
    }

    /// Creates a match, calling `commit` with its initial snapshot.
    ///
    /// The code is picked and reserved under the index write lock, so two
    /// concurrent creations never share a code. Codes of finished matches
    /// are free for reuse. `commit` runs after the index lock is released,
    /// holding only the new match's lock, so callers that find the match
    /// early wait for the outcome.
    ///
    /// # Errors
    ///
    /// Propagates the error from `commit`, in which case the reservation is
    /// withdrawn and nothing stays registered.
    #[instrument(skip(self, commit))]
    pub fn create_match_with(
        &self,
        creator_name: &str,
        commit: impl FnOnce(&MatchSnapshot) -> Result<(), MatchError>,
    ) -> Result<NewMatch, MatchError> {
        let match_id = uuid::Uuid::new_v4().to_string();
        let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);

        let mut attempts = 0u32;
        let join_code = loop {
            let candidate = index.generator.generate();
            attempts += 1;
            if !index.code_in_use(&candidate) {
                break candidate;
            }
            debug!(code = %candidate, attempts, "Join code collision, retrying");
        };

        let engine = MatchEngine::create(match_id.clone(), join_code.clone(), creator_name);
        let snapshot = engine.snapshot();
        let creator = engine.players()[0].clone();
        let handle = new_handle(engine);
        // Uncontended: nobody else has seen this handle yet.
        let mut slot = lock(&handle);
        index.codes.insert(join_code.clone(), match_id.clone());
        index.matches.insert(match_id.clone(), Arc::clone(&handle));
        drop(index);

        if let Err(e) = commit(&snapshot) {
            slot.retired = true;
            drop(slot);
            let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);
            index.unregister(&match_id, &join_code);
            warn!(%match_id, error = %e, "Initial snapshot rejected, match withdrawn");
            return Err(e);
        }
        drop(slot);

        info!(%match_id, %join_code, attempts, "Match registered");
        Ok(NewMatch {
            match_id,
            join_code,
            creator,
            snapshot,
        })
    }

    /// Joins the live waiting match that owns `join_code`, without
    /// persistence.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotFound`] if no waiting match owns the code.
    pub fn join_match(
        &self,
        join_code: &str,
        player_name: &str,
    ) -> Result<JoinedMatch, MatchError> {
        self.join_match_with(join_code, player_name, |_| Ok(None), |_| Ok(()))
    }

    /// Joins the waiting match that owns `join_code`.
    ///
    /// If the code is not live, `load` is asked for the latest snapshot
    /// holding it, and a waiting match found that way is rehydrated. The
    /// join is computed on a copy of the engine and `commit` is called
    /// with the resulting snapshot; the copy replaces the live engine only
    /// if `commit` succeeds.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotFound`] if no waiting match owns the code, or the
    /// error returned by `load` or `commit`.
    #[instrument(skip(self, load, commit))]
    pub fn join_match_with(
        &self,
        join_code: &str,
        player_name: &str,
        load: impl Fn(&str) -> Result<Option<MatchSnapshot>, MatchError>,
        commit: impl FnOnce(&MatchSnapshot) -> Result<(), MatchError>,
    ) -> Result<JoinedMatch, MatchError> {
        let not_found = || MatchError::NotFound(join_code.to_string());
        let match_id = match self.resolve_code(join_code) {
            Some(match_id) => match_id,
            None => match load(join_code)? {
                Some(snapshot) if snapshot.status == MatchStatus::Waiting => {
                    self.restore(snapshot)?
                }
                _ => return Err(not_found()),
            },
        };

        self.with_match(&match_id, |engine| {
            if engine.join_code() != join_code || engine.status() != MatchStatus::Waiting {
                warn!(status = %engine.status(), "Join code does not resolve to a waiting match");
                return Err(not_found());
            }
            let mut next = engine.clone();
            let player = next.join(player_name)?;
            let snapshot = next.snapshot();
            commit(&snapshot)?;
            *engine = next;
            Ok(JoinedMatch {
                match_id: match_id.clone(),
                player,
                snapshot,
            })
        })
    }

    /// Runs `f` with exclusive access to one live match.
    ///
    /// This is the only path to read or mutate a registered engine. The
    /// match lock is held for the whole call to `f`.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotFound`] if the id is not live, otherwise whatever
    /// `f` returns.
    pub fn with_match<T>(
        &self,
        match_id: &str,
        f: impl FnOnce(&mut MatchEngine) -> Result<T, MatchError>,
    ) -> Result<T, MatchError> {
        self.with_match_or_load(match_id, |_| Ok(None), f)
    }

    /// Like [`MatchRegistry::with_match`], but a match that is not live is
    /// rehydrated from the snapshot returned by `load` first.
    ///
    /// # Errors
    ///
    /// [`MatchError::NotFound`] if neither the registry nor `load` knows
    /// the id, the error from `load` or from rehydration, otherwise
    /// whatever `f` returns.
    pub fn with_match_or_load<T>(
        &self,
        match_id: &str,
        load: impl Fn(&str) -> Result<Option<MatchSnapshot>, MatchError>,
        f: impl FnOnce(&mut MatchEngine) -> Result<T, MatchError>,
    ) -> Result<T, MatchError> {
        loop {
            let handle = match self.handle(match_id) {
                Some(handle) => handle,
                None => {
                    let Some(snapshot) = load(match_id)? else {
                        debug!(match_id, "Match not registered");
                        return Err(MatchError::NotFound(match_id.to_string()));
                    };
                    self.restore(snapshot)?;
                    continue;
                }
            };
            let mut slot = lock(&handle);
            if slot.retired {
                debug!(match_id, "Match evicted while waiting, looking up again");
                continue;
            }
            return f(&mut slot.engine);
        }
    }

    /// Registers a persisted match, returning its id.
    ///
    /// If the match became live in the meantime the live copy wins and
    /// `snapshot` is discarded. The join code is re-indexed unless the
    /// match has finished or another unfinished match holds the code.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvariantViolation`] if the snapshot is inconsistent.
    #[instrument(skip(self, snapshot), fields(match_id = %snapshot.id))]
    pub fn restore(&self, snapshot: MatchSnapshot) -> Result<MatchId, MatchError> {
        let engine = MatchEngine::from_snapshot(snapshot)?;
        let match_id = engine.id().to_string();
        let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);
        if index.matches.contains_key(&match_id) {
            debug!("Match already live");
            return Ok(match_id);
        }

        let join_code = engine.join_code().to_string();
        let status = engine.status();
        if status != MatchStatus::Finished && !index.code_in_use(&join_code) {
            index.codes.insert(join_code.clone(), match_id.clone());
        }
        index.matches.insert(match_id.clone(), new_handle(engine));
        info!(%join_code, %status, "Match restored from store");
        Ok(match_id)
    }

    /// Resolves a join code to the id of the live match holding it.
    pub fn resolve_code(&self, join_code: &str) -> Option<MatchId> {
        let index = self.index.read().unwrap_or_else(PoisonError::into_inner);
        index.codes.get(join_code).cloned()
    }

    /// Number of live matches.
    pub fn len(&self) -> usize {
        let index = self.index.read().unwrap_or_else(PoisonError::into_inner);
        index.matches.len()
    }

    /// True if no match is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Evicts finished matches and matches idle for longer than `max_idle`,
    /// releasing their join codes. Returns how many were evicted.
    ///
    /// Matches busy in another operation are skipped until the next sweep.
    /// An idle window too large to subtract from the current time evicts
    /// only finished matches.
    #[instrument(skip(self))]
    pub fn reap(&self, max_idle: Duration) -> usize {
        let cutoff = Utc::now()
            .checked_sub_signed(max_idle)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let mut index = self.index.write().unwrap_or_else(PoisonError::into_inner);

        let mut expired = Vec::new();
        for (id, handle) in &index.matches {
            let Some(mut slot) = try_lock(handle) else {
                debug!(match_id = %id, "Match busy, skipping");
                continue;
            };
            let finished = slot.engine.status() == MatchStatus::Finished;
            if finished || slot.engine.updated_at() < cutoff {
                slot.retired = true;
                expired.push((id.clone(), slot.engine.join_code().to_string()));
            }
        }
        for (id, code) in &expired {
            index.unregister(id, code);
        }

        if !expired.is_empty() {
            info!(removed = expired.len(), remaining = index.matches.len(), "Reaped matches");
        }
        expired.len()
    }

    fn handle(&self, match_id: &str) -> Option<MatchHandle> {
        let index = self.index.read().unwrap_or_else(PoisonError::into_inner);
        index.matches.get(match_id).cloned()
    }
}

impl Default for MatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Locks a match, recovering from poisoning.
///
/// Engine operations replace state wholesale or not at all, so a panic
/// while the lock was held cannot leave a half-applied engine behind.
fn lock(handle: &MatchHandle) -> MutexGuard<'_, Slot> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Locks a match only if nobody else holds it.
fn try_lock(handle: &MatchHandle) -> Option<MutexGuard<'_, Slot>> {
    match handle.try_lock() {
        Ok(slot) => Some(slot),
        Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    }
}
