//! In-process snapshot store, used when no database is configured.

use kings_valley::MatchSnapshot;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::{debug, instrument};

use crate::store::{MatchStore, StoreError};

/// Snapshot store held in memory. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: RwLock<HashMap<String, MatchSnapshot>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MatchStore for MemoryStore {
    #[instrument(skip(self, snapshot), fields(id = %snapshot.id))]
    fn put(&self, snapshot: &MatchSnapshot) -> Result<(), StoreError> {
        let mut snapshots = self.snapshots.write().unwrap_or_else(PoisonError::into_inner);
        snapshots.insert(snapshot.id.clone(), snapshot.clone());
        debug!(count = snapshots.len(), "Snapshot stored");
        Ok(())
    }

    fn get(&self, match_id: &str) -> Result<Option<MatchSnapshot>, StoreError> {
        let snapshots = self.snapshots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(snapshots.get(match_id).cloned())
    }

    fn get_by_code(&self, join_code: &str) -> Result<Option<MatchSnapshot>, StoreError> {
        let snapshots = self.snapshots.read().unwrap_or_else(PoisonError::into_inner);
        Ok(snapshots
            .values()
            .filter(|s| s.join_code == join_code)
            .max_by_key(|s| s.updated_at)
            .cloned())
    }
}
