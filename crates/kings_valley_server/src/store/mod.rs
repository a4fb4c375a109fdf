//! Persistence collaborator for match snapshots.
//!
//! The engine only needs key lookups: by match id and by join code.

mod error;
mod memory;
mod models;
mod schema; // Diesel generated schema - internal use only
mod sqlite;

pub use error::{StoreError, StoreErrorKind};
pub use memory::MemoryStore;
pub use models::{MatchRecord, NewMatchRecord};
pub use sqlite::SqliteStore;

use kings_valley::MatchSnapshot;

/// Durable get/put store of match snapshots.
pub trait MatchStore: Send + Sync {
    /// Inserts or replaces the snapshot stored under `snapshot.id`.
    fn put(&self, snapshot: &MatchSnapshot) -> Result<(), StoreError>;

    /// Loads a snapshot by match id.
    fn get(&self, match_id: &str) -> Result<Option<MatchSnapshot>, StoreError>;

    /// Loads the most recently updated snapshot holding `join_code`.
    fn get_by_code(&self, join_code: &str) -> Result<Option<MatchSnapshot>, StoreError>;
}
