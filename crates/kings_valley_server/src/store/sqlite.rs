//! SQLite-backed snapshot store.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use kings_valley::MatchSnapshot;
use tracing::{debug, info, instrument};

use crate::store::{
    MatchRecord, MatchStore, NewMatchRecord, StoreError, StoreErrorKind, schema,
};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Snapshot store backed by a SQLite database file.
///
/// Opens a connection per operation, which keeps the store `Sync` without
/// a pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: String,
}

impl SqliteStore {
    /// Opens the database at `db_path`, creating it and applying pending
    /// migrations as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, StoreError> {
        let store = Self { db_path };
        let mut conn = store.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::new(StoreErrorKind::Migration, e.to_string()))?;
        info!(path = %store.db_path, applied = applied.len(), "Opened match store");
        Ok(store)
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path).map_err(|e| {
            StoreError::new(
                StoreErrorKind::Connection,
                format!("cannot open '{}': {}", self.db_path, e),
            )
        })
    }
}

impl MatchStore for SqliteStore {
    #[instrument(skip(self, snapshot), fields(id = %snapshot.id, status = %snapshot.status))]
    fn put(&self, snapshot: &MatchSnapshot) -> Result<(), StoreError> {
        let record = NewMatchRecord::from_snapshot(snapshot)?;
        let mut conn = self.connection()?;
        diesel::replace_into(schema::matches::table)
            .values(&record)
            .execute(&mut conn)?;
        debug!("Snapshot stored");
        Ok(())
    }

    #[instrument(skip(self))]
    fn get(&self, match_id: &str) -> Result<Option<MatchSnapshot>, StoreError> {
        let mut conn = self.connection()?;
        let record = schema::matches::table
            .find(match_id)
            .select(MatchRecord::as_select())
            .first(&mut conn)
            .optional()?;
        record.map(|r| r.to_snapshot()).transpose()
    }

    #[instrument(skip(self))]
    fn get_by_code(&self, join_code: &str) -> Result<Option<MatchSnapshot>, StoreError> {
        let mut conn = self.connection()?;
        let record = schema::matches::table
            .filter(schema::matches::join_code.eq(join_code))
            .order(schema::matches::updated_at.desc())
            .select(MatchRecord::as_select())
            .first(&mut conn)
            .optional()?;
        record.map(|r| r.to_snapshot()).transpose()
    }
}
