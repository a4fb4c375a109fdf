//! Database models for persisted matches.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use kings_valley::MatchSnapshot;
use tracing::instrument;

use crate::store::{StoreError, schema};

/// A stored match row. The full state lives in `snapshot` as JSON; the
/// other columns exist for lookup.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::matches)]
pub struct MatchRecord {
    id: String,
    join_code: String,
    status: String,
    snapshot: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl MatchRecord {
    /// Decodes the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the JSON does not describe a snapshot.
    #[instrument(skip(self), fields(id = %self.id))]
    pub fn to_snapshot(&self) -> Result<MatchSnapshot, StoreError> {
        Ok(serde_json::from_str(&self.snapshot)?)
    }
}

/// Insertable match row.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::matches)]
pub struct NewMatchRecord {
    id: String,
    join_code: String,
    status: String,
    snapshot: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl NewMatchRecord {
    /// Encodes a snapshot into a row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the snapshot cannot be serialized.
    #[instrument(skip(snapshot), fields(id = %snapshot.id))]
    pub fn from_snapshot(snapshot: &MatchSnapshot) -> Result<Self, StoreError> {
        Ok(Self::new(
            snapshot.id.clone(),
            snapshot.join_code.clone(),
            snapshot.status.as_ref().to_string(),
            serde_json::to_string(snapshot)?,
            snapshot.created_at.naive_utc(),
            snapshot.updated_at.naive_utc(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kings_valley::MatchEngine;

    #[test]
    fn test_status_column_uses_wire_name() {
        let mut engine = MatchEngine::create("m1".into(), "ABC123".into(), "Alice");
        let waiting = NewMatchRecord::from_snapshot(&engine.snapshot()).unwrap();
        assert_eq!(waiting.status(), "waiting");

        engine.join("Bob").unwrap();
        let started = NewMatchRecord::from_snapshot(&engine.snapshot()).unwrap();
        assert_eq!(started.status(), "in_progress");
        assert_eq!(started.join_code(), "ABC123");
    }
}
