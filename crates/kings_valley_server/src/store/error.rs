//! Store error types.

use derive_more::{Display, Error};
use kings_valley::MatchError;
use std::panic::Location;

/// Which part of the store failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StoreErrorKind {
    /// The database could not be opened.
    #[display("connection")]
    Connection,
    /// Embedded migrations did not apply.
    #[display("migration")]
    Migration,
    /// A statement failed.
    #[display("query")]
    Query,
    /// A snapshot did not serialize or deserialize.
    #[display("snapshot encoding")]
    Encoding,
    /// Any other backend failure.
    #[display("backend")]
    Backend,
}

/// Persistence failure, tagged with where in this crate it was raised.
#[derive(Debug, Clone, Display, Error)]
#[display("{kind} failure at {location}: {message}")]
pub struct StoreError {
    /// Failing component.
    pub kind: StoreErrorKind,
    /// Backend message.
    pub message: String,
    /// Call site that produced the error.
    pub location: &'static Location<'static>,
}

impl StoreError {
    /// Creates an error located at the caller.
    #[track_caller]
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: Location::caller(),
        }
    }
}

impl From<diesel::result::Error> for StoreError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(StoreErrorKind::Query, err.to_string())
    }
}

impl From<diesel::ConnectionError> for StoreError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(StoreErrorKind::Connection, err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(StoreErrorKind::Encoding, err.to_string())
    }
}

/// The engine sees every store failure as the collaborator being unavailable.
impl From<StoreError> for MatchError {
    fn from(err: StoreError) -> Self {
        MatchError::Unavailable(format!("{}: {}", err.kind, err.message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_records_call_site() {
        let err = StoreError::from(serde_json::from_str::<u8>("x").unwrap_err());
        assert_eq!(err.kind, StoreErrorKind::Encoding);
        assert!(err.location.file().ends_with("error.rs"));
    }

    #[test]
    fn test_maps_to_unavailable() {
        let err = StoreError::new(StoreErrorKind::Backend, "disk full");
        assert_eq!(
            MatchError::from(err),
            MatchError::Unavailable("backend: disk full".to_string())
        );
    }
}
