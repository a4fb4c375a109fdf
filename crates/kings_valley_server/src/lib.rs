//! King's Valley server library.
//!
//! # Architecture
//!
//! - **Registry**: owns live matches, one lock per match
//! - **Store**: snapshot persistence (SQLite or in-memory)
//! - **Service**: create, join, read and move operations
//! - **HTTP**: JSON REST router over the service

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod join_code;
mod registry;
mod service;

pub mod cli;
pub mod http;
pub mod store;

pub use config::ServerConfig;
pub use join_code::{JOIN_CODE_LEN, JoinCodeGenerator, RandomJoinCodes, ScriptedJoinCodes};
pub use registry::{JoinedMatch as RegistryJoin, MatchRegistry, NewMatch};
pub use service::{CreatedMatch, GameService, JoinedMatch, MatchLookup, MoveOutcome};
