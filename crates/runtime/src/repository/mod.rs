//! Persistence for match and tournament documents.
//!
//! Workers own the live state; repositories hold the durable copy that is
//! rewritten after every accepted command. The in-memory implementations
//! back tests and local runs.

mod error;
mod memory;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use memory::{InMemoryMatchRepo, InMemoryTournamentRepo};
pub use traits::{MatchRepository, TournamentRepository};
pub use types::{
    MatchDocument, MatchId, TournamentConfig, TournamentDocument, TournamentId, TournamentLink,
};
