//! Async orchestration for matches and tournaments.
//!
//! This crate wires the pure rules in `arena-core` to the outside world:
//! every live match and tournament is owned by a single worker task, clients
//! talk to workers through cloneable handles, and observers follow progress
//! on a topic-keyed event bus.
//!
//! Modules are organized by responsibility:
//! - [`orchestrator`] hosts the entry point and builder
//! - [`api`] exposes the handles and errors clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`repository`] persists match and tournament documents
//! - [`settlement`] is the callback seam for wagered matches
//! - [`workers`] keeps the background tasks internal to the crate
pub mod api;
pub mod events;
pub mod oracle;
pub mod orchestrator;
pub mod repository;
pub mod settlement;

mod workers;

pub use api::{MatchHandle, OrchestratorError, Result, TournamentHandle};
pub use events::{Event, EventBus, MatchEvent, Topic, TournamentEvent};
pub use oracle::RosterOracle;
pub use orchestrator::{Orchestrator, OrchestratorBuilder, OrchestratorConfig};
pub use repository::{
    InMemoryMatchRepo, InMemoryTournamentRepo, MatchDocument, MatchId, MatchRepository,
    RepositoryError, TournamentConfig, TournamentDocument, TournamentId, TournamentLink,
    TournamentRepository,
};
pub use settlement::{LoggingSettlement, MatchOutcome, Settlement, SettlementError};
