//! Unified error type surfaced by the orchestrator API.
//!
//! Wraps rejections from the rules crate, repository failures, and worker
//! coordination errors so clients handle one type.

use thiserror::Error;
use tokio::sync::oneshot;

use arena_core::{BracketError, CharacterId, PlayerAddress, SlotId, TransitionPhaseError};

pub use crate::repository::RepositoryError;
use crate::repository::TournamentId;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("worker command channel closed")]
    CommandChannelClosed,

    #[error("worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("no character {id} in the roster")]
    UnknownCharacter { id: CharacterId },

    #[error("address {address} is not a player in this match")]
    UnknownPlayer { address: PlayerAddress },

    #[error("reported winner {winner} is not a participant of {slot}")]
    WinnerMismatch {
        slot: SlotId,
        winner: PlayerAddress,
    },

    #[error("no stored document for {id}")]
    TournamentNotFound { id: TournamentId },

    #[error(transparent)]
    Combat(#[from] TransitionPhaseError),

    #[error(transparent)]
    Bracket(#[from] BracketError),

    #[error("orchestrator requires a character roster before building")]
    MissingRoster,
}
