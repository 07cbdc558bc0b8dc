//! Settlement seam for wagered matches.
//!
//! When a wagered match finishes, its worker reports the outcome through
//! [`Settlement`] exactly once, before the terminal event is published.
//! Upstream this pays out the wager on chain; the default implementation
//! just records the outcome in the log.

use async_trait::async_trait;
use thiserror::Error;

use arena_core::PlayerAddress;

use crate::repository::MatchId;

/// Outcome of a finished match, as reported to the settlement layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchOutcome {
    pub match_id: MatchId,
    pub winner: PlayerAddress,
    pub loser: PlayerAddress,
}

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("settlement rejected: {0}")]
    Rejected(String),

    #[error("settlement transport failed: {0}")]
    Transport(String),
}

/// Callback invoked once per finished wagered match.
#[async_trait]
pub trait Settlement: Send + Sync {
    async fn settle(&self, outcome: &MatchOutcome) -> Result<(), SettlementError>;
}

/// Default settlement that logs the outcome and always succeeds.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingSettlement;

#[async_trait]
impl Settlement for LoggingSettlement {
    async fn settle(&self, outcome: &MatchOutcome) -> Result<(), SettlementError> {
        tracing::info!(
            target: "arena_runtime::settlement",
            match_id = %outcome.match_id,
            winner = %outcome.winner,
            loser = %outcome.loser,
            "match settled"
        );
        Ok(())
    }
}
