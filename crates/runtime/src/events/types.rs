//! Typed events published by the workers.

use serde::{Deserialize, Serialize};

use arena_core::{CombatEvent, MatchStatus, Participant, PlayerAddress, SlotId};

use crate::repository::{MatchId, TournamentId};

/// Progress of one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MatchEvent {
    /// A command was accepted and the state committed.
    Updated {
        id: MatchId,
        status: MatchStatus,
        event: CombatEvent,
    },
    /// A command was rejected; the state is unchanged.
    Rejected {
        id: MatchId,
        phase: String,
        reason: String,
    },
    /// The match reached its terminal state. Published last, after
    /// settlement and tournament reporting have run.
    Finished { id: MatchId, winner: PlayerAddress },
}

impl MatchEvent {
    pub fn match_id(&self) -> MatchId {
        match self {
            MatchEvent::Updated { id, .. }
            | MatchEvent::Rejected { id, .. }
            | MatchEvent::Finished { id, .. } => *id,
        }
    }
}

/// Progress of one tournament.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TournamentEvent {
    /// A slot was decided and its winner advanced.
    BracketUpdated {
        id: TournamentId,
        slot: SlotId,
        winner: PlayerAddress,
    },
    /// A slot gained both players and a match was materialized for it.
    MatchReady {
        id: TournamentId,
        slot: SlotId,
        match_id: MatchId,
    },
    /// Every required slot is decided; `standings` holds the ranked winners.
    Completed {
        id: TournamentId,
        standings: Vec<Participant>,
    },
}

impl TournamentEvent {
    pub fn tournament_id(&self) -> TournamentId {
        match self {
            TournamentEvent::BracketUpdated { id, .. }
            | TournamentEvent::MatchReady { id, .. }
            | TournamentEvent::Completed { id, .. } => *id,
        }
    }
}
