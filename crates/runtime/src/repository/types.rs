//! Persisted document shapes shared across the runtime.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use arena_core::{Bracket, BracketSize, CombatState, SlotId};

/// Identifier of one playable match, unique across the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "match-{}", self.0)
    }
}

/// Identifier of one tournament, unique across the orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TournamentId(pub u64);

impl fmt::Display for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tournament-{}", self.0)
    }
}

/// Back-reference from a match to the bracket slot it decides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentLink {
    pub tournament: TournamentId,
    pub slot: SlotId,
}

/// Durable record of one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchDocument {
    pub id: MatchId,
    pub combat: CombatState,
    /// Wagered matches trigger the settlement callback when they finish.
    pub wagered: bool,
    /// Set when the match decides a tournament slot.
    pub link: Option<TournamentLink>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MatchDocument {
    pub fn new(
        id: MatchId,
        combat: CombatState,
        wagered: bool,
        link: Option<TournamentLink>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            combat,
            wagered,
            link,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Parameters fixed at tournament creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    pub size: BracketSize,
    /// How many ranked places are paid out. Four and above routes semifinal
    /// losers into the third-place decider.
    pub number_of_winners: u32,
}

/// Durable record of one tournament.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TournamentDocument {
    pub id: TournamentId,
    pub config: TournamentConfig,
    pub bracket: Bracket,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
