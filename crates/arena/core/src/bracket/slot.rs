//! Bracket slot and participant types.

use std::fmt;

use crate::character::{CharacterId, CharacterRef, PlayerAddress};

use super::round::Round;

/// Identifier of one slot within a bracket, unique per tournament.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotId(pub u32);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot-{}", self.0)
    }
}

/// Opaque handle to the playable match record linked to a slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchRef(String);

impl MatchRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Milliseconds since the Unix epoch, supplied by the caller. The rules
/// crate never reads a clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(pub u64);

/// A registration before seeding: who plays, with which character.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Entrant {
    pub address: PlayerAddress,
    pub character_id: CharacterId,
    pub character_ref: CharacterRef,
}

/// A seeded tournament participant. Immutable once assigned to a slot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    pub address: PlayerAddress,
    pub character_id: CharacterId,
    pub character_ref: CharacterRef,
    /// 1-based position in the shuffled seeding order.
    pub seed_position: u32,
}

/// One positioned contest within a round.
///
/// Created empty for every round beyond the first; populated by progression;
/// terminal once `winner` is recorded.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BracketSlot {
    pub id: SlotId,
    pub round: Round,
    /// 1-based index within the round; the third-place slot sits at 0.
    pub position: u32,
    pub player1: Option<Participant>,
    pub player2: Option<Participant>,
    pub winner: Option<PlayerAddress>,
    pub linked_match: Option<MatchRef>,
    pub completed_at: Option<Timestamp>,
}

impl BracketSlot {
    pub(super) fn new(
        id: SlotId,
        round: Round,
        position: u32,
        player1: Option<Participant>,
        player2: Option<Participant>,
    ) -> Self {
        Self {
            id,
            round,
            position,
            player1,
            player2,
            winner: None,
            linked_match: None,
            completed_at: None,
        }
    }

    /// Both players assigned and no winner yet recorded.
    pub fn is_ready(&self) -> bool {
        self.is_populated() && self.winner.is_none()
    }

    /// Both players assigned.
    pub fn is_populated(&self) -> bool {
        self.player1.is_some() && self.player2.is_some()
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.player1.iter().chain(self.player2.iter())
    }

    pub fn has_player(&self, address: &PlayerAddress) -> bool {
        self.participants().any(|p| &p.address == address)
    }

    /// The participant who won, once decided.
    pub fn winner_participant(&self) -> Option<&Participant> {
        let winner = self.winner.as_ref()?;
        self.participants().find(|p| &p.address == winner)
    }

    /// The participant who lost, once decided.
    pub fn loser_participant(&self) -> Option<&Participant> {
        let winner = self.winner.as_ref()?;
        self.participants().find(|p| &p.address != winner)
    }
}
