//! Errors surfaced by bracket progression.

use thiserror::Error;

use crate::character::PlayerAddress;

use super::round::Round;
use super::slot::SlotId;

/// Bracket operation failures.
///
/// `NextMatchNotFound` and `DestinationOccupied` indicate a generation bug,
/// not a caller mistake; callers should treat them as fatal and log them
/// rather than retry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BracketError {
    #[error("no slot {slot} in this bracket")]
    MatchNotFound { slot: SlotId },

    #[error("{address} is not a player of slot {slot}")]
    WinnerNotInMatch { slot: SlotId, address: PlayerAddress },

    #[error("slot {slot} already has a winner")]
    MatchAlreadyDecided { slot: SlotId },

    #[error("slot {slot} has no winner yet")]
    MatchNotDecided { slot: SlotId },

    #[error("slot {slot} is not a semifinal")]
    NotASemifinal { slot: SlotId },

    #[error("no destination slot at {round} position {position}")]
    NextMatchNotFound { round: Round, position: u32 },

    #[error("destination slot at {round} position {position} is already taken")]
    DestinationOccupied { round: Round, position: u32 },
}
